use macroquad::prelude::*;

use drag_trajectory::core::window::{DISTANCE_TO_HEIGHT_RATIO, fixed_ratio_axis_window};
use drag_trajectory::logging::{LogConfig, init_logging};
use drag_trajectory::{SimulationConfig, integrate};

use crate::constants::{
    BACKGROUND, BOTTOM_MARGIN, GRID_COLOR, INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH,
    LEFT_MARGIN, MSAA_SAMPLES, PATH_COLOR, PROJECTILE_RADIUS, RIGHT_MARGIN, TOP_MARGIN,
    TRAIL_COLOR,
};
use crate::hud::draw_hud;
use crate::render::{PlotFrame, draw_axis_tick_labels, draw_event_marker, draw_grid, draw_path};
use crate::replay::{Replay, to_world};

pub(crate) fn window_conf() -> Conf {
    Conf {
        window_title: "Drag Trajectory Viewer".to_string(),
        window_width: INITIAL_WINDOW_WIDTH,
        window_height: INITIAL_WINDOW_HEIGHT,
        high_dpi: true,
        sample_count: MSAA_SAMPLES,
        ..Default::default()
    }
}

/// Optional first argument: a YAML config, as accepted by the CLI.
fn load_config() -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(SimulationConfig::from_file(path)?),
        None => Ok(SimulationConfig::default()),
    }
}

pub(crate) async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LogConfig::default())?;

    let config = load_config()?;
    let trajectory = integrate(&config)?;
    let summary = trajectory.summary(config.apex_estimate);

    let max_x = trajectory
        .samples()
        .iter()
        .map(|s| s.state.x)
        .fold(0.0, f64::max);
    let max_y = trajectory
        .samples()
        .iter()
        .map(|s| s.state.y)
        .fold(0.0, f64::max);
    let (world_max_x, world_max_y) = fixed_ratio_axis_window(max_x, max_y, DISTANCE_TO_HEIGHT_RATIO);

    let apex = trajectory
        .interpolate(summary.apex_time)
        .map(|state| to_world(state.x, state.y));
    let impact = trajectory
        .interpolate(summary.impact_time)
        .map(|state| to_world(state.x, state.y));
    let apex_label = format!("{:.2} m/s (apex)", summary.apex_speed);
    let impact_label = format!("{:.2} m/s (impact)", summary.impact_speed);

    let mut replay = Replay::new(trajectory);

    loop {
        replay.advance(get_frame_time());
        let screen_w = screen_width();
        let screen_h = screen_height();

        let frame = PlotFrame {
            left: LEFT_MARGIN,
            right: screen_w - RIGHT_MARGIN,
            top: TOP_MARGIN,
            bottom: screen_h - BOTTOM_MARGIN,
            world_max_x: world_max_x as f32,
            world_max_y: world_max_y as f32,
        };

        clear_background(BACKGROUND);
        draw_grid(&frame, GRID_COLOR);
        draw_axis_tick_labels(&frame);
        draw_path(replay.path(), &frame, 2.0, PATH_COLOR);
        draw_path(&replay.trail(), &frame, 3.0, TRAIL_COLOR);

        if replay.flight_time_s() >= summary.apex_time {
            if let Some(apex) = apex {
                draw_event_marker(apex, &apex_label, &frame);
            }
        }
        if replay.flight_time_s() >= replay.trajectory().impact_time() {
            if let Some(impact) = impact {
                draw_event_marker(impact, &impact_label, &frame);
            }
        }

        if let Some(position) = replay.current_position() {
            let p = frame.world_to_screen(position);
            draw_circle(p.x, p.y, PROJECTILE_RADIUS, RED);
            draw_circle_lines(p.x, p.y, PROJECTILE_RADIUS, 2.0, MAROON);
        }

        draw_hud(&config, &summary, &replay, frame.left, screen_h);

        next_frame().await;
    }
}

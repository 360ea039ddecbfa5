use macroquad::prelude::*;

use drag_trajectory::{FlightSummary, SimulationConfig};

use crate::constants::TITLE_Y;
use crate::render::draw_ui_text;
use crate::replay::Replay;

pub(crate) fn draw_hud(
    config: &SimulationConfig,
    summary: &FlightSummary,
    replay: &Replay,
    left: f32,
    screen_h: f32,
) {
    let header_color = Color::from_rgba(30, 30, 35, 255);
    draw_ui_text(
        "Projectile flight with quadratic drag",
        left,
        TITLE_Y,
        30,
        header_color,
    );
    draw_ui_text(
        &format!(
            "Launch: {:.1} m/s at {:.1} deg | mass {:.4} kg | diameter {:.5} m | Cd {:.3}",
            config.initial_speed,
            config.launch_angle_degrees,
            config.projectile_mass,
            config.projectile_diameter,
            config.drag_coefficient
        ),
        left,
        TITLE_Y + 32.0,
        20,
        DARKGRAY,
    );

    draw_ui_text(
        &format!(
            "Apex speed: {:.2} m/s | Impact speed: {:.2} m/s | Flight time: {:.2} s | Range: {:.2} m",
            summary.apex_speed, summary.impact_speed, summary.impact_time, summary.range
        ),
        left,
        screen_h - 45.0,
        24,
        header_color,
    );
    draw_ui_text(
        &format!(
            "Replay: t = {:.2} s | speed {:.2} m/s",
            replay.flight_time_s(),
            replay.current_speed()
        ),
        left,
        screen_h - 14.0,
        20,
        BLUE,
    );
}

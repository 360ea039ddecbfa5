use macroquad::prelude::*;

use crate::constants::{MARKER_COLOR, MARKER_RADIUS, X_GRID_LINES, Y_GRID_LINES};

/// Screen rectangle of the plot area plus the world extent it shows.
#[derive(Clone, Copy)]
pub(crate) struct PlotFrame {
    pub(crate) left: f32,
    pub(crate) right: f32,
    pub(crate) top: f32,
    pub(crate) bottom: f32,
    pub(crate) world_max_x: f32,
    pub(crate) world_max_y: f32,
}

impl PlotFrame {
    pub(crate) fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let plot_w = (self.right - self.left).max(1.0);
        let plot_h = (self.bottom - self.top).max(1.0);
        let x = self.left + (world.x / self.world_max_x.max(1.0)) * plot_w;
        let y = self.bottom - (world.y / self.world_max_y.max(1.0)) * plot_h;
        vec2(x, y)
    }
}

fn format_axis_value(value: f32, axis_max: f32) -> String {
    if axis_max >= 1000.0 {
        format!("{value:.0}")
    } else if axis_max >= 100.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

pub(crate) fn draw_ui_text(text: &str, x: f32, y: f32, font_size: u16, color: Color) {
    draw_text_ex(
        text,
        x,
        y,
        TextParams {
            font_size,
            color,
            ..Default::default()
        },
    );
}

pub(crate) fn draw_grid(frame: &PlotFrame, color: Color) {
    for i in 0..=X_GRID_LINES {
        let t = i as f32 / X_GRID_LINES as f32;
        let x = frame.left + t * (frame.right - frame.left);
        draw_line(x, frame.top, x, frame.bottom, 1.0, color);
    }
    for i in 0..=Y_GRID_LINES {
        let t = i as f32 / Y_GRID_LINES as f32;
        let y = frame.bottom - t * (frame.bottom - frame.top);
        draw_line(frame.left, y, frame.right, y, 1.0, color);
    }
    draw_line(frame.left, frame.bottom, frame.right, frame.bottom, 2.0, DARKGRAY);
    draw_line(frame.left, frame.top, frame.left, frame.bottom, 2.0, DARKGRAY);
}

pub(crate) fn draw_axis_tick_labels(frame: &PlotFrame) {
    let label_color = Color::from_rgba(105, 113, 124, 255);
    let tick_font_size: u16 = 16;

    for i in 0..=X_GRID_LINES {
        let t = i as f32 / X_GRID_LINES as f32;
        let x = frame.left + t * (frame.right - frame.left);
        let label = format_axis_value(t * frame.world_max_x, frame.world_max_x);
        let size = measure_text(&label, None, tick_font_size, 1.0);
        draw_ui_text(
            &label,
            x - (size.width * 0.5),
            frame.bottom + 22.0,
            tick_font_size,
            label_color,
        );
    }

    for i in 0..=Y_GRID_LINES {
        let t = i as f32 / Y_GRID_LINES as f32;
        let y = frame.bottom - t * (frame.bottom - frame.top);
        let label = format_axis_value(t * frame.world_max_y, frame.world_max_y);
        let size = measure_text(&label, None, tick_font_size, 1.0);
        draw_ui_text(
            &label,
            (frame.left - 8.0) - size.width,
            y + (size.height * 0.35),
            tick_font_size,
            label_color,
        );
    }

    draw_ui_text(
        "Distance (m)",
        frame.right - 130.0,
        frame.bottom + 48.0,
        18,
        label_color,
    );
    draw_ui_text("Height (m)", frame.left + 10.0, frame.top - 8.0, 18, label_color);
}

pub(crate) fn draw_path(points: &[Vec2], frame: &PlotFrame, thickness: f32, color: Color) {
    for pair in points.windows(2) {
        let a = frame.world_to_screen(pair[0]);
        let b = frame.world_to_screen(pair[1]);
        draw_line(a.x, a.y, b.x, b.y, thickness, color);
    }
}

/// Dot on the path with a speed label above it.
pub(crate) fn draw_event_marker(world: Vec2, label: &str, frame: &PlotFrame) {
    let p = frame.world_to_screen(world);
    draw_line(p.x, frame.top, p.x, frame.bottom, 1.0, Color { a: 0.35, ..MARKER_COLOR });
    draw_circle(p.x, p.y, MARKER_RADIUS, MARKER_COLOR);
    let size = measure_text(label, None, 18, 1.0);
    let label_x = (p.x + 8.0).min(frame.right - size.width - 4.0);
    draw_ui_text(label, label_x, (p.y - 12.0).max(frame.top + 18.0), 18, MARKER_COLOR);
}

use macroquad::prelude::Color;

pub const INITIAL_WINDOW_WIDTH: i32 = 1600;
pub const INITIAL_WINDOW_HEIGHT: i32 = 900;
pub const MSAA_SAMPLES: i32 = 4;

pub const LEFT_MARGIN: f32 = 120.0;
pub const RIGHT_MARGIN: f32 = 30.0;
pub const TOP_MARGIN: f32 = 120.0;
pub const BOTTOM_MARGIN: f32 = 110.0;

pub const TITLE_Y: f32 = 46.0;
pub const X_GRID_LINES: usize = 10;
pub const Y_GRID_LINES: usize = 8;

/// Wall-clock seconds for one pass over the whole flight.
pub const REPLAY_DURATION_S: f32 = 6.0;
/// Pause on the impact frame before the replay restarts.
pub const REPLAY_HOLD_S: f32 = 1.5;

pub const BACKGROUND: Color = Color::new(0.98, 0.98, 0.99, 1.0);
pub const GRID_COLOR: Color = Color::new(0.89, 0.905, 0.925, 1.0);
pub const PATH_COLOR: Color = Color::new(0.298, 0.553, 0.961, 0.55);
pub const TRAIL_COLOR: Color = Color::new(0.212, 0.482, 0.961, 1.0);
pub const MARKER_COLOR: Color = Color::new(0.86, 0.16, 0.16, 1.0);
pub const MARKER_RADIUS: f32 = 6.0;
pub const PROJECTILE_RADIUS: f32 = 7.0;

use macroquad::prelude::{Vec2, vec2};

use drag_trajectory::Trajectory;

use crate::constants::{REPLAY_DURATION_S, REPLAY_HOLD_S};

/// Maps wall-clock time onto flight time and loops.
pub(crate) struct Replay {
    trajectory: Trajectory,
    path: Vec<Vec2>,
    clock_s: f32,
}

impl Replay {
    pub(crate) fn new(trajectory: Trajectory) -> Self {
        let path = trajectory
            .samples()
            .iter()
            .map(|s| to_world(s.state.x, s.state.y))
            .collect();
        Self {
            trajectory,
            path,
            clock_s: 0.0,
        }
    }

    pub(crate) fn advance(&mut self, frame_dt: f32) {
        self.clock_s += frame_dt;
        if self.clock_s > REPLAY_DURATION_S + REPLAY_HOLD_S {
            self.clock_s = 0.0;
        }
    }

    pub(crate) fn flight_time_s(&self) -> f64 {
        let progress = (self.clock_s / REPLAY_DURATION_S).min(1.0);
        f64::from(progress) * self.trajectory.impact_time()
    }

    pub(crate) fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Full sampled path in world metres.
    pub(crate) fn path(&self) -> &[Vec2] {
        &self.path
    }

    /// Samples already flown, ending at the interpolated current position.
    pub(crate) fn trail(&self) -> Vec<Vec2> {
        let now = self.flight_time_s();
        let mut trail: Vec<Vec2> = self
            .trajectory
            .samples()
            .iter()
            .take_while(|s| s.t <= now)
            .map(|s| to_world(s.state.x, s.state.y))
            .collect();
        if let Some(current) = self.current_position() {
            trail.push(current);
        }
        trail
    }

    pub(crate) fn current_position(&self) -> Option<Vec2> {
        self.trajectory
            .interpolate(self.flight_time_s())
            .map(|state| to_world(state.x, state.y))
    }

    pub(crate) fn current_speed(&self) -> f64 {
        self.trajectory
            .interpolate(self.flight_time_s())
            .map_or(0.0, |state| state.speed())
    }
}

pub(crate) fn to_world(x: f64, y: f64) -> Vec2 {
    vec2(x as f32, y.max(0.0) as f32)
}

use std::f64::consts::PI;

use crate::core::solver::{EventFunction, OdeSystem};

/// Position and velocity in the launch plane. `y` is height above the
/// launch point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct State {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl State {
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.vx, self.vy]
    }

    pub fn from_array(y: [f64; 4]) -> Self {
        Self {
            x: y[0],
            y: y[1],
            vx: y[2],
            vy: y[3],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalParameters {
    /// m/s²
    pub gravity: f64,
    /// kg/m³
    pub air_density: f64,
    pub drag_coefficient: f64,
    /// m
    pub projectile_diameter: f64,
    /// kg
    pub projectile_mass: f64,
}

impl PhysicalParameters {
    pub fn frontal_area(&self) -> f64 {
        let radius = self.projectile_diameter / 2.0;
        PI * radius * radius
    }
}

/// Time derivative of `state` under gravity and quadratic drag, packed in the
/// same slots: `(vx, vy, ax, ay)`.
///
/// The drag force has magnitude `½ρ·Cd·A·v²` and opposes the velocity, so each
/// axis gets `½ρ·Cd·A·v` times its own velocity component.
pub fn derivative(params: &PhysicalParameters, state: &State) -> State {
    let speed = state.speed();
    let drag = 0.5 * params.air_density * params.drag_coefficient * params.frontal_area() * speed;
    State {
        x: state.vx,
        y: state.vy,
        vx: -drag * state.vx / params.projectile_mass,
        vy: -params.gravity - drag * state.vy / params.projectile_mass,
    }
}

/// The motion model seen through the solver's array interface.
pub struct DragFlight {
    pub params: PhysicalParameters,
}

impl OdeSystem<4> for DragFlight {
    fn rhs(&self, _t: f64, y: &[f64; 4]) -> [f64; 4] {
        derivative(&self.params, &State::from_array(*y)).to_array()
    }
}

/// Height above the launch level; zero at ground contact.
pub struct GroundContact;

impl EventFunction<4> for GroundContact {
    fn eval(&self, _t: f64, y: &[f64; 4]) -> f64 {
        y[1]
    }
}

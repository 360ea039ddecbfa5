use crate::core::motion::State;

/// Splits a launch speed at `angle_deg` above the horizontal into `(vx, vy)`.
pub fn velocity_components(speed_mps: f64, angle_deg: f64) -> (f64, f64) {
    let theta = angle_deg.to_radians();
    (speed_mps * theta.cos(), speed_mps * theta.sin())
}

/// Initial state at the origin.
pub fn initial_state(speed_mps: f64, angle_deg: f64) -> State {
    let (vx, vy) = velocity_components(speed_mps, angle_deg);
    State {
        x: 0.0,
        y: 0.0,
        vx,
        vy,
    }
}

/// Closed-form flight of the same launch without air, returning to launch
/// height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VacuumFlight {
    pub flight_time_s: f64,
    pub range_m: f64,
    pub apex_height_m: f64,
}

pub fn vacuum_flight(speed_mps: f64, angle_deg: f64, gravity: f64) -> Result<VacuumFlight, String> {
    if !speed_mps.is_finite() || !angle_deg.is_finite() || !gravity.is_finite() {
        return Err("Inputs must be finite numbers.".to_string());
    }
    if gravity <= 0.0 {
        return Err(format!(
            "No landing without downward gravity (g = {gravity})."
        ));
    }

    let (vx, vy) = velocity_components(speed_mps, angle_deg);
    let flight_time_s = (2.0 * vy / gravity).max(0.0);
    Ok(VacuumFlight {
        flight_time_s,
        range_m: vx * flight_time_s,
        apex_height_m: (vy * vy / (2.0 * gravity)).max(0.0),
    })
}

use crate::config::SimulationConfig;
use crate::core::launch::vacuum_flight;
use crate::core::trajectory::FlightSummary;

/// Console lines for one finished run.
pub fn report_lines(config: &SimulationConfig, summary: &FlightSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Speed at apex: {:.2} m/s", summary.apex_speed),
        format!("Speed at ground impact: {:.2} m/s", summary.impact_speed),
        format!("Time of flight: {:.2} s", summary.impact_time),
        format!("Horizontal distance: {:.2} m", summary.range),
    ];

    // Only meaningful when gravity points down; otherwise there is nothing to compare.
    if let Ok(vacuum) = vacuum_flight(
        config.initial_speed,
        config.launch_angle_degrees,
        config.gravity,
    ) {
        lines.push(format!(
            "Without drag: {:.2} s, {:.2} m",
            vacuum.flight_time_s, vacuum.range_m
        ));
    }

    lines
}

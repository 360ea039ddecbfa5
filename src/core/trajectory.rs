use tracing::{debug, info, warn};

use crate::config::{ApexEstimate, SimulationConfig};
use crate::core::launch;
use crate::core::motion::{DragFlight, GroundContact, State};
use crate::core::solver::{DormandPrince, EventDirection, SolverStats, Termination, Tolerances};
use crate::error::SimulationError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub t: f64,
    pub state: State,
}

/// Solver output from launch to the located ground impact.
///
/// Samples are the accepted solver steps, strictly increasing in time. The
/// first is the launch state and the last sits on `impact_time`.
#[derive(Clone, Debug)]
pub struct Trajectory {
    samples: Vec<Sample>,
    impact_time: f64,
    stats: SolverStats,
}

/// Kinematics derived once from a finished [`Trajectory`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightSummary {
    /// Highest sample (first one on ties).
    pub apex_index: usize,
    pub apex_time: f64,
    /// Height of the highest sample, whichever apex estimate is used.
    pub apex_height: f64,
    pub apex_speed: f64,
    pub impact_time: f64,
    pub impact_speed: f64,
    pub range: f64,
}

/// Runs one flight described by `config` until the projectile comes back down
/// to launch height.
///
/// Returns [`SimulationError::NoImpact`] if the descent through zero height
/// does not happen before `config.time_horizon`.
pub fn integrate(config: &SimulationConfig) -> Result<Trajectory, SimulationError> {
    config.validate()?;

    let system = DragFlight {
        params: config.physical_parameters(),
    };
    let launch_state = launch::initial_state(config.initial_speed, config.launch_angle_degrees);
    let tolerance = config.integration_tolerance;
    let solver = DormandPrince::new(Tolerances::new(tolerance, tolerance), config.max_steps);

    debug!(
        speed = config.initial_speed,
        angle_deg = config.launch_angle_degrees,
        horizon = config.time_horizon,
        tolerance,
        "integrating trajectory"
    );

    let solution = solver.integrate_to_event(
        &system,
        &GroundContact,
        EventDirection::Falling,
        0.0,
        launch_state.to_array(),
        config.time_horizon,
    )?;

    let impact_time = match solution.termination {
        Termination::Event(t) => t,
        Termination::Horizon => {
            warn!(
                horizon = config.time_horizon,
                "projectile still airborne at the end of the horizon"
            );
            return Err(SimulationError::NoImpact {
                horizon: config.time_horizon,
            });
        }
    };

    info!(
        impact_time,
        samples = solution.points.len(),
        accepted = solution.stats.accepted_steps,
        rejected = solution.stats.rejected_steps,
        evaluations = solution.stats.rhs_evaluations,
        "ground impact located"
    );

    Ok(Trajectory {
        samples: solution
            .points
            .into_iter()
            .map(|(t, y)| Sample {
                t,
                state: State::from_array(y),
            })
            .collect(),
        impact_time,
        stats: solution.stats,
    })
}

impl Trajectory {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn impact_time(&self) -> f64 {
        self.impact_time
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    fn last(&self) -> Sample {
        self.samples[self.samples.len() - 1]
    }

    /// Piecewise-linear interpolation of every state component between the two
    /// samples bracketing `t`. `None` outside the sampled span.
    pub fn interpolate(&self, t: f64) -> Option<State> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        if !(first.t..=last.t).contains(&t) {
            return None;
        }

        let idx = self.samples.partition_point(|s| s.t < t);
        if idx == 0 {
            return Some(first.state);
        }
        let lo = self.samples[idx - 1];
        let hi = self.samples[idx];
        let alpha = (t - lo.t) / (hi.t - lo.t);
        let lerp = |a: f64, b: f64| a + alpha * (b - a);

        Some(State {
            x: lerp(lo.state.x, hi.state.x),
            y: lerp(lo.state.y, hi.state.y),
            vx: lerp(lo.state.vx, hi.state.vx),
            vy: lerp(lo.state.vy, hi.state.vy),
        })
    }

    /// Index of the highest sample; the earliest one wins a tie.
    pub fn apex_index(&self) -> usize {
        self.samples
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(best, height), (i, s)| {
                if s.state.y > height {
                    (i, s.state.y)
                } else {
                    (best, height)
                }
            })
            .0
    }

    /// Time where the vertical velocity first turns from positive to
    /// non-positive, linearly interpolated between the bracketing samples.
    fn vertical_velocity_zero(&self) -> Option<f64> {
        self.samples.windows(2).find_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            if a.state.vy > 0.0 && b.state.vy <= 0.0 {
                let fraction = a.state.vy / (a.state.vy - b.state.vy);
                Some(a.t + fraction * (b.t - a.t))
            } else {
                None
            }
        })
    }

    pub fn summary(&self, apex_estimate: ApexEstimate) -> FlightSummary {
        let apex_index = self.apex_index();
        let apex_sample = self.samples[apex_index];

        let (apex_time, apex_state) = match apex_estimate {
            ApexEstimate::Sampled => (apex_sample.t, apex_sample.state),
            ApexEstimate::Interpolated => self
                .vertical_velocity_zero()
                .and_then(|t| self.interpolate(t).map(|state| (t, state)))
                .unwrap_or((apex_sample.t, apex_sample.state)),
        };

        let impact = self
            .interpolate(self.impact_time)
            .unwrap_or_else(|| self.last().state);

        FlightSummary {
            apex_index,
            apex_time,
            apex_height: apex_sample.state.y,
            apex_speed: apex_state.speed(),
            impact_time: self.impact_time,
            impact_speed: impact.speed(),
            range: impact.x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Sample, Trajectory, integrate};
    use crate::config::{ApexEstimate, SimulationConfig};
    use crate::core::motion::State;
    use crate::core::solver::SolverStats;
    use crate::error::SimulationError;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "actual={actual}, expected={expected}, tolerance={tolerance}"
        );
    }

    fn sample(t: f64, x: f64, y: f64, vx: f64, vy: f64) -> Sample {
        Sample {
            t,
            state: State { x, y, vx, vy },
        }
    }

    fn hand_built() -> Trajectory {
        Trajectory {
            samples: vec![
                sample(0.0, 0.0, 0.0, 100.0, 50.0),
                sample(1.0, 100.0, 45.0, 99.0, 40.0),
                sample(2.0, 200.0, 80.0, 98.0, 10.0),
                sample(3.0, 300.0, 80.0, 97.0, -10.0),
                sample(4.0, 400.0, 60.0, 96.0, -30.0),
                sample(4.5, 450.0, 0.0, 95.0, -40.0),
            ],
            impact_time: 4.5,
            stats: SolverStats::default(),
        }
    }

    #[test]
    fn interpolates_between_bracketing_samples() {
        let state = hand_built().interpolate(1.5).expect("inside the span");
        assert_close(state.x, 150.0, 1e-12);
        assert_close(state.y, 62.5, 1e-12);
        assert_close(state.vx, 98.5, 1e-12);
        assert_close(state.vy, 25.0, 1e-12);
    }

    #[test]
    fn interpolation_hits_samples_exactly() {
        let trajectory = hand_built();
        assert_eq!(trajectory.interpolate(0.0), Some(trajectory.samples[0].state));
        assert_eq!(trajectory.interpolate(4.5), Some(trajectory.samples[5].state));
    }

    #[test]
    fn interpolation_outside_the_span_is_none() {
        let trajectory = hand_built();
        assert!(trajectory.interpolate(-0.1).is_none());
        assert!(trajectory.interpolate(4.6).is_none());
    }

    #[test]
    fn apex_tie_goes_to_the_earlier_sample() {
        assert_eq!(hand_built().apex_index(), 2);
    }

    #[test]
    fn sampled_apex_reads_the_highest_sample() {
        let summary = hand_built().summary(ApexEstimate::Sampled);
        assert_eq!(summary.apex_time, 2.0);
        assert_close(summary.apex_speed, 98.0f64.hypot(10.0), 1e-12);
    }

    #[test]
    fn interpolated_apex_sits_on_the_vertical_velocity_zero() {
        let summary = hand_built().summary(ApexEstimate::Interpolated);
        assert_eq!(summary.apex_index, 2);
        assert_close(summary.apex_time, 2.5, 1e-12);
        assert_close(summary.apex_speed, 97.5, 1e-12);
        assert_close(summary.apex_height, 80.0, 1e-12);
    }

    #[test]
    fn interpolated_apex_keeps_the_highest_sampled_height() {
        let mut trajectory = hand_built();
        trajectory.samples[3] = sample(3.0, 300.0, 70.0, 97.0, -30.0);

        let summary = trajectory.summary(ApexEstimate::Interpolated);
        assert_close(summary.apex_time, 2.25, 1e-12);
        assert_close(summary.apex_height, 80.0, 1e-12);
        assert!(trajectory.interpolate(summary.apex_time).expect("inside the span").y < 80.0);
    }

    #[test]
    fn impact_kinematics_come_from_the_impact_time() {
        let summary = hand_built().summary(ApexEstimate::Sampled);
        assert_eq!(summary.impact_time, 4.5);
        assert_close(summary.impact_speed, 95.0f64.hypot(40.0), 1e-12);
        assert_close(summary.range, 450.0, 1e-12);
    }

    #[test]
    fn pistol_round_lands_before_its_vacuum_counterpart() {
        let trajectory = integrate(&SimulationConfig::default()).expect("run should succeed");
        let summary = trajectory.summary(ApexEstimate::Sampled);

        assert!(summary.impact_time.is_finite());
        assert!(summary.impact_time < 51.6);
        assert!(summary.impact_speed < 358.0);
        assert!(summary.apex_speed < 358.0);

        let last = trajectory.samples().last().expect("non-empty");
        assert_eq!(last.t, trajectory.impact_time());
        assert_close(last.state.y, 0.0, 1e-4);
    }

    #[test]
    fn short_horizon_is_a_missing_impact() {
        let config = SimulationConfig {
            time_horizon: 5.0,
            ..SimulationConfig::default()
        };
        let err = integrate(&config).expect_err("5 s is far too short");
        assert!(matches!(err, SimulationError::NoImpact { horizon } if horizon == 5.0));
    }

    #[test]
    fn zero_gravity_never_comes_down() {
        let config = SimulationConfig {
            gravity: 0.0,
            time_horizon: 20.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            integrate(&config),
            Err(SimulationError::NoImpact { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected_before_integrating() {
        let config = SimulationConfig {
            projectile_mass: 0.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            integrate(&config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }
}

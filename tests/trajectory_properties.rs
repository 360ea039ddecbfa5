use approx::{assert_abs_diff_eq, assert_relative_eq};
use rstest::{fixture, rstest};

use drag_trajectory::core::launch::{vacuum_flight, velocity_components};
use drag_trajectory::{ApexEstimate, SimulationConfig, SimulationError, integrate};

#[fixture]
fn pistol_round() -> SimulationConfig {
    SimulationConfig::default()
}

fn launch(speed: f64, angle: f64) -> SimulationConfig {
    SimulationConfig {
        initial_speed: speed,
        launch_angle_degrees: angle,
        time_horizon: 200.0,
        ..SimulationConfig::default()
    }
}

fn vacuum(speed: f64, angle: f64) -> SimulationConfig {
    SimulationConfig {
        drag_coefficient: 0.0,
        ..launch(speed, angle)
    }
}

#[rstest]
#[case(358.0, 45.0)]
#[case(358.0, 5.0)]
#[case(358.0, 85.0)]
#[case(40.0, 30.0)]
#[case(900.0, 60.0)]
fn samples_start_on_the_ground_and_move_forward_in_time(#[case] speed: f64, #[case] angle: f64) {
    let trajectory = integrate(&launch(speed, angle)).expect("run should succeed");
    let samples = trajectory.samples();

    assert!(samples.len() > 2);
    assert_eq!(samples[0].t, 0.0);
    assert_eq!(samples[0].state.y, 0.0);
    assert!(samples.windows(2).all(|pair| pair[1].t > pair[0].t));
    assert_eq!(
        samples.last().map(|s| s.t),
        Some(trajectory.impact_time())
    );
}

#[rstest]
#[case(1.0, 1.0)]
#[case(10.0, 0.1)]
#[case(358.0, 0.001)]
#[case(0.5, 30.0)]
fn short_shallow_hops_land_after_launch(#[case] speed: f64, #[case] angle: f64) {
    let (_, vy0) = velocity_components(speed, angle);
    let expected_time = 2.0 * vy0 / 9.81;

    let trajectory = integrate(&launch(speed, angle)).expect("run should succeed");
    assert!(trajectory.impact_time() > 0.0);
    assert!(trajectory.samples().len() >= 2);
    assert_relative_eq!(trajectory.impact_time(), expected_time, max_relative = 1e-2);

    let summary = integrate(&vacuum(speed, angle))
        .expect("run should succeed")
        .summary(ApexEstimate::Sampled);
    assert_abs_diff_eq!(summary.impact_time, expected_time, epsilon = 1e-7);
    assert_relative_eq!(summary.impact_speed, speed, max_relative = 1e-5);
}

#[rstest]
#[case(50.0, 45.0)]
#[case(358.0, 45.0)]
#[case(358.0, 20.0)]
#[case(120.0, 75.0)]
fn without_drag_the_closed_form_is_reproduced(#[case] speed: f64, #[case] angle: f64) {
    let config = vacuum(speed, angle);
    let summary = integrate(&config)
        .expect("run should succeed")
        .summary(ApexEstimate::Sampled);

    let (vx0, vy0) = velocity_components(speed, angle);
    let expected_time = 2.0 * vy0 / config.gravity;

    assert_relative_eq!(summary.impact_time, expected_time, max_relative = 1e-7);
    assert_relative_eq!(summary.range, vx0 * expected_time, max_relative = 1e-6);
    assert_relative_eq!(summary.impact_speed, speed, max_relative = 1e-6);

    let closed_form = vacuum_flight(speed, angle, config.gravity).expect("g > 0");
    assert_relative_eq!(summary.impact_time, closed_form.flight_time_s, max_relative = 1e-7);
}

#[rstest]
#[case(358.0, 45.0)]
#[case(358.0, 10.0)]
#[case(200.0, 80.0)]
#[case(30.0, 45.0)]
fn drag_never_returns_the_launch_speed(#[case] speed: f64, #[case] angle: f64) {
    let summary = integrate(&launch(speed, angle))
        .expect("run should succeed")
        .summary(ApexEstimate::Sampled);

    assert!(summary.impact_speed <= speed);
    assert!(summary.apex_speed <= speed);
}

#[rstest]
fn apex_sample_sits_on_the_vertical_velocity_sign_change(pistol_round: SimulationConfig) {
    let trajectory = integrate(&pistol_round).expect("run should succeed");
    let summary = trajectory.summary(ApexEstimate::Sampled);
    let samples = trajectory.samples();
    let i = summary.apex_index;

    assert!(i > 0 && i + 1 < samples.len());
    assert!(samples[i - 1].state.vy > 0.0);
    assert!(samples[i + 1].state.vy < 0.0);
    assert!(samples.iter().all(|s| s.state.y <= samples[i].state.y));
}

#[rstest]
fn pistol_round_scenario(pistol_round: SimulationConfig) {
    let summary = integrate(&pistol_round)
        .expect("run should succeed")
        .summary(pistol_round.apex_estimate);

    let vacuum_time = 2.0 * 358.0 * 45f64.to_radians().sin() / 9.81;
    assert_abs_diff_eq!(vacuum_time, 51.6, epsilon = 0.05);

    assert!(summary.impact_time.is_finite());
    assert!(summary.impact_time > 0.0);
    assert!(summary.impact_time < vacuum_time);
    assert!(summary.impact_speed < 358.0);
    assert!(summary.range > 0.0);
}

#[rstest]
fn interpolated_apex_agrees_with_the_sampled_one(pistol_round: SimulationConfig) {
    let trajectory = integrate(&pistol_round).expect("run should succeed");
    let sampled = trajectory.summary(ApexEstimate::Sampled);
    let interpolated = trajectory.summary(ApexEstimate::Interpolated);

    assert_eq!(sampled.apex_index, interpolated.apex_index);
    assert_relative_eq!(sampled.apex_speed, interpolated.apex_speed, max_relative = 5e-2);
    assert_eq!(sampled.impact_speed, interpolated.impact_speed);
}

#[rstest]
fn tighter_tolerance_moves_the_impact_time_very_little(pistol_round: SimulationConfig) {
    let coarse = SimulationConfig {
        integration_tolerance: 1e-6,
        ..pistol_round.clone()
    };
    let fine = SimulationConfig {
        integration_tolerance: 1e-10,
        ..pistol_round
    };

    let t_coarse = integrate(&coarse).expect("coarse run").impact_time();
    let t_fine = integrate(&fine).expect("fine run").impact_time();
    assert_abs_diff_eq!(t_coarse, t_fine, epsilon = 1e-3);
}

#[rstest]
fn horizon_shorter_than_the_flight_is_fatal(pistol_round: SimulationConfig) {
    let impact_time = integrate(&pistol_round)
        .expect("run should succeed")
        .impact_time();

    let truncated = SimulationConfig {
        time_horizon: impact_time * 0.9,
        ..pistol_round
    };
    match integrate(&truncated) {
        Err(SimulationError::NoImpact { horizon }) => assert_eq!(horizon, impact_time * 0.9),
        other => panic!("expected NoImpact, got {other:?}"),
    }
}

#[rstest]
#[case(0.0)]
#[case(-9.81)]
fn non_physical_gravity_never_lands(pistol_round: SimulationConfig, #[case] gravity: f64) {
    let config = SimulationConfig {
        gravity,
        time_horizon: 30.0,
        ..pistol_round
    };
    assert!(matches!(
        integrate(&config),
        Err(SimulationError::NoImpact { .. })
    ));
}

#[rstest]
fn exhausted_step_budget_is_reported(pistol_round: SimulationConfig) {
    let config = SimulationConfig {
        max_steps: 10,
        ..pistol_round
    };
    let err = integrate(&config).expect_err("ten steps cannot cover the flight");
    assert!(matches!(err, SimulationError::MaxStepsExceeded { limit: 10 }));
    assert!(err.to_string().contains("10 steps"));
}

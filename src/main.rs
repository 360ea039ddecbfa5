use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing::info;

use drag_trajectory::logging::{LogConfig, LogFormat, init_logging, parse_log_level};
use drag_trajectory::plot::{file_stamp, render_plots};
use drag_trajectory::report::report_lines;
use drag_trajectory::{SimulationConfig, integrate};

/// Flight of a projectile under gravity and quadratic air drag.
#[derive(Debug, Parser)]
#[command(name = "drag_trajectory", version, about)]
struct Cli {
    /// YAML file with simulation parameters; omitted fields keep their defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the launch speed (m/s).
    #[arg(long, value_name = "M/S")]
    speed: Option<f64>,

    /// Override the launch angle (degrees above horizontal).
    #[arg(long, value_name = "DEG")]
    angle: Option<f64>,

    /// Directory that receives the PNG plots.
    #[arg(short, long, value_name = "DIR", default_value = "plots")]
    output_dir: PathBuf,

    /// Print the report only.
    #[arg(long)]
    no_plot: bool,

    /// trace, debug, info, warn or error. RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// compact or json.
    #[arg(long, default_value = "compact", value_parser = |s: &str| s.parse::<LogFormat>())]
    log_format: LogFormat,
}

fn load_config(cli: &Cli) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(speed) = cli.speed {
        config.initial_speed = speed;
    }
    if let Some(angle) = cli.angle {
        config.launch_angle_degrees = angle;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LogConfig {
        level: parse_log_level(&cli.log_level),
        format: cli.log_format,
    })?;

    let config = load_config(&cli)?;
    let trajectory = integrate(&config)?;
    let summary = trajectory.summary(config.apex_estimate);

    for line in report_lines(&config, &summary) {
        println!("{line}");
    }

    if !cli.no_plot {
        let stamp = file_stamp(&Local::now());
        let files = render_plots(&trajectory, &summary, &cli.output_dir, &stamp)?;
        info!(
            position = %files.position.display(),
            trajectory = %files.trajectory.display(),
            "plots written"
        );
    }

    Ok(())
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, load_config};
    use drag_trajectory::logging::LogFormat;

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::try_parse_from(["drag_trajectory"]).expect("parse should succeed");
        assert!(cli.config.is_none());
        assert!(!cli.no_plot);
        assert_eq!(cli.log_format, LogFormat::Compact);

        let config = load_config(&cli).expect("defaults should load");
        assert_eq!(config.initial_speed, 358.0);
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cli = Cli::try_parse_from(["drag_trajectory", "--speed", "120", "--angle", "30"])
            .expect("parse should succeed");
        let config = load_config(&cli).expect("overrides should validate");

        assert_eq!(config.initial_speed, 120.0);
        assert_eq!(config.launch_angle_degrees, 30.0);
        assert_eq!(config.gravity, 9.81);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let cli = Cli::try_parse_from(["drag_trajectory", "--angle", "120"])
            .expect("parse should succeed");
        let err = load_config(&cli).expect_err("angle out of range");
        assert!(err.to_string().contains("launch_angle_degrees"));
    }

    #[test]
    fn unknown_log_format_fails_to_parse() {
        assert!(Cli::try_parse_from(["drag_trajectory", "--log-format", "xml"]).is_err());
    }
}

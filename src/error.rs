use std::path::PathBuf;

use thiserror::Error;

/// Problems loading or validating a [`SimulationConfig`](crate::SimulationConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Fatal outcomes of a trajectory run. None of these carry a partial result.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error(
        "no ground impact within the {horizon} s time horizon; enlarge time_horizon or check gravity"
    )]
    NoImpact { horizon: f64 },

    #[error("solver did not converge within {limit} steps")]
    MaxStepsExceeded { limit: usize },

    #[error("step size underflow at t = {t} s (h = {h:e}); tolerance unreachable")]
    StepSizeUnderflow { t: f64, h: f64 },

    #[error("state became non-finite at t = {t} s")]
    NonFiniteState { t: f64 },
}

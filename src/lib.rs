//! Flight of a drag-affected projectile launched from level ground.
//!
//! The [`core`] module holds the numerics: the motion model, an adaptive
//! Dormand–Prince integrator with terminal event location, and the
//! post-processing that derives apex and impact kinematics. Everything else
//! (configuration, logging, console report, plots) feeds it or consumes its
//! output.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod plot;
pub mod report;

pub use config::{ApexEstimate, SimulationConfig};
pub use crate::core::trajectory::{FlightSummary, Sample, Trajectory, integrate};
pub use error::{ConfigError, SimulationError};

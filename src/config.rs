use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::motion::PhysicalParameters;
use crate::error::ConfigError;

/// How the speed at the apex is read off the sample sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApexEstimate {
    /// Speed of the highest sample, with no interpolation.
    #[default]
    Sampled,
    /// Speed interpolated at the zero crossing of the vertical velocity.
    Interpolated,
}

/// Everything one run needs. Every field may be omitted from a YAML file;
/// missing fields fall back to the 9 mm FMJ pistol round in [`Default`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Muzzle speed (m/s).
    pub initial_speed: f64,
    /// Elevation above the horizontal (degrees).
    pub launch_angle_degrees: f64,
    /// kg
    pub projectile_mass: f64,
    /// m
    pub projectile_diameter: f64,
    pub drag_coefficient: f64,
    /// kg/m³
    pub air_density: f64,
    /// m/s²
    pub gravity: f64,
    /// Upper bound of the integration interval (s). Must exceed the flight time.
    pub time_horizon: f64,
    /// Used as both absolute and relative tolerance, and as the time tolerance
    /// of the impact root search.
    pub integration_tolerance: f64,
    /// Accepted plus rejected steps the solver may take before giving up.
    pub max_steps: usize,
    pub apex_estimate: ApexEstimate,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_speed: 358.0,
            launch_angle_degrees: 45.0,
            projectile_mass: 0.008,
            projectile_diameter: 0.00902,
            drag_coefficient: 0.295,
            air_density: 1.225,
            gravity: 9.81,
            time_horizon: 60.0,
            integration_tolerance: 1e-8,
            max_steps: 200_000,
            apex_estimate: ApexEstimate::Sampled,
        }
    }
}

impl SimulationConfig {
    /// Loads and validates a YAML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects values no run can make sense of. Gravity only has to be finite:
    /// a trajectory that never comes down is reported by the integrator as a
    /// missing impact, not here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("initial_speed", self.initial_speed),
            ("launch_angle_degrees", self.launch_angle_degrees),
            ("projectile_mass", self.projectile_mass),
            ("projectile_diameter", self.projectile_diameter),
            ("drag_coefficient", self.drag_coefficient),
            ("air_density", self.air_density),
            ("gravity", self.gravity),
            ("time_horizon", self.time_horizon),
            ("integration_tolerance", self.integration_tolerance),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "{name} must be a finite number, got {value}"
            )));
        }

        let positive = [
            ("initial_speed", self.initial_speed),
            ("projectile_mass", self.projectile_mass),
            ("projectile_diameter", self.projectile_diameter),
            ("time_horizon", self.time_horizon),
            ("integration_tolerance", self.integration_tolerance),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "{name} must be positive, got {value}"
            )));
        }

        if self.drag_coefficient < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "drag_coefficient cannot be negative, got {}",
                self.drag_coefficient
            )));
        }
        if self.air_density < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "air_density cannot be negative, got {}",
                self.air_density
            )));
        }
        if self.launch_angle_degrees <= 0.0 || self.launch_angle_degrees > 90.0 {
            return Err(ConfigError::Invalid(format!(
                "launch_angle_degrees must lie in (0, 90], got {}",
                self.launch_angle_degrees
            )));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be at least 1".to_string()));
        }

        Ok(())
    }

    pub fn physical_parameters(&self) -> PhysicalParameters {
        PhysicalParameters {
            gravity: self.gravity,
            air_density: self.air_density,
            drag_coefficient: self.drag_coefficient,
            projectile_diameter: self.projectile_diameter,
            projectile_mass: self.projectile_mass,
        }
    }
}

//! Simulation input for the VOF and slope limiter kernels.
//!
//! The input is a YAML document; every section and key is optional:
//!
//! ```yaml
//! slope_limiter:
//!   c:
//!     method: HierarchicalTaylor
//!     enforce_bounds: true
//!     skip_boundaries: [inlet]
//!     filter: nofilter
//!     plot: false
//! convection:
//!   c:
//!     convection_scheme: CICSAM
//! multiphase_solver:
//!   compression_factor: 0.5
//! physical_properties:
//!   rho0: 1000.0
//!   rho1: 1.0
//!   nu0: 1.0e-6
//!   nu1: 1.5e-5
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::convection::{ConvectionScheme, DEFAULT_CONVECTION_SCHEME};
use crate::error::ConfigError;
use crate::solver::limiters::{DEFAULT_FILTER, DEFAULT_LIMITER, FilterMethod, LimiterMethod};

/// Complete simulation input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationInput {
    /// Slope limiter per field name
    #[serde(default)]
    pub slope_limiter: BTreeMap<String, LimiterConfig>,

    /// Convection scheme per field name
    #[serde(default)]
    pub convection: BTreeMap<String, ConvectionConfig>,

    /// Multiphase solver settings
    #[serde(default)]
    pub multiphase_solver: MultiphaseConfig,

    /// Properties of the two fluids
    #[serde(default)]
    pub physical_properties: PhysicalProperties,
}

impl SimulationInput {
    /// Parse the input from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read the input from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Limiter settings of a field, defaults when the field has no section.
    pub fn limiter(&self, field: &str) -> LimiterConfig {
        self.slope_limiter.get(field).cloned().unwrap_or_default()
    }

    /// Convection settings of a field, defaults when the field has no section.
    pub fn convection(&self, field: &str) -> ConvectionConfig {
        self.convection.get(field).cloned().unwrap_or_default()
    }

    /// Check every name and value before the time loop starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, limiter) in &self.slope_limiter {
            limiter.method()?;
            limiter.filter()?;
            if limiter.skip_boundaries.iter().any(|b| b.is_empty()) {
                return Err(ConfigError::invalid_value(
                    format!("slope_limiter/{}/skip_boundaries", field),
                    "boundary names must not be empty",
                ));
            }
        }
        for convection in self.convection.values() {
            convection.scheme()?;
        }
        self.multiphase_solver.validate()?;
        self.physical_properties.validate()?;
        Ok(())
    }
}

/// Slope limiter settings of one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Limiter name, `None` when not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Clamp into the global bounds (OnlyBound)
    #[serde(default)]
    pub enforce_bounds: bool,

    /// Boundary regions whose adjacent cells are not limited
    #[serde(default)]
    pub skip_boundaries: Vec<String>,

    /// Post-processing filter
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Export the limiter diagnostic fields
    #[serde(default)]
    pub plot: bool,
}

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            method: None,
            enforce_bounds: false,
            skip_boundaries: Vec::new(),
            filter: default_filter(),
            plot: false,
        }
    }
}

impl LimiterConfig {
    /// Name of the selected limiter.
    pub fn method_name(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_LIMITER)
    }

    /// The selected limiter.
    pub fn method(&self) -> Result<LimiterMethod, ConfigError> {
        LimiterMethod::from_name(self.method_name())
    }

    /// The selected filter.
    pub fn filter(&self) -> Result<FilterMethod, ConfigError> {
        FilterMethod::from_name(&self.filter)
    }
}

/// Convection settings of one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvectionConfig {
    #[serde(default = "default_convection_scheme")]
    pub convection_scheme: String,
}

fn default_convection_scheme() -> String {
    DEFAULT_CONVECTION_SCHEME.to_string()
}

impl Default for ConvectionConfig {
    fn default() -> Self {
        Self {
            convection_scheme: default_convection_scheme(),
        }
    }
}

impl ConvectionConfig {
    /// The selected scheme.
    pub fn scheme(&self) -> Result<ConvectionScheme, ConfigError> {
        ConvectionScheme::from_name(&self.convection_scheme)
    }
}

/// Multiphase solver settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiphaseConfig {
    /// Strength of the interface compression, 0 disables it
    #[serde(default)]
    pub compression_factor: f64,
}

impl MultiphaseConfig {
    /// Check the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.compression_factor.is_finite() || self.compression_factor < 0.0 {
            return Err(ConfigError::invalid_value(
                "multiphase_solver/compression_factor",
                format!("must be finite and >= 0, got {}", self.compression_factor),
            ));
        }
        Ok(())
    }
}

/// Density and kinematic viscosity of the two fluids.
///
/// Fluid 0 fills the domain where the colour function is 1, fluid 1 where
/// it is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperties {
    #[serde(default = "default_rho0")]
    pub rho0: f64,
    #[serde(default = "default_rho1")]
    pub rho1: f64,
    #[serde(default = "default_nu0")]
    pub nu0: f64,
    #[serde(default = "default_nu1")]
    pub nu1: f64,
}

fn default_rho0() -> f64 {
    1000.0
}
fn default_rho1() -> f64 {
    1.0
}
fn default_nu0() -> f64 {
    1.0e-6
}
fn default_nu1() -> f64 {
    1.5e-5
}

impl Default for PhysicalProperties {
    fn default() -> Self {
        Self {
            rho0: default_rho0(),
            rho1: default_rho1(),
            nu0: default_nu0(),
            nu1: default_nu1(),
        }
    }
}

impl PhysicalProperties {
    /// Check that every property is positive and finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("rho0", self.rho0),
            ("rho1", self.rho1),
            ("nu0", self.nu0),
            ("nu1", self.nu1),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid_value(
                    format!("physical_properties/{}", key),
                    format!("must be finite and > 0, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

//! Interface-capturing convection schemes for the VOF colour function.
//!
//! Schemes form a closed set selected by name when the simulation input is
//! read:
//!
//! | name     | scheme                                              |
//! |----------|-----------------------------------------------------|
//! | `Upwind` | first order upwind, blending factor 0 everywhere     |
//! | `CICSAM` | Hyper-C / Ultimate-Quickest blend (see [`cicsam`])  |
//! | `HRIC`   | accepted as another name for `CICSAM`               |

pub mod cicsam;
mod blending;
mod velocity;

pub use blending::{BlendingStats, VofBlending};
pub use cicsam::{BlendingViolation, FacetStencil, cicsam_blending};
pub use velocity::{UniformVelocity, VelocityField, max_velocity_divergence};

use crate::error::ConfigError;

/// Scheme used when the input does not name one.
pub const DEFAULT_CONVECTION_SCHEME: &str = "HRIC";

/// Known scheme names with their variant and description.
pub const CONVECTION_SCHEMES: &[(&str, ConvectionScheme, &str)] = &[
    ("Upwind", ConvectionScheme::Upwind, "First order upwind"),
    (
        "CICSAM",
        ConvectionScheme::Cicsam,
        "Compressive Interface Capturing Scheme for Arbitrary Meshes",
    ),
    (
        "HRIC",
        ConvectionScheme::Cicsam,
        "High Resolution Interface Capturing (CICSAM blending)",
    ),
];

/// Interface-capturing convection scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConvectionScheme {
    /// Pure upwind
    Upwind,
    /// CICSAM blending
    #[default]
    Cicsam,
}

impl ConvectionScheme {
    /// Look up a scheme by its input name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        CONVECTION_SCHEMES
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|&(_, scheme, _)| scheme)
            .ok_or_else(|| {
                let names: Vec<&str> = CONVECTION_SCHEMES.iter().map(|(n, _, _)| *n).collect();
                ConfigError::unknown_name("Convection scheme", name, &names)
            })
    }

    /// Canonical name of the scheme.
    pub fn name(&self) -> &'static str {
        match self {
            ConvectionScheme::Upwind => "Upwind",
            ConvectionScheme::Cicsam => "CICSAM",
        }
    }
}

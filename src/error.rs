//! Error types for configuration and mesh construction.
//!
//! Numerical invariant violations inside the kernels are not represented
//! here: they are logged with full context and then abort via `panic!`.

use thiserror::Error;

/// Errors detected while reading or validating the simulation input.
///
/// All of these are reported before the time loop starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A named option (limiter method, convection scheme, filter) is unknown.
    #[error("{kind} \"{name}\" not found. Available: {}", available.join(", "))]
    UnknownName {
        kind: &'static str,
        name: String,
        available: Vec<String>,
    },

    /// The chosen method does not support the polynomial degree of the field.
    #[error("{method} does not support degree {degree} (supported: {supported:?})")]
    UnsupportedDegree {
        method: &'static str,
        degree: usize,
        supported: &'static [usize],
    },

    /// A value is out of its admissible range.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// The YAML document could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The input file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create an unknown-name error from a static name table.
    pub fn unknown_name(kind: &'static str, name: impl Into<String>, available: &[&str]) -> Self {
        Self::UnknownName {
            kind,
            name: name.into(),
            available: available.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create an invalid-value error.
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Errors detected while building a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A cell references a vertex that does not exist.
    #[error("Cell {cell} references vertex {vertex}, but the mesh has {n_vertices} vertices")]
    InvalidVertex {
        cell: usize,
        vertex: usize,
        n_vertices: usize,
    },

    /// A cell has (numerically) zero area.
    #[error("Cell {cell} is degenerate (area = {area:e})")]
    DegenerateCell { cell: usize, area: f64 },

    /// A facet is shared by more than two cells.
    #[error("Facet ({0}, {1}) is shared by more than two cells")]
    NonManifoldFacet(usize, usize),

    /// The ghost offset lies beyond the number of cells.
    #[error("Ghost offset {offset} exceeds the number of cells {n_cells}")]
    InvalidGhostOffset { offset: usize, n_cells: usize },
}

//! Multiphase model based on a volume of fluid colour function.

mod compression;
mod vof;

pub use compression::{CompressionReport, compress};
pub use vof::{BlendedAlgebraicVof, COLOUR_FIELD, ColourStats, colour_stats};

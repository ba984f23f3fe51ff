//! Discontinuous Lagrange function spaces on triangles.
//!
//! This module provides:
//! - [`DofMap`]: dof numbering, dof coordinates and dof neighbour tables
//! - [`TaylorBasis`]: per-cell Lagrange ↔ Taylor transformations

mod dofmap;
mod taylor;

pub use dofmap::{DofMap, DofNeighbours, DofNode};
pub use taylor::{TaylorBasis, second_moments, taylor_modes};

//! Boundary conditions and boundary regions for limited scalar fields.
//!
//! # Overview
//!
//! | Item | Description |
//! |------|-------------|
//! | [`BoundaryConditionProvider`] | Condition of a field on a region |
//! | [`BoundaryConditions`] | In-memory provider |
//! | [`DofRegionMarks`] | Boundary regions touched by each dof |
//! | [`mark_cell_layers`] | Cells next to selected boundary regions |
//!
//! Regions are numbered in the order they were named on the mesh, see
//! [`TriMesh2D::mark_boundary`](crate::mesh::TriMesh2D::mark_boundary).

mod conditions;
mod regions;

pub use conditions::{
    BcExpression, BcValue, BoundaryCondition, BoundaryConditionProvider, BoundaryConditions,
};
pub use regions::{ALL_REGIONS, DofRegionMarks, mark_cell_layers, select_regions};

//! Mesh representation.
//!
//! Provides the topology interface the kernels consume and an in-memory
//! triangulation implementing it:
//! - [`MeshTopology`]: read-only cell/facet/vertex queries
//! - [`TriMesh2D`]: triangular mesh with owned and ghost cells
//! - [`CellInfo`] / [`FacetInfo`]: cached geometry

mod geometry;
mod topology;
mod tri_mesh;

pub use geometry::{CellInfo, FacetInfo};
pub use topology::{FacetCells, MeshTopology, Point2, dot, norm, sub};
pub use tri_mesh::{Facet, TriMesh2D};

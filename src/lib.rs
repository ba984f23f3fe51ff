//! # dg-vof
//!
//! Kernels for discontinuous Galerkin two-phase flow solvers using a
//! volume of fluid colour function.
//!
//! This crate provides:
//! - Mesh topology of triangular meshes with owned and ghost cells
//! - Discontinuous Lagrange dof maps and Taylor basis transformations
//! - Least-squares gradient reconstruction
//! - CICSAM facet blending for algebraic VOF advection
//! - Interface compression and the blended algebraic VOF model
//! - Slope limiters (OnlyBound, nodal, hierarchical Taylor) with boundary
//!   region handling
//! - YAML simulation input
//!
//! # Example
//!
//! ```
//! use dg_vof::{DofMap, LimiterContext, SimulationInput, SlopeLimiter, TriMesh2D, create_slope_limiter};
//!
//! let mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 4, 4);
//! let dofmap = DofMap::new(&mesh, 1).unwrap();
//! let input = SimulationInput::from_yaml_str("slope_limiter: {c: {method: nodal}}").unwrap();
//!
//! let mut limiter = create_slope_limiter(&mesh, &dofmap, "c", &input.limiter("c"), &[]).unwrap();
//! let mut values = vec![0.5; dofmap.num_dofs()];
//! limiter.run(&mut values, &LimiterContext::default());
//! assert!(values.iter().all(|&v| v == 0.5));
//! ```

pub mod basis;
pub mod boundary;
pub mod config;
pub mod convection;
pub mod error;
pub mod gradient;
pub mod mesh;
pub mod multiphase;
pub mod parallel;
pub mod solver;
pub mod types;

// Re-export main types for convenience
pub use basis::{DofMap, DofNeighbours, TaylorBasis};
pub use boundary::{
    BcValue, BoundaryCondition, BoundaryConditionProvider, BoundaryConditions, DofRegionMarks,
};
pub use config::{LimiterConfig, PhysicalProperties, SimulationInput};
pub use convection::{
    BlendingStats, ConvectionScheme, UniformVelocity, VelocityField, VofBlending,
    cicsam_blending, max_velocity_divergence,
};
pub use error::{ConfigError, MeshError};
pub use gradient::GradientReconstructor;
pub use mesh::{FacetCells, MeshTopology, Point2, TriMesh2D};
pub use multiphase::{BlendedAlgebraicVof, ColourStats, CompressionReport, compress};
pub use parallel::{Communicator, SerialCommunicator};
pub use solver::{
    BasicNodalLimiter, FieldLimiter, HierarchicalTaylorLimiter, LimiterContext, OnlyBoundLimiter,
    SlopeLimiter, create_slope_limiter,
};

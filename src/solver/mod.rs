//! Solver components operating on DG fields.
//!
//! # Submodules
//!
//! - [`limiters`]: Slope limiters for scalar DG fields
//!
//! # Limiter Traits
//!
//! The [`SlopeLimiter`] trait provides a generic interface for slope
//! limiters, selected at runtime by name:
//!
//! - [`DoNothingLimiter`]: No limiting
//! - [`OnlyBoundLimiter`]: Clamp into global bounds
//! - [`BasicNodalLimiter`]: Vertex clamping with average restoration
//! - [`HierarchicalTaylorLimiter`]: Taylor-basis derivative limiting
//! - [`StandardSlopeLimiter`]: Enum for zero-cost dispatch

pub mod limiters;

pub use limiters::{
    BasicNodalLimiter, DoNothingLimiter, FieldLimiter, FilterMethod, HierarchicalTaylorLimiter,
    LimiterContext, LimiterMethod, OnlyBoundLimiter, SlopeLimiter, StandardSlopeLimiter,
    create_slope_limiter,
};

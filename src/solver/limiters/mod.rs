//! Slope limiters for scalar DG fields.
//!
//! Limiters keep DG1/DG2 fields free of new local extrema while leaving the
//! cell averages untouched.
//!
//! - [`SlopeLimiter`]: Trait for slope limiters
//! - [`DoNothingLimiter`], [`OnlyBoundLimiter`], [`BasicNodalLimiter`],
//!   [`HierarchicalTaylorLimiter`]: Concrete implementations
//! - [`StandardSlopeLimiter`]: Enum dispatch over the built-in limiters
//! - [`create_slope_limiter`]: Build the limiter of a field from its input
//! - [`LimiterBoundaryConditions`]: Boundary values seen by the limiters

mod boundary;
mod hierarchical_taylor;
mod nodal;
mod standard;
mod traits;

// Traits
pub use traits::{BoundsSource, BoxedSlopeLimiter, DiagnosticField, LimiterContext, SlopeLimiter};

// Boundary handling
pub use boundary::{DofBc, LimiterBoundaryConditions};

// Limiters
pub use hierarchical_taylor::HierarchicalTaylorLimiter;
pub use nodal::BasicNodalLimiter;

// Name tables, enum and factory
pub use standard::{
    DEFAULT_FILTER, DEFAULT_LIMITER, DoNothingLimiter, FILTER_METHODS, FieldLimiter, FilterMethod,
    LIMITER_METHODS, LimiterMethod, OnlyBoundLimiter, StandardSlopeLimiter, create_slope_limiter,
};

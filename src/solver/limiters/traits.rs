//! Trait definitions for slope limiters.

use log::error;

use crate::basis::DofMap;
use crate::boundary::BoundaryConditionProvider;
use crate::parallel::{Communicator, SerialCommunicator};
use crate::types::CellIndex;

/// Context provided to limiter runs.
#[derive(Clone, Copy)]
pub struct LimiterContext<'a> {
    /// Global reductions
    pub comm: &'a dyn Communicator,
    /// Boundary conditions of the limited fields
    pub bcs: Option<&'a dyn BoundaryConditionProvider>,
}

impl<'a> std::fmt::Debug for LimiterContext<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimiterContext")
            .field("rank", &self.comm.rank())
            .field("size", &self.comm.size())
            .field("has_bcs", &self.bcs.is_some())
            .finish()
    }
}

impl<'a> LimiterContext<'a> {
    /// Create a context without boundary conditions.
    pub fn new(comm: &'a dyn Communicator) -> Self {
        Self { comm, bcs: None }
    }

    /// Create a context with boundary conditions.
    pub fn with_bcs(comm: &'a dyn Communicator, bcs: &'a dyn BoundaryConditionProvider) -> Self {
        Self {
            comm,
            bcs: Some(bcs),
        }
    }
}

impl Default for LimiterContext<'static> {
    fn default() -> Self {
        Self::new(&SerialCommunicator)
    }
}

/// Where the global bounds of a field come from.
#[derive(Clone, Copy, Debug)]
pub enum BoundsSource<'a> {
    /// Minimum and maximum of a field over all processes
    Field(&'a [f64]),
    /// Explicit bounds
    Range(f64, f64),
}

/// A named per-cell auxiliary output of a limiter.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticField<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
}

/// Trait for slope limiters of scalar DG fields.
///
/// # Implementation Notes
///
/// - `run` reads the field at the start of the call and writes the limited
///   values back before returning
/// - Only owned cells are written
/// - Within one call, neighbour data is read from a snapshot taken at the
///   start of the call
pub trait SlopeLimiter: Send + Sync {
    /// Limit the dof values in place.
    ///
    /// # Arguments
    /// * `values` - dof values of the field, ghosts included
    /// * `ctx` - Communicator and boundary conditions
    fn run(&mut self, values: &mut [f64], ctx: &LimiterContext);

    /// Name the limiter is selected by.
    fn name(&self) -> &'static str;

    /// Whether this limiter modifies slopes.
    fn is_active(&self) -> bool {
        true
    }

    /// Capture the bounds enforced on every later run.
    ///
    /// Limiters that do not enforce bounds ignore the call and return `None`.
    fn set_global_bounds(&mut self, _source: BoundsSource<'_>, _comm: &dyn Communicator) -> Option<(f64, f64)> {
        None
    }

    /// The captured global bounds, if any.
    fn global_bounds(&self) -> Option<(f64, f64)> {
        None
    }

    /// Auxiliary per-cell fields (limiting factors, exceedance).
    fn diagnostics(&self) -> Vec<DiagnosticField<'_>> {
        Vec::new()
    }
}

/// Type alias for boxed limiter (runtime polymorphism).
pub type BoxedSlopeLimiter = Box<dyn SlopeLimiter>;

/// Abort on a non-finite dof value or cell average of a limiter input.
///
/// Ghost cells are scanned too, their values enter the neighbour bounds.
pub(crate) fn assert_finite_field(limiter: &str, dofmap: &DofMap, values: &[f64]) {
    for cell in CellIndex::iter(dofmap.num_cells()) {
        for dof in dofmap.cell_dofs(cell) {
            if !values[dof].is_finite() {
                error!(
                    "{} limiter: non-finite value {} in dof {} of cell {}",
                    limiter, values[dof], dof, cell
                );
                panic!("{} limiter: non-finite value in dof {}", limiter, dof);
            }
        }
        let average = dofmap.cell_average(values, cell);
        if !average.is_finite() {
            error!("{} limiter: non-finite average {} of cell {}", limiter, average, cell);
            panic!("{} limiter: non-finite average in cell {}", limiter, cell);
        }
    }
}

//! Basic nodal slope limiter for DG1 fields.
//!
//! Every vertex value of a cell is clamped into the range of the cell
//! averages around that vertex. When clamping moves the cell average, the
//! difference is spread over the vertices on the side of the average that
//! can absorb it, so the average is restored exactly.
//!
//! The largest signed clamping distance per cell is kept as the exceedance
//! diagnostic.

use log::{debug, error};

use super::FilterMethod;
use super::boundary::{DofBc, LimiterBoundaryConditions, dof_bounds};
use super::traits::{DiagnosticField, LimiterContext, SlopeLimiter, assert_finite_field};
use crate::basis::{DofMap, DofNeighbours};
use crate::error::ConfigError;
use crate::mesh::MeshTopology;
use crate::parallel::{Communicator, global_min_max};
use crate::types::CellIndex;

/// Vertex-based limiter with average-restoring redistribution.
#[derive(Clone, Debug)]
pub struct BasicNodalLimiter {
    dofmap: DofMap,
    neighbours: DofNeighbours,
    skip_cells: Vec<bool>,
    bcs: LimiterBoundaryConditions,
    filter: FilterMethod,
    /// Global (min, max) of the field at the first filter call
    filter_cache: Option<(f64, f64)>,
    exceedance: Vec<f64>,
    exceedance_name: String,
}

impl BasicNodalLimiter {
    /// Polynomial degrees this limiter supports.
    pub const SUPPORTED_DEGREES: &'static [usize] = &[1];

    /// Create the limiter for a DG1 field.
    ///
    /// `skip_cells` has one entry per cell; flagged cells are left untouched.
    pub fn new<M: MeshTopology + ?Sized>(
        mesh: &M,
        dofmap: &DofMap,
        field_name: &str,
        skip_cells: Vec<bool>,
        bcs: LimiterBoundaryConditions,
        filter: FilterMethod,
    ) -> Result<Self, ConfigError> {
        if !Self::SUPPORTED_DEGREES.contains(&dofmap.degree()) {
            return Err(ConfigError::UnsupportedDegree {
                method: "nodal",
                degree: dofmap.degree(),
                supported: Self::SUPPORTED_DEGREES,
            });
        }
        assert_eq!(skip_cells.len(), dofmap.num_cells());

        Ok(Self {
            dofmap: dofmap.clone(),
            neighbours: dofmap.dof_neighbours(mesh),
            skip_cells,
            bcs,
            filter,
            filter_cache: None,
            exceedance: vec![0.0; dofmap.num_cells()],
            exceedance_name: format!("SlopeLimiterExceedance_{}", field_name),
        })
    }

    /// Signed exceedance of every cell from the last run.
    #[inline]
    pub fn exceedance(&self) -> &[f64] {
        &self.exceedance
    }

    /// The post-processing filter.
    #[inline]
    pub fn filter(&self) -> FilterMethod {
        self.filter
    }

    /// Bounds captured by the first `minmax` filter call.
    #[inline]
    pub fn filter_cache(&self) -> Option<(f64, f64)> {
        self.filter_cache
    }

    /// Boundary conditions of the limited field.
    pub fn boundary_conditions_mut(&mut self) -> &mut LimiterBoundaryConditions {
        &mut self.bcs
    }

    /// Limit all owned cells, returns the number of modified cells.
    fn limit_cells(&mut self, values: &mut [f64], dof_bcs: &[DofBc]) -> usize {
        let averages = self.dofmap.cell_averages(values);
        let mut n_limited = 0;

        for cell in CellIndex::iter(self.dofmap.num_owned_cells()) {
            let c = cell.get();
            if self.skip_cells[c] {
                self.exceedance[c] = 0.0;
                continue;
            }

            let base = self.dofmap.cell_dofs(cell).start;
            let avg = averages[c];
            let mut vals = [values[base], values[base + 1], values[base + 2]];

            let mut exceedance: f64 = 0.0;
            for (i, val) in vals.iter_mut().enumerate() {
                let dof = base + i;
                let nbs = self.neighbours.cells(dof).iter().map(|&n| averages[n]);
                let Some((lo, hi)) = dof_bounds(avg, nbs, dof_bcs[dof], true) else {
                    continue;
                };

                let ex = if *val < lo {
                    *val - lo
                } else if *val > hi {
                    *val - hi
                } else {
                    continue;
                };
                *val = val.clamp(lo, hi);
                if exceedance.abs() < ex.abs() {
                    exceedance = ex;
                }
            }

            self.exceedance[c] = exceedance;
            if exceedance == 0.0 {
                continue;
            }
            n_limited += 1;

            // Restore the cell average on the vertices that can take it
            let new_avg = (vals[0] + vals[1] + vals[2]) / 3.0;
            let mut eps = 0.0;
            let mut moddable = [false; 3];
            if (avg - new_avg).abs() > 1e-15 {
                for (m, &v) in moddable.iter_mut().zip(&vals) {
                    *m = if new_avg > avg { v > avg } else { v < avg };
                }
                let nmod = moddable.iter().filter(|&&m| m).count();
                if nmod == 0 {
                    if exceedance.abs() >= 1e-14 {
                        error!(
                            "Nodal limiter: cell {} has no adjustable vertex, values = {:?}, \
                             avg = {}, new_avg = {}, exceedance = {}",
                            c, vals, avg, new_avg, exceedance
                        );
                        panic!("Nmod = 0 with exceedance = {:e} in cell {}", exceedance, c);
                    }
                } else {
                    eps = (avg - new_avg) * 3.0 / nmod as f64;
                }
            }

            for (i, (&v, &m)) in vals.iter().zip(&moddable).enumerate() {
                values[base + i] = if m { v + eps } else { v };
            }
        }

        n_limited
    }

    /// Clip to the global range seen at the first call; the first call only
    /// captures that range.
    fn apply_minmax_filter(&mut self, values: &mut [f64], comm: &dyn Communicator) {
        match self.filter_cache {
            None => self.filter_cache = Some(global_min_max(values, comm)),
            Some((lo, hi)) => {
                for v in values.iter_mut() {
                    *v = v.clamp(lo, hi);
                }
            }
        }
    }
}

impl SlopeLimiter for BasicNodalLimiter {
    fn run(&mut self, values: &mut [f64], ctx: &LimiterContext) {
        assert_eq!(values.len(), self.dofmap.num_dofs());
        assert_finite_field("Nodal", &self.dofmap, values);

        let dof_bcs = match ctx.bcs {
            Some(provider) => self.bcs.get_bcs(provider),
            None => vec![DofBc::NotOnBoundary; values.len()],
        };
        let n_limited = self.limit_cells(values, &dof_bcs);

        if self.filter == FilterMethod::MinMax {
            self.apply_minmax_filter(values, ctx.comm);
        }

        debug!(
            "Nodal limiter: {} of {} owned cells limited",
            ctx.comm.sum_count(n_limited),
            ctx.comm.sum_count(self.dofmap.num_owned_cells())
        );
    }

    fn name(&self) -> &'static str {
        "nodal"
    }

    fn diagnostics(&self) -> Vec<DiagnosticField<'_>> {
        vec![DiagnosticField {
            name: &self.exceedance_name,
            values: &self.exceedance,
        }]
    }
}

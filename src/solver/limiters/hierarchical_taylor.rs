//! Hierarchical Taylor slope limiter for DG1 and DG2 fields.
//!
//! The field is expanded in the cell-local Taylor basis
//! [φ, φx, φy, φxx, φyy, φxy] about the centroid. At every vertex the
//! linear reconstruction of a coefficient group must stay inside the range
//! of that coefficient over the cells sharing the vertex:
//!
//! | group | reconstruction at offset (dx, dy)  | bounded by neighbour |
//! |-------|------------------------------------|----------------------|
//! | value | φ + φx dx + φy dy                  | φ                    |
//! | x     | φx + φxx dx + φxy dy               | φx                   |
//! | y     | φy + φyy dy + φxy dx               | φy                   |
//!
//! DG1 uses the value group only and scales both slopes by its α. DG2 sets
//! `alpha2 = min(α_x, α_y)` and `alpha1 = max(α_value, alpha2)`, scales the
//! first derivatives by alpha1 and the second derivatives by alpha2. The
//! cell average is never modified.

use log::debug;

use super::boundary::{DofBc, LimiterBoundaryConditions, bounded_alpha, dof_bounds};
use super::traits::{DiagnosticField, LimiterContext, SlopeLimiter, assert_finite_field};
use crate::basis::{DofMap, DofNeighbours, TaylorBasis};
use crate::error::ConfigError;
use crate::mesh::{MeshTopology, Point2};
use crate::types::CellIndex;

/// Taylor-basis limiter with per-cell α diagnostics.
#[derive(Clone, Debug)]
pub struct HierarchicalTaylorLimiter {
    dofmap: DofMap,
    taylor: TaylorBasis,
    neighbours: DofNeighbours,
    skip_cells: Vec<bool>,
    bcs: LimiterBoundaryConditions,
    /// Vertex offsets from the centroid of each cell
    vertex_offsets: Vec<[Point2; 3]>,
    taylor_values: Vec<f64>,
    /// Limiting factors, one field per derivative order
    alphas: Vec<Vec<f64>>,
    alpha_names: Vec<String>,
}

impl HierarchicalTaylorLimiter {
    /// Polynomial degrees this limiter supports.
    pub const SUPPORTED_DEGREES: &'static [usize] = &[0, 1, 2];

    /// Create the limiter. Degree 0 fields are accepted and never modified.
    pub fn new<M: MeshTopology + ?Sized>(
        mesh: &M,
        dofmap: &DofMap,
        field_name: &str,
        skip_cells: Vec<bool>,
        bcs: LimiterBoundaryConditions,
    ) -> Result<Self, ConfigError> {
        let degree = dofmap.degree();
        if !Self::SUPPORTED_DEGREES.contains(&degree) {
            return Err(ConfigError::UnsupportedDegree {
                method: "HierarchicalTaylor",
                degree,
                supported: Self::SUPPORTED_DEGREES,
            });
        }
        assert_eq!(skip_cells.len(), dofmap.num_cells());

        let vertex_offsets = (0..dofmap.num_cells())
            .map(|c| {
                let (xc, yc) = mesh.cell_midpoint(c);
                mesh.cell_vertices(c).map(|v| {
                    let (x, y) = mesh.vertex_coordinates(v);
                    (x - xc, y - yc)
                })
            })
            .collect();

        Ok(Self {
            dofmap: dofmap.clone(),
            taylor: TaylorBasis::new(mesh, dofmap),
            neighbours: dofmap.dof_neighbours(mesh),
            skip_cells,
            bcs,
            vertex_offsets,
            taylor_values: vec![0.0; dofmap.num_dofs()],
            alphas: vec![vec![1.0; dofmap.num_cells()]; degree],
            alpha_names: (1..=degree)
                .map(|i| format!("SlopeLimiterAlpha{}_{}", i, field_name))
                .collect(),
        })
    }

    /// Polynomial degree of the limited field.
    #[inline]
    pub fn degree(&self) -> usize {
        self.dofmap.degree()
    }

    /// Limiting factor of the first derivatives per cell.
    pub fn alpha1(&self) -> &[f64] {
        self.alphas.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Limiting factor of the second derivatives per cell (DG2 only).
    pub fn alpha2(&self) -> &[f64] {
        self.alphas.get(1).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Taylor coefficients of the field after the last run.
    pub fn taylor_values(&self) -> &[f64] {
        &self.taylor_values
    }

    /// Boundary conditions of the limited field.
    pub fn boundary_conditions_mut(&mut self) -> &mut LimiterBoundaryConditions {
        &mut self.bcs
    }

    fn convert_to_taylor(&mut self, values: &[f64]) {
        #[cfg(feature = "parallel")]
        self.taylor.lagrange_to_taylor_parallel(values, &mut self.taylor_values);
        #[cfg(not(feature = "parallel"))]
        self.taylor.lagrange_to_taylor(values, &mut self.taylor_values);
    }

    fn run_dg1(&mut self, values: &mut [f64], dof_bcs: &[DofBc]) -> usize {
        self.convert_to_taylor(values);
        let snapshot = self.taylor_values.clone();
        let mut n_limited = 0;

        for cell in CellIndex::iter(self.dofmap.num_owned_cells()) {
            let c = cell.get();
            let dofs = self.dofmap.cell_dofs(cell);
            let base = dofs.start;
            let center = snapshot[base];

            let mut alpha: f64 = 1.0;
            if !self.skip_cells[c] {
                for dof in dofs.clone() {
                    let nbs = self.neighbours.cells(dof).iter().map(|&n| snapshot[3 * n]);
                    if let Some((lo, hi)) = dof_bounds(center, nbs, dof_bcs[dof], true) {
                        alpha = alpha.min(bounded_alpha(center, values[dof], lo, hi));
                    }
                }
            }

            self.alphas[0][c] = alpha;
            if alpha < 1.0 {
                self.taylor_values[base + 1] *= alpha;
                self.taylor_values[base + 2] *= alpha;
                self.taylor
                    .cell_to_lagrange(c, &self.taylor_values[dofs.clone()], &mut values[dofs]);
                n_limited += 1;
            }
        }
        n_limited
    }

    fn run_dg2(&mut self, values: &mut [f64], dof_bcs: &[DofBc]) -> usize {
        self.convert_to_taylor(values);
        let snapshot = self.taylor_values.clone();
        let mut n_limited = 0;

        for cell in CellIndex::iter(self.dofmap.num_owned_cells()) {
            let c = cell.get();
            let dofs = self.dofmap.cell_dofs(cell);
            let base = dofs.start;
            let t = &snapshot[dofs.clone()];

            let mut alpha = [1.0_f64; 3];
            if !self.skip_cells[c] {
                for (group, a) in alpha.iter_mut().enumerate() {
                    let center = t[group];
                    for (i, &(dx, dy)) in self.vertex_offsets[c].iter().enumerate() {
                        let dof = base + i;
                        let nbs = self.neighbours.cells(dof).iter().map(|&n| snapshot[6 * n + group]);
                        let Some((lo, hi)) = dof_bounds(center, nbs, dof_bcs[dof], group == 0) else {
                            continue;
                        };
                        let vertex_value = match group {
                            0 => t[0] + t[1] * dx + t[2] * dy,
                            1 => t[1] + t[3] * dx + t[5] * dy,
                            _ => t[2] + t[4] * dy + t[5] * dx,
                        };
                        *a = a.min(bounded_alpha(center, vertex_value, lo, hi));
                    }
                }
            }

            let alpha2 = alpha[1].min(alpha[2]);
            let alpha1 = alpha[0].max(alpha2);
            self.alphas[0][c] = alpha1;
            self.alphas[1][c] = alpha2;

            if alpha1 < 1.0 || alpha2 < 1.0 {
                let tv = &mut self.taylor_values[dofs.clone()];
                tv[1] *= alpha1;
                tv[2] *= alpha1;
                for coefficient in &mut tv[3..6] {
                    *coefficient *= alpha2;
                }
                self.taylor
                    .cell_to_lagrange(c, &self.taylor_values[dofs.clone()], &mut values[dofs]);
                n_limited += 1;
            }
        }
        n_limited
    }
}

impl SlopeLimiter for HierarchicalTaylorLimiter {
    fn run(&mut self, values: &mut [f64], ctx: &LimiterContext) {
        let degree = self.degree();
        if degree == 0 {
            return;
        }
        assert_eq!(values.len(), self.dofmap.num_dofs());
        assert_finite_field("HierarchicalTaylor", &self.dofmap, values);

        let dof_bcs = match ctx.bcs {
            Some(provider) => self.bcs.get_bcs(provider),
            None => vec![DofBc::NotOnBoundary; values.len()],
        };
        let n_limited = if degree == 1 {
            self.run_dg1(values, &dof_bcs)
        } else {
            self.run_dg2(values, &dof_bcs)
        };

        debug!(
            "HierarchicalTaylor limiter (DG{}): {} of {} owned cells limited",
            degree,
            ctx.comm.sum_count(n_limited),
            ctx.comm.sum_count(self.dofmap.num_owned_cells())
        );
    }

    fn name(&self) -> &'static str {
        "HierarchicalTaylor"
    }

    fn diagnostics(&self) -> Vec<DiagnosticField<'_>> {
        self.alpha_names
            .iter()
            .zip(&self.alphas)
            .map(|(name, values)| DiagnosticField { name, values })
            .collect()
    }
}

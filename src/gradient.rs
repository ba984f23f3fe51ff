//! Least-squares gradient reconstruction from cell averages.
//!
//! For each owned cell c the stencil is every other cell sharing at least
//! one vertex with c. With d_n = midpoint(n) - midpoint(c) the gradient
//! minimises Σ_n (φ_c + g·d_n - φ_n)², i.e.
//!
//! g = A⁻¹ Σ_n d_n (φ_n - φ_c),   A = Σ_n d_n d_nᵀ
//!
//! A⁻¹ depends only on the geometry and is cached. Cells with fewer than two
//! stencil cells or a singular A get a zero gradient.

use log::debug;

use crate::basis::DofMap;
use crate::mesh::{MeshTopology, Point2, sub};

/// Relative determinant threshold below which A is treated as singular.
const SINGULAR_TOL: f64 = 1e-12;

/// Piecewise-constant gradient of a scalar DG field.
#[derive(Clone, Debug)]
pub struct GradientReconstructor {
    /// Stencil cells of each owned cell
    stencils: Vec<Vec<usize>>,
    /// Cached A⁻¹ = [a00, a01, a10, a11], None for degenerate stencils
    inverses: Vec<Option<[f64; 4]>>,
    /// One gradient per cell (owned and ghost)
    gradient: Vec<Point2>,
}

impl GradientReconstructor {
    /// Build the stencils and least-squares matrices.
    pub fn new<M: MeshTopology + ?Sized>(mesh: &M) -> Self {
        let n_owned = mesh.num_owned_cells();
        let mut stencils = Vec::with_capacity(n_owned);

        for c in 0..n_owned {
            let mut stencil: Vec<usize> = mesh
                .cell_vertices(c)
                .iter()
                .flat_map(|&v| mesh.vertex_neighbor_cells(v).iter().copied())
                .filter(|&n| n != c)
                .collect();
            stencil.sort_unstable();
            stencil.dedup();
            stencils.push(stencil);
        }

        let mut reconstructor = Self {
            stencils,
            inverses: Vec::new(),
            gradient: vec![(0.0, 0.0); mesh.num_all_cells()],
        };
        reconstructor.initialize(mesh);
        reconstructor
    }

    /// (Re)compute the cached least-squares matrices from the current
    /// geometry. Call again after the mesh has moved.
    pub fn initialize<M: MeshTopology + ?Sized>(&mut self, mesh: &M) {
        self.inverses = self
            .stencils
            .iter()
            .enumerate()
            .map(|(c, stencil)| least_squares_inverse(mesh, c, stencil))
            .collect();

        let degenerate = self.inverses.iter().filter(|inv| inv.is_none()).count();
        if degenerate > 0 {
            debug!(
                "Gradient reconstruction: {} of {} cells have a degenerate stencil",
                degenerate,
                self.inverses.len()
            );
        }
    }

    /// Recompute the gradient of `values` for every owned cell.
    ///
    /// Ghost cell entries are not touched; they are filled by the ghost
    /// exchange of the caller.
    pub fn reconstruct<M: MeshTopology + ?Sized>(&mut self, mesh: &M, dofmap: &DofMap, values: &[f64]) {
        let averages = dofmap.cell_averages(values);
        for c in 0..self.stencils.len() {
            self.gradient[c] = cell_gradient(mesh, c, &self.stencils[c], self.inverses[c], &averages);
        }
    }

    /// Parallel version of [`reconstruct`](Self::reconstruct).
    #[cfg(feature = "parallel")]
    pub fn reconstruct_parallel<M: MeshTopology + ?Sized>(
        &mut self,
        mesh: &M,
        dofmap: &DofMap,
        values: &[f64],
    ) {
        use rayon::prelude::*;

        let averages = dofmap.cell_averages(values);
        let n_owned = self.stencils.len();
        let stencils = &self.stencils;
        let inverses = &self.inverses;
        self.gradient[..n_owned]
            .par_iter_mut()
            .enumerate()
            .for_each(|(c, g)| {
                *g = cell_gradient(mesh, c, &stencils[c], inverses[c], &averages);
            });
    }

    /// Gradient of every cell.
    #[inline]
    pub fn gradient(&self) -> &[Point2] {
        &self.gradient
    }

    /// Mutable access to the gradient storage, e.g. for the ghost exchange.
    #[inline]
    pub fn gradient_mut(&mut self) -> &mut [Point2] {
        &mut self.gradient
    }

    /// Gradient of one cell.
    #[inline]
    pub fn cell_gradient(&self, cell: usize) -> Point2 {
        self.gradient[cell]
    }
}

fn least_squares_inverse<M: MeshTopology + ?Sized>(
    mesh: &M,
    cell: usize,
    stencil: &[usize],
) -> Option<[f64; 4]> {
    if stencil.len() < 2 {
        return None;
    }

    let mc = mesh.cell_midpoint(cell);
    let (mut a00, mut a01, mut a11) = (0.0, 0.0, 0.0);
    for &n in stencil {
        let d = sub(mesh.cell_midpoint(n), mc);
        a00 += d.0 * d.0;
        a01 += d.0 * d.1;
        a11 += d.1 * d.1;
    }

    let det = a00 * a11 - a01 * a01;
    if det.abs() <= SINGULAR_TOL * a00 * a11 || det == 0.0 {
        return None;
    }
    Some([a11 / det, -a01 / det, -a01 / det, a00 / det])
}

fn cell_gradient<M: MeshTopology + ?Sized>(
    mesh: &M,
    cell: usize,
    stencil: &[usize],
    inverse: Option<[f64; 4]>,
    averages: &[f64],
) -> Point2 {
    let Some(inv) = inverse else {
        return (0.0, 0.0);
    };

    let mc = mesh.cell_midpoint(cell);
    let phi_c = averages[cell];
    let (mut bx, mut by) = (0.0, 0.0);
    for &n in stencil {
        let d = sub(mesh.cell_midpoint(n), mc);
        let dphi = averages[n] - phi_c;
        bx += d.0 * dphi;
        by += d.1 * dphi;
    }
    (inv[0] * bx + inv[1] * by, inv[2] * bx + inv[3] * by)
}

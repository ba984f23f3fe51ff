//! Cell-local Taylor basis for DG1/DG2 fields on triangles.
//!
//! The Taylor basis is centred at the cell centroid (xc, yc). With
//! dx = x - xc and dy = y - yc the modes are:
//!
//! ψ0 = 1
//! ψ1 = dx,                ψ2 = dy
//! ψ3 = (dx² - <dx²>) / 2, ψ4 = (dy² - <dy²>) / 2, ψ5 = dx·dy - <dx·dy>
//!
//! where <·> is the cell average. Every mode except ψ0 has zero mean, so the
//! first Taylor coefficient is the cell average and the others are the
//! derivatives at the centroid: [φ, φx, φy, φxx, φyy, φxy].
//!
//! The Vandermonde matrix V[i, j] = ψ_j(node_i) maps Taylor coefficients to
//! nodal Lagrange values; its inverse is computed once per cell.

use faer::{Mat, linalg::solvers::Solve};

use super::dofmap::DofMap;
use crate::mesh::MeshTopology;
use crate::types::{CellIndex, DofIndex};

/// Per-cell Lagrange ↔ Taylor transformation matrices.
#[derive(Clone, Debug)]
pub struct TaylorBasis {
    degree: usize,
    n: usize,
    /// Row-major n × n blocks, one per cell: taylor = to_taylor * lagrange
    to_taylor: Vec<f64>,
    /// Row-major n × n blocks, one per cell: lagrange = to_lagrange * taylor
    to_lagrange: Vec<f64>,
}

/// Evaluate all Taylor modes of a cell at offset (dx, dy) from the centroid.
///
/// `moments` holds the cell averages (<dx²>, <dy²>, <dx·dy>).
pub fn taylor_modes(degree: usize, dx: f64, dy: f64, moments: (f64, f64, f64)) -> [f64; 6] {
    let (mxx, myy, mxy) = moments;
    let mut psi = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    if degree >= 1 {
        psi[1] = dx;
        psi[2] = dy;
    }
    if degree >= 2 {
        psi[3] = 0.5 * (dx * dx - mxx);
        psi[4] = 0.5 * (dy * dy - myy);
        psi[5] = dx * dy - mxy;
    }
    psi
}

/// Second moments (<dx²>, <dy²>, <dx·dy>) of a triangle about its centroid,
/// from the vertex offsets relative to the centroid.
pub fn second_moments(offsets: [(f64, f64); 3]) -> (f64, f64, f64) {
    let mut m = (0.0, 0.0, 0.0);
    for (dx, dy) in offsets {
        m.0 += dx * dx;
        m.1 += dy * dy;
        m.2 += dx * dy;
    }
    (m.0 / 12.0, m.1 / 12.0, m.2 / 12.0)
}

impl TaylorBasis {
    /// Build the transformation matrices of every cell of the dof map.
    pub fn new<M: MeshTopology + ?Sized>(mesh: &M, dofmap: &DofMap) -> Self {
        let degree = dofmap.degree();
        let n = dofmap.dofs_per_cell();
        let n_cells = dofmap.num_cells();

        let mut to_taylor = Vec::with_capacity(n_cells * n * n);
        let mut to_lagrange = Vec::with_capacity(n_cells * n * n);

        for cell in CellIndex::iter(n_cells) {
            let c = cell.get();
            let (xc, yc) = mesh.cell_midpoint(c);
            let offsets = mesh
                .cell_vertices(c)
                .map(|v| {
                    let (x, y) = mesh.vertex_coordinates(v);
                    (x - xc, y - yc)
                });
            let moments = second_moments(offsets);

            let mut v = Mat::zeros(n, n);
            for (i, dof) in dofmap.cell_dofs(cell).enumerate() {
                let (x, y) = dofmap.coordinates(DofIndex::new(dof));
                let psi = taylor_modes(degree, x - xc, y - yc, moments);
                for j in 0..n {
                    v[(i, j)] = psi[j];
                }
            }

            // Compute inverse using LU decomposition
            let lu = v.as_ref().full_piv_lu();
            let mut v_inv = Mat::zeros(n, n);

            // Solve V * V_inv = I column by column
            for col in 0..n {
                let mut rhs = Mat::zeros(n, 1);
                rhs[(col, 0)] = 1.0;
                let solution = lu.solve(&rhs);
                for row in 0..n {
                    v_inv[(row, col)] = solution[(row, 0)];
                }
            }

            for i in 0..n {
                for j in 0..n {
                    to_taylor.push(v_inv[(i, j)]);
                    to_lagrange.push(v[(i, j)]);
                }
            }
        }

        Self {
            degree,
            n,
            to_taylor,
            to_lagrange,
        }
    }

    /// Polynomial degree.
    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of coefficients per cell.
    #[inline]
    pub fn dofs_per_cell(&self) -> usize {
        self.n
    }

    /// Convert the Lagrange values of one cell to Taylor coefficients.
    #[inline]
    pub fn cell_to_taylor(&self, cell: usize, lagrange: &[f64], taylor: &mut [f64]) {
        apply_block(&self.to_taylor, self.n, cell, lagrange, taylor);
    }

    /// Convert the Taylor coefficients of one cell to Lagrange values.
    #[inline]
    pub fn cell_to_lagrange(&self, cell: usize, taylor: &[f64], lagrange: &mut [f64]) {
        apply_block(&self.to_lagrange, self.n, cell, taylor, lagrange);
    }

    /// Convert a whole Lagrange field to Taylor coefficients.
    pub fn lagrange_to_taylor(&self, lagrange: &[f64], taylor: &mut [f64]) {
        let n = self.n;
        for (c, (l, t)) in lagrange.chunks(n).zip(taylor.chunks_mut(n)).enumerate() {
            self.cell_to_taylor(c, l, t);
        }
    }

    /// Convert a whole Taylor field to Lagrange values.
    pub fn taylor_to_lagrange(&self, taylor: &[f64], lagrange: &mut [f64]) {
        let n = self.n;
        for (c, (t, l)) in taylor.chunks(n).zip(lagrange.chunks_mut(n)).enumerate() {
            self.cell_to_lagrange(c, t, l);
        }
    }

    /// Parallel version of [`lagrange_to_taylor`](Self::lagrange_to_taylor).
    #[cfg(feature = "parallel")]
    pub fn lagrange_to_taylor_parallel(&self, lagrange: &[f64], taylor: &mut [f64]) {
        use rayon::prelude::*;

        let n = self.n;
        taylor
            .par_chunks_mut(n)
            .zip(lagrange.par_chunks(n))
            .enumerate()
            .for_each(|(c, (t, l))| self.cell_to_taylor(c, l, t));
    }
}

#[inline]
fn apply_block(blocks: &[f64], n: usize, cell: usize, input: &[f64], output: &mut [f64]) {
    let m = &blocks[cell * n * n..(cell + 1) * n * n];
    for i in 0..n {
        let row = &m[i * n..(i + 1) * n];
        output[i] = row.iter().zip(input).map(|(a, b)| a * b).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh2D;

    fn setup(degree: usize) -> (TriMesh2D, DofMap, TaylorBasis) {
        let mut mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
        // Skew the mesh so no cell is axis aligned
        mesh.move_vertices(|(x, y)| (x + 0.2 * y, y + 0.1 * x * x));
        let dm = DofMap::new(&mesh, degree).unwrap();
        let tb = TaylorBasis::new(&mesh, &dm);
        (mesh, dm, tb)
    }

    fn interpolate<F: Fn(f64, f64) -> f64>(dm: &DofMap, f: F) -> Vec<f64> {
        (0..dm.num_dofs())
            .map(|d| {
                let (x, y) = dm.coordinates(DofIndex::new(d));
                f(x, y)
            })
            .collect()
    }

    #[test]
    fn test_dg1_linear_field_coefficients() {
        let (mesh, dm, tb) = setup(1);
        let lagrange = interpolate(&dm, |x, y| 1.0 + 2.0 * x - 3.0 * y);
        let mut taylor = vec![0.0; dm.num_dofs()];
        tb.lagrange_to_taylor(&lagrange, &mut taylor);

        for c in 0..dm.num_cells() {
            let (xc, yc) = mesh.cell_midpoint(c);
            let t = &taylor[3 * c..3 * c + 3];
            assert!((t[0] - (1.0 + 2.0 * xc - 3.0 * yc)).abs() < 1e-12);
            assert!((t[1] - 2.0).abs() < 1e-12);
            assert!((t[2] + 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dg2_quadratic_field_coefficients() {
        let (mesh, dm, tb) = setup(2);
        let f = |x: f64, y: f64| 0.5 + x - y + 0.7 * x * x - 0.4 * y * y + 1.1 * x * y;
        let lagrange = interpolate(&dm, f);
        let mut taylor = vec![0.0; dm.num_dofs()];
        tb.lagrange_to_taylor(&lagrange, &mut taylor);

        for c in 0..dm.num_cells() {
            let (xc, yc) = mesh.cell_midpoint(c);
            let t = &taylor[6 * c..6 * c + 6];
            // Coefficient 0 is the cell average
            let avg = dm.cell_average(&lagrange, CellIndex::new(c));
            assert!((t[0] - avg).abs() < 1e-12, "cell {}: {} vs {}", c, t[0], avg);
            assert!((t[1] - (1.0 + 1.4 * xc + 1.1 * yc)).abs() < 1e-11);
            assert!((t[2] - (-1.0 - 0.8 * yc + 1.1 * xc)).abs() < 1e-11);
            assert!((t[3] - 1.4).abs() < 1e-10);
            assert!((t[4] + 0.8).abs() < 1e-10);
            assert!((t[5] - 1.1).abs() < 1e-10);
        }
    }

    #[test]
    fn test_roundtrip() {
        for degree in [1, 2] {
            let (_, dm, tb) = setup(degree);
            let lagrange: Vec<f64> = (0..dm.num_dofs()).map(|i| (i as f64 * 0.37).sin()).collect();
            let mut taylor = vec![0.0; dm.num_dofs()];
            let mut back = vec![0.0; dm.num_dofs()];
            tb.lagrange_to_taylor(&lagrange, &mut taylor);
            tb.taylor_to_lagrange(&taylor, &mut back);
            for (a, b) in lagrange.iter().zip(&back) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_second_moments_zero_mean_modes() {
        // Right triangle with centroid (1/3, 1/3)
        let c = 1.0 / 3.0;
        let offsets = [(-c, -c), (1.0 - c, -c), (-c, 1.0 - c)];
        let (mxx, myy, mxy) = second_moments(offsets);
        // Exact: <(x - 1/3)^2> = 1/18, <(x - 1/3)(y - 1/3)> = -1/36
        assert!((mxx - 1.0 / 18.0).abs() < 1e-14);
        assert!((myy - 1.0 / 18.0).abs() < 1e-14);
        assert!((mxy + 1.0 / 36.0).abs() < 1e-14);
    }

    #[test]
    #[cfg(feature = "parallel")]
    fn test_parallel_matches_serial() {
        for degree in [1, 2] {
            let (_, dm, tb) = setup(degree);
            let lagrange: Vec<f64> = (0..dm.num_dofs()).map(|i| (i as f64 * 0.61).cos()).collect();
            let mut serial = vec![0.0; dm.num_dofs()];
            let mut parallel = vec![0.0; dm.num_dofs()];
            tb.lagrange_to_taylor(&lagrange, &mut serial);
            tb.lagrange_to_taylor_parallel(&lagrange, &mut parallel);
            assert_eq!(serial, parallel, "degree {}", degree);
        }
    }
}

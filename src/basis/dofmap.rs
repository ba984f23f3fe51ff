//! Degree-of-freedom numbering for discontinuous Lagrange fields on triangles.
//!
//! Every cell owns its dofs, so cell `c` holds the contiguous block
//! `c * n .. (c + 1) * n` with `n` dofs per cell:
//!
//! | degree | n | local dofs                                            |
//! |--------|---|-------------------------------------------------------|
//! | 0      | 1 | cell centroid                                          |
//! | 1      | 3 | vertices v0, v1, v2                                    |
//! | 2      | 6 | vertices, then midpoint of the edge opposite v0, v1, v2 |
//!
//! Ghost cells are numbered after owned cells, so owned dofs form a prefix.

use std::ops::Range;

use crate::error::ConfigError;
use crate::mesh::{FacetCells, MeshTopology, Point2};
use crate::types::{CellIndex, DofIndex};

/// The mesh entity a dof is located on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DofNode {
    /// Cell centroid (degree 0)
    Cell(usize),
    /// Mesh vertex
    Vertex(usize),
    /// Facet midpoint (degree 2 edge dofs)
    Facet(usize),
}

/// Dof numbering of a scalar DG Lagrange field.
#[derive(Clone, Debug)]
pub struct DofMap {
    degree: usize,
    dofs_per_cell: usize,
    n_cells: usize,
    n_owned_cells: usize,
    nodes: Vec<DofNode>,
    coordinates: Vec<Point2>,
}

impl DofMap {
    /// Polynomial degrees with a dof layout.
    pub const SUPPORTED_DEGREES: &'static [usize] = &[0, 1, 2];

    /// Build the dof map for a DG field of the given degree.
    pub fn new<M: MeshTopology + ?Sized>(mesh: &M, degree: usize) -> Result<Self, ConfigError> {
        let dofs_per_cell = match degree {
            0 => 1,
            1 => 3,
            2 => 6,
            _ => {
                return Err(ConfigError::UnsupportedDegree {
                    method: "DG Lagrange function space",
                    degree,
                    supported: Self::SUPPORTED_DEGREES,
                })
            }
        };

        let n_cells = mesh.num_all_cells();
        let mut nodes = Vec::with_capacity(n_cells * dofs_per_cell);
        let mut coordinates = Vec::with_capacity(n_cells * dofs_per_cell);

        for c in 0..n_cells {
            if degree == 0 {
                nodes.push(DofNode::Cell(c));
                coordinates.push(mesh.cell_midpoint(c));
                continue;
            }
            for v in mesh.cell_vertices(c) {
                nodes.push(DofNode::Vertex(v));
                coordinates.push(mesh.vertex_coordinates(v));
            }
            if degree == 2 {
                for f in mesh.cell_facets(c) {
                    nodes.push(DofNode::Facet(f));
                    coordinates.push(mesh.facet_midpoint(f));
                }
            }
        }

        Ok(Self {
            degree,
            dofs_per_cell,
            n_cells,
            n_owned_cells: mesh.num_owned_cells(),
            nodes,
            coordinates,
        })
    }

    /// Polynomial degree of the field.
    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of dofs in each cell.
    #[inline]
    pub fn dofs_per_cell(&self) -> usize {
        self.dofs_per_cell
    }

    /// Total number of dofs (owned and ghost cells).
    #[inline]
    pub fn num_dofs(&self) -> usize {
        self.n_cells * self.dofs_per_cell
    }

    /// Number of dofs in owned cells.
    #[inline]
    pub fn num_owned_dofs(&self) -> usize {
        self.n_owned_cells * self.dofs_per_cell
    }

    /// Number of cells covered by the map.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.n_cells
    }

    /// Number of owned cells.
    #[inline]
    pub fn num_owned_cells(&self) -> usize {
        self.n_owned_cells
    }

    /// Dofs of a cell.
    #[inline]
    pub fn cell_dofs(&self, cell: CellIndex) -> Range<usize> {
        let start = cell.get() * self.dofs_per_cell;
        start..start + self.dofs_per_cell
    }

    /// The cell a dof belongs to.
    #[inline]
    pub fn cell_of(&self, dof: DofIndex) -> CellIndex {
        CellIndex::new(dof.get() / self.dofs_per_cell)
    }

    /// The mesh entity a dof sits on.
    #[inline]
    pub fn node(&self, dof: DofIndex) -> DofNode {
        self.nodes[dof]
    }

    /// Physical coordinates of a dof.
    #[inline]
    pub fn coordinates(&self, dof: DofIndex) -> Point2 {
        self.coordinates[dof]
    }

    /// Cell average of a DG Lagrange field.
    ///
    /// For degree 2 the vertex basis functions integrate to zero on a
    /// triangle, so the average is the mean of the three edge dofs.
    pub fn cell_average(&self, values: &[f64], cell: CellIndex) -> f64 {
        let dofs = self.cell_dofs(cell);
        match self.degree {
            0 => values[dofs.start],
            1 => values[dofs].iter().sum::<f64>() / 3.0,
            _ => values[dofs.start + 3..dofs.end].iter().sum::<f64>() / 3.0,
        }
    }

    /// Cell averages of every cell.
    pub fn cell_averages(&self, values: &[f64]) -> Vec<f64> {
        CellIndex::iter(self.n_cells)
            .map(|c| self.cell_average(values, c))
            .collect()
    }

    /// For each dof, the other cells sharing the dof's location.
    ///
    /// Vertex dofs see every other cell containing the vertex, edge dofs the
    /// cell across the facet and cell dofs the facet neighbours.
    pub fn dof_neighbours<M: MeshTopology + ?Sized>(&self, mesh: &M) -> DofNeighbours {
        let mut offsets = Vec::with_capacity(self.num_dofs() + 1);
        let mut cells = Vec::new();
        offsets.push(0);

        for dof in DofIndex::iter(self.num_dofs()) {
            let own = self.cell_of(dof).get();
            match self.node(dof) {
                DofNode::Vertex(v) => {
                    cells.extend(mesh.vertex_neighbor_cells(v).iter().filter(|&&c| c != own));
                }
                DofNode::Facet(f) => {
                    if let FacetCells::Interior(c0, c1) = mesh.facet_cells(f) {
                        cells.push(if c0 == own { c1 } else { c0 });
                    }
                }
                DofNode::Cell(c) => {
                    for f in mesh.cell_facets(c) {
                        if let FacetCells::Interior(c0, c1) = mesh.facet_cells(f) {
                            cells.push(if c0 == own { c1 } else { c0 });
                        }
                    }
                }
            }
            offsets.push(cells.len());
        }

        DofNeighbours { offsets, cells }
    }
}

/// Compressed dof-to-neighbour-cell table.
#[derive(Clone, Debug, Default)]
pub struct DofNeighbours {
    offsets: Vec<usize>,
    cells: Vec<usize>,
}

impl DofNeighbours {
    /// Neighbour cells of a dof.
    #[inline]
    pub fn cells(&self, dof: usize) -> &[usize] {
        &self.cells[self.offsets[dof]..self.offsets[dof + 1]]
    }

    /// Number of neighbour cells of a dof.
    #[inline]
    pub fn count(&self, dof: usize) -> usize {
        self.offsets[dof + 1] - self.offsets[dof]
    }

    /// Number of dofs in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Returns `true` if the table has no dofs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh2D;

    #[test]
    fn test_dof_counts() {
        let mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
        for (degree, n) in [(0, 1), (1, 3), (2, 6)] {
            let dm = DofMap::new(&mesh, degree).unwrap();
            assert_eq!(dm.dofs_per_cell(), n);
            assert_eq!(dm.num_dofs(), 8 * n);
            assert_eq!(dm.num_owned_dofs(), 8 * n);
        }
        assert!(matches!(
            DofMap::new(&mesh, 3),
            Err(ConfigError::UnsupportedDegree { degree: 3, .. })
        ));
    }

    #[test]
    fn test_dof_coordinates_follow_layout() {
        let mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 1, 1);
        let dm = DofMap::new(&mesh, 2).unwrap();

        // Cell 0 = (0,0), (1,0), (1,1)
        let dofs = dm.cell_dofs(CellIndex::new(0));
        assert_eq!(dofs, 0..6);
        assert_eq!(dm.coordinates(DofIndex::new(0)), (0.0, 0.0));
        assert_eq!(dm.coordinates(DofIndex::new(1)), (1.0, 0.0));
        assert_eq!(dm.coordinates(DofIndex::new(2)), (1.0, 1.0));
        // Edge dofs: opposite v0, v1, v2
        assert_eq!(dm.coordinates(DofIndex::new(3)), (1.0, 0.5));
        assert_eq!(dm.coordinates(DofIndex::new(4)), (0.5, 0.5));
        assert_eq!(dm.coordinates(DofIndex::new(5)), (0.5, 0.0));

        assert_eq!(dm.cell_of(DofIndex::new(7)), CellIndex::new(1));
        assert!(matches!(dm.node(DofIndex::new(4)), DofNode::Facet(_)));
    }

    #[test]
    fn test_cell_average() {
        let mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 1, 1);

        let dm1 = DofMap::new(&mesh, 1).unwrap();
        let vals = [0.0, 3.0, 6.0, 1.0, 1.0, 1.0];
        assert!((dm1.cell_average(&vals, CellIndex::new(0)) - 3.0).abs() < 1e-14);

        // Quadratic x^2 on cell 0: exact average is the mean of the edge midpoints
        let dm2 = DofMap::new(&mesh, 2).unwrap();
        let mut vals2 = vec![0.0; 12];
        for dof in 0..12 {
            let (x, _) = dm2.coordinates(DofIndex::new(dof));
            vals2[dof] = x * x;
        }
        // Integral of x^2 over triangle (0,0),(1,0),(1,1) divided by area 1/2
        let expected = (1.0 / 4.0) / 0.5;
        assert!((dm2.cell_average(&vals2, CellIndex::new(0)) - expected).abs() < 1e-14);
    }

    #[test]
    fn test_dof_neighbours() {
        let mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
        let dm = DofMap::new(&mesh, 1).unwrap();
        let nbs = dm.dof_neighbours(&mesh);
        assert_eq!(nbs.len(), dm.num_dofs());

        // Cell 0 = (v0, v1, v4); the center vertex v4 is in six cells
        assert_eq!(nbs.count(2), 5);
        assert!(!nbs.cells(2).contains(&0));
        // Bottom-left corner v0 is shared with cell 1 only
        assert_eq!(nbs.cells(0), &[1]);

        let dm2 = DofMap::new(&mesh, 2).unwrap();
        let nbs2 = dm2.dof_neighbours(&mesh);
        // Edge dof opposite v1 of cell 0 lies on the diagonal shared with cell 1
        assert_eq!(nbs2.cells(4), &[1]);
        // Edge dof opposite v2 of cell 0 lies on the bottom boundary
        assert_eq!(nbs2.count(5), 0);
    }
}

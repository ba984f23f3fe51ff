//! Read-only topological and geometric queries consumed by the kernels.
//!
//! The kernels never see a concrete mesh type. Anything that can answer
//! these queries (an in-memory triangulation, a wrapper around an external
//! mesh library) can drive the gradient reconstructor, the blending engine,
//! the compression pass and the slope limiters.

/// A point or vector in the plane.
pub type Point2 = (f64, f64);

/// Cells adjacent to a facet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacetCells {
    /// Facet shared by two cells; the first index is always the lower one.
    Interior(usize, usize),
    /// Facet with a single locally known cell.
    Exterior(usize),
}

impl FacetCells {
    /// The cell the facet normal points out of.
    #[inline]
    pub fn first(&self) -> usize {
        match *self {
            FacetCells::Interior(c0, _) | FacetCells::Exterior(c0) => c0,
        }
    }

    /// The cell on the other side of the facet, if any.
    #[inline]
    pub fn second(&self) -> Option<usize> {
        match *self {
            FacetCells::Interior(_, c1) => Some(c1),
            FacetCells::Exterior(_) => None,
        }
    }

    /// Number of adjacent cells (1 or 2).
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            FacetCells::Interior(..) => 2,
            FacetCells::Exterior(_) => 1,
        }
    }

    /// Returns `true` if the facet has two adjacent cells.
    #[inline]
    pub fn is_interior(&self) -> bool {
        matches!(self, FacetCells::Interior(..))
    }
}

/// Topology and cached geometry of a 2D triangular mesh.
///
/// # Conventions
///
/// - Cells `0..num_owned_cells()` are owned by this process, the remaining
///   cells up to `num_all_cells()` are read-only ghosts.
/// - `facet_normal` is a unit vector pointing out of
///   `facet_cells(f).first()`, i.e. from the lower-indexed cell towards the
///   higher-indexed one, and outwards on the domain boundary.
/// - `cell_facets(c)[i]` is the facet opposite local vertex `i`.
pub trait MeshTopology: Send + Sync {
    /// Number of cells owned by this process.
    fn num_owned_cells(&self) -> usize;

    /// Number of owned plus ghost cells.
    fn num_all_cells(&self) -> usize;

    /// Number of facets known to this process.
    fn num_facets(&self) -> usize;

    /// Number of vertices known to this process.
    fn num_vertices(&self) -> usize;

    /// Cell area.
    fn cell_volume(&self, cell: usize) -> f64;

    /// Cell centroid.
    fn cell_midpoint(&self, cell: usize) -> Point2;

    /// Global vertex indices of a cell.
    fn cell_vertices(&self, cell: usize) -> [usize; 3];

    /// Facets of a cell, facet `i` opposite local vertex `i`.
    fn cell_facets(&self, cell: usize) -> [usize; 3];

    /// Facet length.
    fn facet_area(&self, facet: usize) -> f64;

    /// Unit facet normal (see the orientation convention above).
    fn facet_normal(&self, facet: usize) -> Point2;

    /// Facet midpoint.
    fn facet_midpoint(&self, facet: usize) -> Point2;

    /// Cells adjacent to a facet.
    fn facet_cells(&self, facet: usize) -> FacetCells;

    /// Returns `true` if the facet lies on the domain boundary.
    ///
    /// A facet at the outer edge of the ghost layer has a single local cell
    /// but is not on the domain boundary.
    fn is_exterior(&self, facet: usize) -> bool;

    /// The two end vertices of a facet.
    fn facet_vertices(&self, facet: usize) -> [usize; 2];

    /// Boundary region number of an exterior facet, if it has been marked.
    fn facet_region(&self, facet: usize) -> Option<usize>;

    /// Vertex coordinates.
    fn vertex_coordinates(&self, vertex: usize) -> Point2;

    /// All cells (owned and ghost) that contain a vertex.
    fn vertex_neighbor_cells(&self, vertex: usize) -> &[usize];

    /// Returns `true` if `cell` is owned by this process.
    #[inline]
    fn is_owned(&self, cell: usize) -> bool {
        cell < self.num_owned_cells()
    }
}

/// Dot product of two plane vectors.
#[inline]
pub fn dot(a: Point2, b: Point2) -> f64 {
    a.0 * b.0 + a.1 * b.1
}

/// Difference `a - b` of two points.
#[inline]
pub fn sub(a: Point2, b: Point2) -> Point2 {
    (a.0 - b.0, a.1 - b.1)
}

/// Euclidean length of a plane vector.
#[inline]
pub fn norm(a: Point2) -> f64 {
    dot(a, a).sqrt()
}

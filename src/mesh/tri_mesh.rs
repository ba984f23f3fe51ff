//! Unstructured 2D triangular mesh with owned and ghost cells.
//!
//! The mesh stores:
//! - Vertex coordinates
//! - Cell-vertex connectivity
//! - Facet (edge) connectivity with the adjacent cells
//! - Vertex-to-cell connectivity for vertex-patch stencils
//! - Cached cell and facet geometry
//! - Named boundary regions on exterior facets
//!
//! Facet convention: local facet `i` of a cell is the edge opposite local
//! vertex `i`, i.e. facet 0 = (v1, v2), facet 1 = (v0, v2), facet 2 = (v0, v1).

use std::collections::HashMap;

use super::geometry::{CellInfo, FacetInfo};
use super::topology::{FacetCells, MeshTopology, Point2};
use crate::error::MeshError;

/// An edge of the triangulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Facet {
    /// Vertex indices (v0, v1) with v0 < v1
    pub vertices: [usize; 2],
    /// Adjacent cells, lower index first
    pub cells: FacetCells,
    /// Whether the facet lies on the domain boundary
    pub on_boundary: bool,
    /// Boundary region number (exterior facets only)
    pub region: Option<usize>,
}

/// 2D mesh of straight-sided triangles.
#[derive(Clone, Debug)]
pub struct TriMesh2D {
    /// Vertex coordinates: vertices[i] = (x, y)
    pub vertices: Vec<Point2>,

    /// Cell-vertex connectivity: cells[c] = [v0, v1, v2]
    pub cells: Vec<[usize; 3]>,

    /// Facet list with connectivity information
    pub facets: Vec<Facet>,

    /// Cell-to-facet mapping: cell_facets[c][i] = facet opposite local vertex i
    pub cell_facets: Vec<[usize; 3]>,

    /// Vertex-to-cell connectivity: vertex_to_cells[v] = cells containing v
    pub vertex_to_cells: Vec<Vec<usize>>,

    /// Cached cell geometry
    pub cell_info: Vec<CellInfo>,

    /// Cached facet geometry
    pub facet_info: Vec<FacetInfo>,

    /// Names of the boundary regions, indexed by region number
    pub region_names: Vec<String>,

    /// Number of owned cells; cells from here on are ghosts
    pub n_owned_cells: usize,
}

impl TriMesh2D {
    /// Build a mesh where every cell is owned.
    pub fn new(vertices: Vec<Point2>, cells: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        let n_cells = cells.len();
        Self::with_ghosts(vertices, cells, n_cells)
    }

    /// Build a mesh where cells `n_owned_cells..` are read-only ghost cells.
    ///
    /// Single-cell facets of owned cells are on the domain boundary, single
    /// cell facets of ghost cells are the outer edge of the ghost layer.
    pub fn with_ghosts(
        vertices: Vec<Point2>,
        cells: Vec<[usize; 3]>,
        n_owned_cells: usize,
    ) -> Result<Self, MeshError> {
        let n_vertices = vertices.len();
        if n_owned_cells > cells.len() {
            return Err(MeshError::InvalidGhostOffset {
                offset: n_owned_cells,
                n_cells: cells.len(),
            });
        }

        let mut cell_info = Vec::with_capacity(cells.len());
        for (c, cell) in cells.iter().enumerate() {
            for &v in cell {
                if v >= n_vertices {
                    return Err(MeshError::InvalidVertex {
                        cell: c,
                        vertex: v,
                        n_vertices,
                    });
                }
            }
            let info = CellInfo::triangle(cell.map(|v| vertices[v]));
            let h = longest_edge(cell.map(|v| vertices[v]));
            if info.volume <= f64::EPSILON * h * h {
                return Err(MeshError::DegenerateCell {
                    cell: c,
                    area: info.volume,
                });
            }
            cell_info.push(info);
        }

        // Facets are numbered in order of first appearance
        let mut facet_ids: HashMap<(usize, usize), usize> = HashMap::new();
        let mut facet_cells: Vec<Vec<usize>> = Vec::new();
        let mut facet_vertices: Vec<[usize; 2]> = Vec::new();
        let mut cell_facets = vec![[0usize; 3]; cells.len()];

        for (c, cell) in cells.iter().enumerate() {
            for i in 0..3 {
                let (a, b) = (cell[(i + 1) % 3], cell[(i + 2) % 3]);
                let key = if a < b { (a, b) } else { (b, a) };
                let f = *facet_ids.entry(key).or_insert_with(|| {
                    facet_cells.push(Vec::with_capacity(2));
                    facet_vertices.push([key.0, key.1]);
                    facet_vertices.len() - 1
                });
                if facet_cells[f].len() == 2 {
                    return Err(MeshError::NonManifoldFacet(key.0, key.1));
                }
                facet_cells[f].push(c);
                cell_facets[c][i] = f;
            }
        }

        let facets = facet_cells
            .iter()
            .zip(&facet_vertices)
            .map(|(adjacent, &vertices)| {
                let cells = match adjacent[..] {
                    [c0, c1] => FacetCells::Interior(c0.min(c1), c0.max(c1)),
                    [c0] => FacetCells::Exterior(c0),
                    _ => unreachable!("every facet has one or two cells"),
                };
                let on_boundary = !cells.is_interior() && cells.first() < n_owned_cells;
                Facet {
                    vertices,
                    cells,
                    on_boundary,
                    region: None,
                }
            })
            .collect();

        let vertex_to_cells = Self::build_vertex_to_cells(&cells, n_vertices);

        let mut mesh = Self {
            vertices,
            cells,
            facets,
            cell_facets,
            vertex_to_cells,
            cell_info,
            facet_info: Vec::new(),
            region_names: Vec::new(),
            n_owned_cells,
        };
        mesh.facet_info = mesh.compute_facet_info();
        Ok(mesh)
    }

    /// Create a uniform triangulation of [x0, x1] × [y0, y1].
    ///
    /// Each of the nx × ny rectangles is split along its rising diagonal into
    /// the triangles (v0, v1, v3) and (v0, v2, v3), where v0 is the
    /// bottom-left, v1 the bottom-right, v2 the top-left and v3 the top-right
    /// corner.
    pub fn uniform_rectangle(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> Self {
        assert!(
            nx > 0 && ny > 0,
            "Need at least one element in each direction"
        );
        assert!(x1 > x0 && y1 > y0, "Invalid domain bounds");

        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;

        let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                vertices.push((x0 + i as f64 * dx, y0 + j as f64 * dy));
            }
        }

        let mut cells = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let v0 = j * (nx + 1) + i;
                let v1 = v0 + 1;
                let v2 = v0 + (nx + 1);
                let v3 = v1 + (nx + 1);
                cells.push([v0, v1, v3]);
                cells.push([v0, v2, v3]);
            }
        }

        match Self::new(vertices, cells) {
            Ok(mesh) => mesh,
            Err(e) => panic!("uniform rectangle triangulation is invalid: {e}"),
        }
    }

    /// Create a line of `n` triangle pairs along the x-axis: a quasi-1D strip
    /// of height `h` covering [x0, x1].
    pub fn strip(x0: f64, x1: f64, h: f64, n: usize) -> Self {
        Self::uniform_rectangle(x0, x1, 0.0, h, n, 1)
    }

    /// Mark exterior facets as belonging to a named boundary region.
    ///
    /// A facet is in the region if `inside` holds at both end vertices and
    /// at the midpoint. Regions are numbered in the order they are marked and
    /// later regions take over facets already claimed by earlier ones.
    ///
    /// Returns the region number.
    pub fn mark_boundary<F>(&mut self, name: &str, inside: F) -> usize
    where
        F: Fn(Point2) -> bool,
    {
        let region = self.region_names.len();
        self.region_names.push(name.to_string());

        for (f, facet) in self.facets.iter_mut().enumerate() {
            if !facet.on_boundary {
                continue;
            }
            let [a, b] = facet.vertices;
            if inside(self.vertices[a])
                && inside(self.vertices[b])
                && inside(self.facet_info[f].midpoint)
            {
                facet.region = Some(region);
            }
        }
        region
    }

    /// Region number of a named boundary region.
    pub fn region_number(&self, name: &str) -> Option<usize> {
        self.region_names.iter().position(|n| n == name)
    }

    /// Move every vertex through `map` and re-derive the cached geometry.
    pub fn move_vertices<F>(&mut self, map: F)
    where
        F: Fn(Point2) -> Point2,
    {
        for v in self.vertices.iter_mut() {
            *v = map(*v);
        }
        self.cell_info = self
            .cells
            .iter()
            .map(|cell| CellInfo::triangle(cell.map(|v| self.vertices[v])))
            .collect();
        self.facet_info = self.compute_facet_info();
    }

    fn compute_facet_info(&self) -> Vec<FacetInfo> {
        self.facets
            .iter()
            .map(|facet| {
                let [a, b] = facet.vertices;
                let inside = self.cell_info[facet.cells.first()].midpoint;
                FacetInfo::edge(self.vertices[a], self.vertices[b], inside)
            })
            .collect()
    }

    /// Build vertex-to-cell connectivity from cell-vertex connectivity.
    pub(crate) fn build_vertex_to_cells(cells: &[[usize; 3]], n_vertices: usize) -> Vec<Vec<usize>> {
        let mut v2c = vec![Vec::with_capacity(6); n_vertices];
        for (c, cell) in cells.iter().enumerate() {
            for &v in cell {
                v2c[v].push(c);
            }
        }
        v2c
    }
}

fn longest_edge(v: [Point2; 3]) -> f64 {
    (0..3)
        .map(|i| {
            let (a, b) = (v[i], v[(i + 1) % 3]);
            ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
        })
        .fold(0.0, f64::max)
}

impl MeshTopology for TriMesh2D {
    #[inline]
    fn num_owned_cells(&self) -> usize {
        self.n_owned_cells
    }

    #[inline]
    fn num_all_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn num_facets(&self) -> usize {
        self.facets.len()
    }

    #[inline]
    fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn cell_volume(&self, cell: usize) -> f64 {
        self.cell_info[cell].volume
    }

    #[inline]
    fn cell_midpoint(&self, cell: usize) -> Point2 {
        self.cell_info[cell].midpoint
    }

    #[inline]
    fn cell_vertices(&self, cell: usize) -> [usize; 3] {
        self.cells[cell]
    }

    #[inline]
    fn cell_facets(&self, cell: usize) -> [usize; 3] {
        self.cell_facets[cell]
    }

    #[inline]
    fn facet_area(&self, facet: usize) -> f64 {
        self.facet_info[facet].area
    }

    #[inline]
    fn facet_normal(&self, facet: usize) -> Point2 {
        self.facet_info[facet].normal
    }

    #[inline]
    fn facet_midpoint(&self, facet: usize) -> Point2 {
        self.facet_info[facet].midpoint
    }

    #[inline]
    fn facet_cells(&self, facet: usize) -> FacetCells {
        self.facets[facet].cells
    }

    #[inline]
    fn is_exterior(&self, facet: usize) -> bool {
        self.facets[facet].on_boundary
    }

    #[inline]
    fn facet_vertices(&self, facet: usize) -> [usize; 2] {
        self.facets[facet].vertices
    }

    #[inline]
    fn facet_region(&self, facet: usize) -> Option<usize> {
        self.facets[facet].region
    }

    #[inline]
    fn vertex_coordinates(&self, vertex: usize) -> Point2 {
        self.vertices[vertex]
    }

    #[inline]
    fn vertex_neighbor_cells(&self, vertex: usize) -> &[usize] {
        &self.vertex_to_cells[vertex]
    }
}

//! Boundary region marks of dofs and the cell layers next to boundaries.

use log::warn;

use crate::basis::{DofMap, DofNode};
use crate::mesh::MeshTopology;
use crate::types::{CellIndex, DofIndex};

/// Name selecting every boundary region.
pub const ALL_REGIONS: &str = "all";

/// Boundary regions touched by each dof.
///
/// A vertex dof carries the region of every exterior facet containing its
/// vertex, an edge dof the region of its own facet. Dofs away from the
/// boundary carry no region.
#[derive(Clone, Debug, Default)]
pub struct DofRegionMarks {
    marks: Vec<Vec<usize>>,
}

impl DofRegionMarks {
    /// Compute the marks of every dof of `dofmap`.
    pub fn compute<M: MeshTopology + ?Sized>(mesh: &M, dofmap: &DofMap) -> Self {
        let mut vertex_regions: Vec<Vec<usize>> = vec![Vec::new(); mesh.num_vertices()];
        for f in 0..mesh.num_facets() {
            if !mesh.is_exterior(f) {
                continue;
            }
            if let Some(region) = mesh.facet_region(f) {
                for v in mesh.facet_vertices(f) {
                    vertex_regions[v].push(region);
                }
            }
        }
        for regions in vertex_regions.iter_mut() {
            regions.sort_unstable();
            regions.dedup();
        }

        let marks = DofIndex::iter(dofmap.num_dofs())
            .map(|dof| match dofmap.node(dof) {
                DofNode::Vertex(v) => vertex_regions[v].clone(),
                DofNode::Facet(f) if mesh.is_exterior(f) => {
                    mesh.facet_region(f).into_iter().collect()
                }
                DofNode::Facet(_) | DofNode::Cell(_) => Vec::new(),
            })
            .collect();

        Self { marks }
    }

    /// Regions of a dof in ascending order.
    #[inline]
    pub fn regions(&self, dof: usize) -> &[usize] {
        &self.marks[dof]
    }

    /// The highest numbered region of a dof.
    #[inline]
    pub fn region(&self, dof: usize) -> Option<usize> {
        self.marks[dof].last().copied()
    }

    /// Returns `true` if the dof is in `region`.
    #[inline]
    pub fn contains(&self, dof: usize, region: usize) -> bool {
        self.marks[dof].binary_search(&region).is_ok()
    }

    /// Number of dofs that are in `region`.
    pub fn count_in_region(&self, region: usize) -> usize {
        (0..self.marks.len()).filter(|&d| self.contains(d, region)).count()
    }

    /// Number of dofs with at least one region.
    pub fn num_marked(&self) -> usize {
        self.marks.iter().filter(|m| !m.is_empty()).count()
    }

    /// Number of dofs.
    #[inline]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Returns `true` if there are no dofs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// Resolve boundary names into region numbers.
///
/// `"all"` selects every region and an empty list selects none. Unknown
/// names are reported and ignored.
pub fn select_regions(region_names: &[String], names: &[String]) -> Vec<usize> {
    if names.iter().any(|n| n == ALL_REGIONS) {
        return (0..region_names.len()).collect();
    }

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        match region_names.iter().position(|r| r == name) {
            Some(region) => selected.push(region),
            None => warn!(
                "Unknown boundary region \"{}\" (available: {})",
                name,
                region_names.join(", ")
            ),
        }
    }
    selected.sort_unstable();
    selected.dedup();
    selected
}

/// Flag the cells owning a dof in one of `regions`, grown by `layers`
/// rings of vertex neighbours.
///
/// The result has one entry per cell, ghosts included.
pub fn mark_cell_layers<M: MeshTopology + ?Sized>(
    mesh: &M,
    dofmap: &DofMap,
    marks: &DofRegionMarks,
    regions: &[usize],
    layers: usize,
) -> Vec<bool> {
    let mut flagged = vec![false; mesh.num_all_cells()];
    if regions.is_empty() {
        return flagged;
    }

    for cell in CellIndex::iter(dofmap.num_cells()) {
        flagged[cell.get()] = dofmap
            .cell_dofs(cell)
            .any(|dof| regions.iter().any(|&r| marks.contains(dof, r)));
    }

    for _ in 0..layers {
        let previous = flagged.clone();
        for c in (0..previous.len()).filter(|&c| previous[c]) {
            for v in mesh.cell_vertices(c) {
                for &n in mesh.vertex_neighbor_cells(v) {
                    flagged[n] = true;
                }
            }
        }
    }

    flagged
}

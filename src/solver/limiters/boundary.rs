//! Boundary values seen by the slope limiters.
//!
//! Each boundary dof is assigned to one region (the highest numbered one
//! when it touches several) and gets the condition of the limited field on
//! that region. Dirichlet values take part in the local bounds of the dof
//! like an extra neighbour, Neumann dofs are left unconstrained.

use std::collections::{BTreeMap, HashSet};

use log::warn;

use crate::basis::DofMap;
use crate::boundary::{BoundaryCondition, BoundaryConditionProvider, DofRegionMarks};
use crate::mesh::Point2;
use crate::types::DofIndex;

/// Boundary condition of one dof.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DofBc {
    /// Interior dof, or a boundary dof without a usable condition
    #[default]
    NotOnBoundary,
    /// Prescribed value at the dof
    Dirichlet(f64),
    /// Prescribed normal gradient at the dof
    Neumann(f64),
}

impl DofBc {
    /// Numeric type code: 0 interior, 1 Dirichlet, 2 Neumann.
    pub fn type_code(&self) -> u8 {
        match self {
            DofBc::NotOnBoundary => 0,
            DofBc::Dirichlet(_) => 1,
            DofBc::Neumann(_) => 2,
        }
    }
}

/// Per-dof boundary conditions of a limited field.
#[derive(Clone, Debug)]
pub struct LimiterBoundaryConditions {
    field_name: String,
    num_dofs: usize,
    active: bool,
    /// Region of each boundary dof
    dof_region: BTreeMap<usize, usize>,
    /// Dofs and their coordinates per region
    region_dofs: BTreeMap<usize, Vec<(usize, Point2)>>,
    warned: HashSet<usize>,
}

impl LimiterBoundaryConditions {
    /// Create inactive boundary conditions for `field_name`.
    pub fn new(field_name: &str, marks: &DofRegionMarks, dofmap: &DofMap) -> Self {
        let mut bcs = Self {
            field_name: field_name.to_string(),
            num_dofs: dofmap.num_dofs(),
            active: false,
            dof_region: BTreeMap::new(),
            region_dofs: BTreeMap::new(),
            warned: HashSet::new(),
        };
        bcs.set_dof_region_marks(marks, dofmap);
        bcs
    }

    /// Replace the region marks, e.g. after the boundary has moved.
    pub fn set_dof_region_marks(&mut self, marks: &DofRegionMarks, dofmap: &DofMap) {
        self.dof_region.clear();
        self.region_dofs.clear();
        for dof in 0..marks.len() {
            if let Some(region) = marks.region(dof) {
                self.dof_region.insert(dof, region);
                self.region_dofs
                    .entry(region)
                    .or_default()
                    .push((dof, dofmap.coordinates(DofIndex::new(dof))));
            }
        }
    }

    /// Switch boundary handling on or off.
    pub fn activate(&mut self, active: bool) {
        self.active = active;
    }

    /// Returns `true` if boundary handling is on.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Name of the limited field.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Region of a dof, if it is on the boundary.
    pub fn dof_region(&self, dof: usize) -> Option<usize> {
        self.dof_region.get(&dof).copied()
    }

    /// Condition of every dof.
    ///
    /// Inactive conditions give [`DofBc::NotOnBoundary`] everywhere. A region
    /// without a condition for this field is reported once and left
    /// unconstrained.
    pub fn get_bcs(&mut self, provider: &dyn BoundaryConditionProvider) -> Vec<DofBc> {
        let mut bcs = vec![DofBc::NotOnBoundary; self.num_dofs];
        if !self.active {
            return bcs;
        }

        for (&region, dofs) in &self.region_dofs {
            let (value, neumann) = match provider.condition(&self.field_name, region) {
                Some(BoundaryCondition::Dirichlet(value)) => (value, false),
                Some(BoundaryCondition::Neumann(value)) => (value, true),
                None => {
                    if self.warned.insert(region) {
                        warn!(
                            "Field {} has no boundary condition in region {}",
                            self.field_name,
                            provider
                                .region_name(region)
                                .map_or_else(|| region.to_string(), str::to_string)
                        );
                    }
                    continue;
                }
            };

            for &(dof, x) in dofs {
                let v = value.eval(x);
                bcs[dof] = if neumann {
                    DofBc::Neumann(v)
                } else {
                    DofBc::Dirichlet(v)
                };
            }
        }
        bcs
    }
}

/// Local bounds of a dof: `center` widened by the neighbour values and,
/// when `use_dirichlet` is set, by a Dirichlet value.
///
/// Returns `None` when the dof imposes no constraint: Neumann dofs and dofs
/// without neighbours or Dirichlet value.
pub(crate) fn dof_bounds<I>(center: f64, neighbours: I, bc: DofBc, use_dirichlet: bool) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    if let DofBc::Neumann(_) = bc {
        return None;
    }

    let (mut lo, mut hi) = (center, center);
    let mut constrained = false;
    for v in neighbours {
        lo = lo.min(v);
        hi = hi.max(v);
        constrained = true;
    }
    if let (DofBc::Dirichlet(v), true) = (bc, use_dirichlet) {
        lo = lo.min(v);
        hi = hi.max(v);
        constrained = true;
    }
    constrained.then_some((lo, hi))
}

/// Largest α in [0, 1] keeping `center + α (value - center)` inside `[lo, hi]`.
#[inline]
pub(crate) fn bounded_alpha(center: f64, value: f64, lo: f64, hi: f64) -> f64 {
    if value > center {
        ((hi - center) / (value - center)).min(1.0)
    } else if value < center {
        ((lo - center) / (value - center)).min(1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BcValue, BoundaryConditions};
    use crate::mesh::TriMesh2D;

    fn setup() -> (TriMesh2D, DofMap, DofRegionMarks) {
        let mut mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 4, 4);
        mesh.mark_boundary("walls", |_| true);
        mesh.mark_boundary("inlet", |(x, _)| x < 1e-6);
        let dm = DofMap::new(&mesh, 1).unwrap();
        let marks = DofRegionMarks::compute(&mesh, &dm);
        (mesh, dm, marks)
    }

    #[test]
    fn test_inactive_conditions_are_interior() {
        let (mesh, dm, marks) = setup();
        let mut provider = BoundaryConditions::new(mesh.region_names.clone());
        provider.dirichlet("c", 1, 1.0);

        let mut bcs = LimiterBoundaryConditions::new("c", &marks, &dm);
        assert!(!bcs.is_active());
        assert!(bcs.get_bcs(&provider).iter().all(|&bc| bc == DofBc::NotOnBoundary));
    }

    #[test]
    fn test_dirichlet_and_neumann_assignment() {
        let (mesh, dm, marks) = setup();
        let mut provider = BoundaryConditions::new(mesh.region_names.clone());
        provider
            .set("c", 0, BoundaryCondition::Neumann(BcValue::Constant(0.0)))
            .set("c", 1, BoundaryCondition::Dirichlet(BcValue::expression(|(_, y)| y)));

        let mut bcs = LimiterBoundaryConditions::new("c", &marks, &dm);
        bcs.activate(true);
        let dof_bcs = bcs.get_bcs(&provider);

        for dof in 0..dm.num_dofs() {
            let (x, y) = dm.coordinates(DofIndex::new(dof));
            match bcs.dof_region(dof) {
                Some(1) => {
                    assert!(x < 1e-6);
                    assert_eq!(dof_bcs[dof], DofBc::Dirichlet(y));
                }
                Some(0) => assert_eq!(dof_bcs[dof].type_code(), 2),
                Some(r) => panic!("unexpected region {}", r),
                None => assert_eq!(dof_bcs[dof], DofBc::NotOnBoundary),
            }
        }
    }

    #[test]
    fn test_missing_condition_is_unconstrained() {
        let (mesh, dm, marks) = setup();
        let provider = BoundaryConditions::new(mesh.region_names.clone());

        let mut bcs = LimiterBoundaryConditions::new("c", &marks, &dm);
        bcs.activate(true);
        for _ in 0..2 {
            assert!(bcs.get_bcs(&provider).iter().all(|&bc| bc == DofBc::NotOnBoundary));
        }
        assert_eq!(bcs.warned.len(), 2);
    }

    #[test]
    fn test_dof_bounds() {
        assert_eq!(dof_bounds(0.5, [0.2, 0.9], DofBc::NotOnBoundary, true), Some((0.2, 0.9)));
        assert_eq!(dof_bounds(0.5, [], DofBc::NotOnBoundary, true), None);
        assert_eq!(dof_bounds(0.5, [], DofBc::Dirichlet(1.0), true), Some((0.5, 1.0)));
        assert_eq!(dof_bounds(0.5, [0.4], DofBc::Dirichlet(1.0), false), Some((0.4, 0.5)));
        assert_eq!(dof_bounds(0.5, [0.2, 0.9], DofBc::Neumann(0.0), true), None);
    }

    #[test]
    fn test_bounded_alpha() {
        assert_eq!(bounded_alpha(0.5, 0.5, 0.0, 1.0), 1.0);
        assert_eq!(bounded_alpha(0.5, 0.7, 0.0, 1.0), 1.0);
        assert!((bounded_alpha(0.5, 1.5, 0.0, 1.0) - 0.5).abs() < 1e-15);
        assert!((bounded_alpha(0.5, -0.5, 0.25, 1.0) - 0.25).abs() < 1e-15);
        assert_eq!(bounded_alpha(0.5, 0.9, 0.5, 0.5), 0.0);
    }
}

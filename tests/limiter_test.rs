//! Integration tests for the slope limiters.
//!
//! These tests verify:
//! 1. Cell averages are preserved by the nodal limiter
//! 2. Idempotence of the hierarchical Taylor limiter on DG1 fields
//! 3. alpha2 <= alpha1 for DG2 fields
//! 4. Boundary conditions and skipped boundary regions
//! 5. Limiter selection from the simulation input

use dg_vof::boundary::{BoundaryConditions, DofRegionMarks};
use dg_vof::mesh::{MeshTopology, TriMesh2D};
use dg_vof::solver::limiters::{
    BoundsSource, HierarchicalTaylorLimiter, LimiterBoundaryConditions, LimiterContext,
    SlopeLimiter, StandardSlopeLimiter, create_slope_limiter,
};
use dg_vof::{ConfigError, DofMap, SerialCommunicator, SimulationInput};
use proptest::prelude::*;

const TOL: f64 = 1e-10;

/// Interpolate `f` into the dofs of a DG field.
fn interpolate(dm: &DofMap, f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    (0..dm.num_dofs())
        .map(|dof| {
            let (x, y) = dm.coordinates(dof.into());
            f(x, y)
        })
        .collect()
}

fn setup(n: usize, degree: usize) -> (TriMesh2D, DofMap) {
    let mut mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, n, n);
    mesh.mark_boundary("walls", |_| true);
    mesh.mark_boundary("left", |(x, _)| x < 1e-6);
    let dm = DofMap::new(&mesh, degree).unwrap();
    (mesh, dm)
}

fn taylor_limiter(mesh: &TriMesh2D, dm: &DofMap, active_bcs: bool) -> HierarchicalTaylorLimiter {
    let marks = DofRegionMarks::compute(mesh, dm);
    let mut bcs = LimiterBoundaryConditions::new("c", &marks, dm);
    bcs.activate(active_bcs);
    HierarchicalTaylorLimiter::new(mesh, dm, "c", vec![false; dm.num_cells()], bcs).unwrap()
}

fn input(yaml: &str) -> SimulationInput {
    SimulationInput::from_yaml_str(yaml).unwrap()
}

/// Cells with a vertex on x = 0.
fn left_cells(mesh: &TriMesh2D) -> Vec<usize> {
    (0..mesh.num_owned_cells())
        .filter(|&c| {
            mesh.cell_vertices(c)
                .iter()
                .any(|&v| mesh.vertex_coordinates(v).0 < 1e-6)
        })
        .collect()
}

fn cell_values(dm: &DofMap, values: &[f64], c: usize) -> Vec<f64> {
    values[dm.cell_dofs(c.into())].to_vec()
}

// ============================================================================
// Nodal limiter
// ============================================================================

#[test]
fn test_nodal_preserves_cell_averages() {
    let (mesh, dm) = setup(8, 1);
    let limiter_input = input("slope_limiter: {c: {method: nodal}}");
    let mut limiter =
        create_slope_limiter(&mesh, &dm, "c", &limiter_input.limiter("c"), &mesh.region_names).unwrap();
    assert_eq!(limiter.name(), "nodal");

    // Smooth field with a few spikes
    let mut values = interpolate(&dm, |x, y| (3.0 * x).sin() * (2.0 * y).cos());
    for c in [5, 40, 77] {
        let dofs = dm.cell_dofs(c.into());
        values[dofs.start] += 0.8;
        values[dofs.start + 1] -= 0.5;
    }
    let before = dm.cell_averages(&values);

    limiter.run(&mut values, &LimiterContext::default());

    let after = dm.cell_averages(&values);
    for (c, (a, b)) in before.iter().zip(&after).enumerate() {
        assert!((a - b).abs() < TOL, "cell {}: {} != {}", c, a, b);
    }
    assert!(limiter.plot_fields().is_empty(), "plot is off");
    assert_eq!(limiter.diagnostics()[0].name, "SlopeLimiterExceedance_c");
}

#[test]
fn test_nodal_constant_field_is_untouched() {
    let (mesh, dm) = setup(6, 1);
    let mut limiter = create_slope_limiter(
        &mesh,
        &dm,
        "c",
        &input("slope_limiter: {c: {method: nodal, plot: true}}").limiter("c"),
        &mesh.region_names,
    )
    .unwrap();

    let mut values = vec![0.3; dm.num_dofs()];
    limiter.run(&mut values, &LimiterContext::default());
    assert!(values.iter().all(|&v| v == 0.3));

    let plots = limiter.plot_fields();
    assert_eq!(plots.len(), 1);
    assert_eq!(plots[0].name, "SlopeLimiterExceedance_c");
    assert!(plots[0].values.iter().all(|&e| e == 0.0));
}

// ============================================================================
// Hierarchical Taylor limiter
// ============================================================================

#[test]
fn test_taylor_dg1_is_idempotent() {
    let (mesh, dm) = setup(8, 1);
    let mut limiter = taylor_limiter(&mesh, &dm, false);
    let ctx = LimiterContext::default();

    let mut values = interpolate(&dm, |x, y| if x + 0.3 * y < 0.55 { 1.0 } else { 0.0 });
    // Perturb every cell so that the field is genuinely discontinuous
    for (i, v) in values.iter_mut().enumerate() {
        *v += 0.05 * ((i % 7) as f64 - 3.0);
    }

    limiter.run(&mut values, &ctx);
    let once = values.clone();
    limiter.run(&mut values, &ctx);

    for (dof, (a, b)) in once.iter().zip(&values).enumerate() {
        assert!((a - b).abs() < 1e-12, "dof {}: {} != {}", dof, a, b);
    }
}

#[test]
fn test_taylor_dg1_linear_field_interior_cells_untouched() {
    let (mesh, dm) = setup(6, 1);
    let mut limiter = taylor_limiter(&mesh, &dm, false);
    let original = interpolate(&dm, |x, y| 2.0 * x - y);
    let mut values = original.clone();
    limiter.run(&mut values, &LimiterContext::default());

    let boundary_cell = |c: usize| {
        mesh.cell_vertices(c).iter().any(|&v| {
            let (x, y) = mesh.vertex_coordinates(v);
            x < 1e-6 || x > 1.0 - 1e-6 || y < 1e-6 || y > 1.0 - 1e-6
        })
    };
    for c in (0..mesh.num_owned_cells()).filter(|&c| !boundary_cell(c)) {
        assert_eq!(limiter.alpha1()[c], 1.0, "cell {}", c);
        assert_eq!(cell_values(&dm, &values, c), cell_values(&dm, &original, c));
    }
}

#[test]
fn test_taylor_dirichlet_value_widens_bounds() {
    let (mesh, dm) = setup(10, 1);
    let left = mesh.region_number("left").unwrap();
    let original = interpolate(&dm, |x, _| x);
    let comm = SerialCommunicator;

    // Boundary conditions switched off: the left boundary values lie below
    // every neighbour average
    let mut values = original.clone();
    let mut limiter = taylor_limiter(&mesh, &dm, false);
    limiter.run(&mut values, &LimiterContext::default());
    assert!(left_cells(&mesh).iter().any(|&c| limiter.alpha1()[c] < 1.0));

    // Matching Dirichlet value: nothing at the left boundary is limited
    let mut provider = BoundaryConditions::new(mesh.region_names.clone());
    provider.dirichlet("c", left, 0.0);
    let mut values = original.clone();
    let mut limiter = taylor_limiter(&mesh, &dm, true);
    limiter.run(&mut values, &LimiterContext::with_bcs(&comm, &provider));
    for c in left_cells(&mesh) {
        assert_eq!(limiter.alpha1()[c], 1.0, "cell {}", c);
        assert_eq!(cell_values(&dm, &values, c), cell_values(&dm, &original, c));
    }

    // A Dirichlet value inside the neighbour range does not help
    let mut provider = BoundaryConditions::new(mesh.region_names.clone());
    provider.dirichlet("c", left, 0.5);
    let mut values = original.clone();
    let mut limiter = taylor_limiter(&mesh, &dm, true);
    limiter.run(&mut values, &LimiterContext::with_bcs(&comm, &provider));
    assert!(left_cells(&mesh).iter().any(|&c| limiter.alpha1()[c] < 1.0));
}

#[test]
fn test_taylor_neumann_dofs_are_unconstrained() {
    let (mesh, dm) = setup(10, 1);
    let left = mesh.region_number("left").unwrap();
    let original = interpolate(&dm, |x, _| x);

    let mut provider = BoundaryConditions::new(mesh.region_names.clone());
    provider.neumann("c", left, 0.0);
    let mut values = original.clone();
    let mut limiter = taylor_limiter(&mesh, &dm, true);
    limiter.run(&mut values, &LimiterContext::with_bcs(&SerialCommunicator, &provider));

    for c in left_cells(&mesh) {
        assert_eq!(limiter.alpha1()[c], 1.0, "cell {}", c);
    }
}

#[test]
fn test_skip_boundaries_leaves_adjacent_cells() {
    let (mesh, dm) = setup(10, 1);
    let original = interpolate(&dm, |x, _| x);
    let config = input("slope_limiter: {c: {method: HierarchicalTaylor, skip_boundaries: [left]}}");
    let mut limiter = create_slope_limiter(&mesh, &dm, "c", &config.limiter("c"), &mesh.region_names).unwrap();

    let mut values = original.clone();
    limiter.run(&mut values, &LimiterContext::default());

    for c in left_cells(&mesh) {
        assert_eq!(cell_values(&dm, &values, c), cell_values(&dm, &original, c));
    }
    // The right boundary is still limited
    assert_ne!(values, original);

    let StandardSlopeLimiter::HierarchicalTaylor(ht) = limiter.limiter() else {
        panic!("expected the hierarchical Taylor limiter");
    };
    assert_eq!(ht.degree(), 1);
}

#[test]
fn test_taylor_dg2_alpha_diagnostics() {
    let (mesh, dm) = setup(6, 2);
    let config = input("slope_limiter: {c: {method: HierarchicalTaylor, plot: true}}");
    let mut limiter = create_slope_limiter(&mesh, &dm, "c", &config.limiter("c"), &mesh.region_names).unwrap();
    let mut values = interpolate(&dm, |x, y| if (x - 0.5).hypot(y - 0.5) < 0.3 { 1.0 } else { 0.0 });
    limiter.run(&mut values, &LimiterContext::default());

    let names: Vec<&str> = limiter.plot_fields().iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["SlopeLimiterAlpha1_c", "SlopeLimiterAlpha2_c"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_taylor_dg2_alpha2_below_alpha1(
        noise in prop::collection::vec(-1.0f64..1.0, 6 * 2 * 5 * 5),
        a in -3.0f64..3.0,
        b in -3.0f64..3.0,
    ) {
        let (mesh, dm) = setup(5, 2);
        prop_assert_eq!(noise.len(), dm.num_dofs());
        let mut values = interpolate(&dm, |x, y| a * x * x + b * x * y - y);
        for (v, n) in values.iter_mut().zip(&noise) {
            *v += 0.3 * n;
        }

        let mut limiter = taylor_limiter(&mesh, &dm, false);
        limiter.run(&mut values, &LimiterContext::default());

        for c in 0..mesh.num_owned_cells() {
            let (a1, a2) = (limiter.alpha1()[c], limiter.alpha2()[c]);
            prop_assert!(a2 <= a1, "cell {}: alpha2 = {} > alpha1 = {}", c, a2, a1);
            prop_assert!((0.0..=1.0).contains(&a1));
            prop_assert!((0.0..=1.0).contains(&a2));
        }
    }

    #[test]
    fn prop_nodal_preserves_averages(noise in prop::collection::vec(-1.0f64..1.0, 3 * 2 * 4 * 4)) {
        let (mesh, dm) = setup(4, 1);
        let config = input("slope_limiter: {c: {method: nodal}}");
        let mut limiter = create_slope_limiter(&mesh, &dm, "c", &config.limiter("c"), &[]).unwrap();
        let mut values = noise.clone();
        let before = dm.cell_averages(&values);
        limiter.run(&mut values, &LimiterContext::default());
        let after = dm.cell_averages(&values);
        for (a, b) in before.iter().zip(&after) {
            prop_assert!((a - b).abs() < TOL);
        }
    }
}

// ============================================================================
// OnlyBound and selection
// ============================================================================

#[test]
fn test_only_bound_clamps_into_global_bounds() {
    let mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 1);
    let dm = DofMap::new(&mesh, 0).unwrap();
    let config = input("slope_limiter: {c: {method: OnlyBound, enforce_bounds: true}}");
    let mut limiter = create_slope_limiter(&mesh, &dm, "c", &config.limiter("c"), &[]).unwrap();

    assert_eq!(limiter.name(), "OnlyBound");
    assert!(!limiter.is_active());
    assert_eq!(
        limiter.set_global_bounds(BoundsSource::Range(0.0, 1.0), &SerialCommunicator),
        Some((0.0, 1.0))
    );

    let mut values = vec![-0.3, 0.5, 1.4, 0.7];
    limiter.run(&mut values, &LimiterContext::default());
    assert_eq!(values, vec![0.0, 0.5, 1.0, 0.7]);
}

#[test]
fn test_degree_zero_switches_to_only_bound() {
    let (mesh, dm) = setup(3, 0);
    let config = input("slope_limiter: {c: {method: HierarchicalTaylor}}");
    let limiter = create_slope_limiter(&mesh, &dm, "c", &config.limiter("c"), &mesh.region_names).unwrap();
    assert_eq!(limiter.name(), "OnlyBound");
}

#[test]
fn test_limiter_selection_errors() {
    let (mesh, dm2) = setup(3, 2);

    let config = input("slope_limiter: {c: {method: nodal}}");
    let err = create_slope_limiter(&mesh, &dm2, "c", &config.limiter("c"), &mesh.region_names).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedDegree { degree: 2, .. }));

    let config = input("slope_limiter: {c: {method: HierarchicalTaylor, filter: minmax}}");
    let err = create_slope_limiter(&mesh, &dm2, "c", &config.limiter("c"), &mesh.region_names).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));

    let config = input("slope_limiter: {c: {method: Kuzmin}}");
    let err = create_slope_limiter(&mesh, &dm2, "c", &config.limiter("c"), &mesh.region_names).unwrap_err();
    assert!(err.to_string().contains("HierarchicalTaylor"));

    let config = input("slope_limiter: {c: {method: nodal, filter: smooth}}");
    assert!(config.validate().is_err());
}

#[test]
fn test_default_limiter_does_nothing() {
    let (mesh, dm) = setup(4, 1);
    let mut limiter = create_slope_limiter(&mesh, &dm, "u0", &input("{}").limiter("u0"), &mesh.region_names).unwrap();
    assert_eq!(limiter.name(), "None");
    assert!(!limiter.is_active());

    let mut values = interpolate(&dm, |x, y| if x > y { 5.0 } else { -5.0 });
    let original = values.clone();
    limiter.run(&mut values, &LimiterContext::default());
    assert_eq!(values, original);
}

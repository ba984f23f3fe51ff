//! Standard limiter implementations, name tables and the limiter factory.

use log::info;

use super::boundary::LimiterBoundaryConditions;
use super::hierarchical_taylor::HierarchicalTaylorLimiter;
use super::nodal::BasicNodalLimiter;
use super::traits::{BoundsSource, DiagnosticField, LimiterContext, SlopeLimiter};
use crate::basis::DofMap;
use crate::boundary::{ALL_REGIONS, DofRegionMarks, mark_cell_layers, select_regions};
use crate::config::LimiterConfig;
use crate::error::ConfigError;
use crate::mesh::MeshTopology;
use crate::parallel::{Communicator, global_min_max};

/// Limiter used when the input does not name one.
pub const DEFAULT_LIMITER: &str = "None";

/// Filter used when the input does not name one.
pub const DEFAULT_FILTER: &str = "nofilter";

/// Known limiter names with their method and description.
pub const LIMITER_METHODS: &[(&str, LimiterMethod, &str)] = &[
    ("None", LimiterMethod::None, "No slope limiter"),
    ("OnlyBound", LimiterMethod::OnlyBound, "Bounding limiter"),
    (
        "nodal",
        LimiterMethod::Nodal,
        "Keeps dof node values inside the range of the surrounding cell averages",
    ),
    (
        "HierarchicalTaylor",
        LimiterMethod::HierarchicalTaylor,
        "Limits Taylor derivatives at the vertices, highest order first",
    ),
];

/// Known post-processing filters.
pub const FILTER_METHODS: &[(&str, FilterMethod)] = &[
    ("nofilter", FilterMethod::NoFilter),
    ("minmax", FilterMethod::MinMax),
];

/// Slope limiting method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LimiterMethod {
    /// No limiting
    #[default]
    None,
    /// Clamp into global bounds
    OnlyBound,
    /// Basic nodal limiter (DG1)
    Nodal,
    /// Hierarchical Taylor limiter (DG1, DG2)
    HierarchicalTaylor,
}

impl LimiterMethod {
    /// Look up a method by its input name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        LIMITER_METHODS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|&(_, method, _)| method)
            .ok_or_else(|| {
                let names: Vec<&str> = LIMITER_METHODS.iter().map(|(n, _, _)| *n).collect();
                ConfigError::unknown_name("Slope limiter", name, &names)
            })
    }

    /// Input name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            LimiterMethod::None => "None",
            LimiterMethod::OnlyBound => "OnlyBound",
            LimiterMethod::Nodal => "nodal",
            LimiterMethod::HierarchicalTaylor => "HierarchicalTaylor",
        }
    }

    /// Polynomial degrees the method accepts.
    pub fn supported_degrees(&self) -> &'static [usize] {
        match self {
            LimiterMethod::None | LimiterMethod::OnlyBound => &[0, 1, 2],
            LimiterMethod::Nodal => BasicNodalLimiter::SUPPORTED_DEGREES,
            LimiterMethod::HierarchicalTaylor => &[1, 2],
        }
    }
}

/// Post-processing filter applied after limiting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMethod {
    /// No filtering
    #[default]
    NoFilter,
    /// Clip to the global range of the first call
    MinMax,
}

impl FilterMethod {
    /// Look up a filter by its input name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        FILTER_METHODS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, filter)| filter)
            .ok_or_else(|| {
                let names: Vec<&str> = FILTER_METHODS.iter().map(|(n, _)| *n).collect();
                ConfigError::unknown_name("Slope limiter filter", name, &names)
            })
    }

    /// Input name of the filter.
    pub fn name(&self) -> &'static str {
        match self {
            FilterMethod::NoFilter => "nofilter",
            FilterMethod::MinMax => "minmax",
        }
    }
}

/// No-op limiter.
#[derive(Clone, Copy, Debug, Default)]
pub struct DoNothingLimiter;

impl SlopeLimiter for DoNothingLimiter {
    fn run(&mut self, _values: &mut [f64], _ctx: &LimiterContext) {
        // No-op
    }

    fn name(&self) -> &'static str {
        "None"
    }

    fn is_active(&self) -> bool {
        false
    }
}

/// Clamps every owned dof into global bounds.
///
/// Bounds are captured by [`set_global_bounds`](SlopeLimiter::set_global_bounds)
/// and only when bound enforcement is switched on; without bounds `run`
/// does nothing. Ghost dofs are left to the ghost exchange.
#[derive(Clone, Copy, Debug)]
pub struct OnlyBoundLimiter {
    enforce_bounds: bool,
    n_owned: usize,
    global_bounds: Option<(f64, f64)>,
}

impl OnlyBoundLimiter {
    /// Create the limiter for a field whose first `n_owned` dofs are owned.
    pub fn new(enforce_bounds: bool, n_owned: usize) -> Self {
        Self {
            enforce_bounds,
            n_owned,
            global_bounds: None,
        }
    }

    /// Whether bounds are enforced.
    #[inline]
    pub fn enforce_bounds(&self) -> bool {
        self.enforce_bounds
    }

    /// Number of owned dofs.
    #[inline]
    pub fn num_owned_dofs(&self) -> usize {
        self.n_owned
    }
}

impl SlopeLimiter for OnlyBoundLimiter {
    fn run(&mut self, values: &mut [f64], _ctx: &LimiterContext) {
        assert!(values.len() >= self.n_owned);
        if let Some((lo, hi)) = self.global_bounds {
            for v in values[..self.n_owned].iter_mut() {
                *v = v.clamp(lo, hi);
            }
        }
    }

    fn name(&self) -> &'static str {
        "OnlyBound"
    }

    fn is_active(&self) -> bool {
        false
    }

    fn set_global_bounds(&mut self, source: BoundsSource<'_>, comm: &dyn Communicator) -> Option<(f64, f64)> {
        self.global_bounds = self.enforce_bounds.then(|| match source {
            BoundsSource::Field(values) => global_min_max(values, comm),
            BoundsSource::Range(lo, hi) => (lo, hi),
        });
        self.global_bounds
    }

    fn global_bounds(&self) -> Option<(f64, f64)> {
        self.global_bounds
    }
}

/// Enum wrapper for the built-in limiters.
#[derive(Clone, Debug)]
pub enum StandardSlopeLimiter {
    /// No limiting
    DoNothing(DoNothingLimiter),
    /// Global bounds only
    OnlyBound(OnlyBoundLimiter),
    /// Basic nodal limiter
    Nodal(Box<BasicNodalLimiter>),
    /// Hierarchical Taylor limiter
    HierarchicalTaylor(Box<HierarchicalTaylorLimiter>),
}

impl Default for StandardSlopeLimiter {
    fn default() -> Self {
        StandardSlopeLimiter::DoNothing(DoNothingLimiter)
    }
}

impl StandardSlopeLimiter {
    fn as_dyn(&self) -> &dyn SlopeLimiter {
        match self {
            StandardSlopeLimiter::DoNothing(l) => l,
            StandardSlopeLimiter::OnlyBound(l) => l,
            StandardSlopeLimiter::Nodal(l) => &**l,
            StandardSlopeLimiter::HierarchicalTaylor(l) => &**l,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn SlopeLimiter {
        match self {
            StandardSlopeLimiter::DoNothing(l) => l,
            StandardSlopeLimiter::OnlyBound(l) => l,
            StandardSlopeLimiter::Nodal(l) => &mut **l,
            StandardSlopeLimiter::HierarchicalTaylor(l) => &mut **l,
        }
    }
}

impl SlopeLimiter for StandardSlopeLimiter {
    fn run(&mut self, values: &mut [f64], ctx: &LimiterContext) {
        self.as_dyn_mut().run(values, ctx);
    }

    fn name(&self) -> &'static str {
        self.as_dyn().name()
    }

    fn is_active(&self) -> bool {
        self.as_dyn().is_active()
    }

    fn set_global_bounds(&mut self, source: BoundsSource<'_>, comm: &dyn Communicator) -> Option<(f64, f64)> {
        self.as_dyn_mut().set_global_bounds(source, comm)
    }

    fn global_bounds(&self) -> Option<(f64, f64)> {
        self.as_dyn().global_bounds()
    }

    fn diagnostics(&self) -> Vec<DiagnosticField<'_>> {
        self.as_dyn().diagnostics()
    }
}

/// The limiter of one named field together with its output settings.
#[derive(Clone, Debug)]
pub struct FieldLimiter {
    field_name: String,
    plot: bool,
    limiter: StandardSlopeLimiter,
}

impl FieldLimiter {
    /// Wrap a limiter for `field_name`.
    pub fn new(field_name: &str, limiter: StandardSlopeLimiter, plot: bool) -> Self {
        Self {
            field_name: field_name.to_string(),
            plot,
            limiter,
        }
    }

    /// Name of the limited field.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The wrapped limiter.
    pub fn limiter(&self) -> &StandardSlopeLimiter {
        &self.limiter
    }

    /// Mutable access to the wrapped limiter.
    pub fn limiter_mut(&mut self) -> &mut StandardSlopeLimiter {
        &mut self.limiter
    }

    /// Diagnostic fields to write to the output, empty unless plotting is on.
    pub fn plot_fields(&self) -> Vec<DiagnosticField<'_>> {
        if self.plot {
            self.limiter.diagnostics()
        } else {
            Vec::new()
        }
    }
}

impl SlopeLimiter for FieldLimiter {
    fn run(&mut self, values: &mut [f64], ctx: &LimiterContext) {
        self.limiter.run(values, ctx);
    }

    fn name(&self) -> &'static str {
        self.limiter.name()
    }

    fn is_active(&self) -> bool {
        self.limiter.is_active()
    }

    fn set_global_bounds(&mut self, source: BoundsSource<'_>, comm: &dyn Communicator) -> Option<(f64, f64)> {
        self.limiter.set_global_bounds(source, comm)
    }

    fn global_bounds(&self) -> Option<(f64, f64)> {
        self.limiter.global_bounds()
    }

    fn diagnostics(&self) -> Vec<DiagnosticField<'_>> {
        self.limiter.diagnostics()
    }
}

/// Create the slope limiter of a field from its input section.
///
/// Degree 0 fields always get [`OnlyBoundLimiter`]. Boundary regions named
/// in `skip_boundaries` exclude the cells touching them from limiting;
/// `"all"` also switches off the boundary conditions for the remaining
/// boundary dofs.
///
/// # Errors
///
/// Unknown method or filter names, a method that does not support the
/// degree of the field and a filter the method cannot apply.
pub fn create_slope_limiter<M: MeshTopology + ?Sized>(
    mesh: &M,
    dofmap: &DofMap,
    field_name: &str,
    config: &LimiterConfig,
    region_names: &[String],
) -> Result<FieldLimiter, ConfigError> {
    let method = config.method()?;
    let filter = config.filter()?;
    let degree = dofmap.degree();

    info!("Using slope limiter {} for field {}", method.name(), field_name);
    info!("    Skip boundaries: {:?}", config.skip_boundaries);

    if degree == 0 {
        if config.method.is_some() && method != LimiterMethod::OnlyBound {
            info!(
                "    Switching to slope limiter OnlyBound for field {} (due to degree == 0)",
                field_name
            );
        }
        info!("    Enforce global bounds: {}", config.enforce_bounds);
        let limiter = StandardSlopeLimiter::OnlyBound(OnlyBoundLimiter::new(config.enforce_bounds, dofmap.num_owned_dofs()));
        return Ok(FieldLimiter::new(field_name, limiter, config.plot));
    }

    if !method.supported_degrees().contains(&degree) {
        return Err(ConfigError::UnsupportedDegree {
            method: method.name(),
            degree,
            supported: method.supported_degrees(),
        });
    }

    let marks = DofRegionMarks::compute(mesh, dofmap);
    let mut bcs = LimiterBoundaryConditions::new(field_name, &marks, dofmap);
    let skipped = select_regions(region_names, &config.skip_boundaries);
    let skip_cells = mark_cell_layers(mesh, dofmap, &marks, &skipped, 0);
    if !config.skip_boundaries.iter().any(|b| b == ALL_REGIONS) {
        bcs.activate(true);
    }
    info!(
        "    {} boundary dofs, {} cells skipped",
        marks.num_marked(),
        skip_cells.iter().filter(|&&s| s).count()
    );

    let limiter = match method {
        LimiterMethod::None => StandardSlopeLimiter::DoNothing(DoNothingLimiter),
        LimiterMethod::OnlyBound => {
            info!("    Enforce global bounds: {}", config.enforce_bounds);
            StandardSlopeLimiter::OnlyBound(OnlyBoundLimiter::new(config.enforce_bounds, dofmap.num_owned_dofs()))
        }
        LimiterMethod::Nodal => StandardSlopeLimiter::Nodal(Box::new(BasicNodalLimiter::new(
            mesh, dofmap, field_name, skip_cells, bcs, filter,
        )?)),
        LimiterMethod::HierarchicalTaylor => {
            if filter != FilterMethod::NoFilter {
                return Err(ConfigError::invalid_value(
                    format!("slope_limiter/{}/filter", field_name),
                    format!("HierarchicalTaylor supports only nofilter, got {}", filter.name()),
                ));
            }
            StandardSlopeLimiter::HierarchicalTaylor(Box::new(HierarchicalTaylorLimiter::new(
                mesh, dofmap, field_name, skip_cells, bcs,
            )?))
        }
    };

    Ok(FieldLimiter::new(field_name, limiter, config.plot))
}

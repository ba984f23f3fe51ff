//! Boundary conditions of scalar fields, looked up per field and region.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::mesh::Point2;

/// Spatial function `f(x, y)` used as a boundary value.
pub type BcExpression = Arc<dyn Fn(Point2) -> f64 + Send + Sync>;

/// Value of a boundary condition.
#[derive(Clone)]
pub enum BcValue {
    /// The same value everywhere on the region
    Constant(f64),
    /// A value depending on the position on the region
    Expression(BcExpression),
}

impl BcValue {
    /// Build an expression value from a closure.
    pub fn expression<F>(f: F) -> Self
    where
        F: Fn(Point2) -> f64 + Send + Sync + 'static,
    {
        BcValue::Expression(Arc::new(f))
    }

    /// Evaluate the value at point `x`.
    #[inline]
    pub fn eval(&self, x: Point2) -> f64 {
        match self {
            BcValue::Constant(v) => *v,
            BcValue::Expression(f) => f(x),
        }
    }

    /// Returns `true` for constant values.
    pub fn is_constant(&self) -> bool {
        matches!(self, BcValue::Constant(_))
    }
}

impl fmt::Debug for BcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BcValue::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            BcValue::Expression(_) => f.write_str("Expression(..)"),
        }
    }
}

impl From<f64> for BcValue {
    fn from(v: f64) -> Self {
        BcValue::Constant(v)
    }
}

/// Boundary condition of one field on one region.
#[derive(Clone, Debug)]
pub enum BoundaryCondition {
    /// Prescribed field value
    Dirichlet(BcValue),
    /// Prescribed normal gradient
    Neumann(BcValue),
}

impl BoundaryCondition {
    /// Short name used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            BoundaryCondition::Dirichlet(_) => "Dirichlet",
            BoundaryCondition::Neumann(_) => "Neumann",
        }
    }
}

/// Source of boundary conditions for the limiters.
pub trait BoundaryConditionProvider: Send + Sync {
    /// Condition of `field` on boundary region `region`, if any.
    fn condition(&self, field: &str, region: usize) -> Option<&BoundaryCondition>;

    /// Human readable name of a boundary region.
    fn region_name(&self, region: usize) -> Option<&str>;
}

/// In-memory table of boundary conditions.
///
/// Region numbers are indices into the region names, matching
/// [`TriMesh2D::region_names`](crate::mesh::TriMesh2D).
#[derive(Clone, Debug, Default)]
pub struct BoundaryConditions {
    region_names: Vec<String>,
    conditions: HashMap<(String, usize), BoundaryCondition>,
}

impl BoundaryConditions {
    /// Create an empty table for the given regions.
    pub fn new(region_names: Vec<String>) -> Self {
        Self {
            region_names,
            conditions: HashMap::new(),
        }
    }

    /// Set the condition of `field` on `region`, replacing an earlier one.
    pub fn set(&mut self, field: &str, region: usize, bc: BoundaryCondition) -> &mut Self {
        self.conditions.insert((field.to_string(), region), bc);
        self
    }

    /// Set a Dirichlet condition.
    pub fn dirichlet(&mut self, field: &str, region: usize, value: impl Into<BcValue>) -> &mut Self {
        self.set(field, region, BoundaryCondition::Dirichlet(value.into()))
    }

    /// Set a Neumann condition.
    pub fn neumann(&mut self, field: &str, region: usize, value: impl Into<BcValue>) -> &mut Self {
        self.set(field, region, BoundaryCondition::Neumann(value.into()))
    }

    /// Number of named regions.
    pub fn num_regions(&self) -> usize {
        self.region_names.len()
    }
}

impl BoundaryConditionProvider for BoundaryConditions {
    fn condition(&self, field: &str, region: usize) -> Option<&BoundaryCondition> {
        self.conditions.get(&(field.to_string(), region))
    }

    fn region_name(&self, region: usize) -> Option<&str> {
        self.region_names.get(region).map(String::as_str)
    }
}

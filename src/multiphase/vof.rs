//! Two-fluid VOF model with an algebraically advected colour function.

use log::{debug, info};

use super::compression::{CompressionReport, compress};
use crate::basis::DofMap;
use crate::config::{PhysicalProperties, SimulationInput};
use crate::convection::{BlendingStats, ConvectionScheme, VelocityField, VofBlending, max_velocity_divergence};
use crate::error::ConfigError;
use crate::gradient::GradientReconstructor;
use crate::mesh::MeshTopology;
use crate::parallel::Communicator;

/// Name of the colour function in the simulation input.
pub const COLOUR_FIELD: &str = "c";

/// Integral and range of the colour function after a time step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColourStats {
    /// ∫ c dx over the domain
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

/// Integral, minimum and maximum of a piecewise constant colour function
/// over the owned cells of all processes.
pub fn colour_stats<M: MeshTopology + ?Sized>(mesh: &M, colour: &[f64], comm: &dyn Communicator) -> ColourStats {
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for c in 0..mesh.num_owned_cells() {
        sum += colour[c] * mesh.cell_volume(c);
        min = min.min(colour[c]);
        max = max.max(colour[c]);
    }
    ColourStats {
        sum: comm.sum(sum),
        min: comm.min(min),
        max: comm.max(max),
    }
}

/// Blended algebraic VOF model.
///
/// The colour function c is 1 in fluid 0 and 0 in fluid 1. Each time step
/// calls [`prepare_step`](Self::prepare_step) before the colour advection
/// and [`finish_step`](Self::finish_step) after it.
#[derive(Clone, Debug)]
pub struct BlendedAlgebraicVof {
    properties: PhysicalProperties,
    compression_factor: f64,
    dofmap: DofMap,
    gradient: GradientReconstructor,
    blending: VofBlending,
}

impl BlendedAlgebraicVof {
    /// Build the model for a piecewise constant colour function on `mesh`.
    pub fn new<M: MeshTopology + ?Sized>(mesh: &M, input: &SimulationInput) -> Result<Self, ConfigError> {
        input.physical_properties.validate()?;
        input.multiphase_solver.validate()?;
        let scheme = input.convection(COLOUR_FIELD).scheme()?;
        Self::with_scheme(
            mesh,
            input.physical_properties,
            scheme,
            input.multiphase_solver.compression_factor,
        )
    }

    /// Build the model from explicit settings.
    pub fn with_scheme<M: MeshTopology + ?Sized>(
        mesh: &M,
        properties: PhysicalProperties,
        scheme: ConvectionScheme,
        compression_factor: f64,
    ) -> Result<Self, ConfigError> {
        let dofmap = DofMap::new(mesh, 0)?;
        info!(
            "Blended algebraic VOF: scheme {}, compression factor {}, rho = ({}, {}), nu = ({}, {})",
            scheme.name(),
            compression_factor,
            properties.rho0,
            properties.rho1,
            properties.nu0,
            properties.nu1
        );
        Ok(Self {
            properties,
            compression_factor,
            dofmap,
            gradient: GradientReconstructor::new(mesh),
            blending: VofBlending::new(scheme, mesh),
        })
    }

    #[inline]
    pub fn properties(&self) -> &PhysicalProperties {
        &self.properties
    }

    #[inline]
    pub fn compression_factor(&self) -> f64 {
        self.compression_factor
    }

    /// The facet blending field.
    #[inline]
    pub fn blending(&self) -> &VofBlending {
        &self.blending
    }

    /// The colour gradient from the last [`prepare_step`](Self::prepare_step).
    #[inline]
    pub fn gradient(&self) -> &GradientReconstructor {
        &self.gradient
    }

    /// Mutable access to the gradient, e.g. for the ghost exchange.
    #[inline]
    pub fn gradient_mut(&mut self) -> &mut GradientReconstructor {
        &mut self.gradient
    }

    /// Density at colour value `c`.
    #[inline]
    pub fn density(&self, c: f64) -> f64 {
        let p = &self.properties;
        p.rho0 * c + p.rho1 * (1.0 - c)
    }

    /// Kinematic viscosity at colour value `c`.
    #[inline]
    pub fn kinematic_viscosity(&self, c: f64) -> f64 {
        let p = &self.properties;
        p.nu0 * c + p.nu1 * (1.0 - c)
    }

    /// Dynamic viscosity at colour value `c`.
    #[inline]
    pub fn dynamic_viscosity(&self, c: f64) -> f64 {
        self.kinematic_viscosity(c) * self.density(c)
    }

    /// Density of every colour value.
    pub fn density_field(&self, colour: &[f64]) -> Vec<f64> {
        colour.iter().map(|&c| self.density(c)).collect()
    }

    /// Kinematic viscosity of every colour value.
    pub fn kinematic_viscosity_field(&self, colour: &[f64]) -> Vec<f64> {
        colour.iter().map(|&c| self.kinematic_viscosity(c)).collect()
    }

    /// Dynamic viscosity of every colour value.
    pub fn dynamic_viscosity_field(&self, colour: &[f64]) -> Vec<f64> {
        colour.iter().map(|&c| self.dynamic_viscosity(c)).collect()
    }

    /// Smallest and largest density of the two fluids.
    pub fn density_range(&self) -> (f64, f64) {
        let p = &self.properties;
        (p.rho0.min(p.rho1), p.rho0.max(p.rho1))
    }

    /// Smallest and largest kinematic viscosity of the two fluids.
    pub fn kinematic_viscosity_range(&self) -> (f64, f64) {
        let p = &self.properties;
        (p.nu0.min(p.nu1), p.nu0.max(p.nu1))
    }

    /// Smallest and largest dynamic viscosity of the two fluids.
    pub fn dynamic_viscosity_range(&self) -> (f64, f64) {
        let p = &self.properties;
        let (mu0, mu1) = (p.nu0 * p.rho0, p.nu1 * p.rho1);
        (mu0.min(mu1), mu0.max(mu1))
    }

    /// Reconstruct the colour gradient and update the blending field ahead
    /// of the colour advection.
    pub fn prepare_step<M, V>(
        &mut self,
        mesh: &M,
        colour: &[f64],
        velocity: &V,
        dt: f64,
        comm: &dyn Communicator,
    ) -> BlendingStats
    where
        M: MeshTopology + ?Sized,
        V: VelocityField + ?Sized,
    {
        #[cfg(feature = "parallel")]
        self.gradient.reconstruct_parallel(mesh, &self.dofmap, colour);
        #[cfg(not(feature = "parallel"))]
        self.gradient.reconstruct(mesh, &self.dofmap, colour);
        let stats = self
            .blending
            .update(mesh, colour, self.gradient.gradient(), velocity, dt, comm);
        debug!(
            "VOF blending: Co_max = {:.3e}, {} blended facets, beta_max = {:.3}",
            stats.courant_max, stats.n_blended, stats.beta_max
        );
        stats
    }

    /// Compress the advected colour function and report its integral and
    /// range.
    pub fn finish_step<M: MeshTopology + ?Sized>(
        &mut self,
        mesh: &M,
        colour: &mut [f64],
        comm: &dyn Communicator,
    ) -> (CompressionReport, ColourStats) {
        let report = compress(mesh, colour, self.gradient.gradient(), self.compression_factor);
        let stats = colour_stats(mesh, colour, comm);
        info!(
            "VOF colour: sum = {:.15e}, min = {:.3e}, max = {:.3e}",
            stats.sum, stats.min, stats.max
        );
        (report, stats)
    }

    /// Largest cell divergence of the advecting velocity.
    pub fn velocity_divergence<M, V>(&self, mesh: &M, velocity: &V, comm: &dyn Communicator) -> f64
    where
        M: MeshTopology + ?Sized,
        V: VelocityField + ?Sized,
    {
        let div = max_velocity_divergence(mesh, velocity, comm);
        debug!("Max velocity divergence: {:.3e}", div);
        div
    }
}

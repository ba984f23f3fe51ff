//! Facet blending field for algebraic VOF advection.
//!
//! The blending factor of every facet is written into a facet-indexed
//! field consumed by the advection equation assembly: 0 selects the upwind
//! colour value, 1 the downwind value.

use log::{debug, error};

use super::ConvectionScheme;
use super::cicsam::{FacetStencil, cicsam_blending};
use super::velocity::VelocityField;
use crate::mesh::{FacetCells, MeshTopology, Point2, dot, sub};
use crate::parallel::Communicator;

/// Summary of one blending update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlendingStats {
    /// Largest facet Courant number over all processes
    pub courant_max: f64,
    /// Number of locally written facets with a non-zero blending factor
    pub n_blended: usize,
    /// Largest locally written blending factor
    pub beta_max: f64,
}

/// The blending field of a colour function.
#[derive(Clone, Debug)]
pub struct VofBlending {
    scheme: ConvectionScheme,
    blending: Vec<f64>,
    courant_max: f64,
}

impl VofBlending {
    /// Create a zero (pure upwind) blending field.
    pub fn new<M: MeshTopology + ?Sized>(scheme: ConvectionScheme, mesh: &M) -> Self {
        Self {
            scheme,
            blending: vec![0.0; mesh.num_facets()],
            courant_max: 0.0,
        }
    }

    /// The selected scheme.
    #[inline]
    pub fn scheme(&self) -> ConvectionScheme {
        self.scheme
    }

    /// Blending factor of every facet.
    #[inline]
    pub fn blending(&self) -> &[f64] {
        &self.blending
    }

    /// Largest Courant number seen by the last update.
    #[inline]
    pub fn courant_max(&self) -> f64 {
        self.courant_max
    }

    /// Recompute the blending factor of every facet whose first cell is owned.
    ///
    /// `colour` holds one value per cell (DG0) and `gradient` the
    /// reconstructed colour gradient per cell.
    ///
    /// # Panics
    ///
    /// If a blending factor leaves [0, 1], if the facet velocity, Courant
    /// number, colour or donor gradient is not finite, or if a single-cell
    /// facet of an owned cell is not on the domain boundary.
    pub fn update<M, V>(
        &mut self,
        mesh: &M,
        colour: &[f64],
        gradient: &[Point2],
        velocity: &V,
        dt: f64,
        comm: &dyn Communicator,
    ) -> BlendingStats
    where
        M: MeshTopology + ?Sized,
        V: VelocityField + ?Sized,
    {
        assert_eq!(
            colour.len(),
            mesh.num_all_cells(),
            "the blending update needs a piecewise constant colour function"
        );

        let mut stats = BlendingStats::default();
        let mut courant_max: f64 = 0.0;

        for f in 0..mesh.num_facets() {
            let cells = mesh.facet_cells(f);
            if !mesh.is_owned(cells.first()) {
                continue;
            }

            let (c0, c1) = match cells {
                FacetCells::Interior(c0, c1) => (c0, c1),
                FacetCells::Exterior(c0) => {
                    assert!(
                        mesh.is_exterior(f),
                        "facet {} of owned cell {} has one cell but is not on the domain boundary",
                        f,
                        c0
                    );
                    self.blending[f] = 0.0;
                    continue;
                }
            };

            let normal = mesh.facet_normal(f);
            let uf = dot(velocity.eval(mesh.facet_midpoint(f)), normal);
            let mp_dist = sub(mesh.cell_midpoint(c1), mesh.cell_midpoint(c0));
            let (donor, acceptor, d) = if uf > 0.0 {
                (c0, c1, mp_dist)
            } else {
                (c1, c0, (-mp_dist.0, -mp_dist.1))
            };

            let courant = uf.abs() * dt * mesh.facet_area(f) / mesh.cell_volume(donor);
            let inputs_finite = courant.is_finite()
                && colour[donor].is_finite()
                && colour[acceptor].is_finite()
                && gradient[donor].0.is_finite()
                && gradient[donor].1.is_finite();
            if !inputs_finite {
                error!(
                    "Non-finite blending input on facet {}: u·n = {}, Co = {}, aC = {} (cell {}), \
                     aD = {} (cell {}), gradient = {:?}",
                    f,
                    uf,
                    courant,
                    colour[donor],
                    donor,
                    colour[acceptor],
                    acceptor,
                    gradient[donor]
                );
                panic!("non-finite blending input on facet {}", f);
            }
            courant_max = courant_max.max(courant);

            let beta = match self.scheme {
                ConvectionScheme::Upwind => 0.0,
                ConvectionScheme::Cicsam => {
                    let stencil = FacetStencil {
                        a_c: colour[donor],
                        a_d: colour[acceptor],
                        grad_c: gradient[donor],
                        d,
                        courant,
                    };
                    match cicsam_blending(&stencil) {
                        Ok(beta) => beta,
                        Err(v) => {
                            error!(
                                "Blending factor out of range on facet {}: normal = {:?}, \
                                 gradient = {:?}, d = {:?}, Co = {}, theta = {}, tilde_aC = {}, \
                                 tilde_aF = {} (HC = {}, UQ = {}), aU = {}, aC = {}, aD = {}",
                                f,
                                normal,
                                stencil.grad_c,
                                d,
                                courant,
                                v.theta,
                                v.tilde_a_c,
                                v.tilde_a_f,
                                v.hyper_c,
                                v.ultimate_quickest,
                                v.a_u,
                                v.a_c,
                                v.a_d
                            );
                            panic!("blending factor {} outside [0, 1] on facet {}", v.beta, f);
                        }
                    }
                }
            };

            if beta > 0.0 {
                stats.n_blended += 1;
            }
            stats.beta_max = stats.beta_max.max(beta);
            self.blending[f] = beta;
        }

        self.courant_max = comm.max(courant_max);
        stats.courant_max = self.courant_max;
        debug!(
            "{} blending: Co_max = {:.4}, {} blended facets, beta_max = {:.4}",
            self.scheme.name(),
            stats.courant_max,
            stats.n_blended,
            stats.beta_max
        );
        stats
    }
}

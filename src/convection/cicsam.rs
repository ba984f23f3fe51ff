//! CICSAM blending factor for a single facet.
//!
//! Normalised variable diagram notation: with upwind value aU, donor aC and
//! acceptor aD, the normalised donor value is
//!
//! ã_C = (aC - aU) / (aD - aU)
//!
//! The face value is a blend of the compressive Hyper-C scheme and the
//! Ultimate-Quickest scheme, weighted by the angle between the interface
//! normal (the colour gradient) and the donor-acceptor direction. The
//! returned blending factor β interpolates between the upwind (0) and the
//! downwind (1) value.

use std::f64::consts::FRAC_PI_2;

use crate::mesh::{Point2, dot};

/// Threshold for "no meaningful jump" and for the round-off snap.
pub const EPS: f64 = 1e-6;

/// Weight of Hyper-C against Ultimate-Quickest.
pub const K_Y: f64 = 1.0;

/// Donor/acceptor data of one facet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacetStencil {
    /// Colour in the donor cell
    pub a_c: f64,
    /// Colour in the acceptor cell
    pub a_d: f64,
    /// Colour gradient in the donor cell
    pub grad_c: Point2,
    /// Vector from the donor to the acceptor midpoint
    pub d: Point2,
    /// Facet Courant number |u·n| dt |f| / |C|
    pub courant: f64,
}

impl FacetStencil {
    /// Upwind value extrapolated from the acceptor, clamped to [0, 1].
    #[inline]
    pub fn upwind_value(&self) -> f64 {
        (self.a_d - 2.0 * dot(self.grad_c, self.d)).clamp(0.0, 1.0)
    }
}

/// A blending factor outside [0, 1] together with the values that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendingViolation {
    pub beta: f64,
    pub a_u: f64,
    pub a_c: f64,
    pub a_d: f64,
    pub tilde_a_c: f64,
    pub tilde_a_f: f64,
    pub hyper_c: f64,
    pub ultimate_quickest: f64,
    pub theta: f64,
}

/// Compute the CICSAM blending factor of one facet.
///
/// Returns 0 (pure upwind) when the jump across the facet is negligible or
/// ã_C lies outside (0, 1). An `Err` means the result left [0, 1], which the
/// caller must treat as fatal.
pub fn cicsam_blending(s: &FacetStencil) -> Result<f64, BlendingViolation> {
    let a_u = s.upwind_value();
    let (a_c, a_d) = (s.a_c, s.a_d);

    if (a_c - a_d).abs() < EPS || (a_u - a_d).abs() < EPS {
        return Ok(0.0);
    }

    // Only the upwind scheme is stable outside the interval
    let tilde_a_c = (a_c - a_u) / (a_d - a_u);
    if tilde_a_c <= 0.0 || tilde_a_c >= 1.0 {
        return Ok(0.0);
    }

    let co = s.courant;
    let hyper_c = (tilde_a_c / co).min(1.0);
    let ultimate_quickest =
        ((8.0 * co * tilde_a_c + (1.0 - co) * (6.0 * tilde_a_c + 3.0)) / 8.0).min(hyper_c);

    let theta = interface_angle(s.grad_c, s.d);
    let y = (K_Y * ((2.0 * theta).cos() + 1.0) / 2.0).min(1.0);
    let mut tilde_a_f = hyper_c * y + ultimate_quickest * (1.0 - y);

    // Round-off can push the face value just below the donor value
    if tilde_a_c - EPS < tilde_a_f && tilde_a_f < tilde_a_c {
        tilde_a_f = tilde_a_c;
    }

    let beta = (tilde_a_f - tilde_a_c) / (1.0 - tilde_a_c);
    if (0.0..=1.0).contains(&beta) {
        Ok(beta)
    } else {
        Err(BlendingViolation {
            beta,
            a_u,
            a_c,
            a_d,
            tilde_a_c,
            tilde_a_f,
            hyper_c,
            ultimate_quickest,
            theta,
        })
    }
}

/// Angle between the colour gradient and the donor-acceptor direction,
/// folded into [0, π/2]. A vanishing gradient or distance counts as
/// tangential (π/2).
pub fn interface_angle(grad: Point2, d: Point2) -> f64 {
    let denom = (dot(grad, grad) * dot(d, d)).sqrt();
    if denom == 0.0 {
        return FRAC_PI_2;
    }
    (dot(grad, d).abs() / denom).min(1.0).acos()
}

//! Convecting velocity fields and the facet-flux divergence diagnostic.

use crate::mesh::{FacetCells, MeshTopology, Point2, dot};
use crate::parallel::Communicator;

/// A velocity field that can be evaluated anywhere in the domain.
pub trait VelocityField: Send + Sync {
    /// Velocity (u, v) at point `x`.
    fn eval(&self, x: Point2) -> Point2;
}

/// Spatially constant velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformVelocity(pub f64, pub f64);

impl VelocityField for UniformVelocity {
    #[inline]
    fn eval(&self, _x: Point2) -> Point2 {
        (self.0, self.1)
    }
}

impl<F> VelocityField for F
where
    F: Fn(Point2) -> Point2 + Send + Sync,
{
    #[inline]
    fn eval(&self, x: Point2) -> Point2 {
        self(x)
    }
}

/// Largest absolute cell divergence of the velocity over owned cells.
///
/// The divergence of cell c is Σ_f (u(mp_f) · n_f) |f| / |c| with the facet
/// normals oriented out of c, evaluated with midpoint quadrature. The result
/// is reduced over all processes.
pub fn max_velocity_divergence<M, V>(mesh: &M, velocity: &V, comm: &dyn Communicator) -> f64
where
    M: MeshTopology + ?Sized,
    V: VelocityField + ?Sized,
{
    let mut flux = vec![0.0; mesh.num_all_cells()];
    for f in 0..mesh.num_facets() {
        let uf = dot(velocity.eval(mesh.facet_midpoint(f)), mesh.facet_normal(f)) * mesh.facet_area(f);
        match mesh.facet_cells(f) {
            FacetCells::Interior(c0, c1) => {
                flux[c0] += uf;
                flux[c1] -= uf;
            }
            FacetCells::Exterior(c0) => flux[c0] += uf,
        }
    }

    let local = (0..mesh.num_owned_cells())
        .map(|c| (flux[c] / mesh.cell_volume(c)).abs())
        .fold(0.0, f64::max);
    comm.max(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh2D;
    use crate::parallel::SerialCommunicator;

    #[test]
    fn test_closure_velocity() {
        let field = |(x, y): Point2| (y, -x);
        assert_eq!(field.eval((1.0, 2.0)), (2.0, -1.0));
        assert_eq!(UniformVelocity(0.5, 0.0).eval((3.0, 3.0)), (0.5, 0.0));
    }

    #[test]
    fn test_divergence_free_fields() {
        let mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 5, 5);
        let comm = SerialCommunicator;

        let div = max_velocity_divergence(&mesh, &UniformVelocity(1.0, -2.0), &comm);
        assert!(div < 1e-12, "uniform flow divergence = {}", div);

        // Linear rotation is divergence free and exactly integrated
        let rotation = |(x, y): Point2| (-(y - 0.5), x - 0.5);
        let div = max_velocity_divergence(&mesh, &rotation, &comm);
        assert!(div < 1e-12, "rotation divergence = {}", div);
    }

    #[test]
    fn test_expanding_field() {
        let mesh = TriMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 3, 3);
        let expansion = |(x, y): Point2| (x, y);
        let div = max_velocity_divergence(&mesh, &expansion, &SerialCommunicator);
        assert!((div - 2.0).abs() < 1e-12);
    }
}

//! Cached cell and facet geometry for triangular meshes.
//!
//! For straight-sided triangles every quantity is exact:
//!
//! area     = |(x1 - x0)(y2 - y0) - (x2 - x0)(y1 - y0)| / 2
//! centroid = (v0 + v1 + v2) / 3
//!
//! Facet normals are oriented out of the facet's first cell.

use super::topology::{Point2, dot, norm, sub};

/// Geometry of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellInfo {
    /// Cell area
    pub volume: f64,
    /// Cell centroid
    pub midpoint: Point2,
}

impl CellInfo {
    /// Compute the geometry of a triangle.
    pub fn triangle(v: [Point2; 3]) -> Self {
        let e1 = sub(v[1], v[0]);
        let e2 = sub(v[2], v[0]);
        let volume = 0.5 * (e1.0 * e2.1 - e2.0 * e1.1).abs();
        let midpoint = (
            (v[0].0 + v[1].0 + v[2].0) / 3.0,
            (v[0].1 + v[1].1 + v[2].1) / 3.0,
        );
        Self { volume, midpoint }
    }
}

/// Geometry of one facet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacetInfo {
    /// Facet length
    pub area: f64,
    /// Unit normal pointing out of the facet's first cell
    pub normal: Point2,
    /// Facet midpoint
    pub midpoint: Point2,
}

impl FacetInfo {
    /// Compute the geometry of the edge `a-b` with the normal pointing away
    /// from `inside` (the centroid of the first cell).
    pub fn edge(a: Point2, b: Point2, inside: Point2) -> Self {
        let t = sub(b, a);
        let area = norm(t);
        let midpoint = (0.5 * (a.0 + b.0), 0.5 * (a.1 + b.1));

        let mut normal = if area > 0.0 {
            (t.1 / area, -t.0 / area)
        } else {
            (0.0, 0.0)
        };
        if dot(normal, sub(midpoint, inside)) < 0.0 {
            normal = (-normal.0, -normal.1);
        }

        Self {
            area,
            normal,
            midpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_info() {
        let info = CellInfo::triangle([(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        assert!((info.volume - 0.5).abs() < 1e-14);
        assert!((info.midpoint.0 - 1.0 / 3.0).abs() < 1e-14);
        assert!((info.midpoint.1 - 1.0 / 3.0).abs() < 1e-14);

        // Clockwise ordering gives the same positive area
        let cw = CellInfo::triangle([(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)]);
        assert!((cw.volume - 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_edge_normal_points_away_from_cell() {
        // Bottom edge of the unit triangle, cell centroid above it
        let info = FacetInfo::edge((0.0, 0.0), (1.0, 0.0), (1.0 / 3.0, 1.0 / 3.0));
        assert!((info.area - 1.0).abs() < 1e-14);
        assert!((info.normal.0 - 0.0).abs() < 1e-14);
        assert!((info.normal.1 + 1.0).abs() < 1e-14);
        assert_eq!(info.midpoint, (0.5, 0.0));

        // Same edge given in reverse order
        let rev = FacetInfo::edge((1.0, 0.0), (0.0, 0.0), (1.0 / 3.0, 1.0 / 3.0));
        assert!((rev.normal.1 + 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_diagonal_edge_normal_is_unit() {
        let info = FacetInfo::edge((1.0, 0.0), (0.0, 1.0), (0.0, 0.0));
        let s = 1.0 / 2.0_f64.sqrt();
        assert!((info.normal.0 - s).abs() < 1e-14);
        assert!((info.normal.1 - s).abs() < 1e-14);
        assert!((norm(info.normal) - 1.0).abs() < 1e-14);
    }
}

//! Split position strategies for k-d tree construction.
//!
//! The split axis always cycles with depth; a selector only decides where
//! along that axis a node is cut. Any position yields a correct tree, the
//! choice only changes its balance.

use crate::{Axis, Bounds, Mesh, TriangleId};

/// Strategy for choosing a node's split coordinate.
pub trait SplitSelector {
    /// Returns the coordinate along `axis` at which to split the node.
    ///
    /// `triangles` holds at least two ids and may be reordered.
    fn select(
        &self,
        mesh: &Mesh,
        triangles: &mut [TriangleId],
        bounds: &Bounds,
        axis: Axis,
    ) -> f64;
}

/// Splits at the median of the triangle centroids along the axis.
///
/// With an odd count this is the middle centroid; with an even count the
/// mean of the two middle ones. Balances the number of triangles on each
/// side.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidMedian;

impl SplitSelector for CentroidMedian {
    fn select(
        &self,
        mesh: &Mesh,
        triangles: &mut [TriangleId],
        _bounds: &Bounds,
        axis: Axis,
    ) -> f64 {
        let i = axis.index();
        let key = |id: &TriangleId| mesh.triangle(*id).centroid()[i];
        triangles.sort_by(|a, b| key(a).total_cmp(&key(b)));

        let n = triangles.len();
        if n % 2 == 1 {
            key(&triangles[n / 2])
        } else {
            (key(&triangles[n / 2 - 1]) + key(&triangles[n / 2])) / 2.0
        }
    }
}

/// Splits at the midpoint of the node's box.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialMedian;

impl SplitSelector for SpatialMedian {
    fn select(
        &self,
        _mesh: &Mesh,
        _triangles: &mut [TriangleId],
        bounds: &Bounds,
        axis: Axis,
    ) -> f64 {
        (bounds.lo(axis) + bounds.hi(axis)) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn make_mesh(xs: &[f64]) -> Mesh {
        // Triangles whose centroid x equals the given value
        Mesh::from_triangles(xs.iter().map(|&x| {
            [
                Point3::new(x - 0.1, 0.0, 0.0),
                Point3::new(x + 0.1, 0.0, 0.0),
                Point3::new(x, 1.0, 0.0),
            ]
        }))
    }

    fn bounds() -> Bounds {
        Bounds::new(Point3::new(-10.0, -10.0, -10.0), Point3::new(10.0, 10.0, 10.0))
    }

    #[test]
    fn centroid_median_odd() {
        let mesh = make_mesh(&[5.0, 1.0, 3.0]);
        let mut ids: Vec<_> = mesh.triangle_ids().collect();
        let m = CentroidMedian.select(&mesh, &mut ids, &bounds(), Axis::X);
        assert!((m - 3.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_median_even_averages_middle_pair() {
        let mesh = make_mesh(&[4.0, 1.0, 2.0, 8.0]);
        let mut ids: Vec<_> = mesh.triangle_ids().collect();
        let m = CentroidMedian.select(&mesh, &mut ids, &bounds(), Axis::X);
        assert!((m - 3.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_median_sorts_ids() {
        let mesh = make_mesh(&[4.0, 1.0, 2.0]);
        let mut ids: Vec<_> = mesh.triangle_ids().collect();
        CentroidMedian.select(&mesh, &mut ids, &bounds(), Axis::X);
        let xs: Vec<f64> = ids.iter().map(|id| mesh.triangle(*id).centroid().x).collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn spatial_median_is_box_midpoint() {
        let mesh = make_mesh(&[4.0, 1.0]);
        let mut ids: Vec<_> = mesh.triangle_ids().collect();
        let b = Bounds::new(Point3::new(0.0, 2.0, 0.0), Point3::new(1.0, 6.0, 1.0));
        assert_eq!(SpatialMedian.select(&mesh, &mut ids, &b, Axis::Y), 4.0);
    }
}

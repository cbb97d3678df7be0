//! Rays and shaded surface hits.

use std::fmt;

use nalgebra::{Point3, Unit, Vector3};

use crate::{Color, TexCoord, TriangleId};

/// A half-line `origin + t * direction`, `t > 0`.
///
/// A non-zero direction is normalized on construction, so `t` measures
/// Euclidean distance from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Point3<f64>,
    direction: Vector3<f64>,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        let direction = direction.try_normalize(0.0).unwrap_or(direction);
        Self { origin, direction }
    }

    /// A ray from `origin` heading toward `target`.
    pub fn through(origin: Point3<f64>, target: Point3<f64>) -> Self {
        Self::new(origin, target - origin)
    }

    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Unit direction (zero only for a degenerate ray).
    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    /// Point at parameter `t`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (o, d) = (self.origin, self.direction);
        write!(
            f,
            "ray o=({}, {}, {}) d=({}, {}, {})",
            o.x, o.y, o.z, d.x, d.y, d.z
        )
    }
}

/// The nearest surface point found along a ray, already shaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceHit {
    pub position: Point3<f64>,
    /// Shading normal: interpolated from vertex normals when the mesh has
    /// them, otherwise the flat geometric normal.
    pub normal: Unit<Vector3<f64>>,
    pub uv: Option<TexCoord>,
    pub color: Color,
    /// Distance from the ray origin.
    pub distance: f64,
    pub triangle: TriangleId,
}

impl SurfaceHit {
    /// Euclidean distance from `point` to the hit.
    #[inline]
    pub fn distance_from(&self, point: Point3<f64>) -> f64 {
        nalgebra::distance(&self.position, &point)
    }
}

//! Model placement: mapping rays into model space and hits back out.

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector3};

use crate::{Error, Ray, Result, SurfaceHit};

/// Maps between world space and the model space a tree was built in.
///
/// Scene tracing calls [`to_local`](Self::to_local) once on the incoming ray
/// and [`to_world`](Self::to_world) once on the hit it found.
pub trait SpaceTransform: Send + Sync {
    /// Brings a world-space ray into model space.
    fn to_local(&self, ray: &Ray) -> Ray;

    /// Brings a world-space point into model space.
    fn point_to_local(&self, point: &Point3<f64>) -> Point3<f64>;

    /// Brings a model-space hit back into world space.
    fn to_world(&self, hit: SurfaceHit) -> SurfaceHit;
}

/// The model lives in world space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl SpaceTransform for Identity {
    fn to_local(&self, ray: &Ray) -> Ray {
        *ray
    }

    fn point_to_local(&self, point: &Point3<f64>) -> Point3<f64> {
        *point
    }

    fn to_world(&self, hit: SurfaceHit) -> SurfaceHit {
        hit
    }
}

/// Scale, then rotate (about X, Y, Z, in degrees), then translate.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    forward: Matrix4<f64>,
    inverse: Matrix4<f64>,
    normal_matrix: Matrix3<f64>,
}

impl Placement {
    /// Builds the placement `T * Rx * Ry * Rz * S`.
    ///
    /// Fails for a zero scale factor, which has no inverse.
    pub fn new(scale: [f64; 3], rotation_degrees: [f64; 3], translation: [f64; 3]) -> Result<Self> {
        if scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(Error::SingularTransform(scale));
        }

        let [rx, ry, rz] = rotation_degrees.map(f64::to_radians);
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), rx)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), ry)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), rz);

        let forward = Matrix4::new_translation(&Vector3::from(translation))
            * rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&Vector3::from(scale));
        let inverse = forward
            .try_inverse()
            .ok_or(Error::SingularTransform(scale))?;
        let normal_matrix = inverse.fixed_view::<3, 3>(0, 0).transpose();

        Ok(Self {
            forward,
            inverse,
            normal_matrix,
        })
    }

    /// A pure translation.
    pub fn translation(offset: [f64; 3]) -> Self {
        let forward = Matrix4::new_translation(&Vector3::from(offset));
        let inverse = Matrix4::new_translation(&-Vector3::from(offset));
        Self {
            forward,
            inverse,
            normal_matrix: Matrix3::identity(),
        }
    }

    #[inline]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.forward.transform_point(point)
    }

    /// Transforms a surface normal by the inverse transpose.
    pub fn transform_normal(&self, normal: &Unit<Vector3<f64>>) -> Unit<Vector3<f64>> {
        Unit::new_normalize(self.normal_matrix * normal.into_inner())
    }

    #[inline]
    pub fn inverse_transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.inverse.transform_point(point)
    }
}

impl SpaceTransform for Placement {
    fn to_local(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.inverse.transform_point(&ray.origin()),
            self.inverse.transform_vector(&ray.direction()),
        )
    }

    fn point_to_local(&self, point: &Point3<f64>) -> Point3<f64> {
        self.inverse_transform_point(point)
    }

    fn to_world(&self, hit: SurfaceHit) -> SurfaceHit {
        SurfaceHit {
            position: self.transform_point(&hit.position),
            normal: self.transform_normal(&hit.normal),
            ..hit
        }
    }
}

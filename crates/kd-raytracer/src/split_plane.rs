//! Axis-aligned splitting planes for k-d tree nodes.

use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::{Axis, Bounds};

/// An axis-aligned plane clipped to the extent of its node's box.
///
/// The plane is stored as a flat box: along the split axis `min == max ==
/// location`, the other two axes carry the parent box's limits, so it can
/// be tested like a finite rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlane {
    axis: Axis,
    extent: Bounds,
}

impl SplitPlane {
    /// Creates the plane `axis = location` spanning `bounds` on the other axes.
    pub fn new(bounds: &Bounds, axis: Axis, location: f64) -> Self {
        let i = axis.index();
        let mut min = bounds.min();
        let mut max = bounds.max();
        min[i] = location;
        max[i] = location;
        Self {
            axis,
            extent: Bounds::new(min, max),
        }
    }

    /// The axis this plane is perpendicular to.
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Coordinate of the plane along its axis.
    #[inline]
    pub fn location(&self) -> f64 {
        self.extent.lo(self.axis)
    }

    /// Unit normal pointing along the positive split axis.
    pub fn normal(&self) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        n[self.axis.index()] = 1.0;
        n
    }

    /// The flat box covered by the plane.
    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.extent
    }

    /// A point on the plane (its max corner).
    #[inline]
    pub fn anchor(&self) -> Point3<f64> {
        self.extent.max()
    }
}

impl fmt::Display for SplitPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} split at {}", self.axis, self.location())?;
        for other in self.axis.others() {
            write!(
                f,
                ", {other}: {} to {}",
                self.extent.lo(other),
                self.extent.hi(other)
            )?;
        }
        Ok(())
    }
}

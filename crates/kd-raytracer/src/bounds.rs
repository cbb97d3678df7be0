//! Axis-aligned bounding boxes and split axes.

use std::fmt;

use nalgebra::Point3;

/// Padding applied on every side of a mesh's root bounds.
///
/// Keeps the root box from collapsing to zero thickness when the model is
/// planar along an axis.
pub const BOUNDS_PADDING: f64 = 0.001;

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in split order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The split axis for a tree level: X, Y, Z, X, ...
    #[inline]
    pub fn from_level(level: usize) -> Self {
        Self::ALL[level % 3]
    }

    /// Coordinate index of this axis (0, 1 or 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two remaining axes, in X, Y, Z order.
    #[inline]
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// An axis-aligned box. Always satisfies `min <= max` componentwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Bounds {
    /// Creates a box from two opposite corners given in any order.
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Smallest box containing every point, or `None` if there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |b, p| Self {
            min: b.min.inf(&p),
            max: b.max.sup(&p),
        }))
    }

    #[inline]
    pub fn min(&self) -> Point3<f64> {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point3<f64> {
        self.max
    }

    /// Lower limit along `axis`.
    #[inline]
    pub fn lo(&self, axis: Axis) -> f64 {
        self.min[axis.index()]
    }

    /// Upper limit along `axis`.
    #[inline]
    pub fn hi(&self, axis: Axis) -> f64 {
        self.max[axis.index()]
    }

    /// Side length along `axis`.
    #[inline]
    pub fn extent(&self, axis: Axis) -> f64 {
        self.hi(axis) - self.lo(axis)
    }

    /// Returns the box grown by `delta` on every side.
    pub fn padded(&self, delta: f64) -> Self {
        let pad = nalgebra::Vector3::repeat(delta);
        Self::new(self.min - pad, self.max + pad)
    }

    /// Whether `point` lies inside or on the surface of the box.
    pub fn contains(&self, point: Point3<f64>) -> bool {
        Axis::ALL
            .iter()
            .all(|&a| point[a.index()] >= self.lo(a) && point[a.index()] <= self.hi(a))
    }

    /// Splits the box at `at` along `axis`.
    ///
    /// Returns `(near, far)`: the near box covers `[lo, at]`, the far box
    /// `[at, hi]`. The other two axes are inherited unchanged.
    pub fn split(&self, axis: Axis, at: f64) -> (Self, Self) {
        let i = axis.index();
        let mut near_max = self.max;
        near_max[i] = at;
        let mut far_min = self.min;
        far_min[i] = at;
        (Self::new(self.min, near_max), Self::new(far_min, self.max))
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in Axis::ALL {
            write!(
                f,
                "{axis}: {} to {} ({}) ",
                self.lo(axis),
                self.hi(axis),
                self.extent(axis)
            )?;
        }
        Ok(())
    }
}

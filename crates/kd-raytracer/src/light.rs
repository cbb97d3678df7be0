//! Point and area light sources.

use nalgebra::Point3;

use crate::Color;

/// A light made of one or more point samples.
///
/// An area light is approximated by a regular grid of point samples; both
/// shading and shadow testing average over every sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSource {
    samples: Vec<Point3<f64>>,
    rows: usize,
    cols: usize,
    ambient: Color,
    diffuse: Color,
    specular: Color,
}

impl LightSource {
    /// A single-sample light at `position`.
    pub fn point(position: Point3<f64>) -> Self {
        Self::from_grid(vec![position], 1, 1)
    }

    /// A rectangular light in the horizontal (XZ) plane through `center`.
    ///
    /// `length` runs along Z and `breadth` along X. Samples sit at the
    /// centers of a `samples_per_side` x `samples_per_side` grid of cells.
    /// A count of zero is treated as one.
    pub fn area(center: Point3<f64>, length: f64, breadth: f64, samples_per_side: usize) -> Self {
        let n = samples_per_side.max(1);
        let step_x = breadth / n as f64;
        let step_z = length / n as f64;
        let x0 = center.x - breadth / 2.0 + step_x / 2.0;
        let z0 = center.z - length / 2.0 + step_z / 2.0;

        let samples = (0..n)
            .flat_map(|i| {
                (0..n).map(move |j| {
                    Point3::new(x0 + i as f64 * step_x, center.y, z0 + j as f64 * step_z)
                })
            })
            .collect();

        Self::from_grid(samples, n, n)
    }

    fn from_grid(samples: Vec<Point3<f64>>, rows: usize, cols: usize) -> Self {
        Self {
            samples,
            rows,
            cols,
            ambient: Color::repeat(1.0),
            diffuse: Color::repeat(1.0),
            specular: Color::repeat(1.0),
        }
    }

    /// Replaces the white default base colors.
    pub fn with_colors(mut self, ambient: Color, diffuse: Color, specular: Color) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    /// The same light with every sample moved by `f`.
    pub fn map_samples(&self, f: impl FnMut(&Point3<f64>) -> Point3<f64>) -> Self {
        Self {
            samples: self.samples.iter().map(f).collect(),
            ..self.clone()
        }
    }

    /// World-space sample points, row-major.
    #[inline]
    pub fn samples(&self) -> &[Point3<f64>] {
        &self.samples
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Grid dimensions as `(rows, cols)`.
    #[inline]
    pub fn grid(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn ambient(&self) -> Color {
        self.ambient
    }

    #[inline]
    pub fn diffuse(&self) -> Color {
        self.diffuse
    }

    #[inline]
    pub fn specular(&self) -> Color {
        self.specular
    }
}

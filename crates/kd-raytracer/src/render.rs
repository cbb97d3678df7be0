//! Pinhole camera and parallel image rendering.

use std::time::Instant;

use image::RgbImage;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::{Color, Ray, RenderSettings, Scene};

/// A pinhole camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    eye: Point3<f64>,
    forward: Vector3<f64>,
    right: Vector3<f64>,
    up: Vector3<f64>,
    /// `tan(fov / 2)`.
    half_height: f64,
}

impl Camera {
    /// A camera at `eye` looking at `target`, with a vertical field of view
    /// in degrees.
    ///
    /// `up` only needs to be roughly upward; it is re-orthogonalized. If it
    /// is parallel to the view direction another axis is used.
    pub fn look_at(
        eye: Point3<f64>,
        target: Point3<f64>,
        up: Vector3<f64>,
        fov_degrees: f64,
    ) -> Self {
        let forward = (target - eye).try_normalize(0.0).unwrap_or_else(|| -Vector3::z());
        let right = forward
            .cross(&up)
            .try_normalize(f64::EPSILON)
            .or_else(|| forward.cross(&Vector3::x()).try_normalize(f64::EPSILON))
            .unwrap_or_else(Vector3::y);
        let up = right.cross(&forward);

        Self {
            eye,
            forward,
            right,
            up,
            half_height: (fov_degrees.to_radians() / 2.0).tan(),
        }
    }

    #[inline]
    pub fn eye(&self) -> Point3<f64> {
        self.eye
    }

    /// The ray through the center of pixel `(px, py)`; row 0 is the top.
    pub fn ray(&self, px: u32, py: u32, width: u32, height: u32) -> Ray {
        let aspect = width as f64 / height as f64;
        let sx = ((px as f64 + 0.5) / width as f64) * 2.0 - 1.0;
        let sy = 1.0 - ((py as f64 + 0.5) / height as f64) * 2.0;

        let direction = self.forward
            + self.right * (sx * self.half_height * aspect)
            + self.up * (sy * self.half_height);
        Ray::new(self.eye, direction)
    }
}

/// Renders `scene` through `camera`, one rayon task per image row.
pub fn render(scene: &Scene, camera: &Camera, settings: &RenderSettings) -> RgbImage {
    let (width, height) = (settings.width, settings.height);
    let start = Instant::now();

    let mut image = RgbImage::new(width, height);
    let row_len = width as usize * 3;
    if row_len > 0 {
        image
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(py, row)| {
                for (px, pixel) in row.chunks_exact_mut(3).enumerate() {
                    let ray = camera.ray(px as u32, py as u32, width, height);
                    pixel.copy_from_slice(&to_rgb(scene.shade(&ray, settings)));
                }
            });
    }

    log::info!(
        "rendered {width}x{height} in {:.1} ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    image
}

/// Clamps each channel to `[0, 1]` and quantizes to 8 bits.
pub fn to_rgb(color: Color) -> [u8; 3] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8).into()
}

//! Materials, textures and Phong shading.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;
use nalgebra::{Point3, Unit, Vector3};

use crate::{Error, LightSource, Result, TexCoord};

/// Linear RGB color.
pub type Color = Vector3<f64>;

/// An RGB image sampled with wrapping texture coordinates.
#[derive(Debug, Clone)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    /// Loads an image file and converts it to 8-bit RGB.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| Error::Texture {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_image(image.to_rgb8()))
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Bilinearly interpolated color at `uv`.
    ///
    /// Coordinates wrap modulo 1 so textures tile; `v = 0` is the bottom
    /// row of the image. Interpolation also wraps across the right and
    /// bottom edges.
    pub fn sample(&self, uv: TexCoord) -> Color {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return Color::zeros();
        }

        let u = uv.u.rem_euclid(1.0);
        let v = uv.v.rem_euclid(1.0);
        let x = (u * (w - 1) as f64).clamp(0.0, (w - 1) as f64);
        let y = ((1.0 - v) * (h - 1) as f64).clamp(0.0, (h - 1) as f64);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1) % w;
        let y1 = (y0 + 1) % h;
        let dx = x - x0 as f64;
        let dy = y - y0 as f64;

        self.texel(x0, y0) * ((1.0 - dx) * (1.0 - dy))
            + self.texel(x1, y0) * (dx * (1.0 - dy))
            + self.texel(x0, y1) * ((1.0 - dx) * dy)
            + self.texel(x1, y1) * (dx * dy)
    }

    fn texel(&self, x: u32, y: u32) -> Color {
        let [r, g, b] = self.image.get_pixel(x, y).0;
        Color::new(r as f64, g as f64, b as f64) / 255.0
    }
}

/// Where a material takes a base color from.
#[derive(Debug, Clone)]
pub enum Surface {
    Flat(Color),
    Textured(Arc<Texture>),
}

impl Surface {
    /// Base color at `uv`. A textured surface without coordinates samples
    /// the texture origin.
    pub fn color_at(&self, uv: Option<TexCoord>) -> Color {
        match self {
            Surface::Flat(color) => *color,
            Surface::Textured(texture) => texture.sample(uv.unwrap_or_default()),
        }
    }

    #[inline]
    pub fn is_textured(&self) -> bool {
        matches!(self, Surface::Textured(_))
    }
}

/// Inputs the shader needs about a surface point.
#[derive(Debug, Clone, Copy)]
pub struct ShadePoint {
    pub position: Point3<f64>,
    pub normal: Unit<Vector3<f64>>,
    pub uv: Option<TexCoord>,
}

/// Phong material shared by many triangles.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    /// Ambient coefficient per channel.
    pub ka: Color,
    /// Diffuse coefficient per channel.
    pub kd: Color,
    /// Specular coefficient per channel.
    pub ks: Color,
    /// Specular exponent.
    pub shininess: f64,
    pub ambient: Surface,
    pub diffuse: Surface,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            ka: Color::repeat(0.7),
            kd: Color::repeat(0.45),
            ks: Color::repeat(0.2),
            shininess: 16.0,
            ambient: Surface::Flat(Color::repeat(0.9)),
            diffuse: Surface::Flat(Color::repeat(0.8)),
        }
    }
}

impl Material {
    /// A default-coefficient material with a flat base color.
    pub fn flat(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            ambient: Surface::Flat(color),
            diffuse: Surface::Flat(color),
            ..Self::default()
        }
    }

    /// A default-coefficient material whose ambient and diffuse colors come
    /// from `texture`.
    pub fn textured(name: impl Into<String>, texture: Arc<Texture>) -> Self {
        Self {
            name: name.into(),
            ambient: Surface::Textured(Arc::clone(&texture)),
            diffuse: Surface::Textured(texture),
            ..Self::default()
        }
    }

    /// Phong color of `point` seen from `eye`, averaged over every light
    /// sample.
    ///
    /// Per sample: `ka*A*La + kd*D*Ld*max(0, S.N) + ks*Ls*max(0, R.V)^n`,
    /// where `A`/`D` are the surface base colors and `L*` the light's.
    pub fn shade(&self, point: &ShadePoint, eye: Point3<f64>, light: &LightSource) -> Color {
        let samples = light.samples();
        if samples.is_empty() {
            return Color::zeros();
        }

        let n = point.normal.into_inner();
        let view = unit_or_zero(eye - point.position);
        let ambient = self
            .ka
            .component_mul(&self.ambient.color_at(point.uv))
            .component_mul(&light.ambient());
        let diffuse = self
            .kd
            .component_mul(&self.diffuse.color_at(point.uv))
            .component_mul(&light.diffuse());
        let specular = self.ks.component_mul(&light.specular());

        let sum = samples.iter().fold(Color::zeros(), |acc, sample| {
            let s = unit_or_zero(sample - point.position);
            let cos = s.dot(&n);
            let r = unit_or_zero(n * (2.0 * cos) - s);
            let r_dot_v = r.dot(&view).max(0.0);
            acc + ambient + diffuse * cos.max(0.0) + specular * r_dot_v.powf(self.shininess)
        });

        sum / samples.len() as f64
    }
}

fn unit_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;

    fn shade_point(normal: Vector3<f64>) -> ShadePoint {
        ShadePoint {
            position: Point3::origin(),
            normal: Unit::new_normalize(normal),
            uv: None,
        }
    }

    fn checker() -> Texture {
        // 2x2: black, white on the top row; red, blue on the bottom row
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 255, 255]));
        img.put_pixel(0, 1, Rgb([255, 0, 0]));
        img.put_pixel(1, 1, Rgb([0, 0, 255]));
        Texture::from_image(img)
    }

    #[test]
    fn light_straight_above_flat_material() {
        let mat = Material {
            ka: Color::zeros(),
            ks: Color::zeros(),
            kd: Color::repeat(1.0),
            ..Material::flat("white", Color::repeat(1.0))
        };
        let light = LightSource::point(Point3::new(0.0, 0.0, 10.0));
        let c = mat.shade(&shade_point(Vector3::z()), Point3::new(0.0, 0.0, 5.0), &light);
        assert_relative_eq!(c, Color::repeat(1.0), epsilon = 1e-12);
    }

    #[test]
    fn light_behind_surface_leaves_ambient_only() {
        let mat = Material::default();
        let light = LightSource::point(Point3::new(0.0, 0.0, -10.0));
        let c = mat.shade(&shade_point(Vector3::z()), Point3::new(0.0, 0.0, 5.0), &light);
        // ka * ambient color * white light
        assert_relative_eq!(c, Color::repeat(0.7 * 0.9), epsilon = 1e-12);
    }

    #[test]
    fn specular_peaks_at_mirror_direction() {
        let mat = Material {
            ka: Color::zeros(),
            kd: Color::zeros(),
            ks: Color::repeat(1.0),
            shininess: 8.0,
            ..Material::default()
        };
        let light = LightSource::point(Point3::new(-1.0, 0.0, 1.0));
        let n = shade_point(Vector3::z());

        let mirror = mat.shade(&n, Point3::new(1.0, 0.0, 1.0), &light);
        let off = mat.shade(&n, Point3::new(0.0, 0.0, 1.0), &light);
        assert_relative_eq!(mirror, Color::repeat(1.0), epsilon = 1e-9);
        assert!(off.x < mirror.x);
    }

    #[test]
    fn area_light_averages_samples() {
        let mat = Material {
            ka: Color::zeros(),
            ks: Color::zeros(),
            kd: Color::repeat(1.0),
            ..Material::flat("white", Color::repeat(1.0))
        };
        let single = LightSource::point(Point3::new(0.0, 0.0, 10.0));
        let area = LightSource::area(Point3::new(0.0, 0.0, 10.0), 0.0, 0.0, 3);
        let eye = Point3::new(0.0, 0.0, 5.0);
        let p = shade_point(Vector3::z());
        assert_relative_eq!(
            mat.shade(&p, eye, &single),
            mat.shade(&p, eye, &area),
            epsilon = 1e-12
        );
    }

    #[test]
    fn texture_corners_match_texels() {
        let tex = checker();
        // v = 0 is the bottom row
        assert_relative_eq!(
            tex.sample(TexCoord::new(0.0, 0.0)),
            Color::new(1.0, 0.0, 0.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            tex.sample(TexCoord::new(0.0, 1.0 - 1e-12)),
            Color::new(0.0, 0.0, 0.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn texture_bilinear_midpoint_blends() {
        let tex = checker();
        let c = tex.sample(TexCoord::new(0.5, 0.5));
        // average of all four texels
        assert_relative_eq!(c, Color::new(0.5, 0.25, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn texture_wraps_modulo_one() {
        let tex = checker();
        let inside = tex.sample(TexCoord::new(0.25, 0.25));
        assert_relative_eq!(tex.sample(TexCoord::new(1.25, 2.25)), inside, epsilon = 1e-9);
        assert_relative_eq!(tex.sample(TexCoord::new(-0.75, -1.75)), inside, epsilon = 1e-9);
    }

    #[test]
    fn surface_paths() {
        let flat = Surface::Flat(Color::new(0.1, 0.2, 0.3));
        assert!(!flat.is_textured());
        assert_eq!(flat.color_at(Some(TexCoord::new(0.7, 0.2))), Color::new(0.1, 0.2, 0.3));

        let textured = Surface::Textured(Arc::new(checker()));
        assert!(textured.is_textured());
        assert_relative_eq!(
            textured.color_at(None),
            Color::new(1.0, 0.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn missing_texture_file_is_an_error() {
        let err = Texture::open("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, Error::Texture { .. }));
    }
}

//! A placed mesh with its tree and light: tracing, shadows and shading.

use std::sync::Arc;

use crate::kd::{BuildOptions, CentroidMedian, KdTree};
use crate::{
    Color, Error, LightSource, Mesh, Ray, RenderSettings, Result, SpaceTransform, SurfaceHit,
};

/// Fraction of the way toward a light sample that a shadow ray starts, so
/// it does not hit the surface it leaves from.
const SHADOW_NUDGE: f64 = 0.001;

/// A mesh placed in the world, indexed by a k-d tree and lit by one light.
///
/// The tree is built in model space. Rays arrive in world space and are
/// mapped into model space once per query; hits are mapped back once.
pub struct Scene {
    tree: KdTree,
    transform: Box<dyn SpaceTransform>,
    /// World-space light.
    light: LightSource,
    /// The same light in model space, used for shading inside the tree.
    local_light: LightSource,
}

impl Scene {
    /// Builds the tree over `mesh` with default options.
    ///
    /// Fails with [`Error::EmptyScene`] if the mesh has no triangles.
    pub fn new(
        mesh: Mesh,
        transform: impl SpaceTransform + 'static,
        light: LightSource,
    ) -> Result<Self> {
        Self::with_options(mesh, transform, light, BuildOptions::default())
    }

    pub fn with_options(
        mesh: Mesh,
        transform: impl SpaceTransform + 'static,
        light: LightSource,
        options: BuildOptions,
    ) -> Result<Self> {
        let bounds = mesh.bounds().ok_or(Error::EmptyScene)?;
        let tree = KdTree::build_with(Arc::new(mesh), bounds, &CentroidMedian, options)
            .ok_or(Error::EmptyScene)?;
        let local_light = light.map_samples(|p| transform.point_to_local(p));

        Ok(Self {
            tree,
            transform: Box::new(transform),
            light,
            local_light,
        })
    }

    #[inline]
    pub fn tree(&self) -> &KdTree {
        &self.tree
    }

    #[inline]
    pub fn light(&self) -> &LightSource {
        &self.light
    }

    /// Nearest world-space hit along a world-space ray.
    pub fn trace(&self, ray: &Ray) -> Option<SurfaceHit> {
        let local = self.transform.to_local(ray);
        let hit = self.tree.nearest_hit(&local, &self.local_light)?;
        let mut hit = self.transform.to_world(hit);
        hit.distance = hit.distance_from(ray.origin());
        Some(hit)
    }

    /// Average visibility of the light from `hit`, in `[shadow_darkness, 1]`.
    ///
    /// A sample counts fully when the surface faces it and nothing lies
    /// between the surface and the sample; otherwise it counts
    /// `settings.shadow_darkness`.
    pub fn shadow_factor(&self, hit: &SurfaceHit, settings: &RenderSettings) -> f64 {
        let samples = self.light.samples();
        let total: f64 = samples
            .iter()
            .map(|&sample| {
                let start = hit.position + (sample - hit.position) * SHADOW_NUDGE;
                let towards = sample - start;
                let facing = hit.normal.dot(&towards) > 0.0;
                let blocked = || {
                    self.trace(&Ray::new(start, towards))
                        .is_some_and(|blocker| blocker.distance < towards.norm())
                };
                if facing && !blocked() {
                    1.0
                } else {
                    settings.shadow_darkness
                }
            })
            .sum();
        total / samples.len().max(1) as f64
    }

    /// Final color seen along `ray`.
    pub fn shade(&self, ray: &Ray, settings: &RenderSettings) -> Color {
        match self.trace(ray) {
            Some(hit) => hit.color * self.shadow_factor(&hit, settings),
            None => settings.background_color(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Identity, Placement};
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn make_quad(mesh: &mut Mesh, z: f64, half: f64) {
        mesh.push_triangle(
            Point3::new(-half, -half, z),
            Point3::new(half, -half, z),
            Point3::new(half, half, z),
        );
        mesh.push_triangle(
            Point3::new(-half, -half, z),
            Point3::new(half, half, z),
            Point3::new(-half, half, z),
        );
    }

    fn floor() -> Mesh {
        let mut mesh = Mesh::new();
        make_quad(&mut mesh, 0.0, 5.0);
        mesh
    }

    fn down_at(x: f64, y: f64) -> Ray {
        Ray::through(Point3::new(x, y, 10.0), Point3::new(x, y, 0.0))
    }

    #[test]
    fn empty_mesh_is_an_error() {
        let light = LightSource::point(Point3::new(0.0, 0.0, 5.0));
        let err = Scene::new(Mesh::new(), Identity, light).err().unwrap();
        assert!(matches!(err, Error::EmptyScene));
    }

    #[test]
    fn trace_reports_world_distance() {
        let light = LightSource::point(Point3::new(0.0, 0.0, 5.0));
        let placement = Placement::new([2.0; 3], [0.0; 3], [0.0, 0.0, 1.0]).unwrap();
        let scene = Scene::new(floor(), placement, light).unwrap();

        let hit = scene.trace(&down_at(1.0, 1.0)).unwrap();
        assert_relative_eq!(hit.position, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-9);
        assert_relative_eq!(hit.distance, 9.0, epsilon = 1e-9);
        assert_relative_eq!(hit.normal.dot(&Vector3::z()).abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn translated_scene_is_lit_like_the_original() {
        let light = LightSource::point(Point3::new(0.0, 0.0, 5.0));
        let plain = Scene::new(floor(), Identity, light.clone()).unwrap();

        let moved_light = LightSource::point(Point3::new(3.0, 0.0, 5.0));
        let moved =
            Scene::new(floor(), Placement::translation([3.0, 0.0, 0.0]), moved_light).unwrap();

        let a = plain.trace(&down_at(0.5, 0.5)).unwrap();
        let b = moved.trace(&down_at(3.5, 0.5)).unwrap();
        assert_relative_eq!(a.color, b.color, epsilon = 1e-9);
    }

    #[test]
    fn unobstructed_surface_is_fully_lit() {
        let light = LightSource::point(Point3::new(0.0, 0.0, 5.0));
        let scene = Scene::new(floor(), Identity, light).unwrap();
        let settings = RenderSettings::default();

        let hit = scene.trace(&down_at(1.0, 1.0)).unwrap();
        assert_relative_eq!(scene.shadow_factor(&hit, &settings), 1.0);
        assert_relative_eq!(scene.shade(&down_at(1.0, 1.0), &settings), hit.color);
    }

    #[test]
    fn occluder_darkens_surface() {
        let mut mesh = floor();
        make_quad(&mut mesh, 2.0, 0.5);
        let light = LightSource::point(Point3::new(0.0, 0.0, 5.0));
        let scene = Scene::new(mesh, Identity, light).unwrap();
        let settings = RenderSettings {
            shadow_darkness: 0.25,
            ..Default::default()
        };

        // ray from the side so it reaches the floor under the occluder
        let ray = Ray::through(Point3::new(4.0, 0.2, 1.0), Point3::new(0.1, 0.2, 0.0));
        let hit = scene.trace(&ray).unwrap();
        assert_relative_eq!(hit.position.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(scene.shadow_factor(&hit, &settings), 0.25);
    }

    #[test]
    fn light_behind_surface_counts_as_shadow() {
        let light = LightSource::point(Point3::new(0.0, 0.0, -5.0));
        let scene = Scene::new(floor(), Identity, light).unwrap();
        let settings = RenderSettings::default();

        let hit = scene.trace(&down_at(1.0, 1.0)).unwrap();
        assert_relative_eq!(scene.shadow_factor(&hit, &settings), 0.5);
    }

    #[test]
    fn area_light_gives_partial_shadow() {
        let mut mesh = floor();
        // covers x <= 0 at z = 2.5
        mesh.push_triangle(
            Point3::new(-3.0, -3.0, 2.5),
            Point3::new(0.0, -3.0, 2.5),
            Point3::new(0.0, 3.0, 2.5),
        );
        mesh.push_triangle(
            Point3::new(-3.0, -3.0, 2.5),
            Point3::new(0.0, 3.0, 2.5),
            Point3::new(-3.0, 3.0, 2.5),
        );
        // samples at x = -0.5 and x = 0.5, two of each
        let light = LightSource::area(Point3::new(0.0, 0.0, 5.0), 0.0, 2.0, 2);
        let scene = Scene::new(mesh, Identity, light).unwrap();
        let settings = RenderSettings {
            shadow_darkness: 0.0,
            ..Default::default()
        };

        let ray = Ray::through(Point3::new(4.0, 0.2, 0.5), Point3::new(0.1, 0.2, 0.0));
        let hit = scene.trace(&ray).unwrap();
        assert_relative_eq!(hit.position.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(scene.shadow_factor(&hit, &settings), 0.5);
    }

    #[test]
    fn miss_returns_background() {
        let light = LightSource::point(Point3::new(0.0, 0.0, 5.0));
        let scene = Scene::new(floor(), Identity, light).unwrap();
        let settings = RenderSettings::default();

        let away = Ray::new(Point3::new(0.0, 0.0, 1.0), Vector3::z());
        assert_eq!(scene.shade(&away, &settings), settings.background_color());
    }
}

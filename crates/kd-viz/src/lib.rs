//! Shared visualization utilities for the k-d ray tracer viewers.

use std::hash::{Hash, Hasher};

use anyhow::Context;
use kd_raytracer::{Bounds, Mesh as TriangleMesh, SplitPlane, TriangleId};
use log::LevelFilter;
use macroquad::models::{Mesh, Vertex, draw_mesh};
use macroquad::prelude::*;
use nalgebra::Point3;

pub mod demo;
pub mod navigator;
pub use navigator::TreeNavigator;

/// Initializes `env_logger`, letting `RUST_LOG` override `level`.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// Checks that an image fits a macroquad texture, whose sides are `u16`.
pub fn texture_size(width: u32, height: u32) -> anyhow::Result<(u16, u16)> {
    let w = u16::try_from(width)
        .with_context(|| format!("width {width} is too large to display"))?;
    let h = u16::try_from(height)
        .with_context(|| format!("height {height} is too large to display"))?;
    Ok((w, h))
}

#[inline]
pub fn to_vec3(p: &Point3<f64>) -> Vec3 {
    vec3(p.x as f32, p.y as f32, p.z as f32)
}

/// Deterministic color for a triangle, stable across frames.
pub fn triangle_color(id: TriangleId) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let r = (((hash >> 16) & 0xFF) as u8).max(40);
    let g = (((hash >> 8) & 0xFF) as u8).max(40);
    let b = ((hash & 0xFF) as u8).max(40);

    Color::from_rgba(r, g, b, 255)
}

/// Draws one triangle of `mesh` as a filled macroquad mesh.
pub fn draw_triangle(mesh: &TriangleMesh, id: TriangleId, color: Color) {
    let vertices = mesh
        .positions(id)
        .iter()
        .map(|p| Vertex::new2(to_vec3(p), vec2(0.0, 0.0), color))
        .collect();

    draw_mesh(&Mesh {
        vertices,
        indices: vec![0, 1, 2],
        texture: None,
    });
}

/// Draws the edges of a node box.
pub fn draw_bounds(bounds: &Bounds, color: Color) {
    let min = to_vec3(&bounds.min());
    let max = to_vec3(&bounds.max());
    draw_cube_wires((min + max) / 2.0, max - min, color);
}

/// Draws a split plane as a translucent rectangle over its node box.
pub fn draw_split_plane(plane: &SplitPlane, color: Color) {
    let extent = plane.bounds();
    let [u, v] = plane.axis().others();
    let i = plane.axis().index();

    let corner = |hi_u: bool, hi_v: bool| {
        let mut p = extent.min();
        p[i] = plane.location();
        p[u.index()] = if hi_u { extent.hi(u) } else { extent.lo(u) };
        p[v.index()] = if hi_v { extent.hi(v) } else { extent.lo(v) };
        Vertex::new2(to_vec3(&p), vec2(0.0, 0.0), color)
    };

    draw_mesh(&Mesh {
        vertices: vec![
            corner(false, false),
            corner(true, false),
            corner(true, true),
            corner(false, true),
        ],
        // both windings so the plane shows from either side
        indices: vec![0, 1, 2, 0, 2, 3, 0, 2, 1, 0, 3, 2],
        texture: None,
    });
    draw_bounds(extent, Color { a: 1.0, ..color });
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 5.0,
            min_distance: 5.0,
            max_distance: 200.0,
        }
    }

    /// Sets the zoom configuration (speed and distance limits).
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Updates camera state from user input (mouse drag, scroll, arrow keys).
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        let scroll = mouse_wheel().1;
        self.distance -= scroll * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }

        // Clamp pitch to avoid gimbal lock
        self.pitch = self.pitch.clamp(-1.5, 1.5);
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            ..Default::default()
        }
    }

    /// The eye position in tracer coordinates.
    pub fn eye_point(&self) -> Point3<f64> {
        let pos = self.position();
        Point3::new(pos.x as f64, pos.y as f64, pos.z as f64)
    }

    pub fn target_point(&self) -> Point3<f64> {
        Point3::new(self.target.x as f64, self.target.y as f64, self.target.z as f64)
    }
}

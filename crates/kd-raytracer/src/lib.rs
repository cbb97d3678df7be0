//! Offline ray tracing over triangle meshes accelerated by a k-d tree.
//!
//! A [`Mesh`] is indexed by a [`KdTree`] built from centroid-median splits;
//! nearest-hit queries descend only into the parts of the tree a ray
//! passes through and return a shaded [`SurfaceHit`]. A [`Scene`] places a
//! mesh in the world, adds a light and shadows, and [`render`] turns it
//! into an image in parallel.

mod bounds;
mod error;
pub mod intersect;
pub mod kd;
mod light;
mod material;
mod mesh;
mod ray;
mod render;
mod scene;
mod settings;
mod split_plane;
mod transform;

pub use bounds::{Axis, BOUNDS_PADDING, Bounds};
pub use error::{Error, Result};
pub use kd::{BuildOptions, KdNode, KdTree, TreeStats};
pub use light::LightSource;
pub use material::{Color, Material, ShadePoint, Surface, Texture};
pub use mesh::{FaceAttributes, Mesh, TexCoord, Triangle, TriangleId, Vertex, VertexId};
pub use ray::{Ray, SurfaceHit};
pub use render::{Camera, render, to_rgb};
pub use scene::Scene;
pub use settings::RenderSettings;
pub use split_plane::SplitPlane;
pub use transform::{Identity, Placement, SpaceTransform};

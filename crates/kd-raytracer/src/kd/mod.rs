//! k-d tree over triangle meshes for nearest-hit ray queries.
//!
//! The tree recursively halves space with axis-aligned planes, cycling the
//! split axis X, Y, Z with depth. Each split sits at the median of the
//! triangle centroids along that axis, which balances triangle counts
//! rather than box volumes. Triangles that straddle a split are referenced
//! by both children, so a ray only needs to visit the leaf regions it
//! actually passes through.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kd_raytracer::{KdTree, LightSource, Mesh, Ray};
//! use nalgebra::Point3;
//!
//! let mesh = Arc::new(mesh);
//! let bounds = mesh.bounds().expect("mesh has triangles");
//! let tree = KdTree::build(mesh, bounds).expect("mesh has triangles");
//!
//! let light = LightSource::point(Point3::new(0.0, 10.0, 0.0));
//! let ray = Ray::through(Point3::new(0.5, 0.5, 5.0), Point3::new(0.5, 0.5, 0.0));
//! if let Some(hit) = tree.nearest_hit(&ray, &light) {
//!     println!("hit at {} with color {}", hit.position, hit.color);
//! }
//! ```
//!
//! # Architecture
//!
//! - [`KdTree`]: the built tree, sharing the mesh it indexes
//! - [`KdNode`]: a leaf list of triangle ids, or a split plane with two children
//! - [`SplitSelector`]: strategy choosing where a node splits
//! - [`TraversalVisitor`]: caller-owned diagnostics during traversal

mod node;
mod selector;
mod tree;
mod visitor;

pub use node::KdNode;
pub use selector::{CentroidMedian, SpatialMedian, SplitSelector};
pub use tree::{BuildOptions, KdTree, TreeStats};
pub use visitor::{FnVisitor, NoopVisitor, TraversalVisitor, VisitCounter};

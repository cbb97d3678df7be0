//! k-d tree container, construction and nearest-hit traversal.

use std::fmt;
use std::sync::Arc;

use crate::intersect::{TriangleHit, ray_bounds, ray_plane, ray_triangle, shade_triangle};
use crate::{Axis, Bounds, LightSource, Mesh, Ray, SplitPlane, SurfaceHit, TriangleId};

use super::node::KdNode;
use super::selector::{CentroidMedian, SplitSelector};
use super::visitor::{NoopVisitor, TraversalVisitor};

/// Limits applied while building a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Deepest level that may still be split. A node at this level becomes
    /// a leaf holding everything that reached it.
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Size summary of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    /// Levels in the tree (1 for a lone leaf).
    pub depth: usize,
    pub nodes: usize,
    pub leaves: usize,
    /// Triangle references across all leaves, counting straddlers per leaf.
    pub triangle_refs: usize,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "depth {}, {} nodes, {} leaves, {} triangle refs",
            self.depth, self.nodes, self.leaves, self.triangle_refs
        )
    }
}

/// A k-d tree over the triangles of a shared [`Mesh`].
///
/// # Construction
///
/// Each node sorts its triangles by centroid along the axis `level % 3`
/// and splits at the median. A triangle goes to the near child if any
/// vertex lies at or below the split and to the far child if any vertex
/// lies above it, so triangles crossing the split land in both. A node
/// becomes a leaf when it holds a single triangle, when a split would
/// leave one side holding the whole set, or at
/// [`BuildOptions::max_depth`].
///
/// ```ignore
/// let tree = KdTree::build(Arc::new(mesh), bounds).expect("non-empty mesh");
/// ```
///
/// # Traversal
///
/// [`nearest_hit`](Self::nearest_hit) descends only into the children
/// whose half of the node's box the ray actually passes through, and
/// returns the closest shaded hit. The tree is immutable once built, so
/// any number of rays may query it concurrently.
#[derive(Debug, Clone)]
pub struct KdTree {
    mesh: Arc<Mesh>,
    root: KdNode,
}

impl KdTree {
    /// Builds a tree over every triangle of `mesh` with the default
    /// [`CentroidMedian`] selector.
    ///
    /// Returns `None` if the mesh has no triangles.
    pub fn build(mesh: Arc<Mesh>, bounds: Bounds) -> Option<Self> {
        Self::build_with(mesh, bounds, &CentroidMedian, BuildOptions::default())
    }

    /// Builds a tree choosing split positions with `selector`.
    ///
    /// Returns `None` if the mesh has no triangles.
    pub fn build_with<S: SplitSelector>(
        mesh: Arc<Mesh>,
        bounds: Bounds,
        selector: &S,
        options: BuildOptions,
    ) -> Option<Self> {
        if mesh.is_empty() {
            log::warn!("refusing to build a k-d tree over an empty mesh");
            return None;
        }

        log::debug!("building k-d tree over {} triangles in {bounds}", mesh.len());
        let triangles: Vec<TriangleId> = mesh.triangle_ids().collect();
        let root = build_node(&mesh, triangles, bounds, 0, selector, &options);
        let tree = Self { mesh, root };
        log::info!("built k-d tree: {}", tree.stats());

        Some(tree)
    }

    #[inline]
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    #[inline]
    pub fn root(&self) -> &KdNode {
        &self.root
    }

    /// Bounds of the root node.
    #[inline]
    pub fn bounds(&self) -> &Bounds {
        self.root.bounds()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            depth: self.root.depth(),
            nodes: self.root.node_count(),
            leaves: self.root.leaf_count(),
            triangle_refs: self.root.triangle_ref_count(),
        }
    }

    /// Finds the closest triangle hit along `ray`, shaded under `light`.
    ///
    /// Candidates are compared by ray parameter alone; only the winner is
    /// shaded.
    pub fn nearest_hit(&self, ray: &Ray, light: &LightSource) -> Option<SurfaceHit> {
        self.traverse_with(ray, light, &mut NoopVisitor)
    }

    /// Like [`nearest_hit`](Self::nearest_hit), reporting every node
    /// entered, triangle tested and the shaded winner to `visitor`.
    pub fn traverse_with<V: TraversalVisitor>(
        &self,
        ray: &Ray,
        light: &LightSource,
        visitor: &mut V,
    ) -> Option<SurfaceHit> {
        let query = Query {
            mesh: &self.mesh,
            ray,
        };
        let (id, hit) = query.traverse(&self.root, visitor)?;
        visitor.visit_shade(id);
        shade_triangle(ray, &self.mesh, id, &hit, light)
    }
}

fn build_node<S: SplitSelector>(
    mesh: &Mesh,
    mut triangles: Vec<TriangleId>,
    bounds: Bounds,
    level: usize,
    selector: &S,
    options: &BuildOptions,
) -> KdNode {
    if triangles.len() <= 1 {
        return KdNode::leaf(level, bounds, triangles);
    }
    if level >= options.max_depth {
        log::debug!(
            "depth limit {} reached with {} triangles",
            options.max_depth,
            triangles.len()
        );
        return KdNode::leaf(level, bounds, triangles);
    }

    let axis = Axis::from_level(level);
    let median = selector.select(mesh, &mut triangles, &bounds, axis);
    // Keep both child boxes inside the parent
    let location = median.clamp(bounds.lo(axis), bounds.hi(axis));

    let (near_set, far_set) = partition(mesh, &triangles, axis, location);
    if near_set.len() == triangles.len() || far_set.len() == triangles.len() {
        return KdNode::leaf(level, bounds, triangles);
    }

    let plane = SplitPlane::new(&bounds, axis, location);
    let (near_bounds, far_bounds) = bounds.split(axis, location);
    let near = build_node(mesh, near_set, near_bounds, level + 1, selector, options);
    let far = build_node(mesh, far_set, far_bounds, level + 1, selector, options);

    KdNode::split(level, bounds, plane, near, far)
}

/// Assigns triangles to the sides of `axis = at` by vertex position.
///
/// Every triangle lands in at least one side; one crossing the split lands
/// in both.
fn partition(
    mesh: &Mesh,
    triangles: &[TriangleId],
    axis: Axis,
    at: f64,
) -> (Vec<TriangleId>, Vec<TriangleId>) {
    let i = axis.index();
    let mut near = Vec::new();
    let mut far = Vec::new();

    for &id in triangles {
        let corners = mesh.positions(id);
        if corners.iter().any(|p| p[i] <= at) {
            near.push(id);
        }
        if corners.iter().any(|p| p[i] > at) {
            far.push(id);
        }
    }

    (near, far)
}

/// A triangle the ray crosses, not yet shaded.
type Candidate = (TriangleId, TriangleHit);

/// Picks the candidate nearer the ray origin, keeping `a` on ties.
fn nearer(a: Option<Candidate>, b: Option<Candidate>) -> Option<Candidate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.1.t < a.1.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

/// State shared by every step of one nearest-hit query.
struct Query<'a> {
    mesh: &'a Mesh,
    ray: &'a Ray,
}

impl Query<'_> {
    fn traverse<V: TraversalVisitor>(
        &self,
        node: &KdNode,
        visitor: &mut V,
    ) -> Option<Candidate> {
        visitor.visit_node(node);

        let Some((near, far)) = node.children() else {
            return self.nearest_in_leaf(node.triangles(), visitor);
        };
        let plane = node.split_plane()?;

        let crossing = ray_bounds(self.ray, node.bounds())?;
        let i = plane.axis().index();
        let split = plane.location();
        let entry = crossing.entry[i];
        let exit = crossing.exit[i];

        if ray_plane(self.ray, plane).is_none() {
            let side = if entry < split { near } else { far };
            return self.traverse(side, visitor);
        }

        if entry <= split {
            if exit <= split {
                self.traverse(near, visitor)
            } else {
                self.both(near, far, visitor)
            }
        } else if exit > split {
            self.traverse(far, visitor)
        } else {
            self.both(far, near, visitor)
        }
    }

    /// Queries both children, `first` being the one the ray enters first.
    fn both<V: TraversalVisitor>(
        &self,
        first: &KdNode,
        second: &KdNode,
        visitor: &mut V,
    ) -> Option<Candidate> {
        let a = self.traverse(first, visitor);
        let b = self.traverse(second, visitor);
        nearer(a, b)
    }

    /// Nearest crossing among a leaf's triangles. Triangles without a
    /// geometric normal cannot be shaded and never win.
    fn nearest_in_leaf<V: TraversalVisitor>(
        &self,
        triangles: &[TriangleId],
        visitor: &mut V,
    ) -> Option<Candidate> {
        triangles.iter().fold(None, |best, &id| {
            visitor.visit_triangle(id);
            let hit = self
                .mesh
                .triangle(id)
                .normal()
                .and_then(|_| ray_triangle(self.ray, self.mesh, id))
                .map(|hit| (id, hit));
            nearer(best, hit)
        })
    }
}

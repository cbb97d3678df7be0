//! k-d tree node implementation.

use crate::{Axis, Bounds, SplitPlane, TriangleId};

/// A node in the k-d tree.
///
/// Every node covers a box. A leaf lists the triangles touching its region;
/// an internal node holds the plane splitting its box and the two children
/// on either side. The two forms are mutually exclusive.
#[derive(Debug, Clone)]
pub struct KdNode {
    /// Depth of this node; `level % 3` picks the split axis.
    level: usize,

    bounds: Bounds,

    content: Content,
}

#[derive(Debug, Clone)]
enum Content {
    Leaf(Vec<TriangleId>),
    Split {
        plane: SplitPlane,
        /// Child covering the side at or below the plane.
        near: Box<KdNode>,
        /// Child covering the side above the plane.
        far: Box<KdNode>,
    },
}

impl KdNode {
    /// Creates a leaf holding `triangles`.
    pub fn leaf(level: usize, bounds: Bounds, triangles: Vec<TriangleId>) -> Self {
        Self {
            level,
            bounds,
            content: Content::Leaf(triangles),
        }
    }

    /// Creates an internal node split by `plane`.
    pub fn split(
        level: usize,
        bounds: Bounds,
        plane: SplitPlane,
        near: KdNode,
        far: KdNode,
    ) -> Self {
        Self {
            level,
            bounds,
            content: Content::Split {
                plane,
                near: Box::new(near),
                far: Box::new(far),
            },
        }
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// The split axis for this node's level.
    #[inline]
    pub fn axis(&self) -> Axis {
        Axis::from_level(self.level)
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The splitting plane, for internal nodes.
    #[inline]
    pub fn split_plane(&self) -> Option<&SplitPlane> {
        match &self.content {
            Content::Split { plane, .. } => Some(plane),
            Content::Leaf(_) => None,
        }
    }

    /// The `(near, far)` children, for internal nodes.
    #[inline]
    pub fn children(&self) -> Option<(&KdNode, &KdNode)> {
        match &self.content {
            Content::Split { near, far, .. } => Some((near, far)),
            Content::Leaf(_) => None,
        }
    }

    #[inline]
    pub fn near(&self) -> Option<&KdNode> {
        self.children().map(|(near, _)| near)
    }

    #[inline]
    pub fn far(&self) -> Option<&KdNode> {
        self.children().map(|(_, far)| far)
    }

    /// Triangles stored at this node; empty for internal nodes.
    #[inline]
    pub fn triangles(&self) -> &[TriangleId] {
        match &self.content {
            Content::Leaf(triangles) => triangles,
            Content::Split { .. } => &[],
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.content, Content::Leaf(_))
    }

    /// Depth of this subtree (1 for a leaf).
    pub fn depth(&self) -> usize {
        match self.children() {
            Some((near, far)) => 1 + near.depth().max(far.depth()),
            None => 1,
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        match self.children() {
            Some((near, far)) => 1 + near.node_count() + far.node_count(),
            None => 1,
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self.children() {
            Some((near, far)) => near.leaf_count() + far.leaf_count(),
            None => 1,
        }
    }

    /// Triangle references across all leaves. Straddling triangles are
    /// counted once per leaf that holds them.
    pub fn triangle_ref_count(&self) -> usize {
        match self.children() {
            Some((near, far)) => near.triangle_ref_count() + far.triangle_ref_count(),
            None => self.triangles().len(),
        }
    }
}

//! Visitor pattern for k-d tree traversal.
//!
//! Visitors observe a nearest-hit query as it runs: which nodes it enters
//! and which triangles it tests. A triangle referenced by several leaves
//! may be reported more than once per ray. Visitor state belongs to the
//! caller, so a shared tree can serve many rays in parallel.

use std::collections::HashSet;

use crate::TriangleId;

use super::KdNode;

/// Observer for nodes and triangles reached during traversal.
pub trait TraversalVisitor {
    /// Called for every node the traversal descends into, before the node's
    /// box is tested.
    fn visit_node(&mut self, node: &KdNode);

    /// Called for every ray/triangle test performed in a leaf.
    fn visit_triangle(&mut self, triangle: TriangleId);

    /// Called once per query for the winning triangle, just before it is
    /// shaded.
    fn visit_shade(&mut self, _triangle: TriangleId) {}
}

/// A visitor that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVisitor;

impl TraversalVisitor for NoopVisitor {
    #[inline]
    fn visit_node(&mut self, _node: &KdNode) {}

    #[inline]
    fn visit_triangle(&mut self, _triangle: TriangleId) {}
}

/// Counts the work a query performed.
#[derive(Debug, Clone, Default)]
pub struct VisitCounter {
    nodes: usize,
    leaves: usize,
    tests: usize,
    shaded: usize,
    touched: HashSet<TriangleId>,
}

impl VisitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes entered, leaves included.
    #[inline]
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    #[inline]
    pub fn leaves(&self) -> usize {
        self.leaves
    }

    /// Ray/triangle tests, counting repeats.
    #[inline]
    pub fn triangle_tests(&self) -> usize {
        self.tests
    }

    /// Shading evaluations; at most one per query.
    #[inline]
    pub fn shaded(&self) -> usize {
        self.shaded
    }

    /// Distinct triangles tested.
    #[inline]
    pub fn distinct_triangles(&self) -> usize {
        self.touched.len()
    }

    /// Every distinct triangle tested, in no particular order.
    pub fn tested(&self) -> impl Iterator<Item = TriangleId> + '_ {
        self.touched.iter().copied()
    }

    #[inline]
    pub fn was_tested(&self, triangle: TriangleId) -> bool {
        self.touched.contains(&triangle)
    }

    /// Clears all counts for reuse with another ray.
    pub fn reset(&mut self) {
        self.nodes = 0;
        self.leaves = 0;
        self.tests = 0;
        self.shaded = 0;
        self.touched.clear();
    }
}

impl TraversalVisitor for VisitCounter {
    fn visit_node(&mut self, node: &KdNode) {
        self.nodes += 1;
        if node.is_leaf() {
            self.leaves += 1;
        }
    }

    fn visit_triangle(&mut self, triangle: TriangleId) {
        self.tests += 1;
        self.touched.insert(triangle);
    }

    fn visit_shade(&mut self, _triangle: TriangleId) {
        self.shaded += 1;
    }
}

/// A visitor that calls a closure for each tested triangle.
pub struct FnVisitor<F>
where
    F: FnMut(TriangleId),
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(TriangleId),
{
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> TraversalVisitor for FnVisitor<F>
where
    F: FnMut(TriangleId),
{
    #[inline]
    fn visit_node(&mut self, _node: &KdNode) {}

    fn visit_triangle(&mut self, triangle: TriangleId) {
        (self.func)(triangle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, Mesh};
    use nalgebra::Point3;

    fn make_ids() -> Vec<TriangleId> {
        let mesh = Mesh::from_triangles([
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            [
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
        ]);
        mesh.triangle_ids().collect()
    }

    #[test]
    fn counter_starts_empty() {
        let counter = VisitCounter::new();
        assert_eq!(counter.nodes(), 0);
        assert_eq!(counter.triangle_tests(), 0);
        assert_eq!(counter.distinct_triangles(), 0);
    }

    #[test]
    fn counter_tracks_repeats_and_distinct() {
        let ids = make_ids();
        let bounds = Bounds::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let leaf = KdNode::leaf(0, bounds, ids.clone());

        let mut counter = VisitCounter::new();
        counter.visit_node(&leaf);
        counter.visit_triangle(ids[0]);
        counter.visit_triangle(ids[0]);
        counter.visit_triangle(ids[1]);
        counter.visit_shade(ids[1]);

        assert_eq!(counter.nodes(), 1);
        assert_eq!(counter.leaves(), 1);
        assert_eq!(counter.triangle_tests(), 3);
        assert_eq!(counter.distinct_triangles(), 2);
        assert!(counter.was_tested(ids[1]));
        assert_eq!(counter.shaded(), 1);
        let mut tested: Vec<_> = counter.tested().collect();
        tested.sort();
        assert_eq!(tested, ids);

        counter.reset();
        assert_eq!(counter.triangle_tests(), 0);
        assert_eq!(counter.shaded(), 0);
        assert!(!counter.was_tested(ids[1]));
    }

    #[test]
    fn fn_visitor_calls_closure() {
        let ids = make_ids();
        let mut seen = Vec::new();
        {
            let mut visitor = FnVisitor::new(|id| seen.push(id));
            visitor.visit_triangle(ids[1]);
            visitor.visit_triangle(ids[0]);
        }
        assert_eq!(seen, vec![ids[1], ids[0]]);
    }
}

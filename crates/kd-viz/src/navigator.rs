//! k-d tree navigation utilities for interactive visualization.

use std::collections::BTreeSet;

use kd_raytracer::{KdNode, KdTree, TriangleId};
use macroquad::prelude::*;

use crate::{draw_bounds, draw_split_plane, draw_triangle, triangle_color};

/// Child taken at each node in the navigation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// The child at or below the split.
    Near,
    /// The child above the split.
    Far,
}

/// Interactive navigator for exploring the tree structure.
pub struct TreeNavigator {
    path: Vec<Direction>,
}

impl Default for TreeNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeNavigator {
    /// Creates a new navigator starting at the root.
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Attempts to step into `direction`. Returns true if successful.
    pub fn go(&mut self, tree: &KdTree, direction: Direction) -> bool {
        if self.current_node(tree).children().is_some() {
            self.path.push(direction);
            return true;
        }
        false
    }

    /// Navigates to the parent node. Returns true if not already at root.
    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    pub fn go_root(&mut self) {
        self.path.clear();
    }

    /// Handles keyboard input for navigation.
    /// Returns true if navigation state changed.
    pub fn update(&mut self, tree: &KdTree) -> bool {
        let mut changed = false;

        if is_key_pressed(KeyCode::A) {
            changed = self.go(tree, Direction::Near);
        }
        if is_key_pressed(KeyCode::B) {
            changed = self.go(tree, Direction::Far);
        }
        if is_key_pressed(KeyCode::P) {
            changed = self.go_parent();
        }
        if is_key_pressed(KeyCode::R) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }

        changed
    }

    /// The node at the end of the current path.
    pub fn current_node<'a>(&self, tree: &'a KdTree) -> &'a KdNode {
        let mut current = tree.root();
        for direction in &self.path {
            let Some((near, far)) = current.children() else {
                break;
            };
            current = match direction {
                Direction::Near => near,
                Direction::Far => far,
            };
        }
        current
    }

    /// Draws the current node's box and split plane, and every triangle
    /// referenced below it.
    pub fn render(&self, tree: &KdTree) {
        let node = self.current_node(tree);
        for id in subtree_triangles(node) {
            draw_triangle(tree.mesh(), id, triangle_color(id));
        }
        match node.split_plane() {
            Some(plane) => draw_split_plane(plane, Color::new(1.0, 0.9, 0.2, 0.35)),
            None => draw_bounds(node.bounds(), ORANGE),
        }
    }

    /// Draws the navigation UI overlay.
    pub fn draw_ui(&self, tree: &KdTree, y_offset: f32) {
        let node = self.current_node(tree);
        let is_leaf = node.is_leaf();

        let path_str = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|d| match d {
                    Direction::Near => "A",
                    Direction::Far => "B",
                })
                .collect::<Vec<_>>()
                .join(" -> ")
        };

        draw_text(
            &format!(
                "Subtree: {} triangles, {} refs in {} leaves",
                subtree_triangles(node).len(),
                node.triangle_ref_count(),
                node.leaf_count()
            ),
            10.0,
            y_offset,
            18.0,
            WHITE,
        );
        draw_text(
            &format!("Path: {} (level {})", path_str, node.level()),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        let split = match node.split_plane() {
            Some(plane) => format!(
                "split {} = {:.3}  [A] near | [B] far",
                plane.axis(),
                plane.location()
            ),
            None => "(leaf)".to_string(),
        };
        draw_text(
            &split,
            10.0,
            y_offset + 40.0,
            18.0,
            if is_leaf { ORANGE } else { GREEN },
        );
        draw_text("[P]arent | [R]oot", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}

/// Distinct triangles referenced by the leaves under `node`.
fn subtree_triangles(node: &KdNode) -> BTreeSet<TriangleId> {
    let mut found = BTreeSet::new();
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        match node.children() {
            Some((near, far)) => {
                stack.push(near);
                stack.push(far);
            }
            None => found.extend(node.triangles().iter().copied()),
        }
    }
    found
}

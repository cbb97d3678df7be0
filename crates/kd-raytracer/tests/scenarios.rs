//! Fixed scenes with known answers.

use std::sync::Arc;

use approx::assert_relative_eq;
use kd_raytracer::intersect::ray_bounds;
use kd_raytracer::{Bounds, KdNode, KdTree, LightSource, Mesh, Ray, TriangleId};
use nalgebra::{Point3, Vector3};

fn make_triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> [Point3<f64>; 3] {
    [Point3::from(a), Point3::from(b), Point3::from(c)]
}

fn light() -> LightSource {
    LightSource::point(Point3::new(0.5, 0.5, 10.0))
}

fn unit_square_tree() -> KdTree {
    let mesh = Mesh::from_triangles([
        make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
        make_triangle([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
    ]);
    let bounds = Bounds::new(Point3::new(-0.1, -0.1, -0.1), Point3::new(1.1, 1.1, 1.1));
    KdTree::build(Arc::new(mesh), bounds).unwrap()
}

fn subtree_holds(node: &KdNode, id: TriangleId) -> bool {
    if node.triangles().contains(&id) {
        return true;
    }
    node.children()
        .is_some_and(|(near, far)| subtree_holds(near, id) || subtree_holds(far, id))
}

#[test]
fn unit_square_hit() {
    let tree = unit_square_tree();
    let ray = Ray::through(Point3::new(0.5, 0.5, 5.0), Point3::new(0.5, 0.5, -5.0));

    let hit = tree.nearest_hit(&ray, &light()).unwrap();
    assert_relative_eq!(hit.position, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-9);
    assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-9);
    assert_relative_eq!(hit.normal.z.abs(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(hit.normal.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(hit.normal.y, 0.0, epsilon = 1e-12);
}

#[test]
fn unit_square_miss() {
    let tree = unit_square_tree();
    let ray = Ray::through(Point3::new(5.0, 5.0, 5.0), Point3::new(5.0, 5.0, -5.0));
    assert!(tree.nearest_hit(&ray, &light()).is_none());
}

#[test]
fn straddling_triangle_is_found_beyond_its_centroid() {
    // centroids at x = 1/6, 1.8 and 25/6; the root splits at x = 1.8
    let mesh = Arc::new(Mesh::from_triangles([
        make_triangle([0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0, 1.0, 0.0]),
        make_triangle([0.8, 0.0, 0.0], [3.8, 0.0, 0.0], [0.8, 1.0, 0.0]),
        make_triangle([4.0, 0.0, 0.0], [4.5, 0.0, 0.0], [4.0, 1.0, 0.0]),
    ]));
    let straddler = mesh.triangle_ids().nth(1).unwrap();
    let bounds = mesh.bounds().unwrap();
    let tree = KdTree::build(mesh, bounds).unwrap();

    let root = tree.root();
    assert_relative_eq!(root.split_plane().unwrap().location(), 1.8, epsilon = 1e-12);
    let (near, far) = root.children().unwrap();
    assert!(subtree_holds(near, straddler));
    assert!(subtree_holds(far, straddler));

    // this point lies on the far side, away from the straddler's centroid
    let ray = Ray::through(Point3::new(3.0, 0.1, 5.0), Point3::new(3.0, 0.1, 0.0));
    let hit = tree.nearest_hit(&ray, &light()).unwrap();
    assert_eq!(hit.triangle, straddler);
    assert_relative_eq!(hit.position, Point3::new(3.0, 0.1, 0.0), epsilon = 1e-9);
}

#[test]
fn inseparable_triangles_terminate_and_answer() {
    // every triangle spans the cube diagonal, so no split can separate them
    let triangles: Vec<_> = (0..12)
        .map(|i| {
            let a = i as f64 * std::f64::consts::TAU / 12.0;
            make_triangle(
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 1.0],
                [0.5 + 0.5 * a.cos(), 0.5 + 0.5 * a.sin(), 0.5],
            )
        })
        .collect();
    let mesh = Arc::new(Mesh::from_triangles(triangles));
    let bounds = mesh.bounds().unwrap();
    let tree = KdTree::build(mesh.clone(), bounds).unwrap();

    assert!(tree.root().is_leaf());
    assert_eq!(tree.root().triangles().len(), 12);

    let ray = Ray::through(Point3::new(0.9, 0.5, 5.0), Point3::new(0.9, 0.5, 0.0));
    let expected = mesh
        .triangle_ids()
        .filter_map(|id| kd_raytracer::intersect::intersect_triangle(&ray, &mesh, id, &light()))
        .map(|hit| hit.distance)
        .min_by(f64::total_cmp);
    let hit = tree.nearest_hit(&ray, &light()).map(|hit| hit.distance);
    assert_eq!(hit.is_some(), expected.is_some());
    if let (Some(a), Some(b)) = (hit, expected) {
        assert_relative_eq!(a, b, epsilon = 1e-9);
    }
}

#[test]
fn grazing_rays_give_clean_box_answers() {
    let unit = Bounds::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
    let grazers = [
        // along an edge
        Ray::new(Point3::new(-1.0, 0.0, 0.0), Vector3::x()),
        // along a face
        Ray::new(Point3::new(-1.0, 0.5, 1.0), Vector3::x()),
        // through two opposite corners
        Ray::through(Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 2.0, 2.0)),
        // across one corner only
        Ray::through(Point3::new(2.0, 0.0, 1.0), Point3::new(1.0, 1.0, 1.0)),
        // diagonally across a face edge
        Ray::through(Point3::new(-1.0, 0.5, 2.0), Point3::new(1.0, 0.5, 0.0)),
    ];

    for ray in grazers {
        if let Some(crossing) = ray_bounds(&ray, &unit) {
            assert!(crossing.entry.iter().all(|c| c.is_finite()), "{ray}");
            assert!(crossing.exit.iter().all(|c| c.is_finite()), "{ray}");
            assert!(crossing.t_entry < crossing.t_exit, "{ray}: single-point crossing");
        }
    }
}

#[test]
fn triangle_lying_on_a_box_face_is_hit() {
    // the triangle lies in the y = 0 face of its own bounds
    let mesh = Arc::new(Mesh::from_triangles([
        make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        make_triangle([3.0, 0.0, 0.0], [4.0, 0.0, 0.0], [3.0, 0.0, 1.0]),
    ]));
    let bounds = Bounds::new(Point3::origin(), Point3::new(4.0, 1.0, 1.0));
    let tree = KdTree::build(mesh.clone(), bounds).unwrap();

    let ray = Ray::through(Point3::new(0.25, -1.0, 0.25), Point3::new(0.25, 0.0, 0.25));
    let hit = tree.nearest_hit(&ray, &light()).unwrap();
    assert_relative_eq!(hit.position, Point3::new(0.25, 0.0, 0.25), epsilon = 1e-9);
    assert_eq!(Some(hit.triangle), mesh.triangle_ids().next());
}

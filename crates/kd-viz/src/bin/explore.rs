//! Orbit the demo mesh and walk its k-d tree node by node.
//!
//! Space casts a probe ray from the eye to the orbit target and shows the
//! hit and how much of the tree the query touched.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use kd_raytracer::kd::VisitCounter;
use kd_raytracer::{KdTree, Ray, SurfaceHit, TriangleId};
use kd_viz::demo::{demo_light, demo_mesh};
use kd_viz::{OrbitCamera, TreeNavigator, draw_bounds, draw_triangle, init_logger, to_vec3};
use log::LevelFilter;
use macroquad::prelude::*;

struct Probe {
    ray: Ray,
    hit: Option<SurfaceHit>,
    nodes: usize,
    tests: usize,
    tested: BTreeSet<TriangleId>,
}

fn cast_probe(tree: &KdTree, camera: &OrbitCamera) -> Probe {
    let ray = Ray::through(camera.eye_point(), camera.target_point());
    let light = demo_light();

    let mut counter = VisitCounter::new();
    let hit = tree.traverse_with(&ray, &light, &mut counter);

    Probe {
        ray,
        hit,
        nodes: counter.nodes(),
        tests: counter.triangle_tests(),
        tested: counter.tested().collect(),
    }
}

fn build_tree() -> anyhow::Result<KdTree> {
    let mesh = Arc::new(demo_mesh().context("building demo mesh")?);
    let bounds = mesh.bounds().context("demo mesh is empty")?;
    KdTree::build(mesh, bounds).context("demo mesh is empty")
}

#[macroquad::main("k-d Tree Explorer")]
async fn main() {
    init_logger(LevelFilter::Info);

    let tree = match build_tree() {
        Ok(tree) => tree,
        Err(err) => {
            log::error!("{err:#}");
            return;
        }
    };
    let stats = tree.stats();

    let mut camera = OrbitCamera::new(35.0, 0.4, 0.35)
        .with_zoom(3.0, 5.0, 120.0)
        .with_target(vec3(0.0, 3.0, 0.0));
    let mut navigator = TreeNavigator::new();
    let mut probe: Option<Probe> = None;

    loop {
        camera.update();
        navigator.update(&tree);
        if is_key_pressed(KeyCode::Space) {
            probe = Some(cast_probe(&tree, &camera));
        }
        if is_key_pressed(KeyCode::C) {
            probe = None;
        }

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        navigator.render(&tree);
        draw_bounds(tree.bounds(), DARKGRAY);

        if let Some(probe) = &probe {
            for &id in &probe.tested {
                draw_triangle(tree.mesh(), id, Color::new(1.0, 1.0, 1.0, 0.6));
            }
            let end = match &probe.hit {
                Some(hit) => hit.position,
                None => probe.ray.at(100.0),
            };
            draw_line_3d(to_vec3(&probe.ray.origin()), to_vec3(&end), MAGENTA);
            if let Some(hit) = &probe.hit {
                draw_sphere(to_vec3(&hit.position), 0.15, None, MAGENTA);
            }
        }

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(8.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 8.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 8.0), BLUE);

        set_default_camera();

        draw_text(
            &format!("k-d tree over {} triangles", tree.mesh().len()),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(&format!("{stats}"), 10.0, 45.0, 18.0, GRAY);

        navigator.draw_ui(&tree, 70.0);

        if let Some(probe) = &probe {
            let result = match &probe.hit {
                Some(hit) => format!("hit at distance {:.2}", hit.distance),
                None => "miss".to_string(),
            };
            draw_text(
                &format!(
                    "Probe: {result}, {} nodes, {} tests, {} distinct triangles",
                    probe.nodes,
                    probe.tests,
                    probe.tested.len()
                ),
                10.0,
                155.0,
                16.0,
                MAGENTA,
            );
        }

        draw_text(
            "Drag mouse to rotate, scroll to zoom | [Space] probe | [C] clear",
            10.0,
            175.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 195.0, 16.0, DARKGRAY);

        next_frame().await
    }
}

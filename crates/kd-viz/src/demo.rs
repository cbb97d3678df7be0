//! The demo scene shared by the viewers: a corner of a room with two
//! blocks and a ball under an area light.

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use image::{Rgb, RgbImage};
use kd_raytracer::{
    Camera, Color, FaceAttributes, LightSource, Material, Mesh, Placement, RenderSettings, Scene,
    TexCoord, Texture, VertexId,
};
use nalgebra::{Point3, Vector3};

const ROOM: f64 = 10.0;
const WALL_HEIGHT: f64 = 12.0;

/// Checkerboard texture with `cells` squares per side.
pub fn checker_texture(size: u32, cells: u32) -> Texture {
    let cell = (size / cells.max(1)).max(1);
    Texture::from_image(RgbImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgb([225, 220, 210])
        } else {
            Rgb([70, 90, 120])
        }
    }))
}

/// Adds a quad with its own four vertices, so its shading stays flat.
fn add_flat_quad(
    mesh: &mut Mesh,
    corners: [Point3<f64>; 4],
    uvs: Option<[TexCoord; 4]>,
    attributes: &FaceAttributes,
) {
    let ids = corners.map(|p| mesh.add_vertex(p));
    mesh.add_quad(ids, uvs, attributes);
}

/// Adds a unit cube centered at the origin and mapped through `placement`.
pub fn add_block(mesh: &mut Mesh, placement: &Placement, material: Arc<Material>) {
    let corners = [
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, 0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
    ]
    .map(|c| placement.transform_point(&Point3::from(c)));

    // counter-clockwise seen from outside
    let faces: [[usize; 4]; 6] = [
        [4, 5, 6, 7], // +Z
        [1, 0, 3, 2], // -Z
        [0, 4, 7, 3], // -X
        [5, 1, 2, 6], // +X
        [7, 6, 2, 3], // +Y
        [0, 1, 5, 4], // -Y
    ];

    let attributes = FaceAttributes {
        material: Some(material),
        smoothing_group: 0,
    };
    for face in faces {
        add_flat_quad(mesh, face.map(|i| corners[i]), None, &attributes);
    }
}

/// Adds a UV sphere whose vertices are shared between neighboring faces,
/// so [`Mesh::interpolate_normals`] smooths it.
pub fn add_ball(
    mesh: &mut Mesh,
    center: Point3<f64>,
    radius: f64,
    stacks: usize,
    slices: usize,
    attributes: &FaceAttributes,
) {
    let stacks = stacks.max(2);
    let slices = slices.max(3);

    let rings: Vec<Vec<VertexId>> = (0..=stacks)
        .map(|i| {
            let theta = PI * i as f64 / stacks as f64;
            (0..slices)
                .map(|j| {
                    let phi = TAU * j as f64 / slices as f64;
                    let offset = Vector3::new(
                        theta.sin() * phi.cos(),
                        theta.cos(),
                        theta.sin() * phi.sin(),
                    );
                    mesh.add_vertex(center + offset * radius)
                })
                .collect()
        })
        .collect();

    for i in 0..stacks {
        for j in 0..slices {
            let next = (j + 1) % slices;
            let a = rings[i][j];
            let b = rings[i][next];
            let c = rings[i + 1][next];
            let d = rings[i + 1][j];
            // the pole rings collapse to a point; skip the zero-area half
            if i > 0 {
                mesh.add_triangle([a, b, c], None, attributes);
            }
            if i + 1 < stacks {
                mesh.add_triangle([a, c, d], None, attributes);
            }
        }
    }
}

/// Builds the demo mesh in model space.
pub fn demo_mesh() -> kd_raytracer::Result<Mesh> {
    let floor = Arc::new(Material::textured("floor", Arc::new(checker_texture(256, 8))));
    let wall = Arc::new(Material::flat("wall", Color::new(0.85, 0.8, 0.75)));
    let red = Arc::new(Material::flat("red block", Color::new(0.85, 0.25, 0.2)));
    let blue = Arc::new(Material::flat("blue block", Color::new(0.25, 0.4, 0.85)));
    let ball = Arc::new(Material {
        ks: Color::repeat(0.6),
        shininess: 48.0,
        ..Material::flat("ball", Color::new(0.9, 0.8, 0.3))
    });

    let mut mesh = Mesh::with_material(Arc::clone(&wall));
    let walls = FaceAttributes::default();

    // the floor texture repeats twice in each direction
    add_flat_quad(
        &mut mesh,
        [
            Point3::new(-ROOM, 0.0, ROOM),
            Point3::new(ROOM, 0.0, ROOM),
            Point3::new(ROOM, 0.0, -ROOM),
            Point3::new(-ROOM, 0.0, -ROOM),
        ],
        Some([
            TexCoord::new(0.0, 0.0),
            TexCoord::new(2.0, 0.0),
            TexCoord::new(2.0, 2.0),
            TexCoord::new(0.0, 2.0),
        ]),
        &FaceAttributes {
            material: Some(floor),
            smoothing_group: 0,
        },
    );
    // back wall, facing +Z
    add_flat_quad(
        &mut mesh,
        [
            Point3::new(-ROOM, 0.0, -ROOM),
            Point3::new(ROOM, 0.0, -ROOM),
            Point3::new(ROOM, WALL_HEIGHT, -ROOM),
            Point3::new(-ROOM, WALL_HEIGHT, -ROOM),
        ],
        None,
        &walls,
    );
    // left wall, facing +X
    add_flat_quad(
        &mut mesh,
        [
            Point3::new(-ROOM, 0.0, ROOM),
            Point3::new(-ROOM, 0.0, -ROOM),
            Point3::new(-ROOM, WALL_HEIGHT, -ROOM),
            Point3::new(-ROOM, WALL_HEIGHT, ROOM),
        ],
        None,
        &walls,
    );

    let tower = Placement::new([3.0, 6.0, 3.0], [0.0; 3], [-5.0, 3.0, -5.0])?;
    add_block(&mut mesh, &tower, red);
    let slab = Placement::new([4.0, 2.5, 4.0], [0.0, 35.0, 0.0], [3.0, 1.25, -1.0])?;
    add_block(&mut mesh, &slab, blue);
    add_ball(
        &mut mesh,
        Point3::new(-1.0, 2.0, 3.0),
        2.0,
        12,
        24,
        &FaceAttributes {
            material: Some(ball),
            smoothing_group: 1,
        },
    );

    mesh.interpolate_normals();
    log::info!("demo mesh: {} vertices, {} triangles", mesh.vertices().len(), mesh.len());
    Ok(mesh)
}

pub fn demo_light() -> LightSource {
    LightSource::area(Point3::new(3.0, 20.0, 8.0), 4.0, 4.0, 3)
}

pub fn demo_camera(settings: &RenderSettings) -> Camera {
    Camera::look_at(
        Point3::new(4.0, 9.0, 26.0),
        Point3::new(-1.0, 3.0, 0.0),
        Vector3::y(),
        settings.fov_degrees,
    )
}

/// The demo mesh turned a little about the vertical axis.
pub fn demo_scene(settings: &RenderSettings) -> kd_raytracer::Result<Scene> {
    let placement = Placement::new([1.0; 3], [0.0, -20.0, 0.0], [0.0; 3])?;
    Scene::with_options(demo_mesh()?, placement, demo_light(), settings.build_options())
}

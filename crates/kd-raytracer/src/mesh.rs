//! Triangle meshes backed by a shared vertex arena.
//!
//! Triangles refer to vertices by [`VertexId`]. Adjacent triangles that
//! share a source vertex share the arena entry, so a normal written once
//! (for example by [`Mesh::interpolate_normals`]) is seen by all of them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use nalgebra::{Point3, Unit, Vector3};

use crate::{BOUNDS_PADDING, Bounds, Material, Placement};

/// Index of a vertex in a [`Mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(usize);

impl VertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a triangle in a [`Mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleId(usize);

impl TriangleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A texture coordinate pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TexCoord {
    pub u: f64,
    pub v: f64,
}

impl TexCoord {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Weighted sum of three coordinates.
    pub fn blend(coords: &[TexCoord; 3], weights: [f64; 3]) -> Self {
        coords
            .iter()
            .zip(weights)
            .fold(Self::default(), |acc, (c, w)| Self {
                u: acc.u + c.u * w,
                v: acc.v + c.v * w,
            })
    }
}

/// A vertex record in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Option<Unit<Vector3<f64>>>,
}

/// Per-face attributes shared by triangles added together.
#[derive(Debug, Clone, Default)]
pub struct FaceAttributes {
    /// Material to bind; the mesh default when `None`.
    pub material: Option<Arc<Material>>,
    pub smoothing_group: u32,
}

/// A triangle referencing three arena vertices.
///
/// Normal, area and centroid are derived from the vertex positions when
/// the triangle is created and must be refreshed with [`Triangle::refresh`]
/// if the vertices move.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [VertexId; 3],
    uvs: Option<[TexCoord; 3]>,
    material: Arc<Material>,
    smoothing_group: u32,
    normal: Option<Unit<Vector3<f64>>>,
    area: f64,
    centroid: Point3<f64>,
}

impl Triangle {
    fn new(
        vertices: [VertexId; 3],
        uvs: Option<[TexCoord; 3]>,
        material: Arc<Material>,
        smoothing_group: u32,
        arena: &[Vertex],
    ) -> Self {
        let mut triangle = Self {
            vertices,
            uvs,
            material,
            smoothing_group,
            normal: None,
            area: 0.0,
            centroid: Point3::origin(),
        };
        triangle.refresh(arena);
        triangle
    }

    /// Recomputes normal, area and centroid from the current positions.
    pub fn refresh(&mut self, arena: &[Vertex]) {
        let [a, b, c] = self.vertices.map(|id| arena[id.index()].position);
        let cross = (b - a).cross(&(c - a));
        self.area = cross.norm() / 2.0;
        self.normal = Unit::try_new(cross, 0.0);
        self.centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
    }

    #[inline]
    pub fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    #[inline]
    pub fn uvs(&self) -> Option<&[TexCoord; 3]> {
        self.uvs.as_ref()
    }

    #[inline]
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    #[inline]
    pub fn smoothing_group(&self) -> u32 {
        self.smoothing_group
    }

    /// Unit geometric normal following the winding `(b - a) x (c - a)`.
    ///
    /// `None` for a degenerate (zero-area) triangle.
    #[inline]
    pub fn normal(&self) -> Option<Unit<Vector3<f64>>> {
        self.normal
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Mean of the three vertex positions. Only used to order triangles
    /// when choosing split positions.
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        self.centroid
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.normal.is_none()
    }
}

/// A triangle soup with a shared vertex arena.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
    default_material: Arc<Material>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_material(Arc::new(Material::default()))
    }

    /// Creates an empty mesh whose faces default to `material`.
    pub fn with_material(material: Arc<Material>) -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            default_material: material,
        }
    }

    /// Builds a mesh from independent triangles (no shared vertices).
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = [Point3<f64>; 3]>,
    {
        let mut mesh = Self::new();
        for [a, b, c] in triangles {
            mesh.push_triangle(a, b, c);
        }
        mesh
    }

    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        self.vertices.push(Vertex {
            position,
            normal: None,
        });
        VertexId(self.vertices.len() - 1)
    }

    pub fn add_vertex_with_normal(
        &mut self,
        position: Point3<f64>,
        normal: Vector3<f64>,
    ) -> VertexId {
        self.vertices.push(Vertex {
            position,
            normal: Unit::try_new(normal, 0.0),
        });
        VertexId(self.vertices.len() - 1)
    }

    /// Adds a triangle over existing vertices.
    ///
    /// # Panics
    /// Panics if a vertex id does not belong to this mesh.
    pub fn add_triangle(
        &mut self,
        vertices: [VertexId; 3],
        uvs: Option<[TexCoord; 3]>,
        attributes: &FaceAttributes,
    ) -> TriangleId {
        let material = attributes
            .material
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.default_material));
        let triangle = Triangle::new(
            vertices,
            uvs,
            material,
            attributes.smoothing_group,
            &self.vertices,
        );
        self.triangles.push(triangle);
        TriangleId(self.triangles.len() - 1)
    }

    /// Adds a planar quad `a, b, c, d` as the triangles `(a, b, c)` and
    /// `(a, c, d)`.
    pub fn add_quad(
        &mut self,
        vertices: [VertexId; 4],
        uvs: Option<[TexCoord; 4]>,
        attributes: &FaceAttributes,
    ) -> [TriangleId; 2] {
        let [a, b, c, d] = vertices;
        let first = self.add_triangle([a, b, c], uvs.map(|t| [t[0], t[1], t[2]]), attributes);
        let second = self.add_triangle([a, c, d], uvs.map(|t| [t[0], t[2], t[3]]), attributes);
        [first, second]
    }

    /// Adds three fresh vertices and a triangle over them.
    pub fn push_triangle(
        &mut self,
        a: Point3<f64>,
        b: Point3<f64>,
        c: Point3<f64>,
    ) -> TriangleId {
        let ids = [a, b, c].map(|p| self.add_vertex(p));
        self.add_triangle(ids, None, &FaceAttributes::default())
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn triangle(&self, id: TriangleId) -> &Triangle {
        &self.triangles[id.index()]
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Ids of every triangle, in insertion order.
    pub fn triangle_ids(&self) -> impl Iterator<Item = TriangleId> + use<> {
        (0..self.triangles.len()).map(TriangleId)
    }

    /// Vertex positions of a triangle.
    #[inline]
    pub fn positions(&self, id: TriangleId) -> [Point3<f64>; 3] {
        self.triangle(id)
            .vertices
            .map(|v| self.vertices[v.index()].position)
    }

    /// Vertex normals of a triangle, if all three vertices carry one.
    pub fn vertex_normals(&self, id: TriangleId) -> Option<[Unit<Vector3<f64>>; 3]> {
        let [a, b, c] = self.triangle(id).vertices;
        Some([
            self.vertex(a).normal?,
            self.vertex(b).normal?,
            self.vertex(c).normal?,
        ])
    }

    /// Number of triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounds of every triangle vertex, padded by [`BOUNDS_PADDING`].
    ///
    /// Returns `None` for a mesh without triangles.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(
            self.triangle_ids()
                .flat_map(|id| self.positions(id)),
        )
        .map(|b| b.padded(BOUNDS_PADDING))
    }

    /// Binds `material` to every triangle.
    pub fn set_material(&mut self, material: Arc<Material>) {
        for triangle in &mut self.triangles {
            triangle.material = Arc::clone(&material);
        }
        self.default_material = material;
    }

    /// Smooths shading normals within each smoothing group.
    ///
    /// Every vertex used by a group gets the normalized mean of the
    /// geometric normals of that group's triangles around it. A vertex
    /// shared by several groups keeps the value from the highest group.
    /// Degenerate triangles do not contribute.
    pub fn interpolate_normals(&mut self) {
        let mut groups: BTreeMap<u32, HashMap<VertexId, Vector3<f64>>> = BTreeMap::new();

        for triangle in &self.triangles {
            let Some(normal) = triangle.normal else {
                continue;
            };
            let sums = groups.entry(triangle.smoothing_group).or_default();
            for id in triangle.vertices {
                *sums.entry(id).or_insert_with(Vector3::zeros) += normal.into_inner();
            }
        }

        let mut updated = 0;
        for sums in groups.values() {
            for (id, sum) in sums {
                self.vertices[id.index()].normal = Unit::try_new(*sum, f64::EPSILON);
                updated += 1;
            }
        }
        log::debug!(
            "interpolated normals for {updated} vertices in {} smoothing groups",
            groups.len()
        );
    }

    /// Moves every vertex by `placement` and refreshes triangle data.
    pub fn transform_vertices(&mut self, placement: &Placement) {
        for vertex in &mut self.vertices {
            vertex.position = placement.transform_point(&vertex.position);
            vertex.normal = vertex.normal.map(|n| placement.transform_normal(&n));
        }
        for triangle in &mut self.triangles {
            triangle.refresh(&self.vertices);
        }
    }
}

//! Ray intersection tests against boxes, split planes and triangles.

use nalgebra::{Matrix3, Point3, Unit};

use crate::{
    Axis, Bounds, LightSource, Mesh, Ray, ShadePoint, SplitPlane, SurfaceHit, TexCoord,
    TriangleId,
};

/// Directions with a component smaller than this are parallel to the
/// corresponding axis planes.
pub const PARALLEL_EPSILON: f64 = 1e-12;

/// Tolerance for face containment and for merging coincident box hits.
pub const BOX_EPSILON: f64 = 1e-9;

/// Slack on barycentric limits so rays through a shared edge hit at least
/// one of the two triangles.
pub const BARYCENTRIC_EPSILON: f64 = 1e-9;

/// Where a ray's line passes through a box.
///
/// `entry` is the crossing with the smaller ray parameter. When the ray
/// starts inside the box `t_entry` is negative and `entry` lies behind the
/// origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCrossing {
    pub entry: Point3<f64>,
    pub exit: Point3<f64>,
    pub t_entry: f64,
    pub t_exit: f64,
}

/// Intersects the ray with the six faces of `bounds`.
///
/// Each face is treated as an axis-aligned plane; a crossing only counts if
/// it lies within the face's extent on the other two axes. Crossings closer
/// than [`BOX_EPSILON`] are merged, so edge and corner hits that touch
/// several faces count once. Fewer than two distinct crossings, or a box
/// entirely behind the origin, is a miss.
pub fn ray_bounds(ray: &Ray, bounds: &Bounds) -> Option<BoxCrossing> {
    let origin = ray.origin();
    let dir = ray.direction();

    let mut hits = [0.0f64; 6];
    let mut count = 0;

    for axis in Axis::ALL {
        let i = axis.index();
        if dir[i].abs() < PARALLEL_EPSILON {
            continue;
        }
        let [a, b] = axis.others();
        for face in [bounds.lo(axis), bounds.hi(axis)] {
            let t = (face - origin[i]) / dir[i];
            let p = ray.at(t);
            if !within(p[a.index()], bounds.lo(a), bounds.hi(a))
                || !within(p[b.index()], bounds.lo(b), bounds.hi(b))
            {
                continue;
            }
            let seen = hits[..count]
                .iter()
                .any(|h| (h - t).abs() <= BOX_EPSILON * (1.0 + t.abs()));
            if !seen {
                hits[count] = t;
                count += 1;
            }
        }
    }

    if count < 2 {
        return None;
    }

    let hits = &hits[..count];
    let t_entry = hits.iter().copied().fold(f64::INFINITY, f64::min);
    let t_exit = hits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if t_exit < 0.0 {
        return None;
    }

    Some(BoxCrossing {
        entry: ray.at(t_entry),
        exit: ray.at(t_exit),
        t_entry,
        t_exit,
    })
}

fn within(x: f64, lo: f64, hi: f64) -> bool {
    let eps = BOX_EPSILON * (1.0 + lo.abs().max(hi.abs()));
    x >= lo - eps && x <= hi + eps
}

/// Intersects the ray's line with the (unbounded) plane of `plane`.
///
/// Solves `A*x + B*y + C*z + D = 0` for the ray parameter. Returns `None`
/// when the ray is parallel to the plane.
pub fn ray_plane(ray: &Ray, plane: &SplitPlane) -> Option<Point3<f64>> {
    let n = plane.normal();
    let denom = n.dot(&ray.direction());
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let d = -n.dot(&plane.anchor().coords);
    let t = -(n.dot(&ray.origin().coords) + d) / denom;
    Some(ray.at(t))
}

/// Ray parameter and barycentric coordinates of a ray/triangle hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f64,
    pub b1: f64,
    pub b2: f64,
}

impl TriangleHit {
    /// Vertex weights `(1 - b1 - b2, b1, b2)`.
    #[inline]
    pub fn weights(&self) -> [f64; 3] {
        [1.0 - self.b1 - self.b2, self.b1, self.b2]
    }
}

/// Finds where the ray crosses a triangle, without shading.
///
/// Solves `b1*(p0 - p1) + b2*(p0 - p2) + t*d = p0 - o` in one 3x3 system.
/// Degenerate triangles and rays parallel to the triangle make the system
/// singular and report no hit. Only hits in front of the origin (`t > 0`)
/// count.
pub fn ray_triangle(ray: &Ray, mesh: &Mesh, id: TriangleId) -> Option<TriangleHit> {
    let [p0, p1, p2] = mesh.positions(id);
    let e1 = p0 - p1;
    let e2 = p0 - p2;
    let d = ray.direction();

    let m = Matrix3::from_columns(&[e1, e2, d]);
    let scale = e1.norm() * e2.norm() * d.norm();
    if scale == 0.0 || m.determinant().abs() <= f64::EPSILON * scale {
        return None;
    }

    let x = m.try_inverse()? * (p0 - ray.origin());
    let (b1, b2, t) = (x[0], x[1], x[2]);

    let eps = BARYCENTRIC_EPSILON;
    if b1 < -eps || b1 > 1.0 + eps || b2 < -eps || b1 + b2 > 1.0 + eps || t <= 0.0 {
        return None;
    }

    Some(TriangleHit { t, b1, b2 })
}

/// Finds and shades the ray's hit on a triangle.
///
/// Equivalent to [`ray_triangle`] followed by [`shade_triangle`].
pub fn intersect_triangle(
    ray: &Ray,
    mesh: &Mesh,
    id: TriangleId,
    light: &LightSource,
) -> Option<SurfaceHit> {
    let hit = ray_triangle(ray, mesh, id)?;
    shade_triangle(ray, mesh, id, &hit, light)
}

/// Turns a ray/triangle hit into a shaded [`SurfaceHit`].
///
/// The shading normal interpolates the vertex normals when all three are
/// present, otherwise it is the flat geometric normal. Texture coordinates
/// are interpolated the same way. The color is evaluated from the
/// triangle's material with the ray origin as the eye. Returns `None` for a
/// triangle without a geometric normal.
pub fn shade_triangle(
    ray: &Ray,
    mesh: &Mesh,
    id: TriangleId,
    hit: &TriangleHit,
    light: &LightSource,
) -> Option<SurfaceHit> {
    let triangle = mesh.triangle(id);
    let geometric = triangle.normal()?;
    let weights = hit.weights();

    let normal = mesh
        .vertex_normals(id)
        .and_then(|ns| {
            let blended = ns
                .iter()
                .zip(weights)
                .fold(nalgebra::Vector3::zeros(), |acc, (n, w)| {
                    acc + n.into_inner() * w
                });
            Unit::try_new(blended, f64::EPSILON)
        })
        .unwrap_or(geometric);
    let uv = triangle.uvs().map(|uvs| TexCoord::blend(uvs, weights));
    let position = ray.at(hit.t);

    let color = triangle.material().shade(
        &ShadePoint {
            position,
            normal,
            uv,
        },
        ray.origin(),
        light,
    );

    Some(SurfaceHit {
        position,
        normal,
        uv,
        color,
        distance: hit.t,
        triangle: id,
    })
}

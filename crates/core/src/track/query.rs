//! Tagged ray queries against track geometry.
//!
//! The collision mesh is a flat list of surface-tagged triangles built by
//! the generator. Queries sweep a ray against every triangle that passes
//! the surface mask and keep the nearest hit. Track sizes keep this linear
//! scan comfortably cheap for the handful of rays a kart casts per tick.

use bincode::{Decode, Encode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Cross-track surface bands, outward from the drivable road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum SurfaceTag {
    Road,
    Apron,
    Flat,
    Wall,
}

impl SurfaceTag {
    /// Whether a kart can stand on this surface.
    pub fn is_ground(self) -> bool {
        !matches!(self, Self::Wall)
    }

    fn bit(self) -> u8 {
        match self {
            Self::Road => 1 << 0,
            Self::Apron => 1 << 1,
            Self::Flat => 1 << 2,
            Self::Wall => 1 << 3,
        }
    }
}

/// Bitmask over surface tags for filtering ray queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceMask(pub u8);

impl SurfaceMask {
    pub const ROAD: SurfaceMask = SurfaceMask(1 << 0);
    pub const APRON: SurfaceMask = SurfaceMask(1 << 1);
    pub const FLAT: SurfaceMask = SurfaceMask(1 << 2);
    pub const WALL: SurfaceMask = SurfaceMask(1 << 3);

    /// Every surface a kart can drive on.
    pub const GROUND: SurfaceMask = SurfaceMask(Self::ROAD.0 | Self::APRON.0 | Self::FLAT.0);
    pub const ALL: SurfaceMask = SurfaceMask(Self::GROUND.0 | Self::WALL.0);

    #[inline]
    pub fn contains(self, tag: SurfaceTag) -> bool {
        self.0 & tag.bit() != 0
    }
}

/// One tagged triangle of the collision mesh. Vertex normals carry the
/// cross-section frame so hit normals stay smooth along a strip.
#[derive(Debug, Clone)]
pub struct SurfaceTriangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub na: Vec3,
    pub nb: Vec3,
    pub nc: Vec3,
    pub tag: SurfaceTag,
}

/// Result of a ray query.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    /// Surface normal interpolated at the hit point, oriented against the ray.
    pub normal: Vec3,
    pub tag: SurfaceTag,
}

/// The track's collision mesh.
#[derive(Debug, Clone, Default)]
pub struct TrackMesh {
    triangles: Vec<SurfaceTriangle>,
}

impl TrackMesh {
    pub fn push(&mut self, triangle: SurfaceTriangle) {
        self.triangles.push(triangle);
    }

    /// Adds one quad of a strip as two triangles. Vertices wind
    /// `a → b` along the cross-section at the current track point and
    /// `d → c` at the next; `n0`/`n1` are the band normals at the two points.
    #[allow(clippy::too_many_arguments)]
    pub fn push_quad(
        &mut self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        d: Vec3,
        n0: Vec3,
        n1: Vec3,
        tag: SurfaceTag,
    ) {
        self.push(SurfaceTriangle {
            a,
            b,
            c,
            na: n0,
            nb: n0,
            nc: n1,
            tag,
        });
        self.push(SurfaceTriangle {
            a,
            b: c,
            c: d,
            na: n0,
            nb: n1,
            nc: n1,
            tag,
        });
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[SurfaceTriangle] {
        &self.triangles
    }

    /// Nearest hit of a ray against all triangles passing `mask`.
    /// `direction` must be normalized.
    pub fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for tri in &self.triangles {
            if !mask.contains(tri.tag) {
                continue;
            }
            let Some((t, v, w)) = intersect(tri, origin, direction) else {
                continue;
            };
            if t > max_distance {
                continue;
            }
            if best.as_ref().is_some_and(|h| h.distance <= t) {
                continue;
            }
            // Weights are (1 - v - w, v, w) with v on b and w on c.
            let u = 1.0 - v - w;
            let mut normal = (tri.na * u + tri.nb * v + tri.nc * w).normalize();
            if normal.dot(direction) > 0.0 {
                normal = -normal;
            }
            best = Some(RayHit {
                point: origin + direction * t,
                distance: t,
                normal,
                tag: tri.tag,
            });
        }
        best
    }
}

/// Möller–Trumbore ray/triangle intersection.
/// Returns `(t, v, w)` — distance along the ray and the barycentric
/// weights of vertices `b` and `c`.
fn intersect(tri: &SurfaceTriangle, origin: Vec3, direction: Vec3) -> Option<(f32, f32, f32)> {
    const DET_EPSILON: f32 = 1e-8;
    // Slightly inclusive bounds so a ray on a shared edge cannot slip
    // between the two triangles that own it.
    const BARY_EPSILON: f32 = 1e-6;

    let e1 = tri.b - tri.a;
    let e2 = tri.c - tri.a;
    let p = direction.cross(e2);
    let det = e1.dot(p);
    if det.abs() < DET_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - tri.a;
    let v = s.dot(p) * inv_det;
    if v < -BARY_EPSILON || v > 1.0 + BARY_EPSILON {
        return None;
    }
    let q = s.cross(e1);
    let w = direction.dot(q) * inv_det;
    if w < -BARY_EPSILON || v + w > 1.0 + BARY_EPSILON {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    if t < 0.0 {
        return None;
    }
    Some((t, v, w))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_mesh(tag: SurfaceTag) -> TrackMesh {
        let mut mesh = TrackMesh::default();
        mesh.push_quad(
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(-10.0, 0.0, 10.0),
            Vec3::Y,
            Vec3::Y,
            tag,
        );
        mesh
    }

    #[test]
    fn downward_ray_hits_floor() {
        let mesh = floor_mesh(SurfaceTag::Road);
        let hit = mesh
            .cast_ray(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 10.0, SurfaceMask::GROUND)
            .expect("should hit");
        assert!((hit.distance - 5.0).abs() < 1e-4);
        assert!((hit.point - Vec3::ZERO).length() < 1e-4);
        assert!((hit.normal - Vec3::Y).length() < 1e-4);
        assert_eq!(hit.tag, SurfaceTag::Road);
    }

    #[test]
    fn mask_filters_tags() {
        let mesh = floor_mesh(SurfaceTag::Wall);
        assert!(mesh
            .cast_ray(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 10.0, SurfaceMask::GROUND)
            .is_none());
        assert!(mesh
            .cast_ray(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 10.0, SurfaceMask::WALL)
            .is_some());
    }

    #[test]
    fn respects_max_distance() {
        let mesh = floor_mesh(SurfaceTag::Road);
        assert!(mesh
            .cast_ray(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 3.0, SurfaceMask::ALL)
            .is_none());
    }

    #[test]
    fn normal_opposes_ray() {
        let mesh = floor_mesh(SurfaceTag::Road);
        // Cast up from below; the interpolated normal must flip to face the ray.
        let hit = mesh
            .cast_ray(Vec3::new(0.0, -5.0, 0.0), Vec3::Y, 10.0, SurfaceMask::ALL)
            .expect("should hit");
        assert!(hit.normal.dot(Vec3::Y) < 0.0);
    }

    #[test]
    fn interpolates_vertex_normals() {
        let mut mesh = TrackMesh::default();
        let tilt = Vec3::new(0.5, 1.0, 0.0).normalize();
        mesh.push(SurfaceTriangle {
            a: Vec3::new(-1.0, 0.0, -1.0),
            b: Vec3::new(1.0, 0.0, -1.0),
            c: Vec3::new(0.0, 0.0, 1.0),
            na: Vec3::Y,
            nb: tilt,
            nc: Vec3::Y,
            tag: SurfaceTag::Road,
        });
        // A hit near vertex b should lean toward b's normal.
        let hit = mesh
            .cast_ray(Vec3::new(0.8, 1.0, -0.9), -Vec3::Y, 5.0, SurfaceMask::ALL)
            .expect("should hit");
        assert!(hit.normal.x > 0.1);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn nearest_hit_wins() {
        let mut mesh = floor_mesh(SurfaceTag::Road);
        // A second floor higher up; the ray from above must report it first.
        mesh.push_quad(
            Vec3::new(-10.0, 2.0, -10.0),
            Vec3::new(10.0, 2.0, -10.0),
            Vec3::new(10.0, 2.0, 10.0),
            Vec3::new(-10.0, 2.0, 10.0),
            Vec3::Y,
            Vec3::Y,
            SurfaceTag::Flat,
        );
        let hit = mesh
            .cast_ray(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 10.0, SurfaceMask::GROUND)
            .expect("should hit");
        assert_eq!(hit.tag, SurfaceTag::Flat);
        assert!((hit.distance - 3.0).abs() < 1e-4);
    }
}

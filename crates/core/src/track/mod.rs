//! Procedural race track: generation, geometry, and tagged spatial queries.
//!
//! A `Track` is built once per race from the room's variance seed and is
//! immutable afterwards except for hazard visibility. It owns no scene
//! objects — rendering layers read the point and tree lists and build
//! their own representation; the simulation uses only the ray queries
//! and the hazard arena. Dropping the track releases everything, so a
//! new race simply generates a fresh one from the next seed.

mod generator;
mod hazards;
mod query;
mod spline;

pub use generator::{generate, TrackConfig};
pub use hazards::{Hazard, HazardArena, HazardId, HazardType};
pub use query::{RayHit, SurfaceMask, SurfaceTag, SurfaceTriangle, TrackMesh};
pub use spline::catmull_rom_closed;

use glam::Vec3;

/// One sampled position of the track centerline with its frame and the
/// ten cross-section boundary vertices. The sequence is a closed loop:
/// the first point logically follows the last, and consumers wrap
/// indices modulo the length.
#[derive(Debug, Clone)]
pub struct TrackPoint {
    pub point: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,

    /// Drivable road boundary.
    pub left_edge: Vec3,
    pub right_edge: Vec3,
    /// Outer end of the banked shoulder.
    pub left_apron: Vec3,
    pub right_apron: Vec3,
    /// Outer end of the level runout.
    pub left_flat: Vec3,
    pub right_flat: Vec3,
    /// Boundary wall top, inner and outer faces.
    pub left_wall_inside: Vec3,
    pub right_wall_inside: Vec3,
    pub left_wall_outside: Vec3,
    pub right_wall_outside: Vec3,
}

/// A generated race track.
#[derive(Debug, Clone)]
pub struct Track {
    pub points: Vec<TrackPoint>,
    pub mesh: TrackMesh,
    pub hazards: HazardArena,
    /// Decoration positions outside the flats.
    pub trees: Vec<Vec3>,
    /// Race start pose.
    pub start_point: Vec3,
    pub start_target: Vec3,
    /// Length of the goal band at the head of the loop (visual only;
    /// the band is regular road to the physics).
    pub goal_points: usize,
    /// Lowest cross-section height, used for the fall-out altitude.
    pub lowest_point: f32,
}

impl Track {
    /// Generates a track from the config. See [`TrackConfig`].
    pub fn generate(config: &TrackConfig) -> Track {
        generator::generate(config)
    }

    /// Wraps a possibly-negative index onto the point loop.
    pub fn wrap_index(&self, index: isize) -> usize {
        let len = self.points.len() as isize;
        (((index % len) + len) % len) as usize
    }

    /// Whether a point index lies in the goal band.
    pub fn is_goal(&self, index: usize) -> bool {
        index < self.goal_points
    }

    /// Centerline positions, used as checkpoint markers.
    pub fn checkpoints(&self) -> Vec<Vec3> {
        self.points.iter().map(|p| p.point).collect()
    }

    /// Casts a ray downward along `-up` from `origin` against drivable
    /// surfaces.
    pub fn cast_down(&self, origin: Vec3, up: Vec3, max_distance: f32) -> Option<RayHit> {
        self.mesh
            .cast_ray(origin, -up.normalize(), max_distance, SurfaceMask::GROUND)
    }

    /// Casts a ray against surfaces passing `mask`. `direction` must be
    /// normalized.
    pub fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Option<RayHit> {
        self.mesh.cast_ray(origin, direction, max_distance, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_index_handles_negatives() {
        let track = Track::generate(&TrackConfig::default());
        let len = track.points.len();
        assert_eq!(track.wrap_index(0), 0);
        assert_eq!(track.wrap_index(-1), len - 1);
        assert_eq!(track.wrap_index(len as isize), 0);
        assert_eq!(track.wrap_index(len as isize * 2 + 3), 3);
    }

    #[test]
    fn cast_down_from_above_start_hits_road() {
        let track = Track::generate(&TrackConfig::default());
        // Slightly into the first segment, clear of any quad seam.
        let above = track.start_point.lerp(track.start_target, 0.1) + Vec3::Y * 2.0;
        let hit = track
            .cast_down(above, Vec3::Y, 10.0)
            .expect("start point should have road underneath");
        assert_eq!(hit.tag, SurfaceTag::Road);
        assert!(hit.normal.y > 0.5, "ground normal should point mostly up");
        assert!((hit.point - track.start_point).length() < 4.0);
    }

    #[test]
    fn outward_ray_from_center_hits_wall() {
        let track = Track::generate(&TrackConfig::default());
        let p = &track.points[20];
        let q = &track.points[21];
        // Aim across the track at the middle of one right-wall face quad.
        let origin = p.point + Vec3::Y * 1.0;
        let target = (p.right_flat + p.right_wall_inside + q.right_flat + q.right_wall_inside) * 0.25;
        let toward_wall = (target - origin).normalize();
        let hit = track
            .cast_ray(origin, toward_wall, 100.0, SurfaceMask::WALL)
            .expect("boundary wall should stop the ray");
        assert_eq!(hit.tag, SurfaceTag::Wall);
    }

    #[test]
    fn start_pose_follows_first_points() {
        let track = Track::generate(&TrackConfig::default());
        assert_eq!(track.start_point, track.points[0].point);
        assert_eq!(track.start_target, track.points[1].point);
        assert!(track.is_goal(0));
        assert!(!track.is_goal(track.goal_points));
    }
}

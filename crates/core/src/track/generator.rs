//! Seeded track generation.
//!
//! Everything here is a pure function of the config: the shared seed is
//! the only thing a room server sends, and every client regenerates an
//! identical track from it. Draw order from the seeded sequence is part
//! of the contract — reordering draws changes every track in the wild.

use glam::Vec3;

use crate::random::SeededRandom;

use super::hazards::{HazardArena, HazardType};
use super::query::{SurfaceTag, TrackMesh};
use super::spline;
use super::{Track, TrackPoint};

/// Bank angle of the apron strips.
const APRON_ANGLE: f32 = 15.0 * std::f32::consts::PI / 180.0;
/// Fraction of the track width taken by each apron.
const APRON_LENGTH_RATIO: f32 = 0.15;
/// Fraction of the track width from centerline to a road edge.
const EDGE_RATIO: f32 = 0.5 - APRON_LENGTH_RATIO;
/// Fraction of the track width taken by each flat runout.
const FLAT_RATIO: f32 = 0.30;
/// Horizontal thickness of the boundary walls.
const WALL_THICKNESS: f32 = 1.0;
/// World-up weight folded into the curvature-based up estimate.
const UP_BIAS: f32 = 10.0;
/// Fraction of track points forming the goal band.
const GOAL_RATIO: f32 = 0.015;
/// Track points at the start of the loop that never receive hazards.
pub(crate) const HAZARD_EXCLUSION_POINTS: usize = 10;
/// Height of a hazard above the road surface.
const HAZARD_HEIGHT: f32 = 1.0;
/// Tree offset range outward from the flat boundary.
const TREE_MIN_OFFSET: f32 = 4.0;
const TREE_MAX_OFFSET: f32 = 24.0;
/// Minimum spacing between accepted decoration points.
const MIN_DECORATION_SPACING: f32 = 10.0;

/// Generation parameters for one race track.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TrackConfig {
    /// Variance seed shared by every client in the room.
    pub seed: u32,
    /// Control points on the base circle.
    pub num_points: usize,
    /// Base circle radius (world units).
    pub radius: f32,
    /// Maximum radial perturbation of a control point.
    pub lateral_variance: f32,
    /// Maximum vertical perturbation of a control point.
    pub height_variance: f32,
    /// Track width, road plus aprons (world units).
    pub width: f32,
    /// Boundary wall height.
    pub height: f32,
    /// Per-point probability of placing a tree.
    pub tree_density: f32,
    /// Per-point probability of placing a hazard.
    pub hazard_density: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            num_points: 16,
            radius: 200.0,
            lateral_variance: 50.0,
            height_variance: 20.0,
            width: 35.0,
            height: 5.0,
            tree_density: 0.2,
            hazard_density: 0.06,
        }
    }
}

/// Builds a complete track from the config. Pure: identical configs
/// produce bit-identical tracks.
pub fn generate(config: &TrackConfig) -> Track {
    let mut rng = SeededRandom::new(config.seed);

    let mut controls = control_points(config, &mut rng);
    if rng.next_bool(0.5) {
        controls.reverse();
    }

    let curvature_factor = ((config.radius + config.lateral_variance + config.height_variance)
        * 0.05)
        .ceil()
        .max(1.0) as usize;
    let centerline = spline::catmull_rom_closed(&controls, curvature_factor);

    let points = cross_sections(&centerline, curvature_factor, config);
    let mesh = build_mesh(&points);
    let (hazards, trees) = place_decorations(&points, config, &mut rng);

    let lowest_point = points
        .iter()
        .flat_map(|p| [p.point.y, p.left_flat.y, p.right_flat.y])
        .fold(f32::INFINITY, f32::min);

    let goal_points = ((points.len() as f32 * GOAL_RATIO).round() as usize).max(1);
    let start_point = points[0].point;
    let start_target = points[1 % points.len()].point;

    Track {
        points,
        mesh,
        hazards,
        trees,
        start_point,
        start_target,
        goal_points,
        lowest_point,
    }
}

/// Control points on a circle of `radius`, perturbed radially and
/// vertically by the seeded sequence.
fn control_points(config: &TrackConfig, rng: &mut SeededRandom) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(config.num_points);
    for index in 0..config.num_points {
        let angle = 2.0 * std::f32::consts::PI * index as f32 / config.num_points as f32;
        let radial = rng.next() * config.lateral_variance - config.lateral_variance / 2.0;
        let y = rng.next() * config.height_variance - config.height_variance / 2.0;
        let r = config.radius + radial;
        points.push(Vec3::new(r * angle.sin(), y, r * angle.cos()));
    }
    points
}

/// Derives the frame and the ten cross-section vertices for every sample.
fn cross_sections(
    centerline: &[Vec3],
    curvature_factor: usize,
    config: &TrackConfig,
) -> Vec<TrackPoint> {
    let len = centerline.len();
    let at = |index: isize| -> Vec3 {
        let len = len as isize;
        centerline[(((index % len) + len) % len) as usize]
    };

    let apron_cos = APRON_ANGLE.cos();
    let apron_sin = APRON_ANGLE.sin();

    let mut points = Vec::with_capacity(len);
    for i in 0..len as isize {
        let point = at(i);
        let forward = (at(i + 1) - at(i - 1)).normalize();

        // Up estimate: the local curvature vector (how far this sample sits
        // below the average of its lookahead neighbors) pulled toward
        // world-up so the banking never inverts.
        let lookahead = curvature_factor as isize;
        let curvature = (at(i - lookahead) + at(i + lookahead)) * 0.5 - point;
        let up = (curvature + Vec3::Y * (curvature_factor as f32 * UP_BIAS)).normalize();
        let right = up.cross(forward).normalize();

        // Shoulders stay level: flats and walls extend along the right
        // vector of a world-up frame, not the banked one.
        let mut level_right = Vec3::Y.cross(forward);
        level_right = if level_right.length_squared() > 1e-8 {
            level_right.normalize()
        } else {
            right
        };

        let edge_off = right * (config.width * EDGE_RATIO);
        let apron_out = right * (config.width * APRON_LENGTH_RATIO * apron_cos);
        let apron_up = up * (config.width * APRON_LENGTH_RATIO * apron_sin);
        let flat_off = level_right * (config.width * FLAT_RATIO);
        let wall_up = Vec3::Y * config.height;

        let left_edge = point - edge_off;
        let right_edge = point + edge_off;
        let left_apron = point - edge_off - apron_out + apron_up;
        let right_apron = point + edge_off + apron_out + apron_up;
        let left_flat = left_apron - flat_off;
        let right_flat = right_apron + flat_off;

        points.push(TrackPoint {
            point,
            forward,
            up,
            right,
            left_edge,
            right_edge,
            left_apron,
            right_apron,
            left_flat,
            right_flat,
            left_wall_inside: left_flat + wall_up,
            right_wall_inside: right_flat + wall_up,
            left_wall_outside: left_flat - level_right * WALL_THICKNESS + wall_up,
            right_wall_outside: right_flat + level_right * WALL_THICKNESS + wall_up,
        });
    }
    points
}

/// Builds the tagged collision strips between consecutive cross-sections.
fn build_mesh(points: &[TrackPoint]) -> TrackMesh {
    let apron_cos = APRON_ANGLE.cos();
    let apron_sin = APRON_ANGLE.sin();

    let mut mesh = TrackMesh::default();
    for i in 0..points.len() {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % points.len()];

        // Road bed.
        mesh.push_quad(
            p0.left_edge,
            p0.right_edge,
            p1.right_edge,
            p1.left_edge,
            p0.up,
            p1.up,
            SurfaceTag::Road,
        );

        // Banked aprons; normals tilt toward the centerline.
        let left_n0 = p0.up * apron_cos + p0.right * apron_sin;
        let left_n1 = p1.up * apron_cos + p1.right * apron_sin;
        mesh.push_quad(
            p0.left_apron,
            p0.left_edge,
            p1.left_edge,
            p1.left_apron,
            left_n0,
            left_n1,
            SurfaceTag::Apron,
        );
        let right_n0 = p0.up * apron_cos - p0.right * apron_sin;
        let right_n1 = p1.up * apron_cos - p1.right * apron_sin;
        mesh.push_quad(
            p0.right_edge,
            p0.right_apron,
            p1.right_apron,
            p1.right_edge,
            right_n0,
            right_n1,
            SurfaceTag::Apron,
        );

        // Level runouts.
        mesh.push_quad(
            p0.left_flat,
            p0.left_apron,
            p1.left_apron,
            p1.left_flat,
            Vec3::Y,
            Vec3::Y,
            SurfaceTag::Flat,
        );
        mesh.push_quad(
            p0.right_apron,
            p0.right_flat,
            p1.right_flat,
            p1.right_apron,
            Vec3::Y,
            Vec3::Y,
            SurfaceTag::Flat,
        );

        // Boundary walls: inner faces plus tops.
        let left_inward = (p0.left_apron - p0.left_flat).normalize();
        mesh.push_quad(
            p0.left_flat,
            p0.left_wall_inside,
            p1.left_wall_inside,
            p1.left_flat,
            left_inward,
            left_inward,
            SurfaceTag::Wall,
        );
        let right_inward = (p0.right_apron - p0.right_flat).normalize();
        mesh.push_quad(
            p0.right_flat,
            p0.right_wall_inside,
            p1.right_wall_inside,
            p1.right_flat,
            right_inward,
            right_inward,
            SurfaceTag::Wall,
        );
        mesh.push_quad(
            p0.left_wall_inside,
            p0.left_wall_outside,
            p1.left_wall_outside,
            p1.left_wall_inside,
            Vec3::Y,
            Vec3::Y,
            SurfaceTag::Wall,
        );
        mesh.push_quad(
            p0.right_wall_inside,
            p0.right_wall_outside,
            p1.right_wall_outside,
            p1.right_wall_inside,
            Vec3::Y,
            Vec3::Y,
            SurfaceTag::Wall,
        );
    }
    mesh
}

/// Places trees and hazards along the loop. Hazards skip the opening
/// points so nothing spawns on top of the starting grid, and a candidate
/// too close to an already accepted decoration is dropped.
fn place_decorations(
    points: &[TrackPoint],
    config: &TrackConfig,
    rng: &mut SeededRandom,
) -> (HazardArena, Vec<Vec3>) {
    let mut hazards = HazardArena::default();
    let mut trees = Vec::new();
    let mut accepted: Vec<Vec3> = Vec::new();

    fn far_enough(accepted: &[Vec3], candidate: Vec3) -> bool {
        accepted
            .iter()
            .all(|p| (*p - candidate).length() >= MIN_DECORATION_SPACING)
    }

    for (index, tp) in points.iter().enumerate() {
        if rng.next() < config.tree_density {
            let left = rng.next_bool(0.5);
            let offset = rng.next_range(TREE_MIN_OFFSET, TREE_MAX_OFFSET);
            let level_right = (tp.right_flat - tp.left_flat).normalize();
            let candidate = if left {
                tp.left_flat - level_right * offset
            } else {
                tp.right_flat + level_right * offset
            };
            if far_enough(&accepted, candidate) {
                accepted.push(candidate);
                trees.push(candidate);
            }
        }

        if index >= HAZARD_EXCLUSION_POINTS && rng.next() < config.hazard_density {
            let fraction = rng.next();
            let hazard_type = HazardType::from_roll(rng.next());
            let candidate =
                tp.left_edge.lerp(tp.right_edge, fraction) + tp.up * HAZARD_HEIGHT;
            if far_enough(&accepted, candidate) {
                accepted.push(candidate);
                hazards.insert(hazard_type, candidate);
            }
        }
    }

    (hazards, trees)
}

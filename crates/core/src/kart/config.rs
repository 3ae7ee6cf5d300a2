//! Kart tuning constants.
//!
//! All velocities are in world units per frame at the 60 fps baseline;
//! the simulator rescales by the actual delta time. Durations are in
//! milliseconds of simulation clock.

use serde::{Deserialize, Serialize};

use crate::track::SurfaceTag;

/// Tuning for one kart's physics and state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KartConfig {
    // ========================================================================
    // Integration
    // ========================================================================
    /// Ticks longer than this are dropped outright (stalled tab, debugger).
    pub max_delta_time: f32,

    /// Frame rate the per-frame constants were tuned at.
    pub frame_rate_baseline: f32,

    // ========================================================================
    // Speed model
    // ========================================================================
    /// Top speed at velocity factor 1 (units/frame).
    pub top_speed: f32,

    /// Below this speed the launch acceleration applies.
    pub baby_speed_threshold: f32,

    /// Acceleration off the line (units/frame²).
    pub accel_launch: f32,

    /// Acceleration in the normal band (units/frame²).
    pub accel_normal: f32,

    /// Easing gain per frame while over the target speed.
    pub decel_to_target: f32,

    /// Multiplicative velocity scale per frame at full brake.
    pub brake_scale: f32,

    /// Reverse acceleration along -forward (units/frame²).
    pub reverse_accel: f32,

    /// Velocity factor restored when no hazard state is active.
    pub velocity_factor_max: f32,

    /// Per-frame easing of the current factor toward a higher target.
    pub factor_ease_up: f32,

    /// Per-frame easing of the current factor toward a lower target.
    pub factor_ease_down: f32,

    // ========================================================================
    // Steering
    // ========================================================================
    /// Yaw rate at full lock (radians/frame).
    pub max_turn_rate: f32,

    /// Low-pass gain pulling the yaw rate toward the steering target.
    pub steering_filter: f32,

    /// Steering multiplier while drifting.
    pub drift_turn_multiplier: f32,

    /// Yaw rate decay per frame.
    pub relocity_decay: f32,

    // ========================================================================
    // Ground and air
    // ========================================================================
    /// Gravity pull per frame while airborne (units/frame²).
    pub gravity: f32,

    /// Length of the downward ground probe.
    pub ground_ray_length: f32,

    /// Resting height of the kart above the surface.
    pub ground_clearance: f32,

    /// Filter gain toward the surface normal while grounded.
    pub up_filter_grounded: f32,

    /// Filter gain toward world-up while airborne (much slower).
    pub up_filter_airborne: f32,

    /// Velocity decay per frame, by surface and in the air.
    pub decay_road: f32,
    pub decay_apron: f32,
    pub decay_flat: f32,
    pub decay_air: f32,

    /// Advance scale by surface: shoulders slow the kart down.
    pub speed_factor_road: f32,
    pub speed_factor_apron: f32,
    pub speed_factor_flat: f32,

    /// Airborne time before the kart is teleported back to safety.
    pub fall_timeout_ms: f64,

    /// Distance below the track's lowest point that counts as fallen out.
    pub death_drop: f32,

    // ========================================================================
    // Walls
    // ========================================================================
    /// Length of the four lateral wall probes.
    pub wall_ray_length: f32,

    /// Rebound scale on the wall-normal velocity component (> 1 bounces back).
    pub wall_rebound: f32,

    // ========================================================================
    // Hazards
    // ========================================================================
    /// Contact radius around a hazard.
    pub hazard_radius: f32,

    /// State durations after a hit.
    pub exploded_duration_ms: f64,
    pub fast_duration_ms: f64,
    pub slow_duration_ms: f64,

    /// Upward velocity added by a bomb.
    pub bomb_pop_velocity: f32,

    /// Velocity factors hard-set by hazard hits.
    pub bomb_velocity_factor: f32,
    pub boost_velocity_factor: f32,
    pub poison_velocity_factor: f32,

    /// Cosine of the half-angle of the bumper's head-on cone.
    pub bumper_cone_cos: f32,

    /// Minimum speed a bumper sends the kart away with.
    pub bumper_min_speed: f32,
}

impl Default for KartConfig {
    fn default() -> Self {
        Self {
            // Integration
            max_delta_time: 0.1,
            frame_rate_baseline: 60.0,

            // Speed model
            top_speed: 1.0,
            baby_speed_threshold: 0.1,
            accel_launch: 0.035,
            accel_normal: 0.012,
            decel_to_target: 0.05,
            brake_scale: 0.95,
            reverse_accel: 0.008,
            velocity_factor_max: 1.0,
            factor_ease_up: 0.02,
            factor_ease_down: 0.06,

            // Steering
            max_turn_rate: 0.045,
            steering_filter: 0.15,
            drift_turn_multiplier: 1.5,
            relocity_decay: 0.9,

            // Ground and air
            gravity: 0.018,
            ground_ray_length: 1.2,
            ground_clearance: 0.5,
            up_filter_grounded: 0.25,
            up_filter_airborne: 0.01,
            decay_road: 0.98,
            decay_apron: 0.95,
            decay_flat: 0.92,
            decay_air: 0.995,
            speed_factor_road: 1.0,
            speed_factor_apron: 0.7,
            speed_factor_flat: 0.5,
            fall_timeout_ms: 2000.0,
            death_drop: 20.0,

            // Walls
            wall_ray_length: 1.2,
            wall_rebound: 1.6,

            // Hazards
            hazard_radius: 2.5,
            exploded_duration_ms: 1500.0,
            fast_duration_ms: 700.0,
            slow_duration_ms: 3000.0,
            bomb_pop_velocity: 1.0,
            bomb_velocity_factor: 0.1,
            boost_velocity_factor: 2.0,
            poison_velocity_factor: 0.3,
            bumper_cone_cos: 0.5, // cos 60°
            bumper_min_speed: 0.4,
        }
    }
}

impl KartConfig {
    /// Velocity decay per frame on the given surface.
    pub fn surface_decay(&self, tag: SurfaceTag) -> f32 {
        match tag {
            SurfaceTag::Road => self.decay_road,
            SurfaceTag::Apron => self.decay_apron,
            SurfaceTag::Flat => self.decay_flat,
            SurfaceTag::Wall => self.decay_road,
        }
    }

    /// Position advance scale on the given surface.
    pub fn surface_speed_factor(&self, tag: SurfaceTag) -> f32 {
        match tag {
            SurfaceTag::Road => self.speed_factor_road,
            SurfaceTag::Apron => self.speed_factor_apron,
            SurfaceTag::Flat => self.speed_factor_flat,
            SurfaceTag::Wall => self.speed_factor_road,
        }
    }
}

//! Kart state: everything the simulation mutates per tick.
//!
//! Plain data, no scene objects. The rendering layer reads snapshots of
//! this struct; the network layer serializes the pose fields out of it.

use bincode::{Decode, Encode};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::track::HazardId;

/// Hazard-driven speed condition of a kart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum SpeedState {
    Ok,
    /// Poisoned: crawling until the timer runs out.
    Slow,
    /// Boosted: over-the-cap top speed until the timer runs out.
    Fast,
    /// Bombed: controls cut until the timer runs out.
    Exploded,
}

/// Complete mutable state of one kart.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct KartState {
    #[bincode(with_serde)]
    pub position: Vec3,
    #[bincode(with_serde)]
    pub rotation: Quat,
    #[bincode(with_serde)]
    pub velocity: Vec3,

    /// Smoothed yaw rate about the up axis (radians/frame).
    pub relocity: f32,

    /// Low-pass estimate of the ground normal under the kart.
    #[bincode(with_serde)]
    pub filtered_up: Vec3,

    /// Recovery anchor: last grounded pose.
    #[bincode(with_serde)]
    pub last_safe_position: Vec3,
    #[bincode(with_serde)]
    pub last_safe_up: Vec3,

    pub speed_state: SpeedState,
    /// Simulation clock of the hazard hit that set `speed_state`.
    pub hit_at_ms: f64,

    /// Target top-speed multiplier.
    pub velocity_factor: f32,
    /// Achieved multiplier, eased toward the target each tick.
    pub current_velocity_factor: f32,

    /// Progress cursor over the track's checkpoint loop.
    pub checkpoint_index: usize,

    /// Last consumed hazard, so one contact triggers once.
    pub last_hazard: Option<HazardId>,

    /// Simulation clock when the kart last left safe ground.
    pub unsafe_since_ms: Option<f64>,

    // Presentation-only outputs.
    pub wheels_rotation_speed_ratio: f32,
    pub steering_animation_frame: f32,
    pub exhaust_rate: f32,

    pub name: String,
}

impl KartState {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            velocity: Vec3::ZERO,
            relocity: 0.0,
            filtered_up: Vec3::Y,
            last_safe_position: position,
            last_safe_up: Vec3::Y,
            speed_state: SpeedState::Ok,
            hit_at_ms: 0.0,
            velocity_factor: 1.0,
            current_velocity_factor: 0.0,
            checkpoint_index: 0,
            last_hazard: None,
            unsafe_since_ms: None,
            wheels_rotation_speed_ratio: 0.0,
            steering_animation_frame: 0.0,
            exhaust_rate: 0.0,
            name: String::new(),
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

impl Default for KartState {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_accessors_match_rotation() {
        let state = KartState::default();
        assert!((state.forward() - Vec3::Z).length() < 1e-6);
        assert!((state.up() - Vec3::Y).length() < 1e-6);
        assert!((state.right() - Vec3::X).length() < 1e-6);

        let turned = KartState::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!((turned.forward() - Vec3::X).length() < 1e-5);
    }
}

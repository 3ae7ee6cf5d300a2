//! Kart control input contract.
//!
//! Produced once per tick by an input collaborator (keyboard, gamepad, AI)
//! and handed to the simulator. The simulation never reads devices itself.

use serde::{Deserialize, Serialize};

/// Normalized control state for one kart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    /// Steering axis: -1 full left, +1 full right.
    pub horizontal: f32,

    /// Throttle: 1 fully pressed; negative values reverse.
    pub accelerate: f32,

    /// Brake: 1 fully pressed.
    pub brake: f32,

    /// Handbrake/drift modifier.
    pub drift: bool,
}

impl ControlInput {
    /// Input with every axis released.
    pub const NEUTRAL: ControlInput = ControlInput {
        horizontal: 0.0,
        accelerate: 0.0,
        brake: 0.0,
        drift: false,
    };

    /// Full throttle, no steering.
    pub fn full_throttle() -> Self {
        Self {
            accelerate: 1.0,
            ..Self::NEUTRAL
        }
    }
}

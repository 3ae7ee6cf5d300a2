//! Local kart simulation: state, tuning, and the per-tick pipeline.

mod config;
mod simulator;
mod state;

pub use config::KartConfig;
pub use simulator::KartSimulator;
pub use state::{KartState, SpeedState};

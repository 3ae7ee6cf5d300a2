//! Slipstream core — deterministic kart-racing simulation.
//!
//! This crate holds the simulation half of the game: seeded procedural
//! track generation, the per-tick kart physics, smoothing of remote
//! karts' networked poses, and the race phase machine. Rendering, audio,
//! UI, and the transport are collaborators that consume read-only
//! snapshots of the state in here; nothing in this crate touches a scene
//! graph or a socket.
//!
//! # Determinism rules
//!
//! 1. No ambient randomness — all draws come from [`SeededRandom`],
//!    seeded by the room server.
//! 2. No system time — callers pass clocks in; the simulator accumulates
//!    its own from accepted ticks.
//! 3. `Vec` storage, never hash maps, so iteration order is identical on
//!    every client.
//! 4. State is owned exclusively: the local kart by its simulator, each
//!    remote kart by the smoother. Track geometry is immutable after
//!    generation apart from hazard visibility.

pub mod input;
pub mod kart;
pub mod race;
pub mod random;
pub mod remote;
pub mod track;

pub use input::ControlInput;
pub use kart::{KartConfig, KartSimulator, KartState, SpeedState};
pub use race::{GamePhase, RaceCoordinator};
pub use random::SeededRandom;
pub use remote::{RemoteSample, RemoteStateSmoother};
pub use track::{
    Hazard, HazardArena, HazardId, HazardType, RayHit, SurfaceMask, SurfaceTag, Track, TrackConfig,
};

//! Slipstream network protocol.
//!
//! Defines the messages exchanged with the room server and the JSON
//! codec that frames them. Transport, rooms, and matchmaking live on the
//! server; clients only need these types and `slipstream-core`.

pub mod codec;
pub mod messages;

pub use codec::*;
pub use messages::*;

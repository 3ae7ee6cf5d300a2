//! Wire message contract between clients and the room server.
//!
//! Field names on the wire are the server's short keys (`p`, `r`, `w`,
//! `s`, `b`, `d`, `pingMS`, …); the Rust structs carry full names and map
//! down via serde renames. The transport itself (rooms, sockets, relays)
//! is outside this crate — these types only define what crosses it.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Socket id assigned by the server on join.
pub type PlayerId = String;

/// A 3-vector as the server spells it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for WireVec3 {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<WireVec3> for Vec3 {
    fn from(v: WireVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// A unit quaternion as the server spells it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireQuat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl From<Quat> for WireQuat {
    fn from(q: Quat) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

impl From<WireQuat> for Quat {
    fn from(q: WireQuat) -> Self {
        Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

/// Pose sample published every `pingMS` and relayed to the other karts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KartPose {
    #[serde(rename = "p")]
    pub position: WireVec3,
    #[serde(rename = "r")]
    pub rotation: WireQuat,
    #[serde(rename = "w")]
    pub wheels_rotation_speed_ratio: f32,
    #[serde(rename = "s")]
    pub steering_animation_frame: f32,
    #[serde(rename = "b")]
    pub body_material_index: u32,
    #[serde(rename = "d")]
    pub driver_material_index: u32,
}

/// Request to enter a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_name: String,
    pub player_name: String,
    pub body_material_index: u32,
    pub driver_material_index: u32,
}

/// Server's answer to [`JoinRoom`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomComplete {
    pub id: PlayerId,
    /// Relay period in milliseconds; also the pose publication period.
    #[serde(rename = "pingMS")]
    pub ping_ms: u32,
    #[serde(rename = "raceId")]
    pub race_id: u32,
    /// Seed of the current race's track.
    #[serde(rename = "varianceSeed")]
    pub variance_seed: u32,
}

/// One kart's relayed state inside a server update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerUpdateEntry {
    pub id: PlayerId,
    pub name: String,
    #[serde(flatten)]
    pub pose: KartPose,
}

/// A finish-line claim; the server honors it only for the current race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceComplete {
    pub winner_name: String,
    pub race_id: u32,
}

/// Notice that a player left the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDisconnected {
    pub id: PlayerId,
}

/// Everything a client sends, tagged by event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinRoom(JoinRoom),
    UpdateKartPose(KartPose),
    RaceComplete(RaceComplete),
}

/// Everything the server sends, tagged by event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    JoinRoomComplete(JoinRoomComplete),
    ServerUpdate(Vec<ServerUpdateEntry>),
    UserDisconnected(UserDisconnected),
    RaceComplete(RaceComplete),
}

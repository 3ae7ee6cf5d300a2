//! JSON framing for the room-server transport.
//!
//! The server speaks JSON text frames. Encoding cannot reasonably fail;
//! decoding faces the network, so malformed frames surface as an error
//! the caller can drop (or use the lossy helpers, which log and swallow).

use thiserror::Error;

use crate::messages::{ClientMessage, ServerMessage};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn encode_client(message: &ClientMessage) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode_client(raw: &str) -> Result<ClientMessage, CodecError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn encode_server(message: &ServerMessage) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode_server(raw: &str) -> Result<ServerMessage, CodecError> {
    Ok(serde_json::from_str(raw)?)
}

/// Decodes an inbound server frame, logging and dropping garbage instead
/// of propagating it into the game loop.
pub fn decode_server_lossy(raw: &str) -> Option<ServerMessage> {
    match decode_server(raw) {
        Ok(message) => Some(message),
        Err(err) => {
            log::debug!("dropping inbound frame: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{JoinRoom, RaceComplete};

    #[test]
    fn client_round_trip() {
        let msg = ClientMessage::JoinRoom(JoinRoom {
            room_name: "testRoom".into(),
            player_name: "Ada".into(),
            body_material_index: 1,
            driver_material_index: 2,
        });
        let raw = encode_client(&msg).unwrap();
        assert_eq!(decode_client(&raw).unwrap(), msg);
    }

    #[test]
    fn server_round_trip() {
        let msg = ServerMessage::RaceComplete(RaceComplete {
            winner_name: "Ada".into(),
            race_id: 3,
        });
        let raw = encode_server(&msg).unwrap();
        assert_eq!(decode_server(&raw).unwrap(), msg);
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(decode_server("{not json").is_err());
        assert!(decode_server(r#"{"event":"noSuchEvent","data":{}}"#).is_err());
    }

    #[test]
    fn lossy_decode_swallows_garbage() {
        assert!(decode_server_lossy("{not json").is_none());
        let raw = encode_server(&ServerMessage::UserDisconnected(
            crate::messages::UserDisconnected { id: "abc".into() },
        ))
        .unwrap();
        assert!(decode_server_lossy(&raw).is_some());
    }
}

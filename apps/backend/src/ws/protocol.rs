//! WebSocket wire protocol.
//!
//! Server pushes carry no state payload: a `room_changed` event is a signal
//! to re-fetch the snapshot. The push channel is at-least-once and may
//! reorder or drop; the snapshot read is the payload of record.

use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Subscribe to a room's change notifications.
    Subscribe { room_id: i64 },
    /// Application-level liveness probe.
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    Hello {
        protocol_version: u8,
    },
    Subscribed {
        room_id: i64,
    },
    /// Something about the room changed; re-fetch the snapshot. `version` is
    /// the room's lock version at publish time and may arrive out of order.
    RoomChanged {
        room_id: i64,
        version: i32,
    },
    Pong,
    Error {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_changed_round_trips() {
        let msg = ServerMsg::RoomChanged {
            room_id: 7,
            version: 42,
        };
        let text = serde_json::to_string(&msg).unwrap();
        assert!(text.contains("room_changed"));
        let back: ServerMsg = serde_json::from_str(&text).unwrap();
        match back {
            ServerMsg::RoomChanged { room_id, version } => {
                assert_eq!(room_id, 7);
                assert_eq!(version, 42);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn subscribe_parses() {
        let msg: ClientMsg = serde_json::from_str(r#"{"type":"subscribe","room_id":3}"#).unwrap();
        assert!(matches!(msg, ClientMsg::Subscribe { room_id: 3 }));
    }
}

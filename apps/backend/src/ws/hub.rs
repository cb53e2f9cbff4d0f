//! In-process registry of WebSocket sessions per room.

use actix::prelude::*;
use dashmap::DashMap;
use uuid::Uuid;

/// Notification delivered to each subscribed session actor.
#[derive(Message, Clone, Copy, Debug)]
#[rtype(result = "()")]
pub struct RoomChanged {
    pub room_id: i64,
    pub version: i32,
}

/// Sessions subscribed per room, keyed by a connection token.
#[derive(Default)]
pub struct RoomSessionRegistry {
    sessions: DashMap<i64, DashMap<Uuid, Recipient<RoomChanged>>>,
}

impl RoomSessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn register(&self, room_id: i64, recipient: Recipient<RoomChanged>) -> Uuid {
        let token = Uuid::new_v4();
        let entry = self.sessions.entry(room_id).or_default();
        entry.insert(token, recipient);
        token
    }

    pub fn unregister(&self, room_id: i64, token: Uuid) {
        if let Some(entry) = self.sessions.get(&room_id) {
            entry.remove(&token);
            if entry.is_empty() {
                drop(entry);
                self.sessions.remove_if(&room_id, |_, v| v.is_empty());
            }
        }
    }

    pub fn broadcast(&self, message: RoomChanged) {
        if let Some(entry) = self.sessions.get(&message.room_id) {
            for recipient in entry.iter() {
                let _ = recipient.value().do_send(message);
            }
        }
    }

    pub fn session_count(&self, room_id: i64) -> usize {
        self.sessions.get(&room_id).map(|e| e.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe;

    impl Actor for Probe {
        type Context = Context<Self>;
    }

    impl Handler<RoomChanged> for Probe {
        type Result = ();
        fn handle(&mut self, _msg: RoomChanged, _ctx: &mut Context<Self>) {}
    }

    #[actix_web::test]
    async fn register_and_unregister_track_counts() {
        let registry = RoomSessionRegistry::new();
        let addr = Probe.start();
        let token = registry.register(9, addr.recipient());
        assert_eq!(registry.session_count(9), 1);
        registry.unregister(9, token);
        assert_eq!(registry.session_count(9), 0);
    }
}

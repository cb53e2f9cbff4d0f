use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::ws::broker::RealtimeBroker;
use crate::ws::hub::RoomSessionRegistry;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// Realtime broker (absent in DB-only test scenarios).
    broker: Option<Arc<RealtimeBroker>>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, broker: Arc<RealtimeBroker>) -> Self {
        Self {
            db,
            broker: Some(broker),
        }
    }

    /// State without a realtime broker; pushes become no-ops and clients
    /// fall back to polling the snapshot.
    pub fn without_broker(db: DatabaseConnection) -> Self {
        Self { db, broker: None }
    }

    pub fn registry(&self) -> Option<Arc<RoomSessionRegistry>> {
        self.broker.as_ref().map(|b| b.registry())
    }

    /// Publish a room-changed event. Push is best-effort; the polling
    /// fallback bounds staleness, so failures are logged, never
    /// propagated into the mutation path.
    pub async fn publish_room_changed(&self, room_id: i64, version: i32) {
        if let Some(broker) = &self.broker {
            if let Err(err) = broker.publish_room_changed(room_id, version).await {
                warn!(room_id, version, error = %err, "Room change publish failed");
            }
        }
    }
}

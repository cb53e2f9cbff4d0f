//! Redis pub/sub broker fanning room-change events across backend instances.
//!
//! Mutation handlers publish `room_changed` envelopes; every instance's
//! subscriber task forwards them to its locally registered WebSocket
//! sessions. Delivery is at-least-once with no ordering guarantee, which is
//! fine: the envelope only tells clients to re-fetch.

use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::ws::hub::{RoomChanged, RoomSessionRegistry};

const CHANNEL_PATTERN: &str = "room:*";
const RECONNECT_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    RoomChanged { room_id: i64, version: i32 },
}

pub struct RealtimeBroker {
    registry: Arc<RoomSessionRegistry>,
    publisher: Mutex<ConnectionManager>,
}

impl RealtimeBroker {
    pub async fn connect(redis_url: &str) -> Result<Arc<Self>, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;

        let manager = ConnectionManager::new(client.clone())
            .await
            .map_err(|err| {
                AppError::config(format!("Unable to initialize Redis connection: {err}"))
            })?;

        let registry = Arc::new(RoomSessionRegistry::new());
        let broker = Arc::new(Self {
            registry: registry.clone(),
            publisher: Mutex::new(manager),
        });

        spawn_subscriber(client, registry);

        Ok(broker)
    }

    pub fn registry(&self) -> Arc<RoomSessionRegistry> {
        self.registry.clone()
    }

    /// Publish a "room_changed" event for a given room.
    pub async fn publish_room_changed(&self, room_id: i64, version: i32) -> Result<(), AppError> {
        let envelope = EventEnvelope::RoomChanged { room_id, version };
        let payload = serde_json::to_string(&envelope)
            .map_err(|err| AppError::internal(format!("Envelope serialization failed: {err}")))?;

        let mut publisher = self.publisher.lock().await;
        publisher
            .publish::<_, _, ()>(format!("room:{room_id}"), payload)
            .await
            .map_err(|err| AppError::internal(format!("Redis publish failed: {err}")))?;
        Ok(())
    }
}

/// Subscriber loop: psubscribe to all room channels and forward envelopes to
/// the local registry. Reconnects with backoff on any failure.
fn spawn_subscriber(client: Client, registry: Arc<RoomSessionRegistry>) {
    tokio::spawn(async move {
        loop {
            match client.get_async_pubsub().await {
                Ok(mut pubsub) => {
                    if let Err(err) = pubsub.psubscribe(CHANNEL_PATTERN).await {
                        error!(error = %err, "Redis psubscribe failed");
                        sleep(RECONNECT_BACKOFF).await;
                        continue;
                    }
                    info!(pattern = CHANNEL_PATTERN, "Realtime subscriber connected");

                    let mut stream = pubsub.on_message();
                    while let Some(msg) = stream.next().await {
                        let payload: String = match msg.get_payload() {
                            Ok(payload) => payload,
                            Err(err) => {
                                warn!(error = %err, "Unreadable pub/sub payload");
                                continue;
                            }
                        };
                        match serde_json::from_str::<EventEnvelope>(&payload) {
                            Ok(EventEnvelope::RoomChanged { room_id, version }) => {
                                registry.broadcast(RoomChanged { room_id, version });
                            }
                            Err(err) => {
                                warn!(error = %err, payload, "Malformed event envelope");
                            }
                        }
                    }

                    warn!("Realtime subscriber stream ended; reconnecting");
                }
                Err(err) => {
                    error!(error = %err, "Redis pub/sub connection failed");
                }
            }
            sleep(RECONNECT_BACKOFF).await;
        }
    });
}

//! WebSocket session actor.
//!
//! A session subscribes to one room and relays `room_changed` signals.
//! Opening a session flips the player's liveness flag on; closing flips it
//! off. Heartbeat pings detect dead peers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use sea_orm::TransactionTrait;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::services::room_flow::RoomFlowService;
use crate::state::app_state::AppState;
use crate::ws::hub::{RoomChanged, RoomSessionRegistry};
use crate::ws::protocol::{ClientMsg, ServerMsg, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub room_id: i64,
    pub player_id: i64,
}

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let conn_id = Uuid::new_v4();
    let registry = app_state.registry();

    let session = WsSession::new(
        conn_id,
        query.room_id,
        query.player_id,
        app_state.into_inner(),
        registry,
    );
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    room_id: i64,
    player_id: i64,
    app_state: Arc<AppState>,
    registry: Option<Arc<RoomSessionRegistry>>,
    registration: Option<Uuid>,
    last_heartbeat: Instant,
}

impl WsSession {
    fn new(
        conn_id: Uuid,
        room_id: i64,
        player_id: i64,
        app_state: Arc<AppState>,
        registry: Option<Arc<RoomSessionRegistry>>,
    ) -> Self {
        Self {
            conn_id,
            room_id,
            player_id,
            app_state,
            registry,
            registration: None,
            last_heartbeat: Instant::now(),
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                debug!(conn_id = %act.conn_id, "WebSocket heartbeat timed out");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send_msg(&self, ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(err) => warn!(error = %err, "Failed to serialize server message"),
        }
    }

    fn set_connected(&self, connected: bool) {
        let state = self.app_state.clone();
        let player_id = self.player_id;
        actix::spawn(async move {
            let result = async {
                let txn = state.db.begin().await?;
                RoomFlowService
                    .set_connected(&txn, player_id, connected)
                    .await?;
                txn.commit().await?;
                Ok::<(), crate::error::AppError>(())
            }
            .await;
            if let Err(err) = result {
                warn!(player_id, connected, error = %err, "Liveness update failed");
            }
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);
        self.send_msg(
            ctx,
            &ServerMsg::Hello {
                protocol_version: PROTOCOL_VERSION,
            },
        );

        if let Some(registry) = &self.registry {
            let token = registry.register(self.room_id, ctx.address().recipient());
            self.registration = Some(token);
            self.send_msg(
                ctx,
                &ServerMsg::Subscribed {
                    room_id: self.room_id,
                },
            );
        }

        self.set_connected(true);
        debug!(conn_id = %self.conn_id, room_id = self.room_id, "WebSocket session started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let (Some(registry), Some(token)) = (&self.registry, self.registration.take()) {
            registry.unregister(self.room_id, token);
        }
        self.set_connected(false);
        debug!(conn_id = %self.conn_id, room_id = self.room_id, "WebSocket session stopped");
    }
}

impl Handler<RoomChanged> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: RoomChanged, ctx: &mut Self::Context) {
        self.send_msg(
            ctx,
            &ServerMsg::RoomChanged {
                room_id: msg.room_id,
                version: msg.version,
            },
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::Ping) => self.send_msg(ctx, &ServerMsg::Pong),
                    Ok(ClientMsg::Subscribe { room_id }) => {
                        // Re-subscribe to a different room mid-session.
                        if let Some(registry) = &self.registry {
                            if let Some(token) = self.registration.take() {
                                registry.unregister(self.room_id, token);
                            }
                            self.room_id = room_id;
                            let token = registry.register(room_id, ctx.address().recipient());
                            self.registration = Some(token);
                            self.send_msg(ctx, &ServerMsg::Subscribed { room_id });
                        }
                    }
                    Err(err) => self.send_msg(
                        ctx,
                        &ServerMsg::Error {
                            message: format!("Unparseable client message: {err}"),
                        },
                    ),
                }
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => {}
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "WebSocket protocol error");
                ctx.stop();
            }
        }
    }
}

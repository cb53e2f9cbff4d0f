//! Room HTTP routes: snapshot, join flow, and one action per mutation.
//!
//! Mutation endpoints answer with a structured `ActionOutcome` instead of
//! raising business-rule rejections across the wire: a rejected precondition
//! (wrong turn, card not in hand, duplicate card...) is a 200 with
//! `success: false` and a retryable message, while transport and store
//! failures keep their problem+json error shape. Clients distinguish the two
//! by shape, exactly as the store boundary requires.

use actix_web::http::header::{ETAG, IF_NONE_MATCH};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::http::etag::room_etag;
use crate::protocol::room_state;
use crate::repos::{exchanges, gifts, players, rooms, votes};
use crate::services::room_flow::RoomFlowService;
use crate::state::app_state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionOutcome {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    moved: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duplicates: Option<Vec<(String, usize)>>,
}

impl ActionOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            code: None,
            message: None,
            card: None,
            moved: None,
            duplicates: None,
        }
    }

    fn rejected(err: &AppError) -> Self {
        Self {
            success: false,
            code: Some(err.code().to_string()),
            message: Some(err.detail().to_string()),
            card: None,
            moved: None,
            duplicates: None,
        }
    }
}

/// Render a mutation result: business rejections become `success: false`
/// outcomes, infrastructure failures propagate as errors.
fn outcome_response(result: Result<ActionOutcome, AppError>) -> Result<HttpResponse, AppError> {
    match result {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(err) if is_business_rejection(&err) => {
            Ok(HttpResponse::Ok().json(ActionOutcome::rejected(&err)))
        }
        Err(err) => Err(err),
    }
}

fn is_business_rejection(err: &AppError) -> bool {
    matches!(
        err,
        AppError::Validation { .. } | AppError::Conflict { .. } | AppError::NotFound { .. }
    )
}

/// Re-read the room and publish a change notification. Best effort: a
/// publish failure never fails the mutation that caused it.
async fn publish_change(state: &AppState, room_id: i64) {
    if let Ok(Some(room)) = rooms::find_by_id(&state.db, room_id).await {
        state.publish_room_changed(room.id, room.lock_version).await;
    }
}

// ---- Join flow -------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomResponse {
    room_id: i64,
    join_code: String,
    player_id: i64,
}

async fn create_room(
    http_req: HttpRequest,
    body: web::Json<CreateRoomRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let name = body.into_inner().name;

    let (room, player) = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move { RoomFlowService.create_room(txn, name).await })
    })
    .await?;

    Ok(HttpResponse::Created().json(CreateRoomResponse {
        room_id: room.id,
        join_code: room.join_code,
        player_id: player.id,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomRequest {
    join_code: String,
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomResponse {
    room_id: i64,
    player_id: i64,
    player_number: i16,
    role: crate::entities::players::PlayerRole,
}

async fn join_room(
    http_req: HttpRequest,
    body: web::Json<JoinRoomRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let JoinRoomRequest { join_code, name } = body.into_inner();

    let (room, player) = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move { RoomFlowService.join_room(txn, &join_code, name).await })
    })
    .await?;

    publish_change(&app_state, room.id).await;

    Ok(HttpResponse::Ok().json(JoinRoomResponse {
        room_id: room.id,
        player_id: player.id,
        player_number: player.player_number,
        role: player.role,
    }))
}

// ---- Snapshot and history --------------------------------------------------

/// GET /api/rooms/{room_id}/snapshot
///
/// Returns the current room snapshot as JSON with an ETag for caching.
/// Supports `If-None-Match`: a matching ETag yields `304 Not Modified`.
async fn get_snapshot(
    http_req: HttpRequest,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = path.into_inner();

    let (snapshot, lock_version) = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let room = rooms::require_room(txn, room_id).await?;
            let all_players = players::find_all_by_room(txn, room_id).await?;
            let all_votes = votes::find_all_by_room(txn, room_id).await?;
            let snap = room_state::snapshot(&room, &all_players, &all_votes);
            Ok((snap, room.lock_version))
        })
    })
    .await?;

    let etag_value = room_etag(room_id, lock_version);

    if let Some(if_none_match) = http_req.headers().get(IF_NONE_MATCH) {
        if let Ok(client_etag) = if_none_match.to_str() {
            let matches = client_etag.trim() == "*"
                || client_etag
                    .split(',')
                    .map(str::trim)
                    .any(|etag| etag == etag_value);

            if matches {
                return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
                    .insert_header((ETAG, etag_value))
                    .finish());
            }
        }
    }

    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag_value))
        .json(snapshot))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    exchanges: Vec<exchanges::ExchangeAction>,
    gifts: Vec<gifts::Gift>,
}

/// GET /api/rooms/{room_id}/history: the append-only action feed.
async fn get_history(
    http_req: HttpRequest,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = path.into_inner();

    let history = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let exchanges = exchanges::find_all_by_room(txn, room_id).await?;
            let gifts = gifts::find_all_by_room(txn, room_id).await?;
            Ok(HistoryResponse { exchanges, gifts })
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(history))
}

// ---- Phase actions ---------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckinRequest {
    preferred_name: Option<String>,
}

async fn check_in(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<CheckinRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();
    let preferred_name = body.into_inner().preferred_name;

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .check_in(txn, room_id, player_id, preferred_name)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteRequest {
    card_index: i16,
}

async fn cast_vote(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<VoteRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();
    let card_index = body.into_inner().card_index;

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .cast_vote(txn, room_id, player_id, card_index)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResonanceRequest {
    percentage: i16,
}

async fn share_initial_resonance(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<ResonanceRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();
    let percentage = body.into_inner().percentage;

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .share_initial_resonance(txn, room_id, player_id, percentage)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

async fn mark_ready(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService.mark_ready(txn, room_id, player_id).await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

async fn force_start(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .force_begin_playing(txn, room_id, player_id)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

// ---- Card mutations --------------------------------------------------------

async fn draw_card(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let card = RoomFlowService.draw_card(txn, room_id, player_id).await?;
            Ok(ActionOutcome {
                card: Some(card),
                ..ActionOutcome::ok()
            })
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscardRequest {
    card: String,
}

async fn discard_card(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<DiscardRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();
    let card = body.into_inner().card;

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .discard_card(txn, room_id, player_id, &card)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest {
    hand_card: String,
    board_card: String,
}

async fn exchange_cards(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<ExchangeRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();
    let ExchangeRequest {
        hand_card,
        board_card,
    } = body.into_inner();

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .exchange_cards(txn, room_id, player_id, &hand_card, &board_card)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

async fn skip_exchange(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .skip_exchange(txn, room_id, player_id)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

// ---- Final phase -----------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareFinalRequest {
    percentage: i16,
    #[serde(default)]
    text: String,
}

async fn share_final(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<ShareFinalRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();
    let ShareFinalRequest { percentage, text } = body.into_inner();

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .share_final_resonance(txn, room_id, player_id, percentage, text)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GiftRequest {
    message: String,
}

async fn give_gift(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<GiftRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();
    let message = body.into_inner().message;

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .give_final_gift(txn, room_id, player_id, message)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReflectRequest {
    text: String,
}

async fn submit_reflection(
    http_req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<ReflectRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, player_id) = path.into_inner();
    let text = body.into_inner().text;

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            RoomFlowService
                .submit_reflection(txn, room_id, player_id, text)
                .await?;
            Ok(ActionOutcome::ok())
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

// ---- Maintenance -----------------------------------------------------------

async fn validate_cards(
    http_req: HttpRequest,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = path.into_inner();

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let duplicates = RoomFlowService.validate_uniqueness(txn, room_id).await?;
            Ok(ActionOutcome {
                duplicates: Some(duplicates),
                ..ActionOutcome::ok()
            })
        })
    })
    .await;

    outcome_response(result)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplenishRequest {
    target: Option<usize>,
}

async fn replenish_discard(
    http_req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ReplenishRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = path.into_inner();
    let target = body.into_inner().target;

    let result = with_txn(Some(&http_req), &app_state, |txn| {
        Box::pin(async move {
            let moved = RoomFlowService
                .replenish_discard(txn, room_id, target)
                .await?;
            Ok(ActionOutcome {
                moved: Some(moved),
                ..ActionOutcome::ok()
            })
        })
    })
    .await;

    if result.is_ok() {
        publish_change(&app_state, room_id).await;
    }
    outcome_response(result)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/rooms")
            .service(web::resource("").route(web::post().to(create_room)))
            .service(web::resource("/join").route(web::post().to(join_room)))
            .service(web::resource("/{room_id}/snapshot").route(web::get().to(get_snapshot)))
            .service(web::resource("/{room_id}/history").route(web::get().to(get_history)))
            .service(
                web::resource("/{room_id}/validate-cards").route(web::post().to(validate_cards)),
            )
            .service(
                web::resource("/{room_id}/replenish").route(web::post().to(replenish_discard)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/checkin")
                    .route(web::post().to(check_in)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/vote")
                    .route(web::post().to(cast_vote)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/resonance")
                    .route(web::post().to(share_initial_resonance)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/ready")
                    .route(web::post().to(mark_ready)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/force-start")
                    .route(web::post().to(force_start)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/draw")
                    .route(web::post().to(draw_card)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/discard")
                    .route(web::post().to(discard_card)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/exchange")
                    .route(web::post().to(exchange_cards)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/skip-exchange")
                    .route(web::post().to(skip_exchange)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/share-final")
                    .route(web::post().to(share_final)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/gift")
                    .route(web::post().to(give_gift)),
            )
            .service(
                web::resource("/{room_id}/players/{player_id}/reflect")
                    .route(web::post().to(submit_reflection)),
            ),
    );
}

//! SeaORM adapter for the players table - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::players;
use crate::entities::players::PlayerRole;

pub mod dto;

pub use dto::{PlayerCreate, PlayerUpdate};

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Option<players::Model>, sea_orm::DbErr> {
    players::Entity::find_by_id(player_id).one(conn).await
}

/// Find player by ID or return RecordNotFound error.
pub async fn require_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<players::Model, sea_orm::DbErr> {
    find_by_id(conn, player_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Player not found".to_string()))
}

pub async fn find_all_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<players::Model>, sea_orm::DbErr> {
    players::Entity::find()
        .filter(players::Column::RoomId.eq(room_id))
        .order_by_asc(players::Column::PlayerNumber)
        .order_by_asc(players::Column::Id)
        .all(conn)
        .await
}

/// Active (seated, non-spectator) players of a room in seat order.
pub async fn find_active_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<players::Model>, sea_orm::DbErr> {
    players::Entity::find()
        .filter(players::Column::RoomId.eq(room_id))
        .filter(players::Column::Role.eq(PlayerRole::Player))
        .filter(players::Column::PlayerNumber.gte(0))
        .order_by_asc(players::Column::PlayerNumber)
        .all(conn)
        .await
}

/// Load the active players of a room under exclusive row locks.
///
/// Called after `rooms_sea::lock_room` inside card-mutating transactions so
/// hand writes serialize alongside the room row.
pub async fn lock_active_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<players::Model>, sea_orm::DbErr> {
    players::Entity::find()
        .filter(players::Column::RoomId.eq(room_id))
        .filter(players::Column::Role.eq(PlayerRole::Player))
        .filter(players::Column::PlayerNumber.gte(0))
        .order_by_asc(players::Column::PlayerNumber)
        .lock_exclusive()
        .all(conn)
        .await
}

pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerCreate,
) -> Result<players::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let player_active = players::ActiveModel {
        id: NotSet,
        room_id: Set(dto.room_id),
        player_number: Set(dto.player_number),
        name: Set(dto.name),
        preferred_name: Set(None),
        role: Set(dto.role),
        hand: Set(serde_json::json!([])),
        is_connected: Set(true),
        has_checked_in: Set(false),
        ready_for_next_phase: Set(false),
        has_shared_final_resonance: Set(false),
        final_resonance_text: Set(None),
        final_resonance_percentage: Set(None),
        final_gifts_received: Set(serde_json::json!([])),
        final_reflection_text: Set(None),
        has_given_final_gift: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };

    player_active.insert(conn).await
}

/// Apply a partial player update, refreshing `updated_at`.
pub async fn update_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerUpdate,
) -> Result<players::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();

    let mut update = players::Entity::update_many()
        .col_expr(players::Column::UpdatedAt, Expr::val(now).into());

    if let Some(name) = &dto.preferred_name {
        update = update.col_expr(
            players::Column::PreferredName,
            Expr::val(Some(name.clone())).into(),
        );
    }
    if let Some(hand) = &dto.hand {
        update = update.col_expr(players::Column::Hand, Expr::val(serde_json::json!(hand)).into());
    }
    if let Some(connected) = dto.is_connected {
        update = update.col_expr(players::Column::IsConnected, Expr::val(connected).into());
    }
    if let Some(checked_in) = dto.has_checked_in {
        update = update.col_expr(players::Column::HasCheckedIn, Expr::val(checked_in).into());
    }
    if let Some(ready) = dto.ready_for_next_phase {
        update = update.col_expr(players::Column::ReadyForNextPhase, Expr::val(ready).into());
    }
    if let Some(shared) = dto.has_shared_final_resonance {
        update = update.col_expr(
            players::Column::HasSharedFinalResonance,
            Expr::val(shared).into(),
        );
    }
    if let Some(text) = &dto.final_resonance_text {
        update = update.col_expr(
            players::Column::FinalResonanceText,
            Expr::val(Some(text.clone())).into(),
        );
    }
    if let Some(pct) = dto.final_resonance_percentage {
        update = update.col_expr(
            players::Column::FinalResonancePercentage,
            Expr::val(Some(pct)).into(),
        );
    }
    if let Some(gifts) = &dto.final_gifts_received {
        update = update.col_expr(
            players::Column::FinalGiftsReceived,
            Expr::val(gifts.clone()).into(),
        );
    }
    if let Some(text) = &dto.final_reflection_text {
        update = update.col_expr(
            players::Column::FinalReflectionText,
            Expr::val(Some(text.clone())).into(),
        );
    }
    if let Some(given) = dto.has_given_final_gift {
        update = update.col_expr(players::Column::HasGivenFinalGift, Expr::val(given).into());
    }

    let result = update
        .filter(players::Column::Id.eq(dto.id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(sea_orm::DbErr::RecordNotFound(
            "Player not found".to_string(),
        ));
    }

    players::Entity::find_by_id(dto.id)
        .one(conn)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Player not found".to_string()))
}

/// Reset a per-phase flag for every player in the room (phase boundary).
pub async fn reset_ready_flags<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<(), sea_orm::DbErr> {
    players::Entity::update_many()
        .col_expr(players::Column::ReadyForNextPhase, Expr::val(false).into())
        .col_expr(
            players::Column::UpdatedAt,
            Expr::val(time::OffsetDateTime::now_utc()).into(),
        )
        .filter(players::Column::RoomId.eq(room_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Reset every player's gift flag when the final-phase turn rotates.
pub async fn reset_gift_flags<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<(), sea_orm::DbErr> {
    players::Entity::update_many()
        .col_expr(players::Column::HasGivenFinalGift, Expr::val(false).into())
        .col_expr(
            players::Column::UpdatedAt,
            Expr::val(time::OffsetDateTime::now_utc()).into(),
        )
        .filter(players::Column::RoomId.eq(room_id))
        .exec(conn)
        .await?;
    Ok(())
}

//! SeaORM adapter for the rooms table - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QuerySelect,
    Set,
};

use crate::entities::rooms;
use crate::entities::rooms::{FinalPhaseStep, RoomStatus};

pub mod dto;

pub use dto::{RoomCreate, RoomStatusTransition, RoomUpdate};

fn cards_json(cards: &[String]) -> sea_orm::entity::prelude::Json {
    serde_json::json!(cards)
}

/// Helper: Apply optimistic update with lock version check, then refetch.
///
/// This consolidates the repetitive pattern:
/// - Adds lock_version increment and updated_at to the update
/// - Filters by id and current lock_version
/// - Checks rows_affected to distinguish NotFound vs OptimisticLock
/// - Refetches and returns the updated model
///
/// The caller provides a closure that configures the changed columns.
async fn optimistic_update_then_fetch<C, F>(
    conn: &C,
    id: i64,
    current_lock_version: i32,
    configure_update: F,
) -> Result<rooms::Model, sea_orm::DbErr>
where
    C: ConnectionTrait + Send + Sync,
    F: FnOnce(sea_orm::UpdateMany<rooms::Entity>) -> sea_orm::UpdateMany<rooms::Entity>,
{
    let now = time::OffsetDateTime::now_utc();

    let result = configure_update(rooms::Entity::update_many())
        .col_expr(rooms::Column::UpdatedAt, Expr::val(now).into())
        .col_expr(
            rooms::Column::LockVersion,
            Expr::col(rooms::Column::LockVersion).add(1),
        )
        .filter(rooms::Column::Id.eq(id))
        .filter(rooms::Column::LockVersion.eq(current_lock_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        // Either the room doesn't exist or the lock version doesn't match.
        let room = rooms::Entity::find_by_id(id).one(conn).await?;
        if let Some(room) = room {
            let payload = format!(
                "OPTIMISTIC_LOCK:{{\"expected\":{},\"actual\":{}}}",
                current_lock_version, room.lock_version
            );
            return Err(sea_orm::DbErr::Custom(payload));
        } else {
            return Err(sea_orm::DbErr::RecordNotFound("Room not found".to_string()));
        }
    }

    rooms::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Room not found".to_string()))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Option<rooms::Model>, sea_orm::DbErr> {
    rooms::Entity::find_by_id(room_id).one(conn).await
}

/// Find room by ID or return RecordNotFound error.
pub async fn require_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<rooms::Model, sea_orm::DbErr> {
    find_by_id(conn, room_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Room not found".to_string()))
}

/// Load the room under an exclusive row lock (`SELECT ... FOR UPDATE`).
///
/// Every card-mutating operation starts here so concurrent mutations on the
/// same room serialize at the store.
pub async fn lock_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<rooms::Model, sea_orm::DbErr> {
    rooms::Entity::find_by_id(room_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Room not found".to_string()))
}

pub async fn find_by_join_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    join_code: &str,
) -> Result<Option<rooms::Model>, sea_orm::DbErr> {
    rooms::Entity::find()
        .filter(rooms::Column::JoinCode.eq(join_code))
        .one(conn)
        .await
}

pub async fn create_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoomCreate,
) -> Result<rooms::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let room_active = rooms::ActiveModel {
        id: NotSet,
        join_code: Set(dto.join_code),
        status: Set(RoomStatus::Waiting),
        purpose_card: Set(None),
        card_options: Set(serde_json::json!([])),
        voting_started_at: Set(None),
        current_turn_player: Set(0),
        current_exchange_turn: Set(0),
        final_phase_turn: Set(0),
        final_phase_step: Set(FinalPhaseStep::Sharing),
        round_number: Set(0),
        exchange_completed: Set(false),
        deck: Set(cards_json(&dto.deck)),
        discard_pile: Set(serde_json::json!([])),
        created_at: Set(now),
        updated_at: Set(now),
        lock_version: Set(1),
    };

    room_active.insert(conn).await
}

/// Apply a lock-version-guarded field update.
pub async fn update_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoomUpdate,
) -> Result<rooms::Model, sea_orm::DbErr> {
    optimistic_update_then_fetch(conn, dto.id, dto.current_lock_version, |mut update| {
        if let Some(status) = dto.status {
            update = update.col_expr(rooms::Column::Status, Expr::val(status).into());
        }
        if let Some(deck) = &dto.deck {
            update = update.col_expr(rooms::Column::Deck, Expr::val(cards_json(deck)).into());
        }
        if let Some(discard) = &dto.discard_pile {
            update = update.col_expr(
                rooms::Column::DiscardPile,
                Expr::val(cards_json(discard)).into(),
            );
        }
        if let Some(seat) = dto.current_turn_player {
            update = update.col_expr(rooms::Column::CurrentTurnPlayer, Expr::val(seat).into());
        }
        if let Some(seat) = dto.current_exchange_turn {
            update = update.col_expr(rooms::Column::CurrentExchangeTurn, Expr::val(seat).into());
        }
        if let Some(seat) = dto.final_phase_turn {
            update = update.col_expr(rooms::Column::FinalPhaseTurn, Expr::val(seat).into());
        }
        if let Some(step) = dto.final_phase_step {
            update = update.col_expr(rooms::Column::FinalPhaseStep, Expr::val(step).into());
        }
        if let Some(round) = dto.round_number {
            update = update.col_expr(rooms::Column::RoundNumber, Expr::val(round).into());
        }
        if let Some(done) = dto.exchange_completed {
            update = update.col_expr(rooms::Column::ExchangeCompleted, Expr::val(done).into());
        }
        update
    })
    .await
}

/// Apply a status-conditional transition.
///
/// The update is filtered on `status = from`; zero rows affected with an
/// existing room means another writer already transitioned, reported as
/// `Ok(None)` so callers can treat a lost race as success.
pub async fn transition_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoomStatusTransition,
) -> Result<Option<rooms::Model>, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();

    let mut update = rooms::Entity::update_many()
        .col_expr(rooms::Column::Status, Expr::val(dto.to).into())
        .col_expr(rooms::Column::UpdatedAt, Expr::val(now).into())
        .col_expr(
            rooms::Column::LockVersion,
            Expr::col(rooms::Column::LockVersion).add(1),
        );

    if let Some(card) = &dto.purpose_card {
        update = update.col_expr(rooms::Column::PurposeCard, Expr::val(card.clone()).into());
    }
    if let Some(options) = &dto.card_options {
        update = update.col_expr(
            rooms::Column::CardOptions,
            Expr::val(cards_json(options)).into(),
        );
    }
    if let Some(at) = dto.voting_started_at {
        update = update.col_expr(rooms::Column::VotingStartedAt, Expr::val(Some(at)).into());
    }
    if let Some(deck) = &dto.deck {
        update = update.col_expr(rooms::Column::Deck, Expr::val(cards_json(deck)).into());
    }
    if let Some(discard) = &dto.discard_pile {
        update = update.col_expr(
            rooms::Column::DiscardPile,
            Expr::val(cards_json(discard)).into(),
        );
    }
    if let Some(seat) = dto.current_exchange_turn {
        update = update.col_expr(rooms::Column::CurrentExchangeTurn, Expr::val(seat).into());
    }
    if let Some(done) = dto.exchange_completed {
        update = update.col_expr(rooms::Column::ExchangeCompleted, Expr::val(done).into());
    }
    if let Some(seat) = dto.final_phase_turn {
        update = update.col_expr(rooms::Column::FinalPhaseTurn, Expr::val(seat).into());
    }
    if let Some(step) = dto.final_phase_step {
        update = update.col_expr(rooms::Column::FinalPhaseStep, Expr::val(step).into());
    }

    let result = update
        .filter(rooms::Column::Id.eq(dto.id))
        .filter(rooms::Column::Status.eq(dto.from))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        // Distinguish a missing room from a lost race.
        return match rooms::Entity::find_by_id(dto.id).one(conn).await? {
            Some(_) => Ok(None),
            None => Err(sea_orm::DbErr::RecordNotFound("Room not found".to_string())),
        };
    }

    rooms::Entity::find_by_id(dto.id)
        .one(conn)
        .await?
        .map(Some)
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Room not found".to_string()))
}

/// Set the voting countdown anchor if it is still unset. First writer wins;
/// later calls are no-ops.
pub async fn set_voting_started_at_if_unset<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    at: time::OffsetDateTime,
) -> Result<bool, sea_orm::DbErr> {
    let result = rooms::Entity::update_many()
        .col_expr(rooms::Column::VotingStartedAt, Expr::val(Some(at)).into())
        .filter(rooms::Column::Id.eq(room_id))
        .filter(rooms::Column::VotingStartedAt.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Rooms currently in a status the sweeper may need to advance.
pub async fn find_by_statuses<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    statuses: &[RoomStatus],
) -> Result<Vec<rooms::Model>, sea_orm::DbErr> {
    rooms::Entity::find()
        .filter(rooms::Column::Status.is_in(statuses.iter().copied()))
        .all(conn)
        .await
}

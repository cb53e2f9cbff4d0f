//! Exchange action repository functions for the domain layer.

use sea_orm::ConnectionTrait;

use crate::adapters::exchange_sea as exchange_adapter;
use crate::entities::exchange_actions;
use crate::entities::exchange_actions::ExchangeKind;
use crate::errors::domain::DomainError;

pub use exchange_actions::Model as ExchangeAction;

pub async fn find_all_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<ExchangeAction>, DomainError> {
    Ok(exchange_adapter::find_all_by_room(conn, room_id).await?)
}

pub async fn log_swap<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    player_id: i64,
    hand_card: String,
    board_card: String,
) -> Result<ExchangeAction, DomainError> {
    Ok(exchange_adapter::create_action(
        conn,
        room_id,
        player_id,
        ExchangeKind::Swap,
        Some(hand_card),
        Some(board_card),
    )
    .await?)
}

pub async fn log_skip<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    player_id: i64,
) -> Result<ExchangeAction, DomainError> {
    Ok(exchange_adapter::create_action(conn, room_id, player_id, ExchangeKind::Skip, None, None)
        .await?)
}

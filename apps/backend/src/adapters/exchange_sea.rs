//! SeaORM adapter for the exchange_actions table - generic over ConnectionTrait.
//!
//! Exchange actions are append-only; the list doubles as the history feed.

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set};

use crate::entities::exchange_actions;
use crate::entities::exchange_actions::ExchangeKind;

pub async fn find_all_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<exchange_actions::Model>, sea_orm::DbErr> {
    exchange_actions::Entity::find()
        .filter(exchange_actions::Column::RoomId.eq(room_id))
        .order_by_asc(exchange_actions::Column::CreatedAt)
        .all(conn)
        .await
}

pub async fn create_action<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    player_id: i64,
    action: ExchangeKind,
    hand_card: Option<String>,
    board_card: Option<String>,
) -> Result<exchange_actions::Model, sea_orm::DbErr> {
    let action_active = exchange_actions::ActiveModel {
        id: NotSet,
        room_id: Set(room_id),
        player_id: Set(player_id),
        action: Set(action),
        hand_card: Set(hand_card),
        board_card: Set(board_card),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };
    action_active.insert(conn).await
}

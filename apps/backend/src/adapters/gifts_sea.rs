//! SeaORM adapter for the gifts table - generic over ConnectionTrait.
//!
//! Gifts are append-only; there is no update path.

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set};

use crate::entities::gifts;

pub async fn find_all_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<gifts::Model>, sea_orm::DbErr> {
    gifts::Entity::find()
        .filter(gifts::Column::RoomId.eq(room_id))
        .order_by_asc(gifts::Column::CreatedAt)
        .all(conn)
        .await
}

pub async fn find_by_room_and_recipient<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    to_player_id: i64,
) -> Result<Vec<gifts::Model>, sea_orm::DbErr> {
    gifts::Entity::find()
        .filter(gifts::Column::RoomId.eq(room_id))
        .filter(gifts::Column::ToPlayerId.eq(to_player_id))
        .order_by_asc(gifts::Column::CreatedAt)
        .all(conn)
        .await
}

pub async fn create_gift<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    from_player_id: i64,
    to_player_id: i64,
    message: String,
) -> Result<gifts::Model, sea_orm::DbErr> {
    let gift_active = gifts::ActiveModel {
        id: NotSet,
        room_id: Set(room_id),
        from_player_id: Set(from_player_id),
        to_player_id: Set(to_player_id),
        message: Set(message),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };
    gift_active.insert(conn).await
}

//! SeaORM adapter for the votes table - generic over ConnectionTrait.

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set};

use crate::entities::votes;

pub async fn find_all_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<votes::Model>, sea_orm::DbErr> {
    votes::Entity::find()
        .filter(votes::Column::RoomId.eq(room_id))
        .order_by_asc(votes::Column::CreatedAt)
        .all(conn)
        .await
}

pub async fn find_by_room_and_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    player_id: i64,
) -> Result<Option<votes::Model>, sea_orm::DbErr> {
    votes::Entity::find()
        .filter(votes::Column::RoomId.eq(room_id))
        .filter(votes::Column::PlayerId.eq(player_id))
        .one(conn)
        .await
}

/// Insert a vote. The (room_id, player_id) unique index rejects a second
/// vote from the same player; the repo maps that to a conflict.
pub async fn create_vote<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    player_id: i64,
    card_index: i16,
    card_text: String,
) -> Result<votes::Model, sea_orm::DbErr> {
    let vote_active = votes::ActiveModel {
        id: NotSet,
        room_id: Set(room_id),
        player_id: Set(player_id),
        card_index: Set(card_index),
        card_text: Set(card_text),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };
    vote_active.insert(conn).await
}

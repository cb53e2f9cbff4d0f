//! Gift repository functions for the domain layer.

use sea_orm::ConnectionTrait;

use crate::adapters::gifts_sea as gifts_adapter;
use crate::entities::gifts;
use crate::errors::domain::DomainError;

pub use gifts::Model as Gift;

pub async fn find_all_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<Gift>, DomainError> {
    Ok(gifts_adapter::find_all_by_room(conn, room_id).await?)
}

pub async fn find_by_room_and_recipient<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    to_player_id: i64,
) -> Result<Vec<Gift>, DomainError> {
    Ok(gifts_adapter::find_by_room_and_recipient(conn, room_id, to_player_id).await?)
}

pub async fn create_gift<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    from_player_id: i64,
    to_player_id: i64,
    message: String,
) -> Result<Gift, DomainError> {
    Ok(gifts_adapter::create_gift(conn, room_id, from_player_id, to_player_id, message).await?)
}

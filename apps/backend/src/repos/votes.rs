//! Vote repository functions for the domain layer.
//!
//! Votes are immutable once cast; uniqueness per (room, player) is enforced
//! by the database index and surfaced as a conflict.

use sea_orm::ConnectionTrait;

use crate::adapters::votes_sea as votes_adapter;
use crate::entities::votes;
use crate::errors::domain::{ConflictKind, DomainError};

pub use votes::Model as Vote;

pub async fn find_all_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<Vote>, DomainError> {
    Ok(votes_adapter::find_all_by_room(conn, room_id).await?)
}

pub async fn find_by_room_and_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    player_id: i64,
) -> Result<Option<Vote>, DomainError> {
    Ok(votes_adapter::find_by_room_and_player(conn, room_id, player_id).await?)
}

pub async fn create_vote<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    player_id: i64,
    card_index: i16,
    card_text: String,
) -> Result<Vote, DomainError> {
    votes_adapter::create_vote(conn, room_id, player_id, card_index, card_text)
        .await
        .map_err(|e| {
            let msg = e.to_string().to_lowercase();
            if msg.contains("unique") || msg.contains("duplicate") {
                DomainError::conflict(
                    ConflictKind::VoteAlreadyCast,
                    "Player already voted this round",
                )
            } else {
                DomainError::from(e)
            }
        })
}

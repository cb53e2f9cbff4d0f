//! Resonance share repository functions for the domain layer.

use sea_orm::ConnectionTrait;

use crate::adapters::resonance_sea as resonance_adapter;
use crate::entities::resonance_shares;
use crate::entities::resonance_shares::ResonancePhase;
use crate::errors::domain::DomainError;

pub use resonance_shares::Model as ResonanceShare;

pub async fn find_by_room_and_phase<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    phase: ResonancePhase,
) -> Result<Vec<ResonanceShare>, DomainError> {
    Ok(resonance_adapter::find_by_room_and_phase(conn, room_id, phase).await?)
}

/// Upsert by (room, player, phase); a resubmission overwrites.
pub async fn upsert_share<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    player_id: i64,
    phase: ResonancePhase,
    percentage: i16,
) -> Result<(), DomainError> {
    Ok(resonance_adapter::upsert_share(conn, room_id, player_id, phase, percentage).await?)
}

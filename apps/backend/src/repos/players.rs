//! Player repository functions for the domain layer.

use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::adapters::players_sea as players_adapter;
use crate::adapters::players_sea::{PlayerCreate, PlayerUpdate};
use crate::entities::players;
use crate::entities::players::PlayerRole;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::repos::rooms::parse_cards;

/// One received message gift, as stored in the recipient's
/// `final_gifts_received` JSON column and rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftRef {
    pub from_player_id: i64,
    pub from_player_name: String,
    pub message: String,
}

/// Player domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: i64,
    pub room_id: i64,
    pub player_number: i16,
    pub name: String,
    pub preferred_name: Option<String>,
    pub role: PlayerRole,
    pub hand: Vec<String>,
    pub is_connected: bool,
    pub has_checked_in: bool,
    pub ready_for_next_phase: bool,
    pub has_shared_final_resonance: bool,
    pub final_resonance_text: Option<String>,
    pub final_resonance_percentage: Option<i16>,
    pub final_gifts_received: Vec<GiftRef>,
    pub final_reflection_text: Option<String>,
    pub has_given_final_gift: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Player {
    pub fn is_spectator(&self) -> bool {
        self.role == PlayerRole::Spectator
    }

    /// Display name: the check-in nickname when chosen, else the join name.
    pub fn display_name(&self) -> &str {
        self.preferred_name.as_deref().unwrap_or(&self.name)
    }
}

impl TryFrom<players::Model> for Player {
    type Error = DomainError;

    fn try_from(model: players::Model) -> Result<Self, Self::Error> {
        let hand = parse_cards(&model.hand, "hand")?;
        let final_gifts_received: Vec<GiftRef> =
            serde_json::from_value(model.final_gifts_received.clone()).map_err(|e| {
                DomainError::infra(
                    InfraErrorKind::DataCorruption,
                    format!("player field 'final_gifts_received' is malformed: {e}"),
                )
            })?;
        Ok(Player {
            id: model.id,
            room_id: model.room_id,
            player_number: model.player_number,
            name: model.name,
            preferred_name: model.preferred_name,
            role: model.role,
            hand,
            is_connected: model.is_connected,
            has_checked_in: model.has_checked_in,
            ready_for_next_phase: model.ready_for_next_phase,
            has_shared_final_resonance: model.has_shared_final_resonance,
            final_resonance_text: model.final_resonance_text,
            final_resonance_percentage: model.final_resonance_percentage,
            final_gifts_received,
            final_reflection_text: model.final_reflection_text,
            has_given_final_gift: model.has_given_final_gift,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Option<Player>, DomainError> {
    let player = players_adapter::find_by_id(conn, player_id).await?;
    player.map(Player::try_from).transpose()
}

pub async fn require_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Player, DomainError> {
    let player = players_adapter::require_player(conn, player_id).await?;
    Player::try_from(player)
}

pub async fn find_all_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<Player>, DomainError> {
    let players = players_adapter::find_all_by_room(conn, room_id).await?;
    players.into_iter().map(Player::try_from).collect()
}

/// Active (seated) players in seat order.
pub async fn find_active_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<Player>, DomainError> {
    let players = players_adapter::find_active_by_room(conn, room_id).await?;
    players.into_iter().map(Player::try_from).collect()
}

/// Active players under exclusive row locks, for card-mutating transactions.
pub async fn lock_active_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<Player>, DomainError> {
    let players = players_adapter::lock_active_by_room(conn, room_id).await?;
    players.into_iter().map(Player::try_from).collect()
}

pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerCreate,
) -> Result<Player, DomainError> {
    let player = players_adapter::create_player(conn, dto).await?;
    Player::try_from(player)
}

pub async fn update_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerUpdate,
) -> Result<Player, DomainError> {
    let player = players_adapter::update_player(conn, dto).await?;
    Player::try_from(player)
}

pub async fn reset_ready_flags<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<(), DomainError> {
    Ok(players_adapter::reset_ready_flags(conn, room_id).await?)
}

pub async fn reset_gift_flags<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<(), DomainError> {
    Ok(players_adapter::reset_gift_flags(conn, room_id).await?)
}

/// Serialize gift refs back into the JSON column shape.
pub fn gifts_to_json(gifts: &[GiftRef]) -> serde_json::Value {
    serde_json::json!(gifts)
}

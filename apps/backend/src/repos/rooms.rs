//! Room repository functions for the domain layer.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::rooms_sea as rooms_adapter;
use crate::adapters::rooms_sea::{RoomCreate, RoomStatusTransition, RoomUpdate};
use crate::domain::flow::VOTING_COUNTDOWN_SECS;
use crate::entities::rooms;
use crate::entities::rooms::{FinalPhaseStep, RoomStatus};
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Room domain model.
///
/// Converted from the database model when loaded through repo functions;
/// card containers are parsed out of their JSON columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: i64,
    pub join_code: String,
    pub status: RoomStatus,
    pub purpose_card: Option<String>,
    pub card_options: Vec<String>,
    pub voting_started_at: Option<OffsetDateTime>,
    pub current_turn_player: i16,
    pub current_exchange_turn: i16,
    pub final_phase_turn: i16,
    pub final_phase_step: FinalPhaseStep,
    pub round_number: i16,
    pub exchange_completed: bool,
    pub deck: Vec<String>,
    pub discard_pile: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub lock_version: i32,
}

impl Room {
    /// Whether the shared vote countdown has expired at `now`.
    pub fn voting_expired(&self, now: OffsetDateTime) -> bool {
        match self.voting_started_at {
            Some(started) => (now - started).whole_seconds() >= VOTING_COUNTDOWN_SECS,
            None => false,
        }
    }
}

pub(crate) fn parse_cards(value: &serde_json::Value, field: &str) -> Result<Vec<String>, DomainError> {
    serde_json::from_value(value.clone()).map_err(|e| {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("room field '{field}' is not a card list: {e}"),
        )
    })
}

impl TryFrom<rooms::Model> for Room {
    type Error = DomainError;

    fn try_from(model: rooms::Model) -> Result<Self, Self::Error> {
        let card_options = parse_cards(&model.card_options, "card_options")?;
        let deck = parse_cards(&model.deck, "deck")?;
        let discard_pile = parse_cards(&model.discard_pile, "discard_pile")?;
        Ok(Room {
            id: model.id,
            join_code: model.join_code,
            status: model.status,
            purpose_card: model.purpose_card,
            card_options,
            voting_started_at: model.voting_started_at,
            current_turn_player: model.current_turn_player,
            current_exchange_turn: model.current_exchange_turn,
            final_phase_turn: model.final_phase_turn,
            final_phase_step: model.final_phase_step,
            round_number: model.round_number,
            exchange_completed: model.exchange_completed,
            deck,
            discard_pile,
            created_at: model.created_at,
            updated_at: model.updated_at,
            lock_version: model.lock_version,
        })
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Option<Room>, DomainError> {
    let room = rooms_adapter::find_by_id(conn, room_id).await?;
    room.map(Room::try_from).transpose()
}

pub async fn require_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Room, DomainError> {
    let room = rooms_adapter::require_room(conn, room_id).await?;
    Room::try_from(room)
}

/// Load the room under an exclusive row lock.
pub async fn lock_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Room, DomainError> {
    let room = rooms_adapter::lock_room(conn, room_id).await?;
    Room::try_from(room)
}

pub async fn find_by_join_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    join_code: &str,
) -> Result<Option<Room>, DomainError> {
    let room = rooms_adapter::find_by_join_code(conn, join_code).await?;
    room.map(Room::try_from).transpose()
}

pub async fn create_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoomCreate,
) -> Result<Room, DomainError> {
    let room = rooms_adapter::create_room(conn, dto).await?;
    Room::try_from(room)
}

pub async fn update_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoomUpdate,
) -> Result<Room, DomainError> {
    let room = rooms_adapter::update_room(conn, dto).await?;
    Room::try_from(room)
}

/// Apply a status-conditional transition; `Ok(None)` is a lost race.
pub async fn transition_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoomStatusTransition,
) -> Result<Option<Room>, DomainError> {
    let room = rooms_adapter::transition_status(conn, dto).await?;
    room.map(Room::try_from).transpose()
}

pub async fn set_voting_started_at_if_unset<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    at: OffsetDateTime,
) -> Result<bool, DomainError> {
    Ok(rooms_adapter::set_voting_started_at_if_unset(conn, room_id, at).await?)
}

pub async fn find_by_statuses<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    statuses: &[RoomStatus],
) -> Result<Vec<Room>, DomainError> {
    let rooms = rooms_adapter::find_by_statuses(conn, statuses).await?;
    rooms.into_iter().map(Room::try_from).collect()
}

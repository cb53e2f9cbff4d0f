//! Room creation, joining, check-in, and the initial resonance round.

use sea_orm::DatabaseTransaction;
use tracing::{debug, info};

use super::{require_active, RoomFlowService};
use crate::adapters::players_sea::{PlayerCreate, PlayerUpdate};
use crate::adapters::rooms_sea::{RoomCreate, RoomUpdate};
use crate::domain::dealing::{entropy_seed, shuffled_deck};
use crate::domain::flow::{resonance_quorum_met, PLAYERS, SPECTATOR_SEAT};
use crate::entities::players::PlayerRole;
use crate::entities::resonance_shares::ResonancePhase;
use crate::entities::rooms::RoomStatus;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::repos::players::Player;
use crate::repos::rooms::Room;
use crate::repos::{players, resonance, rooms};
use crate::utils::join_code::generate_join_code;

const JOIN_CODE_ATTEMPTS: usize = 3;

impl RoomFlowService {
    /// Create a room with a freshly shuffled deck and seat the creator at 0.
    pub async fn create_room(
        &self,
        txn: &DatabaseTransaction,
        creator_name: String,
    ) -> Result<(Room, Player), AppError> {
        let deck = shuffled_deck(entropy_seed())?;

        let mut created = None;
        for _attempt in 0..JOIN_CODE_ATTEMPTS {
            let join_code = generate_join_code();
            if rooms::find_by_join_code(txn, &join_code).await?.is_some() {
                continue;
            }
            created = Some(
                rooms::create_room(
                    txn,
                    RoomCreate {
                        join_code,
                        deck: deck.clone(),
                    },
                )
                .await?,
            );
            break;
        }
        let room = created.ok_or_else(|| {
            DomainError::conflict(
                ConflictKind::JoinCodeConflict,
                "Could not allocate a unique join code",
            )
        })?;

        let player = players::create_player(
            txn,
            PlayerCreate {
                room_id: room.id,
                player_number: 0,
                name: creator_name,
                role: PlayerRole::Player,
            },
        )
        .await?;

        info!(room_id = room.id, join_code = %room.join_code, "Room created");
        Ok((room, player))
    }

    /// Join a room by its code.
    ///
    /// While the room is waiting and a seat is free the joiner becomes an
    /// active player on the lowest free seat; everyone else joins as a
    /// spectator. The fourth seat filling triggers the check-in transition.
    pub async fn join_room(
        &self,
        txn: &DatabaseTransaction,
        join_code: &str,
        name: String,
    ) -> Result<(Room, Player), AppError> {
        let room = rooms::find_by_join_code(txn, join_code)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Room, format!("No room for code {join_code}"))
            })?;

        // Lock the room row so two simultaneous joins cannot claim one seat.
        let room = rooms::lock_room(txn, room.id).await?;

        let existing = players::find_active_by_room(txn, room.id).await?;
        let seat = if room.status == RoomStatus::Waiting {
            lowest_free_seat(&existing)
        } else {
            None
        };

        let (player_number, role) = match seat {
            Some(seat) => (seat, PlayerRole::Player),
            None => (SPECTATOR_SEAT, PlayerRole::Spectator),
        };

        let player = players::create_player(
            txn,
            PlayerCreate {
                room_id: room.id,
                player_number,
                name,
                role,
            },
        )
        .await?;

        debug!(
            room_id = room.id,
            player_id = player.id,
            player_number,
            ?role,
            "Player joined"
        );

        self.process_room_state(txn, room.id).await?;
        let room = rooms::require_room(txn, room.id).await?;
        Ok((room, player))
    }

    /// Reconnection: flip the liveness flag back on. Players are never
    /// deleted during a game; disconnection only clears `is_connected`.
    pub async fn set_connected(
        &self,
        txn: &DatabaseTransaction,
        player_id: i64,
        connected: bool,
    ) -> Result<(), AppError> {
        players::update_player(
            txn,
            PlayerUpdate::new(player_id).with_is_connected(connected),
        )
        .await?;
        Ok(())
    }

    /// Check in for the game, optionally choosing a nickname.
    pub async fn check_in(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
        preferred_name: Option<String>,
    ) -> Result<(), AppError> {
        let room = rooms::require_room(txn, room_id).await?;
        if room.status != RoomStatus::Checkin {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Not in the check-in phase",
            )
            .into());
        }

        let player = players::require_player(txn, player_id).await?;
        require_active(&player, room_id)?;

        let mut update = PlayerUpdate::new(player_id).with_has_checked_in(true);
        if let Some(name) = preferred_name {
            update = update.with_preferred_name(name);
        }
        players::update_player(txn, update).await?;
        info!(room_id, player_id, "Player checked in");

        self.process_room_state(txn, room_id).await?;
        Ok(())
    }

    /// Submit the initial resonance percentage (upsert; resubmission
    /// overwrites).
    pub async fn share_initial_resonance(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
        percentage: i16,
    ) -> Result<(), AppError> {
        let room = rooms::require_room(txn, room_id).await?;
        if room.status != RoomStatus::ResonanceInitial {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Not in the initial resonance phase",
            )
            .into());
        }

        let player = players::require_player(txn, player_id).await?;
        require_active(&player, room_id)?;
        validate_percentage(percentage)?;

        resonance::upsert_share(txn, room_id, player_id, ResonancePhase::Initial, percentage)
            .await?;
        debug!(room_id, player_id, percentage, "Initial resonance shared");

        rooms::update_room(txn, RoomUpdate::new(room_id, room.lock_version)).await?;
        Ok(())
    }

    /// Mark this player ready to leave the initial resonance phase. Once all
    /// active players are ready the phase exits.
    pub async fn mark_ready(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
    ) -> Result<(), AppError> {
        let room = rooms::require_room(txn, room_id).await?;
        if room.status != RoomStatus::ResonanceInitial {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Not in the initial resonance phase",
            )
            .into());
        }

        let player = players::require_player(txn, player_id).await?;
        require_active(&player, room_id)?;

        players::update_player(
            txn,
            PlayerUpdate::new(player_id).with_ready_for_next_phase(true),
        )
        .await?;
        debug!(room_id, player_id, "Player ready for next phase");

        self.process_room_state(txn, room_id).await?;
        Ok(())
    }

    /// Seat-0 fast path: force the exit from the initial resonance phase
    /// once at least 75% of active players have submitted a share, so one
    /// absent player cannot stall the room indefinitely.
    pub async fn force_begin_playing(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
    ) -> Result<(), AppError> {
        let room = rooms::require_room(txn, room_id).await?;
        if room.status != RoomStatus::ResonanceInitial {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Not in the initial resonance phase",
            )
            .into());
        }

        let player = players::require_player(txn, player_id).await?;
        let seat = require_active(&player, room_id)?;
        if seat != 0 {
            return Err(DomainError::validation(
                ValidationKind::OutOfTurn,
                "Only seat 0 may force the transition",
            )
            .into());
        }

        let active = players::find_active_by_room(txn, room_id).await?;
        let shares =
            resonance::find_by_room_and_phase(txn, room_id, ResonancePhase::Initial).await?;
        if !resonance_quorum_met(shares.len(), active.len()) {
            return Err(DomainError::validation(
                ValidationKind::Other("RESONANCE_QUORUM".into()),
                "Fewer than 75% of players have shared",
            )
            .into());
        }

        self.begin_playing(txn, &room).await?;
        Ok(())
    }
}

fn lowest_free_seat(active: &[Player]) -> Option<i16> {
    (0..PLAYERS as i16).find(|seat| !active.iter().any(|p| p.player_number == *seat))
}

pub(super) fn validate_percentage(percentage: i16) -> Result<(), DomainError> {
    if !(0..=100).contains(&percentage) {
        return Err(DomainError::validation(
            ValidationKind::InvalidPercentage,
            format!("Percentage {percentage} is outside 0..=100"),
        ));
    }
    Ok(())
}

//! Final phase: per-seat sharing, message gifts, and reflection.
//!
//! Internally driven by `final_phase_turn` (0..=3) and `final_phase_step`
//! (sharing -> gifting -> reflection). Seat 3's reflection completes the
//! room. All step advances run under the room row lock so two gifts landing
//! together cannot both conclude the gifting step.

use sea_orm::DatabaseTransaction;
use tracing::{debug, info};

use super::membership::validate_percentage;
use super::{require_active, RoomFlowService};
use crate::adapters::players_sea::PlayerUpdate;
use crate::adapters::rooms_sea::{RoomStatusTransition, RoomUpdate};
use crate::domain::flow::{advance_final_turn, FinalAdvance};
use crate::entities::resonance_shares::ResonancePhase;
use crate::entities::rooms::{FinalPhaseStep, RoomStatus};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::players::{gifts_to_json, GiftRef};
use crate::repos::rooms::Room;
use crate::repos::{gifts, players, resonance, rooms};

impl RoomFlowService {
    /// The turn player shares their final resonance percentage and text,
    /// advancing the step to gifting.
    pub async fn share_final_resonance(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
        percentage: i16,
        text: String,
    ) -> Result<(), AppError> {
        debug!(room_id, player_id, percentage, "Sharing final resonance");

        let room = rooms::lock_room(txn, room_id).await?;
        require_final_phase(&room)?;
        require_step(&room, FinalPhaseStep::Sharing)?;

        let player = players::require_player(txn, player_id).await?;
        let seat = require_active(&player, room_id)?;
        if seat != room.final_phase_turn {
            return Err(DomainError::validation(
                ValidationKind::OutOfTurn,
                format!("It is seat {}'s turn to share", room.final_phase_turn),
            )
            .into());
        }
        validate_percentage(percentage)?;

        resonance::upsert_share(txn, room_id, player_id, ResonancePhase::Final, percentage)
            .await?;
        players::update_player(
            txn,
            PlayerUpdate::new(player_id)
                .with_has_shared_final_resonance(true)
                .with_final_resonance_percentage(percentage)
                .with_final_resonance_text(text),
        )
        .await?;

        rooms::update_room(
            txn,
            RoomUpdate::new(room_id, room.lock_version)
                .with_final_phase_step(FinalPhaseStep::Gifting),
        )
        .await?;

        info!(room_id, player_id, seat, "Final resonance shared");
        Ok(())
    }

    /// Send a message gift to the current turn player. The third distinct
    /// gift advances the step to reflection.
    pub async fn give_final_gift(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        from_player_id: i64,
        message: String,
    ) -> Result<(), AppError> {
        debug!(room_id, from_player_id, "Giving final gift");

        let room = rooms::lock_room(txn, room_id).await?;
        require_final_phase(&room)?;
        require_step(&room, FinalPhaseStep::Gifting)?;

        let message = message.trim().to_string();
        if message.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::EmptyMessage,
                "Gift message must not be empty",
            )
            .into());
        }

        let active = players::find_active_by_room(txn, room_id).await?;
        let recipient = active
            .iter()
            .find(|p| p.player_number == room.final_phase_turn)
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Player,
                    format!("No player at seat {}", room.final_phase_turn),
                )
            })?
            .clone();

        let sender = players::require_player(txn, from_player_id).await?;
        require_active(&sender, room_id)?;
        if sender.id == recipient.id {
            return Err(DomainError::validation(
                ValidationKind::SelfGift,
                "Players cannot gift themselves",
            )
            .into());
        }
        if sender.has_given_final_gift {
            return Err(DomainError::validation(
                ValidationKind::AlreadyGifted,
                "Player already gave a gift this turn",
            )
            .into());
        }

        gifts::create_gift(txn, room_id, sender.id, recipient.id, message.clone()).await?;

        let mut received = recipient.final_gifts_received.clone();
        received.push(GiftRef {
            from_player_id: sender.id,
            from_player_name: sender.display_name().to_string(),
            message,
        });
        players::update_player(
            txn,
            PlayerUpdate::new(recipient.id).with_final_gifts_received(gifts_to_json(&received)),
        )
        .await?;
        players::update_player(
            txn,
            PlayerUpdate::new(sender.id).with_has_given_final_gift(true),
        )
        .await?;

        // All active players except the recipient have now gifted?
        let givers = active
            .iter()
            .filter(|p| p.id != recipient.id)
            .filter(|p| p.id == sender.id || p.has_given_final_gift)
            .count();
        let expected = active.len().saturating_sub(1);

        let mut update = RoomUpdate::new(room_id, room.lock_version);
        if givers >= expected {
            update = update.with_final_phase_step(FinalPhaseStep::Reflection);
            info!(room_id, "All gifts given, step advances to reflection");
        }
        rooms::update_room(txn, update).await?;

        info!(
            room_id,
            from_player_id,
            to_player_id = recipient.id,
            "Gift recorded"
        );
        Ok(())
    }

    /// The turn player submits their reflection. Seat 3 completes the room;
    /// any other seat rotates the final-phase turn and resets gift flags.
    pub async fn submit_reflection(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
        text: String,
    ) -> Result<(), AppError> {
        debug!(room_id, player_id, "Submitting reflection");

        let room = rooms::lock_room(txn, room_id).await?;
        require_final_phase(&room)?;
        require_step(&room, FinalPhaseStep::Reflection)?;

        let player = players::require_player(txn, player_id).await?;
        let seat = require_active(&player, room_id)?;
        if seat != room.final_phase_turn {
            return Err(DomainError::validation(
                ValidationKind::OutOfTurn,
                format!("It is seat {}'s turn to reflect", room.final_phase_turn),
            )
            .into());
        }

        players::update_player(
            txn,
            PlayerUpdate::new(player_id).with_final_reflection_text(text),
        )
        .await?;

        match advance_final_turn(seat) {
            FinalAdvance::Complete => {
                self.try_transition(
                    txn,
                    RoomStatusTransition::new(room_id, room.status, RoomStatus::Completed),
                )
                .await?;
                info!(room_id, "Final reflection by last seat, room completed");
            }
            FinalAdvance::NextSeat(next) => {
                rooms::update_room(
                    txn,
                    RoomUpdate::new(room_id, room.lock_version)
                        .with_final_phase_turn(next)
                        .with_final_phase_step(FinalPhaseStep::Sharing),
                )
                .await?;
                players::reset_gift_flags(txn, room_id).await?;
                info!(room_id, next_seat = next, "Final phase turn advances");
            }
        }

        Ok(())
    }
}

fn require_final_phase(room: &Room) -> Result<(), DomainError> {
    if !room.status.is_final_phase() {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Not in the final phase",
        ));
    }
    Ok(())
}

fn require_step(room: &Room, step: FinalPhaseStep) -> Result<(), DomainError> {
    if room.final_phase_step != step {
        return Err(DomainError::validation(
            ValidationKind::WrongStep,
            format!(
                "Final phase is in the {:?} step, not {:?}",
                room.final_phase_step, step
            ),
        ));
    }
    Ok(())
}

//! Theme voting: casting and resolution.

use sea_orm::DatabaseTransaction;
use tracing::{debug, info};

use super::{require_active, RoomFlowService, TransitionOutcome};
use crate::adapters::players_sea::PlayerUpdate;
use crate::adapters::rooms_sea::{RoomStatusTransition, RoomUpdate};
use crate::domain::dealing::deal_initial_hands;
use crate::entities::rooms::RoomStatus;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::{players, rooms, votes};

impl RoomFlowService {
    /// Cast a theme vote for one of the room's card options.
    ///
    /// Votes are immutable; a second cast is a conflict. If this vote
    /// satisfies a resolution condition the same transaction resolves the
    /// phase.
    pub async fn cast_vote(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
        card_index: i16,
    ) -> Result<(), AppError> {
        debug!(room_id, player_id, card_index, "Casting vote");

        let room = rooms::require_room(txn, room_id).await?;
        if room.status != RoomStatus::Voting {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Not in the voting phase",
            )
            .into());
        }

        let player = players::require_player(txn, player_id).await?;
        require_active(&player, room_id)?;

        let card_text = room
            .card_options
            .get(card_index as usize)
            .cloned()
            .filter(|_| card_index >= 0)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::InvalidCardIndex,
                    format!(
                        "Card index {card_index} is outside the {} options",
                        room.card_options.len()
                    ),
                )
            })?;

        if votes::find_by_room_and_player(txn, room_id, player_id)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                ConflictKind::VoteAlreadyCast,
                "Player already voted this round",
            )
            .into());
        }

        votes::create_vote(txn, room_id, player_id, card_index, card_text).await?;
        info!(room_id, player_id, card_index, "Vote persisted");

        // Bump the room version so watchers refetch the tally.
        rooms::update_room(txn, RoomUpdate::new(room_id, room.lock_version)).await?;

        self.process_room_state(txn, room_id).await?;
        Ok(())
    }

    /// Resolve the vote to `winner` and set up play.
    ///
    /// One conditional update guarded on `status = voting` writes the purpose
    /// card, the post-deal deck, and the cleared discard pile; hands land on
    /// the player rows only when this writer wins the race, all in the same
    /// transaction.
    pub(super) async fn resolve_voting(
        &self,
        txn: &DatabaseTransaction,
        room: &rooms::Room,
        winner: usize,
    ) -> Result<TransitionOutcome, AppError> {
        let purpose_card = room.card_options.get(winner).cloned().ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidCardIndex,
                format!("Winning index {winner} is outside the card options"),
            )
        })?;

        let dealt = deal_initial_hands(&room.deck)?;

        let outcome = self
            .try_transition(
                txn,
                RoomStatusTransition::new(room.id, RoomStatus::Voting, RoomStatus::VotingResult)
                    .with_purpose_card(purpose_card.clone())
                    .with_deck(dealt.remainder.clone())
                    .with_discard_pile(Vec::new()),
            )
            .await?;

        if outcome == TransitionOutcome::Lost {
            // Another client resolved first; its deal stands.
            return Ok(outcome);
        }

        let active = players::find_active_by_room(txn, room.id).await?;
        for player in &active {
            let seat = player.player_number as usize;
            let hand = dealt
                .hands
                .get(seat)
                .cloned()
                .ok_or_else(|| AppError::internal(format!("no dealt hand for seat {seat}")))?;
            players::update_player(txn, PlayerUpdate::new(player.id).with_hand(hand)).await?;
        }

        info!(
            room_id = room.id,
            purpose_card, "Vote resolved, hands dealt"
        );
        Ok(outcome)
    }
}

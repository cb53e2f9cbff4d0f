//! Automatic phase transitions.
//!
//! Any request (or sweeper tick) that observes a phase's exit condition
//! attempts the transition as a status-conditional update. Losing the race
//! to another writer is success, not failure: the observed condition was
//! handled, just not by us. This is the only concurrency-control idiom
//! protecting against duplicate transitions.

use rand::seq::SliceRandom;
use sea_orm::DatabaseTransaction;
use tracing::{debug, info};

use super::RoomFlowService;
use crate::adapters::rooms_sea::RoomStatusTransition;
use crate::domain::cards::THEME_CARDS;
use crate::domain::flow::{
    playing_transition, PlayTransition, CARD_OPTION_COUNT, EXCHANGE_PAUSE_SECS, PLAYERS,
    VOTING_RESULT_PAUSE_SECS,
};
use crate::domain::voting as voting_rules;
use crate::entities::rooms::{FinalPhaseStep, RoomStatus};
use crate::error::AppError;
use crate::repos::{players, rooms, votes};

/// Result of one conditional transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// This writer applied the transition.
    Applied,
    /// Another writer already transitioned; treated as success.
    Lost,
}

impl RoomFlowService {
    /// Attempt a status-conditional transition, logging the outcome.
    pub(super) async fn try_transition(
        &self,
        txn: &DatabaseTransaction,
        dto: RoomStatusTransition,
    ) -> Result<TransitionOutcome, AppError> {
        let room_id = dto.id;
        let from = dto.from;
        let to = dto.to;
        match rooms::transition_status(txn, dto).await? {
            Some(_) => {
                debug!(room_id, ?from, ?to, "Transition applied");
                Ok(TransitionOutcome::Applied)
            }
            None => {
                // Zero rows affected: another client already transitioned.
                debug!(room_id, ?from, ?to, "Transition lost to another writer");
                Ok(TransitionOutcome::Lost)
            }
        }
    }

    /// Process room state after any action or timer tick.
    ///
    /// Checks whether the current status has a satisfied exit condition,
    /// applies it, and loops until the room settles. Returns `true` when at
    /// least one transition was applied by this writer.
    pub async fn process_room_state(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
    ) -> Result<bool, AppError> {
        // The status machine is linear; a single pass can cascade at most a
        // handful of transitions (e.g. fourth join -> checkin). The guard
        // catches a cycle bug, not real traffic.
        const MAX_ITERATIONS: usize = 8;

        let mut changed = false;

        for _iteration in 0..MAX_ITERATIONS {
            let room = rooms::require_room(txn, room_id).await?;
            if room.status.is_terminal() {
                return Ok(changed);
            }

            let applied = self.check_and_apply_transition(txn, &room).await?;
            if applied {
                changed = true;
                continue;
            }
            return Ok(changed);
        }

        Err(AppError::internal(
            "process_room_state exceeded maximum iterations",
        ))
    }

    /// Check whether the room's current status has a satisfied exit
    /// condition and apply it. Returns true if a transition was applied.
    async fn check_and_apply_transition(
        &self,
        txn: &DatabaseTransaction,
        room: &rooms::Room,
    ) -> Result<bool, AppError> {
        let now = time::OffsetDateTime::now_utc();

        match room.status {
            RoomStatus::Waiting => {
                // Fourth active player seated -> check-in begins.
                let active = players::find_active_by_room(txn, room.id).await?;
                if active.len() == PLAYERS {
                    let outcome = self
                        .try_transition(
                            txn,
                            RoomStatusTransition::new(
                                room.id,
                                RoomStatus::Waiting,
                                RoomStatus::Checkin,
                            ),
                        )
                        .await?;
                    if outcome == TransitionOutcome::Applied {
                        info!(room_id = room.id, "Room filled, check-in begins");
                    }
                    return Ok(true);
                }
            }
            RoomStatus::Checkin => {
                // All active players checked in -> voting begins; the same
                // write fixes the theme options and the countdown anchor.
                let active = players::find_active_by_room(txn, room.id).await?;
                if active.len() == PLAYERS && active.iter().all(|p| p.has_checked_in) {
                    let options = pick_theme_options();
                    let outcome = self
                        .try_transition(
                            txn,
                            RoomStatusTransition::new(
                                room.id,
                                RoomStatus::Checkin,
                                RoomStatus::Voting,
                            )
                            .with_card_options(options)
                            .with_voting_started_at(now),
                        )
                        .await?;
                    if outcome == TransitionOutcome::Applied {
                        info!(room_id = room.id, "All checked in, voting begins");
                    }
                    return Ok(true);
                }
            }
            RoomStatus::Voting => {
                // The countdown anchor is normally written by the checkin
                // transition; if absent, the first observer sets it and
                // later writers no-op.
                if room.voting_started_at.is_none() {
                    let set = rooms::set_voting_started_at_if_unset(txn, room.id, now).await?;
                    if set {
                        debug!(room_id = room.id, "Voting countdown anchored");
                    }
                    return Ok(true);
                }

                let active = players::find_active_by_room(txn, room.id).await?;
                let all_votes = votes::find_all_by_room(txn, room.id).await?;
                let indexes: Vec<i16> = all_votes.iter().map(|v| v.card_index).collect();
                let expired = room.voting_expired(now);
                if let Some(winner) = voting_rules::resolution(
                    &indexes,
                    room.card_options.len(),
                    active.len(),
                    expired,
                ) {
                    self.resolve_voting(txn, room, winner).await?;
                    return Ok(true);
                }
            }
            RoomStatus::VotingResult => {
                // Display-only pause, then on to the initial resonance round.
                if elapsed_secs(room.updated_at, now) >= VOTING_RESULT_PAUSE_SECS {
                    self.try_transition(
                        txn,
                        RoomStatusTransition::new(
                            room.id,
                            RoomStatus::VotingResult,
                            RoomStatus::ResonanceInitial,
                        ),
                    )
                    .await?;
                    return Ok(true);
                }
            }
            RoomStatus::ResonanceInitial => {
                let active = players::find_active_by_room(txn, room.id).await?;
                if active.len() == PLAYERS && active.iter().all(|p| p.ready_for_next_phase) {
                    self.begin_playing(txn, room).await?;
                    return Ok(true);
                }
            }
            RoomStatus::Playing => {
                match playing_transition(room.round_number, room.exchange_completed) {
                    Some(PlayTransition::EnterExchange) => {
                        let outcome = self
                            .try_transition(
                                txn,
                                RoomStatusTransition::new(
                                    room.id,
                                    RoomStatus::Playing,
                                    RoomStatus::Exchange,
                                )
                                .with_current_exchange_turn(0),
                            )
                            .await?;
                        if outcome == TransitionOutcome::Applied {
                            info!(room_id = room.id, "Entering exchange interlude");
                        }
                        return Ok(true);
                    }
                    Some(PlayTransition::EnterFinalResonance) => {
                        let outcome = self
                            .try_transition(
                                txn,
                                RoomStatusTransition::new(
                                    room.id,
                                    RoomStatus::Playing,
                                    RoomStatus::ResonanceFinal,
                                )
                                .with_final_phase_turn(0)
                                .with_final_phase_step(FinalPhaseStep::Sharing),
                            )
                            .await?;
                        if outcome == TransitionOutcome::Applied {
                            info!(room_id = room.id, "Entering final resonance phase");
                        }
                        return Ok(true);
                    }
                    None => {}
                }
            }
            RoomStatus::Exchange => {
                // After the last seat acts the turn counter reads 4; a short
                // pause lets clients show the transition screen first.
                if room.current_exchange_turn >= PLAYERS as i16
                    && elapsed_secs(room.updated_at, now) >= EXCHANGE_PAUSE_SECS
                {
                    let outcome = self
                        .try_transition(
                            txn,
                            RoomStatusTransition::new(
                                room.id,
                                RoomStatus::Exchange,
                                RoomStatus::Playing,
                            )
                            .with_current_exchange_turn(0)
                            .with_exchange_completed(true),
                        )
                        .await?;
                    if outcome == TransitionOutcome::Applied {
                        info!(room_id = room.id, "Exchange complete, play resumes");
                    }
                    return Ok(true);
                }
            }
            RoomStatus::ResonanceFinal | RoomStatus::GiftExchange => {
                // Step/turn progression is driven by the final-phase actions.
            }
            RoomStatus::Completed => {}
        }

        Ok(false)
    }

    /// All ready: reset the per-phase flags and start normal play.
    pub(super) async fn begin_playing(
        &self,
        txn: &DatabaseTransaction,
        room: &rooms::Room,
    ) -> Result<TransitionOutcome, AppError> {
        let outcome = self
            .try_transition(
                txn,
                RoomStatusTransition::new(
                    room.id,
                    RoomStatus::ResonanceInitial,
                    RoomStatus::Playing,
                ),
            )
            .await?;
        if outcome == TransitionOutcome::Applied {
            players::reset_ready_flags(txn, room.id).await?;
            info!(room_id = room.id, "Resonance shared, play begins");
        }
        Ok(outcome)
    }
}

fn elapsed_secs(since: time::OffsetDateTime, now: time::OffsetDateTime) -> i64 {
    (now - since).whole_seconds()
}

/// Fixed-size random selection of theme candidates for the vote.
fn pick_theme_options() -> Vec<String> {
    let mut rng = rand::rng();
    let mut themes: Vec<&str> = THEME_CARDS.to_vec();
    themes.shuffle(&mut rng);
    themes
        .into_iter()
        .take(CARD_OPTION_COUNT)
        .map(|s| s.to_string())
        .collect()
}

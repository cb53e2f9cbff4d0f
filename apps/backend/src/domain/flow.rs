//! Seat math and the pure transition rules of the room state machine.
//!
//! These live in `domain` so every layer (services, repos, routes, sweeper)
//! shares a single source of truth for rotation and "what happens next".

use crate::entities::rooms::FinalPhaseStep;

/// Number of active seats in a room.
pub const PLAYERS: usize = 4;

/// Sentinel seat number for spectators.
pub const SPECTATOR_SEAT: i16 = -1;

/// Cards dealt to each seat at the start of play.
pub const INITIAL_HAND_SIZE: usize = 3;

/// Theme candidates put up for the vote.
pub const CARD_OPTION_COUNT: usize = 3;

/// Shared vote countdown, anchored at `voting_started_at`.
pub const VOTING_COUNTDOWN_SECS: i64 = 180;

/// Display pause on the voting result screen before play setup continues.
pub const VOTING_RESULT_PAUSE_SECS: i64 = 3;

/// Display pause after the last exchange turn before play resumes.
pub const EXCHANGE_PAUSE_SECS: i64 = 3;

/// Round (0-based wrap count) whose entry triggers the exchange interlude.
pub const EXCHANGE_ENTRY_ROUND: i16 = 3;

/// Round whose entry, after the exchange, triggers the final phase.
pub const FINAL_ENTRY_ROUND: i16 = 5;

/// Target size for the replenish-discard-pile repair operation.
pub const REPLENISH_TARGET: usize = 12;

/// Returns the next seat clockwise (0 → 1 → 2 → 3 → 0).
#[inline]
pub fn next_seat(seat: i16) -> i16 {
    (seat + 1).rem_euclid(PLAYERS as i16)
}

/// Whether a seat number denotes an active player.
#[inline]
pub fn is_active_seat(seat: i16) -> bool {
    (0..PLAYERS as i16).contains(&seat)
}

/// Result of advancing the normal-play turn after a discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAdvance {
    pub next_turn: i16,
    pub round_number: i16,
}

/// Advance `current_turn_player`; the round counter bumps when play wraps
/// back to seat 0.
pub fn advance_turn(current_turn: i16, round_number: i16) -> TurnAdvance {
    let next_turn = next_seat(current_turn);
    let round_number = if next_turn == 0 {
        round_number + 1
    } else {
        round_number
    };
    TurnAdvance {
        next_turn,
        round_number,
    }
}

/// Phase change owed when normal play enters a new round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayTransition {
    EnterExchange,
    EnterFinalResonance,
}

/// Evaluate the round-based exits from the `playing` status.
///
/// The comparison is `>=` rather than `==` so a missed evaluation (e.g. a
/// crashed writer) is repaired by the next one instead of stalling the room.
pub fn playing_transition(round_number: i16, exchange_completed: bool) -> Option<PlayTransition> {
    if !exchange_completed && round_number >= EXCHANGE_ENTRY_ROUND {
        return Some(PlayTransition::EnterExchange);
    }
    if exchange_completed && round_number >= FINAL_ENTRY_ROUND {
        return Some(PlayTransition::EnterFinalResonance);
    }
    None
}

/// What follows a completed `reflection` step for the given seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalAdvance {
    /// Move to the next seat, step resets to sharing.
    NextSeat(i16),
    /// Seat 3 finished; the room is complete.
    Complete,
}

pub fn advance_final_turn(turn: i16) -> FinalAdvance {
    if turn >= PLAYERS as i16 - 1 {
        FinalAdvance::Complete
    } else {
        FinalAdvance::NextSeat(turn + 1)
    }
}

/// Step order within one seat's final-phase turn.
pub fn next_final_step(step: FinalPhaseStep) -> FinalPhaseStep {
    match step {
        FinalPhaseStep::Sharing => FinalPhaseStep::Gifting,
        FinalPhaseStep::Gifting => FinalPhaseStep::Reflection,
        FinalPhaseStep::Reflection => FinalPhaseStep::Sharing,
    }
}

/// Seat-0 fast path: the initial resonance phase may be forced once at
/// least 75% of active players have submitted a share.
pub fn resonance_quorum_met(shares: usize, active: usize) -> bool {
    active > 0 && shares * 4 >= active * 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_cycles_and_round_bumps_on_wrap() {
        assert_eq!(
            advance_turn(0, 0),
            TurnAdvance {
                next_turn: 1,
                round_number: 0
            }
        );
        assert_eq!(
            advance_turn(3, 0),
            TurnAdvance {
                next_turn: 0,
                round_number: 1
            }
        );
        assert_eq!(
            advance_turn(3, 4),
            TurnAdvance {
                next_turn: 0,
                round_number: 5
            }
        );
    }

    #[test]
    fn exchange_entry_fires_once_at_round_three() {
        assert_eq!(playing_transition(2, false), None);
        assert_eq!(
            playing_transition(3, false),
            Some(PlayTransition::EnterExchange)
        );
        // After the exchange completes, round 3 and 4 keep playing.
        assert_eq!(playing_transition(3, true), None);
        assert_eq!(playing_transition(4, true), None);
    }

    #[test]
    fn final_entry_fires_at_round_five_after_exchange() {
        assert_eq!(
            playing_transition(5, true),
            Some(PlayTransition::EnterFinalResonance)
        );
        assert_eq!(
            playing_transition(6, true),
            Some(PlayTransition::EnterFinalResonance)
        );
        // Exchange still pending wins first.
        assert_eq!(
            playing_transition(5, false),
            Some(PlayTransition::EnterExchange)
        );
    }

    #[test]
    fn final_turn_advances_then_completes() {
        assert_eq!(advance_final_turn(0), FinalAdvance::NextSeat(1));
        assert_eq!(advance_final_turn(2), FinalAdvance::NextSeat(3));
        assert_eq!(advance_final_turn(3), FinalAdvance::Complete);
    }

    #[test]
    fn quorum_needs_three_of_four() {
        assert!(!resonance_quorum_met(2, 4));
        assert!(resonance_quorum_met(3, 4));
        assert!(resonance_quorum_met(4, 4));
        assert!(!resonance_quorum_met(0, 0));
    }
}

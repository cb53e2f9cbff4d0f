//! DTOs for room adapter operations.

use time::OffsetDateTime;

use crate::entities::rooms::{FinalPhaseStep, RoomStatus};

/// Input for creating a new room.
#[derive(Debug, Clone)]
pub struct RoomCreate {
    pub join_code: String,
    pub deck: Vec<String>,
}

/// Lock-version-guarded update of room fields.
///
/// Only fields set on the builder are written; every application bumps
/// `lock_version` by one and refreshes `updated_at`.
#[derive(Debug, Clone, Default)]
pub struct RoomUpdate {
    pub id: i64,
    pub current_lock_version: i32,
    pub status: Option<RoomStatus>,
    pub deck: Option<Vec<String>>,
    pub discard_pile: Option<Vec<String>>,
    pub current_turn_player: Option<i16>,
    pub current_exchange_turn: Option<i16>,
    pub final_phase_turn: Option<i16>,
    pub final_phase_step: Option<FinalPhaseStep>,
    pub round_number: Option<i16>,
    pub exchange_completed: Option<bool>,
}

impl RoomUpdate {
    pub fn new(id: i64, current_lock_version: i32) -> Self {
        Self {
            id,
            current_lock_version,
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: RoomStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_deck(mut self, deck: Vec<String>) -> Self {
        self.deck = Some(deck);
        self
    }

    pub fn with_discard_pile(mut self, discard_pile: Vec<String>) -> Self {
        self.discard_pile = Some(discard_pile);
        self
    }

    pub fn with_current_turn_player(mut self, seat: i16) -> Self {
        self.current_turn_player = Some(seat);
        self
    }

    pub fn with_current_exchange_turn(mut self, seat: i16) -> Self {
        self.current_exchange_turn = Some(seat);
        self
    }

    pub fn with_final_phase_turn(mut self, seat: i16) -> Self {
        self.final_phase_turn = Some(seat);
        self
    }

    pub fn with_final_phase_step(mut self, step: FinalPhaseStep) -> Self {
        self.final_phase_step = Some(step);
        self
    }

    pub fn with_round_number(mut self, round: i16) -> Self {
        self.round_number = Some(round);
        self
    }

    pub fn with_exchange_completed(mut self, done: bool) -> Self {
        self.exchange_completed = Some(done);
        self
    }
}

/// Conditional status transition: applied only while `status` still equals
/// `from`. Zero rows affected with an existing room means another writer won
/// the race, reported as `None` rather than an error.
#[derive(Debug, Clone)]
pub struct RoomStatusTransition {
    pub id: i64,
    pub from: RoomStatus,
    pub to: RoomStatus,
    pub purpose_card: Option<String>,
    pub card_options: Option<Vec<String>>,
    pub voting_started_at: Option<OffsetDateTime>,
    pub deck: Option<Vec<String>>,
    pub discard_pile: Option<Vec<String>>,
    pub current_exchange_turn: Option<i16>,
    pub exchange_completed: Option<bool>,
    pub final_phase_turn: Option<i16>,
    pub final_phase_step: Option<FinalPhaseStep>,
}

impl RoomStatusTransition {
    pub fn new(id: i64, from: RoomStatus, to: RoomStatus) -> Self {
        Self {
            id,
            from,
            to,
            purpose_card: None,
            card_options: None,
            voting_started_at: None,
            deck: None,
            discard_pile: None,
            current_exchange_turn: None,
            exchange_completed: None,
            final_phase_turn: None,
            final_phase_step: None,
        }
    }

    pub fn with_purpose_card(mut self, card: String) -> Self {
        self.purpose_card = Some(card);
        self
    }

    pub fn with_card_options(mut self, options: Vec<String>) -> Self {
        self.card_options = Some(options);
        self
    }

    pub fn with_voting_started_at(mut self, at: OffsetDateTime) -> Self {
        self.voting_started_at = Some(at);
        self
    }

    pub fn with_deck(mut self, deck: Vec<String>) -> Self {
        self.deck = Some(deck);
        self
    }

    pub fn with_discard_pile(mut self, discard_pile: Vec<String>) -> Self {
        self.discard_pile = Some(discard_pile);
        self
    }

    pub fn with_current_exchange_turn(mut self, seat: i16) -> Self {
        self.current_exchange_turn = Some(seat);
        self
    }

    pub fn with_exchange_completed(mut self, done: bool) -> Self {
        self.exchange_completed = Some(done);
        self
    }

    pub fn with_final_phase_turn(mut self, seat: i16) -> Self {
        self.final_phase_turn = Some(seat);
        self
    }

    pub fn with_final_phase_step(mut self, step: FinalPhaseStep) -> Self {
        self.final_phase_step = Some(step);
        self
    }
}

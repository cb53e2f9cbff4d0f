//! DTOs for player adapter operations.

use serde_json::Value as Json;

use crate::entities::players::PlayerRole;

/// Input for creating a new player row at join time.
#[derive(Debug, Clone)]
pub struct PlayerCreate {
    pub room_id: i64,
    pub player_number: i16,
    pub name: String,
    pub role: PlayerRole,
}

/// Partial update of player flags and final-phase fields.
///
/// Only fields set on the builder are written. Player rows are serialized
/// through the room row lock, so no per-player lock version is kept.
#[derive(Debug, Clone, Default)]
pub struct PlayerUpdate {
    pub id: i64,
    pub preferred_name: Option<String>,
    pub hand: Option<Vec<String>>,
    pub is_connected: Option<bool>,
    pub has_checked_in: Option<bool>,
    pub ready_for_next_phase: Option<bool>,
    pub has_shared_final_resonance: Option<bool>,
    pub final_resonance_text: Option<String>,
    pub final_resonance_percentage: Option<i16>,
    pub final_gifts_received: Option<Json>,
    pub final_reflection_text: Option<String>,
    pub has_given_final_gift: Option<bool>,
}

impl PlayerUpdate {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_preferred_name(mut self, name: String) -> Self {
        self.preferred_name = Some(name);
        self
    }

    pub fn with_hand(mut self, hand: Vec<String>) -> Self {
        self.hand = Some(hand);
        self
    }

    pub fn with_is_connected(mut self, connected: bool) -> Self {
        self.is_connected = Some(connected);
        self
    }

    pub fn with_has_checked_in(mut self, checked_in: bool) -> Self {
        self.has_checked_in = Some(checked_in);
        self
    }

    pub fn with_ready_for_next_phase(mut self, ready: bool) -> Self {
        self.ready_for_next_phase = Some(ready);
        self
    }

    pub fn with_has_shared_final_resonance(mut self, shared: bool) -> Self {
        self.has_shared_final_resonance = Some(shared);
        self
    }

    pub fn with_final_resonance_text(mut self, text: String) -> Self {
        self.final_resonance_text = Some(text);
        self
    }

    pub fn with_final_resonance_percentage(mut self, percentage: i16) -> Self {
        self.final_resonance_percentage = Some(percentage);
        self
    }

    pub fn with_final_gifts_received(mut self, gifts: Json) -> Self {
        self.final_gifts_received = Some(gifts);
        self
    }

    pub fn with_final_reflection_text(mut self, text: String) -> Self {
        self.final_reflection_text = Some(text);
        self
    }

    pub fn with_has_given_final_gift(mut self, given: bool) -> Self {
        self.has_given_final_gift = Some(given);
        self
    }
}

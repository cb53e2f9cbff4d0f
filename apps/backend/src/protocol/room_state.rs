//! Client-facing room snapshot.
//!
//! The snapshot is the payload of record: push notifications only tell
//! clients to re-fetch it. Hands and the board are defensively deduplicated
//! by first occurrence before rendering: the persisted state is protected
//! by the mutation protocol, but a re-fetch racing a write may observe a
//! transient duplicate.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::cards::dedupe_by_first_occurrence;
use crate::domain::voting::tally;
use crate::entities::players::PlayerRole;
use crate::entities::rooms::{FinalPhaseStep, RoomStatus};
use crate::repos::players::{GiftRef, Player};
use crate::repos::rooms::Room;
use crate::repos::votes::Vote;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: i64,
    pub join_code: String,
    pub status: RoomStatus,
    pub purpose_card: Option<String>,
    pub card_options: Vec<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub voting_started_at: Option<OffsetDateTime>,
    pub current_turn_player: i16,
    pub current_exchange_turn: i16,
    pub final_phase_turn: i16,
    pub final_phase_step: FinalPhaseStep,
    pub round_number: i16,
    pub exchange_completed: bool,
    /// Deck order is the draw secret; clients only see the count.
    pub deck_count: usize,
    pub discard_pile: Vec<String>,
    pub lock_version: i32,
    pub players: Vec<PlayerSnapshot>,
    /// Vote counts per option, present only during the voting phase.
    pub vote_tally: Option<Vec<u32>>,
    /// Players who still owe a gift this turn, present during gifting.
    pub pending_givers: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub player_id: i64,
    pub player_number: i16,
    pub name: String,
    pub preferred_name: Option<String>,
    pub role: PlayerRole,
    pub hand: Vec<String>,
    pub is_connected: bool,
    pub has_checked_in: bool,
    pub ready_for_next_phase: bool,
    pub has_shared_final_resonance: bool,
    pub final_resonance_percentage: Option<i16>,
    pub final_resonance_text: Option<String>,
    pub final_gifts_received: Vec<GiftRef>,
    pub final_reflection_text: Option<String>,
    pub has_given_final_gift: bool,
}

/// Produce the snapshot for a room and its players.
pub fn snapshot(room: &Room, players: &[Player], votes: &[Vote]) -> RoomSnapshot {
    let vote_tally = (room.status == RoomStatus::Voting).then(|| {
        let indexes: Vec<i16> = votes.iter().map(|v| v.card_index).collect();
        tally(&indexes, room.card_options.len())
    });

    let pending_givers = (room.status.is_final_phase()
        && room.final_phase_step == FinalPhaseStep::Gifting)
        .then(|| {
            players
                .iter()
                .filter(|p| {
                    p.role == PlayerRole::Player
                        && p.player_number >= 0
                        && p.player_number != room.final_phase_turn
                        && !p.has_given_final_gift
                })
                .map(|p| p.id)
                .collect()
        });

    RoomSnapshot {
        room_id: room.id,
        join_code: room.join_code.clone(),
        status: room.status,
        purpose_card: room.purpose_card.clone(),
        card_options: room.card_options.clone(),
        voting_started_at: room.voting_started_at,
        current_turn_player: room.current_turn_player,
        current_exchange_turn: room.current_exchange_turn,
        final_phase_turn: room.final_phase_turn,
        final_phase_step: room.final_phase_step,
        round_number: room.round_number,
        exchange_completed: room.exchange_completed,
        deck_count: room.deck.len(),
        discard_pile: dedupe_by_first_occurrence(&room.discard_pile),
        lock_version: room.lock_version,
        players: players.iter().map(player_snapshot).collect(),
        vote_tally,
        pending_givers,
    }
}

fn player_snapshot(player: &Player) -> PlayerSnapshot {
    PlayerSnapshot {
        player_id: player.id,
        player_number: player.player_number,
        name: player.name.clone(),
        preferred_name: player.preferred_name.clone(),
        role: player.role,
        hand: dedupe_by_first_occurrence(&player.hand),
        is_connected: player.is_connected,
        has_checked_in: player.has_checked_in,
        ready_for_next_phase: player.ready_for_next_phase,
        has_shared_final_resonance: player.has_shared_final_resonance,
        final_resonance_percentage: player.final_resonance_percentage,
        final_resonance_text: player.final_resonance_text.clone(),
        final_gifts_received: player.final_gifts_received.clone(),
        final_reflection_text: player.final_reflection_text.clone(),
        has_given_final_gift: player.has_given_final_gift,
    }
}

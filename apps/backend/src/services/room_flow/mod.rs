//! Room flow orchestration service - bridges pure domain logic with DB
//! persistence.
//!
//! Every mutating method runs inside a caller-provided transaction, locks
//! the room row first, and finishes by running the transition processor so
//! any phase exit the mutation enabled is applied in the same transaction.

mod card_actions;
mod final_phase;
mod maintenance;
mod membership;
mod transitions;
mod voting;

use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::players::Player;

pub use transitions::TransitionOutcome;

/// Room flow service - methods are grouped by phase across the sibling
/// modules, all as `impl RoomFlowService` blocks.
#[derive(Default)]
pub struct RoomFlowService;

/// A player acting in a room must be seated; spectators only watch.
pub(super) fn require_active(player: &Player, room_id: i64) -> Result<i16, DomainError> {
    if player.room_id != room_id {
        return Err(DomainError::not_found(
            NotFoundKind::Player,
            "Player does not belong to this room",
        ));
    }
    if player.is_spectator() || player.player_number < 0 {
        return Err(DomainError::validation(
            ValidationKind::SpectatorAction,
            "Spectators cannot perform player actions",
        ));
    }
    Ok(player.player_number)
}

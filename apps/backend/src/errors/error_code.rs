//! Error codes for the Resonata backend API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the Resonata backend API.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string that appears
/// in HTTP responses and structured action outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request validation
    /// Operation attempted in the wrong room phase
    PhaseMismatch,
    /// Not this player's turn
    OutOfTurn,
    /// Deck has no cards left to draw
    EmptyDeck,
    /// Named card not in the acting player's hand
    CardNotInHand,
    /// Named card not on the shared board
    CardNotOnBoard,
    /// Exchange would duplicate a card across containers
    DuplicateCardViolation,
    /// Final-phase step does not allow this operation
    WrongStep,
    /// Gift target is not the current final-phase turn player
    NotRecipientTurn,
    /// Players cannot gift themselves
    SelfGift,
    /// Sender already gifted this turn
    AlreadyGifted,
    /// Gift message must be non-empty
    EmptyMessage,
    /// Vote index outside the card options
    InvalidCardIndex,
    /// Resonance percentage outside 0..=100
    InvalidPercentage,
    /// Spectators cannot perform player actions
    SpectatorAction,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource not found
    /// Room not found
    RoomNotFound,
    /// Player not found
    PlayerNotFound,
    /// General not found error
    NotFound,

    // Business logic conflicts
    /// Player already cast a vote this round
    VoteAlreadyCast,
    /// Optimistic lock version mismatch
    OptimisticLock,
    /// Join code collided with an existing room
    JoinCodeConflict,
    /// General conflict error
    Conflict,

    // Infrastructure
    /// Database error
    DbError,
    /// Database unavailable
    DbUnavailable,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PhaseMismatch => "PHASE_MISMATCH",
            ErrorCode::OutOfTurn => "OUT_OF_TURN",
            ErrorCode::EmptyDeck => "EMPTY_DECK",
            ErrorCode::CardNotInHand => "CARD_NOT_IN_HAND",
            ErrorCode::CardNotOnBoard => "CARD_NOT_ON_BOARD",
            ErrorCode::DuplicateCardViolation => "DUPLICATE_CARD_VIOLATION",
            ErrorCode::WrongStep => "WRONG_STEP",
            ErrorCode::NotRecipientTurn => "NOT_RECIPIENT_TURN",
            ErrorCode::SelfGift => "SELF_GIFT",
            ErrorCode::AlreadyGifted => "ALREADY_GIFTED",
            ErrorCode::EmptyMessage => "EMPTY_MESSAGE",
            ErrorCode::InvalidCardIndex => "INVALID_CARD_INDEX",
            ErrorCode::InvalidPercentage => "INVALID_PERCENTAGE",
            ErrorCode::SpectatorAction => "SPECTATOR_ACTION",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::RoomNotFound => "ROOM_NOT_FOUND",
            ErrorCode::PlayerNotFound => "PLAYER_NOT_FOUND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::VoteAlreadyCast => "VOTE_ALREADY_CAST",
            ErrorCode::OptimisticLock => "OPTIMISTIC_LOCK",
            ErrorCode::JoinCodeConflict => "JOIN_CODE_CONFLICT",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::DbError => "DB_ERROR",
            ErrorCode::DbUnavailable => "DB_UNAVAILABLE",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_screaming_snake_case() {
        let codes = [
            ErrorCode::PhaseMismatch,
            ErrorCode::DuplicateCardViolation,
            ErrorCode::RoomNotFound,
            ErrorCode::OptimisticLock,
        ];
        for code in codes {
            let s = code.as_str();
            assert!(!s.is_empty());
            assert!(s
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit()));
        }
    }
}

//! Domain layer: pure game logic types and helpers.

pub mod cards;
pub mod dealing;
pub mod flow;
pub mod mutations;
pub mod voting;

// Re-exports for ergonomics
pub use cards::{dedupe_by_first_occurrence, validate_catalogs, THEME_CARDS, VALUE_CARDS};
pub use dealing::{deal_initial_hands, entropy_seed, shuffled_deck, DealtHands};
pub use flow::{advance_turn, next_seat, playing_transition, PlayTransition};
pub use mutations::CardLayout;

pub mod exchange_actions;
pub mod gifts;
pub mod players;
pub mod resonance_shares;
pub mod rooms;
pub mod votes;

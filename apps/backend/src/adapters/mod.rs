//! SeaORM adapters - generic over ConnectionTrait.
//!
//! Adapter functions return DbErr; the repos layer maps to DomainError via
//! From<DbErr>.

pub mod exchange_sea;
pub mod gifts_sea;
pub mod players_sea;
pub mod resonance_sea;
pub mod rooms_sea;
pub mod votes_sea;

//! Repository layer: domain models over the SeaORM adapters.
//!
//! Adapters speak `DbErr`; everything above this layer speaks `DomainError`.
//! JSON card containers are parsed into typed vectors here, so services
//! never touch raw `Json` values.

pub mod exchanges;
pub mod gifts;
pub mod players;
pub mod resonance;
pub mod rooms;
pub mod votes;

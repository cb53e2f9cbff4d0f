use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Room phase progression. Stored as short strings so the same entity works
/// against Postgres and the sqlite test databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum RoomStatus {
    #[sea_orm(string_value = "WAITING")]
    Waiting,
    #[sea_orm(string_value = "CHECKIN")]
    Checkin,
    #[sea_orm(string_value = "VOTING")]
    Voting,
    #[sea_orm(string_value = "VOTING_RESULT")]
    VotingResult,
    #[sea_orm(string_value = "RESONANCE_INITIAL")]
    ResonanceInitial,
    #[sea_orm(string_value = "PLAYING")]
    Playing,
    #[sea_orm(string_value = "EXCHANGE")]
    Exchange,
    #[sea_orm(string_value = "RESONANCE_FINAL")]
    ResonanceFinal,
    #[sea_orm(string_value = "GIFT_EXCHANGE")]
    GiftExchange,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

impl RoomStatus {
    /// Terminal statuses end the game; no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomStatus::Completed)
    }

    /// Both final-phase statuses route to the same turn/step progression.
    pub fn is_final_phase(&self) -> bool {
        matches!(self, RoomStatus::ResonanceFinal | RoomStatus::GiftExchange)
    }

    /// Parse a wire-format status. Accepts the legacy terminal spelling
    /// "COMPLETE" as an alias for "COMPLETED"; new writes always use the
    /// canonical form.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "WAITING" => Some(RoomStatus::Waiting),
            "CHECKIN" => Some(RoomStatus::Checkin),
            "VOTING" => Some(RoomStatus::Voting),
            "VOTING_RESULT" => Some(RoomStatus::VotingResult),
            "RESONANCE_INITIAL" => Some(RoomStatus::ResonanceInitial),
            "PLAYING" => Some(RoomStatus::Playing),
            "EXCHANGE" => Some(RoomStatus::Exchange),
            "RESONANCE_FINAL" => Some(RoomStatus::ResonanceFinal),
            "GIFT_EXCHANGE" => Some(RoomStatus::GiftExchange),
            "COMPLETED" | "COMPLETE" => Some(RoomStatus::Completed),
            _ => None,
        }
    }
}

/// Step within a single seat's final-phase turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum FinalPhaseStep {
    #[sea_orm(string_value = "SHARING")]
    Sharing,
    #[sea_orm(string_value = "GIFTING")]
    Gifting,
    #[sea_orm(string_value = "REFLECTION")]
    Reflection,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "join_code")]
    pub join_code: String,
    pub status: RoomStatus,
    #[sea_orm(column_name = "purpose_card")]
    pub purpose_card: Option<String>,
    #[sea_orm(column_name = "card_options")]
    pub card_options: Json,
    #[sea_orm(column_name = "voting_started_at")]
    pub voting_started_at: Option<OffsetDateTime>,
    #[sea_orm(column_name = "current_turn_player")]
    pub current_turn_player: i16,
    #[sea_orm(column_name = "current_exchange_turn")]
    pub current_exchange_turn: i16,
    #[sea_orm(column_name = "final_phase_turn")]
    pub final_phase_turn: i16,
    #[sea_orm(column_name = "final_phase_step")]
    pub final_phase_step: FinalPhaseStep,
    #[sea_orm(column_name = "round_number")]
    pub round_number: i16,
    #[sea_orm(column_name = "exchange_completed")]
    pub exchange_completed: bool,
    pub deck: Json,
    #[sea_orm(column_name = "discard_pile")]
    pub discard_pile: Json,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
    #[sea_orm(column_name = "lock_version")]
    pub lock_version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::players::Entity")]
    Players,
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Players.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_parse_accepts_legacy_terminal_spelling() {
        assert_eq!(
            RoomStatus::from_wire("COMPLETE"),
            Some(RoomStatus::Completed)
        );
        assert_eq!(
            RoomStatus::from_wire("COMPLETED"),
            Some(RoomStatus::Completed)
        );
        assert!(RoomStatus::from_wire("COMPLETE").unwrap().is_terminal());
    }

    #[test]
    fn wire_parse_rejects_unknown_status() {
        assert_eq!(RoomStatus::from_wire("LOBBY"), None);
    }
}

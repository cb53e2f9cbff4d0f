use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PlayerRole {
    #[sea_orm(string_value = "PLAYER")]
    Player,
    #[sea_orm(string_value = "SPECTATOR")]
    Spectator,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "room_id")]
    pub room_id: i64,
    /// Seat number 0..=3 for active players; -1 for spectators.
    #[sea_orm(column_name = "player_number")]
    pub player_number: i16,
    pub name: String,
    #[sea_orm(column_name = "preferred_name")]
    pub preferred_name: Option<String>,
    pub role: PlayerRole,
    pub hand: Json,
    #[sea_orm(column_name = "is_connected")]
    pub is_connected: bool,
    #[sea_orm(column_name = "has_checked_in")]
    pub has_checked_in: bool,
    #[sea_orm(column_name = "ready_for_next_phase")]
    pub ready_for_next_phase: bool,
    #[sea_orm(column_name = "has_shared_final_resonance")]
    pub has_shared_final_resonance: bool,
    #[sea_orm(column_name = "final_resonance_text")]
    pub final_resonance_text: Option<String>,
    #[sea_orm(column_name = "final_resonance_percentage")]
    pub final_resonance_percentage: Option<i16>,
    #[sea_orm(column_name = "final_gifts_received")]
    pub final_gifts_received: Json,
    #[sea_orm(column_name = "final_reflection_text")]
    pub final_reflection_text: Option<String>,
    #[sea_orm(column_name = "has_given_final_gift")]
    pub has_given_final_gift: bool,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rooms::Entity",
        from = "Column::RoomId",
        to = "super::rooms::Column::Id"
    )]
    Room,
}

impl Related<super::rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----

#[derive(Iden)]
enum Rooms {
    Table,
    Id,
    JoinCode,
    Status,
    PurposeCard,
    CardOptions,
    VotingStartedAt,
    CurrentTurnPlayer,
    CurrentExchangeTurn,
    FinalPhaseTurn,
    FinalPhaseStep,
    RoundNumber,
    ExchangeCompleted,
    Deck,
    DiscardPile,
    CreatedAt,
    UpdatedAt,
    LockVersion,
}

#[derive(Iden)]
enum Players {
    Table,
    Id,
    RoomId,
    PlayerNumber,
    Name,
    PreferredName,
    Role,
    Hand,
    IsConnected,
    HasCheckedIn,
    ReadyForNextPhase,
    HasSharedFinalResonance,
    FinalResonanceText,
    FinalResonancePercentage,
    FinalGiftsReceived,
    FinalReflectionText,
    HasGivenFinalGift,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Votes {
    Table,
    Id,
    RoomId,
    PlayerId,
    CardIndex,
    CardText,
    CreatedAt,
}

#[derive(Iden)]
enum ResonanceShares {
    Table,
    Id,
    RoomId,
    PlayerId,
    Phase,
    Percentage,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Gifts {
    Table,
    Id,
    RoomId,
    FromPlayerId,
    ToPlayerId,
    Message,
    CreatedAt,
}

#[derive(Iden)]
enum ExchangeActions {
    Table,
    Id,
    RoomId,
    PlayerId,
    Action,
    HandCard,
    BoardCard,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Status-like enums are stored as short strings rather than native
        // Postgres enum types so the same migration runs on sqlite test DBs.
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Rooms::JoinCode)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Rooms::Status).string_len(32).not_null())
                    .col(ColumnDef::new(Rooms::PurposeCard).string_len(128).null())
                    .col(ColumnDef::new(Rooms::CardOptions).json_binary().not_null())
                    .col(
                        ColumnDef::new(Rooms::VotingStartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::CurrentTurnPlayer)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rooms::CurrentExchangeTurn)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rooms::FinalPhaseTurn)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rooms::FinalPhaseStep)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::RoundNumber)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rooms::ExchangeCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Rooms::Deck).json_binary().not_null())
                    .col(ColumnDef::new(Rooms::DiscardPile).json_binary().not_null())
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::LockVersion)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Players::RoomId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Players::PlayerNumber)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Players::Name).string_len(64).not_null())
                    .col(ColumnDef::new(Players::PreferredName).string_len(64).null())
                    .col(ColumnDef::new(Players::Role).string_len(32).not_null())
                    .col(ColumnDef::new(Players::Hand).json_binary().not_null())
                    .col(
                        ColumnDef::new(Players::IsConnected)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Players::HasCheckedIn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Players::ReadyForNextPhase)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Players::HasSharedFinalResonance)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Players::FinalResonanceText).text().null())
                    .col(
                        ColumnDef::new(Players::FinalResonancePercentage)
                            .small_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Players::FinalGiftsReceived)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Players::FinalReflectionText).text().null())
                    .col(
                        ColumnDef::new(Players::HasGivenFinalGift)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Players::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_room")
                            .from(Players::Table, Players::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One seat per room: partial uniqueness is approximated by a full
        // unique index over (room_id, player_number) for seats >= 0; the
        // spectator sentinel (-1) is excluded at the application layer.
        manager
            .create_index(
                Index::create()
                    .name("idx_players_room")
                    .table(Players::Table)
                    .col(Players::RoomId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Votes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Votes::RoomId).big_integer().not_null())
                    .col(ColumnDef::new(Votes::PlayerId).big_integer().not_null())
                    .col(ColumnDef::new(Votes::CardIndex).small_integer().not_null())
                    .col(ColumnDef::new(Votes::CardText).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Votes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_room")
                            .from(Votes::Table, Votes::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_player")
                            .from(Votes::Table, Votes::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_votes_room_player")
                    .table(Votes::Table)
                    .col(Votes::RoomId)
                    .col(Votes::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ResonanceShares::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResonanceShares::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResonanceShares::RoomId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResonanceShares::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResonanceShares::Phase)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResonanceShares::Percentage)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResonanceShares::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResonanceShares::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resonance_room")
                            .from(ResonanceShares::Table, ResonanceShares::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resonance_player")
                            .from(ResonanceShares::Table, ResonanceShares::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_resonance_room_player_phase")
                    .table(ResonanceShares::Table)
                    .col(ResonanceShares::RoomId)
                    .col(ResonanceShares::PlayerId)
                    .col(ResonanceShares::Phase)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Gifts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Gifts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Gifts::RoomId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Gifts::FromPlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Gifts::ToPlayerId).big_integer().not_null())
                    .col(ColumnDef::new(Gifts::Message).text().not_null())
                    .col(
                        ColumnDef::new(Gifts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gifts_room")
                            .from(Gifts::Table, Gifts::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gifts_room")
                    .table(Gifts::Table)
                    .col(Gifts::RoomId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExchangeActions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExchangeActions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExchangeActions::RoomId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeActions::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeActions::Action)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeActions::HandCard)
                            .string_len(128)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeActions::BoardCard)
                            .string_len(128)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeActions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exchange_actions_room")
                            .from(ExchangeActions::Table, ExchangeActions::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exchange_actions_room")
                    .table(ExchangeActions::Table)
                    .col(ExchangeActions::RoomId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExchangeActions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Gifts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ResonanceShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        Ok(())
    }
}

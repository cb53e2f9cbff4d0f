//! SeaORM adapter for the resonance_shares table - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter,
    Set};

use crate::entities::resonance_shares;
use crate::entities::resonance_shares::ResonancePhase;

pub async fn find_by_room_and_phase<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    phase: ResonancePhase,
) -> Result<Vec<resonance_shares::Model>, sea_orm::DbErr> {
    resonance_shares::Entity::find()
        .filter(resonance_shares::Column::RoomId.eq(room_id))
        .filter(resonance_shares::Column::Phase.eq(phase))
        .all(conn)
        .await
}

/// Upsert a share: a resubmission overwrites the stored percentage.
/// Uniqueness is per (room, player, phase).
pub async fn upsert_share<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    player_id: i64,
    phase: ResonancePhase,
    percentage: i16,
) -> Result<(), sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();

    let updated = resonance_shares::Entity::update_many()
        .col_expr(
            resonance_shares::Column::Percentage,
            Expr::val(percentage).into(),
        )
        .col_expr(resonance_shares::Column::UpdatedAt, Expr::val(now).into())
        .filter(resonance_shares::Column::RoomId.eq(room_id))
        .filter(resonance_shares::Column::PlayerId.eq(player_id))
        .filter(resonance_shares::Column::Phase.eq(phase))
        .exec(conn)
        .await?;

    if updated.rows_affected > 0 {
        return Ok(());
    }

    let share_active = resonance_shares::ActiveModel {
        id: NotSet,
        room_id: Set(room_id),
        player_id: Set(player_id),
        phase: Set(phase),
        percentage: Set(percentage),
        created_at: Set(now),
        updated_at: Set(now),
    };
    share_active.insert(conn).await?;
    Ok(())
}

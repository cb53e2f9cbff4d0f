//! Maintenance operations: uniqueness audit and the discard-pile repair.
//!
//! Neither runs automatically. The audit reports duplicated card names for
//! diagnosis; repair is a deliberate operator action, never a reaction the
//! core takes on its own.

use rand::rngs::StdRng;
use rand::SeedableRng;
use sea_orm::DatabaseTransaction;
use tracing::{info, warn};

use super::RoomFlowService;
use crate::adapters::rooms_sea::RoomUpdate;
use crate::domain::flow::{PLAYERS, REPLENISH_TARGET};
use crate::domain::mutations::CardLayout;
use crate::error::AppError;
use crate::repos::{players, rooms};

impl RoomFlowService {
    /// Scan deck + discard pile + every hand and report any card name that
    /// appears more than once. Message gifts carry no card references, so
    /// the three card containers are the whole census.
    pub async fn validate_uniqueness(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
    ) -> Result<Vec<(String, usize)>, AppError> {
        let room = rooms::require_room(txn, room_id).await?;
        let active = players::find_active_by_room(txn, room_id).await?;

        let mut hands: [Vec<String>; PLAYERS] = Default::default();
        for player in &active {
            let seat = player.player_number as usize;
            if seat < PLAYERS {
                hands[seat] = player.hand.clone();
            }
        }

        let layout = CardLayout::new(room.deck.clone(), room.discard_pile.clone(), hands);
        let duplicates = layout.duplicate_names();

        if duplicates.is_empty() {
            info!(room_id, total = layout.total_cards(), "Uniqueness audit clean");
        } else {
            // Serious but non-fatal: auto-repair risks further divergence.
            warn!(room_id, ?duplicates, "Uniqueness audit found duplicated cards");
        }

        Ok(duplicates)
    }

    /// Top the discard pile up to `target` (default 12) with random deck
    /// cards. Deck cards are never in a hand, so the move cannot duplicate.
    pub async fn replenish_discard(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        target: Option<usize>,
    ) -> Result<usize, AppError> {
        let target = target.unwrap_or(REPLENISH_TARGET);

        let mut table = self.lock_table(txn, room_id).await?;
        let mut rng = StdRng::from_os_rng();
        let moved = table.layout.replenish_discard(target, &mut rng);

        if moved > 0 {
            rooms::update_room(
                txn,
                RoomUpdate::new(room_id, table.room.lock_version)
                    .with_deck(table.layout.deck.clone())
                    .with_discard_pile(table.layout.discard.clone()),
            )
            .await?;
        }

        info!(room_id, moved, target, "Discard pile replenished");
        Ok(moved)
    }
}

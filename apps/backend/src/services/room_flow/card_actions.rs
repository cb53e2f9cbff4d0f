//! The atomic card mutations of normal play and the exchange interlude.
//!
//! Each operation is one transaction: lock the room row, lock the active
//! player rows, rebuild the in-memory `CardLayout`, apply exactly one pure
//! mutation, write the changed containers back, then run the transition
//! processor. Row locks serialize concurrent calls on the same room; the
//! lock-version CAS on the write catches anything that slipped past.

use sea_orm::DatabaseTransaction;
use tracing::{debug, info};

use super::{require_active, RoomFlowService};
use crate::adapters::players_sea::PlayerUpdate;
use crate::adapters::rooms_sea::RoomUpdate;
use crate::domain::flow::{advance_turn, PLAYERS};
use crate::domain::mutations::CardLayout;
use crate::entities::rooms::RoomStatus;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::players::Player;
use crate::repos::{exchanges, players, rooms};

/// Room and seated players, loaded under row locks, plus the rebuilt layout.
pub(super) struct LockedTable {
    pub room: crate::repos::rooms::Room,
    pub seats: [Player; PLAYERS],
    pub layout: CardLayout,
}

impl LockedTable {
    /// Resolve the acting player to a seat, rejecting spectators and
    /// players from other rooms.
    pub(super) async fn acting_seat(
        &self,
        txn: &DatabaseTransaction,
        player_id: i64,
    ) -> Result<i16, AppError> {
        if let Some(player) = self.seats.iter().find(|p| p.id == player_id) {
            return Ok(require_active(player, self.room.id)?);
        }
        // Not seated: distinguish spectator from unknown player.
        match players::find_by_id(txn, player_id).await? {
            Some(player) => match require_active(&player, self.room.id) {
                Ok(_) => Err(AppError::internal(
                    "seated player missing from locked seat set",
                )),
                Err(e) => Err(e.into()),
            },
            None => Err(DomainError::not_found(NotFoundKind::Player, "Player not found").into()),
        }
    }
}

impl RoomFlowService {
    /// Lock the room and all active player rows and rebuild the card layout.
    pub(super) async fn lock_table(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
    ) -> Result<LockedTable, AppError> {
        let room = rooms::lock_room(txn, room_id).await?;
        let active = players::lock_active_by_room(txn, room_id).await?;

        if active.len() != PLAYERS {
            return Err(DomainError::validation_other(format!(
                "room has {} seated players, expected {PLAYERS}",
                active.len()
            ))
            .into());
        }

        let mut hands: [Vec<String>; PLAYERS] = Default::default();
        for player in &active {
            let seat = player.player_number as usize;
            if seat >= PLAYERS {
                return Err(
                    DomainError::validation_other(format!("seat {seat} out of range")).into(),
                );
            }
            hands[seat] = player.hand.clone();
        }

        let seats: [Player; PLAYERS] = active
            .try_into()
            .map_err(|_| AppError::internal("seat collection size mismatch"))?;

        let layout = CardLayout::new(room.deck.clone(), room.discard_pile.clone(), hands);
        Ok(LockedTable {
            room,
            seats,
            layout,
        })
    }

    /// Draw: pop the deck's front card into the acting player's hand.
    /// Returns the drawn card name.
    pub async fn draw_card(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
    ) -> Result<String, AppError> {
        debug!(room_id, player_id, "Drawing card");

        let mut table = self.lock_table(txn, room_id).await?;
        if table.room.status != RoomStatus::Playing {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Not in the playing phase",
            )
            .into());
        }

        let seat = table.acting_seat(txn, player_id).await?;
        if seat != table.room.current_turn_player {
            return Err(out_of_turn(table.room.current_turn_player, seat).into());
        }

        let card = table.layout.draw(seat as usize)?;

        rooms::update_room(
            txn,
            RoomUpdate::new(room_id, table.room.lock_version).with_deck(table.layout.deck.clone()),
        )
        .await?;
        players::update_player(
            txn,
            PlayerUpdate::new(player_id).with_hand(table.layout.hands[seat as usize].clone()),
        )
        .await?;

        info!(room_id, player_id, seat, card, "Card drawn");
        Ok(card)
    }

    /// Discard: move a hand card to the board, advance the turn, and apply
    /// any round-triggered phase change in the same transaction.
    pub async fn discard_card(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
        card: &str,
    ) -> Result<(), AppError> {
        debug!(room_id, player_id, card, "Discarding card");

        let mut table = self.lock_table(txn, room_id).await?;
        if table.room.status != RoomStatus::Playing {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Not in the playing phase",
            )
            .into());
        }

        let seat = table.acting_seat(txn, player_id).await?;
        if seat != table.room.current_turn_player {
            return Err(out_of_turn(table.room.current_turn_player, seat).into());
        }

        table.layout.discard(seat as usize, card)?;
        let advance = advance_turn(table.room.current_turn_player, table.room.round_number);

        rooms::update_room(
            txn,
            RoomUpdate::new(room_id, table.room.lock_version)
                .with_discard_pile(table.layout.discard.clone())
                .with_current_turn_player(advance.next_turn)
                .with_round_number(advance.round_number),
        )
        .await?;
        players::update_player(
            txn,
            PlayerUpdate::new(player_id).with_hand(table.layout.hands[seat as usize].clone()),
        )
        .await?;

        info!(
            room_id,
            player_id,
            seat,
            card,
            next_turn = advance.next_turn,
            round_number = advance.round_number,
            "Card discarded"
        );

        // Round wrap may owe the exchange interlude or the final phase.
        self.process_room_state(txn, room_id).await?;
        Ok(())
    }

    /// Exchange: swap one hand card with one board card, in place.
    pub async fn exchange_cards(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
        hand_card: &str,
        board_card: &str,
    ) -> Result<(), AppError> {
        debug!(room_id, player_id, hand_card, board_card, "Exchanging");

        let mut table = self.lock_table(txn, room_id).await?;
        let seat = validate_exchange_turn(&table, txn, player_id).await?;

        table.layout.exchange(seat as usize, hand_card, board_card)?;

        rooms::update_room(
            txn,
            RoomUpdate::new(room_id, table.room.lock_version)
                .with_discard_pile(table.layout.discard.clone())
                .with_current_exchange_turn(table.room.current_exchange_turn + 1),
        )
        .await?;
        players::update_player(
            txn,
            PlayerUpdate::new(player_id).with_hand(table.layout.hands[seat as usize].clone()),
        )
        .await?;
        exchanges::log_swap(
            txn,
            room_id,
            player_id,
            hand_card.to_string(),
            board_card.to_string(),
        )
        .await?;

        info!(room_id, player_id, seat, hand_card, board_card, "Exchanged");

        self.process_room_state(txn, room_id).await?;
        Ok(())
    }

    /// Skip the exchange turn; the turn advances regardless of choice.
    pub async fn skip_exchange(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        player_id: i64,
    ) -> Result<(), AppError> {
        debug!(room_id, player_id, "Skipping exchange");

        let table = self.lock_table(txn, room_id).await?;
        let seat = validate_exchange_turn(&table, txn, player_id).await?;

        rooms::update_room(
            txn,
            RoomUpdate::new(room_id, table.room.lock_version)
                .with_current_exchange_turn(table.room.current_exchange_turn + 1),
        )
        .await?;
        exchanges::log_skip(txn, room_id, player_id).await?;

        info!(room_id, player_id, seat, "Exchange skipped");

        self.process_room_state(txn, room_id).await?;
        Ok(())
    }
}

async fn validate_exchange_turn(
    table: &LockedTable,
    txn: &DatabaseTransaction,
    player_id: i64,
) -> Result<i16, AppError> {
    if table.room.status != RoomStatus::Exchange {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Not in the exchange phase",
        )
        .into());
    }

    let seat = table.acting_seat(txn, player_id).await?;
    if seat != table.room.current_exchange_turn {
        return Err(out_of_turn(table.room.current_exchange_turn, seat).into());
    }
    Ok(seat)
}

fn out_of_turn(expected: i16, got: i16) -> DomainError {
    DomainError::validation(
        ValidationKind::OutOfTurn,
        format!("It is seat {expected}'s turn, not seat {got}'s"),
    )
}

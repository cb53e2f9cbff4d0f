//! Background sweeper for timer-driven transitions.
//!
//! Most transitions are applied by whichever request observes the exit
//! condition. The two display pauses and the vote-countdown expiry have no
//! triggering request, so a 1-second tick walks rooms sitting in those
//! statuses and runs the transition processor on each. This bounds staleness
//! the same way the polling fallback did in the original client protocol;
//! conditional updates make a tick racing a request harmless.

use std::time::Duration;

use futures::future::join_all;
use sea_orm::TransactionTrait;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::flow::{EXCHANGE_PAUSE_SECS, PLAYERS, VOTING_RESULT_PAUSE_SECS};
use crate::entities::rooms::RoomStatus;
use crate::error::AppError;
use crate::repos::rooms::{self, Room};
use crate::services::room_flow::RoomFlowService;
use crate::state::app_state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the sweeper loop. Runs until the process exits.
pub fn spawn(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = sweep_once(&state).await {
                warn!(error = %e, "Sweep pass failed");
            }
        }
    })
}

/// One pass: find rooms with a possibly-due timer transition and process
/// each in its own transaction.
pub async fn sweep_once(state: &AppState) -> Result<(), AppError> {
    let now = time::OffsetDateTime::now_utc();

    let candidates = rooms::find_by_statuses(
        &state.db,
        &[
            RoomStatus::Voting,
            RoomStatus::VotingResult,
            RoomStatus::Exchange,
        ],
    )
    .await?;

    let due: Vec<Room> = candidates
        .into_iter()
        .filter(|room| timer_due(room, now))
        .collect();

    if due.is_empty() {
        return Ok(());
    }

    debug!(count = due.len(), "Sweeping rooms with due timers");
    let results = join_all(due.into_iter().map(|room| sweep_room(state, room))).await;
    for result in results {
        if let Err(e) = result {
            warn!(error = %e, "Room sweep failed");
        }
    }
    Ok(())
}

fn timer_due(room: &Room, now: time::OffsetDateTime) -> bool {
    let since_update = (now - room.updated_at).whole_seconds();
    match room.status {
        RoomStatus::Voting => room.voting_expired(now),
        RoomStatus::VotingResult => since_update >= VOTING_RESULT_PAUSE_SECS,
        RoomStatus::Exchange => {
            room.current_exchange_turn >= PLAYERS as i16 && since_update >= EXCHANGE_PAUSE_SECS
        }
        _ => false,
    }
}

async fn sweep_room(state: &AppState, room: Room) -> Result<(), AppError> {
    let txn = state.db.begin().await?;
    let service = RoomFlowService;
    let changed = service.process_room_state(&txn, room.id).await?;

    if !changed {
        // Another writer handled it between the scan and the lock.
        let _ = txn.rollback().await;
        return Ok(());
    }

    txn.commit().await?;

    let updated = rooms::require_room(&state.db, room.id).await?;
    state
        .publish_room_changed(updated.id, updated.lock_version)
        .await;
    Ok(())
}

//! Idempotency of conditional status transitions under racing writers.
//!
//! The store contract: a transition filtered on the expected prior status
//! either applies (rows_affected = 1) or observes zero rows and no-ops.
//! These tests drive an in-memory compare-and-swap double with the same
//! contract to show that two racing writers produce exactly one applied
//! transition, and that the loser's outcome is success-shaped, not an error.

mod common;

use std::sync::Arc;

use tokio::sync::{Barrier, Mutex};

use backend::entities::rooms::RoomStatus;

/// Minimal stand-in for the rooms row: status plus a lock version that every
/// applied write bumps, mirroring the adapter's update shape.
struct RoomRow {
    status: RoomStatus,
    lock_version: i32,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Outcome {
    Applied,
    Lost,
}

/// `UPDATE rooms SET status = to, lock_version = lock_version + 1
///  WHERE id = ? AND status = from` against the in-memory row.
async fn transition(row: &Mutex<RoomRow>, from: RoomStatus, to: RoomStatus) -> Outcome {
    let mut row = row.lock().await;
    if row.status != from {
        return Outcome::Lost;
    }
    row.status = to;
    row.lock_version += 1;
    Outcome::Applied
}

#[tokio::test]
async fn racing_writers_apply_exactly_one_transition() {
    let row = Arc::new(Mutex::new(RoomRow {
        status: RoomStatus::Waiting,
        lock_version: 1,
    }));
    let barrier = Arc::new(Barrier::new(2));

    let mut handles = Vec::new();
    for _ in 0..2 {
        let row = row.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            transition(&row, RoomStatus::Waiting, RoomStatus::Checkin).await
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let applied = outcomes.iter().filter(|o| **o == Outcome::Applied).count();
    let lost = outcomes.iter().filter(|o| **o == Outcome::Lost).count();
    assert_eq!(applied, 1, "exactly one writer may apply the transition");
    assert_eq!(lost, 1, "the other must lose the race without error");

    let row = row.lock().await;
    assert_eq!(row.status, RoomStatus::Checkin);
    assert_eq!(row.lock_version, 2, "one applied write bumps the version once");
}

#[tokio::test]
async fn repeating_an_applied_transition_is_a_noop() {
    let row = Mutex::new(RoomRow {
        status: RoomStatus::Voting,
        lock_version: 7,
    });

    let first = transition(&row, RoomStatus::Voting, RoomStatus::VotingResult).await;
    let second = transition(&row, RoomStatus::Voting, RoomStatus::VotingResult).await;

    assert_eq!(first, Outcome::Applied);
    assert_eq!(second, Outcome::Lost);

    let row = row.lock().await;
    assert_eq!(row.status, RoomStatus::VotingResult);
    assert_eq!(row.lock_version, 8);
}

#[tokio::test]
async fn many_writers_cascading_through_the_machine_stay_linear() {
    // Ten writers all try the full early-game cascade; each edge must apply
    // exactly once no matter how the attempts interleave.
    let row = Arc::new(Mutex::new(RoomRow {
        status: RoomStatus::Waiting,
        lock_version: 1,
    }));
    let edges = [
        (RoomStatus::Waiting, RoomStatus::Checkin),
        (RoomStatus::Checkin, RoomStatus::Voting),
        (RoomStatus::Voting, RoomStatus::VotingResult),
        (RoomStatus::VotingResult, RoomStatus::ResonanceInitial),
        (RoomStatus::ResonanceInitial, RoomStatus::Playing),
    ];

    let mut handles = Vec::new();
    for _ in 0..10 {
        let row = row.clone();
        handles.push(tokio::spawn(async move {
            let mut applied = 0usize;
            for (from, to) in edges {
                if transition(&row, from, to).await == Outcome::Applied {
                    applied += 1;
                }
            }
            applied
        }));
    }

    let mut total_applied = 0usize;
    for handle in handles {
        total_applied += handle.await.unwrap();
    }

    assert_eq!(
        total_applied,
        edges.len(),
        "each edge applies exactly once across all writers"
    );

    let row = row.lock().await;
    assert_eq!(row.status, RoomStatus::Playing);
    assert_eq!(row.lock_version, 1 + edges.len() as i32);
}

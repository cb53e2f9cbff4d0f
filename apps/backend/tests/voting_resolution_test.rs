//! Voting resolution determinism across the three resolution conditions.

mod common;

use backend::domain::voting::{plurality_winner, resolution};

#[test]
fn plurality_with_two_votes_wins() {
    // Votes {0,0,1,2} over 3 options: index 0 has 2 votes.
    assert_eq!(resolution(&[0, 0, 1, 2], 3, 4, false), Some(0));
}

#[test]
fn three_way_tie_breaks_to_lowest_index() {
    // {0,1,2} with one vote each: countdown expiry resolves to index 0.
    assert_eq!(plurality_winner(&[0, 1, 2], 3), 0);
    assert_eq!(resolution(&[0, 1, 2], 3, 4, true), Some(0));
}

#[test]
fn unanimous_votes_resolve_on_last_cast_not_on_countdown() {
    // Three unanimous votes of four do not resolve...
    assert_eq!(resolution(&[1, 1, 1], 3, 4, false), None);
    // ...the fourth resolves immediately, countdown still running.
    assert_eq!(resolution(&[1, 1, 1, 1], 3, 4, false), Some(1));
}

#[test]
fn split_but_complete_vote_resolves_immediately() {
    assert_eq!(resolution(&[1, 1, 0, 1], 3, 4, false), Some(1));
}

#[test]
fn partial_vote_only_resolves_after_expiry() {
    assert_eq!(resolution(&[2], 3, 4, false), None);
    assert_eq!(resolution(&[2], 3, 4, true), Some(2));
}

#[test]
fn higher_index_plurality_beats_lower_minority() {
    assert_eq!(resolution(&[2, 2, 0, 2], 3, 4, false), Some(2));
}

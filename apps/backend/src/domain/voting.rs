//! Theme-vote resolution rules.
//!
//! Resolution happens under the first of three conditions to occur:
//! unanimity among all active players, all active players having voted
//! (even if split), or countdown expiry. Expiry resolves by plurality with
//! a lowest-index tie-break.

/// Count votes per option index. Out-of-range votes are ignored; the cast
/// path validates the index before a vote is ever stored.
pub fn tally(votes: &[i16], option_count: usize) -> Vec<u32> {
    let mut counts = vec![0u32; option_count];
    for &v in votes {
        if v >= 0 {
            if let Some(slot) = counts.get_mut(v as usize) {
                *slot += 1;
            }
        }
    }
    counts
}

/// Plurality winner with lowest-index tie-break. With no votes cast at all
/// (countdown expired on a silent room) the lowest option wins by default.
pub fn plurality_winner(votes: &[i16], option_count: usize) -> usize {
    let counts = tally(votes, option_count);
    let mut winner = 0usize;
    let mut best = 0u32;
    for (idx, &count) in counts.iter().enumerate() {
        if count > best {
            best = count;
            winner = idx;
        }
    }
    winner
}

pub fn is_unanimous(votes: &[i16]) -> bool {
    match votes.split_first() {
        Some((first, rest)) => rest.iter().all(|v| v == first),
        None => false,
    }
}

/// Evaluate whether the vote resolves now, and to which option index.
///
/// `votes` holds every vote cast so far; `active_count` is the number of
/// active players expected to vote; `expired` reports the shared countdown.
pub fn resolution(
    votes: &[i16],
    option_count: usize,
    active_count: usize,
    expired: bool,
) -> Option<usize> {
    if votes.len() >= active_count && is_unanimous(votes) {
        return Some(votes[0] as usize);
    }
    if votes.len() >= active_count || expired {
        return Some(plurality_winner(votes, option_count));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plurality_picks_most_voted() {
        // {0,0,1,2} over 3 options: index 0 wins with 2 votes.
        assert_eq!(plurality_winner(&[0, 0, 1, 2], 3), 0);
    }

    #[test]
    fn plurality_tie_breaks_to_lowest_index() {
        // {0,1,2}: three-way tie at 1 vote each; lowest index wins.
        assert_eq!(plurality_winner(&[0, 1, 2], 3), 0);
        // {2,1}: tie between 1 and 2; index 1 wins.
        assert_eq!(plurality_winner(&[2, 1], 3), 1);
    }

    #[test]
    fn unanimous_full_vote_resolves_without_expiry() {
        assert_eq!(resolution(&[1, 1, 1, 1], 3, 4, false), Some(1));
    }

    #[test]
    fn split_full_vote_resolves_by_plurality() {
        assert_eq!(resolution(&[1, 1, 0, 1], 3, 4, false), Some(1));
        assert_eq!(resolution(&[0, 0, 1, 2], 3, 4, false), Some(0));
    }

    #[test]
    fn partial_vote_waits_for_countdown() {
        assert_eq!(resolution(&[2, 2, 2], 3, 4, false), None);
        assert_eq!(resolution(&[2, 2, 2], 3, 4, true), Some(2));
    }

    #[test]
    fn expired_with_no_votes_defaults_to_lowest_option() {
        assert_eq!(resolution(&[], 3, 4, true), Some(0));
    }
}

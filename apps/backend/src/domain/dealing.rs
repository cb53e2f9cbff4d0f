//! Deck shuffling and the deterministic initial deal.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::cards::{DECK_SIZE, VALUE_CARDS};
use crate::domain::flow::{INITIAL_HAND_SIZE, PLAYERS};
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Result of dealing the initial hands from a full deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealtHands {
    /// Four hands of three cards, indexed by seat.
    pub hands: [Vec<String>; PLAYERS],
    /// The 24 cards left to draw from.
    pub remainder: Vec<String>,
}

/// Fresh entropy for a new room's deck.
pub fn entropy_seed() -> u64 {
    rand::random()
}

/// Uniform Fisher-Yates permutation of the full value catalog.
///
/// The result is revalidated; a shuffle that loses or duplicates a card is a
/// programmer error, reported as data corruption rather than recovered from.
pub fn shuffled_deck(seed: u64) -> Result<Vec<String>, DomainError> {
    let mut deck: Vec<String> = VALUE_CARDS.iter().map(|s| s.to_string()).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);

    verify_full_deck(&deck)?;
    Ok(deck)
}

/// Verify a deck is a permutation of the catalog: 36 cards, no duplicates.
pub fn verify_full_deck(deck: &[String]) -> Result<(), DomainError> {
    if deck.len() != DECK_SIZE {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("deck has {} cards, expected {DECK_SIZE}", deck.len()),
        ));
    }
    let unique: HashSet<&str> = deck.iter().map(String::as_str).collect();
    if unique.len() != DECK_SIZE {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            "deck contains duplicate cards",
        ));
    }
    Ok(())
}

/// Deal the initial hands: the front 12 cards become four 3-card hands
/// (hand `i` takes positions `[3i, 3i+3)`), the remaining 24 become the new
/// deck. The input must be a full unique deck.
pub fn deal_initial_hands(deck: &[String]) -> Result<DealtHands, DomainError> {
    verify_full_deck(deck).map_err(|_| {
        DomainError::validation_other(format!(
            "cannot deal from a deck of {} cards; a full unique deck is required",
            deck.len()
        ))
    })?;

    let mut hands: [Vec<String>; PLAYERS] = Default::default();
    for (seat, hand) in hands.iter_mut().enumerate() {
        let start = seat * INITIAL_HAND_SIZE;
        *hand = deck[start..start + INITIAL_HAND_SIZE].to_vec();
    }
    let remainder = deck[PLAYERS * INITIAL_HAND_SIZE..].to_vec();

    // Dealt cards and the remainder must be disjoint. Asserted, not assumed.
    let dealt: HashSet<&str> = hands
        .iter()
        .flat_map(|h| h.iter().map(String::as_str))
        .collect();
    if remainder.iter().any(|c| dealt.contains(c.as_str())) {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            "dealt hands overlap the remainder deck",
        ));
    }
    if dealt.len() + remainder.len() != DECK_SIZE {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            "deal lost or duplicated cards",
        ));
    }

    Ok(DealtHands { hands, remainder })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_deterministic_for_a_seed() {
        let d1 = shuffled_deck(42).unwrap();
        let d2 = shuffled_deck(42).unwrap();
        assert_eq!(d1, d2);
    }

    #[test]
    fn different_seeds_produce_different_orders() {
        let d1 = shuffled_deck(111).unwrap();
        let d2 = shuffled_deck(222).unwrap();
        assert_ne!(d1, d2);
    }

    #[test]
    fn shuffle_is_a_permutation_of_the_catalog() {
        let deck = shuffled_deck(7).unwrap();
        let mut sorted = deck.clone();
        sorted.sort();
        let mut catalog: Vec<String> = VALUE_CARDS.iter().map(|s| s.to_string()).collect();
        catalog.sort();
        assert_eq!(sorted, catalog);
    }

    #[test]
    fn deal_produces_four_hands_of_three_and_a_24_card_deck() {
        let deck = shuffled_deck(9).unwrap();
        let dealt = deal_initial_hands(&deck).unwrap();
        for hand in &dealt.hands {
            assert_eq!(hand.len(), 3);
        }
        assert_eq!(dealt.remainder.len(), 24);
    }

    #[test]
    fn deal_slices_front_cards_in_seat_order() {
        let deck = shuffled_deck(13).unwrap();
        let dealt = deal_initial_hands(&deck).unwrap();
        assert_eq!(dealt.hands[0], deck[0..3].to_vec());
        assert_eq!(dealt.hands[1], deck[3..6].to_vec());
        assert_eq!(dealt.hands[2], deck[6..9].to_vec());
        assert_eq!(dealt.hands[3], deck[9..12].to_vec());
        assert_eq!(dealt.remainder, deck[12..].to_vec());
    }

    #[test]
    fn deal_rejects_short_deck() {
        let deck: Vec<String> = VALUE_CARDS[..12].iter().map(|s| s.to_string()).collect();
        assert!(deal_initial_hands(&deck).is_err());
    }

    #[test]
    fn deal_rejects_deck_with_duplicates() {
        let mut deck: Vec<String> = VALUE_CARDS.iter().map(|s| s.to_string()).collect();
        deck[35] = deck[0].clone();
        assert!(deal_initial_hands(&deck).is_err());
    }
}

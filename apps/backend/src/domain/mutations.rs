//! Pure card-mutation core.
//!
//! `CardLayout` is the in-memory aggregate of every card container in a
//! room: the deck, the shared discard pile, and the four hands. The service
//! layer loads it under row locks, applies exactly one mutation, and writes
//! it back in the same transaction, so the conservation invariant (each of
//! the 36 names appears exactly once across all containers) holds after
//! every persisted mutation.

use std::collections::HashMap;

use rand::Rng;

use crate::domain::flow::PLAYERS;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardLayout {
    /// Remaining draw pile; front (index 0) is the next card drawn.
    pub deck: Vec<String>,
    /// Shared board.
    pub discard: Vec<String>,
    /// Hands indexed by seat.
    pub hands: [Vec<String>; PLAYERS],
}

impl CardLayout {
    pub fn new(deck: Vec<String>, discard: Vec<String>, hands: [Vec<String>; PLAYERS]) -> Self {
        Self {
            deck,
            discard,
            hands,
        }
    }

    fn seat_hand_mut(&mut self, seat: usize) -> Result<&mut Vec<String>, DomainError> {
        self.hands
            .get_mut(seat)
            .ok_or_else(|| DomainError::validation_other(format!("seat {seat} out of range")))
    }

    /// Pop the front card off the deck into the seat's hand.
    pub fn draw(&mut self, seat: usize) -> Result<String, DomainError> {
        if self.deck.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::EmptyDeck,
                "The deck has no cards left to draw",
            ));
        }
        let card = self.deck.remove(0);
        self.seat_hand_mut(seat)?.push(card.clone());
        Ok(card)
    }

    /// Move the first matching occurrence of `card` from the seat's hand to
    /// the discard pile.
    pub fn discard(&mut self, seat: usize, card: &str) -> Result<(), DomainError> {
        let hand = self.seat_hand_mut(seat)?;
        let pos = hand.iter().position(|c| c == card).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::CardNotInHand,
                format!("Card '{card}' is not in the hand"),
            )
        })?;
        let removed = hand.remove(pos);
        self.discard.push(removed);
        Ok(())
    }

    /// Swap `hand_card` (in the seat's hand) with `board_card` (on the
    /// discard pile) in place, preserving both slot positions so other
    /// players' view of the board stays stable.
    ///
    /// Two uniqueness guards reject swaps that would duplicate a card:
    /// the hand card must not already sit on the board, and the board card
    /// must not already sit in any hand.
    pub fn exchange(
        &mut self,
        seat: usize,
        hand_card: &str,
        board_card: &str,
    ) -> Result<(), DomainError> {
        if seat >= PLAYERS {
            return Err(DomainError::validation_other(format!(
                "seat {seat} out of range"
            )));
        }

        let hand_pos = self.hands[seat]
            .iter()
            .position(|c| c == hand_card)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::CardNotInHand,
                    format!("Card '{hand_card}' is not in the hand"),
                )
            })?;
        let board_pos = self
            .discard
            .iter()
            .position(|c| c == board_card)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::CardNotOnBoard,
                    format!("Card '{board_card}' is not on the board"),
                )
            })?;

        if self.discard.iter().any(|c| c == hand_card) {
            return Err(DomainError::validation(
                ValidationKind::DuplicateCard,
                format!("Card '{hand_card}' already exists on the board"),
            ));
        }
        if self
            .hands
            .iter()
            .enumerate()
            .any(|(s, hand)| s != seat && hand.iter().any(|c| c == board_card))
        {
            return Err(DomainError::validation(
                ValidationKind::DuplicateCard,
                format!("Card '{board_card}' is already held by another player"),
            ));
        }

        self.hands[seat][hand_pos] = board_card.to_string();
        self.discard[board_pos] = hand_card.to_string();
        Ok(())
    }

    /// Pull random deck cards onto the discard pile until it reaches
    /// `target` (or the deck runs dry). Deck cards are by construction not
    /// held by anyone. Explicit repair operation, never invoked automatically.
    pub fn replenish_discard<R: Rng>(&mut self, target: usize, rng: &mut R) -> usize {
        let mut moved = 0;
        while self.discard.len() < target && !self.deck.is_empty() {
            let idx = rng.random_range(0..self.deck.len());
            let card = self.deck.remove(idx);
            self.discard.push(card);
            moved += 1;
        }
        moved
    }

    /// Names that appear more than once across every container. An empty
    /// result means the conservation invariant holds for multiplicity.
    pub fn duplicate_names(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for card in self.iter_all() {
            *counts.entry(card).or_insert(0) += 1;
        }
        let mut dups: Vec<(String, usize)> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, n)| (name.to_string(), n))
            .collect();
        dups.sort();
        dups
    }

    /// Total cards across all containers.
    pub fn total_cards(&self) -> usize {
        self.deck.len() + self.discard.len() + self.hands.iter().map(Vec::len).sum::<usize>()
    }

    fn iter_all(&self) -> impl Iterator<Item = &str> {
        self.deck
            .iter()
            .chain(self.discard.iter())
            .chain(self.hands.iter().flatten())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::domain::dealing::{deal_initial_hands, shuffled_deck};

    fn dealt_layout(seed: u64) -> CardLayout {
        let deck = shuffled_deck(seed).unwrap();
        let dealt = deal_initial_hands(&deck).unwrap();
        CardLayout::new(dealt.remainder, Vec::new(), dealt.hands)
    }

    #[test]
    fn draw_moves_front_card_into_hand() {
        let mut layout = dealt_layout(1);
        let expected = layout.deck[0].clone();
        let drawn = layout.draw(2).unwrap();
        assert_eq!(drawn, expected);
        assert_eq!(layout.hands[2].len(), 4);
        assert_eq!(layout.deck.len(), 23);
        assert_eq!(layout.total_cards(), 36);
    }

    #[test]
    fn draw_from_empty_deck_is_rejected() {
        let mut layout = dealt_layout(2);
        layout.deck.clear();
        let err = layout.draw(0).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::EmptyDeck, _)
        ));
    }

    #[test]
    fn discard_moves_card_to_board() {
        let mut layout = dealt_layout(3);
        let card = layout.hands[1][0].clone();
        layout.discard(1, &card).unwrap();
        assert_eq!(layout.hands[1].len(), 2);
        assert_eq!(layout.discard, vec![card]);
        assert_eq!(layout.total_cards(), 36);
    }

    #[test]
    fn discard_of_unheld_card_is_rejected_and_state_unchanged() {
        let mut layout = dealt_layout(4);
        let before = layout.clone();
        let missing = layout.deck[0].clone();
        let err = layout.discard(0, &missing).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::CardNotInHand, _)
        ));
        assert_eq!(layout, before);
    }

    #[test]
    fn exchange_swaps_in_place() {
        let mut layout = dealt_layout(5);
        let hand_card = layout.hands[0][1].clone();
        layout.discard(0, &hand_card).unwrap();

        let swap_out = layout.hands[0][0].clone();
        layout.exchange(0, &swap_out, &hand_card).unwrap();

        assert_eq!(layout.hands[0][0], hand_card);
        assert_eq!(layout.discard[0], swap_out);
        assert_eq!(layout.total_cards(), 36);
        assert!(layout.duplicate_names().is_empty());
    }

    #[test]
    fn exchange_rejects_hand_card_already_on_board() {
        let mut layout = dealt_layout(6);
        // Corrupt the state so a hand card is also on the board.
        let dup = layout.hands[0][0].clone();
        layout.discard.push(dup.clone());
        let board_card = layout.discard[0].clone();
        let before = layout.clone();

        let err = layout.exchange(0, &dup, &board_card).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::DuplicateCard, _)
        ));
        assert_eq!(layout, before, "failed exchange must leave state unchanged");
    }

    #[test]
    fn exchange_rejects_board_card_held_elsewhere() {
        let mut layout = dealt_layout(7);
        // Corrupt the state so the board card is also held by seat 2.
        let board_card = layout.hands[2][0].clone();
        layout.discard.push(board_card.clone());
        let hand_card = layout.hands[0][0].clone();
        let before = layout.clone();

        let err = layout.exchange(0, &hand_card, &board_card).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::DuplicateCard, _)
        ));
        assert_eq!(layout, before);
    }

    #[test]
    fn replenish_tops_up_the_board_from_the_deck() {
        let mut layout = dealt_layout(8);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let moved = layout.replenish_discard(12, &mut rng);
        assert_eq!(moved, 12);
        assert_eq!(layout.discard.len(), 12);
        assert_eq!(layout.deck.len(), 12);
        assert_eq!(layout.total_cards(), 36);
        assert!(layout.duplicate_names().is_empty());
    }

    #[test]
    fn duplicate_names_reports_corruption() {
        let mut layout = dealt_layout(9);
        let dup = layout.hands[0][0].clone();
        layout.hands[3].push(dup.clone());
        let dups = layout.duplicate_names();
        assert_eq!(dups, vec![(dup, 2)]);
    }
}

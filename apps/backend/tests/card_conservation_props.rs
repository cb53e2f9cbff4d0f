//! Property tests for global card conservation.
//!
//! For any sequence of draw/discard/exchange/replenish operations starting
//! from a freshly dealt room, the multiset of card names across deck, board,
//! and hands stays exactly the 36-card catalog: nothing duplicated, nothing
//! lost. Rejected operations must leave the layout untouched.

mod common;

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use backend::domain::cards::{DECK_SIZE, VALUE_CARDS};
use backend::domain::dealing::{deal_initial_hands, shuffled_deck};
use backend::domain::mutations::CardLayout;

#[derive(Debug, Clone)]
enum Op {
    Draw { seat: usize },
    Discard { seat: usize, card_pick: usize },
    Exchange { seat: usize, hand_pick: usize, board_pick: usize },
    Replenish { target: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(|seat| Op::Draw { seat }),
        (0usize..4, 0usize..8).prop_map(|(seat, card_pick)| Op::Discard { seat, card_pick }),
        (0usize..4, 0usize..8, 0usize..16).prop_map(|(seat, hand_pick, board_pick)| {
            Op::Exchange {
                seat,
                hand_pick,
                board_pick,
            }
        }),
        (0usize..16).prop_map(|target| Op::Replenish { target }),
    ]
}

fn dealt_layout(seed: u64) -> CardLayout {
    let deck = shuffled_deck(seed).expect("catalog shuffles cleanly");
    let dealt = deal_initial_hands(&deck).expect("full deck deals cleanly");
    CardLayout::new(dealt.remainder, Vec::new(), dealt.hands)
}

fn assert_conserved(layout: &CardLayout) {
    assert_eq!(layout.total_cards(), DECK_SIZE, "card count must stay 36");
    assert!(
        layout.duplicate_names().is_empty(),
        "no card name may appear twice"
    );

    let names: HashSet<&str> = layout
        .deck
        .iter()
        .chain(layout.discard.iter())
        .chain(layout.hands.iter().flatten())
        .map(String::as_str)
        .collect();
    let catalog: HashSet<&str> = VALUE_CARDS.iter().copied().collect();
    assert_eq!(names, catalog, "composition must stay the full catalog");
}

fn apply(layout: &mut CardLayout, op: &Op, rng_seed: u64) {
    let before = layout.clone();
    let result = match op {
        Op::Draw { seat } => layout.draw(*seat).map(|_| ()),
        Op::Discard { seat, card_pick } => {
            let card = layout.hands[*seat]
                .get(card_pick % layout.hands[*seat].len().max(1))
                .cloned();
            match card {
                Some(card) => layout.discard(*seat, &card),
                None => return,
            }
        }
        Op::Exchange {
            seat,
            hand_pick,
            board_pick,
        } => {
            let hand_card = layout.hands[*seat]
                .get(hand_pick % layout.hands[*seat].len().max(1))
                .cloned();
            let board_card = layout
                .discard
                .get(board_pick % layout.discard.len().max(1))
                .cloned();
            match (hand_card, board_card) {
                (Some(hand_card), Some(board_card)) => {
                    layout.exchange(*seat, &hand_card, &board_card)
                }
                _ => return,
            }
        }
        Op::Replenish { target } => {
            let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
            layout.replenish_discard(*target, &mut rng);
            Ok(())
        }
    };

    if result.is_err() {
        assert_eq!(
            *layout, before,
            "a rejected operation must leave the layout unchanged"
        );
    }
}

proptest! {
    #[test]
    fn conservation_holds_across_operation_sequences(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut layout = dealt_layout(seed);
        assert_conserved(&layout);

        for (i, op) in ops.iter().enumerate() {
            apply(&mut layout, op, seed.wrapping_add(i as u64));
            assert_conserved(&layout);
        }
    }

    #[test]
    fn draws_never_exceed_the_deck(seed in any::<u64>()) {
        let mut layout = dealt_layout(seed);
        // 24 draws empty the deck; the 25th must fail and change nothing.
        for seat in (0..4).cycle().take(24) {
            layout.draw(seat).expect("deck still has cards");
        }
        let before = layout.clone();
        prop_assert!(layout.draw(0).is_err());
        prop_assert_eq!(layout, before);
    }
}

#[test]
fn exchange_duplicate_guards_reject_and_preserve_state() {
    let mut layout = dealt_layout(11);
    let hand_card = layout.hands[1][0].clone();
    layout.discard(1, &hand_card).expect("discard own card");

    // Guard 1: hand card already on the board.
    let dup = layout.hands[1][0].clone();
    layout.discard.push(dup.clone());
    let before = layout.clone();
    assert!(layout.exchange(1, &dup, &hand_card).is_err());
    assert_eq!(layout, before);

    // Guard 2: board card also held by another seat.
    let mut layout = dealt_layout(12);
    let held_elsewhere = layout.hands[3][0].clone();
    layout.discard.push(held_elsewhere.clone());
    let own = layout.hands[0][0].clone();
    let before = layout.clone();
    assert!(layout.exchange(0, &own, &held_elsewhere).is_err());
    assert_eq!(layout, before);
}

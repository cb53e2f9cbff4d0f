//! End-to-end setup scenario at the domain level, plus final-phase
//! completion rules.

mod common;

use backend::domain::cards::DECK_SIZE;
use backend::domain::dealing::{deal_initial_hands, shuffled_deck};
use backend::domain::flow::{advance_final_turn, advance_turn, playing_transition, FinalAdvance};
use backend::domain::mutations::CardLayout;
use backend::domain::voting::resolution;
use backend::entities::rooms::RoomStatus;

/// Fresh shuffle, deal, and a 3-of-4 plurality vote over ["A","B","C"]:
/// the purpose card is "B", hands hold 3 cards each, the deck 24, the
/// board none.
#[test]
fn fresh_room_setup_scenario() {
    let deck = shuffled_deck(2026).expect("full deck shuffles");
    assert_eq!(deck.len(), DECK_SIZE);

    let options = ["A", "B", "C"];
    let winner = resolution(&[1, 1, 0, 1], options.len(), 4, false)
        .expect("complete vote resolves immediately");
    assert_eq!(options[winner], "B");

    let dealt = deal_initial_hands(&deck).expect("deal succeeds");
    let layout = CardLayout::new(dealt.remainder, Vec::new(), dealt.hands);

    for hand in &layout.hands {
        assert_eq!(hand.len(), 3);
    }
    assert_eq!(layout.deck.len(), 24);
    assert!(layout.discard.is_empty());
    assert_eq!(layout.total_cards(), DECK_SIZE);
    assert!(layout.duplicate_names().is_empty());
}

/// Playing rounds: four discards wrap the turn and bump the round; round 3
/// owes the exchange, round 5 (after the exchange) owes the final phase.
#[test]
fn round_progression_reaches_exchange_then_final() {
    let mut turn = 0i16;
    let mut round = 0i16;

    // Three full rounds of play.
    for _ in 0..12 {
        let advance = advance_turn(turn, round);
        turn = advance.next_turn;
        round = advance.round_number;
    }
    assert_eq!((turn, round), (0, 3));
    assert!(matches!(
        playing_transition(round, false),
        Some(backend::domain::flow::PlayTransition::EnterExchange)
    ));

    // Exchange done; two more rounds reach the final phase.
    for _ in 0..8 {
        let advance = advance_turn(turn, round);
        turn = advance.next_turn;
        round = advance.round_number;
    }
    assert_eq!(round, 5);
    assert!(matches!(
        playing_transition(round, true),
        Some(backend::domain::flow::PlayTransition::EnterFinalResonance)
    ));
}

/// After seat 3 completes reflection the room is terminal and the turn does
/// not advance further; both terminal spellings are accepted on read.
#[test]
fn final_phase_completes_after_seat_three() {
    assert_eq!(advance_final_turn(0), FinalAdvance::NextSeat(1));
    assert_eq!(advance_final_turn(1), FinalAdvance::NextSeat(2));
    assert_eq!(advance_final_turn(2), FinalAdvance::NextSeat(3));
    assert_eq!(advance_final_turn(3), FinalAdvance::Complete);

    let canonical = RoomStatus::from_wire("COMPLETED").unwrap();
    let legacy = RoomStatus::from_wire("COMPLETE").unwrap();
    assert_eq!(canonical, legacy);
    assert!(canonical.is_terminal());
}

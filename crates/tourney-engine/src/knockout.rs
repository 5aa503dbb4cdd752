//! Seeded single-elimination bracket pairing.
//!
//! Round 1 seeds the field by rating (starting rank as tie-break) into a
//! bracket rounded up to the next power of two, placed so that top seeds
//! meet as late as possible (1 vs lowest, 2 vs second-lowest, halving
//! recursively). Phantom seeds become full-point byes that auto-advance
//! the real player. Later rounds pair the winner slots of the previous
//! round in bracket order. Draws are not terminal here: resolving them
//! (playoff games, sudden death) is an arbiter concern, so an unresolved
//! draw fails pairing instead of guessing a winner.

use tracing::debug;

use crate::colors;
use crate::error::PairingError;
use crate::state::{Pairing, Round, Tournament, TournamentPlayer};
use tourney_core::{GameResult, PlayerId};

pub(crate) fn pair(t: &Tournament, round_number: u32) -> Result<Round, PairingError> {
    let slots = if round_number == 1 {
        first_round_slots(t)
    } else {
        winner_slots(t, round_number)?
    };

    // The pairing list preserves bracket slot order (byes interleaved,
    // board numbers dense over the games): the next round reads winners
    // positionally, so reordering here would scramble the bracket.
    let mut pairings = Vec::with_capacity(slots.len() / 2);
    let mut board = 1;
    for chunk in slots.chunks(2) {
        let a = chunk[0];
        let b = chunk.get(1).copied().flatten();
        match (a, b) {
            (Some(x), Some(y)) => {
                // Balance rule as elsewhere; with no history the earlier
                // bracket slot (the better seed) takes White.
                let a_white = colors::first_takes_white(x, y, true);
                let (white, black) = if a_white { (x, y) } else { (y, x) };
                pairings.push(Pairing::game(
                    round_number,
                    board,
                    white.player.id.clone(),
                    black.player.id.clone(),
                ));
                board += 1;
            }
            (Some(x), None) | (None, Some(x)) => {
                debug!(player = %x.player.id, round = round_number, "bracket bye, auto-advancing");
                pairings.push(Pairing::bye(round_number, x.player.id.clone()));
            }
            (None, None) => {
                return Err(PairingError::Infeasible {
                    round: round_number,
                    player: nearest_player(&slots)
                        .unwrap_or_else(|| PlayerId::from("(empty bracket)")),
                    constraint: "adjacent bracket slots are both empty".to_string(),
                })
            }
        }
    }
    Ok(Round::new(round_number, pairings))
}

/// Seeds the active field into a power-of-two bracket in standard
/// placement order; slots beyond the field are `None` (byes).
fn first_round_slots(t: &Tournament) -> Vec<Option<&TournamentPlayer>> {
    let mut seeds: Vec<&TournamentPlayer> = t.active_players().collect();
    seeds.sort_by(|a, b| {
        b.player
            .rating
            .cmp(&a.player.rating)
            .then_with(|| a.starting_rank.cmp(&b.starting_rank))
    });
    let bracket = seeds.len().next_power_of_two().max(2);
    seeding_order(bracket)
        .into_iter()
        .map(|seed| seeds.get(seed - 1).copied())
        .collect()
}

/// The winner of each previous-round pairing, in bracket order. A bye
/// advances its player; a double forfeit (or a winner who has since
/// withdrawn) leaves the slot empty; a draw has no winner and is an
/// error.
fn winner_slots<'a>(
    t: &'a Tournament,
    round_number: u32,
) -> Result<Vec<Option<&'a TournamentPlayer>>, PairingError> {
    let previous = t.round(round_number - 1).ok_or_else(|| {
        PairingError::Inconsistency(format!("round {} is missing", round_number - 1))
    })?;

    let mut slots = Vec::with_capacity(previous.pairings.len());
    for pairing in &previous.pairings {
        let winner: Option<&PlayerId> = if let Some(bye) = pairing.bye_player() {
            Some(bye)
        } else {
            match pairing.result {
                Some(GameResult::WhiteWin) | Some(GameResult::WhiteForfeitWin) => {
                    pairing.white.as_ref()
                }
                Some(GameResult::BlackWin) | Some(GameResult::BlackForfeitWin) => {
                    pairing.black.as_ref()
                }
                Some(GameResult::DoubleForfeit) => None,
                Some(GameResult::Draw) => {
                    return Err(PairingError::Infeasible {
                        round: round_number,
                        player: pairing
                            .white
                            .clone()
                            .expect("game pairing has white"),
                        constraint: "previous round has an unresolved draw".to_string(),
                    })
                }
                None => {
                    return Err(PairingError::Inconsistency(format!(
                        "round {} has an unrecorded result",
                        round_number - 1
                    )))
                }
            }
        };
        // A winner who withdrew before this round forfeits the slot.
        slots.push(
            winner
                .and_then(|id| t.player(id))
                .filter(|p| p.is_pairable()),
        );
    }
    Ok(slots)
}

fn nearest_player<'a>(slots: &[Option<&'a TournamentPlayer>]) -> Option<PlayerId> {
    slots
        .iter()
        .flatten()
        .next()
        .map(|p| p.player.id.clone())
}

/// Standard bracket placement for a power-of-two size: 1 meets the lowest
/// seed, 2 the second-lowest, recursively halving, so consecutive slot
/// pairs form the first-round boards.
fn seeding_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let doubled = order.len() * 2;
        let mut next = Vec::with_capacity(doubled);
        for &seed in &order {
            next.push(seed);
            next.push(doubled + 1 - seed);
        }
        order = next;
    }
    order
}

//! Round-robin pairing via the circle (Berger) method.
//!
//! Players sit around a circle; one seat is fixed and the rest rotate by
//! one position per round, so every pair meets exactly once per cycle.
//! The lineup for any round is computed by index arithmetic from the seat
//! order; no table is stored. An odd field puts a dummy in the fixed
//! seat, which hands out exactly one bye per round and leaves every
//! player's colors perfectly balanced over the cycle. A second cycle
//! (double round-robin) replays the circle with colors reversed.
//!
//! Seats are keyed to starting rank over the full field, so a mid-event
//! withdrawal does not reshuffle the remaining schedule: the withdrawn
//! player's opponents simply receive byes.

use crate::error::PairingError;
use crate::state::{Pairing, Round, Tournament, TournamentPlayer};

pub(crate) fn pair(t: &Tournament, round_number: u32) -> Result<Round, PairingError> {
    let mut seats: Vec<Option<&TournamentPlayer>> = t.players().iter().map(Some).collect();
    seats.sort_by_key(|p| p.map(|p| p.starting_rank));
    if seats.len() % 2 == 1 {
        seats.insert(0, None);
    }
    let n = seats.len();
    if n < 2 {
        return Err(PairingError::Inconsistency(
            "round-robin requires at least two players".to_string(),
        ));
    }

    let cycle = (n - 1) as u32;
    let rotation = (round_number - 1) % cycle;
    let reversed = ((round_number - 1) / cycle) % 2 == 1;

    // Seat 0 stays fixed; the rest rotate right by one per round.
    let lineup_at = |k: usize| -> Option<&TournamentPlayer> {
        if k == 0 {
            seats[0]
        } else {
            let idx = (k - 1 + (cycle - rotation) as usize) % cycle as usize;
            seats[1 + idx]
        }
    };

    let mut games: Vec<(&TournamentPlayer, &TournamentPlayer)> = Vec::new();
    let mut byes: Vec<&TournamentPlayer> = Vec::new();
    for i in 0..n / 2 {
        let a = lineup_at(i);
        let b = lineup_at(n - 1 - i);
        let a = a.filter(|p| p.is_pairable());
        let b = b.filter(|p| p.is_pairable());
        match (a, b) {
            (Some(x), Some(y)) => {
                // Upper circle position takes White, except on the fixed
                // board, where the fixed player alternates by round.
                let upper_white = if i == 0 { rotation % 2 == 1 } else { true };
                let (white, black) = if upper_white ^ reversed {
                    (x, y)
                } else {
                    (y, x)
                };
                games.push((white, black));
            }
            (Some(x), None) | (None, Some(x)) => byes.push(x),
            (None, None) => {}
        }
    }

    let mut pairings = Vec::with_capacity(games.len() + byes.len());
    for (board, (white, black)) in games.iter().enumerate() {
        pairings.push(Pairing::game(
            round_number,
            board as u32 + 1,
            white.player.id.clone(),
            black.player.id.clone(),
        ));
    }
    for bye in byes {
        pairings.push(Pairing::bye(round_number, bye.player.id.clone()));
    }
    Ok(Round::new(round_number, pairings))
}

//! Standings builder.
//!
//! Recomputed from scratch on every call: tournament fields are small
//! (tens to low hundreds of players), so recomputation buys correctness
//! for free. The sort key is total: score, then each configured tiebreak
//! in order, then starting rank, so ranks are dense and no two entries
//! ever share one.

use serde::Serialize;
use std::cmp::Ordering;

use tourney_core::{PlayerId, PlayerStatus, TiebreakSystem};

use crate::state::Tournament;
use crate::tiebreak::{completed_score, compute_tiebreak};

/// One tiebreak value, labeled with its system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiebreakScore {
    pub system: TiebreakSystem,
    pub value: f64,
}

/// One row of the standings table. Plain data; formatting is the
/// caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsEntry {
    /// 1-based rank; strictly increasing, never shared.
    pub rank: u32,
    pub player: PlayerId,
    pub name: String,
    pub rating: u32,
    pub status: PlayerStatus,
    pub starting_rank: u32,
    /// Score over completed rounds, byes included.
    pub score: f64,
    /// Tiebreak values in the tournament's configured order.
    pub tiebreaks: Vec<TiebreakScore>,
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub byes: u32,
    /// +1 per White game, -1 per Black game, completed rounds only.
    pub color_balance: i32,
}

/// Builds the ranked standings table for the tournament's completed
/// rounds. Withdrawn and expelled players keep their rows; they are only
/// excluded from future pairing.
pub fn build_standings(t: &Tournament) -> Vec<StandingsEntry> {
    let mut entries: Vec<StandingsEntry> = t
        .players()
        .iter()
        .map(|tp| {
            let id = &tp.player.id;
            let score = completed_score(t, id);
            let tied_with: Vec<PlayerId> = t
                .players()
                .iter()
                .filter(|other| completed_score(t, &other.player.id) == score)
                .map(|other| other.player.id.clone())
                .collect();
            let tiebreaks = t
                .tiebreaks
                .iter()
                .map(|&system| TiebreakScore {
                    system,
                    value: compute_tiebreak(system, t, id, &tied_with),
                })
                .collect();

            let mut entry = StandingsEntry {
                rank: 0,
                player: id.clone(),
                name: tp.player.name.clone(),
                rating: tp.player.rating,
                status: tp.player.status,
                starting_rank: tp.starting_rank,
                score,
                tiebreaks,
                games: 0,
                wins: 0,
                draws: 0,
                losses: 0,
                byes: 0,
                color_balance: 0,
            };
            tally_games(t, &mut entry);
            entry
        })
        .collect();

    entries.sort_by(compare_entries);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
    entries
}

fn tally_games(t: &Tournament, entry: &mut StandingsEntry) {
    for pairing in t.completed_rounds().flat_map(|r| &r.pairings) {
        if !pairing.involves(&entry.player) {
            continue;
        }
        if pairing.is_bye() {
            entry.byes += 1;
            continue;
        }
        entry.games += 1;
        if let Some(color) = pairing.color_of(&entry.player) {
            entry.color_balance += color.balance_delta();
        }
        match pairing.points_for(&entry.player) {
            Some(p) if p == 1.0 => entry.wins += 1,
            Some(p) if p == 0.5 => entry.draws += 1,
            _ => entry.losses += 1,
        }
    }
}

/// Score descending, tiebreaks descending in configured order, starting
/// rank ascending. The starting rank is unique, so the order is total.
fn compare_entries(a: &StandingsEntry, b: &StandingsEntry) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| {
            for (ta, tb) in a.tiebreaks.iter().zip(&b.tiebreaks) {
                match tb.value.total_cmp(&ta.value) {
                    Ordering::Equal => continue,
                    unequal => return unequal,
                }
            }
            Ordering::Equal
        })
        .then_with(|| a.starting_rank.cmp(&b.starting_rank))
}

//! Tiebreak calculators.
//!
//! Stateless functions over (tournament, player). Every calculator reads
//! completed rounds only, so standings derived from them are reproducible
//! for any completed prefix of the schedule: results trickling in for an
//! active round change nothing until the round closes.

use tourney_core::{PlayerId, TiebreakSystem};

use crate::state::Tournament;

/// A player's score counting completed rounds only (byes included).
pub fn completed_score(t: &Tournament, player: &PlayerId) -> f64 {
    t.completed_rounds()
        .flat_map(|r| &r.pairings)
        .filter_map(|p| p.points_for(player))
        .sum()
}

/// Computes one tiebreak value for a player. `tied_with` is the set of
/// players sharing the main score (the player included); only the direct
/// encounter system reads it.
pub fn compute_tiebreak(
    system: TiebreakSystem,
    t: &Tournament,
    player: &PlayerId,
    tied_with: &[PlayerId],
) -> f64 {
    match system {
        TiebreakSystem::DirectEncounter => direct_encounter(t, player, tied_with),
        TiebreakSystem::Buchholz => buchholz(t, player, 0, 0),
        TiebreakSystem::BuchholzCut1 => buchholz(t, player, 1, 0),
        TiebreakSystem::BuchholzMedian => buchholz(t, player, 1, 1),
        TiebreakSystem::SonnebornBerger => sonneborn_berger(t, player),
    }
}

/// Completed games of a player: (opponent, own points in that game).
fn completed_games<'a>(
    t: &'a Tournament,
    player: &'a PlayerId,
) -> impl Iterator<Item = (&'a PlayerId, f64)> + 'a {
    t.completed_rounds()
        .flat_map(|r| &r.pairings)
        .filter(|p| !p.is_bye())
        .filter_map(move |p| {
            let opponent = p.opponent_of(player)?;
            let points = p.points_for(player)?;
            Some((opponent, points))
        })
}

/// Sum of opponents' final scores, with the lowest `cut_low` and highest
/// `cut_high` opponent scores dropped. Byes contribute no opponent.
fn buchholz(t: &Tournament, player: &PlayerId, cut_low: usize, cut_high: usize) -> f64 {
    let mut opponent_scores: Vec<f64> = completed_games(t, player)
        .map(|(opponent, _)| completed_score(t, opponent))
        .collect();
    opponent_scores.sort_by(f64::total_cmp);
    let end = opponent_scores.len().saturating_sub(cut_high);
    let start = cut_low.min(end);
    opponent_scores[start..end].iter().sum()
}

/// Sum over games of own points times the opponent's final score; a draw
/// contributes half the opponent's score.
fn sonneborn_berger(t: &Tournament, player: &PlayerId) -> f64 {
    completed_games(t, player)
        .map(|(opponent, points)| points * completed_score(t, opponent))
        .sum()
}

/// Points earned against the players tied on main score. Applicable only
/// when every pair within the tied group has met; otherwise the system is
/// neutral (0 for every member).
fn direct_encounter(t: &Tournament, player: &PlayerId, tied_with: &[PlayerId]) -> f64 {
    let all_met = tied_with.iter().enumerate().all(|(i, a)| {
        tied_with[i + 1..]
            .iter()
            .all(|b| met_in_completed_round(t, a, b))
    });
    if !all_met {
        return 0.0;
    }
    completed_games(t, player)
        .filter(|(opponent, _)| tied_with.contains(opponent))
        .map(|(_, points)| points)
        .sum()
}

fn met_in_completed_round(t: &Tournament, a: &PlayerId, b: &PlayerId) -> bool {
    t.completed_rounds()
        .flat_map(|r| &r.pairings)
        .any(|p| p.opponent_of(a) == Some(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Pairing, Round};
    use tourney_core::{GameResult, Player, TournamentFormat};

    /// Three completed rounds among four players with fixed results:
    ///   r1: p1 beats p4, p2 beats p3
    ///   r2: p1 beats p3, p2 draws p4
    ///   r3: p1 draws p2, p3 beats p4
    /// Final scores: p1 2.5, p2 2.0, p3 1.0, p4 0.5.
    fn fixture() -> Tournament {
        let mut t = Tournament::new("t", "Fixture", TournamentFormat::RoundRobin, 3, vec![]);
        for i in 1..=4u32 {
            t.add_player(Player::new(
                format!("p{i}"),
                format!("Player {i}"),
                2000 - i * 10,
            ))
            .unwrap();
        }
        t.start().unwrap();

        let rounds = [
            vec![("p1", "p4"), ("p2", "p3")],
            vec![("p1", "p3"), ("p2", "p4")],
            vec![("p1", "p2"), ("p3", "p4")],
        ];
        let results = [
            vec![GameResult::WhiteWin, GameResult::WhiteWin],
            vec![GameResult::WhiteWin, GameResult::Draw],
            vec![GameResult::Draw, GameResult::WhiteWin],
        ];
        for (i, games) in rounds.iter().enumerate() {
            let number = i as u32 + 1;
            let pairings = games
                .iter()
                .enumerate()
                .map(|(b, (w, bl))| Pairing::game(number, b as u32 + 1, (*w).into(), (*bl).into()))
                .collect();
            t.install_round(Round::new(number, pairings)).unwrap();
            for (b, result) in results[i].iter().enumerate() {
                t.record_result(number, b as u32 + 1, *result).unwrap();
            }
        }
        t
    }

    #[test]
    fn completed_scores_match_results() {
        let t = fixture();
        assert_eq!(completed_score(&t, &"p1".into()), 2.5);
        assert_eq!(completed_score(&t, &"p2".into()), 2.0);
        assert_eq!(completed_score(&t, &"p3".into()), 1.0);
        assert_eq!(completed_score(&t, &"p4".into()), 0.5);
    }

    #[test]
    fn active_round_results_are_excluded() {
        let mut t = fixture();
        // A fourth round with a half-recorded upset changes nothing yet.
        t.install_round(Round::new(
            4,
            vec![
                Pairing::game(4, 1, "p4".into(), "p1".into()),
                Pairing::game(4, 2, "p3".into(), "p2".into()),
            ],
        ))
        .unwrap();
        t.record_result(4, 1, GameResult::WhiteWin).unwrap();

        assert_eq!(completed_score(&t, &"p1".into()), 2.5);
        assert_eq!(completed_score(&t, &"p4".into()), 0.5);
        assert_eq!(
            compute_tiebreak(TiebreakSystem::Buchholz, &t, &"p1".into(), &[]),
            3.5
        );
    }

    #[test]
    fn buchholz_sums_opponent_scores() {
        let t = fixture();
        // p1 faced p4 (0.5), p3 (1.0), p2 (2.0).
        assert_eq!(
            compute_tiebreak(TiebreakSystem::Buchholz, &t, &"p1".into(), &[]),
            3.5
        );
        // Cut 1 drops the weakest opponent (p4).
        assert_eq!(
            compute_tiebreak(TiebreakSystem::BuchholzCut1, &t, &"p1".into(), &[]),
            3.0
        );
        // Median drops weakest and strongest (p4 and p2).
        assert_eq!(
            compute_tiebreak(TiebreakSystem::BuchholzMedian, &t, &"p1".into(), &[]),
            1.0
        );
    }

    #[test]
    fn buchholz_cut_with_fewer_games_than_cuts() {
        let mut t = Tournament::new("t", "Tiny", TournamentFormat::Swiss, 2, vec![]);
        t.add_player(Player::new("a", "A", 1500)).unwrap();
        t.add_player(Player::new("b", "B", 1400)).unwrap();
        t.start().unwrap();
        t.install_round(Round::new(
            1,
            vec![Pairing::game(1, 1, "a".into(), "b".into())],
        ))
        .unwrap();
        t.record_result(1, 1, GameResult::WhiteWin).unwrap();

        // One opponent, median cuts both ends: nothing remains.
        assert_eq!(
            compute_tiebreak(TiebreakSystem::BuchholzMedian, &t, &"a".into(), &[]),
            0.0
        );
    }

    #[test]
    fn sonneborn_berger_weights_wins_and_draws() {
        let t = fixture();
        // p1: beat p4 (0.5) and p3 (1.0), drew p2 (2.0):
        // 1*0.5 + 1*1.0 + 0.5*2.0 = 2.5.
        assert_eq!(
            compute_tiebreak(TiebreakSystem::SonnebornBerger, &t, &"p1".into(), &[]),
            2.5
        );
        // p4: lost twice, drew p2: 0.5*2.0 = 1.0.
        assert_eq!(
            compute_tiebreak(TiebreakSystem::SonnebornBerger, &t, &"p4".into(), &[]),
            1.0
        );
    }

    #[test]
    fn direct_encounter_scores_the_tied_group() {
        let t = fixture();
        let tied: Vec<_> = vec!["p1".into(), "p2".into()];
        // p1 drew p2: half a point each from the mutual game.
        assert_eq!(
            compute_tiebreak(TiebreakSystem::DirectEncounter, &t, &"p1".into(), &tied),
            0.5
        );
        assert_eq!(
            compute_tiebreak(TiebreakSystem::DirectEncounter, &t, &"p2".into(), &tied),
            0.5
        );
    }

    #[test]
    fn direct_encounter_neutral_when_group_has_not_all_met() {
        let mut t = Tournament::new("t", "Tiny", TournamentFormat::Swiss, 2, vec![]);
        for id in ["a", "b", "c", "d"] {
            t.add_player(Player::new(id, id.to_uppercase(), 1500))
                .unwrap();
        }
        t.start().unwrap();
        t.install_round(Round::new(
            1,
            vec![
                Pairing::game(1, 1, "a".into(), "b".into()),
                Pairing::game(1, 2, "c".into(), "d".into()),
            ],
        ))
        .unwrap();
        t.record_result(1, 1, GameResult::WhiteWin).unwrap();
        t.record_result(1, 2, GameResult::WhiteWin).unwrap();

        // a and c are tied on 1.0 but never met.
        let tied: Vec<_> = vec!["a".into(), "c".into()];
        assert_eq!(
            compute_tiebreak(TiebreakSystem::DirectEncounter, &t, &"a".into(), &tied),
            0.0
        );
    }

    #[test]
    fn byes_add_points_but_no_opponent() {
        let mut t = Tournament::new("t", "Odd", TournamentFormat::Swiss, 1, vec![]);
        for id in ["a", "b", "c"] {
            t.add_player(Player::new(id, id.to_uppercase(), 1500))
                .unwrap();
        }
        t.start().unwrap();
        t.install_round(Round::new(
            1,
            vec![
                Pairing::game(1, 1, "a".into(), "b".into()),
                Pairing::bye(1, "c".into()),
            ],
        ))
        .unwrap();
        t.record_result(1, 1, GameResult::Draw).unwrap();

        assert_eq!(completed_score(&t, &"c".into()), 1.0);
        // The bye is not a game: no Buchholz contribution.
        assert_eq!(
            compute_tiebreak(TiebreakSystem::Buchholz, &t, &"c".into(), &[]),
            0.0
        );
    }
}

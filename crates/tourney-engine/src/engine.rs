//! The pairing engine: precondition checks, strategy dispatch, and a
//! structural re-check of whatever the strategy produced.
//!
//! The engine holds no state between calls: it is a pure dispatcher over
//! the supplied tournament snapshot, so it is trivially re-entrant. The
//! returned round is not installed; the caller decides whether to commit
//! it via [`Tournament::install_round`].

use std::collections::HashSet;

use tracing::debug;

use tourney_core::TournamentFormat;

use crate::error::{PairingError, PreconditionViolation};
use crate::state::{Round, RoundStatus, Tournament, TournamentStatus};
use crate::{knockout, round_robin, swiss};

/// Generates the pairings for the given round number.
///
/// Preconditions, each a distinct [`PreconditionViolation`]: the
/// tournament must be active, the round number must be exactly the next
/// one, the previous round must be completed, and the round must exist in
/// the configured schedule.
///
/// # Errors
///
/// Returns [`PairingError::Infeasible`] when no legal pairing exists
/// under the format's constraints, and [`PairingError::Inconsistency`]
/// when the strategy output (or the input state) violates a structural
/// invariant.
pub fn generate_pairings(t: &Tournament, round_number: u32) -> Result<Round, PairingError> {
    if t.status != TournamentStatus::Active {
        return Err(PreconditionViolation::TournamentNotActive(t.status).into());
    }
    let expected = t.current_round + 1;
    if round_number != expected {
        return Err(PreconditionViolation::WrongRound {
            requested: round_number,
            expected,
        }
        .into());
    }
    if round_number > t.total_rounds {
        return Err(PreconditionViolation::RoundLimitExceeded {
            requested: round_number,
            total: t.total_rounds,
        }
        .into());
    }
    if t.current_round > 0 {
        match t.round(t.current_round) {
            Some(previous) if previous.status != RoundStatus::Completed => {
                return Err(PreconditionViolation::PreviousRoundIncomplete(previous.number).into());
            }
            Some(_) => {}
            None => {
                return Err(PairingError::Inconsistency(format!(
                    "round {} is recorded as current but does not exist",
                    t.current_round
                )));
            }
        }
    }

    debug!(
        tournament = %t.id,
        round = round_number,
        format = %t.format,
        "generating pairings"
    );
    let round = match t.format {
        TournamentFormat::Swiss => swiss::pair(t, round_number)?,
        TournamentFormat::RoundRobin => round_robin::pair(t, round_number)?,
        TournamentFormat::Knockout => knockout::pair(t, round_number)?,
    };
    verify_round(t, &round)?;
    Ok(round)
}

/// Re-checks the structural invariants of a generated round: no player on
/// two boards, board numbers dense from 1 over the games, byes without
/// board numbers, and every id known to the tournament. Swiss and
/// round-robin rounds must additionally cover every pairable player
/// (knockout rounds shrink the field by design).
fn verify_round(t: &Tournament, round: &Round) -> Result<(), PairingError> {
    let mut seen = HashSet::new();
    let mut next_board = 1;
    for pairing in &round.pairings {
        if pairing.white.is_none() && pairing.black.is_none() {
            return Err(PairingError::Inconsistency(
                "pairing with no players".to_string(),
            ));
        }
        for id in pairing.players() {
            if t.player(id).is_none() {
                return Err(PairingError::Inconsistency(format!(
                    "pairing references unknown player {id}"
                )));
            }
            if !seen.insert(id.clone()) {
                return Err(PairingError::Inconsistency(format!(
                    "player {id} appears twice in round {}",
                    round.number
                )));
            }
        }
        if pairing.is_bye() {
            if pairing.board.is_some() {
                return Err(PairingError::Inconsistency(
                    "bye pairing carries a board number".to_string(),
                ));
            }
        } else {
            if pairing.board != Some(next_board) {
                return Err(PairingError::Inconsistency(format!(
                    "expected board {next_board}, found {:?}",
                    pairing.board
                )));
            }
            next_board += 1;
        }
    }

    if matches!(
        t.format,
        TournamentFormat::Swiss | TournamentFormat::RoundRobin
    ) {
        for player in t.active_players() {
            if !seen.contains(&player.player.id) {
                return Err(PairingError::Inconsistency(format!(
                    "active player {} is missing from round {}",
                    player.player.id, round.number
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Pairing;
    use tourney_core::{GameResult, Player};

    fn active_tournament(format: TournamentFormat, players: u32, rounds: u32) -> Tournament {
        let mut t = Tournament::new("t", "Open", format, rounds, vec![]);
        for i in 1..=players {
            t.add_player(Player::new(
                format!("p{i}"),
                format!("Player {i}"),
                2100 - i * 20,
            ))
            .unwrap();
        }
        t.start().unwrap();
        t
    }

    #[test]
    fn rejects_tournament_in_setup() {
        let mut t = Tournament::new("t", "Open", TournamentFormat::Swiss, 5, vec![]);
        t.add_player(Player::new("a", "A", 1500)).unwrap();
        t.add_player(Player::new("b", "B", 1600)).unwrap();

        let err = generate_pairings(&t, 1).unwrap_err();
        assert_eq!(
            err,
            PairingError::Precondition(PreconditionViolation::TournamentNotActive(
                TournamentStatus::Setup
            ))
        );
    }

    #[test]
    fn rejects_finished_tournament() {
        let mut t = active_tournament(TournamentFormat::Swiss, 4, 3);
        t.finish().unwrap();

        let err = generate_pairings(&t, 1).unwrap_err();
        assert_eq!(
            err,
            PairingError::Precondition(PreconditionViolation::TournamentNotActive(
                TournamentStatus::Finished
            ))
        );
    }

    #[test]
    fn rejects_out_of_sequence_round() {
        let t = active_tournament(TournamentFormat::Swiss, 4, 5);
        let err = generate_pairings(&t, 2).unwrap_err();
        assert_eq!(
            err,
            PairingError::Precondition(PreconditionViolation::WrongRound {
                requested: 2,
                expected: 1
            })
        );
    }

    #[test]
    fn rejects_round_beyond_schedule() {
        let mut t = active_tournament(TournamentFormat::Swiss, 4, 1);
        let round = generate_pairings(&t, 1).unwrap();
        t.install_round(round).unwrap();
        for board in [1, 2] {
            t.record_result(1, board, GameResult::Draw).unwrap();
        }

        let err = generate_pairings(&t, 2).unwrap_err();
        assert_eq!(
            err,
            PairingError::Precondition(PreconditionViolation::RoundLimitExceeded {
                requested: 2,
                total: 1
            })
        );
    }

    #[test]
    fn rejects_incomplete_previous_round() {
        let mut t = active_tournament(TournamentFormat::Swiss, 4, 5);
        let round = generate_pairings(&t, 1).unwrap();
        t.install_round(round).unwrap();
        t.record_result(1, 1, GameResult::WhiteWin).unwrap();
        // Board 2 still open.

        let err = generate_pairings(&t, 2).unwrap_err();
        assert_eq!(
            err,
            PairingError::Precondition(PreconditionViolation::PreviousRoundIncomplete(1))
        );
    }

    #[test]
    fn dispatches_every_format() {
        for format in [
            TournamentFormat::Swiss,
            TournamentFormat::RoundRobin,
            TournamentFormat::Knockout,
        ] {
            let t = active_tournament(format, 6, 5);
            let round = generate_pairings(&t, 1).unwrap();
            assert_eq!(round.number, 1);
            assert_eq!(round.status, RoundStatus::Active);
            let games = round.pairings.iter().filter(|p| !p.is_bye()).count();
            // Swiss and round-robin play three boards; the knockout pads
            // its 8-slot bracket with byes and plays two.
            match format {
                TournamentFormat::Knockout => assert_eq!(games, 2),
                _ => assert_eq!(games, 3),
            }
        }
    }

    #[test]
    fn verify_round_catches_duplicates() {
        let t = active_tournament(TournamentFormat::Swiss, 4, 5);
        let bad = Round::new(
            1,
            vec![
                Pairing::game(1, 1, "p1".into(), "p2".into()),
                Pairing::game(1, 2, "p1".into(), "p3".into()),
            ],
        );
        let err = verify_round(&t, &bad).unwrap_err();
        assert!(matches!(err, PairingError::Inconsistency(_)));
    }

    #[test]
    fn verify_round_catches_sparse_boards() {
        let t = active_tournament(TournamentFormat::Knockout, 4, 2);
        let bad = Round::new(
            1,
            vec![
                Pairing::game(1, 1, "p1".into(), "p2".into()),
                Pairing::game(1, 3, "p3".into(), "p4".into()),
            ],
        );
        let err = verify_round(&t, &bad).unwrap_err();
        assert!(matches!(err, PairingError::Inconsistency(_)));
    }

    #[test]
    fn verify_round_catches_unknown_player() {
        let t = active_tournament(TournamentFormat::Knockout, 4, 2);
        let bad = Round::new(1, vec![Pairing::game(1, 1, "p1".into(), "ghost".into())]);
        let err = verify_round(&t, &bad).unwrap_err();
        assert!(matches!(err, PairingError::Inconsistency(_)));
    }

    #[test]
    fn engine_is_stateless_across_calls() {
        let t = active_tournament(TournamentFormat::Swiss, 8, 5);
        let a = generate_pairings(&t, 1).unwrap();
        let b = generate_pairings(&t, 1).unwrap();
        assert_eq!(a, b);
    }
}

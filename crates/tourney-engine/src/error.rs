//! Error types for the pairing and standings engine.
//!
//! Three families, surfaced without internal retries (every operation is a
//! deterministic function of the supplied state):
//! - [`PreconditionViolation`]: the caller asked for something the
//!   tournament state does not permit; actionable by the organizer.
//! - [`PairingError::Infeasible`]: no legal pairing exists under the
//!   current constraints; carries enough context for an arbiter override.
//! - [`PairingError::Inconsistency`] / [`StateError`]: a structural
//!   invariant was violated upstream; fatal, treated as a bug signal.

use thiserror::Error;
use tourney_core::PlayerId;

use crate::state::TournamentStatus;

/// A pairing request that the tournament state does not permit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionViolation {
    /// The tournament has not started or has already finished.
    #[error("tournament is not active (status: {0})")]
    TournamentNotActive(TournamentStatus),
    /// Rounds must be generated strictly in sequence.
    #[error("requested round {requested}, but the next round is {expected}")]
    WrongRound { requested: u32, expected: u32 },
    /// The previous round still has unrecorded results.
    #[error("round {0} is not completed; results are missing")]
    PreviousRoundIncomplete(u32),
    /// The tournament's configured schedule has no such round.
    #[error("round {requested} exceeds the configured {total} rounds")]
    RoundLimitExceeded { requested: u32, total: u32 },
}

/// Failure of a pairing generation request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PairingError {
    /// The request violated a precondition; nothing was attempted.
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),
    /// No legal pairing exists under the current constraints. The engine
    /// never relaxes a constraint on its own; an arbiter must intervene.
    #[error("no legal pairing in round {round}: {constraint} (stranded player: {player})")]
    Infeasible {
        round: u32,
        player: PlayerId,
        constraint: String,
    },
    /// A structural invariant did not hold. Indicates corrupted state from
    /// an upstream mutation, not a normal runtime condition.
    #[error("tournament state inconsistent: {0}")]
    Inconsistency(String),
}

/// Failure of a state mutation on the [`crate::Tournament`] aggregate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("operation requires setup status (currently {0})")]
    NotInSetup(TournamentStatus),
    #[error("operation requires an active tournament (currently {0})")]
    NotActive(TournamentStatus),
    #[error("player {0} is already registered")]
    DuplicatePlayer(PlayerId),
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),
    #[error("at least two players are required, got {0}")]
    TooFewPlayers(usize),
    #[error("unknown round: {0}")]
    UnknownRound(u32),
    #[error("round {round} has no board {board}")]
    UnknownBoard { round: u32, board: u32 },
    #[error("expected round number {expected}, got {got}")]
    WrongRoundNumber { expected: u32, got: u32 },
    #[error("player {0} appears more than once in the round")]
    DuplicateInRound(PlayerId),
}

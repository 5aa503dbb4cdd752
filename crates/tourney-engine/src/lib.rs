//! Pairing and standings engine for chess tournaments.
//!
//! This crate implements the algorithmic core of a tournament manager:
//! - [`Tournament`], the in-memory state aggregate (players, rounds, results)
//! - [`generate_pairings`], the pairing engine, dispatching to the Swiss,
//!   round-robin, or knockout strategy for the tournament's format
//! - [`build_standings`] for tiebreak-ordered standings, recomputed per call
//!
//! The engine is synchronous and free of I/O: it reads a fully materialized
//! [`Tournament`] supplied by the caller and returns plain data. Persistence,
//! validation of raw input tokens, and presentation are collaborator concerns.

mod colors;
mod engine;
mod error;
mod knockout;
mod round_robin;
mod standings;
mod state;
mod swiss;
mod tiebreak;

pub use engine::generate_pairings;
pub use error::{PairingError, PreconditionViolation, StateError};
pub use standings::{build_standings, StandingsEntry, TiebreakScore};
pub use state::{
    suggested_round_count, Pairing, Round, RoundStatus, Tournament, TournamentPlayer,
    TournamentStatus,
};
pub use tiebreak::{completed_score, compute_tiebreak};

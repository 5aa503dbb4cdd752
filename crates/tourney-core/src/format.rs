//! Tournament formats and tiebreak system identifiers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a tournament format string cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized tournament format: {0}")]
pub struct ParseFormatError(pub String);

/// Error returned when a tiebreak system string cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized tiebreak system: {0}")]
pub struct ParseTiebreakError(pub String);

/// The pairing format of a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentFormat {
    /// Swiss system: score-group pairing over a fixed number of rounds.
    Swiss,
    /// Round-robin: everyone meets everyone via the Berger circle method.
    RoundRobin,
    /// Seeded single-elimination bracket.
    Knockout,
}

impl std::fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentFormat::Swiss => write!(f, "Swiss"),
            TournamentFormat::RoundRobin => write!(f, "Round Robin"),
            TournamentFormat::Knockout => write!(f, "Knockout"),
        }
    }
}

impl FromStr for TournamentFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "swiss" => Ok(TournamentFormat::Swiss),
            "round robin" | "round-robin" | "roundrobin" => Ok(TournamentFormat::RoundRobin),
            "knockout" => Ok(TournamentFormat::Knockout),
            other => Err(ParseFormatError(other.to_string())),
        }
    }
}

/// A recognized tiebreak system.
///
/// Each tournament configures an ordered subset of these; the standings
/// builder applies them in that order after the main score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TiebreakSystem {
    /// Score earned against the players tied on main score.
    DirectEncounter,
    /// Sum of all opponents' final scores.
    Buchholz,
    /// Buchholz with the lowest opponent score dropped.
    BuchholzCut1,
    /// Buchholz with the lowest and highest opponent scores dropped.
    BuchholzMedian,
    /// Sum of (own game points x opponent's final score) per game.
    SonnebornBerger,
}

impl std::fmt::Display for TiebreakSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TiebreakSystem::DirectEncounter => write!(f, "Direct Encounter"),
            TiebreakSystem::Buchholz => write!(f, "Buchholz"),
            TiebreakSystem::BuchholzCut1 => write!(f, "Buchholz Cut 1"),
            TiebreakSystem::BuchholzMedian => write!(f, "Buchholz Median"),
            TiebreakSystem::SonnebornBerger => write!(f, "Sonneborn-Berger"),
        }
    }
}

impl FromStr for TiebreakSystem {
    type Err = ParseTiebreakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace([' ', '_'], "-").as_str() {
            "direct-encounter" | "direct" => Ok(TiebreakSystem::DirectEncounter),
            "buchholz" => Ok(TiebreakSystem::Buchholz),
            "buchholz-cut-1" | "buchholz-cut1" => Ok(TiebreakSystem::BuchholzCut1),
            "buchholz-median" => Ok(TiebreakSystem::BuchholzMedian),
            "sonneborn-berger" => Ok(TiebreakSystem::SonnebornBerger),
            other => Err(ParseTiebreakError(other.to_string())),
        }
    }
}

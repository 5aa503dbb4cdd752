//! Report generation: a serializable tournament report tree, JSON export,
//! and a standings CSV for spreadsheets.

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use tourney_engine::{build_standings, StandingsEntry, Tournament};

use crate::storage::StoredTournament;

/// Errors that can occur while writing a report file.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The output file could not be written.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    /// Report serialization failed.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// One game row in a round report.
#[derive(Debug, Serialize)]
pub struct GameReport {
    pub board: u32,
    pub white: String,
    pub black: String,
    /// Result token, `*` while pending.
    pub result: String,
}

/// One round of the tournament, games in board order.
#[derive(Debug, Serialize)]
pub struct RoundReport {
    pub number: u32,
    pub games: Vec<GameReport>,
    /// Names of players who sat out this round.
    pub byes: Vec<String>,
}

/// The complete report tree for one tournament.
#[derive(Debug, Serialize)]
pub struct TournamentReport {
    pub id: String,
    pub name: String,
    pub format: String,
    pub status: String,
    pub location: String,
    pub description: String,
    pub rounds_scheduled: u32,
    pub rounds_played: u32,
    pub players: usize,
    pub standings: Vec<StandingsEntry>,
    pub rounds: Vec<RoundReport>,
}

/// Builds the report tree for a stored tournament.
pub fn build_report(stored: &StoredTournament) -> TournamentReport {
    let t = &stored.tournament;
    let rounds = t
        .rounds()
        .iter()
        .map(|round| RoundReport {
            number: round.number,
            games: round
                .pairings
                .iter()
                .filter(|p| !p.is_bye())
                .map(|p| GameReport {
                    board: p.board.unwrap_or(0),
                    white: display_name(t, p.white.as_ref()),
                    black: display_name(t, p.black.as_ref()),
                    result: p.result.map_or_else(|| "*".to_string(), |r| r.to_string()),
                })
                .collect(),
            byes: round
                .pairings
                .iter()
                .filter_map(|p| p.bye_player())
                .map(|id| display_name(t, Some(id)))
                .collect(),
        })
        .collect();

    TournamentReport {
        id: t.id.clone(),
        name: t.name.clone(),
        format: t.format.to_string(),
        status: t.status.to_string(),
        location: stored.location.clone(),
        description: stored.description.clone(),
        rounds_scheduled: t.total_rounds,
        rounds_played: t.current_round,
        players: t.players().len(),
        standings: build_standings(t),
        rounds,
    }
}

fn display_name(t: &Tournament, id: Option<&tourney_core::PlayerId>) -> String {
    match id {
        Some(id) => t
            .player(id)
            .map_or_else(|| id.to_string(), |p| p.player.name.clone()),
        None => String::new(),
    }
}

/// Writes the report as pretty-printed JSON.
pub fn write_json<P: AsRef<Path>>(path: P, report: &TournamentReport) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Writes the standings table as CSV: rank, name, rating, score, then one
/// column per configured tiebreak.
pub fn write_standings_csv<P: AsRef<Path>>(
    path: P,
    report: &TournamentReport,
) -> Result<(), ReportError> {
    let mut file = std::fs::File::create(path)?;

    write!(file, "Rank,Name,Rating,Score")?;
    if let Some(first) = report.standings.first() {
        for tb in &first.tiebreaks {
            write!(file, ",{}", tb.system)?;
        }
    }
    writeln!(file)?;

    for entry in &report.standings {
        write!(
            file,
            "{},\"{}\",{},{}",
            entry.rank, entry.name, entry.rating, entry.score
        )?;
        for tb in &entry.tiebreaks {
            write!(file, ",{}", tb.value)?;
        }
        writeln!(file)?;
    }
    Ok(())
}

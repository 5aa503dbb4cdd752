//! JSON file storage for the player registry and tournaments.
//!
//! One pretty-printed JSON file per entity: `players/<id>.json` and
//! `tournaments/<id>.json` under the configured data directory. The
//! engine never touches these files; it always works on the materialized
//! [`Tournament`] inside a [`StoredTournament`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use tourney_core::Player;
use tourney_engine::Tournament;

/// Errors that can occur while reading or writing the data directory.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A file did not contain valid JSON for its entity type.
    #[error("Corrupt data file: {0}")]
    Json(#[from] serde_json::Error),
    /// No player file with the given id exists.
    #[error("Player not found: {0}")]
    PlayerNotFound(String),
    /// No tournament file with the given id exists.
    #[error("Tournament not found: {0}")]
    TournamentNotFound(String),
}

/// A tournament as stored on disk: the engine aggregate plus the
/// organizer metadata the engine does not care about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTournament {
    /// The engine state aggregate.
    pub tournament: Tournament,
    /// Venue, display-only.
    #[serde(default)]
    pub location: String,
    /// Free-form notes, display-only.
    #[serde(default)]
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-save timestamp, refreshed by [`JsonStore::save_tournament`].
    pub updated_at: DateTime<Utc>,
}

impl StoredTournament {
    /// Wraps a freshly created tournament with metadata.
    pub fn new(tournament: Tournament, location: String, description: String) -> Self {
        let now = Utc::now();
        StoredTournament {
            tournament,
            location,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// File-per-entity JSON storage rooted at the data directory.
///
/// # Example
///
/// ```ignore
/// let store = JsonStore::open("data")?;
/// store.save_player(&player)?;
/// let players = store.list_players()?;
/// ```
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Opens the store, creating the directory layout if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let store = JsonStore {
            root: root.as_ref().to_path_buf(),
        };
        std::fs::create_dir_all(store.players_dir())?;
        std::fs::create_dir_all(store.tournaments_dir())?;
        Ok(store)
    }

    fn players_dir(&self) -> PathBuf {
        self.root.join("players")
    }

    fn tournaments_dir(&self) -> PathBuf {
        self.root.join("tournaments")
    }

    /// Writes a player record, replacing any previous version.
    pub fn save_player(&self, player: &Player) -> Result<(), StorageError> {
        let path = self.players_dir().join(format!("{}.json", player.id));
        let json = serde_json::to_string_pretty(player)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a player by id.
    pub fn load_player(&self, id: &str) -> Result<Player, StorageError> {
        let path = self.players_dir().join(format!("{id}.json"));
        if !path.exists() {
            return Err(StorageError::PlayerNotFound(id.to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Deletes a player record.
    pub fn delete_player(&self, id: &str) -> Result<(), StorageError> {
        let path = self.players_dir().join(format!("{id}.json"));
        if !path.exists() {
            return Err(StorageError::PlayerNotFound(id.to_string()));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }

    /// All registered players, sorted by name.
    pub fn list_players(&self) -> Result<Vec<Player>, StorageError> {
        let mut players = Vec::new();
        for entry in std::fs::read_dir(self.players_dir())? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                let content = std::fs::read_to_string(&path)?;
                players.push(serde_json::from_str(&content)?);
            }
        }
        players.sort_by(|a: &Player, b: &Player| a.name.cmp(&b.name));
        Ok(players)
    }

    /// Writes a tournament, refreshing its `updated_at` timestamp.
    pub fn save_tournament(&self, stored: &mut StoredTournament) -> Result<(), StorageError> {
        stored.updated_at = Utc::now();
        let path = self
            .tournaments_dir()
            .join(format!("{}.json", stored.tournament.id));
        let json = serde_json::to_string_pretty(stored)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a tournament by id.
    pub fn load_tournament(&self, id: &str) -> Result<StoredTournament, StorageError> {
        let path = self.tournaments_dir().join(format!("{id}.json"));
        if !path.exists() {
            return Err(StorageError::TournamentNotFound(id.to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Deletes a tournament file.
    pub fn delete_tournament(&self, id: &str) -> Result<(), StorageError> {
        let path = self.tournaments_dir().join(format!("{id}.json"));
        if !path.exists() {
            return Err(StorageError::TournamentNotFound(id.to_string()));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }

    /// All tournaments, most recently created first.
    pub fn list_tournaments(&self) -> Result<Vec<StoredTournament>, StorageError> {
        let mut tournaments: Vec<StoredTournament> = Vec::new();
        for entry in std::fs::read_dir(self.tournaments_dir())? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                let content = std::fs::read_to_string(&path)?;
                tournaments.push(serde_json::from_str(&content)?);
            }
        }
        tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tournaments)
    }
}

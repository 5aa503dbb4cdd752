//! Configuration file loading for the tournament manager.
//!
//! This module provides types and functions for loading configuration
//! from a `tourney.toml` file in the working directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tourney_core::TiebreakSystem;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Main configuration structure.
///
/// Missing file or missing fields fall back to defaults, so a bare
/// checkout works without any configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct TourneyConfig {
    /// Directory holding the player registry and tournament files.
    /// Defaults to `data`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Tiebreak order applied to newly created tournaments.
    #[serde(default = "default_tiebreaks")]
    pub default_tiebreaks: Vec<TiebreakSystem>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_tiebreaks() -> Vec<TiebreakSystem> {
    vec![
        TiebreakSystem::BuchholzCut1,
        TiebreakSystem::Buchholz,
        TiebreakSystem::SonnebornBerger,
    ]
}

impl Default for TourneyConfig {
    fn default() -> Self {
        TourneyConfig {
            data_dir: default_data_dir(),
            default_tiebreaks: default_tiebreaks(),
        }
    }
}

impl TourneyConfig {
    /// Loads the configuration from disk.
    ///
    /// Reads the file at [`Self::config_path()`]; a missing file yields
    /// the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be
    /// read, or [`ConfigError::ParseError`] if it contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("tourney.toml")
    }
}

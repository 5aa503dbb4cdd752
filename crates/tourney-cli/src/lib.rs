//! Tourney - a command-line chess tournament manager.
//!
//! This crate wraps the pairing/standings engine with the thin layers a
//! working tool needs:
//!
//! - [`config`] - TOML configuration (data directory, default tiebreaks)
//! - [`storage`] - JSON file storage for the player registry and tournaments
//! - [`report`] - JSON and CSV report export

pub mod config;
pub mod report;
pub mod storage;

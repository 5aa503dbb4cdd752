//! Player identity and lifecycle status.

use serde::{Deserialize, Serialize};

/// Opaque, stable player identifier.
///
/// The engine never interprets the contents; the registry that owns the
/// players decides the format (UUIDs in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId(s.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        PlayerId(s)
    }
}

/// Lifecycle status of a player within a tournament.
///
/// A withdrawn or expelled player is excluded from future pairings but
/// stays in the history so tiebreaks keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Active,
    Withdrawn,
    Expelled,
}

impl PlayerStatus {
    /// Returns true if the player may still be paired.
    #[inline]
    pub fn is_pairable(self) -> bool {
        self == PlayerStatus::Active
    }
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerStatus::Active => write!(f, "Active"),
            PlayerStatus::Withdrawn => write!(f, "Withdrawn"),
            PlayerStatus::Expelled => write!(f, "Expelled"),
        }
    }
}

/// A chess player as the tournament engine sees one.
///
/// Federation and title are display-only; seeding uses the rating and the
/// tournament-assigned starting rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique, stable identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Numeric rating; 0 for unrated players.
    #[serde(default)]
    pub rating: u32,
    /// Chess federation (e.g. "FIDE"), display-only.
    #[serde(default)]
    pub federation: Option<String>,
    /// Title (e.g. "GM"), display-only.
    #[serde(default)]
    pub title: Option<String>,
    /// Lifecycle status.
    pub status: PlayerStatus,
}

impl Player {
    /// Creates an active player with the given id, name, and rating.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, rating: u32) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            rating,
            federation: None,
            title: None,
            status: PlayerStatus::Active,
        }
    }
}

//! Game result tokens and scoring.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a result token cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized result token: {0}")]
pub struct ParseResultError(pub String);

/// The recorded outcome of a single game.
///
/// An unset (pending) result is modeled as `Option::<GameResult>::None`
/// and rendered as `*`. Forfeit wins score like ordinary wins; a double
/// forfeit scores zero for both players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    /// White won over the board ("1-0").
    WhiteWin,
    /// Black won over the board ("0-1").
    BlackWin,
    /// Draw ("1/2-1/2").
    Draw,
    /// White won by forfeit ("+/-").
    WhiteForfeitWin,
    /// Black won by forfeit ("-/+").
    BlackForfeitWin,
    /// Both players forfeited ("0-0").
    DoubleForfeit,
}

impl GameResult {
    /// Points credited to the white player.
    pub fn white_points(self) -> f64 {
        match self {
            GameResult::WhiteWin | GameResult::WhiteForfeitWin => 1.0,
            GameResult::Draw => 0.5,
            GameResult::BlackWin | GameResult::BlackForfeitWin | GameResult::DoubleForfeit => 0.0,
        }
    }

    /// Points credited to the black player.
    pub fn black_points(self) -> f64 {
        match self {
            GameResult::BlackWin | GameResult::BlackForfeitWin => 1.0,
            GameResult::Draw => 0.5,
            GameResult::WhiteWin | GameResult::WhiteForfeitWin | GameResult::DoubleForfeit => 0.0,
        }
    }

    /// Returns true if the result was decided by forfeit rather than play.
    pub fn is_forfeit(self) -> bool {
        matches!(
            self,
            GameResult::WhiteForfeitWin | GameResult::BlackForfeitWin | GameResult::DoubleForfeit
        )
    }

    /// The standard result token (e.g. "1-0", "+/-").
    pub fn token(self) -> &'static str {
        match self {
            GameResult::WhiteWin => "1-0",
            GameResult::BlackWin => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::WhiteForfeitWin => "+/-",
            GameResult::BlackForfeitWin => "-/+",
            GameResult::DoubleForfeit => "0-0",
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for GameResult {
    type Err = ParseResultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1-0" => Ok(GameResult::WhiteWin),
            "0-1" => Ok(GameResult::BlackWin),
            "1/2-1/2" | "0.5-0.5" => Ok(GameResult::Draw),
            "+/-" => Ok(GameResult::WhiteForfeitWin),
            "-/+" => Ok(GameResult::BlackForfeitWin),
            "0-0" => Ok(GameResult::DoubleForfeit),
            other => Err(ParseResultError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_add_up_per_game() {
        for result in [
            GameResult::WhiteWin,
            GameResult::BlackWin,
            GameResult::Draw,
            GameResult::WhiteForfeitWin,
            GameResult::BlackForfeitWin,
        ] {
            assert_eq!(result.white_points() + result.black_points(), 1.0);
        }
        // Double forfeit awards nothing to either side.
        assert_eq!(GameResult::DoubleForfeit.white_points(), 0.0);
        assert_eq!(GameResult::DoubleForfeit.black_points(), 0.0);
    }

    #[test]
    fn tokens_roundtrip() {
        for result in [
            GameResult::WhiteWin,
            GameResult::BlackWin,
            GameResult::Draw,
            GameResult::WhiteForfeitWin,
            GameResult::BlackForfeitWin,
            GameResult::DoubleForfeit,
        ] {
            let token = result.token();
            assert_eq!(token.parse::<GameResult>().unwrap(), result);
        }
    }

    #[test]
    fn pending_token_is_rejected() {
        // "*" means unset, which is Option::None, not a GameResult.
        assert!("*".parse::<GameResult>().is_err());
        assert!("2-0".parse::<GameResult>().is_err());
    }

    #[test]
    fn forfeit_classification() {
        assert!(GameResult::WhiteForfeitWin.is_forfeit());
        assert!(GameResult::BlackForfeitWin.is_forfeit());
        assert!(GameResult::DoubleForfeit.is_forfeit());
        assert!(!GameResult::WhiteWin.is_forfeit());
        assert!(!GameResult::Draw.is_forfeit());
    }
}

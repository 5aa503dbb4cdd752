//! The tournament state aggregate.
//!
//! [`Tournament`] owns every [`Round`] and [`Pairing`] for its lifetime and
//! keeps the per-player bookkeeping (score, color history, opponent history,
//! byes) as append-only sequences. Players themselves are snapshots of
//! records owned by an external registry; the aggregate never reaches back
//! into it. All mutation goes through [`Tournament::install_round`] and
//! [`Tournament::record_result`]; the standings path is read-only.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tourney_core::{
    Color, GameResult, Player, PlayerId, PlayerStatus, TiebreakSystem, TournamentFormat,
};

use crate::error::StateError;

/// Lifecycle status of a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    /// Registration phase; players may be added or removed.
    Setup,
    /// Rounds are being played.
    Active,
    /// Closed; no further pairings or results.
    Finished,
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentStatus::Setup => write!(f, "Setup"),
            TournamentStatus::Active => write!(f, "Active"),
            TournamentStatus::Finished => write!(f, "Finished"),
        }
    }
}

/// Status of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    /// Created but not yet paired.
    Pending,
    /// Paired; results outstanding.
    Active,
    /// Every pairing carries a result.
    Completed,
}

/// One board of one round: two players, or one player and a bye.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    /// Round this pairing belongs to.
    pub round: u32,
    /// 1-based board number, dense over the game pairings of the round.
    /// `None` for a bye.
    pub board: Option<u32>,
    /// White player; `None` only for a bye awarded to black.
    pub white: Option<PlayerId>,
    /// Black player; `None` only for a bye awarded to white.
    pub black: Option<PlayerId>,
    /// Recorded result; `None` while the game is pending.
    pub result: Option<GameResult>,
}

impl Pairing {
    /// Creates a game pairing with no result yet.
    pub fn game(round: u32, board: u32, white: PlayerId, black: PlayerId) -> Self {
        Pairing {
            round,
            board: Some(board),
            white: Some(white),
            black: Some(black),
            result: None,
        }
    }

    /// Creates a bye pairing. The bye is a full point, recorded up front.
    pub fn bye(round: u32, player: PlayerId) -> Self {
        Pairing {
            round,
            board: None,
            white: Some(player),
            black: None,
            result: Some(GameResult::WhiteWin),
        }
    }

    /// Returns true if this pairing is a bye.
    pub fn is_bye(&self) -> bool {
        self.white.is_none() || self.black.is_none()
    }

    /// The player receiving the bye, if this pairing is one.
    pub fn bye_player(&self) -> Option<&PlayerId> {
        match (&self.white, &self.black) {
            (Some(p), None) | (None, Some(p)) => Some(p),
            _ => None,
        }
    }

    /// Iterates over the players present in this pairing.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.white.iter().chain(self.black.iter())
    }

    /// Returns true if the given player sits on this board.
    pub fn involves(&self, id: &PlayerId) -> bool {
        self.players().any(|p| p == id)
    }

    /// The opponent of the given player, if this is a game they play in.
    pub fn opponent_of(&self, id: &PlayerId) -> Option<&PlayerId> {
        match (&self.white, &self.black) {
            (Some(w), Some(b)) if w == id => Some(b),
            (Some(w), Some(b)) if b == id => Some(w),
            _ => None,
        }
    }

    /// The color the given player holds on this board; `None` for a bye
    /// or a player not on this board.
    pub fn color_of(&self, id: &PlayerId) -> Option<Color> {
        if self.is_bye() {
            return None;
        }
        if self.white.as_ref() == Some(id) {
            Some(Color::White)
        } else if self.black.as_ref() == Some(id) {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Points the recorded result awards to the given player, if any.
    pub fn points_for(&self, id: &PlayerId) -> Option<f64> {
        let result = self.result?;
        if self.white.as_ref() == Some(id) {
            Some(result.white_points())
        } else if self.black.as_ref() == Some(id) {
            Some(result.black_points())
        } else {
            None
        }
    }
}

/// The pairings of one round number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number.
    pub number: u32,
    /// Round status; generated rounds start [`RoundStatus::Active`].
    pub status: RoundStatus,
    /// Pairings in board order, bye last.
    pub pairings: Vec<Pairing>,
}

impl Round {
    /// Creates an active round from generated pairings.
    pub fn new(number: u32, pairings: Vec<Pairing>) -> Self {
        Round {
            number,
            status: RoundStatus::Active,
            pairings,
        }
    }

    /// Returns true when every pairing carries a result.
    pub fn is_complete(&self) -> bool {
        self.pairings.iter().all(|p| p.result.is_some())
    }

    /// Looks up the game pairing on the given board number.
    pub fn pairing_on_board(&self, board: u32) -> Option<&Pairing> {
        self.pairings.iter().find(|p| p.board == Some(board))
    }
}

/// A player within one tournament: the registry snapshot plus the
/// tournament-scoped bookkeeping the pairing algorithms read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentPlayer {
    /// Snapshot of the registry record.
    pub player: Player,
    /// Seeding position assigned at start (1 = top seed).
    pub starting_rank: u32,
    /// Running score, maintained by result recording.
    pub score: f64,
    /// Per-round color assignments; `None` marks a bye.
    pub colors: Vec<Option<Color>>,
    /// Opponents faced, in round order. Duplicates would mean a repeat
    /// pairing, which the Swiss strategy must never produce.
    pub opponents: Vec<PlayerId>,
    /// Number of byes received.
    pub byes: u32,
}

impl TournamentPlayer {
    fn new(player: Player) -> Self {
        TournamentPlayer {
            player,
            starting_rank: 0,
            score: 0.0,
            colors: Vec::new(),
            opponents: Vec::new(),
            byes: 0,
        }
    }

    /// Running difference between White and Black games.
    pub fn color_balance(&self) -> i32 {
        self.colors
            .iter()
            .flatten()
            .map(|c| c.balance_delta())
            .sum()
    }

    /// Returns true if the player may still be paired.
    pub fn is_pairable(&self) -> bool {
        self.player.status.is_pairable()
    }

    /// Returns true if the player has faced the given opponent.
    pub fn has_met(&self, opponent: &PlayerId) -> bool {
        self.opponents.contains(opponent)
    }
}

/// The state aggregate for one tournament.
///
/// Owns all rounds and pairings; exposes append-only mutation and
/// read-only queries. Callers are expected to serialize mutation per
/// tournament; the aggregate assumes it is the sole target of one call
/// at a time and holds no global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    /// Stable identifier, assigned by the storage collaborator.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Pairing format.
    pub format: TournamentFormat,
    /// Configured number of rounds. For a round-robin, setting this to
    /// twice the single cycle plays a double round-robin with colors
    /// reversed on the second cycle.
    pub total_rounds: u32,
    /// Ordered tiebreak systems applied after the main score.
    pub tiebreaks: Vec<TiebreakSystem>,
    /// Lifecycle status.
    pub status: TournamentStatus,
    /// Number of the most recently installed round (0 before the first).
    pub current_round: u32,
    players: Vec<TournamentPlayer>,
    rounds: Vec<Round>,
}

impl Tournament {
    /// Creates a tournament in setup status with no players.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        format: TournamentFormat,
        total_rounds: u32,
        tiebreaks: Vec<TiebreakSystem>,
    ) -> Self {
        Tournament {
            id: id.into(),
            name: name.into(),
            format,
            total_rounds,
            tiebreaks,
            status: TournamentStatus::Setup,
            current_round: 0,
            players: Vec::new(),
            rounds: Vec::new(),
        }
    }

    /// Registers a player. Only allowed during setup.
    pub fn add_player(&mut self, player: Player) -> Result<(), StateError> {
        if self.status != TournamentStatus::Setup {
            return Err(StateError::NotInSetup(self.status));
        }
        if self.players.iter().any(|p| p.player.id == player.id) {
            return Err(StateError::DuplicatePlayer(player.id));
        }
        self.players.push(TournamentPlayer::new(player));
        Ok(())
    }

    /// Removes a player. Only allowed during setup; once play begins,
    /// use [`Tournament::set_player_status`] instead so history survives.
    pub fn remove_player(&mut self, id: &PlayerId) -> Result<(), StateError> {
        if self.status != TournamentStatus::Setup {
            return Err(StateError::NotInSetup(self.status));
        }
        let before = self.players.len();
        self.players.retain(|p| &p.player.id != id);
        if self.players.len() == before {
            return Err(StateError::UnknownPlayer(id.clone()));
        }
        Ok(())
    }

    /// Starts the tournament: assigns starting ranks by rating (highest
    /// first, name as the final tie-break) and moves to active status.
    pub fn start(&mut self) -> Result<(), StateError> {
        if self.status != TournamentStatus::Setup {
            return Err(StateError::NotInSetup(self.status));
        }
        if self.players.len() < 2 {
            return Err(StateError::TooFewPlayers(self.players.len()));
        }
        self.players.sort_by(|a, b| {
            b.player
                .rating
                .cmp(&a.player.rating)
                .then_with(|| a.player.name.cmp(&b.player.name))
        });
        for (i, p) in self.players.iter_mut().enumerate() {
            p.starting_rank = (i + 1) as u32;
        }
        self.status = TournamentStatus::Active;
        Ok(())
    }

    /// Closes the tournament.
    pub fn finish(&mut self) -> Result<(), StateError> {
        if self.status != TournamentStatus::Active {
            return Err(StateError::NotActive(self.status));
        }
        self.status = TournamentStatus::Finished;
        Ok(())
    }

    /// Changes a player's lifecycle status (withdrawal, expulsion). The
    /// player stays in every past round; they are only excluded from
    /// future pairings.
    pub fn set_player_status(
        &mut self,
        id: &PlayerId,
        status: PlayerStatus,
    ) -> Result<(), StateError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.player.id == id)
            .ok_or_else(|| StateError::UnknownPlayer(id.clone()))?;
        player.player.status = status;
        Ok(())
    }

    /// Installs a generated round: appends it, advances the round counter,
    /// and updates the per-player bookkeeping (colors, opponents, byes,
    /// bye points). The round number must be exactly the next one.
    pub fn install_round(&mut self, mut round: Round) -> Result<(), StateError> {
        if self.status != TournamentStatus::Active {
            return Err(StateError::NotActive(self.status));
        }
        let expected = self.current_round + 1;
        if round.number != expected {
            return Err(StateError::WrongRoundNumber {
                expected,
                got: round.number,
            });
        }
        let mut seen: HashSet<&PlayerId> = HashSet::new();
        for pairing in &round.pairings {
            for id in pairing.players() {
                if !self.players.iter().any(|p| &p.player.id == id) {
                    return Err(StateError::UnknownPlayer(id.clone()));
                }
                if !seen.insert(id) {
                    return Err(StateError::DuplicateInRound(id.clone()));
                }
            }
        }

        for pairing in &round.pairings {
            if let Some(id) = pairing.bye_player() {
                let points = pairing.points_for(id).unwrap_or(0.0);
                let p = self.player_mut(id);
                p.byes += 1;
                p.colors.push(None);
                p.score += points;
            } else {
                let white = pairing.white.clone().expect("game pairing has white");
                let black = pairing.black.clone().expect("game pairing has black");
                {
                    let w = self.player_mut(&white);
                    w.colors.push(Some(Color::White));
                    w.opponents.push(black.clone());
                }
                let b = self.player_mut(&black);
                b.colors.push(Some(Color::Black));
                b.opponents.push(white.clone());
            }
        }

        // A round of nothing but byes (walkovers after withdrawals) has
        // every result preset and must not wait for record_result.
        if round.is_complete() {
            round.status = RoundStatus::Completed;
        }
        self.rounds.push(round);
        self.current_round = expected;
        Ok(())
    }

    /// Records (or corrects) the result of a game. Board numbers identify
    /// games only; byes carry a fixed result and have no board. Scores are
    /// adjusted by the delta when a previous result is overwritten; the
    /// round completes when its last result lands.
    pub fn record_result(
        &mut self,
        round_number: u32,
        board: u32,
        result: GameResult,
    ) -> Result<(), StateError> {
        let round_idx = self
            .rounds
            .iter()
            .position(|r| r.number == round_number)
            .ok_or(StateError::UnknownRound(round_number))?;
        let pairing_idx = self.rounds[round_idx]
            .pairings
            .iter()
            .position(|p| p.board == Some(board))
            .ok_or(StateError::UnknownBoard {
                round: round_number,
                board,
            })?;

        let (white, black, previous) = {
            let pairing = &self.rounds[round_idx].pairings[pairing_idx];
            (
                pairing.white.clone().expect("game pairing has white"),
                pairing.black.clone().expect("game pairing has black"),
                pairing.result,
            )
        };

        if let Some(prev) = previous {
            self.player_mut(&white).score -= prev.white_points();
            self.player_mut(&black).score -= prev.black_points();
        }
        self.player_mut(&white).score += result.white_points();
        self.player_mut(&black).score += result.black_points();

        let round = &mut self.rounds[round_idx];
        round.pairings[pairing_idx].result = Some(result);
        round.status = if round.is_complete() {
            RoundStatus::Completed
        } else {
            RoundStatus::Active
        };
        Ok(())
    }

    fn player_mut(&mut self, id: &PlayerId) -> &mut TournamentPlayer {
        self.players
            .iter_mut()
            .find(|p| &p.player.id == id)
            .expect("player validated before mutation")
    }

    /// All registered players, in starting-rank order once started.
    pub fn players(&self) -> &[TournamentPlayer] {
        &self.players
    }

    /// Looks up a player by id.
    pub fn player(&self, id: &PlayerId) -> Option<&TournamentPlayer> {
        self.players.iter().find(|p| &p.player.id == id)
    }

    /// Players still eligible for pairing.
    pub fn active_players(&self) -> impl Iterator<Item = &TournamentPlayer> {
        self.players.iter().filter(|p| p.is_pairable())
    }

    /// All rounds, in order.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Looks up a round by number.
    pub fn round(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }

    /// Rounds whose every result is recorded. Tiebreaks and standings read
    /// only these, so standings are reproducible for any completed prefix.
    pub fn completed_rounds(&self) -> impl Iterator<Item = &Round> {
        self.rounds
            .iter()
            .filter(|r| r.status == RoundStatus::Completed)
    }

    /// Returns true if the two players have been paired against each other.
    pub fn has_met(&self, a: &PlayerId, b: &PlayerId) -> bool {
        self.player(a).is_some_and(|p| p.has_met(b))
    }

    /// The running score of a player.
    pub fn score_of(&self, id: &PlayerId) -> Option<f64> {
        self.player(id).map(|p| p.score)
    }
}

/// The natural round count for a format and field size: one full cycle for
/// a round-robin, the bracket depth for a knockout. Swiss schedules are an
/// organizer's choice, so `None`.
pub fn suggested_round_count(format: TournamentFormat, player_count: usize) -> Option<u32> {
    match format {
        TournamentFormat::Swiss => None,
        TournamentFormat::RoundRobin => {
            let seats = if player_count % 2 == 1 {
                player_count + 1
            } else {
                player_count
            };
            Some(seats.max(2) as u32 - 1)
        }
        TournamentFormat::Knockout => {
            let bracket = player_count.next_power_of_two().max(2);
            Some(bracket.trailing_zeros())
        }
    }
}

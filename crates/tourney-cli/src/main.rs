mod config;
mod report;
mod storage;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use config::TourneyConfig;
use storage::{JsonStore, StoredTournament};
use tourney_core::{GameResult, Player, PlayerStatus, TiebreakSystem, TournamentFormat};
use tourney_engine::{build_standings, generate_pairings, suggested_round_count, Tournament};

#[derive(Parser)]
#[command(name = "tourney")]
#[command(about = "Chess tournament manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the player registry
    Player {
        #[command(subcommand)]
        action: PlayerCommands,
    },
    /// Create a new tournament
    Create {
        /// Tournament name
        name: String,
        /// Format: swiss, round-robin, or knockout
        #[arg(short, long, default_value = "swiss")]
        format: String,
        /// Number of rounds; defaults to the format's natural count
        #[arg(short, long)]
        rounds: Option<u32>,
        /// Venue
        #[arg(short, long, default_value = "")]
        location: String,
        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Tiebreak order; defaults to the configured order
        #[arg(short, long)]
        tiebreaks: Vec<String>,
    },
    /// Register a player into a tournament
    Join {
        /// Tournament id or name
        tournament: String,
        /// Player id or name
        player: String,
    },
    /// Start a tournament: lock the field and assign seeds
    Start { tournament: String },
    /// Generate and install the next round's pairings
    Pair { tournament: String },
    /// Record a game result (1-0, 0-1, 1/2-1/2, +/-, -/+, 0-0)
    Result {
        tournament: String,
        round: u32,
        board: u32,
        result: String,
    },
    /// Show a round's pairings
    Round { tournament: String, number: u32 },
    /// Print the standings table
    Standings { tournament: String },
    /// Withdraw a player from a tournament
    Withdraw { tournament: String, player: String },
    /// Close a tournament
    Finish { tournament: String },
    /// List stored tournaments
    List,
    /// Export a tournament report (json) or its standings (csv)
    Export {
        tournament: String,
        /// Output format: json or csv
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Output path; defaults to a name derived from the tournament
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PlayerCommands {
    /// Add a player to the registry
    Add {
        name: String,
        #[arg(short, long, default_value_t = 0)]
        rating: u32,
        #[arg(short, long)]
        federation: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// List registered players
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = TourneyConfig::load().context("loading tourney.toml")?;
    let store = JsonStore::open(&config.data_dir).context("opening data directory")?;
    tracing::debug!(data_dir = %config.data_dir.display(), "store opened");

    match cli.command {
        Commands::Player { action } => match action {
            PlayerCommands::Add {
                name,
                rating,
                federation,
                title,
            } => {
                let mut player = Player::new(uuid::Uuid::new_v4().to_string(), name, rating);
                player.federation = federation;
                player.title = title;
                store.save_player(&player)?;
                println!("Added {} ({})", player.name, player.id);
            }
            PlayerCommands::List => {
                let players = store.list_players()?;
                if players.is_empty() {
                    println!("No players registered.");
                }
                for p in players {
                    println!(
                        "{:<38} {:<24} {:>5}  {}",
                        p.id.to_string(),
                        p.name,
                        p.rating,
                        p.status
                    );
                }
            }
        },
        Commands::Create {
            name,
            format,
            rounds,
            location,
            description,
            tiebreaks,
        } => {
            let format: TournamentFormat = format.parse()?;
            let tiebreaks = if tiebreaks.is_empty() {
                config.default_tiebreaks.clone()
            } else {
                tiebreaks
                    .iter()
                    .map(|s| s.parse::<TiebreakSystem>())
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };
            let tournament = Tournament::new(
                uuid::Uuid::new_v4().to_string(),
                name,
                format,
                rounds.unwrap_or(0),
                tiebreaks,
            );
            let mut stored = StoredTournament::new(tournament, location, description);
            store.save_tournament(&mut stored)?;
            println!(
                "Created {} ({}, {})",
                stored.tournament.name, format, stored.tournament.id
            );
        }
        Commands::Join { tournament, player } => {
            let mut stored = find_tournament(&store, &tournament)?;
            let player = find_registry_player(&store, &player)?;
            let name = player.name.clone();
            stored.tournament.add_player(player)?;
            store.save_tournament(&mut stored)?;
            println!(
                "{} joined {} ({} players)",
                name,
                stored.tournament.name,
                stored.tournament.players().len()
            );
        }
        Commands::Start { tournament } => {
            let mut stored = find_tournament(&store, &tournament)?;
            let t = &mut stored.tournament;
            if t.total_rounds == 0 {
                t.total_rounds = suggested_round_count(t.format, t.players().len())
                    .context("a Swiss tournament needs an explicit --rounds at creation")?;
            }
            t.start()?;
            store.save_tournament(&mut stored)?;
            println!(
                "{} started: {} players, {} rounds",
                stored.tournament.name,
                stored.tournament.players().len(),
                stored.tournament.total_rounds
            );
            for p in stored.tournament.players() {
                println!("  {:>2}. {} ({})", p.starting_rank, p.player.name, p.player.rating);
            }
        }
        Commands::Pair { tournament } => {
            let mut stored = find_tournament(&store, &tournament)?;
            let next = stored.tournament.current_round + 1;
            let round = generate_pairings(&stored.tournament, next)?;
            stored.tournament.install_round(round)?;
            store.save_tournament(&mut stored)?;
            println!("Round {next} paired:");
            print_round(&stored.tournament, next);
        }
        Commands::Result {
            tournament,
            round,
            board,
            result,
        } => {
            let mut stored = find_tournament(&store, &tournament)?;
            let result: GameResult = result.parse()?;
            stored.tournament.record_result(round, board, result)?;
            store.save_tournament(&mut stored)?;
            let status = stored.tournament.round(round).expect("round exists").status;
            println!("Round {round} board {board}: {result} ({status:?})");
        }
        Commands::Round { tournament, number } => {
            let stored = find_tournament(&store, &tournament)?;
            if stored.tournament.round(number).is_none() {
                bail!("round {number} has not been paired");
            }
            print_round(&stored.tournament, number);
        }
        Commands::Standings { tournament } => {
            let stored = find_tournament(&store, &tournament)?;
            print_standings(&stored.tournament);
        }
        Commands::Withdraw { tournament, player } => {
            let mut stored = find_tournament(&store, &tournament)?;
            let id = find_tournament_player(&stored.tournament, &player)?;
            stored
                .tournament
                .set_player_status(&id, PlayerStatus::Withdrawn)?;
            store.save_tournament(&mut stored)?;
            println!("{player} withdrawn from {}", stored.tournament.name);
        }
        Commands::Finish { tournament } => {
            let mut stored = find_tournament(&store, &tournament)?;
            stored.tournament.finish()?;
            store.save_tournament(&mut stored)?;
            println!("{} finished. Final standings:", stored.tournament.name);
            print_standings(&stored.tournament);
        }
        Commands::List => {
            let tournaments = store.list_tournaments()?;
            if tournaments.is_empty() {
                println!("No tournaments.");
            }
            for s in tournaments {
                let t = &s.tournament;
                println!(
                    "{:<38} {:<24} {:<12} {:<9} round {}/{}",
                    t.id,
                    t.name,
                    t.format.to_string(),
                    t.status.to_string(),
                    t.current_round,
                    t.total_rounds
                );
            }
        }
        Commands::Export {
            tournament,
            format,
            output,
        } => {
            let stored = find_tournament(&store, &tournament)?;
            let report = report::build_report(&stored);
            let safe_name = stored
                .tournament
                .name
                .to_lowercase()
                .replace(char::is_whitespace, "_");
            match format.as_str() {
                "json" => {
                    let path =
                        output.unwrap_or_else(|| PathBuf::from(format!("{safe_name}_report.json")));
                    report::write_json(&path, &report)?;
                    println!("Report written to {}", path.display());
                }
                "csv" => {
                    let path = output
                        .unwrap_or_else(|| PathBuf::from(format!("{safe_name}_standings.csv")));
                    report::write_standings_csv(&path, &report)?;
                    println!("Standings written to {}", path.display());
                }
                other => bail!("unknown export format '{other}' (expected json or csv)"),
            }
        }
    }
    Ok(())
}

/// Looks a tournament up by id first, then by unique name.
fn find_tournament(store: &JsonStore, query: &str) -> Result<StoredTournament> {
    if let Ok(stored) = store.load_tournament(query) {
        return Ok(stored);
    }
    let matches: Vec<StoredTournament> = store
        .list_tournaments()?
        .into_iter()
        .filter(|s| s.tournament.name.eq_ignore_ascii_case(query))
        .collect();
    match matches.len() {
        0 => bail!("no tournament matches '{query}'"),
        1 => Ok(matches.into_iter().next().expect("one match")),
        n => bail!("'{query}' is ambiguous ({n} tournaments share the name); use the id"),
    }
}

/// Looks a registry player up by id first, then by unique name.
fn find_registry_player(store: &JsonStore, query: &str) -> Result<Player> {
    if let Ok(player) = store.load_player(query) {
        return Ok(player);
    }
    let matches: Vec<Player> = store
        .list_players()?
        .into_iter()
        .filter(|p| p.name.eq_ignore_ascii_case(query))
        .collect();
    match matches.len() {
        0 => bail!("no player matches '{query}'"),
        1 => Ok(matches.into_iter().next().expect("one match")),
        n => bail!("'{query}' is ambiguous ({n} players share the name); use the id"),
    }
}

/// Resolves a player reference within a tournament's field.
fn find_tournament_player(
    t: &Tournament,
    query: &str,
) -> Result<tourney_core::PlayerId> {
    let matches: Vec<&tourney_core::PlayerId> = t
        .players()
        .iter()
        .filter(|p| p.player.id.as_str() == query || p.player.name.eq_ignore_ascii_case(query))
        .map(|p| &p.player.id)
        .collect();
    match matches.len() {
        0 => bail!("no player in this tournament matches '{query}'"),
        1 => Ok(matches[0].clone()),
        n => bail!("'{query}' is ambiguous ({n} players match); use the id"),
    }
}

fn print_round(t: &Tournament, number: u32) {
    let round = t.round(number).expect("caller checked the round exists");
    for pairing in &round.pairings {
        if let Some(bye) = pairing.bye_player() {
            println!("  bye:     {}", player_name(t, bye));
        } else {
            let white = pairing.white.as_ref().expect("game has white");
            let black = pairing.black.as_ref().expect("game has black");
            let result = pairing
                .result
                .map_or_else(|| "*".to_string(), |r| r.to_string());
            println!(
                "  board {}: {:<24} - {:<24} {}",
                pairing.board.expect("game has a board"),
                player_name(t, white),
                player_name(t, black),
                result
            );
        }
    }
}

fn print_standings(t: &Tournament) {
    let standings = build_standings(t);
    print!("{:>4} {:<24} {:>6} {:>6}", "Rank", "Name", "Score", "+/-");
    for system in &t.tiebreaks {
        print!(" {:>15}", system.to_string());
    }
    println!();
    for entry in standings {
        print!(
            "{:>4} {:<24} {:>6.1} {:>6}",
            entry.rank, entry.name, entry.score, entry.color_balance
        );
        for tb in &entry.tiebreaks {
            print!(" {:>15.2}", tb.value);
        }
        println!();
    }
}

fn player_name<'a>(t: &'a Tournament, id: &'a tourney_core::PlayerId) -> &'a str {
    t.player(id)
        .map_or_else(|| id.as_str(), |p| p.player.name.as_str())
}

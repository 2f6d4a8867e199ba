// Command-line surface: argument parsing and command dispatch.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use lineup_core::clipboard::ClipboardSource;
use lineup_core::engine::partition::TeamPair;
use lineup_core::error::RosterError;
use lineup_core::player::{clamp_level, total_fitness, total_skill, Player, Position};
use lineup_core::roster_csv;
use lineup_core::service::{LineupService, NewPlayer};
use lineup_core::sink::StateSink;
use lineup_core::store::KeyValueStore;

use crate::clipboard::{FileClipboard, StdinClipboard};

#[derive(Debug, Parser)]
#[command(name = "lineup")]
#[command(about = "Pick-up game roster, attendance and balanced teams")]
#[command(version)]
pub struct Cli {
    /// Path to a lineup.toml (defaults to config/lineup.toml, then the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// SQLite database path, overriding the config
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Seed for team generation, for reproducible splits
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the roster
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the participant set for the next game
    Game {
        #[arg(long)]
        json: bool,
    },

    /// Add a player to the roster
    Add {
        name: String,

        #[arg(long, value_parser = parse_position, default_value = "DEF")]
        position: Position,

        #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
        skill: i64,

        #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
        fitness: i64,
    },

    /// Change a player's name, position or levels
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_parser = parse_position)]
        position: Option<Position>,

        #[arg(long, allow_negative_numbers = true)]
        skill: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        fitness: Option<i64>,
    },

    /// Remove a player from the roster and the participant set
    Remove { id: String },

    /// Add a player to, or drop them from, the participant set
    Toggle { id: String },

    /// Empty the participant set
    Clear,

    /// Resolve an attendance message into the participant set
    Attend {
        /// Read the message from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,

        /// Only show the names extracted from the message
        #[arg(long)]
        preview: bool,
    },

    /// Split the participant set into two teams
    Teams {
        #[arg(long)]
        json: bool,
    },

    /// Add players from a CSV file (name,position,skill,fitness)
    Import { path: PathBuf },

    /// Write the roster to a CSV file
    Export { path: PathBuf },
}

fn parse_position(s: &str) -> Result<Position, String> {
    Position::from_str_pos(s).ok_or_else(|| format!("unknown position `{s}` (use DEF or ATT)"))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one command against the service, writing human output to `out`.
pub async fn execute<S, K, W>(
    command: Command,
    svc: &mut LineupService<S, K>,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore,
    K: StateSink,
    W: Write,
{
    match command {
        Command::List { json } => {
            let roster = svc.roster()?;
            print_players(out, &roster, json)?;
        }
        Command::Game { json } => {
            let participants = svc.participants()?;
            print_players(out, &participants, json)?;
        }
        Command::Add {
            name,
            position,
            skill,
            fitness,
        } => {
            let player = svc.create_player(NewPlayer {
                name,
                position,
                skill_level: skill,
                fitness_level: fitness,
            })?;
            writeln!(out, "Added {}", describe(&player))?;
        }
        Command::Edit {
            id,
            name,
            position,
            skill,
            fitness,
        } => {
            let mut player = svc
                .roster()?
                .into_iter()
                .find(|p| p.id == id)
                .ok_or_else(|| RosterError::UnknownPlayer(id.clone()))?;
            if let Some(name) = name {
                player.name = name;
            }
            if let Some(position) = position {
                player.position = position;
            }
            if let Some(skill) = skill {
                player.skill_level = clamp_level(skill);
            }
            if let Some(fitness) = fitness {
                player.fitness_level = clamp_level(fitness);
            }
            let player = svc.update_player(player)?;
            writeln!(out, "Updated {}", describe(&player))?;
        }
        Command::Remove { id } => {
            let player = svc.delete_player(&id)?;
            writeln!(out, "Removed {}", player.name)?;
        }
        Command::Toggle { id } => {
            let playing = svc.toggle_participant(&id)?;
            let state = if playing { "in" } else { "out" };
            writeln!(out, "{id} is {state}")?;
        }
        Command::Clear => {
            svc.clear_participants()?;
            writeln!(out, "Participant set cleared")?;
        }
        Command::Attend { file, preview } => {
            let clipboard: Box<dyn ClipboardSource> = match file {
                Some(path) => Box::new(FileClipboard(path)),
                None => Box::new(StdinClipboard),
            };
            attend(svc, clipboard.as_ref(), preview, out).await?;
        }
        Command::Teams { json } => {
            let teams = svc.generate_teams()?;
            print_teams(out, &teams, json)?;
        }
        Command::Import { path } => {
            let rows = roster_csv::import_roster(&path)?;
            let report = svc.import_players(rows)?;
            writeln!(
                out,
                "Imported {} player(s) from {}",
                report.added.len(),
                path.display()
            )?;
            for name in &report.skipped {
                writeln!(out, "  skipped {name}: already on the roster")?;
            }
        }
        Command::Export { path } => {
            let roster = svc.roster()?;
            roster_csv::export_roster(&roster, &path)?;
            writeln!(out, "Exported {} player(s) to {}", roster.len(), path.display())?;
        }
    }
    Ok(())
}

async fn attend<S, K, W>(
    svc: &mut LineupService<S, K>,
    clipboard: &dyn ClipboardSource,
    preview: bool,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore,
    K: StateSink,
    W: Write,
{
    if preview {
        let buffer = svc.begin_attendance(clipboard).await?;
        writeln!(out, "{}", buffer.text())?;
        return Ok(());
    }

    let text = clipboard
        .read_text()
        .await
        .context("failed to read attendance message")?;
    let report = svc.resolve_attendance(&text)?;
    info!("Attendance resolved into {} participant(s)", report.participants.len());

    writeln!(
        out,
        "{} participant(s): {} matched, {} new",
        report.participants.len(),
        report.matched.len(),
        report.created.len()
    )?;
    for player in &report.created {
        writeln!(out, "  new: {}", describe(player))?;
    }
    if !report.duplicate_names.is_empty() {
        let names: Vec<&str> = report.duplicate_names.iter().map(String::as_str).collect();
        writeln!(out, "  listed more than once: {}", names.join(", "))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn describe(player: &Player) -> String {
    format!(
        "{} [{}] {} skill {} fitness {}",
        player.name, player.id, player.position, player.skill_level, player.fitness_level
    )
}

fn print_players<W: Write>(out: &mut W, players: &[Player], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(players)?)?;
        return Ok(());
    }
    for p in players {
        writeln!(
            out,
            "{:<36}  {:<24} {}  skill {:>2}  fitness {:>2}",
            p.id, p.name, p.position, p.skill_level, p.fitness_level
        )?;
    }
    writeln!(out, "{} player(s)", players.len())?;
    Ok(())
}

fn print_teams<W: Write>(out: &mut W, teams: &TeamPair, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(teams)?)?;
        return Ok(());
    }
    for (label, team) in [("Team A", &teams.team_a), ("Team B", &teams.team_b)] {
        writeln!(
            out,
            "{label} (skill {}, fitness {})",
            total_skill(team),
            total_fitness(team)
        )?;
        for p in team {
            writeln!(out, "  {:<24} {}", p.name, p.position)?;
        }
    }
    Ok(())
}

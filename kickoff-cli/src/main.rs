//! Kickoff CLI - Command-line interface
//!
//! Commands:
//! - competition: Run one competition on a roster file
//! - season: Play seasons from a state file, with save/resume
//! - odds: Monte Carlo title odds for a league

mod competition_cmd;
mod odds_cmd;
mod season_cmd;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kickoff")]
#[command(about = "Football competition simulator")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single competition
    Competition(competition_cmd::CompetitionArgs),
    /// Play one or more seasons
    Season(season_cmd::SeasonArgs),
    /// Estimate title odds over many simulated leagues
    Odds(odds_cmd::OddsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Odds runs thousands of competitions; keep their per-run logs quiet
    let default_filter = match cli.command {
        Commands::Odds(_) => "warn",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Competition(args) => competition_cmd::run(args, cli.seed),
        Commands::Season(args) => season_cmd::run(args, cli.seed),
        Commands::Odds(args) => odds_cmd::run(args, cli.seed),
    }
}

/// Create RNG from seed or random
pub(crate) fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

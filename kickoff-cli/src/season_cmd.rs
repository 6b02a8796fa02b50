//! Season command - run seasons from a state file, with save/resume
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_state(), load_config(), save_state(), report_season()
//! - Level 4: save file envelope

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};

use kickoff_core::persist::{load_json, save_json};
use kickoff_core::RatingResolver;
use kickoff_tournament::{run_season, SeasonConfig, SeasonReport, SeasonState};

use crate::competition_cmd::print_table;
use crate::create_rng;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SeasonArgs {
    /// Season state JSON file (bare state or a save file)
    #[arg(long, value_name = "FILE")]
    pub state: PathBuf,

    /// Number of seasons to play
    #[arg(long, default_value = "1")]
    pub seasons: u32,

    /// Season configuration JSON file (defaults built in)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a save file after the last season
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Output season reports as JSON
    #[arg(long)]
    pub json: bool,
}

/// Save file envelope
#[derive(Serialize, Deserialize)]
pub struct SaveFile {
    pub saved_at: DateTime<Utc>,
    pub state: SeasonState,
}

/// Accepts either a save file or a bare state
#[derive(Deserialize)]
#[serde(untagged)]
enum StateFile {
    Saved(SaveFile),
    Bare(SeasonState),
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run season command
///
/// 1. Load state and configuration
/// 2. Play each season, reporting as we go
/// 3. Save if asked
pub fn run(args: SeasonArgs, seed: Option<u64>) -> Result<()> {
    let mut state = load_state(&args.state)?;
    let config = load_config(args.config.as_deref())?;

    let mut rng = create_rng(seed);
    let resolver = RatingResolver::default();
    let mut reports = Vec::with_capacity(args.seasons as usize);

    for _ in 0..args.seasons {
        let report = run_season(&mut state, &config, &resolver, &mut rng);
        if !args.json {
            report_season(&report);
        }
        reports.push(report);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&reports).context("Failed to encode reports")?;
        println!("{}", json);
    }

    if let Some(path) = &args.save {
        save_state(&state, path)?;
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_state(path: &Path) -> Result<SeasonState> {
    let file: StateFile = load_json(path)
        .with_context(|| format!("Failed to load season state: {}", path.display()))?;

    let state = match file {
        StateFile::Saved(save) => {
            tracing::info!("Resuming save from {}", save.saved_at.to_rfc3339());
            save.state
        }
        StateFile::Bare(state) => state,
    };

    state
        .validate()
        .with_context(|| format!("Invalid season state: {}", path.display()))?;

    tracing::info!(
        "Loaded season state: {} league teams, {} seasons played",
        state.league.len(),
        state.season_number
    );
    Ok(state)
}

fn load_config(path: Option<&Path>) -> Result<SeasonConfig> {
    let config = match path {
        Some(path) => load_json(path)
            .with_context(|| format!("Failed to load season config: {}", path.display()))?,
        None => SeasonConfig::default(),
    };

    config.validate().context("Invalid season config")?;
    Ok(config)
}

fn save_state(state: &SeasonState, path: &Path) -> Result<()> {
    let save = SaveFile {
        saved_at: Utc::now(),
        state: state.clone(),
    };
    save_json(&save, path).with_context(|| format!("Failed to save: {}", path.display()))?;

    tracing::info!("Saved season {} to {}", state.season_number, path.display());
    Ok(())
}

fn report_season(report: &SeasonReport) {
    println!("\n=== Season {} ===", report.season_number);
    print_table(&report.league_table);

    println!();
    for competition in &report.competitions {
        println!(
            "{:<24} winner: {:<24} runner-up: {}",
            competition.name,
            competition.winner.as_deref().unwrap_or("-"),
            competition.runner_up.as_deref().unwrap_or("-")
        );
    }

    if let Some(scorer) = &report.top_scorer {
        println!(
            "\nTop scorer: {} ({}), {} goals",
            scorer.player, scorer.team, scorer.goals
        );
    }

    if !report.promoted.is_empty() || !report.relegated.is_empty() {
        println!("\nPromoted:  {}", report.promoted.join(", "));
        println!("Relegated: {}", report.relegated.join(", "));
    }
}

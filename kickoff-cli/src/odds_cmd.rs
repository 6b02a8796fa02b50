//! Odds command - Monte Carlo title odds for a league
//!
//! Each run is an independent league on its own RNG, seeded from the base
//! seed plus the run index, so results do not depend on thread scheduling.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use kickoff_core::{RatingResolver, Team};
use kickoff_tournament::{run_competition, CompetitionFormat, PrizeTable};

#[derive(Args)]
pub struct OddsArgs {
    /// Roster JSON file (list of teams)
    #[arg(long, value_name = "FILE")]
    pub teams: PathBuf,

    /// Number of simulated seasons
    #[arg(long, default_value = "1000")]
    pub runs: usize,

    /// Double round-robin
    #[arg(long)]
    pub double: bool,

    /// Also report the chance of finishing in the top N
    #[arg(long, default_value = "4")]
    pub top: usize,

    /// Output odds as JSON
    #[arg(long)]
    pub json: bool,
}

/// One team's outlook over all runs
#[derive(Clone, Debug, Default, Serialize)]
pub struct Outlook {
    pub team: String,
    pub titles: u32,
    pub top_finishes: u32,
    pub title_pct: f64,
    pub top_pct: f64,
}

pub fn run(args: OddsArgs, seed: Option<u64>) -> Result<()> {
    let teams = Team::load_roster(&args.teams)
        .with_context(|| format!("Failed to load roster: {}", args.teams.display()))?;

    let base_seed = seed.unwrap_or_else(rand::random);
    tracing::info!(
        "Simulating {} runs of {} teams (base seed {})",
        args.runs,
        teams.len(),
        base_seed
    );

    let outlook = simulate(&teams, &args, base_seed);

    if args.json {
        let json = serde_json::to_string_pretty(&outlook).context("Failed to encode odds")?;
        println!("{}", json);
    } else {
        print_outlook(&outlook, args.top);
    }
    Ok(())
}

/// Run every league in parallel and tally titles and top-N finishes
pub fn simulate(teams: &[Team], args: &OddsArgs, base_seed: u64) -> Vec<Outlook> {
    let format = CompetitionFormat::league(args.double);
    let prizes = PrizeTable::default();
    let resolver = RatingResolver::default();

    let pb = ProgressBar::new(args.runs as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} runs ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let finishes: Vec<Vec<usize>> = (0..args.runs)
        .into_par_iter()
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let result = run_competition("Odds", teams, &format, &prizes, &resolver, &mut rng);
            pb.inc(1);
            result.ranking.into_iter().take(args.top.max(1)).collect()
        })
        .collect();

    pb.finish_and_clear();

    let mut tally: FxHashMap<usize, (u32, u32)> = FxHashMap::default();
    for ranking in &finishes {
        if let Some(&champion) = ranking.first() {
            tally.entry(champion).or_default().0 += 1;
        }
        for &team in ranking.iter().take(args.top) {
            tally.entry(team).or_default().1 += 1;
        }
    }

    let runs = args.runs.max(1) as f64;
    let mut outlook: Vec<Outlook> = teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let (titles, top_finishes) = tally.get(&i).copied().unwrap_or_default();
            Outlook {
                team: team.name.clone(),
                titles,
                top_finishes,
                title_pct: 100.0 * titles as f64 / runs,
                top_pct: 100.0 * top_finishes as f64 / runs,
            }
        })
        .collect();

    outlook.sort_by(|a, b| {
        b.titles
            .cmp(&a.titles)
            .then_with(|| b.top_finishes.cmp(&a.top_finishes))
    });
    outlook
}

fn print_outlook(outlook: &[Outlook], top: usize) {
    println!("\n=== Title Odds ===");
    println!("{:<24} {:>8} {:>8}", "Team", "Title", format!("Top {}", top));
    for row in outlook {
        println!(
            "{:<24} {:>7.1}% {:>7.1}%",
            row.team, row.title_pct, row.top_pct
        );
    }
}

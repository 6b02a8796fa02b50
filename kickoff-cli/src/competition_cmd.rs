//! Competition command - run one competition on a roster file
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_teams(), build_format(), report_results()
//! - Level 3: print_groups(), print_bracket()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use kickoff_core::{RatingResolver, StandingRow, Team};
use kickoff_tournament::{
    run_competition, Bracket, CompetitionFormat, CompetitionResult, GroupStageConfig,
    KnockoutConfig, PrizeTable, TieBreak,
};

use crate::create_rng;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct CompetitionArgs {
    /// Roster JSON file (list of teams)
    #[arg(long, value_name = "FILE")]
    pub teams: PathBuf,

    /// Competition format
    #[arg(long, value_enum, default_value = "league")]
    pub format: FormatArg,

    /// Competition name
    #[arg(long, default_value = "Competition")]
    pub name: String,

    /// Double round-robin (league and group stages)
    #[arg(long)]
    pub double: bool,

    /// Two-legged knockout ties
    #[arg(long)]
    pub two_legged: bool,

    /// Teams per group (cup and world formats)
    #[arg(long, default_value = "4")]
    pub group_size: usize,

    /// Qualifiers per group (cup and world formats)
    #[arg(long, default_value = "2")]
    pub qualifiers: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    League,
    Knockout,
    Cup,
    World,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run competition command
///
/// 1. Load the roster
/// 2. Build and validate the format
/// 3. Play the competition
/// 4. Report results
pub fn run(args: CompetitionArgs, seed: Option<u64>) -> Result<()> {
    let teams = load_teams(&args)?;
    let format = build_format(&args);
    format
        .validate()
        .context("Invalid competition options")?;

    let mut rng = create_rng(seed);
    let resolver = RatingResolver::default();
    let prizes = PrizeTable::default();

    let result = run_competition(&args.name, &teams, &format, &prizes, &resolver, &mut rng);

    report_results(&result, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_teams(args: &CompetitionArgs) -> Result<Vec<Team>> {
    let teams = Team::load_roster(&args.teams)
        .with_context(|| format!("Failed to load roster: {}", args.teams.display()))?;

    tracing::info!("Loaded {} teams from {}", teams.len(), args.teams.display());
    Ok(teams)
}

/// Map command-line options onto a competition format
pub fn build_format(args: &CompetitionArgs) -> CompetitionFormat {
    let groups = GroupStageConfig {
        group_size: args.group_size,
        qualifiers_per_group: args.qualifiers,
        double_round_robin: args.double,
        shuffle: true,
    };
    let knockout = KnockoutConfig {
        two_legged: args.two_legged,
        ..Default::default()
    };

    match args.format {
        FormatArg::League => CompetitionFormat::league(args.double),
        FormatArg::Knockout => CompetitionFormat::Knockout { knockout },
        FormatArg::Cup => CompetitionFormat::Cup { groups, knockout },
        FormatArg::World => CompetitionFormat::WorldTournament { groups, knockout },
    }
}

fn report_results(result: &CompetitionResult, args: &CompetitionArgs) -> Result<()> {
    if args.json {
        let json = serde_json::to_string_pretty(result).context("Failed to encode results")?;
        println!("{}", json);
        return Ok(());
    }

    println!("\n=== {} ({}) ===", result.name, result.format.label());

    match result.format {
        CompetitionFormat::League { .. } => print_table(&result.final_standings),
        _ => {
            print_groups(result);
            if let Some(bracket) = &result.bracket {
                print_bracket(bracket, &result.teams);
            }
        }
    }

    println!();
    println!("Winner:    {}", result.winner_name().unwrap_or("-"));
    println!("Runner-up: {}", result.runner_up_name().unwrap_or("-"));
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn print_groups(result: &CompetitionResult) {
    let Some(stage) = &result.group_stage else {
        return;
    };

    for group in &stage.groups {
        println!("\nGroup {}", group.label);
        print_table(&group.table(&result.teams));
    }
}

fn print_bracket(bracket: &Bracket, teams: &[Team]) {
    for round in &bracket.rounds {
        println!("\n{}", round_name(round.number, bracket.rounds.len()));

        for tie in &round.ties {
            let legs: Vec<String> = tie
                .legs
                .iter()
                .map(|leg| {
                    format!(
                        "{} {} {}",
                        teams[leg.home].name, leg.score, teams[leg.away].name
                    )
                })
                .collect();

            println!(
                "  {:<50} -> {}{}",
                legs.join(", "),
                teams[tie.winner].name,
                tie_break_note(tie.decided_by)
            );
        }

        if let Some(bye) = round.bye {
            println!("  {} (bye)", teams[bye].name);
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Print a standings table
pub fn print_table(rows: &[StandingRow]) {
    println!(
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
        "Pos", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for row in rows {
        let s = &row.stats;
        println!(
            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4} {:>4}",
            row.position,
            row.name,
            s.games_played,
            s.wins,
            s.draws,
            s.losses,
            s.goals_for,
            s.goals_against,
            row.goal_difference(),
            s.points
        );
    }
}

fn round_name(number: usize, total: usize) -> String {
    match total - number {
        0 => "Final".to_string(),
        1 => "Semi-finals".to_string(),
        2 => "Quarter-finals".to_string(),
        _ => format!("Round {}", number),
    }
}

fn tie_break_note(decided_by: TieBreak) -> &'static str {
    match decided_by {
        TieBreak::Score | TieBreak::Aggregate => "",
        TieBreak::AwayGoals => " (away goals)",
        TieBreak::Penalties => " (penalties)",
    }
}

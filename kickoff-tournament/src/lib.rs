//! Kickoff Tournament - Competition formats and the season loop
//!
//! This crate provides competition infrastructure:
//! - Group stages (round-robin groups feeding a qualifier list)
//! - Knockout ties and brackets (aggregate, away goals, penalties, byes)
//! - Named competitions: league, knockout, cup, world tournament
//! - The season loop with cups, continental play and promotion/relegation
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_season, run_competition (orchestration)
//! - Level 2: run_groups, run_knockout (phases)
//! - Level 3: resolve_tie, decide_two_legged (steps)
//! - Level 4: configuration

mod competition;
mod config;
mod group_stage;
mod knockout;
mod season;

pub use competition::{run_competition, Award, CompetitionResult};
pub use config::{
    ByePolicy, CompetitionFormat, DrawPolicy, GroupStageConfig, KnockoutConfig, Placement,
    PrizeTable,
};
pub use group_stage::{group_label, run_groups, Group, GroupStage};
pub use knockout::{
    decide_two_legged, penalty_shootout, resolve_tie, run_knockout, Bracket, KnockoutRound, Side,
    TieBreak, TieResult,
};
pub use season::{
    run_season, CompetitionSummary, ContinentalSlot, CupEntry, CupSlot, SeasonConfig,
    SeasonReport, SeasonState, TopScorer, WorldSlot,
};

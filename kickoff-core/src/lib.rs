//! Kickoff Core - Scheduling, standings and match resolution
//!
//! This crate provides the building blocks every competition format uses:
//! - Teams, squads and per-competition stats
//! - Round-robin fixture generation (circle method, byes for odd counts)
//! - Standings bookkeeping and table ordering
//! - The match resolver contract and a rating-driven default resolver
//! - JSON persistence of rosters and state

pub mod error;
pub mod persist;
pub mod team;
pub mod fixtures;
pub mod standings;
pub mod resolver;

// Re-exports for convenient access
pub use error::{KickoffError, Result};
pub use team::{ensure_unique_names, pair_mut, Player, Team, TeamStats, STARTING_ELEVEN};
pub use fixtures::{generate_round_robin, Fixture, Matchday};
pub use standings::{compare_stats, rank, rank_members, table, update_after_match, StandingRow};
pub use resolver::{resolve_fixture, resolve_match, MatchResolver, PlayedMatch, RatingResolver, Score};

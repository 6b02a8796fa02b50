//! Team - the competition-facing view of a club or national side

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KickoffError, Result};
use crate::persist::{load_json, save_json};

/// Number of players that make up a starting eleven
pub const STARTING_ELEVEN: usize = 11;

/// A squad member, as far as match resolution cares
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: String,
    /// Overall rating
    pub rating: u8,
    /// Goals credited by the match resolver this season
    #[serde(default)]
    pub season_goals: u32,
}

impl Player {
    pub fn new(name: &str, position: &str, rating: u8) -> Self {
        Self {
            name: name.to_string(),
            position: position.to_string(),
            rating,
            season_goals: 0,
        }
    }
}

/// Cumulative results for one team in one competition context
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub points: u32,
    pub games_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl TeamStats {
    /// Goals for minus goals against
    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    /// Record one match from this team's point of view.
    ///
    /// Win is worth 3 points, a draw 1, a loss nothing.
    pub fn record(&mut self, scored: u32, conceded: u32) {
        self.games_played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;

        if scored > conceded {
            self.wins += 1;
            self.points += 3;
        } else if scored == conceded {
            self.draws += 1;
            self.points += 1;
        } else {
            self.losses += 1;
        }
    }

    /// Add another stat block into this one
    pub fn merge(&mut self, other: &TeamStats) {
        self.points += other.points;
        self.games_played += other.games_played;
        self.wins += other.wins;
        self.draws += other.draws;
        self.losses += other.losses;
        self.goals_for += other.goals_for;
        self.goals_against += other.goals_against;
    }

    /// Zero every counter
    pub fn reset(&mut self) {
        *self = TeamStats::default();
    }
}

/// A team as seen by scheduling, standings and the match resolver
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Team {
    /// Unique within a competition run
    pub name: String,
    /// League affiliation (e.g. "Domestic League")
    #[serde(default)]
    pub league: Option<String>,
    /// Flat strength used when the squad is empty
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub stats: TeamStats,
    #[serde(default)]
    pub budget: i64,
    #[serde(default)]
    pub trophies: Vec<String>,
}

impl Team {
    /// Create a team with an empty squad
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            league: None,
            rating: 0.0,
            players: Vec::new(),
            stats: TeamStats::default(),
            budget: 0,
            trophies: Vec::new(),
        }
    }

    /// Create a squadless team described only by a flat rating
    pub fn with_rating(name: &str, rating: f32) -> Self {
        Self {
            rating,
            ..Self::new(name)
        }
    }

    /// Set league affiliation
    pub fn in_league(mut self, league: &str) -> Self {
        self.league = Some(league.to_string());
        self
    }

    /// Strength signal: mean rating of the best eleven players.
    ///
    /// Falls back to the flat `rating` when the squad is empty.
    pub fn strength(&self) -> f32 {
        if self.players.is_empty() {
            return self.rating;
        }

        let mut ratings: Vec<u8> = self.players.iter().map(|p| p.rating).collect();
        ratings.sort_unstable_by(|a, b| b.cmp(a));

        let best: Vec<f32> = ratings
            .iter()
            .take(STARTING_ELEVEN)
            .map(|&r| r as f32)
            .collect();

        best.iter().sum::<f32>() / best.len() as f32
    }

    /// Copy this team for a competition whose results must stay separate
    /// from the season-long record. Stats start from zero.
    pub fn competition_entry(&self) -> Team {
        let mut entry = self.clone();
        entry.stats.reset();
        entry
    }

    /// Load a roster (JSON list of teams), rejecting duplicate names
    pub fn load_roster(path: &Path) -> Result<Vec<Team>> {
        let teams: Vec<Team> = load_json(path)?;
        ensure_unique_names(&teams)?;
        Ok(teams)
    }

    /// Save a roster as JSON
    pub fn save_roster(teams: &[Team], path: &Path) -> Result<()> {
        save_json(&teams, path)
    }
}

/// Team names identify teams within a competition; duplicates are rejected
pub fn ensure_unique_names(teams: &[Team]) -> Result<()> {
    let mut seen = HashSet::with_capacity(teams.len());
    for team in teams {
        if !seen.insert(team.name.as_str()) {
            return Err(KickoffError::DuplicateTeam(team.name.clone()));
        }
    }
    Ok(())
}

/// Borrow two distinct teams mutably.
///
/// # Panics
/// Panics if `a == b`; a team never plays itself.
pub fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "a team cannot be paired with itself");

    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

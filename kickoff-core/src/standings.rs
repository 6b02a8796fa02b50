//! Standings - result bookkeeping and table ordering
//!
//! Ordering is points, then goal difference, then goals scored, all
//! descending. Teams level on all three keep their input order: the sort is
//! stable so identical inputs always produce identical tables.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::team::{Team, TeamStats};

/// One row of a rendered table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    /// 1-based table position
    pub position: usize,
    pub name: String,
    pub stats: TeamStats,
}

impl StandingRow {
    pub fn goal_difference(&self) -> i64 {
        self.stats.goal_difference()
    }
}

/// Apply one final score to both sides
pub fn update_after_match(
    home: &mut TeamStats,
    away: &mut TeamStats,
    home_goals: u32,
    away_goals: u32,
) {
    home.record(home_goals, away_goals);
    away.record(away_goals, home_goals);
}

/// Table comparison: `Less` means `a` ranks above `b`
pub fn compare_stats(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}

/// Rank all teams, returning indices into `teams` from top to bottom
pub fn rank(teams: &[Team]) -> Vec<usize> {
    let members: Vec<usize> = (0..teams.len()).collect();
    rank_members(teams, &members)
}

/// Rank a subset of teams (e.g. one group). Ties after the three keys keep
/// the order in which they appear in `members`.
pub fn rank_members(teams: &[Team], members: &[usize]) -> Vec<usize> {
    let mut order = members.to_vec();
    order.sort_by(|&a, &b| compare_stats(&teams[a].stats, &teams[b].stats));
    order
}

/// Render ranked indices as table rows
pub fn table(teams: &[Team], order: &[usize]) -> Vec<StandingRow> {
    order
        .iter()
        .enumerate()
        .map(|(i, &idx)| StandingRow {
            position: i + 1,
            name: teams[idx].name.clone(),
            stats: teams[idx].stats,
        })
        .collect()
}

//! Competition orchestration - named competitions composed from groups and
//! knockouts, with prize lookup
//!
//! Level 1 - Orchestration

use kickoff_core::{rank, table, MatchResolver, StandingRow, Team};
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::{CompetitionFormat, DrawPolicy, KnockoutConfig, Placement, PrizeTable};
use crate::group_stage::{run_groups, GroupStage};
use crate::knockout::{run_knockout, Bracket};

/// Prize money earned by one team
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub team: String,
    pub placement: Placement,
    pub prize: u64,
}

/// Result of a competition. Indices refer to `teams`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompetitionResult {
    pub name: String,
    pub format: CompetitionFormat,
    /// Competition-local copies carrying this competition's stats only
    pub teams: Vec<Team>,
    pub group_stage: Option<GroupStage>,
    pub bracket: Option<Bracket>,
    /// Every participant ranked by competition stats. For a league this is
    /// the final table.
    pub ranking: Vec<usize>,
    pub final_standings: Vec<StandingRow>,
    pub winner: Option<usize>,
    pub runner_up: Option<usize>,
    /// Teams that advanced out of the group stage
    pub qualifiers: Vec<usize>,
    /// Teams knocked out, group stage exits first
    pub eliminated: Vec<usize>,
    pub awards: Vec<Award>,
}

impl CompetitionResult {
    pub fn winner_name(&self) -> Option<&str> {
        self.winner.map(|i| self.teams[i].name.as_str())
    }

    pub fn runner_up_name(&self) -> Option<&str> {
        self.runner_up.map(|i| self.teams[i].name.as_str())
    }

    /// Final placement of a team
    pub fn placement_of(&self, team: usize) -> Placement {
        if let CompetitionFormat::League { .. } = self.format {
            let position = self.ranking.iter().position(|&i| i == team).unwrap_or(self.ranking.len());
            return Placement::LeaguePosition(position + 1);
        }

        if self.winner == Some(team) {
            Placement::Winner
        } else if self.runner_up == Some(team) {
            Placement::RunnerUp
        } else if self
            .bracket
            .as_ref()
            .is_some_and(|b| b.semi_finalists().contains(&team))
        {
            Placement::SemiFinalist
        } else if self.group_stage.is_some() && !self.qualifiers.contains(&team) {
            Placement::GroupStage
        } else {
            Placement::Eliminated
        }
    }

    /// Total prize money for a team name
    pub fn prize_for(&self, name: &str) -> u64 {
        self.awards
            .iter()
            .filter(|a| a.team == name)
            .map(|a| a.prize)
            .sum()
    }

    /// Fold this competition's stats into season-long records, matched by
    /// name. Records without a counterpart are left untouched.
    pub fn merge_stats_into(&self, records: &mut [Team]) {
        let by_name: FxHashMap<&str, usize> = self
            .teams
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();

        for record in records.iter_mut() {
            if let Some(&i) = by_name.get(record.name.as_str()) {
                record.stats.merge(&self.teams[i].stats);
            }
        }
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run a named competition (Level 1 orchestration)
///
/// # Arguments
/// * `name` - Competition name, used in logs and awards
/// * `participants` - Entrants; they are copied with zeroed stats, the
///   originals are never mutated
/// * `format` - League, knockout, cup or world tournament
/// * `prizes` - Placement to prize money lookup
///
/// # Returns
/// Winner, runner-up, qualifiers, eliminated teams, standings and awards
pub fn run_competition<M, R>(
    name: &str,
    participants: &[Team],
    format: &CompetitionFormat,
    prizes: &PrizeTable,
    resolver: &M,
    rng: &mut R,
) -> CompetitionResult
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    tracing::info!(
        "{}: {} teams, {} format",
        name,
        participants.len(),
        format.label()
    );

    let mut teams: Vec<Team> = participants.iter().map(Team::competition_entry).collect();
    let everyone: Vec<usize> = (0..teams.len()).collect();

    let mut group_stage = None;
    let mut bracket = None;
    let mut qualifiers = Vec::new();
    let mut eliminated = Vec::new();

    match format {
        CompetitionFormat::League { double_round_robin } => {
            let mut stage = GroupStage::single(everyone, *double_round_robin);
            stage.play_all(&mut teams, resolver, rng);
            group_stage = Some(stage);
        }
        CompetitionFormat::Knockout { knockout } => {
            let done = run_knockout(&mut teams, everyone, *knockout, resolver, rng);
            eliminated = done.eliminated();
            bracket = Some(done);
        }
        CompetitionFormat::Cup { groups, knockout } => {
            let stage = run_groups(&mut teams, &everyone, groups, resolver, rng);
            qualifiers = stage.qualifiers();
            eliminated = stage.eliminated();

            let done = run_knockout(&mut teams, qualifiers.clone(), *knockout, resolver, rng);
            eliminated.extend(done.eliminated());
            bracket = Some(done);
            group_stage = Some(stage);
        }
        CompetitionFormat::WorldTournament { groups, knockout } => {
            let stage = run_groups(&mut teams, &everyone, groups, resolver, rng);
            qualifiers = stage.qualifiers();
            eliminated = stage.eliminated();

            let seeding = cross_group_seeding(&stage);
            let config = KnockoutConfig {
                draw: DrawPolicy::Seeded,
                ..*knockout
            };
            let mut done = Bracket::new(seeding.order, config, rng).with_reserved_bye(seeding.bye);
            done.play_all(&mut teams, resolver, rng);
            eliminated.extend(done.eliminated());
            bracket = Some(done);
            group_stage = Some(stage);
        }
    }

    let ranking = match (&group_stage, format) {
        (Some(stage), CompetitionFormat::League { .. }) => {
            stage.groups.first().map(|g| g.standings.clone()).unwrap_or_default()
        }
        _ => rank(&teams),
    };

    let (winner, runner_up) = match &bracket {
        Some(b) => (b.winner(), b.runner_up()),
        None => (ranking.first().copied(), ranking.get(1).copied()),
    };

    let final_standings = table(&teams, &ranking);

    let mut result = CompetitionResult {
        name: name.to_string(),
        format: *format,
        teams,
        group_stage,
        bracket,
        ranking,
        final_standings,
        winner,
        runner_up,
        qualifiers,
        eliminated,
        awards: Vec::new(),
    };

    result.awards = (0..result.teams.len())
        .filter_map(|i| {
            let placement = result.placement_of(i);
            let prize = prizes.prize_for(placement);
            (prize > 0).then(|| Award {
                team: result.teams[i].name.clone(),
                placement,
                prize,
            })
        })
        .collect();

    tracing::info!(
        "{} won by {}",
        name,
        result.winner_name().unwrap_or("nobody")
    );

    result
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// First-round knockout order plus the team held back for the bye
#[derive(Debug, PartialEq, Eq)]
struct Seeding {
    order: Vec<usize>,
    bye: Option<usize>,
}

/// Knockout entrant order that keeps group-mates apart in round one.
///
/// Each group winner meets the runner-up of the nearest following group
/// that still has one: (A1, B2), (B1, C2), ..., (last1, A2) when every group
/// sends two. Qualifiers left over (a short group's lone member, say) are
/// paired across groups where possible, and an odd one out takes the bye.
fn cross_group_seeding(stage: &GroupStage) -> Seeding {
    let per_group: Vec<&[usize]> = stage
        .groups
        .iter()
        .map(|g| g.qualifiers(stage.config.qualifiers_per_group))
        .collect();
    let count = per_group.len();

    // (group, team): winners in group order, the rest by finishing place
    let winners: Vec<(usize, usize)> = per_group
        .iter()
        .enumerate()
        .filter_map(|(g, q)| q.first().map(|&team| (g, team)))
        .collect();
    let depth = per_group.iter().map(|q| q.len()).max().unwrap_or(0);
    let mut others = Vec::new();
    for place in 1..depth {
        for (g, q) in per_group.iter().enumerate() {
            if let Some(&team) = q.get(place) {
                others.push((g, team));
            }
        }
    }

    let mut order = Vec::with_capacity(winners.len() + others.len());
    let mut leftovers = Vec::new();

    for &(group, winner) in &winners {
        let opponent = (1..count)
            .map(|step| (group + step) % count)
            .find_map(|target| others.iter().position(|&(g, _)| g == target));

        match opponent {
            Some(pos) => {
                let (_, runner_up) = others.remove(pos);
                order.extend([winner, runner_up]);
            }
            None => leftovers.push((group, winner)),
        }
    }
    leftovers.extend(others);

    while leftovers.len() > 1 {
        let (group, first) = leftovers.remove(0);
        let pos = leftovers
            .iter()
            .position(|&(g, _)| g != group)
            .unwrap_or(0);
        let (_, second) = leftovers.remove(pos);
        order.extend([first, second]);
    }

    let bye = leftovers.pop().map(|(_, team)| team);
    order.extend(bye);

    Seeding { order, bye }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupStageConfig;
    use kickoff_core::Score;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::Cell;

    /// Higher rating wins 1-0
    struct StrongerWins;

    impl MatchResolver for StrongerWins {
        fn play<R: Rng + ?Sized>(&self, home: &mut Team, away: &mut Team, _: &mut R) -> Score {
            if home.strength() >= away.strength() {
                Score::new(1, 0)
            } else {
                Score::new(0, 1)
            }
        }
    }

    struct CountingDraws {
        calls: Cell<usize>,
    }

    impl MatchResolver for CountingDraws {
        fn play<R: Rng + ?Sized>(&self, _: &mut Team, _: &mut Team, _: &mut R) -> Score {
            self.calls.set(self.calls.get() + 1);
            Score::new(1, 1)
        }
    }

    fn rated(n: usize) -> Vec<Team> {
        (0..n)
            .map(|i| Team::with_rating(&format!("T{}", i), (10 * (i + 1)) as f32))
            .collect()
    }

    #[test]
    fn test_league_ranks_every_team() {
        let teams = rated(6);
        let prizes = PrizeTable::default().with_positions(vec![60, 50, 40]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = run_competition(
            "League",
            &teams,
            &CompetitionFormat::league(true),
            &prizes,
            &StrongerWins,
            &mut rng,
        );

        assert_eq!(result.ranking, vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(result.winner_name(), Some("T5"));
        assert_eq!(result.runner_up_name(), Some("T4"));
        assert_eq!(result.final_standings[0].stats.points, 30);
        assert_eq!(result.placement_of(3), Placement::LeaguePosition(3));
        assert_eq!(result.prize_for("T5"), 60);
        assert_eq!(result.prize_for("T3"), 40);
        assert_eq!(result.prize_for("T0"), 0);
        assert_eq!(result.awards.len(), 3);
    }

    #[test]
    fn test_participants_are_not_mutated() {
        let mut teams = rated(4);
        teams[0].stats.record(5, 0);
        let before = teams[0].stats;
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let result = run_competition(
            "Cup",
            &teams,
            &CompetitionFormat::knockout(false),
            &PrizeTable::default(),
            &StrongerWins,
            &mut rng,
        );

        assert_eq!(teams[0].stats, before);
        assert!(teams[1..].iter().all(|t| t.stats.games_played == 0));
        // Competition copies start from zero
        let copy = &result.teams[0];
        assert!(copy.stats.games_played <= 2);
        assert!(copy.stats.goals_for <= 2);
    }

    #[test]
    fn test_knockout_placements_and_prizes() {
        let teams = rated(8);
        let prizes = PrizeTable::new(100, 50).with_semi_finalist(20).with_participation(5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let result = run_competition(
            "Cup",
            &teams,
            &CompetitionFormat::knockout(false),
            &prizes,
            &StrongerWins,
            &mut rng,
        );

        assert_eq!(result.winner, Some(7));
        assert_eq!(result.placement_of(7), Placement::Winner);
        assert_eq!(result.eliminated.len(), 7);

        let total: u64 = result.awards.iter().map(|a| a.prize).sum();
        assert_eq!(total, 100 + 50 + 2 * 20 + 4 * 5);
        assert_eq!(result.prize_for("T7"), 100);
    }

    #[test]
    fn test_cup_group_exits_and_knockout() {
        let teams = rated(16);
        let format = CompetitionFormat::Cup {
            groups: GroupStageConfig::new(4, 2),
            knockout: KnockoutConfig::two_legged(),
        };
        let prizes = PrizeTable::new(10, 5).with_participation(1);
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let result = run_competition("Silver", &teams, &format, &prizes, &StrongerWins, &mut rng);

        assert_eq!(result.qualifiers.len(), 8);
        assert_eq!(result.eliminated.len(), 15);
        assert_eq!(result.winner, Some(15));
        assert!(result.group_stage.is_some());

        let exits: Vec<usize> = (0..16)
            .filter(|&i| result.placement_of(i) == Placement::GroupStage)
            .collect();
        assert_eq!(exits.len(), 8);
        assert!(exits.iter().all(|i| !result.qualifiers.contains(i)));
    }

    #[test]
    fn test_world_tournament_avoids_group_rematches() {
        let teams = rated(16);
        let format = CompetitionFormat::world_tournament();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let result = run_competition(
            "World Tournament",
            &teams,
            &format,
            &PrizeTable::new(200, 100),
            &StrongerWins,
            &mut rng,
        );

        let stage = result.group_stage.as_ref().unwrap();
        let group_of = |team: usize| stage.groups.iter().position(|g| g.members.contains(&team));

        let first_round = &result.bracket.as_ref().unwrap().rounds[0];
        assert_eq!(first_round.ties.len(), 4);
        for tie in &first_round.ties {
            assert_ne!(group_of(tie.winner), group_of(tie.loser));
        }
        assert_eq!(result.winner, Some(15));
    }

    #[test]
    fn test_cross_group_seeding_rotates_runners_up() {
        let teams = rated(8);
        let config = GroupStageConfig::new(4, 2).without_shuffle();
        let mut owned = teams.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let everyone: Vec<usize> = (0..8).collect();

        let stage = run_groups(&mut owned, &everyone, &config, &StrongerWins, &mut rng);

        // Group A = 0..4 (winner 3, second 2), Group B = 4..8 (winner 7, second 6)
        let seeding = cross_group_seeding(&stage);
        assert_eq!(seeding.order, vec![3, 6, 7, 2]);
        assert_eq!(seeding.bye, None);
    }

    fn assert_no_group_rematch(result: &CompetitionResult) {
        let stage = result.group_stage.as_ref().unwrap();
        let group_of = |team: usize| stage.groups.iter().position(|g| g.members.contains(&team));

        for tie in &result.bracket.as_ref().unwrap().rounds[0].ties {
            assert_ne!(
                group_of(tie.winner),
                group_of(tie.loser),
                "{} and {} share a group",
                result.teams[tie.winner].name,
                result.teams[tie.loser].name
            );
        }
    }

    fn unshuffled_world() -> CompetitionFormat {
        CompetitionFormat::WorldTournament {
            groups: GroupStageConfig::new(4, 2).single_round_robin().without_shuffle(),
            knockout: KnockoutConfig::single_leg(),
        }
    }

    #[test]
    fn test_world_tournament_short_group_gets_the_bye() {
        // Groups {0,1,2,3} and {4}: qualifiers 3, 2 and the lone 4
        let teams = rated(5);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let result = run_competition(
            "World Tournament",
            &teams,
            &unshuffled_world(),
            &PrizeTable::default(),
            &StrongerWins,
            &mut rng,
        );

        assert_no_group_rematch(&result);
        let first_round = &result.bracket.as_ref().unwrap().rounds[0];
        assert_eq!(first_round.ties.len(), 1);
        assert_eq!((first_round.ties[0].winner, first_round.ties[0].loser), (4, 2));
        assert_eq!(first_round.bye, Some(3));
        assert_eq!(result.winner, Some(4));
    }

    #[test]
    fn test_world_tournament_nine_teams_avoid_group_rematches() {
        // Groups {0..4}, {4..8} and {8}
        let teams = rated(9);
        let mut rng = ChaCha8Rng::seed_from_u64(10);

        let result = run_competition(
            "World Tournament",
            &teams,
            &unshuffled_world(),
            &PrizeTable::default(),
            &StrongerWins,
            &mut rng,
        );

        assert_no_group_rematch(&result);
        let first_round = &result.bracket.as_ref().unwrap().rounds[0];
        assert_eq!(first_round.ties.len(), 2);
        assert_eq!(first_round.bye, Some(8));
        assert_eq!(result.winner, Some(8));
    }

    #[test]
    fn test_seeding_pairs_leftovers_across_groups() {
        // Three groups of three sending two each, plus a lone fourth group
        let teams = rated(10);
        let config = GroupStageConfig::new(3, 2).without_shuffle();
        let mut owned = teams.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let everyone: Vec<usize> = (0..10).collect();

        let stage = run_groups(&mut owned, &everyone, &config, &StrongerWins, &mut rng);
        let seeding = cross_group_seeding(&stage);

        // A = {0,1,2}, B = {3,4,5}, C = {6,7,8}, D = {9}
        assert_eq!(seeding.order, vec![2, 4, 5, 7, 8, 1, 9]);
        assert_eq!(seeding.bye, Some(9));
    }

    #[test]
    fn test_single_participant_wins_without_matches() {
        let teams = rated(1);
        let resolver = CountingDraws { calls: Cell::new(0) };
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for format in [
            CompetitionFormat::league(true),
            CompetitionFormat::knockout(true),
            CompetitionFormat::cup(false),
        ] {
            let result = run_competition("Solo", &teams, &format, &PrizeTable::new(1, 0), &resolver, &mut rng);
            assert_eq!(result.winner, Some(0));
            assert_eq!(result.runner_up, None);
        }
        assert_eq!(resolver.calls.get(), 0);
    }

    #[test]
    fn test_merge_stats_into_records() {
        let mut records = rated(3);
        records[0].stats.record(2, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        let result = run_competition(
            "Mini",
            &records[..2],
            &CompetitionFormat::league(false),
            &PrizeTable::default(),
            &StrongerWins,
            &mut rng,
        );
        result.merge_stats_into(&mut records);

        assert_eq!(records[0].stats.games_played, 2);
        assert_eq!(records[1].stats.games_played, 1);
        assert_eq!(records[1].stats.points, 3);
        assert_eq!(records[2].stats.games_played, 0);
    }
}

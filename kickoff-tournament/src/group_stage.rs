//! Group stage - round-robin groups feeding a qualifier list
//!
//! Level 2 - Phases

use kickoff_core::{
    generate_round_robin, rank_members, resolve_fixture, table, MatchResolver, Matchday,
    PlayedMatch, StandingRow, Team,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GroupStageConfig;

/// One round-robin group. Indices refer to the competition's team slice.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub label: String,
    /// Members in draw order
    pub members: Vec<usize>,
    /// Full schedule over member indices
    pub schedule: Vec<Matchday>,
    /// Number of matchdays already resolved
    pub played: usize,
    /// Members ranked by the current table, refreshed after every matchday
    pub standings: Vec<usize>,
    pub results: Vec<PlayedMatch>,
}

impl Group {
    pub fn new(label: String, members: Vec<usize>, double_round_robin: bool) -> Self {
        let schedule = generate_round_robin(members.len(), double_round_robin)
            .iter()
            .map(|md| md.remap(&members))
            .collect();

        Self {
            label,
            standings: members.clone(),
            members,
            schedule,
            played: 0,
            results: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.played >= self.schedule.len()
    }

    /// Resolve the next matchday and re-rank. Returns false once the
    /// schedule is exhausted.
    pub fn play_matchday<M, R>(&mut self, teams: &mut [Team], resolver: &M, rng: &mut R) -> bool
    where
        M: MatchResolver,
        R: Rng + ?Sized,
    {
        let Some(matchday) = self.schedule.get(self.played) else {
            return false;
        };

        for &fixture in &matchday.fixtures {
            if let Some(played) = resolve_fixture(resolver, teams, fixture, rng) {
                self.results.push(played);
            }
        }

        self.played += 1;
        self.standings = rank_members(teams, &self.members);

        tracing::debug!(
            "Group {} matchday {}/{} done, leader: {}",
            self.label,
            self.played,
            self.schedule.len(),
            self.standings.first().map_or("-", |&i| teams[i].name.as_str())
        );
        true
    }

    /// Resolve every remaining matchday in order
    pub fn play_all<M, R>(&mut self, teams: &mut [Team], resolver: &M, rng: &mut R)
    where
        M: MatchResolver,
        R: Rng + ?Sized,
    {
        while self.play_matchday(teams, resolver, rng) {}
    }

    /// Top `count` members by the table; a group smaller than `count`
    /// qualifies everyone
    pub fn qualifiers(&self, count: usize) -> &[usize] {
        &self.standings[..count.min(self.standings.len())]
    }

    /// Members below the qualifying places
    pub fn eliminated(&self, count: usize) -> &[usize] {
        &self.standings[count.min(self.standings.len())..]
    }

    pub fn table(&self, teams: &[Team]) -> Vec<StandingRow> {
        table(teams, &self.standings)
    }
}

/// Label for the i-th group: A, B, ... then numbers past Z
pub fn group_label(index: usize) -> String {
    if index < 26 {
        ((b'A' + index as u8) as char).to_string()
    } else {
        (index + 1).to_string()
    }
}

/// A set of groups drawn from one participant list
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupStage {
    pub groups: Vec<Group>,
    pub config: GroupStageConfig,
}

impl GroupStage {
    /// Partition participants into groups of `config.group_size`.
    ///
    /// Participants are shuffled first when `config.shuffle` is set. A list
    /// not evenly divisible leaves one undersized final group.
    pub fn draw<R: Rng + ?Sized>(
        participants: &[usize],
        config: &GroupStageConfig,
        rng: &mut R,
    ) -> Self {
        let mut pool = participants.to_vec();
        if config.shuffle {
            pool.shuffle(rng);
        }

        let groups = pool
            .chunks(config.group_size.max(1))
            .enumerate()
            .map(|(i, members)| {
                Group::new(group_label(i), members.to_vec(), config.double_round_robin)
            })
            .collect();

        Self {
            groups,
            config: *config,
        }
    }

    /// One group spanning every participant in the given order (a league)
    pub fn single(members: Vec<usize>, double_round_robin: bool) -> Self {
        let config = GroupStageConfig {
            group_size: members.len().max(1),
            qualifiers_per_group: members.len().max(1),
            double_round_robin,
            shuffle: false,
        };

        Self {
            groups: vec![Group::new(group_label(0), members, double_round_robin)],
            config,
        }
    }

    /// Length of the longest group schedule
    pub fn matchday_count(&self) -> usize {
        self.groups.iter().map(|g| g.schedule.len()).max().unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.groups.iter().all(Group::is_complete)
    }

    /// Advance every unfinished group by one matchday. Returns false when
    /// nothing was left to play.
    pub fn play_matchday<M, R>(&mut self, teams: &mut [Team], resolver: &M, rng: &mut R) -> bool
    where
        M: MatchResolver,
        R: Rng + ?Sized,
    {
        let mut progressed = false;
        for group in &mut self.groups {
            progressed |= group.play_matchday(teams, resolver, rng);
        }
        progressed
    }

    /// Play each group to completion, group by group
    pub fn play_all<M, R>(&mut self, teams: &mut [Team], resolver: &M, rng: &mut R)
    where
        M: MatchResolver,
        R: Rng + ?Sized,
    {
        for group in &mut self.groups {
            group.play_all(teams, resolver, rng);
        }
    }

    /// Qualifiers of every group, Group A's before Group B's
    pub fn qualifiers(&self) -> Vec<usize> {
        self.groups
            .iter()
            .flat_map(|g| g.qualifiers(self.config.qualifiers_per_group).iter().copied())
            .collect()
    }

    /// Members that did not qualify, in group order
    pub fn eliminated(&self) -> Vec<usize> {
        self.groups
            .iter()
            .flat_map(|g| g.eliminated(self.config.qualifiers_per_group).iter().copied())
            .collect()
    }
}

/// Draw and play a full group stage (Level 2 phase)
///
/// # Arguments
/// * `teams` - Competition team slice; stats are updated in place
/// * `participants` - Indices into `teams` taking part
/// * `config` - Group size, qualifiers and schedule options
///
/// # Returns
/// The completed stage; `qualifiers()` gives the advancing teams
pub fn run_groups<M, R>(
    teams: &mut [Team],
    participants: &[usize],
    config: &GroupStageConfig,
    resolver: &M,
    rng: &mut R,
) -> GroupStage
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    let mut stage = GroupStage::draw(participants, config, rng);

    tracing::debug!(
        "Group stage: {} teams in {} groups",
        participants.len(),
        stage.groups.len()
    );

    stage.play_all(teams, resolver, rng);
    stage
}

//! Configuration types for competitions
//!
//! Level 4 - Utilities and configuration

use kickoff_core::{KickoffError, Result};
use serde::{Deserialize, Serialize};

/// Group stage parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupStageConfig {
    /// Teams per group; the last group may be smaller
    pub group_size: usize,
    /// Top-ranked teams per group that advance
    pub qualifiers_per_group: usize,
    /// Each pair meets home and away
    pub double_round_robin: bool,
    /// Shuffle participants before partitioning
    pub shuffle: bool,
}

impl Default for GroupStageConfig {
    fn default() -> Self {
        Self {
            group_size: 4,
            qualifiers_per_group: 2,
            double_round_robin: true,
            shuffle: true,
        }
    }
}

impl GroupStageConfig {
    /// Create config with given group size and qualifiers per group
    pub fn new(group_size: usize, qualifiers_per_group: usize) -> Self {
        Self {
            group_size,
            qualifiers_per_group,
            ..Default::default()
        }
    }

    /// Play each pairing once
    pub fn single_round_robin(mut self) -> Self {
        self.double_round_robin = false;
        self
    }

    /// Keep participants in the given order when partitioning
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.group_size == 0 {
            return Err(KickoffError::InvalidConfig(
                "group_size must be at least 1".to_string(),
            ));
        }
        if self.qualifiers_per_group == 0 {
            return Err(KickoffError::InvalidConfig(
                "qualifiers_per_group must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Who gets the bye when a knockout round has an odd count
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByePolicy {
    /// Highest strength; first in list order on ties
    #[default]
    TopSeed,
    Random,
}

/// How the knockout entrants are ordered before round one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawPolicy {
    /// Shuffle once
    #[default]
    Random,
    /// Keep the given order (entrants are paired 1v2, 3v4, ...)
    Seeded,
}

/// Knockout bracket parameters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockoutConfig {
    /// Home-and-away ties instead of a single match
    pub two_legged: bool,
    pub bye_policy: ByePolicy,
    pub draw: DrawPolicy,
}

impl KnockoutConfig {
    /// Single-match ties, random draw
    pub fn single_leg() -> Self {
        Self::default()
    }

    /// Two-legged ties, random draw
    pub fn two_legged() -> Self {
        Self {
            two_legged: true,
            ..Default::default()
        }
    }

    /// Keep the entrant order as given
    pub fn seeded(mut self) -> Self {
        self.draw = DrawPolicy::Seeded;
        self
    }

    pub fn with_bye_policy(mut self, bye_policy: ByePolicy) -> Self {
        self.bye_policy = bye_policy;
        self
    }
}

/// Competition format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CompetitionFormat {
    /// One table spanning every participant, no knockout
    League { double_round_robin: bool },
    /// Straight knockout on all participants
    Knockout { knockout: KnockoutConfig },
    /// Group stage feeding a knockout bracket
    Cup {
        groups: GroupStageConfig,
        knockout: KnockoutConfig,
    },
    /// Group stage, then a knockout seeded so group winners meet another
    /// group's runner-up in the first round
    WorldTournament {
        groups: GroupStageConfig,
        knockout: KnockoutConfig,
    },
}

impl Default for CompetitionFormat {
    fn default() -> Self {
        CompetitionFormat::League {
            double_round_robin: true,
        }
    }
}

impl CompetitionFormat {
    /// Create league format
    pub fn league(double_round_robin: bool) -> Self {
        CompetitionFormat::League { double_round_robin }
    }

    /// Create knockout format
    pub fn knockout(two_legged: bool) -> Self {
        CompetitionFormat::Knockout {
            knockout: KnockoutConfig {
                two_legged,
                ..Default::default()
            },
        }
    }

    /// Create cup format with default groups of four, top two advancing
    pub fn cup(two_legged: bool) -> Self {
        CompetitionFormat::Cup {
            groups: GroupStageConfig::default(),
            knockout: KnockoutConfig {
                two_legged,
                ..Default::default()
            },
        }
    }

    /// Create world tournament format: single round-robin groups of four,
    /// top two advancing, single-leg knockout
    pub fn world_tournament() -> Self {
        CompetitionFormat::WorldTournament {
            groups: GroupStageConfig::default().single_round_robin(),
            knockout: KnockoutConfig::single_leg(),
        }
    }

    /// Short name for logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            CompetitionFormat::League { .. } => "league",
            CompetitionFormat::Knockout { .. } => "knockout",
            CompetitionFormat::Cup { .. } => "cup",
            CompetitionFormat::WorldTournament { .. } => "world",
        }
    }

    /// Group stage parameters, if the format has one
    pub fn groups(&self) -> Option<&GroupStageConfig> {
        match self {
            CompetitionFormat::Cup { groups, .. }
            | CompetitionFormat::WorldTournament { groups, .. } => Some(groups),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.groups() {
            Some(groups) => groups.validate(),
            None => Ok(()),
        }
    }
}

/// Final placement of a team in one competition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    Winner,
    RunnerUp,
    SemiFinalist,
    /// Knocked out before the semi-finals
    Eliminated,
    /// Did not get out of the group
    GroupStage,
    /// 1-based league position
    LeaguePosition(usize),
}

/// Prize money lookup by placement
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrizeTable {
    pub winner: u64,
    pub runner_up: u64,
    pub semi_finalist: u64,
    /// Paid to everyone else who took part
    pub participation: u64,
    /// League money by position (index 0 is first place)
    pub positions: Vec<u64>,
}

impl PrizeTable {
    /// Create prize table paying winner and runner-up only
    pub fn new(winner: u64, runner_up: u64) -> Self {
        Self {
            winner,
            runner_up,
            ..Default::default()
        }
    }

    pub fn with_semi_finalist(mut self, amount: u64) -> Self {
        self.semi_finalist = amount;
        self
    }

    pub fn with_participation(mut self, amount: u64) -> Self {
        self.participation = amount;
        self
    }

    pub fn with_positions(mut self, positions: Vec<u64>) -> Self {
        self.positions = positions;
        self
    }

    /// Money earned for a placement.
    ///
    /// Participation is a floor for every cup placement. League positions
    /// without an explicit entry fall back to the winner and runner-up
    /// amounts for first and second, then participation.
    pub fn prize_for(&self, placement: Placement) -> u64 {
        let amount = match placement {
            Placement::Winner => self.winner,
            Placement::RunnerUp => self.runner_up,
            Placement::SemiFinalist => self.semi_finalist,
            Placement::Eliminated | Placement::GroupStage => self.participation,
            Placement::LeaguePosition(position) => {
                return match self.positions.get(position.wrapping_sub(1)) {
                    Some(&amount) => amount,
                    None if position == 1 => self.winner,
                    None if position == 2 => self.runner_up,
                    None => self.participation,
                };
            }
        };
        amount.max(self.participation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_stage_defaults() {
        let config = GroupStageConfig::default();
        assert_eq!(config.group_size, 4);
        assert_eq!(config.qualifiers_per_group, 2);
        assert!(config.double_round_robin);
        assert!(config.shuffle);
    }

    #[test]
    fn test_group_stage_builders() {
        let config = GroupStageConfig::new(3, 1).single_round_robin().without_shuffle();
        assert_eq!(config.group_size, 3);
        assert_eq!(config.qualifiers_per_group, 1);
        assert!(!config.double_round_robin);
        assert!(!config.shuffle);
    }

    #[test]
    fn test_group_stage_validate() {
        assert!(GroupStageConfig::default().validate().is_ok());
        assert!(GroupStageConfig::new(0, 2).validate().is_err());
        assert!(matches!(
            GroupStageConfig::new(4, 0).validate(),
            Err(KickoffError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_knockout_builders() {
        let config = KnockoutConfig::two_legged().seeded().with_bye_policy(ByePolicy::Random);
        assert!(config.two_legged);
        assert_eq!(config.draw, DrawPolicy::Seeded);
        assert_eq!(config.bye_policy, ByePolicy::Random);

        let single = KnockoutConfig::single_leg();
        assert!(!single.two_legged);
        assert_eq!(single.bye_policy, ByePolicy::TopSeed);
        assert_eq!(single.draw, DrawPolicy::Random);
    }

    #[test]
    fn test_format_validate_checks_groups() {
        assert!(CompetitionFormat::league(false).validate().is_ok());
        assert!(CompetitionFormat::knockout(true).validate().is_ok());

        let bad = CompetitionFormat::Cup {
            groups: GroupStageConfig::new(0, 2),
            knockout: KnockoutConfig::default(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_format_json_is_tagged() {
        let json = serde_json::to_string(&CompetitionFormat::league(true)).unwrap();
        assert!(json.contains(r#""type":"League""#));

        let parsed: CompetitionFormat =
            serde_json::from_str(r#"{"type": "Knockout", "knockout": {"two_legged": true}}"#)
                .unwrap();
        assert_eq!(parsed, CompetitionFormat::knockout(true));
        assert_eq!(parsed.label(), "knockout");
    }

    #[test]
    fn test_prize_for_knockout_placements() {
        let prizes = PrizeTable::new(100, 50).with_semi_finalist(20).with_participation(5);
        assert_eq!(prizes.prize_for(Placement::Winner), 100);
        assert_eq!(prizes.prize_for(Placement::RunnerUp), 50);
        assert_eq!(prizes.prize_for(Placement::SemiFinalist), 20);
        assert_eq!(prizes.prize_for(Placement::Eliminated), 5);
        assert_eq!(prizes.prize_for(Placement::GroupStage), 5);

        // A semi-final exit never earns less than taking part
        let floor = PrizeTable::new(100, 50).with_participation(15);
        assert_eq!(floor.prize_for(Placement::SemiFinalist), 15);
    }

    #[test]
    fn test_prize_for_league_positions() {
        let prizes = PrizeTable::default().with_positions(vec![30, 20, 10]);
        assert_eq!(prizes.prize_for(Placement::LeaguePosition(1)), 30);
        assert_eq!(prizes.prize_for(Placement::LeaguePosition(3)), 10);
        assert_eq!(prizes.prize_for(Placement::LeaguePosition(4)), 0);

        // No positional list: winner and runner-up amounts still apply
        let flat = PrizeTable::new(9, 4).with_participation(1);
        assert_eq!(flat.prize_for(Placement::LeaguePosition(1)), 9);
        assert_eq!(flat.prize_for(Placement::LeaguePosition(2)), 4);
        assert_eq!(flat.prize_for(Placement::LeaguePosition(7)), 1);
    }
}

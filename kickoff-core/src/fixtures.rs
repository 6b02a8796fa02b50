//! Fixture generation - round-robin schedules by the circle method
//!
//! Teams are referred to by their index into the competition's team slice.
//! A schedule never fails: fewer than two teams simply yields no matchdays.

use serde::{Deserialize, Serialize};

/// One slot in a matchday
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fixture {
    /// A match between two teams, `home` hosting
    Match { home: usize, away: usize },
    /// The team rests this matchday (odd team counts only)
    Bye { team: usize },
}

impl Fixture {
    /// Same pairing with venues swapped. A bye stays a bye.
    pub fn reversed(self) -> Fixture {
        match self {
            Fixture::Match { home, away } => Fixture::Match {
                home: away,
                away: home,
            },
            bye => bye,
        }
    }

    /// Home and away indices, or `None` for a bye
    pub fn teams(&self) -> Option<(usize, usize)> {
        match *self {
            Fixture::Match { home, away } => Some((home, away)),
            Fixture::Bye { .. } => None,
        }
    }

    /// Whether the given team takes part in (or rests in) this slot
    pub fn involves(&self, team: usize) -> bool {
        match *self {
            Fixture::Match { home, away } => home == team || away == team,
            Fixture::Bye { team: resting } => resting == team,
        }
    }

    /// Translate local indices through a lookup table (used by groups,
    /// whose schedules are generated over 0..group_size)
    pub fn remap(self, members: &[usize]) -> Fixture {
        match self {
            Fixture::Match { home, away } => Fixture::Match {
                home: members[home],
                away: members[away],
            },
            Fixture::Bye { team } => Fixture::Bye {
                team: members[team],
            },
        }
    }
}

/// Fixtures resolved together; no team appears twice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchday {
    /// 1-based position in the schedule
    pub number: usize,
    pub fixtures: Vec<Fixture>,
}

impl Matchday {
    /// Non-bye pairings as (home, away)
    pub fn matches(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.fixtures.iter().filter_map(Fixture::teams)
    }

    /// The resting team, if any
    pub fn bye(&self) -> Option<usize> {
        self.fixtures.iter().find_map(|f| match *f {
            Fixture::Bye { team } => Some(team),
            Fixture::Match { .. } => None,
        })
    }

    pub fn remap(&self, members: &[usize]) -> Matchday {
        Matchday {
            number: self.number,
            fixtures: self.fixtures.iter().map(|f| f.remap(members)).collect(),
        }
    }
}

/// Generate a round-robin schedule for `team_count` teams (indices
/// `0..team_count`).
///
/// Circle method: an odd count is padded with a bye placeholder, position 0
/// stays fixed and the rest rotate one step after each matchday. Position
/// `i` hosts position `size - 1 - i`.
///
/// Single round-robin has `team_count - 1` matchdays (`team_count` when odd,
/// each team resting exactly once). With `double`, the venue-reversed copy
/// is appended.
pub fn generate_round_robin(team_count: usize, double: bool) -> Vec<Matchday> {
    if team_count < 2 {
        return Vec::new();
    }

    let mut positions: Vec<Option<usize>> = (0..team_count).map(Some).collect();
    if team_count % 2 == 1 {
        positions.push(None);
    }
    let size = positions.len();

    let mut schedule = Vec::with_capacity(if double { 2 * (size - 1) } else { size - 1 });

    for day in 0..size - 1 {
        let fixtures = (0..size / 2)
            .filter_map(|i| pair_positions(positions[i], positions[size - 1 - i]))
            .collect();

        schedule.push(Matchday {
            number: day + 1,
            fixtures,
        });

        positions[1..].rotate_right(1);
    }

    if double {
        let first_half = schedule.len();
        let second_half: Vec<Matchday> = schedule
            .iter()
            .map(|md| Matchday {
                number: md.number + first_half,
                fixtures: md.fixtures.iter().map(|f| f.reversed()).collect(),
            })
            .collect();
        schedule.extend(second_half);
    }

    schedule
}

fn pair_positions(home: Option<usize>, away: Option<usize>) -> Option<Fixture> {
    match (home, away) {
        (Some(home), Some(away)) => Some(Fixture::Match { home, away }),
        (Some(team), None) | (None, Some(team)) => Some(Fixture::Bye { team }),
        (None, None) => None,
    }
}

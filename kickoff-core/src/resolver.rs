//! Match resolution - the contract every competition stage plays through
//!
//! A `MatchResolver` only produces a score (and may credit scorers in the
//! squads). Table stats are applied by `resolve_match`, exactly once per
//! call, so no resolver implementation can double-count a result.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fixtures::Fixture;
use crate::standings::update_after_match;
use crate::team::{pair_mut, Team};

/// Final score of one match
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn is_draw(&self) -> bool {
        self.home == self.away
    }

    pub fn home_won(&self) -> bool {
        self.home > self.away
    }

    pub fn away_won(&self) -> bool {
        self.away > self.home
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

/// A match that has been played, by team index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedMatch {
    pub home: usize,
    pub away: usize,
    pub score: Score,
}

/// Produces a score for two teams.
///
/// Implementations must not touch `Team::stats`; they may mutate squads
/// (e.g. crediting goals). Callers never assume determinism and never call
/// more than once per fixture.
pub trait MatchResolver {
    fn play<R: Rng + ?Sized>(&self, home: &mut Team, away: &mut Team, rng: &mut R) -> Score;
}

/// Play a match and apply the result to both teams' stats
pub fn resolve_match<M, R>(resolver: &M, home: &mut Team, away: &mut Team, rng: &mut R) -> Score
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    let score = resolver.play(home, away, rng);
    update_after_match(&mut home.stats, &mut away.stats, score.home, score.away);
    score
}

/// Resolve one scheduled fixture against a competition's team slice.
///
/// A bye short-circuits: the resolver is not called, nothing is mutated and
/// `None` is returned (a 0-0 that counts for nobody).
pub fn resolve_fixture<M, R>(
    resolver: &M,
    teams: &mut [Team],
    fixture: Fixture,
    rng: &mut R,
) -> Option<PlayedMatch>
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    let (home, away) = fixture.teams()?;
    let (home_team, away_team) = pair_mut(teams, home, away);
    let score = resolve_match(resolver, home_team, away_team, rng);

    Some(PlayedMatch { home, away, score })
}

// ============================================================================
// Default resolver
// ============================================================================

/// Minute-by-minute model driven by team strength and shooter rating
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RatingResolver {
    /// Simulated minutes
    pub minutes: u32,
    /// Chance per minute that something happens
    pub event_chance: f64,
    /// Share of events that become a shot
    pub shot_share: f64,
    /// Shooter rating is divided by this to get a base conversion chance
    pub conversion_divisor: f64,
    /// Uniform luck multiplier range applied to every shot
    pub luck: (f64, f64),
}

impl Default for RatingResolver {
    fn default() -> Self {
        Self {
            minutes: 90,
            event_chance: 0.12,
            shot_share: 0.6,
            conversion_divisor: 180.0,
            luck: (0.7, 1.3),
        }
    }
}

impl RatingResolver {
    /// Take one shot for `attacker`, crediting the scorer on success
    fn take_shot<R: Rng + ?Sized>(&self, attacker: &mut Team, rng: &mut R) -> bool {
        let team_strength = attacker.strength() as f64;
        let luck = rng.gen_range(self.luck.0..self.luck.1);

        let shooter = if attacker.players.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..attacker.players.len()))
        };

        let rating = match shooter {
            Some(idx) => attacker.players[idx].rating as f64,
            None => team_strength,
        };

        let scored = rng.gen::<f64>() < rating / self.conversion_divisor * luck;
        if scored {
            if let Some(idx) = shooter {
                attacker.players[idx].season_goals += 1;
            }
        }
        scored
    }
}

impl MatchResolver for RatingResolver {
    fn play<R: Rng + ?Sized>(&self, home: &mut Team, away: &mut Team, rng: &mut R) -> Score {
        let home_strength = home.strength().max(0.0) as f64;
        let away_strength = away.strength().max(0.0) as f64;
        let home_share = if home_strength + away_strength > 0.0 {
            home_strength / (home_strength + away_strength)
        } else {
            0.5
        };

        let mut score = Score::default();

        for _ in 0..self.minutes {
            if rng.gen::<f64>() >= self.event_chance {
                continue;
            }

            let home_attacks = rng.gen::<f64>() < home_share;
            if rng.gen::<f64>() >= self.shot_share {
                continue;
            }

            if home_attacks {
                if self.take_shot(home, rng) {
                    score.home += 1;
                }
            } else if self.take_shot(away, rng) {
                score.away += 1;
            }
        }

        score
    }
}

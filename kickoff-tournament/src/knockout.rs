//! Knockout ties and brackets
//!
//! Level 2 - Phases and Level 3 - Steps

use kickoff_core::{pair_mut, resolve_match, MatchResolver, PlayedMatch, Score, Team};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ByePolicy, DrawPolicy, KnockoutConfig};

/// Which rule settled a tie
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Single match with a winner on the day
    Score,
    Aggregate,
    AwayGoals,
    /// Coin flip standing in for a shootout
    Penalties,
}

/// Side of a tie in draw order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Listed first; hosts the single match or the first leg
    First,
    Second,
}

/// Outcome of one knockout tie
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TieResult {
    pub winner: usize,
    pub loser: usize,
    /// One entry per leg, in the order played
    pub legs: Vec<PlayedMatch>,
    pub decided_by: TieBreak,
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Apply aggregate then away goals to a two-legged tie.
///
/// `first_leg` is hosted by the first side, `second_leg` by the second.
/// Returns `None` when both rules leave the tie level.
pub fn decide_two_legged(first_leg: Score, second_leg: Score) -> Option<(Side, TieBreak)> {
    let first_total = first_leg.home + second_leg.away;
    let second_total = first_leg.away + second_leg.home;

    if first_total != second_total {
        let side = if first_total > second_total { Side::First } else { Side::Second };
        return Some((side, TieBreak::Aggregate));
    }

    let first_away = second_leg.away;
    let second_away = first_leg.away;

    if first_away != second_away {
        let side = if first_away > second_away { Side::First } else { Side::Second };
        return Some((side, TieBreak::AwayGoals));
    }

    None
}

/// Even-odds shootout
pub fn penalty_shootout<R: Rng + ?Sized>(rng: &mut R) -> Side {
    if rng.gen_bool(0.5) {
        Side::First
    } else {
        Side::Second
    }
}

fn play_leg<M, R>(teams: &mut [Team], home: usize, away: usize, resolver: &M, rng: &mut R) -> PlayedMatch
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    let (home_team, away_team) = pair_mut(teams, home, away);
    let score = resolve_match(resolver, home_team, away_team, rng);
    PlayedMatch { home, away, score }
}

/// Resolve a tie between `a` and `b`, `a` hosting the single match or the
/// first leg. Always produces exactly one winner.
pub fn resolve_tie<M, R>(
    teams: &mut [Team],
    a: usize,
    b: usize,
    two_legged: bool,
    resolver: &M,
    rng: &mut R,
) -> TieResult
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    let (side, legs, decided_by) = if two_legged {
        let first = play_leg(teams, a, b, resolver, rng);
        let second = play_leg(teams, b, a, resolver, rng);

        let (side, decided_by) = decide_two_legged(first.score, second.score)
            .unwrap_or_else(|| (penalty_shootout(rng), TieBreak::Penalties));
        (side, vec![first, second], decided_by)
    } else {
        let only = play_leg(teams, a, b, resolver, rng);

        let (side, decided_by) = if only.score.home_won() {
            (Side::First, TieBreak::Score)
        } else if only.score.away_won() {
            (Side::Second, TieBreak::Score)
        } else {
            (penalty_shootout(rng), TieBreak::Penalties)
        };
        (side, vec![only], decided_by)
    };

    let (winner, loser) = match side {
        Side::First => (a, b),
        Side::Second => (b, a),
    };

    tracing::debug!(
        "{} beat {} ({:?})",
        teams[winner].name,
        teams[loser].name,
        decided_by
    );

    TieResult {
        winner,
        loser,
        legs,
        decided_by,
    }
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// One knockout round
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KnockoutRound {
    /// 1-based
    pub number: usize,
    pub ties: Vec<TieResult>,
    /// Team carried forward without playing
    pub bye: Option<usize>,
}

/// Knockout bracket, played round by round until one team remains
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bracket {
    pub rounds: Vec<KnockoutRound>,
    /// Teams still in, in pairing order for the next round
    pub remaining: Vec<usize>,
    pub config: KnockoutConfig,
    /// Team that takes the next odd round's bye regardless of `bye_policy`
    #[serde(default)]
    pub reserved_bye: Option<usize>,
}

impl Bracket {
    /// Create a bracket, shuffling entrants once under `DrawPolicy::Random`
    pub fn new<R: Rng + ?Sized>(entrants: Vec<usize>, config: KnockoutConfig, rng: &mut R) -> Self {
        let mut remaining = entrants;
        if config.draw == DrawPolicy::Random {
            remaining.shuffle(rng);
        }

        Self {
            rounds: Vec::new(),
            remaining,
            config,
            reserved_bye: None,
        }
    }

    /// Hold a team back for the next odd round's bye
    pub fn with_reserved_bye(mut self, team: Option<usize>) -> Self {
        self.reserved_bye = team;
        self
    }

    /// Terminal once at most one team remains
    pub fn is_complete(&self) -> bool {
        self.remaining.len() <= 1
    }

    /// Play the next round. Returns false if the bracket was already done.
    pub fn play_round<M, R>(&mut self, teams: &mut [Team], resolver: &M, rng: &mut R) -> bool
    where
        M: MatchResolver,
        R: Rng + ?Sized,
    {
        if self.is_complete() {
            return false;
        }

        let mut entrants = std::mem::take(&mut self.remaining);
        let reserved = self.reserved_bye.take();
        let bye = if entrants.len() % 2 == 1 {
            let pos = match reserved.and_then(|team| entrants.iter().position(|&e| e == team)) {
                Some(pos) => pos,
                None => self.pick_bye(&entrants, teams, rng),
            };
            Some(entrants.remove(pos))
        } else {
            None
        };

        let mut ties = Vec::with_capacity(entrants.len() / 2);
        for pair in entrants.chunks_exact(2) {
            ties.push(resolve_tie(
                teams,
                pair[0],
                pair[1],
                self.config.two_legged,
                resolver,
                rng,
            ));
        }

        let number = self.rounds.len() + 1;
        self.remaining = ties.iter().map(|t| t.winner).collect();
        if let Some(team) = bye {
            tracing::debug!("Round {}: {} receives a bye", number, teams[team].name);
            self.remaining.push(team);
        }

        tracing::debug!(
            "Knockout round {} done: {} ties, {} teams remain",
            number,
            ties.len(),
            self.remaining.len()
        );

        self.rounds.push(KnockoutRound { number, ties, bye });
        true
    }

    fn pick_bye<R: Rng + ?Sized>(&self, entrants: &[usize], teams: &[Team], rng: &mut R) -> usize {
        match self.config.bye_policy {
            ByePolicy::Random => rng.gen_range(0..entrants.len()),
            ByePolicy::TopSeed => {
                let mut best = 0;
                for (pos, &idx) in entrants.iter().enumerate().skip(1) {
                    if teams[idx].strength() > teams[entrants[best]].strength() {
                        best = pos;
                    }
                }
                best
            }
        }
    }

    /// Play rounds until one team remains
    pub fn play_all<M, R>(&mut self, teams: &mut [Team], resolver: &M, rng: &mut R)
    where
        M: MatchResolver,
        R: Rng + ?Sized,
    {
        while self.play_round(teams, resolver, rng) {}
    }

    pub fn winner(&self) -> Option<usize> {
        if self.is_complete() {
            self.remaining.first().copied()
        } else {
            None
        }
    }

    /// Loser of the final
    pub fn runner_up(&self) -> Option<usize> {
        if !self.is_complete() {
            return None;
        }
        self.rounds
            .last()
            .and_then(|round| round.ties.first())
            .map(|tie| tie.loser)
    }

    /// Losers of the round before the final
    pub fn semi_finalists(&self) -> Vec<usize> {
        if !self.is_complete() || self.rounds.len() < 2 {
            return Vec::new();
        }
        self.rounds[self.rounds.len() - 2]
            .ties
            .iter()
            .map(|tie| tie.loser)
            .collect()
    }

    /// Every beaten team, in the order they went out
    pub fn eliminated(&self) -> Vec<usize> {
        self.rounds
            .iter()
            .flat_map(|round| round.ties.iter().map(|tie| tie.loser))
            .collect()
    }
}

/// Run a full knockout (Level 2 phase)
///
/// # Arguments
/// * `teams` - Competition team slice; stats are updated per leg
/// * `entrants` - Indices into `teams`
/// * `config` - Legs, draw and bye policy
///
/// # Returns
/// The completed bracket. A single entrant wins without a match being
/// played; an empty entrant list has no winner.
pub fn run_knockout<M, R>(
    teams: &mut [Team],
    entrants: Vec<usize>,
    config: KnockoutConfig,
    resolver: &M,
    rng: &mut R,
) -> Bracket
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    let mut bracket = Bracket::new(entrants, config, rng);
    bracket.play_all(teams, resolver, rng);
    bracket
}

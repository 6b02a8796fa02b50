//! Season loop - the primary league with cups slotted between matchdays,
//! continental competitions, the periodic world tournament and the
//! promotion/relegation playoff
//!
//! Level 1 - Orchestration

use std::path::Path;

use kickoff_core::persist::{load_json, save_json};
use kickoff_core::{table, KickoffError, MatchResolver, Result, StandingRow, Team};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::competition::{run_competition, Award, CompetitionResult};
use crate::config::{
    CompetitionFormat, GroupStageConfig, KnockoutConfig, Placement, PrizeTable,
};
use crate::group_stage::GroupStage;

const MILLION: u64 = 1_000_000;

/// Season-long record, persisted between seasons
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SeasonState {
    /// Seasons completed so far
    #[serde(default)]
    pub season_number: u32,
    /// The primary league; its stats are the season table
    pub league: Vec<Team>,
    /// Second-tier contenders for promotion
    #[serde(default)]
    pub playoff_pool: Vec<Team>,
    /// Clubs from other leagues, eligible for cups and continental play
    #[serde(default)]
    pub foreign_pool: Vec<Team>,
    #[serde(default)]
    pub national_teams: Vec<Team>,
}

impl SeasonState {
    pub fn new(league: Vec<Team>) -> Self {
        Self {
            league,
            ..Default::default()
        }
    }

    /// Load a state file and check club and national team names are unique
    pub fn load(path: &Path) -> Result<Self> {
        let state: SeasonState = load_json(path)?;
        state.validate()?;
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    pub fn validate(&self) -> Result<()> {
        let mut clubs = FxHashSet::default();
        for team in self.clubs() {
            if !clubs.insert(team.name.as_str()) {
                return Err(KickoffError::DuplicateTeam(team.name.clone()));
            }
        }
        kickoff_core::ensure_unique_names(&self.national_teams)?;

        // Awards are matched by name across clubs and nations
        if let Some(nation) = self
            .national_teams
            .iter()
            .find(|t| clubs.contains(t.name.as_str()))
        {
            return Err(KickoffError::DuplicateTeam(nation.name.clone()));
        }
        Ok(())
    }

    /// League, playoff and foreign clubs
    pub fn clubs(&self) -> impl Iterator<Item = &Team> {
        self.league
            .iter()
            .chain(self.playoff_pool.iter())
            .chain(self.foreign_pool.iter())
    }

    /// Find a team by name across every pool, clubs first
    pub fn team_mut(&mut self, name: &str) -> Option<&mut Team> {
        self.league
            .iter_mut()
            .chain(self.playoff_pool.iter_mut())
            .chain(self.foreign_pool.iter_mut())
            .chain(self.national_teams.iter_mut())
            .find(|t| t.name == name)
    }
}

/// How a domestic cup picks its field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule")]
pub enum CupEntry {
    /// The strongest league teams
    TopByStrength { count: usize },
    /// Random league teams plus random foreign clubs
    Mixed { domestic: usize, foreign: usize },
}

/// A domestic cup played part-way through the league
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CupSlot {
    pub name: String,
    pub entry: CupEntry,
    pub format: CompetitionFormat,
    pub prizes: PrizeTable,
    /// Fraction of league matchdays after which the cup is played,
    /// rounded down to a whole matchday
    pub at_fraction: f64,
}

/// A continental competition fed by final league positions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContinentalSlot {
    pub name: String,
    /// Half-open slice of the final league table
    pub league_positions: (usize, usize),
    pub field_size: usize,
    pub prizes: PrizeTable,
}

/// The national-team tournament
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSlot {
    pub name: String,
    pub every_n_seasons: u32,
    #[serde(default)]
    pub groups: GroupStageConfig,
    #[serde(default)]
    pub knockout: KnockoutConfig,
    #[serde(default)]
    pub prizes: PrizeTable,
}

/// Season configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonConfig {
    pub league_name: String,
    /// League carried by second-tier teams
    pub playoff_name: String,
    pub double_round_robin: bool,
    pub league_prizes: PrizeTable,
    /// Paid to the club of the league's leading scorer
    pub top_scorer_prize: u64,
    pub relegation_spots: usize,
    pub cups: Vec<CupSlot>,
    pub continental: Vec<ContinentalSlot>,
    pub world_tournament: Option<WorldSlot>,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        let positions = [50, 45, 40, 35, 30, 25, 22, 20, 18, 16, 14, 12, 10, 8]
            .iter()
            .map(|m| m * MILLION)
            .collect();

        Self {
            league_name: "Domestic League".to_string(),
            playoff_name: "Domestic Playoff".to_string(),
            double_round_robin: false,
            league_prizes: PrizeTable::default().with_positions(positions),
            top_scorer_prize: 5 * MILLION,
            relegation_spots: 2,
            cups: vec![
                CupSlot {
                    name: "Cup De Guru".to_string(),
                    entry: CupEntry::TopByStrength { count: 8 },
                    format: CompetitionFormat::knockout(false),
                    prizes: PrizeTable::new(10 * MILLION, 5 * MILLION)
                        .with_semi_finalist(2 * MILLION),
                    at_fraction: 0.25,
                },
                CupSlot {
                    name: "Silver Cup".to_string(),
                    entry: CupEntry::Mixed {
                        domestic: 8,
                        foreign: 8,
                    },
                    format: CompetitionFormat::knockout(true),
                    prizes: PrizeTable::new(15 * MILLION, 7 * MILLION),
                    at_fraction: 0.75,
                },
            ],
            continental: vec![
                ContinentalSlot {
                    name: "Champions League".to_string(),
                    league_positions: (0, 2),
                    field_size: 16,
                    prizes: PrizeTable::new(100 * MILLION, 50 * MILLION)
                        .with_participation(15 * MILLION),
                },
                ContinentalSlot {
                    name: "Europa League".to_string(),
                    league_positions: (2, 4),
                    field_size: 16,
                    prizes: PrizeTable::new(40 * MILLION, 20 * MILLION)
                        .with_participation(8 * MILLION),
                },
                ContinentalSlot {
                    name: "Conference League".to_string(),
                    league_positions: (4, 6),
                    field_size: 16,
                    prizes: PrizeTable::new(20 * MILLION, 10 * MILLION)
                        .with_participation(4 * MILLION),
                },
            ],
            world_tournament: Some(WorldSlot {
                name: "World Tournament".to_string(),
                every_n_seasons: 4,
                groups: GroupStageConfig::default().single_round_robin(),
                knockout: KnockoutConfig::single_leg(),
                prizes: PrizeTable::new(50 * MILLION, 25 * MILLION)
                    .with_semi_finalist(10 * MILLION),
            }),
        }
    }
}

impl SeasonConfig {
    /// Domestic league only: no cups, continental or world competitions
    pub fn league_only() -> Self {
        Self {
            cups: Vec::new(),
            continental: Vec::new(),
            world_tournament: None,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for cup in &self.cups {
            cup.format.validate()?;
            if !(0.0..=1.0).contains(&cup.at_fraction) {
                return Err(KickoffError::InvalidConfig(format!(
                    "{}: at_fraction must be within 0..=1, got {}",
                    cup.name, cup.at_fraction
                )));
            }
        }
        for slot in &self.continental {
            let (start, end) = slot.league_positions;
            if start > end {
                return Err(KickoffError::InvalidConfig(format!(
                    "{}: league_positions {}..{} is empty",
                    slot.name, start, end
                )));
            }
        }
        if let Some(world) = &self.world_tournament {
            world.groups.validate()?;
        }
        Ok(())
    }
}

/// Headline outcome of one competition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompetitionSummary {
    pub name: String,
    pub winner: Option<String>,
    pub runner_up: Option<String>,
    pub awards: Vec<Award>,
}

impl From<&CompetitionResult> for CompetitionSummary {
    fn from(result: &CompetitionResult) -> Self {
        Self {
            name: result.name.clone(),
            winner: result.winner_name().map(str::to_string),
            runner_up: result.runner_up_name().map(str::to_string),
            awards: result.awards.clone(),
        }
    }
}

/// Everything that happened in one season
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeasonReport {
    pub season_number: u32,
    pub league_table: Vec<StandingRow>,
    /// League first, then competitions in the order they were played
    pub competitions: Vec<CompetitionSummary>,
    pub promoted: Vec<String>,
    pub relegated: Vec<String>,
    /// Leading league scorer; absent when nobody was credited a goal
    #[serde(default)]
    pub top_scorer: Option<TopScorer>,
}

/// League golden boot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopScorer {
    pub player: String,
    pub team: String,
    pub goals: u32,
    pub prize: u64,
}

impl SeasonReport {
    pub fn competition(&self, name: &str) -> Option<&CompetitionSummary> {
        self.competitions.iter().find(|c| c.name == name)
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Play one full season (Level 1 orchestration)
///
/// # Arguments
/// * `state` - Season-long record; league stats are mutated directly, every
///   other competition runs on copies
/// * `config` - Competitions, prizes and relegation spots
///
/// # Returns
/// Final league table, competition winners and awards, promotions
pub fn run_season<M, R>(
    state: &mut SeasonState,
    config: &SeasonConfig,
    resolver: &M,
    rng: &mut R,
) -> SeasonReport
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    state.season_number += 1;
    let season = state.season_number;
    tracing::info!("Season {} kicks off", season);

    for team in state.league.iter_mut().chain(state.playoff_pool.iter_mut()) {
        team.stats.reset();
        for player in &mut team.players {
            player.season_goals = 0;
        }
    }

    let mut summaries = Vec::new();

    // League, with cups slotted in between matchdays
    let mut league = GroupStage::single((0..state.league.len()).collect(), config.double_round_robin);
    let total = league.matchday_count();
    let mut cups_played = vec![false; config.cups.len()];
    let mut day = 0;

    loop {
        for (slot, played) in config.cups.iter().zip(cups_played.iter_mut()) {
            if !*played && day >= cup_matchday(slot.at_fraction, total) {
                summaries.push(play_cup(slot, state, resolver, rng));
                *played = true;
            }
        }
        if !league.play_matchday(&mut state.league, resolver, rng) {
            break;
        }
        day += 1;
    }

    let ranking = league
        .groups
        .first()
        .map(|g| g.standings.clone())
        .unwrap_or_default();
    let league_table = table(&state.league, &ranking);
    summaries.insert(0, league_summary(config, &state.league, &ranking));
    let top_scorer = league_top_scorer(&state.league, &ranking, config.top_scorer_prize);

    // Continental tiers, each excluding teams entered in an earlier one
    let mut entered: FxHashSet<String> = FxHashSet::default();
    for slot in &config.continental {
        let field = continental_field(slot, state, &ranking, &entered);
        entered.extend(field.iter().map(|t| t.name.clone()));

        if field.len() < 2 {
            tracing::warn!("{}: only {} eligible teams, skipped", slot.name, field.len());
            continue;
        }

        let format = if field.len() >= slot.field_size && slot.field_size >= 8 {
            CompetitionFormat::Cup {
                groups: GroupStageConfig::new(4, 2),
                knockout: KnockoutConfig::two_legged(),
            }
        } else {
            tracing::warn!(
                "{}: {} teams is short of a {}-team group stage, playing a straight knockout",
                slot.name,
                field.len(),
                slot.field_size
            );
            CompetitionFormat::knockout(false)
        };

        let result = run_competition(&slot.name, &field, &format, &slot.prizes, resolver, rng);
        summaries.push(CompetitionSummary::from(&result));
    }

    if let Some(world) = &config.world_tournament {
        let due = world.every_n_seasons > 0 && season % world.every_n_seasons == 0;
        if due && state.national_teams.len() >= 2 {
            let format = CompetitionFormat::WorldTournament {
                groups: world.groups,
                knockout: world.knockout,
            };
            let result = run_competition(
                &world.name,
                &state.national_teams,
                &format,
                &world.prizes,
                resolver,
                rng,
            );
            summaries.push(CompetitionSummary::from(&result));
        }
    }

    let (promoted, relegated) = run_playoff(state, config, &ranking, resolver, rng);

    apply_awards(state, &summaries, top_scorer.as_ref(), season);

    tracing::info!(
        "Season {} done: champion {}, promoted {:?}, relegated {:?}",
        season,
        league_table.first().map_or("-", |row| row.name.as_str()),
        promoted,
        relegated
    );

    SeasonReport {
        season_number: season,
        league_table,
        competitions: summaries,
        promoted,
        relegated,
        top_scorer,
    }
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

fn play_cup<M, R>(slot: &CupSlot, state: &SeasonState, resolver: &M, rng: &mut R) -> CompetitionSummary
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    let field: Vec<Team> = match slot.entry {
        CupEntry::TopByStrength { count } => strongest(state.league.iter(), count),
        CupEntry::Mixed { domestic, foreign } => state
            .league
            .choose_multiple(rng, domestic)
            .chain(state.foreign_pool.choose_multiple(rng, foreign))
            .cloned()
            .collect(),
    };

    let result = run_competition(&slot.name, &field, &slot.format, &slot.prizes, resolver, rng);
    CompetitionSummary::from(&result)
}

fn league_summary(config: &SeasonConfig, league: &[Team], ranking: &[usize]) -> CompetitionSummary {
    let awards = ranking
        .iter()
        .enumerate()
        .filter_map(|(pos, &i)| {
            let placement = Placement::LeaguePosition(pos + 1);
            let prize = config.league_prizes.prize_for(placement);
            (prize > 0).then(|| Award {
                team: league[i].name.clone(),
                placement,
                prize,
            })
        })
        .collect();

    CompetitionSummary {
        name: config.league_name.clone(),
        winner: ranking.first().map(|&i| league[i].name.clone()),
        runner_up: ranking.get(1).map(|&i| league[i].name.clone()),
        awards,
    }
}

/// League-table slice topped up with the strongest eligible clubs
fn continental_field(
    slot: &ContinentalSlot,
    state: &SeasonState,
    ranking: &[usize],
    entered: &FxHashSet<String>,
) -> Vec<Team> {
    let end = slot.league_positions.1.min(ranking.len());
    let start = slot.league_positions.0.min(end);

    let mut field: Vec<Team> = ranking[start..end]
        .iter()
        .map(|&i| &state.league[i])
        .filter(|t| !entered.contains(&t.name))
        .cloned()
        .collect();

    if field.len() < slot.field_size {
        let in_field: FxHashSet<&str> = field.iter().map(|t| t.name.as_str()).collect();
        let candidates = state
            .foreign_pool
            .iter()
            .chain(state.league.iter())
            .filter(|t| !entered.contains(&t.name) && !in_field.contains(t.name.as_str()));
        let top_up = strongest(candidates, slot.field_size - field.len());
        field.extend(top_up);
    }

    field
}

/// Bottom of the league against the playoff pool in an isolated single
/// round-robin; the top `relegation_spots` finishers take the league places.
///
/// Returns (promoted, relegated) names.
fn run_playoff<M, R>(
    state: &mut SeasonState,
    config: &SeasonConfig,
    ranking: &[usize],
    resolver: &M,
    rng: &mut R,
) -> (Vec<String>, Vec<String>)
where
    M: MatchResolver,
    R: Rng + ?Sized,
{
    let spots = config.relegation_spots.min(ranking.len());
    if spots == 0 || state.playoff_pool.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let bottom: FxHashSet<String> = ranking[ranking.len() - spots..]
        .iter()
        .map(|&i| state.league[i].name.clone())
        .collect();

    let mut contenders = Vec::with_capacity(spots + state.playoff_pool.len());
    for team in std::mem::take(&mut state.league) {
        if bottom.contains(&team.name) {
            contenders.push(team);
        } else {
            state.league.push(team);
        }
    }
    contenders.append(&mut state.playoff_pool);

    let playoff = run_competition(
        &config.playoff_name,
        &contenders,
        &CompetitionFormat::league(false),
        &PrizeTable::default(),
        resolver,
        rng,
    );
    let winners: FxHashSet<&str> = playoff
        .ranking
        .iter()
        .take(spots)
        .map(|&i| playoff.teams[i].name.as_str())
        .collect();

    let mut promoted = Vec::new();
    let mut relegated = Vec::new();

    for mut team in contenders {
        let was_in_league = bottom.contains(&team.name);
        if winners.contains(team.name.as_str()) {
            if !was_in_league {
                promoted.push(team.name.clone());
            }
            team.league = Some(config.league_name.clone());
            state.league.push(team);
        } else {
            if was_in_league {
                relegated.push(team.name.clone());
            }
            team.league = Some(config.playoff_name.clone());
            state.playoff_pool.push(team);
        }
    }

    (promoted, relegated)
}

/// Credit prize money and trophies, finding teams by name across every pool
fn apply_awards(
    state: &mut SeasonState,
    summaries: &[CompetitionSummary],
    top_scorer: Option<&TopScorer>,
    season: u32,
) {
    if let Some(scorer) = top_scorer {
        match state.team_mut(&scorer.team) {
            Some(team) => team.budget += scorer.prize as i64,
            None => tracing::warn!("Top scorer prize: no team named {}", scorer.team),
        }
    }

    for summary in summaries {
        for award in &summary.awards {
            match state.team_mut(&award.team) {
                Some(team) => team.budget += award.prize as i64,
                None => tracing::warn!("{}: no team named {}", summary.name, award.team),
            }
        }

        if let Some(winner) = &summary.winner {
            if let Some(team) = state.team_mut(winner) {
                team.trophies.push(format!("{} {}", summary.name, season));
            }
        }
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Matchdays played before a cup at `at_fraction` of the season is due
fn cup_matchday(at_fraction: f64, total: usize) -> usize {
    (at_fraction * total as f64) as usize
}

/// Most league goals this season; ties go to the higher-placed club, then
/// squad order
fn league_top_scorer(league: &[Team], ranking: &[usize], prize: u64) -> Option<TopScorer> {
    let mut best: Option<TopScorer> = None;
    for &i in ranking {
        for player in &league[i].players {
            let leads = best.as_ref().map_or(true, |b| player.season_goals > b.goals);
            if player.season_goals > 0 && leads {
                best = Some(TopScorer {
                    player: player.name.clone(),
                    team: league[i].name.clone(),
                    goals: player.season_goals,
                    prize,
                });
            }
        }
    }

    if let Some(scorer) = &best {
        tracing::info!("Top scorer: {} ({}) with {} goals", scorer.player, scorer.team, scorer.goals);
    }
    best
}

/// Copies of the `count` strongest teams; equal strength keeps input order
fn strongest<'a>(candidates: impl Iterator<Item = &'a Team>, count: usize) -> Vec<Team> {
    let mut sorted: Vec<&Team> = candidates.collect();
    sorted.sort_by(|a, b| b.strength().total_cmp(&a.strength()));
    sorted.into_iter().take(count).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickoff_core::{Player, Score};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

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

    /// Higher rating wins 1-0, the goal going to the winner's first player
    struct FirstPlayerScores;

    impl MatchResolver for FirstPlayerScores {
        fn play<R: Rng + ?Sized>(&self, home: &mut Team, away: &mut Team, _: &mut R) -> Score {
            let (winner, score) = if home.strength() >= away.strength() {
                (home, Score::new(1, 0))
            } else {
                (away, Score::new(0, 1))
            };
            if let Some(player) = winner.players.first_mut() {
                player.season_goals += 1;
            }
            score
        }
    }

    fn teams(prefix: &str, ratings: &[f32]) -> Vec<Team> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, &r)| Team::with_rating(&format!("{}{}", prefix, i), r))
            .collect()
    }

    fn small_state() -> SeasonState {
        SeasonState {
            season_number: 0,
            league: teams("L", &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]),
            playoff_pool: vec![Team::with_rating("P0", 100.0), Team::with_rating("P1", 5.0)],
            foreign_pool: Vec::new(),
            national_teams: Vec::new(),
        }
    }

    fn names(teams: &[Team]) -> Vec<&str> {
        let mut names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn test_league_table_and_season_number() {
        let mut state = small_state();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let report = run_season(&mut state, &SeasonConfig::league_only(), &StrongerWins, &mut rng);

        assert_eq!(report.season_number, 1);
        assert_eq!(state.season_number, 1);
        assert_eq!(report.league_table.len(), 6);
        assert_eq!(report.league_table[0].name, "L5");
        assert_eq!(report.league_table[0].stats.points, 15);
        assert!(report.league_table.iter().all(|row| row.stats.games_played == 5));
        assert_eq!(report.competitions[0].name, "Domestic League");
        assert_eq!(report.competitions[0].winner.as_deref(), Some("L5"));
        assert_eq!(report.top_scorer, None);
    }

    #[test]
    fn test_playoff_promotes_and_relegates() {
        let mut state = small_state();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let report = run_season(&mut state, &SeasonConfig::league_only(), &StrongerWins, &mut rng);

        // Mini-league of L0 (10), L1 (20), P0 (100), P1 (5): P0 and L1 go up
        assert_eq!(report.promoted, vec!["P0".to_string()]);
        assert_eq!(report.relegated, vec!["L0".to_string()]);
        assert_eq!(names(&state.league), vec!["L1", "L2", "L3", "L4", "L5", "P0"]);
        assert_eq!(names(&state.playoff_pool), vec!["L0", "P1"]);

        let p0 = state.league.iter().find(|t| t.name == "P0").unwrap();
        assert_eq!(p0.league.as_deref(), Some("Domestic League"));
        let l0 = state.playoff_pool.iter().find(|t| t.name == "L0").unwrap();
        assert_eq!(l0.league.as_deref(), Some("Domestic Playoff"));
    }

    #[test]
    fn test_no_playoff_without_pool() {
        let mut state = small_state();
        state.playoff_pool.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let report = run_season(&mut state, &SeasonConfig::league_only(), &StrongerWins, &mut rng);
        assert!(report.promoted.is_empty());
        assert!(report.relegated.is_empty());
        assert_eq!(state.league.len(), 6);
    }

    #[test]
    fn test_league_prizes_and_trophy() {
        let mut state = small_state();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        run_season(&mut state, &SeasonConfig::league_only(), &StrongerWins, &mut rng);

        let champion = state.league.iter().find(|t| t.name == "L5").unwrap();
        assert_eq!(champion.budget, 50_000_000);
        assert_eq!(champion.trophies, vec!["Domestic League 1".to_string()]);

        // Relegated L0 finished sixth and is found in the playoff pool
        let l0 = state.playoff_pool.iter().find(|t| t.name == "L0").unwrap();
        assert_eq!(l0.budget, 25_000_000);
    }

    #[test]
    fn test_cups_do_not_touch_league_stats() {
        let mut state = small_state();
        state.foreign_pool = teams("F", &[70.0, 15.0, 35.0]);
        let config = SeasonConfig {
            continental: Vec::new(),
            world_tournament: None,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let report = run_season(&mut state, &config, &StrongerWins, &mut rng);

        assert!(report.league_table.iter().all(|row| row.stats.games_played == 5));
        assert_eq!(report.competitions.len(), 3);

        let guru = report.competition("Cup De Guru").unwrap();
        assert_eq!(guru.winner.as_deref(), Some("L5"));

        // Silver Cup draws from both pools; F0 is the strongest club there
        let silver = report.competition("Silver Cup").unwrap();
        assert_eq!(silver.winner.as_deref(), Some("F0"));
        let f0 = state.foreign_pool.iter().find(|t| t.name == "F0").unwrap();
        assert_eq!(f0.budget, 15_000_000);
        assert_eq!(f0.trophies, vec!["Silver Cup 1".to_string()]);
    }

    #[test]
    fn test_small_continental_field_falls_back_to_knockout() {
        let mut state = small_state();
        state.foreign_pool = teams("F", &[70.0, 65.0]);
        let config = SeasonConfig {
            cups: Vec::new(),
            world_tournament: None,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let report = run_season(&mut state, &config, &StrongerWins, &mut rng);

        // Champions League takes all eight clubs; later tiers have nobody left
        let cl = report.competition("Champions League").unwrap();
        assert_eq!(cl.winner.as_deref(), Some("F0"));
        assert!(report.competition("Europa League").is_none());
        assert_eq!(cl.awards.iter().filter(|a| a.prize == 15_000_000).count(), 6);
    }

    #[test]
    fn test_full_continental_field_plays_groups() {
        let mut state = small_state();
        let ratings: Vec<f32> = (0..40).map(|i| 11.0 + i as f32).collect();
        state.foreign_pool = teams("F", &ratings);
        let config = SeasonConfig {
            cups: Vec::new(),
            world_tournament: None,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let report = run_season(&mut state, &config, &StrongerWins, &mut rng);

        // L5, L4 and the fourteen strongest foreign clubs
        let cl = report.competition("Champions League").unwrap();
        assert_eq!(cl.winner.as_deref(), Some("L5"));
        // Everyone but the two finalists earns the 15M floor
        let participation = cl.awards.iter().filter(|a| a.prize == 15_000_000).count();
        assert_eq!(participation, 14);

        let el = report.competition("Europa League").unwrap();
        assert!(el.winner.is_some());
        // Early exits still take the 8M participation money
        let el_floor = el.awards.iter().filter(|a| a.prize == 8_000_000).count();
        assert_eq!(el_floor, 14);
        assert!(report.competition("Conference League").is_some());
    }

    #[test]
    fn test_league_top_scorer_is_paid() {
        let mut state = small_state();
        state.playoff_pool.clear();
        state.league[5].players.push(Player::new("Striker", "FW", 60));
        state.league[4].players.push(Player::new("Winger", "FW", 50));
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let report = run_season(
            &mut state,
            &SeasonConfig::league_only(),
            &FirstPlayerScores,
            &mut rng,
        );

        assert_eq!(
            report.top_scorer,
            Some(TopScorer {
                player: "Striker".to_string(),
                team: "L5".to_string(),
                goals: 5,
                prize: 5_000_000,
            })
        );
        let l5 = state.league.iter().find(|t| t.name == "L5").unwrap();
        assert_eq!(l5.budget, 55_000_000);
        assert_eq!(l5.players[0].season_goals, 5);
    }

    #[test]
    fn test_cups_start_on_whole_matchdays() {
        // Eleven matchdays: a quarter in is after day 2, three quarters after day 8
        assert_eq!(cup_matchday(0.25, 11), 2);
        assert_eq!(cup_matchday(0.75, 11), 8);
        assert_eq!(cup_matchday(1.0, 11), 11);
        assert_eq!(cup_matchday(0.25, 0), 0);
    }

    #[test]
    fn test_world_tournament_every_fourth_season() {
        let mut state = small_state();
        state.playoff_pool.clear();
        state.national_teams = teams("N", &[60.0, 70.0, 80.0, 90.0, 65.0, 75.0, 85.0, 95.0]);
        let config = SeasonConfig {
            cups: Vec::new(),
            continental: Vec::new(),
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        for season in 1..=4 {
            let report = run_season(&mut state, &config, &StrongerWins, &mut rng);
            let world = report.competition("World Tournament");
            if season == 4 {
                assert_eq!(world.unwrap().winner.as_deref(), Some("N7"));
            } else {
                assert!(world.is_none());
            }
        }

        let n7 = state.national_teams.iter().find(|t| t.name == "N7").unwrap();
        assert_eq!(n7.trophies, vec!["World Tournament 4".to_string()]);
    }

    #[test]
    fn test_stats_reset_between_seasons() {
        let mut state = small_state();
        state.playoff_pool.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let config = SeasonConfig::league_only();

        run_season(&mut state, &config, &StrongerWins, &mut rng);
        let report = run_season(&mut state, &config, &StrongerWins, &mut rng);

        assert_eq!(report.season_number, 2);
        assert!(state.league.iter().all(|t| t.stats.games_played == 5));
        let champion = state.league.iter().find(|t| t.name == "L5").unwrap();
        assert_eq!(champion.trophies.len(), 2);
        assert_eq!(champion.budget, 100_000_000);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut state = small_state();
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        run_season(&mut state, &SeasonConfig::league_only(), &StrongerWins, &mut rng);

        let json = serde_json::to_string(&state).unwrap();
        let restored: SeasonState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.season_number, 1);
        assert_eq!(names(&restored.league), names(&state.league));
        for (a, b) in restored.league.iter().zip(&state.league) {
            assert_eq!(a.stats, b.stats);
            assert_eq!(a.budget, b.budget);
        }
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_config() {
        let mut state = small_state();
        state.foreign_pool.push(Team::new("L3"));
        assert!(matches!(state.validate(), Err(KickoffError::DuplicateTeam(name)) if name == "L3"));

        let mut state = small_state();
        state.national_teams = vec![Team::new("N0"), Team::new("L2")];
        assert!(matches!(state.validate(), Err(KickoffError::DuplicateTeam(name)) if name == "L2"));

        let mut config = SeasonConfig::default();
        assert!(config.validate().is_ok());
        config.cups[0].at_fraction = 1.5;
        assert!(config.validate().is_err());
    }
}

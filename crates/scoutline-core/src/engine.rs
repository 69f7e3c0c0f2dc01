// Batch pipeline: current True Ratings per season/role, next-season
// projections, and True Future Ratings for prospects.
//
// Per-player work runs on rayon with no shared mutable state. Peer pools are
// built once per tier after every player's value metric is known, then
// shared read-only by all lookups.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::aggregate::{AggregatedRates, RateAggregator, SeasonRates, SeasonRecord};
use crate::blend::ScoutingBlender;
use crate::config::EngineConfig;
use crate::converter::RatingConverter;
use crate::ensemble::{EnsembleInput, EnsembleProjector, EnsembleWeights};
use crate::error::{DataCondition, Result};
use crate::future::{FutureInput, FutureRatingProjector, MlbSample, TrueFutureRating};
use crate::league::LeagueContext;
use crate::model::{
    Player, PlayerId, RateLine, RatingSource, Role, RoleTier, ScoutingRow, SkillRatings,
};
use crate::percentile::{stars_for_percentile, PeerPool, PoolConfidence};
use crate::playing_time::{PlayingTime, PlayingTimeInput, PlayingTimeProjector};
use crate::regression::RegressionEngine;
use crate::repository::StatsRepository;
use crate::value;

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

/// A player's current True Rating within a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueRating {
    pub player_id: PlayerId,
    pub season: u16,
    pub age: u32,
    pub role: Role,
    pub tier: RoleTier,
    /// Blended ratings, unclamped.
    pub ratings: SkillRatings,
    pub rates: RateLine,
    /// FIP for pitchers, wOBA for batters.
    pub value_metric: f64,
    pub percentile: f64,
    pub stars: f64,
    pub scout_weight: f64,
    pub source: RatingSource,
    pub pool_confidence: PoolConfidence,
    /// Aggregated MLB sample (IP or PA).
    pub sample_size: f64,
    /// Whether the player met the pool qualifier.
    pub qualified: bool,
    pub conditions: Vec<DataCondition>,
}

/// The three candidate lines behind a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelLines {
    pub optimistic: RateLine,
    pub neutral: RateLine,
    pub pessimistic: RateLine,
    pub trend_applied: bool,
}

/// A next-season projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub player_id: PlayerId,
    pub target_season: u16,
    pub role: Role,
    pub tier: RoleTier,
    pub rates: RateLine,
    pub ratings: SkillRatings,
    pub weights: EnsembleWeights,
    pub models: ModelLines,
    pub playing_time: PlayingTime,
    pub value_metric: f64,
    /// Projected value ranked within the current tier pool.
    pub percentile: f64,
    pub war: f64,
}

/// Every True Rating for one season and role, plus the pools they were
/// ranked in.
#[derive(Debug, Clone)]
pub struct SeasonRatings {
    pub season: u16,
    pub role: Role,
    pub ratings: Vec<TrueRating>,
    pub pools: BTreeMap<RoleTier, PeerPool>,
}

impl SeasonRatings {
    pub fn get(&self, id: PlayerId) -> Option<&TrueRating> {
        self.ratings
            .binary_search_by_key(&id, |r| r.player_id)
            .ok()
            .map(|i| &self.ratings[i])
    }

    pub fn pool(&self, tier: RoleTier) -> Option<&PeerPool> {
        self.pools.get(&tier)
    }
}

/// Pre-ranking estimate for one player.
#[derive(Debug, Clone)]
struct Estimate {
    player_id: PlayerId,
    age: u32,
    role: Role,
    tier: RoleTier,
    rates: RateLine,
    value_metric: f64,
    scout_weight: f64,
    source: RatingSource,
    sample_size: f64,
    qualified: bool,
    conditions: Vec<DataCondition>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RatingEngine {
    config: EngineConfig,
    converter: RatingConverter,
    aggregator: RateAggregator,
    regression: RegressionEngine,
    blender: ScoutingBlender,
    ensemble: EnsembleProjector,
    playing_time: PlayingTimeProjector,
    future: FutureRatingProjector,
}

impl RatingEngine {
    /// Validate `config` and assemble every estimator from it.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let converter = RatingConverter::new(config.converter);
        let aggregator = RateAggregator::new(config.aggregation.recency_weights.clone());
        Ok(RatingEngine {
            regression: RegressionEngine::new(config.regression.clone()),
            blender: ScoutingBlender::new(config.blend.clone(), converter),
            ensemble: EnsembleProjector::new(config.ensemble.clone(), config.aging.clone(), converter),
            playing_time: PlayingTimeProjector::new(
                config.playing_time.clone(),
                config.aggregation.recency_weights.clone(),
            ),
            future: FutureRatingProjector::new(
                config.future.clone(),
                converter,
                aggregator.clone(),
                config.ranking.star_bins.clone(),
                config.ranking.floor_stars,
            ),
            converter,
            aggregator,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn converter(&self) -> &RatingConverter {
        &self.converter
    }

    // -- history helpers --

    fn mlb_history<S: StatsRepository + ?Sized>(
        &self,
        repo: &S,
        role: Role,
        id: PlayerId,
        season: u16,
    ) -> Vec<SeasonRates> {
        fn mlb<R: SeasonRecord>(rows: &[R], season: u16) -> Vec<SeasonRates> {
            SeasonRates::collect(
                rows.iter()
                    .filter(|r| r.level().is_mlb() && r.year() <= season),
            )
        }
        match role {
            Role::Pitcher => mlb(repo.pitching_seasons(id), season),
            Role::Batter => mlb(repo.batting_seasons(id), season),
        }
    }

    fn minor_stints<S: StatsRepository + ?Sized>(
        &self,
        repo: &S,
        role: Role,
        id: PlayerId,
        season: u16,
    ) -> Vec<SeasonRates> {
        fn minors<R: SeasonRecord>(rows: &[R], season: u16) -> Vec<SeasonRates> {
            rows.iter()
                .filter(|r| !r.level().is_mlb() && r.year() <= season)
                .map(SeasonRates::from_record)
                .collect()
        }
        match role {
            Role::Pitcher => minors(repo.pitching_seasons(id), season),
            Role::Batter => minors(repo.batting_seasons(id), season),
        }
    }

    fn scouting_for<'r, S: StatsRepository + ?Sized>(
        &self,
        repo: &'r S,
        player: &Player,
    ) -> Option<&'r ScoutingRow> {
        repo.scouting(player.id).filter(|row| row.role == player.role)
    }

    /// Starter or reliever for pitchers: starts history first, then stamina
    /// and repertoire depth.
    pub fn classify(&self, role: Role, avg_starts: Option<f64>, scouting: Option<&ScoutingRow>) -> RoleTier {
        if role == Role::Batter {
            return RoleTier::Batter;
        }
        let roles = &self.config.roles;
        if let Some(starts) = avg_starts {
            return if starts >= roles.starter_min_starts {
                RoleTier::Starter
            } else {
                RoleTier::Reliever
            };
        }
        match scouting {
            Some(row)
                if row.stamina.unwrap_or(0.0) >= roles.starter_min_stamina
                    && row.usable_pitches(roles.usable_pitch_grade) >= roles.starter_min_pitches =>
            {
                RoleTier::Starter
            }
            _ => RoleTier::Reliever,
        }
    }

    fn qualifier(&self, tier: RoleTier) -> f64 {
        let r = &self.config.ranking;
        match tier {
            RoleTier::Starter => r.starter_min_ip,
            RoleTier::Reliever => r.reliever_min_ip,
            RoleTier::Batter => r.batter_min_pa,
        }
    }

    fn estimate<S: StatsRepository + ?Sized>(
        &self,
        repo: &S,
        player: &Player,
        season: u16,
        league: &LeagueContext,
    ) -> Estimate {
        let role = player.role;
        let league_line = league.league_rates(role);
        let history = self.mlb_history(repo, role, player.id, season);
        let agg: AggregatedRates = self.aggregator.combine(&history, &league_line);

        let mut conditions = Vec::new();
        if history.is_empty() {
            conditions.push(DataCondition::MissingStats);
        } else if agg.is_empty() {
            conditions.push(DataCondition::ZeroSample);
        }

        let regressed = self.regression.regress(&agg.rates, agg.sample_size, league);
        let scouting = self.scouting_for(repo, player);
        if scouting.is_none() {
            conditions.push(DataCondition::MissingScouting);
        }
        let blended = self
            .blender
            .blend(&regressed.rates, scouting, player.age, agg.sample_size);

        let starts = if agg.is_empty() { None } else { agg.avg_starts };
        let tier = self.classify(role, starts, scouting);
        let value_metric = value::value_metric(&blended.rates, league);
        let qualified = agg.sample_size >= self.qualifier(tier) && agg.sample_size > 0.0;

        debug!(
            player_id = player.id,
            tier = tier.label(),
            sample = agg.sample_size,
            scout_weight = blended.scout_weight,
            value_metric,
            "estimated player"
        );

        Estimate {
            player_id: player.id,
            age: player.age,
            role,
            tier,
            rates: blended.rates,
            value_metric,
            scout_weight: blended.scout_weight,
            source: blended.source,
            sample_size: agg.sample_size,
            qualified,
            conditions,
        }
    }

    fn finalize(&self, est: Estimate, season: u16, pools: &BTreeMap<RoleTier, PeerPool>) -> TrueRating {
        let ranking = &self.config.ranking;
        let mut conditions = est.conditions;
        let (percentile, pool_confidence) = match pools.get(&est.tier) {
            Some(pool) => {
                let pct = pool
                    .percentile_of(est.player_id)
                    .unwrap_or_else(|| pool.percentile_of_value(est.value_metric));
                (pct, pool.confidence(ranking.min_pool_size))
            }
            None => (50.0, PoolConfidence::Low),
        };
        if pool_confidence == PoolConfidence::Low {
            conditions.push(DataCondition::PoolTooSmall);
        }
        let stars = stars_for_percentile(percentile, &ranking.star_bins, ranking.floor_stars);

        TrueRating {
            player_id: est.player_id,
            season,
            age: est.age,
            role: est.role,
            tier: est.tier,
            ratings: self.converter.ratings_for(&est.rates),
            rates: est.rates,
            value_metric: est.value_metric,
            percentile,
            stars,
            scout_weight: est.scout_weight,
            source: est.source,
            pool_confidence,
            sample_size: est.sample_size,
            qualified: est.qualified,
            conditions,
        }
    }

    fn build_pools(&self, role: Role, estimates: &[Estimate]) -> BTreeMap<RoleTier, PeerPool> {
        let tiers: &[RoleTier] = match role {
            Role::Pitcher => &[RoleTier::Starter, RoleTier::Reliever],
            Role::Batter => &[RoleTier::Batter],
        };
        let higher_is_better = value::metric_higher_is_better(role);
        let mut pools = BTreeMap::new();
        for &tier in tiers {
            let pool = PeerPool::build(
                tier,
                higher_is_better,
                estimates
                    .iter()
                    .filter(|e| e.tier == tier && e.qualified)
                    .map(|e| (e.player_id, e.value_metric)),
            );
            if pool.len() < self.config.ranking.min_pool_size {
                warn!(
                    tier = tier.label(),
                    size = pool.len(),
                    min = self.config.ranking.min_pool_size,
                    "peer pool below usable size; percentiles flagged low-confidence"
                );
            }
            pools.insert(tier, pool);
        }
        pools
    }

    /// Rate every player of `role` for `season`.
    pub fn rate_season<S: StatsRepository + ?Sized>(
        &self,
        repo: &S,
        role: Role,
        season: u16,
        league: &LeagueContext,
    ) -> SeasonRatings {
        let players = repo.players(role);
        let estimates: Vec<Estimate> = players
            .par_iter()
            .map(|p| self.estimate(repo, p, season, league))
            .collect();
        let pools = self.build_pools(role, &estimates);
        let ratings: Vec<TrueRating> = estimates
            .into_par_iter()
            .map(|e| self.finalize(e, season, &pools))
            .collect();

        info!(
            season,
            ?role,
            players = ratings.len(),
            pools = ?pools.iter().map(|(t, p)| (t.label(), p.len())).collect::<Vec<_>>(),
            "rated season"
        );

        SeasonRatings {
            season,
            role,
            ratings,
            pools,
        }
    }

    /// Rate one player against already-built pools.
    pub fn rate_player<S: StatsRepository + ?Sized>(
        &self,
        repo: &S,
        id: PlayerId,
        season: u16,
        league: &LeagueContext,
        pools: &BTreeMap<RoleTier, PeerPool>,
    ) -> Option<TrueRating> {
        let player = repo.player(id)?;
        let est = self.estimate(repo, player, season, league);
        Some(self.finalize(est, season, pools))
    }

    /// Next-season projection from a current rating. The projected value is
    /// ranked in `pool` (the rating's tier pool) to scale playing time; with
    /// no usable pool the current percentile stands in.
    pub fn project<S: StatsRepository + ?Sized>(
        &self,
        repo: &S,
        rating: &TrueRating,
        league: &LeagueContext,
        pool: Option<&PeerPool>,
    ) -> Projection {
        let role = rating.role;
        let history = self.mlb_history(repo, role, rating.player_id, rating.season);
        let agg = self.aggregator.combine(&history, &league.league_rates(role));

        let ensemble = self.ensemble.project(&EnsembleInput {
            ratings: &rating.ratings,
            age: rating.age,
            history: &history,
            sample: rating.sample_size,
        });

        let value_metric = value::value_metric(&ensemble.rates, league);
        let percentile = match pool {
            Some(pool) if !pool.is_empty() => pool.percentile_of_value(value_metric),
            _ => rating.percentile,
        };

        let scouting = repo
            .scouting(rating.player_id)
            .filter(|row| row.role == role);
        let playing_time = self.playing_time.project(&PlayingTimeInput {
            tier: rating.tier,
            stamina: scouting.and_then(|r| r.stamina),
            injury: scouting.and_then(|r| r.injury),
            age: rating.age,
            history: &history,
            percentile,
        });

        let war = match role {
            Role::Pitcher => value::pitcher_war(value_metric, playing_time.projected, league),
            Role::Batter => value::batter_war(
                value_metric,
                playing_time.projected,
                agg.sb_rate,
                agg.cs_rate,
                league,
            ),
        };

        Projection {
            player_id: rating.player_id,
            target_season: rating.season.saturating_add(1),
            role,
            tier: rating.tier,
            rates: ensemble.rates,
            ratings: ensemble.ratings,
            weights: ensemble.weights,
            models: ModelLines {
                optimistic: ensemble.optimistic,
                neutral: ensemble.neutral,
                pessimistic: ensemble.pessimistic,
                trend_applied: ensemble.trend_applied,
            },
            playing_time,
            value_metric,
            percentile,
            war,
        }
    }

    /// Project every rating of a season.
    pub fn project_all<S: StatsRepository + ?Sized>(
        &self,
        repo: &S,
        ratings: &SeasonRatings,
        league: &LeagueContext,
    ) -> Vec<Projection> {
        let projections: Vec<Projection> = ratings
            .ratings
            .par_iter()
            .map(|r| self.project(repo, r, league, ratings.pool(r.tier)))
            .collect();
        info!(
            season = ratings.season,
            role = ?ratings.role,
            projections = projections.len(),
            "projected season"
        );
        projections
    }

    /// True Future Ratings for every player of the season's role whose MLB
    /// career sample is below the prospect limit. Players with neither
    /// minor-league rows nor scouting are skipped.
    pub fn future_ratings<S: StatsRepository + ?Sized>(
        &self,
        repo: &S,
        current: &SeasonRatings,
        league: &LeagueContext,
    ) -> Vec<TrueFutureRating> {
        let role = current.role;
        let season = current.season;
        let limit = self.config.future.prospect_max_mlb(role);
        let fallback_tier = match role {
            Role::Pitcher => RoleTier::Starter,
            Role::Batter => RoleTier::Batter,
        };
        let empty = PeerPool::build(fallback_tier, value::metric_higher_is_better(role), Vec::new());

        let players = repo.players(role);
        let out: Vec<TrueFutureRating> = players
            .par_iter()
            .filter_map(|player| {
                let mlb = self.mlb_history(repo, role, player.id, season);
                let career: f64 = mlb.iter().map(|s| s.sample_size.max(0.0)).sum();
                if career >= limit {
                    return None;
                }
                let minors = self.minor_stints(repo, role, player.id, season);
                let scouting = self.scouting_for(repo, player);
                if minors.is_empty() && scouting.is_none() {
                    return None;
                }

                let current_rating = current.get(player.id);
                let tier = match current_rating {
                    Some(r) if career > 0.0 => r.tier,
                    _ => {
                        let merged = SeasonRates::merge_years(minors.iter().cloned());
                        let agg = self.aggregator.combine(&merged, &league.league_rates(role));
                        let starts = if agg.is_empty() { None } else { agg.avg_starts };
                        self.classify(role, starts, scouting)
                    }
                };
                // Performance side is the regressed MLB line, before any
                // blend with current grades.
                let mlb_line = (career > 0.0).then(|| {
                    let agg = self.aggregator.combine(&mlb, &league.league_rates(role));
                    let regressed = self.regression.regress(&agg.rates, agg.sample_size, league);
                    (regressed.rates, agg.sample_size)
                });
                let mlb_sample = mlb_line.as_ref().map(|(rates, sample_size)| MlbSample {
                    rates,
                    sample_size: *sample_size,
                });
                let pool = current.pool(tier).unwrap_or(&empty);
                Some(self.future.project(
                    &FutureInput {
                        player_id: player.id,
                        season,
                        role,
                        tier,
                        age: player.age,
                        minor_seasons: &minors,
                        mlb: mlb_sample,
                        scouting,
                    },
                    league,
                    pool,
                ))
            })
            .collect();

        info!(season, ?role, prospects = out.len(), "computed future ratings");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Level, PitchingSeason, ScoutSource, Skill};
    use crate::repository::InMemoryRepository;
    use std::collections::BTreeMap as Map;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn pitcher(id: PlayerId, age: u32) -> Player {
        Player {
            id,
            name: format!("P{id}"),
            role: Role::Pitcher,
            age,
        }
    }

    fn season(id: PlayerId, year: u16, ip: f64, gs: u32, k: u32, bb: u32, hr: u32) -> PitchingSeason {
        PitchingSeason {
            player_id: id,
            year,
            level: Level::Mlb,
            ip,
            gs,
            k,
            bb,
            hr,
            er: (ip * 4.0 / 9.0) as u32,
        }
    }

    fn league_repo() -> InMemoryRepository {
        let mut repo = InMemoryRepository::new();
        for id in 1..=30u32 {
            repo.add_player(pitcher(id, 24 + id % 10));
            let k = 120 + id * 4;
            repo.add_pitching(season(id, 2024, 160.0, 28, k, 50, 18));
            repo.add_pitching(season(id, 2023, 150.0, 26, k - 10, 52, 17));
        }
        repo
    }

    fn engine() -> RatingEngine {
        RatingEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.aggregation.recency_weights.clear();
        assert!(RatingEngine::new(config).is_err());
    }

    #[test]
    fn rate_season_orders_and_ranks() {
        let repo = league_repo();
        let league = LeagueContext::default();
        let out = engine().rate_season(&repo, Role::Pitcher, 2024, &league);
        assert_eq!(out.ratings.len(), 30);
        let ids: Vec<PlayerId> = out.ratings.iter().map(|r| r.player_id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        // More strikeouts with identical walks and homers ranks higher.
        let low = out.get(1).unwrap();
        let high = out.get(30).unwrap();
        assert!(high.percentile > low.percentile);
        assert!(high.stars >= low.stars);
        assert_eq!(high.tier, RoleTier::Starter);
        assert_eq!(out.pool(RoleTier::Starter).map(|p| p.len()), Some(30));
        assert_eq!(high.pool_confidence, PoolConfidence::Normal);
    }

    #[test]
    fn rating_is_reproducible() {
        let repo = league_repo();
        let league = LeagueContext::default();
        let e = engine();
        let a = e.rate_season(&repo, Role::Pitcher, 2024, &league);
        let b = e.rate_season(&repo, Role::Pitcher, 2024, &league);
        assert_eq!(a.ratings, b.ratings);
    }

    #[test]
    fn future_seasons_are_ignored() {
        let mut repo = league_repo();
        repo.add_pitching(season(1, 2025, 200.0, 32, 300, 20, 5));
        let league = LeagueContext::default();
        let e = engine();
        let with_future = e.rate_season(&repo, Role::Pitcher, 2024, &league);
        let baseline = e.rate_season(&league_repo(), Role::Pitcher, 2024, &league);
        assert_eq!(with_future.get(1), baseline.get(1));
    }

    #[test]
    fn player_without_stats_or_scouting_degrades() {
        let mut repo = league_repo();
        repo.add_player(pitcher(99, 22));
        let league = LeagueContext::default();
        let out = engine().rate_season(&repo, Role::Pitcher, 2024, &league);
        let r = out.get(99).unwrap();
        assert!(r.conditions.contains(&DataCondition::MissingStats));
        assert!(r.conditions.contains(&DataCondition::MissingScouting));
        assert_eq!(r.source, RatingSource::StatsOnly);
        assert!(!r.qualified);
        assert!(r.value_metric.is_finite());
        assert!(approx_eq(r.value_metric, league.league_fip, 1e-9));
    }

    #[test]
    fn small_pool_flagged() {
        let mut repo = InMemoryRepository::new();
        repo.add_player(pitcher(1, 27));
        repo.add_pitching(season(1, 2024, 180.0, 30, 180, 50, 20));
        let out = engine().rate_season(&repo, Role::Pitcher, 2024, &LeagueContext::default());
        let r = out.get(1).unwrap();
        assert_eq!(r.pool_confidence, PoolConfidence::Low);
        assert!(r.conditions.contains(&DataCondition::PoolTooSmall));
        assert_eq!(r.percentile, 50.0);
    }

    #[test]
    fn classify_by_repertoire_without_starts() {
        let e = engine();
        let row = ScoutingRow {
            player_id: 1,
            source: ScoutSource::Osa,
            role: Role::Pitcher,
            grades: Map::from([(Skill::Stuff, 55.0)]),
            potential: Map::new(),
            stamina: Some(60.0),
            injury: None,
            current_stars: None,
            potential_stars: None,
            repertoire: Map::from([
                ("fastball".to_string(), 60.0),
                ("slider".to_string(), 50.0),
                ("changeup".to_string(), 45.0),
            ]),
        };
        assert_eq!(e.classify(Role::Pitcher, None, Some(&row)), RoleTier::Starter);
        let mut thin = row.clone();
        thin.repertoire.remove("changeup");
        assert_eq!(e.classify(Role::Pitcher, None, Some(&thin)), RoleTier::Reliever);
        assert_eq!(e.classify(Role::Pitcher, Some(2.0), Some(&row)), RoleTier::Reliever);
        assert_eq!(e.classify(Role::Batter, None, None), RoleTier::Batter);
    }

    #[test]
    fn projection_targets_next_season() {
        let repo = league_repo();
        let league = LeagueContext::default();
        let e = engine();
        let ratings = e.rate_season(&repo, Role::Pitcher, 2024, &league);
        let projections = e.project_all(&repo, &ratings, &league);
        assert_eq!(projections.len(), 30);
        for p in &projections {
            assert_eq!(p.target_season, 2025);
            assert!(approx_eq(p.weights.sum(), 1.0, 1e-9));
            assert!(p.war.is_finite());
            assert!(p.playing_time.projected >= 60.0);
            assert!(p.models.trend_applied);
        }
    }

    fn cup_of_coffee_repo(current_grades: [f64; 3]) -> InMemoryRepository {
        let mut repo = league_repo();
        repo.add_player(pitcher(300, 22));
        repo.add_pitching(season(300, 2024, 24.0, 4, 25, 10, 3));
        repo.add_scouting(ScoutingRow {
            player_id: 300,
            source: ScoutSource::My,
            role: Role::Pitcher,
            grades: Map::from([
                (Skill::Stuff, current_grades[0]),
                (Skill::Control, current_grades[1]),
                (Skill::HrAvoidance, current_grades[2]),
            ]),
            potential: Map::from([
                (Skill::Stuff, 70.0),
                (Skill::Control, 60.0),
                (Skill::HrAvoidance, 60.0),
            ]),
            stamina: Some(55.0),
            injury: None,
            current_stars: Some(2.0),
            potential_stars: Some(4.0),
            repertoire: Map::new(),
        });
        repo
    }

    #[test]
    fn partial_mlb_future_ignores_current_grades() {
        let league = LeagueContext::default();
        let e = engine();
        let future_for = |grades| {
            let repo = cup_of_coffee_repo(grades);
            let current = e.rate_season(&repo, Role::Pitcher, 2024, &league);
            let future = e.future_ratings(&repo, &current, &league);
            let tfr = future.into_iter().find(|t| t.player_id == 300).unwrap();
            (current.get(300).unwrap().rates.clone(), tfr)
        };
        let (raw_current, raw_tfr) = future_for([35.0, 35.0, 35.0]);
        let (polished_current, polished_tfr) = future_for([60.0, 60.0, 60.0]);

        // Current ratings differ with the grades; the future blend uses the
        // stats line plus potential only.
        assert_ne!(raw_current, polished_current);
        assert_eq!(raw_tfr.stats_basis, crate::future::StatsBasis::Mlb);
        assert_eq!(raw_tfr.rates, polished_tfr.rates);
        assert_eq!(raw_tfr.scout_weight, polished_tfr.scout_weight);
    }

    #[test]
    fn prospects_get_future_ratings() {
        let mut repo = league_repo();
        repo.add_player(pitcher(200, 20));
        repo.add_pitching(PitchingSeason {
            player_id: 200,
            year: 2024,
            level: Level::Aa,
            ip: 110.0,
            gs: 20,
            k: 130,
            bb: 40,
            hr: 8,
            er: 45,
        });
        let league = LeagueContext::default();
        let e = engine();
        let current = e.rate_season(&repo, Role::Pitcher, 2024, &league);
        let future = e.future_ratings(&repo, &current, &league);
        // Established MLB pitchers are excluded.
        assert_eq!(future.len(), 1);
        let tfr = &future[0];
        assert_eq!(tfr.player_id, 200);
        assert_eq!(tfr.tier, RoleTier::Starter);
        assert_eq!(tfr.stats_basis, crate::future::StatsBasis::Minors);
        assert!((0.0..=100.0).contains(&tfr.percentile));
    }
}

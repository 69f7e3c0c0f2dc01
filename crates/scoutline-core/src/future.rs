// True Future Rating: prospect peak projection from translated minor-league
// rates blended with scouting potential, ranked against the current MLB pool.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{RateAggregator, SeasonRates};
use crate::config::{FutureConfig, StarBin};
use crate::converter::RatingConverter;
use crate::league::LeagueContext;
use crate::model::{Level, PlayerId, RateLine, RatingSource, Role, RoleTier, ScoutingRow, SkillRatings};
use crate::percentile::{stars_for_percentile, PeerPool};
use crate::value;

/// Which performance record fed the stats side of the blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsBasis {
    /// Level-translated minor-league seasons.
    Minors,
    /// A partial MLB sample.
    Mlb,
    /// No usable sample; the stats side is league average.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueFutureRating {
    pub player_id: PlayerId,
    pub season: u16,
    pub role: Role,
    pub tier: RoleTier,
    pub rates: RateLine,
    pub ratings: SkillRatings,
    pub value_metric: f64,
    pub percentile: f64,
    pub stars: f64,
    pub scout_weight: f64,
    pub stats_basis: StatsBasis,
    pub source: RatingSource,
    /// Sample behind the stats side (minor-league or MLB).
    pub sample_size: f64,
}

/// A partial MLB record already rated by the current-rating pipeline.
#[derive(Debug, Clone, Copy)]
pub struct MlbSample<'a> {
    pub rates: &'a RateLine,
    pub sample_size: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct FutureInput<'a> {
    pub player_id: PlayerId,
    pub season: u16,
    pub role: Role,
    pub tier: RoleTier,
    pub age: u32,
    /// Minor-league stints (one per level per year), most recent first.
    /// MLB rows are ignored.
    pub minor_seasons: &'a [SeasonRates],
    pub mlb: Option<MlbSample<'a>>,
    pub scouting: Option<&'a ScoutingRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FutureRatingProjector {
    config: FutureConfig,
    converter: RatingConverter,
    aggregator: RateAggregator,
    star_bins: Vec<StarBin>,
    floor_stars: f64,
}

impl FutureRatingProjector {
    pub fn new(
        config: FutureConfig,
        converter: RatingConverter,
        aggregator: RateAggregator,
        star_bins: Vec<StarBin>,
        floor_stars: f64,
    ) -> Self {
        FutureRatingProjector {
            config,
            converter,
            aggregator,
            star_bins,
            floor_stars,
        }
    }

    /// MLB-equivalent rates for a line recorded at `level`.
    pub fn translate(&self, level: Level, rates: &RateLine) -> RateLine {
        let adj = self.config.level_adjustments.for_level(level);
        rates.map(|stat, v| stat.clamp(v + adj.get(stat)))
    }

    /// Scouting weight for a prospect: older or more sample means less
    /// scouting; a larger development gap means more.
    pub fn scout_weight(&self, role: Role, age: u32, star_gap: f64, sample: f64) -> f64 {
        let c = &self.config;
        let gap = if star_gap.is_finite() { star_gap } else { 0.0 };
        let gap_bonus = gap.clamp(0.0, c.gap_span) / c.gap_span * c.gap_bonus;
        let k = c.sample_k(role);
        let sample = sample.max(0.0);
        let sample_bonus = if k + sample > 0.0 {
            k / (k + sample) * c.sample_bonus
        } else {
            0.0
        };
        let age_adj = ((c.age_pivot - age as f64) * c.age_slope).clamp(c.age_min, c.age_max);
        (c.base_weight + gap_bonus + sample_bonus + age_adj).clamp(0.0, c.max_weight)
    }

    /// Recency-weighted MLB-equivalent line over the minor-league stints.
    /// Each stint is translated at its own level before same-year stints are
    /// merged.
    fn translated_minors(&self, stints: &[SeasonRates], league: &RateLine) -> (RateLine, f64) {
        let translated = SeasonRates::merge_years(
            stints
                .iter()
                .filter(|s| !s.level.is_mlb() && s.rates.role() == league.role())
                .map(|s| SeasonRates {
                    rates: self.translate(s.level, &s.rates),
                    ..s.clone()
                }),
        );
        let agg = self.aggregator.combine(&translated, league);
        (agg.rates, agg.sample_size)
    }

    pub fn project(&self, input: &FutureInput<'_>, league: &LeagueContext, pool: &PeerPool) -> TrueFutureRating {
        let role = input.role;
        let league_line = league.league_rates(role);

        let (stats_rates, sample, stats_basis) = match input.mlb {
            Some(mlb) if mlb.sample_size > 0.0 && mlb.rates.role() == role => {
                (mlb.rates.clone(), mlb.sample_size, StatsBasis::Mlb)
            }
            _ => {
                let (rates, sample) = self.translated_minors(input.minor_seasons, &league_line);
                if sample > 0.0 {
                    (rates, sample, StatsBasis::Minors)
                } else {
                    (league_line.clone(), 0.0, StatsBasis::None)
                }
            }
        };

        let (rates, scout_weight, source) = match input.scouting {
            Some(row) => {
                let potential = self
                    .converter
                    .rates_from_grades(role, |skill| row.potential_grade(skill))
                    .clamped();
                let w = self.scout_weight(role, input.age, row.star_gap(), sample);
                let rates = stats_rates.zip_with(&potential, |stat, perf, pot| {
                    stat.clamp(w * pot + (1.0 - w) * perf)
                });
                (rates, w, RatingSource::Scouting)
            }
            None => (stats_rates, 0.0, RatingSource::StatsOnly),
        };

        let ratings = self.converter.ratings_for(&rates);
        let value_metric = value::value_metric(&rates, league);
        let percentile = pool.percentile_of_value(value_metric);
        let stars = stars_for_percentile(percentile, &self.star_bins, self.floor_stars);

        debug!(
            player_id = input.player_id,
            ?stats_basis,
            scout_weight,
            value_metric,
            percentile,
            "future rating"
        );

        TrueFutureRating {
            player_id: input.player_id,
            season: input.season,
            role,
            tier: input.tier,
            rates,
            ratings,
            value_metric,
            percentile,
            stars,
            scout_weight,
            stats_basis,
            source,
            sample_size: sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingConfig;
    use crate::model::{ScoutSource, Skill, Stat};
    use std::collections::BTreeMap;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn projector() -> FutureRatingProjector {
        let ranking = RankingConfig::default();
        FutureRatingProjector::new(
            FutureConfig::default(),
            RatingConverter::default(),
            RateAggregator::new(vec![5.0, 3.0, 2.0]),
            ranking.star_bins,
            ranking.floor_stars,
        )
    }

    fn prospect_row(current: f64, potential: f64) -> ScoutingRow {
        ScoutingRow {
            player_id: 42,
            source: ScoutSource::My,
            role: Role::Pitcher,
            grades: BTreeMap::from([(Skill::Stuff, 45.0), (Skill::Control, 40.0), (Skill::HrAvoidance, 45.0)]),
            potential: BTreeMap::from([(Skill::Stuff, 70.0), (Skill::Control, 60.0), (Skill::HrAvoidance, 60.0)]),
            stamina: Some(55.0),
            injury: None,
            current_stars: Some(current),
            potential_stars: Some(potential),
            repertoire: BTreeMap::new(),
        }
    }

    fn minor(level: Level, ip: f64, k9: f64) -> SeasonRates {
        SeasonRates {
            year: 2024,
            level,
            sample_size: ip,
            rates: RateLine::pitching(k9, 3.5, 0.8),
            starts: Some(20),
            stolen_bases: 0,
            caught_stealing: 0,
        }
    }

    fn mlb_pool() -> PeerPool {
        PeerPool::build(
            RoleTier::Starter,
            false,
            (1..=40).map(|i| (i, 3.0 + i as f64 * 0.05)),
        )
    }

    #[test]
    fn aaa_translation_matches_table() {
        let p = projector();
        let out = p.translate(Level::Aaa, &RateLine::pitching(9.0, 3.0, 1.0));
        assert!(approx_eq(out.get(Stat::K9), 9.30, 1e-12));
        assert!(approx_eq(out.get(Stat::Bb9), 2.58, 1e-12));
        assert!(approx_eq(out.get(Stat::Hr9), 1.14, 1e-12));
        let same = p.translate(Level::Mlb, &RateLine::pitching(9.0, 3.0, 1.0));
        assert_eq!(same, RateLine::pitching(9.0, 3.0, 1.0));
    }

    #[test]
    fn raw_prospect_without_innings_trusts_scouting() {
        let p = projector();
        let w = p.scout_weight(Role::Pitcher, 20, 4.0, 0.0);
        assert!(approx_eq(w, 0.95, 1e-12));
    }

    #[test]
    fn older_and_experienced_prospect_trusts_stats_more() {
        let p = projector();
        let young = p.scout_weight(Role::Pitcher, 20, 1.0, 50.0);
        let old = p.scout_weight(Role::Pitcher, 27, 1.0, 400.0);
        assert!(old < young);
    }

    #[test]
    fn no_minor_sample_uses_league_basis() {
        let p = projector();
        let league = LeagueContext::default();
        let row = prospect_row(1.0, 5.0);
        let out = p.project(
            &FutureInput {
                player_id: 42,
                season: 2024,
                role: Role::Pitcher,
                tier: RoleTier::Starter,
                age: 20,
                minor_seasons: &[],
                mlb: None,
                scouting: Some(&row),
            },
            &league,
            &mlb_pool(),
        );
        assert_eq!(out.stats_basis, StatsBasis::None);
        assert!(approx_eq(out.scout_weight, 0.95, 1e-12));
        assert!((0.0..=100.0).contains(&out.percentile));
    }

    #[test]
    fn mlb_sample_replaces_minor_component() {
        let p = projector();
        let league = LeagueContext::default();
        let mlb_line = RateLine::pitching(9.5, 2.5, 0.9);
        let minors = vec![minor(Level::Aa, 120.0, 11.0)];
        let out = p.project(
            &FutureInput {
                player_id: 7,
                season: 2024,
                role: Role::Pitcher,
                tier: RoleTier::Starter,
                age: 23,
                minor_seasons: &minors,
                mlb: Some(MlbSample {
                    rates: &mlb_line,
                    sample_size: 25.0,
                }),
                scouting: None,
            },
            &league,
            &mlb_pool(),
        );
        assert_eq!(out.stats_basis, StatsBasis::Mlb);
        assert_eq!(out.source, RatingSource::StatsOnly);
        assert_eq!(out.rates, mlb_line);
    }

    #[test]
    fn minors_are_translated_then_blended() {
        let p = projector();
        let league = LeagueContext::default();
        let minors = vec![minor(Level::A, 100.0, 10.0)];
        let out = p.project(
            &FutureInput {
                player_id: 9,
                season: 2024,
                role: Role::Pitcher,
                tier: RoleTier::Starter,
                age: 21,
                minor_seasons: &minors,
                mlb: None,
                scouting: None,
            },
            &league,
            &mlb_pool(),
        );
        assert_eq!(out.stats_basis, StatsBasis::Minors);
        assert!(approx_eq(out.rates.get(Stat::K9), 10.22, 1e-12));
        assert_eq!(out.sample_size, 100.0);
    }
}

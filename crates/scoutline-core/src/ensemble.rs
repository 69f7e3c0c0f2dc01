// Three-model ensemble projection with dynamically computed weights.
//
// Optimistic: full aging curve. Neutral: damped aging curve. Pessimistic:
// the most recent year-over-year trend, damped. The projected line is the
// weighted average of the three models' rates; composite metrics are derived
// from that line afterwards.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::SeasonRates;
use crate::aging::AgingModifierTable;
use crate::config::EnsembleConfig;
use crate::converter::RatingConverter;
use crate::model::{RateLine, Role, SkillRatings};

/// Model weights. Always non-negative and summing to 1 when produced by
/// `EnsembleProjector::weights`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub optimistic: f64,
    pub neutral: f64,
    pub pessimistic: f64,
}

impl EnsembleWeights {
    pub fn sum(&self) -> f64 {
        self.optimistic + self.neutral + self.pessimistic
    }

    /// Floor each weight at zero and rescale to sum to one. If nothing
    /// survives, the neutral model takes the full weight.
    fn normalized(self) -> EnsembleWeights {
        let floor = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
        let (o, n, p) = (floor(self.optimistic), floor(self.neutral), floor(self.pessimistic));
        let total = o + n + p;
        if total <= 0.0 {
            return EnsembleWeights {
                optimistic: 0.0,
                neutral: 1.0,
                pessimistic: 0.0,
            };
        }
        EnsembleWeights {
            optimistic: o / total,
            neutral: n / total,
            pessimistic: p / total,
        }
    }
}

/// Everything a projection reads for one player.
#[derive(Debug, Clone, Copy)]
pub struct EnsembleInput<'a> {
    /// Current blended ratings.
    pub ratings: &'a SkillRatings,
    pub age: u32,
    /// Season rates, most recent first.
    pub history: &'a [SeasonRates],
    /// Aggregated sample behind the current ratings.
    pub sample: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleOutcome {
    pub weights: EnsembleWeights,
    pub optimistic: RateLine,
    pub neutral: RateLine,
    pub pessimistic: RateLine,
    /// Whether the pessimistic model used a trend or fell back to neutral.
    pub trend_applied: bool,
    pub rates: RateLine,
    pub ratings: SkillRatings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleProjector {
    config: EnsembleConfig,
    aging: AgingModifierTable,
    converter: RatingConverter,
}

impl EnsembleProjector {
    pub fn new(config: EnsembleConfig, aging: AgingModifierTable, converter: RatingConverter) -> Self {
        EnsembleProjector {
            config,
            aging,
            converter,
        }
    }

    /// Sample confidence in [0, 1].
    pub fn sample_confidence(&self, role: Role, sample: f64) -> f64 {
        (sample.max(0.0) / self.config.full_confidence(role)).min(1.0)
    }

    /// Dynamic model weights. Youth moves weight toward the optimistic
    /// model; a deep sample moves it from optimistic toward neutral and
    /// pessimistic.
    pub fn weights(&self, role: Role, age: u32, sample: f64) -> EnsembleWeights {
        let c = &self.config;
        let base = c.base_weights;
        let age_adj = ((c.peak_age - age as f64) * c.age_slope)
            .clamp(-c.max_age_adjustment, c.max_age_adjustment);
        let shift = (0.5 - self.sample_confidence(role, sample)) * c.sample_swing;

        EnsembleWeights {
            optimistic: base.optimistic + age_adj + shift,
            neutral: base.neutral - age_adj / 2.0 - shift * 0.6,
            pessimistic: base.pessimistic - age_adj / 2.0 - shift * 0.4,
        }
        .normalized()
    }

    fn aged_rates(&self, ratings: &SkillRatings, age: u32, fraction: f64) -> RateLine {
        let aged = self.aging.apply(ratings, age, fraction);
        self.converter.rates_for(&aged).clamped()
    }

    /// Neutral rates shifted by the damped most recent year-over-year delta,
    /// or `None` when the history cannot support a trend.
    fn trend_rates(&self, neutral: &RateLine, input: &EnsembleInput<'_>) -> Option<RateLine> {
        let role = neutral.role();
        let (recent, prior) = match input.history {
            [recent, prior, ..] => (recent, prior),
            _ => return None,
        };
        if prior.sample_size < self.config.trend_min(role) || recent.sample_size <= 0.0 {
            return None;
        }
        if recent.rates.role() != role || prior.rates.role() != role {
            return None;
        }

        let reliability = (recent.sample_size / self.config.trend_full(role)).min(1.0);
        let age = input.age as f64;
        let line = neutral.map(|stat, base| {
            let delta = recent.rates.get(stat) - prior.rates.get(stat);
            let worsening = if stat.higher_is_better() {
                delta < 0.0
            } else {
                delta > 0.0
            };
            let damping = self.config.trend_damping.factor(age, worsening) * reliability;
            stat.clamp(base + delta * damping)
        });
        Some(line)
    }

    pub fn project(&self, input: &EnsembleInput<'_>) -> EnsembleOutcome {
        let role = input.ratings.role();
        let optimistic = self.aged_rates(input.ratings, input.age, 1.0);
        let neutral = self.aged_rates(input.ratings, input.age, self.config.neutral_damping);
        let trend = self.trend_rates(&neutral, input);
        let trend_applied = trend.is_some();
        let pessimistic = trend.unwrap_or_else(|| neutral.clone());

        let weights = self.weights(role, input.age, input.sample);
        let rates = optimistic.map(|stat, opt| {
            stat.clamp(
                weights.optimistic * opt
                    + weights.neutral * neutral.get(stat)
                    + weights.pessimistic * pessimistic.get(stat),
            )
        });
        let ratings = self.converter.ratings_for(&rates);

        debug!(
            ?role,
            age = input.age,
            sample = input.sample,
            optimistic = weights.optimistic,
            neutral = weights.neutral,
            pessimistic = weights.pessimistic,
            trend_applied,
            "ensemble projection"
        );

        EnsembleOutcome {
            weights,
            optimistic,
            neutral,
            pessimistic,
            trend_applied,
            rates,
            ratings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Level, Skill, Stat};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn projector() -> EnsembleProjector {
        EnsembleProjector::new(
            EnsembleConfig::default(),
            AgingModifierTable::default(),
            RatingConverter::default(),
        )
    }

    fn season(year: u16, ip: f64, k9: f64, bb9: f64, hr9: f64) -> SeasonRates {
        SeasonRates {
            year,
            level: Level::Mlb,
            sample_size: ip,
            rates: RateLine::pitching(k9, bb9, hr9),
            starts: Some(30),
            stolen_bases: 0,
            caught_stealing: 0,
        }
    }

    // ---- weights ----

    #[test]
    fn weights_sum_to_one() {
        let p = projector();
        for age in [18, 22, 27, 31, 40] {
            for sample in [0.0, 15.0, 150.0, 600.0] {
                let w = p.weights(Role::Pitcher, age, sample);
                assert!(approx_eq(w.sum(), 1.0, 1e-9));
                assert!(w.optimistic >= 0.0 && w.neutral >= 0.0 && w.pessimistic >= 0.0);
            }
        }
    }

    #[test]
    fn veteran_with_deep_sample_favors_neutral() {
        let w = projector().weights(Role::Pitcher, 26, 600.0);
        assert!(w.neutral > w.optimistic);
        assert!(w.neutral > w.pessimistic);
        assert!(approx_eq(w.optimistic, 0.17, 1e-9));
    }

    #[test]
    fn thin_sample_favors_optimistic() {
        let w = projector().weights(Role::Pitcher, 22, 15.0);
        assert!(w.optimistic > w.neutral);
        assert!(w.optimistic > w.pessimistic);
    }

    #[test]
    fn collapsed_weights_fall_back_to_neutral() {
        let mut cfg = EnsembleConfig::default();
        cfg.base_weights = EnsembleWeights {
            optimistic: 0.0,
            neutral: 0.0,
            pessimistic: 0.0,
        };
        cfg.age_slope = 0.0;
        cfg.sample_swing = 0.0;
        let p = EnsembleProjector::new(cfg, AgingModifierTable::default(), RatingConverter::default());
        let w = p.weights(Role::Batter, 27, 500.0);
        assert_eq!(w.neutral, 1.0);
        assert_eq!(w.optimistic, 0.0);
    }

    // ---- models ----

    #[test]
    fn single_season_pessimistic_is_neutral() {
        let p = projector();
        let ratings = SkillRatings::from_fn(Role::Pitcher, |_| 55.0);
        let history = vec![season(2024, 150.0, 8.0, 3.0, 1.0)];
        let out = p.project(&EnsembleInput {
            ratings: &ratings,
            age: 28,
            history: &history,
            sample: 150.0,
        });
        assert!(!out.trend_applied);
        assert_eq!(out.pessimistic, out.neutral);
    }

    #[test]
    fn thin_prior_season_disables_trend() {
        let p = projector();
        let ratings = SkillRatings::from_fn(Role::Pitcher, |_| 55.0);
        let history = vec![season(2024, 150.0, 8.0, 3.0, 1.0), season(2023, 10.0, 11.0, 2.0, 0.5)];
        let out = p.project(&EnsembleInput {
            ratings: &ratings,
            age: 28,
            history: &history,
            sample: 160.0,
        });
        assert!(!out.trend_applied);
    }

    #[test]
    fn veteran_decline_extrapolates_heavily() {
        let p = projector();
        let ratings = SkillRatings::from_fn(Role::Pitcher, |_| 55.0);
        let history = vec![season(2024, 180.0, 7.0, 3.0, 1.0), season(2023, 180.0, 9.0, 3.0, 1.0)];
        let out = p.project(&EnsembleInput {
            ratings: &ratings,
            age: 32,
            history: &history,
            sample: 360.0,
        });
        assert!(out.trend_applied);
        let drop = out.neutral.get(Stat::K9) - out.pessimistic.get(Stat::K9);
        assert!(approx_eq(drop, 2.0 * 0.75, 1e-9));
    }

    #[test]
    fn young_aging_lifts_optimistic_model() {
        let p = projector();
        let ratings = SkillRatings::from_fn(Role::Pitcher, |_| 50.0);
        let out = p.project(&EnsembleInput {
            ratings: &ratings,
            age: 21,
            history: &[],
            sample: 0.0,
        });
        assert!(out.optimistic.get(Stat::K9) > out.neutral.get(Stat::K9));
        assert!(out.ratings.get(Skill::Stuff) > 50.0);
    }

    #[test]
    fn projected_line_is_weighted_rate_average() {
        let p = projector();
        let ratings = SkillRatings::from_fn(Role::Batter, |_| 60.0);
        let history = vec![
            SeasonRates {
                year: 2024,
                level: Level::Mlb,
                sample_size: 600.0,
                rates: RateLine::batting(0.10, 0.16, 0.05, 0.005, 0.04),
                starts: None,
                stolen_bases: 10,
                caught_stealing: 3,
            },
            SeasonRates {
                year: 2023,
                level: Level::Mlb,
                sample_size: 550.0,
                rates: RateLine::batting(0.09, 0.15, 0.05, 0.005, 0.03),
                starts: None,
                stolen_bases: 8,
                caught_stealing: 2,
            },
        ];
        let out = p.project(&EnsembleInput {
            ratings: &ratings,
            age: 29,
            history: &history,
            sample: 1150.0,
        });
        let w = out.weights;
        for (stat, v) in out.rates.iter() {
            let expected = w.optimistic * out.optimistic.get(stat)
                + w.neutral * out.neutral.get(stat)
                + w.pessimistic * out.pessimistic.get(stat);
            assert!(approx_eq(v, expected, 1e-12), "{stat:?}");
        }
    }
}

// Blend regressed performance rates with scouting-implied rates.

use serde::{Deserialize, Serialize};

use crate::config::BlendConfig;
use crate::converter::RatingConverter;
use crate::model::{RateLine, RatingSource, Role, ScoutingRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendOutcome {
    pub rates: RateLine,
    pub scout_weight: f64,
    pub source: RatingSource,
    /// Rates implied by the scouting grades, when a row was present.
    pub scouting_rates: Option<RateLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoutingBlender {
    config: BlendConfig,
    converter: RatingConverter,
}

impl ScoutingBlender {
    pub fn new(config: BlendConfig, converter: RatingConverter) -> Self {
        ScoutingBlender { config, converter }
    }

    /// Weight given to scouting: role and age base + development-gap bonus +
    /// small sample bonus, capped.
    pub fn scout_weight(&self, role: Role, age: u32, star_gap: f64, sample: f64) -> f64 {
        let c = &self.config;
        let base = c.base_by_age(role).eval(age as f64).clamp(0.0, 1.0);
        let gap = if star_gap.is_finite() { star_gap } else { 0.0 };
        let gap_bonus = (gap.clamp(0.0, c.gap_span) / c.gap_span) * c.gap_bonus;
        let k = c.sample_k(role);
        let sample = sample.max(0.0);
        let sample_bonus = if k + sample > 0.0 {
            k / (k + sample) * c.sample_bonus
        } else {
            0.0
        };
        (base + gap_bonus + sample_bonus).clamp(0.0, c.max_weight)
    }

    /// Blend `performance` with the scouting row's current grades. Without a
    /// row the performance line passes through with weight 0.
    pub fn blend(
        &self,
        performance: &RateLine,
        scouting: Option<&ScoutingRow>,
        age: u32,
        sample: f64,
    ) -> BlendOutcome {
        let Some(row) = scouting else {
            return BlendOutcome {
                rates: performance.clone(),
                scout_weight: 0.0,
                source: RatingSource::StatsOnly,
                scouting_rates: None,
            };
        };

        let role = performance.role();
        let scouting_rates = self
            .converter
            .rates_from_grades(role, |skill| row.grade(skill))
            .clamped();
        let w = self.scout_weight(role, age, row.star_gap(), sample);
        let rates = performance
            .zip_with(&scouting_rates, |stat, perf, scout| {
                stat.clamp(w * scout + (1.0 - w) * perf)
            });

        BlendOutcome {
            rates,
            scout_weight: w,
            source: RatingSource::Scouting,
            scouting_rates: Some(scouting_rates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ScoutSource, Skill, Stat};
    use std::collections::BTreeMap;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn blender() -> ScoutingBlender {
        ScoutingBlender::new(BlendConfig::default(), RatingConverter::default())
    }

    fn row(stuff: f64, current: Option<f64>, potential: Option<f64>) -> ScoutingRow {
        ScoutingRow {
            player_id: 1,
            source: ScoutSource::My,
            role: Role::Pitcher,
            grades: BTreeMap::from([(Skill::Stuff, stuff)]),
            potential: BTreeMap::new(),
            stamina: None,
            injury: None,
            current_stars: current,
            potential_stars: potential,
            repertoire: BTreeMap::new(),
        }
    }

    #[test]
    fn missing_row_is_stats_only() {
        let b = blender();
        let perf = RateLine::pitching(8.0, 3.0, 1.0);
        let out = b.blend(&perf, None, 24, 15.0);
        assert_eq!(out.scout_weight, 0.0);
        assert_eq!(out.source, RatingSource::StatsOnly);
        assert_eq!(out.rates, perf);
    }

    #[test]
    fn weight_is_capped() {
        let b = blender();
        let w = b.scout_weight(Role::Pitcher, 19, 10.0, 0.0);
        assert!(approx_eq(w, 0.75, 1e-12));
        let mut cfg = BlendConfig::default();
        cfg.sample_bonus = 0.5;
        let b = ScoutingBlender::new(cfg, RatingConverter::default());
        assert_eq!(b.scout_weight(Role::Pitcher, 19, 4.0, 0.0), 0.95);
    }

    #[test]
    fn more_sample_less_scouting() {
        let b = blender();
        let small = b.scout_weight(Role::Batter, 27, 0.0, 50.0);
        let large = b.scout_weight(Role::Batter, 27, 0.0, 1500.0);
        assert!(large < small);
    }

    #[test]
    fn batters_lean_on_scouting_more_at_same_age() {
        let b = blender();
        let pitcher = b.scout_weight(Role::Pitcher, 27, 0.0, 50_000.0);
        let batter = b.scout_weight(Role::Batter, 27, 0.0, 50_000.0);
        assert!(approx_eq(pitcher, 0.325, 1e-3));
        assert!(approx_eq(batter, 0.375, 1e-3));
    }

    #[test]
    fn larger_gap_more_scouting() {
        let b = blender();
        assert!(b.scout_weight(Role::Pitcher, 22, 2.0, 100.0) > b.scout_weight(Role::Pitcher, 22, 0.0, 100.0));
    }

    #[test]
    fn blend_moves_toward_scouting() {
        let b = blender();
        let perf = RateLine::pitching(7.0, 3.0, 1.0);
        let scout = row(70.0, Some(3.0), Some(3.0));
        let out = b.blend(&perf, Some(&scout), 28, 150.0);
        let implied = 2.07 + 0.074 * 70.0;
        let w = out.scout_weight;
        assert!(w > 0.0 && w < 1.0);
        assert!(approx_eq(out.rates.get(Stat::K9), w * implied + (1.0 - w) * 7.0, 1e-12));
        assert_eq!(out.source, RatingSource::Scouting);
    }

    #[test]
    fn missing_potential_means_no_gap() {
        let scout = row(55.0, Some(2.0), None);
        assert_eq!(scout.star_gap(), 0.0);
    }
}

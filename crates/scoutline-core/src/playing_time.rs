// Next-season innings / plate-appearance projection.

use serde::{Deserialize, Serialize};

use crate::aggregate::SeasonRates;
use crate::config::{PlayingTimeConfig, StaminaWorkload};
use crate::model::{InjuryGrade, RoleTier};

#[derive(Debug, Clone, Copy)]
pub struct PlayingTimeInput<'a> {
    pub tier: RoleTier,
    pub stamina: Option<f64>,
    pub injury: Option<InjuryGrade>,
    pub age: u32,
    /// MLB seasons, most recent first.
    pub history: &'a [SeasonRates],
    /// Projected value percentile within the player's tier.
    pub percentile: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayingTime {
    /// Stamina/role model workload.
    pub baseline: f64,
    /// Recency-weighted recent workload, if any history exists.
    pub historical: Option<f64>,
    pub history_weight: f64,
    /// Product of the skill, age, and injury multipliers.
    pub modifier: f64,
    /// Final rounded and clamped IP or PA.
    pub projected: f64,
}

fn stamina_workload(w: &StaminaWorkload, stamina: f64) -> f64 {
    (w.base + w.per_point * (stamina - w.pivot)).clamp(w.min, w.max)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayingTimeProjector {
    config: PlayingTimeConfig,
    recency_weights: Vec<f64>,
}

impl PlayingTimeProjector {
    pub fn new(config: PlayingTimeConfig, recency_weights: Vec<f64>) -> Self {
        PlayingTimeProjector {
            config,
            recency_weights,
        }
    }

    pub fn baseline(&self, tier: RoleTier, stamina: Option<f64>) -> f64 {
        let stamina = stamina
            .filter(|s| s.is_finite())
            .unwrap_or(self.config.default_stamina);
        match tier {
            RoleTier::Starter => stamina_workload(&self.config.starter, stamina),
            RoleTier::Reliever => stamina_workload(&self.config.reliever, stamina),
            RoleTier::Batter => self.config.batter_baseline_pa,
        }
    }

    /// Recency-weighted average workload over the aggregation window.
    pub fn historical(&self, history: &[SeasonRates]) -> Option<f64> {
        let mut weighted = 0.0;
        let mut total = 0.0;
        for (season, &w) in history.iter().zip(&self.recency_weights) {
            weighted += w * season.sample_size.max(0.0);
            total += w;
        }
        if total > 0.0 {
            Some(weighted / total)
        } else {
            None
        }
    }

    /// History weight grows with career sample toward its maximum.
    pub fn history_weight(&self, tier: RoleTier, career_sample: f64) -> f64 {
        let c = &self.config;
        let established = match tier {
            RoleTier::Starter => c.established_starter_ip,
            RoleTier::Reliever => c.established_reliever_ip,
            RoleTier::Batter => c.established_pa,
        };
        let depth = (career_sample.max(0.0) / established).min(1.0);
        c.history_weight_min + (c.history_weight_max - c.history_weight_min) * depth
    }

    fn age_factor(&self, age: u32) -> f64 {
        let c = &self.config;
        if age >= c.very_old_age {
            c.very_old_factor
        } else if age >= c.old_age {
            c.old_factor
        } else if age <= c.young_age {
            c.young_factor
        } else {
            1.0
        }
    }

    fn bounds(&self, tier: RoleTier) -> [f64; 2] {
        match tier {
            RoleTier::Starter => self.config.starter_bounds,
            RoleTier::Reliever => self.config.reliever_bounds,
            RoleTier::Batter => self.config.batter_bounds,
        }
    }

    pub fn project(&self, input: &PlayingTimeInput<'_>) -> PlayingTime {
        let baseline = self.baseline(input.tier, input.stamina);
        let historical = self.historical(input.history);
        let career: f64 = input.history.iter().map(|s| s.sample_size.max(0.0)).sum();
        let history_weight = match historical {
            Some(_) => self.history_weight(input.tier, career),
            None => 0.0,
        };
        let blended = match historical {
            Some(h) => history_weight * h + (1.0 - history_weight) * baseline,
            None => baseline,
        };

        let pct = if input.percentile.is_finite() {
            input.percentile.clamp(0.0, 100.0)
        } else {
            50.0
        };
        let skill = 1.0 + (pct - 50.0) / 50.0 * self.config.skill_swing;
        let injury = input.injury.map_or(1.0, |g| g.workload_multiplier());
        let modifier = skill * self.age_factor(input.age) * injury;

        let [lo, hi] = self.bounds(input.tier);
        let projected = (blended * modifier).round().clamp(lo, hi);

        PlayingTime {
            baseline,
            historical,
            history_weight,
            modifier,
            projected,
        }
    }
}

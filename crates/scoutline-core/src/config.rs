// Engine configuration: every tunable table the estimators read.
//
// All sections carry `#[serde(default)]` so a TOML file only needs to name
// the values it overrides. `EngineConfig::validate` is run once when a
// `RatingEngine` is constructed; after that the numeric paths never fail.

use serde::{Deserialize, Serialize};

use crate::aging::AgingModifierTable;
use crate::ensemble::EnsembleWeights;
use crate::error::{EngineError, Result};
use crate::interp::PiecewiseLinear;
use crate::model::{Level, PerSkill, PerStat, Role, Skill, Stat};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub converter: ConverterConfig,
    pub aggregation: AggregationConfig,
    pub roles: RoleInferenceConfig,
    pub regression: RegressionConfig,
    pub blend: BlendConfig,
    pub ranking: RankingConfig,
    pub aging: AgingModifierTable,
    pub ensemble: EnsembleConfig,
    pub playing_time: PlayingTimeConfig,
    pub future: FutureConfig,
}

impl EngineConfig {
    /// Check every table for values the estimators cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.converter.validate()?;
        self.aggregation.validate()?;
        self.regression.validate()?;
        self.blend.validate()?;
        self.ranking.validate()?;
        self.aging.validate()?;
        self.ensemble.validate()?;
        self.playing_time.validate()?;
        self.future.validate()?;
        Ok(())
    }
}

fn ensure_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::invalid(
            field,
            format!("must be a finite non-negative number, got {value}"),
        ));
    }
    Ok(())
}

fn ensure_unit(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(EngineError::invalid(
            field,
            format!("must be within [0, 1], got {value}"),
        ));
    }
    Ok(())
}

fn ensure_range(field: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(EngineError::invalid(
            field,
            format!("min ({min}) must not exceed max ({max})"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rating <-> rate conversion
// ---------------------------------------------------------------------------

/// `rate = intercept + slope * rating`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearMap {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearMap {
    pub const fn new(intercept: f64, slope: f64) -> Self {
        LinearMap { intercept, slope }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub coefficients: PerSkill<LinearMap>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            coefficients: PerSkill {
                stuff: LinearMap::new(2.07, 0.074),
                control: LinearMap::new(5.22, -0.052),
                hr_avoidance: LinearMap::new(2.08, -0.024),
                eye: LinearMap::new(0.020, 0.0012),
                contact: LinearMap::new(0.080, 0.0016),
                gap: LinearMap::new(0.018, 0.0006),
                speed: LinearMap::new(-0.002, 0.0001),
                power: LinearMap::new(-0.010, 0.0007),
            },
        }
    }
}

impl ConverterConfig {
    fn validate(&self) -> Result<()> {
        for skill in Skill::PITCHING.iter().chain(Skill::BATTING.iter()) {
            let map = self.coefficients.get(*skill);
            if !map.intercept.is_finite() || !map.slope.is_finite() {
                return Err(EngineError::invalid(
                    "converter.coefficients",
                    format!("{skill:?} coefficients must be finite"),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Aggregation and role inference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Recency weights, most recent season first. Also bounds how many
    /// seasons are combined.
    pub recency_weights: Vec<f64>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        AggregationConfig {
            recency_weights: vec![5.0, 3.0, 2.0],
        }
    }
}

impl AggregationConfig {
    fn validate(&self) -> Result<()> {
        if self.recency_weights.is_empty() {
            return Err(EngineError::invalid(
                "aggregation.recency_weights",
                "must contain at least one weight",
            ));
        }
        for w in &self.recency_weights {
            ensure_non_negative("aggregation.recency_weights", *w)?;
        }
        if self.recency_weights.iter().sum::<f64>() <= 0.0 {
            return Err(EngineError::invalid(
                "aggregation.recency_weights",
                "weights must not all be zero",
            ));
        }
        Ok(())
    }
}

/// Thresholds that classify a pitcher as a starter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleInferenceConfig {
    /// Average starts per aggregated season at which a pitcher is a starter.
    pub starter_min_starts: f64,
    /// Without starts history: minimum stamina grade for a starter.
    pub starter_min_stamina: f64,
    /// Without starts history: minimum count of usable pitches.
    pub starter_min_pitches: usize,
    /// Grade at which a repertoire pitch counts as usable.
    pub usable_pitch_grade: f64,
}

impl Default for RoleInferenceConfig {
    fn default() -> Self {
        RoleInferenceConfig {
            starter_min_starts: 5.0,
            starter_min_stamina: 45.0,
            starter_min_pitches: 3,
            usable_pitch_grade: 45.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Regression
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// Sample (IP or PA) at which a stat's observed rate and its target
    /// carry equal weight.
    pub stabilization: PerStat<f64>,
    /// Per-stat multiplier applied to the composite offset when moving the
    /// regression target away from league average.
    pub target_ratio: PerStat<f64>,
    /// Sample at which the confidence factor reaches 1.0.
    pub confidence_sample: f64,
    /// Composite edge (league FIP − FIP) → target offset.
    pub pitcher_offset: PiecewiseLinear,
    /// Composite edge (league FIP − FIP) → stabilization multiplier.
    pub pitcher_strength: PiecewiseLinear,
    /// Composite edge (wOBA − league wOBA) → target offset.
    pub batter_offset: PiecewiseLinear,
    /// Composite edge (wOBA − league wOBA) → stabilization multiplier.
    pub batter_strength: PiecewiseLinear,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        RegressionConfig {
            stabilization: PerStat {
                k9: 50.0,
                bb9: 60.0,
                hr9: 160.0,
                bb_rate: 120.0,
                single_rate: 600.0,
                double_rate: 700.0,
                triple_rate: 900.0,
                hr_rate: 170.0,
            },
            target_ratio: PerStat {
                k9: 1.2,
                bb9: 0.6,
                hr9: 0.2,
                bb_rate: 0.35,
                single_rate: 0.5,
                double_rate: 0.2,
                triple_rate: 0.02,
                hr_rate: 0.12,
            },
            confidence_sample: 100.0,
            pitcher_offset: PiecewiseLinear::new(vec![
                [-1.5, -0.6],
                [-0.75, -0.35],
                [-0.25, -0.1],
                [0.0, 0.0],
            ]),
            pitcher_strength: PiecewiseLinear::new(vec![
                [-1.5, 0.75],
                [-0.5, 1.0],
                [0.5, 1.0],
                [1.5, 1.25],
            ]),
            batter_offset: PiecewiseLinear::new(vec![
                [-0.06, -0.025],
                [-0.03, -0.012],
                [-0.01, -0.004],
                [0.0, 0.0],
            ]),
            batter_strength: PiecewiseLinear::new(vec![
                [-0.06, 0.75],
                [-0.02, 1.0],
                [0.02, 1.0],
                [0.06, 1.25],
            ]),
        }
    }
}

impl RegressionConfig {
    pub fn offset_table(&self, role: Role) -> &PiecewiseLinear {
        match role {
            Role::Pitcher => &self.pitcher_offset,
            Role::Batter => &self.batter_offset,
        }
    }

    pub fn strength_table(&self, role: Role) -> &PiecewiseLinear {
        match role {
            Role::Pitcher => &self.pitcher_strength,
            Role::Batter => &self.batter_strength,
        }
    }

    fn validate(&self) -> Result<()> {
        for stat in Stat::PITCHING.iter().chain(Stat::BATTING.iter()) {
            ensure_non_negative("regression.stabilization", self.stabilization.get(*stat))?;
            ensure_non_negative("regression.target_ratio", self.target_ratio.get(*stat))?;
        }
        if !(self.confidence_sample > 0.0) {
            return Err(EngineError::invalid(
                "regression.confidence_sample",
                "must be positive",
            ));
        }
        self.pitcher_offset.validate("regression.pitcher_offset")?;
        self.pitcher_strength.validate("regression.pitcher_strength")?;
        self.batter_offset.validate("regression.batter_offset")?;
        self.batter_strength.validate("regression.batter_strength")?;
        for (field, table) in [
            ("regression.pitcher_strength", &self.pitcher_strength),
            ("regression.batter_strength", &self.batter_strength),
        ] {
            if table.points().iter().any(|p| p[1] < 0.0) {
                return Err(EngineError::invalid(field, "multipliers must be non-negative"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scouting blend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Age → base scouting weight for pitchers.
    pub pitcher_base_by_age: PiecewiseLinear,
    /// Age → base scouting weight for batters. Batting rates stabilize
    /// slower, so grades carry a little more weight at every age.
    pub batter_base_by_age: PiecewiseLinear,
    /// Bonus at a full star gap.
    pub gap_bonus: f64,
    /// Star gap at which the gap bonus is fully earned.
    pub gap_span: f64,
    /// Bonus with zero sample, decaying as k / (k + sample).
    pub sample_bonus: f64,
    pub sample_k_ip: f64,
    pub sample_k_pa: f64,
    pub max_weight: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        BlendConfig {
            pitcher_base_by_age: PiecewiseLinear::new(vec![
                [23.0, 0.45],
                [26.0, 0.35],
                [30.0, 0.25],
                [33.0, 0.20],
            ]),
            batter_base_by_age: PiecewiseLinear::new(vec![
                [23.0, 0.50],
                [26.0, 0.40],
                [30.0, 0.30],
                [33.0, 0.25],
            ]),
            gap_bonus: 0.15,
            gap_span: 4.0,
            sample_bonus: 0.15,
            sample_k_ip: 50.0,
            sample_k_pa: 200.0,
            max_weight: 0.95,
        }
    }
}

impl BlendConfig {
    pub fn base_by_age(&self, role: Role) -> &PiecewiseLinear {
        match role {
            Role::Pitcher => &self.pitcher_base_by_age,
            Role::Batter => &self.batter_base_by_age,
        }
    }

    pub fn sample_k(&self, role: Role) -> f64 {
        match role {
            Role::Pitcher => self.sample_k_ip,
            Role::Batter => self.sample_k_pa,
        }
    }

    fn validate(&self) -> Result<()> {
        for (field, table) in [
            ("blend.pitcher_base_by_age", &self.pitcher_base_by_age),
            ("blend.batter_base_by_age", &self.batter_base_by_age),
        ] {
            table.validate(field)?;
            if table.points().iter().any(|p| !(0.0..=1.0).contains(&p[1])) {
                return Err(EngineError::invalid(field, "weights must be within [0, 1]"));
            }
        }
        ensure_non_negative("blend.gap_bonus", self.gap_bonus)?;
        ensure_non_negative("blend.sample_bonus", self.sample_bonus)?;
        ensure_non_negative("blend.sample_k_ip", self.sample_k_ip)?;
        ensure_non_negative("blend.sample_k_pa", self.sample_k_pa)?;
        if !(self.gap_span > 0.0) {
            return Err(EngineError::invalid("blend.gap_span", "must be positive"));
        }
        ensure_unit("blend.max_weight", self.max_weight)
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Percentile at or above which a player earns `stars`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarBin {
    pub min_percentile: f64,
    pub stars: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Highest threshold first.
    pub star_bins: Vec<StarBin>,
    /// Stars for a percentile below every bin.
    pub floor_stars: f64,
    /// Pools smaller than this are ranked but flagged low-confidence.
    pub min_pool_size: usize,
    pub starter_min_ip: f64,
    pub reliever_min_ip: f64,
    pub batter_min_pa: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        let bins = [
            (97.7, 5.0),
            (93.3, 4.5),
            (84.1, 4.0),
            (69.1, 3.5),
            (50.0, 3.0),
            (30.9, 2.5),
            (15.9, 2.0),
            (6.7, 1.5),
            (2.3, 1.0),
        ];
        RankingConfig {
            star_bins: bins
                .iter()
                .map(|&(min_percentile, stars)| StarBin {
                    min_percentile,
                    stars,
                })
                .collect(),
            floor_stars: 0.5,
            min_pool_size: 20,
            starter_min_ip: 40.0,
            reliever_min_ip: 20.0,
            batter_min_pa: 150.0,
        }
    }
}

fn is_half_star(stars: f64) -> bool {
    (0.5..=5.0).contains(&stars) && (stars * 2.0).fract() == 0.0
}

impl RankingConfig {
    fn validate(&self) -> Result<()> {
        if self.star_bins.is_empty() {
            return Err(EngineError::invalid(
                "ranking.star_bins",
                "must contain at least one bin",
            ));
        }
        for pair in self.star_bins.windows(2) {
            if pair[1].min_percentile >= pair[0].min_percentile {
                return Err(EngineError::invalid(
                    "ranking.star_bins",
                    "thresholds must be strictly descending",
                ));
            }
            if pair[1].stars > pair[0].stars {
                return Err(EngineError::invalid(
                    "ranking.star_bins",
                    "stars must not increase as thresholds fall",
                ));
            }
        }
        for bin in &self.star_bins {
            if !(0.0..=100.0).contains(&bin.min_percentile) {
                return Err(EngineError::invalid(
                    "ranking.star_bins",
                    format!("threshold {} outside [0, 100]", bin.min_percentile),
                ));
            }
            if !is_half_star(bin.stars) {
                return Err(EngineError::invalid(
                    "ranking.star_bins",
                    format!("{} is not a half-star value in [0.5, 5.0]", bin.stars),
                ));
            }
        }
        if !is_half_star(self.floor_stars) {
            return Err(EngineError::invalid(
                "ranking.floor_stars",
                "must be a half-star value in [0.5, 5.0]",
            ));
        }
        if self.star_bins.iter().any(|b| b.stars < self.floor_stars) {
            return Err(EngineError::invalid(
                "ranking.floor_stars",
                "must not exceed the lowest bin",
            ));
        }
        if self.min_pool_size == 0 {
            return Err(EngineError::invalid("ranking.min_pool_size", "must be at least 1"));
        }
        ensure_non_negative("ranking.starter_min_ip", self.starter_min_ip)?;
        ensure_non_negative("ranking.reliever_min_ip", self.reliever_min_ip)?;
        ensure_non_negative("ranking.batter_min_pa", self.batter_min_pa)
    }
}

// ---------------------------------------------------------------------------
// Ensemble
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub base_weights: EnsembleWeights,
    /// Fraction of the full aging delta used by the neutral model.
    pub neutral_damping: f64,
    pub peak_age: f64,
    /// Optimistic weight gained per year below peak age.
    pub age_slope: f64,
    pub max_age_adjustment: f64,
    /// Weight moved out of the optimistic model between zero and full
    /// sample confidence.
    pub sample_swing: f64,
    pub full_confidence_ip: f64,
    pub full_confidence_pa: f64,
    /// Minimum prior-season sample for the trend model.
    pub trend_min_ip: f64,
    pub trend_min_pa: f64,
    /// Recent-season sample at which the trend is trusted fully.
    pub trend_full_ip: f64,
    pub trend_full_pa: f64,
    pub trend_damping: TrendDamping,
}

/// Fraction of the year-over-year delta the pessimistic model extrapolates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendDamping {
    pub veteran_age: f64,
    pub young_age: f64,
    pub worsening_veteran: f64,
    pub worsening: f64,
    pub improving_young: f64,
    pub improving: f64,
}

impl Default for TrendDamping {
    fn default() -> Self {
        TrendDamping {
            veteran_age: 30.0,
            young_age: 26.0,
            worsening_veteran: 0.75,
            worsening: 0.5,
            improving_young: 0.5,
            improving: 0.25,
        }
    }
}

impl TrendDamping {
    pub fn factor(&self, age: f64, worsening: bool) -> f64 {
        match (worsening, age >= self.veteran_age, age < self.young_age) {
            (true, true, _) => self.worsening_veteran,
            (true, false, _) => self.worsening,
            (false, _, true) => self.improving_young,
            (false, _, false) => self.improving,
        }
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            base_weights: EnsembleWeights {
                optimistic: 0.35,
                neutral: 0.45,
                pessimistic: 0.20,
            },
            neutral_damping: 0.20,
            peak_age: 27.0,
            age_slope: 0.02,
            max_age_adjustment: 0.15,
            sample_swing: 0.40,
            full_confidence_ip: 300.0,
            full_confidence_pa: 1200.0,
            trend_min_ip: 30.0,
            trend_min_pa: 120.0,
            trend_full_ip: 150.0,
            trend_full_pa: 550.0,
            trend_damping: TrendDamping::default(),
        }
    }
}

impl EnsembleConfig {
    pub fn full_confidence(&self, role: Role) -> f64 {
        match role {
            Role::Pitcher => self.full_confidence_ip,
            Role::Batter => self.full_confidence_pa,
        }
    }

    pub fn trend_min(&self, role: Role) -> f64 {
        match role {
            Role::Pitcher => self.trend_min_ip,
            Role::Batter => self.trend_min_pa,
        }
    }

    pub fn trend_full(&self, role: Role) -> f64 {
        match role {
            Role::Pitcher => self.trend_full_ip,
            Role::Batter => self.trend_full_pa,
        }
    }

    fn validate(&self) -> Result<()> {
        let w = self.base_weights;
        for value in [w.optimistic, w.neutral, w.pessimistic] {
            ensure_non_negative("ensemble.base_weights", value)?;
        }
        if w.optimistic + w.neutral + w.pessimistic <= 0.0 {
            return Err(EngineError::invalid(
                "ensemble.base_weights",
                "weights must not all be zero",
            ));
        }
        ensure_unit("ensemble.neutral_damping", self.neutral_damping)?;
        ensure_non_negative("ensemble.age_slope", self.age_slope)?;
        ensure_non_negative("ensemble.max_age_adjustment", self.max_age_adjustment)?;
        ensure_non_negative("ensemble.sample_swing", self.sample_swing)?;
        for (field, value) in [
            ("ensemble.full_confidence_ip", self.full_confidence_ip),
            ("ensemble.full_confidence_pa", self.full_confidence_pa),
            ("ensemble.trend_full_ip", self.trend_full_ip),
            ("ensemble.trend_full_pa", self.trend_full_pa),
        ] {
            if !(value > 0.0) {
                return Err(EngineError::invalid(field, "must be positive"));
            }
        }
        ensure_non_negative("ensemble.trend_min_ip", self.trend_min_ip)?;
        ensure_non_negative("ensemble.trend_min_pa", self.trend_min_pa)?;
        let d = self.trend_damping;
        for value in [d.worsening_veteran, d.worsening, d.improving_young, d.improving] {
            ensure_unit("ensemble.trend_damping", value)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Playing time
// ---------------------------------------------------------------------------

/// `base + per_point * (stamina - pivot)`, clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaminaWorkload {
    pub base: f64,
    pub pivot: f64,
    pub per_point: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayingTimeConfig {
    pub starter: StaminaWorkload,
    pub reliever: StaminaWorkload,
    pub batter_baseline_pa: f64,
    /// Stamina assumed when scouting has none.
    pub default_stamina: f64,
    /// History weight for a player with no track record.
    pub history_weight_min: f64,
    /// History weight for an established player.
    pub history_weight_max: f64,
    /// Career sample at which a player counts as established.
    pub established_starter_ip: f64,
    pub established_reliever_ip: f64,
    pub established_pa: f64,
    /// Playing-time change per 50 percentile points of projected value.
    pub skill_swing: f64,
    pub young_age: u32,
    pub young_factor: f64,
    pub old_age: u32,
    pub old_factor: f64,
    pub very_old_age: u32,
    pub very_old_factor: f64,
    pub starter_bounds: [f64; 2],
    pub reliever_bounds: [f64; 2],
    pub batter_bounds: [f64; 2],
}

impl Default for PlayingTimeConfig {
    fn default() -> Self {
        PlayingTimeConfig {
            starter: StaminaWorkload {
                base: 100.0,
                pivot: 40.0,
                per_point: 3.0,
                min: 110.0,
                max: 210.0,
            },
            reliever: StaminaWorkload {
                base: 45.0,
                pivot: 30.0,
                per_point: 0.5,
                min: 40.0,
                max: 75.0,
            },
            batter_baseline_pa: 550.0,
            default_stamina: 50.0,
            history_weight_min: 0.35,
            history_weight_max: 0.80,
            established_starter_ip: 400.0,
            established_reliever_ip: 150.0,
            established_pa: 1500.0,
            skill_swing: 0.08,
            young_age: 21,
            young_factor: 0.92,
            old_age: 33,
            old_factor: 0.94,
            very_old_age: 36,
            very_old_factor: 0.85,
            starter_bounds: [60.0, 230.0],
            reliever_bounds: [20.0, 90.0],
            batter_bounds: [100.0, 700.0],
        }
    }
}

impl PlayingTimeConfig {
    fn validate(&self) -> Result<()> {
        ensure_range("playing_time.starter", self.starter.min, self.starter.max)?;
        ensure_range("playing_time.reliever", self.reliever.min, self.reliever.max)?;
        ensure_range(
            "playing_time.starter_bounds",
            self.starter_bounds[0],
            self.starter_bounds[1],
        )?;
        ensure_range(
            "playing_time.reliever_bounds",
            self.reliever_bounds[0],
            self.reliever_bounds[1],
        )?;
        ensure_range(
            "playing_time.batter_bounds",
            self.batter_bounds[0],
            self.batter_bounds[1],
        )?;
        ensure_unit("playing_time.history_weight_min", self.history_weight_min)?;
        ensure_unit("playing_time.history_weight_max", self.history_weight_max)?;
        ensure_non_negative("playing_time.batter_baseline_pa", self.batter_baseline_pa)?;
        ensure_non_negative("playing_time.skill_swing", self.skill_swing)?;
        for (field, value) in [
            ("playing_time.established_starter_ip", self.established_starter_ip),
            ("playing_time.established_reliever_ip", self.established_reliever_ip),
            ("playing_time.established_pa", self.established_pa),
        ] {
            if !(value > 0.0) {
                return Err(EngineError::invalid(field, "must be positive"));
            }
        }
        for (field, value) in [
            ("playing_time.young_factor", self.young_factor),
            ("playing_time.old_factor", self.old_factor),
            ("playing_time.very_old_factor", self.very_old_factor),
        ] {
            ensure_non_negative(field, value)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Prospects
// ---------------------------------------------------------------------------

/// Additive per-stat adjustments translating minor-league rates to MLB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelAdjustments {
    pub aaa: PerStat<f64>,
    pub aa: PerStat<f64>,
    pub a: PerStat<f64>,
    pub rookie: PerStat<f64>,
}

impl LevelAdjustments {
    /// Adjustment for `level`; MLB rates need none.
    pub fn for_level(&self, level: Level) -> PerStat<f64> {
        match level {
            Level::Mlb => PerStat::default(),
            Level::Aaa => self.aaa,
            Level::Aa => self.aa,
            Level::A => self.a,
            Level::Rookie => self.rookie,
        }
    }
}

impl Default for LevelAdjustments {
    fn default() -> Self {
        let level = |k9, bb9, hr9, bat: f64| PerStat {
            k9,
            bb9,
            hr9,
            bb_rate: -0.004 * bat,
            single_rate: -0.008 * bat,
            double_rate: -0.002 * bat,
            triple_rate: 0.0,
            hr_rate: -0.004 * bat,
        };
        LevelAdjustments {
            aaa: level(0.30, -0.42, 0.14, 1.0),
            aa: level(0.33, -0.47, 0.06, 1.5),
            a: level(0.22, -0.59, 0.07, 2.0),
            rookie: level(0.45, -0.58, 0.06, 2.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FutureConfig {
    pub level_adjustments: LevelAdjustments,
    pub base_weight: f64,
    pub gap_bonus: f64,
    pub gap_span: f64,
    pub sample_bonus: f64,
    pub sample_k_ip: f64,
    pub sample_k_pa: f64,
    /// Age at which the age adjustment is zero.
    pub age_pivot: f64,
    pub age_slope: f64,
    pub age_min: f64,
    pub age_max: f64,
    pub max_weight: f64,
    /// Players below this MLB career sample get a future rating.
    pub prospect_max_mlb_ip: f64,
    pub prospect_max_mlb_pa: f64,
}

impl Default for FutureConfig {
    fn default() -> Self {
        FutureConfig {
            level_adjustments: LevelAdjustments::default(),
            base_weight: 0.65,
            gap_bonus: 0.15,
            gap_span: 4.0,
            sample_bonus: 0.15,
            sample_k_ip: 50.0,
            sample_k_pa: 200.0,
            age_pivot: 24.0,
            age_slope: 0.02,
            age_min: -0.10,
            age_max: 0.05,
            max_weight: 0.95,
            prospect_max_mlb_ip: 50.0,
            prospect_max_mlb_pa: 130.0,
        }
    }
}

impl FutureConfig {
    pub fn sample_k(&self, role: Role) -> f64 {
        match role {
            Role::Pitcher => self.sample_k_ip,
            Role::Batter => self.sample_k_pa,
        }
    }

    pub fn prospect_max_mlb(&self, role: Role) -> f64 {
        match role {
            Role::Pitcher => self.prospect_max_mlb_ip,
            Role::Batter => self.prospect_max_mlb_pa,
        }
    }

    fn validate(&self) -> Result<()> {
        ensure_unit("future.base_weight", self.base_weight)?;
        ensure_unit("future.max_weight", self.max_weight)?;
        ensure_non_negative("future.gap_bonus", self.gap_bonus)?;
        ensure_non_negative("future.sample_bonus", self.sample_bonus)?;
        ensure_non_negative("future.sample_k_ip", self.sample_k_ip)?;
        ensure_non_negative("future.sample_k_pa", self.sample_k_pa)?;
        if !(self.gap_span > 0.0) {
            return Err(EngineError::invalid("future.gap_span", "must be positive"));
        }
        ensure_range("future.age_min", self.age_min, self.age_max)?;
        ensure_non_negative("future.prospect_max_mlb_ip", self.prospect_max_mlb_ip)?;
        ensure_non_negative("future.prospect_max_mlb_pa", self.prospect_max_mlb_pa)
    }
}

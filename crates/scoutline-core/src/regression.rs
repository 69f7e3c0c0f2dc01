// Regression to the mean toward tiered, performance-dependent targets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RegressionConfig;
use crate::league::LeagueContext;
use crate::model::{RateLine, Role, Stat};
use crate::value;

/// Shrink `weighted` toward `target` with stabilization constant `k`:
/// `(weighted·n + target·k) / (n + k)`. A zero sample returns the target
/// exactly.
pub fn regress_rate(weighted: f64, sample: f64, target: f64, k: f64) -> f64 {
    if sample <= 0.0 || !weighted.is_finite() {
        return target;
    }
    let k = k.max(0.0);
    let denom = sample + k;
    if denom <= 0.0 {
        return target;
    }
    (weighted * sample + target * k) / denom
}

/// Result of regressing one rate line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionOutcome {
    pub rates: RateLine,
    pub targets: RateLine,
    /// Composite edge over league average; positive means better.
    pub edge: f64,
    pub target_offset: f64,
    pub strength: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionEngine {
    config: RegressionConfig,
}

impl RegressionEngine {
    pub fn new(config: RegressionConfig) -> Self {
        RegressionEngine { config }
    }

    /// Sample-size confidence rescaled into [0.5, 1.0].
    pub fn confidence(&self, sample: f64) -> f64 {
        let raw = (sample.max(0.0) / self.config.confidence_sample).min(1.0);
        0.5 + 0.5 * raw
    }

    /// Sign-normalised skill edge of a rate line over league average.
    pub fn composite_edge(&self, rates: &RateLine, league: &LeagueContext) -> f64 {
        match rates.role() {
            Role::Pitcher => league.league_fip - value::fip(rates, league.fip_constant),
            Role::Batter => value::woba(rates, &league.woba_weights) - league.league_woba,
        }
    }

    /// Regression target for one stat given the composite offset.
    pub fn target(&self, stat: Stat, offset: f64, league: &LeagueContext) -> f64 {
        let sign = if stat.higher_is_better() { 1.0 } else { -1.0 };
        let target = league.league_rate(stat) + sign * offset * self.config.target_ratio.get(stat);
        stat.clamp(target)
    }

    /// Regress an aggregated rate line backed by `sample` innings or PA.
    pub fn regress(&self, weighted: &RateLine, sample: f64, league: &LeagueContext) -> RegressionOutcome {
        let role = weighted.role();
        let edge = self.composite_edge(weighted, league);
        let edge = if edge.is_finite() { edge } else { 0.0 };
        let target_offset = self.config.offset_table(role).eval(edge);
        let strength = self.config.strength_table(role).eval(edge);
        let confidence = self.confidence(sample);

        let targets = RateLine::from_fn(role, |stat| self.target(stat, target_offset, league));
        let rates = weighted.zip_with(&targets, |stat, observed, target| {
            let k = self.config.stabilization.get(stat) * strength * confidence;
            stat.clamp(regress_rate(observed, sample, target, k))
        });

        debug!(
            ?role,
            edge,
            target_offset,
            strength,
            confidence,
            sample,
            "regressed rate line"
        );

        RegressionOutcome {
            rates,
            targets,
            edge,
            target_offset,
            strength,
            confidence,
        }
    }
}

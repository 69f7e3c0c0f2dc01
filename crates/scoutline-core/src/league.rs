// Per-season league context: FIP constant, league averages, linear weights,
// and replacement baselines.
//
// Normally computed by a collaborator and handed to the engine read-only;
// `LeagueContext::from_seasons` derives one from raw stat rows for callers
// that have none.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{BattingSeason, PerStat, PitchingSeason, RateLine, Role, Stat};

/// FIP constant used when no qualified pitchers are available to derive one.
pub const DEFAULT_FIP_CONSTANT: f64 = 3.47;

/// Linear weights for wOBA, per event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WobaWeights {
    pub bb: f64,
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub hr: f64,
}

impl Default for WobaWeights {
    fn default() -> Self {
        WobaWeights {
            bb: 0.69,
            single: 0.89,
            double: 1.27,
            triple: 1.62,
            hr: 2.10,
        }
    }
}

/// Replacement level for one innings-pitched bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitcherReplacement {
    pub fip: f64,
    pub runs_per_win: f64,
}

/// Replacement baselines for WAR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplacementLevels {
    pub starter: PitcherReplacement,
    pub swingman: PitcherReplacement,
    pub reliever: PitcherReplacement,
    /// Innings at or above which a pitcher is valued as a starter.
    pub starter_min_ip: f64,
    /// Innings at or above which a non-starter is valued as a swingman.
    pub swingman_min_ip: f64,
    /// Runs a replacement batter gives up per 600 PA.
    pub batter_runs_per_600: f64,
}

impl Default for ReplacementLevels {
    fn default() -> Self {
        ReplacementLevels {
            starter: PitcherReplacement {
                fip: 5.20,
                runs_per_win: 9.0,
            },
            swingman: PitcherReplacement {
                fip: 4.95,
                runs_per_win: 9.5,
            },
            reliever: PitcherReplacement {
                fip: 4.70,
                runs_per_win: 10.0,
            },
            starter_min_ip: 130.0,
            swingman_min_ip: 70.0,
            batter_runs_per_600: 20.0,
        }
    }
}

/// Read-only per-season environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueContext {
    pub season: u16,
    pub fip_constant: f64,
    pub league_era: f64,
    pub league_fip: f64,
    /// League-average rate for every stat.
    pub rates: PerStat<f64>,
    pub league_woba: f64,
    pub woba_scale: f64,
    pub woba_weights: WobaWeights,
    /// Runs per win for batter WAR.
    pub runs_per_win: f64,
    pub stolen_base_runs: f64,
    pub caught_stealing_runs: f64,
    pub replacement: ReplacementLevels,
}

impl Default for LeagueContext {
    fn default() -> Self {
        let rates = PerStat {
            k9: 7.5,
            bb9: 3.0,
            hr9: 1.0,
            bb_rate: 0.085,
            single_rate: 0.150,
            double_rate: 0.045,
            triple_rate: 0.004,
            hr_rate: 0.028,
        };
        let woba_weights = WobaWeights::default();
        let mut ctx = LeagueContext {
            season: 0,
            fip_constant: DEFAULT_FIP_CONSTANT,
            league_era: 0.0,
            league_fip: 0.0,
            rates,
            league_woba: 0.0,
            woba_scale: 1.20,
            woba_weights,
            runs_per_win: 10.0,
            stolen_base_runs: 0.2,
            caught_stealing_runs: -0.41,
            replacement: ReplacementLevels::default(),
        };
        ctx.league_fip = crate::value::fip(&ctx.league_rates(Role::Pitcher), ctx.fip_constant);
        ctx.league_era = ctx.league_fip;
        ctx.league_woba = crate::value::woba(&ctx.league_rates(Role::Batter), &ctx.woba_weights);
        ctx
    }
}

impl LeagueContext {
    /// League-average line for a role.
    pub fn league_rates(&self, role: Role) -> RateLine {
        RateLine::from_fn(role, |s| self.rates.get(s))
    }

    pub fn league_rate(&self, stat: Stat) -> f64 {
        self.rates.get(stat)
    }

    /// Derive a context for `season` from MLB stat rows of that season.
    ///
    /// League rates are sample-weighted (total events over total innings or
    /// PA). The FIP constant is chosen so that the mean FIP of qualified
    /// pitchers equals their mean ERA. Values not derivable from the rows
    /// (linear weights, replacement levels) keep their defaults.
    pub fn from_seasons(
        season: u16,
        pitching: &[PitchingSeason],
        batting: &[BattingSeason],
        min_qualified_ip: f64,
    ) -> LeagueContext {
        let mut ctx = LeagueContext {
            season,
            ..LeagueContext::default()
        };

        let pitchers: Vec<&PitchingSeason> = pitching
            .iter()
            .filter(|p| p.year == season && p.level.is_mlb() && p.ip > 0.0)
            .collect();
        let total_ip: f64 = pitchers.iter().map(|p| p.ip).sum();
        if total_ip > 0.0 {
            let per9 = |f: fn(&PitchingSeason) -> u32| {
                pitchers.iter().map(|p| f(p) as f64).sum::<f64>() * 9.0 / total_ip
            };
            ctx.rates.k9 = per9(|p| p.k);
            ctx.rates.bb9 = per9(|p| p.bb);
            ctx.rates.hr9 = per9(|p| p.hr);
            ctx.league_era = per9(|p| p.er);
        } else {
            warn!(season, "no MLB pitching rows; keeping default league pitching rates");
        }

        let qualified: Vec<PitchingSeason> = pitchers
            .iter()
            .filter(|p| p.ip >= min_qualified_ip)
            .map(|p| (*p).clone())
            .collect();
        ctx.fip_constant = compute_fip_constant(&qualified, min_qualified_ip);
        ctx.league_fip = crate::value::fip(&ctx.league_rates(Role::Pitcher), ctx.fip_constant);
        if total_ip <= 0.0 {
            ctx.league_era = ctx.league_fip;
        }

        let batters: Vec<&BattingSeason> = batting
            .iter()
            .filter(|b| b.year == season && b.level.is_mlb() && b.pa > 0)
            .collect();
        let total_pa: f64 = batters.iter().map(|b| b.pa as f64).sum();
        if total_pa > 0.0 {
            let per_pa = |f: fn(&BattingSeason) -> u32| {
                batters.iter().map(|b| f(b) as f64).sum::<f64>() / total_pa
            };
            ctx.rates.bb_rate = per_pa(|b| b.bb + b.hbp);
            ctx.rates.single_rate = per_pa(|b| b.singles());
            ctx.rates.double_rate = per_pa(|b| b.doubles);
            ctx.rates.triple_rate = per_pa(|b| b.triples);
            ctx.rates.hr_rate = per_pa(|b| b.hr);
        } else {
            warn!(season, "no MLB batting rows; keeping default league batting rates");
        }
        ctx.league_woba = crate::value::woba(&ctx.league_rates(Role::Batter), &ctx.woba_weights);

        ctx
    }
}

/// FIP constant such that mean(FIP) over qualified pitchers equals mean(ERA)
/// over the same pitchers. Falls back to `DEFAULT_FIP_CONSTANT` when no
/// pitcher reaches `min_ip`.
pub fn compute_fip_constant(pitchers: &[PitchingSeason], min_ip: f64) -> f64 {
    let qualified: Vec<&PitchingSeason> = pitchers
        .iter()
        .filter(|p| p.ip > 0.0 && p.ip >= min_ip)
        .collect();
    if qualified.is_empty() {
        return DEFAULT_FIP_CONSTANT;
    }
    let n = qualified.len() as f64;
    let mean_era = qualified.iter().map(|p| p.era()).sum::<f64>() / n;
    let mean_raw_fip = qualified
        .iter()
        .map(|p| crate::value::raw_fip(&season_rates(p)))
        .sum::<f64>()
        / n;
    mean_era - mean_raw_fip
}

fn season_rates(p: &PitchingSeason) -> RateLine {
    RateLine::pitching(
        p.k as f64 * 9.0 / p.ip,
        p.bb as f64 * 9.0 / p.ip,
        p.hr as f64 * 9.0 / p.ip,
    )
}

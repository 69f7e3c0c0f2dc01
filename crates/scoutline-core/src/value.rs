// Value metrics: FIP and wOBA for ranking, WAR for projections.

use serde::{Deserialize, Serialize};

use crate::league::{LeagueContext, PitcherReplacement, WobaWeights};
use crate::model::{RateLine, Role, Stat};

/// FIP without the league constant: (13·HR + 3·BB − 2·K) / 9 on per-nine rates.
pub fn raw_fip(rates: &RateLine) -> f64 {
    (13.0 * rates.get(Stat::Hr9) + 3.0 * rates.get(Stat::Bb9) - 2.0 * rates.get(Stat::K9)) / 9.0
}

/// Fielding-independent pitching on the ERA scale.
pub fn fip(rates: &RateLine, fip_constant: f64) -> f64 {
    raw_fip(rates) + fip_constant
}

/// Weighted on-base average from per-PA event rates.
pub fn woba(rates: &RateLine, weights: &WobaWeights) -> f64 {
    weights.bb * rates.get(Stat::BbRate)
        + weights.single * rates.get(Stat::SingleRate)
        + weights.double * rates.get(Stat::DoubleRate)
        + weights.triple * rates.get(Stat::TripleRate)
        + weights.hr * rates.get(Stat::HrRate)
}

/// Ranking metric for a rate line: FIP for pitchers (lower is better), wOBA
/// for batters (higher is better).
pub fn value_metric(rates: &RateLine, league: &LeagueContext) -> f64 {
    match rates.role() {
        Role::Pitcher => fip(rates, league.fip_constant),
        Role::Batter => woba(rates, &league.woba_weights),
    }
}

/// Whether a larger value metric is better for `role`.
pub fn metric_higher_is_better(role: Role) -> bool {
    matches!(role, Role::Batter)
}

/// Innings bucket that selects the pitcher replacement baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitcherBucket {
    Starter,
    Swingman,
    Reliever,
}

impl PitcherBucket {
    pub fn from_ip(ip: f64, league: &LeagueContext) -> PitcherBucket {
        if ip >= league.replacement.starter_min_ip {
            PitcherBucket::Starter
        } else if ip >= league.replacement.swingman_min_ip {
            PitcherBucket::Swingman
        } else {
            PitcherBucket::Reliever
        }
    }

    pub fn replacement(self, league: &LeagueContext) -> PitcherReplacement {
        match self {
            PitcherBucket::Starter => league.replacement.starter,
            PitcherBucket::Swingman => league.replacement.swingman,
            PitcherBucket::Reliever => league.replacement.reliever,
        }
    }
}

/// Pitcher WAR over `ip` innings: runs saved against the bucket's
/// replacement FIP, converted to wins.
pub fn pitcher_war(fip: f64, ip: f64, league: &LeagueContext) -> f64 {
    if ip <= 0.0 {
        return 0.0;
    }
    let rep = PitcherBucket::from_ip(ip, league).replacement(league);
    if rep.runs_per_win <= 0.0 {
        return 0.0;
    }
    (rep.fip - fip) * ip / 9.0 / rep.runs_per_win
}

/// Batter WAR over `pa` plate appearances: batting runs above average plus
/// baserunning runs plus the replacement adjustment, converted to wins.
pub fn batter_war(
    woba: f64,
    pa: f64,
    sb_per_pa: f64,
    cs_per_pa: f64,
    league: &LeagueContext,
) -> f64 {
    if pa <= 0.0 || league.runs_per_win <= 0.0 || league.woba_scale <= 0.0 {
        return 0.0;
    }
    let batting_runs = (woba - league.league_woba) / league.woba_scale * pa;
    let baserunning = (sb_per_pa * league.stolen_base_runs + cs_per_pa * league.caught_stealing_runs) * pa;
    let replacement = league.replacement.batter_runs_per_600 * pa / 600.0;
    (batting_runs + baserunning + replacement) / league.runs_per_win
}

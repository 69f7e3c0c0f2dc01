// Peer-pool percentile ranking and the percentile → half-star mapping.
//
// A pool is sorted once when built; every lookup afterwards is a hash hit
// (members) or a binary search (outside values such as prospects).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

use crate::config::StarBin;
use crate::model::{PlayerId, RoleTier};

/// Whether a pool was large enough for its percentiles to be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolConfidence {
    Normal,
    Low,
}

/// A sorted same-season, same-tier peer pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerPool {
    tier: RoleTier,
    higher_is_better: bool,
    /// `(goodness, player_id)`, ascending. Goodness is the metric with its
    /// sign flipped when lower is better, so larger is always better.
    sorted: Vec<(f64, PlayerId)>,
    percentiles: HashMap<PlayerId, f64>,
}

fn cmp_entries(a: &(f64, PlayerId), b: &(f64, PlayerId)) -> Ordering {
    a.0.partial_cmp(&b.0)
        .unwrap_or(Ordering::Equal)
        .then(a.1.cmp(&b.1))
}

impl PeerPool {
    /// Build a pool from `(player, value metric)` entries. Non-finite values
    /// are dropped.
    pub fn build(
        tier: RoleTier,
        higher_is_better: bool,
        entries: impl IntoIterator<Item = (PlayerId, f64)>,
    ) -> Self {
        let sign = if higher_is_better { 1.0 } else { -1.0 };
        let mut sorted: Vec<(f64, PlayerId)> = Vec::new();
        for (id, metric) in entries {
            if !metric.is_finite() {
                warn!(player_id = id, tier = tier.label(), "dropping non-finite value metric from pool");
                continue;
            }
            sorted.push((metric * sign, id));
        }
        sorted.sort_by(cmp_entries);

        let mut pool = PeerPool {
            tier,
            higher_is_better,
            sorted,
            percentiles: HashMap::new(),
        };

        // Equal goodness shares one midrank percentile.
        let n = pool.sorted.len();
        let mut percentiles = HashMap::with_capacity(n);
        let mut i = 0;
        while i < n {
            let g = pool.sorted[i].0;
            let mut j = i;
            while j < n && pool.sorted[j].0 == g {
                j += 1;
            }
            let pct = pool.midrank(i, j - i);
            for &(_, id) in &pool.sorted[i..j] {
                percentiles.insert(id, pct);
            }
            i = j;
        }
        pool.percentiles = percentiles;
        pool
    }

    fn midrank(&self, below: usize, equal: usize) -> f64 {
        let n = self.sorted.len();
        if n == 0 {
            return 50.0;
        }
        ((below as f64 + 0.5 * equal as f64) / n as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn tier(&self) -> RoleTier {
        self.tier
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Percentile of a pool member, if present.
    pub fn percentile_of(&self, id: PlayerId) -> Option<f64> {
        self.percentiles.get(&id).copied()
    }

    /// Percentile a value metric would hold within this pool. An empty pool
    /// reads as the 50th percentile.
    pub fn percentile_of_value(&self, metric: f64) -> f64 {
        if !metric.is_finite() {
            return 50.0;
        }
        let g = if self.higher_is_better { metric } else { -metric };
        let below = self.sorted.partition_point(|e| e.0 < g);
        let through = self.sorted.partition_point(|e| e.0 <= g);
        self.midrank(below, through - below)
    }

    pub fn confidence(&self, min_size: usize) -> PoolConfidence {
        if self.len() < min_size {
            PoolConfidence::Low
        } else {
            PoolConfidence::Normal
        }
    }
}

/// Half-star value for a percentile. `bins` are ordered highest threshold
/// first; a percentile below every bin earns `floor`.
pub fn stars_for_percentile(percentile: f64, bins: &[StarBin], floor: f64) -> f64 {
    bins.iter()
        .find(|b| percentile >= b.min_percentile)
        .map(|b| b.stars)
        .unwrap_or(floor)
}

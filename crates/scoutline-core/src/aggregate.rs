// Multi-season rate aggregation with recency and sample-size weighting.

use serde::{Deserialize, Serialize};

use crate::model::{BattingSeason, Level, PitchingSeason, PlayerId, RateLine, Role, Stat};

// ---------------------------------------------------------------------------
// Season records
// ---------------------------------------------------------------------------

/// A single player-season the aggregator can consume.
pub trait SeasonRecord {
    fn player_id(&self) -> PlayerId;
    fn year(&self) -> u16;
    fn level(&self) -> Level;
    fn role(&self) -> Role;
    /// Innings pitched or plate appearances.
    fn sample_size(&self) -> f64;
    /// Per-9 or per-PA rates; all zero when the sample is zero.
    fn rates(&self) -> RateLine;
    /// Games started, for pitchers.
    fn starts(&self) -> Option<u32> {
        None
    }
    /// Stolen bases and times caught stealing, for batters.
    fn steals(&self) -> (u32, u32) {
        (0, 0)
    }
}

impl SeasonRecord for PitchingSeason {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn year(&self) -> u16 {
        self.year
    }

    fn level(&self) -> Level {
        self.level
    }

    fn role(&self) -> Role {
        Role::Pitcher
    }

    fn sample_size(&self) -> f64 {
        self.ip.max(0.0)
    }

    fn rates(&self) -> RateLine {
        if self.ip <= 0.0 {
            return RateLine::pitching(0.0, 0.0, 0.0);
        }
        let per9 = |n: u32| n as f64 * 9.0 / self.ip;
        RateLine::pitching(per9(self.k), per9(self.bb), per9(self.hr))
    }

    fn starts(&self) -> Option<u32> {
        Some(self.gs)
    }
}

impl SeasonRecord for BattingSeason {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn year(&self) -> u16 {
        self.year
    }

    fn level(&self) -> Level {
        self.level
    }

    fn role(&self) -> Role {
        Role::Batter
    }

    fn sample_size(&self) -> f64 {
        self.pa as f64
    }

    fn rates(&self) -> RateLine {
        if self.pa == 0 {
            return RateLine::batting(0.0, 0.0, 0.0, 0.0, 0.0);
        }
        let pa = self.pa as f64;
        RateLine::batting(
            (self.bb + self.hbp) as f64 / pa,
            self.singles() as f64 / pa,
            self.doubles as f64 / pa,
            self.triples as f64 / pa,
            self.hr as f64 / pa,
        )
    }

    fn steals(&self) -> (u32, u32) {
        (self.sb, self.cs)
    }
}

/// A season reduced to what the estimators need. Multiple stints in one year
/// are merged into one `SeasonRates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRates {
    pub year: u16,
    pub level: Level,
    pub sample_size: f64,
    pub rates: RateLine,
    pub starts: Option<u32>,
    pub stolen_bases: u32,
    pub caught_stealing: u32,
}

impl SeasonRates {
    pub fn from_record<R: SeasonRecord + ?Sized>(record: &R) -> Self {
        let (stolen_bases, caught_stealing) = record.steals();
        SeasonRates {
            year: record.year(),
            level: record.level(),
            sample_size: record.sample_size(),
            rates: record.rates(),
            starts: record.starts(),
            stolen_bases,
            caught_stealing,
        }
    }

    /// Fold another stint of the same year into this one, weighting rates by
    /// sample size.
    fn absorb(&mut self, other: &SeasonRates) {
        let total = self.sample_size + other.sample_size;
        if total > 0.0 {
            let (a, b) = (self.sample_size, other.sample_size);
            self.rates = self
                .rates
                .zip_with(&other.rates, |_, x, y| (x * a + y * b) / total);
        }
        self.sample_size = total;
        self.starts = match (self.starts, other.starts) {
            (Some(x), Some(y)) => Some(x + y),
            (x, y) => x.or(y),
        };
        self.stolen_bases += other.stolen_bases;
        self.caught_stealing += other.caught_stealing;
    }

    /// Build seasons from records, most recent first, merging stints that
    /// share a year.
    pub fn collect<'a, R, I>(records: I) -> Vec<SeasonRates>
    where
        R: SeasonRecord + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        Self::merge_years(records.into_iter().map(|r| SeasonRates::from_record(r)))
    }

    /// Merge entries sharing a year and order most recent first. The merged
    /// entry keeps the level of the first stint seen.
    pub fn merge_years(entries: impl IntoIterator<Item = SeasonRates>) -> Vec<SeasonRates> {
        let mut seasons: Vec<SeasonRates> = Vec::new();
        for season in entries {
            match seasons.iter_mut().find(|s| s.year == season.year) {
                Some(existing) => existing.absorb(&season),
                None => seasons.push(season),
            }
        }
        seasons.sort_by(|a, b| b.year.cmp(&a.year));
        seasons
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Combined multi-season rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRates {
    pub rates: RateLine,
    /// Total sample over the seasons used.
    pub sample_size: f64,
    /// Number of seasons used.
    pub seasons: usize,
    /// Average starts per season (pitchers only).
    pub avg_starts: Option<f64>,
    /// Stolen bases per PA (batters; 0 otherwise).
    pub sb_rate: f64,
    /// Caught stealing per PA (batters; 0 otherwise).
    pub cs_rate: f64,
}

impl AggregatedRates {
    /// True when no season carried any sample.
    pub fn is_empty(&self) -> bool {
        self.sample_size <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateAggregator {
    recency_weights: Vec<f64>,
}

impl RateAggregator {
    pub fn new(recency_weights: Vec<f64>) -> Self {
        RateAggregator { recency_weights }
    }

    /// How many seasons are combined at most.
    pub fn window(&self) -> usize {
        self.recency_weights.len()
    }

    /// Combine seasons (most recent first). Each season's weight is its
    /// recency weight times its sample size. When every weight is zero the
    /// league-average line is returned.
    pub fn combine(&self, seasons: &[SeasonRates], league: &RateLine) -> AggregatedRates {
        let used = &seasons[..seasons.len().min(self.window())];

        let mut total_weight = 0.0;
        let mut sums: Vec<(Stat, f64)> = league.iter().map(|(s, _)| (s, 0.0)).collect();
        for (season, &recency) in used.iter().zip(&self.recency_weights) {
            let w = recency * season.sample_size.max(0.0);
            if w <= 0.0 {
                continue;
            }
            total_weight += w;
            for (stat, sum) in sums.iter_mut() {
                *sum += season.rates.get(*stat) * w;
            }
        }

        let rates = if total_weight > 0.0 {
            RateLine::from_fn(league.role(), |stat| {
                sums.iter()
                    .find(|(s, _)| *s == stat)
                    .map(|(_, sum)| sum / total_weight)
                    .unwrap_or(0.0)
            })
        } else {
            league.clone()
        };

        let sample_size: f64 = used.iter().map(|s| s.sample_size.max(0.0)).sum();
        let start_counts: Vec<u32> = used.iter().filter_map(|s| s.starts).collect();
        let avg_starts = if start_counts.is_empty() {
            None
        } else {
            Some(start_counts.iter().sum::<u32>() as f64 / start_counts.len() as f64)
        };

        let (sb, cs) = used.iter().fold((0u32, 0u32), |(sb, cs), s| {
            (sb + s.stolen_bases, cs + s.caught_stealing)
        });
        let (sb_rate, cs_rate) = if sample_size > 0.0 && league.role() == Role::Batter {
            (sb as f64 / sample_size, cs as f64 / sample_size)
        } else {
            (0.0, 0.0)
        };

        AggregatedRates {
            rates,
            sample_size,
            seasons: used.len(),
            avg_starts,
            sb_rate,
            cs_rate,
        }
    }

    /// Collect and combine raw records in one step.
    pub fn aggregate<'a, R, I>(&self, records: I, league: &RateLine) -> AggregatedRates
    where
        R: SeasonRecord + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let seasons = SeasonRates::collect(records);
        self.combine(&seasons, league)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn season(year: u16, ip: f64, k9: f64) -> SeasonRates {
        SeasonRates {
            year,
            level: Level::Mlb,
            sample_size: ip,
            rates: RateLine::pitching(k9, 3.0, 1.0),
            starts: Some(30),
            stolen_bases: 0,
            caught_stealing: 0,
        }
    }

    fn league() -> RateLine {
        RateLine::pitching(7.5, 3.0, 1.0)
    }

    #[test]
    fn recency_and_sample_weighting() {
        let agg = RateAggregator::new(vec![5.0, 3.0, 2.0]);
        let seasons = vec![season(2024, 100.0, 10.0), season(2023, 200.0, 7.0)];
        let out = agg.combine(&seasons, &league());
        // (5*100*10 + 3*200*7) / (500 + 600)
        assert!(approx_eq(out.rates.get(Stat::K9), 9200.0 / 1100.0, 1e-12));
        assert_eq!(out.sample_size, 300.0);
        assert_eq!(out.seasons, 2);
        assert_eq!(out.avg_starts, Some(30.0));
    }

    #[test]
    fn zero_sample_seasons_contribute_nothing() {
        let agg = RateAggregator::new(vec![5.0, 3.0, 2.0]);
        let seasons = vec![season(2024, 0.0, 30.0), season(2023, 150.0, 8.0)];
        let out = agg.combine(&seasons, &league());
        assert!(approx_eq(out.rates.get(Stat::K9), 8.0, 1e-12));
    }

    #[test]
    fn all_zero_returns_league_average() {
        let agg = RateAggregator::new(vec![5.0, 3.0, 2.0]);
        let out = agg.combine(&[season(2024, 0.0, 12.0)], &league());
        assert_eq!(out.rates, league());
        assert!(out.is_empty());
        let out = agg.combine(&[], &league());
        assert_eq!(out.rates, league());
        assert_eq!(out.avg_starts, None);
    }

    #[test]
    fn window_limits_seasons_used() {
        let agg = RateAggregator::new(vec![1.0]);
        let seasons = vec![season(2024, 50.0, 9.0), season(2023, 200.0, 5.0)];
        let out = agg.combine(&seasons, &league());
        assert_eq!(out.seasons, 1);
        assert_eq!(out.rates.get(Stat::K9), 9.0);
    }

    #[test]
    fn split_stints_merge_by_year() {
        let rows = vec![
            PitchingSeason {
                player_id: 1,
                year: 2024,
                level: Level::Mlb,
                ip: 60.0,
                gs: 10,
                k: 60,
                bb: 20,
                hr: 6,
                er: 25,
            },
            PitchingSeason {
                player_id: 1,
                year: 2024,
                level: Level::Mlb,
                ip: 30.0,
                gs: 5,
                k: 15,
                bb: 10,
                hr: 3,
                er: 15,
            },
        ];
        let seasons = SeasonRates::collect(&rows);
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].sample_size, 90.0);
        assert_eq!(seasons[0].starts, Some(15));
        assert!(approx_eq(seasons[0].rates.get(Stat::K9), 75.0 * 9.0 / 90.0, 1e-12));
    }

    #[test]
    fn batting_rates_and_steals() {
        let row = BattingSeason {
            player_id: 7,
            year: 2024,
            level: Level::Mlb,
            pa: 600,
            ab: 540,
            h: 150,
            doubles: 30,
            triples: 3,
            hr: 24,
            bb: 50,
            hbp: 10,
            k: 120,
            sb: 20,
            cs: 5,
        };
        let rates = row.rates();
        assert!(approx_eq(rates.get(Stat::BbRate), 0.1, 1e-12));
        assert!(approx_eq(rates.get(Stat::SingleRate), 93.0 / 600.0, 1e-12));

        let agg = RateAggregator::new(vec![5.0, 3.0, 2.0]);
        let out = agg.aggregate([&row], &RateLine::batting(0.08, 0.15, 0.045, 0.004, 0.028));
        assert!(approx_eq(out.sb_rate, 20.0 / 600.0, 1e-12));
        assert!(approx_eq(out.cs_rate, 5.0 / 600.0, 1e-12));
        assert_eq!(out.avg_starts, None);
    }
}

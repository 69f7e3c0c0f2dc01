// JSON report assembly and writing.

use scoutline_core::model::{Player, PlayerId, Role, RoleTier};
use scoutline_core::{LeagueContext, Projection, SeasonRatings, TrueFutureRating, TrueRating};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub season: u16,
    pub target_season: u16,
    pub league: LeagueContext,
    pub pitchers: RoleReport,
    pub batters: RoleReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleReport {
    pub role: Role,
    pub ratings: Vec<TrueRating>,
    pub projections: Vec<Projection>,
    pub future: Vec<TrueFutureRating>,
    /// Best current ratings by percentile, then projected WAR.
    pub leaders: Vec<LeaderEntry>,
}

/// Condensed row for the top-N summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderEntry {
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub tier: RoleTier,
    pub stars: f64,
    pub percentile: f64,
    pub value_metric: f64,
    pub projected_war: Option<f64>,
}

impl RoleReport {
    pub fn new(
        current: SeasonRatings,
        projections: Vec<Projection>,
        future: Vec<TrueFutureRating>,
        players: &[Player],
        top_n: usize,
    ) -> Self {
        let leaders = leaders(&current.ratings, &projections, players, top_n);
        RoleReport {
            role: current.role,
            ratings: current.ratings,
            projections,
            future,
            leaders,
        }
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Top `n` qualified players by percentile, ties broken by projected WAR and
/// then id so the order is stable.
pub fn leaders(
    ratings: &[TrueRating],
    projections: &[Projection],
    players: &[Player],
    n: usize,
) -> Vec<LeaderEntry> {
    let war: HashMap<PlayerId, f64> = projections.iter().map(|p| (p.player_id, p.war)).collect();
    let names: HashMap<PlayerId, &str> = players.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut ranked: Vec<&TrueRating> = ratings.iter().filter(|r| r.qualified).collect();
    ranked.sort_by(|a, b| {
        b.percentile
            .total_cmp(&a.percentile)
            .then_with(|| {
                let wa = war.get(&a.player_id).copied().unwrap_or(f64::NEG_INFINITY);
                let wb = war.get(&b.player_id).copied().unwrap_or(f64::NEG_INFINITY);
                wb.total_cmp(&wa)
            })
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    ranked
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, r)| LeaderEntry {
            rank: i + 1,
            player_id: r.player_id,
            name: names.get(&r.player_id).copied().unwrap_or_default().to_string(),
            tier: r.tier,
            stars: r.stars,
            percentile: r.percentile,
            value_metric: r.value_metric,
            projected_war: war.get(&r.player_id).copied(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Write `report` as pretty JSON, creating parent directories as needed.
pub fn write_report(path: &Path, report: &Report) -> Result<(), ReportError> {
    let io_err = |e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutline_core::model::{RateLine, RatingSource, SkillRatings};
    use scoutline_core::percentile::PoolConfidence;

    fn rating(id: PlayerId, percentile: f64, qualified: bool) -> TrueRating {
        TrueRating {
            player_id: id,
            season: 2024,
            age: 27,
            role: Role::Batter,
            tier: RoleTier::Batter,
            ratings: SkillRatings::from_fn(Role::Batter, |_| 50.0),
            rates: RateLine::batting(0.085, 0.15, 0.045, 0.004, 0.028),
            value_metric: 0.320,
            percentile,
            stars: 3.0,
            scout_weight: 0.0,
            source: RatingSource::StatsOnly,
            pool_confidence: PoolConfidence::Normal,
            sample_size: 600.0,
            qualified,
            conditions: Vec::new(),
        }
    }

    fn player(id: PlayerId) -> Player {
        Player {
            id,
            name: format!("Player {id}"),
            role: Role::Batter,
            age: 27,
        }
    }

    #[test]
    fn leaders_sorted_by_percentile_and_skip_unqualified() {
        let ratings = vec![
            rating(1, 40.0, true),
            rating(2, 90.0, true),
            rating(3, 99.0, false),
            rating(4, 75.0, true),
        ];
        let players: Vec<Player> = (1..=4).map(player).collect();
        let top = leaders(&ratings, &[], &players, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].player_id, 2);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].name, "Player 2");
        assert_eq!(top[1].player_id, 4);
        assert_eq!(top[1].projected_war, None);
    }

    #[test]
    fn leaders_ties_break_on_id() {
        let ratings = vec![rating(9, 50.0, true), rating(3, 50.0, true)];
        let top = leaders(&ratings, &[], &[], 10);
        assert_eq!(top.iter().map(|e| e.player_id).collect::<Vec<_>>(), vec![3, 9]);
        assert_eq!(top[0].name, "");
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = std::env::temp_dir().join("scoutline_report_write");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested/report.json");
        let current = SeasonRatings {
            season: 2024,
            role: Role::Batter,
            ratings: vec![rating(1, 50.0, true)],
            pools: Default::default(),
        };
        let players = vec![player(1)];
        let batters = RoleReport::new(current, Vec::new(), Vec::new(), &players, 5);
        let pitchers = RoleReport::new(
            SeasonRatings {
                season: 2024,
                role: Role::Pitcher,
                ratings: Vec::new(),
                pools: Default::default(),
            },
            Vec::new(),
            Vec::new(),
            &players,
            5,
        );
        let report = Report {
            season: 2024,
            target_season: 2025,
            league: LeagueContext::default(),
            pitchers,
            batters,
        };
        write_report(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["season"], 2024);
        assert_eq!(value["batters"]["leaders"][0]["player_id"], 1);
        assert_eq!(value["batters"]["role"], "batter");
        let _ = std::fs::remove_dir_all(&dir);
    }
}

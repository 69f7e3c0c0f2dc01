// Library root: the batch runner that loads inputs, drives the engine for
// both roles, and writes the report. Exposed so integration tests can run
// the whole pipeline against fixture files.

pub mod config;
pub mod loaders;
pub mod report;

use anyhow::Context;
use config::{resolve, Config};
use loaders::LoadedData;
use report::{Report, RoleReport};
use scoutline_core::model::Role;
use scoutline_core::{InMemoryRepository, LeagueContext, RatingEngine};
use std::path::Path;
use tracing::info;

/// Rate, project, and write the report for one configured season.
/// Relative data and output paths resolve against `base_dir`.
pub fn run(base_dir: &Path, config: &Config) -> anyhow::Result<Report> {
    let data = loaders::load_all(base_dir, &config.data_paths).context("failed to load input data")?;
    info!(
        "Loaded {} players, {} pitching rows, {} batting rows, {} scouting rows",
        data.players.len(),
        data.pitching.len(),
        data.batting.len(),
        data.scouting.len()
    );

    let report = build_report(config, &data)?;

    let out = resolve(base_dir, &config.output.report);
    report::write_report(&out, &report).context("failed to write report")?;
    info!("Report written to {}", out.display());

    Ok(report)
}

/// Run the engine over already-loaded data.
pub fn build_report(config: &Config, data: &LoadedData) -> anyhow::Result<Report> {
    let season = config.run.season;
    let engine = RatingEngine::new(config.engine.clone()).context("invalid engine configuration")?;
    let league = data.league_context(season, config.run.min_qualified_ip);
    info!(
        "League {}: FIP constant {:.3}, league FIP {:.3}, league wOBA {:.3}",
        season, league.fip_constant, league.league_fip, league.league_woba
    );

    let repo = data.repository();
    let pitchers = role_report(&engine, &repo, Role::Pitcher, &league, data, config.output.top_n);
    let batters = role_report(&engine, &repo, Role::Batter, &league, data, config.output.top_n);

    Ok(Report {
        season,
        target_season: season.saturating_add(1),
        league,
        pitchers,
        batters,
    })
}

fn role_report(
    engine: &RatingEngine,
    repo: &InMemoryRepository,
    role: Role,
    league: &LeagueContext,
    data: &LoadedData,
    top_n: usize,
) -> RoleReport {
    let current = engine.rate_season(repo, role, league.season, league);
    let projections = engine.project_all(repo, &current, league);
    let future = engine.future_ratings(repo, &current, league);
    let section = RoleReport::new(current, projections, future, &data.players, top_n);

    for entry in &section.leaders {
        info!(
            "{:?} #{:<2} {:<24} {:<3} {:.1}* p{:.0} {:.3} WAR {}",
            role,
            entry.rank,
            entry.name,
            entry.tier.label(),
            entry.stars,
            entry.percentile,
            entry.value_metric,
            entry
                .projected_war
                .map(|w| format!("{w:.1}"))
                .unwrap_or_else(|| "-".into())
        );
    }
    section
}

// Batch runner entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load config (writing the default engine.toml on first run)
// 3. Load inputs, rate and project both roles
// 4. Write the report

use scoutline_app::config;

use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("scoutline starting up");

    // 2. Load config
    let base_dir = match std::env::args().nth(1) {
        Some(dir) => std::path::PathBuf::from(dir),
        None => std::env::current_dir().context("failed to resolve working directory")?,
    };
    let config = config::load_config(&base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: season {}, report {}",
        config.run.season, config.output.report
    );

    // 3-4. Rate, project, and write the report
    let report = scoutline_app::run(&base_dir, &config)?;
    info!(
        "Rated {} pitchers and {} batters; {} prospects with future ratings",
        report.pitchers.ratings.len(),
        report.batters.ratings.len(),
        report.pitchers.future.len() + report.batters.future.len()
    );

    info!("scoutline finished");
    Ok(())
}

/// Initialize tracing to stderr so the report path stays the only output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scoutline_app=info,scoutline_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

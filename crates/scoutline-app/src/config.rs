// Configuration loading and parsing (app.toml, engine.toml).

use scoutline_core::EngineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to write default config: {message}")]
    DefaultsWriteError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub run: RunConfig,
    pub data_paths: DataPaths,
    pub output: OutputConfig,
    pub engine: EngineConfig,
}

// ---------------------------------------------------------------------------
// app.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire app.toml file.
#[derive(Debug, Clone, Deserialize)]
struct AppFile {
    run: RunConfig,
    data_paths: DataPaths,
    output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Season to rate; projections target the following season.
    pub season: u16,
    /// Innings a pitcher needs to count toward a derived FIP constant.
    #[serde(default = "default_min_qualified_ip")]
    pub min_qualified_ip: f64,
}

fn default_min_qualified_ip() -> f64 {
    50.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    pub pitching: String,
    pub batting: String,
    pub scouting: String,
    /// Per-season league context. When absent, or when it has no row for
    /// the season, the context is derived from the stat rows.
    #[serde(default)]
    pub league: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub report: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/app.toml` and (optionally)
/// `config/engine.toml`, both relative to `base_dir`.
///
/// Does not write defaults; `load_config` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- app.toml (required) ---
    let app_path = config_dir.join("app.toml");
    let app_text = read_file(&app_path)?;
    let app_file: AppFile = toml::from_str(&app_text).map_err(|e| ConfigError::ParseError {
        path: app_path.clone(),
        source: e,
    })?;

    // --- engine.toml (optional; every table has defaults) ---
    let engine_path = config_dir.join("engine.toml");
    let engine = if engine_path.exists() {
        let engine_text = read_file(&engine_path)?;
        toml::from_str(&engine_text).map_err(|e| ConfigError::ParseError {
            path: engine_path.clone(),
            source: e,
        })?
    } else {
        EngineConfig::default()
    };

    let config = Config {
        run: app_file.run,
        data_paths: app_file.data_paths,
        output: app_file.output,
        engine,
    };

    validate(&config)?;

    Ok(config)
}

const DEFAULT_ENGINE_TOML: &str = include_str!("../defaults/engine.toml");

/// Write the shipped `engine.toml` into `config/` unless one is already
/// there. Returns whether a file was written.
pub fn write_default_engine_config(base_dir: &Path) -> Result<bool, ConfigError> {
    let config_dir = base_dir.join("config");
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsWriteError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    let target = config_dir.join("engine.toml");
    let mut file = match std::fs::OpenOptions::new().write(true).create_new(true).open(&target) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ConfigError::DefaultsWriteError {
                message: format!("failed to create {}: {e}", target.display()),
            })
        }
    };
    std::io::Write::write_all(&mut file, DEFAULT_ENGINE_TOML.as_bytes()).map_err(|e| {
        ConfigError::DefaultsWriteError {
            message: format!("failed to write {}: {e}", target.display()),
        }
    })?;
    Ok(true)
}

/// Load config relative to `base_dir`, writing the default engine config
/// first when it is missing.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    if write_default_engine_config(base_dir)? {
        info!("Wrote default engine config to {}", base_dir.join("config/engine.toml").display());
    }
    load_config_from(base_dir)
}

/// Resolve a configured path against `base_dir` unless it is absolute.
pub fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.run.season == 0 {
        return Err(ConfigError::ValidationError {
            field: "run.season".into(),
            message: "must be greater than 0".into(),
        });
    }

    let ip = config.run.min_qualified_ip;
    if !ip.is_finite() || ip < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "run.min_qualified_ip".into(),
            message: format!("must be a finite non-negative number, got {ip}"),
        });
    }

    let paths: &[(&str, &str)] = &[
        ("data_paths.players", &config.data_paths.players),
        ("data_paths.pitching", &config.data_paths.pitching),
        ("data_paths.batting", &config.data_paths.batting),
        ("data_paths.scouting", &config.data_paths.scouting),
        ("output.report", &config.output.report),
    ];
    for (name, value) in paths {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    config
        .engine
        .validate()
        .map_err(|e| match e {
            scoutline_core::EngineError::InvalidConfig { field, message } => {
                ConfigError::ValidationError {
                    field: format!("engine.{field}"),
                    message,
                }
            }
        })?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Crate root, which holds the shipped `defaults/`.
    fn project_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scoutline_config_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("config")).unwrap();
        dir
    }

    const APP_TOML: &str = r#"
[run]
season = 2024

[data_paths]
players = "data/players.csv"
pitching = "data/pitching.csv"
batting = "data/batting.csv"
scouting = "data/scouting.csv"

[output]
report = "output/report.json"
"#;

    #[test]
    fn load_default_files() {
        let tmp = scratch("defaults");
        fs::copy(project_root().join("defaults/app.toml"), tmp.join("config/app.toml")).unwrap();
        assert!(write_default_engine_config(&tmp).unwrap());

        let config = load_config_from(&tmp).expect("defaults should load");
        assert_eq!(config.run.season, 2024);
        assert_eq!(config.output.top_n, 10);
        assert_eq!(config.engine, EngineConfig::default());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn default_engine_config_never_overwrites() {
        let tmp = scratch("no_overwrite");
        fs::write(tmp.join("config/engine.toml"), "# custom\n").unwrap();

        assert!(!write_default_engine_config(&tmp).unwrap());
        assert_eq!(fs::read_to_string(tmp.join("config/engine.toml")).unwrap(), "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn load_config_creates_config_dir() {
        let tmp = std::env::temp_dir().join("scoutline_config_fresh");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        // app.toml is still required; engine.toml is written before the error.
        let err = load_config(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        assert!(tmp.join("config/engine.toml").is_file());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_engine_toml_uses_defaults() {
        let tmp = scratch("no_engine");
        fs::write(tmp.join("config/app.toml"), APP_TOML).unwrap();
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.data_paths.league, None);
        assert_eq!(config.run.min_qualified_ip, 50.0);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_app_toml_is_an_error() {
        let tmp = scratch("no_app");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn invalid_engine_table_is_reported_with_prefix() {
        let tmp = scratch("bad_engine");
        fs::write(tmp.join("config/app.toml"), APP_TOML).unwrap();
        fs::write(
            tmp.join("config/engine.toml"),
            "[aggregation]\nrecency_weights = []\n",
        )
        .unwrap();
        let err = load_config_from(&tmp).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "engine.aggregation.recency_weights")
            }
            other => panic!("unexpected error: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let tmp = scratch("malformed");
        fs::write(tmp.join("config/app.toml"), "[run\nseason = ").unwrap();
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_season_zero() {
        let tmp = scratch("season_zero");
        fs::write(
            tmp.join("config/app.toml"),
            APP_TOML.replace("season = 2024", "season = 0"),
        )
        .unwrap();
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ValidationError { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/srv/scoutline");
        assert_eq!(resolve(base, "data/players.csv"), base.join("data/players.csv"));
        assert_eq!(resolve(base, "/abs/x.csv"), PathBuf::from("/abs/x.csv"));
    }
}

// Error and condition types.
//
// The numeric paths of the engine never fail: missing or degenerate inputs
// degrade to league-anchored estimates and are reported as `DataCondition`
// flags on the result. `EngineError` is reserved for invalid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid engine configuration for `{field}`: {message}")]
    InvalidConfig { field: String, message: String },
}

impl EngineError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// A degraded-input condition attached to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCondition {
    /// No usable stat rows; the estimate is anchored on league average.
    MissingStats,
    /// No scouting row; the rating is stats-only.
    MissingScouting,
    /// Stat rows exist but carry zero innings / plate appearances.
    ZeroSample,
    /// The peer pool was below the usable size; the percentile is low-confidence.
    PoolTooSmall,
}

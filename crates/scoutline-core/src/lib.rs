// Library root: the True Rating inference and projection engine.
//
// Pure and synchronous. Inputs arrive pre-parsed through a `StatsRepository`
// and a `LeagueContext`; outputs are plain serde records.

pub mod aggregate;
pub mod aging;
pub mod blend;
pub mod config;
pub mod converter;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod future;
pub mod interp;
pub mod league;
pub mod model;
pub mod percentile;
pub mod playing_time;
pub mod regression;
pub mod repository;
pub mod value;

pub use config::EngineConfig;
pub use engine::{Projection, RatingEngine, SeasonRatings, TrueRating};
pub use error::{DataCondition, EngineError};
pub use future::TrueFutureRating;
pub use league::LeagueContext;
pub use repository::{InMemoryRepository, StatsRepository};

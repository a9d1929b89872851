pub mod app_config;
pub mod config;
pub mod geo;
pub mod nearby;
pub mod points;

use thiserror::Error;

pub use app_config::{
    AppConfig, Environment, LineCredentials, SheetsCredential, SourceConfig, DEFAULT_MAP_URL,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, Coordinate, CoordinateError, EARTH_RADIUS_KM};
pub use nearby::{
    find_nearby, find_nearby_with_stats, rank_points, NearbyError, SearchOutcome, SearchParams,
    SiteAggregate, MAX_RESULTS, SEARCH_RADIUS_KM,
};
pub use points::{parse_row, RawPoint, RawRow, SkipReason};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

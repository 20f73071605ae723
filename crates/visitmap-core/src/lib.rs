pub mod app_config;
pub mod config;
pub mod visits;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use visits::{load_visits, validate_visits, Visit};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read visits file {path}: {source}")]
    VisitsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse visits file {path}: {reason}")]
    VisitsFileParse { path: String, reason: String },

    #[error("validation error: {0}")]
    Validation(String),
}

//! Error types shared across the workspace

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by persistence and configuration validation.
///
/// Scheduling, standings and bracket code never fail; see the module docs of
/// `fixtures` and `standings` for how degenerate inputs are handled.
#[derive(Debug, Error)]
pub enum KickoffError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate team name in roster: {0}")]
    DuplicateTeam(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, KickoffError>;

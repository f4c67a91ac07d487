//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
///
/// All of these are fatal and surface before scanning begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error in `{0}`")]
    Toml(PathBuf, #[source] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),

    #[error(
        "unable to detect a user id; set `user_id` in mdsync.user.toml, \
         the MDSYNC_USER environment variable, or git config user.email"
    )]
    NoIdentity,
}

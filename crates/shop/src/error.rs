//! Start-up error types.

use thiserror::Error;

/// A configuration variable holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A numeric variable did not parse.
    #[error("{var} must be a whole number of basis points, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    /// A list entry is malformed.
    #[error("{var} has a malformed entry {entry:?} (expected CODE=BASIS_POINTS)")]
    InvalidEntry { var: &'static str, entry: String },

    /// The log format is neither `pretty` nor `json`.
    #[error("SHOP_LOG_FORMAT must be \"pretty\" or \"json\", got {0:?}")]
    InvalidLogFormat(String),
}

//! Error types.
//!
//! Query parsing never fails: malformed fragments are dropped and unresolved
//! names are carried as markers. Only structurally invalid inputs surface here.

use thiserror::Error;

/// Failure to estimate attendance for a single event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimateError {
    /// A bin label that is not `<wins>-<losses>`.
    #[error("malformed record bin '{0}' (expected '<wins>-<losses>')")]
    MalformedRecordBin(String),

    /// Bins disagree on the number of rounds played.
    #[error("record '{record}' implies {found} rounds, expected {expected}")]
    InconsistentRounds { record: String, expected: u32, found: u32 },

    /// A record implying more rounds than any swiss event runs.
    #[error("record '{record}' implies {rounds} rounds, at most {max} are supported")]
    TooManyRounds { record: String, rounds: u64, max: u32 },

    /// Bin counts too large to add up or back-solve a field size from.
    #[error("player counts around record '{0}' overflow")]
    CountOverflow(String),

    #[error("no record bins to estimate from")]
    EmptyHistogram,
}

/// Alias configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

//! Error types for configuration loading and predicate parsing.
//!
//! Structural misuse of the runtime core (duplicate registration, missing
//! keys, lookups of absent component types) is reported through `bool` and
//! `Option` return values and never produces an error value. The types here
//! cover the fallible edges only: reading configuration from disk and parsing
//! data-authored predicate operators.
//!
//! ## Typical flow
//! Low-level failures return a focused error ([`ConfigError`],
//! [`CompareOpError`]). Callers that mix both use `?` to bubble them into
//! [`CoreError`].
//!
//! ```ignore
//! fn load_rules(path: &Path, op: &str) -> CoreResult<(CoreConfig, CompareOp)> {
//!     let config = CoreConfig::load(path)?;
//!     let op = op.parse::<CompareOp>()?;
//!     Ok((config, op))
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;


/// Result alias used by the fallible parts of the crate.
pub type CoreResult<T> = Result<T, CoreError>;

/// Returned when a [`CoreConfig`](crate::engine::config::CoreConfig) cannot be
/// loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,

        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML or does not match the schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Returned when a comparison operator authored as text is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareOpError {
    /// The operator text matched none of the known forms.
    #[error("unknown comparison operator `{0}`")]
    Unknown(String),
}

/// Aggregate error for callers combining several fallible operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration loading failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Predicate operator parsing failed.
    #[error(transparent)]
    CompareOp(#[from] CompareOpError),
}

//! Shared error type across ScrapeLab crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, ScrapeLabError>;

/// Unified error type used by the registry and the server.
///
/// Registry errors are construction-time or caller errors, never transient:
/// definition errors are fatal at startup, `LabelCardinality` and
/// `InvalidObservation` are programmer defects surfaced by the strict API.
#[derive(Debug, Error)]
pub enum ScrapeLabError {
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),
    #[error("invalid definition for {metric}: {reason}")]
    InvalidDefinition { metric: String, reason: String },
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("label cardinality mismatch for {metric}: expected {expected} values, got {got}")]
    LabelCardinality {
        metric: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid observation: {0}")]
    InvalidObservation(String),
    #[error("config: {0}")]
    Config(String),
}

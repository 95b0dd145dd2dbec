//! ScrapeLab core: metric registry, time series storage, and Prometheus
//! text exposition.
//!
//! This crate defines the in-process metric model shared by the server and
//! by tests. It intentionally carries no transport or runtime dependencies
//! so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ScrapeLabError`/`Result`; the
//! lenient recording facade used on the request hot path never fails at
//! all — a bad observation is logged and dropped, never propagated.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod expose;
pub mod registry;

/// Shared result type.
pub use error::{Result, ScrapeLabError};
pub use registry::{HistogramTimer, MetricKind, MetricSpec, Registry, SeriesHandle};

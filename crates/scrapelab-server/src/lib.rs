//! ScrapeLab server library entry.
//!
//! This crate wires the config, shared state, router, request-tracking
//! middleware, demo endpoint handlers, and the background simulator into a
//! cohesive metrics-instrumented HTTP service. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod background;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod sim;
pub mod track;

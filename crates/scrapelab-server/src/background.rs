//! Background simulator.
//!
//! Models metrics that change without any inbound request: on a fixed
//! interval, refresh the connection-count and queue-size gauges with fresh
//! rolls and, with a configured chance, record a background error. Runs as
//! one tokio task next to the server and exits on the shutdown signal.

use std::time::Duration;

use tracing::{debug, info};

use crate::app_state::AppState;
use crate::handlers::SEVERITIES;
use crate::metrics::{APP_ERRORS, DB_CONNECTIONS, JOB_QUEUE_SIZE};

/// One simulation tick. Factored out of the loop so tests can drive it
/// deterministically with a scripted source.
pub fn tick(state: &AppState) {
    let src = state.source();
    let connections = src.uniform_u64(10, 100) as f64;
    let queue = src.uniform_u64(0, 50) as f64;

    let registry = state.registry();
    registry.set_gauge(DB_CONNECTIONS, &[], connections);
    registry.set_gauge(JOB_QUEUE_SIZE, &[], queue);

    if src.chance(state.cfg().sim.background_error_chance) {
        let severity = src.pick(SEVERITIES);
        registry.inc_counter(APP_ERRORS, &["background", severity]);
        debug!(severity, "background error simulated");
    }
}

/// Run the tick loop until the shutdown signal flips.
pub async fn run(state: AppState, mut shutdown: tokio::sync::watch::Receiver<bool>) {
    let every = Duration::from_millis(state.cfg().sim.tick_interval_ms);
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first interval tick fires immediately; skip it so the gauges
    // only move on the configured cadence.
    interval.tick().await;

    info!(interval_ms = every.as_millis() as u64, "background simulator started");

    loop {
        tokio::select! {
            _ = interval.tick() => tick(&state),
            _ = shutdown.changed() => {
                info!("background simulator shutting down");
                break;
            }
        }
    }
}

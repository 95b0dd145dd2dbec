//! Axum router wiring.
//!
//! Every route, `/metrics` included, passes through the request-tracking
//! middleware so scrapes of the exposition endpoint are themselves
//! visible in the request counters.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::{app_state::AppState, handlers, track};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_exposition))
        .route("/api/orders", post(handlers::create_order))
        .route("/api/users/register", post(handlers::register_user))
        .route("/api/users/active", get(handlers::active_users))
        .route("/api/cache/test", get(handlers::cache_test))
        .route("/api/database/query", get(handlers::database_query))
        .route("/api/error", get(handlers::simulated_error))
        .layer(middleware::from_fn_with_state(state.clone(), track::track_http))
        .with_state(state)
}

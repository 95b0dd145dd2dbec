//! HTTP handlers.
//!
//! Every `/api/*` endpoint performs a side-effecting metric update and
//! returns a JSON body describing the simulated outcome. The updates go
//! through the registry's lenient facade: recording never throws and
//! never fails a request. The `/api/error` responses are demo data
//! generators, not real failures — they must never be read as service
//! unhealth.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use scrapelab_core::expose;

use crate::app_state::AppState;
use crate::metrics::{
    ACTIVE_USERS, APP_ERRORS, CACHE_HITS, CACHE_MISSES, DB_QUERY_DURATION, ORDERS, ORDER_REVENUE,
    USER_REGISTRATIONS,
};

pub const ORDER_STATUSES: &[&str] = &["completed", "pending", "failed"];
pub const PAYMENT_METHODS: &[&str] = &["credit_card", "paypal", "bank_transfer"];
pub const PRODUCT_CATEGORIES: &[&str] = &["electronics", "books", "clothing", "home"];
pub const REGISTRATION_METHODS: &[&str] = &["email", "google", "github"];
pub const QUERY_TYPES: &[&str] = &["select", "insert", "update"];
pub const TABLES: &[&str] = &["users", "orders", "products"];
pub const ERROR_TYPES: &[&str] = &["database_error", "timeout_error", "validation_error"];
pub const SEVERITIES: &[&str] = &["low", "medium", "high", "critical"];

const CACHE_TYPE: &str = "redis";

/// GET / — endpoint listing, documentation only.
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "service": "scrapelab",
        "endpoints": {
            "GET /health": "liveness probe",
            "GET /metrics": "Prometheus exposition",
            "POST /api/orders": "simulate an order",
            "POST /api/users/register": "simulate a user registration",
            "GET /api/users/active": "refresh active-user gauges",
            "GET /api/cache/test": "simulate a cache lookup",
            "GET /api/database/query": "simulate a database query",
            "GET /api/error": "simulate an application error",
        }
    }))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /metrics — full registry render, exposition content type.
pub async fn metrics_exposition(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, expose::CONTENT_TYPE)],
        state.registry().render(),
    )
}

/// POST /api/orders
pub async fn create_order(State(state): State<AppState>) -> impl IntoResponse {
    let src = state.source();
    let status = src.pick(ORDER_STATUSES);
    let payment_method = src.pick(PAYMENT_METHODS);
    let product_category = src.pick(PRODUCT_CATEGORIES);
    // Round to cents so the exposition stays readable.
    let amount = (src.uniform_f64(10.0, 500.0) * 100.0).round() / 100.0;

    let registry = state.registry();
    registry.inc_counter(ORDERS, &[status, payment_method]);
    registry.record_counter(ORDER_REVENUE, &[product_category], amount);

    Json(json!({
        "status": status,
        "payment_method": payment_method,
        "product_category": product_category,
        "amount": amount,
    }))
}

/// POST /api/users/register
pub async fn register_user(State(state): State<AppState>) -> impl IntoResponse {
    let method = state.source().pick(REGISTRATION_METHODS);
    state.registry().inc_counter(USER_REGISTRATIONS, &[method]);

    Json(json!({ "registered": true, "registration_method": method }))
}

/// GET /api/users/active — replaces both gauges with fresh rolls.
pub async fn active_users(State(state): State<AppState>) -> impl IntoResponse {
    let src = state.source();
    let premium = src.uniform_u64(50, 200) as f64;
    let free = src.uniform_u64(500, 2000) as f64;

    let registry = state.registry();
    registry.set_gauge(ACTIVE_USERS, &["premium"], premium);
    registry.set_gauge(ACTIVE_USERS, &["free"], free);

    Json(json!({ "premium": premium, "free": free }))
}

/// GET /api/cache/test
pub async fn cache_test(State(state): State<AppState>) -> impl IntoResponse {
    let hit = state.source().chance(state.cfg().sim.cache_hit_ratio);
    let metric = if hit { CACHE_HITS } else { CACHE_MISSES };
    state.registry().inc_counter(metric, &[CACHE_TYPE]);

    Json(json!({
        "cache_type": CACHE_TYPE,
        "result": if hit { "hit" } else { "miss" },
    }))
}

/// GET /api/database/query — one timed, simulated query.
pub async fn database_query(State(state): State<AppState>) -> impl IntoResponse {
    let src = state.source();
    let query_type = src.pick(QUERY_TYPES);
    let table = src.pick(TABLES);
    let sim = &state.cfg().sim;
    let delay_ms = src.uniform_u64(sim.db_delay_min_ms, sim.db_delay_max_ms);

    let start = std::time::Instant::now();
    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    let elapsed = start.elapsed().as_secs_f64();

    state
        .registry()
        .record_histogram(DB_QUERY_DURATION, &[query_type, table], elapsed);

    Json(json!({
        "query_type": query_type,
        "table": table,
        "duration_ms": delay_ms,
    }))
}

/// GET /api/error — simulated failure, returns non-2xx by contract.
pub async fn simulated_error(State(state): State<AppState>) -> impl IntoResponse {
    let src = state.source();
    let error_type = src.pick(ERROR_TYPES);
    let severity = src.pick(SEVERITIES);
    state.registry().inc_counter(APP_ERRORS, &[error_type, severity]);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": error_type,
            "severity": severity,
            "simulated": true,
        })),
    )
}

//! The service's metric set.
//!
//! Every metric is defined here, once, at process startup. A definition
//! error (duplicate name, bad buckets) is a configuration defect and fails
//! startup rather than letting the process run with an inconsistent
//! registry. Handlers refer to metrics by the name constants below and
//! record through the registry's lenient facade only.

use scrapelab_core::{Registry, Result};

pub const HTTP_REQUESTS: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const ORDERS: &str = "orders_total";
pub const ORDER_REVENUE: &str = "order_revenue_total";
pub const USER_REGISTRATIONS: &str = "user_registrations_total";
pub const ACTIVE_USERS: &str = "active_users";
pub const CACHE_HITS: &str = "cache_hits_total";
pub const CACHE_MISSES: &str = "cache_misses_total";
pub const DB_QUERY_DURATION: &str = "db_query_duration_seconds";
pub const DB_CONNECTIONS: &str = "db_connections_active";
pub const JOB_QUEUE_SIZE: &str = "job_queue_size";
pub const APP_ERRORS: &str = "app_errors_total";

const HTTP_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
const DB_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0];

/// Define the full metric set on `registry`. Called exactly once from
/// `AppState::new`; errors are fatal at startup.
pub fn install(registry: &Registry) -> Result<()> {
    registry.define_counter(
        HTTP_REQUESTS,
        "Total HTTP requests handled.",
        &["method", "route", "status_code"],
    )?;
    registry.define_histogram(
        HTTP_REQUEST_DURATION,
        "HTTP request duration in seconds.",
        &["method", "route", "status_code"],
        HTTP_BUCKETS,
    )?;
    registry.define_counter(
        ORDERS,
        "Total orders created, by outcome and payment method.",
        &["status", "payment_method"],
    )?;
    registry.define_counter(
        ORDER_REVENUE,
        "Accumulated order revenue, by product category.",
        &["product_category"],
    )?;
    registry.define_counter(
        USER_REGISTRATIONS,
        "Total user registrations, by method.",
        &["registration_method"],
    )?;
    registry.define_gauge(
        ACTIVE_USERS,
        "Currently active users, by account type.",
        &["user_type"],
    )?;
    registry.define_counter(CACHE_HITS, "Total cache hits.", &["cache_type"])?;
    registry.define_counter(CACHE_MISSES, "Total cache misses.", &["cache_type"])?;
    registry.define_histogram(
        DB_QUERY_DURATION,
        "Simulated database query duration in seconds.",
        &["query_type", "table"],
        DB_BUCKETS,
    )?;
    registry.define_gauge(DB_CONNECTIONS, "Open database connections.", &[])?;
    registry.define_gauge(JOB_QUEUE_SIZE, "Jobs waiting in the background queue.", &[])?;
    registry.define_counter(
        APP_ERRORS,
        "Total application errors, simulated and background.",
        &["error_type", "severity"],
    )?;
    Ok(())
}

//! Request-tracking middleware.
//!
//! Wraps every inbound request: captures a monotonic start instant on
//! arrival and, once the response is produced, records a count and a
//! duration observation labeled `{method, route, status_code}`. The route
//! label is the matched route pattern, not the raw path, to keep label
//! cardinality bounded; requests that match no route fall back to the
//! literal path.
//!
//! A client disconnect cancels the handler future before the recording
//! point, so aborted requests record nothing. That gap is accepted (there
//! is no accurate duration to record for them) and asserted in the
//! integration tests.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::app_state::AppState;
use crate::metrics::{HTTP_REQUESTS, HTTP_REQUEST_DURATION};

pub async fn track_http(State(state): State<AppState>, req: Request, next: Next) -> Response {
    // Each request owns its own start instant; nothing is shared.
    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let res = next.run(req).await;

    let elapsed = start.elapsed().as_secs_f64();
    let status = res.status().as_u16().to_string();
    let labels = [method.as_str(), route.as_str(), status.as_str()];

    // Lenient facade: recording can never fail the request.
    let registry = state.registry();
    registry.inc_counter(HTTP_REQUESTS, &labels);
    registry.record_histogram(HTTP_REQUEST_DURATION, &labels, elapsed);

    res
}

//! ScrapeLab server.
//!
//! A metrics-instrumented demo HTTP service: business endpoints mutate an
//! in-process registry, `/metrics` exposes it in Prometheus text format
//! for an external scraper, and a background task keeps a handful of
//! gauges moving without inbound traffic.

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use scrapelab_server::{app_state, background, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "scrapelab.yaml".into());
    let cfg = config::load_or_default(&path).expect("config load failed");
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg).expect("metric definitions failed");
    let app = router::build_router(state.clone());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sim = tokio::spawn(background::run(state, shutdown_rx));

    tracing::info!(%listen, "scrapelab-server starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("server failed");

    let _ = shutdown_tx.send(true);
    let _ = sim.await;
}

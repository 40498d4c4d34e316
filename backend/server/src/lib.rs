//! Documentation of a Farcaster profile viewer backend.
//!
//!
//!
//! # General Infrastructure
//! - The mini app frame talks only to this server, never to Farcaster directly
//! - This server forwards each request to the Farcaster client API, one round trip per request
//! - No database, no cache; the upstream API is the source of truth for identity and follow graphs
//!
//!
//!
//! # Routes
//!
//! | Route | Required | Forwards to |
//! |---|---|---|
//! | `GET /api/search` | `q` | `search-summary`, 5 users max |
//! | `GET /api/followers` | `fid` | `followers`, 100 per page |
//! | `GET /api/following` | `fid` | `following`, 100 per page |
//! | `GET /api/user` | `fid` or `username` | `user` or `user-by-username` |
//! | `GET /health` | | nothing |
//!
//! Missing or invalid parameters answer `400 { "error": ... }` without contacting upstream.
//! Upstream failures, including bodies that do not match the expected envelope, answer
//! `500 { "error": ... }`.
//!
//!
//!
//! # Notes
//!
//! ## Why validate the envelope?
//! Passing upstream JSON through verbatim means a changed or broken upstream shape only
//! surfaces in the frontend as missing fields. Parsing into [`graph::UserSummary`] here turns
//! that into a logged 500 at the edge instead.
//!
//! ## Search debounce
//! The frontend debounces search input (300ms by default, see the `explore` crate), so
//! this server sees at most a few searches per second per user.
//!
//!
//!
//! # Setup
//!
//! Run locally.
//! ```sh
//! RUST_LOG=info cargo run -p castgraph
//! ```
//!
//! Environment
//! - `RUST_PORT`: listen port, default 3000
//! - `UPSTREAM_URL`: default `https://client.farcaster.xyz/v2`
//! - `UPSTREAM_TIMEOUT_MS`: default 10000
//! - `SEARCH_MAX_USERS`: default 5
//! - `GRAPH_PAGE_LIMIT`: default 100
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use routes::{followers_handler, following_handler, health_handler, search_handler, user_handler};
use state::State;

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new()?;

    info!("Starting server...");

    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

pub fn router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/search", get(search_handler))
        .route("/api/followers", get(followers_handler))
        .route("/api/following", get(following_handler))
        .route("/api/user", get(user_handler))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

//! A small HTTP front-end over a primary/replica Redis pair.
//!
//! Lists of strings live entirely in Redis. Writes go to the primary
//! instance, reads come from the replica. The server itself keeps no
//! state beyond the two connections.
//!
//! # Endpoints
//!
//! | Route | Backend | Response |
//! |---|---|---|
//! | `GET /lrange/{key}` | replica | JSON array of the list's elements |
//! | `GET /rpush/{key}/{value}` | primary, then replica | JSON array after the push |
//! | `GET /info` | primary | raw `INFO` dump as `text/plain` |
//! | `GET /env` | none | JSON object of the process environment |
//!
//! Failures of a store operation map to `503`, failures to encode a
//! response map to `500`, always with a `{"error": "..."}` body.
//!
//! # Primary / replica lag
//!
//! `/rpush` acknowledges by reading the list back from the **replica**,
//! which may not have seen the write yet. The stale read is intentional:
//! it surfaces replication lag to the caller instead of hiding it behind
//! a primary read.
use std::{process, time::Duration};

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
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;

use routes::{env_handler, info_handler, list_push_handler, list_range_handler};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = match AppState::new().await {
        Ok(state) => state,
        Err(err) => {
            error!("{err}");
            process::exit(1);
        }
    };

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/lrange/{key}", get(list_range_handler))
        .route("/rpush/{key}/{value}", get(list_push_handler))
        .route("/info", get(info_handler))
        .route("/env", get(env_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

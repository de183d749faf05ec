//! HTTP surface for the recipe chat backend.

use std::{env, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

mod core;
mod error_handler;
mod routes;

pub use error_handler::{AppError, AppResult};

use crate::core::app_state::AppState;
use crate::routes::{health::health_route::health, query::query_route::query};

/// Builds shared state, binds the listener, and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").map_err(|_| AppError::MissingEnv("API_ADDRESS"))?;

    let state = Arc::new(AppState::init().await?);

    let app = Router::new()
        .route("/api/query", post(query))
        .route("/health", get(health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;

    info!("listening on {host_url}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
}

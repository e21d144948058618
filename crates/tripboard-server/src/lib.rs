pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const LOCK_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", routes::api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop lock entries for trips nobody is editing.
pub fn spawn_lock_cleanup(state: &AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    let locks = state.planner.locks().clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            locks.cleanup_unused().await;
        }
    })
}

pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let cleanup = spawn_lock_cleanup(&state, LOCK_CLEANUP_INTERVAL);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("tripboard-server listening on {}", addr);
    let served = axum::serve(listener, app).await;
    cleanup.abort();
    served?;
    Ok(())
}

//! HTTP API module for Focusd
//!
//! Provides REST API endpoints for session lifecycle and usage stats.

mod auth;
pub mod routes;

use crate::config::Config;
use crate::error::Result;
use crate::session::lifecycle::SessionService;
use crate::session::stats::StatsService;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle manager
    pub sessions: Arc<SessionService>,
    /// Stats aggregator
    pub stats: Arc<StatsService>,
    pub api_key: Option<String>,
}

/// Start the HTTP API server
pub async fn serve(
    addr: SocketAddr,
    sessions: Arc<SessionService>,
    stats: Arc<StatsService>,
    config: &Config,
) -> Result<()> {
    let state = AppState {
        sessions,
        stats,
        api_key: config.server.api_key.clone(),
    };

    let app = create_router(state);

    // Check if port is already in use (another focusd instance running)
    if tokio::net::TcpStream::connect(addr).await.is_ok() {
        tracing::error!(
            "Port {} is already in use — another focusd instance may be running. \
             Use `curl http://{}/health` to check.",
            addr.port(),
            addr
        );
        return Err(crate::error::CoreError::Api(format!(
            "Port {} already in use",
            addr.port()
        )));
    }

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::error::CoreError::Api(e.to_string()))?;

    Ok(())
}

/// Create the API router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Session lifecycle
        .route("/sessions/start", post(routes::start_session))
        .route("/sessions/:id/end", put(routes::end_session))
        .route("/sessions", get(routes::list_sessions))
        // Stats
        .route("/sessions/stats/weekly", get(routes::weekly_stats))
        .route("/sessions/stats/hourly", get(routes::hourly_stats))
        // Apply auth middleware to all API routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        // Health check (public, no auth required)
        .route("/health", get(routes::health))
        // Nest protected routes under /api
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

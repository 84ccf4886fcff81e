//! HTTP/WebSocket API for the Hearts server.
//!
//! # Modules
//!
//! - [`players`]: Player registration and ticket issuing
//! - [`websocket`]: Game connections, relayed into the [`Bridge`]
//! - [`request_id`]: Request correlation IDs
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health              - Server health status
//! POST /api/v1/players      - Create a player, returns a ticket
//! POST /api/v1/tickets      - Exchange name and password for a ticket
//! GET  /play                - WebSocket upgrade into a game connection
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use hearts::{auth::{InMemoryPlayerDirectory, TicketService}, session::SessionConfig};
//! use hearts_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::new(
//!     Arc::new(InMemoryPlayerDirectory::new("pepper".to_string())),
//!     Arc::new(TicketService::new("secret".to_string())),
//!     SessionConfig::default(),
//! );
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod players;
pub mod request_id;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use hearts::{
    auth::{PlayerDirectory, TicketService},
    bridge::Bridge,
    matchmaking::MatchmakingQueue,
    session::{GameRegistry, SessionConfig},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request; every field is shared.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn PlayerDirectory>,
    pub tickets: Arc<TicketService>,
    pub queue: Arc<MatchmakingQueue>,
    pub registry: GameRegistry,
}

impl AppState {
    /// Wire the registry and the matchmaking queue on top of `directory`.
    pub fn new(
        directory: Arc<dyn PlayerDirectory>,
        tickets: Arc<TicketService>,
        session: SessionConfig,
    ) -> Self {
        let registry = GameRegistry::new(session, directory.clone());
        let queue = Arc::new(MatchmakingQueue::new(Arc::new(registry.clone())));
        Self {
            directory,
            tickets,
            queue,
            registry,
        }
    }

    /// A bridge for one more client connection.
    pub fn bridge(&self) -> Bridge {
        Bridge::new(
            self.directory.clone(),
            self.tickets.clone(),
            self.queue.clone(),
            self.registry.clone(),
        )
    }
}

/// Create the API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/players", post(players::create_player))
        .route("/tickets", post(players::issue_ticket));

    Router::new()
        .route("/health", get(health_check))
        // The WebSocket authenticates in-band with an auth command
        .route("/play", get(websocket::websocket_handler))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","games":{"active":2,"created":5},"queue":3}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.registry.stats().await;
    let queued = state.queue.len().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "games": {
            "active": stats.active,
            "created": stats.created,
            "finished": stats.finished,
            "abandoned": stats.abandoned,
        },
        "queue": queued,
    });

    (StatusCode::OK, Json(response))
}

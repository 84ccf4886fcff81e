//! Prometheus metrics for monitoring server health.
//!
//! Metrics are exposed in Prometheus text format on a separate listener for
//! scraping by monitoring systems.
//!
//! # Metrics Categories
//!
//! - **WebSocket Metrics**: Active and total connections, messages
//! - **Game Metrics**: Active games and lifetime created/finished/abandoned
//! - **Matchmaking Metrics**: Players waiting for a game
//! - **Auth Metrics**: Ticket requests

use hearts::session::RegistryStats;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Track a newly opened WebSocket connection.
pub fn websocket_connection_opened() {
    metrics::counter!("websocket_connections_total").increment(1);
    metrics::gauge!("websocket_connections_active").increment(1.0);
}

/// Track a closed WebSocket connection, labelled by how it ended.
pub fn websocket_connection_closed(end: &str) {
    metrics::counter!("websocket_connections_closed_total",
        "end" => end.to_string()
    )
    .increment(1);
    metrics::gauge!("websocket_connections_active").decrement(1.0);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Publish a registry snapshot.
pub fn record_registry_stats(stats: &RegistryStats) {
    metrics::gauge!("active_games").set(stats.active as f64);
    metrics::counter!("games_created_total").absolute(stats.created);
    metrics::counter!("games_finished_total").absolute(stats.finished);
    metrics::counter!("games_abandoned_total").absolute(stats.abandoned);
}

/// Set the number of players waiting in the matchmaking queue.
pub fn queue_depth(count: usize) {
    metrics::gauge!("matchmaking_queue_depth").set(count as f64);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment ticket requests counter.
pub fn ticket_requests_total(success: bool) {
    metrics::counter!("ticket_requests_total",
        "success" => success.to_string()
    )
    .increment(1);
}

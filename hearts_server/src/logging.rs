//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; those records are
//! forwarded into the tracing subscriber installed here.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var and default to
/// `info`.
///
/// # Example
///
/// ```no_run
/// use hearts_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `player_id` - Optional player ID
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use hearts_server::logging::log_security_event;
///
/// log_security_event("failed_ticket", None, "Wrong password for alice");
/// ```
pub fn log_security_event(event_type: &str, player_id: Option<i64>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        player_id = player_id,
        "SECURITY: {}",
        message
    );
}

/// Log the start or end of a client connection
///
/// # Arguments
///
/// * `connection_id` - Server-assigned connection ID
/// * `event` - What happened (`opened`, `closed`, ...)
/// * `detail` - Optional detail, e.g. how the connection ended
pub fn log_connection_event(connection_id: &str, event: &str, detail: Option<&str>) {
    tracing::info!(
        connection_id = connection_id,
        event = event,
        detail = detail,
        "Connection {}",
        event
    );
}

//! Hearts server: matchmaking and one actor per running game behind an
//! HTTP/WebSocket front end.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Error};
use chrono::TimeDelta;
use hearts::auth::{InMemoryPlayerDirectory, TicketService};
use hearts_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a Hearts server

USAGE:
  hearts_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                    Server bind address (e.g., 0.0.0.0:8080)
  TICKET_SECRET                  Ticket signing secret (required, 32+ chars)
  PASSWORD_PEPPER                Password hashing pepper (required, 16+ chars)
  TICKET_TTL_SECS                Ticket lifetime [default: 3600]
  SESSION_TICK_MS                Game session tick [default: 1000]
  SESSION_ABANDON_TIMEOUT_SECS   Idle time before a game is abandoned [default: 300]
  METRICS_BIND                   Prometheus exporter address [default: disabled]
  RUST_LOG                       Log filter [default: info]
";

/// How often gauges are refreshed from the registry and the queue
const METRICS_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("Invalid --bind address")?;
    let config = ServerConfig::from_env(bind)?;

    logging::init();
    info!("Starting Hearts server at {}", config.bind);

    let directory = Arc::new(InMemoryPlayerDirectory::new(
        config.security.password_pepper.clone(),
    ));
    let tickets = Arc::new(TicketService::with_ttl(
        config.security.ticket_secret.clone(),
        TimeDelta::try_seconds(config.security.ticket_ttl_secs)
            .context("TICKET_TTL_SECS out of range")?,
    ));
    let state = AppState::new(directory, tickets, config.session.clone());

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(anyhow::Error::msg)?;
        info!("Metrics exporter listening on {}", metrics_bind);
        tokio::spawn(publish_metrics(state.clone()));
    }

    let app = api::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    state.registry.shutdown().await;

    Ok(())
}

/// Refresh game and queue gauges until the process exits.
async fn publish_metrics(state: AppState) {
    let mut interval = tokio::time::interval(METRICS_INTERVAL);
    loop {
        interval.tick().await;
        metrics::record_registry_stats(&state.registry.stats().await);
        metrics::queue_depth(state.queue.len().await);
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

//! HTTP/WebSocket front end for the `hearts` engine.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;

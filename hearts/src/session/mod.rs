//! Game sessions: one actor per running game.
//!
//! # Architecture
//!
//! - Each game runs as an independent tokio task ([`GameActor`]) that owns
//!   the [`Game`](crate::game::Game) and is the only writer to it
//! - Commands arrive through an mpsc inbox and are answered over oneshot
//!   channels; [`GameHandle`] wraps the request/response dance
//! - Every seat has an unbounded FIFO outbound channel the actor pushes game
//!   events into, so a slow client never stalls the game
//! - The [`GameRegistry`] spawns sessions for matched players and tears them
//!   down when a session reports that its game finished or was abandoned

pub mod actor;
pub mod config;
pub mod errors;
pub mod messages;
pub mod registry;

/// Game ID type
pub type GameId = i64;

pub use actor::{GameActor, GameHandle};
pub use config::SessionConfig;
pub use errors::{SessionError, SessionResult};
pub use messages::{Outbound, SessionMessage};
pub use registry::{GameRegistry, RegistryStats};

//! Player identity: directory, password checks and connection tickets.
//!
//! This module implements:
//! - A [`PlayerDirectory`] trait for creating, finding and authenticating players
//! - An in-memory directory with Argon2id password hashing and a server-side pepper
//! - HS256 JWT connection tickets (1-hour expiry by default)
//!
//! ## Example
//!
//! ```no_run
//! use hearts::auth::{InMemoryPlayerDirectory, PlayerDirectory, TicketService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = InMemoryPlayerDirectory::new("secret_pepper".to_string());
//!     let tickets = TicketService::new("ticket_secret".to_string());
//!
//!     let id = directory.create_player("player1", "SecurePass123").await?;
//!     let ticket = tickets.issue_ticket(id)?;
//!     assert_eq!(tickets.resolve_ticket(&ticket), Some(id));
//!     Ok(())
//! }
//! ```

pub mod directory;
pub mod errors;
pub mod models;
pub mod tickets;

pub use directory::{InMemoryPlayerDirectory, PlayerDirectory};
pub use errors::{AuthError, AuthResult};
pub use models::{Player, PlayerId, PlayerStatus, TicketClaims};
pub use tickets::{DEFAULT_TICKET_TTL, TicketService};

//! Matchmaking: a FIFO of waiting players that is drained four at a time.
//!
//! Registration hands out a [`MatchTicket`] that resolves to the id of the
//! game the player was placed in, or to [`QueueError::PlayerUnregistered`]
//! if the player left first. Matching and cancellation are serialized by a
//! single lock, so each player is resolved exactly once.

pub mod errors;
pub mod queue;

pub use errors::{QueueError, QueueResult};
pub use queue::{GameCreator, MatchTicket, MatchmakingQueue};

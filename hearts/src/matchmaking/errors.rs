//! Matchmaking error types.

use thiserror::Error;

use crate::auth::PlayerId;

/// Matchmaking errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum QueueError {
    /// The player left the queue before a match was found
    #[error("player left the queue")]
    PlayerUnregistered,

    /// The player is already waiting for a match
    #[error("player {0} is already in the queue")]
    AlreadyRegistered(PlayerId),

    /// The player already has a seat in a running game
    #[error("player {0} is already in a game")]
    AlreadyInGame(PlayerId),

    /// A group of four was matched but no game could be created
    #[error("game creation failed: {0}")]
    GameCreationFailed(String),

    /// The queue went away while the ticket was pending
    #[error("matchmaking queue closed")]
    QueueClosed,
}

/// Result type for matchmaking operations
pub type QueueResult<T> = Result<T, QueueError>;

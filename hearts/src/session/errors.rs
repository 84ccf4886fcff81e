use thiserror::Error;

use super::GameId;
use crate::{
    auth::PlayerId,
    game::{GameError, Seat},
};

/// Errors from game sessions and the session registry.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SessionError {
    #[error("seat {0} already has a connection")]
    PlayerAlreadyConnected(Seat),
    #[error("player {0} doesn't belong to this game")]
    PlayerNotInGame(PlayerId),
    #[error("player {0} is already in a game")]
    PlayerAlreadyInGame(PlayerId),
    #[error("game {0} not found")]
    GameNotFound(GameId),
    #[error("game session is closed")]
    SessionClosed,
    #[error("{0}")]
    Game(#[from] GameError),
}

pub type SessionResult<T> = Result<T, SessionError>;

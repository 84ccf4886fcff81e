use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::Seat;

/// Why a card (or a set of passed cards) was refused.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum MoveViolation {
    #[error("card is not in hand")]
    CardNotInHand,
    #[error("the first card of a round must be the two of clubs")]
    MustLeadTwoOfClubs,
    #[error("must follow the lead suit")]
    MustFollowSuit,
    #[error("hearts have not been broken")]
    HeartsNotBroken,
    #[error("point cards can't be played on the first trick")]
    PointsOnFirstTrick,
    #[error("exactly 3 cards must be passed")]
    WrongPassCount,
    #[error("the same card can't be passed twice")]
    DuplicatePassCard,
}

/// Errors raised by the round and game engines. A failed operation never
/// changes game state.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("invalid move: {0}")]
    InvalidMove(MoveViolation),
    #[error("cards not in hand")]
    CardsNotInHand,
    #[error("cards already passed")]
    CardsAlreadyPassed,
    #[error("players yet to pass")]
    PlayersYetToPass,
    #[error("not your turn")]
    NotYourTurn,
    #[error("no hand holds the two of clubs")]
    InvalidHand,
    #[error("invalid seat {0}")]
    InvalidSeat(Seat),
    #[error("trick has no cards")]
    EmptyTrick,
    #[error("round not in progress")]
    RoundNotInProgress,
    #[error("passing not in progress")]
    PassingNotInProgress,
    #[error("game already started")]
    GameAlreadyStarted,
}

impl From<MoveViolation> for GameError {
    fn from(violation: MoveViolation) -> Self {
        Self::InvalidMove(violation)
    }
}

pub type GameResult<T> = Result<T, GameError>;

//! Game session actor message types.

use tokio::sync::{mpsc, oneshot};

use super::SessionResult;
use crate::{
    auth::PlayerId,
    bridge::protocol::{GameSnapshot, ServerMessage},
    game::{Card, GameResult, Seat},
};

/// Per-seat outbound FIFO. Only the session actor writes to it.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

/// Messages that can be sent to a GameActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Attach a connection to a seat
    Connect {
        seat: Seat,
        player_id: PlayerId,
        name: String,
        outbound: Outbound,
        response: oneshot::Sender<SessionResult<()>>,
    },

    /// Detach the connection of a seat
    Disconnect { seat: Seat, player_id: PlayerId },

    /// Play a card for a seat
    PlayCard {
        seat: Seat,
        card: Card,
        response: oneshot::Sender<GameResult<()>>,
    },

    /// Pass three cards for a seat
    PassCards {
        seat: Seat,
        cards: Vec<Card>,
        response: oneshot::Sender<GameResult<()>>,
    },

    /// Get the game as seen from a seat
    GetState {
        seat: Seat,
        response: oneshot::Sender<GameSnapshot>,
    },

    /// Whether a seat currently has a connection
    IsConnected {
        seat: Seat,
        response: oneshot::Sender<bool>,
    },

    /// Stop the session without notifying the registry
    Close,
}

//! JSON protocol spoken over a game connection.
//!
//! Every frame is an object with a `type` tag. Client commands carry a
//! `command_id` that the server echoes in exactly one reply.

use serde::{Deserialize, Serialize};

use crate::{
    auth::PlayerId,
    game::{Card, GameState, PassDirection, Play, Seat, constants::NUM_SEATS},
    session::GameId,
};

/// Client-chosen correlation ID.
pub type CommandId = u64;

/// Commands a client can send.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Authenticate with either a ticket or a name and password.
    Auth {
        command_id: CommandId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ticket: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    PlayCard {
        command_id: CommandId,
        card: Card,
    },
    PassCard {
        command_id: CommandId,
        cards: Vec<Card>,
    },
    GetState {
        command_id: CommandId,
    },
    /// Leave the matchmaking queue.
    Cancel {
        command_id: CommandId,
    },
}

impl ClientCommand {
    pub fn command_id(&self) -> CommandId {
        match self {
            Self::Auth { command_id, .. }
            | Self::PlayCard { command_id, .. }
            | Self::PassCard { command_id, .. }
            | Self::GetState { command_id }
            | Self::Cancel { command_id } => *command_id,
        }
    }
}

/// A frame that couldn't be turned into a [`ClientCommand`].
#[derive(Clone, Debug, PartialEq)]
pub struct MalformedCommand {
    /// Present when the frame was an object with a usable `command_id`.
    pub command_id: Option<CommandId>,
    pub reason: String,
}

/// Parse a text frame. Frames that carry a `command_id` but are otherwise
/// invalid keep the ID so the failure can still be correlated.
pub fn parse_command(frame: &str) -> Result<ClientCommand, MalformedCommand> {
    let value: serde_json::Value = serde_json::from_str(frame).map_err(|e| MalformedCommand {
        command_id: None,
        reason: format!("invalid JSON: {e}"),
    })?;
    let command_id = value.get("command_id").and_then(serde_json::Value::as_u64);
    serde_json::from_value(value).map_err(|e| MalformedCommand {
        command_id,
        reason: format!("invalid command: {e}"),
    })
}

/// Phase-specific part of a [`GameSnapshot`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PhaseSnapshot {
    Playing {
        round_number: u32,
        hand: Vec<Card>,
        trick: Vec<Play>,
        current_player: Seat,
        round_scores: [u32; NUM_SEATS],
        is_hearts_broken: bool,
        is_first_trick: bool,
        /// What this seat was passed at the start of the round.
        received_cards: Vec<Card>,
    },
    Passing {
        round_number: u32,
        hand: Vec<Card>,
        pass_direction: PassDirection,
        have_passed: bool,
        received_cards: Vec<Card>,
    },
}

/// Everything one seat is allowed to see about its game.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    /// Player name per seat, `None` while the seat is disconnected.
    pub players: [Option<String>; NUM_SEATS],
    pub player_ids: [PlayerId; NUM_SEATS],
    pub scores: [u32; NUM_SEATS],
    pub state: GameState,
    pub state_data: Option<PhaseSnapshot>,
}

/// Frames the server sends.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    CommandSuccess {
        command_id: CommandId,
    },
    CommandFail {
        command_id: CommandId,
        reason: String,
    },
    QuerySuccess {
        command_id: CommandId,
        data: GameSnapshot,
    },
    /// Sent once a match is found and the connection is seated.
    ConnectedToGame {
        game_id: GameId,
        index: Seat,
    },
    GameData {
        data: GameSnapshot,
    },
    PlayerConnected {
        index: Seat,
        player: String,
    },
    PlayerDisconnected {
        index: Seat,
    },
    StartRound {
        round_number: u32,
        pass_direction: PassDirection,
        hand: Vec<Card>,
    },
    FinishPassing {
        received_cards: Vec<Card>,
    },
    PlayCard {
        player: Seat,
        card: Card,
    },
    FinishTrick {
        winner: Seat,
        points: u32,
    },
    FinishRound {
        round_scores: [u32; NUM_SEATS],
        scores: [u32; NUM_SEATS],
    },
    FinishGame {
        scores: [u32; NUM_SEATS],
    },
}

impl ServerMessage {
    pub fn success(command_id: CommandId) -> Self {
        Self::CommandSuccess { command_id }
    }

    pub fn fail(command_id: CommandId, reason: impl Into<String>) -> Self {
        Self::CommandFail {
            command_id,
            reason: reason.into(),
        }
    }
}

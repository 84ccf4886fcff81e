//! Player identity models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Player ID type
pub type PlayerId = i64;

/// What a player is currently doing.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    #[default]
    Idle,
    Queuing,
    InGame,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Idle => "idle",
            Self::Queuing => "queuing",
            Self::InGame => "in_game",
        };
        write!(f, "{repr}")
    }
}

/// Player model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub status: PlayerStatus,
}

/// JWT claims for a connection ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketClaims {
    pub sub: PlayerId, // Player ID
    pub jti: String,   // Unique ticket ID
    pub exp: i64,      // Expiration timestamp
    pub iat: i64,      // Issued at timestamp
}

//! Client connections: the wire protocol and the per-connection flow that
//! moves a client from authentication through matchmaking into its game.
//!
//! The bridge is transport agnostic. A transport feeds text frames into an
//! mpsc channel and drains [`ServerMessage`]s from another; closing the
//! inbound channel is how it reports a disconnect.

pub mod connection;
pub mod protocol;

pub use connection::{Bridge, ConnectionEnd};
pub use protocol::{
    ClientCommand, CommandId, GameSnapshot, MalformedCommand, PhaseSnapshot, ServerMessage,
    parse_command,
};

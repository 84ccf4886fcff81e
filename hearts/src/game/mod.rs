//! Hearts rules engine.
//!
//! This module provides the card game itself, with no notion of networking:
//! - Cards, hands, seats and pass directions
//! - Dealing, trick resolution and scoring helpers
//! - The passing phase ([`PreRound`]) and playing phase ([`Round`]) of a round
//! - The phase state machine ([`Game`]) that sequences rounds until someone
//!   reaches the score limit, queueing [`GameEvent`]s for observers

pub mod constants;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod preround;
pub mod round;
pub mod state_machine;

pub use entities::{
    Card, Hand, PassDirection, Play, QUEEN_OF_SPADES, Rank, Seat, Suit, TWO_OF_CLUBS,
};
pub use errors::{GameError, GameResult, MoveViolation};
pub use preround::{PassResult, PreRound};
pub use round::{PlayOutcome, Round, TrickResult};
pub use state_machine::{Dealer, Game, GameEvent, GameState};

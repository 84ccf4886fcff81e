//! # Hearts
//!
//! A four-player Hearts engine and the session plumbing to run it as a
//! networked service.
//!
//! ## Architecture
//!
//! A game moves through four states:
//!
//! - **Init**: Created, nothing dealt yet
//! - **Passing**: Each seat hands three cards to a neighbour (skipped every
//!   fourth round)
//! - **Playing**: Thirteen tricks, led by the holder of the two of clubs
//! - **GameOver**: Someone reached 100 points at the end of a round
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, rules, and the game state machine
//! - [`auth`]: Player directory, password hashing, and auth tickets
//! - [`matchmaking`]: FIFO queue that groups waiting players into games
//! - [`session`]: One actor per running game plus the registry that owns them
//! - [`bridge`]: JSON protocol and the per-connection flow
//!
//! ## Example
//!
//! ```
//! use hearts::{Game, GameState};
//!
//! let mut game = Game::new();
//! game.start().unwrap();
//! assert_eq!(game.state(), GameState::Passing);
//! ```

/// Player accounts and authentication.
pub mod auth;

/// Client protocol and connection handling.
pub mod bridge;

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    Card, Game, GameError, GameEvent, GameResult, GameState, MoveViolation, PassDirection, Rank,
    Seat, Suit, constants, entities, functional,
};

/// Grouping waiting players into games.
pub mod matchmaking;

/// Running game sessions.
pub mod session;

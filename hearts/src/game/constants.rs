//! Table-wide constants for a game of Hearts.

pub const NUM_SEATS: usize = 4;
pub const HAND_SIZE: usize = 13;
pub const DECK_SIZE: usize = NUM_SEATS * HAND_SIZE;

/// Number of cards each seat hands over during a passing phase.
pub const PASS_COUNT: usize = 3;

/// Total penalty points dealt out in a single round.
pub const MOON_POINTS: u32 = 26;

pub const QUEEN_OF_SPADES_POINTS: u32 = 13;
pub const HEART_POINTS: u32 = 1;

/// The game ends once any seat's cumulative score reaches this value.
pub const GAME_OVER_SCORE: u32 = 100;

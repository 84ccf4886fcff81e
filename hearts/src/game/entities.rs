use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeSet, fmt, str::FromStr};
use thiserror::Error;

use super::constants::NUM_SEATS;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];

    /// Single-letter wire form.
    pub fn letter(self) -> char {
        match self {
            Self::Club => 'c',
            Self::Spade => 's',
            Self::Diamond => 'd',
            Self::Heart => 'h',
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'c' => Some(Self::Club),
            's' => Some(Self::Spade),
            'd' => Some(Self::Diamond),
            'h' => Some(Self::Heart),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Card ranks, ordered from lowest to highest. Aces are high.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric strength of the rank (two=2 ... ace=14).
    pub fn value(self) -> u8 {
        self as u8 + 2
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "j",
            Self::Queen => "q",
            Self::King => "k",
            Self::Ace => "1",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        let rank = match symbol.to_ascii_lowercase().as_str() {
            "2" => Self::Two,
            "3" => Self::Three,
            "4" => Self::Four,
            "5" => Self::Five,
            "6" => Self::Six,
            "7" => Self::Seven,
            "8" => Self::Eight,
            "9" => Self::Nine,
            "10" => Self::Ten,
            "j" => Self::Jack,
            "q" => Self::Queen,
            "k" => Self::King,
            "1" | "a" => Self::Ace,
            _ => return None,
        };
        Some(rank)
    }
}

#[derive(Debug, Clone, Eq, Error, PartialEq)]
#[error("invalid card: {0:?}")]
pub struct CardParseError(pub String);

/// A playing card. Ordering is by suit first, then rank, which is the order
/// hands are presented to players.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

pub const TWO_OF_CLUBS: Card = Card::new(Suit::Club, Rank::Two);
pub const QUEEN_OF_SPADES: Card = Card::new(Suit::Spade, Rank::Queen);

impl Card {
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Hearts and the queen of spades carry penalty points.
    pub fn is_point_card(&self) -> bool {
        self.suit == Suit::Heart || *self == QUEEN_OF_SPADES
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.suit.letter(), self.rank.symbol())
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let suit = chars
            .next()
            .and_then(Suit::from_letter)
            .ok_or_else(|| CardParseError(s.to_string()))?;
        let rank = Rank::from_symbol(chars.as_str()).ok_or_else(|| CardParseError(s.to_string()))?;
        Ok(Self::new(suit, rank))
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = String::deserialize(deserializer)?;
        repr.parse().map_err(serde::de::Error::custom)
    }
}

/// A seat's cards. Iteration yields cards sorted by suit then rank.
pub type Hand = BTreeSet<Card>;

/// Seat index at the table, `0..NUM_SEATS`. Seat order is turn order.
pub type Seat = usize;

/// The seat that plays after `seat`.
pub fn next_seat(seat: Seat) -> Seat {
    (seat + 1) % NUM_SEATS
}

/// Which way cards travel during a round's passing phase.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassDirection {
    Left,
    Right,
    Across,
    None,
}

impl PassDirection {
    /// Directions rotate left, right, across, none, starting at round 1.
    pub fn for_round(round_number: u32) -> Self {
        match round_number.saturating_sub(1) % 4 {
            0 => Self::Left,
            1 => Self::Right,
            2 => Self::Across,
            _ => Self::None,
        }
    }

    /// Seat offset from giver to receiver.
    pub fn offset(self) -> usize {
        match self {
            Self::Left => 1,
            Self::Across => 2,
            Self::Right => 3,
            Self::None => 0,
        }
    }

    /// The seat receiving the cards `giver` passes.
    pub fn receiver_of(self, giver: Seat) -> Seat {
        (giver + self.offset()) % NUM_SEATS
    }

    /// The seat whose passed cards end up with `receiver`.
    pub fn giver_of(self, receiver: Seat) -> Seat {
        (receiver + NUM_SEATS - self.offset()) % NUM_SEATS
    }
}

impl fmt::Display for PassDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Across => "across",
            Self::None => "none",
        };
        write!(f, "{repr}")
    }
}

/// A single card laid on the table by a seat.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Play {
    #[serde(rename = "player")]
    pub seat: Seat,
    pub card: Card,
}

impl fmt::Display for Play {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "seat {} played {}", self.seat, self.card)
    }
}

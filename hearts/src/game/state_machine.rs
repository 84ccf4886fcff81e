//! Hearts game state machine.
//!
//! A [`Game`] moves through `init -> passing -> playing -> ... -> game_over`.
//! Each phase is its own struct carrying only the data valid in that phase;
//! queries that make no sense for the current phase fail with the matching
//! phase error instead of returning stale data.

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};

use super::{
    constants::{GAME_OVER_SCORE, NUM_SEATS},
    entities::{Card, Hand, PassDirection, Play, Seat},
    errors::{GameError, GameResult},
    functional::{check_seat, deal_hands},
    preround::{PassResult, PreRound},
    round::{PlayOutcome, Round},
};

/// Coarse lifecycle state, as reported to clients.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Init,
    Passing,
    Playing,
    GameOver,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Init => "init",
            Self::Passing => "passing",
            Self::Playing => "playing",
            Self::GameOver => "game_over",
        };
        write!(f, "{repr}")
    }
}

/// Things observers need to hear about, in the order they happened.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameEvent {
    RoundStarted {
        round_number: u32,
        pass_direction: PassDirection,
        hands: [Vec<Card>; NUM_SEATS],
    },
    PassingFinished {
        received: [Vec<Card>; NUM_SEATS],
    },
    CardPlayed {
        seat: Seat,
        card: Card,
    },
    TrickFinished {
        winner: Seat,
        points: u32,
    },
    RoundFinished {
        round_number: u32,
        round_scores: [u32; NUM_SEATS],
        scores: [u32; NUM_SEATS],
    },
    GameFinished {
        scores: [u32; NUM_SEATS],
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::RoundStarted {
                round_number,
                pass_direction,
                ..
            } => format!("round {round_number} started, passing {pass_direction}"),
            Self::PassingFinished { .. } => "passing finished".to_string(),
            Self::CardPlayed { seat, card } => format!("seat {seat} played {card}"),
            Self::TrickFinished { winner, points } => {
                format!("seat {winner} took the trick for {points} points")
            }
            Self::RoundFinished {
                round_number,
                round_scores,
                ..
            } => format!("round {round_number} finished with {round_scores:?}"),
            Self::GameFinished { scores } => format!("game finished with {scores:?}"),
        };
        write!(f, "{repr}")
    }
}

/// Phase-specific queries. Defaults report that the phase is wrong.
#[enum_dispatch]
pub trait PhaseQueries {
    fn state(&self) -> GameState;

    fn hand(&self, _seat: Seat) -> GameResult<Vec<Card>> {
        Err(GameError::RoundNotInProgress)
    }

    fn current_player(&self) -> GameResult<Seat> {
        Err(GameError::RoundNotInProgress)
    }

    fn trick(&self) -> GameResult<Vec<Play>> {
        Err(GameError::RoundNotInProgress)
    }

    fn round_scores(&self) -> GameResult<[u32; NUM_SEATS]> {
        Err(GameError::RoundNotInProgress)
    }

    fn hearts_broken(&self) -> GameResult<bool> {
        Err(GameError::RoundNotInProgress)
    }

    fn first_trick(&self) -> GameResult<bool> {
        Err(GameError::RoundNotInProgress)
    }

    fn legal_moves(&self, _seat: Seat) -> GameResult<Vec<Card>> {
        Err(GameError::RoundNotInProgress)
    }

    fn cards_passed_in(&self, _seat: Seat) -> GameResult<Vec<Card>> {
        Err(GameError::RoundNotInProgress)
    }

    fn pass_direction(&self) -> GameResult<PassDirection> {
        Err(GameError::PassingNotInProgress)
    }

    fn received_cards(&self, _seat: Seat) -> GameResult<Vec<Card>> {
        Err(GameError::PassingNotInProgress)
    }

    fn player_passed(&self, _seat: Seat) -> GameResult<bool> {
        Err(GameError::PassingNotInProgress)
    }
}

#[derive(Debug)]
pub struct Init;

impl PhaseQueries for Init {
    fn state(&self) -> GameState {
        GameState::Init
    }
}

#[derive(Debug)]
pub struct Passing {
    preround: PreRound,
}

impl PhaseQueries for Passing {
    fn state(&self) -> GameState {
        GameState::Passing
    }

    fn hand(&self, seat: Seat) -> GameResult<Vec<Card>> {
        self.preround.get_hand(seat)
    }

    fn pass_direction(&self) -> GameResult<PassDirection> {
        Ok(self.preround.direction())
    }

    fn received_cards(&self, seat: Seat) -> GameResult<Vec<Card>> {
        self.preround.get_received_cards(seat)
    }

    fn player_passed(&self, seat: Seat) -> GameResult<bool> {
        self.preround.has_player_passed(seat)
    }
}

#[derive(Debug)]
pub struct Playing {
    round: Round,
}

impl PhaseQueries for Playing {
    fn state(&self) -> GameState {
        GameState::Playing
    }

    fn hand(&self, seat: Seat) -> GameResult<Vec<Card>> {
        self.round.get_hand(seat)
    }

    fn current_player(&self) -> GameResult<Seat> {
        Ok(self.round.get_current_player())
    }

    fn trick(&self) -> GameResult<Vec<Play>> {
        Ok(self.round.get_trick().to_vec())
    }

    fn round_scores(&self) -> GameResult<[u32; NUM_SEATS]> {
        Ok(self.round.get_scores())
    }

    fn hearts_broken(&self) -> GameResult<bool> {
        Ok(self.round.is_hearts_broken())
    }

    fn first_trick(&self) -> GameResult<bool> {
        Ok(self.round.is_first_trick())
    }

    fn legal_moves(&self, seat: Seat) -> GameResult<Vec<Card>> {
        self.round.legal_moves(seat)
    }

    fn cards_passed_in(&self, seat: Seat) -> GameResult<Vec<Card>> {
        self.round.get_received_cards(seat)
    }
}

#[derive(Debug)]
pub struct GameOver;

impl PhaseQueries for GameOver {
    fn state(&self) -> GameState {
        GameState::GameOver
    }
}

#[enum_dispatch(PhaseQueries)]
#[derive(Debug)]
pub enum Phase {
    Init,
    Passing,
    Playing,
    GameOver,
}

/// Produces a fresh deal at the start of every round.
pub type Dealer = Box<dyn FnMut() -> [Hand; NUM_SEATS] + Send>;

pub struct Game {
    phase: Phase,
    round_number: u32,
    scores: [u32; NUM_SEATS],
    dealer: Dealer,
    events: VecDeque<GameEvent>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase)
            .field("round_number", &self.round_number)
            .field("scores", &self.scores)
            .finish_non_exhaustive()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game dealt from a uniformly shuffled deck.
    pub fn new() -> Self {
        Self::with_dealer(Box::new(deal_hands))
    }

    /// A game whose deals come from `dealer`.
    pub fn with_dealer(dealer: Dealer) -> Self {
        Self {
            phase: Init.into(),
            round_number: 0,
            scores: [0; NUM_SEATS],
            dealer,
            events: VecDeque::new(),
        }
    }

    /// Deal the first round.
    ///
    /// # Errors
    ///
    /// `GameAlreadyStarted` unless the game is still in `init`.
    pub fn start(&mut self) -> GameResult<()> {
        if self.state() != GameState::Init {
            return Err(GameError::GameAlreadyStarted);
        }
        self.start_round()
    }

    pub fn state(&self) -> GameState {
        self.phase.state()
    }

    pub fn get_scores(&self) -> [u32; NUM_SEATS] {
        self.scores
    }

    pub fn get_round_number(&self) -> u32 {
        self.round_number
    }

    pub fn get_hand(&self, seat: Seat) -> GameResult<Vec<Card>> {
        check_seat(seat)?;
        self.phase.hand(seat)
    }

    pub fn get_current_player(&self) -> GameResult<Seat> {
        self.phase.current_player()
    }

    pub fn get_trick(&self) -> GameResult<Vec<Play>> {
        self.phase.trick()
    }

    pub fn get_round_scores(&self) -> GameResult<[u32; NUM_SEATS]> {
        self.phase.round_scores()
    }

    pub fn is_hearts_broken(&self) -> GameResult<bool> {
        self.phase.hearts_broken()
    }

    pub fn is_first_trick(&self) -> GameResult<bool> {
        self.phase.first_trick()
    }

    pub fn get_legal_moves(&self, seat: Seat) -> GameResult<Vec<Card>> {
        check_seat(seat)?;
        self.phase.legal_moves(seat)
    }

    pub fn get_pass_direction(&self) -> GameResult<PassDirection> {
        self.phase.pass_direction()
    }

    pub fn get_received_cards(&self, seat: Seat) -> GameResult<Vec<Card>> {
        check_seat(seat)?;
        self.phase.received_cards(seat)
    }

    pub fn has_player_passed(&self, seat: Seat) -> GameResult<bool> {
        check_seat(seat)?;
        self.phase.player_passed(seat)
    }

    /// Cards `seat` was given when this round's passing finished. Empty on
    /// rounds without passing.
    pub fn get_cards_passed_in(&self, seat: Seat) -> GameResult<Vec<Card>> {
        check_seat(seat)?;
        self.phase.cards_passed_in(seat)
    }

    /// Take every event produced since the last drain.
    pub fn drain_events(&mut self) -> VecDeque<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Commit `seat`'s passed cards. The last seat to pass triggers the
    /// exchange and the start of play.
    pub fn pass_cards(&mut self, seat: Seat, cards: &[Card]) -> GameResult<()> {
        let Phase::Passing(passing) = &mut self.phase else {
            return Err(GameError::PassingNotInProgress);
        };
        passing.preround.pass_cards(seat, cards)?;
        if !passing.preround.have_all_passed() {
            return Ok(());
        }

        let PassResult { hands, received } = passing.preround.finish_passing()?;
        let round = Round::with_received(hands, received.clone())?;
        self.events.push_back(GameEvent::PassingFinished { received });
        self.phase = Playing { round }.into();
        Ok(())
    }

    /// Play `card` for whoever's turn it is.
    pub fn play_card(&mut self, card: Card) -> GameResult<PlayOutcome> {
        let Phase::Playing(playing) = &mut self.phase else {
            return Err(GameError::RoundNotInProgress);
        };
        let outcome = playing.round.play_card(card)?;

        self.events.push_back(GameEvent::CardPlayed {
            seat: outcome.play.seat,
            card,
        });
        if let Some(trick) = &outcome.trick {
            self.events.push_back(GameEvent::TrickFinished {
                winner: trick.winner,
                points: trick.points,
            });
        }
        if let Some(round_scores) = outcome.round_scores {
            self.finish_round(round_scores)?;
        }
        Ok(outcome)
    }

    /// Play `card` on behalf of `seat`.
    ///
    /// # Errors
    ///
    /// `NotYourTurn` if `seat` isn't the current player.
    pub fn play_card_as(&mut self, seat: Seat, card: Card) -> GameResult<PlayOutcome> {
        check_seat(seat)?;
        if self.get_current_player()? != seat {
            return Err(GameError::NotYourTurn);
        }
        self.play_card(card)
    }

    fn start_round(&mut self) -> GameResult<()> {
        let round_number = self.round_number + 1;
        let pass_direction = PassDirection::for_round(round_number);
        let hands = (self.dealer)();
        let dealt: [Vec<Card>; NUM_SEATS] = hands.clone().map(|hand| hand.into_iter().collect());

        let phase: Phase = if pass_direction == PassDirection::None {
            Playing {
                round: Round::new(hands)?,
            }
            .into()
        } else {
            Passing {
                preround: PreRound::new(hands, pass_direction),
            }
            .into()
        };

        self.round_number = round_number;
        self.phase = phase;
        self.events.push_back(GameEvent::RoundStarted {
            round_number,
            pass_direction,
            hands: dealt,
        });
        Ok(())
    }

    fn finish_round(&mut self, round_scores: [u32; NUM_SEATS]) -> GameResult<()> {
        for (total, points) in self.scores.iter_mut().zip(round_scores) {
            *total += points;
        }
        self.events.push_back(GameEvent::RoundFinished {
            round_number: self.round_number,
            round_scores,
            scores: self.scores,
        });

        if self.scores.iter().any(|&score| score >= GAME_OVER_SCORE) {
            self.phase = GameOver.into();
            self.events.push_back(GameEvent::GameFinished {
                scores: self.scores,
            });
            return Ok(());
        }
        self.start_round()
    }
}

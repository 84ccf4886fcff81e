use super::{
    constants::NUM_SEATS,
    entities::{Card, Hand, Play, Seat, Suit, TWO_OF_CLUBS, next_seat},
    errors::{GameError, GameResult, MoveViolation},
    functional::{check_seat, find_trick_winner, shoot_the_moon, trick_points},
};

/// A completed trick.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrickResult {
    pub winner: Seat,
    pub points: u32,
    pub plays: Vec<Play>,
}

/// What happened as a result of one accepted card.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayOutcome {
    pub play: Play,
    /// Set when the card completed a trick.
    pub trick: Option<TrickResult>,
    /// Final round scores (moon shot applied) when the card ended the round.
    pub round_scores: Option<[u32; NUM_SEATS]>,
}

/// The playing phase of a round: 13 tricks, starting with the two of clubs.
#[derive(Clone, Debug)]
pub struct Round {
    hands: [Hand; NUM_SEATS],
    received: [Vec<Card>; NUM_SEATS],
    scores: [u32; NUM_SEATS],
    current_player: Seat,
    trick: Vec<Play>,
    is_first_move: bool,
    is_first_trick: bool,
    is_hearts_broken: bool,
}

impl Round {
    /// # Errors
    ///
    /// `InvalidHand` if no hand holds the two of clubs.
    pub fn new(hands: [Hand; NUM_SEATS]) -> GameResult<Self> {
        Self::with_received(hands, Default::default())
    }

    /// Build a round from post-passing hands, remembering what each seat got.
    pub fn with_received(
        hands: [Hand; NUM_SEATS],
        received: [Vec<Card>; NUM_SEATS],
    ) -> GameResult<Self> {
        let current_player = hands
            .iter()
            .position(|hand| hand.contains(&TWO_OF_CLUBS))
            .ok_or(GameError::InvalidHand)?;
        Ok(Self {
            hands,
            received,
            scores: [0; NUM_SEATS],
            current_player,
            trick: Vec::with_capacity(NUM_SEATS),
            is_first_move: true,
            is_first_trick: true,
            is_hearts_broken: false,
        })
    }

    pub fn get_hand(&self, seat: Seat) -> GameResult<Vec<Card>> {
        Ok(self.hands[check_seat(seat)?].iter().copied().collect())
    }

    pub fn get_received_cards(&self, seat: Seat) -> GameResult<Vec<Card>> {
        Ok(self.received[check_seat(seat)?].clone())
    }

    pub fn get_current_player(&self) -> Seat {
        self.current_player
    }

    pub fn get_trick(&self) -> &[Play] {
        &self.trick
    }

    pub fn get_score(&self, seat: Seat) -> GameResult<u32> {
        Ok(self.scores[check_seat(seat)?])
    }

    pub fn get_scores(&self) -> [u32; NUM_SEATS] {
        self.scores
    }

    pub fn is_hearts_broken(&self) -> bool {
        self.is_hearts_broken
    }

    pub fn is_first_trick(&self) -> bool {
        self.is_first_trick
    }

    pub fn is_finished(&self) -> bool {
        self.trick.is_empty() && self.hands.iter().all(Hand::is_empty)
    }

    /// Cards `seat` could legally play if it were its turn.
    pub fn legal_moves(&self, seat: Seat) -> GameResult<Vec<Card>> {
        check_seat(seat)?;
        Ok(self.hands[seat]
            .iter()
            .copied()
            .filter(|card| self.check_play(seat, *card).is_ok())
            .collect())
    }

    fn check_play(&self, seat: Seat, card: Card) -> Result<(), MoveViolation> {
        let hand = &self.hands[seat];
        if !hand.contains(&card) {
            return Err(MoveViolation::CardNotInHand);
        }
        if self.is_first_move {
            if card == TWO_OF_CLUBS {
                return Ok(());
            }
            return Err(MoveViolation::MustLeadTwoOfClubs);
        }

        let lead = self.trick.first().map(|play| play.card.suit);
        let holds_lead = lead.is_some_and(|suit| hand.iter().any(|c| c.suit == suit));
        match lead {
            Some(suit) if holds_lead && card.suit != suit => {
                return Err(MoveViolation::MustFollowSuit);
            }
            None if card.suit == Suit::Heart
                && !self.is_hearts_broken
                && hand.iter().any(|c| c.suit != Suit::Heart) =>
            {
                return Err(MoveViolation::HeartsNotBroken);
            }
            _ => {}
        }

        if self.is_first_trick && card.is_point_card() {
            // Waived when every card the suit rule allows carries points.
            let has_safe_card = hand
                .iter()
                .filter(|c| !holds_lead || Some(c.suit) == lead)
                .any(|c| !c.is_point_card());
            if has_safe_card {
                return Err(MoveViolation::PointsOnFirstTrick);
            }
        }
        Ok(())
    }

    /// Play `card` from the current player's hand.
    ///
    /// # Errors
    ///
    /// `InvalidMove` when the card breaks a rule; the round is left untouched.
    pub fn play_card(&mut self, card: Card) -> GameResult<PlayOutcome> {
        let seat = self.current_player;
        self.check_play(seat, card)?;

        self.hands[seat].remove(&card);
        let play = Play { seat, card };
        self.trick.push(play);
        if card.suit == Suit::Heart {
            self.is_hearts_broken = true;
        }
        self.is_first_move = false;
        self.current_player = next_seat(seat);

        let mut outcome = PlayOutcome {
            play,
            trick: None,
            round_scores: None,
        };
        if self.trick.len() == NUM_SEATS {
            outcome.trick = Some(self.finish_trick()?);
            if self.is_finished() {
                self.scores = shoot_the_moon(self.scores);
                outcome.round_scores = Some(self.scores);
            }
        }
        Ok(outcome)
    }

    fn finish_trick(&mut self) -> GameResult<TrickResult> {
        let winner = find_trick_winner(&self.trick)?;
        let plays = std::mem::take(&mut self.trick);
        let points = trick_points(plays.iter().map(|play| &play.card));
        self.scores[winner] += points;
        self.current_player = winner;
        self.is_first_trick = false;
        Ok(TrickResult {
            winner,
            points,
            plays,
        })
    }
}

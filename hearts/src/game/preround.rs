use std::collections::HashSet;

use super::{
    constants::{NUM_SEATS, PASS_COUNT},
    entities::{Card, Hand, PassDirection, Seat},
    errors::{GameError, GameResult, MoveViolation},
    functional::check_seat,
};

/// New hands after every seat's passed cards changed owner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PassResult {
    pub hands: [Hand; NUM_SEATS],
    /// Cards each seat received, indexed by receiving seat.
    pub received: [Vec<Card>; NUM_SEATS],
}

/// The passing phase of a round. Seats commit their outgoing cards one at a
/// time; hands only change once all four have committed.
#[derive(Clone, Debug)]
pub struct PreRound {
    direction: PassDirection,
    hands: [Hand; NUM_SEATS],
    passed: [Option<Vec<Card>>; NUM_SEATS],
}

impl PreRound {
    pub fn new(hands: [Hand; NUM_SEATS], direction: PassDirection) -> Self {
        Self {
            direction,
            hands,
            passed: Default::default(),
        }
    }

    pub fn direction(&self) -> PassDirection {
        self.direction
    }

    pub fn get_hand(&self, seat: Seat) -> GameResult<Vec<Card>> {
        Ok(self.hands[check_seat(seat)?].iter().copied().collect())
    }

    pub fn has_player_passed(&self, seat: Seat) -> GameResult<bool> {
        Ok(self.passed[check_seat(seat)?].is_some())
    }

    pub fn have_all_passed(&self) -> bool {
        self.passed.iter().all(Option::is_some)
    }

    /// Commit the three cards `seat` gives away this round.
    ///
    /// # Errors
    ///
    /// - `CardsAlreadyPassed` if the seat already committed.
    /// - `InvalidMove` if not exactly three distinct cards were given.
    /// - `CardsNotInHand` if any card isn't in the seat's hand.
    pub fn pass_cards(&mut self, seat: Seat, cards: &[Card]) -> GameResult<()> {
        check_seat(seat)?;
        if self.passed[seat].is_some() {
            return Err(GameError::CardsAlreadyPassed);
        }
        if cards.len() != PASS_COUNT {
            return Err(MoveViolation::WrongPassCount.into());
        }
        if cards.iter().collect::<HashSet<_>>().len() != cards.len() {
            return Err(MoveViolation::DuplicatePassCard.into());
        }
        if !cards.iter().all(|card| self.hands[seat].contains(card)) {
            return Err(GameError::CardsNotInHand);
        }
        let mut outgoing = cards.to_vec();
        outgoing.sort();
        self.passed[seat] = Some(outgoing);
        Ok(())
    }

    /// Cards `seat` is about to receive. Empty until `seat` itself has passed.
    pub fn get_received_cards(&self, seat: Seat) -> GameResult<Vec<Card>> {
        check_seat(seat)?;
        if self.passed[seat].is_none() {
            return Ok(Vec::new());
        }
        let giver = self.direction.giver_of(seat);
        Ok(self.passed[giver].clone().unwrap_or_default())
    }

    /// Move every committed card to its receiver.
    ///
    /// # Errors
    ///
    /// `PlayersYetToPass` unless all four seats have committed.
    pub fn finish_passing(&self) -> GameResult<PassResult> {
        let mut outgoing: [Vec<Card>; NUM_SEATS] = Default::default();
        for (seat, passed) in self.passed.iter().enumerate() {
            outgoing[seat] = passed.clone().ok_or(GameError::PlayersYetToPass)?;
        }

        let mut hands = self.hands.clone();
        for (seat, cards) in outgoing.iter().enumerate() {
            for card in cards {
                hands[seat].remove(card);
            }
        }
        let mut received: [Vec<Card>; NUM_SEATS] = Default::default();
        for (giver, cards) in outgoing.into_iter().enumerate() {
            let receiver = self.direction.receiver_of(giver);
            hands[receiver].extend(cards.iter().copied());
            received[receiver] = cards;
        }
        Ok(PassResult { hands, received })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{constants::HAND_SIZE, functional::deck};

    /// Seat `n` holds the n-th run of 13 cards from the canonical deck, so
    /// seat 0 has all the clubs, seat 1 the spades, and so on.
    fn suited_hands() -> [Hand; NUM_SEATS] {
        let cards = deck();
        std::array::from_fn(|seat| {
            cards[seat * HAND_SIZE..(seat + 1) * HAND_SIZE]
                .iter()
                .copied()
                .collect()
        })
    }

    fn first_three(preround: &PreRound, seat: Seat) -> Vec<Card> {
        preround.get_hand(seat).unwrap()[..3].to_vec()
    }

    fn pass_all(preround: &mut PreRound) {
        for seat in 0..NUM_SEATS {
            let cards = first_three(preround, seat);
            preround.pass_cards(seat, &cards).unwrap();
        }
    }

    #[test]
    fn test_pass_left_moves_cards_one_seat() {
        let mut preround = PreRound::new(suited_hands(), PassDirection::Left);
        let given: Vec<Vec<Card>> = (0..NUM_SEATS).map(|s| first_three(&preround, s)).collect();
        pass_all(&mut preround);
        let result = preround.finish_passing().unwrap();

        for giver in 0..NUM_SEATS {
            let receiver = (giver + 1) % NUM_SEATS;
            for card in &given[giver] {
                assert!(result.hands[receiver].contains(card));
                assert!(!result.hands[giver].contains(card));
            }
            assert_eq!(result.received[receiver], given[giver]);
        }
        for hand in &result.hands {
            assert_eq!(hand.len(), HAND_SIZE);
        }
    }

    #[test]
    fn test_pass_right_and_across() {
        for (direction, offset) in [(PassDirection::Right, 3), (PassDirection::Across, 2)] {
            let mut preround = PreRound::new(suited_hands(), direction);
            let given = first_three(&preround, 0);
            pass_all(&mut preround);
            let result = preround.finish_passing().unwrap();
            assert_eq!(result.received[offset], given);
        }
    }

    #[test]
    fn test_pass_requires_three_distinct_cards() {
        let mut preround = PreRound::new(suited_hands(), PassDirection::Left);
        let hand = preround.get_hand(0).unwrap();

        assert_eq!(
            preround.pass_cards(0, &hand[..2]),
            Err(GameError::InvalidMove(MoveViolation::WrongPassCount))
        );
        assert_eq!(
            preround.pass_cards(0, &[hand[0], hand[0], hand[1]]),
            Err(GameError::InvalidMove(MoveViolation::DuplicatePassCard))
        );
        assert!(!preround.has_player_passed(0).unwrap());
    }

    #[test]
    fn test_pass_rejects_cards_not_in_hand() {
        let mut preround = PreRound::new(suited_hands(), PassDirection::Left);
        let foreign = first_three(&preround, 1);
        assert_eq!(preround.pass_cards(0, &foreign), Err(GameError::CardsNotInHand));
    }

    #[test]
    fn test_pass_only_once() {
        let mut preround = PreRound::new(suited_hands(), PassDirection::Left);
        let cards = first_three(&preround, 2);
        preround.pass_cards(2, &cards).unwrap();
        assert_eq!(preround.pass_cards(2, &cards), Err(GameError::CardsAlreadyPassed));
        assert!(preround.has_player_passed(2).unwrap());
        assert!(!preround.have_all_passed());
    }

    #[test]
    fn test_hands_unchanged_until_all_passed() {
        let mut preround = PreRound::new(suited_hands(), PassDirection::Left);
        let cards = first_three(&preround, 0);
        preround.pass_cards(0, &cards).unwrap();
        assert_eq!(preround.get_hand(0).unwrap().len(), HAND_SIZE);
        assert_eq!(preround.finish_passing(), Err(GameError::PlayersYetToPass));
    }

    #[test]
    fn test_received_cards_hidden_until_own_pass() {
        let mut preround = PreRound::new(suited_hands(), PassDirection::Left);
        let from_zero = first_three(&preround, 0);
        preround.pass_cards(0, &from_zero).unwrap();

        assert!(preround.get_received_cards(1).unwrap().is_empty());
        let own = first_three(&preround, 1);
        preround.pass_cards(1, &own).unwrap();
        assert_eq!(preround.get_received_cards(1).unwrap(), from_zero);
    }

    #[test]
    fn test_invalid_seat() {
        let mut preround = PreRound::new(suited_hands(), PassDirection::Left);
        assert_eq!(preround.get_hand(4), Err(GameError::InvalidSeat(4)));
        assert_eq!(preround.pass_cards(9, &[]), Err(GameError::InvalidSeat(9)));
    }
}

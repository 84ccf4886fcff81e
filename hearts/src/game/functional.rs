//! Pure helpers for dealing, scoring and resolving tricks.

use rand::{Rng, seq::SliceRandom};

use super::{
    constants::{HAND_SIZE, HEART_POINTS, MOON_POINTS, NUM_SEATS, QUEEN_OF_SPADES_POINTS},
    entities::{Card, Hand, Play, QUEEN_OF_SPADES, Rank, Seat, Suit},
    errors::{GameError, GameResult},
};

/// All 52 cards, clubs first, each suit from two to ace.
pub fn deck() -> Vec<Card> {
    Suit::ALL
        .iter()
        .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(suit, rank)))
        .collect()
}

/// Shuffle a fresh deck and split it into four 13-card hands.
pub fn deal_hands() -> [Hand; NUM_SEATS] {
    deal_hands_with(&mut rand::rng())
}

/// Same as [`deal_hands`] with a caller-provided RNG.
pub fn deal_hands_with<R: Rng + ?Sized>(rng: &mut R) -> [Hand; NUM_SEATS] {
    let mut cards = deck();
    cards.shuffle(rng);
    let mut hands: [Hand; NUM_SEATS] = Default::default();
    for (hand, chunk) in hands.iter_mut().zip(cards.chunks(HAND_SIZE)) {
        hand.extend(chunk.iter().copied());
    }
    hands
}

/// The seat whose card wins the trick: the highest card of the lead suit.
///
/// # Errors
///
/// Returns [`GameError::EmptyTrick`] when no card has been played.
pub fn find_trick_winner(plays: &[Play]) -> GameResult<Seat> {
    let lead = plays.first().ok_or(GameError::EmptyTrick)?.card.suit;
    plays
        .iter()
        .filter(|play| play.card.suit == lead)
        .max_by_key(|play| play.card.rank)
        .map(|play| play.seat)
        .ok_or(GameError::EmptyTrick)
}

pub fn point_value(card: &Card) -> u32 {
    if *card == QUEEN_OF_SPADES {
        QUEEN_OF_SPADES_POINTS
    } else if card.suit == Suit::Heart {
        HEART_POINTS
    } else {
        0
    }
}

pub fn trick_points<'a>(cards: impl IntoIterator<Item = &'a Card>) -> u32 {
    cards.into_iter().map(point_value).sum()
}

/// If one seat took every point of the round, it scores zero and everyone
/// else takes the full 26.
pub fn shoot_the_moon(scores: [u32; NUM_SEATS]) -> [u32; NUM_SEATS] {
    let shooters = scores.iter().filter(|&&score| score == MOON_POINTS).count();
    if shooters != 1 {
        return scores;
    }
    scores.map(|score| if score == MOON_POINTS { 0 } else { MOON_POINTS })
}

/// Validate a seat index.
pub fn check_seat(seat: Seat) -> GameResult<Seat> {
    if seat < NUM_SEATS {
        Ok(seat)
    } else {
        Err(GameError::InvalidSeat(seat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    fn plays(cards: &[&str]) -> Vec<Play> {
        cards
            .iter()
            .enumerate()
            .map(|(seat, c)| Play { seat, card: card(c) })
            .collect()
    }

    #[test]
    fn test_deck_is_complete() {
        let cards = deck();
        assert_eq!(cards.len(), 52);
        assert_eq!(cards.iter().collect::<HashSet<_>>().len(), 52);
        assert_eq!(cards[0].to_string(), "c2");
        assert_eq!(cards[51].to_string(), "h1");
    }

    #[test]
    fn test_deal_partitions_deck() {
        let mut rng = StdRng::seed_from_u64(7);
        let hands = deal_hands_with(&mut rng);
        let mut seen = HashSet::new();
        for hand in &hands {
            assert_eq!(hand.len(), HAND_SIZE);
            for card in hand {
                assert!(seen.insert(*card), "{card} dealt twice");
            }
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn test_trick_winner_highest_of_lead_suit() {
        assert_eq!(find_trick_winner(&plays(&["c2", "c10", "c9", "c8"])), Ok(1));
        assert_eq!(find_trick_winner(&plays(&["d5", "h1", "s1", "d6"])), Ok(3));
        assert_eq!(find_trick_winner(&plays(&["sq", "s1", "sk", "h2"])), Ok(1));
    }

    #[test]
    fn test_trick_winner_partial_trick() {
        assert_eq!(find_trick_winner(&plays(&["h4"])), Ok(0));
        assert_eq!(find_trick_winner(&plays(&["h4", "hj"])), Ok(1));
    }

    #[test]
    fn test_trick_winner_empty() {
        assert_eq!(find_trick_winner(&[]), Err(GameError::EmptyTrick));
    }

    #[test]
    fn test_point_values() {
        assert_eq!(point_value(&card("sq")), 13);
        assert_eq!(point_value(&card("h1")), 1);
        assert_eq!(point_value(&card("sk")), 0);
        let total: u32 = trick_points(deck().iter());
        assert_eq!(total, MOON_POINTS);
    }

    #[test]
    fn test_shoot_the_moon() {
        assert_eq!(shoot_the_moon([26, 0, 0, 0]), [0, 26, 26, 26]);
        assert_eq!(shoot_the_moon([0, 0, 26, 0]), [26, 26, 0, 26]);
        assert_eq!(shoot_the_moon([13, 13, 0, 0]), [13, 13, 0, 0]);
        assert_eq!(shoot_the_moon([0, 0, 0, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn test_check_seat() {
        assert_eq!(check_seat(3), Ok(3));
        assert_eq!(check_seat(4), Err(GameError::InvalidSeat(4)));
    }
}

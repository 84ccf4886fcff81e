use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hearts::{
    Card, Game, GameState,
    entities::Play,
    functional::{deal_hands_with, find_trick_winner},
    game::Round,
};
use rand::{SeedableRng, rngs::StdRng};
use std::hint::black_box;

/// Play a seeded game to the end with first-legal-card moves.
fn play_game(seed: u64) -> [u32; 4] {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::with_dealer(Box::new(move || deal_hands_with(&mut rng)));
    game.start().unwrap();
    loop {
        match game.state() {
            GameState::Passing => {
                for seat in 0..4 {
                    let hand = game.get_hand(seat).unwrap();
                    game.pass_cards(seat, &hand[..3]).unwrap();
                }
            }
            GameState::Playing => {
                let seat = game.get_current_player().unwrap();
                let card = game.get_legal_moves(seat).unwrap()[0];
                game.play_card(card).unwrap();
            }
            GameState::GameOver | GameState::Init => break,
        }
        game.drain_events();
    }
    game.get_scores()
}

/// Benchmark dealing a shuffled deck
fn bench_deal(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("deal_hands", |b| {
        b.iter(|| deal_hands_with(&mut rng));
    });
}

/// Benchmark resolving a four-card trick
fn bench_trick_winner(c: &mut Criterion) {
    let cards: Vec<Card> = ["c2", "c10", "h1", "c9"]
        .iter()
        .map(|c| c.parse().unwrap())
        .collect();
    let plays: Vec<Play> = cards
        .into_iter()
        .enumerate()
        .map(|(seat, card)| Play { seat, card })
        .collect();

    c.bench_function("find_trick_winner", |b| {
        b.iter(|| find_trick_winner(black_box(&plays)));
    });
}

/// Benchmark legal move generation at the start of a round
fn bench_legal_moves(c: &mut Criterion) {
    let hands = deal_hands_with(&mut StdRng::seed_from_u64(3));
    let round = Round::new(hands).unwrap();
    c.bench_function("legal_moves", |b| {
        b.iter(|| {
            for seat in 0..4 {
                black_box(round.legal_moves(seat).unwrap());
            }
        });
    });
}

/// Benchmark whole games from deal to game over
fn bench_full_game(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_game");
    for seed in [1u64, 42] {
        group.bench_with_input(BenchmarkId::from_parameter(seed), &seed, |b, &seed| {
            b.iter(|| play_game(seed));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_deal,
    bench_trick_winner,
    bench_legal_moves,
    bench_full_game
);
criterion_main!(benches);

//! Game registry for spawning and tracking game session actors.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::RwLock;

use super::{
    GameId, SessionError, SessionResult,
    actor::{GameActor, GameHandle},
    config::SessionConfig,
};
use crate::{
    auth::{PlayerDirectory, PlayerId, PlayerStatus},
    game::{Game, GameState, Seat, constants::NUM_SEATS},
    matchmaking::GameCreator,
};

#[derive(Debug)]
struct GameEntry {
    handle: GameHandle,
    players: [PlayerId; NUM_SEATS],
}

/// Lifetime totals, for metrics.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RegistryStats {
    pub created: u64,
    pub finished: u64,
    pub abandoned: u64,
    pub active: usize,
}

#[derive(Debug, Default)]
struct Counters {
    created: AtomicU64,
    finished: AtomicU64,
    abandoned: AtomicU64,
}

/// Registry of running games and of which player sits where.
///
/// Cloning is cheap and every clone shares the same tables; each session
/// actor holds one to report its own teardown.
#[derive(Clone)]
pub struct GameRegistry {
    /// Configuration handed to every new session
    config: SessionConfig,

    /// Player statuses are kept in sync with game membership
    directory: Arc<dyn PlayerDirectory>,

    /// Active game sessions
    games: Arc<RwLock<HashMap<GameId, GameEntry>>>,

    /// Player to (game, seat)
    bindings: Arc<RwLock<HashMap<PlayerId, (GameId, Seat)>>>,

    /// Next game ID
    next_game_id: Arc<RwLock<GameId>>,

    counters: Arc<Counters>,
}

impl GameRegistry {
    /// Create a new game registry
    ///
    /// # Arguments
    ///
    /// * `config` - Session configuration for every game
    /// * `directory` - Player directory whose statuses follow game membership
    pub fn new(config: SessionConfig, directory: Arc<dyn PlayerDirectory>) -> Self {
        Self {
            config,
            directory,
            games: Arc::new(RwLock::new(HashMap::new())),
            bindings: Arc::new(RwLock::new(HashMap::new())),
            next_game_id: Arc::new(RwLock::new(1)),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Start a shuffled game for four players, seated in the given order.
    pub async fn create_game(&self, players: [PlayerId; NUM_SEATS]) -> SessionResult<GameId> {
        self.create_game_with(players, Game::new()).await
    }

    /// Start `game` for four players, seated in the given order.
    ///
    /// # Errors
    ///
    /// `PlayerAlreadyInGame` if any player is already bound to a game (or
    /// listed twice).
    pub async fn create_game_with(
        &self,
        players: [PlayerId; NUM_SEATS],
        mut game: Game,
    ) -> SessionResult<GameId> {
        if game.state() == GameState::Init {
            game.start()?;
        }

        let mut bindings = self.bindings.write().await;
        for (i, player) in players.iter().enumerate() {
            if bindings.contains_key(player) || players[..i].contains(player) {
                return Err(SessionError::PlayerAlreadyInGame(*player));
            }
        }

        let game_id = {
            let mut next_id = self.next_game_id.write().await;
            let id = *next_id;
            *next_id += 1;
            id
        };

        let (actor, handle) =
            GameActor::new(game_id, self.config.clone(), game, players, self.clone());
        for (seat, player) in players.iter().enumerate() {
            bindings.insert(*player, (game_id, seat));
        }
        self.games
            .write()
            .await
            .insert(game_id, GameEntry { handle, players });
        drop(bindings);

        tokio::spawn(async move {
            actor.run().await;
        });
        self.counters.created.fetch_add(1, Ordering::Relaxed);

        self.update_statuses(&players, PlayerStatus::InGame).await;
        log::info!("Created game {} for players {:?}", game_id, players);
        Ok(game_id)
    }

    /// The game and seat `player_id` is bound to.
    pub async fn try_get_player_game(&self, player_id: PlayerId) -> Option<(GameId, Seat)> {
        self.bindings.read().await.get(&player_id).copied()
    }

    pub async fn get_game(&self, game_id: GameId) -> Option<GameHandle> {
        self.games
            .read()
            .await
            .get(&game_id)
            .map(|entry| entry.handle.clone())
    }

    pub async fn active_game_count(&self) -> usize {
        self.games.read().await.len()
    }

    pub async fn stats(&self) -> RegistryStats {
        RegistryStats {
            created: self.counters.created.load(Ordering::Relaxed),
            finished: self.counters.finished.load(Ordering::Relaxed),
            abandoned: self.counters.abandoned.load(Ordering::Relaxed),
            active: self.active_game_count().await,
        }
    }

    /// Called by a session once its game has ended normally.
    pub async fn on_game_finished(&self, game_id: GameId) {
        if let Some(players) = self.release_game(game_id).await {
            self.counters.finished.fetch_add(1, Ordering::Relaxed);
            log::info!("Game {} finished and removed", game_id);
            self.update_statuses(&players, PlayerStatus::Idle).await;
        }
    }

    /// Called by a session once every player has left before the end.
    pub async fn on_game_abandoned(&self, game_id: GameId) {
        if let Some(players) = self.release_game(game_id).await {
            self.counters.abandoned.fetch_add(1, Ordering::Relaxed);
            log::info!("Game {} abandoned and removed", game_id);
            self.update_statuses(&players, PlayerStatus::Idle).await;
        }
    }

    /// Stop every session and forget all bindings.
    pub async fn shutdown(&self) {
        let mut bindings = self.bindings.write().await;
        let entries: Vec<GameEntry> = self.games.write().await.drain().map(|(_, e)| e).collect();
        bindings.clear();
        drop(bindings);

        for entry in &entries {
            if let Err(e) = entry.handle.close().await {
                log::debug!("Game {} already stopped: {}", entry.handle.game_id(), e);
            }
        }
        log::info!("Registry shut down {} games", entries.len());
    }

    async fn release_game(&self, game_id: GameId) -> Option<[PlayerId; NUM_SEATS]> {
        let mut bindings = self.bindings.write().await;
        let entry = self.games.write().await.remove(&game_id)?;
        for player in &entry.players {
            if bindings
                .get(player)
                .is_some_and(|(bound, _)| *bound == game_id)
            {
                bindings.remove(player);
            }
        }
        Some(entry.players)
    }

    async fn update_statuses(&self, players: &[PlayerId], status: PlayerStatus) {
        for player in players {
            if let Err(e) = self.directory.set_status(*player, status).await {
                log::warn!("Couldn't mark player {} as {}: {}", player, status, e);
            }
        }
    }
}

#[async_trait]
impl GameCreator for GameRegistry {
    async fn create_game(&self, players: [PlayerId; NUM_SEATS]) -> Result<GameId, String> {
        GameRegistry::create_game(self, players)
            .await
            .map_err(|e| e.to_string())
    }

    async fn is_seated(&self, player_id: PlayerId) -> bool {
        self.try_get_player_game(player_id).await.is_some()
    }

    async fn on_queued(&self, player_id: PlayerId) {
        self.update_statuses(&[player_id], PlayerStatus::Queuing).await;
    }

    async fn on_unqueued(&self, player_id: PlayerId) {
        self.update_statuses(&[player_id], PlayerStatus::Idle).await;
    }
}

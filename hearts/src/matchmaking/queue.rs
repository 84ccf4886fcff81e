use async_trait::async_trait;
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::{Mutex, oneshot};

use super::errors::{QueueError, QueueResult};
use crate::{auth::PlayerId, game::constants::NUM_SEATS, session::GameId};

/// Creates a game for a matched group. Seat order follows the array.
///
/// Every method runs with the queue lock held.
#[async_trait]
pub trait GameCreator: Send + Sync {
    async fn create_game(&self, players: [PlayerId; NUM_SEATS]) -> Result<GameId, String>;

    /// Whether `player_id` already sits in a game. Seated players can't queue.
    async fn is_seated(&self, _player_id: PlayerId) -> bool {
        false
    }

    /// The player started waiting.
    async fn on_queued(&self, _player_id: PlayerId) {}

    /// The player left the queue without being matched.
    async fn on_unqueued(&self, _player_id: PlayerId) {}
}

type MatchResult = QueueResult<GameId>;

#[derive(Debug)]
struct WaitingEntry {
    player_id: PlayerId,
    result: oneshot::Sender<MatchResult>,
}

/// Pending outcome of a registration.
#[derive(Debug)]
pub struct MatchTicket {
    player_id: PlayerId,
    receiver: oneshot::Receiver<MatchResult>,
    outcome: Option<MatchResult>,
}

impl MatchTicket {
    fn new(player_id: PlayerId, receiver: oneshot::Receiver<MatchResult>) -> Self {
        Self {
            player_id,
            receiver,
            outcome: None,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Wait until the player is matched or leaves the queue.
    pub async fn wait(self) -> MatchResult {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        self.receiver.await.unwrap_or(Err(QueueError::QueueClosed))
    }

    /// The outcome if it is already known, `None` while still pending.
    pub fn try_result(&mut self) -> Option<MatchResult> {
        if self.outcome.is_none() {
            match self.receiver.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.outcome = Some(Err(QueueError::QueueClosed));
                }
            }
        }
        self.outcome.clone()
    }
}

/// FIFO of players waiting for a game.
pub struct MatchmakingQueue {
    waiting: Mutex<VecDeque<WaitingEntry>>,
    creator: Arc<dyn GameCreator>,
}

impl MatchmakingQueue {
    pub fn new(creator: Arc<dyn GameCreator>) -> Self {
        Self {
            waiting: Mutex::new(VecDeque::new()),
            creator,
        }
    }

    /// Put `player_id` at the back of the queue and try to form a game.
    ///
    /// # Errors
    ///
    /// - `AlreadyRegistered` if the player is already waiting.
    /// - `AlreadyInGame` if the player already has a seat.
    pub async fn register(&self, player_id: PlayerId) -> QueueResult<MatchTicket> {
        let (result, receiver) = oneshot::channel();
        let mut waiting = self.waiting.lock().await;
        if waiting.iter().any(|entry| entry.player_id == player_id) {
            return Err(QueueError::AlreadyRegistered(player_id));
        }
        if self.creator.is_seated(player_id).await {
            return Err(QueueError::AlreadyInGame(player_id));
        }
        waiting.push_back(WaitingEntry { player_id, result });
        self.creator.on_queued(player_id).await;
        log::debug!("Player {} queued ({} waiting)", player_id, waiting.len());

        self.match_waiting(&mut waiting).await;
        Ok(MatchTicket::new(player_id, receiver))
    }

    /// Form as many games as the queue allows. Returns how many groups were
    /// taken off the queue.
    pub async fn try_match(&self) -> usize {
        let mut waiting = self.waiting.lock().await;
        self.match_waiting(&mut waiting).await
    }

    /// Runs with the queue lock held, so a group is popped and resolved
    /// before any register or unregister can observe it.
    async fn match_waiting(&self, waiting: &mut VecDeque<WaitingEntry>) -> usize {
        let mut groups = 0;
        while waiting.len() >= NUM_SEATS {
            let group: Vec<WaitingEntry> = waiting.drain(..NUM_SEATS).collect();
            let players: [PlayerId; NUM_SEATS] = std::array::from_fn(|i| group[i].player_id);
            groups += 1;

            let outcome = match self.creator.create_game(players).await {
                Ok(game_id) => {
                    log::info!("Matched players {:?} into game {}", players, game_id);
                    Ok(game_id)
                }
                Err(e) => {
                    log::error!("Couldn't create a game for {:?}: {}", players, e);
                    Err(QueueError::GameCreationFailed(e))
                }
            };
            for entry in group {
                // A dropped ticket just means the player stopped listening.
                let _ = entry.result.send(outcome.clone());
            }
        }
        groups
    }

    /// Take `player_id` out of the queue. Returns false if the player wasn't
    /// waiting, including when it was already matched.
    pub async fn unregister(&self, player_id: PlayerId) -> bool {
        let mut waiting = self.waiting.lock().await;
        let Some(index) = waiting.iter().position(|entry| entry.player_id == player_id) else {
            return false;
        };
        if let Some(entry) = waiting.remove(index) {
            let _ = entry.result.send(Err(QueueError::PlayerUnregistered));
        }
        self.creator.on_unqueued(player_id).await;
        log::debug!("Player {} left the queue", player_id);
        true
    }

    pub async fn is_registered(&self, player_id: PlayerId) -> bool {
        self.waiting
            .lock()
            .await
            .iter()
            .any(|entry| entry.player_id == player_id)
    }

    pub async fn len(&self) -> usize {
        self.waiting.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

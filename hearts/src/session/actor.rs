//! Game session actor implementation with async message handling.

use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, MissedTickBehavior, interval},
};

use super::{
    GameId, SessionError, SessionResult,
    config::SessionConfig,
    messages::{Outbound, SessionMessage},
    registry::GameRegistry,
};
use crate::{
    auth::PlayerId,
    bridge::protocol::{GameSnapshot, PhaseSnapshot, ServerMessage},
    game::{
        Card, Game, GameEvent, GameResult, GameState, Seat, constants::NUM_SEATS,
        functional::check_seat,
    },
};

/// Game session handle for sending messages
#[derive(Clone, Debug)]
pub struct GameHandle {
    sender: mpsc::Sender<SessionMessage>,
    game_id: GameId,
}

impl GameHandle {
    /// Create a new game handle
    pub fn new(sender: mpsc::Sender<SessionMessage>, game_id: GameId) -> Self {
        Self { sender, game_id }
    }

    /// Get game ID
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Whether the actor behind this handle has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the actor has stopped
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> SessionResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::SessionClosed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> SessionResult<T> {
        let (response, receiver) = oneshot::channel();
        self.send(message(response)).await?;
        receiver.await.map_err(|_| SessionError::SessionClosed)
    }

    /// Attach `outbound` as the connection for `seat`.
    pub async fn connect(
        &self,
        seat: Seat,
        player_id: PlayerId,
        name: String,
        outbound: Outbound,
    ) -> SessionResult<()> {
        self.request(|response| SessionMessage::Connect {
            seat,
            player_id,
            name,
            outbound,
            response,
        })
        .await?
    }

    pub async fn disconnect(&self, seat: Seat, player_id: PlayerId) -> SessionResult<()> {
        self.send(SessionMessage::Disconnect { seat, player_id }).await
    }

    pub async fn play_card(&self, seat: Seat, card: Card) -> SessionResult<()> {
        Ok(self
            .request(|response| SessionMessage::PlayCard {
                seat,
                card,
                response,
            })
            .await??)
    }

    pub async fn pass_cards(&self, seat: Seat, cards: Vec<Card>) -> SessionResult<()> {
        Ok(self
            .request(|response| SessionMessage::PassCards {
                seat,
                cards,
                response,
            })
            .await??)
    }

    pub async fn get_state(&self, seat: Seat) -> SessionResult<GameSnapshot> {
        self.request(|response| SessionMessage::GetState { seat, response })
            .await
    }

    pub async fn is_connected(&self, seat: Seat) -> SessionResult<bool> {
        self.request(|response| SessionMessage::IsConnected { seat, response })
            .await
    }

    pub async fn close(&self) -> SessionResult<()> {
        self.send(SessionMessage::Close).await
    }
}

/// A live connection attached to a seat
#[derive(Debug)]
struct SeatConnection {
    player_id: PlayerId,
    name: String,
    outbound: Outbound,
}

/// Why a session stopped
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Teardown {
    Finished,
    Abandoned,
    Closed,
}

/// Game session actor owning a single game
pub struct GameActor {
    /// Game ID
    id: GameId,

    /// Session configuration
    config: SessionConfig,

    /// Hearts game state (FSM)
    game: Game,

    /// Player seated at each position, in arrival order
    players: [PlayerId; NUM_SEATS],

    /// Current connection per seat
    seats: [Option<SeatConnection>; NUM_SEATS],

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// Registry to report teardown to
    registry: GameRegistry,

    /// Since when nobody has been connected
    idle_since: Option<Instant>,

    /// Set once the session should stop
    teardown: Option<Teardown>,
}

impl GameActor {
    /// Create a new game session actor
    ///
    /// # Arguments
    ///
    /// * `id` - Game ID
    /// * `config` - Session configuration
    /// * `game` - A started game
    /// * `players` - Players by seat
    /// * `registry` - Registry notified when the game finishes or is abandoned
    ///
    /// # Returns
    ///
    /// * `(GameActor, GameHandle)` - Actor and handle for sending messages
    pub fn new(
        id: GameId,
        config: SessionConfig,
        mut game: Game,
        players: [PlayerId; NUM_SEATS],
        registry: GameRegistry,
    ) -> (Self, GameHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));
        // Nobody is connected yet; joiners get a snapshot instead.
        game.drain_events();

        let actor = Self {
            id,
            config,
            game,
            players,
            seats: Default::default(),
            inbox,
            registry,
            idle_since: Some(Instant::now()),
            teardown: None,
        };

        let handle = GameHandle::new(sender, id);

        (actor, handle)
    }

    /// Run the session event loop
    pub async fn run(mut self) {
        log::info!("Game {} starting with players {:?}", self.id, self.players);

        let mut tick_interval = interval(self.config.tick_interval());
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.teardown.is_none() {
            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => self.teardown = Some(Teardown::Closed),
                },

                _ = tick_interval.tick() => self.tick(),
            }
        }

        match self.teardown {
            Some(Teardown::Finished) => self.registry.on_game_finished(self.id).await,
            Some(Teardown::Abandoned) => self.registry.on_game_abandoned(self.id).await,
            _ => {}
        }
        log::info!("Game {} closed", self.id);
    }

    /// Handle a session message
    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Connect {
                seat,
                player_id,
                name,
                outbound,
                response,
            } => {
                let result = self.handle_connect(seat, player_id, name, outbound);
                let _ = response.send(result);
            }

            SessionMessage::Disconnect { seat, player_id } => {
                self.handle_disconnect(seat, player_id);
            }

            SessionMessage::PlayCard {
                seat,
                card,
                response,
            } => {
                let result = self.game.play_card_as(seat, card).map(|_| ());
                self.after_command(seat, "play_card", &result);
                let _ = response.send(result);
            }

            SessionMessage::PassCards {
                seat,
                cards,
                response,
            } => {
                let result = self.game.pass_cards(seat, &cards);
                self.after_command(seat, "pass_card", &result);
                let _ = response.send(result);
            }

            SessionMessage::GetState { seat, response } => {
                let _ = response.send(self.snapshot(seat));
            }

            SessionMessage::IsConnected { seat, response } => {
                let connected = self.seats.get(seat).is_some_and(Option::is_some);
                let _ = response.send(connected);
            }

            SessionMessage::Close => {
                log::info!("Game {} closing on request", self.id);
                self.teardown = Some(Teardown::Closed);
            }
        }
    }

    fn handle_connect(
        &mut self,
        seat: Seat,
        player_id: PlayerId,
        name: String,
        outbound: Outbound,
    ) -> SessionResult<()> {
        if check_seat(seat).is_err() || self.players[seat] != player_id {
            return Err(SessionError::PlayerNotInGame(player_id));
        }
        if self.seats[seat].is_some() {
            log::warn!(
                "Game {}: rejected second connection for seat {} (player {})",
                self.id,
                seat,
                player_id
            );
            return Err(SessionError::PlayerAlreadyConnected(seat));
        }

        self.seats[seat] = Some(SeatConnection {
            player_id,
            name: name.clone(),
            outbound,
        });
        self.idle_since = None;
        log::info!("Game {}: {} connected to seat {}", self.id, name, seat);

        self.send_to(
            seat,
            ServerMessage::ConnectedToGame {
                game_id: self.id,
                index: seat,
            },
        );
        self.send_to(
            seat,
            ServerMessage::GameData {
                data: self.snapshot(seat),
            },
        );
        self.broadcast_from(
            seat,
            ServerMessage::PlayerConnected {
                index: seat,
                player: name,
            },
        );
        Ok(())
    }

    fn handle_disconnect(&mut self, seat: Seat, player_id: PlayerId) {
        let owns_seat = self
            .seats
            .get(seat)
            .and_then(Option::as_ref)
            .is_some_and(|connection| connection.player_id == player_id);
        if !owns_seat {
            log::debug!(
                "Game {}: ignoring disconnect of player {} from seat {}",
                self.id,
                player_id,
                seat
            );
            return;
        }

        self.seats[seat] = None;
        log::info!("Game {}: seat {} disconnected", self.id, seat);
        self.broadcast_from(seat, ServerMessage::PlayerDisconnected { index: seat });

        if self.seats.iter().all(Option::is_none) {
            self.idle_since = Some(Instant::now());
            if self.game.state() != GameState::GameOver {
                log::info!("Game {}: every player left", self.id);
                self.teardown = Some(Teardown::Abandoned);
            }
        }
    }

    /// Log the outcome of a game command and publish whatever it caused.
    fn after_command(&mut self, seat: Seat, command: &str, result: &GameResult<()>) {
        if let Err(e) = result {
            log::debug!(
                "Game {}: {} from seat {} rejected: {}",
                self.id,
                command,
                seat,
                e
            );
        }
        self.dispatch_events();
        if self.game.state() == GameState::GameOver && self.teardown.is_none() {
            log::info!(
                "Game {} finished with scores {:?}",
                self.id,
                self.game.get_scores()
            );
            self.teardown = Some(Teardown::Finished);
        }
    }

    /// Fan queued game events out to the seats.
    fn dispatch_events(&mut self) {
        for event in self.game.drain_events() {
            log::debug!("Game {}: {}", self.id, event);
            match event {
                GameEvent::RoundStarted {
                    round_number,
                    pass_direction,
                    hands,
                } => {
                    for (seat, hand) in hands.into_iter().enumerate() {
                        self.send_to(
                            seat,
                            ServerMessage::StartRound {
                                round_number,
                                pass_direction,
                                hand,
                            },
                        );
                    }
                }
                GameEvent::PassingFinished { received } => {
                    for (seat, received_cards) in received.into_iter().enumerate() {
                        self.send_to(seat, ServerMessage::FinishPassing { received_cards });
                    }
                }
                GameEvent::CardPlayed { seat, card } => {
                    self.broadcast_from(seat, ServerMessage::PlayCard { player: seat, card });
                }
                GameEvent::TrickFinished { winner, points } => {
                    self.broadcast(ServerMessage::FinishTrick { winner, points });
                }
                GameEvent::RoundFinished {
                    round_scores,
                    scores,
                    ..
                } => {
                    self.broadcast(ServerMessage::FinishRound {
                        round_scores,
                        scores,
                    });
                }
                GameEvent::GameFinished { scores } => {
                    self.broadcast(ServerMessage::FinishGame { scores });
                }
            }
        }
    }

    fn tick(&mut self) {
        let Some(idle_since) = self.idle_since else {
            return;
        };
        if self.game.state() != GameState::GameOver
            && idle_since.elapsed() >= self.config.abandon_timeout()
        {
            log::info!(
                "Game {}: nobody connected for {:?}",
                self.id,
                self.config.abandon_timeout()
            );
            self.teardown = Some(Teardown::Abandoned);
        }
    }

    /// Build the view of the game `seat` is entitled to.
    fn snapshot(&self, seat: Seat) -> GameSnapshot {
        let state_data = match self.phase_snapshot(seat) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Game {}: no snapshot for seat {}: {}", self.id, seat, e);
                None
            }
        };
        GameSnapshot {
            game_id: self.id,
            players: std::array::from_fn(|s| {
                self.seats[s].as_ref().map(|connection| connection.name.clone())
            }),
            player_ids: self.players,
            scores: self.game.get_scores(),
            state: self.game.state(),
            state_data,
        }
    }

    fn phase_snapshot(&self, seat: Seat) -> GameResult<Option<PhaseSnapshot>> {
        let game = &self.game;
        let data = match game.state() {
            GameState::Passing => Some(PhaseSnapshot::Passing {
                round_number: game.get_round_number(),
                hand: game.get_hand(seat)?,
                pass_direction: game.get_pass_direction()?,
                have_passed: game.has_player_passed(seat)?,
                received_cards: game.get_received_cards(seat)?,
            }),
            GameState::Playing => Some(PhaseSnapshot::Playing {
                round_number: game.get_round_number(),
                hand: game.get_hand(seat)?,
                trick: game.get_trick()?,
                current_player: game.get_current_player()?,
                round_scores: game.get_round_scores()?,
                is_hearts_broken: game.is_hearts_broken()?,
                is_first_trick: game.is_first_trick()?,
                received_cards: game.get_cards_passed_in(seat)?,
            }),
            GameState::Init | GameState::GameOver => None,
        };
        Ok(data)
    }

    fn send_to(&self, seat: Seat, message: ServerMessage) {
        if let Some(connection) = self.seats.get(seat).and_then(Option::as_ref)
            && connection.outbound.send(message).is_err()
        {
            log::debug!("Game {}: outbound for seat {} is gone", self.id, seat);
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        for seat in 0..NUM_SEATS {
            self.send_to(seat, message.clone());
        }
    }

    /// Send to every seat except `origin`.
    fn broadcast_from(&self, origin: Seat, message: ServerMessage) {
        for seat in (0..NUM_SEATS).filter(|&seat| seat != origin) {
            self.send_to(seat, message.clone());
        }
    }
}

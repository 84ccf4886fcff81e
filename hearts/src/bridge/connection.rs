//! Per-connection state machine: authenticate, queue, then play.

use std::sync::Arc;
use tokio::sync::mpsc;

use super::protocol::{ClientCommand, CommandId, MalformedCommand, ServerMessage, parse_command};
use crate::{
    auth::{Player, PlayerDirectory, TicketService},
    game::Seat,
    matchmaking::{MatchmakingQueue, QueueError},
    session::{GameId, GameRegistry, SessionError},
};

/// How a connection ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConnectionEnd {
    /// The client went away.
    Disconnected,
    /// The client left the matchmaking queue.
    Cancelled,
    /// The game session stopped while the client was seated.
    GameClosed,
    /// The server refused to go on with this connection.
    Rejected(String),
}

/// A transport's view of one client: inbound text frames (closed on
/// disconnect) and the outbound message sink.
struct Connection {
    inbound: mpsc::Receiver<String>,
    outbound: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    async fn next_command(&mut self) -> Option<Result<ClientCommand, MalformedCommand>> {
        let frame = self.inbound.recv().await?;
        Some(parse_command(&frame))
    }

    fn send(&self, message: ServerMessage) {
        // The writer only goes away once the client has disconnected.
        let _ = self.outbound.send(message);
    }

    fn succeed(&self, command_id: CommandId) {
        self.send(ServerMessage::success(command_id));
    }

    fn fail(&self, command_id: CommandId, reason: impl Into<String>) {
        self.send(ServerMessage::fail(command_id, reason));
    }

    fn reject_frame(&self, malformed: MalformedCommand) {
        match malformed.command_id {
            Some(command_id) => self.fail(command_id, malformed.reason),
            None => log::debug!("Dropping uncorrelated frame: {}", malformed.reason),
        }
    }
}

/// Connects client transports to matchmaking and game sessions.
#[derive(Clone)]
pub struct Bridge {
    directory: Arc<dyn PlayerDirectory>,
    tickets: Arc<TicketService>,
    queue: Arc<MatchmakingQueue>,
    registry: GameRegistry,
}

impl Bridge {
    pub fn new(
        directory: Arc<dyn PlayerDirectory>,
        tickets: Arc<TicketService>,
        queue: Arc<MatchmakingQueue>,
        registry: GameRegistry,
    ) -> Self {
        Self {
            directory,
            tickets,
            queue,
            registry,
        }
    }

    /// Drive one client connection until it ends.
    ///
    /// # Arguments
    ///
    /// * `inbound` - Text frames from the client; closing it means disconnect
    /// * `outbound` - Everything the server sends back, in order
    pub async fn serve(
        &self,
        inbound: mpsc::Receiver<String>,
        outbound: mpsc::UnboundedSender<ServerMessage>,
    ) -> ConnectionEnd {
        let mut connection = Connection { inbound, outbound };

        let Some(player) = self.authenticate(&mut connection).await else {
            return ConnectionEnd::Disconnected;
        };
        log::info!("Player {} ({}) authenticated", player.id, player.name);

        let seat = match self.registry.try_get_player_game(player.id).await {
            Some(binding) => binding,
            None => match self.wait_for_match(&mut connection, &player).await {
                Ok(binding) => binding,
                Err(end) => return end,
            },
        };
        self.play(&mut connection, &player, seat).await
    }

    async fn authenticate(&self, connection: &mut Connection) -> Option<Player> {
        loop {
            let command = match connection.next_command().await? {
                Ok(command) => command,
                Err(malformed) => {
                    connection.reject_frame(malformed);
                    continue;
                }
            };
            let command_id = command.command_id();
            let ClientCommand::Auth {
                ticket,
                name,
                password,
                ..
            } = command
            else {
                connection.fail(command_id, "not authenticated");
                continue;
            };

            match self.resolve_identity(ticket, name, password).await {
                Ok(player) => {
                    connection.succeed(command_id);
                    return Some(player);
                }
                Err(reason) => {
                    log::debug!("Authentication failed: {}", reason);
                    connection.fail(command_id, reason);
                }
            }
        }
    }

    /// Turn auth credentials into a player. Unknown names are registered on
    /// the spot with the given password.
    async fn resolve_identity(
        &self,
        ticket: Option<String>,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<Player, String> {
        if let Some(ticket) = ticket {
            let id = self
                .tickets
                .resolve_ticket(&ticket)
                .ok_or("invalid or expired ticket")?;
            return self
                .directory
                .get_player(id)
                .await
                .ok_or_else(|| "unknown player".to_string());
        }

        let (Some(name), Some(password)) = (name, password) else {
            return Err("ticket or name and password required".to_string());
        };
        if name.is_empty() || password.is_empty() {
            return Err("ticket or name and password required".to_string());
        }

        let id = match self.directory.find_player_id(&name).await {
            Some(id) => {
                if !self.directory.authenticate(id, &password).await {
                    return Err("wrong password".to_string());
                }
                id
            }
            None => self
                .directory
                .create_player(&name, &password)
                .await
                .map_err(|e| e.client_message())?,
        };
        self.directory
            .get_player(id)
            .await
            .ok_or_else(|| "unknown player".to_string())
    }

    /// Queue the player and wait for either a match or the client to leave.
    /// The queue keeps the player's status in step with its waiting list.
    async fn wait_for_match(
        &self,
        connection: &mut Connection,
        player: &Player,
    ) -> Result<(GameId, Seat), ConnectionEnd> {
        let ticket = match self.queue.register(player.id).await {
            Ok(ticket) => ticket,
            Err(e) => {
                log::warn!("Player {} couldn't queue: {}", player.id, e);
                return Err(ConnectionEnd::Rejected(e.to_string()));
            }
        };

        let matched = ticket.wait();
        tokio::pin!(matched);
        loop {
            tokio::select! {
                outcome = &mut matched => {
                    return match outcome {
                        Ok(game_id) => self
                            .registry
                            .try_get_player_game(player.id)
                            .await
                            .filter(|(bound, _)| *bound == game_id)
                            .ok_or_else(|| {
                                let gone = SessionError::GameNotFound(game_id);
                                ConnectionEnd::Rejected(gone.to_string())
                            }),
                        Err(QueueError::PlayerUnregistered) => Err(ConnectionEnd::Cancelled),
                        Err(e) => Err(ConnectionEnd::Rejected(e.to_string())),
                    };
                }

                command = connection.next_command() => match command {
                    None => {
                        if self.queue.unregister(player.id).await {
                            self.directory.remove_player(player.id).await;
                        }
                        return Err(ConnectionEnd::Disconnected);
                    }
                    Some(Ok(ClientCommand::Cancel { command_id })) => {
                        if self.queue.unregister(player.id).await {
                            connection.succeed(command_id);
                            return Err(ConnectionEnd::Cancelled);
                        }
                        // Matched in the meantime; the ticket resolves next.
                        connection.fail(command_id, "already matched");
                    }
                    Some(Ok(command)) => {
                        connection.fail(command.command_id(), "waiting for a match");
                    }
                    Some(Err(malformed)) => connection.reject_frame(malformed),
                },
            }
        }
    }

    /// Seat the connection and relay its commands to the game session.
    async fn play(
        &self,
        connection: &mut Connection,
        player: &Player,
        (game_id, seat): (GameId, Seat),
    ) -> ConnectionEnd {
        let Some(game) = self.registry.get_game(game_id).await else {
            return ConnectionEnd::Rejected(SessionError::GameNotFound(game_id).to_string());
        };
        if let Err(e) = game
            .connect(seat, player.id, player.name.clone(), connection.outbound.clone())
            .await
        {
            log::warn!("Player {} couldn't join game {}: {}", player.id, game_id, e);
            return ConnectionEnd::Rejected(e.to_string());
        }

        loop {
            let command = tokio::select! {
                command = connection.next_command() => match command {
                    None => {
                        if let Err(e) = game.disconnect(seat, player.id).await {
                            log::debug!("Game {} gone before disconnect: {}", game_id, e);
                        }
                        return ConnectionEnd::Disconnected;
                    }
                    Some(Err(malformed)) => {
                        connection.reject_frame(malformed);
                        continue;
                    }
                    Some(Ok(command)) => command,
                },

                () = game.closed() => {
                    log::debug!("Game {} closed with player {} seated", game_id, player.id);
                    return ConnectionEnd::GameClosed;
                }
            };

            let command_id = command.command_id();
            let result = match command {
                ClientCommand::PlayCard { card, .. } => {
                    game.play_card(seat, card).await.map(|()| None)
                }
                ClientCommand::PassCard { cards, .. } => {
                    game.pass_cards(seat, cards).await.map(|()| None)
                }
                ClientCommand::GetState { .. } => game.get_state(seat).await.map(Some),
                ClientCommand::Auth { .. } | ClientCommand::Cancel { .. } => {
                    connection.fail(command_id, "not available during a game");
                    continue;
                }
            };
            match result {
                Ok(None) => connection.succeed(command_id),
                Ok(Some(data)) => connection.send(ServerMessage::QuerySuccess { command_id, data }),
                Err(SessionError::SessionClosed) => {
                    connection.fail(command_id, SessionError::SessionClosed.to_string());
                    return ConnectionEnd::GameClosed;
                }
                Err(e) => connection.fail(command_id, e.to_string()),
            }
        }
    }
}

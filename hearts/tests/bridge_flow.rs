//! Client connections driven through the bridge over in-memory channels.

use async_trait::async_trait;
use hearts::{
    auth::{InMemoryPlayerDirectory, PlayerDirectory, PlayerId, PlayerStatus, TicketService},
    bridge::{Bridge, ConnectionEnd, ServerMessage},
    matchmaking::{GameCreator, MatchmakingQueue},
    session::{GameId, GameRegistry, SessionConfig},
};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    task::JoinHandle,
};

struct Server {
    bridge: Bridge,
    directory: Arc<InMemoryPlayerDirectory>,
    tickets: Arc<TicketService>,
    queue: Arc<MatchmakingQueue>,
    registry: GameRegistry,
}

fn server() -> Server {
    let directory = Arc::new(InMemoryPlayerDirectory::new("pepper".to_string()));
    let tickets = Arc::new(TicketService::new("ticket-secret".to_string()));
    let registry = GameRegistry::new(SessionConfig::default(), directory.clone());
    let queue = Arc::new(MatchmakingQueue::new(Arc::new(registry.clone())));
    let bridge = Bridge::new(
        directory.clone(),
        tickets.clone(),
        queue.clone(),
        registry.clone(),
    );
    Server {
        bridge,
        directory,
        tickets,
        queue,
        registry,
    }
}

struct Client {
    inbound: Option<mpsc::Sender<String>>,
    outbound: UnboundedReceiver<ServerMessage>,
    task: JoinHandle<ConnectionEnd>,
}

impl Client {
    fn connect(bridge: &Bridge) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(32);
        let (outbound_tx, outbound) = mpsc::unbounded_channel();
        let bridge = bridge.clone();
        let task = tokio::spawn(async move { bridge.serve(inbound_rx, outbound_tx).await });
        Self {
            inbound: Some(inbound_tx),
            outbound,
            task,
        }
    }

    async fn send(&self, frame: serde_json::Value) {
        self.send_raw(frame.to_string()).await;
    }

    async fn send_raw(&self, frame: String) {
        self.inbound.as_ref().unwrap().send(frame).await.unwrap();
    }

    async fn recv(&mut self) -> ServerMessage {
        tokio::time::timeout(Duration::from_secs(10), self.outbound.recv())
            .await
            .expect("no message in time")
            .expect("connection closed")
    }

    async fn login(&mut self, command_id: u64, name: &str, password: &str) -> ServerMessage {
        self.send(json!({
            "type": "auth",
            "command_id": command_id,
            "name": name,
            "password": password,
        }))
        .await;
        self.recv().await
    }

    async fn hang_up(mut self) -> ConnectionEnd {
        self.inbound.take();
        self.task.await.unwrap()
    }

    async fn end(self) -> ConnectionEnd {
        self.task.await.unwrap()
    }
}

const NAMES: [&str; 4] = ["alice", "bob", "carol", "dave"];

/// Log four clients in and wait until each is seated.
async fn matched_clients(server: &Server) -> Vec<Client> {
    let mut clients = Vec::new();
    for (i, name) in NAMES.iter().enumerate() {
        let mut client = Client::connect(&server.bridge);
        assert_eq!(
            client.login(i as u64, name, "secret").await,
            ServerMessage::success(i as u64)
        );
        clients.push(client);
    }
    for client in &mut clients {
        assert!(matches!(
            client.recv().await,
            ServerMessage::ConnectedToGame { .. }
        ));
    }
    clients
}

async fn wait_for_queue(queue: &MatchmakingQueue, len: usize) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while queue.len().await != len {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("queue never reached the expected length");
}

#[tokio::test]
async fn test_commands_before_auth_fail() {
    let server = server();
    let mut client = Client::connect(&server.bridge);

    client.send(json!({"type": "get_state", "command_id": 1})).await;
    assert_eq!(client.recv().await, ServerMessage::fail(1, "not authenticated"));

    client.send_raw("{not json".to_string()).await;
    client
        .send(json!({"type": "play_card", "command_id": 2, "card": "zz"}))
        .await;
    // The uncorrelated frame is dropped, the bad card still gets a reply.
    assert!(matches!(
        client.recv().await,
        ServerMessage::CommandFail { command_id: 2, .. }
    ));

    assert_eq!(client.hang_up().await, ConnectionEnd::Disconnected);
}

#[tokio::test]
async fn test_wrong_password_then_success() {
    let server = server();
    server.directory.create_player("alice", "secret").await.unwrap();
    let mut client = Client::connect(&server.bridge);

    assert_eq!(
        client.login(1, "alice", "nope").await,
        ServerMessage::fail(1, "wrong password")
    );
    assert_eq!(
        client.login(2, "alice", "secret").await,
        ServerMessage::success(2)
    );
    wait_for_queue(&server.queue, 1).await;

    client.send(json!({"type": "get_state", "command_id": 3})).await;
    assert_eq!(client.recv().await, ServerMessage::fail(3, "waiting for a match"));
}

#[tokio::test]
async fn test_ticket_auth() {
    let server = server();
    let id = server.directory.create_player("alice", "secret").await.unwrap();
    let ticket = server.tickets.issue_ticket(id).unwrap();
    let mut client = Client::connect(&server.bridge);

    client
        .send(json!({"type": "auth", "command_id": 1, "ticket": "garbage"}))
        .await;
    assert_eq!(
        client.recv().await,
        ServerMessage::fail(1, "invalid or expired ticket")
    );

    client
        .send(json!({"type": "auth", "command_id": 2, "ticket": ticket}))
        .await;
    assert_eq!(client.recv().await, ServerMessage::success(2));
    wait_for_queue(&server.queue, 1).await;
    assert_eq!(
        server.directory.get_player(id).await.unwrap().status,
        PlayerStatus::Queuing
    );
}

#[tokio::test]
async fn test_cancel_leaves_queue() {
    let server = server();
    let mut client = Client::connect(&server.bridge);
    assert_eq!(client.login(1, "alice", "secret").await, ServerMessage::success(1));
    wait_for_queue(&server.queue, 1).await;

    client.send(json!({"type": "cancel", "command_id": 2})).await;
    assert_eq!(client.recv().await, ServerMessage::success(2));
    assert_eq!(client.end().await, ConnectionEnd::Cancelled);

    assert!(server.queue.is_empty().await);
    let id = server.directory.find_player_id("alice").await.unwrap();
    assert_eq!(
        server.directory.get_player(id).await.unwrap().status,
        PlayerStatus::Idle
    );
}

#[tokio::test]
async fn test_disconnect_while_queued_forgets_player() {
    let server = server();
    let mut client = Client::connect(&server.bridge);
    assert_eq!(client.login(1, "alice", "secret").await, ServerMessage::success(1));
    wait_for_queue(&server.queue, 1).await;

    assert_eq!(client.hang_up().await, ConnectionEnd::Disconnected);
    assert!(server.queue.is_empty().await);
    assert_eq!(server.directory.find_player_id("alice").await, None);
}

#[tokio::test]
async fn test_four_clients_get_matched_and_play() {
    let server = server();
    let mut clients = Vec::new();
    for (i, name) in ["alice", "bob", "carol", "dave"].iter().enumerate() {
        let mut client = Client::connect(&server.bridge);
        assert_eq!(
            client.login(i as u64, name, "secret").await,
            ServerMessage::success(i as u64)
        );
        clients.push(client);
    }

    let mut seats = Vec::new();
    let mut game_ids = Vec::new();
    for client in &mut clients {
        match client.recv().await {
            ServerMessage::ConnectedToGame { game_id, index } => {
                seats.push(index);
                game_ids.push(game_id);
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert!(matches!(client.recv().await, ServerMessage::GameData { .. }));
    }
    seats.sort();
    assert_eq!(seats, vec![0, 1, 2, 3]);
    assert!(game_ids.iter().all(|id| *id == game_ids[0]));
    assert_eq!(server.registry.active_game_count().await, 1);

    let client = &mut clients[0];
    client
        .send(json!({"type": "auth", "command_id": 50, "name": "alice", "password": "secret"}))
        .await;
    let reply = loop {
        match client.recv().await {
            ServerMessage::PlayerConnected { .. } => continue,
            reply => break reply,
        }
    };
    assert_eq!(reply, ServerMessage::fail(50, "not available during a game"));

    client.send(json!({"type": "get_state", "command_id": 51})).await;
    match client.recv().await {
        ServerMessage::QuerySuccess { command_id, data } => {
            assert_eq!(command_id, 51);
            assert_eq!(data.game_id, game_ids[0]);
            assert!(data.players.iter().all(Option::is_some));
        }
        other => panic!("unexpected message {other:?}"),
    }

    for client in clients {
        assert_eq!(client.hang_up().await, ConnectionEnd::Disconnected);
    }
    tokio::time::timeout(Duration::from_secs(10), async {
        while server.registry.active_game_count().await != 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("game was never abandoned");
}

#[tokio::test]
async fn test_matched_players_are_in_game() {
    let server = server();
    let _clients = matched_clients(&server).await;

    for name in NAMES {
        let id = server.directory.find_player_id(name).await.unwrap();
        assert_eq!(
            server.directory.get_player(id).await.unwrap().status,
            PlayerStatus::InGame,
            "{name} should be seated"
        );
    }
}

#[tokio::test]
async fn test_connections_end_when_game_closes() {
    let server = server();
    let clients = matched_clients(&server).await;

    server.registry.shutdown().await;
    for client in clients {
        // Nobody sends or hangs up; the closed session alone ends the connection.
        let end = tokio::time::timeout(Duration::from_secs(10), client.end())
            .await
            .expect("connection outlived its game");
        assert_eq!(end, ConnectionEnd::GameClosed);
    }
}

/// Reports a game that the registry never heard of.
struct PhantomGames;

#[async_trait]
impl GameCreator for PhantomGames {
    async fn create_game(&self, _players: [PlayerId; 4]) -> Result<GameId, String> {
        Ok(42)
    }
}

#[tokio::test]
async fn test_match_into_missing_game_is_rejected() {
    let server = server();
    let queue = Arc::new(MatchmakingQueue::new(Arc::new(PhantomGames)));
    let bridge = Bridge::new(
        server.directory.clone(),
        server.tickets.clone(),
        queue,
        server.registry.clone(),
    );

    let mut clients = Vec::new();
    for (i, name) in NAMES.iter().enumerate() {
        let mut client = Client::connect(&bridge);
        assert_eq!(
            client.login(i as u64, name, "secret").await,
            ServerMessage::success(i as u64)
        );
        clients.push(client);
    }
    for client in clients {
        assert_eq!(
            client.end().await,
            ConnectionEnd::Rejected("game 42 not found".to_string())
        );
    }
}

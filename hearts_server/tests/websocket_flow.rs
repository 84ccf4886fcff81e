//! End-to-end game connections over a real WebSocket.

use futures_util::{SinkExt, StreamExt};
use hearts::{
    Card,
    auth::{InMemoryPlayerDirectory, PlayerDirectory, TicketService},
    bridge::{PhaseSnapshot, ServerMessage},
    session::SessionConfig,
};
use hearts_server::api::{AppState, create_router};
use serde_json::{Value, json};
use std::{collections::VecDeque, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> (SocketAddr, AppState) {
    let state = AppState::new(
        Arc::new(InMemoryPlayerDirectory::new("test_pepper_for_testing".to_string())),
        Arc::new(TicketService::new("test_secret_key_for_testing_only".to_string())),
        SessionConfig::default(),
    );
    let app = create_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

/// One client socket plus whatever it received but hasn't looked at yet.
struct Client {
    socket: Socket,
    backlog: VecDeque<ServerMessage>,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let (socket, _) = connect_async(format!("ws://{addr}/play")).await.unwrap();
        Self {
            socket,
            backlog: VecDeque::new(),
        }
    }

    async fn send(&mut self, frame: Value) {
        self.socket
            .send(Message::text(frame.to_string()))
            .await
            .unwrap();
    }

    async fn read(&mut self) -> Option<ServerMessage> {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(10), self.socket.next())
                .await
                .expect("no frame in time")?
                .ok()?;
            match frame {
                Message::Text(text) => return Some(serde_json::from_str(text.as_str()).unwrap()),
                Message::Close(_) => return None,
                _ => {}
            }
        }
    }

    /// The first message matching `want`, keeping the others for later.
    async fn wait_for(&mut self, want: impl Fn(&ServerMessage) -> bool) -> ServerMessage {
        if let Some(index) = self.backlog.iter().position(&want) {
            return self.backlog.remove(index).unwrap();
        }
        loop {
            let message = self.read().await.expect("connection closed");
            if want(&message) {
                return message;
            }
            self.backlog.push_back(message);
        }
    }

    async fn reply_to(&mut self, command_id: u64) -> ServerMessage {
        self.wait_for(|message| match message {
            ServerMessage::CommandSuccess { command_id: id }
            | ServerMessage::CommandFail { command_id: id, .. }
            | ServerMessage::QuerySuccess { command_id: id, .. } => *id == command_id,
            _ => false,
        })
        .await
    }
}

#[tokio::test]
async fn test_unauthenticated_command_fails() {
    let (addr, _) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send(json!({"type": "get_state", "command_id": 1})).await;
    assert_eq!(
        client.reply_to(1).await,
        ServerMessage::fail(1, "not authenticated")
    );
}

#[tokio::test]
async fn test_cancel_closes_connection() {
    let (addr, state) = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client
        .send(json!({"type": "auth", "command_id": 1, "name": "alice", "password": "secret"}))
        .await;
    assert_eq!(client.reply_to(1).await, ServerMessage::success(1));
    client.send(json!({"type": "cancel", "command_id": 2})).await;
    assert_eq!(client.reply_to(2).await, ServerMessage::success(2));

    // The server is done with this connection once the queue is left.
    assert!(client.read().await.is_none());
    assert!(state.queue.is_empty().await);
}

#[tokio::test]
async fn test_four_players_pass_and_lead() {
    let (addr, state) = spawn_server().await;

    // One player comes in with a ticket, the rest register in-band.
    let alice = state.directory.create_player("alice", "secret").await.unwrap();
    let ticket = state.tickets.issue_ticket(alice).unwrap();

    let mut clients = Vec::new();
    for (i, name) in ["alice", "bob", "carol", "dave"].iter().enumerate() {
        let mut client = Client::connect(addr).await;
        let auth = if i == 0 {
            json!({"type": "auth", "command_id": 1, "ticket": ticket})
        } else {
            json!({"type": "auth", "command_id": 1, "name": name, "password": "secret"})
        };
        client.send(auth).await;
        assert_eq!(client.reply_to(1).await, ServerMessage::success(1));
        clients.push(client);
    }

    // Seat every client and remember its dealt hand.
    let mut seated: Vec<Option<(Client, Vec<Card>)>> = (0..4).map(|_| None).collect();
    for mut client in clients {
        let seat = match client
            .wait_for(|m| matches!(m, ServerMessage::ConnectedToGame { .. }))
            .await
        {
            ServerMessage::ConnectedToGame { index, .. } => index,
            _ => unreachable!(),
        };
        let hand = match client
            .wait_for(|m| matches!(m, ServerMessage::GameData { .. }))
            .await
        {
            ServerMessage::GameData { data } => match data.state_data {
                Some(PhaseSnapshot::Passing { hand, .. }) => hand,
                other => panic!("expected passing, got {other:?}"),
            },
            _ => unreachable!(),
        };
        assert_eq!(hand.len(), 13);
        seated[seat] = Some((client, hand));
    }
    let mut seats: Vec<(Client, Vec<Card>)> = seated.into_iter().map(Option::unwrap).collect();

    for (client, hand) in &mut seats {
        let pass: Vec<String> = hand[..3].iter().map(Card::to_string).collect();
        client
            .send(json!({"type": "pass_card", "command_id": 2, "cards": pass}))
            .await;
        assert_eq!(client.reply_to(2).await, ServerMessage::success(2));
    }

    // Passing left: each seat gets what its right-hand neighbour gave away.
    let given: Vec<Vec<Card>> = seats.iter().map(|(_, hand)| hand[..3].to_vec()).collect();
    for (seat, (client, _)) in seats.iter_mut().enumerate() {
        let received = client
            .wait_for(|m| matches!(m, ServerMessage::FinishPassing { .. }))
            .await;
        assert_eq!(
            received,
            ServerMessage::FinishPassing {
                received_cards: given[(seat + 3) % 4].clone()
            }
        );
    }

    let (client, _) = &mut seats[0];
    client.send(json!({"type": "get_state", "command_id": 3})).await;
    let leader = match client.reply_to(3).await {
        ServerMessage::QuerySuccess { data, .. } => match data.state_data {
            Some(PhaseSnapshot::Playing {
                current_player,
                is_first_trick,
                ..
            }) => {
                assert!(is_first_trick);
                current_player
            }
            other => panic!("expected playing, got {other:?}"),
        },
        other => panic!("unexpected reply {other:?}"),
    };

    let two_of_clubs: Card = "c2".parse().unwrap();
    let (client, _) = &mut seats[leader];
    client
        .send(json!({"type": "play_card", "command_id": 4, "card": "c2"}))
        .await;
    assert_eq!(client.reply_to(4).await, ServerMessage::success(4));

    for (seat, (client, _)) in seats.iter_mut().enumerate() {
        if seat == leader {
            continue;
        }
        let played = client
            .wait_for(|m| matches!(m, ServerMessage::PlayCard { .. }))
            .await;
        assert_eq!(
            played,
            ServerMessage::PlayCard {
                player: leader,
                card: two_of_clubs
            }
        );
    }

    // Out of turn from the leader now.
    let (client, _) = &mut seats[leader];
    client
        .send(json!({"type": "play_card", "command_id": 5, "card": "c3"}))
        .await;
    assert!(matches!(
        client.reply_to(5).await,
        ServerMessage::CommandFail { command_id: 5, .. }
    ));

    drop(seats);
    tokio::time::timeout(Duration::from_secs(10), async {
        while state.registry.active_game_count().await != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("game was never abandoned");
}

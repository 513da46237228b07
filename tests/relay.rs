//! End-to-end tests: relay server on an ephemeral port with real TCP clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use omok::config::Restriction;
use omok::net::{
    run_bot, ClientEvent, Connection, Credentials, InMemoryAccounts, MatchCoordinator,
    MatchFound, MatchRequest, RelayServer, ServerEvent, StonePlaced, StoneRequest,
};
use omok::net::protocol::encode_line;
use omok::{GameStatus, OmokConfig, OmokError, Stone};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(10);

async fn start_relay() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Arc::new(RelayServer::new(
        Arc::new(MatchCoordinator::new()),
        Arc::new(InMemoryAccounts::new()),
    ));
    tokio::spawn(server.serve(listener));
    addr
}

async fn recv(conn: &mut Connection) -> ServerEvent {
    timeout(WAIT, conn.recv()).await.expect("timed out").unwrap()
}

async fn join(addr: SocketAddr, email: &str) -> Connection {
    let mut conn = Connection::connect(&addr.to_string()).await.unwrap();
    conn.send(&ClientEvent::RequestMatchmaking(MatchRequest {
        email: email.to_string(),
    }))
    .await
    .unwrap();
    conn
}

fn match_found(event: ServerEvent) -> MatchFound {
    match event {
        ServerEvent::MatchFound(found) => found,
        other => panic!("expected matchFound, got {:?}", other),
    }
}

/// Pair two clients and return them as (black, white).
async fn paired(addr: SocketAddr) -> (Connection, Connection) {
    let mut a = join(addr, "a@x").await;
    let mut b = join(addr, "b@x").await;
    let found_a = match_found(recv(&mut a).await);
    let found_b = match_found(recv(&mut b).await);

    assert_eq!(found_a.room_id, found_b.room_id);
    assert_ne!(found_a.is_my_turn, found_b.is_my_turn);
    assert_eq!(found_a.opponent_email, "b@x");
    assert_eq!(found_b.opponent_email, "a@x");

    if found_a.is_my_turn {
        (a, b)
    } else {
        (b, a)
    }
}

#[tokio::test]
async fn test_turn_authority_end_to_end() {
    let addr = start_relay().await;
    let (mut black, mut white) = paired(addr).await;

    // White tries first; the register round trip proves the move was read
    white
        .send(&ClientEvent::PlaceStone(StoneRequest { row: 0, col: 0 }))
        .await
        .unwrap();
    white
        .send(&ClientEvent::Register(Credentials {
            email: "w@x".into(),
            password: "pw".into(),
        }))
        .await
        .unwrap();
    assert!(matches!(recv(&mut white).await, ServerEvent::RegisterResponse(r) if r.success));

    black
        .send(&ClientEvent::PlaceStone(StoneRequest { row: 7, col: 7 }))
        .await
        .unwrap();
    let expected = ServerEvent::StonePlaced(StonePlaced {
        row: 7,
        col: 7,
        player: 1,
    });
    assert_eq!(recv(&mut black).await, expected);
    assert_eq!(recv(&mut white).await, expected);

    white
        .send(&ClientEvent::PlaceStone(StoneRequest { row: 7, col: 8 }))
        .await
        .unwrap();
    let expected = ServerEvent::StonePlaced(StonePlaced {
        row: 7,
        col: 8,
        player: 2,
    });
    assert_eq!(recv(&mut white).await, expected);
    assert_eq!(recv(&mut black).await, expected);
}

#[tokio::test]
async fn test_disconnect_notifies_peer() {
    let addr = start_relay().await;
    let (black, mut white) = paired(addr).await;

    drop(black);
    assert_eq!(recv(&mut white).await, ServerEvent::OpponentLeft {});
}

#[tokio::test]
async fn test_malformed_line_does_not_close() {
    let addr = start_relay().await;
    let mut raw = tokio::net::TcpStream::connect(addr).await.unwrap();
    raw.write_all(b"{\"event\":\"placeStone\"}\n").await.unwrap();
    drop(raw);

    // The relay keeps serving others
    let (_black, _white) = paired(addr).await;
}

#[tokio::test]
async fn test_closed_stream_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let mut conn = Connection::connect(&addr.to_string()).await.unwrap();
    let err = timeout(WAIT, conn.recv()).await.unwrap().unwrap_err();
    assert!(matches!(err, OmokError::Closed));
}

#[tokio::test]
async fn test_bot_skips_malformed_server_lines() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let found = ServerEvent::MatchFound(MatchFound {
            room_id: "room_1".into(),
            my_player_number: 2,
            is_my_turn: false,
            starting_player: 1,
            opponent_email: "them@x".into(),
        });
        stream.write_all(b"{\"event\":\"somethingNew\",\"data\":{}}\n").await.unwrap();
        stream.write_all(b"not json at all\n").await.unwrap();
        stream.write_all(encode_line(&found).unwrap().as_bytes()).await.unwrap();
        stream
            .write_all(encode_line(&ServerEvent::OpponentLeft {}).unwrap().as_bytes())
            .await
            .unwrap();
        // Hold the socket open until the bot is done
        let mut sink = Vec::new();
        let _ = tokio::io::AsyncReadExt::read_to_end(&mut stream, &mut sink).await;
    });

    let conn = Connection::connect(&addr.to_string()).await.unwrap();
    let status = timeout(WAIT, run_bot(conn, "bot@x", &OmokConfig::default()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status, GameStatus::Resigned { loser: Stone::Black });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bot_stops_on_refused_echo() {
    let addr = start_relay().await;
    let config = OmokConfig::default()
        .with_restriction(Restriction::None)
        .with_depth(0);

    let bot = {
        let (addr, config) = (addr.to_string(), config.clone());
        tokio::spawn(async move {
            let conn = Connection::connect(&addr).await?;
            run_bot(conn, "bot@x", &config).await
        })
    };

    let mut raw = join(addr, "raw@x").await;
    let found = match_found(recv(&mut raw).await);
    let raw_stone = found.my_stone();

    // Play the centre if we open, then replay a cell that is already taken
    if found.is_my_turn {
        raw.send(&ClientEvent::PlaceStone(StoneRequest { row: 7, col: 7 }))
            .await
            .unwrap();
        assert!(matches!(recv(&mut raw).await, ServerEvent::StonePlaced(p) if p.player == 1));
    }
    let taken = match recv(&mut raw).await {
        ServerEvent::StonePlaced(p) => p,
        other => panic!("expected the bot's move, got {:?}", other),
    };
    raw.send(&ClientEvent::PlaceStone(StoneRequest {
        row: taken.row,
        col: taken.col,
    }))
    .await
    .unwrap();

    let status = timeout(WAIT, bot).await.unwrap().unwrap().unwrap();
    assert_eq!(status, GameStatus::Resigned { loser: raw_stone });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_bots_finish_a_game() {
    let addr = start_relay().await.to_string();
    let config = OmokConfig::default()
        .with_restriction(Restriction::None)
        .with_depth(0);

    let first = {
        let (addr, config) = (addr.clone(), config.clone());
        tokio::spawn(async move {
            let conn = Connection::connect(&addr).await?;
            run_bot(conn, "bot1@x", &config).await
        })
    };
    let second = {
        let (addr, config) = (addr.clone(), config.clone());
        tokio::spawn(async move {
            let conn = Connection::connect(&addr).await?;
            run_bot(conn, "bot2@x", &config).await
        })
    };

    let limit = Duration::from_secs(120);
    let a = timeout(limit, first).await.unwrap().unwrap().unwrap();
    let b = timeout(limit, second).await.unwrap().unwrap().unwrap();

    assert!(a.is_over());
    assert_eq!(a, b);
    assert!(matches!(a, GameStatus::Won { .. } | GameStatus::Draw));
}

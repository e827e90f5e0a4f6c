// End-to-end tests over loopback TCP: real coordinator, real byte-stream
// clients, full frames on the wire.

use std::net::SocketAddr;
use std::time::Duration;

use parlor_client::RemoteSession;
use parlor_core::{
    CardFace, CardKind, ChatMessage, MatchBook, MatchId, MatchPhase, Notice, PawnColor, Position,
    SessionFacade,
};
use parlor_server::{Config, CoordinatorHandle, Server};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;

/// Bind a coordinator on a free port and run its accept loop.
async fn spawn_server(match_size: usize) -> (SocketAddr, CoordinatorHandle) {
    let config = Config {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        max_clients: 32,
        match_size,
        ping_secs: 60,
        stale_secs: 120,
    };
    let server = Server::bind(&config, MatchBook::new(match_size))
        .await
        .expect("bind coordinator");
    let addr = server.local_addr().expect("local addr");
    let handle = server.handle();
    tokio::spawn(server.run());
    (addr, handle)
}

/// Wait (bounded) for the first notice matching the predicate,
/// discarding everything before it.
async fn wait_for<F>(rx: &mut UnboundedReceiver<Notice>, pred: F) -> Notice
where
    F: Fn(&Notice) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let notice = rx.recv().await.expect("notice stream ended");
            if pred(&notice) {
                return notice;
            }
        }
    })
    .await
    .expect("timed out waiting for notice")
}

/// The scenario from the protocol walkthrough: a nickname is free,
/// gets claimed via `add match`, and reads as taken from a second,
/// independent connection.
#[tokio::test]
async fn nicknames_are_reserved_across_connections() {
    let (addr, _handle) = spawn_server(4).await;

    let (alice, _alice_rx) = RemoteSession::connect(addr).await.unwrap();
    assert!(!alice.check_name("alice").await.unwrap());

    let match_id = alice.add_match("alice").await.unwrap();
    assert!(match_id.0 > 0);

    let (probe, _probe_rx) = RemoteSession::connect(addr).await.unwrap();
    assert!(probe.check_name("alice").await.unwrap());
}

/// Back-to-back calls with different response types each get their own
/// reply: the typed queues never cross wires.
#[tokio::test]
async fn sequential_calls_receive_their_own_typed_replies() {
    let (addr, _handle) = spawn_server(4).await;
    let (bob, _rx) = RemoteSession::connect(addr).await.unwrap();

    assert!(!bob.check_name("bob").await.unwrap()); // BOOLEAN
    let mid = bob.add_match("bob").await.unwrap(); // INTEGER

    let names = bob.view_names(mid).await.unwrap(); // NAMES
    assert_eq!(names, vec!["bob".to_string()]);

    let table = bob.view_table(mid).await.unwrap(); // TABLE
    assert_eq!(table.match_id, mid);
    assert_eq!(table.face_up.len(), 4);
    assert_eq!(table.seats.len(), 1);

    let phase = bob.view_phase(mid).await.unwrap(); // CONTROLLER
    assert_eq!(phase.phase, MatchPhase::WaitingForPlayers);

    assert_eq!(bob.score("bob", mid).await.unwrap(), 0); // INTEGER again
}

/// An unrecognized verb is discarded without killing the connection;
/// the next valid frame is served normally.
#[tokio::test]
async fn unknown_verbs_do_not_kill_the_connection() {
    let (addr, _handle) = spawn_server(4).await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write
        .write_all(b"shuffle deck\ncheck name\nzoe\n")
        .await
        .unwrap();
    write.flush().await.unwrap();

    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("BOOLEAN"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("false"));
}

/// A malformed argument is likewise skipped frame-by-frame.
#[tokio::test]
async fn malformed_arguments_do_not_kill_the_connection() {
    let (addr, _handle) = spawn_server(4).await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    // "score" wants nickname + integer match id.
    write
        .write_all(b"score\nzoe\nnot-a-number\ncheck name\nzoe\n")
        .await
        .unwrap();
    write.flush().await.unwrap();

    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("BOOLEAN"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("false"));
}

/// Full happy path for a two-seat match: join, colors, turn order,
/// placement, draws, and the pushes every step broadcasts.
#[tokio::test]
async fn full_match_over_the_wire() {
    let (addr, _handle) = spawn_server(2).await;
    let (alice, mut alice_rx) = RemoteSession::connect(addr).await.unwrap();
    let (bob, mut bob_rx) = RemoteSession::connect(addr).await.unwrap();

    let mid = alice.add_match("alice").await.unwrap();
    assert!(bob.add_player("bob", mid).await.unwrap());
    wait_for(&mut alice_rx, |n| {
        matches!(n, Notice::Update(e) if e.contains("joined"))
    })
    .await;

    let colors = alice.view_colors(mid).await.unwrap();
    assert_eq!(colors.len(), 4);
    assert!(alice.choose_color("alice", mid, PawnColor::Red).await.unwrap());
    assert!(!bob.choose_color("bob", mid, PawnColor::Red).await.unwrap());
    assert!(bob.choose_color("bob", mid, PawnColor::Blue).await.unwrap());

    // Play begins with the match creator (black pawn).
    let turn = wait_for(&mut bob_rx, |n| matches!(n, Notice::Turn(_))).await;
    assert_eq!(turn, Notice::Turn("alice".to_string()));
    assert!(alice.check_turn("alice", mid).await.unwrap());
    assert!(!bob.check_turn("bob", mid).await.unwrap());

    let spots = alice.valid_positions("alice", mid).await.unwrap();
    assert_eq!(spots.len(), 4);
    assert!(spots.contains(&Position::new(1, 1)));

    // Rejected placement reads as false, not as an error.
    assert!(!alice
        .place("alice", mid, 0, Position::new(5, 5), CardFace::Front)
        .await
        .unwrap());
    assert!(alice
        .place("alice", mid, 0, Position::new(1, 1), CardFace::Front)
        .await
        .unwrap());

    let hand = alice.draw_resource("alice", mid).await.unwrap();
    assert_eq!(hand.len(), 3);

    // The draw hands the turn to bob, announced to everyone.
    wait_for(&mut alice_rx, |n| *n == Notice::Turn("bob".to_string())).await;
    assert!(bob.check_turn("bob", mid).await.unwrap());

    assert!(!alice.is_last_round(mid).await.unwrap());
    assert_eq!(alice.winner(mid).await.unwrap(), "");
}

#[tokio::test]
async fn chat_and_whispers_route_to_the_right_sessions() {
    let (addr, _handle) = spawn_server(2).await;
    let (alice, mut alice_rx) = RemoteSession::connect(addr).await.unwrap();
    let (bob, mut bob_rx) = RemoteSession::connect(addr).await.unwrap();

    let mid = alice.add_match("alice").await.unwrap();
    assert!(bob.add_player("bob", mid).await.unwrap());

    alice.chat("alice", mid, "good luck!").await.unwrap();
    let delivered = wait_for(&mut bob_rx, |n| matches!(n, Notice::Chat(_))).await;
    assert_eq!(
        delivered,
        Notice::Chat(ChatMessage::new("alice", "good luck!"))
    );

    // Table chat reaches the sender too, and lands in the chat buffer.
    wait_for(&mut alice_rx, |n| matches!(n, Notice::Chat(_))).await;
    assert_eq!(
        alice.chat_log(),
        vec![ChatMessage::new("alice", "good luck!")]
    );

    bob.whisper("bob", "alice", mid, "psst").await.unwrap();
    let private = wait_for(&mut alice_rx, |n| matches!(n, Notice::PrivateChat(_))).await;
    assert_eq!(private, Notice::PrivateChat(ChatMessage::new("bob", "psst")));
}

#[tokio::test]
async fn cheats_reshape_the_match() {
    let (addr, _handle) = spawn_server(2).await;
    let (alice, _alice_rx) = RemoteSession::connect(addr).await.unwrap();
    let (bob, _bob_rx) = RemoteSession::connect(addr).await.unwrap();

    let mid = alice.add_match("alice").await.unwrap();
    assert!(bob.add_player("bob", mid).await.unwrap());

    alice.cheat_full_gold("alice", mid).await.unwrap();
    let hand = alice.view_hand("alice", mid).await.unwrap();
    assert_eq!(hand.len(), 3);
    assert!(hand.iter().all(|c| c.kind == CardKind::Gold));

    assert!(!alice.is_last_round(mid).await.unwrap());
    bob.cheat_last_round("bob", mid).await.unwrap();
    assert!(alice.is_last_round(mid).await.unwrap());

    alice.cheat_points("alice", mid).await.unwrap();
    assert!(alice.score("alice", mid).await.unwrap() >= 20);
}

/// Operations against unknown matches/players come back as the
/// operation's neutral value, never as a transport error.
#[tokio::test]
async fn unknown_ids_read_as_neutral_replies() {
    let (addr, _handle) = spawn_server(4).await;
    let (probe, _rx) = RemoteSession::connect(addr).await.unwrap();
    let ghost = MatchId(999);

    assert_eq!(probe.view_names(ghost).await.unwrap(), Vec::<String>::new());
    assert_eq!(probe.score("nobody", ghost).await.unwrap(), -1);
    assert_eq!(probe.winner(ghost).await.unwrap(), "");
    assert!(probe.view_table(ghost).await.unwrap().seats.is_empty());
    assert!(probe.view_colors(ghost).await.unwrap().is_empty());
    assert!(!probe.add_player("zoe", ghost).await.unwrap());
    assert!(!probe.check_turn("zoe", ghost).await.unwrap());
}

/// Connections beyond max_clients are dropped at accept time.
#[tokio::test]
async fn over_capacity_connections_are_dropped() {
    let config = Config {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        max_clients: 1,
        match_size: 2,
        ping_secs: 60,
        stale_secs: 120,
    };
    let server = Server::bind(&config, MatchBook::new(2)).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let (first, _first_rx) = RemoteSession::connect(addr).await.unwrap();
    assert!(!first.check_name("solo").await.unwrap());

    let (second, _second_rx) = RemoteSession::connect(addr).await.unwrap();
    assert!(second.check_name("crowd").await.is_err());
}

// The object-call transport: same facade contract, no sockets. Also
// covers mixing both transports in one match and the caller-configured
// timeout that distinguishes this transport from the byte-stream one.

use std::time::Duration;

use parlor_client::RemoteSession;
use parlor_core::{
    CardFace, MatchBook, Notice, PawnColor, Position, SessionError, SessionFacade,
};
use parlor_server::{Config, LocalSession, Server};
use tokio::sync::mpsc::UnboundedReceiver;

fn test_config(match_size: usize) -> Config {
    Config {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        max_clients: 32,
        match_size,
        ping_secs: 60,
        stale_secs: 120,
    }
}

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

#[tokio::test]
async fn local_sessions_speak_the_same_facade() {
    let server = Server::bind(&test_config(2), MatchBook::new(2)).await.unwrap();
    let handle = server.handle();

    let (alice, mut alice_rx) = LocalSession::attach(&handle, Duration::from_secs(5)).await;
    let (bob, mut bob_rx) = LocalSession::attach(&handle, Duration::from_secs(5)).await;

    assert!(!alice.check_name("alice").await.unwrap());
    let mid = alice.add_match("alice").await.unwrap();
    assert!(bob.add_player("bob", mid).await.unwrap());

    wait_for(&mut alice_rx, |n| {
        matches!(n, Notice::Update(e) if e.contains("joined"))
    })
    .await;

    assert!(alice.choose_color("alice", mid, PawnColor::Red).await.unwrap());
    assert!(bob.choose_color("bob", mid, PawnColor::Yellow).await.unwrap());
    let turn = wait_for(&mut bob_rx, |n| matches!(n, Notice::Turn(_))).await;
    assert_eq!(turn, Notice::Turn("alice".to_string()));

    assert!(alice
        .place("alice", mid, 0, Position::new(1, 1), CardFace::Front)
        .await
        .unwrap());
    let hand = alice.draw_gold("alice", mid).await.unwrap();
    assert_eq!(hand.len(), 3);
    assert!(bob.check_turn("bob", mid).await.unwrap());
}

/// One local session, one byte-stream session, one match. Pushes cross
/// transports transparently.
#[tokio::test]
async fn mixed_transports_share_a_match() {
    let server = Server::bind(&test_config(2), MatchBook::new(2)).await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = server.handle();
    tokio::spawn(server.run());

    let (alice, mut alice_rx) = LocalSession::attach(&handle, Duration::from_secs(5)).await;
    let (bob, mut bob_rx) = RemoteSession::connect(addr).await.unwrap();

    let mid = alice.add_match("alice").await.unwrap();
    assert!(bob.add_player("bob", mid).await.unwrap());

    alice.chat("alice", mid, "hello from in-process").await.unwrap();
    let delivered = wait_for(&mut bob_rx, |n| matches!(n, Notice::Chat(_))).await;
    match delivered {
        Notice::Chat(msg) => {
            assert_eq!(msg.sender, "alice");
            assert_eq!(msg.body, "hello from in-process");
        }
        other => panic!("unexpected notice {:?}", other),
    }

    bob.whisper("bob", "alice", mid, "heard you").await.unwrap();
    let private = wait_for(&mut alice_rx, |n| matches!(n, Notice::PrivateChat(_))).await;
    match private {
        Notice::PrivateChat(msg) => assert_eq!(msg.sender, "bob"),
        other => panic!("unexpected notice {:?}", other),
    }
}

/// The object-call transport surfaces a blown deadline as a transport
/// error, not a mangled reply. (The current-thread test runtime cannot
/// run the facade task between the send and the deadline check, so a
/// zero timeout always elapses first.)
#[tokio::test]
async fn local_calls_time_out_as_transport_errors() {
    let server = Server::bind(&test_config(2), MatchBook::new(2)).await.unwrap();
    let handle = server.handle();

    let (impatient, _rx) = LocalSession::attach(&handle, Duration::from_millis(0)).await;
    match impatient.check_name("anyone").await {
        Err(SessionError::Timeout) => {}
        other => panic!("expected timeout, got {:?}", other),
    }

    // A sane deadline leaves the facade perfectly reachable.
    let (patient, _rx) = LocalSession::attach(&handle, Duration::from_secs(5)).await;
    assert!(!patient.check_name("anyone").await.unwrap());
}

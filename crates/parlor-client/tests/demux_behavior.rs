// Demultiplexer behavior against a scripted coordinator: a bare
// TcpListener that plays back exact frames, so the tests control the
// interleaving of pushes and replies on the wire.

use std::time::Duration;

use parlor_client::RemoteSession;
use parlor_core::{ChatMessage, MatchId, Notice, SessionError, SessionFacade};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

async fn scripted_listener() -> (std::net::SocketAddr, TcpListener) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (addr, listener)
}

/// Pushes that arrive while a caller is blocked on a reply are handled
/// inline; the reply still reaches the caller, in order.
#[tokio::test]
async fn pushes_route_inline_while_a_caller_waits() {
    let (addr, listener) = scripted_listener().await;
    let script = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("check name"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("zoe"));

        // Two pushes land before the solicited BOOLEAN.
        write
            .write_all(
                b"UPDATE\nsomeone joined\nCHAT\n{\"sender\":\"ann\",\"body\":\"hi\"}\nBOOLEAN\nfalse\n",
            )
            .await
            .unwrap();
        write.flush().await.unwrap();

        // Hold the connection open until the client side is done.
        let _ = lines.next_line().await;
    });

    let (session, mut notices) = RemoteSession::connect(addr).await.unwrap();
    assert!(!session.check_name("zoe").await.unwrap());

    assert_eq!(
        notices.recv().await.unwrap(),
        Notice::Update("someone joined".to_string())
    );
    assert_eq!(
        notices.recv().await.unwrap(),
        Notice::Chat(ChatMessage::new("ann", "hi"))
    );
    assert_eq!(session.chat_log(), vec![ChatMessage::new("ann", "hi")]);

    drop(session);
    script.abort();
}

/// After a successful join the session knows its nickname and answers
/// PING with `receive pong` on its own, without surfacing the ping.
#[tokio::test]
async fn pings_are_answered_automatically_after_join() {
    let (addr, listener) = scripted_listener().await;
    let script = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("add match"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("zoe"));
        write.write_all(b"INTEGER\n5\n").await.unwrap();
        write.write_all(b"PING\n").await.unwrap();
        write.flush().await.unwrap();

        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("receive pong")
        );
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("zoe"));
    });

    let (session, mut notices) = RemoteSession::connect(addr).await.unwrap();
    let mid = session.add_match("zoe").await.unwrap();
    assert_eq!(mid, MatchId(5));
    assert_eq!(session.nickname().as_deref(), Some("zoe"));

    // The scripted side saw the pong frame.
    script.await.unwrap();

    // The ping itself was never surfaced; the stream then ended.
    assert!(notices.recv().await.is_none());
}

/// EXIT wakes a caller blocked on a reply queue with `Closed` instead
/// of leaving it parked forever, and marks the session closed.
#[tokio::test]
async fn exit_wakes_blocked_callers() {
    let (addr, listener) = scripted_listener().await;
    let script = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("view names"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("7"));
        write.write_all(b"EXIT\ncoordinator shutting down\n").await.unwrap();
        write.flush().await.unwrap();
    });

    let (session, mut notices) = RemoteSession::connect(addr).await.unwrap();
    match session.view_names(MatchId(7)).await {
        Err(SessionError::Closed) => {}
        other => panic!("expected Closed, got {:?}", other),
    }
    assert!(session.is_closed());
    assert_eq!(
        notices.recv().await.unwrap(),
        Notice::Exit("coordinator shutting down".to_string())
    );

    // Further calls fail fast.
    match session.check_name("zoe").await {
        Err(SessionError::Closed) => {}
        other => panic!("expected Closed, got {:?}", other),
    }

    script.await.unwrap();
}

/// A tag outside the vocabulary is skipped; the frame after it is
/// processed normally.
#[tokio::test]
async fn unknown_tags_are_skipped() {
    let (addr, listener) = scripted_listener().await;
    let script = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("check name"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("zoe"));
        write.write_all(b"NONSENSE\nBOOLEAN\ntrue\n").await.unwrap();
        write.flush().await.unwrap();

        let _ = lines.next_line().await;
    });

    let (session, _notices) = RemoteSession::connect(addr).await.unwrap();
    assert!(session.check_name("zoe").await.unwrap());

    drop(session);
    script.abort();
}

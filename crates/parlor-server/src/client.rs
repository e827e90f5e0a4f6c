//! Per-connection dispatch loop.
//!
//! One task per accepted connection, alive until end-of-stream, an
//! unrecoverable I/O failure, or a forced eviction. The loop walks
//! `AWAITING_VERB → READING_ARGS → DISPATCHING → WRITING_RESPONSE` for
//! every frame: read the verb line, read that verb's fixed argument
//! count, hand the call to the facade task, await its reply, queue the
//! response envelope for the writer task.
//!
//! A malformed frame (unknown verb, unparseable argument) is logged
//! and skipped — one bad message must not kill a match for all
//! players. Only stream death ends the loop.

use std::io;
use std::sync::Arc;

use parlor_protocol::{line_codec, Envelope, Verb};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Notify};
use tracing::{debug, warn};

use crate::types::{FacadeRequest, FacadeTx, HangupCause, OutboundRx, OutboundTx, SessionId};

/// Run the dispatch loop for a single connection.
///
/// Whatever way the loop ends, a hangup is routed to the facade task;
/// duplicate hangups (e.g. after a graceful `remove client`) are
/// no-ops there.
pub async fn run_session(
    session: SessionId,
    stream: TcpStream,
    facade_tx: FacadeTx,
    out_tx: OutboundTx,
    out_rx: OutboundRx,
    shutdown: Arc<Notify>,
) -> io::Result<()> {
    let (read_half, write_half) = stream.into_split();

    // Writer task: encodes and writes everything the session is sent —
    // call replies and pushes share one ordered channel.
    let _writer = tokio::spawn(write_outbound(session, write_half, out_rx));

    let result = dispatch_loop(session, read_half, &facade_tx, &out_tx, &shutdown).await;

    let _ = facade_tx.send(FacadeRequest::Hangup {
        session,
        cause: HangupCause::ConnectionLost,
    });

    // Dropping our outbound sender (and the registry's, removed by the
    // hangup) lets the writer drain and exit on its own.
    drop(out_tx);

    result
}

async fn dispatch_loop(
    session: SessionId,
    read_half: OwnedReadHalf,
    facade_tx: &FacadeTx,
    out_tx: &OutboundTx,
    shutdown: &Notify,
) -> io::Result<()> {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        // AWAITING_VERB. The eviction handle interrupts the wait so a
        // supervisor-forced removal tears this loop down promptly.
        let verb_line = tokio::select! {
            _ = shutdown.notified() => {
                debug!("session {} evicted; closing connection", session.0);
                return Ok(());
            }
            line = lines.next_line() => match line? {
                Some(l) => tidy(l),
                None => return Ok(()),
            },
        };

        if verb_line.is_empty() {
            continue;
        }

        let Some(verb) = Verb::parse(&verb_line) else {
            warn!("session {}: unknown verb {:?}", session.0, verb_line);
            continue;
        };

        // READING_ARGS(n remaining).
        let mut args = Vec::with_capacity(verb.arg_count());
        for _ in 0..verb.arg_count() {
            match lines.next_line().await? {
                Some(l) => args.push(tidy(l)),
                None => return Ok(()),
            }
        }

        let call = match line_codec::parse_call(verb, &args) {
            Ok(call) => call,
            Err(e) => {
                warn!("session {}: bad frame: {}", session.0, e);
                continue;
            }
        };

        // DISPATCHING.
        let (reply_tx, reply_rx) = oneshot::channel();
        if facade_tx
            .send(FacadeRequest::Call {
                session,
                call,
                reply: reply_tx,
            })
            .is_err()
        {
            return Ok(());
        }
        let Ok(reply) = reply_rx.await else {
            return Ok(());
        };

        // WRITING_RESPONSE. Void replies write nothing.
        if let Some(envelope) = Envelope::from_reply(reply) {
            if out_tx.send(envelope).is_err() {
                return Ok(());
            }
        }
    }
}

/// Writer half: consume envelopes and write frames until every sender
/// is gone.
async fn write_outbound(
    session: SessionId,
    mut write_half: tokio::net::tcp::OwnedWriteHalf,
    mut out_rx: OutboundRx,
) {
    while let Some(envelope) = out_rx.recv().await {
        let frame = match line_codec::encode_envelope(&envelope) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("session {}: encode failed: {}", session.0, e);
                continue;
            }
        };
        if let Err(e) = write_half.write_all(frame.as_bytes()).await {
            debug!("session {} write error: {}", session.0, e);
            break;
        }
        if let Err(e) = write_half.flush().await {
            debug!("session {} flush error: {}", session.0, e);
            break;
        }
    }
    let _ = write_half.shutdown().await;
}

/// Tolerate CRLF clients: strip a trailing carriage return.
fn tidy(line: String) -> String {
    if line.ends_with('\r') {
        line.trim_end_matches('\r').to_string()
    } else {
        line
    }
}

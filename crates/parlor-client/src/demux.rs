//! The response demultiplexer: the single background reader that makes
//! synchronous call/return work over an asynchronous stream.
//!
//! All reads from the socket happen here and only here. If callers
//! read the stream directly, responses to concurrent calls would
//! interleave and be misattributed; centralizing reads in one task and
//! fanning out by type tag is what restores call/response correctness.
//!
//! Each iteration reads one tag line, then that tag's payload lines.
//! Push tags are handled inline: PING is answered immediately with a
//! `receive pong` call (and never surfaced), chat is appended to the
//! local chat buffer and forwarded, EXIT marks the session closed and
//! ends the task. Solicited tags are decoded and routed to the queue a
//! caller is blocked on. Unknown tags and malformed payloads are
//! logged and skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use parlor_core::{Call, ChatMessage, Notice};
use parlor_protocol::{line_codec, TypeTag};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::queues::ReplyRouter;

pub(crate) struct DemuxContext {
    pub router: ReplyRouter,
    pub notices: mpsc::UnboundedSender<Notice>,
    /// Pre-encoded frames into the writer task; used for auto-pong.
    pub writer: mpsc::UnboundedSender<String>,
    /// Nickname recorded at join time; pongs need it.
    pub identity: Arc<Mutex<Option<String>>>,
    pub chat_log: Arc<Mutex<Vec<ChatMessage>>>,
    pub closed: Arc<AtomicBool>,
}

pub(crate) async fn run_demux(read_half: OwnedReadHalf, ctx: DemuxContext) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        let tag_line = match lines.next_line().await {
            Ok(Some(line)) => tidy(line),
            Ok(None) => {
                debug!("coordinator closed the stream");
                break;
            }
            Err(e) => {
                debug!("read error: {}", e);
                break;
            }
        };

        if tag_line.is_empty() {
            continue;
        }

        let Some(tag) = TypeTag::parse(&tag_line) else {
            warn!("unknown tag {:?}; line discarded", tag_line);
            continue;
        };

        let mut payload = Vec::with_capacity(tag.payload_lines());
        let mut truncated = false;
        for _ in 0..tag.payload_lines() {
            match lines.next_line().await {
                Ok(Some(line)) => payload.push(tidy(line)),
                _ => {
                    truncated = true;
                    break;
                }
            }
        }
        if truncated {
            debug!("stream ended mid-frame");
            break;
        }

        let envelope = match line_codec::parse_payload(tag, &payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("bad payload for {}: {}", tag.as_str(), e);
                continue;
            }
        };

        if tag.is_push() {
            let notice = match envelope.into_notice() {
                Ok(notice) => notice,
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            };
            if handle_push(&ctx, notice) {
                break;
            }
        } else {
            match envelope.into_reply() {
                Ok(reply) => {
                    if !ctx.router.push(tag, reply) {
                        debug!("reply for {} dropped; session gone", tag.as_str());
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }
    }

    // Queue senders drop with the context; every blocked caller wakes
    // with `Closed`.
    ctx.closed.store(true, Ordering::SeqCst);
}

/// Handle one push inline. Returns true when the session must end.
fn handle_push(ctx: &DemuxContext, notice: Notice) -> bool {
    match notice {
        Notice::Ping => {
            let nickname = ctx.identity.lock().unwrap().clone();
            match nickname {
                Some(nickname) => {
                    let frame = line_codec::encode_call(&Call::ReceivePong { nickname });
                    let _ = ctx.writer.send(frame);
                }
                // Not joined yet; the coordinator counts any call as
                // liveness, so a quiet pre-join session may still be
                // evicted eventually. Nothing to answer with.
                None => debug!("ping before join; no pong sent"),
            }
            false
        }
        Notice::Chat(msg) => {
            ctx.chat_log.lock().unwrap().push(msg.clone());
            let _ = ctx.notices.send(Notice::Chat(msg));
            false
        }
        Notice::PrivateChat(msg) => {
            ctx.chat_log.lock().unwrap().push(msg.clone());
            let _ = ctx.notices.send(Notice::PrivateChat(msg));
            false
        }
        Notice::Exit(reason) => {
            ctx.closed.store(true, Ordering::SeqCst);
            warn!("forced exit: {}", reason);
            let _ = ctx.notices.send(Notice::Exit(reason));
            true
        }
        other => {
            // UPDATE and TURN go straight to the application.
            let _ = ctx.notices.send(other);
            false
        }
    }
}

fn tidy(line: String) -> String {
    if line.ends_with('\r') {
        line.trim_end_matches('\r').to_string()
    } else {
        line
    }
}

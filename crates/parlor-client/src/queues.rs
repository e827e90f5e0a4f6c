//! Per-type reply queues.
//!
//! One unbounded, order-preserving queue per solicited tag. The
//! demultiplexer owns the sending halves (the [`ReplyRouter`]); the
//! session owns the receiving halves (the [`ReplyQueues`]). Splitting
//! them is deliberate: when the demultiplexer exits — EOF, I/O
//! failure, or a forced EXIT — the router drops, every queue closes,
//! and each blocked caller wakes with `SessionError::Closed` instead
//! of hanging forever.
//!
//! With the one-call-at-a-time usage invariant, at most one caller
//! ever waits on a given queue, and the queue holds at most one reply.

use std::collections::HashMap;

use parlor_core::{Reply, SessionError};
use parlor_protocol::TypeTag;
use tokio::sync::{mpsc, Mutex};

/// Sending halves, owned by the demultiplexer.
pub struct ReplyRouter {
    senders: HashMap<TypeTag, mpsc::UnboundedSender<Reply>>,
}

/// Receiving halves, owned by the session.
pub struct ReplyQueues {
    receivers: HashMap<TypeTag, Mutex<mpsc::UnboundedReceiver<Reply>>>,
}

/// Build the queue pair: one channel per solicited tag.
pub fn reply_channels() -> (ReplyRouter, ReplyQueues) {
    let mut senders = HashMap::new();
    let mut receivers = HashMap::new();
    for tag in TypeTag::ALL {
        if tag.is_push() {
            continue;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        senders.insert(tag, tx);
        receivers.insert(tag, Mutex::new(rx));
    }
    (ReplyRouter { senders }, ReplyQueues { receivers })
}

impl ReplyRouter {
    /// Route a decoded reply to its tag's queue. False if nothing will
    /// ever drain it (push tag, or the session is gone).
    pub fn push(&self, tag: TypeTag, reply: Reply) -> bool {
        match self.senders.get(&tag) {
            Some(tx) => tx.send(reply).is_ok(),
            None => false,
        }
    }
}

impl ReplyQueues {
    /// Block until the response with this tag arrives.
    ///
    /// There is deliberately no timeout here: a hung connection
    /// surfaces through the liveness mechanism, not call timeouts.
    pub async fn take(&self, tag: TypeTag) -> Result<Reply, SessionError> {
        let Some(slot) = self.receivers.get(&tag) else {
            return Err(SessionError::Protocol(format!(
                "tag {} is not a response type",
                tag.as_str()
            )));
        };
        let mut rx = slot.lock().await;
        rx.recv().await.ok_or(SessionError::Closed)
    }
}

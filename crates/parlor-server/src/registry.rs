//! The session registry: one record per connected client, across all
//! matches.
//!
//! The registry is the only holder of notification sinks. All access
//! goes through the synchronized accessor methods below — raw
//! iteration is never exposed, so callers cannot race the lock or leak
//! records. Records are inserted by the acceptor (or local attach) and
//! removed exactly once, by the facade task's hangup path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parlor_core::{MatchId, Notice};
use parlor_protocol::Envelope;
use tokio::sync::{Notify, RwLock};
use tokio::time::Instant;
use tracing::debug;

use crate::types::{NoticeTx, OutboundTx, SessionId};

/// Where a session's pushes go: encoded frames for byte-stream
/// clients, plain notices for in-process ones.
#[derive(Debug)]
pub enum ClientSink {
    Wire(OutboundTx),
    Direct(NoticeTx),
}

impl ClientSink {
    /// Best-effort push. A dead receiver is not an error here — the
    /// session's own teardown path handles cleanup.
    fn push(&self, notice: Notice) {
        match self {
            ClientSink::Wire(tx) => {
                let _ = tx.send(Envelope::from_notice(notice));
            }
            ClientSink::Direct(tx) => {
                let _ = tx.send(notice);
            }
        }
    }
}

/// One connected session.
#[derive(Debug)]
pub struct SessionRecord {
    /// Assigned once, at join time; immutable thereafter.
    pub nickname: Option<String>,
    /// Assigned once, at join time.
    pub match_id: Option<MatchId>,
    /// True for the session that created its match.
    pub first_to_join: bool,
    /// The first-player marker travels with the match creator.
    pub black_pawn: bool,
    pub last_seen: Instant,
    sink: ClientSink,
    shutdown: Arc<Notify>,
}

impl SessionRecord {
    /// Wake the session's dispatch loop so a forced eviction tears the
    /// connection down instead of leaving a reader parked on a dead
    /// socket.
    pub fn notify_shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Thread-safe map of connected sessions. Cloning shares the map.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<HashMap<SessionId, SessionRecord>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn contains(&self, id: SessionId) -> bool {
        self.inner.read().await.contains_key(&id)
    }

    /// Register a fresh session. Returns the shutdown handle its
    /// dispatch loop should select on.
    pub async fn insert(&self, id: SessionId, sink: ClientSink) -> Arc<Notify> {
        let shutdown = Arc::new(Notify::new());
        let record = SessionRecord {
            nickname: None,
            match_id: None,
            first_to_join: false,
            black_pawn: false,
            last_seen: Instant::now(),
            sink,
            shutdown: shutdown.clone(),
        };
        self.inner.write().await.insert(id, record);
        shutdown
    }

    /// Remove a session. Returns `None` if it was already gone, which
    /// makes duplicate hangups harmless.
    pub async fn remove(&self, id: SessionId) -> Option<SessionRecord> {
        self.inner.write().await.remove(&id)
    }

    /// Assign identity to a session at join time. Nickname and match
    /// id are assign-once: a second bind is ignored.
    pub async fn bind(
        &self,
        id: SessionId,
        nickname: &str,
        match_id: MatchId,
        first_to_join: bool,
        black_pawn: bool,
    ) {
        if let Some(record) = self.inner.write().await.get_mut(&id) {
            if record.nickname.is_some() {
                debug!("session {} already bound; ignoring rebind", id.0);
                return;
            }
            record.nickname = Some(nickname.to_string());
            record.match_id = Some(match_id);
            record.first_to_join = first_to_join;
            record.black_pawn = black_pawn;
        }
    }

    /// Refresh a session's last-seen instant.
    pub async fn touch(&self, id: SessionId) {
        if let Some(record) = self.inner.write().await.get_mut(&id) {
            record.last_seen = Instant::now();
        }
    }

    pub async fn nickname_of(&self, id: SessionId) -> Option<String> {
        self.inner.read().await.get(&id).and_then(|r| r.nickname.clone())
    }

    pub async fn match_of(&self, id: SessionId) -> Option<MatchId> {
        self.inner.read().await.get(&id).and_then(|r| r.match_id)
    }

    /// Push a notice to one session. True if the session exists.
    pub async fn push_to(&self, id: SessionId, notice: Notice) -> bool {
        match self.inner.read().await.get(&id) {
            Some(record) => {
                record.sink.push(notice);
                true
            }
            None => false,
        }
    }

    /// Push a notice to the session bound to a nickname. True if found.
    pub async fn push_to_nickname(&self, nickname: &str, notice: Notice) -> bool {
        let guard = self.inner.read().await;
        match guard
            .values()
            .find(|r| r.nickname.as_deref() == Some(nickname))
        {
            Some(record) => {
                record.sink.push(notice);
                true
            }
            None => false,
        }
    }

    /// Push a notice to every session bound to a match.
    pub async fn broadcast_match(&self, match_id: MatchId, notice: Notice) {
        let guard = self.inner.read().await;
        for record in guard.values() {
            if record.match_id == Some(match_id) {
                record.sink.push(notice.clone());
            }
        }
    }

    /// Push a notice to every registered session.
    pub async fn broadcast_all(&self, notice: Notice) {
        let guard = self.inner.read().await;
        for record in guard.values() {
            record.sink.push(notice.clone());
        }
    }

    /// Sessions whose last-seen is older than `ttl`.
    pub async fn stale(&self, ttl: Duration) -> Vec<SessionId> {
        let now = Instant::now();
        self.inner
            .read()
            .await
            .iter()
            .filter(|(_, r)| now.duration_since(r.last_seen) >= ttl)
            .map(|(id, _)| *id)
            .collect()
    }
}

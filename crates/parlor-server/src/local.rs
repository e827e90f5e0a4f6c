//! The object-call transport: invoke the facade as direct method
//! calls, no sockets involved.
//!
//! A `LocalSession` registers like any other session — it appears in
//! the registry, receives pushes on its notice channel, and is subject
//! to the same liveness supervision (it must answer `Ping` with
//! `receive_pong`, or simply keep calling). Unlike the byte-stream
//! transport, every call runs under a caller-configured timeout, and
//! failures surface as a distinguishable `SessionError` rather than a
//! normal return value.

use std::time::Duration;

use parlor_core::{Call, CallTransport, Reply, SessionError};
use tokio::sync::{mpsc, oneshot};

use crate::registry::{ClientSink, Registry};
use crate::server;
use crate::types::{FacadeRequest, FacadeTx, NoticeRx, SessionId};

/// Cheap-to-clone handle to a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    registry: Registry,
    facade_tx: FacadeTx,
}

impl CoordinatorHandle {
    pub(crate) fn new(registry: Registry, facade_tx: FacadeTx) -> Self {
        CoordinatorHandle {
            registry,
            facade_tx,
        }
    }

    /// Number of currently registered sessions, across all matches.
    pub async fn session_count(&self) -> usize {
        self.registry.len().await
    }
}

/// An in-process session speaking the facade contract directly.
///
/// The sequential-call usage invariant applies here too: one call at a
/// time per session.
pub struct LocalSession {
    session: SessionId,
    facade_tx: FacadeTx,
    timeout: Duration,
}

impl LocalSession {
    /// Register a new in-process session. The returned receiver yields
    /// every push the coordinator sends this session.
    pub async fn attach(handle: &CoordinatorHandle, timeout: Duration) -> (LocalSession, NoticeRx) {
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let session = server::next_session_id();
        handle
            .registry
            .insert(session, ClientSink::Direct(notice_tx))
            .await;
        (
            LocalSession {
                session,
                facade_tx: handle.facade_tx.clone(),
                timeout,
            },
            notice_rx,
        )
    }

    pub fn id(&self) -> SessionId {
        self.session
    }
}

impl CallTransport for LocalSession {
    async fn call(&self, call: Call) -> Result<Reply, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.facade_tx
            .send(FacadeRequest::Call {
                session: self.session,
                call,
                reply: reply_tx,
            })
            .map_err(|_| SessionError::Closed)?;

        match tokio::time::timeout(self.timeout, reply_rx).await {
            Err(_) => Err(SessionError::Timeout),
            Ok(Err(_)) => Err(SessionError::Closed),
            Ok(Ok(reply)) => Ok(reply),
        }
    }
}

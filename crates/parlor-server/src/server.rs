//! TCP listener and top-level coordinator wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections.
//! - Assigns each connection a `SessionId` and registers it.
//! - Spawns:
//!   - a per-session task to run the dispatch loop,
//!   - a single central facade task that owns the `MatchCoordinator`,
//!   - the liveness supervisor.
//!
//! `bind` and `run` are split so tests can bind to port 0, learn the
//! real address, and attach local sessions before the accept loop
//! starts.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use parlor_core::MatchCoordinator;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::client;
use crate::config::Config;
use crate::facade_task;
use crate::local::CoordinatorHandle;
use crate::registry::{ClientSink, Registry};
use crate::supervisor;
use crate::types::{FacadeTx, SessionId};

/// Global-ish counter for assigning unique `SessionId`s.
///
/// In a more elaborate setup you might encapsulate this in a struct,
/// but this is sufficient and threadsafe for our coordinator.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_session_id() -> SessionId {
    let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
    SessionId(id)
}

/// A bound coordinator, ready to accept connections.
pub struct Server {
    listener: TcpListener,
    registry: Registry,
    facade_tx: FacadeTx,
    max_clients: usize,
}

impl Server {
    /// Bind the listener and start the facade task and supervisor.
    /// The accept loop does not run until [`Server::run`].
    pub async fn bind<M>(config: &Config, matches: M) -> Result<Server>
    where
        M: MatchCoordinator + Send + 'static,
    {
        let addr = config.socket_addr_string();
        let listener = TcpListener::bind(&addr).await?;
        info!("listening on {}", listener.local_addr()?);

        let registry = Registry::new();
        let (facade_tx, facade_rx) = mpsc::unbounded_channel();

        {
            let registry = registry.clone();
            tokio::spawn(async move {
                facade_task::run_facade_loop(facade_rx, registry, matches).await;
            });
        }
        {
            let registry = registry.clone();
            let facade_tx = facade_tx.clone();
            let every = config.ping_interval();
            let stale_after = config.stale_after();
            tokio::spawn(async move {
                supervisor::run_supervisor(registry, facade_tx, every, stale_after).await;
            });
        }

        Ok(Server {
            listener,
            registry,
            facade_tx,
            max_clients: config.max_clients,
        })
    }

    /// The address actually bound — useful with port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for attaching in-process (object-call) sessions and for
    /// observing the registry.
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle::new(self.registry.clone(), self.facade_tx.clone())
    }

    /// Accept connections until the listener fails.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer_addr) = self.listener.accept().await?;

            if self.registry.len().await >= self.max_clients {
                warn!(
                    "rejecting connection from {}: max_clients ({}) reached",
                    peer_addr, self.max_clients
                );
                // Just drop the stream; the client sees a closed connection.
                continue;
            }

            let session = next_session_id();
            info!("accepted session {} from {}", session.0, peer_addr);

            let (out_tx, out_rx) = mpsc::unbounded_channel();
            let shutdown = self
                .registry
                .insert(session, ClientSink::Wire(out_tx.clone()))
                .await;

            let facade_tx = self.facade_tx.clone();
            tokio::spawn(async move {
                match client::run_session(session, stream, facade_tx, out_tx, out_rx, shutdown)
                    .await
                {
                    Ok(()) => info!("session {} disconnected", session.0),
                    Err(e) => warn!("session {} i/o error: {}", session.0, e),
                }
            });
        }
    }
}

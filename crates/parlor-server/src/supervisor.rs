//! Liveness supervisor.
//!
//! A single periodic task shared across all connections. Each cycle:
//!
//! 1. scan the registry for sessions whose last-seen is older than the
//!    stale threshold and route each to the facade task's hangup path
//!    (which evicts the session and aborts its match), then
//! 2. broadcast PING to every registered session.
//!
//! Clients answer PING with `receive pong`; every call — pong or not —
//! refreshes last-seen in the facade task. The scan runs before the
//! broadcast, so a session is declared dead on the first cycle where
//! its silence exceeds the threshold, and not before. The threshold
//! must exceed the ping interval (`Config::from_env` enforces this);
//! keeping it under twice the interval evicts after one missed ping.

use std::time::Duration;

use parlor_core::Notice;
use tracing::{debug, warn};

use crate::registry::Registry;
use crate::types::{FacadeRequest, FacadeTx, HangupCause};

pub async fn run_supervisor(
    registry: Registry,
    facade_tx: FacadeTx,
    every: Duration,
    stale_after: Duration,
) {
    let mut ticker = tokio::time::interval(every);
    // The first tick of `interval` completes immediately; skip it so
    // the first real cycle happens one full interval after startup.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        for session in registry.stale(stale_after).await {
            warn!("session {} missed heartbeats; evicting", session.0);
            if facade_tx
                .send(FacadeRequest::Hangup {
                    session,
                    cause: HangupCause::TimedOut,
                })
                .is_err()
            {
                // Facade task gone; the coordinator is shutting down.
                return;
            }
        }

        debug!("heartbeat broadcast");
        registry.broadcast_all(Notice::Ping).await;
    }
}

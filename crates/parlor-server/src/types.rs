//! Shared types for the coordinator.
//!
//! This module defines:
//! - `SessionId`: a lightweight handle for connected sessions
//! - channel aliases between session tasks and the facade task
//! - `FacadeRequest`: messages flowing into the facade task

use parlor_core::{Call, Notice, Reply};
use parlor_protocol::Envelope;
use tokio::sync::{mpsc, oneshot};

/// Identifier for a connected session.
///
/// This is intentionally opaque; we just guarantee uniqueness over the
/// lifetime of the process. Nicknames come later, at join time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Outbound wire frames to one byte-stream session.
pub type OutboundTx = mpsc::UnboundedSender<Envelope>;
pub type OutboundRx = mpsc::UnboundedReceiver<Envelope>;

/// Pushes to one in-process (object-call) session.
pub type NoticeTx = mpsc::UnboundedSender<Notice>;
pub type NoticeRx = mpsc::UnboundedReceiver<Notice>;

/// Why a session is being dropped. Shapes the abort reason co-players
/// read in their EXIT push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HangupCause {
    /// End-of-stream or I/O failure on the connection.
    ConnectionLost,
    /// The liveness supervisor declared the session dead.
    TimedOut,
    /// The client called `remove client`.
    Left,
}

impl HangupCause {
    pub fn phrase(&self) -> &'static str {
        match self {
            HangupCause::ConnectionLost => "lost its connection",
            HangupCause::TimedOut => "stopped answering heartbeats",
            HangupCause::Left => "left the table",
        }
    }
}

/// Message flowing from a session task (or local session) into the
/// facade task.
#[derive(Debug)]
pub enum FacadeRequest {
    /// Invoke one facade operation and send its reply back.
    Call {
        session: SessionId,
        call: Call,
        reply: oneshot::Sender<Reply>,
    },
    /// Remove a session; aborts its match for everyone else.
    Hangup {
        session: SessionId,
        cause: HangupCause,
    },
}

/// Channel from sessions → facade task.
pub type FacadeTx = mpsc::UnboundedSender<FacadeRequest>;
pub type FacadeRx = mpsc::UnboundedReceiver<FacadeRequest>;

//! parlor-client
//!
//! Byte-stream client transport for the parlor coordinator:
//! - [`session::RemoteSession`]: the facade over a TCP connection
//! - a single-reader demultiplexer that classifies every inbound frame
//!   as a push (handled inline) or a typed call response (routed to
//!   that type's queue)
//! - per-type reply queues that give callers synchronous call/return
//!   semantics on top of the asynchronous stream

pub mod queues;
pub mod session;

mod demux;

pub use session::RemoteSession;

//! parlor-server
//!
//! Multi-client async TCP coordinator for parlor matches: dispatch
//! loops, session registry, liveness supervisor, and the in-process
//! object-call transport.

pub mod config;
pub mod local;
pub mod registry;
pub mod server;
pub mod types;

// these are internal modules, not re-exported
mod client;
mod facade_task;
mod supervisor;

pub use config::Config;
pub use local::{CoordinatorHandle, LocalSession};
pub use server::Server;

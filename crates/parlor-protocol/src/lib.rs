//! parlor-protocol
//!
//! Wire-level encoding/decoding for the parlor coordinator.
//!
//! This crate turns logical facade messages (`parlor_core::Call`,
//! `Reply`, `Notice`) into newline-terminated UTF-8 text and back:
//!
//! - [`verbs`]      : the closed call vocabulary (verb line + argument lines)
//! - [`tags`]       : the closed response/notification vocabulary
//! - [`envelope`]   : tagged payload carried by a response frame
//! - [`line_codec`] : frame encoding/decoding on top of the above
//!
//! There is deliberately no length prefix and no I/O in this crate:
//! every frame's line count is statically known from its verb or tag,
//! and the server/client crates own their streams.

pub mod envelope;
pub mod line_codec;
pub mod tags;
pub mod verbs;

pub use envelope::{Envelope, Payload};
pub use line_codec::{encode_call, encode_envelope, parse_call, parse_payload, ProtocolError};
pub use tags::TypeTag;
pub use verbs::Verb;

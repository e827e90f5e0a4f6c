//! The message envelope: a type tag plus the payload that tag dictates.
//!
//! Only the byte-stream transport uses envelopes; the object-call
//! transport hands `Reply`/`Notice` values across directly. The
//! payload variant is fully determined by the tag — construction goes
//! through [`Envelope::from_reply`] / [`Envelope::from_notice`] or the
//! codec's parser, all of which keep that invariant.

use parlor_core::{
    Card, ChatMessage, Notice, PawnColor, PhaseSnapshot, Position, Reply, TableSnapshot,
};

use crate::line_codec::ProtocolError;
use crate::tags::TypeTag;

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub tag: TypeTag,
    pub payload: Payload,
}

/// Payload shapes a frame can carry. `POSITIONS` travels as a flat
/// integer list of interleaved row/col pairs; lists and domain
/// snapshots travel as one self-delimiting JSON line each.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Bool(bool),
    Int(i64),
    IntList(Vec<i64>),
    Str(String),
    StrList(Vec<String>),
    Colors(Vec<PawnColor>),
    Cards(Vec<Card>),
    Table(TableSnapshot),
    Phase(PhaseSnapshot),
    Chat(ChatMessage),
    Empty,
}

impl Envelope {
    /// Wrap a call response. `Reply::None` produces no frame at all —
    /// void operations are silent on the wire.
    pub fn from_reply(reply: Reply) -> Option<Envelope> {
        let (tag, payload) = match reply {
            Reply::Bool(b) => (TypeTag::Boolean, Payload::Bool(b)),
            Reply::Int(n) => (TypeTag::Integer, Payload::Int(n)),
            Reply::Positions(positions) => {
                let flat = positions
                    .iter()
                    .flat_map(|p| [i64::from(p.row), i64::from(p.col)])
                    .collect();
                (TypeTag::Positions, Payload::IntList(flat))
            }
            Reply::Colors(colors) => (TypeTag::Colors, Payload::Colors(colors)),
            Reply::Str(s) => (TypeTag::String, Payload::Str(s)),
            Reply::Names(names) => (TypeTag::Names, Payload::StrList(names)),
            Reply::Cards(cards) => (TypeTag::Cards, Payload::Cards(cards)),
            Reply::Table(table) => (TypeTag::Table, Payload::Table(table)),
            Reply::Phase(phase) => (TypeTag::Controller, Payload::Phase(phase)),
            Reply::None => return None,
        };
        Some(Envelope { tag, payload })
    }

    pub fn from_notice(notice: Notice) -> Envelope {
        let (tag, payload) = match notice {
            Notice::Update(event) => (TypeTag::Update, Payload::Str(event)),
            Notice::Turn(nickname) => (TypeTag::Turn, Payload::Str(nickname)),
            Notice::Chat(msg) => (TypeTag::Chat, Payload::Chat(msg)),
            Notice::PrivateChat(msg) => (TypeTag::PrivateChat, Payload::Chat(msg)),
            Notice::Ping => (TypeTag::Ping, Payload::Empty),
            Notice::Exit(reason) => (TypeTag::Exit, Payload::Str(reason)),
        };
        Envelope { tag, payload }
    }

    /// Unwrap a solicited frame into the reply a caller is waiting on.
    pub fn into_reply(self) -> Result<Reply, ProtocolError> {
        match (self.tag, self.payload) {
            (TypeTag::Boolean, Payload::Bool(b)) => Ok(Reply::Bool(b)),
            (TypeTag::Integer, Payload::Int(n)) => Ok(Reply::Int(n)),
            (TypeTag::Positions, Payload::IntList(flat)) => {
                if flat.len() % 2 != 0 {
                    return Err(ProtocolError::BadPayload(
                        "odd position list length".to_string(),
                    ));
                }
                let positions = flat
                    .chunks(2)
                    .map(|pair| Position::new(pair[0] as i32, pair[1] as i32))
                    .collect();
                Ok(Reply::Positions(positions))
            }
            (TypeTag::Colors, Payload::Colors(colors)) => Ok(Reply::Colors(colors)),
            (TypeTag::String, Payload::Str(s)) => Ok(Reply::Str(s)),
            (TypeTag::Names, Payload::StrList(names)) => Ok(Reply::Names(names)),
            (TypeTag::Cards, Payload::Cards(cards)) => Ok(Reply::Cards(cards)),
            (TypeTag::Table, Payload::Table(table)) => Ok(Reply::Table(table)),
            (TypeTag::Controller, Payload::Phase(phase)) => Ok(Reply::Phase(phase)),
            (tag, _) => Err(ProtocolError::BadPayload(format!(
                "tag {} does not answer a call",
                tag.as_str()
            ))),
        }
    }

    /// Unwrap a push frame into its notice.
    pub fn into_notice(self) -> Result<Notice, ProtocolError> {
        match (self.tag, self.payload) {
            (TypeTag::Update, Payload::Str(event)) => Ok(Notice::Update(event)),
            (TypeTag::Turn, Payload::Str(nickname)) => Ok(Notice::Turn(nickname)),
            (TypeTag::Chat, Payload::Chat(msg)) => Ok(Notice::Chat(msg)),
            (TypeTag::PrivateChat, Payload::Chat(msg)) => Ok(Notice::PrivateChat(msg)),
            (TypeTag::Ping, Payload::Empty) => Ok(Notice::Ping),
            (TypeTag::Exit, Payload::Str(reason)) => Ok(Notice::Exit(reason)),
            (tag, _) => Err(ProtocolError::BadPayload(format!(
                "tag {} is not a push",
                tag.as_str()
            ))),
        }
    }
}

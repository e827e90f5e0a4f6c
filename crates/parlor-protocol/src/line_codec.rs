//! Line-oriented frame encoding/decoding.
//!
//! This module converts between:
//! - newline-terminated UTF-8 text frames
//! - high-level `parlor_core::Call` / [`Envelope`] values
//!
//! Framing model:
//!
//! ```text
//! Call (client → coordinator)
//! ---------------------------
//! <verb>\n
//! <arg 1>\n
//! ...
//! <arg N>\n
//!
//! N is fixed per verb (`Verb::arg_count`). Arguments are one value
//! per line, in a fixed order per operation:
//!   booleans    "true" / "false"
//!   integers    decimal
//!   colors      "red" | "blue" | "green" | "yellow"
//!   faces       "front" | "back"
//!   free text   one line; the encoder replaces CR/LF with spaces
//!
//! Response (coordinator → client)
//! -------------------------------
//! <TAG>\n
//! <payload lines>
//!
//! The payload line count is fixed per tag (`TypeTag::payload_lines`):
//! 0 for PING, 1 for everything else. Scalar payloads are plain text;
//! lists and domain snapshots are a single self-delimiting JSON line
//! (serde_json never emits a raw newline), so the line reader never
//! needs to pre-know a payload's byte length.
//! ```
//!
//! There is no length prefix anywhere: every frame's shape is
//! statically known from the verb (request side) or the tag (response
//! side). The vocabulary is closed — an unknown verb or tag is a
//! protocol error the reader logs and skips, never a reason to drop
//! the connection.

use std::fmt;

use parlor_core::{Call, CardFace, MatchId, PawnColor, Position};

use crate::envelope::{Envelope, Payload};
use crate::tags::TypeTag;
use crate::verbs::Verb;

/// Errors that can arise when encoding/decoding a frame.
#[derive(Debug)]
pub enum ProtocolError {
    /// Verb line outside the closed vocabulary.
    UnknownVerb(String),
    /// Tag line outside the closed vocabulary.
    UnknownTag(String),
    /// Frame ended before the expected number of lines.
    Truncated,
    /// Wrong number of argument lines for the verb.
    ArgCount {
        verb: Verb,
        expected: usize,
        got: usize,
    },
    /// An argument line failed to parse as its declared type.
    InvalidArgument(&'static str),
    /// A structured payload line failed to parse or made no sense.
    BadPayload(String),
    /// A structured payload failed to serialize.
    Json(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownVerb(v) => write!(f, "unknown verb: {:?}", v),
            ProtocolError::UnknownTag(t) => write!(f, "unknown tag: {:?}", t),
            ProtocolError::Truncated => write!(f, "frame truncated"),
            ProtocolError::ArgCount {
                verb,
                expected,
                got,
            } => write!(
                f,
                "verb '{}' takes {} argument lines, got {}",
                verb.as_str(),
                expected,
                got
            ),
            ProtocolError::InvalidArgument(field) => write!(f, "invalid argument: {}", field),
            ProtocolError::BadPayload(msg) => write!(f, "bad payload: {}", msg),
            ProtocolError::Json(msg) => write!(f, "payload serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for ProtocolError {}

// ============================================================================
// CALLS: client → coordinator
// ============================================================================

/// Encode a call as a complete frame, trailing newline included.
pub fn encode_call(call: &Call) -> String {
    let mut out = String::new();
    out.push_str(Verb::of(call).as_str());
    out.push('\n');
    for arg in call_args(call) {
        out.push_str(&clean(&arg));
        out.push('\n');
    }
    out
}

/// Argument lines of a call, in wire order.
fn call_args(call: &Call) -> Vec<String> {
    match call {
        Call::CheckName { nickname }
        | Call::AddMatch { nickname }
        | Call::ReceivePong { nickname }
        | Call::RemoveClient { nickname } => vec![nickname.clone()],
        Call::AddPlayer { nickname, match_id }
        | Call::ValidPositions { nickname, match_id }
        | Call::DrawResource { nickname, match_id }
        | Call::DrawGold { nickname, match_id }
        | Call::ViewHand { nickname, match_id }
        | Call::CheckTurn { nickname, match_id }
        | Call::Score { nickname, match_id }
        | Call::CheatFullGold { nickname, match_id }
        | Call::CheatPoints { nickname, match_id }
        | Call::CheatLastRound { nickname, match_id } => {
            vec![nickname.clone(), match_id.to_string()]
        }
        Call::ViewColors { match_id }
        | Call::ViewTable { match_id }
        | Call::ViewNames { match_id }
        | Call::ViewPhase { match_id }
        | Call::IsLastRound { match_id }
        | Call::Winner { match_id } => vec![match_id.to_string()],
        Call::ChooseColor {
            nickname,
            match_id,
            color,
        } => vec![
            nickname.clone(),
            match_id.to_string(),
            color.as_str().to_string(),
        ],
        Call::Place {
            nickname,
            match_id,
            hand_index,
            position,
            face,
        } => vec![
            nickname.clone(),
            match_id.to_string(),
            hand_index.to_string(),
            position.row.to_string(),
            position.col.to_string(),
            face.as_str().to_string(),
        ],
        Call::DrawTable {
            nickname,
            match_id,
            slot,
        } => vec![nickname.clone(), match_id.to_string(), slot.to_string()],
        Call::Chat {
            nickname,
            match_id,
            body,
        } => vec![nickname.clone(), match_id.to_string(), body.clone()],
        Call::Whisper {
            nickname,
            recipient,
            match_id,
            body,
        } => vec![
            nickname.clone(),
            recipient.clone(),
            match_id.to_string(),
            body.clone(),
        ],
    }
}

/// Rebuild a call from its verb and argument lines.
pub fn parse_call(verb: Verb, args: &[String]) -> Result<Call, ProtocolError> {
    let expected = verb.arg_count();
    if args.len() != expected {
        return Err(ProtocolError::ArgCount {
            verb,
            expected,
            got: args.len(),
        });
    }

    let call = match verb {
        Verb::CheckName => Call::CheckName {
            nickname: args[0].clone(),
        },
        Verb::AddMatch => Call::AddMatch {
            nickname: args[0].clone(),
        },
        Verb::AddPlayer => Call::AddPlayer {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::ViewColors => Call::ViewColors {
            match_id: parse_match_id(&args[0])?,
        },
        Verb::ChooseColor => Call::ChooseColor {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
            color: PawnColor::parse(&args[2]).ok_or(ProtocolError::InvalidArgument("color"))?,
        },
        Verb::ValidPositions => Call::ValidPositions {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::Place => Call::Place {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
            hand_index: parse_usize(&args[2], "hand index")?,
            position: Position::new(
                parse_i32(&args[3], "row")?,
                parse_i32(&args[4], "col")?,
            ),
            face: CardFace::parse(&args[5]).ok_or(ProtocolError::InvalidArgument("face"))?,
        },
        Verb::DrawResource => Call::DrawResource {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::DrawGold => Call::DrawGold {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::DrawTable => Call::DrawTable {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
            slot: parse_usize(&args[2], "slot")?,
        },
        Verb::ViewHand => Call::ViewHand {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::ViewTable => Call::ViewTable {
            match_id: parse_match_id(&args[0])?,
        },
        Verb::ViewNames => Call::ViewNames {
            match_id: parse_match_id(&args[0])?,
        },
        Verb::ViewPhase => Call::ViewPhase {
            match_id: parse_match_id(&args[0])?,
        },
        Verb::CheckTurn => Call::CheckTurn {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::IsLastRound => Call::IsLastRound {
            match_id: parse_match_id(&args[0])?,
        },
        Verb::Score => Call::Score {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::Winner => Call::Winner {
            match_id: parse_match_id(&args[0])?,
        },
        Verb::Chat => Call::Chat {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
            body: args[2].clone(),
        },
        Verb::Whisper => Call::Whisper {
            nickname: args[0].clone(),
            recipient: args[1].clone(),
            match_id: parse_match_id(&args[2])?,
            body: args[3].clone(),
        },
        Verb::Cheat1 => Call::CheatFullGold {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::Cheat2 => Call::CheatPoints {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::Cheat3 => Call::CheatLastRound {
            nickname: args[0].clone(),
            match_id: parse_match_id(&args[1])?,
        },
        Verb::ReceivePong => Call::ReceivePong {
            nickname: args[0].clone(),
        },
        Verb::RemoveClient => Call::RemoveClient {
            nickname: args[0].clone(),
        },
    };
    Ok(call)
}

// ============================================================================
// RESPONSES: coordinator → client
// ============================================================================

/// Encode an envelope as a complete frame, trailing newline included.
pub fn encode_envelope(env: &Envelope) -> Result<String, ProtocolError> {
    let mut out = String::new();
    out.push_str(env.tag.as_str());
    out.push('\n');
    match &env.payload {
        Payload::Empty => {}
        Payload::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            out.push('\n');
        }
        Payload::Int(n) => {
            out.push_str(&n.to_string());
            out.push('\n');
        }
        Payload::Str(s) => {
            out.push_str(&clean(s));
            out.push('\n');
        }
        Payload::IntList(v) => push_json(&mut out, v)?,
        Payload::StrList(v) => push_json(&mut out, v)?,
        Payload::Colors(v) => push_json(&mut out, v)?,
        Payload::Cards(v) => push_json(&mut out, v)?,
        Payload::Table(t) => push_json(&mut out, t)?,
        Payload::Phase(p) => push_json(&mut out, p)?,
        Payload::Chat(m) => push_json(&mut out, m)?,
    }
    Ok(out)
}

/// Rebuild an envelope from a tag and its payload lines.
pub fn parse_payload(tag: TypeTag, lines: &[String]) -> Result<Envelope, ProtocolError> {
    if lines.len() != tag.payload_lines() {
        return Err(ProtocolError::Truncated);
    }

    let payload = match tag {
        TypeTag::Ping => Payload::Empty,
        TypeTag::Boolean => match lines[0].as_str() {
            "true" => Payload::Bool(true),
            "false" => Payload::Bool(false),
            other => {
                return Err(ProtocolError::BadPayload(format!(
                    "expected boolean line, got {:?}",
                    other
                )))
            }
        },
        TypeTag::Integer => Payload::Int(
            lines[0]
                .parse::<i64>()
                .map_err(|_| ProtocolError::InvalidArgument("integer payload"))?,
        ),
        TypeTag::Update | TypeTag::String | TypeTag::Turn | TypeTag::Exit => {
            Payload::Str(lines[0].clone())
        }
        TypeTag::Positions => Payload::IntList(parse_json(&lines[0])?),
        TypeTag::Names => Payload::StrList(parse_json(&lines[0])?),
        TypeTag::Colors => Payload::Colors(parse_json(&lines[0])?),
        TypeTag::Cards => Payload::Cards(parse_json(&lines[0])?),
        TypeTag::Table => Payload::Table(parse_json(&lines[0])?),
        TypeTag::Controller => Payload::Phase(parse_json(&lines[0])?),
        TypeTag::Chat | TypeTag::PrivateChat => Payload::Chat(parse_json(&lines[0])?),
    };
    Ok(Envelope { tag, payload })
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

/// One value must occupy one line; free text gets its line breaks
/// flattened rather than corrupting the frame.
fn clean(s: &str) -> String {
    if s.contains(['\n', '\r']) {
        s.replace(['\n', '\r'], " ")
    } else {
        s.to_string()
    }
}

fn push_json<T: serde::Serialize>(out: &mut String, value: &T) -> Result<(), ProtocolError> {
    let line = serde_json::to_string(value).map_err(|e| ProtocolError::Json(e.to_string()))?;
    out.push_str(&line);
    out.push('\n');
    Ok(())
}

fn parse_json<T: serde::de::DeserializeOwned>(line: &str) -> Result<T, ProtocolError> {
    serde_json::from_str(line).map_err(|e| ProtocolError::BadPayload(e.to_string()))
}

fn parse_match_id(s: &str) -> Result<MatchId, ProtocolError> {
    s.parse::<i64>()
        .map(MatchId)
        .map_err(|_| ProtocolError::InvalidArgument("match id"))
}

fn parse_usize(s: &str, field: &'static str) -> Result<usize, ProtocolError> {
    s.parse::<usize>()
        .map_err(|_| ProtocolError::InvalidArgument(field))
}

fn parse_i32(s: &str, field: &'static str) -> Result<i32, ProtocolError> {
    s.parse::<i32>()
        .map_err(|_| ProtocolError::InvalidArgument(field))
}

#[cfg(test)]
mod tests {
    use parlor_core::{
        Card, CardFace, CardKind, ChatMessage, MatchId, MatchPhase, Notice, PawnColor,
        PhaseSnapshot, PlacedCard, Position, Reply, SeatView, TableSnapshot,
    };

    use super::*;

    fn frame_lines(frame: &str) -> Vec<String> {
        frame.lines().map(|l| l.to_string()).collect()
    }

    fn sample_calls() -> Vec<Call> {
        let mid = MatchId(7);
        vec![
            Call::CheckName {
                nickname: "alice".into(),
            },
            Call::AddMatch {
                nickname: "alice".into(),
            },
            Call::AddPlayer {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::ViewColors { match_id: mid },
            Call::ChooseColor {
                nickname: "bob".into(),
                match_id: mid,
                color: PawnColor::Green,
            },
            Call::ValidPositions {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::Place {
                nickname: "bob".into(),
                match_id: mid,
                hand_index: 2,
                position: Position::new(-1, 1),
                face: CardFace::Back,
            },
            Call::DrawResource {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::DrawGold {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::DrawTable {
                nickname: "bob".into(),
                match_id: mid,
                slot: 3,
            },
            Call::ViewHand {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::ViewTable { match_id: mid },
            Call::ViewNames { match_id: mid },
            Call::ViewPhase { match_id: mid },
            Call::CheckTurn {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::IsLastRound { match_id: mid },
            Call::Score {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::Winner { match_id: mid },
            Call::Chat {
                nickname: "bob".into(),
                match_id: mid,
                body: "good luck, everyone".into(),
            },
            Call::Whisper {
                nickname: "bob".into(),
                recipient: "alice".into(),
                match_id: mid,
                body: "psst".into(),
            },
            Call::CheatFullGold {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::CheatPoints {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::CheatLastRound {
                nickname: "bob".into(),
                match_id: mid,
            },
            Call::ReceivePong {
                nickname: "bob".into(),
            },
            Call::RemoveClient {
                nickname: "bob".into(),
            },
        ]
    }

    #[test]
    fn every_call_round_trips() {
        let calls = sample_calls();
        // One sample per operation; keep this in sync with the Call enum.
        assert_eq!(calls.len(), Verb::ALL.len());

        for call in calls {
            let frame = encode_call(&call);
            let lines = frame_lines(&frame);
            let verb = Verb::parse(&lines[0]).expect("verb line should parse");
            assert_eq!(verb, Verb::of(&call));
            assert_eq!(lines.len() - 1, verb.arg_count());
            let decoded = parse_call(verb, &lines[1..]).expect("args should parse");
            assert_eq!(decoded, call);
        }
    }

    fn sample_replies() -> Vec<Reply> {
        let card = Card {
            id: 12,
            kind: CardKind::Gold,
            points: 2,
        };
        vec![
            Reply::Bool(false),
            Reply::Int(7),
            Reply::Positions(vec![Position::new(1, 1), Position::new(-1, 1)]),
            Reply::Colors(vec![PawnColor::Red, PawnColor::Yellow]),
            Reply::Str("alice".into()),
            Reply::Names(vec!["alice".into(), "bob".into()]),
            Reply::Cards(vec![card]),
            Reply::Table(TableSnapshot {
                match_id: MatchId(7),
                face_up: vec![card],
                resource_deck: 36,
                gold_deck: 37,
                seats: vec![SeatView {
                    nickname: "alice".into(),
                    color: Some(PawnColor::Red),
                    black_pawn: true,
                    score: 3,
                    placed: vec![PlacedCard {
                        card,
                        position: Position::new(0, 0),
                        face: CardFace::Front,
                    }],
                }],
            }),
            Reply::Phase(PhaseSnapshot {
                phase: MatchPhase::Playing,
                current_player: Some("alice".into()),
                round: 2,
                last_round: false,
            }),
        ]
    }

    #[test]
    fn every_reply_round_trips() {
        for reply in sample_replies() {
            let env = Envelope::from_reply(reply.clone()).expect("non-void reply");
            let frame = encode_envelope(&env).unwrap();
            let lines = frame_lines(&frame);
            let tag = TypeTag::parse(&lines[0]).expect("tag line should parse");
            assert_eq!(lines.len() - 1, tag.payload_lines());
            let decoded = parse_payload(tag, &lines[1..]).unwrap();
            assert_eq!(decoded.into_reply().unwrap(), reply);
        }
    }

    #[test]
    fn void_replies_produce_no_frame() {
        assert!(Envelope::from_reply(Reply::None).is_none());
    }

    #[test]
    fn every_notice_round_trips() {
        let notices = vec![
            Notice::Update("alice placed a card".into()),
            Notice::Turn("bob".into()),
            Notice::Chat(ChatMessage::new("alice", "hello table")),
            Notice::PrivateChat(ChatMessage::new("bob", "psst")),
            Notice::Ping,
            Notice::Exit("alice timed out; match 7 aborted".into()),
        ];
        for notice in notices {
            let env = Envelope::from_notice(notice.clone());
            let frame = encode_envelope(&env).unwrap();
            let lines = frame_lines(&frame);
            let tag = TypeTag::parse(&lines[0]).unwrap();
            assert!(tag.is_push());
            let decoded = parse_payload(tag, &lines[1..]).unwrap();
            assert_eq!(decoded.into_notice().unwrap(), notice);
        }
    }

    #[test]
    fn ping_frame_is_a_bare_tag_line() {
        let frame = encode_envelope(&Envelope::from_notice(Notice::Ping)).unwrap();
        assert_eq!(frame, "PING\n");
    }

    #[test]
    fn embedded_newlines_cannot_break_framing() {
        let call = Call::Chat {
            nickname: "bob".into(),
            match_id: MatchId(1),
            body: "two\nlines\r\nhere".into(),
        };
        let frame = encode_call(&call);
        let lines = frame_lines(&frame);
        assert_eq!(lines.len(), 1 + Verb::Chat.arg_count());
        let decoded = parse_call(Verb::Chat, &lines[1..]).unwrap();
        match decoded {
            Call::Chat { body, .. } => assert!(!body.contains('\n')),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn wrong_arg_count_is_rejected() {
        let args = vec!["alice".to_string()];
        match parse_call(Verb::AddPlayer, &args) {
            Err(ProtocolError::ArgCount { expected, got, .. }) => {
                assert_eq!((expected, got), (2, 1));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn malformed_scalar_arguments_are_rejected() {
        let args = vec!["bob".to_string(), "not-a-number".to_string()];
        assert!(matches!(
            parse_call(Verb::Score, &args),
            Err(ProtocolError::InvalidArgument("match id"))
        ));

        let args = vec!["bob".to_string(), "7".to_string(), "purple".to_string()];
        assert!(matches!(
            parse_call(Verb::ChooseColor, &args),
            Err(ProtocolError::InvalidArgument("color"))
        ));
    }

    #[test]
    fn malformed_payload_lines_are_rejected() {
        let lines = vec!["maybe".to_string()];
        assert!(matches!(
            parse_payload(TypeTag::Boolean, &lines),
            Err(ProtocolError::BadPayload(_))
        ));

        let lines = vec!["[1,2,3]".to_string()];
        let env = parse_payload(TypeTag::Positions, &lines).unwrap();
        assert!(env.into_reply().is_err());

        assert!(matches!(
            parse_payload(TypeTag::Cards, &["not json".to_string()]),
            Err(ProtocolError::BadPayload(_))
        ));
    }
}

//! Response/notification type tags.
//!
//! `TypeTag` is a closed vocabulary: it must be extended, never
//! overloaded. Tags split into two disjoint sets fixed at design time:
//! **solicited** tags answer a pending call and are routed to that
//! call's reply queue; **push** tags arrive unasked and are handled
//! inline by the client. A decoder picks the payload shape from the
//! tag alone — payload content is never inspected to choose a variant.

use parlor_core::Call;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Boolean,
    Integer,
    Positions,
    Update,
    Colors,
    String,
    Names,
    Cards,
    Table,
    Controller,
    Turn,
    Chat,
    PrivateChat,
    Ping,
    Exit,
}

impl TypeTag {
    pub const ALL: [TypeTag; 15] = [
        TypeTag::Boolean,
        TypeTag::Integer,
        TypeTag::Positions,
        TypeTag::Update,
        TypeTag::Colors,
        TypeTag::String,
        TypeTag::Names,
        TypeTag::Cards,
        TypeTag::Table,
        TypeTag::Controller,
        TypeTag::Turn,
        TypeTag::Chat,
        TypeTag::PrivateChat,
        TypeTag::Ping,
        TypeTag::Exit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Boolean => "BOOLEAN",
            TypeTag::Integer => "INTEGER",
            TypeTag::Positions => "POSITIONS",
            TypeTag::Update => "UPDATE",
            TypeTag::Colors => "COLORS",
            TypeTag::String => "STRING",
            TypeTag::Names => "NAMES",
            TypeTag::Cards => "CARDS",
            TypeTag::Table => "TABLE",
            TypeTag::Controller => "CONTROLLER",
            TypeTag::Turn => "TURN",
            TypeTag::Chat => "CHAT",
            TypeTag::PrivateChat => "PRIVATE_CHAT",
            TypeTag::Ping => "PING",
            TypeTag::Exit => "EXIT",
        }
    }

    /// Parse a tag line. Returns `None` for anything outside the
    /// vocabulary; the reader logs and skips such lines.
    pub fn parse(s: &str) -> Option<TypeTag> {
        match s {
            "BOOLEAN" => Some(TypeTag::Boolean),
            "INTEGER" => Some(TypeTag::Integer),
            "POSITIONS" => Some(TypeTag::Positions),
            "UPDATE" => Some(TypeTag::Update),
            "COLORS" => Some(TypeTag::Colors),
            "STRING" => Some(TypeTag::String),
            "NAMES" => Some(TypeTag::Names),
            "CARDS" => Some(TypeTag::Cards),
            "TABLE" => Some(TypeTag::Table),
            "CONTROLLER" => Some(TypeTag::Controller),
            "TURN" => Some(TypeTag::Turn),
            "CHAT" => Some(TypeTag::Chat),
            "PRIVATE_CHAT" => Some(TypeTag::PrivateChat),
            "PING" => Some(TypeTag::Ping),
            "EXIT" => Some(TypeTag::Exit),
            _ => None,
        }
    }

    /// True for tags that arrive unsolicited and are handled inline
    /// by the client instead of being queued for a caller.
    pub fn is_push(&self) -> bool {
        matches!(
            self,
            TypeTag::Update
                | TypeTag::Turn
                | TypeTag::Chat
                | TypeTag::PrivateChat
                | TypeTag::Ping
                | TypeTag::Exit
        )
    }

    /// Number of payload lines following the tag line.
    pub fn payload_lines(&self) -> usize {
        match self {
            TypeTag::Ping => 0,
            _ => 1,
        }
    }

    /// The solicited tag a call blocks on, or `None` for void calls.
    ///
    /// This is the whole routing table of the client demultiplexer:
    /// one response shape per operation, fixed for the protocol's
    /// lifetime.
    pub fn for_call(call: &Call) -> Option<TypeTag> {
        match call {
            Call::CheckName { .. }
            | Call::AddPlayer { .. }
            | Call::ChooseColor { .. }
            | Call::Place { .. }
            | Call::CheckTurn { .. }
            | Call::IsLastRound { .. } => Some(TypeTag::Boolean),
            Call::AddMatch { .. } | Call::Score { .. } => Some(TypeTag::Integer),
            Call::ValidPositions { .. } => Some(TypeTag::Positions),
            Call::ViewColors { .. } => Some(TypeTag::Colors),
            Call::Winner { .. } => Some(TypeTag::String),
            Call::ViewNames { .. } => Some(TypeTag::Names),
            Call::DrawResource { .. }
            | Call::DrawGold { .. }
            | Call::DrawTable { .. }
            | Call::ViewHand { .. } => Some(TypeTag::Cards),
            Call::ViewTable { .. } => Some(TypeTag::Table),
            Call::ViewPhase { .. } => Some(TypeTag::Controller),
            Call::Chat { .. }
            | Call::Whisper { .. }
            | Call::CheatFullGold { .. }
            | Call::CheatPoints { .. }
            | Call::CheatLastRound { .. }
            | Call::ReceivePong { .. }
            | Call::RemoveClient { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_strings_round_trip() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::parse(tag.as_str()), Some(tag));
        }
        assert_eq!(TypeTag::parse("BOGUS"), None);
        assert_eq!(TypeTag::parse("boolean"), None);
    }

    #[test]
    fn push_and_solicited_sets_are_disjoint_and_total() {
        let pushes = TypeTag::ALL.iter().filter(|t| t.is_push()).count();
        assert_eq!(pushes, 6);
        assert!(TypeTag::Ping.is_push());
        assert!(!TypeTag::Boolean.is_push());
    }

    #[test]
    fn only_ping_has_no_payload_line() {
        for tag in TypeTag::ALL {
            let expected = if tag == TypeTag::Ping { 0 } else { 1 };
            assert_eq!(tag.payload_lines(), expected);
        }
    }
}

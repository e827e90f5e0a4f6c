//! Logical messages of the session facade.
//!
//! These are **transport-agnostic**:
//! - [`Call`]: one variant per operation a client may invoke.
//! - [`Reply`]: one variant per response shape, plus `None` for void
//!   operations.
//! - [`Notice`]: one variant per push the coordinator may send.
//!
//! Wire encoding lives in the `parlor-protocol` crate; this module is
//! purely logical. Every `Call` variant maps to exactly one `Reply`
//! shape for the lifetime of the protocol, which is what lets the
//! byte-stream client route responses by type alone.

use crate::card::{Card, CardFace};
use crate::chat::ChatMessage;
use crate::color::PawnColor;
use crate::error::SessionError;
use crate::ids::MatchId;
use crate::position::Position;
use crate::snapshot::{PhaseSnapshot, TableSnapshot};

/// A request into the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// Is this nickname already registered anywhere?
    CheckName { nickname: String },
    /// Create a match; the caller becomes first-to-join and holds the
    /// black pawn.
    AddMatch { nickname: String },
    /// Join an existing match.
    AddPlayer { nickname: String, match_id: MatchId },
    /// Which pawn colors are still unclaimed?
    ViewColors { match_id: MatchId },
    ChooseColor {
        nickname: String,
        match_id: MatchId,
        color: PawnColor,
    },
    /// Where may this player legally place a card right now?
    ValidPositions { nickname: String, match_id: MatchId },
    Place {
        nickname: String,
        match_id: MatchId,
        hand_index: usize,
        position: Position,
        face: CardFace,
    },
    DrawResource { nickname: String, match_id: MatchId },
    DrawGold { nickname: String, match_id: MatchId },
    /// Draw one of the four face-up table cards.
    DrawTable {
        nickname: String,
        match_id: MatchId,
        slot: usize,
    },
    ViewHand { nickname: String, match_id: MatchId },
    ViewTable { match_id: MatchId },
    ViewNames { match_id: MatchId },
    ViewPhase { match_id: MatchId },
    CheckTurn { nickname: String, match_id: MatchId },
    IsLastRound { match_id: MatchId },
    Score { nickname: String, match_id: MatchId },
    Winner { match_id: MatchId },
    Chat {
        nickname: String,
        match_id: MatchId,
        body: String,
    },
    Whisper {
        nickname: String,
        recipient: String,
        match_id: MatchId,
        body: String,
    },
    /// Debug: refill the player's hand with gold cards.
    CheatFullGold { nickname: String, match_id: MatchId },
    /// Debug: grant 20 points.
    CheatPoints { nickname: String, match_id: MatchId },
    /// Debug: force the last round.
    CheatLastRound { nickname: String, match_id: MatchId },
    /// Heartbeat acknowledgement; refreshes the caller's last-seen.
    ReceivePong { nickname: String },
    /// Graceful leave; aborts the caller's match for everyone.
    RemoveClient { nickname: String },
}

/// A response out of the coordinator.
///
/// `None` is the reply of void operations; it never crosses the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Bool(bool),
    Int(i64),
    Positions(Vec<Position>),
    Colors(Vec<PawnColor>),
    Str(String),
    Names(Vec<String>),
    Cards(Vec<Card>),
    Table(TableSnapshot),
    Phase(PhaseSnapshot),
    None,
}

impl Reply {
    pub fn shape_name(&self) -> &'static str {
        match self {
            Reply::Bool(_) => "boolean",
            Reply::Int(_) => "integer",
            Reply::Positions(_) => "positions",
            Reply::Colors(_) => "colors",
            Reply::Str(_) => "string",
            Reply::Names(_) => "names",
            Reply::Cards(_) => "cards",
            Reply::Table(_) => "table",
            Reply::Phase(_) => "phase",
            Reply::None => "void",
        }
    }

    pub fn into_bool(self) -> Result<bool, SessionError> {
        match self {
            Reply::Bool(b) => Ok(b),
            other => Err(mismatch("boolean", &other)),
        }
    }

    pub fn into_int(self) -> Result<i64, SessionError> {
        match self {
            Reply::Int(n) => Ok(n),
            other => Err(mismatch("integer", &other)),
        }
    }

    pub fn into_positions(self) -> Result<Vec<Position>, SessionError> {
        match self {
            Reply::Positions(p) => Ok(p),
            other => Err(mismatch("positions", &other)),
        }
    }

    pub fn into_colors(self) -> Result<Vec<PawnColor>, SessionError> {
        match self {
            Reply::Colors(c) => Ok(c),
            other => Err(mismatch("colors", &other)),
        }
    }

    pub fn into_str(self) -> Result<String, SessionError> {
        match self {
            Reply::Str(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }

    pub fn into_names(self) -> Result<Vec<String>, SessionError> {
        match self {
            Reply::Names(n) => Ok(n),
            other => Err(mismatch("names", &other)),
        }
    }

    pub fn into_cards(self) -> Result<Vec<Card>, SessionError> {
        match self {
            Reply::Cards(c) => Ok(c),
            other => Err(mismatch("cards", &other)),
        }
    }

    pub fn into_table(self) -> Result<TableSnapshot, SessionError> {
        match self {
            Reply::Table(t) => Ok(t),
            other => Err(mismatch("table", &other)),
        }
    }

    pub fn into_phase(self) -> Result<PhaseSnapshot, SessionError> {
        match self {
            Reply::Phase(p) => Ok(p),
            other => Err(mismatch("phase", &other)),
        }
    }

    pub fn into_void(self) -> Result<(), SessionError> {
        match self {
            Reply::None => Ok(()),
            other => Err(mismatch("void", &other)),
        }
    }
}

fn mismatch(expected: &str, got: &Reply) -> SessionError {
    SessionError::Protocol(format!(
        "expected {} reply, got {}",
        expected,
        got.shape_name()
    ))
}

/// A push from the coordinator to a client.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Match state changed; carries a human-readable event line.
    Update(String),
    /// The named player is now on turn.
    Turn(String),
    Chat(ChatMessage),
    PrivateChat(ChatMessage),
    /// Heartbeat probe; must be answered with `receive pong`.
    Ping,
    /// Forced shutdown with a human-readable reason.
    Exit(String),
}

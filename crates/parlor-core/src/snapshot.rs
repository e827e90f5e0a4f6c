//! Read-only snapshots handed to clients.
//!
//! These are the "domain object" payloads of the wire protocol: a full
//! view of the shared table and a compact view of match phase/turn
//! state. They are plain data; building them clones out of the match
//! state so clients never hold references into the coordinator.

use serde::{Deserialize, Serialize};

use crate::card::{Card, PlacedCard};
use crate::color::PawnColor;
use crate::ids::MatchId;

/// One seat as visible to everyone at the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatView {
    pub nickname: String,
    pub color: Option<PawnColor>,
    /// First-player marker; held by the seat that created the match.
    pub black_pawn: bool,
    pub score: i64,
    pub placed: Vec<PlacedCard>,
}

/// Snapshot of the shared table: face-up cards, deck sizes, and every
/// seat's visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub match_id: MatchId,
    pub face_up: Vec<Card>,
    pub resource_deck: usize,
    pub gold_deck: usize,
    pub seats: Vec<SeatView>,
}

impl TableSnapshot {
    /// Neutral snapshot for a match the coordinator does not know.
    pub fn empty(match_id: MatchId) -> Self {
        TableSnapshot {
            match_id,
            face_up: Vec::new(),
            resource_deck: 0,
            gold_deck: 0,
            seats: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    WaitingForPlayers,
    ChoosingColors,
    Playing,
    Ended,
}

/// Phase/turn state of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSnapshot {
    pub phase: MatchPhase,
    /// Nickname of the player on turn; `None` outside the playing phase.
    pub current_player: Option<String>,
    pub round: u32,
    pub last_round: bool,
}

impl PhaseSnapshot {
    /// Neutral snapshot for a match the coordinator does not know.
    pub fn empty() -> Self {
        PhaseSnapshot {
            phase: MatchPhase::Ended,
            current_player: None,
            round: 0,
            last_round: false,
        }
    }
}

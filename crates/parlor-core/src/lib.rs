//! parlor-core
//!
//! Pure session/match logic for the parlor coordinator:
//! - domain types (cards, positions, pawn colors, snapshots, chat)
//! - logical messages (calls, replies, notices)
//! - the transport-agnostic `SessionFacade` contract
//! - the `MatchCoordinator` collaborator trait and the in-memory
//!   `MatchBook` reference implementation

pub mod card;
pub mod chat;
pub mod color;
pub mod error;
pub mod facade;
pub mod ids;
pub mod match_book;
pub mod messages;
pub mod position;
pub mod snapshot;

pub use card::{Card, CardFace, CardKind, PlacedCard};
pub use chat::ChatMessage;
pub use color::PawnColor;
pub use error::{MatchError, SessionError};
pub use facade::{CallTransport, SessionFacade};
pub use ids::MatchId;
pub use match_book::{MatchBook, MatchCoordinator};
pub use messages::{Call, Notice, Reply};
pub use position::Position;
pub use snapshot::{MatchPhase, PhaseSnapshot, SeatView, TableSnapshot};

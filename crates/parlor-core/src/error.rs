//! Error types shared across the workspace.
//!
//! `SessionError` is the transport-level failure surface of the
//! `SessionFacade` contract: it never carries domain outcomes (an
//! illegal placement is a `false` reply, not an error). `MatchError` is
//! the domain-level failure surface of the `MatchCoordinator`
//! collaborator; the facade maps it to neutral replies before anything
//! reaches a transport.

use std::fmt;

use crate::color::PawnColor;
use crate::ids::MatchId;
use crate::position::Position;

/// Transport failure while invoking a facade operation.
#[derive(Debug)]
pub enum SessionError {
    /// The connection or coordinator is gone; no reply will ever arrive.
    Closed,
    /// The object-call transport's configured timeout elapsed.
    Timeout,
    /// The peer answered with something the contract does not allow here.
    Protocol(String),
    /// I/O failure on the underlying stream.
    Io(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Closed => write!(f, "session closed"),
            SessionError::Timeout => write!(f, "call timed out"),
            SessionError::Protocol(msg) => write!(f, "protocol violation: {}", msg),
            SessionError::Io(msg) => write!(f, "i/o failure: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

/// Domain-level rejection from the match coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    UnknownMatch(MatchId),
    UnknownPlayer(String),
    MatchFull,
    NicknameTaken(String),
    /// Operation not valid in the match's current phase.
    WrongPhase,
    NotYourTurn,
    /// Draw attempted before this turn's placement.
    MustPlaceFirst,
    /// Second placement attempted in one turn.
    AlreadyPlaced,
    AlreadyChosen,
    BadHandIndex(usize),
    BadPosition(Position),
    BadSlot(usize),
    EmptyDeck,
    ColorTaken(PawnColor),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::UnknownMatch(id) => write!(f, "unknown match {}", id),
            MatchError::UnknownPlayer(nick) => write!(f, "no player '{}' in this match", nick),
            MatchError::MatchFull => write!(f, "match is full"),
            MatchError::NicknameTaken(nick) => write!(f, "nickname '{}' is taken", nick),
            MatchError::WrongPhase => write!(f, "operation not allowed in this phase"),
            MatchError::NotYourTurn => write!(f, "not this player's turn"),
            MatchError::MustPlaceFirst => write!(f, "must place a card before drawing"),
            MatchError::AlreadyPlaced => write!(f, "already placed a card this turn"),
            MatchError::AlreadyChosen => write!(f, "pawn color already chosen"),
            MatchError::BadHandIndex(i) => write!(f, "hand index {} out of range", i),
            MatchError::BadPosition(p) => {
                write!(f, "position ({}, {}) not placeable", p.row, p.col)
            }
            MatchError::BadSlot(s) => write!(f, "table slot {} not drawable", s),
            MatchError::EmptyDeck => write!(f, "deck is empty"),
            MatchError::ColorTaken(c) => write!(f, "color {} not available", c),
        }
    }
}

impl std::error::Error for MatchError {}

//! Card representation.
//!
//! The coordinator never evaluates card effects; it only deals, moves,
//! and snapshots cards. Scoring uses the printed `points` value.

use serde::{Deserialize, Serialize};

use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Starter,
    Resource,
    Gold,
}

/// Which side a card is placed on. Back placements score zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFace {
    Front,
    Back,
}

impl CardFace {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardFace::Front => "front",
            CardFace::Back => "back",
        }
    }

    /// Parse the lowercase wire spelling.
    pub fn parse(s: &str) -> Option<CardFace> {
        match s {
            "front" => Some(CardFace::Front),
            "back" => Some(CardFace::Back),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique within a match's deck set.
    pub id: u32,
    pub kind: CardKind,
    pub points: u8,
}

/// A card laid down in a player's area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCard {
    pub card: Card,
    pub position: Position,
    pub face: CardFace,
}

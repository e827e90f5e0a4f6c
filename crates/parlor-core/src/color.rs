use std::fmt;

use serde::{Deserialize, Serialize};

/// Pawn color marking a seat at the table.
///
/// `Black` is the first-player marker; it is assigned to the match
/// creator and can never be claimed through `choose color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PawnColor {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
}

impl PawnColor {
    /// The colors a player may claim, in claim-menu order.
    pub const CLAIMABLE: [PawnColor; 4] = [
        PawnColor::Red,
        PawnColor::Blue,
        PawnColor::Green,
        PawnColor::Yellow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PawnColor::Red => "red",
            PawnColor::Blue => "blue",
            PawnColor::Green => "green",
            PawnColor::Yellow => "yellow",
            PawnColor::Black => "black",
        }
    }

    /// Parse the lowercase wire spelling. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<PawnColor> {
        match s {
            "red" => Some(PawnColor::Red),
            "blue" => Some(PawnColor::Blue),
            "green" => Some(PawnColor::Green),
            "yellow" => Some(PawnColor::Yellow),
            "black" => Some(PawnColor::Black),
            _ => None,
        }
    }
}

impl fmt::Display for PawnColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

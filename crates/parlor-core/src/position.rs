use serde::{Deserialize, Serialize};

/// Grid position in a player's play area.
///
/// The starter card sits at `(0, 0)`; rows and columns may go negative
/// as the area grows outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// The four diagonal neighbors, the only slots a new card may cover.
    pub fn corners(&self) -> [Position; 4] {
        [
            Position::new(self.row - 1, self.col - 1),
            Position::new(self.row - 1, self.col + 1),
            Position::new(self.row + 1, self.col - 1),
            Position::new(self.row + 1, self.col + 1),
        ]
    }
}

use serde::{Deserialize, Serialize};

use crate::{GameError, Result};

/// Player-visible state of a cell as stored by the engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Flagged,
    Revealed,
}

impl CellState {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

/// Read-only view of one cell, combining its visible state with what lies underneath.
///
/// This is also the per-cell layout of the saved session record, hence the camelCase names.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub neighbor_mines: u8,
}

impl Cell {
    /// Visible state of this cell, rejecting the revealed-and-flagged combination.
    pub fn state(&self) -> Result<CellState> {
        match (self.is_revealed, self.is_flagged) {
            (true, true) => Err(GameError::CorruptCell),
            (true, false) => Ok(CellState::Revealed),
            (false, true) => Ok(CellState::Flagged),
            (false, false) => Ok(CellState::Hidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revealed_and_flagged_is_rejected() {
        let cell = Cell {
            is_revealed: true,
            is_flagged: true,
            ..Default::default()
        };
        assert_eq!(cell.state(), Err(GameError::CorruptCell));
    }

    #[test]
    fn serializes_with_session_field_names() {
        let cell = Cell {
            is_mine: true,
            neighbor_mines: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(cell).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isMine": true,
                "isRevealed": false,
                "isFlagged": false,
                "neighborMines": 3,
            })
        );
    }
}

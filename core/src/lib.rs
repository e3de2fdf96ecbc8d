use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use profile::*;
pub use session::*;
pub use stats::*;
pub use storage::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod profile;
mod session;
mod stats;
mod storage;
mod tile;
mod types;

/// Cells around the first reveal that never receive a mine: the clicked cell and its 8 neighbors.
pub const SAFE_ZONE_CELLS: CellCount = 9;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub(crate) const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Builds a config, clamping the mine count so a full safe zone always fits.
    pub fn new((rows, cols): Coord2, mines: CellCount) -> Self {
        let size = (rows.max(1), cols.max(1));
        let capacity = Self::mine_capacity(size);
        if mines > capacity {
            log::warn!(
                "Too many mines for a {}x{} board, requested {} but only fits {}",
                size.0,
                size.1,
                mines,
                capacity
            );
        }
        Self::new_unchecked(size, mines.min(capacity))
    }

    /// Largest mine count that leaves room for the first-click safe zone.
    pub const fn mine_capacity((rows, cols): Coord2) -> CellCount {
        mult(rows, cols).saturating_sub(SAFE_ZONE_CELLS)
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

/// Mine positions of a board together with the adjacent-mine count of every cell.
#[derive(Clone, Debug, PartialEq)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    adjacent: Array2<u8>,
    size: Coord2,
    mine_count: CellCount,
}

impl MineLayout {
    /// A layout of the given size without any mines.
    pub fn empty(size: Coord2) -> Self {
        Self {
            mine_mask: Array2::default(size.to_nd_index()),
            adjacent: Array2::zeros(size.to_nd_index()),
            size,
            mine_count: 0,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut layout = Self::empty(size);

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            layout.place_mine(coords);
        }

        Ok(layout)
    }

    /// Puts a mine at `coords` and bumps the counts around it. Returns `false` if one was
    /// already there.
    pub(crate) fn place_mine(&mut self, coords: Coord2) -> bool {
        let slot = &mut self.mine_mask[coords.to_nd_index()];
        if *slot {
            return false;
        }
        *slot = true;
        self.mine_count += 1;

        for pos in neighbors(coords, self.size) {
            self.adjacent[pos.to_nd_index()] += 1;
        }
        true
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size, self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.adjacent[coords.to_nd_index()]
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        neighbors(coords, self.size)
    }

    /// Coordinates of every mine, row by row.
    pub fn mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

/// Result of a reveal request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Out of range, already revealed, flagged, or the game is over. Nothing changed.
    Invalid,
    Continue,
    GameOver,
    Win,
}

impl RevealOutcome {
    /// The game ended with this reveal.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Win)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_wins_and_losses_are_terminal() {
        assert!(RevealOutcome::Win.is_terminal());
        assert!(RevealOutcome::GameOver.is_terminal());
        assert!(!RevealOutcome::Continue.is_terminal());
        assert!(!RevealOutcome::Invalid.is_terminal());
    }

    #[test]
    fn config_clamps_mines_to_leave_safe_zone() {
        let config = GameConfig::new((5, 5), 100);
        assert_eq!(config.mines, 16);
        assert_eq!(config.safe_cells(), 9);
    }

    #[test]
    fn config_on_tiny_board_has_no_mines() {
        let config = GameConfig::new((2, 3), 4);
        assert_eq!(config.mines, 0);
        assert_eq!(GameConfig::new((0, 0), 1).size, (1, 1));
    }

    #[test]
    fn layout_counts_adjacent_mines() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (0, 2), (0, 2)]).unwrap();

        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.adjacent_mine_count((1, 1)), 2);
        assert_eq!(layout.adjacent_mine_count((0, 1)), 2);
        assert_eq!(layout.adjacent_mine_count((2, 2)), 0);
        assert_eq!(layout.adjacent_mine_count((1, 0)), 1);
        assert_eq!(layout.mines().collect::<Vec<_>>(), vec![(0, 0), (0, 2)]);
    }

    #[test]
    fn layout_rejects_out_of_bounds_mine() {
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }
}

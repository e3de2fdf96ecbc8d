use crate::*;
pub use random::*;

mod random;

pub trait MinefieldGenerator {
    /// Lays out `config.mines` mines, keeping the block around `first_click` clear.
    fn generate(self, config: GameConfig, first_click: Coord2) -> MineLayout;
}

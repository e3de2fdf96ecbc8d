use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// The timer stops counting here, like the three-digit counter of the classic game.
pub const MAX_ELAPSED_SECS: u32 = 999;

/// Valid transitions:
/// - Fresh -> Active (first reveal places the mines)
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Board allocated, mines not placed yet
    #[default]
    Fresh,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }

    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Mines are either still to be placed (with the seed that will place them) or fixed for the
/// rest of the game.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Minefield {
    Pending { seed: u64 },
    Placed(MineLayout),
}

/// One game from the first click to the end.
#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    config: GameConfig,
    minefield: Minefield,
    board: Array2<CellState>,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    state: EngineState,
    elapsed_secs: u32,
    paused: bool,
    triggered_mine: Option<Coord2>,
}

impl Game {
    /// New game in the fresh state. Mines are placed from `seed` on the first reveal.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let config = GameConfig::new(config.size, config.mines);
        Self::from_parts(
            config,
            Minefield::Pending { seed },
            Array2::default(config.size.to_nd_index()),
            0,
        )
    }

    pub fn with_random_seed(config: GameConfig) -> Self {
        Self::new(config, rand::random())
    }

    /// Starts directly in the active state on a known layout.
    pub fn with_layout(mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        Self::from_parts(
            mine_layout.game_config(),
            Minefield::Placed(mine_layout),
            Array2::default(size.to_nd_index()),
            0,
        )
    }

    /// Rebuilds a game from stored pieces, deriving counters and state from the board.
    pub(crate) fn from_parts(
        config: GameConfig,
        minefield: Minefield,
        board: Array2<CellState>,
        elapsed_secs: u32,
    ) -> Self {
        let mut game = Self {
            config,
            minefield,
            board,
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            state: EngineState::Fresh,
            elapsed_secs: elapsed_secs.min(MAX_ELAPSED_SECS),
            paused: false,
            triggered_mine: None,
        };

        for (index, &cell) in game.board.indexed_iter() {
            let coords = (index.0 as Coord, index.1 as Coord);
            match cell {
                CellState::Flagged => game.flagged_count += 1,
                CellState::Revealed if !game.has_mine_at(coords) => game.revealed_count += 1,
                CellState::Revealed | CellState::Hidden => {}
            }
        }

        game.state = match &game.minefield {
            Minefield::Pending { .. } => EngineState::Fresh,
            Minefield::Placed(layout) => {
                let exploded = layout
                    .mines()
                    .any(|pos| game.board[pos.to_nd_index()].is_revealed());
                if exploded {
                    EngineState::Lost
                } else if game.revealed_count.0 == layout.safe_cell_count() {
                    EngineState::Won
                } else {
                    EngineState::Active
                }
            }
        };
        game
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_first_click_done(&self) -> bool {
        matches!(self.minefield, Minefield::Placed(_))
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::classify(self.config)
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn flag_count(&self) -> CellCount {
        self.flagged_count.0
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    /// How many mines have not been flagged yet, negative when over-flagged
    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flagged_count.0)
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        match &self.minefield {
            Minefield::Placed(layout) => in_bounds(coords, layout.size()) && layout[coords],
            Minefield::Pending { .. } => false,
        }
    }

    pub fn cell_state(&self, coords: Coord2) -> Option<CellState> {
        in_bounds(coords, self.size()).then(|| self.board[coords.to_nd_index()])
    }

    pub fn cell(&self, coords: Coord2) -> Option<Cell> {
        let state = self.cell_state(coords)?;
        let (is_mine, neighbor_mines) = match &self.minefield {
            Minefield::Placed(layout) => (layout[coords], layout.adjacent_mine_count(coords)),
            Minefield::Pending { .. } => (false, 0),
        };
        Some(Cell {
            is_mine,
            is_revealed: state.is_revealed(),
            is_flagged: state.is_flagged(),
            neighbor_mines,
        })
    }

    /// Read-only copy of the whole board, indexed `[row, col]`.
    pub fn board(&self) -> Array2<Cell> {
        Array2::from_shape_fn(self.size().to_nd_index(), |(row, col)| {
            self.cell((row as Coord, col as Coord)).unwrap_or_default()
        })
    }

    /// Opens a cell. The first reveal of a game places the mines around it.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if self.state.is_finished() || self.cell_state(coords) != Some(CellState::Hidden) {
            log::trace!("Ignoring reveal at {:?} in state {:?}", coords, self.state);
            return RevealOutcome::Invalid;
        }

        if let Minefield::Pending { seed } = self.minefield {
            self.place_mines(seed, coords);
        }
        let Minefield::Placed(layout) = &self.minefield else {
            return RevealOutcome::Invalid;
        };

        if layout.contains_mine(coords) {
            for mine in layout.mines() {
                let cell = &mut self.board[mine.to_nd_index()];
                if cell.is_hidden() {
                    *cell = CellState::Revealed;
                }
            }
            self.triggered_mine = Some(coords);
            self.finish(EngineState::Lost);
            return RevealOutcome::GameOver;
        }

        let opened = flood_reveal(layout, &mut self.board, coords);
        let safe_cells = layout.safe_cell_count();
        self.revealed_count += opened;
        log::debug!("Reveal at {:?} opened {} cells", coords, opened);

        if self.revealed_count.0 == safe_cells {
            self.finish(EngineState::Won);
            RevealOutcome::Win
        } else {
            RevealOutcome::Continue
        }
    }

    /// Flags or unflags a hidden cell and returns the current flag count.
    pub fn toggle_flag(&mut self, coords: Coord2) -> CellCount {
        if self.state.is_finished() || !in_bounds(coords, self.size()) {
            return self.flagged_count.0;
        }

        let cell = &mut self.board[coords.to_nd_index()];
        match *cell {
            CellState::Hidden => {
                *cell = CellState::Flagged;
                self.flagged_count += 1;
            }
            CellState::Flagged => {
                *cell = CellState::Hidden;
                self.flagged_count -= 1;
            }
            CellState::Revealed => {}
        }
        self.flagged_count.0
    }

    /// Throws the board away and starts over with new dimensions.
    pub fn resize(&mut self, config: GameConfig) {
        log::debug!("Resizing board to {:?}", config);
        *self = Self::with_random_seed(config);
    }

    /// Throws the board away and starts over with the same dimensions.
    pub fn reset(&mut self) {
        self.resize(self.config);
    }

    /// One second of play time. Counts only while active and not paused.
    pub fn tick(&mut self) -> u32 {
        if self.state.is_active() && !self.paused && self.elapsed_secs < MAX_ELAPSED_SECS {
            self.elapsed_secs += 1;
        }
        self.elapsed_secs
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(crate) fn minefield(&self) -> &Minefield {
        &self.minefield
    }

    fn place_mines(&mut self, seed: u64, first_click: Coord2) {
        let layout = RandomMinefieldGenerator::new(seed).generate(self.config, first_click);
        self.config = layout.game_config();
        self.minefield = Minefield::Placed(layout);
        self.state = EngineState::Active;
        log::debug!("Game started at {:?}", first_click);
    }

    fn finish(&mut self, state: EngineState) {
        debug_assert!(state.is_finished());
        if self.state.is_finished() {
            return;
        }
        self.state = state;
        log::debug!("Game ended {:?} after {}s", state, self.elapsed_secs);
    }
}

/// Opens `start` and, through zero cells, everything connected to it. Returns how many cells
/// were opened.
fn flood_reveal(layout: &MineLayout, board: &mut Array2<CellState>, start: Coord2) -> CellCount {
    let mut opened = 0;
    let mut to_visit = vec![start];

    while let Some(coords) = to_visit.pop() {
        let cell = &mut board[coords.to_nd_index()];
        // skip flagged or already opened cells
        if !cell.is_hidden() {
            continue;
        }
        *cell = CellState::Revealed;
        opened += 1;

        let adjacent_mines = layout.adjacent_mine_count(coords);
        log::trace!("Opened {:?}, adjacent mines: {}", coords, adjacent_mines);
        if adjacent_mines == 0 {
            to_visit.extend(
                layout
                    .iter_neighbors(coords)
                    .filter(|&pos| board[pos.to_nd_index()].is_hidden()),
            );
        }
    }
    opened
}

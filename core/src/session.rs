use core::time::Duration;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

pub const SESSION_FORMAT_VERSION: u32 = 1;

/// How often a host should save an active game.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);

fn current_version() -> u32 {
    SESSION_FORMAT_VERSION
}

/// Saved state of an unfinished game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default = "current_version")]
    pub version: u32,
    pub rows: Coord,
    pub cols: Coord,
    pub mine_count: CellCount,
    pub board: Vec<Vec<Cell>>,
    pub revealed: CellCount,
    pub game_over: bool,
    pub flag_count: CellCount,
    /// `true` while the mines are still unplaced
    pub first_click: bool,
    pub timer: u32,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl StorageKey for SessionSnapshot {
    const KEY: &'static str = "sweeper:session";
}

impl SessionSnapshot {
    pub fn capture(game: &Game) -> Self {
        let (rows, cols) = game.size();
        let board = game
            .board()
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();

        Self {
            version: SESSION_FORMAT_VERSION,
            rows,
            cols,
            mine_count: game.mine_count(),
            board,
            revealed: game.revealed_count(),
            game_over: game.is_finished(),
            flag_count: game.flag_count(),
            first_click: !game.is_first_click_done(),
            timer: game.elapsed_secs(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl Game {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    /// Restores a saved game. Counters and state are derived from the cells, the stored
    /// counters are only cross-checked.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Result<Self> {
        if snapshot.version > SESSION_FORMAT_VERSION {
            return Err(GameError::UnsupportedVersion(snapshot.version));
        }

        let size = (snapshot.rows, snapshot.cols);
        if size.0 == 0
            || size.1 == 0
            || snapshot.board.len() != usize::from(size.0)
            || snapshot.board.iter().any(|row| row.len() != usize::from(size.1))
        {
            return Err(GameError::InvalidBoardShape);
        }

        let mut states: Array2<CellState> = Array2::default(size.to_nd_index());
        let mut layout = MineLayout::empty(size);
        for (row, cells) in snapshot.board.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let coords = (row as Coord, col as Coord);
                states[coords.to_nd_index()] = cell.state()?;
                if cell.is_mine {
                    layout.place_mine(coords);
                }
            }
        }

        let (config, minefield) = if snapshot.first_click {
            if states.iter().any(|state| state.is_revealed()) {
                return Err(GameError::CorruptCell);
            }
            let config = GameConfig::new(size, snapshot.mine_count);
            (config, Minefield::Pending { seed: rand::random() })
        } else {
            // the safe zone only constrains random placement, a fixed layout needs one safe cell
            if layout.mine_count() >= layout.total_cells() {
                return Err(GameError::TooManyMines);
            }
            (layout.game_config(), Minefield::Placed(layout))
        };

        let game = Game::from_parts(config, minefield, states, snapshot.timer);

        if game.mine_count() != snapshot.mine_count
            || game.revealed_count() != snapshot.revealed
            || game.flag_count() != snapshot.flag_count
            || game.is_finished() != snapshot.game_over
        {
            log::warn!(
                "Saved counters disagree with the saved board, using the board: \
                 mines {} vs {}, revealed {} vs {}, flags {} vs {}, over {} vs {}",
                snapshot.mine_count,
                game.mine_count(),
                snapshot.revealed,
                game.revealed_count(),
                snapshot.flag_count,
                game.flag_count(),
                snapshot.game_over,
                game.is_finished(),
            );
        }
        Ok(game)
    }
}

/// Saves, restores and discards the unfinished game.
#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Saves `game` if it is in progress. Failures are logged, never returned.
    pub fn save(&mut self, game: &Game) -> bool {
        if !game.state().is_active() {
            log::trace!("Not saving game in state {:?}", game.state());
            return false;
        }

        match self.store.save_record(&game.snapshot()) {
            Ok(()) => {
                log::debug!("Saved game session");
                true
            }
            Err(err) => {
                log::error!("Could not save game session: {}", err);
                false
            }
        }
    }

    /// The saved game, if there is a usable one.
    pub fn load(&self) -> Option<Game> {
        let snapshot = match self.store.load_record::<SessionSnapshot>() {
            Ok(snapshot) => snapshot?,
            Err(err) => {
                log::warn!("Could not read saved game session: {}", err);
                return None;
            }
        };

        match Game::from_snapshot(snapshot) {
            Ok(game) => Some(game),
            Err(err) => {
                log::warn!("Discarding unusable saved game session: {}", err);
                None
            }
        }
    }

    /// Loads the saved game and removes it from storage, usable or not.
    pub fn take(&mut self) -> Option<Game> {
        let game = self.load();
        self.clear();
        game
    }

    pub fn has_saved(&self) -> bool {
        matches!(self.store.get(SessionSnapshot::KEY), Ok(Some(_)))
    }

    pub fn clear(&mut self) {
        if let Err(err) = self.store.clear_record::<SessionSnapshot>() {
            log::error!("Could not clear saved game session: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_game() -> Game {
        let layout =
            MineLayout::from_mine_coords((4, 5), &[(0, 3), (1, 3), (2, 3), (3, 3)]).unwrap();
        let mut game = Game::with_layout(layout);
        game.reveal((0, 0));
        game.toggle_flag((3, 4));
        game.tick();
        game.tick();
        game
    }

    #[test]
    fn snapshot_restores_the_same_game() {
        let game = active_game();

        let restored = Game::from_snapshot(game.snapshot()).unwrap();

        assert_eq!(restored.state(), EngineState::Active);
        assert_eq!(restored.board(), game.board());
        assert_eq!(restored.revealed_count(), 12);
        assert_eq!(restored.flag_count(), 1);
        assert_eq!(restored.elapsed_secs(), 2);
        assert_eq!(restored.mine_count(), 4);
    }

    #[test]
    fn snapshot_json_uses_session_field_names() {
        let json = serde_json::to_value(active_game().snapshot()).unwrap();

        for field in [
            "version",
            "rows",
            "cols",
            "mineCount",
            "board",
            "revealed",
            "gameOver",
            "flagCount",
            "firstClick",
            "timer",
            "timestamp",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["board"].as_array().unwrap().len(), 4);
        assert_eq!(json["board"][0].as_array().unwrap().len(), 5);
        assert_eq!(json["board"][0][3]["isMine"], true);
    }

    #[test]
    fn fresh_snapshot_restores_without_mines() {
        let mut game = Game::new(GameConfig::new((9, 9), 10), 4);
        game.toggle_flag((0, 0));

        let restored = Game::from_snapshot(game.snapshot()).unwrap();

        assert_eq!(restored.state(), EngineState::Fresh);
        assert_eq!(restored.mine_count(), 10);
        assert_eq!(restored.flag_count(), 1);
        assert!(!restored.is_first_click_done());
    }

    #[test]
    fn stored_counters_are_recomputed() {
        let mut snapshot = active_game().snapshot();
        snapshot.revealed = 1;
        snapshot.flag_count = 9;

        let restored = Game::from_snapshot(snapshot).unwrap();

        assert_eq!(restored.revealed_count(), 12);
        assert_eq!(restored.flag_count(), 1);
    }

    #[test]
    fn broken_snapshots_are_rejected() {
        let mut snapshot = active_game().snapshot();
        snapshot.board.pop();
        assert_eq!(
            Game::from_snapshot(snapshot),
            Err(GameError::InvalidBoardShape)
        );

        let mut snapshot = active_game().snapshot();
        snapshot.board[0][0].is_flagged = true;
        assert_eq!(Game::from_snapshot(snapshot), Err(GameError::CorruptCell));

        let mut snapshot = active_game().snapshot();
        snapshot.version = SESSION_FORMAT_VERSION + 1;
        assert_eq!(
            Game::from_snapshot(snapshot),
            Err(GameError::UnsupportedVersion(SESSION_FORMAT_VERSION + 1))
        );
    }

    #[test]
    fn finished_snapshot_restores_terminal_state() {
        let mut game = active_game();
        game.reveal((0, 3));
        let restored = Game::from_snapshot(game.snapshot()).unwrap();
        assert_eq!(restored.state(), EngineState::Lost);
    }

    #[test]
    fn won_snapshot_restores_as_won() {
        let layout = MineLayout::from_mine_coords((1, 2), &[(0, 0)]).unwrap();
        let mut game = Game::with_layout(layout);
        assert_eq!(game.reveal((0, 1)), RevealOutcome::Win);

        let snapshot = game.snapshot();
        assert!(snapshot.game_over);
        let restored = Game::from_snapshot(snapshot).unwrap();

        assert_eq!(restored.state(), EngineState::Won);
        assert_eq!(restored.revealed_count(), 1);
        assert_eq!(restored.triggered_mine(), None);
    }

    #[test]
    fn densely_mined_layout_survives_save_and_load() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();
        let mut game = Game::with_layout(layout);
        game.reveal((0, 2));
        let mut sessions = SessionStore::new(MemoryStore::new());

        assert!(sessions.save(&game));
        let restored = sessions.load().unwrap();

        assert_eq!(restored.state(), EngineState::Active);
        assert_eq!(restored.mine_count(), 2);
        assert_eq!(restored.revealed_count(), game.revealed_count());
        assert_eq!(restored.board(), game.board());
    }

    #[test]
    fn all_mine_board_is_rejected() {
        let mut snapshot = active_game().snapshot();
        for cell in snapshot.board.iter_mut().flatten() {
            cell.is_mine = true;
            cell.is_revealed = false;
            cell.is_flagged = false;
        }
        assert_eq!(Game::from_snapshot(snapshot), Err(GameError::TooManyMines));
    }

    #[test]
    fn store_saves_only_active_games() {
        let mut sessions = SessionStore::new(MemoryStore::new());

        assert!(!sessions.save(&Game::new(GameConfig::new((9, 9), 10), 0)));
        assert!(!sessions.has_saved());

        assert!(sessions.save(&active_game()));
        assert!(sessions.has_saved());

        let mut lost = active_game();
        lost.reveal((0, 3));
        assert!(!sessions.save(&lost));
    }

    #[test]
    fn take_loads_then_discards() {
        let mut sessions = SessionStore::new(MemoryStore::new());
        sessions.save(&active_game());

        let game = sessions.take().unwrap();

        assert_eq!(game.revealed_count(), 12);
        assert!(!sessions.has_saved());
        assert_eq!(sessions.take(), None);
    }

    #[test]
    fn corrupt_saves_mean_no_saved_game() {
        let mut store = MemoryStore::new();
        store.set(SessionSnapshot::KEY, "[1, 2, 3]").unwrap();
        let mut sessions = SessionStore::new(store);

        assert!(sessions.has_saved());
        assert_eq!(sessions.take(), None);
        assert!(!sessions.has_saved());
    }

    #[test]
    fn legacy_unversioned_session_is_accepted() {
        let mut value = serde_json::to_value(active_game().snapshot()).unwrap();
        value.as_object_mut().unwrap().remove("version");
        let mut store = MemoryStore::new();
        store.set(SessionSnapshot::KEY, &value.to_string()).unwrap();

        let game = SessionStore::new(store).load().unwrap();
        assert_eq!(game.state(), EngineState::Active);
    }
}

use core::fmt;
use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rows allowed for a custom board.
pub const CUSTOM_ROWS: RangeInclusive<Coord> = 5..=24;

/// Columns allowed for a custom board.
pub const CUSTOM_COLS: RangeInclusive<Coord> = 5..=30;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
    Custom,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Expert,
        Difficulty::Custom,
    ];

    /// Looks up a level by name, case-insensitive. Unknown names mean beginner.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                log::warn!("Unknown difficulty {:?}, falling back to beginner", name);
                Self::Beginner
            })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
            Self::Custom => "custom",
        }
    }

    /// Board of a fixed level, `None` for custom.
    pub const fn preset_config(self) -> Option<GameConfig> {
        match self {
            Self::Beginner => Some(GameConfig::new_unchecked((9, 9), 10)),
            Self::Intermediate => Some(GameConfig::new_unchecked((16, 16), 40)),
            Self::Expert => Some(GameConfig::new_unchecked((16, 30), 99)),
            Self::Custom => None,
        }
    }

    /// The level a board belongs to: exact preset matches, everything else is custom.
    pub fn classify(config: GameConfig) -> Self {
        Self::ALL
            .into_iter()
            .find(|level| level.preset_config() == Some(config))
            .unwrap_or(Self::Custom)
    }

    pub const fn tracks_best_time(self) -> bool {
        !matches!(self, Self::Custom)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub difficulty: Difficulty,
    pub config: GameConfig,
}

impl DifficultyProfile {
    pub const DEFAULT_CUSTOM: (u32, u32, u32) = (9, 9, 10);

    /// Profile of a level. Custom gets the default custom board.
    pub fn preset(difficulty: Difficulty) -> Self {
        match difficulty.preset_config() {
            Some(config) => Self { difficulty, config },
            None => {
                let (rows, cols, mines) = Self::DEFAULT_CUSTOM;
                Self::custom(rows, cols, mines)
            }
        }
    }

    pub fn named(name: &str) -> Self {
        Self::preset(Difficulty::from_name(name))
    }

    /// Custom board, with every value clamped into its allowed range and mines capped at a
    /// third of the cells.
    pub fn custom(rows: u32, cols: u32, mines: u32) -> Self {
        let rows = clamp_axis(rows, &CUSTOM_ROWS);
        let cols = clamp_axis(cols, &CUSTOM_COLS);
        let max_mines = mult(rows, cols) / 3;
        let clamped_mines = mines.clamp(1, max_mines.into());
        if clamped_mines != mines {
            log::warn!(
                "Custom mine count {} out of range for {}x{}, using {}",
                mines,
                rows,
                cols,
                clamped_mines
            );
        }
        // at most 24 * 30 / 3, fits
        let mines = clamped_mines as CellCount;

        Self {
            difficulty: Difficulty::Custom,
            config: GameConfig::new((rows, cols), mines),
        }
    }

    pub const fn rows(&self) -> Coord {
        self.config.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.config.size.1
    }

    pub const fn mines(&self) -> CellCount {
        self.config.mines
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::preset(Difficulty::Beginner)
    }
}

fn clamp_axis(value: u32, range: &RangeInclusive<Coord>) -> Coord {
    let clamped = value.clamp((*range.start()).into(), (*range.end()).into());
    // within a Coord range after clamping
    clamped as Coord
}

//! # Configuration
//!
//! Settings resolve in layers: defaults → config file → CLI flags.
//!
//! The config file lives at `<config dir>/sweeper/config.toml` and is optional. Every key
//! is optional too:
//!
//! ```toml
//! difficulty = "expert"
//! data_dir = "/home/me/.local/share/sweeper"
//! # any of these switches to a custom board
//! rows = 12
//! cols = 20
//! mines = 40
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sweeper_core::{Difficulty, DifficultyProfile};

const APP_DIR: &str = "sweeper";

#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub difficulty: Option<String>,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub mines: Option<u32>,
    pub data_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Reads the config file. A missing file is an empty config, a broken one is reported and
    /// ignored.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    warn!("Ignoring malformed config {}: {}", path.display(), err);
                    Self::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("Could not read config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }
}

/// Values given on the command line, each overriding the config file.
#[derive(clap::Args, Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    /// beginner, intermediate, expert or custom
    #[arg(short, long)]
    pub difficulty: Option<String>,
    /// Rows of a custom board (5-24)
    #[arg(long)]
    pub rows: Option<u32>,
    /// Columns of a custom board (5-30)
    #[arg(long)]
    pub cols: Option<u32>,
    /// Mines on a custom board (at most a third of the cells)
    #[arg(long)]
    pub mines: Option<u32>,
    /// Where the saved game and the statistics are kept
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub profile: DifficultyProfile,
    pub data_dir: PathBuf,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> anyhow::Result<Self> {
        let rows = overrides.rows.or(file.rows);
        let cols = overrides.cols.or(file.cols);
        let mines = overrides.mines.or(file.mines);
        let difficulty = overrides
            .difficulty
            .or(file.difficulty)
            .map(|name| Difficulty::from_name(&name));

        let wants_custom = rows.is_some() || cols.is_some() || mines.is_some();
        let profile = match difficulty {
            Some(Difficulty::Custom) => custom_profile(rows, cols, mines),
            None if wants_custom => custom_profile(rows, cols, mines),
            Some(level) => {
                if wants_custom {
                    warn!("Ignoring custom board size for {} difficulty", level);
                }
                DifficultyProfile::preset(level)
            }
            None => DifficultyProfile::default(),
        };

        let data_dir = match overrides.data_dir.or(file.data_dir) {
            Some(dir) => dir,
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| anyhow!("no data directory, pass --data-dir"))?,
        };

        Ok(Self { profile, data_dir })
    }

    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> anyhow::Result<Self> {
        let file = match config_path {
            Some(path) => FileConfig::load(path),
            None => FileConfig::default_path()
                .map(|path| FileConfig::load(&path))
                .unwrap_or_default(),
        };
        Self::resolve(file, overrides).context("resolving settings")
    }
}

fn custom_profile(rows: Option<u32>, cols: Option<u32>, mines: Option<u32>) -> DifficultyProfile {
    let (default_rows, default_cols, default_mines) = DifficultyProfile::DEFAULT_CUSTOM;
    DifficultyProfile::custom(
        rows.unwrap_or(default_rows),
        cols.unwrap_or(default_cols),
        mines.unwrap_or(default_mines),
    )
}

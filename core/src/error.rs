use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Cell is both revealed and flagged")]
    CorruptCell,
    #[error("Unsupported format version {0}")]
    UnsupportedVersion(u32),
}

pub type Result<T, E = GameError> = core::result::Result<T, E>;

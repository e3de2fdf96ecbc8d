use std::str::FromStr;

use sweeper_core::{Coord, Coord2, DifficultyProfile};
use thiserror::Error;

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    NewGame,
    Difficulty(DifficultyProfile),
    Pause,
    Stats,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}, try 'h'")]
    Unknown(String),
    #[error("expected ROW COL")]
    MissingCoords,
    #[error("{0:?} is not a valid number")]
    BadNumber(String),
    #[error("expected a difficulty name or ROWS COLS MINES")]
    BadDifficulty,
}

pub const HELP: &str = "\
commands:
  r ROW COL          reveal a cell
  f ROW COL          flag or unflag a cell
  n                  new game
  d NAME             beginner, intermediate, expert or custom
  d ROWS COLS MINES  custom board
  p                  pause or resume the timer
  s                  statistics
  h                  this help
  q                  save and quit";

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(ParseCommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        match verb.to_ascii_lowercase().as_str() {
            "r" | "reveal" => parse_coords(&args).map(Command::Reveal),
            "f" | "flag" => parse_coords(&args).map(Command::Flag),
            "n" | "new" => Ok(Command::NewGame),
            "d" | "difficulty" => parse_difficulty(&args).map(Command::Difficulty),
            "p" | "pause" => Ok(Command::Pause),
            "s" | "stats" => Ok(Command::Stats),
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            _ => Err(ParseCommandError::Unknown(verb.to_owned())),
        }
    }
}

fn parse_number<T: FromStr>(word: &str) -> Result<T, ParseCommandError> {
    word.parse()
        .map_err(|_| ParseCommandError::BadNumber(word.to_owned()))
}

fn parse_coords(args: &[&str]) -> Result<Coord2, ParseCommandError> {
    match args {
        [row, col] => Ok((parse_number::<Coord>(row)?, parse_number::<Coord>(col)?)),
        _ => Err(ParseCommandError::MissingCoords),
    }
}

fn parse_difficulty(args: &[&str]) -> Result<DifficultyProfile, ParseCommandError> {
    match args {
        [name] => Ok(DifficultyProfile::named(name)),
        [rows, cols, mines] => Ok(DifficultyProfile::custom(
            parse_number(rows)?,
            parse_number(cols)?,
            parse_number(mines)?,
        )),
        _ => Err(ParseCommandError::BadDifficulty),
    }
}

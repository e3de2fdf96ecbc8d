use std::fmt::Write;

use sweeper_core::{Cell, Coord, Difficulty, EngineState, Game, Statistics};

fn cell_glyph(cell: Cell, exploded: bool) -> char {
    match cell {
        Cell { is_flagged: true, .. } => 'F',
        Cell { is_revealed: false, .. } => '.',
        Cell { is_mine: true, .. } if exploded => 'X',
        Cell { is_mine: true, .. } => '*',
        Cell { neighbor_mines: 0, .. } => ' ',
        Cell { neighbor_mines, .. } => char::from(b'0' + neighbor_mines),
    }
}

fn status_face(state: EngineState, paused: bool) -> &'static str {
    match state {
        EngineState::Won => "won",
        EngineState::Lost => "lost",
        EngineState::Active if paused => "paused",
        EngineState::Active => "playing",
        EngineState::Fresh => "ready",
    }
}

/// The board with row/column indices, followed by the counters.
pub fn board(game: &Game) -> String {
    let mut out = String::new();
    let (_, cols) = game.size();
    let cells = game.board();

    out.push_str("    ");
    for col in 0..cols {
        let _ = write!(out, "{:>3}", col);
    }
    out.push('\n');

    for (row, cells) in cells.outer_iter().enumerate() {
        let _ = write!(out, "{:>3} ", row);
        for (col, &cell) in cells.iter().enumerate() {
            let exploded = game.triggered_mine() == Some((row as Coord, col as Coord));
            let _ = write!(out, "{:>3}", cell_glyph(cell, exploded));
        }
        out.push('\n');
    }

    let _ = write!(
        out,
        "mines {:>3}  time {:>3}  {} ({})",
        game.mines_left(),
        game.elapsed_secs(),
        status_face(game.state(), game.is_paused()),
        game.difficulty(),
    );
    out
}

/// Played, won, win rate and best time per difficulty.
pub fn statistics(stats: &Statistics) -> String {
    let mut out = format!(
        "{:<13}{:>7}{:>6}{:>6}{:>6}\n",
        "difficulty", "played", "won", "rate", "best"
    );
    for difficulty in Difficulty::ALL {
        let record = stats.record(difficulty);
        let best = match record.best_time {
            Some(secs) => format!("{}s", secs),
            None => "-".to_owned(),
        };
        let _ = writeln!(
            out,
            "{:<13}{:>7}{:>6}{:>5}%{:>6}",
            difficulty.name(),
            record.played,
            record.won,
            record.win_rate(),
            best
        );
    }
    out
}

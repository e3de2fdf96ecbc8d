mod command;
mod config;
mod render;
mod shell;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use sweeper_core::{FileStore, Game, GameConfig, SessionStore, StatisticsStore};

use crate::config::{Overrides, Settings};
use crate::shell::Shell;

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal", long_about = None)]
struct Args {
    #[command(flatten)]
    overrides: Overrides,

    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Config file to read instead of the default one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force a seed instead of random. Later games in the session derive their seeds from it.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the statistics and exit
    #[arg(long)]
    stats: bool,

    /// Clear the statistics before anything else
    #[arg(long)]
    reset_stats: bool,

    /// Discard the saved game and start a new one
    #[arg(long)]
    new: bool,

    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let level = args.verbose.log_level_filter();
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        loggers.push(WriteLogger::new(level.max(log::LevelFilter::Debug), log_config, file));
    }

    CombinedLogger::init(loggers).context("initializing logger")
}

fn new_game(config: GameConfig, seed: Option<u64>) -> Game {
    match seed {
        Some(seed) => Game::new(config, seed),
        None => Game::with_random_seed(config),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let settings = Settings::load(args.config.as_deref(), args.overrides.clone())?;
    log::debug!("settings: {:?}", settings);

    let mut stats = StatisticsStore::new(FileStore::new(&settings.data_dir));
    let mut sessions = SessionStore::new(FileStore::new(&settings.data_dir));

    if args.reset_stats {
        stats.reset();
    }
    if args.stats {
        print!("{}", render::statistics(&stats.statistics()));
        return Ok(());
    }

    let saved = if args.new {
        sessions.clear();
        None
    } else {
        sessions.take()
    };
    let game = match saved {
        Some(game) => {
            log::info!("Resuming saved {} game", game.difficulty());
            game
        }
        None => new_game(settings.profile.config, args.seed),
    };

    let mut shell = Shell::new(game, stats, sessions, Instant::now()).with_seed(args.seed);
    shell
        .run(io::stdin().lock(), io::stdout().lock())
        .context("running game")
}

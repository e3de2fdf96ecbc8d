use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use sweeper_core::{
    AUTOSAVE_INTERVAL, Game, GameConfig, KeyValueStore, MAX_ELAPSED_SECS, RevealOutcome,
    SessionStore, StatisticsStore,
};

use crate::command::{Command, HELP, ParseCommandError};
use crate::render;

/// Distance between the seeds of consecutive seeded games.
const SEED_STEP: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Drives one game from text commands and keeps the timer, statistics and saved session in step.
pub struct Shell<S> {
    game: Game,
    stats: StatisticsStore<S>,
    sessions: SessionStore<S>,
    /// Last seed handed out, when games are seeded
    seed: Option<u64>,
    /// Wall-clock time already turned into timer ticks
    clock: Instant,
    last_save: Instant,
}

impl<S: KeyValueStore> Shell<S> {
    pub fn new(
        game: Game,
        stats: StatisticsStore<S>,
        sessions: SessionStore<S>,
        now: Instant,
    ) -> Self {
        Self {
            game,
            stats,
            sessions,
            seed: None,
            clock: now,
            last_save: now,
        }
    }

    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        writeln!(out, "{}", render::board(&self.game))?;
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            let now = Instant::now();
            self.advance_clock(now);

            let flow = match line.parse::<Command>() {
                Ok(command) => self.handle(command, &mut out)?,
                Err(ParseCommandError::Empty) => Flow::Continue,
                Err(err) => {
                    writeln!(out, "{}", err)?;
                    Flow::Continue
                }
            };
            self.autosave(now);

            if flow == Flow::Quit {
                break;
            }
            write!(out, "> ")?;
            out.flush()?;
        }

        self.shutdown();
        Ok(())
    }

    /// Makes every following game derive its mines from `seed`.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Throws the current game away, saved copy included.
    fn restart(&mut self, config: GameConfig) {
        match self.seed.as_mut() {
            Some(seed) => {
                *seed = seed.wrapping_add(SEED_STEP);
                self.game = Game::new(config, *seed);
            }
            None => self.game.resize(config),
        }
        self.sessions.clear();
    }

    /// Turns the wall-clock time since the last call into timer ticks.
    pub fn advance_clock(&mut self, now: Instant) {
        if !self.game.state().is_active() || self.game.is_paused() {
            self.clock = now;
            return;
        }

        let secs = now.saturating_duration_since(self.clock).as_secs();
        for _ in 0..secs.min(MAX_ELAPSED_SECS.into()) {
            self.game.tick();
        }
        self.clock += Duration::from_secs(secs);
    }

    pub fn autosave(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_save) >= AUTOSAVE_INTERVAL {
            self.sessions.save(&self.game);
            self.last_save = now;
        }
    }

    /// Saves an unfinished game before exiting.
    pub fn shutdown(&mut self) {
        self.sessions.save(&self.game);
    }

    pub fn handle(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        match command {
            Command::Reveal(coords) => {
                let was_fresh = self.game.state().is_fresh();
                let outcome = self.game.reveal(coords);
                if was_fresh && !self.game.state().is_fresh() {
                    self.stats.record_game_start(self.game.difficulty());
                }

                if outcome == RevealOutcome::Invalid {
                    writeln!(out, "nothing to reveal at {} {}", coords.0, coords.1)?;
                    return Ok(Flow::Continue);
                }
                writeln!(out, "{}", render::board(&self.game))?;
                if outcome.is_terminal() {
                    self.sessions.clear();
                }

                match outcome {
                    RevealOutcome::GameOver => {
                        writeln!(out, "Boom! Type 'n' for a new game.")?;
                    }
                    RevealOutcome::Win => {
                        let secs = self.game.elapsed_secs();
                        let is_new_best = self.stats.record_game_win(self.game.difficulty(), secs);
                        writeln!(out, "Cleared in {}s!", secs)?;
                        if is_new_best {
                            writeln!(out, "New best time for {}!", self.game.difficulty())?;
                        }
                        let rate = self.stats.win_rate(self.game.difficulty());
                        writeln!(out, "Win rate: {}%", rate)?;
                    }
                    RevealOutcome::Continue | RevealOutcome::Invalid => {}
                }
            }
            Command::Flag(coords) => {
                self.game.toggle_flag(coords);
                writeln!(out, "{}", render::board(&self.game))?;
            }
            Command::NewGame => {
                self.restart(self.game.config());
                writeln!(out, "{}", render::board(&self.game))?;
            }
            Command::Difficulty(profile) => {
                self.restart(profile.config);
                writeln!(out, "{}", render::board(&self.game))?;
            }
            Command::Pause => {
                if self.game.state().is_active() {
                    let paused = !self.game.is_paused();
                    self.game.set_paused(paused);
                    writeln!(out, "{}", if paused { "paused" } else { "resumed" })?;
                } else {
                    writeln!(out, "no game in progress")?;
                }
            }
            Command::Stats => {
                write!(out, "{}", render::statistics(&self.stats.statistics()))?;
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
impl<S: KeyValueStore> Shell<S> {
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn stats(&self) -> &StatisticsStore<S> {
        &self.stats
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::{
        Difficulty, DifficultyProfile, EngineState, GameConfig, MemoryStore, MineLayout,
    };

    fn shell(game: Game) -> (Shell<MemoryStore>, Instant) {
        let now = Instant::now();
        let shell = Shell::new(
            game,
            StatisticsStore::new(MemoryStore::new()),
            SessionStore::new(MemoryStore::new()),
            now,
        );
        (shell, now)
    }

    fn run(shell: &mut Shell<MemoryStore>, script: &str) -> String {
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn first_reveal_records_start_and_instant_win() {
        // too small for any mine, the first reveal clears the board
        let (mut shell, _) = shell(Game::new(GameConfig::new((3, 3), 5), 1));

        let out = run(&mut shell, "r 1 1\nq\n");

        assert_eq!(shell.game().state(), EngineState::Won);
        let record = shell.stats().record(Difficulty::Custom);
        assert_eq!((record.played, record.won, record.best_time), (1, 1, None));
        assert!(out.contains("Cleared in 0s!"));
        assert!(out.contains("Win rate: 100%"));
    }

    #[test]
    fn beginner_start_is_counted_once() {
        let (mut shell, _) = shell(Game::new(GameConfig::new((9, 9), 10), 8));

        run(&mut shell, "f 0 0\nr 4 4\nr 4 4\nq\n");

        assert_eq!(shell.stats().record(Difficulty::Beginner).played, 1);
    }

    #[test]
    fn losing_clears_the_saved_session() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0)]).unwrap();
        let (mut shell, now) = shell(Game::with_layout(layout));
        shell.autosave(now + AUTOSAVE_INTERVAL);
        assert!(shell.sessions().has_saved());

        let out = run(&mut shell, "r 0 0\n");

        assert!(out.contains("Boom!"));
        assert!(!shell.sessions().has_saved());
    }

    #[test]
    fn quitting_saves_an_active_game() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();
        let (mut shell, _) = shell(Game::with_layout(layout));

        run(&mut shell, "r 0 2\nq\n");

        assert_eq!(shell.game().state(), EngineState::Active);
        assert!(shell.sessions().has_saved());
        assert_eq!(
            shell.sessions().load().map(|game| game.revealed_count()),
            Some(shell.game().revealed_count())
        );
    }

    #[test]
    fn clock_ticks_only_while_running() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0)]).unwrap();
        let (mut shell, now) = shell(Game::with_layout(layout));

        shell.advance_clock(now + Duration::from_millis(3500));
        assert_eq!(shell.game().elapsed_secs(), 3);

        shell.advance_clock(now + Duration::from_millis(4100));
        assert_eq!(shell.game().elapsed_secs(), 4);

        let mut sink = Vec::new();
        shell.handle(Command::Pause, &mut sink).unwrap();
        shell.advance_clock(now + Duration::from_secs(60));
        assert_eq!(shell.game().elapsed_secs(), 4);
    }

    #[test]
    fn difficulty_change_starts_fresh_board() {
        let (mut shell, _) = shell(Game::new(GameConfig::new((9, 9), 10), 2));

        let out = run(&mut shell, "r 4 4\nd expert\n");

        assert_eq!(shell.game().state(), EngineState::Fresh);
        assert_eq!(
            shell.game().config(),
            DifficultyProfile::preset(Difficulty::Expert).config
        );
        assert!(out.contains("(expert)"));
    }

    #[test]
    fn seeded_shell_replays_the_same_games() {
        let script = "r 4 4\nn\nr 4 4\nd 8 10 12\nr 0 0\n";
        let play = || {
            let config = GameConfig::new((9, 9), 10);
            let (shell, _) = shell(Game::new(config, 21));
            let mut shell = shell.with_seed(Some(21));
            run(&mut shell, script);
            shell.game().board()
        };

        let first = play();

        assert!(first.iter().any(|cell| cell.is_revealed));
        assert_eq!(first, play());
    }

    #[test]
    fn new_game_discards_the_saved_session() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();
        let (mut shell, now) = shell(Game::with_layout(layout));
        shell.autosave(now + AUTOSAVE_INTERVAL);
        assert!(shell.sessions().has_saved());

        run(&mut shell, "n\n");

        assert_eq!(shell.game().state(), EngineState::Fresh);
        assert_eq!(shell.game().size(), (3, 3));
        assert!(!shell.sessions().has_saved());
    }

    #[test]
    fn bad_input_is_reported_and_ignored() {
        let (mut shell, _) = shell(Game::new(GameConfig::new((9, 9), 10), 2));

        let out = run(&mut shell, "\nzap\nr 99 99\n");

        assert!(out.contains("unknown command \"zap\""));
        assert!(out.contains("nothing to reveal at 99 99"));
        assert_eq!(shell.game().state(), EngineState::Fresh);
    }
}

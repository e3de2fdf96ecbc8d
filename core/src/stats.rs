use serde::{Deserialize, Serialize};

use crate::*;

pub const STATS_FORMAT_VERSION: u32 = 1;

fn current_version() -> u32 {
    STATS_FORMAT_VERSION
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRecord {
    pub played: u32,
    pub won: u32,
    /// Fastest win in seconds, never set for custom boards
    #[serde(default)]
    pub best_time: Option<u32>,
}

impl StatisticsRecord {
    /// Percentage of played games that were won, rounded half up.
    pub fn win_rate(&self) -> u8 {
        if self.played == 0 {
            return 0;
        }
        let won = u64::from(self.won);
        let played = u64::from(self.played);
        let rate = (won * 200 + played) / (played * 2);
        // a damaged record may claim more wins than games
        rate.min(100) as u8
    }
}

/// Every record, keyed by difficulty name when stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub beginner: StatisticsRecord,
    #[serde(default)]
    pub intermediate: StatisticsRecord,
    #[serde(default)]
    pub expert: StatisticsRecord,
    #[serde(default)]
    pub custom: StatisticsRecord,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            version: STATS_FORMAT_VERSION,
            beginner: Default::default(),
            intermediate: Default::default(),
            expert: Default::default(),
            custom: Default::default(),
        }
    }
}

impl Statistics {
    pub fn record(&self, difficulty: Difficulty) -> &StatisticsRecord {
        match difficulty {
            Difficulty::Beginner => &self.beginner,
            Difficulty::Intermediate => &self.intermediate,
            Difficulty::Expert => &self.expert,
            Difficulty::Custom => &self.custom,
        }
    }

    pub fn record_mut(&mut self, difficulty: Difficulty) -> &mut StatisticsRecord {
        match difficulty {
            Difficulty::Beginner => &mut self.beginner,
            Difficulty::Intermediate => &mut self.intermediate,
            Difficulty::Expert => &mut self.expert,
            Difficulty::Custom => &mut self.custom,
        }
    }

    fn check_version(&self) -> Result<()> {
        if self.version > STATS_FORMAT_VERSION {
            Err(GameError::UnsupportedVersion(self.version))
        } else {
            Ok(())
        }
    }
}

impl StorageKey for Statistics {
    const KEY: &'static str = "sweeper:stats";
}

/// Play counts and best times, re-read from storage and written back on every change.
#[derive(Debug)]
pub struct StatisticsStore<S> {
    store: S,
}

impl<S: KeyValueStore> StatisticsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Reads the stored records. A missing record is the zero default.
    pub fn load(&self) -> Result<Statistics, StorageError> {
        let stats = self.store.load_record::<Statistics>()?.unwrap_or_default();
        stats.check_version()?;
        Ok(stats)
    }

    /// Current records for display. Unreadable storage shows as empty records.
    pub fn statistics(&self) -> Statistics {
        self.load().unwrap_or_else(|err| {
            log::warn!("Could not load statistics, showing zeros: {}", err);
            Statistics::default()
        })
    }

    pub fn record(&self, difficulty: Difficulty) -> StatisticsRecord {
        *self.statistics().record(difficulty)
    }

    pub fn record_game_start(&mut self, difficulty: Difficulty) {
        self.update(|stats| stats.record_mut(difficulty).played += 1);
    }

    /// Counts a win and returns whether `secs` is a new best time.
    pub fn record_game_win(&mut self, difficulty: Difficulty, secs: u32) -> bool {
        self.update(|stats| {
            let record = stats.record_mut(difficulty);
            record.won += 1;
            if !difficulty.tracks_best_time() {
                return false;
            }
            let is_new_best = record.best_time.is_none_or(|best| secs < best);
            if is_new_best {
                record.best_time = Some(secs);
            }
            is_new_best
        })
    }

    pub fn win_rate(&self, difficulty: Difficulty) -> u8 {
        self.statistics().record(difficulty).win_rate()
    }

    pub fn reset(&mut self) {
        log::info!("Resetting statistics");
        self.persist(&Statistics::default());
    }

    /// Applies `change` to the stored records. When they can't be read the change is computed
    /// against zeros and not written, so the stored records stay as they are.
    fn update<R>(&mut self, change: impl FnOnce(&mut Statistics) -> R) -> R {
        match self.load() {
            Ok(mut stats) => {
                let result = change(&mut stats);
                self.persist(&stats);
                result
            }
            Err(err) => {
                log::error!("Could not load statistics, not updating them: {}", err);
                change(&mut Statistics::default())
            }
        }
    }

    fn persist(&mut self, stats: &Statistics) {
        if let Err(err) = self.store.save_record(stats) {
            log::error!("Could not save statistics: {}", err);
        }
    }
}

//! Session scoring and high-score persistence
//!
//! The [`ScoreKeeper`] accumulates the session score, tallies resolution
//! outcomes, and at the end of a session commits the score against the
//! persisted high score before forwarding it to the [`ScoreSubmitter`].

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use enum_map::EnumMap;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    constants::score::HIGHSCORE_KEY, error::StoreError, round::Outcome, submit::ScoreSubmitter,
};

/// Platform key-value persistence for integers
pub trait PersistentStore: Send {
    /// Reads the value stored under `key`, 0 when absent
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing storage cannot be read.
    fn get_highscore(&self, key: &str) -> Result<i64, StoreError>;

    /// Stores `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing storage cannot be written.
    fn set_highscore(&mut self, key: &str, value: i64) -> Result<(), StoreError>;
}

/// Store kept in memory, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, i64>>>,
}

impl MemoryStore {
    /// Creates a store holding `value` under `key`
    pub fn with_value(key: &str, value: i64) -> Self {
        let store = Self::default();
        store.lock().insert(key.to_owned(), value);
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, i64>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl PersistentStore for MemoryStore {
    fn get_highscore(&self, key: &str) -> Result<i64, StoreError> {
        Ok(self.lock().get(key).copied().unwrap_or_default())
    }

    fn set_highscore(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.lock().insert(key.to_owned(), value);
        Ok(())
    }
}

/// Store backed by a flat JSON object file
///
/// A missing file reads as an empty store; it is created on first write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store persisting to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<HashMap<String, i64>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PersistentStore for JsonFileStore {
    fn get_highscore(&self, key: &str) -> Result<i64, StoreError> {
        Ok(self.read()?.get(key).copied().unwrap_or_default())
    }

    fn set_highscore(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        let mut values = self.read()?;
        values.insert(key.to_owned(), value);
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Result of committing a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighscoreCommit {
    /// Session score that was committed
    pub score: i64,
    /// High score read before the commit
    pub previous: i64,
    /// Whether the session score replaced the high score
    pub new_record: bool,
}

/// Per-session outcome counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Number of resolutions of each kind
    pub outcomes: EnumMap<Outcome, usize>,
    /// Number of accepted answers that were correct
    pub correct_answers: usize,
}

/// Session score bookkeeping
#[derive(Debug, Default)]
pub struct ScoreKeeper {
    session_score: i64,
    summary: SessionSummary,
}

impl ScoreKeeper {
    /// Current session score
    pub fn session_score(&self) -> i64 {
        self.session_score
    }

    /// Outcome tally of the current session
    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Adds `delta` to the session score
    ///
    /// # Returns
    ///
    /// The updated session score
    pub fn add_score(&mut self, delta: i64) -> i64 {
        self.session_score += delta;
        self.session_score
    }

    /// Zeroes the session score
    pub(crate) fn reset_score(&mut self) {
        self.session_score = 0;
    }

    /// Clears the outcome tally for a new session
    pub(crate) fn reset_summary(&mut self) {
        self.summary = SessionSummary::default();
    }

    /// Tallies one resolution
    pub(crate) fn record(&mut self, outcome: Outcome, correct: bool) {
        self.summary.outcomes[outcome] += 1;
        if correct {
            self.summary.correct_answers += 1;
        }
    }

    /// Reads the persisted high score, treating read failures as 0
    pub fn read_highscore(store: &dyn PersistentStore) -> i64 {
        store.get_highscore(HIGHSCORE_KEY).unwrap_or_else(|e| {
            error!(error = %e, "failed to read high score");
            0
        })
    }

    /// Commits the session score at the end of a session
    ///
    /// The high score is replaced when the session beat it. The score is
    /// then submitted whether or not it was a record. A negative persisted
    /// high score additionally submits a zero score first.
    pub fn commit_highscore(
        &self,
        store: &mut dyn PersistentStore,
        submitter: &dyn ScoreSubmitter,
        player_id: &str,
    ) -> HighscoreCommit {
        let previous = Self::read_highscore(store);
        let new_record = previous < self.session_score;

        if new_record {
            match store.set_highscore(HIGHSCORE_KEY, self.session_score) {
                Ok(()) => info!(score = self.session_score, previous, "new high score"),
                Err(e) => {
                    error!(error = %e, score = self.session_score, "failed to persist high score");
                }
            }
        }

        if previous < 0 {
            warn!(previous, "persisted high score is negative, submitting zero first");
            submitter.submit(player_id, 0);
        }
        submitter.submit(player_id, self.session_score);

        HighscoreCommit {
            score: self.session_score,
            previous,
            new_record,
        }
    }
}

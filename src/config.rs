//! Game configuration
//!
//! Settings are read from a TOML file, then selectively overridden by
//! `TRIVIA_*` environment variables. Every field has a default, so an empty
//! file (or no file at all) yields a playable configuration.

use std::{path::PathBuf, time::Duration};

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use crate::{
    constants::{round, score},
    error::ConfigError,
    round::{evaluator::EvaluationRule, selector::SelectionStrategy},
};

/// Settings for a game
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GameConfig {
    /// Identifier sent along with submitted scores
    #[garde(length(min = 1))]
    pub player_id: String,
    /// URL receiving score submissions
    #[garde(length(min = 1))]
    pub submit_endpoint: String,
    /// Highest level before the level wraps back to 1
    #[garde(range(min = 1, max = round::MAX_LEVEL_LIMIT))]
    pub max_level: u32,
    /// How long the resolution screen stays up
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[garde(custom(|v: &Duration, _: &()| validate_resolution_delay(*v)))]
    pub resolution_delay: Duration,
    /// Directory holding the `level<N>.json` question files
    #[garde(skip)]
    pub questions_dir: PathBuf,
    /// File persisting the high score
    #[garde(skip)]
    pub highscore_file: PathBuf,
    /// How accepted picks are judged
    #[garde(skip)]
    pub evaluation: EvaluationRule,
    /// How the next question is drawn
    #[garde(skip)]
    pub selection: SelectionStrategy,
    /// Seed for question selection and hints, random when absent
    #[garde(skip)]
    pub seed: Option<u64>,
}

fn validate_resolution_delay(delay: Duration) -> garde::Result {
    if delay > Duration::from_millis(round::MAX_RESOLUTION_DELAY_MS) {
        return Err(garde::Error::new(format!(
            "resolution delay of {}ms exceeds {}ms",
            delay.as_millis(),
            round::MAX_RESOLUTION_DELAY_MS
        )));
    }
    Ok(())
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_id: score::DEFAULT_PLAYER_ID.to_owned(),
            submit_endpoint: score::DEFAULT_SUBMIT_ENDPOINT.to_owned(),
            max_level: round::DEFAULT_MAX_LEVEL,
            resolution_delay: Duration::from_millis(round::DEFAULT_RESOLUTION_DELAY_MS),
            questions_dir: PathBuf::from("questions"),
            highscore_file: PathBuf::from("highscore.json"),
            evaluation: EvaluationRule::default(),
            selection: SelectionStrategy::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parses and validates a TOML document
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(raw)?.validated()
    }

    /// Reads and validates a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// the errors of [`GameConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Applies `TRIVIA_*` environment overrides on top of `self`
    ///
    /// Recognized variables: `TRIVIA_PLAYER_ID`, `TRIVIA_SUBMIT_ENDPOINT`,
    /// `TRIVIA_MAX_LEVEL`, `TRIVIA_RESOLUTION_DELAY_MS`,
    /// `TRIVIA_QUESTIONS_DIR`, `TRIVIA_HIGHSCORE_FILE` and `TRIVIA_SEED`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] for a numeric variable that does not
    /// parse and [`ConfigError::Invalid`] when the result is out of range.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            name: &'static str,
            value: String,
        ) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env { name, value })
        }

        if let Some(value) = lookup("TRIVIA_PLAYER_ID") {
            self.player_id = value;
        }
        if let Some(value) = lookup("TRIVIA_SUBMIT_ENDPOINT") {
            self.submit_endpoint = value;
        }
        if let Some(value) = lookup("TRIVIA_MAX_LEVEL") {
            self.max_level = parsed("TRIVIA_MAX_LEVEL", value)?;
        }
        if let Some(value) = lookup("TRIVIA_RESOLUTION_DELAY_MS") {
            self.resolution_delay =
                Duration::from_millis(parsed("TRIVIA_RESOLUTION_DELAY_MS", value)?);
        }
        if let Some(value) = lookup("TRIVIA_QUESTIONS_DIR") {
            self.questions_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("TRIVIA_HIGHSCORE_FILE") {
            self.highscore_file = PathBuf::from(value);
        }
        if let Some(value) = lookup("TRIVIA_SEED") {
            self.seed = Some(parsed("TRIVIA_SEED", value)?);
        }

        self.validated()
    }

    /// Runs validation, handing the configuration back on success
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] with the validation report.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }

    /// A fresh random generator, seeded when configured
    pub fn rng(&self) -> fastrand::Rng {
        self.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed)
    }
}

//! Error types for the round core and its collaborators
//!
//! Every failure in this crate is local and recoverable. Engine operations
//! return [`RoundError`] so callers can react, and the engine logs each
//! rejection before returning it.

use thiserror::Error;

use crate::engine::Phase;

/// Rejection of a round engine operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoundError {
    /// The operation is not valid in the engine's current phase
    #[error("operation not allowed while the round is {0:?}")]
    InvalidPhase(Phase),
    /// The active question index does not address a loaded question
    #[error("active question index {index} is out of bounds for {count} questions")]
    QuestionOutOfBounds {
        /// The offending index
        index: usize,
        /// Number of loaded questions
        count: usize,
    },
    /// No question is active
    #[error("no question is active")]
    NoActiveQuestion,
    /// The answer reference does not address an answer of the active question
    #[error("answer {answer} does not exist on question {question}")]
    AnswerOutOfBounds {
        /// The active question
        question: usize,
        /// The offending answer reference
        answer: usize,
    },
    /// The same answer was resubmitted for a single-answer question
    #[error("answer {0} is already picked")]
    DuplicatePick(usize),
    /// Every question of the level has already been resolved
    #[error("no unfinished question is left")]
    NoQuestionLeft,
    /// The question bank could not supply questions
    #[error(transparent)]
    Bank(#[from] BankError),
}

/// Failure to supply questions for a level
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BankError {
    /// The bank has no questions for the level
    #[error("no questions available for level {0}")]
    Empty(u32),
    /// The level's question file could not be read
    #[error("failed to read questions for level {level}: {message}")]
    Read {
        /// Requested level
        level: u32,
        /// Underlying failure
        message: String,
    },
    /// The level's questions could not be parsed
    #[error("failed to parse questions for level {level}: {message}")]
    Parse {
        /// Requested level
        level: u32,
        /// Underlying failure
        message: String,
    },
    /// The level's questions failed validation
    #[error("invalid questions for level {level}: {message}")]
    Invalid {
        /// Requested level
        level: u32,
        /// Validation report
        message: String,
    },
}

/// Failure to read or write persisted values
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The store file does not hold a JSON object of integers
    #[error("store file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure to load the game configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid TOML for [`crate::config::GameConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// An environment override could not be parsed
    #[error("environment variable {name} has invalid value {value:?}")]
    Env {
        /// Variable name
        name: &'static str,
        /// Rejected value
        value: String,
    },
    /// The configuration failed validation
    #[error("invalid config: {0}")]
    Invalid(#[from] garde::Report),
}

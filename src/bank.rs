//! Question banks
//!
//! A bank supplies the ordered questions of a level. The engine only relies
//! on [`QuestionBank::fetch`]; the storage format behind it is up to the
//! implementation.

use std::{collections::HashMap, path::PathBuf};

use garde::Validate;
use tracing::debug;

use crate::{error::BankError, question::Question};

/// Source of the questions for a level
pub trait QuestionBank: Send {
    /// Returns the ordered questions of `level`
    ///
    /// # Errors
    ///
    /// Returns a [`BankError`] when the level cannot be supplied.
    fn fetch(&self, level: u32) -> Result<Vec<Question>, BankError>;
}

/// Validates a level's questions before they reach the engine
///
/// Each question must pass its field validation, its kind check, and sit
/// at the position its `index` names.
///
/// # Errors
///
/// Returns [`BankError::Empty`] for an empty level and
/// [`BankError::Invalid`] for the first violation found.
pub fn validate_level(level: u32, questions: Vec<Question>) -> Result<Vec<Question>, BankError> {
    if questions.is_empty() {
        return Err(BankError::Empty(level));
    }
    if questions.len() > crate::constants::question::MAX_QUESTION_COUNT {
        return Err(BankError::Invalid {
            level,
            message: format!("{} questions exceed the limit", questions.len()),
        });
    }
    for (position, question) in questions.iter().enumerate() {
        let invalid = |message: String| BankError::Invalid { level, message };
        if question.index != position {
            return Err(invalid(format!(
                "question {} is at position {position}",
                question.index
            )));
        }
        question
            .validate()
            .map_err(|report| invalid(format!("question {position}: {report}")))?;
        question.check_kind().map_err(invalid)?;
    }
    Ok(questions)
}

/// In-memory bank keyed by level
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionBank {
    levels: HashMap<u32, Vec<Question>>,
}

impl StaticQuestionBank {
    /// Creates an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the questions of a level, replacing any previous ones
    #[must_use]
    pub fn with_level(mut self, level: u32, questions: Vec<Question>) -> Self {
        self.levels.insert(level, questions);
        self
    }
}

impl QuestionBank for StaticQuestionBank {
    fn fetch(&self, level: u32) -> Result<Vec<Question>, BankError> {
        validate_level(level, self.levels.get(&level).cloned().unwrap_or_default())
    }
}

/// Bank reading one JSON file per level from a directory
///
/// Level `n` is read from `<dir>/level<n>.json`, which holds a JSON array
/// of questions.
#[derive(Debug, Clone)]
pub struct JsonQuestionBank {
    dir: PathBuf,
}

impl JsonQuestionBank {
    /// Creates a bank rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `level`
    pub fn level_path(&self, level: u32) -> PathBuf {
        self.dir.join(format!("level{level}.json"))
    }
}

impl QuestionBank for JsonQuestionBank {
    fn fetch(&self, level: u32) -> Result<Vec<Question>, BankError> {
        let path = self.level_path(level);
        debug!(path = %path.display(), level, "loading questions");

        let raw = std::fs::read_to_string(&path).map_err(|e| BankError::Read {
            level,
            message: format!("{}: {e}", path.display()),
        })?;
        let questions: Vec<Question> = serde_json::from_str(&raw).map_err(|e| BankError::Parse {
            level,
            message: e.to_string(),
        })?;

        validate_level(level, questions)
    }
}

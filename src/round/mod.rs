//! Round components
//!
//! The pieces the [`crate::engine::RoundEngine`] orchestrates: question
//! selection, pick tracking and evaluation, the countdown, and the 50/50
//! hint. Each component owns only its own slice of round state.

use enum_map::Enum;
use serde::{Deserialize, Serialize};

pub mod evaluator;
pub mod hint;
pub mod selector;
pub mod timer;

/// Classification shown after an answer is accepted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Outcome {
    /// The accepted picks were correct
    Correct,
    /// The accepted picks were wrong or empty
    Incorrect,
    /// The session's last question was resolved
    Finish,
}

/// Indices of the questions resolved in the current session
///
/// The set only grows during a session; it is emptied when a new session
/// starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinishedQuestions {
    indices: Vec<usize>,
}

impl FinishedQuestions {
    /// Records a resolved question
    ///
    /// # Returns
    ///
    /// `false` if the question was already recorded
    pub fn insert(&mut self, index: usize) -> bool {
        if self.contains(index) {
            false
        } else {
            self.indices.push(index);
            true
        }
    }

    /// Whether `index` was resolved in this session
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Number of resolved questions
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no question was resolved yet
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Resolved indices in resolution order
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub(crate) fn reset(&mut self) {
        self.indices.clear();
    }
}

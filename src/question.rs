//! Question and answer records
//!
//! Questions are loaded once per level and never mutated afterwards. The
//! round components only ever read them.

use std::collections::HashSet;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// How picks on a question combine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerType {
    /// Exactly one answer can be picked at a time
    #[default]
    Single,
    /// Any number of answers can be picked, each pick toggles
    Multi,
}

/// A single answer option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Answer {
    /// Position of the answer within its question
    #[garde(skip)]
    pub index: usize,
    /// Text shown to the player
    #[garde(length(max = crate::constants::question::MAX_ANSWER_LENGTH))]
    pub text: String,
    /// Whether this answer counts as correct
    #[garde(skip)]
    pub is_correct: bool,
}

/// A question with its answer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Position of the question within its level
    #[garde(skip)]
    pub index: usize,
    /// The question text
    #[garde(length(max = crate::constants::question::MAX_PROMPT_LENGTH))]
    pub prompt: String,
    /// The answer options in display order
    #[garde(
        length(
            min = crate::constants::question::MIN_ANSWER_COUNT,
            max = crate::constants::question::MAX_ANSWER_COUNT
        ),
        custom(|v: &Vec<Answer>, _: &()| validate_answers(v)),
        dive
    )]
    pub answers: Vec<Answer>,
    /// Pick semantics for this question
    #[serde(rename = "type")]
    #[garde(skip)]
    pub kind: AnswerType,
    /// Countdown length in seconds, 0 means untimed
    #[garde(range(max = crate::constants::question::MAX_TIMER_SECONDS))]
    pub timer_seconds: u32,
    /// Points added to the session score when answered correctly
    #[garde(skip)]
    pub score_value: u32,
}

fn validate_answers(answers: &[Answer]) -> garde::Result {
    if let Some((position, answer)) = answers
        .iter()
        .enumerate()
        .find(|(position, answer)| answer.index != *position)
    {
        return Err(garde::Error::new(format!(
            "answer {} is at position {position}",
            answer.index
        )));
    }
    if !answers.iter().any(|a| a.is_correct) {
        return Err(garde::Error::new("no answer is marked correct"));
    }
    Ok(())
}

impl Question {
    /// Checks the constraints garde cannot express on a single field
    ///
    /// `Single` questions must have exactly one correct answer.
    ///
    /// # Errors
    ///
    /// Returns a description of the violated constraint.
    pub fn check_kind(&self) -> Result<(), String> {
        let correct = self.answers.iter().filter(|a| a.is_correct).count();
        match self.kind {
            AnswerType::Single if correct != 1 => Err(format!(
                "single-answer question {} has {correct} correct answers",
                self.index
            )),
            _ => Ok(()),
        }
    }

    /// Indices of every correct answer
    pub fn correct_answers(&self) -> HashSet<usize> {
        self.answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.index)
            .collect()
    }

    /// Index of the first correct answer
    pub fn first_correct(&self) -> Option<usize> {
        self.answers.iter().position(|a| a.is_correct)
    }

    /// Indices of every answer not marked correct, in display order
    pub fn incorrect_answers(&self) -> Vec<usize> {
        self.answers
            .iter()
            .filter(|a| !a.is_correct)
            .map(|a| a.index)
            .collect_vec()
    }

    /// Whether the question runs a countdown
    pub fn is_timed(&self) -> bool {
        self.timer_seconds > 0
    }

    /// Looks up an answer by reference
    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }
}

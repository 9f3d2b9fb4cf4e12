//! Picked-answer tracking and correctness
//!
//! The evaluator keeps the picks made on the active question and decides,
//! on accept, whether they count as a correct answer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::RoundError,
    question::{AnswerType, Question},
};

/// Rule deciding whether a set of picks is correct
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationRule {
    /// Correct iff something was picked and every correct answer is among
    /// the picks; extra wrong picks are not penalized
    #[default]
    CountCorrectPicks,
    /// Correct iff the picks are exactly the correct answers
    ExactMatch,
}

/// Effect of a pick on the picked set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickChange {
    /// The answer was added; `reset` lists answers it displaced
    Picked {
        /// Previously picked answers removed by a single-answer pick
        reset: Vec<usize>,
    },
    /// The answer was already picked on a multi-answer question and got removed
    Unpicked,
}

/// Picked set for the active question
#[derive(Debug, Default)]
pub struct AnswerEvaluator {
    rule: EvaluationRule,
    picked: Vec<usize>,
}

impl AnswerEvaluator {
    /// Creates an evaluator applying `rule`
    pub fn new(rule: EvaluationRule) -> Self {
        Self {
            rule,
            picked: Vec::new(),
        }
    }

    /// Empties the picked set for a new question
    pub fn clear(&mut self) {
        self.picked.clear();
    }

    /// Answers picked so far, in pick order
    pub fn picked(&self) -> &[usize] {
        &self.picked
    }

    /// Applies a pick on `question`
    ///
    /// On a `Single` question the pick replaces the whole set. On a `Multi`
    /// question it toggles the answer's membership.
    ///
    /// # Errors
    ///
    /// * [`RoundError::AnswerOutOfBounds`] if `answer` is not an answer of `question`
    /// * [`RoundError::DuplicatePick`] if a `Single` question's picked answer is picked again
    pub fn pick(&mut self, question: &Question, answer: usize) -> Result<PickChange, RoundError> {
        if question.answer(answer).is_none() {
            return Err(RoundError::AnswerOutOfBounds {
                question: question.index,
                answer,
            });
        }

        let already_picked = self.picked.contains(&answer);
        match question.kind {
            AnswerType::Single if already_picked => Err(RoundError::DuplicatePick(answer)),
            AnswerType::Single => {
                let reset = std::mem::replace(&mut self.picked, vec![answer]);
                Ok(PickChange::Picked { reset })
            }
            AnswerType::Multi if already_picked => {
                self.picked.retain(|picked| *picked != answer);
                Ok(PickChange::Unpicked)
            }
            AnswerType::Multi => {
                self.picked.push(answer);
                Ok(PickChange::Picked { reset: Vec::new() })
            }
        }
    }

    /// Whether the current picks answer `question` correctly
    pub fn evaluate(&self, question: &Question) -> bool {
        if self.picked.is_empty() {
            return false;
        }

        let correct = question.correct_answers();
        let picked: HashSet<usize> = self.picked.iter().copied().collect();

        match self.rule {
            EvaluationRule::CountCorrectPicks => {
                picked.intersection(&correct).count() == correct.len()
            }
            EvaluationRule::ExactMatch => picked == correct,
        }
    }
}

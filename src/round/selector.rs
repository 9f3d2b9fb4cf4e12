//! Random question selection
//!
//! Picks the next question of a session so that no question is shown twice
//! while unfinished ones remain.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::FinishedQuestions;

/// How the next question is drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Uniform draw among the questions still available
    #[default]
    Uniform,
    /// A permutation shuffled at session start, consumed in order
    Shuffled,
}

/// Draws question indices for a session
#[derive(Debug)]
pub struct RandomQuestionSelector {
    strategy: SelectionStrategy,
    rng: fastrand::Rng,
    order: Vec<usize>,
}

impl RandomQuestionSelector {
    /// Creates a selector drawing from `rng`
    pub fn new(strategy: SelectionStrategy, rng: fastrand::Rng) -> Self {
        Self {
            strategy,
            rng,
            order: Vec::new(),
        }
    }

    /// Prepares a new session over `count` questions
    pub fn reset(&mut self, count: usize) {
        self.order = (0..count).collect_vec();
        if self.strategy == SelectionStrategy::Shuffled {
            self.rng.shuffle(&mut self.order);
        }
    }

    /// Draws the next question index
    ///
    /// A candidate is any index below `count` that is neither finished nor
    /// the currently active question.
    ///
    /// # Returns
    ///
    /// `None` when no candidate is left
    pub fn next(
        &mut self,
        count: usize,
        finished: &FinishedQuestions,
        active: Option<usize>,
    ) -> Option<usize> {
        let available =
            |index: &usize| *index < count && !finished.contains(*index) && Some(*index) != active;

        match self.strategy {
            SelectionStrategy::Uniform => {
                self.rng.choice((0..count).filter(available).collect_vec())
            }
            SelectionStrategy::Shuffled => {
                if self.order.len() != count {
                    self.reset(count);
                }
                self.order.iter().copied().find(available)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn selector(strategy: SelectionStrategy, count: usize) -> RandomQuestionSelector {
        let mut selector = RandomQuestionSelector::new(strategy, fastrand::Rng::with_seed(7));
        selector.reset(count);
        selector
    }

    #[test]
    fn test_uniform_never_repeats_finished() {
        for seed in 0..50 {
            let mut selector = RandomQuestionSelector::new(
                SelectionStrategy::Uniform,
                fastrand::Rng::with_seed(seed),
            );
            selector.reset(8);
            let mut finished = FinishedQuestions::default();
            let mut active = None;
            for _ in 0..8 {
                let next = selector.next(8, &finished, active).unwrap();
                assert!(!finished.contains(next));
                assert_ne!(Some(next), active);
                finished.insert(next);
                active = Some(next);
            }
            assert_eq!(selector.next(8, &finished, active), None);
        }
    }

    #[test]
    fn test_shuffled_visits_every_question_once() {
        let mut selector = selector(SelectionStrategy::Shuffled, 6);
        let mut finished = FinishedQuestions::default();
        let mut seen = HashSet::new();
        let mut active = None;
        while let Some(next) = selector.next(6, &finished, active) {
            assert!(seen.insert(next));
            finished.insert(next);
            active = Some(next);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_only_active_left_yields_none() {
        for strategy in [SelectionStrategy::Uniform, SelectionStrategy::Shuffled] {
            let mut selector = selector(strategy, 3);
            let mut finished = FinishedQuestions::default();
            finished.insert(0);
            finished.insert(2);
            assert_eq!(selector.next(3, &finished, Some(1)), None);
        }
    }

    #[test]
    fn test_first_draw_may_pick_index_zero() {
        let mut selector = selector(SelectionStrategy::Uniform, 1);
        assert_eq!(selector.next(1, &FinishedQuestions::default(), None), Some(0));
    }

    #[test]
    fn test_empty_bank_yields_none() {
        let mut selector = selector(SelectionStrategy::Uniform, 0);
        assert_eq!(selector.next(0, &FinishedQuestions::default(), None), None);
    }
}

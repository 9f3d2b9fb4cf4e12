//! One-shot 50/50 hint

use tracing::debug;

use crate::question::Question;

/// Hides wrong answers once per session
#[derive(Debug)]
pub struct HintService {
    used: bool,
    rng: fastrand::Rng,
}

impl HintService {
    /// Creates an unused hint drawing from `rng`
    pub fn new(rng: fastrand::Rng) -> Self {
        Self { used: false, rng }
    }

    /// Whether the hint was spent in this session
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Makes the hint available again for a new session
    pub(crate) fn reset(&mut self) {
        self.used = false;
    }

    /// Spends the hint on `question`
    ///
    /// Picks up to [`crate::constants::hint::HIDDEN_ANSWERS`] incorrect
    /// answers uniformly at random without replacement.
    ///
    /// # Returns
    ///
    /// The answer indices to hide in ascending order, or `None` if the hint
    /// was already spent
    pub fn use_hint(&mut self, question: &Question) -> Option<Vec<usize>> {
        if self.used {
            return None;
        }

        let mut wrong = question.incorrect_answers();
        self.rng.shuffle(&mut wrong);
        wrong.truncate(crate::constants::hint::HIDDEN_ANSWERS);
        wrong.sort_unstable();

        debug!(
            question = question.index,
            correct = ?question.first_correct(),
            hidden = ?wrong,
            "hint applied"
        );
        self.used = true;

        Some(wrong)
    }
}

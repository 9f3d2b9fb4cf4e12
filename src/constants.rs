//! Configuration constants for the trivia round core
//!
//! This module contains the fixed limits and well-known identifiers used
//! throughout the round engine, grouped the same way the components that
//! consume them are.

/// Round lifecycle constants
pub mod round {
    /// Number of questions resolved before a session finishes
    pub const LENGTH: usize = 5;
    /// Highest level when no configuration overrides it
    pub const DEFAULT_MAX_LEVEL: u32 = 3;
    /// Upper bound accepted for a configured maximum level
    pub const MAX_LEVEL_LIMIT: u32 = 100;
    /// Milliseconds the resolution screen stays up before the next question
    pub const DEFAULT_RESOLUTION_DELAY_MS: u64 = 2000;
    /// Upper bound accepted for a configured resolution delay
    pub const MAX_RESOLUTION_DELAY_MS: u64 = 30_000;
}

/// Question and answer validation constants
pub mod question {
    /// Maximum length of a question prompt in characters
    pub const MAX_PROMPT_LENGTH: usize = 200;
    /// Maximum length of an answer text in characters
    pub const MAX_ANSWER_LENGTH: usize = 200;
    /// Minimum number of answers a question must offer
    pub const MIN_ANSWER_COUNT: usize = 1;
    /// Maximum number of answers a question may offer
    pub const MAX_ANSWER_COUNT: usize = 8;
    /// Maximum countdown in seconds for a timed question
    pub const MAX_TIMER_SECONDS: u32 = 240;
    /// Maximum number of questions in one level
    pub const MAX_QUESTION_COUNT: usize = 500;
}

/// Hint constants
pub mod hint {
    /// Number of wrong answers hidden by the 50/50 hint
    pub const HIDDEN_ANSWERS: usize = 2;
}

/// Score persistence and submission constants
pub mod score {
    /// Key under which the high score is persisted
    pub const HIGHSCORE_KEY: &str = "highscore";
    /// Player identifier used when none is configured
    pub const DEFAULT_PLAYER_ID: &str = "1";
    /// Endpoint receiving score submissions when none is configured
    pub const DEFAULT_SUBMIT_ENDPOINT: &str = "http://localhost:3000/submit-score";
}

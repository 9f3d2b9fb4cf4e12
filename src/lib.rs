//! # Trivia Round Library
//!
//! This library provides the round-management core of a single-player
//! trivia game. It selects questions without repetition, tracks picked
//! answers for single- and multi-select questions, evaluates them, drives
//! the per-question countdown, keeps score, applies the one-time 50/50 hint
//! and decides when a session ends.
//!
//! Everything outside the round logic is a collaborator behind a trait:
//! question loading, high-score persistence, score submission, alarm
//! scheduling and the UI, which observes [`RoundEvent`]s.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
use serde::{Deserialize, Serialize};

pub mod bank;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod logging;
pub mod observer;
pub mod question;
pub mod round;
pub mod runtime;
pub mod schedule;
pub mod score;
pub mod submit;

use question::Question;
use round::{Outcome, timer::TimerColor};

/// Sound effects the UI should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// An accepted answer was correct
    Correct,
    /// An accepted answer was wrong
    Incorrect,
    /// One second of the countdown elapsed
    Countdown,
}

/// Notifications sent to the UI observers
///
/// Every change the UI has to reflect is announced as one of these, in the
/// order the engine makes the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    /// A new question is on screen
    QuestionChanged {
        /// The question to display
        question: Question,
    },
    /// The active question was resolved
    Resolution {
        /// How the question was resolved
        outcome: Outcome,
        /// Score value of the resolved question
        score_delta: u32,
    },
    /// The countdown display changed
    TimerTick {
        /// Seconds remaining
        seconds_left: u32,
        /// Display state
        color: TimerColor,
    },
    /// The countdown stopped
    TimerStopped,
    /// The hint hid these answers
    HintApplied {
        /// Indices of the hidden answers
        hidden: Vec<usize>,
    },
    /// The hint cannot be used again this session
    HintExhausted,
    /// An answer is no longer picked
    PickReset {
        /// Index of the answer to show as unpicked
        answer: usize,
    },
    /// The session score changed
    ScoreUpdated {
        /// New session score
        score: i64,
    },
    /// A sound effect should play
    Sound(SoundCue),
}

impl RoundEvent {
    /// Converts the event to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

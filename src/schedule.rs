//! Cancellable scheduled alarms
//!
//! The engine never sleeps. Whenever it needs to resume later (the next
//! countdown tick, the end of the resolution screen) it hands an
//! [`AlarmMessage`] to a [`Scheduler`], which delivers it back through
//! [`crate::engine::RoundEngine::receive_alarm`] once the delay elapsed.
//!
//! A [`TaskSlot`] holds at most one pending alarm of a kind. Replacing it
//! cancels the previous token, and every alarm carries the slot generation
//! it was scheduled under, so an alarm that was already queued when its
//! task got cancelled is recognized as stale and dropped.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Alarms the engine schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One second of the active countdown elapsed
    TimerTick {
        /// Generation of the timer slot that scheduled the tick
        generation: u64,
    },
    /// The resolution screen is over, show the next question
    NextQuestion {
        /// Generation of the transition slot that scheduled the alarm
        generation: u64,
    },
}

/// Delivers alarms back to the engine after a delay
pub trait Scheduler: Send {
    /// Schedules `alarm` to be delivered after `delay`
    ///
    /// Implementations must not deliver the alarm once `cancel` has been
    /// cancelled while the delay is still running.
    fn schedule(&self, alarm: AlarmMessage, delay: Duration, cancel: CancellationToken);
}

/// Holder of at most one pending alarm of a kind
#[derive(Debug, Default)]
pub struct TaskSlot {
    generation: u64,
    active: Option<CancellationToken>,
}

impl TaskSlot {
    /// Cancels any pending alarm and schedules a new one
    ///
    /// # Arguments
    ///
    /// * `scheduler` - Scheduler delivering the alarm
    /// * `delay` - Time until delivery
    /// * `alarm` - Builds the alarm from the new slot generation
    ///
    /// # Returns
    ///
    /// The generation of the newly scheduled alarm
    pub fn replace<F: FnOnce(u64) -> AlarmMessage>(
        &mut self,
        scheduler: &dyn Scheduler,
        delay: Duration,
        alarm: F,
    ) -> u64 {
        self.cancel();
        self.generation += 1;

        let token = CancellationToken::new();
        scheduler.schedule(alarm(self.generation), delay, token.clone());
        self.active = Some(token);

        self.generation
    }

    /// Cancels the pending alarm, if any
    ///
    /// # Returns
    ///
    /// `true` if an alarm was pending
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Consumes a delivered alarm
    ///
    /// # Returns
    ///
    /// `true` if `generation` is the pending alarm of this slot, `false`
    /// for alarms that were cancelled or replaced in the meantime
    pub fn complete(&mut self, generation: u64) -> bool {
        if self.is_pending() && self.generation == generation {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Whether an alarm is pending
    pub fn is_pending(&self) -> bool {
        self.active.is_some()
    }
}

//! Per-question countdown
//!
//! The controller counts a timed question down one second per
//! [`AlarmMessage::TimerTick`]. Only one countdown runs at a time; starting
//! a new one cancels the previous tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schedule::{AlarmMessage, Scheduler, TaskSlot};

/// Interval between two countdown ticks
pub const TICK: Duration = Duration::from_secs(1);

/// Visual state of the countdown display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerColor {
    /// Plenty of time left
    #[default]
    Default,
    /// Less than half of the time left
    HalfwayOut,
    /// Less than a quarter of the time left
    AlmostOut,
}

/// Result of a delivered tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// The countdown continues, the next tick is scheduled
    Running {
        /// Seconds remaining
        seconds_left: u32,
        /// Display state after this tick
        color: TimerColor,
    },
    /// The countdown reached zero
    Expired {
        /// Display state at expiry
        color: TimerColor,
    },
}

/// Countdown for the active question
#[derive(Debug, Default)]
pub struct TimerController {
    total: u32,
    left: u32,
    color: TimerColor,
    slot: TaskSlot,
}

impl TimerController {
    /// Starts a countdown of `total` seconds, cancelling any running one
    ///
    /// # Returns
    ///
    /// The initial display: `total` seconds with the default color
    pub fn start(&mut self, total: u32, scheduler: &dyn Scheduler) -> (u32, TimerColor) {
        self.total = total;
        self.left = total;
        self.color = TimerColor::Default;
        self.schedule_tick(scheduler);

        (self.left, self.color)
    }

    /// Stops the countdown without expiring it
    ///
    /// # Returns
    ///
    /// `true` if a countdown was running
    pub fn stop(&mut self) -> bool {
        self.slot.cancel()
    }

    /// Whether a countdown is running
    pub fn is_running(&self) -> bool {
        self.slot.is_pending()
    }

    /// Seconds left on the current or last countdown
    pub fn seconds_left(&self) -> u32 {
        self.left
    }

    /// Handles a delivered tick
    ///
    /// # Returns
    ///
    /// `None` for ticks of a countdown that was stopped or replaced
    pub fn receive_tick(&mut self, generation: u64, scheduler: &dyn Scheduler) -> Option<Tick> {
        if !self.slot.complete(generation) {
            return None;
        }

        self.left = self.left.saturating_sub(1);
        self.color = Self::color_for(self.total, self.left, self.color);

        if self.left == 0 {
            Some(Tick::Expired { color: self.color })
        } else {
            self.schedule_tick(scheduler);
            Some(Tick::Running {
                seconds_left: self.left,
                color: self.color,
            })
        }
    }

    /// Display state for `left` seconds out of `total`
    ///
    /// Between the two thresholds the previous state is kept.
    fn color_for(total: u32, left: u32, previous: TimerColor) -> TimerColor {
        if left < total / 4 {
            TimerColor::AlmostOut
        } else if left < total / 2 && left > total / 4 {
            TimerColor::HalfwayOut
        } else {
            previous
        }
    }

    fn schedule_tick(&mut self, scheduler: &dyn Scheduler) {
        self.slot.replace(scheduler, TICK, |generation| {
            AlarmMessage::TimerTick { generation }
        });
    }
}

//! Observer registration for round events
//!
//! The UI collaborator subscribes one or more observers to the engine. Each
//! [`RoundEvent`] is delivered to every observer in subscription order.
//! Having nobody subscribed is not an error: the event is dropped with a
//! warning and the round carries on.

use std::fmt::Display;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::RoundEvent;

/// Receiver of round events
///
/// Implementations might render the event, play a sound, or forward it to
/// another task.
pub trait RoundObserver: Send {
    /// Handles one event
    fn notify(&self, event: &RoundEvent);
}

impl RoundObserver for tokio::sync::mpsc::UnboundedSender<RoundEvent> {
    fn notify(&self, event: &RoundEvent) {
        if self.send(event.clone()).is_err() {
            debug!(?event, "observer channel closed, event dropped");
        }
    }
}

/// Handle returned by [`Observers::subscribe`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordered set of subscribed observers
#[derive(Default)]
pub struct Observers {
    entries: Vec<(ObserverId, Box<dyn RoundObserver>)>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Observers {
    /// Adds an observer after all current ones
    pub fn subscribe<O: RoundObserver + 'static>(&mut self, observer: O) -> ObserverId {
        let id = ObserverId::new();
        self.entries.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer
    ///
    /// # Returns
    ///
    /// `false` if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Number of subscribed observers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delivers `event` to every observer in subscription order
    pub fn announce(&self, event: &RoundEvent) {
        if self.entries.is_empty() {
            warn!(?event, "no observer registered, event dropped");
            return;
        }
        for (_, observer) in &self.entries {
            observer.notify(event);
        }
    }
}

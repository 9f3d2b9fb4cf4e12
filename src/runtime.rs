//! Tokio driver for the round engine
//!
//! The engine lives inside a single task that drains one channel of
//! [`Command`]s. UI inputs arrive through a [`RuntimeHandle`]; alarms come
//! back from the [`TokioScheduler`], which sleeps on a spawned task until the
//! delay elapses or the alarm's token is cancelled. Because all mutation
//! happens on that one task, the engine needs no locking.

use std::time::Duration;

use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    engine::{Input, RoundEngine},
    schedule::{AlarmMessage, Scheduler},
};

/// Work item for the engine task
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::From)]
pub enum Command {
    /// A request from the UI
    Input(Input),
    /// A scheduled alarm that fired
    Alarm(AlarmMessage),
}

/// Scheduler sleeping on the tokio timer
///
/// It only holds a weak sender, so pending alarms never keep the engine task
/// alive once every [`RuntimeHandle`] is gone.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    commands: WeakUnboundedSender<Command>,
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, alarm: AlarmMessage, delay: Duration, cancel: CancellationToken) {
        let commands = self.commands.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => debug!(?alarm, "alarm cancelled"),
                () = tokio::time::sleep(delay) => {
                    if let Some(commands) = commands.upgrade() {
                        let _ = commands.send(alarm.into());
                    }
                }
            }
        });
    }
}

/// Sender of UI inputs to a running engine
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    commands: UnboundedSender<Command>,
}

impl RuntimeHandle {
    /// Queues `input` for the engine
    ///
    /// # Returns
    ///
    /// `false` if the engine task has stopped
    pub fn send(&self, input: Input) -> bool {
        self.commands.send(input.into()).is_ok()
    }
}

/// Owner of the command channel feeding an engine task
#[derive(Debug)]
pub struct GameRuntime {
    commands: UnboundedSender<Command>,
    pending: UnboundedReceiver<Command>,
}

impl Default for GameRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRuntime {
    /// Creates the command channel
    pub fn new() -> Self {
        let (commands, pending) = mpsc::unbounded_channel();
        Self { commands, pending }
    }

    /// Scheduler to build the engine with
    pub fn scheduler(&self) -> TokioScheduler {
        TokioScheduler {
            commands: self.commands.downgrade(),
        }
    }

    /// Handle for sending UI inputs
    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            commands: self.commands.clone(),
        }
    }

    /// Moves `engine` onto its own task and starts a session on `level`
    ///
    /// The task runs until [`Input::Quit`] is received or every
    /// [`RuntimeHandle`] is dropped, and hands the engine back when it ends.
    pub fn spawn(self, mut engine: RoundEngine, level: u32) -> JoinHandle<RoundEngine> {
        let Self {
            commands,
            mut pending,
        } = self;
        drop(commands);

        tokio::spawn(async move {
            // a failed start is logged by the engine, a restart may recover
            let _ = engine.start_round(level);

            while let Some(command) = pending.recv().await {
                match command {
                    Command::Input(Input::Quit) => {
                        engine.receive_input(Input::Quit);
                        break;
                    }
                    Command::Input(input) => engine.receive_input(input),
                    Command::Alarm(alarm) => engine.receive_alarm(alarm),
                }
            }

            info!(level = engine.level(), "game runtime stopped");
            engine
        })
    }
}

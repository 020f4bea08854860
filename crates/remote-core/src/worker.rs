//! Background thread per remote
//!
//! Each remote gets a dedicated thread that owns its [`RemoteCore`]. The
//! host sends lightweight commands over a bounded flume channel; the thread
//! handles them one at a time and, between commands, fires the hold-dimming
//! tick when its deadline passes. Nothing else touches the core, so no locks
//! are needed around the hold state.

use std::thread::JoinHandle;
use std::time::Instant;

use flume::{Receiver, RecvTimeoutError, Sender};

use crate::config::RemoteProfile;
use crate::dim_hold::IntervalTimer;
use crate::remote::RemoteCore;
use crate::types::ActionEvent;
use crate::RemoteError;

/// Commands accepted by a remote worker
#[derive(Debug)]
pub enum RemoteCommand {
    /// Action-string update from the event source
    Action(ActionEvent),
    /// Explicit command with reply
    Request {
        command: String,
        param: serde_yaml::Value,
        reply: Sender<Result<(), RemoteError>>,
    },
    /// Replace the remote's settings
    Reconfigure(RemoteProfile),
    /// Install the default button map
    LoadDefaultProfile,
    /// Stop the thread
    Shutdown,
}

/// Handle to a running remote thread
///
/// Dropping the handle stops the thread and waits for it.
pub struct RemoteWorker {
    name: String,
    command_tx: Sender<RemoteCommand>,
    handle: Option<JoinHandle<()>>,
}

impl RemoteWorker {
    /// Spawn a worker thread owning `core`
    pub fn spawn(core: RemoteCore<IntervalTimer>) -> Self {
        let (tx, rx) = flume::bounded::<RemoteCommand>(64);
        let name = core.name().to_string();

        let handle = std::thread::Builder::new()
            .name(format!("remote-{}", name))
            .spawn(move || {
                Self::run(rx, core);
            })
            .expect("Failed to spawn remote worker thread");

        Self {
            name,
            command_tx: tx,
            handle: Some(handle),
        }
    }

    fn run(rx: Receiver<RemoteCommand>, mut core: RemoteCore<IntervalTimer>) {
        log::info!("[remote {}] Worker started", core.name());

        loop {
            let received = match core.scheduler().next_due() {
                Some(due) => rx.recv_deadline(due),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(RemoteCommand::Shutdown) => break,
                Ok(command) => Self::handle(&mut core, command),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::info!("[remote {}] Channel disconnected, shutting down", core.name());
                    break;
                }
            }

            // A command may have disarmed or re-armed the timer; only fire if still due
            let now = Instant::now();
            if core.scheduler().is_due(now) {
                core.scheduler_mut().fire(now);
                core.tick();
            }
        }

        log::info!("[remote {}] Worker stopped", core.name());
    }

    fn handle(core: &mut RemoteCore<IntervalTimer>, command: RemoteCommand) {
        match command {
            RemoteCommand::Action(event) => {
                core.handle_event(&event);
            }
            RemoteCommand::Request {
                command,
                param,
                reply,
            } => {
                let result = core.request(&command, &param);
                if let Err(e) = &result {
                    log::warn!("[remote {}] Request '{}' rejected: {}", core.name(), command, e);
                }
                let _ = reply.send(result);
            }
            RemoteCommand::Reconfigure(profile) => core.reconfigure(profile),
            RemoteCommand::LoadDefaultProfile => core.load_default_profile(),
            RemoteCommand::Shutdown => {}
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, command: RemoteCommand) -> Result<(), RemoteError> {
        self.command_tx
            .send(command)
            .map_err(|_| RemoteError::WorkerStopped(self.name.clone()))
    }

    /// Deliver an action-string update (`onActionChanged`)
    pub fn action_changed(&self, event: ActionEvent) -> Result<(), RemoteError> {
        self.send(RemoteCommand::Action(event))
    }

    /// Run an explicit command and wait for the result
    pub fn request(&self, command: &str, param: serde_yaml::Value) -> Result<(), RemoteError> {
        let (reply_tx, reply_rx) = flume::bounded(1);
        self.send(RemoteCommand::Request {
            command: command.to_string(),
            param,
            reply: reply_tx,
        })?;
        reply_rx
            .recv()
            .map_err(|_| RemoteError::WorkerStopped(self.name.clone()))?
    }

    pub fn reconfigure(&self, profile: RemoteProfile) -> Result<(), RemoteError> {
        self.send(RemoteCommand::Reconfigure(profile))
    }

    pub fn load_default_profile(&self) -> Result<(), RemoteError> {
        self.send(RemoteCommand::LoadDefaultProfile)
    }
}

impl Drop for RemoteWorker {
    fn drop(&mut self) {
        let _ = self.command_tx.send(RemoteCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            log::debug!("[remote {}] Waiting for worker to stop...", self.name);
            let _ = handle.join();
        }
    }
}

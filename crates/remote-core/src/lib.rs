//! Wireless dimmer remote support
//!
//! This crate provides:
//! - Classification of free-form remote action strings into (button, gesture)
//! - Hold-duration confirmation of long presses
//! - Configurable button-to-action mapping with a built-in fallback
//! - Light commands: switching, dim steps, hold-to-dim, color temperature cycling
//! - Automation zone override with visual feedback
//! - One worker thread per remote, fed through a flume channel
//!
//! # Architecture
//!
//! ```text
//! event source → RemoteWorker (flume) → RemoteCore::handle_event
//!                                          → classify → MappingTable → ActionDispatcher
//!                                                                         → LightControl
//! ```
//!
//! The light backend is abstract ([`LightControl`], [`AutomationZone`]).
//! [`MemoryLights`] is an in-memory implementation for simulation and tests.

mod classifier;
mod color_temp;
mod config;
mod dim_hold;
mod dispatch;
mod feedback;
mod mapping;
mod memory;
mod remote;
mod targets;
mod types;
mod worker;

pub use classifier::{classify, confirm_long};
pub use color_temp::{cycle as cycle_color_temp, detect_slot, ColorTempLadder};
pub use config::{default_config_path, load_config, save_config, RemoteProfile, RemotesConfig};
pub use dim_hold::{DimDirection, DimHoldController, IntervalTimer, Scheduler, DIM_HOLD_INTERVAL};
pub use dispatch::{Action, ActionDispatcher, DispatchContext};
pub use feedback::{visual_feedback, Pacing};
pub use mapping::{default_profile, ActionType, MappingRule, MappingTable, UnknownActionType};
pub use memory::{MemoryLights, MemoryZone, VariableValue, Write as MemoryWrite};
pub use remote::{DropReason, EventOutcome, RemoteCore};
pub use targets::{AutomationZone, EventLog, LightControl, TargetError, MAX_EVENT_LOG_LINES};
pub use types::{
    ActionEvent, Button, ClassifiedGesture, Gesture, LightTarget, VariableRef, ZoneRef,
};
pub use worker::{RemoteCommand, RemoteWorker};

/// Error type for requests made directly to a remote
///
/// Mapped button events never return errors; their failures are logged and
/// the event is dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(#[from] UnknownActionType),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Remote '{0}' is not running")]
    WorkerStopped(String),
}

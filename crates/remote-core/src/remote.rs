//! Per-remote event pipeline
//!
//! ```text
//! action string → classify → (long? duration gate) → mapping table → dispatcher
//!                                                                   ├─ light commands
//!                                                                   ├─ color temp cycle
//!                                                                   └─ dim hold start/stop
//! ```
//!
//! `RemoteCore` owns all mutable state of one remote. Every entry point
//! takes `&mut self`, so event handling, hold ticks and reconfiguration are
//! serialized by construction.

use crate::classifier::{classify, confirm_long};
use crate::config::RemoteProfile;
use crate::dim_hold::{DimDirection, DimHoldController, IntervalTimer, Scheduler};
use crate::dispatch::{Action, ActionDispatcher, DispatchContext};
use crate::feedback::Pacing;
use crate::mapping::{default_profile, ActionType, MappingTable};
use crate::targets::LightControl;
use crate::types::{ActionEvent, Button, Gesture};
use crate::RemoteError;
use std::sync::Arc;

/// Why an event didn't lead to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No button or gesture pattern matched
    Unrecognized,
    /// Long-press candidate held shorter than the threshold
    TooShort,
    /// No mapping rule for this (button, gesture)
    NoRule,
    /// The matching rule names an unknown action or carries a bad parameter
    InvalidRule,
}

/// Result of handling one action event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Dispatched {
        button: Button,
        gesture: Gesture,
        action: ActionType,
    },
    Dropped(DropReason),
}

/// State owner for one remote
pub struct RemoteCore<S: Scheduler = IntervalTimer> {
    profile: RemoteProfile,
    table: MappingTable,
    lights: Arc<dyn LightControl>,
    dispatcher: ActionDispatcher,
    dim_hold: DimHoldController<S>,
}

impl RemoteCore<IntervalTimer> {
    /// Create a remote driven by the worker's interval timer
    pub fn new(profile: RemoteProfile, lights: Arc<dyn LightControl>) -> Self {
        Self::with_scheduler(profile, lights, IntervalTimer::new())
    }
}

impl<S: Scheduler> RemoteCore<S> {
    pub fn with_scheduler(profile: RemoteProfile, lights: Arc<dyn LightControl>, scheduler: S) -> Self {
        let table = MappingTable::new(profile.button_map.clone());
        Self {
            profile,
            table,
            lights,
            dispatcher: ActionDispatcher::default(),
            dim_hold: DimHoldController::new(scheduler),
        }
    }

    /// Override the visual feedback pacing
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.dispatcher = ActionDispatcher::new(pacing);
        self
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &RemoteProfile {
        &self.profile
    }

    pub fn mapping_table(&self) -> &MappingTable {
        &self.table
    }

    pub fn dim_direction(&self) -> Option<DimDirection> {
        self.dim_hold.direction()
    }

    pub fn scheduler(&self) -> &S {
        self.dim_hold.scheduler()
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        self.dim_hold.scheduler_mut()
    }

    /// Handle an action-string update from the event source
    pub fn handle_event(&mut self, event: &ActionEvent) -> EventOutcome {
        let classified = classify(&event.raw);
        let Some((button, gesture)) = classified.resolved() else {
            log::debug!(
                "[remote {}] Ignoring action '{}' ({:?})",
                self.profile.name,
                event.raw,
                classified
            );
            return EventOutcome::Dropped(DropReason::Unrecognized);
        };

        if gesture == Gesture::Long
            && !confirm_long(event.observed_duration_secs, self.profile.hold_threshold_secs)
        {
            log::debug!(
                "[remote {}] '{}' held {:.2}s, below {:.2}s threshold",
                self.profile.name,
                event.raw,
                event.observed_duration_secs,
                self.profile.hold_threshold_secs
            );
            return EventOutcome::Dropped(DropReason::TooShort);
        }

        let Some(rule) = self.table.resolve(button, gesture) else {
            log::debug!(
                "[remote {}] No mapping for {:?}+{:?}",
                self.profile.name,
                button,
                gesture
            );
            return EventOutcome::Dropped(DropReason::NoRule);
        };

        let action = match rule
            .action_type()
            .map_err(RemoteError::from)
            .and_then(|action_type| Action::from_parts(action_type, &rule.param))
        {
            Ok(action) => action,
            Err(e) => {
                log::warn!(
                    "[remote {}] Rule for {:?}+{:?} not executed: {}",
                    self.profile.name,
                    button,
                    gesture,
                    e
                );
                return EventOutcome::Dropped(DropReason::InvalidRule);
            }
        };

        log::info!(
            "[remote {}] {:?}+{:?} → {}",
            self.profile.name,
            button,
            gesture,
            action.action_type()
        );
        self.run(action);
        EventOutcome::Dispatched {
            button,
            gesture,
            action: action.action_type(),
        }
    }

    /// Execute an explicit command outside the button map
    ///
    /// Unlike mapped events, a bad command or parameter is returned to the
    /// caller instead of being logged and dropped.
    pub fn request(&mut self, command: &str, param: &serde_yaml::Value) -> Result<(), RemoteError> {
        let action_type: ActionType = command.parse()?;
        let action = Action::from_parts(action_type, param)?;
        log::info!("[remote {}] Direct request {}", self.profile.name, action_type);
        self.run(action);
        Ok(())
    }

    /// One hold-dimming step
    pub fn tick(&mut self) {
        self.dim_hold.tick(
            self.lights.as_ref(),
            &self.profile.targets,
            self.profile.hold_dim_step,
        );
    }

    /// Apply new settings
    ///
    /// Any active hold is stopped first; a hold never survives a reconfiguration.
    pub fn reconfigure(&mut self, profile: RemoteProfile) {
        self.dim_hold.reset();
        self.table = MappingTable::new(profile.button_map.clone());
        self.profile = profile;
        log::info!(
            "[remote {}] Reconfigured ({} targets, {} rules)",
            self.profile.name,
            self.profile.targets.len(),
            self.table.rules().len()
        );
    }

    /// Replace the button map with the nine-rule default profile
    pub fn load_default_profile(&mut self) {
        let mut profile = self.profile.clone();
        profile.button_map = default_profile(profile.short_dim_step);
        self.reconfigure(profile);
    }

    fn run(&mut self, action: Action) {
        let ctx = DispatchContext {
            lights: self.lights.as_ref(),
            profile: &self.profile,
        };
        self.dispatcher.dispatch(action, &ctx, &mut self.dim_hold);
    }
}

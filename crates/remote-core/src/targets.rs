//! Light backend interface and best-effort batch helpers
//!
//! The core never talks to lights directly. Everything goes through
//! [`LightControl`], whose calls may fail at any time (bulb unplugged,
//! stale variable id). Batch operations skip failing targets and carry on so
//! one offline lamp never makes the remote useless.

use crate::types::{LightTarget, VariableRef, ZoneRef};
use std::collections::VecDeque;

/// Maximum number of lines kept in an automation zone's event log
pub const MAX_EVENT_LOG_LINES: usize = 20;

/// Failure of a single light-backend call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("variable {0} is unreachable")]
    Unreachable(VariableRef),

    #[error("variable {0} does not exist")]
    InvalidReference(VariableRef),

    #[error("{0} is unreachable")]
    ZoneUnreachable(ZoneRef),
}

/// Light-control backend
///
/// Implementations are shared between the host and the remote worker
/// threads, so every call takes `&self`.
pub trait LightControl: Send + Sync {
    fn switch_state(&self, var: VariableRef) -> Result<bool, TargetError>;
    fn set_switch_state(&self, var: VariableRef, on: bool) -> Result<(), TargetError>;

    /// Dim level in percent (0-100)
    fn dim_level(&self, var: VariableRef) -> Result<u8, TargetError>;
    fn set_dim_level(&self, var: VariableRef, level: u8) -> Result<(), TargetError>;

    /// Color temperature in the backend's unit (mired for Hue bulbs)
    fn color_temp(&self, var: VariableRef) -> Result<u32, TargetError>;
    fn set_color_temp(&self, var: VariableRef, value: u32) -> Result<(), TargetError>;

    /// Resolve an automation zone living in the same backend
    fn automation_zone(&self, _zone: ZoneRef) -> Option<&dyn AutomationZone> {
        None
    }
}

/// Presence-based lighting automation that a remote can override
pub trait AutomationZone: Send + Sync {
    fn set_enabled(&self, enabled: bool) -> Result<(), TargetError>;

    /// Lights the zone controls
    fn light_targets(&self) -> Result<Vec<LightTarget>, TargetError>;

    /// Append a line to the zone's event log, keeping the last
    /// [`MAX_EVENT_LOG_LINES`] lines
    fn append_event_log(&self, line: &str) -> Result<(), TargetError>;
}

/// Unwrap a backend result, logging and discarding failures
pub fn best_effort<T>(what: &str, result: Result<T, TargetError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{}: skipped ({})", what, e);
            None
        }
    }
}

/// Clamp `current + delta` to the 0-100 dim range
pub fn clamp_dim(current: u8, delta: i32) -> u8 {
    (i32::from(current) + delta).clamp(0, 100) as u8
}

/// Switch every target with a switch reference on or off
pub fn switch_all(lights: &dyn LightControl, targets: &[LightTarget], on: bool) {
    for var in targets.iter().filter_map(|t| t.switch) {
        best_effort("set switch", lights.set_switch_state(var, on));
    }
}

/// Whether any reachable target reports "on"
pub fn any_on(lights: &dyn LightControl, targets: &[LightTarget]) -> bool {
    targets
        .iter()
        .filter_map(|t| t.switch)
        .any(|var| best_effort("read switch", lights.switch_state(var)).unwrap_or(false))
}

/// Apply a relative dim step to every target with a dimmer reference
pub fn step_dim_all(lights: &dyn LightControl, targets: &[LightTarget], delta: i32) {
    for var in targets.iter().filter_map(|t| t.dimmer) {
        let Some(current) = best_effort("read dimmer", lights.dim_level(var)) else {
            continue;
        };
        let next = clamp_dim(current, delta);
        if next != current {
            best_effort("set dimmer", lights.set_dim_level(var, next));
        }
    }
}

/// Capped, oldest-first event log for automation zones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    lines: VecDeque<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, dropping the oldest beyond [`MAX_EVENT_LOG_LINES`]
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
        while self.lines.len() > MAX_EVENT_LOG_LINES {
            self.lines.pop_front();
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Newline-joined text, for backends that store the log as one string
    pub fn to_text(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }

    /// Rebuild from newline-joined text, applying the cap
    pub fn from_text(text: &str) -> Self {
        let mut log = Self::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            log.push(line);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLights;

    #[test]
    fn test_clamp_dim() {
        assert_eq!(clamp_dim(90, 20), 100);
        assert_eq!(clamp_dim(10, -20), 0);
        assert_eq!(clamp_dim(50, 3), 53);
        assert_eq!(clamp_dim(100, 0), 100);
    }

    #[test]
    fn test_event_log_cap() {
        let mut log = EventLog::new();
        for i in 0..25 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.len(), MAX_EVENT_LOG_LINES);
        assert_eq!(log.lines().next(), Some("line 5"));
        assert_eq!(log.lines().last(), Some("line 24"));
    }

    #[test]
    fn test_event_log_text() {
        let log = EventLog::from_text("a\n\nb\nc\n");
        assert_eq!(log.len(), 3);
        assert_eq!(log.to_text(), "a\nb\nc");
    }

    #[test]
    fn test_switch_all_skips_unreachable() {
        let lights = MemoryLights::new();
        lights.insert_switch(VariableRef(1), true);
        lights.insert_switch(VariableRef(2), true);
        lights.insert_switch(VariableRef(3), true);
        lights.set_unreachable(VariableRef(2), true);

        let targets = [
            LightTarget::switch(1),
            LightTarget::switch(2),
            LightTarget::switch(3),
            LightTarget::default(),
        ];
        switch_all(&lights, &targets, false);

        assert_eq!(lights.switch(VariableRef(1)), Some(false));
        assert_eq!(lights.switch(VariableRef(3)), Some(false));
        lights.set_unreachable(VariableRef(2), false);
        assert_eq!(lights.switch(VariableRef(2)), Some(true));
    }

    #[test]
    fn test_any_on() {
        let lights = MemoryLights::new();
        lights.insert_switch(VariableRef(1), false);
        lights.insert_switch(VariableRef(2), true);
        let targets = [LightTarget::switch(1), LightTarget::switch(2)];
        assert!(any_on(&lights, &targets));

        lights.set_unreachable(VariableRef(2), true);
        assert!(!any_on(&lights, &targets));
    }

    #[test]
    fn test_step_dim_all() {
        let lights = MemoryLights::new();
        lights.insert_dimmer(VariableRef(10), 90);
        lights.insert_dimmer(VariableRef(11), 5);
        let targets = [LightTarget::full(0, 10, 0), LightTarget::full(0, 11, 0)];

        step_dim_all(&lights, &targets, 20);
        assert_eq!(lights.dimmer(VariableRef(10)), Some(100));
        assert_eq!(lights.dimmer(VariableRef(11)), Some(25));

        step_dim_all(&lights, &targets, -30);
        assert_eq!(lights.dimmer(VariableRef(10)), Some(70));
        assert_eq!(lights.dimmer(VariableRef(11)), Some(0));
    }
}

//! In-memory light backend
//!
//! Backs the simulator and the tests. Variables live in a mutex-guarded
//! map; any variable can be marked unreachable to exercise the skip-on-error
//! paths. Every successful write is recorded in order.

use crate::targets::{AutomationZone, EventLog, LightControl, TargetError};
use crate::types::{LightTarget, VariableRef, ZoneRef};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Value stored in a simulated variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableValue {
    Switch(bool),
    Dimmer(u8),
    ColorTemp(u32),
}

/// A recorded write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub var: VariableRef,
    pub value: VariableValue,
}

#[derive(Debug, Default)]
struct Variables {
    values: HashMap<VariableRef, VariableValue>,
    unreachable: HashSet<VariableRef>,
    writes: Vec<Write>,
}

impl Variables {
    fn read(&self, var: VariableRef) -> Result<VariableValue, TargetError> {
        if self.unreachable.contains(&var) {
            return Err(TargetError::Unreachable(var));
        }
        self.values
            .get(&var)
            .copied()
            .ok_or(TargetError::InvalidReference(var))
    }

    fn write(&mut self, var: VariableRef, value: VariableValue) -> Result<(), TargetError> {
        let current = self.read(var)?;
        if std::mem::discriminant(&current) != std::mem::discriminant(&value) {
            return Err(TargetError::InvalidReference(var));
        }
        self.values.insert(var, value);
        self.writes.push(Write { var, value });
        Ok(())
    }
}

/// Simulated automation zone
#[derive(Debug)]
pub struct MemoryZone {
    zone: ZoneRef,
    enabled: Mutex<bool>,
    targets: Vec<LightTarget>,
    log: Mutex<EventLog>,
}

impl MemoryZone {
    pub fn is_enabled(&self) -> bool {
        self.enabled.lock().map(|e| *e).unwrap_or(false)
    }

    pub fn event_log(&self) -> Vec<String> {
        self.log
            .lock()
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

impl AutomationZone for MemoryZone {
    fn set_enabled(&self, enabled: bool) -> Result<(), TargetError> {
        let mut state = self
            .enabled
            .lock()
            .map_err(|_| TargetError::ZoneUnreachable(self.zone))?;
        *state = enabled;
        Ok(())
    }

    fn light_targets(&self) -> Result<Vec<LightTarget>, TargetError> {
        Ok(self.targets.clone())
    }

    fn append_event_log(&self, line: &str) -> Result<(), TargetError> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| TargetError::ZoneUnreachable(self.zone))?;
        log.push(line);
        Ok(())
    }
}

/// Mutex-backed [`LightControl`] implementation
#[derive(Debug, Default)]
pub struct MemoryLights {
    vars: Mutex<Variables>,
    zones: HashMap<ZoneRef, MemoryZone>,
}

impl MemoryLights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an automation zone controlling `targets`
    pub fn add_zone(&mut self, zone: ZoneRef, enabled: bool, targets: Vec<LightTarget>) {
        self.zones.insert(
            zone,
            MemoryZone {
                zone,
                enabled: Mutex::new(enabled),
                targets,
                log: Mutex::new(EventLog::new()),
            },
        );
    }

    pub fn zone(&self, zone: ZoneRef) -> Option<&MemoryZone> {
        self.zones.get(&zone)
    }

    pub fn insert_switch(&self, var: VariableRef, on: bool) {
        self.insert(var, VariableValue::Switch(on));
    }

    pub fn insert_dimmer(&self, var: VariableRef, level: u8) {
        self.insert(var, VariableValue::Dimmer(level));
    }

    pub fn insert_color_temp(&self, var: VariableRef, value: u32) {
        self.insert(var, VariableValue::ColorTemp(value));
    }

    /// Create every variable a target references, keeping existing values
    pub fn seed_target(&self, target: &LightTarget, color_temp: u32) {
        if let Ok(mut vars) = self.vars.lock() {
            if let Some(var) = target.switch {
                vars.values.entry(var).or_insert(VariableValue::Switch(false));
            }
            if let Some(var) = target.dimmer {
                vars.values.entry(var).or_insert(VariableValue::Dimmer(0));
            }
            if let Some(var) = target.color_temp {
                vars.values
                    .entry(var)
                    .or_insert(VariableValue::ColorTemp(color_temp));
            }
        }
    }

    fn insert(&self, var: VariableRef, value: VariableValue) {
        if let Ok(mut vars) = self.vars.lock() {
            vars.values.insert(var, value);
        }
    }

    /// Make reads and writes of `var` fail
    pub fn set_unreachable(&self, var: VariableRef, unreachable: bool) {
        if let Ok(mut vars) = self.vars.lock() {
            if unreachable {
                vars.unreachable.insert(var);
            } else {
                vars.unreachable.remove(&var);
            }
        }
    }

    /// Stored value, ignoring reachability
    pub fn value(&self, var: VariableRef) -> Option<VariableValue> {
        self.vars.lock().ok()?.values.get(&var).copied()
    }

    pub fn switch(&self, var: VariableRef) -> Option<bool> {
        match self.value(var)? {
            VariableValue::Switch(on) => Some(on),
            _ => None,
        }
    }

    pub fn dimmer(&self, var: VariableRef) -> Option<u8> {
        match self.value(var)? {
            VariableValue::Dimmer(level) => Some(level),
            _ => None,
        }
    }

    pub fn color_temp_value(&self, var: VariableRef) -> Option<u32> {
        match self.value(var)? {
            VariableValue::ColorTemp(value) => Some(value),
            _ => None,
        }
    }

    /// All variables sorted by reference
    pub fn snapshot(&self) -> Vec<(VariableRef, VariableValue)> {
        let mut all: Vec<_> = self
            .vars
            .lock()
            .map(|vars| vars.values.iter().map(|(k, v)| (*k, *v)).collect())
            .unwrap_or_default();
        all.sort_by_key(|(var, _)| *var);
        all
    }

    /// Writes recorded so far
    pub fn writes(&self) -> Vec<Write> {
        self.vars
            .lock()
            .map(|vars| vars.writes.clone())
            .unwrap_or_default()
    }

    pub fn clear_writes(&self) {
        if let Ok(mut vars) = self.vars.lock() {
            vars.writes.clear();
        }
    }

    fn read(&self, var: VariableRef) -> Result<VariableValue, TargetError> {
        self.vars
            .lock()
            .map_err(|_| TargetError::Unreachable(var))?
            .read(var)
    }

    fn write(&self, var: VariableRef, value: VariableValue) -> Result<(), TargetError> {
        self.vars
            .lock()
            .map_err(|_| TargetError::Unreachable(var))?
            .write(var, value)
    }
}

impl LightControl for MemoryLights {
    fn switch_state(&self, var: VariableRef) -> Result<bool, TargetError> {
        match self.read(var)? {
            VariableValue::Switch(on) => Ok(on),
            _ => Err(TargetError::InvalidReference(var)),
        }
    }

    fn set_switch_state(&self, var: VariableRef, on: bool) -> Result<(), TargetError> {
        self.write(var, VariableValue::Switch(on))
    }

    fn dim_level(&self, var: VariableRef) -> Result<u8, TargetError> {
        match self.read(var)? {
            VariableValue::Dimmer(level) => Ok(level),
            _ => Err(TargetError::InvalidReference(var)),
        }
    }

    fn set_dim_level(&self, var: VariableRef, level: u8) -> Result<(), TargetError> {
        self.write(var, VariableValue::Dimmer(level.min(100)))
    }

    fn color_temp(&self, var: VariableRef) -> Result<u32, TargetError> {
        match self.read(var)? {
            VariableValue::ColorTemp(value) => Ok(value),
            _ => Err(TargetError::InvalidReference(var)),
        }
    }

    fn set_color_temp(&self, var: VariableRef, value: u32) -> Result<(), TargetError> {
        self.write(var, VariableValue::ColorTemp(value))
    }

    fn automation_zone(&self, zone: ZoneRef) -> Option<&dyn AutomationZone> {
        self.zones.get(&zone).map(|z| z as &dyn AutomationZone)
    }
}

//! Hold-to-dim controller
//!
//! While an up/down rocker is held the remote only reports "hold started"
//! and, eventually, "hold released". Between the two the controller steps
//! every dimmer on a fixed 150 ms tick.
//!
//! ```text
//!            start(dir)                 stop() / reset()
//!   Idle ───────────────► Holding(dir) ──────────────────► Idle
//!                          │    ▲
//!                          └────┘ tick: step dimmers by ±hold_step
//! ```
//!
//! The tick itself comes from a [`Scheduler`]. In a running remote that's the
//! worker's [`IntervalTimer`], polled from the same loop that handles events,
//! so ticks never overlap event handling.

use crate::targets::{step_dim_all, LightControl};
use crate::types::LightTarget;
use std::time::{Duration, Instant};

/// Fixed interval between hold-dimming steps
pub const DIM_HOLD_INTERVAL: Duration = Duration::from_millis(150);

/// Direction of a dimming hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimDirection {
    Up,
    Down,
}

impl DimDirection {
    pub fn sign(&self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Parse a direction token ("up"/"down") or signed integer
    ///
    /// `Ok(None)` means the parameter resolved to zero (no movement).
    pub fn from_param(param: &serde_yaml::Value) -> Result<Option<Self>, String> {
        let number = match param {
            serde_yaml::Value::String(s) => match s.trim().to_lowercase().as_str() {
                "up" | "+" => return Ok(Some(Self::Up)),
                "down" | "-" => return Ok(Some(Self::Down)),
                other => other
                    .parse::<i64>()
                    .map_err(|_| format!("invalid dim direction '{}'", s))?,
            },
            serde_yaml::Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| format!("invalid dim direction {}", n))?,
            other => return Err(format!("invalid dim direction {:?}", other)),
        };
        Ok(match number.signum() {
            1 => Some(Self::Up),
            -1 => Some(Self::Down),
            _ => None,
        })
    }
}

/// Periodic tick source
pub trait Scheduler {
    /// Start (or restart) periodic ticks at `interval`
    fn arm_periodic(&mut self, interval: Duration);
    /// Stop periodic ticks
    fn disarm_periodic(&mut self);
    fn is_armed(&self) -> bool;
}

/// Deadline-based scheduler polled by the remote worker loop
#[derive(Debug, Clone, Default)]
pub struct IntervalTimer {
    interval: Option<Duration>,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// When the next tick is due, if armed
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Whether a tick is due at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| due <= now)
    }

    /// Record a tick firing at `now` and schedule the next one
    ///
    /// Late ticks are not caught up: the next deadline is measured from
    /// `now` when the previous one was missed, so ticks never stack.
    pub fn fire(&mut self, now: Instant) {
        if let (Some(interval), Some(due)) = (self.interval, self.next_due) {
            let next = due + interval;
            self.next_due = Some(if next <= now { now + interval } else { next });
        }
    }
}

impl Scheduler for IntervalTimer {
    fn arm_periodic(&mut self, interval: Duration) {
        self.interval = Some(interval);
        self.next_due = Some(Instant::now() + interval);
    }

    fn disarm_periodic(&mut self) {
        self.interval = None;
        self.next_due = None;
    }

    fn is_armed(&self) -> bool {
        self.interval.is_some()
    }
}

/// Hold-to-dim state machine
#[derive(Debug)]
pub struct DimHoldController<S: Scheduler> {
    direction: Option<DimDirection>,
    scheduler: S,
}

impl<S: Scheduler> DimHoldController<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            direction: None,
            scheduler,
        }
    }

    /// Current hold direction (`None` = idle)
    pub fn direction(&self) -> Option<DimDirection> {
        self.direction
    }

    pub fn is_holding(&self) -> bool {
        self.direction.is_some()
    }

    /// Start holding, replacing any direction already active
    pub fn start(&mut self, direction: DimDirection) {
        self.direction = Some(direction);
        self.scheduler.arm_periodic(DIM_HOLD_INTERVAL);
    }

    /// Stop holding
    pub fn stop(&mut self) {
        self.direction = None;
        self.scheduler.disarm_periodic();
    }

    /// Force idle before a reconfiguration is applied
    pub fn reset(&mut self) {
        if self.direction.is_some() {
            log::debug!("Dim hold cancelled by reconfiguration");
        }
        self.stop();
    }

    /// One periodic step
    ///
    /// A tick that races a stop finds the controller idle, does nothing and
    /// disarms the scheduler again.
    pub fn tick(&mut self, lights: &dyn LightControl, targets: &[LightTarget], hold_step: u8) {
        let Some(direction) = self.direction else {
            self.scheduler.disarm_periodic();
            return;
        };
        let step = i32::from(hold_step.max(1)) * direction.sign();
        step_dim_all(lights, targets, step);
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

//! Schedule policy and periodic task timing.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   SchedulePolicy::resolve                    │
//! │                                                              │
//! │  ┌──────────────┐   forces backup on?   ┌─────────────────┐  │
//! │  │ FailoverRule │──────── yes ─────────▶│ Level(true)     │  │
//! │  └──────┬───────┘                       └─────────────────┘  │
//! │         │ no                                                 │
//! │         ▼                                                    │
//! │  ┌──────────────┐  Windowed  ┌─────────────────────────────┐ │
//! │  │ desired_auto │───────────▶│ Level(in window || pulse)   │ │
//! │  │              │  Cycled    ├─────────────────────────────┤ │
//! │  │              │───────────▶│ DutyCycle (orchestrator)    │ │
//! │  └──────────────┘            └─────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The policy itself is stateless.  The stateful parts of scheduling,
//! the air pump's [`DutyCycle`] and the orchestrator's [`Cadence`]
//! records, live beside it and are owned by the control service.

use serde::{Deserialize, Serialize};

use crate::control::ActuatorId;

// ═══════════════════════════════════════════════════════════════
//  Daily windows
// ═══════════════════════════════════════════════════════════════

/// A daily run window with an optional once-per-hour pulse outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWindow {
    /// First hour of the continuous window (0-23 inclusive).
    pub start_hour: u8,
    /// First hour after the window (0-23, exclusive).
    pub end_hour: u8,
    /// Minute of every hour at which the actuator pulses on outside the
    /// window, if any.
    pub pulse_minute: Option<u8>,
}

impl DailyWindow {
    /// Whether `hour` falls inside the continuous window.
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            // Wraps around midnight, e.g. 22..4.
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// Desired state at `hour:minute`.
    pub fn desired(&self, hour: u8, minute: u8) -> bool {
        self.contains(hour) || self.pulse_minute == Some(minute)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Policy
// ═══════════════════════════════════════════════════════════════

/// Which schedule layout the rig runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScheduleVersion {
    /// Pump 1 mornings, Pump 2 afternoons, Pump 2 covers for an alarmed Pump 1.
    #[default]
    SplitShift,
    /// Single-pump layout: Pump 1 from 06:00 through 18:59, Pump 2 idle.
    SingleShift,
}

/// Auto-mode target for one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoTarget {
    /// Drive to this level.
    Level(bool),
    /// Not time-windowed; follows the orchestrator's duty cycle.
    DutyCycle,
}

/// How an actuator is scheduled in auto mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleRule {
    Windowed(DailyWindow),
    /// Never scheduled on.
    Idle,
    Cycled,
}

/// Cross-actuator coupling: while `primary` is inside its continuous
/// window and alarmed, `backup` is forced on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailoverRule {
    pub primary: ActuatorId,
    pub backup: ActuatorId,
}

/// Maps (actuator, time of day) to the auto-mode target.
#[derive(Debug, Clone)]
pub struct SchedulePolicy {
    rules: [ScheduleRule; ActuatorId::COUNT],
    failover: Option<FailoverRule>,
}

impl SchedulePolicy {
    pub fn for_version(version: ScheduleVersion) -> Self {
        match version {
            ScheduleVersion::SplitShift => Self {
                rules: [
                    ScheduleRule::Windowed(DailyWindow {
                        start_hour: 6,
                        end_hour: 12,
                        pulse_minute: Some(0),
                    }),
                    ScheduleRule::Windowed(DailyWindow {
                        start_hour: 12,
                        end_hour: 18,
                        pulse_minute: Some(30),
                    }),
                    ScheduleRule::Cycled,
                ],
                failover: Some(FailoverRule {
                    primary: ActuatorId::Pump1,
                    backup: ActuatorId::Pump2,
                }),
            },
            ScheduleVersion::SingleShift => Self {
                rules: [
                    ScheduleRule::Windowed(DailyWindow {
                        start_hour: 6,
                        end_hour: 19,
                        pulse_minute: Some(0),
                    }),
                    ScheduleRule::Idle,
                    ScheduleRule::Cycled,
                ],
                failover: None,
            },
        }
    }

    pub fn rule(&self, id: ActuatorId) -> ScheduleRule {
        self.rules[id.index()]
    }

    pub fn failover(&self) -> Option<FailoverRule> {
        self.failover
    }

    /// Pure time-of-day target, without cross-actuator coupling.
    pub fn desired_auto(&self, id: ActuatorId, hour: u8, minute: u8) -> AutoTarget {
        match self.rule(id) {
            ScheduleRule::Windowed(w) => AutoTarget::Level(w.desired(hour, minute)),
            ScheduleRule::Idle => AutoTarget::Level(false),
            ScheduleRule::Cycled => AutoTarget::DutyCycle,
        }
    }

    /// Whether the failover rule forces `id` on at `hour`.
    pub fn failover_forces(&self, id: ActuatorId, hour: u8, is_alarmed: impl Fn(ActuatorId) -> bool) -> bool {
        let Some(rule) = self.failover else {
            return false;
        };
        if rule.backup != id {
            return false;
        }
        let primary_in_window = match self.rule(rule.primary) {
            ScheduleRule::Windowed(w) => w.contains(hour),
            _ => false,
        };
        primary_in_window && is_alarmed(rule.primary)
    }

    /// Auto target with the failover rule evaluated before the actuator's
    /// own schedule.
    pub fn resolve(
        &self,
        id: ActuatorId,
        hour: u8,
        minute: u8,
        is_alarmed: impl Fn(ActuatorId) -> bool,
    ) -> AutoTarget {
        if self.failover_forces(id, hour, is_alarmed) {
            return AutoTarget::Level(true);
        }
        self.desired_auto(id, hour, minute)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Duty cycle
// ═══════════════════════════════════════════════════════════════

/// Fixed-period on/off toggling for actuators that are not time-windowed.
///
/// The cycle starts (or restarts) in its on phase the first time it is
/// evaluated, then flips the actuator's last commanded value every
/// `period_secs`.
#[derive(Debug, Clone)]
pub struct DutyCycle {
    period_secs: u64,
    next_toggle: Option<u64>,
}

impl DutyCycle {
    pub fn new(period_secs: u64) -> Self {
        Self {
            period_secs,
            next_toggle: None,
        }
    }

    /// Phase the actuator should hold at `now`, given its current command.
    pub fn phase(&mut self, current: bool, now_epoch: u64) -> bool {
        match self.next_toggle {
            None => {
                self.next_toggle = Some(now_epoch.saturating_add(self.period_secs));
                true
            }
            Some(due) if now_epoch >= due => {
                self.next_toggle = Some(now_epoch.saturating_add(self.period_secs));
                !current
            }
            Some(_) => current,
        }
    }

    /// Forget the running cycle; the next evaluation starts in the on phase.
    pub fn restart(&mut self) {
        self.next_toggle = None;
    }

    pub fn next_toggle(&self) -> Option<u64> {
        self.next_toggle
    }
}

// ═══════════════════════════════════════════════════════════════
//  Cadence
// ═══════════════════════════════════════════════════════════════

/// Schedule record for one periodic task inside the control tick.
#[derive(Debug, Clone)]
pub struct Cadence {
    period_ms: u64,
    next_due_ms: u64,
}

impl Cadence {
    /// A cadence that is due on its first check.
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            next_due_ms: 0,
        }
    }

    /// Returns `true` (and advances) if the task is due at `now_ms`.
    pub fn due(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms = self.next_due_ms.saturating_add(self.period_ms);
        if self.next_due_ms <= now_ms {
            // Fell more than a period behind; don't burst to catch up.
            self.next_due_ms = now_ms.saturating_add(self.period_ms);
        }
        true
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

//! Fault monitor.
//!
//! Runs **every tick after the actuator authorities** and compares each
//! actuator's commanded state with its sensed current draw.
//!
//! ## Alarm lifecycle
//!
//! ```text
//!            mismatch                  mismatch && now >= deadline
//!   Clear ─────────────▶ Timing{deadline} ─────────────────────────▶ Alarmed
//!     ▲                        │                                       │
//!     └──────── agree ─────────┴───────────────── agree ───────────────┘
//! ```
//!
//! 1. A mismatch starts a debounce timer (`deadline = now + debounce`).
//!    The delay absorbs pump spin-up current ramp and single noisy windows.
//! 2. If the mismatch is still present at or after the deadline, the alarm
//!    is raised and the deadline is dropped.
//! 3. An alarmed actuator stays alarmed while the mismatch persists; it
//!    does not re-time.
//! 4. The moment command and status agree the state returns to `Clear`,
//!    with no cooldown.
//!
//! Only transitions into `Alarmed` and from `Alarmed` back to `Clear`
//! are reported to the caller; a timer that is cancelled is silent.

use core::fmt::Write;

use log::{debug, error, info};

use crate::control::authority::on_off;
use crate::control::{ActuatorId, Label};

/// Alarm state for one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmState {
    #[default]
    Clear,
    /// Mismatch observed; alarm raises at `deadline` if it persists.
    Timing { deadline: u64 },
    Alarmed,
}

impl AlarmState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Alarmed)
    }

    /// Deadline of the mismatch currently being timed, if any.
    pub fn mismatch_deadline(&self) -> Option<u64> {
        match self {
            Self::Timing { deadline } => Some(*deadline),
            _ => None,
        }
    }
}

/// Observable alarm edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmTransition {
    Raised,
    Cleared,
}

/// Alarm text carried by alarm events, e.g. `Pump 1: no current`.
///
/// Agreement reads `OK`; a mismatch names which way the sensor disagrees.
pub fn alarm_label(id: ActuatorId, commanded: bool, sensed_on: bool) -> Label {
    let text = match (commanded, sensed_on) {
        (true, false) => "no current",
        (false, true) => "running while off",
        _ => "OK",
    };
    let mut label = Label::new();
    let written = write!(label, "{}: {text}", id.name());
    debug_assert!(written.is_ok(), "alarm label exceeds LABEL_CAP");
    label
}

/// Debounced command/status mismatch detector for every actuator.
pub struct FaultMonitor {
    debounce_secs: u64,
    states: [AlarmState; ActuatorId::COUNT],
}

impl FaultMonitor {
    pub fn new(debounce_secs: u64) -> Self {
        Self {
            debounce_secs,
            states: [AlarmState::Clear; ActuatorId::COUNT],
        }
    }

    /// Feed one `(commanded, sensed_on)` observation at `now_epoch`.
    pub fn observe(
        &mut self,
        id: ActuatorId,
        commanded: bool,
        sensed_on: bool,
        now_epoch: u64,
    ) -> Option<AlarmTransition> {
        let slot = &mut self.states[id.index()];
        let prev = *slot;

        let next = if commanded == sensed_on {
            AlarmState::Clear
        } else {
            match prev {
                AlarmState::Clear => {
                    let deadline = now_epoch.saturating_add(self.debounce_secs);
                    debug!(
                        "{id}: commanded {} but sensed {}, alarm at {deadline}",
                        on_off(commanded),
                        on_off(sensed_on)
                    );
                    AlarmState::Timing { deadline }
                }
                AlarmState::Timing { deadline } if now_epoch >= deadline => AlarmState::Alarmed,
                other => other,
            }
        };
        *slot = next;

        match (prev.is_active(), next.is_active()) {
            (false, true) => {
                error!(
                    "ALARM RAISED: {id} commanded {} but sensed {}",
                    on_off(commanded),
                    on_off(sensed_on)
                );
                Some(AlarmTransition::Raised)
            }
            (true, false) => {
                info!("ALARM CLEARED: {id}");
                Some(AlarmTransition::Cleared)
            }
            _ => None,
        }
    }

    pub fn state(&self, id: ActuatorId) -> AlarmState {
        self.states[id.index()]
    }

    pub fn is_alarmed(&self, id: ActuatorId) -> bool {
        self.state(id).is_active()
    }
}

//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log to serial, push to a
//! browser over a socket, etc.  Every event may be re-sent; consumers
//! treat repeats as harmless.

use serde::Serialize;

use crate::control::{ActuatorId, Label};
use crate::scheduler::ScheduleVersion;
use crate::sensors::water_level::WaterLevel;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum AppEvent {
    /// The service has started.
    Started { schedule: ScheduleVersion },

    /// An actuator switched between auto and override, or an override
    /// was replaced.  `label` is the new command summary.
    ModeChanged { actuator: ActuatorId, label: Label },

    /// Commanded and sensed state disagreed past the debounce.  `label`
    /// is the alarm text, e.g. `Pump 1: no current`.
    AlarmRaised {
        actuator: ActuatorId,
        commanded: bool,
        sensed_on: bool,
        label: Label,
    },

    /// Commanded and sensed state agree again (`Pump 1: OK`).
    AlarmCleared { actuator: ActuatorId, label: Label },

    /// Periodic snapshot.
    Status(StatusReport),
}

/// Per-actuator slice of a [`StatusReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActuatorStatus {
    pub actuator: ActuatorId,
    pub commanded: bool,
    pub sensed_on: bool,
    pub alarm: bool,
    pub label: Label,
}

/// A point-in-time snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub epoch_secs: u64,
    pub actuators: [ActuatorStatus; ActuatorId::COUNT],
    /// Last classified level; `None` until the first successful read.
    pub water_level: Option<WaterLevel>,
}

impl StatusReport {
    pub fn actuator(&self, id: ActuatorId) -> &ActuatorStatus {
        &self.actuators[id.index()]
    }
}

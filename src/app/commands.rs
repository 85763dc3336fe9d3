//! Inbound commands to the control service.
//!
//! These represent actions requested by the outside world (web handler,
//! serial console, tests) that the
//! [`ControlService`](super::service::ControlService) interprets and acts
//! upon.  They normally travel through the
//! [`RequestQueue`](super::requests::RequestQueue).

use crate::control::ActuatorId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Pin `actuator` to `on`.  Durations above the configured permanent
    /// threshold never expire.
    Override {
        actuator: ActuatorId,
        on: bool,
        minutes: i32,
    },

    /// Hand `actuator` back to the schedule.
    Auto { actuator: ActuatorId },
}

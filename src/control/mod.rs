//! Actuator identity and per-actuator command authority.
//!
//! The rig has a fixed set of three actuators.  Each one is addressed by
//! [`ActuatorId`], which doubles as the index into every per-actuator
//! array the orchestrator owns (authorities, alarm states, current
//! windows, relays).

pub mod authority;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ActuatorError, Error};

/// Capacity of the fixed-size label strings surfaced to request handlers
/// and the event stream.  The longest command label,
/// `Off - Override (2147483647 min)`, and the longest alarm label,
/// `Air Pump: running while off`, both fit.
pub const LABEL_CAP: usize = 48;

/// Fixed-capacity text label (command summary or alarm text).
pub type Label = heapless::String<LABEL_CAP>;

/// One of the rig's actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActuatorId {
    Pump1 = 0,
    Pump2 = 1,
    AirPump = 2,
}

impl ActuatorId {
    /// Number of actuators; sizes every per-actuator array.
    pub const COUNT: usize = 3;

    /// Every actuator, in control-tick evaluation order.
    pub const ALL: [ActuatorId; Self::COUNT] = [Self::Pump1, Self::Pump2, Self::AirPump];

    /// Array index for this actuator.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name used in labels and log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pump1 => "Pump 1",
            Self::Pump2 => "Pump 2",
            Self::AirPump => "Air Pump",
        }
    }
}

impl TryFrom<u8> for ActuatorId {
    type Error = Error;

    /// Convert a raw identifier received from a request handler.
    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Pump1),
            1 => Ok(Self::Pump2),
            2 => Ok(Self::AirPump),
            _ => Err(ActuatorError::UnknownActuator(raw).into()),
        }
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

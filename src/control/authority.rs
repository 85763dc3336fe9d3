//! Per-actuator command authority.
//!
//! Holds the auto/override/command/status quadruple for one actuator and
//! decides, once per tick, which state the output is driven to:
//!
//! ```text
//!   request_override ──▶ ┌──────────┐ ──expiry / request_auto──▶ ┌──────┐
//!                        │ Override │                            │ Auto │
//!   (commanded pinned)   └──────────┘ ◀──────request_override─── └──────┘
//!                                                 (commanded = schedule)
//! ```
//!
//! The authority never consults the schedule itself.  The orchestrator
//! computes the auto target and hands it to [`ActuatorAuthority::apply_auto`],
//! which ignores it while an override holds.

use core::fmt::Write;

use log::info;

use super::{ActuatorId, Label};

/// Who currently decides the commanded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Commanded state follows the schedule policy.
    Auto,
    /// Commanded state is pinned by a manual request.
    /// `expires_at` is `None` for a permanent override.
    Override { expires_at: Option<u64> },
}

/// Command authority for a single actuator.
#[derive(Debug, Clone)]
pub struct ActuatorAuthority {
    id: ActuatorId,
    /// Last decision about whether the actuator should be energised.
    commanded: bool,
    override_active: bool,
    /// Only meaningful while `override_active`; cleared otherwise.
    override_expiry: Option<u64>,
    /// Latest verdict from the current-sense window.
    sensed_on: bool,
}

impl ActuatorAuthority {
    /// New authority in auto mode, commanded off until the first resolution.
    pub fn new(id: ActuatorId) -> Self {
        Self {
            id,
            commanded: false,
            override_active: false,
            override_expiry: None,
            sensed_on: false,
        }
    }

    pub fn commanded(&self) -> bool {
        self.commanded
    }

    pub fn sensed_on(&self) -> bool {
        self.sensed_on
    }

    pub fn set_sensed_on(&mut self, on: bool) {
        self.sensed_on = on;
    }

    pub fn is_overridden(&self) -> bool {
        self.override_active
    }

    pub fn override_expiry(&self) -> Option<u64> {
        self.override_expiry
    }

    pub fn mode(&self) -> Mode {
        if self.override_active {
            Mode::Override {
                expires_at: self.override_expiry,
            }
        } else {
            Mode::Auto
        }
    }

    /// Clear a timed override whose expiry has been reached.
    ///
    /// Returns `true` if the override was cleared by this call; the caller
    /// then resolves auto mode within the same tick.
    pub fn expire_override(&mut self, now_epoch: u64) -> bool {
        match self.override_expiry {
            Some(expiry) if self.override_active && now_epoch >= expiry => {
                info!("{}: override expired, returning to auto", self.id);
                self.override_active = false;
                self.override_expiry = None;
                true
            }
            _ => false,
        }
    }

    /// Adopt the schedule's desired state unless an override holds.
    ///
    /// Returns `true` if the commanded state changed.
    pub fn apply_auto(&mut self, desired: bool) -> bool {
        if self.override_active || self.commanded == desired {
            return false;
        }
        self.commanded = desired;
        true
    }

    /// Pin the commanded state.
    ///
    /// Durations above `permanent_above_mins` never expire.  Anything else,
    /// including zero or negative durations, expires at
    /// `now + minutes * 60` (saturating at the epoch boundaries), so a
    /// non-positive duration reverts on the next tick.
    pub fn request_override(
        &mut self,
        on: bool,
        minutes: i32,
        now_epoch: u64,
        permanent_above_mins: i32,
    ) {
        self.override_active = true;
        self.commanded = on;
        self.override_expiry = if minutes > permanent_above_mins {
            None
        } else {
            Some(now_epoch.saturating_add_signed(i64::from(minutes) * 60))
        };
        info!(
            "{}: override {} ({})",
            self.id,
            on_off(on),
            match self.override_expiry {
                Some(_) => "timed",
                None => "permanent",
            }
        );
    }

    /// Release any override.  The caller resolves auto mode right after.
    pub fn request_auto(&mut self) {
        if self.override_active {
            info!("{}: override cleared by request", self.id);
        }
        self.override_active = false;
        self.override_expiry = None;
    }

    /// Summary such as `On - Auto`, `Off - Override (12 min)` or
    /// `On - Override (Permanent)`.
    ///
    /// Minutes remaining round up, so an override with 30 s left reads
    /// `1 min`; one that has passed its expiry but not yet been ticked
    /// reads `0 min`.
    pub fn command_label(&self, now_epoch: u64) -> Label {
        let mut label = Label::new();
        let state = if self.commanded { "On" } else { "Off" };
        let written = match self.mode() {
            Mode::Auto => write!(label, "{state} - Auto"),
            Mode::Override { expires_at: None } => write!(label, "{state} - Override (Permanent)"),
            Mode::Override {
                expires_at: Some(expiry),
            } => {
                let mins = expiry.saturating_sub(now_epoch).div_ceil(60);
                write!(label, "{state} - Override ({mins} min)")
            }
        };
        debug_assert!(written.is_ok(), "command label exceeds LABEL_CAP");
        label
    }
}

pub(crate) fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

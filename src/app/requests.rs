//! Request queue between request handlers and the control loop.
//!
//! Uses an `embassy-sync` bounded channel so a handler running in another
//! task can hand commands to the synchronous control loop without a heap
//! or a lock held across the tick.  The loop drains the queue once per
//! iteration, before the tick, so every command is applied whole.
//!
//! ```text
//! ┌──────────────┐  AppCommand  ┌──────────────┐
//! │   Handler    │────────────▶│  Control Loop │
//! │ (any task)   │              │  (sync)       │
//! └──────────────┘              └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::control::ActuatorId;
use crate::error::{Error, RequestError};

use super::commands::AppCommand;

/// Channel depth for inbound requests.
const REQUEST_DEPTH: usize = 8;

/// Single-consumer queue of [`AppCommand`]s.
pub struct RequestQueue {
    channel: Channel<CriticalSectionRawMutex, AppCommand, REQUEST_DEPTH>,
}

impl RequestQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without blocking.
    pub fn submit(&self, cmd: AppCommand) -> Result<(), RequestError> {
        self.channel.try_send(cmd).map_err(|_| {
            warn!("request queue full, dropping {:?}", cmd);
            RequestError::QueueFull
        })
    }

    /// Override request with an unchecked actuator id.
    pub fn submit_override_raw(&self, raw_id: u8, on: bool, minutes: i32) -> Result<(), Error> {
        let actuator = ActuatorId::try_from(raw_id)?;
        self.submit(AppCommand::Override {
            actuator,
            on,
            minutes,
        })?;
        Ok(())
    }

    /// Auto request with an unchecked actuator id.
    pub fn submit_auto_raw(&self, raw_id: u8) -> Result<(), Error> {
        let actuator = ActuatorId::try_from(raw_id)?;
        self.submit(AppCommand::Auto { actuator })?;
        Ok(())
    }

    /// Hand every queued command to `apply`, oldest first.  Returns how
    /// many were applied.
    pub fn drain(&self, mut apply: impl FnMut(AppCommand)) -> usize {
        let mut n = 0;
        while let Ok(cmd) = self.channel.try_receive() {
            apply(cmd);
            n += 1;
        }
        n
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide request queue drained by the control loop.
pub static REQUESTS: RequestQueue = RequestQueue::new();

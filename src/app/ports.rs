//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (clock, current sense, relays, level sensor, event
//! sinks) implement these traits.  The
//! [`ControlService`](super::service::ControlService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::control::ActuatorId;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → domain)
// ───────────────────────────────────────────────────────────────

/// One consistent reading of every clock field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// Local hour, 0–23.
    pub hour: u8,
    /// Local minute, 0–59.
    pub minute: u8,
    /// Local second, 0–59.
    pub second: u8,
    /// Wall-clock seconds since the Unix epoch.
    pub epoch_secs: u64,
    /// Monotonic milliseconds since boot.
    pub uptime_ms: u64,
}

/// Time source.  The core tolerates drift and never resynchronises it.
pub trait ClockPort {
    fn current_hour(&self) -> u8;
    fn current_minute(&self) -> u8;
    fn current_second(&self) -> u8;
    fn epoch_secs(&self) -> u64;
    fn uptime_ms(&self) -> u64;

    /// Snapshot all fields at once so a tick sees a single instant.
    ///
    /// Adapters that can read the clock atomically should override this.
    fn now(&self) -> ClockReading {
        ClockReading {
            hour: self.current_hour(),
            minute: self.current_minute(),
            second: self.current_second(),
            epoch_secs: self.epoch_secs(),
            uptime_ms: self.uptime_ms(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw current-sense ADC reads, one channel per actuator.
pub trait CurrentSensePort {
    /// Non-blocking 12-bit read (0–4095 nominal).
    ///
    /// A failed conversion must return
    /// [`ADC_READ_FAILED`](crate::sensors::current::ADC_READ_FAILED), never
    /// a plausible reading: the whole window is then discarded and the
    /// last sensed state held.
    fn read_raw(&mut self, id: ActuatorId) -> u16;
}

/// Ultrasonic distance to the water surface.
pub trait WaterLevelPort {
    /// Blocking read bounded by the echo timeout.  `None` when no echo
    /// came back in time.
    fn read_distance_cm(&mut self) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Relay outputs.  Writes are idempotent; the service re-drives every
/// output every tick.
pub trait OutputPort {
    fn set_output(&mut self, id: ActuatorId, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, web
/// socket broadcast, etc.).  Consumers must tolerate repeats.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

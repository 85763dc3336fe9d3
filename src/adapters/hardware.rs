//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the relay drivers and exposes them, together with the raw
//! current-sense ADC and the ultrasonic sensor, through
//! [`CurrentSensePort`], [`OutputPort`] and [`WaterLevelPort`].  This is
//! the only module in the system that touches actual hardware.  On
//! non-espidf targets, the underlying helpers use cfg-gated simulation.

use log::warn;

use crate::app::ports::{CurrentSensePort, OutputPort, WaterLevelPort};
use crate::control::ActuatorId;
use crate::drivers::hw_init;
use crate::drivers::relay::{GpioPin, RelayDriver};
use crate::pins;
use crate::sensors::water_level::echo_to_distance_cm;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    relays: [RelayDriver<GpioPin>; ActuatorId::COUNT],
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    /// Call after [`hw_init::init_peripherals`].
    pub fn new() -> Self {
        Self {
            relays: ActuatorId::ALL.map(|id| {
                RelayDriver::new(GpioPin::new(pins::relay_gpio(id)), pins::RELAY_ACTIVE_LOW)
            }),
        }
    }

    pub fn is_energised(&self, id: ActuatorId) -> bool {
        self.relays[id.index()].is_energised()
    }
}

// ── CurrentSensePort implementation ───────────────────────────

impl CurrentSensePort for HardwareAdapter {
    fn read_raw(&mut self, id: ActuatorId) -> u16 {
        hw_init::adc1_read(pins::current_sense_channel(id))
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl OutputPort for HardwareAdapter {
    fn set_output(&mut self, id: ActuatorId, on: bool) {
        // A failed write holds the last state; the next tick re-drives it.
        if let Err(e) = self.relays[id.index()].set(on) {
            warn!("{id}: relay write failed: {e}");
        }
    }
}

// ── WaterLevelPort implementation ─────────────────────────────

impl WaterLevelPort for HardwareAdapter {
    fn read_distance_cm(&mut self) -> Option<f32> {
        hw_init::echo_pulse_us(pins::LEVEL_ECHO_TIMEOUT_US).map(echo_to_distance_cm)
    }
}

//! Pump relay driver.
//!
//! One relay channel per actuator, driven through an
//! [`embedded_hal::digital::OutputPin`].  Relay boards come in both
//! polarities, so the driver maps `energised` to a pin level.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`GpioPin`] writes through hw_init helpers.
//! On host/test: hw_init keeps the level in a simulated register.

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use crate::drivers::hw_init;
use crate::error::ActuatorError;

// ── Raw GPIO pin ──────────────────────────────────────────────

/// ESP-IDF error code from a failed pin write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub i32);

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output pin addressed by GPIO number.  The pin must have been
/// configured as an output by [`hw_init::init_peripherals`].
#[derive(Debug, Clone, Copy)]
pub struct GpioPin {
    gpio: i32,
}

impl GpioPin {
    pub const fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for GpioPin {
    type Error = GpioError;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, false).map_err(GpioError)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, true).map_err(GpioError)
    }
}

// ── Relay ─────────────────────────────────────────────────────

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    active_low: bool,
    energised: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            energised: false,
        }
    }

    /// Energise or release the relay.  On a failed write the recorded
    /// state is left unchanged.
    pub fn set(&mut self, energised: bool) -> Result<(), ActuatorError> {
        let high = energised != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.energised = energised;
        Ok(())
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }
}

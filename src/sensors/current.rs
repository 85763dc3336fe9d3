//! Hall-effect current-sense channel for one actuator.
//!
//! Raw 12-bit ADC samples are accumulated over a fixed window.  When the
//! window is drained the average is put through the channel's linear
//! calibration and compared with the on/off threshold:
//!
//! ```text
//!   amps = (avg_adc * scale - zero_offset_volts) * gain
//!   sensed_on = amps > threshold
//! ```
//!
//! Each window stands alone; nothing is carried across windows.

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

/// Full-scale value of the 12-bit ADC.
pub const ADC_MAX: u16 = 4095;

/// Raw value a current-sense read reports when the conversion failed.
/// Lies above [`ADC_MAX`], so the window it lands in is discarded.
pub const ADC_READ_FAILED: u16 = u16::MAX;

/// Linear ADC-count to amps conversion for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentCalibration {
    /// Volts per ADC count.
    pub scale: f64,
    /// Sensor output voltage at zero current.
    pub zero_offset_volts: f64,
    /// Amps per volt above the zero offset.
    pub gain: f64,
}

impl CurrentCalibration {
    pub fn amps(&self, avg_adc: f64) -> f64 {
        (avg_adc * self.scale - self.zero_offset_volts) * self.gain
    }

    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.zero_offset_volts.is_finite() && self.gain.is_finite()
    }
}

/// Outcome of one closed window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentVerdict {
    pub avg_adc: f64,
    pub amps: f64,
    pub sensed_on: bool,
}

/// Sample accumulator for one current-sense channel.
#[derive(Debug, Clone)]
pub struct CurrentChannel {
    cal: CurrentCalibration,
    running_sum: f64,
    sample_count: u32,
    /// Set when any sample in the window was outside the ADC range.
    out_of_range: bool,
}

impl CurrentChannel {
    pub fn new(cal: CurrentCalibration) -> Self {
        Self {
            cal,
            running_sum: 0.0,
            sample_count: 0,
            out_of_range: false,
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn sample(&mut self, raw: u16) {
        if raw > ADC_MAX {
            self.out_of_range = true;
        }
        self.running_sum += f64::from(raw);
        self.sample_count = self.sample_count.saturating_add(1);
    }

    /// Close the window: compute the verdict and reset the accumulator.
    ///
    /// The accumulator is reset whether or not the window was usable, so a
    /// bad window is discarded and the next one starts clean.
    pub fn drain(&mut self, threshold_amps: f64) -> Result<CurrentVerdict, SensorError> {
        let sum = self.running_sum;
        let count = self.sample_count;
        let out_of_range = self.out_of_range;
        self.reset();

        if count == 0 {
            return Err(SensorError::EmptyWindow);
        }
        if out_of_range {
            return Err(SensorError::AdcOutOfRange);
        }

        let avg_adc = sum / f64::from(count);
        let amps = self.cal.amps(avg_adc);
        if !amps.is_finite() {
            return Err(SensorError::NonFiniteReading);
        }
        Ok(CurrentVerdict {
            avg_adc,
            amps,
            sensed_on: amps > threshold_amps,
        })
    }

    fn reset(&mut self) {
        self.running_sum = 0.0;
        self.sample_count = 0;
        self.out_of_range = false;
    }
}

//! Sensor subsystem: current-sense aggregation and water level.
//!
//! [`CurrentSensorAggregator`] owns one [`CurrentChannel`] per actuator
//! and turns the fast raw-ADC stream into one on/off verdict per window.
//! The aggregator is pure bookkeeping: raw reads arrive through
//! [`CurrentSensePort`](crate::app::ports::CurrentSensePort) in the
//! orchestrator.

pub mod current;
pub mod water_level;

use crate::control::ActuatorId;
use crate::error::SensorError;
use current::{CurrentCalibration, CurrentChannel, CurrentVerdict};

/// Windowed current-draw verdicts for every actuator.
pub struct CurrentSensorAggregator {
    channels: [CurrentChannel; ActuatorId::COUNT],
    samples_per_window: u32,
    threshold_amps: f64,
}

impl CurrentSensorAggregator {
    pub fn new(
        calibration: [CurrentCalibration; ActuatorId::COUNT],
        samples_per_window: u32,
        threshold_amps: f64,
    ) -> Self {
        Self {
            channels: calibration.map(CurrentChannel::new),
            samples_per_window,
            threshold_amps,
        }
    }

    /// Accumulate one raw reading.
    pub fn sample(&mut self, id: ActuatorId, raw: u16) {
        self.channels[id.index()].sample(raw);
    }

    /// Whether the window for `id` holds a full set of samples.
    pub fn window_ready(&self, id: ActuatorId) -> bool {
        self.channels[id.index()].sample_count() >= self.samples_per_window
    }

    /// Close the window for `id` and return its verdict.
    pub fn drain_window(&mut self, id: ActuatorId) -> Result<CurrentVerdict, SensorError> {
        self.channels[id.index()].drain(self.threshold_amps)
    }

    /// Accumulate a reading and, if that completes the window, drain it.
    pub fn sample_and_drain(
        &mut self,
        id: ActuatorId,
        raw: u16,
    ) -> Option<Result<CurrentVerdict, SensorError>> {
        self.sample(id, raw);
        if self.window_ready(id) {
            Some(self.drain_window(id))
        } else {
            None
        }
    }

    pub fn samples_in_window(&self, id: ActuatorId) -> u32 {
        self.channels[id.index()].sample_count()
    }
}

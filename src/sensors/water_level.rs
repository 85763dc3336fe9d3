//! Ultrasonic reservoir level classifier.
//!
//! An HC-SR04 style sensor looks down at the water surface from the tank
//! lid, so a *larger* distance means *less* water.  The reading is reduced
//! to three buckets; there is no hysteresis.
//!
//! The echo read blocks for up to one pulse timeout, so the orchestrator
//! runs it on its own coarse cadence, never on the fast sampling tick.

use serde::{Deserialize, Serialize};

/// Speed of sound at ~20 °C, in cm per microsecond.
const SOUND_CM_PER_US: f32 = 0.0343;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterLevel {
    Low,
    Medium,
    High,
}

/// Bucket boundaries in centimetres from the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelThresholds {
    /// Distances strictly above this read as `Low`.
    pub low_above_cm: f32,
    /// Distances strictly below this read as `High`.
    pub high_below_cm: f32,
}

impl LevelThresholds {
    pub fn classify(&self, distance_cm: f32) -> WaterLevel {
        if distance_cm > self.low_above_cm {
            WaterLevel::Low
        } else if distance_cm < self.high_below_cm {
            WaterLevel::High
        } else {
            WaterLevel::Medium
        }
    }
}

/// Convert a round-trip echo pulse width into a one-way distance.
pub fn echo_to_distance_cm(pulse_us: u64) -> f32 {
    pulse_us as f32 * SOUND_CM_PER_US / 2.0
}

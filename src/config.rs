//! System configuration parameters
//!
//! All tunable parameters for the HydroRig controller.  Values can be
//! supplied as JSON at build or provisioning time; nothing is persisted
//! by the controller itself.

use serde::{Deserialize, Serialize};

use crate::control::ActuatorId;
use crate::error::Error;
use crate::scheduler::ScheduleVersion;
use crate::sensors::current::CurrentCalibration;
use crate::sensors::water_level::LevelThresholds;

/// Volts per count for a 12-bit ADC on a 3.3 V reference.
const ADC_VOLTS_PER_COUNT: f64 = 3.3 / 4095.0;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub tick_interval_ms: u32,
    /// Current-sense sampling interval (milliseconds)
    pub sample_interval_ms: u32,
    /// Samples per current verdict window
    pub samples_per_window: u32,
    /// Status broadcast interval (seconds)
    pub status_interval_secs: u32,
    /// Water level read interval (seconds)
    pub water_level_interval_secs: u32,

    // --- Current sensing ---
    /// Calibrated current strictly above this reads as "on" (amps)
    pub current_threshold_amps: f64,
    /// Per-actuator calibration, indexed by [`ActuatorId`]
    pub calibration: [CurrentCalibration; ActuatorId::COUNT],

    // --- Fault monitor ---
    /// Mismatch must persist this long before an alarm (seconds)
    pub mismatch_debounce_secs: u32,

    // --- Overrides / schedule ---
    /// Overrides longer than this never expire (minutes)
    pub permanent_override_above_mins: i32,
    /// Air pump on/off half-period (seconds)
    pub air_pump_period_secs: u32,
    /// Which daily schedule the pumps follow
    pub schedule: ScheduleVersion,
    /// Local time offset from UTC (seconds)
    pub utc_offset_secs: i32,

    // --- Water level ---
    /// Distances above this read as Low (cm)
    pub level_low_above_cm: f32,
    /// Distances below this read as High (cm)
    pub level_high_below_cm: f32,

    // --- Watchdog ---
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_interval_ms: 50,
            sample_interval_ms: 50,
            samples_per_window: 50, // 2.5 s window
            status_interval_secs: 10,
            water_level_interval_secs: 30,

            // Current sensing: ACS712-5A behind a 2:3 divider, ~185 mV/A
            current_threshold_amps: 0.5,
            calibration: [
                CurrentCalibration {
                    scale: ADC_VOLTS_PER_COUNT,
                    zero_offset_volts: 1.65,
                    gain: 5.405,
                },
                CurrentCalibration {
                    scale: ADC_VOLTS_PER_COUNT,
                    zero_offset_volts: 1.66,
                    gain: 5.41,
                },
                CurrentCalibration {
                    scale: ADC_VOLTS_PER_COUNT,
                    zero_offset_volts: 1.64,
                    gain: 5.40,
                },
            ],

            // Fault monitor
            mismatch_debounce_secs: 60,

            // Overrides / schedule
            permanent_override_above_mins: 60,
            air_pump_period_secs: 900, // 15 min on / 15 min off
            schedule: ScheduleVersion::SplitShift,
            utc_offset_secs: -36_000, // UTC-10

            // Water level
            level_low_above_cm: 20.0,
            level_high_below_cm: 10.0,

            // Watchdog
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// Parse a (possibly partial) JSON document; missing fields take
    /// their defaults.  The result is validated.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed config JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control loop cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be non-zero"));
        }
        if self.sample_interval_ms == 0 {
            return Err(Error::Config("sample_interval_ms must be non-zero"));
        }
        if self.tick_interval_ms > self.sample_interval_ms {
            return Err(Error::Config(
                "tick_interval_ms must not exceed sample_interval_ms",
            ));
        }
        if self.samples_per_window == 0 {
            return Err(Error::Config("samples_per_window must be non-zero"));
        }
        if self.water_level_interval_secs == 0 {
            return Err(Error::Config("water_level_interval_secs must be non-zero"));
        }
        if self.air_pump_period_secs == 0 {
            return Err(Error::Config("air_pump_period_secs must be non-zero"));
        }
        if u64::from(self.status_interval_secs) * 1000 <= u64::from(self.tick_interval_ms) {
            return Err(Error::Config(
                "status_interval_secs must be longer than the tick interval",
            ));
        }
        if !self.current_threshold_amps.is_finite() || self.current_threshold_amps <= 0.0 {
            return Err(Error::Config("current_threshold_amps must be positive"));
        }
        if !self.calibration.iter().all(CurrentCalibration::is_finite) {
            return Err(Error::Config("calibration must be finite"));
        }
        if !self.level_low_above_cm.is_finite()
            || !self.level_high_below_cm.is_finite()
            || self.level_high_below_cm > self.level_low_above_cm
        {
            return Err(Error::Config(
                "level_high_below_cm must not exceed level_low_above_cm",
            ));
        }
        if self.watchdog_timeout_ms <= self.tick_interval_ms {
            return Err(Error::Config(
                "watchdog_timeout_ms must be longer than the tick interval",
            ));
        }
        Ok(())
    }

    pub fn level_thresholds(&self) -> LevelThresholds {
        LevelThresholds {
            low_above_cm: self.level_low_above_cm,
            high_below_cm: self.level_high_below_cm,
        }
    }
}

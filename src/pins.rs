//! GPIO / peripheral pin assignments for the HydroRig controller board
//! (ESP32-WROOM-32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

use crate::control::ActuatorId;

// ---------------------------------------------------------------------------
// Relay outputs
// ---------------------------------------------------------------------------

pub const PUMP_1_GPIO: i32 = 22;
pub const PUMP_2_GPIO: i32 = 21;
pub const AIR_PUMP_GPIO: i32 = 19;

/// Relay board polarity.  `true` if driving the pin LOW energises the relay.
pub const RELAY_ACTIVE_LOW: bool = false;

// ---------------------------------------------------------------------------
// Current sense, analog (ADC1)
// ---------------------------------------------------------------------------

/// ACS712 on the Pump 1 feed.  ADC1 channel 0 (GPIO 36).
pub const PUMP_1_SENSE_ADC_CH: u32 = 0;
/// ACS712 on the Pump 2 feed.  ADC1 channel 3 (GPIO 39).
pub const PUMP_2_SENSE_ADC_CH: u32 = 3;
/// ACS712 on the air pump feed.  ADC1 channel 6 (GPIO 34).
pub const AIR_PUMP_SENSE_ADC_CH: u32 = 6;

// ---------------------------------------------------------------------------
// Ultrasonic level sensor (HC-SR04)
// ---------------------------------------------------------------------------

pub const LEVEL_TRIG_GPIO: i32 = 5;
/// Echo is 5 V on the module; routed through a divider.
pub const LEVEL_ECHO_GPIO: i32 = 18;

/// Give up on an echo after this long (~5 m round trip).
pub const LEVEL_ECHO_TIMEOUT_US: u64 = 30_000;

pub const fn relay_gpio(id: ActuatorId) -> i32 {
    match id {
        ActuatorId::Pump1 => PUMP_1_GPIO,
        ActuatorId::Pump2 => PUMP_2_GPIO,
        ActuatorId::AirPump => AIR_PUMP_GPIO,
    }
}

pub const fn current_sense_channel(id: ActuatorId) -> u32 {
    match id {
        ActuatorId::Pump1 => PUMP_1_SENSE_ADC_CH,
        ActuatorId::Pump2 => PUMP_2_SENSE_ADC_CH,
        ActuatorId::AirPump => AIR_PUMP_SENSE_ADC_CH,
    }
}

//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                |
//! |----------------|--------------------|----------------------------|
//! | `hardware`     | CurrentSensePort   | ESP32 ADC1 (ACS712)        |
//! |                | OutputPort         | Relay GPIOs                |
//! |                | WaterLevelPort     | HC-SR04 trigger / echo     |
//! | `log_sink`     | EventSink          | Serial log output          |
//! | `time`         | ClockPort          | ESP32 system clock / timer |

pub mod hardware;
pub mod log_sink;
pub mod time;

//! Relay drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod relay;
pub mod watchdog;

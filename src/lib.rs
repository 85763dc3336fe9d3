//! HydroRig firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod safety;
pub mod scheduler;
pub mod sensors;

pub mod pins;

// Peripheral-facing modules; the hardware calls inside are cfg-gated so
// host builds get simulated peripherals.
pub mod adapters;
pub mod drivers;

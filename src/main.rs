//! HydroRig Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          LogEventSink     Esp32TimeAdapter    │
//! │  (CurrentSense+Output     (EventSink)      (ClockPort)         │
//! │   +WaterLevel)                                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            ControlService (pure logic)                 │    │
//! │  │  Authority · Schedule · FaultMonitor · Sensors         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  REQUESTS queue (any task) ──▶ drained once per tick           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use hydrorig::adapters::hardware::HardwareAdapter;
use hydrorig::adapters::log_sink::LogEventSink;
use hydrorig::adapters::time::Esp32TimeAdapter;
use hydrorig::app::ports::ClockPort;
use hydrorig::app::requests::REQUESTS;
use hydrorig::app::service::ControlService;
use hydrorig::config::SystemConfig;
use hydrorig::drivers::{hw_init, watchdog::Watchdog};

/// Optional JSON config baked in at build time.
const BUILD_CONFIG: Option<&str> = option_env!("HYDRORIG_CONFIG_JSON");

fn load_config() -> SystemConfig {
    let Some(json) = BUILD_CONFIG else {
        return SystemConfig::default();
    };
    match SystemConfig::from_json(json) {
        Ok(c) => {
            info!("Config: loaded build-time JSON");
            c
        }
        Err(e) => {
            warn!("Config: {}, running with defaults", e);
            SystemConfig::default()
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  HydroRig v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Relays stay de-energised; halt and let the watchdog reset us.
        error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Config ─────────────────────────────────────────────
    let config = load_config();
    let tick_ms = config.tick_interval_ms;
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 4. Adapters and service ───────────────────────────────
    let clock = Esp32TimeAdapter::new(config.utc_offset_secs);
    let mut hw = HardwareAdapter::new();
    let mut sink = LogEventSink::new();
    let mut service = ControlService::new(config)?;
    service.start(&mut sink);

    info!("System ready. Entering control loop ({} ms tick).", tick_ms);

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        esp_idf_hal::delay::FreeRtos::delay_ms(tick_ms);

        let now = clock.now();
        REQUESTS.drain(|cmd| service.handle_command(cmd, &now, &mut hw, &mut sink));

        service.tick(&clock, &mut hw, &mut sink);
        watchdog.feed();
    }
}

//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  Status
//! reports are rendered as a single JSON line so a serial bridge can
//! forward them to a dashboard unchanged.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::control::authority::on_off;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(report) => match serde_json::to_string(report) {
                Ok(json) => info!("STATUS | {json}"),
                Err(e) => warn!("STATUS | unserialisable report: {e}"),
            },
            AppEvent::ModeChanged { actuator, label } => {
                info!("MODE | {actuator}: {label}");
            }
            AppEvent::AlarmRaised {
                commanded,
                sensed_on,
                label,
                ..
            } => {
                warn!(
                    "ALARM | {label} (commanded {} sensed {})",
                    on_off(*commanded),
                    on_off(*sensed_on)
                );
            }
            AppEvent::AlarmCleared { label, .. } => {
                info!("ALARM | {label} (cleared)");
            }
            AppEvent::Started { schedule } => {
                info!("START | schedule={:?}", schedule);
            }
        }
    }
}

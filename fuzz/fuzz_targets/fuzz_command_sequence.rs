//! Fuzz target: `ControlService` under arbitrary request / tick sequences
//!
//! Each input byte chunk is decoded into one operation: a raw-id override
//! or auto request through a `RequestQueue`, a time jump plus tick, or a
//! sensor fault toggle.  Invariants checked after every step:
//! - No panics under any byte sequence
//! - Unknown actuator ids are rejected, never applied
//! - An overridden actuator's output equals its pinned command
//! - An alarm is only ever active while command and sensed state disagree
//!
//! cargo fuzz run fuzz_command_sequence

#![no_main]

use hydrorig::app::events::AppEvent;
use hydrorig::app::ports::{ClockPort, CurrentSensePort, EventSink, OutputPort, WaterLevelPort};
use hydrorig::app::requests::RequestQueue;
use hydrorig::app::service::ControlService;
use hydrorig::config::SystemConfig;
use hydrorig::control::ActuatorId;
use libfuzzer_sys::fuzz_target;

struct Clock {
    epoch: u64,
    uptime_ms: u64,
}

impl ClockPort for Clock {
    fn current_hour(&self) -> u8 {
        (self.epoch % 86_400 / 3600) as u8
    }
    fn current_minute(&self) -> u8 {
        (self.epoch % 3600 / 60) as u8
    }
    fn current_second(&self) -> u8 {
        (self.epoch % 60) as u8
    }
    fn epoch_secs(&self) -> u64 {
        self.epoch
    }
    fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }
}

#[derive(Default)]
struct Hw {
    outputs: [bool; ActuatorId::COUNT],
    stuck: [Option<bool>; ActuatorId::COUNT],
}

impl CurrentSensePort for Hw {
    fn read_raw(&mut self, id: ActuatorId) -> u16 {
        let i = id.index();
        if self.stuck[i].unwrap_or(self.outputs[i]) { 4000 } else { 0 }
    }
}

impl OutputPort for Hw {
    fn set_output(&mut self, id: ActuatorId, on: bool) {
        self.outputs[id.index()] = on;
    }
}

impl WaterLevelPort for Hw {
    fn read_distance_cm(&mut self) -> Option<f32> {
        Some(15.0)
    }
}

struct Sink;
impl EventSink for Sink {
    fn emit(&mut self, _: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig {
        samples_per_window: 1,
        ..SystemConfig::default()
    };
    let Ok(mut svc) = ControlService::new(config) else {
        return;
    };
    let queue = RequestQueue::new();
    let mut clock = Clock {
        epoch: 1_699_920_000,
        uptime_ms: 0,
    };
    let mut hw = Hw::default();

    for chunk in data.chunks_exact(3) {
        let (op, a, b) = (chunk[0], chunk[1], chunk[2]);
        match op % 4 {
            0 => {
                let minutes = i32::from(b as i8);
                let was_full = queue.len() == 8;
                let accepted = queue.submit_override_raw(a % 4, a & 0x80 != 0, minutes).is_ok();
                assert_eq!(accepted, a % 4 < 3 && !was_full);
            }
            1 => {
                let _ = queue.submit_auto_raw(a % 4);
            }
            2 => {
                let dt = u64::from(a) * 60 + u64::from(b);
                clock.epoch += dt;
                clock.uptime_ms += dt * 1000;
                let now = clock.now();
                queue.drain(|cmd| svc.handle_command(cmd, &now, &mut hw, &mut Sink));
                svc.tick(&clock, &mut hw, &mut Sink);
            }
            _ => {
                let id = usize::from(a) % ActuatorId::COUNT;
                hw.stuck[id] = match b % 3 {
                    0 => None,
                    1 => Some(true),
                    _ => Some(false),
                };
            }
        }

        for id in ActuatorId::ALL {
            let auth = svc.authority(id);
            if auth.is_overridden() {
                assert_eq!(hw.outputs[id.index()], auth.commanded());
            }
            if svc.query_alarm(id) {
                assert_ne!(auth.commanded(), auth.sensed_on());
            }
        }
    }
});

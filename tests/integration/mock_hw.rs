//! Mock adapters for integration tests.
//!
//! `MockHardware` models a healthy rig by default: each current-sense
//! channel reads "drawing current" exactly when its relay output is on.
//! Tests inject faults by pinning a channel (`stuck`) or its raw value.

use hydrorig::app::commands::AppCommand;
use hydrorig::app::events::AppEvent;
use hydrorig::app::ports::{
    ClockPort, ClockReading, CurrentSensePort, EventSink, OutputPort, WaterLevelPort,
};
use hydrorig::app::service::ControlService;
use hydrorig::config::SystemConfig;
use hydrorig::control::ActuatorId;
use hydrorig::sensors::current::{ADC_READ_FAILED, CurrentCalibration};

/// 2023-11-14T00:00:00Z, a UTC midnight.
pub const DAY0: u64 = 1_699_920_000;

/// Raw reading of a running pump under [`test_config`] (1 A).
pub const ON_RAW: u16 = 100;

/// amps = raw * 0.01
pub const TEST_CAL: CurrentCalibration = CurrentCalibration {
    scale: 0.01,
    zero_offset_volts: 0.0,
    gain: 1.0,
};

/// Default config with a one-sample window and a simple calibration so
/// each sampled tick yields a verdict.
pub fn test_config() -> SystemConfig {
    SystemConfig {
        samples_per_window: 1,
        calibration: [TEST_CAL; ActuatorId::COUNT],
        ..SystemConfig::default()
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// UTC clock whose wall time follows its uptime.
pub struct MockClock {
    pub start_epoch: u64,
    pub uptime_ms: u64,
}

impl MockClock {
    pub fn at(hour: u8, minute: u8) -> Self {
        Self {
            start_epoch: DAY0 + u64::from(hour) * 3600 + u64::from(minute) * 60,
            uptime_ms: 0,
        }
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.uptime_ms += ms;
    }

    fn secs_of_day(&self) -> u64 {
        self.epoch_secs() % 86_400
    }
}

impl ClockPort for MockClock {
    fn current_hour(&self) -> u8 {
        (self.secs_of_day() / 3600) as u8
    }
    fn current_minute(&self) -> u8 {
        (self.secs_of_day() / 60 % 60) as u8
    }
    fn current_second(&self) -> u8 {
        (self.secs_of_day() % 60) as u8
    }
    fn epoch_secs(&self) -> u64 {
        self.start_epoch + self.uptime_ms / 1000
    }
    fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub outputs: [bool; ActuatorId::COUNT],
    pub writes: Vec<(ActuatorId, bool)>,
    /// Sensed state forced regardless of output.
    pub stuck: [Option<bool>; ActuatorId::COUNT],
    /// Raw ADC value forced regardless of output.
    pub raw: [Option<u16>; ActuatorId::COUNT],
    /// Number of upcoming reads per channel whose conversion fails.
    pub failed_reads: [u32; ActuatorId::COUNT],
    pub distance_cm: Option<f32>,
    pub distance_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            outputs: [false; ActuatorId::COUNT],
            writes: Vec::new(),
            stuck: [None; ActuatorId::COUNT],
            raw: [None; ActuatorId::COUNT],
            failed_reads: [0; ActuatorId::COUNT],
            distance_cm: None,
            distance_reads: 0,
        }
    }

    pub fn output(&self, id: ActuatorId) -> bool {
        self.outputs[id.index()]
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrentSensePort for MockHardware {
    fn read_raw(&mut self, id: ActuatorId) -> u16 {
        let i = id.index();
        if self.failed_reads[i] > 0 {
            self.failed_reads[i] -= 1;
            return ADC_READ_FAILED;
        }
        if let Some(raw) = self.raw[i] {
            return raw;
        }
        if self.stuck[i].unwrap_or(self.outputs[i]) {
            ON_RAW
        } else {
            0
        }
    }
}

impl OutputPort for MockHardware {
    fn set_output(&mut self, id: ActuatorId, on: bool) {
        self.outputs[id.index()] = on;
        self.writes.push((id, on));
    }
}

impl WaterLevelPort for MockHardware {
    fn read_distance_cm(&mut self) -> Option<f32> {
        self.distance_reads += 1;
        self.distance_cm
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn alarms_raised(&self, id: ActuatorId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::AlarmRaised { actuator, .. } if *actuator == id))
            .count()
    }

    pub fn alarms_cleared(&self, id: ActuatorId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::AlarmCleared { actuator, .. } if *actuator == id))
            .count()
    }

    pub fn status_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Status(_)))
            .count()
    }

    /// Alarm text carried by the most recent raise or clear for `id`.
    pub fn last_alarm_label(&self, id: ActuatorId) -> Option<String> {
        self.events.iter().rev().find_map(|e| match e {
            AppEvent::AlarmRaised { actuator, label, .. }
            | AppEvent::AlarmCleared { actuator, label }
                if *actuator == id =>
            {
                Some(label.as_str().to_string())
            }
            _ => None,
        })
    }

    /// Label carried by the most recent mode change for `id`.
    pub fn last_mode_label(&self, id: ActuatorId) -> Option<String> {
        self.events.iter().rev().find_map(|e| match e {
            AppEvent::ModeChanged { actuator, label } if *actuator == id => {
                Some(label.as_str().to_string())
            }
            _ => None,
        })
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Service wired to mocks, started but not yet ticked.
pub struct Rig {
    pub svc: ControlService,
    pub clock: MockClock,
    pub hw: MockHardware,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: SystemConfig, hour: u8, minute: u8) -> Self {
        let mut sink = RecordingSink::default();
        let mut svc = ControlService::new(config).expect("valid config");
        svc.start(&mut sink);
        Self {
            svc,
            clock: MockClock::at(hour, minute),
            hw: MockHardware::new(),
            sink,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.clock.epoch_secs()
    }

    pub fn tick(&mut self) {
        self.svc.tick(&self.clock, &mut self.hw, &mut self.sink);
    }

    /// Advance `ms` then tick once.
    pub fn step_ms(&mut self, ms: u64) {
        self.clock.advance_ms(ms);
        self.tick();
    }

    /// Advance `secs` then tick once.
    pub fn step(&mut self, secs: u64) {
        self.step_ms(secs * 1000);
    }

    /// Tick once per second for `secs` seconds.
    pub fn run_secs(&mut self, secs: u64) {
        for _ in 0..secs {
            self.step(1);
        }
    }

    pub fn now(&self) -> ClockReading {
        self.clock.now()
    }

    pub fn command(&mut self, cmd: AppCommand) {
        let now = self.clock.now();
        self.svc.handle_command(cmd, &now, &mut self.hw, &mut self.sink);
    }

    pub fn override_(&mut self, id: ActuatorId, on: bool, minutes: i32) {
        self.command(AppCommand::Override {
            actuator: id,
            on,
            minutes,
        });
    }

    pub fn auto(&mut self, id: ActuatorId) {
        self.command(AppCommand::Auto { actuator: id });
    }

    pub fn commanded(&self, id: ActuatorId) -> bool {
        self.svc.authority(id).commanded()
    }

    pub fn label(&self, id: ActuatorId) -> String {
        self.svc.query_command_label(id).as_str().to_string()
    }
}

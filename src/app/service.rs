//! Control service: the hexagonal core.
//!
//! [`ControlService`] owns one [`ActuatorAuthority`] per actuator, the
//! current-sense aggregator, the fault monitor and the periodic task
//! cadences.  It exposes a clean, hardware-agnostic API.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!         ClockPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!  CurrentSensePort ──▶ │       ControlService         │
//!    WaterLevelPort ──▶ │ Authority · Schedule · Fault │
//!        OutputPort ◀── └─────────────────────────────┘
//! ```
//!
//! ## Tick order
//!
//! 1. Current sampling (when its cadence is due); a closed window updates
//!    the actuator's sensed state.
//! 2. Water level (coarse cadence; the only blocking read).
//! 3. Per actuator: override expiry, auto resolution, output drive.
//! 4. Fault monitor on the fresh `(commanded, sensed)` pairs.
//! 5. Status broadcast (when its cadence is due).
//!
//! The failover rule reads the alarm state left by step 4 of the
//! previous tick.

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::authority::{ActuatorAuthority, on_off};
use crate::control::{ActuatorId, Label};
use crate::error::Error;
use crate::safety::{AlarmState, AlarmTransition, FaultMonitor, alarm_label};
use crate::scheduler::{AutoTarget, Cadence, DutyCycle, SchedulePolicy};
use crate::sensors::CurrentSensorAggregator;
use crate::sensors::water_level::{LevelThresholds, WaterLevel};

use super::commands::AppCommand;
use super::events::{ActuatorStatus, AppEvent, StatusReport};
use super::ports::{ClockPort, ClockReading, CurrentSensePort, EventSink, OutputPort, WaterLevelPort};

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

/// The control service orchestrates all domain logic.
pub struct ControlService {
    config: SystemConfig,
    policy: SchedulePolicy,
    authorities: [ActuatorAuthority; ActuatorId::COUNT],
    sensors: CurrentSensorAggregator,
    monitor: FaultMonitor,
    duty_cycles: [DutyCycle; ActuatorId::COUNT],
    sample_cadence: Cadence,
    status_cadence: Cadence,
    level_cadence: Cadence,
    level_thresholds: LevelThresholds,
    water_level: Option<WaterLevel>,
    /// Epoch seconds of the most recent tick or request.
    last_epoch: u64,
}

impl ControlService {
    /// Construct the service from configuration.
    ///
    /// Fails if the configuration does not validate.  Every actuator
    /// starts in auto mode, commanded off.
    pub fn new(config: SystemConfig) -> Result<Self, Error> {
        config.validate()?;
        let air_period = u64::from(config.air_pump_period_secs);
        Ok(Self {
            policy: SchedulePolicy::for_version(config.schedule),
            authorities: ActuatorId::ALL.map(ActuatorAuthority::new),
            sensors: CurrentSensorAggregator::new(
                config.calibration,
                config.samples_per_window,
                config.current_threshold_amps,
            ),
            monitor: FaultMonitor::new(u64::from(config.mismatch_debounce_secs)),
            duty_cycles: ActuatorId::ALL.map(|_| DutyCycle::new(air_period)),
            sample_cadence: Cadence::new(u64::from(config.sample_interval_ms)),
            status_cadence: Cadence::new(u64::from(config.status_interval_secs) * 1000),
            level_cadence: Cadence::new(u64::from(config.water_level_interval_secs) * 1000),
            level_thresholds: config.level_thresholds(),
            water_level: None,
            last_epoch: 0,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            schedule: self.config.schedule,
        });
        info!("ControlService started ({:?} schedule)", self.config.schedule);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies **all** hardware ports; this avoids a
    /// triple mutable borrow while keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        clock: &impl ClockPort,
        hw: &mut (impl CurrentSensePort + OutputPort + WaterLevelPort),
        sink: &mut impl EventSink,
    ) {
        let now = clock.now();
        self.last_epoch = now.epoch_secs;

        // 1. Current sampling
        if self.sample_cadence.due(now.uptime_ms) {
            self.sample_currents(hw);
        }

        // 2. Water level
        if self.level_cadence.due(now.uptime_ms) {
            self.read_water_level(hw);
        }

        // 3. Authorities
        for id in ActuatorId::ALL {
            let expired = self.authorities[id.index()].expire_override(now.epoch_secs);
            if expired {
                self.duty_cycles[id.index()].restart();
            }
            self.resolve_auto(id, &now);
            hw.set_output(id, self.authorities[id.index()].commanded());
            if expired {
                self.emit_mode(id, sink);
            }
        }

        // 4. Fault monitor
        for id in ActuatorId::ALL {
            let auth = &self.authorities[id.index()];
            let (commanded, sensed_on) = (auth.commanded(), auth.sensed_on());
            match self.monitor.observe(id, commanded, sensed_on, now.epoch_secs) {
                Some(AlarmTransition::Raised) => sink.emit(&AppEvent::AlarmRaised {
                    actuator: id,
                    commanded,
                    sensed_on,
                    label: alarm_label(id, commanded, sensed_on),
                }),
                Some(AlarmTransition::Cleared) => sink.emit(&AppEvent::AlarmCleared {
                    actuator: id,
                    label: alarm_label(id, commanded, sensed_on),
                }),
                None => {}
            }
        }

        // 5. Status
        if self.status_cadence.due(now.uptime_ms) {
            sink.emit(&AppEvent::Status(self.build_status()));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a request drained from the queue.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: &ClockReading,
        hw: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Override {
                actuator,
                on,
                minutes,
            } => self.request_override(actuator, on, minutes, now, hw, sink),
            AppCommand::Auto { actuator } => self.request_auto(actuator, now, hw, sink),
        }
    }

    /// Pin `id` to `on` and drive the output immediately.
    pub fn request_override(
        &mut self,
        id: ActuatorId,
        on: bool,
        minutes: i32,
        now: &ClockReading,
        hw: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        if minutes <= 0 {
            warn!("{id}: override for {minutes} min has already expired; auto resumes next tick");
        }
        self.last_epoch = now.epoch_secs;
        let auth = &mut self.authorities[id.index()];
        auth.request_override(
            on,
            minutes,
            now.epoch_secs,
            self.config.permanent_override_above_mins,
        );
        hw.set_output(id, auth.commanded());
        self.emit_mode(id, sink);
    }

    /// Return `id` to the schedule, resolve it at `now` and drive the
    /// output immediately.  A cycled actuator restarts in its on phase.
    pub fn request_auto(
        &mut self,
        id: ActuatorId,
        now: &ClockReading,
        hw: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        self.last_epoch = now.epoch_secs;
        self.authorities[id.index()].request_auto();
        self.duty_cycles[id.index()].restart();
        self.resolve_auto(id, now);
        hw.set_output(id, self.authorities[id.index()].commanded());
        self.emit_mode(id, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Command summary as of the most recent tick or request.
    pub fn query_command_label(&self, id: ActuatorId) -> Label {
        self.authorities[id.index()].command_label(self.last_epoch)
    }

    /// Last sensed on/off verdict.
    pub fn query_status(&self, id: ActuatorId) -> bool {
        self.authorities[id.index()].sensed_on()
    }

    pub fn query_alarm(&self, id: ActuatorId) -> bool {
        self.monitor.is_alarmed(id)
    }

    pub fn authority(&self, id: ActuatorId) -> &ActuatorAuthority {
        &self.authorities[id.index()]
    }

    pub fn alarm_state(&self, id: ActuatorId) -> AlarmState {
        self.monitor.state(id)
    }

    pub fn water_level(&self) -> Option<WaterLevel> {
        self.water_level
    }

    pub fn build_status(&self) -> StatusReport {
        StatusReport {
            epoch_secs: self.last_epoch,
            actuators: ActuatorId::ALL.map(|id| {
                let auth = &self.authorities[id.index()];
                ActuatorStatus {
                    actuator: id,
                    commanded: auth.commanded(),
                    sensed_on: auth.sensed_on(),
                    alarm: self.monitor.is_alarmed(id),
                    label: auth.command_label(self.last_epoch),
                }
            }),
            water_level: self.water_level,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn sample_currents(&mut self, hw: &mut impl CurrentSensePort) {
        for id in ActuatorId::ALL {
            let raw = hw.read_raw(id);
            match self.sensors.sample_and_drain(id, raw) {
                Some(Ok(verdict)) => {
                    debug!(
                        "{id}: {:.3} A (avg {:.1}) -> {}",
                        verdict.amps,
                        verdict.avg_adc,
                        on_off(verdict.sensed_on)
                    );
                    self.authorities[id.index()].set_sensed_on(verdict.sensed_on);
                }
                Some(Err(e)) => warn!("{id}: current window discarded: {e}"),
                None => {}
            }
        }
    }

    fn read_water_level(&mut self, hw: &mut impl WaterLevelPort) {
        match hw.read_distance_cm() {
            Some(cm) => {
                let level = self.level_thresholds.classify(cm);
                if self.water_level != Some(level) {
                    info!("Water level {:?} ({cm:.1} cm)", level);
                }
                self.water_level = Some(level);
            }
            None => warn!("Water level: no echo"),
        }
    }

    /// Resolve the schedule for `id` and adopt it unless overridden.
    fn resolve_auto(&mut self, id: ActuatorId, now: &ClockReading) {
        let auth = &mut self.authorities[id.index()];
        if auth.is_overridden() {
            return;
        }
        let monitor = &self.monitor;
        let desired = match self
            .policy
            .resolve(id, now.hour, now.minute, |a| monitor.is_alarmed(a))
        {
            AutoTarget::Level(on) => on,
            AutoTarget::DutyCycle => {
                self.duty_cycles[id.index()].phase(auth.commanded(), now.epoch_secs)
            }
        };
        if auth.apply_auto(desired) {
            info!("{id}: auto -> {}", on_off(desired));
        }
    }

    fn emit_mode(&self, id: ActuatorId, sink: &mut impl EventSink) {
        let label = self.query_command_label(id);
        info!("{id}: {label}");
        sink.emit(&AppEvent::ModeChanged { actuator: id, label });
    }
}

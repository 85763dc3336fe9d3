//! Fault monitor and current sensing through the control service.

use hydrorig::app::events::AppEvent;
use hydrorig::config::SystemConfig;
use hydrorig::control::ActuatorId;
use hydrorig::safety::AlarmState;
use hydrorig::sensors::current::CurrentCalibration;

use crate::mock_hw::{Rig, test_config};

const P1: ActuatorId = ActuatorId::Pump1;

#[test]
fn stalled_pump_alarms_exactly_after_debounce() {
    // 07:00: Pump 1 commanded on, but its current never rises.
    let mut rig = Rig::new(test_config(), 7, 0);
    rig.hw.stuck[P1.index()] = Some(false);
    rig.tick();
    let t0 = rig.epoch();
    assert!(rig.commanded(P1));
    assert_eq!(rig.svc.alarm_state(P1), AlarmState::Timing { deadline: t0 + 60 });

    rig.step(59);
    assert!(!rig.svc.query_alarm(P1));
    assert_eq!(rig.sink.alarms_raised(P1), 0);

    rig.step(1);
    assert!(rig.svc.query_alarm(P1));
    assert_eq!(rig.sink.alarms_raised(P1), 1);
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::AlarmRaised {
            actuator: P1,
            commanded: true,
            sensed_on: false,
            ..
        }
    )));
    assert_eq!(rig.sink.last_alarm_label(P1).as_deref(), Some("Pump 1: no current"));

    // Holds without re-raising while the fault persists.
    rig.run_secs(120);
    assert!(rig.svc.query_alarm(P1));
    assert_eq!(rig.sink.alarms_raised(P1), 1);
    assert_eq!(rig.svc.alarm_state(P1), AlarmState::Alarmed);

    // Pump recovers: cleared on the first agreeing observation.
    rig.hw.stuck[P1.index()] = None;
    rig.step(1);
    assert!(!rig.svc.query_alarm(P1));
    assert_eq!(rig.sink.alarms_cleared(P1), 1);
    assert_eq!(rig.sink.last_alarm_label(P1).as_deref(), Some("Pump 1: OK"));
    assert_eq!(rig.svc.alarm_state(P1), AlarmState::Clear);
}

#[test]
fn recovery_inside_debounce_never_alarms() {
    let mut rig = Rig::new(test_config(), 7, 0);
    rig.hw.stuck[P1.index()] = Some(false);
    rig.tick();
    let t0 = rig.epoch();

    rig.step(29);
    rig.hw.stuck[P1.index()] = None;
    rig.step(1);
    assert_eq!(rig.epoch(), t0 + 30);
    assert_eq!(rig.svc.alarm_state(P1), AlarmState::Clear);

    rig.run_secs(70);
    assert_eq!(rig.sink.alarms_raised(P1), 0);
    assert_eq!(rig.sink.alarms_cleared(P1), 0);
}

#[test]
fn welded_relay_alarms_when_commanded_off() {
    // 03:20: Pump 1 off by schedule, but current keeps flowing.
    let mut rig = Rig::new(test_config(), 3, 20);
    rig.hw.stuck[P1.index()] = Some(true);
    rig.tick();
    assert!(!rig.commanded(P1));
    rig.run_secs(60);
    assert!(rig.svc.query_alarm(P1));
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::AlarmRaised {
            actuator: P1,
            commanded: false,
            sensed_on: true,
            ..
        }
    )));
    assert_eq!(
        rig.sink.last_alarm_label(P1).as_deref(),
        Some("Pump 1: running while off")
    );
}

#[test]
fn override_matching_sensor_clears_alarm() {
    let mut rig = Rig::new(test_config(), 7, 0);
    rig.hw.stuck[P1.index()] = Some(false);
    rig.tick();
    rig.run_secs(60);
    assert!(rig.svc.query_alarm(P1));

    rig.override_(P1, false, 90);
    rig.tick();
    assert!(!rig.svc.query_alarm(P1));
    assert_eq!(rig.sink.alarms_cleared(P1), 1);
}

#[test]
fn healthy_rig_never_alarms() {
    let mut rig = Rig::new(test_config(), 5, 55);
    rig.tick();
    // Through the 06:00 switch-on, several pulses and air pump toggles.
    rig.run_secs(3 * 3600);
    for id in ActuatorId::ALL {
        assert_eq!(rig.sink.alarms_raised(id), 0, "{id}");
    }
}

#[test]
fn bad_window_holds_last_sensed_state() {
    let mut rig = Rig::new(test_config(), 7, 0);
    rig.tick();
    rig.run_secs(2);
    assert!(rig.svc.query_status(P1));

    // Out-of-range ADC values: every window is discarded.
    rig.hw.raw[P1.index()] = Some(5000);
    rig.run_secs(120);
    assert!(rig.svc.query_status(P1), "last good verdict is kept");
    assert!(!rig.svc.query_alarm(P1));
}

#[test]
fn failed_adc_read_discards_window_and_holds_state() {
    // 0.005 A per count: 101 counts is a marginal 0.505 A, so a single
    // zero folded into a 50-sample window would read as off.
    let cal = CurrentCalibration {
        scale: 0.005,
        zero_offset_volts: 0.0,
        gain: 1.0,
    };
    let config = SystemConfig {
        calibration: [cal; ActuatorId::COUNT],
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(config, 7, 0);
    rig.hw.raw[P1.index()] = Some(101);
    rig.tick();
    for _ in 0..49 {
        rig.step_ms(50);
    }
    assert!(rig.svc.query_status(P1));

    // One failed conversion, then a window of low readings around it.
    rig.hw.raw[P1.index()] = Some(0);
    rig.hw.failed_reads[P1.index()] = 1;
    for _ in 0..50 {
        rig.step_ms(50);
    }
    assert!(rig.svc.query_status(P1), "window with a failed read is discarded");

    // A dead ADC holds the last verdict and never trips the monitor.
    rig.hw.failed_reads[P1.index()] = u32::MAX;
    rig.run_secs(180);
    assert!(rig.svc.query_status(P1));
    assert!(!rig.svc.query_alarm(P1));
    assert_eq!(rig.sink.alarms_raised(P1), 0);
}

#[test]
fn window_verdict_uses_calibration_and_strict_threshold() {
    // Real 50-sample window; 0.005 A per count so 100 counts is exactly 0.5 A.
    let cal = CurrentCalibration {
        scale: 0.005,
        zero_offset_volts: 0.0,
        gain: 1.0,
    };
    let config = SystemConfig {
        calibration: [cal; ActuatorId::COUNT],
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(config, 3, 20);

    rig.hw.raw[P1.index()] = Some(101);
    rig.tick();
    for _ in 0..48 {
        rig.step_ms(50);
    }
    assert!(!rig.svc.query_status(P1), "49 samples: window still open");
    rig.step_ms(50);
    assert!(rig.svc.query_status(P1), "0.505 A is above threshold");

    rig.hw.raw[P1.index()] = Some(100);
    for _ in 0..50 {
        rig.step_ms(50);
    }
    assert!(!rig.svc.query_status(P1), "exactly 0.5 A reads as off");
}

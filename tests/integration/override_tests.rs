//! Override and auto requests through the control service.

use hydrorig::app::requests::RequestQueue;
use hydrorig::control::ActuatorId;
use hydrorig::control::authority::Mode;
use hydrorig::error::{ActuatorError, Error};

use crate::mock_hw::{Rig, test_config};

const P1: ActuatorId = ActuatorId::Pump1;
const P2: ActuatorId = ActuatorId::Pump2;
const AIR: ActuatorId = ActuatorId::AirPump;

#[test]
fn timed_override_expires_exactly_at_deadline() {
    // 08:00 is inside Pump 1's window, so auto would run it.
    let mut rig = Rig::new(test_config(), 8, 0);
    rig.tick();
    assert!(rig.commanded(P1));

    let t0 = rig.epoch();
    rig.override_(P1, false, 30);
    assert_eq!(rig.svc.authority(P1).override_expiry(), Some(t0 + 1800));
    assert!(!rig.hw.output(P1), "override drives the output immediately");

    rig.step(1799);
    assert_eq!(rig.epoch(), t0 + 1799);
    assert!(!rig.commanded(P1));
    assert!(rig.svc.authority(P1).is_overridden());

    rig.step(1);
    assert_eq!(rig.epoch(), t0 + 1800);
    assert_eq!(rig.svc.authority(P1).mode(), Mode::Auto);
    assert!(rig.commanded(P1), "reverts to auto within the same tick");
    assert!(rig.hw.output(P1));
    assert_eq!(rig.sink.last_mode_label(P1).as_deref(), Some("On - Auto"));
}

#[test]
fn long_override_is_permanent() {
    let mut rig = Rig::new(test_config(), 8, 0);
    rig.tick();
    rig.override_(P1, false, 90);
    assert_eq!(rig.svc.authority(P1).override_expiry(), None);
    assert_eq!(rig.label(P1), "Off - Override (Permanent)");

    // Two days of hourly ticks, crossing every schedule window.
    for _ in 0..48 {
        rig.step(3600);
        assert!(rig.svc.authority(P1).is_overridden());
        assert!(!rig.commanded(P1));
        assert!(!rig.hw.output(P1));
    }
}

#[test]
fn override_is_never_perturbed_by_schedule() {
    // Pin Pump 2 on at 01:00 and walk through its window and pulses.
    let mut rig = Rig::new(test_config(), 1, 0);
    rig.tick();
    rig.override_(P2, true, 61);
    for _ in 0..(24 * 60) {
        rig.step(60);
        assert!(rig.commanded(P2));
        assert!(rig.hw.output(P2));
    }
}

#[test]
fn auto_request_resolves_immediately() {
    let mut rig = Rig::new(test_config(), 13, 10);
    rig.tick();
    assert!(rig.commanded(P2), "13:10 is inside Pump 2's window");

    rig.override_(P2, false, 90);
    assert!(!rig.hw.output(P2));

    rig.auto(P2);
    assert_eq!(rig.svc.authority(P2).mode(), Mode::Auto);
    assert!(rig.commanded(P2));
    assert!(rig.hw.output(P2), "output driven without waiting for a tick");
    assert_eq!(rig.label(P2), "On - Auto");
}

#[test]
fn repeated_auto_request_is_idempotent() {
    let mut rig = Rig::new(test_config(), 9, 45);
    rig.tick();
    rig.run_secs(5);

    for id in [P1, P2, AIR] {
        rig.auto(id);
        let once = (rig.commanded(id), rig.hw.output(id), rig.label(id));
        rig.auto(id);
        let twice = (rig.commanded(id), rig.hw.output(id), rig.label(id));
        assert_eq!(once, twice, "{id}");
    }
}

#[test]
fn non_positive_minutes_revert_on_next_tick() {
    let mut rig = Rig::new(test_config(), 3, 20);
    rig.tick();
    assert!(!rig.commanded(P1));

    rig.override_(P1, true, 0);
    assert!(rig.hw.output(P1), "still applied immediately");
    assert!(rig.svc.authority(P1).is_overridden());
    rig.tick();
    assert!(!rig.svc.authority(P1).is_overridden());
    assert!(!rig.commanded(P1));

    rig.override_(P1, true, -5);
    assert_eq!(rig.svc.authority(P1).override_expiry(), Some(rig.epoch() - 300));
    rig.tick();
    assert!(!rig.svc.authority(P1).is_overridden());
}

#[test]
fn label_counts_down_remaining_minutes() {
    let mut rig = Rig::new(test_config(), 3, 0);
    rig.tick();
    rig.override_(AIR, false, 30);
    assert_eq!(rig.label(AIR), "Off - Override (30 min)");
    rig.step(600);
    assert_eq!(rig.label(AIR), "Off - Override (20 min)");
    rig.step(30);
    assert_eq!(rig.label(AIR), "Off - Override (20 min)", "rounds up");
}

#[test]
fn queued_requests_apply_whole_before_tick() {
    let queue = RequestQueue::new();
    let mut rig = Rig::new(test_config(), 3, 20);
    rig.tick();

    queue.submit_override_raw(1, true, 15).unwrap();
    queue.submit_auto_raw(0).unwrap();
    assert_eq!(
        queue.submit_override_raw(3, true, 15),
        Err(Error::Actuator(ActuatorError::UnknownActuator(3)))
    );

    let now = rig.now();
    let applied = queue.drain(|cmd| rig.svc.handle_command(cmd, &now, &mut rig.hw, &mut rig.sink));
    assert_eq!(applied, 2);
    assert!(queue.is_empty());
    assert!(rig.svc.authority(P2).is_overridden());
    assert!(rig.hw.output(P2));
    assert_eq!(rig.label(P2), "On - Override (15 min)");
    assert_eq!(rig.svc.authority(P1).mode(), Mode::Auto);
}

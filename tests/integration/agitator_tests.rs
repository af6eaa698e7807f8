//! Integration tests for the tick driver: inbox → buttons → phase check.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use crate::mock_hw::{FakeButton, MockHardware, MotorCall, RecordingSink};

use agitator::adapters::hardware::HardwareAdapter;
use agitator::adapters::time::Esp32TimeAdapter;
use agitator::agitator::Agitator;
use agitator::app::commands::{Command, RunLength};
use agitator::app::events::AppEvent;
use agitator::app::inbox::{self, CommandQueue, INBOX_CAP};
use agitator::app::ports::{MotorPort, TimePort};
use agitator::config::{AgitatorConfig, Timings};
use agitator::control::duty::percent_to_duty;
use agitator::drivers::hbridge::HBridgeDriver;
use agitator::drivers::watchdog;
use agitator::fsm::Phase;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

fn bench_config() -> AgitatorConfig {
    AgitatorConfig {
        pwm_resolution_bits: 8,
        cruise_percent: 50.0,
        timings: Timings {
            ramp_up_ms: 300,
            ramp_down_ms: 200,
            coast_between_ms: 500,
            forward_run_ms: 1000,
            reverse_run_ms: 1000,
        },
        debounce_ms: 30,
        status_interval_ms: 0,
        ..AgitatorConfig::default()
    }
}

// ── Buttons ───────────────────────────────────────────────────

#[test]
fn start_button_toggles_run() {
    let mut queue = CommandQueue::new();
    let (_tx, rx) = inbox::channel(&mut queue);
    let start = FakeButton::released();
    let mut ag = Agitator::new(bench_config(), MockHardware::new(), start.clone(), None, rx);
    let mut sink = RecordingSink::new();

    start.press();
    ag.tick(&mut sink);
    assert!(!ag.service().is_running(), "still inside debounce window");

    ag.hw_mut().set_now(30);
    ag.tick(&mut sink);
    assert!(ag.service().is_running());

    // Release edges never start or stop anything.
    start.release();
    ag.tick(&mut sink);
    let t = ag.hw().now_ms();
    ag.hw_mut().set_now(t + 30);
    ag.tick(&mut sink);
    assert!(ag.service().is_running());

    start.press();
    ag.tick(&mut sink);
    let t = ag.hw().now_ms();
    ag.hw_mut().set_now(t + 30);
    ag.tick(&mut sink);
    assert!(!ag.service().is_running());
    assert_eq!(ag.hw().last_write(), Some(MotorCall::Coast));
}

#[test]
fn bouncing_contact_counts_once() {
    let mut queue = CommandQueue::new();
    let (_tx, rx) = inbox::channel(&mut queue);
    let start = FakeButton::released();
    let mut ag = Agitator::new(bench_config(), MockHardware::new(), start.clone(), None, rx);
    let mut sink = RecordingSink::new();

    for (now, pressed) in [(0, true), (5, false), (9, true), (14, false), (20, true)] {
        if pressed {
            start.press();
        } else {
            start.release();
        }
        ag.hw_mut().set_now(now);
        ag.tick(&mut sink);
    }
    assert!(!ag.service().is_running());

    ag.hw_mut().set_now(50);
    ag.tick(&mut sink);
    assert!(ag.service().is_running());
    let starts = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Started { .. }))
        .count();
    assert_eq!(starts, 1);
}

#[test]
fn stop_button_coasts() {
    let mut queue = CommandQueue::new();
    let (mut tx, rx) = inbox::channel(&mut queue);
    let start = FakeButton::released();
    let stop = FakeButton::released();
    let mut ag = Agitator::new(
        bench_config(),
        MockHardware::new(),
        start,
        Some(stop.clone()),
        rx,
    );
    let mut sink = RecordingSink::new();

    tx.send(Command::Start(RunLength::Continuous));
    ag.tick(&mut sink);
    assert!(ag.service().is_running());

    stop.press();
    ag.tick(&mut sink);
    let t = ag.hw().now_ms();
    ag.hw_mut().set_now(t + 30);
    ag.tick(&mut sink);

    assert_eq!(ag.service().phase(), Phase::Idle);
    assert!(sink.events.contains(&AppEvent::Stopped { braked: false }));
}

// ── Ordering ──────────────────────────────────────────────────

#[test]
fn inbox_runs_before_button_in_same_tick() {
    let mut queue = CommandQueue::new();
    let (mut tx, rx) = inbox::channel(&mut queue);
    let start = FakeButton::released();
    let mut ag = Agitator::new(bench_config(), MockHardware::new(), start.clone(), None, rx);
    let mut sink = RecordingSink::new();

    start.press();
    ag.tick(&mut sink);

    // Both mature in the same tick: the queued start runs, then the button
    // press toggles the fresh run off again.
    tx.send(Command::Start(RunLength::Continuous));
    ag.hw_mut().set_now(30);
    ag.tick(&mut sink);

    assert_eq!(ag.service().phase(), Phase::Idle);
    assert_eq!(
        sink.events,
        vec![
            AppEvent::Started { duration_ms: None },
            AppEvent::Stopped { braked: false }
        ]
    );
}

#[test]
fn inbox_runs_one_command_per_tick_in_order() {
    let mut queue = CommandQueue::new();
    let (mut tx, rx) = inbox::channel(&mut queue);
    let mut ag = Agitator::new(
        bench_config(),
        MockHardware::new(),
        FakeButton::released(),
        None,
        rx,
    );
    let mut sink = RecordingSink::new();

    tx.send(Command::SetCruise(100.0));
    tx.send(Command::JogForward);
    tx.send(Command::StopBrake);

    ag.tick(&mut sink);
    assert_eq!(ag.queued(), 2);
    assert!(ag.hw().writes().is_empty());

    ag.tick(&mut sink);
    assert_eq!(ag.queued(), 1);
    assert_eq!(ag.hw().last_write(), Some(MotorCall::Forward(255)));

    ag.tick(&mut sink);
    assert_eq!(ag.queued(), 0);
    assert_eq!(ag.hw().last_write(), Some(MotorCall::Brake));
}

#[test]
fn command_burst_never_blocks_past_watchdog() {
    let config = AgitatorConfig::default();
    let timeout = watchdog::timeout_for(&config.timings);
    let cruise = percent_to_duty(config.cruise_percent, config.pwm_resolution_bits);
    let mut queue = CommandQueue::new();
    let (mut tx, rx) = inbox::channel(&mut queue);
    let mut ag = Agitator::new(config, MockHardware::new(), FakeButton::released(), None, rx);
    let mut sink = RecordingSink::new();

    for i in 0..INBOX_CAP - 1 {
        let jog = if i % 2 == 0 {
            Command::JogForward
        } else {
            Command::JogReverse
        };
        assert!(tx.send(jog));
    }

    let mut total = 0;
    while ag.queued() > 0 {
        let before = ag.hw().now_ms();
        ag.tick(&mut sink);
        let blocked = ag.hw().now_ms().wrapping_sub(before);
        assert!(blocked < timeout, "tick blocked {blocked} ms, watchdog {timeout} ms");
        total += blocked;
    }
    // The burst as a whole outlasts one watchdog period; it only survives
    // because the loop feeds the watchdog between ticks.
    assert!(total > timeout);
    assert_eq!(ag.hw().last_write(), Some(MotorCall::Forward(cruise)));
    assert_eq!(ag.service().phase(), Phase::Idle);
}

#[test]
fn phase_check_runs_every_tick() {
    let mut queue = CommandQueue::new();
    let (mut tx, rx) = inbox::channel(&mut queue);
    let mut ag = Agitator::new(
        bench_config(),
        MockHardware::new(),
        FakeButton::released(),
        None,
        rx,
    );
    let mut sink = RecordingSink::new();

    tx.send(Command::Start(RunLength::Continuous));
    ag.tick(&mut sink);
    let t0 = ag.hw().now_ms();

    ag.hw_mut().set_now(t0 + 1000);
    ag.tick(&mut sink);
    assert_eq!(ag.service().phase(), Phase::RunningReverse);
}

#[test]
fn direct_handle_bypasses_inbox() {
    let mut queue = CommandQueue::new();
    let (_tx, rx) = inbox::channel(&mut queue);
    let mut ag = Agitator::new(
        bench_config(),
        MockHardware::new(),
        FakeButton::released(),
        None,
        rx,
    );
    let mut sink = RecordingSink::new();

    ag.handle(Command::TestIn2, &mut sink);
    assert_eq!(ag.hw().calls, vec![MotorCall::Raw { in1: 0, in2: 128 }]);
}

// ── Hardware adapter over fake PWM legs ───────────────────────

#[derive(Clone, Default)]
struct FakePwm(Rc<Cell<u16>>);

impl ErrorType for FakePwm {
    type Error = Infallible;
}

impl SetDutyCycle for FakePwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.0.set(duty);
        Ok(())
    }
}

#[test]
fn hardware_adapter_maps_primitives_to_legs() {
    let in1 = FakePwm::default();
    let in2 = FakePwm::default();
    let bridge = HBridgeDriver::new(in1.clone(), in2.clone(), 255).unwrap();
    let mut hw = HardwareAdapter::new(bridge, Esp32TimeAdapter::new());
    let legs = || (in1.0.get(), in2.0.get());

    hw.drive_forward(100);
    assert_eq!(legs(), (100, 0));
    hw.drive_reverse(60);
    assert_eq!(legs(), (0, 60));
    hw.brake();
    assert_eq!(legs(), (255, 255));
    hw.coast();
    assert_eq!(legs(), (0, 0));
    hw.write_raw(999, 7);
    assert_eq!(legs(), (255, 7), "duty is clamped to duty_max");
    assert_eq!(hw.bridge().write_failures(), 0);

    let before = hw.now_ms();
    hw.sleep_ms(2);
    assert!(hw.now_ms().wrapping_sub(before) >= 2);
}

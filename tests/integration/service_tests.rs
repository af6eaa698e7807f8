//! Integration tests for the AgitationService → ramps → MotorPort pipeline.
//!
//! Everything runs against [`MockHardware`] with a simulated clock, so a
//! ten-second phase costs nothing and every bridge write is visible.

use crate::mock_hw::{MockHardware, MotorCall, RecordingSink};

use agitator::app::commands::{Command, RunLength, VERBS};
use agitator::app::events::{AppEvent, DriveOutput};
use agitator::app::ports::TimePort;
use agitator::app::service::AgitationService;
use agitator::config::{AgitatorConfig, Timings};
use agitator::drivers::hbridge::Direction;
use agitator::fsm::Phase;

/// 8-bit bridge (duty_max 255), 50 % cruise, 1 s phases.
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
        default_run_duration_ms: 0,
        status_interval_ms: 0,
        ..AgitatorConfig::default()
    }
}

fn make_service(config: AgitatorConfig) -> (AgitationService, MockHardware, RecordingSink) {
    (
        AgitationService::new(config),
        MockHardware::new(),
        RecordingSink::new(),
    )
}

/// 50 % of 255 rounded half away from zero.
const HALF_DUTY_8BIT: u16 = 128;

fn is_non_increasing(v: &[u16]) -> bool {
    v.windows(2).all(|w| w[0] >= w[1])
}

fn is_non_decreasing(v: &[u16]) -> bool {
    v.windows(2).all(|w| w[0] <= w[1])
}

// ── Start ─────────────────────────────────────────────────────

#[test]
fn start_ramps_forward_to_cruise() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());

    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);

    let duties = hw.forward_duties();
    assert_eq!(duties.len(), 30, "300 ms ramp = 30 steps of 10 ms");
    assert!(is_non_decreasing(&duties));
    assert_eq!(*duties.last().unwrap(), HALF_DUTY_8BIT);
    assert!(hw.reverse_duties().is_empty(), "start always begins forward");
    assert_eq!(hw.now_ms(), 300);

    assert_eq!(svc.phase(), Phase::RunningForward);
    assert!(svc.is_running());
    assert_eq!(svc.output(), DriveOutput::Forward(HALF_DUTY_8BIT));
    assert_eq!(sink.events, vec![AppEvent::Started { duration_ms: None }]);
}

#[test]
fn start_while_running_is_ignored() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);
    hw.clear();

    svc.handle_command(Command::Start(RunLength::Timed(5_000)), &mut hw, &mut sink);

    assert!(hw.calls.is_empty());
    assert_eq!(sink.ignored_count(), 1);
    let report = svc.query_state(hw.now_ms());
    assert_eq!(report.run_remaining_ms, None, "deadline must not be re-armed");
}

// ── Phase cycle ───────────────────────────────────────────────

#[test]
fn forward_flips_to_reverse_exactly_at_run_time() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);
    let t0 = hw.now_ms();
    hw.clear();

    hw.set_now(t0 + 999);
    svc.tick(&mut hw, &mut sink);
    assert_eq!(svc.phase(), Phase::RunningForward);
    assert!(hw.calls.is_empty());

    hw.set_now(t0 + 1000);
    svc.tick(&mut hw, &mut sink);
    assert_eq!(svc.phase(), Phase::RunningReverse);

    // Ramp down forward, coast, pause, ramp up reverse.
    let down = hw.forward_duties();
    assert_eq!(down.len(), 20);
    assert!(is_non_increasing(&down));
    assert_eq!(*down.last().unwrap(), 0);

    let coast_at = hw.calls.iter().position(|c| *c == MotorCall::Coast).unwrap();
    let pause_at = hw
        .calls
        .iter()
        .position(|c| *c == MotorCall::Sleep(500))
        .unwrap();
    let first_rev = hw
        .calls
        .iter()
        .position(|c| matches!(c, MotorCall::Reverse(_)))
        .unwrap();
    let last_fwd = hw
        .calls
        .iter()
        .rposition(|c| matches!(c, MotorCall::Forward(_)))
        .unwrap();
    assert!(last_fwd < coast_at && coast_at < pause_at && pause_at < first_rev);

    let up = hw.reverse_duties();
    assert_eq!(up.len(), 30);
    assert!(is_non_decreasing(&up));
    assert_eq!(*up.last().unwrap(), HALF_DUTY_8BIT);

    assert!(sink.events.contains(&AppEvent::PhaseChanged {
        from: Phase::RunningForward,
        to: Phase::RunningReverse,
    }));
}

#[test]
fn continuous_run_alternates_until_stopped() {
    let mut config = bench_config();
    config.timings.reverse_run_ms = 700;
    let (mut svc, mut hw, mut sink) = make_service(config);
    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);

    let mut expected = Phase::RunningForward;
    for _ in 0..8 {
        let run = match expected {
            Phase::RunningForward => 1000,
            _ => 700,
        };
        let phase_start = hw.now_ms();

        hw.set_now(phase_start + run - 1);
        svc.tick(&mut hw, &mut sink);
        assert_eq!(svc.phase(), expected);

        hw.set_now(phase_start + run);
        svc.tick(&mut hw, &mut sink);
        expected = match expected {
            Phase::RunningForward => Phase::RunningReverse,
            _ => Phase::RunningForward,
        };
        assert_eq!(svc.phase(), expected);
    }

    svc.handle_command(Command::StopCoast, &mut hw, &mut sink);
    assert_eq!(svc.phase(), Phase::Idle);
    let phase_changes = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::PhaseChanged { .. }))
        .count();
    assert_eq!(phase_changes, 8);
}

#[test]
fn cruise_change_lands_at_next_flip() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);
    let t0 = hw.now_ms();
    hw.clear();

    svc.handle_command(Command::SetCruise(100.0), &mut hw, &mut sink);
    assert!(hw.calls.is_empty(), "no mid-phase speed change");

    hw.set_now(t0 + 1000);
    svc.tick(&mut hw, &mut sink);
    assert_eq!(*hw.reverse_duties().last().unwrap(), 255);
    // Ramp down starts from the old cruise.
    assert!(hw.forward_duties()[0] < HALF_DUTY_8BIT);
}

// ── Timed runs ────────────────────────────────────────────────

#[test]
fn timed_run_reaches_idle_within_one_tick_of_deadline() {
    for duration in [450u32, 1_500, 2_700, 4_200, 5_000] {
        let (mut svc, mut hw, mut sink) = make_service(bench_config());
        svc.handle_command(Command::Start(RunLength::Timed(duration)), &mut hw, &mut sink);

        let mut guard = 0;
        loop {
            if hw.now_ms() >= duration {
                svc.tick(&mut hw, &mut sink);
                assert_eq!(svc.phase(), Phase::Idle, "D={duration}");
                assert!(!svc.is_running());
                break;
            }
            svc.tick(&mut hw, &mut sink);
            assert!(svc.is_running(), "stopped early for D={duration}");
            hw.advance(100);
            guard += 1;
            assert!(guard < 1_000);
        }
        assert_eq!(hw.last_write(), Some(MotorCall::Coast));
        assert!(sink.events.contains(&AppEvent::Stopped { braked: false }));
    }
}

#[test]
fn run_end_wins_over_phase_timeout() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    // Deadline and the first flip coincide at t = 1300.
    svc.handle_command(Command::Start(RunLength::Timed(1_300)), &mut hw, &mut sink);
    hw.clear();
    hw.set_now(1_300);

    svc.tick(&mut hw, &mut sink);

    assert_eq!(svc.phase(), Phase::Idle);
    assert!(hw.reverse_duties().is_empty(), "must not flip on the way out");
}

#[test]
fn default_run_length_comes_from_config() {
    let mut config = bench_config();
    config.default_run_duration_ms = 60_000;
    let (mut svc, mut hw, mut sink) = make_service(config);

    svc.handle_command(Command::Start(RunLength::Default), &mut hw, &mut sink);

    let report = svc.query_state(hw.now_ms());
    assert_eq!(report.run_remaining_ms, Some(60_000 - 300));
    assert_eq!(
        sink.events[0],
        AppEvent::Started {
            duration_ms: Some(60_000)
        }
    );
}

#[test]
fn timed_run_across_clock_wrap() {
    let mut config = bench_config();
    config.timings.forward_run_ms = 10_000;
    let (mut svc, _, mut sink) = make_service(config);
    let start = u32::MAX - 500;
    let mut hw = MockHardware::starting_at(start);

    svc.handle_command(Command::Start(RunLength::Timed(2_000)), &mut hw, &mut sink);
    hw.set_now(start.wrapping_add(1_999));
    svc.tick(&mut hw, &mut sink);
    assert!(svc.is_running());

    hw.set_now(start.wrapping_add(2_000));
    svc.tick(&mut hw, &mut sink);
    assert_eq!(svc.phase(), Phase::Idle);
}

// ── Stops ─────────────────────────────────────────────────────

#[test]
fn stop_brake_is_immediate() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);
    hw.clear();

    svc.handle_command(Command::StopBrake, &mut hw, &mut sink);

    assert_eq!(hw.calls, vec![MotorCall::Brake], "no ramp, no pause");
    assert_eq!(svc.phase(), Phase::Idle);
    assert!(!svc.is_running());
    assert_eq!(svc.output(), DriveOutput::Brake);
    assert!(sink.events.contains(&AppEvent::Stopped { braked: true }));
}

#[test]
fn stop_coast_ramps_down_in_current_direction() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);
    let t0 = hw.now_ms();
    hw.set_now(t0 + 1000);
    svc.tick(&mut hw, &mut sink);
    assert_eq!(svc.phase(), Phase::RunningReverse);
    hw.clear();

    svc.handle_command(Command::StopCoast, &mut hw, &mut sink);

    let down = hw.reverse_duties();
    assert_eq!(down.len(), 20);
    assert!(is_non_increasing(&down));
    assert_eq!(*down.last().unwrap(), 0);
    assert!(hw.forward_duties().is_empty());
    assert_eq!(hw.last_write(), Some(MotorCall::Coast));
    assert_eq!(svc.phase(), Phase::Idle);
}

#[test]
fn stops_while_idle_only_touch_hardware() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());

    svc.handle_command(Command::StopCoast, &mut hw, &mut sink);
    svc.handle_command(Command::StopBrake, &mut hw, &mut sink);

    assert_eq!(hw.calls, vec![MotorCall::Coast, MotorCall::Brake]);
    assert_eq!(svc.phase(), Phase::Idle);
    assert!(
        !sink.events.iter().any(|e| matches!(e, AppEvent::Stopped { .. })),
        "nothing was running"
    );
}

#[test]
fn toggle_starts_then_coasts() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());

    svc.handle_command(Command::Toggle, &mut hw, &mut sink);
    assert!(svc.is_running());

    svc.handle_command(Command::Toggle, &mut hw, &mut sink);
    assert!(!svc.is_running());
    assert_eq!(hw.last_write(), Some(MotorCall::Coast));
}

// ── Cruise ────────────────────────────────────────────────────

#[test]
fn cruise_is_clamped_when_stored() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());

    svc.handle_command(Command::SetCruise(150.0), &mut hw, &mut sink);
    assert_eq!(svc.query_state(0).cruise_percent, 100.0);

    svc.handle_command(Command::SetCruise(-3.0), &mut hw, &mut sink);
    assert_eq!(svc.query_state(0).cruise_percent, 0.0);

    svc.handle_command(Command::SetCruise(f32::NAN), &mut hw, &mut sink);
    assert_eq!(svc.query_state(0).cruise_percent, 0.0);

    assert!(sink.events.contains(&AppEvent::CruiseChanged(100.0)));
}

// ── Jog ───────────────────────────────────────────────────────

#[test]
fn jog_drives_without_engaging_cycle() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());

    svc.handle_command(Command::JogForward, &mut hw, &mut sink);

    assert_eq!(*hw.forward_duties().last().unwrap(), HALF_DUTY_8BIT);
    assert_eq!(svc.phase(), Phase::Idle);
    assert!(!svc.is_running());
    assert_eq!(svc.output(), DriveOutput::Forward(HALF_DUTY_8BIT));
    assert!(sink.events.contains(&AppEvent::Jog(Direction::Forward)));

    // Idle ticks never touch a jogging motor.
    hw.clear();
    hw.advance(60_000);
    svc.tick(&mut hw, &mut sink);
    assert!(hw.calls.is_empty());
}

#[test]
fn opposite_jog_passes_through_zero() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::JogForward, &mut hw, &mut sink);
    hw.clear();

    svc.handle_command(Command::JogReverse, &mut hw, &mut sink);

    let down = hw.forward_duties();
    assert_eq!(*down.last().unwrap(), 0);
    let coast_at = hw.calls.iter().position(|c| *c == MotorCall::Coast).unwrap();
    let first_rev = hw
        .calls
        .iter()
        .position(|c| matches!(c, MotorCall::Reverse(_)))
        .unwrap();
    assert!(coast_at < first_rev);
    assert_eq!(*hw.reverse_duties().last().unwrap(), HALF_DUTY_8BIT);
}

#[test]
fn start_after_reverse_jog_ramps_down_first() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::JogReverse, &mut hw, &mut sink);
    hw.clear();

    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);

    assert_eq!(*hw.reverse_duties().last().unwrap(), 0);
    assert_eq!(*hw.forward_duties().last().unwrap(), HALF_DUTY_8BIT);
    assert_eq!(svc.phase(), Phase::RunningForward);
}

#[test]
fn jog_while_running_is_ignored() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);
    hw.clear();

    svc.handle_command(Command::JogReverse, &mut hw, &mut sink);

    assert!(hw.calls.is_empty());
    assert_eq!(svc.phase(), Phase::RunningForward);
    assert_eq!(sink.ignored_count(), 1);
}

// ── Diagnostics ───────────────────────────────────────────────

#[test]
fn diagnostics_bypass_phase_bookkeeping() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::Start(RunLength::Continuous), &mut hw, &mut sink);
    hw.clear();

    svc.handle_command(Command::TestIn1, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![MotorCall::Raw { in1: 128, in2: 0 }]);
    assert_eq!(svc.phase(), Phase::RunningForward);
    assert!(svc.is_running());
    assert_eq!(
        svc.query_state(0).output,
        DriveOutput::Diagnostic { in1: 128, in2: 0 }
    );

    svc.handle_command(Command::TestIn2, &mut hw, &mut sink);
    svc.handle_command(Command::AllOff, &mut hw, &mut sink);
    assert_eq!(
        hw.writes()[1..],
        [
            MotorCall::Raw { in1: 0, in2: 128 },
            MotorCall::Raw { in1: 0, in2: 0 }
        ]
    );
    assert_eq!(svc.phase(), Phase::RunningForward);
}

// ── Reports ───────────────────────────────────────────────────

#[test]
fn query_state_reports_current_snapshot() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::Start(RunLength::Timed(10_000)), &mut hw, &mut sink);
    hw.set_now(1_300);

    svc.handle_command(Command::QueryState, &mut hw, &mut sink);

    let Some(AppEvent::Status(report)) = sink.events.last() else {
        panic!("expected a status event, got {:?}", sink.events.last());
    };
    assert_eq!(report.uptime_ms, 1_300);
    assert!(report.is_running);
    assert_eq!(report.phase, Phase::RunningForward);
    assert_eq!(report.cruise_percent, 50.0);
    assert_eq!(report.run_remaining_ms, Some(8_700));
}

#[test]
fn status_broadcast_follows_interval() {
    let mut config = bench_config();
    config.status_interval_ms = 2_000;
    let (mut svc, mut hw, mut sink) = make_service(config);

    for (now, expected) in [(1_999, 0), (2_000, 1), (3_999, 1), (4_000, 2), (9_000, 3)] {
        hw.set_now(now);
        svc.tick(&mut hw, &mut sink);
        assert_eq!(sink.status_count(), expected, "at {now} ms");
    }
}

#[test]
fn zero_interval_disables_broadcast() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    hw.set_now(100_000);
    svc.tick(&mut hw, &mut sink);
    assert_eq!(sink.status_count(), 0);
}

#[test]
fn help_lists_every_verb() {
    let (mut svc, mut hw, mut sink) = make_service(bench_config());
    svc.handle_command(Command::Help, &mut hw, &mut sink);
    assert_eq!(sink.events, vec![AppEvent::Help(VERBS)]);
    assert!(hw.calls.is_empty());
}

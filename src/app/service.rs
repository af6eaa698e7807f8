//! Application service: the hexagonal core.
//!
//! [`AgitationService`] owns the phase machine, the live cruise setting and
//! the record of what the bridge is currently doing.  It exposes a
//! hardware-agnostic API; all I/O flows through port traits injected at call
//! sites, making the whole motion sequence testable against a simulated
//! clock.
//!
//! ```text
//!    Command ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                │   AgitationService     │
//!  MotorPort ◀── │  PhaseMachine · Ramps  │ ◀── TimePort
//!                └────────────────────────┘
//! ```
//!
//! Ramps and the coast pause block inside a call.  Nothing else can run
//! until they finish, so a command issued mid-ramp takes effect afterwards.

use log::{debug, info, warn};

use crate::config::AgitatorConfig;
use crate::control::duty::{clamp_percent, percent_to_duty};
use crate::control::ramp::Ramp;
use crate::drivers::hbridge::Direction;
use crate::fsm::{Phase, PhaseMachine, Transition};

use super::commands::{Command, RunLength, VERBS};
use super::events::{AppEvent, DriveOutput, StatusReport};
use super::ports::{EventSink, MotorPort, TimePort};

/// Duty percentage of the single-leg wiring checks.
const DIAGNOSTIC_PERCENT: f32 = 50.0;

// ───────────────────────────────────────────────────────────────
// AgitationService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AgitationService {
    config: AgitatorConfig,
    machine: PhaseMachine,
    cruise_percent: f32,
    output: DriveOutput,
    last_status_at: u32,
}

impl AgitationService {
    /// Construct the service idle, bridge assumed coasting.
    pub fn new(config: AgitatorConfig) -> Self {
        let cruise_percent = clamp_percent(config.cruise_percent);
        Self {
            config,
            machine: PhaseMachine::new(),
            cruise_percent,
            output: DriveOutput::Coast,
            last_status_at: 0,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Phase check (run end, then phase timeout) followed by the periodic
    /// status broadcast.
    pub fn tick(&mut self, hw: &mut (impl MotorPort + TimePort), sink: &mut impl EventSink) {
        let now = hw.now_ms();
        match self.machine.evaluate(now, &self.config.timings) {
            Some(Transition::Finish) => {
                info!("timed run complete");
                self.stop_coast(hw, sink);
            }
            Some(Transition::Reverse { to }) => self.reverse(to, hw, sink),
            None => {}
        }

        let interval = self.config.status_interval_ms;
        if interval > 0 {
            let now = hw.now_ms();
            if now.wrapping_sub(self.last_status_at) >= interval {
                self.last_status_at = now;
                sink.emit(&AppEvent::Status(self.query_state(now)));
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Execute one command.  Commands that make no sense in the current
    /// state are ignored and reported as [`AppEvent::CommandIgnored`].
    pub fn handle_command(
        &mut self,
        cmd: Command,
        hw: &mut (impl MotorPort + TimePort),
        sink: &mut impl EventSink,
    ) {
        debug!("command {:?}", cmd);
        match cmd {
            Command::Start(length) => {
                if self.machine.is_running() {
                    self.ignore(cmd, sink);
                } else {
                    self.start(length, hw, sink);
                }
            }
            Command::Toggle => {
                if self.machine.is_running() {
                    self.stop_coast(hw, sink);
                } else {
                    self.start(RunLength::Default, hw, sink);
                }
            }
            Command::StopCoast => self.stop_coast(hw, sink),
            Command::StopBrake => self.stop_brake(hw, sink),
            Command::JogForward | Command::JogReverse => {
                let direction = if cmd == Command::JogForward {
                    Direction::Forward
                } else {
                    Direction::Reverse
                };
                if self.machine.is_running() {
                    self.ignore(cmd, sink);
                } else {
                    info!("manual {:?} at {:.1}%", direction, self.cruise_percent);
                    self.drive_to(direction, self.cruise_duty(), hw);
                    sink.emit(&AppEvent::Jog(direction));
                }
            }
            Command::SetCruise(pct) => {
                self.cruise_percent = clamp_percent(pct);
                info!("cruise set to {:.1}%", self.cruise_percent);
                sink.emit(&AppEvent::CruiseChanged(self.cruise_percent));
            }
            Command::QueryState => {
                sink.emit(&AppEvent::Status(self.query_state(hw.now_ms())));
            }
            Command::TestIn1 => {
                let half = percent_to_duty(DIAGNOSTIC_PERCENT, self.config.pwm_resolution_bits);
                self.diagnostic(half, 0, hw, sink);
            }
            Command::TestIn2 => {
                let half = percent_to_duty(DIAGNOSTIC_PERCENT, self.config.pwm_resolution_bits);
                self.diagnostic(0, half, hw, sink);
            }
            Command::AllOff => self.diagnostic(0, 0, hw, sink),
            Command::Help => sink.emit(&AppEvent::Help(VERBS)),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of the externally visible state at `now`.
    pub fn query_state(&self, now: u32) -> StatusReport {
        StatusReport {
            uptime_ms: now,
            is_running: self.machine.is_running(),
            phase: self.machine.phase(),
            cruise_percent: self.cruise_percent,
            output: self.output,
            run_remaining_ms: self.machine.remaining_ms(now),
        }
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn is_running(&self) -> bool {
        self.machine.is_running()
    }

    pub fn cruise_percent(&self) -> f32 {
        self.cruise_percent
    }

    /// Last command written to the bridge.
    pub fn output(&self) -> DriveOutput {
        self.output
    }

    pub fn config(&self) -> &AgitatorConfig {
        &self.config
    }

    // ── Transitions ───────────────────────────────────────────

    fn start(
        &mut self,
        length: RunLength,
        hw: &mut (impl MotorPort + TimePort),
        sink: &mut impl EventSink,
    ) {
        let duration_ms = match length {
            RunLength::Default => {
                Some(self.config.default_run_duration_ms).filter(|&ms| ms > 0)
            }
            RunLength::Continuous => None,
            RunLength::Timed(ms) => Some(ms),
        };
        match duration_ms {
            Some(ms) => info!("timed run start: {} ms", ms),
            None => info!("continuous run start"),
        }

        // Deadline counts from the command, the phase clock from cruise speed.
        self.machine.arm(hw.now_ms(), duration_ms);
        self.drive_to(Direction::Forward, self.cruise_duty(), hw);
        self.machine.enter(Phase::RunningForward, hw.now_ms());
        sink.emit(&AppEvent::Started { duration_ms });
    }

    fn reverse(
        &mut self,
        to: Phase,
        hw: &mut (impl MotorPort + TimePort),
        sink: &mut impl EventSink,
    ) {
        let from = self.machine.phase();
        let Some(direction) = to.direction() else {
            return;
        };

        self.ramp_down(hw);
        hw.sleep_ms(self.config.timings.coast_between_ms);
        // Cruise is re-read here so a mid-run change lands at the flip.
        self.drive_to(direction, self.cruise_duty(), hw);
        self.machine.enter(to, hw.now_ms());
        sink.emit(&AppEvent::PhaseChanged { from, to });
    }

    fn stop_coast(&mut self, hw: &mut (impl MotorPort + TimePort), sink: &mut impl EventSink) {
        let was_running = self.machine.is_running();
        self.ramp_down(hw);
        self.machine.stop();
        if was_running {
            info!("stopped (coast)");
            sink.emit(&AppEvent::Stopped { braked: false });
        }
    }

    fn stop_brake(&mut self, hw: &mut impl MotorPort, sink: &mut impl EventSink) {
        let was_running = self.machine.is_running();
        hw.brake();
        self.output = DriveOutput::Brake;
        self.machine.stop();
        if was_running {
            info!("stopped (brake)");
            sink.emit(&AppEvent::Stopped { braked: true });
        }
    }

    fn diagnostic(
        &mut self,
        in1: u16,
        in2: u16,
        hw: &mut impl MotorPort,
        sink: &mut impl EventSink,
    ) {
        hw.write_raw(in1, in2);
        self.output = DriveOutput::Diagnostic { in1, in2 };
        info!("diagnostic write IN1={} IN2={}", in1, in2);
        sink.emit(&AppEvent::Diagnostic(self.output));
    }

    fn ignore(&self, cmd: Command, sink: &mut impl EventSink) {
        warn!("{:?} ignored in {}", cmd, self.machine.phase().as_str());
        sink.emit(&AppEvent::CommandIgnored(cmd));
    }

    // ── Motion ────────────────────────────────────────────────

    fn cruise_duty(&self) -> u16 {
        percent_to_duty(self.cruise_percent, self.config.pwm_resolution_bits)
    }

    /// Ramp the active drive (if any) to zero, then coast.
    fn ramp_down(&mut self, hw: &mut (impl MotorPort + TimePort)) {
        if let Some(direction) = self.output.direction() {
            let from = self.output.duty_in(direction);
            Ramp::new(direction, from, 0, self.config.timings.ramp_down_ms).run(hw);
        }
        hw.coast();
        self.output = DriveOutput::Coast;
    }

    /// Ramp up to `target` in `direction`, passing through zero first if
    /// the motor is turning the other way.
    fn drive_to(&mut self, direction: Direction, target: u16, hw: &mut (impl MotorPort + TimePort)) {
        if self.output.direction() == Some(direction.opposite()) {
            self.ramp_down(hw);
        }
        let from = self.output.duty_in(direction);
        Ramp::new(direction, from, target, self.config.timings.ramp_up_ms).run(hw);
        self.output = match direction {
            Direction::Forward => DriveOutput::Forward(target),
            Direction::Reverse => DriveOutput::Reverse(target),
        };
    }
}

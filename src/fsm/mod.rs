//! Agitation phase state machine.
//!
//! ```text
//!                start                 forward_run_ms elapsed
//!   ┌──────┐ ─────────▶ ┌─────────────┐ ─────────────────────▶ ┌─────────────┐
//!   │ Idle │            │ RunForward  │                        │ RunReverse  │
//!   └──────┘ ◀───────── └─────────────┘ ◀───────────────────── └─────────────┘
//!      ▲       stop /         │          reverse_run_ms elapsed       │
//!      │      run end         │                                       │
//!      └──────────────────────┴───────────── stop / run end ──────────┘
//! ```
//!
//! The machine is pure decision logic: [`PhaseMachine::evaluate`] says what
//! should happen at `now`, the caller performs the motion (ramps, coast
//! pause) and then commits the outcome with [`PhaseMachine::enter`] or
//! [`PhaseMachine::stop`].  All timestamps live on a wrapping millisecond
//! clock.

use log::info;
use serde::Serialize;

use crate::config::Timings;
use crate::drivers::hbridge::Direction;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// Externally visible agitation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Idle,
    RunningForward,
    RunningReverse,
}

impl Phase {
    /// Drive direction of a running phase.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Idle => None,
            Self::RunningForward => Some(Direction::Forward),
            Self::RunningReverse => Some(Direction::Reverse),
        }
    }

    /// Running phase for a drive direction.
    pub fn running(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::RunningForward,
            Direction::Reverse => Self::RunningReverse,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::RunningForward => "RunningForward",
            Self::RunningReverse => "RunningReverse",
        }
    }
}

/// What the current tick should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The timed run is over: ramp down, coast, go idle.
    Finish,
    /// The phase run time has elapsed: flip to `to`.
    Reverse { to: Phase },
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Phase bookkeeping.  `phase == Idle` exactly when no run is active.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    phase: Phase,
    phase_started_at: u32,
    run_ends_at: Option<u32>,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            phase_started_at: 0,
            run_ends_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn phase_started_at(&self) -> u32 {
        self.phase_started_at
    }

    pub fn run_ends_at(&self) -> Option<u32> {
        self.run_ends_at
    }

    /// Arm the run-end deadline.  Called before the start ramp.
    pub fn arm(&mut self, now: u32, duration_ms: Option<u32>) {
        self.run_ends_at = duration_ms.map(|d| now.wrapping_add(d));
    }

    /// Milliseconds until the timed run ends (0 once overdue).
    pub fn remaining_ms(&self, now: u32) -> Option<u32> {
        self.run_ends_at.map(|end| {
            if reached(now, end) {
                0
            } else {
                end.wrapping_sub(now)
            }
        })
    }

    /// Decide this tick's transition.  The run-end check takes precedence
    /// over the phase timeout.
    pub fn evaluate(&self, now: u32, timings: &Timings) -> Option<Transition> {
        if !self.is_running() {
            return None;
        }
        if let Some(end) = self.run_ends_at {
            if reached(now, end) {
                return Some(Transition::Finish);
            }
        }
        let elapsed = now.wrapping_sub(self.phase_started_at);
        match self.phase {
            Phase::RunningForward if elapsed >= timings.forward_run_ms => Some(Transition::Reverse {
                to: Phase::RunningReverse,
            }),
            Phase::RunningReverse if elapsed >= timings.reverse_run_ms => Some(Transition::Reverse {
                to: Phase::RunningForward,
            }),
            _ => None,
        }
    }

    /// Commit a running phase that started at `now`.
    pub fn enter(&mut self, phase: Phase, now: u32) {
        if phase == Phase::Idle {
            self.stop();
            return;
        }
        info!("phase {} -> {}", self.phase.as_str(), phase.as_str());
        self.phase = phase;
        self.phase_started_at = now;
    }

    /// Return to idle and disarm the run deadline.
    pub fn stop(&mut self) {
        if self.phase != Phase::Idle {
            info!("phase {} -> Idle", self.phase.as_str());
        }
        self.phase = Phase::Idle;
        self.run_ends_at = None;
    }
}

/// `now` is at or past `deadline` on a wrapping clock.
fn reached(now: u32, deadline: u32) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}

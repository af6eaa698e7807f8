//! Outbound application events.
//!
//! The [`AgitationService`](super::service::AgitationService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them: log to serial, broadcast to a
//! dashboard, record in a test.

use serde::Serialize;

use crate::drivers::hbridge::Direction;
use crate::fsm::Phase;

use super::commands::Command;

/// What the bridge was last told to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriveOutput {
    Coast,
    Brake,
    Forward(u16),
    Reverse(u16),
    /// Raw per-leg write from a diagnostic command.
    Diagnostic { in1: u16, in2: u16 },
}

impl DriveOutput {
    /// Duty being driven in `direction`, 0 for anything else.
    pub fn duty_in(self, direction: Direction) -> u16 {
        match (self, direction) {
            (Self::Forward(d), Direction::Forward) | (Self::Reverse(d), Direction::Reverse) => d,
            _ => 0,
        }
    }

    /// Direction of an active drive, if any.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Forward(d) if d > 0 => Some(Direction::Forward),
            Self::Reverse(d) if d > 0 => Some(Direction::Reverse),
            _ => None,
        }
    }
}

/// Answer to a state query, also broadcast periodically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    #[serde(rename = "uptime")]
    pub uptime_ms: u32,
    pub is_running: bool,
    pub phase: Phase,
    pub cruise_percent: f32,
    pub output: DriveOutput,
    /// `None` for continuous runs and while idle.
    pub run_remaining_ms: Option<u32>,
}

impl StatusReport {
    /// One-line JSON rendering for transports.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A run began (always forward).  `duration_ms` is `None` when continuous.
    Started { duration_ms: Option<u32> },

    /// The automatic cycle flipped direction.
    PhaseChanged { from: Phase, to: Phase },

    /// The run ended; `braked` is false for a coast stop.
    Stopped { braked: bool },

    /// Cruise speed changed (already clamped).
    CruiseChanged(f32),

    /// Manual jog reached cruise speed.
    Jog(Direction),

    /// A raw diagnostic write bypassed the state machine.
    Diagnostic(DriveOutput),

    /// Reply to a query, or a periodic broadcast.
    Status(StatusReport),

    /// A command that had no effect in the current state.
    CommandIgnored(Command),

    /// Reply to `help`.
    Help(&'static [&'static str]),
}

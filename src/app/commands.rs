//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (start button,
//! serial console, websocket dashboard) that the
//! [`AgitationService`](super::service::AgitationService) interprets and
//! acts upon.  Text verbs are decoded exactly once, at the transport
//! boundary, by [`Command::parse`].

/// How long a started run lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLength {
    /// Use `default_run_duration_ms` from the configuration.
    Default,
    /// Run until stopped.
    Continuous,
    /// Stop automatically after this many milliseconds.
    Timed(u32),
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Begin the forward/reverse cycle.
    Start(RunLength),

    /// Start if idle, otherwise stop with coast (the local button).
    Toggle,

    /// Ramp down in the current direction, then freewheel.
    StopCoast,

    /// Both legs high immediately, no ramp.
    StopBrake,

    /// Manual forward at cruise speed, outside the automatic cycle.
    JogForward,

    /// Manual reverse at cruise speed, outside the automatic cycle.
    JogReverse,

    /// Change the cruise speed (clamped to 0-100 %).
    SetCruise(f32),

    /// Emit a status report.
    QueryState,

    /// Diagnostic: 50 % on IN1 only.
    TestIn1,

    /// Diagnostic: 50 % on IN2 only.
    TestIn2,

    /// Diagnostic: zero both legs immediately, bypassing ramps.
    AllOff,

    /// List the accepted verbs.
    Help,
}

/// Verbs accepted by [`Command::parse`], for `help` replies.
pub const VERBS: &[&str] = &[
    "start",
    "auto_start",
    "start_timed=<minutes>",
    "stop",
    "stop_brake",
    "coast",
    "stop_coast",
    "manual_fwd",
    "manual_rev",
    "set_cruise=<percent>",
    "status",
    "print_status",
    "test_in1",
    "test_in2",
    "motors_off",
    "help",
];

/// Why a verb string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Not a known verb.
    Unknown,
    /// Known verb, unparseable argument.
    BadArgument(&'static str),
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown command"),
            Self::BadArgument(verb) => write!(f, "bad argument for {}", verb),
        }
    }
}

const MS_PER_MINUTE: u32 = 60_000;

impl Command {
    /// Decode one verb.  Surrounding whitespace and `\r` are ignored.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if let Some((verb, arg)) = line.split_once('=') {
            let arg = arg.trim();
            return match verb.trim() {
                "set_cruise" => arg
                    .parse::<f32>()
                    .map(Self::SetCruise)
                    .map_err(|_| CommandError::BadArgument("set_cruise")),
                "start_timed" => arg
                    .parse::<i64>()
                    .map(|minutes| Self::Start(RunLength::Timed(minutes_to_ms(minutes))))
                    .map_err(|_| CommandError::BadArgument("start_timed")),
                _ => Err(CommandError::Unknown),
            };
        }

        let cmd = match line {
            "start" => Self::Start(RunLength::Default),
            "auto_start" => Self::Start(RunLength::Continuous),
            "stop" | "stop_brake" => Self::StopBrake,
            "coast" | "stop_coast" => Self::StopCoast,
            "manual_fwd" => Self::JogForward,
            "manual_rev" => Self::JogReverse,
            "status" | "print_status" => Self::QueryState,
            "test_in1" => Self::TestIn1,
            "test_in2" => Self::TestIn2,
            "motors_off" => Self::AllOff,
            "help" => Self::Help,
            _ => return Err(CommandError::Unknown),
        };
        Ok(cmd)
    }
}

/// Minutes → ms for a timed run.  Non-positive requests become one minute.
fn minutes_to_ms(minutes: i64) -> u32 {
    let minutes = minutes.max(1);
    u32::try_from(minutes)
        .ok()
        .and_then(|m| m.checked_mul(MS_PER_MINUTE))
        .unwrap_or(u32::MAX)
}

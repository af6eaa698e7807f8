//! Unified error types for the agitator firmware.
//!
//! Only boot-time setup can fail: the controller itself clamps or ignores
//! bad input and never returns errors.  Every setup step converts into this
//! single `Error`, which `main` hands to `anyhow`.  All variants are `Copy`.

use core::fmt;

use crate::app::commands::CommandError;
use crate::app::ports::ConfigError;
use crate::drivers::hbridge::DriveError;
use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible setup operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
    /// The bridge rejected its initial coast write.
    Actuator(DriveError),
    /// A boot-time command string did not decode.
    Command(CommandError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

impl From<DriveError> for Error {
    fn from(e: DriveError) -> Self {
        Self::Actuator(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

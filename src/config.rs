//! Agitator configuration parameters
//!
//! All tunable parameters for the agitator.  Populated once at boot from the
//! board preset in [`crate::pins`], optionally overridden by a JSON document,
//! and validated before the controller is built.  Only `cruise_percent`
//! changes at runtime (through a command), and nothing is persisted.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::control::duty::{MAX_RESOLUTION_BITS, duty_max};
use crate::pins::{self, PinRoles};

/// Motion timing constants, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub ramp_up_ms: u32,
    pub ramp_down_ms: u32,
    /// Freewheel pause between the ramp-down and the opposite ramp-up.
    pub coast_between_ms: u32,
    pub forward_run_ms: u32,
    pub reverse_run_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            ramp_up_ms: 300,
            ramp_down_ms: 200,
            coast_between_ms: 500,
            forward_run_ms: 10_000,
            reverse_run_ms: 10_000,
        }
    }
}

/// Core agitator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgitatorConfig {
    // --- Hardware ---
    pub pins: PinRoles,
    /// LEDC timer resolution (bits); full-scale duty is `2^bits - 1`.
    pub pwm_resolution_bits: u8,
    pub pwm_frequency_hz: u32,

    // --- Motion ---
    /// Nominal speed as a duty percentage (0-100).
    pub cruise_percent: f32,
    pub timings: Timings,
    /// Total run length for a plain `start`.  0 = run until stopped.
    pub default_run_duration_ms: u32,

    // --- Inputs / reporting ---
    /// Button debounce window.
    pub debounce_ms: u32,
    /// Unsolicited status broadcast period.  0 disables it.
    pub status_interval_ms: u32,
}

impl Default for AgitatorConfig {
    fn default() -> Self {
        let (pins, pwm_frequency_hz, pwm_resolution_bits) = pins::board();
        Self {
            pins,
            pwm_resolution_bits,
            pwm_frequency_hz,

            cruise_percent: 65.0,
            timings: Timings::default(),
            default_run_duration_ms: 0, // continuous

            debounce_ms: 30,
            status_interval_ms: 2_000,
        }
    }
}

impl AgitatorConfig {
    /// Boot-time configuration: the board defaults, replaced by `overrides`
    /// when one is supplied.
    pub fn load(overrides: Option<&str>) -> crate::error::Result<Self> {
        let cfg = match overrides {
            Some(doc) => Self::from_json(doc)?,
            None => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a (possibly partial) JSON override.  Missing fields take their
    /// defaults.  The result is validated.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(doc).map_err(|_| ConfigError::Malformed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pwm_resolution_bits == 0 || self.pwm_resolution_bits > MAX_RESOLUTION_BITS {
            return Err(ConfigError::ValidationFailed(
                "pwm_resolution_bits must be in 1..=16",
            ));
        }
        if self.pwm_frequency_hz == 0 {
            return Err(ConfigError::ValidationFailed("pwm_frequency_hz must be > 0"));
        }
        if self.timings.forward_run_ms == 0 || self.timings.reverse_run_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "forward_run_ms and reverse_run_ms must be > 0",
            ));
        }
        if self.pins.in1 == self.pins.in2 {
            return Err(ConfigError::ValidationFailed("in1 and in2 must differ"));
        }
        Ok(())
    }

    /// Full-scale duty for the configured resolution.
    pub fn duty_max(&self) -> u16 {
        duty_max(self.pwm_resolution_bits)
    }
}

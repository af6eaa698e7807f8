//! Blocking linear duty ramps.
//!
//! A ramp splits its duration into 10 ms steps (at least one), writes one
//! interpolated duty per step through the [`MotorPort`], and sleeps one step
//! between writes.  The calling context is suspended for the whole ramp and
//! there is no way to cancel it once started: ramps are short (tens to a few
//! hundred milliseconds) and must never be torn by a re-entrant command.
//!
//! ```text
//!  duty
//!   to ┤            ●
//!      │         ●
//!      │      ●
//!      │   ●
//! from ┼●──┴──┴──┴──┴──▶ t   (one write per 10 ms step)
//! ```

use log::debug;

use crate::app::ports::{MotorPort, TimePort};
use crate::drivers::hbridge::Direction;

/// Length of one ramp step.
pub const RAMP_STEP_MS: u32 = 10;

/// A linear duty ramp in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ramp {
    direction: Direction,
    from: u16,
    to: u16,
    steps: u32,
}

impl Ramp {
    /// Plan a ramp from `from` to `to` over `duration_ms`.
    ///
    /// A duration shorter than one step still produces a single step.
    pub fn new(direction: Direction, from: u16, to: u16, duration_ms: u32) -> Self {
        Self {
            direction,
            from,
            to,
            steps: (duration_ms / RAMP_STEP_MS).max(1),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Duty written at step `i` (1-based, `i == steps` yields `to`).
    pub fn duty_at(&self, i: u32) -> u16 {
        let i = i.min(self.steps) as i64;
        let steps = self.steps as i64;
        let delta = (self.to as i64 - self.from as i64) * i;
        (self.from as i64 + div_round(delta, steps)) as u16
    }

    /// The full duty sequence, one value per step.
    pub fn duties(&self) -> impl Iterator<Item = u16> + '_ {
        (1..=self.steps).map(|i| self.duty_at(i))
    }

    /// Execute the ramp: one drive write per step, one step pause after each.
    pub fn run(&self, hw: &mut (impl MotorPort + TimePort)) {
        debug!(
            "ramp {:?}: {} -> {} in {} steps",
            self.direction, self.from, self.to, self.steps
        );
        for duty in self.duties() {
            match self.direction {
                Direction::Forward => hw.drive_forward(duty),
                Direction::Reverse => hw.drive_reverse(duty),
            }
            hw.sleep_ms(RAMP_STEP_MS);
        }
    }
}

/// Integer division rounding half away from zero (`d > 0`).
fn div_round(n: i64, d: i64) -> i64 {
    if n >= 0 {
        (n + d / 2) / d
    } else {
        -((-n + d / 2) / d)
    }
}

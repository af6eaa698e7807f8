//! Reversible gearmotor driver (DRV8871 H-bridge, two-input PWM control).
//!
//! ## DRV8871 truth table
//!
//! | IN1 | IN2 | Motor                                  |
//! |-----|-----|----------------------------------------|
//! | 0   | 0   | Coast (outputs high-Z, motor freewheels)|
//! | PWM | 0   | Forward, speed ≈ duty                  |
//! | 0   | PWM | Reverse, speed ≈ duty                  |
//! | 1   | 1   | Brake (low-side slow decay)            |
//!
//! Each leg is any [`SetDutyCycle`] output, so the same driver sits on the
//! ESP-IDF LEDC channels and on host test doubles.  The driver is a dumb
//! actuator: it always writes both legs, holds no motion state, and never
//! reports failures upward.  A failed write is logged and counted.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::MotorPort;

/// Rotation sense of the drum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// Which bridge input a write went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    In1,
    In2,
}

/// A PWM write the hardware refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveError {
    pub leg: Leg,
    pub duty: u16,
}

impl core::fmt::Display for DriveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PWM write of {} to {:?} failed", self.duty, self.leg)
    }
}

/// Two-leg H-bridge front end.
pub struct HBridgeDriver<IN1, IN2> {
    in1: IN1,
    in2: IN2,
    duty_max: u16,
    write_failures: u32,
}

impl<IN1, IN2> HBridgeDriver<IN1, IN2>
where
    IN1: SetDutyCycle,
    IN2: SetDutyCycle,
{
    /// Wrap two PWM legs and put the bridge into coast.
    ///
    /// `duty_max` is the configured full-scale duty (`2^bits - 1`).  Returns
    /// an error if the initial coast write fails, since that usually means
    /// the channels were never attached.
    pub fn new(in1: IN1, in2: IN2, duty_max: u16) -> Result<Self, DriveError> {
        let mut driver = Self {
            in1,
            in2,
            duty_max,
            write_failures: 0,
        };
        driver.try_write(0, 0)?;
        Ok(driver)
    }

    pub fn duty_max(&self) -> u16 {
        self.duty_max
    }

    /// Number of rejected PWM writes since construction.
    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    fn try_write(&mut self, in1: u16, in2: u16) -> Result<(), DriveError> {
        let in1 = in1.min(self.duty_max);
        let in2 = in2.min(self.duty_max);
        // The leg going to zero is written first so the bridge never sees
        // both inputs driven with different duties at once.
        if in1 == 0 {
            self.set_in1(0)?;
            self.set_in2(in2)
        } else {
            self.set_in2(in2)?;
            self.set_in1(in1)
        }
    }

    fn set_in1(&mut self, duty: u16) -> Result<(), DriveError> {
        self.in1
            .set_duty_cycle(duty)
            .map_err(|_| DriveError { leg: Leg::In1, duty })
    }

    fn set_in2(&mut self, duty: u16) -> Result<(), DriveError> {
        self.in2
            .set_duty_cycle(duty)
            .map_err(|_| DriveError { leg: Leg::In2, duty })
    }

    fn write(&mut self, in1: u16, in2: u16) {
        if let Err(e) = self.try_write(in1, in2) {
            self.write_failures = self.write_failures.saturating_add(1);
            warn!("hbridge: {}", e);
        }
    }
}

impl<IN1, IN2> MotorPort for HBridgeDriver<IN1, IN2>
where
    IN1: SetDutyCycle,
    IN2: SetDutyCycle,
{
    fn drive_forward(&mut self, duty: u16) {
        self.write(duty, 0);
    }

    fn drive_reverse(&mut self, duty: u16) {
        self.write(0, duty);
    }

    fn coast(&mut self) {
        self.write(0, 0);
    }

    fn brake(&mut self) {
        let max = self.duty_max;
        self.write(max, max);
    }

    fn write_raw(&mut self, in1: u16, in2: u16) {
        self.write(in1, in2);
    }
}

//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`HBridgeDriver`] and the clock, exposing them through
//! [`MotorPort`] and [`TimePort`] as a single value.  The service takes one
//! `&mut (impl MotorPort + TimePort)` so a ramp can write and sleep without
//! a double mutable borrow.  This is the only module in the system that
//! touches actual motor hardware.

use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::{MotorPort, TimePort};
use crate::drivers::hbridge::HBridgeDriver;

use super::time::Esp32TimeAdapter;

/// Concrete adapter that combines the bridge and clock behind port traits.
pub struct HardwareAdapter<IN1, IN2> {
    bridge: HBridgeDriver<IN1, IN2>,
    clock: Esp32TimeAdapter,
}

impl<IN1, IN2> HardwareAdapter<IN1, IN2>
where
    IN1: SetDutyCycle,
    IN2: SetDutyCycle,
{
    pub fn new(bridge: HBridgeDriver<IN1, IN2>, clock: Esp32TimeAdapter) -> Self {
        Self { bridge, clock }
    }

    pub fn bridge(&self) -> &HBridgeDriver<IN1, IN2> {
        &self.bridge
    }
}

// ── MotorPort implementation ──────────────────────────────────

impl<IN1, IN2> MotorPort for HardwareAdapter<IN1, IN2>
where
    IN1: SetDutyCycle,
    IN2: SetDutyCycle,
{
    fn drive_forward(&mut self, duty: u16) {
        self.bridge.drive_forward(duty);
    }

    fn drive_reverse(&mut self, duty: u16) {
        self.bridge.drive_reverse(duty);
    }

    fn coast(&mut self) {
        self.bridge.coast();
    }

    fn brake(&mut self) {
        self.bridge.brake();
    }

    fn write_raw(&mut self, in1: u16, in2: u16) {
        self.bridge.write_raw(in1, in2);
    }
}

// ── TimePort implementation ───────────────────────────────────

impl<IN1, IN2> TimePort for HardwareAdapter<IN1, IN2> {
    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.clock.sleep_ms(ms);
    }
}

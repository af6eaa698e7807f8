//! One-shot GPIO initialization for the button inputs.
//!
//! Pin numbers come from the runtime [`PinRoles`], so inputs are set up
//! with raw ESP-IDF sys calls rather than typed HAL pins.  Called once from
//! `main()` before the control loop starts.  The bridge legs are attached
//! separately through the LEDC driver.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::pins::PinRoles;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// A pin number outside the GPIO matrix.
    InvalidPin(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "GPIO {} out of range", pin),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

/// Bit mask of every active-low input: buttons and the reserved spares.
pub fn input_mask(pins: &PinRoles) -> Result<u64, HwInitError> {
    let candidates = [
        Some(pins.start_button),
        pins.stop_button,
        pins.reserved[0],
        pins.reserved[1],
    ];
    let mut mask = 0u64;
    for pin in candidates.into_iter().flatten() {
        if !(0..64).contains(&pin) {
            return Err(HwInitError::InvalidPin(pin));
        }
        mask |= 1u64 << pin;
    }
    Ok(mask)
}

/// Configure all button inputs with pull-ups and no interrupts.
#[cfg(target_os = "espidf")]
pub fn init_inputs(pins: &PinRoles) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: input_mask(pins)?,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: called once from main() before the loop; single-threaded.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    info!("hw_init: button inputs configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_inputs(pins: &PinRoles) -> Result<(), HwInitError> {
    input_mask(pins)?;
    log::info!("hw_init(sim): GPIO init skipped");
    Ok(())
}

/// An input configured by [`init_inputs`], read by GPIO number.
#[cfg(target_os = "espidf")]
pub struct GpioInput {
    pin: i32,
}

#[cfg(target_os = "espidf")]
impl GpioInput {
    pub fn new(pin: i32) -> Self {
        Self { pin }
    }
}

#[cfg(target_os = "espidf")]
impl embedded_hal::digital::ErrorType for GpioInput {
    type Error = core::convert::Infallible;
}

#[cfg(target_os = "espidf")]
impl embedded_hal::digital::InputPin for GpioInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        // SAFETY: register read on a pin configured as input by init_inputs.
        Ok((unsafe { gpio_get_level(self.pin) }) != 0)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

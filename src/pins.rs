//! GPIO / peripheral pin assignments for the supported agitator boards.
//!
//! Single source of truth: the firmware entry point and the config layer
//! reference these presets rather than hard-coding pin numbers.  Swapping
//! `in1` and `in2` inverts which rotation counts as "forward".

use serde::{Deserialize, Serialize};

/// Role → GPIO number mapping for one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRoles {
    /// DRV8871 IN1 (PWM-capable).
    pub in1: i32,
    /// DRV8871 IN2 (PWM-capable).
    pub in2: i32,
    /// Active-low start/stop toggle button.
    pub start_button: i32,
    /// Optional active-low coast-stop button.
    pub stop_button: Option<i32>,
    /// Spare inputs, configured with pull-ups and otherwise unused.
    pub reserved: [Option<i32>; 2],
}

// ---------------------------------------------------------------------------
// ESP32-WROOM-32 (default)
// ---------------------------------------------------------------------------

/// Leaves room for two more buttons and an I²C display.
pub const ESP32: PinRoles = PinRoles {
    in1: 18,
    in2: 19,
    start_button: 25,
    stop_button: Some(26),
    reserved: [Some(27), Some(14)],
};

/// LEDC frequency on the ESP32 (inaudible).
pub const ESP32_PWM_FREQ_HZ: u32 = 20_000;
/// 12 bits does not fit at 20 kHz on the ESP32 LEDC clock.
pub const ESP32_PWM_RESOLUTION_BITS: u8 = 11;

// ---------------------------------------------------------------------------
// ESP32-C6 Super Mini
// ---------------------------------------------------------------------------

pub const ESP32C6: PinRoles = PinRoles {
    in1: 2,
    in2: 3,
    start_button: 9,
    stop_button: None,
    reserved: [None, None],
};

pub const ESP32C6_PWM_FREQ_HZ: u32 = 1_000;
pub const ESP32C6_PWM_RESOLUTION_BITS: u8 = 11;

// ---------------------------------------------------------------------------
// LEDC channel assignment
// ---------------------------------------------------------------------------

/// LEDC channel driving IN1.
pub const LEDC_CHANNEL_IN1: u8 = 0;
/// LEDC channel driving IN2.
pub const LEDC_CHANNEL_IN2: u8 = 1;

// ---------------------------------------------------------------------------
// Console UART (TX, RX) carrying the text command link
// ---------------------------------------------------------------------------

pub const ESP32_CONSOLE_UART: (i32, i32) = (1, 3);
pub const ESP32C6_CONSOLE_UART: (i32, i32) = (16, 17);

/// Console pins for the board selected at compile time.
pub const fn console_uart() -> (i32, i32) {
    if cfg!(esp32c6) {
        ESP32C6_CONSOLE_UART
    } else {
        ESP32_CONSOLE_UART
    }
}

/// Board preset selected at compile time.
pub const fn board() -> (PinRoles, u32, u8) {
    if cfg!(esp32c6) {
        (ESP32C6, ESP32C6_PWM_FREQ_HZ, ESP32C6_PWM_RESOLUTION_BITS)
    } else {
        (ESP32, ESP32_PWM_FREQ_HZ, ESP32_PWM_RESOLUTION_BITS)
    }
}

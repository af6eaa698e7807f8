//! Polled, time-debounced push-button input.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up: the line reads HIGH when
//! released and LOW while pressed.  No interrupt is used; the main loop
//! calls [`DebouncedInput::poll`] once per service tick.
//!
//! ## Debounce rule
//!
//! | Observation                                   | Action                       |
//! |-----------------------------------------------|------------------------------|
//! | raw level differs from last *read* level      | restart the stability timer  |
//! | stable for ≥ window and differs from *stable* | commit new stable level      |
//! | newly committed stable level is LOW           | report a press edge          |
//!
//! Release edges are committed silently.

use embedded_hal::digital::{Error as _, InputPin};
use log::warn;

/// Default debounce window.
pub const DEBOUNCE_MS: u32 = 30;

/// Electrical level of an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    fn from_high(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// Level that means "pressed" on an active-low line.
const PRESSED: Level = Level::Low;

pub struct DebouncedInput<P> {
    pin: P,
    window_ms: u32,
    last_read: Level,
    last_stable: Level,
    last_change_ms: u32,
}

impl<P: InputPin> DebouncedInput<P> {
    /// Track `pin` with the default 30 ms window.
    pub fn new(pin: P) -> Self {
        Self::with_window(pin, DEBOUNCE_MS)
    }

    /// Track `pin` with a custom debounce window fixed for its lifetime.
    pub fn with_window(pin: P, window_ms: u32) -> Self {
        Self {
            pin,
            window_ms,
            // Pulled up: released until proven otherwise.
            last_read: Level::High,
            last_stable: Level::High,
            last_change_ms: 0,
        }
    }

    /// Sample the line.  Returns `true` exactly once per debounced press.
    ///
    /// `now_ms` is a wrapping millisecond clock.  A failed pin read counts
    /// as "no change" for this call.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        let raw = match self.pin.is_high() {
            Ok(high) => Level::from_high(high),
            Err(e) => {
                warn!("button: input read failed: {:?}", e.kind());
                return false;
            }
        };

        if raw != self.last_read {
            self.last_read = raw;
            self.last_change_ms = now_ms;
        }

        if now_ms.wrapping_sub(self.last_change_ms) >= self.window_ms && raw != self.last_stable {
            self.last_stable = raw;
            return self.last_stable == PRESSED;
        }

        false
    }

    /// Debounced pressed state (not an edge).
    pub fn is_pressed(&self) -> bool {
        self.last_stable == PRESSED
    }

    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }
}

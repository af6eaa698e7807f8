//! Task Watchdog Timer (TWDT) driver.
//!
//! Wraps the ESP-IDF TWDT API to reset the device if the control loop
//! stalls.  A direction flip legitimately blocks the loop for a ramp-down,
//! the coast pause and a ramp-up, so the timeout is sized from the motion
//! timings instead of being fixed.
//!
//! The main loop must call `feed()` on every tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::config::Timings;

/// Lower bound on the watchdog timeout.
pub const MIN_TIMEOUT_MS: u32 = 5_000;

/// Timeout covering the longest blocking section (a direction flip),
/// with a 4x margin.
pub fn timeout_for(timings: &Timings) -> u32 {
    let flip = timings
        .ramp_down_ms
        .saturating_add(timings.coast_between_ms)
        .saturating_add(timings.ramp_up_ms);
    flip.saturating_mul(4).max(MIN_TIMEOUT_MS)
}

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    timeout_ms: u32,
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: plain FFI calls on the calling task, before the loop.
        let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
        if ret != ESP_OK {
            log::warn!("TWDT reconfigure returned {} (may already be configured)", ret);
        }
        let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
        let subscribed = ret == ESP_OK;
        if subscribed {
            info!("watchdog: subscribed ({} ms timeout)", timeout_ms);
        } else {
            log::warn!("watchdog: failed to subscribe ({})", ret);
        }
        Self {
            subscribed,
            timeout_ms,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        info!("watchdog(sim): no-op, {} ms", timeout_ms);
        Self { timeout_ms }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Feed the watchdog.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the TWDT entry of the calling task.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}

//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AgitationService (domain)
//! ```
//!
//! Driven adapters (H-bridge, clock, event sinks) implement these traits.
//! The [`AgitationService`](super::service::AgitationService) consumes them
//! via generics, so the domain core never touches hardware directly and the
//! whole motion sequence can be replayed against a simulated clock.

// ───────────────────────────────────────────────────────────────
// Motor port (driven adapter: domain → H-bridge)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the four bridge primitives plus a raw diagnostic write.
///
/// Every call is an unconditional, idempotent hardware write.  Duties are in
/// `0..=duty_max`; larger values are clamped by the implementation.
pub trait MotorPort {
    /// IN2 = 0, IN1 = `duty`.
    fn drive_forward(&mut self, duty: u16);

    /// IN1 = 0, IN2 = `duty`.
    fn drive_reverse(&mut self, duty: u16);

    /// Both legs 0: outputs released, motor freewheels.
    fn coast(&mut self);

    /// Both legs full scale: dynamic braking.
    fn brake(&mut self);

    /// Write each leg independently.  Bench wiring checks only.
    fn write_raw(&mut self, in1: u16, in2: u16);
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: domain ↔ monotonic clock)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock and a blocking delay.
///
/// `now_ms` wraps after ~49.7 days; all comparisons in the domain use
/// wrapping subtraction.
pub trait TimePort {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u32;

    /// Block the calling context for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / transports)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, a
/// websocket broadcast, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: &super::events::AppEvent) {
        (**self).emit(event);
    }
}

/// Fan an event out to two sinks, left first.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading or validating an
/// [`AgitatorConfig`](crate::config::AgitatorConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The override document could not be deserialised.
    Malformed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Malformed => write!(f, "malformed config document"),
        }
    }
}

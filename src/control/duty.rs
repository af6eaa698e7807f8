//! Percent → hardware duty conversion.
//!
//! Operator-facing speed controls never reject input: anything outside
//! `[0, 100]` is silently clamped to the nearest bound before conversion.

/// Widest LEDC resolution the duty type can represent.
pub const MAX_RESOLUTION_BITS: u8 = 16;

/// Clamp a percentage into `[0, 100]`.
///
/// `NaN` maps to 0, infinities map to the nearest bound.
pub fn clamp_percent(pct: f32) -> f32 {
    if pct.is_nan() {
        return 0.0;
    }
    pct.clamp(0.0, 100.0)
}

/// Largest duty value for a timer of `bits` resolution (`2^bits - 1`).
///
/// `bits` is clamped to `1..=16`.
pub fn duty_max(bits: u8) -> u16 {
    let bits = bits.clamp(1, MAX_RESOLUTION_BITS) as u32;
    ((1u32 << bits) - 1) as u16
}

/// Convert a speed percentage into a duty value for a `bits`-wide timer.
///
/// Rounds half away from zero, matching `lroundf`.
pub fn percent_to_duty(pct: f32, bits: u8) -> u16 {
    let pct = clamp_percent(pct) as f64;
    let max = duty_max(bits) as f64;
    (pct * max / 100.0).round() as u16
}

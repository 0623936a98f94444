//! Fixed-point coordinate scaling
//!
//! Physics runs on integer internal units (`display * SCALE`) so thousands of
//! per-step increments never accumulate floating error. Internal scalars are
//! `i64` and display scalars are `i32`, so the two cannot be combined without
//! going through one of the conversions below.

/// Internal units per display unit
pub const SCALE: i64 = 10_000;

/// A scalar in internal (high precision) units
pub type Fixed = i64;

/// A scalar in display units
pub type Display = i32;

/// Convert a display scalar to internal units
#[inline]
pub const fn to_internal(display: Display) -> Fixed {
    display as Fixed * SCALE
}

/// Convert an internal scalar to display units, truncating toward zero
#[inline]
pub const fn to_display(internal: Fixed) -> Display {
    (internal / SCALE) as Display
}

/// Convert a fractional display quantity (e.g. gravity 0.2 px/step²) to
/// internal units, rounding to the nearest internal unit
#[inline]
pub fn from_display_f64(display: f64) -> Fixed {
    (display * SCALE as f64).round() as Fixed
}

/// Sub-pixel display value for renderers
#[inline]
pub fn to_display_f32(internal: Fixed) -> f32 {
    (internal as f64 / SCALE as f64) as f32
}

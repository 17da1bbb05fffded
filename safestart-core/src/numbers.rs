//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Integer percentage of `part` over `whole`, rounded half up and clamped to 0..=100.
///
/// Returns 0 when `whole` is zero.
#[must_use]
pub fn percent_of(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let ratio = f64::from(part) / f64::from(whole) * 100.0;
    let rounded = ratio.round().clamp(0.0, 100.0);
    cast::<f64, u8>(rounded).unwrap_or(0)
}

/// Clamp a value into the closed unit interval, mapping non-finite values to 0.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Round to two decimal places with halves going up, returning 0 for non-finite values.
///
/// `-0.125` rounds to `-0.12`, matching how pointer probes have always been reported.
#[must_use]
pub fn round_hundredths(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Convert a collection length to `u32`, saturating on overflow.
#[must_use]
pub fn len_to_u32(len: usize) -> u32 {
    cast::<usize, u32>(len).unwrap_or(u32::MAX)
}

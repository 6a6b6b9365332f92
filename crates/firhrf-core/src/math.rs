//! Time quantisation utilities for peristimulus alignment
//!
//! This module provides:
//! - The shared acquisition timing resolution (0.1 ms)
//! - Tick conversions used to compare independently derived time values
//! - Onset snapping onto the effective-resolution grid
//!
//! Acquisition times and event-derived target times are never compared as raw
//! floats. Acquisition times are truncated to the timing resolution, targets are
//! rounded to it, and both are compared as integer ticks. Two ticks are equal
//! exactly when the quantised floats (`ticks / 1e4`) are equal.

// ============================================================================
// Constants
// ============================================================================

/// Constants shared by the grid builder and the design matrix builder
pub mod constants {
    /// Ticks per second of the acquisition timing resolution (0.1 ms)
    pub const TICKS_PER_SECOND: f64 = 1e4;

    /// Tolerance used when checking whether TR is an integer multiple of ER
    pub const MULTIPLE_TOLERANCE: f64 = 1e-9;

    /// Default peristimulus window in seconds, relative to event onset
    pub const DEFAULT_WINDOW_S: [f64; 2] = [-4.0, 24.0];
}

/// Acquisition time tick for sample `t` at repetition time `tr_s`.
///
/// Truncates toward zero, modelling the finite timing resolution of the
/// scanner clock.
#[inline]
#[must_use]
pub fn acquisition_tick(t: usize, tr_s: f64) -> i64 {
    (t as f64 * tr_s * constants::TICKS_PER_SECOND).trunc() as i64
}

/// Target time tick for an event-derived time in seconds.
///
/// Rounds half to even at the timing resolution.
#[inline]
#[must_use]
pub fn target_tick(time_s: f64) -> i64 {
    (time_s * constants::TICKS_PER_SECOND).round_ties_even() as i64
}

/// Convert a tick count back to seconds.
#[inline]
#[must_use]
pub fn ticks_to_seconds(ticks: i64) -> f64 {
    ticks as f64 / constants::TICKS_PER_SECOND
}

/// Snap an onset to the nearest multiple of the effective resolution.
///
/// `round(onset / er) * er`, rounding half to even.
#[inline]
#[must_use]
pub fn snap_to_resolution(onset_s: f64, er_s: f64) -> f64 {
    (onset_s / er_s).round_ties_even() * er_s
}

/// Whether `numerator` is an integer multiple of `step` within tolerance.
#[must_use]
pub fn is_integer_multiple(numerator: f64, step: f64) -> bool {
    let ratio = numerator / step;
    (ratio - ratio.round()).abs() <= constants::MULTIPLE_TOLERANCE * ratio.abs().max(1.0)
}

/// Arithmetic mean of the non-NaN values in `values`, or `None` if there are none.
///
/// Infinities are kept and propagate into the mean.
#[must_use]
pub fn nan_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_tick_truncates() {
        // 3 * 0.7 = 2.0999999999999996 in binary floating point
        assert_eq!(acquisition_tick(3, 0.7), 20999);
        assert_eq!(acquisition_tick(5, 2.0), 100_000);
        assert_eq!(acquisition_tick(0, 2.0), 0);
    }

    #[test]
    fn test_target_tick_rounds() {
        assert_eq!(target_tick(3.0 * 0.7), 21000);
        assert_eq!(target_tick(-2.0), -20000);
        assert_eq!(target_tick(10.00004), 100_000);
    }

    #[test]
    fn test_snap_to_resolution() {
        assert!((snap_to_resolution(10.3, 2.0) - 10.0).abs() < 1e-12);
        assert!((snap_to_resolution(11.2, 2.0) - 12.0).abs() < 1e-12);
        // Half-way rounds to the even multiple
        assert!((snap_to_resolution(3.0, 2.0) - 4.0).abs() < 1e-12);
        assert!((snap_to_resolution(5.0, 2.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_is_integer_multiple() {
        assert!(is_integer_multiple(2.0, 0.5));
        assert!(is_integer_multiple(2.0, 0.4));
        assert!(is_integer_multiple(3.0, 0.1));
        assert!(!is_integer_multiple(2.0, 0.7));
        assert!(!is_integer_multiple(2.0, 0.3));
    }

    #[test]
    fn test_nan_mean() {
        assert_eq!(nan_mean([1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(nan_mean([1.0, f64::NAN, 3.0]), Some(2.0));
        assert_eq!(nan_mean([f64::NAN]), None);
        assert_eq!(nan_mean(Vec::<f64>::new()), None);
        assert_eq!(nan_mean([1.0, f64::INFINITY, f64::NAN]), Some(f64::INFINITY));
    }
}

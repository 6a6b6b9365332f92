//! Hemodynamic Response Function
//!
//! Canonical double-gamma HRF used to synthesize ground-truth responses.
//!
//! # HRF Characteristics
//!
//! - Peak at ~5-6 seconds after neural activity
//! - Post-stimulus undershoot lasting ~15 seconds
//! - Total duration ~25-30 seconds

use firhrf_core::PeristimulusGrid;
use serde::{Deserialize, Serialize};

/// Lanczos approximation coefficients (g = 7, n = 9)
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Canonical Hemodynamic Response Function
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HemodynamicResponseFunction {
    /// Shape of the positive gamma lobe
    pub response_shape: f64,
    /// Shape of the undershoot gamma lobe
    pub undershoot_shape: f64,
    /// Undershoot ratio (relative to the positive lobe)
    pub undershoot_ratio: f64,
    /// Delay before response begins (s)
    pub onset_delay_s: f64,
    /// Peak amplitude (arbitrary units)
    pub peak_amplitude: f64,
}

impl HemodynamicResponseFunction {
    /// Create the canonical (standard) HRF
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            response_shape: 6.0,   // peak near 5 s
            undershoot_shape: 16.0, // undershoot near 15 s
            undershoot_ratio: 1.0 / 6.0,
            onset_delay_s: 0.0,
            peak_amplitude: 1.0,
        }
    }

    /// Scale the response to the given amplitude
    #[must_use]
    pub fn with_amplitude(mut self, peak_amplitude: f64) -> Self {
        self.peak_amplitude = peak_amplitude;
        self
    }

    /// Evaluate the HRF at `t_s` seconds after the stimulus
    #[must_use]
    pub fn evaluate(&self, t_s: f64) -> f64 {
        let t = t_s - self.onset_delay_s;
        if t <= 0.0 {
            return 0.0;
        }

        let gamma1 = gamma_pdf(t, self.response_shape);
        let gamma2 = gamma_pdf(t, self.undershoot_shape);
        (gamma1 - self.undershoot_ratio * gamma2) * self.peak_amplitude
    }

    /// Sample the HRF at every lag of `grid`.
    ///
    /// Lag `k` is `(k - nPreStim) * ER` seconds from onset, the time at which
    /// the design matrix places it.
    #[must_use]
    pub fn sample(&self, grid: &PeristimulusGrid) -> Vec<f64> {
        (0..grid.n_h_est())
            .map(|lag| self.evaluate(grid.lag_offset(lag)))
            .collect()
    }

    /// Time of the positive peak (s), from the gamma mode
    #[must_use]
    pub fn expected_peak_s(&self) -> f64 {
        self.onset_delay_s + (self.response_shape - 1.0)
    }
}

impl Default for HemodynamicResponseFunction {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Gamma probability density with unit rate
fn gamma_pdf(t: f64, shape: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    ((shape - 1.0) * t.ln() - t - ln_gamma(shape)).exp()
}

/// Natural log of the gamma function (Lanczos, x > 0)
fn ln_gamma(x: f64) -> f64 {
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS_COEFFS[0], |acc, (i, c)| acc + c / (x + i as f64 + 1.0));

    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use firhrf_core::RetrievalConfig;

    #[test]
    fn test_ln_gamma_integers() {
        // Gamma(n) = (n - 1)!
        for (n, factorial) in [(1.0, 1.0), (2.0, 1.0), (5.0, 24.0), (6.0, 120.0)] {
            assert!((ln_gamma(n) - f64::ln(factorial)).abs() < 1e-10, "n = {n}");
        }
    }

    #[test]
    fn test_hrf_shape() {
        let hrf = HemodynamicResponseFunction::canonical();

        // Response should be zero before onset
        assert_eq!(hrf.evaluate(0.0), 0.0);
        assert_eq!(hrf.evaluate(-2.0), 0.0);

        // Peak around 5 seconds
        let peak = hrf.evaluate(hrf.expected_peak_s());
        assert!(peak > 0.0);
        assert!(hrf.evaluate(hrf.expected_peak_s() - 2.0) < peak);
        assert!(hrf.evaluate(hrf.expected_peak_s() + 2.0) < peak);

        // Undershoot should be negative
        assert!(hrf.evaluate(15.0) < 0.0);
    }

    #[test]
    fn test_sample_on_grid() {
        let grid = PeristimulusGrid::new(&RetrievalConfig::new(2.0)).unwrap();
        let hrf = HemodynamicResponseFunction::canonical().with_amplitude(3.0);
        let samples = hrf.sample(&grid);

        assert_eq!(samples.len(), 14);
        // Lags 0..=2 are at -4, -2 and 0 s
        assert!(samples[..3].iter().all(|&v| v == 0.0));
        let (peak_lag, _) = samples
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .unwrap();
        // 4 s or 6 s after onset
        assert!(peak_lag == 4 || peak_lag == 5);
    }
}

//! Peristimulus grid construction
//!
//! Derives the effective resolution (ER), the number of peristimulus samples
//! and the peristimulus time axis from the window bounds and repetition time
//! (TR).
//!
//! # Grid Layout
//!
//! ```text
//!   window = [-Tstart, +Tend]
//!
//!   lag:     0      1    ...  nPreStim ...          nHEst-1
//!   tscale: (1-nPreStim)*ER  ...   ER   ...  (nHEst-nPreStim)*ER
//!           |<-- pre-stimulus -->|<----- post-stimulus ----->|
//! ```
//!
//! TR is always an integer multiple of the final ER. A requested ER that does
//! not divide TR is replaced by `TR / round(TR / ER)` and a warning is logged.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::math::{self, constants};

fn default_window() -> [f64; 2] {
    constants::DEFAULT_WINDOW_S
}

/// User-facing timing parameters for a retrieval
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Repetition time of the acquisition (s)
    pub tr: f64,
    /// Requested effective resolution of the peristimulus axis (s)
    #[serde(default)]
    pub er: Option<f64>,
    /// Peristimulus window relative to onset (s); only magnitudes are used
    #[serde(default = "default_window")]
    pub window: [f64; 2],
}

impl RetrievalConfig {
    /// Create a config with the given TR, ER = TR and the default window
    #[must_use]
    pub fn new(tr: f64) -> Self {
        Self {
            tr,
            er: None,
            window: default_window(),
        }
    }

    /// Set the requested effective resolution
    #[must_use]
    pub fn with_er(mut self, er: f64) -> Self {
        self.er = Some(er);
        self
    }

    /// Set the peristimulus window
    #[must_use]
    pub fn with_window(mut self, window: [f64; 2]) -> Self {
        self.window = window;
        self
    }
}

/// Derived peristimulus sampling grid shared by every condition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeristimulusGrid {
    t_start: f64,
    t_end: f64,
    tr: f64,
    er: f64,
    requested_er: Option<f64>,
    n_pre_stim: usize,
    n_h_est: usize,
    tscale: Vec<f64>,
}

impl PeristimulusGrid {
    /// Build the grid from timing parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidParameter`] if TR or ER is not a positive
    /// finite number, or a window bound is not finite.
    pub fn new(config: &RetrievalConfig) -> GridResult<Self> {
        let tr = config.tr;
        if !tr.is_finite() || tr <= 0.0 {
            return Err(GridError::InvalidParameter {
                parameter: "tr",
                value: tr,
                reason: "must be positive and finite",
            });
        }
        if let Some(bound) = config.window.iter().copied().find(|w| !w.is_finite()) {
            return Err(GridError::InvalidParameter {
                parameter: "window",
                value: bound,
                reason: "bounds must be finite",
            });
        }

        let er = resolve_effective_resolution(tr, config.er)?;

        let t_start = config.window[0].abs();
        let t_end = config.window[1].abs();

        let n_pre_stim = (t_start / er).floor() as usize;
        let n_h_est =
            (t_start / er).round_ties_even() as usize + (t_end / er).round_ties_even() as usize;

        let tscale = (0..n_h_est)
            .map(|i| (i as f64 + 1.0 - n_pre_stim as f64) * er)
            .collect();

        tracing::debug!(
            tr,
            er,
            n_pre_stim,
            n_h_est,
            "Built peristimulus grid"
        );

        Ok(Self {
            t_start,
            t_end,
            tr,
            er,
            requested_er: config.er,
            n_pre_stim,
            n_h_est,
            tscale,
        })
    }

    /// Pre-stimulus extent of the window (s)
    #[inline]
    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    /// Post-stimulus extent of the window (s)
    #[inline]
    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    /// Repetition time (s)
    #[inline]
    pub fn tr(&self) -> f64 {
        self.tr
    }

    /// Effective resolution after correction (s)
    #[inline]
    pub fn er(&self) -> f64 {
        self.er
    }

    /// Whether the requested ER was replaced to divide TR
    pub fn er_adjusted(&self) -> bool {
        self.requested_er
            .is_some_and(|requested| requested != self.tr && requested != self.er)
    }

    /// Number of peristimulus samples before the onset
    #[inline]
    pub fn n_pre_stim(&self) -> usize {
        self.n_pre_stim
    }

    /// Number of peristimulus samples per condition
    #[inline]
    pub fn n_h_est(&self) -> usize {
        self.n_h_est
    }

    /// Peristimulus time of each lag (s)
    #[inline]
    pub fn tscale(&self) -> &[f64] {
        &self.tscale
    }

    /// Lag offset from onset in seconds, `(k - nPreStim) * ER`
    #[inline]
    pub fn lag_offset(&self, lag: usize) -> f64 {
        (lag as f64 - self.n_pre_stim as f64) * self.er
    }

    /// Indices of lags with negative peristimulus time
    pub fn pre_stimulus_lags(&self) -> impl Iterator<Item = usize> + '_ {
        self.tscale
            .iter()
            .enumerate()
            .filter(|(_, t)| **t < 0.0)
            .map(|(i, _)| i)
    }

    /// True when the window has no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_h_est == 0
    }
}

/// Pick the final ER for a given TR and requested ER.
fn resolve_effective_resolution(tr: f64, requested: Option<f64>) -> GridResult<f64> {
    let Some(er) = requested else {
        return Ok(tr);
    };

    if !er.is_finite() || er <= 0.0 {
        return Err(GridError::InvalidParameter {
            parameter: "er",
            value: er,
            reason: "must be positive and finite",
        });
    }

    if er == tr || math::is_integer_multiple(tr, er) {
        return Ok(er);
    }

    let multiple = (tr / er).round_ties_even().max(1.0);
    let adjusted = tr / multiple;
    tracing::warn!(
        "TR must be an even multiple of ER: changing ER to {:.3}",
        adjusted
    );
    Ok(adjusted)
}

// ============================================================================
// Tests
// ============================================================================

//! FIR design matrix construction
//!
//! Each condition gets a binary matrix of shape (time points × lags). Entry
//! `[t, k]` is 1 when acquisition `t` falls on peristimulus lag `k` of some
//! event of that condition.
//!
//! Acquisition times are truncated and target times rounded to 0.1 ms before
//! comparison (see [`firhrf_core::math`]), so independently computed times
//! match exactly instead of within a tolerance.

use std::ops::Range;

use firhrf_core::math;
use firhrf_core::{ConditionInfo, EventTable, PeristimulusGrid};
use nalgebra::DMatrix;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ============================================================================
// Acquisition Scale
// ============================================================================

/// Quantised acquisition times of every sample
#[derive(Clone, Debug)]
pub struct AcquisitionScale {
    /// Non-decreasing tick per sample
    ticks: Vec<i64>,
}

impl AcquisitionScale {
    /// Acquisition scale for `n_timepoints` samples spaced by `tr_s`
    #[must_use]
    pub fn new(n_timepoints: usize, tr_s: f64) -> Self {
        Self {
            ticks: (0..n_timepoints)
                .map(|t| math::acquisition_tick(t, tr_s))
                .collect(),
        }
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// True if there are no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Acquisition time of sample `t` in seconds, at timing resolution
    pub fn time_s(&self, t: usize) -> Option<f64> {
        self.ticks.get(t).copied().map(math::ticks_to_seconds)
    }

    /// Samples whose acquisition tick equals `tick`.
    ///
    /// Usually empty or a single sample; every tied sample is returned.
    pub fn samples_at(&self, tick: i64) -> Range<usize> {
        let start = self.ticks.partition_point(|&t| t < tick);
        let end = start + self.ticks[start..].partition_point(|&t| t == tick);
        start..end
    }
}

// ============================================================================
// Design Matrices
// ============================================================================

/// Build the design matrix of one condition from its onsets.
///
/// Non-finite onsets align with no acquisition and are skipped.
pub fn build_condition_design(
    onsets_s: &[f64],
    grid: &PeristimulusGrid,
    scale: &AcquisitionScale,
) -> DMatrix<f64> {
    let mut design = DMatrix::zeros(scale.len(), grid.n_h_est());

    for &onset in onsets_s.iter().filter(|onset| onset.is_finite()) {
        let rounded_onset = math::snap_to_resolution(onset, grid.er());

        for lag in 0..grid.n_h_est() {
            let target = math::target_tick(rounded_onset + grid.lag_offset(lag));
            for t in scale.samples_at(target) {
                design[(t, lag)] = 1.0;
            }
        }
    }

    design
}

/// Build every condition's design matrix, in condition order.
pub fn build_design_matrices(
    events: &EventTable,
    conditions: &[ConditionInfo],
    grid: &PeristimulusGrid,
    n_timepoints: usize,
) -> Vec<DMatrix<f64>> {
    let scale = AcquisitionScale::new(n_timepoints, grid.tr());
    let build = |condition: &ConditionInfo| {
        let onsets = events.onsets_for(condition.code);
        let design = build_condition_design(&onsets, grid, &scale);
        tracing::debug!(
            code = condition.code,
            label = %condition.label,
            n_events = onsets.len(),
            matched = design.iter().filter(|&&v| v != 0.0).count(),
            "Built FIR design matrix"
        );
        design
    };

    #[cfg(feature = "parallel")]
    let designs = conditions.par_iter().map(build).collect();
    #[cfg(not(feature = "parallel"))]
    let designs = conditions.iter().map(build).collect();

    designs
}

/// Concatenate condition designs horizontally, columns grouped by condition.
///
/// This is the (time × lag·condition) view of the time × lag × condition
/// model.
pub fn stack_designs(designs: &[DMatrix<f64>], n_timepoints: usize, n_h_est: usize) -> DMatrix<f64> {
    let mut model = DMatrix::zeros(n_timepoints, n_h_est * designs.len());
    for (c, design) in designs.iter().enumerate() {
        model.columns_mut(c * n_h_est, n_h_est).copy_from(design);
    }
    model
}

// ============================================================================
// Tests
// ============================================================================

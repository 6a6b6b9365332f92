//! HRF estimators
//!
//! Two ways to turn FIR design matrices and a timecourse into per-condition
//! response shapes:
//!
//! - **FIR** ([`Metric::Fir`]): least-squares regression of the timecourse on
//!   the column-demeaned, concatenated design plus an intercept, solved with
//!   the Moore–Penrose pseudo-inverse so rank-deficient designs still give
//!   the minimum-norm solution.
//! - **Average** ([`Metric::Average`]): event-selective averaging per lag,
//!   corrected by the mean of the pre-stimulus lags.

use std::fmt;
use std::str::FromStr;

use firhrf_core::math;
use firhrf_core::PeristimulusGrid;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::design::stack_designs;
use super::timecourse::{ResponseEstimate, Timecourse};
use crate::error::{RetrievalError, RetrievalResult};

// ============================================================================
// Metric
// ============================================================================

/// Estimation method
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// FIR general linear model
    #[serde(rename = "FIR")]
    Fir,
    /// Event-selective averaging
    #[serde(rename = "average")]
    Average,
}

impl Metric {
    /// Canonical name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fir => "FIR",
            Self::Average => "average",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIR" => Ok(Self::Fir),
            "average" => Ok(Self::Average),
            _ => Err(RetrievalError::InvalidMetric {
                name: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// FIR / GLM
// ============================================================================

/// Estimate every condition's response by FIR regression.
///
/// `designs` are the per-condition (time × lag) matrices in condition order;
/// the result has one estimate per design, in the same order.
///
/// # Errors
///
/// Returns [`RetrievalError::ComputationError`] if the design and timecourse
/// disagree on the number of time points, or the pseudo-inverse fails.
pub fn estimate_fir(
    designs: &[DMatrix<f64>],
    timecourse: &Timecourse,
    n_h_est: usize,
) -> RetrievalResult<Vec<ResponseEstimate>> {
    let ntps = timecourse.n_timepoints();
    check_timepoints(designs, ntps)?;

    let mut model = stack_designs(designs, ntps, n_h_est);
    for mut column in model.column_iter_mut() {
        let mean = column.mean();
        column.add_scalar_mut(-mean);
    }

    let n_columns = model.ncols();
    let design = model.insert_column(n_columns, 1.0);
    let pinv = pseudo_inverse(design)?;

    // (lags·conditions + 1) × voxels
    let beta = pinv * timecourse.data().transpose();
    tracing::debug!(
        rows = beta.nrows(),
        voxels = beta.ncols(),
        "Solved FIR model"
    );

    Ok((0..designs.len())
        .map(|c| {
            let block = beta.rows(c * n_h_est, n_h_est).transpose();
            ResponseEstimate::from_voxel_rows(block, timecourse)
        })
        .collect())
}

/// Moore–Penrose pseudo-inverse with a relative singular value cutoff.
fn pseudo_inverse(matrix: DMatrix<f64>) -> RetrievalResult<DMatrix<f64>> {
    let largest_dim = matrix.nrows().max(matrix.ncols());
    let svd = matrix.svd(true, true);
    let max_singular = svd.singular_values.max();
    let cutoff = max_singular * largest_dim as f64 * f64::EPSILON;

    svd.pseudo_inverse(cutoff)
        .map_err(|reason| RetrievalError::ComputationError {
            operation: "pseudo_inverse",
            reason: reason.to_string(),
        })
}

// ============================================================================
// Selective Averaging
// ============================================================================

/// Estimate one condition's response by event-selective averaging.
///
/// Each lag is the mean of the timecourse over the samples its design column
/// selects. Lags that select no sample are NaN. The baseline is the mean of
/// the non-NaN pre-stimulus lags (`tscale < 0`) per voxel, or zero if there
/// are none, and is subtracted from every lag.
///
/// # Errors
///
/// Returns [`RetrievalError::ComputationError`] if the design and timecourse
/// disagree on the number of time points.
pub fn estimate_average(
    design: &DMatrix<f64>,
    timecourse: &Timecourse,
    grid: &PeristimulusGrid,
) -> RetrievalResult<ResponseEstimate> {
    check_timepoints(std::slice::from_ref(design), timecourse.n_timepoints())?;

    let counts = design.row_sum();
    let mut mean_hrf = timecourse.data() * design;
    for (lag, mut column) in mean_hrf.column_iter_mut().enumerate() {
        column /= counts[lag];
    }

    let pre_stim: Vec<usize> = grid.pre_stimulus_lags().collect();
    let baselines = DVector::from_iterator(
        mean_hrf.nrows(),
        mean_hrf.row_iter().map(|row| {
            math::nan_mean(pre_stim.iter().map(|&lag| row[lag])).unwrap_or(0.0)
        }),
    );

    for (mut row, baseline) in mean_hrf.row_iter_mut().zip(baselines.iter()) {
        row.add_scalar_mut(-baseline);
    }

    Ok(ResponseEstimate::from_voxel_rows(mean_hrf, timecourse))
}

fn check_timepoints(designs: &[DMatrix<f64>], ntps: usize) -> RetrievalResult<()> {
    match designs.iter().find(|d| d.nrows() != ntps) {
        Some(design) => Err(RetrievalError::ComputationError {
            operation: "design",
            reason: format!(
                "design has {} time points, timecourse has {ntps}",
                design.nrows()
            ),
        }),
        None => Ok(()),
    }
}

// ============================================================================
// Tests
// ============================================================================

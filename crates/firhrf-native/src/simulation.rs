//! Synthetic timecourse generation
//!
//! Places known per-condition responses at every event onset using the same
//! FIR design as the estimators, so a noise-free synthetic timecourse is an
//! exact linear combination of the design columns plus a constant baseline.

use firhrf_core::{EventTable, PeristimulusGrid};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{RetrievalError, RetrievalResult};
use crate::hrf::HemodynamicResponseFunction;
use crate::processing::{build_design_matrices, Timecourse};

/// Simulation configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of acquisitions
    pub n_timepoints: usize,
    /// Constant signal level
    pub baseline: f64,
    /// Response shape shared by every condition
    pub hrf: HemodynamicResponseFunction,
    /// Amplitude per condition, in first-appearance order (missing = 1.0)
    pub condition_gains: Vec<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_timepoints: 200,
            baseline: 100.0,
            hrf: HemodynamicResponseFunction::canonical(),
            condition_gains: Vec::new(),
        }
    }
}

/// Single-voxel timecourse `baseline + sum_c X_c h_c`.
///
/// `responses` holds one vector of `nHEst` amplitudes per condition, in
/// first-appearance order.
///
/// # Errors
///
/// Returns [`RetrievalError::ComputationError`] if the number or length of
/// `responses` does not match the conditions and grid, or
/// [`RetrievalError::MalformedTimecourse`] if `n_timepoints` is zero.
pub fn synthesize_timecourse(
    events: &EventTable,
    grid: &PeristimulusGrid,
    n_timepoints: usize,
    responses: &[Vec<f64>],
    baseline: f64,
) -> RetrievalResult<Timecourse> {
    let conditions = events.conditions();
    if responses.len() != conditions.len() {
        return Err(RetrievalError::ComputationError {
            operation: "synthesize",
            reason: format!(
                "{} responses for {} conditions",
                responses.len(),
                conditions.len()
            ),
        });
    }
    if let Some(bad) = responses.iter().find(|r| r.len() != grid.n_h_est()) {
        return Err(RetrievalError::ComputationError {
            operation: "synthesize",
            reason: format!("response has {} lags, grid has {}", bad.len(), grid.n_h_est()),
        });
    }

    let designs = build_design_matrices(events, &conditions, grid, n_timepoints);
    let mut signal = DVector::from_element(n_timepoints, baseline);
    for (design, response) in designs.iter().zip(responses) {
        signal += design * DVector::from_column_slice(response);
    }

    Timecourse::voxel(signal.iter().copied().collect())
}

/// Simulate a timecourse with the configured HRF for every condition.
///
/// # Errors
///
/// Same as [`synthesize_timecourse`].
pub fn simulate_timecourse(
    events: &EventTable,
    grid: &PeristimulusGrid,
    config: &SimulationConfig,
) -> RetrievalResult<Timecourse> {
    let shape = config.hrf.sample(grid);
    let responses: Vec<Vec<f64>> = (0..events.conditions().len())
        .map(|c| {
            let gain = config.condition_gains.get(c).copied().unwrap_or(1.0);
            shape.iter().map(|v| v * gain).collect()
        })
        .collect();

    tracing::info!(
        n_timepoints = config.n_timepoints,
        n_conditions = responses.len(),
        "Simulating timecourse"
    );
    synthesize_timecourse(events, grid, config.n_timepoints, &responses, config.baseline)
}

// ============================================================================
// Tests
// ============================================================================

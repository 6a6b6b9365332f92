//! Serializable retrieval reports
//!
//! Reports flatten nalgebra containers into plain nested vectors so they can
//! be written as JSON. Non-finite amplitudes (unmatched averaging lags)
//! serialize as `null`.

use firhrf_core::{ConditionCode, PeristimulusGrid};
use serde::Serialize;

use crate::error::RetrievalResult;
use crate::processing::{Metric, ResponseEstimate};

/// Estimate amplitudes in the dimensionality of the input timecourse
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EstimateValues {
    /// One amplitude per lag
    Voxel(Vec<f64>),
    /// One row of amplitudes per voxel
    Voxels(Vec<Vec<f64>>),
}

impl From<&ResponseEstimate> for EstimateValues {
    fn from(estimate: &ResponseEstimate) -> Self {
        match estimate {
            ResponseEstimate::Voxel(v) => Self::Voxel(v.iter().copied().collect()),
            ResponseEstimate::Voxels(_) => Self::Voxels(estimate.to_rows()),
        }
    }
}

/// Per-condition part of a report
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConditionReport {
    /// Condition code
    pub code: ConditionCode,
    /// Condition label
    pub label: String,
    /// Number of events
    pub n_events: usize,
    /// Estimated response, if estimation has run
    pub estimate: Option<EstimateValues>,
}

/// Summary of a retrieval
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RetrievalReport {
    /// Metric of the estimates, if estimation has run
    pub metric: Option<Metric>,
    /// Number of time points in the timecourse
    pub n_timepoints: usize,
    /// Number of voxels in the timecourse
    pub n_voxels: usize,
    /// Peristimulus grid
    pub grid: PeristimulusGrid,
    /// Conditions in first-appearance order
    pub conditions: Vec<ConditionReport>,
}

impl RetrievalReport {
    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns [`crate::RetrievalError::Serialization`] if encoding fails.
    pub fn to_json_pretty(&self) -> RetrievalResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

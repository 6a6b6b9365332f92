//! Error types for native HRF retrieval
//!
//! Error types for loading, design construction and estimation using `thiserror`.

use std::path::PathBuf;

use firhrf_core::{EventTableError, GridError};
use thiserror::Error;

/// Retrieval error types
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Metric name is not one of the supported estimators
    #[error("Metric can only be FIR/average, got '{name}'")]
    InvalidMetric {
        /// Name that was requested
        name: String,
    },

    /// Peristimulus grid could not be built
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// Event table rows are malformed
    #[error("{0}")]
    MalformedEventTable(#[from] EventTableError),

    /// Timecourse data is malformed
    #[error("Malformed timecourse at line {line}: {reason}")]
    MalformedTimecourse {
        /// 1-based line (or voxel row) number
        line: usize,
        /// Reason for rejection
        reason: String,
    },

    /// Numerical computation failed
    #[error("Computation error in {operation}: {reason}")]
    ComputationError {
        /// Operation that failed
        operation: &'static str,
        /// Reason
        reason: String,
    },

    /// File could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for retrieval operations
pub type RetrievalResult<T> = Result<T, RetrievalError>;

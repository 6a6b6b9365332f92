//! Error types for the FIR HRF core
//!
//! Errors carry enough context (parameter names, line numbers, offending
//! text) to point at the bad input without re-reading it.

use thiserror::Error;

// ============================================================================
// Grid Construction Errors
// ============================================================================

/// Errors from building the peristimulus grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// A timing parameter is out of range
    #[error("Invalid parameter {parameter}: {value} ({reason})")]
    InvalidParameter {
        /// Parameter name (`tr`, `er`, `window`)
        parameter: &'static str,
        /// Offending value
        value: f64,
        /// Why the value was rejected
        reason: &'static str,
    },
}

// ============================================================================
// Event Table Errors
// ============================================================================

/// Errors from parsing a 4-column event table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventTableError {
    /// Row does not have exactly four columns
    #[error("Malformed event table at line {line}: expected 4 columns, found {found}")]
    ColumnCount {
        /// 1-based line number
        line: usize,
        /// Number of columns found
        found: usize,
    },

    /// A numeric column could not be parsed or is not finite
    #[error("Malformed event table at line {line}: invalid {column} '{text}'")]
    InvalidField {
        /// 1-based line number (event position for in-memory tables)
        line: usize,
        /// Column name (`onset`, `code`, `duration`)
        column: &'static str,
        /// Offending text
        text: String,
    },
}

impl EventTableError {
    /// Line number the error refers to
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::ColumnCount { line, .. } | Self::InvalidField { line, .. } => *line,
        }
    }
}

/// Result type for grid operations
pub type GridResult<T> = Result<T, GridError>;

/// Result type for event table operations
pub type EventTableResult<T> = Result<T, EventTableError>;

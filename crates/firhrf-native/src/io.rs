//! File loading and writing
//!
//! Plain-text formats only:
//! - Event tables: 4 whitespace-separated columns per line (see
//!   [`firhrf_core::EventTable::parse`])
//! - Timecourses: one voxel per line, whitespace-separated samples
//! - Configs: JSON [`RetrievalConfig`]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use firhrf_core::{EventTable, RetrievalConfig};

use crate::error::{RetrievalError, RetrievalResult};
use crate::processing::Timecourse;

fn read_to_string(path: &Path) -> RetrievalResult<String> {
    fs::read_to_string(path).map_err(|source| RetrievalError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Event Tables
// ============================================================================

/// Load an event table file.
///
/// # Errors
///
/// Returns [`RetrievalError::Io`] if the file cannot be read and
/// [`RetrievalError::MalformedEventTable`] for bad rows.
pub fn load_event_table(path: impl AsRef<Path>) -> RetrievalResult<EventTable> {
    let path = path.as_ref();
    let table = EventTable::parse(&read_to_string(path)?)?;
    tracing::debug!(path = %path.display(), n_events = table.len(), "Loaded event table");
    Ok(table)
}

// ============================================================================
// Timecourses
// ============================================================================

/// Parse timecourse text: one voxel per non-empty line.
///
/// Lines starting with `#` are comments. One data line gives a single-voxel
/// timecourse.
///
/// # Errors
///
/// Returns [`RetrievalError::MalformedTimecourse`] for non-numeric values,
/// ragged rows or an empty file.
pub fn parse_timecourse(text: &str) -> RetrievalResult<Timecourse> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let row = trimmed
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().map_err(|_| RetrievalError::MalformedTimecourse {
                    line: index + 1,
                    reason: format!("invalid value '{field}'"),
                })
            })
            .collect::<RetrievalResult<Vec<f64>>>()?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(RetrievalError::MalformedTimecourse {
                    line: index + 1,
                    reason: format!("expected {} time points, found {}", first.len(), row.len()),
                });
            }
        }
        rows.push(row);
    }

    Timecourse::from_rows(&rows)
}

/// Load a timecourse file.
///
/// # Errors
///
/// Same as [`parse_timecourse`], plus [`RetrievalError::Io`].
pub fn load_timecourse(path: impl AsRef<Path>) -> RetrievalResult<Timecourse> {
    let path = path.as_ref();
    let timecourse = parse_timecourse(&read_to_string(path)?)?;
    tracing::debug!(
        path = %path.display(),
        n_voxels = timecourse.n_voxels(),
        n_timepoints = timecourse.n_timepoints(),
        "Loaded timecourse"
    );
    Ok(timecourse)
}

/// Format a timecourse in the text layout [`parse_timecourse`] reads.
pub fn format_timecourse(timecourse: &Timecourse) -> String {
    let mut out = String::new();
    for row in timecourse.data().row_iter() {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.6}")).collect();
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}

/// Write a timecourse file.
///
/// # Errors
///
/// Returns [`RetrievalError::Io`] if the file cannot be written.
pub fn write_timecourse(path: impl AsRef<Path>, timecourse: &Timecourse) -> RetrievalResult<()> {
    let path = path.as_ref();
    fs::write(path, format_timecourse(timecourse)).map_err(|source| RetrievalError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Configs
// ============================================================================

/// Load a JSON retrieval config.
///
/// # Errors
///
/// Returns [`RetrievalError::Io`] or [`RetrievalError::Serialization`].
pub fn load_config(path: impl AsRef<Path>) -> RetrievalResult<RetrievalConfig> {
    Ok(serde_json::from_str(&read_to_string(path.as_ref())?)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_voxel() {
        let tc = parse_timecourse("# voxel 0\n1.0 2.0 3.5\n").unwrap();
        assert!(tc.is_single_voxel());
        assert_eq!(tc.voxel_samples(0), Some(vec![1.0, 2.0, 3.5]));
    }

    #[test]
    fn test_parse_multi_voxel() {
        let tc = parse_timecourse("1 2 3\n\n4 5 6\n").unwrap();
        assert_eq!(tc.n_voxels(), 2);
        assert_eq!(tc.n_timepoints(), 3);
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_timecourse("1 2 3\n4 x 6\n").unwrap_err();
        assert!(matches!(err, RetrievalError::MalformedTimecourse { line: 2, .. }));

        let err = parse_timecourse("1 2 3\n4 5\n").unwrap_err();
        assert!(matches!(err, RetrievalError::MalformedTimecourse { line: 2, .. }));

        assert!(parse_timecourse("# only a comment\n").is_err());
    }

    #[test]
    fn test_format_round_trip() {
        let tc = Timecourse::from_rows(&[vec![1.0, -0.5], vec![2.25, 3.0]]).unwrap();
        assert_eq!(parse_timecourse(&format_timecourse(&tc)).unwrap(), tc);
    }

    #[test]
    fn test_missing_file() {
        let err = load_event_table("/nonexistent/events.txt").unwrap_err();
        assert!(matches!(err, RetrievalError::Io { .. }));
    }
}

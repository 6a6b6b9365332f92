//! Timecourse and response estimate containers
//!
//! Both keep a voxel × sample matrix internally and remember whether the data
//! came from a single voxel, so estimates come back in the same
//! dimensionality as the input.

use nalgebra::{DMatrix, DVector};

use crate::error::{RetrievalError, RetrievalResult};

// ============================================================================
// Timecourse
// ============================================================================

/// fMRI timecourse for one voxel or a set of voxels
#[derive(Clone, Debug, PartialEq)]
pub struct Timecourse {
    /// Voxel × time point
    data: DMatrix<f64>,
    single: bool,
}

impl Timecourse {
    /// Create a single-voxel timecourse.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::MalformedTimecourse`] if `samples` is empty.
    pub fn voxel(samples: Vec<f64>) -> RetrievalResult<Self> {
        if samples.is_empty() {
            return Err(RetrievalError::MalformedTimecourse {
                line: 1,
                reason: "no time points".to_string(),
            });
        }

        let n = samples.len();
        Ok(Self {
            data: DMatrix::from_row_slice(1, n, &samples),
            single: true,
        })
    }

    /// Create a multi-voxel timecourse from one row per voxel.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::MalformedTimecourse`] if there are no rows,
    /// the rows are empty, or their lengths differ.
    pub fn voxels(rows: &[Vec<f64>]) -> RetrievalResult<Self> {
        let Some(first) = rows.first() else {
            return Err(RetrievalError::MalformedTimecourse {
                line: 1,
                reason: "no voxels".to_string(),
            });
        };

        let ntps = first.len();
        if ntps == 0 {
            return Err(RetrievalError::MalformedTimecourse {
                line: 1,
                reason: "no time points".to_string(),
            });
        }
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ntps) {
            return Err(RetrievalError::MalformedTimecourse {
                line: index + 1,
                reason: format!("expected {ntps} time points, found {}", row.len()),
            });
        }

        Ok(Self {
            data: DMatrix::from_fn(rows.len(), ntps, |v, t| rows[v][t]),
            single: false,
        })
    }

    /// Build from rows, producing a single-voxel timecourse for one row.
    ///
    /// # Errors
    ///
    /// Same as [`Timecourse::voxels`].
    pub fn from_rows(rows: &[Vec<f64>]) -> RetrievalResult<Self> {
        match rows {
            [only] => Self::voxel(only.clone()),
            _ => Self::voxels(rows),
        }
    }

    /// Wrap a voxel × time matrix.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::MalformedTimecourse`] if the matrix has no
    /// rows or no columns.
    pub fn from_matrix(data: DMatrix<f64>) -> RetrievalResult<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(RetrievalError::MalformedTimecourse {
                line: 1,
                reason: format!("empty {}x{} matrix", data.nrows(), data.ncols()),
            });
        }
        Ok(Self { data, single: false })
    }

    /// Voxel × time matrix (one row for a single voxel)
    #[inline]
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Number of time points (N)
    #[inline]
    pub fn n_timepoints(&self) -> usize {
        self.data.ncols()
    }

    /// Number of voxels
    #[inline]
    pub fn n_voxels(&self) -> usize {
        self.data.nrows()
    }

    /// Whether this is a 1-D (single voxel) timecourse
    #[inline]
    pub fn is_single_voxel(&self) -> bool {
        self.single
    }

    /// Samples of voxel `index`
    pub fn voxel_samples(&self, index: usize) -> Option<Vec<f64>> {
        (index < self.n_voxels()).then(|| self.data.row(index).iter().copied().collect())
    }
}

// ============================================================================
// Response Estimate
// ============================================================================

/// Per-condition response amplitudes across peristimulus lags
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseEstimate {
    /// Single voxel: one amplitude per lag
    Voxel(DVector<f64>),
    /// Multiple voxels: voxel × lag
    Voxels(DMatrix<f64>),
}

impl ResponseEstimate {
    /// Wrap a voxel × lag matrix in the dimensionality of `timecourse`
    pub(crate) fn from_voxel_rows(rows: DMatrix<f64>, timecourse: &Timecourse) -> Self {
        if timecourse.is_single_voxel() {
            Self::Voxel(rows.row(0).transpose())
        } else {
            Self::Voxels(rows)
        }
    }

    /// Number of lags
    pub fn n_lags(&self) -> usize {
        match self {
            Self::Voxel(v) => v.len(),
            Self::Voxels(m) => m.ncols(),
        }
    }

    /// Number of voxels
    pub fn n_voxels(&self) -> usize {
        match self {
            Self::Voxel(_) => 1,
            Self::Voxels(m) => m.nrows(),
        }
    }

    /// Amplitudes of voxel `index`
    pub fn voxel(&self, index: usize) -> Option<Vec<f64>> {
        match self {
            Self::Voxel(v) => (index == 0).then(|| v.iter().copied().collect()),
            Self::Voxels(m) => (index < m.nrows()).then(|| m.row(index).iter().copied().collect()),
        }
    }

    /// One row of amplitudes per voxel
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n_voxels()).filter_map(|v| self.voxel(v)).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_voxel() {
        let tc = Timecourse::voxel(vec![1.0, 2.0, 3.0]).unwrap();
        assert!(tc.is_single_voxel());
        assert_eq!(tc.n_timepoints(), 3);
        assert_eq!(tc.n_voxels(), 1);
        assert_eq!(tc.voxel_samples(0), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(tc.voxel_samples(1), None);
    }

    #[test]
    fn test_multi_voxel() {
        let tc = Timecourse::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert!(!tc.is_single_voxel());
        assert_eq!(tc.n_voxels(), 3);
        assert_eq!(tc.n_timepoints(), 2);
        assert_eq!(tc.data()[(2, 1)], 6.0);
    }

    #[test]
    fn test_from_rows_single() {
        let tc = Timecourse::from_rows(&[vec![1.0, 2.0]]).unwrap();
        assert!(tc.is_single_voxel());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Timecourse::voxels(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, RetrievalError::MalformedTimecourse { line: 2, .. }));

        assert!(Timecourse::voxel(Vec::new()).is_err());
        assert!(Timecourse::voxels(&[]).is_err());
        assert!(Timecourse::from_matrix(DMatrix::zeros(2, 0)).is_err());
    }

    #[test]
    fn test_response_shapes() {
        let single = Timecourse::voxel(vec![0.0; 4]).unwrap();
        let rows = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        let est = ResponseEstimate::from_voxel_rows(rows, &single);
        assert!(matches!(est, ResponseEstimate::Voxel(_)));
        assert_eq!(est.n_lags(), 3);
        assert_eq!(est.to_rows(), vec![vec![1.0, 2.0, 3.0]]);

        let multi = Timecourse::voxels(&[vec![0.0; 4], vec![0.0; 4]]).unwrap();
        let rows = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let est = ResponseEstimate::from_voxel_rows(rows, &multi);
        assert_eq!(est.n_voxels(), 2);
        assert_eq!(est.voxel(1), Some(vec![3.0, 4.0]));
        assert_eq!(est.voxel(2), None);
    }
}

//! HRF retrieval for one timecourse and one event schedule
//!
//! [`HrfRetrieval`] owns the inputs, the peristimulus grid and one
//! [`Condition`] record per condition code. Design matrices are built once
//! and replaced wholesale on rebuild; estimates are replaced wholesale on
//! every successful [`HrfRetrieval::estimate`] call.
//!
//! # Example
//!
//! ```rust
//! use firhrf_core::{Event, EventTable, RetrievalConfig};
//! use firhrf_native::{HrfRetrieval, Metric, Timecourse};
//!
//! let events: EventTable = [Event::new(10.0, 1, 1.0, "faces")].into_iter().collect();
//! let timecourse = Timecourse::voxel(vec![0.0; 20]).unwrap();
//!
//! let mut retrieval = HrfRetrieval::new(timecourse, events, &RetrievalConfig::new(2.0)).unwrap();
//! retrieval.estimate(Metric::Fir).unwrap();
//! assert_eq!(retrieval.conditions()[0].response().unwrap().n_lags(), 14);
//! ```

use firhrf_core::{ConditionCode, EventTable, PeristimulusGrid, RetrievalConfig};
use nalgebra::DMatrix;

use crate::error::RetrievalResult;
use crate::processing::{
    build_design_matrices, estimate_average, estimate_fir, stack_designs, Metric,
    ResponseEstimate, Timecourse,
};
use crate::report::{ConditionReport, RetrievalReport};

// ============================================================================
// Conditions
// ============================================================================

/// One experimental condition and its artifacts
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    code: ConditionCode,
    label: String,
    n_events: usize,
    design_matrix: Option<DMatrix<f64>>,
    response: Option<ResponseEstimate>,
}

impl Condition {
    /// Condition code
    #[inline]
    pub fn code(&self) -> ConditionCode {
        self.code
    }

    /// Display label (label of the first event with this code)
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of events with this code
    #[inline]
    pub fn n_events(&self) -> usize {
        self.n_events
    }

    /// Binary (time × lag) FIR design matrix, once built
    #[inline]
    pub fn design_matrix(&self) -> Option<&DMatrix<f64>> {
        self.design_matrix.as_ref()
    }

    /// Response estimate from the last successful estimation
    #[inline]
    pub fn response(&self) -> Option<&ResponseEstimate> {
        self.response.as_ref()
    }
}

// ============================================================================
// Retrieval
// ============================================================================

/// FIR HRF retrieval state
#[derive(Clone, Debug)]
pub struct HrfRetrieval {
    timecourse: Timecourse,
    events: EventTable,
    grid: PeristimulusGrid,
    conditions: Vec<Condition>,
    metric: Option<Metric>,
}

impl HrfRetrieval {
    /// Set up a retrieval: build the grid and discover conditions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RetrievalError::Grid`] for invalid timing parameters
    /// and [`crate::RetrievalError::MalformedEventTable`] for events with a
    /// non-finite onset or duration.
    pub fn new(
        timecourse: Timecourse,
        events: EventTable,
        config: &RetrievalConfig,
    ) -> RetrievalResult<Self> {
        let grid = PeristimulusGrid::new(config)?;
        events.validate()?;
        let conditions: Vec<Condition> = events
            .conditions()
            .into_iter()
            .map(|info| Condition {
                code: info.code,
                label: info.label,
                n_events: info.n_events,
                design_matrix: None,
                response: None,
            })
            .collect();

        tracing::info!(
            n_timepoints = timecourse.n_timepoints(),
            n_voxels = timecourse.n_voxels(),
            n_events = events.len(),
            n_conditions = conditions.len(),
            er = grid.er(),
            n_h_est = grid.n_h_est(),
            "HRF retrieval set up"
        );

        Ok(Self {
            timecourse,
            events,
            grid,
            conditions,
            metric: None,
        })
    }

    /// Peristimulus grid shared by every condition
    #[inline]
    pub fn grid(&self) -> &PeristimulusGrid {
        &self.grid
    }

    /// Input timecourse
    #[inline]
    pub fn timecourse(&self) -> &Timecourse {
        &self.timecourse
    }

    /// Input event table
    #[inline]
    pub fn events(&self) -> &EventTable {
        &self.events
    }

    /// Conditions in first-appearance order
    #[inline]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Condition with the given code
    pub fn condition(&self, code: ConditionCode) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.code == code)
    }

    /// Metric of the last successful estimation
    #[inline]
    pub fn metric(&self) -> Option<Metric> {
        self.metric
    }

    /// Whether design matrices have been built
    pub fn has_design(&self) -> bool {
        self.conditions.iter().all(|c| c.design_matrix.is_some())
    }

    /// Build (or rebuild) every condition's FIR design matrix.
    pub fn build_design_matrices(&mut self) {
        let infos = self.events.conditions();
        let designs = build_design_matrices(
            &self.events,
            &infos,
            &self.grid,
            self.timecourse.n_timepoints(),
        );

        for (condition, design) in self.conditions.iter_mut().zip(designs) {
            condition.design_matrix = Some(design);
        }
    }

    /// Horizontally concatenated design (time × lag·condition).
    ///
    /// `None` until the design matrices are built.
    pub fn stacked_design(&self) -> Option<DMatrix<f64>> {
        let designs = self.designs()?;
        Some(stack_designs(
            &designs,
            self.timecourse.n_timepoints(),
            self.grid.n_h_est(),
        ))
    }

    /// Estimate every condition's response with `metric`.
    ///
    /// Builds the design matrices first if needed. On error no estimate is
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RetrievalError::ComputationError`] if the linear
    /// algebra fails.
    pub fn estimate(&mut self, metric: Metric) -> RetrievalResult<()> {
        if !self.has_design() {
            self.build_design_matrices();
        }
        let designs = self.designs().unwrap_or_default();

        let estimates = match metric {
            Metric::Fir => estimate_fir(&designs, &self.timecourse, self.grid.n_h_est())?,
            Metric::Average => designs
                .iter()
                .map(|design| estimate_average(design, &self.timecourse, &self.grid))
                .collect::<RetrievalResult<Vec<_>>>()?,
        };

        for (condition, estimate) in self.conditions.iter_mut().zip(estimates) {
            condition.response = Some(estimate);
        }
        self.metric = Some(metric);

        tracing::info!(
            metric = %metric,
            n_conditions = self.conditions.len(),
            "Estimated HRFs"
        );
        Ok(())
    }

    /// Estimate with a metric given by name (`"FIR"` or `"average"`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::RetrievalError::InvalidMetric`] for any other name,
    /// before anything is computed.
    pub fn estimate_named(&mut self, metric: &str) -> RetrievalResult<()> {
        let metric: Metric = metric.parse()?;
        self.estimate(metric)
    }

    /// Serializable summary of grid, conditions and estimates
    pub fn report(&self) -> RetrievalReport {
        RetrievalReport {
            metric: self.metric,
            n_timepoints: self.timecourse.n_timepoints(),
            n_voxels: self.timecourse.n_voxels(),
            grid: self.grid.clone(),
            conditions: self
                .conditions
                .iter()
                .map(|c| ConditionReport {
                    code: c.code,
                    label: c.label.clone(),
                    n_events: c.n_events,
                    estimate: c.response.as_ref().map(Into::into),
                })
                .collect(),
        }
    }

    fn designs(&self) -> Option<Vec<DMatrix<f64>>> {
        self.conditions
            .iter()
            .map(|c| c.design_matrix.clone())
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetrievalError;
    use firhrf_core::{Event, EventTableError};

    fn events() -> EventTable {
        [
            Event::new(10.0, 3, 1.0, "faces"),
            Event::new(40.0, 1, 1.0, "houses"),
            Event::new(70.0, 3, 1.0, "faces_repeat"),
            Event::new(100.0, 1, 1.0, "houses"),
        ]
        .into_iter()
        .collect()
    }

    fn retrieval(ntps: usize) -> HrfRetrieval {
        let tc = Timecourse::voxel((0..ntps).map(|t| (t as f64 * 0.3).sin()).collect()).unwrap();
        HrfRetrieval::new(tc, events(), &RetrievalConfig::new(2.0)).unwrap()
    }

    #[test]
    fn test_conditions_in_first_appearance_order() {
        let r = retrieval(80);
        let codes: Vec<ConditionCode> = r.conditions().iter().map(Condition::code).collect();
        assert_eq!(codes, vec![3, 1]);
        assert_eq!(r.conditions()[0].label(), "faces");
        assert_eq!(r.condition(1).map(Condition::n_events), Some(2));
        assert!(r.condition(2).is_none());
        assert!(!r.has_design());
        assert!(r.stacked_design().is_none());
    }

    #[test]
    fn test_non_finite_onset_is_rejected() {
        let tc = Timecourse::voxel(vec![0.0; 20]).unwrap();
        let events: EventTable = [Event::new(f64::NAN, 1, 1.0, "a")].into_iter().collect();

        let err = HrfRetrieval::new(tc, events, &RetrievalConfig::new(2.0)).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::MalformedEventTable(EventTableError::InvalidField { column: "onset", .. })
        ));
    }

    #[test]
    fn test_build_design_matrices() {
        let mut r = retrieval(80);
        r.build_design_matrices();

        assert!(r.has_design());
        for condition in r.conditions() {
            let design = condition.design_matrix().unwrap();
            assert_eq!(design.shape(), (80, 14));
        }
        let stacked = r.stacked_design().unwrap();
        assert_eq!(stacked.shape(), (80, 28));
        assert_eq!(
            stacked.columns(14, 14).into_owned(),
            *r.conditions()[1].design_matrix().unwrap()
        );
    }

    #[test]
    fn test_estimate_builds_lazily() {
        let mut r = retrieval(80);
        r.estimate(Metric::Average).unwrap();

        assert!(r.has_design());
        assert_eq!(r.metric(), Some(Metric::Average));
        for condition in r.conditions() {
            assert_eq!(condition.response().unwrap().n_lags(), 14);
        }
    }

    #[test]
    fn test_invalid_metric_populates_nothing() {
        let mut r = retrieval(80);
        for name in ["bogus", "fir", "AVERAGE"] {
            let err = r.estimate_named(name).unwrap_err();
            assert!(matches!(err, RetrievalError::InvalidMetric { .. }), "{name}");
        }

        assert!(r.metric().is_none());
        assert!(r.conditions().iter().all(|c| c.response().is_none()));
    }

    #[test]
    fn test_reestimate_replaces_results() {
        let mut r = retrieval(80);
        r.estimate_named("FIR").unwrap();
        let fir = r.conditions()[0].response().cloned();
        r.estimate_named("average").unwrap();

        assert_eq!(r.metric(), Some(Metric::Average));
        assert_ne!(r.conditions()[0].response().cloned(), fir);
    }

    #[test]
    fn test_multi_voxel_estimates() {
        let rows: Vec<Vec<f64>> = (0..3)
            .map(|v| (0..80).map(|t| f64::from(v) + (t as f64 * 0.2).cos()).collect())
            .collect();
        let tc = Timecourse::from_rows(&rows).unwrap();
        let mut r = HrfRetrieval::new(tc, events(), &RetrievalConfig::new(2.0)).unwrap();
        r.estimate(Metric::Fir).unwrap();

        let estimate = r.conditions()[1].response().unwrap();
        assert!(matches!(estimate, ResponseEstimate::Voxels(m) if m.shape() == (3, 14)));
    }

    #[test]
    fn test_empty_window_and_empty_table() {
        let tc = Timecourse::voxel(vec![1.0; 30]).unwrap();
        let config = RetrievalConfig::new(2.0).with_window([0.0, 0.0]);
        let mut r = HrfRetrieval::new(tc.clone(), events(), &config).unwrap();
        r.estimate(Metric::Fir).unwrap();
        r.estimate(Metric::Average).unwrap();
        assert!(r.conditions().iter().all(|c| c.response().unwrap().n_lags() == 0));

        let mut r = HrfRetrieval::new(tc, EventTable::default(), &RetrievalConfig::new(2.0)).unwrap();
        r.estimate(Metric::Fir).unwrap();
        assert!(r.conditions().is_empty());
        assert_eq!(r.stacked_design().map(|m| m.shape()), Some((30, 0)));
    }

    #[test]
    fn test_report() {
        let mut r = retrieval(80);
        r.estimate(Metric::Fir).unwrap();
        let report = r.report();

        assert_eq!(report.metric, Some(Metric::Fir));
        assert_eq!(report.conditions.len(), 2);
        assert_eq!(report.conditions[0].label, "faces");
        assert!(report.conditions.iter().all(|c| c.estimate.is_some()));
    }
}

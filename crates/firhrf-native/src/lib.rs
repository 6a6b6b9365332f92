//! firhrf Native - FIR design matrices and HRF estimation
//!
//! This crate provides the numerical side of HRF retrieval:
//! - FIR design matrix construction on the acquisition grid
//! - FIR regression (pseudo-inverse GLM) and selective averaging
//! - Canonical HRF and synthetic timecourses
//! - Plain-text loaders and JSON reports
//!
//! # Modules
//!
//! - [`processing`]: Design matrices and estimators
//! - [`retrieval`]: Per-condition retrieval state
//! - [`hrf`]: Canonical hemodynamic response
//! - [`simulation`]: Synthetic timecourses
//! - [`io`]: File loading and writing
//! - [`report`]: Serializable results

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod error;
pub mod hrf;
pub mod io;
pub mod processing;
pub mod report;
pub mod retrieval;
pub mod simulation;

// Re-export key types
pub use error::{RetrievalError, RetrievalResult};
pub use hrf::HemodynamicResponseFunction;
pub use processing::{Metric, ResponseEstimate, Timecourse};
pub use report::RetrievalReport;
pub use retrieval::{Condition, HrfRetrieval};
pub use simulation::{simulate_timecourse, synthesize_timecourse, SimulationConfig};

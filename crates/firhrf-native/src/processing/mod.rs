//! FIR processing pipeline
//!
//! This module provides the numerical stages of HRF retrieval:
//! - [`timecourse`]: Timecourse and response estimate containers
//! - [`design`]: FIR design matrix construction on the acquisition grid
//! - [`estimator`]: FIR regression and selective averaging

pub mod design;
pub mod estimator;
pub mod timecourse;

pub use design::{build_condition_design, build_design_matrices, stack_designs, AcquisitionScale};
pub use estimator::{estimate_average, estimate_fir, Metric};
pub use timecourse::{ResponseEstimate, Timecourse};

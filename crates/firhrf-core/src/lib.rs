//! firhrf Core - peristimulus grid and event schedule types
//!
//! This crate provides the foundational types and timing utilities for
//! finite impulse response (FIR) estimation of hemodynamic responses. It has
//! no linear algebra dependencies; the numerical estimators live in
//! `firhrf-native`.
//!
//! # Modules
//!
//! - [`types`]: Events, event tables and condition discovery
//! - [`grid`]: Peristimulus grid (TR, ER, window, time axis)
//! - [`math`]: Time quantisation shared by grid and design construction
//! - [`error`]: Error types for grid construction and event parsing
//!
//! # Example
//!
//! ```rust
//! use firhrf_core::grid::{PeristimulusGrid, RetrievalConfig};
//!
//! let grid = PeristimulusGrid::new(&RetrievalConfig::new(2.0)).unwrap();
//! assert_eq!(grid.n_pre_stim(), 2);
//! assert_eq!(grid.n_h_est(), 14);
//! assert_eq!(grid.tscale()[0], -2.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod error;
pub mod grid;
pub mod math;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{EventTableError, GridError};
pub use grid::{PeristimulusGrid, RetrievalConfig};
pub use types::{ConditionCode, ConditionInfo, Event, EventTable};

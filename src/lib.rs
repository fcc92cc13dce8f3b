//! IFRS 17 General Measurement Model engine
//!
//! This library provides:
//! - Loaders for the assumption feed and the model parameters
//! - Initial recognition of CSM or loss component at inception
//! - BEL, RA, CSM and TCL reconciliations rolled forward per period
//! - Analysis by measurement component and by remaining coverage
//! - Input plausibility checks and CSV/JSON writers for the result tables

pub mod assumptions;
pub mod error;
pub mod measurement;
pub mod output;
pub mod parameters;
pub mod validation;

// Re-export commonly used types
pub use assumptions::{load_assumptions, AssumptionRow, BusinessType, LoadedAssumptions, MovementCode};
pub use error::{GmmError, Result};
pub use measurement::{EngineConfig, GmmEngine};
pub use output::GmmResults;
pub use parameters::{load_parameters, Parameters, RecognitionMode, TransitionApproach};
pub use validation::{validate, ValidationReport};

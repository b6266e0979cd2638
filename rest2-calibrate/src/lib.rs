//! Calibration of the two REST2 cloud parameters against measured irradiance.
//!
//! [`Calibrator`] fits `(mu0, g)` for one plant by minimising the RMSE between
//! a modelled irradiance stream and measurements with [`bfgs::minimize`].
//! [`MetricsEvaluator`] scores a composed result against measurements.

pub mod bfgs;
pub mod calibrator;
pub mod metrics;

pub use bfgs::{BfgsOptions, MinimizeReport, Termination};
pub use calibrator::{CalibratedParameters, CalibrationOutcome, Calibrator, MetricsEvaluator};
pub use metrics::Metrics;

use rest2_core::Rest2Error;
use thiserror::Error;

/// Error type for calibration operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] Rest2Error),
    #[error("Measured `{0}` has no values on the model time axis")]
    NoOverlap(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Convenience type for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

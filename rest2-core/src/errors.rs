use crate::timeseries::Time;
use thiserror::Error;

/// Error type for invalid model inputs and selections.
#[derive(Error, Debug)]
pub enum Rest2Error {
    #[error("Required variable `{0}` is missing")]
    MissingVariable(String),
    #[error("Variable `{name}` has {actual} values but its time axis has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Variable `{0}` is not aligned with the COD time axis")]
    MisalignedTimeAxis(String),
    #[error("Time axis is not strictly ascending at index {index} ({time})")]
    NonMonotonicTimeAxis { index: usize, time: Time },
    #[error("Unknown radiation type: {0}")]
    UnknownRadiationType(String),
    #[error("Invalid time window `{0}`. Expected `<start>/<end>` with start <= end")]
    InvalidTimeWindow(String),
    #[error("Unknown timezone `{0}`")]
    UnknownTimezone(String),
}

/// Convenience type for `Result<T, Rest2Error>`.
pub type Rest2Result<T> = Result<T, Rest2Error>;

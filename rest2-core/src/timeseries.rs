//! Timestamp-indexed series.
//!
//! Every input and output of the model is a [`Timeseries`]: a vector of values
//! sharing an [`Arc<TimeAxis>`] with the other variables of the same location.
//! Axes are validated once at construction; the model never re-sorts or
//! de-duplicates timestamps.

use crate::errors::{Rest2Error, Rest2Result};
use chrono::{DateTime, Duration, Utc};
use ndarray::{s, Array1};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;

pub type FloatValue = f64;
pub type Time = DateTime<Utc>;

/// Strictly ascending, duplicate-free sequence of UTC timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Time>", into = "Vec<Time>")]
pub struct TimeAxis {
    times: Vec<Time>,
}

impl TimeAxis {
    /// Build a time axis, failing if the timestamps are not strictly ascending.
    pub fn new(times: Vec<Time>) -> Rest2Result<Self> {
        if let Some(index) = times.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(Rest2Error::NonMonotonicTimeAxis {
                index: index + 1,
                time: times[index + 1],
            });
        }
        Ok(Self { times })
    }

    /// A fixed-cadence axis of `count` timestamps starting at `start`.
    ///
    /// # Panics
    /// Panics if `step` is not positive.
    pub fn regular(start: Time, step: Duration, count: usize) -> Self {
        assert!(step > Duration::zero(), "step must be positive");
        let times = (0..count)
            .map(|i| start + step * i as i32)
            .collect::<Vec<_>>();
        Self { times }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn iter(&self) -> impl Iterator<Item = &Time> {
        self.times.iter()
    }

    pub fn first(&self) -> Option<Time> {
        self.times.first().copied()
    }

    pub fn last(&self) -> Option<Time> {
        self.times.last().copied()
    }

    /// Index of an exact timestamp
    pub fn position(&self, time: &Time) -> Option<usize> {
        self.times.binary_search(time).ok()
    }

    /// Index range covering `start..=end`
    pub fn window_range(&self, start: Time, end: Time) -> Range<usize> {
        let lower = self.times.partition_point(|t| *t < start);
        let upper = self.times.partition_point(|t| *t <= end);
        lower..upper.max(lower)
    }

    /// Sub-axis covering `start..=end`
    pub fn window(&self, start: Time, end: Time) -> Self {
        let range = self.window_range(start, end);
        Self {
            times: self.times[range].to_vec(),
        }
    }
}

impl TryFrom<Vec<Time>> for TimeAxis {
    type Error = Rest2Error;

    fn try_from(times: Vec<Time>) -> Rest2Result<Self> {
        Self::new(times)
    }
}

impl From<TimeAxis> for Vec<Time> {
    fn from(axis: TimeAxis) -> Self {
        axis.times
    }
}

/// A series of values aligned to a shared time axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TimeseriesRepr")]
pub struct Timeseries {
    time_axis: Arc<TimeAxis>,
    values: Array1<FloatValue>,
}

/// Unchecked serialized form; converted through [`Timeseries::new`].
#[derive(Deserialize)]
struct TimeseriesRepr {
    time_axis: Arc<TimeAxis>,
    values: Array1<FloatValue>,
}

impl TryFrom<TimeseriesRepr> for Timeseries {
    type Error = Rest2Error;

    fn try_from(repr: TimeseriesRepr) -> Rest2Result<Self> {
        Self::new(repr.values, repr.time_axis)
    }
}

impl Timeseries {
    /// Create a timeseries on an existing axis.
    ///
    /// Fails if the number of values differs from the number of timestamps.
    pub fn new(values: Array1<FloatValue>, time_axis: Arc<TimeAxis>) -> Rest2Result<Self> {
        if values.len() != time_axis.len() {
            return Err(Rest2Error::LengthMismatch {
                name: "timeseries".to_string(),
                expected: time_axis.len(),
                actual: values.len(),
            });
        }
        Ok(Self { time_axis, values })
    }

    /// Create a timeseries from raw timestamps, validating their order.
    pub fn from_values(values: Array1<FloatValue>, times: Vec<Time>) -> Rest2Result<Self> {
        Self::new(values, Arc::new(TimeAxis::new(times)?))
    }

    /// A series holding the same value at every timestamp
    pub fn constant(value: FloatValue, time_axis: Arc<TimeAxis>) -> Self {
        let values = Array1::from_elem(time_axis.len(), value);
        Self { time_axis, values }
    }

    /// Used where the values were derived element-wise from arrays on this axis.
    pub(crate) fn from_aligned(values: Array1<FloatValue>, time_axis: Arc<TimeAxis>) -> Self {
        debug_assert_eq!(values.len(), time_axis.len());
        Self { time_axis, values }
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.values
    }

    pub fn into_values(self) -> Array1<FloatValue> {
        self.values
    }

    pub fn time_axis(&self) -> &Arc<TimeAxis> {
        &self.time_axis
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `other` shares this series' timestamps
    pub fn is_aligned_with(&self, other: &Timeseries) -> bool {
        Arc::ptr_eq(&self.time_axis, &other.time_axis) || self.time_axis == other.time_axis
    }

    /// Value at an exact timestamp
    pub fn at(&self, time: &Time) -> Option<FloatValue> {
        self.time_axis.position(time).map(|i| self.values[i])
    }

    /// Apply `f` to every value, keeping the axis.
    pub fn mapv(&self, f: impl Fn(FloatValue) -> FloatValue) -> Self {
        Self {
            time_axis: Arc::clone(&self.time_axis),
            values: self.values.mapv(f),
        }
    }

    /// Select the values within `start..=end` on a freshly built axis.
    pub fn window(&self, start: Time, end: Time) -> Self {
        let range = self.time_axis.window_range(start, end);
        let time_axis = Arc::new(TimeAxis {
            times: self.time_axis.times[range.clone()].to_vec(),
        });
        self.slice_onto(range, time_axis)
    }

    /// Select `range` and attach the values to an axis the caller built for that range.
    pub(crate) fn slice_onto(&self, range: Range<usize>, time_axis: Arc<TimeAxis>) -> Self {
        let values = self.values.slice(s![range.start..range.end]).to_owned();
        Self::from_aligned(values, time_axis)
    }

    /// Re-index onto `target` by timestamp.
    ///
    /// Timestamps of `target` absent from this series become NaN; timestamps of this
    /// series absent from `target` are dropped.
    pub fn align_to(&self, target: &Arc<TimeAxis>) -> Self {
        let values = target
            .iter()
            .map(|t| self.at(t).unwrap_or(FloatValue::NAN))
            .collect::<Array1<_>>();
        Self::from_aligned(values, Arc::clone(target))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Time, FloatValue)> {
        self.time_axis.iter().zip(self.values.iter().copied())
    }
}

//! Error metrics between modelled and measured irradiance.
//!
//! Errors are `modelled - measured`. A timestep where either side is NaN
//! yields a NaN error and is dropped from every metric.

use indexmap::IndexMap;
use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};

/// Errors at timesteps where both operands are present.
///
/// # Panics
/// Panics if the arrays differ in length.
pub fn valid_errors(modelled: &Array1<f64>, measured: &Array1<f64>) -> Vec<f64> {
    Zip::from(modelled)
        .and(measured)
        .map_collect(|&m, &o| m - o)
        .into_iter()
        .filter(|e| !e.is_nan())
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

pub fn mean_error(errors: &[f64]) -> f64 {
    mean(errors.iter().copied())
}

pub fn mean_absolute_error(errors: &[f64]) -> f64 {
    mean(errors.iter().map(|e| e.abs()))
}

pub fn root_mean_square_error(errors: &[f64]) -> f64 {
    mean(errors.iter().map(|e| e * e)).sqrt()
}

/// ME, MAE and RMSE of one irradiance stream (W/m²).
///
/// All three are NaN when no timestep has both values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub me: f64,
    pub mae: f64,
    pub rmse: f64,
}

impl Metrics {
    pub fn from_errors(errors: &[f64]) -> Self {
        Self {
            me: mean_error(errors),
            mae: mean_absolute_error(errors),
            rmse: root_mean_square_error(errors),
        }
    }

    pub fn compute(modelled: &Array1<f64>, measured: &Array1<f64>) -> Self {
        Self::from_errors(&valid_errors(modelled, measured))
    }

    /// Keyed `ME`, `MAE` and `RMSE`.
    pub fn as_map(&self) -> IndexMap<String, f64> {
        IndexMap::from([
            ("ME".to_string(), self.me),
            ("MAE".to_string(), self.mae),
            ("RMSE".to_string(), self.rmse),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_perfect_prediction() {
        let measured = array![0.0, 120.0, 640.5, 980.0];
        let metrics = Metrics::compute(&measured, &measured);

        assert_eq!(metrics.me, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.rmse, 0.0);
    }

    #[test]
    fn test_constant_offset() {
        let measured = array![0.0, 120.0, 640.5, 980.0];
        for delta in [12.5, -7.0] {
            let modelled = measured.mapv(|v| v + delta);
            let metrics = Metrics::compute(&modelled, &measured);

            assert_relative_eq!(metrics.me, delta, epsilon = 1e-12);
            assert_relative_eq!(metrics.mae, delta.abs(), epsilon = 1e-12);
            assert_relative_eq!(metrics.rmse, delta.abs(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_nan_on_either_side_drops_the_timestep() {
        let modelled = array![1.0, f64::NAN, 3.0, 10.0];
        let measured = array![0.0, 5.0, f64::NAN, 6.0];
        let metrics = Metrics::compute(&modelled, &measured);

        // Only errors 1 and 4 remain
        assert_relative_eq!(metrics.me, 2.5);
        assert_relative_eq!(metrics.mae, 2.5);
        assert_relative_eq!(metrics.rmse, (17.0_f64 / 2.0).sqrt());
    }

    #[test]
    fn test_no_overlap_is_nan() {
        let metrics = Metrics::compute(&array![f64::NAN, 1.0], &array![2.0, f64::NAN]);
        assert!(metrics.me.is_nan());
        assert!(metrics.mae.is_nan());
        assert!(metrics.rmse.is_nan());
    }

    #[test]
    fn test_map_keys() {
        let map = Metrics::from_errors(&[1.0, -1.0]).as_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["ME", "MAE", "RMSE"]);
        assert_eq!(map["ME"], 0.0);
        assert_eq!(map["RMSE"], 1.0);
    }
}

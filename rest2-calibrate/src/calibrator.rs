//! Per-plant fitting of the cloud parameters and evaluation of the fitted model.

use crate::bfgs::{minimize, BfgsOptions, MinimizeReport};
use crate::metrics::{root_mean_square_error, valid_errors, Metrics};
use crate::{Error, Result};
use indexmap::IndexMap;
use nalgebra::DVector;
use ndarray::Array1;
use rest2_core::{CloudParameters, IrradianceResult, RadiationType, Rest2Model, Timeseries};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Fitted `(mu0, g)`. Read-only once returned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalibratedParameters(CloudParameters);

impl CalibratedParameters {
    pub fn parameters(&self) -> &CloudParameters {
        &self.0
    }

    pub fn mu0(&self) -> f64 {
        self.0.mu0
    }

    pub fn g(&self) -> f64 {
        self.0.g
    }

    pub fn as_map(&self) -> IndexMap<String, f64> {
        self.0.as_map()
    }
}

impl From<CalibratedParameters> for CloudParameters {
    fn from(value: CalibratedParameters) -> Self {
        value.0
    }
}

/// Result of [`Calibrator::train`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationOutcome {
    pub parameters: CalibratedParameters,
    /// RMSE at the fitted parameters (W/m²)
    pub objective: f64,
    pub iterations: usize,
    pub function_evaluations: usize,
    /// Whether the gradient tolerance was reached
    pub converged: bool,
}

/// Fits the cloud parameters of one model against measurements.
///
/// The parameters are unconstrained; only the clipping of the inputs bounds
/// what the model sees.
#[derive(Debug, Clone)]
pub struct Calibrator<'a> {
    model: &'a Rest2Model,
    initial: CloudParameters,
    options: BfgsOptions,
}

impl<'a> Calibrator<'a> {
    /// A calibrator starting from `mu0 = 0`, `g = 0.85`.
    pub fn new(model: &'a Rest2Model) -> Self {
        Self {
            model,
            initial: CloudParameters::default(),
            options: BfgsOptions::default(),
        }
    }

    pub fn with_initial_parameters(mut self, initial: CloudParameters) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_options(mut self, options: BfgsOptions) -> Self {
        self.options = options;
        self
    }

    /// RMSE of `radiation_type` against measurements already on the model axis.
    pub fn objective(
        &self,
        parameters: &CloudParameters,
        measured: &Array1<f64>,
        radiation_type: RadiationType,
    ) -> f64 {
        let result = self.model.convert_radiation(parameters);
        let errors = valid_errors(result.get(radiation_type).values(), measured);
        root_mean_square_error(&errors)
    }

    /// Fit the parameters to `measured`, joined to the model axis by timestamp.
    ///
    /// Fails only if no measured value falls on the model axis. A run that
    /// stops before converging still returns its best parameters.
    pub fn train(
        &self,
        measured: &Timeseries,
        radiation_type: RadiationType,
    ) -> Result<CalibrationOutcome> {
        let measured = measured.align_to(self.model.time_axis()).into_values();
        let available = measured.iter().filter(|v| !v.is_nan()).count();
        if available == 0 {
            return Err(Error::NoOverlap(radiation_type.to_string()));
        }

        info!(
            radiation_type = %radiation_type,
            timesteps = self.model.len(),
            measured = available,
            mu0 = self.initial.mu0,
            g = self.initial.g,
            "Calibrating cloud parameters"
        );

        let objective = |x: &DVector<f64>| {
            let parameters = CloudParameters::new(x[0], x[1]);
            self.objective(&parameters, &measured, radiation_type)
        };
        let x0 = DVector::from_vec(self.initial.to_vec());
        let report = minimize(objective, x0, &self.options);

        let outcome = self.outcome(&report)?;
        if outcome.converged {
            info!(
                mu0 = outcome.parameters.mu0(),
                g = outcome.parameters.g(),
                rmse = outcome.objective,
                iterations = outcome.iterations,
                "Calibration converged"
            );
        } else {
            warn!(
                mu0 = outcome.parameters.mu0(),
                g = outcome.parameters.g(),
                rmse = outcome.objective,
                iterations = outcome.iterations,
                termination = ?report.termination,
                "Calibration stopped before converging; keeping best parameters"
            );
        }
        Ok(outcome)
    }

    fn outcome(&self, report: &MinimizeReport) -> Result<CalibrationOutcome> {
        let parameters = CloudParameters::from_slice(report.x.as_slice()).ok_or_else(|| {
            Error::InvalidParameter(format!("expected 2 parameters, got {}", report.x.len()))
        })?;
        Ok(CalibrationOutcome {
            parameters: CalibratedParameters(parameters),
            objective: report.value,
            iterations: report.iterations,
            function_evaluations: report.function_evaluations,
            converged: report.converged(),
        })
    }
}

/// Scores a composed result against measurements.
pub struct MetricsEvaluator;

impl MetricsEvaluator {
    /// ME, MAE and RMSE of one stream, with `measured` joined by timestamp.
    pub fn evaluate(
        result: &IrradianceResult,
        measured: &Timeseries,
        radiation_type: RadiationType,
    ) -> Metrics {
        let modelled = result.get(radiation_type);
        let measured = measured.align_to(modelled.time_axis());
        Metrics::compute(modelled.values(), measured.values())
    }
}

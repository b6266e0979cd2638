//! Per-plant training, evaluation and inference.
//!
//! The caller supplies each plant's aligned atmospheric state and, for
//! training, its measured irradiance. Plants are independent; running several
//! at once is left to the caller.

use crate::config::{Mode, RunConfig, TimeWindow};
use indexmap::IndexMap;
use rest2_calibrate::{
    CalibratedParameters, CalibrationOutcome, Calibrator, Metrics, MetricsEvaluator,
};
use rest2_core::{
    CloudParameters, IrradianceResult, LocationAtmosphericState, RadiationType, Rest2Error,
    Rest2Model, Timeseries,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Model(#[from] Rest2Error),
    #[error(transparent)]
    Calibration(#[from] rest2_calibrate::Error),
    #[error("No `{0}` time window is configured")]
    MissingWindow(&'static str),
    #[error("The {phase} window {window} holds no timesteps")]
    EmptyWindow {
        phase: &'static str,
        window: TimeWindow,
    },
    #[error("Plant `{0}` has no measured irradiance to train on")]
    MissingMeasurements(String),
    #[error("Plant `{0}` has no fitted parameters for inference")]
    MissingParameters(String),
    #[error("Failed to (de)serialize plant artifact: {0}")]
    Artifact(String),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Irradiance and scores over one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub radiation: IrradianceResult,
    pub metrics: Metrics,
    pub radiation_type: RadiationType,
}

impl Evaluation {
    /// The stream the run was scored on
    pub fn chosen_radiation(&self) -> &Timeseries {
        self.radiation.get(self.radiation_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantResult {
    pub plant_id: String,
    pub parameters: CalibratedParameters,
    pub calibration: CalibrationOutcome,
    /// In-sample evaluation
    pub train: Evaluation,
    pub validation: Option<Evaluation>,
    pub test: Option<Evaluation>,
}

impl PlantResult {
    /// Metrics keyed by phase (`train`, `validation`, `test`).
    pub fn metrics(&self) -> IndexMap<String, Metrics> {
        [
            ("train", Some(&self.train)),
            ("validation", self.validation.as_ref()),
            ("test", self.test.as_ref()),
        ]
        .into_iter()
        .filter_map(|(phase, evaluation)| evaluation.map(|e| (phase.to_string(), e.metrics)))
        .collect()
    }

    pub fn artifact(&self) -> PlantArtifact {
        PlantArtifact {
            radiation_type: self.train.radiation_type,
            parameters: *self.parameters.parameters(),
            metrics: self.metrics(),
        }
    }
}

/// What a training run keeps for later inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantArtifact {
    pub radiation_type: RadiationType,
    pub parameters: CloudParameters,
    pub metrics: IndexMap<String, Metrics>,
}

impl PlantArtifact {
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| WorkflowError::Artifact(e.to_string()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| WorkflowError::Artifact(e.to_string()))
    }
}

fn window_model(
    config: &RunConfig,
    state: &LocationAtmosphericState,
    phase: &'static str,
    window: TimeWindow,
) -> Result<Rest2Model> {
    let state = state.window(window.start, window.end)?;
    if state.is_empty() {
        return Err(WorkflowError::EmptyWindow { phase, window });
    }
    Ok(Rest2Model::with_timezone(&state, config.parsed_timezone()?)?)
}

fn evaluate_window(
    config: &RunConfig,
    state: &LocationAtmosphericState,
    measured: &Timeseries,
    parameters: &CloudParameters,
    phase: &'static str,
    window: TimeWindow,
) -> Result<Evaluation> {
    info!(phase, window = %window, "Evaluating fitted parameters");
    let model = window_model(config, state, phase, window)?;
    let radiation = model.convert_radiation(parameters);
    let radiation_type = config.target_radiation_type;
    let metrics = MetricsEvaluator::evaluate(&radiation, measured, radiation_type);
    Ok(Evaluation {
        radiation,
        metrics,
        radiation_type,
    })
}

/// Calibrate on the training window, then score every configured window.
pub fn train_plant(
    config: &RunConfig,
    plant_id: &str,
    state: &LocationAtmosphericState,
    measured: &Timeseries,
) -> Result<PlantResult> {
    let windows = &config.time_windows;
    let radiation_type = config.target_radiation_type;
    info!(plant_id, window = %windows.training, %radiation_type, "Training plant");

    let model = window_model(config, state, "training", windows.training)?;
    let measured_training = measured.window(windows.training.start, windows.training.end);
    let calibration = Calibrator::new(&model)
        .with_initial_parameters(config.calibration)
        .with_options(config.optimizer)
        .train(&measured_training, radiation_type)?;
    let parameters = calibration.parameters;

    let radiation = model.convert_radiation(parameters.parameters());
    let train = Evaluation {
        metrics: MetricsEvaluator::evaluate(&radiation, &measured_training, radiation_type),
        radiation,
        radiation_type,
    };

    let evaluate = |phase, window: Option<TimeWindow>| {
        window
            .map(|w| evaluate_window(config, state, measured, parameters.parameters(), phase, w))
            .transpose()
    };
    let validation = evaluate("validation", windows.validation)?;
    let test = evaluate("test", windows.test)?;

    info!(
        plant_id,
        mu0 = parameters.mu0(),
        g = parameters.g(),
        train_rmse = train.metrics.rmse,
        "Finished plant"
    );

    Ok(PlantResult {
        plant_id: plant_id.to_string(),
        parameters,
        calibration,
        train,
        validation,
        test,
    })
}

/// Irradiance over the inference window with previously fitted parameters.
pub fn infer_plant(
    config: &RunConfig,
    state: &LocationAtmosphericState,
    parameters: &CloudParameters,
) -> Result<IrradianceResult> {
    let window = config
        .time_windows
        .inference
        .ok_or(WorkflowError::MissingWindow("inference"))?;
    info!(window = %window, mu0 = parameters.mu0, g = parameters.g, "Running inference");

    let model = window_model(config, state, "inference", window)?;
    Ok(model.convert_radiation(parameters))
}

/// Everything known about one plant for a run.
#[derive(Debug, Clone, Copy)]
pub struct PlantData<'a> {
    pub plant_id: &'a str,
    pub state: &'a LocationAtmosphericState,
    /// Required when training
    pub measured: Option<&'a Timeseries>,
    /// Required for inference
    pub parameters: Option<&'a CloudParameters>,
}

#[derive(Debug, Clone)]
pub enum PlantOutput {
    Trained(Box<PlantResult>),
    Inferred(IrradianceResult),
}

/// Train or infer according to the configured mode.
pub fn run_plant(config: &RunConfig, plant: PlantData<'_>) -> Result<PlantOutput> {
    match config.mode {
        Mode::Train => {
            let measured = plant
                .measured
                .ok_or_else(|| WorkflowError::MissingMeasurements(plant.plant_id.to_string()))?;
            let result = train_plant(config, plant.plant_id, plant.state, measured)?;
            Ok(PlantOutput::Trained(Box::new(result)))
        }
        Mode::Inference => {
            let parameters = plant
                .parameters
                .ok_or_else(|| WorkflowError::MissingParameters(plant.plant_id.to_string()))?;
            info!(plant_id = plant.plant_id, "Inferring plant");
            Ok(PlantOutput::Inferred(infer_plant(config, plant.state, parameters)?))
        }
    }
}

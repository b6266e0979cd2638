//! Training a plant on synthetic measurements and reusing the fit for inference.

use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use ndarray::Array1;
use rest2::rest2_core::{
    CloudParameters, LocationAtmosphericState, RadiationType, Rest2Model, TimeAxis, Timeseries,
};
use rest2::{
    infer_plant, run_plant, train_plant, Mode, PlantArtifact, PlantData, PlantOutput, RunConfig,
    WorkflowError,
};
use std::sync::Arc;

const COD_CYCLE: [f64; 6] = [0.5, 1.0, 2.0, 4.0, 8.0, 16.0];

const CONFIG: &str = r#"
mode = "train"
plant_ids = ["plant-a"]
target_radiation_type = "ghi"

[time_windows]
training = "2024-01-15T00:00:00Z/2024-01-16T23:00:00Z"
validation = "2024-01-17T00:00:00Z/2024-01-17T11:00:00Z"
test = "2024-01-17T12:00:00Z/2024-01-17T23:00:00Z"
inference = "2024-01-17T00:00:00Z/2024-01-17T23:00:00Z"
"#;

fn state() -> LocationAtmosphericState {
    let axis = Arc::new(TimeAxis::regular(
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        Duration::hours(1),
        72,
    ));
    let cod = Array1::from_iter((0..axis.len()).map(|i| COD_CYCLE[i % COD_CYCLE.len()]));
    let c = |v: f64| Timeseries::constant(v, Arc::clone(&axis));

    LocationAtmosphericState {
        latitude: -22.5,
        longitude: -45.5,
        cod: Timeseries::new(cod, Arc::clone(&axis)).unwrap(),
        surface_albedo: c(0.2),
        angstrom_exponent: Some(c(1.3)),
        pressure: c(1013.25),
        water_vapour: c(1.0),
        ozone: c(0.3),
        nitrogen_dioxide: c(0.001),
        optical_depth_550nm: c(0.2),
    }
}

fn truth() -> CloudParameters {
    CloudParameters::new(0.3, 0.8)
}

fn measured(state: &LocationAtmosphericState) -> Timeseries {
    Rest2Model::new(state).unwrap().convert_radiation(&truth()).ghi
}

#[test]
fn train_then_infer() {
    let config = RunConfig::from_toml_str(CONFIG).unwrap();
    let state = state();
    let measured = measured(&state);

    let result = train_plant(&config, "plant-a", &state, &measured).unwrap();
    assert_eq!(result.plant_id, "plant-a");
    assert_relative_eq!(result.parameters.mu0(), 0.3, epsilon = 1e-4);
    assert_relative_eq!(result.parameters.g(), 0.8, epsilon = 1e-4);
    assert_eq!(result.train.radiation.len(), 48);
    assert!(result.train.metrics.rmse < 1e-2);

    let scored = result.train.chosen_radiation();
    assert!(Arc::ptr_eq(scored.time_axis(), result.train.radiation.ghi.time_axis()));
    assert_eq!(scored.values(), result.train.radiation.ghi.values());

    let validation = result.validation.as_ref().unwrap();
    let test = result.test.as_ref().unwrap();
    assert_eq!(validation.radiation.len(), 12);
    assert_eq!(test.radiation.len(), 12);
    assert!(validation.metrics.rmse < 1e-2);
    assert!(test.metrics.rmse < 1e-2);

    let metrics = result.metrics();
    assert_eq!(
        metrics.keys().collect::<Vec<_>>(),
        vec!["train", "validation", "test"]
    );

    // Persist, reload and infer on the day after training
    let artifact = PlantArtifact::from_toml_str(&result.artifact().to_toml_string().unwrap())
        .unwrap();
    assert_eq!(artifact, result.artifact());
    assert_eq!(artifact.radiation_type, RadiationType::Ghi);

    let inferred = infer_plant(&config, &state, &artifact.parameters).unwrap();
    assert_eq!(inferred.len(), 24);
    for (time, value) in inferred.ghi.iter() {
        let expected = measured.at(time).unwrap();
        if expected.is_nan() {
            assert!(value.is_nan());
        } else {
            assert_relative_eq!(value, expected, epsilon = 1e-2);
        }
    }
}

#[test]
fn run_plant_dispatches_on_mode() {
    let mut config = RunConfig::from_toml_str(CONFIG).unwrap();
    let state = state();
    let measured = measured(&state);
    let parameters = truth();

    let plant = PlantData {
        plant_id: "plant-a",
        state: &state,
        measured: None,
        parameters: Some(&parameters),
    };
    assert!(matches!(
        run_plant(&config, plant),
        Err(WorkflowError::MissingMeasurements(id)) if id == "plant-a"
    ));

    let output = run_plant(
        &config,
        PlantData {
            measured: Some(&measured),
            ..plant
        },
    )
    .unwrap();
    assert!(matches!(output, PlantOutput::Trained(_)));

    config.mode = Mode::Inference;
    let output = run_plant(&config, plant).unwrap();
    match output {
        PlantOutput::Inferred(result) => assert_eq!(result.len(), 24),
        PlantOutput::Trained(_) => panic!("expected inference output"),
    }

    assert!(matches!(
        run_plant(
            &config,
            PlantData {
                parameters: None,
                ..plant
            }
        ),
        Err(WorkflowError::MissingParameters(_))
    ));
}

#[test]
fn inference_requires_a_window() {
    let mut config = RunConfig::from_toml_str(CONFIG).unwrap();
    config.time_windows.inference = None;

    let err = infer_plant(&config, &state(), &truth()).unwrap_err();
    assert!(matches!(err, WorkflowError::MissingWindow("inference")));
}

#[test]
fn window_outside_the_data_is_empty() {
    let config = RunConfig::from_toml_str(&CONFIG.replace(
        "inference = \"2024-01-17T00:00:00Z/2024-01-17T23:00:00Z\"",
        "inference = \"2025-01-01T00:00:00Z/2025-01-02T00:00:00Z\"",
    ))
    .unwrap();

    let err = infer_plant(&config, &state(), &truth()).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::EmptyWindow {
            phase: "inference",
            ..
        }
    ));
}

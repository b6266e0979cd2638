//! REST2 two-band irradiance model with per-plant cloud calibration.
//!
//! Physics live in [`rest2_core`] and fitting in [`rest2_calibrate`]; this
//! crate adds the run configuration and the per-plant workflow.

pub mod config;
pub mod workflow;

pub use config::{ConfigError, Mode, RunConfig, TimeWindow, TimeWindows};
pub use rest2_calibrate;
pub use rest2_core;
pub use workflow::{
    infer_plant, run_plant, train_plant, Evaluation, PlantArtifact, PlantData, PlantOutput,
    PlantResult, WorkflowError,
};

use crate::composer::{BroadbandIrradiance, ComposedIrradiance, IrradianceComposer};
use crate::constants::DEFAULT_TIMEZONE;
use crate::errors::Rest2Result;
use crate::parameters::CloudParameters;
use crate::result::IrradianceResult;
use crate::solar::SolarGeometry;
use crate::state::{AtmosphericInputs, LocationAtmosphericState};
use crate::timeseries::{TimeAxis, Timeseries};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::debug;

/// REST2 model for one location and period.
///
/// Construction validates and clips the inputs and computes the solar geometry.
/// Each call to [`Rest2Model::convert_radiation`] then only depends on the
/// cloud parameters, which is what calibration varies.
#[derive(Debug, Clone)]
pub struct Rest2Model {
    latitude: f64,
    longitude: f64,
    timezone: Tz,
    time_axis: Arc<TimeAxis>,
    inputs: AtmosphericInputs,
    geometry: SolarGeometry,
}

impl Rest2Model {
    /// Build a model reading local clock time in `America/Sao_Paulo`.
    pub fn new(state: &LocationAtmosphericState) -> Rest2Result<Self> {
        Self::with_timezone(state, DEFAULT_TIMEZONE)
    }

    pub fn with_timezone(state: &LocationAtmosphericState, timezone: Tz) -> Rest2Result<Self> {
        let inputs = AtmosphericInputs::prepare(state)?;
        let time_axis = Arc::clone(state.time_axis());
        let geometry =
            SolarGeometry::compute(time_axis.times(), state.latitude, state.longitude, timezone);

        debug!(
            latitude = state.latitude,
            longitude = state.longitude,
            timezone = %timezone,
            timesteps = time_axis.len(),
            "Built REST2 model"
        );

        Ok(Self {
            latitude: state.latitude,
            longitude: state.longitude,
            timezone,
            time_axis,
            inputs,
            geometry,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn time_axis(&self) -> &Arc<TimeAxis> {
        &self.time_axis
    }

    pub fn inputs(&self) -> &AtmosphericInputs {
        &self.inputs
    }

    pub fn geometry(&self) -> &SolarGeometry {
        &self.geometry
    }

    pub fn len(&self) -> usize {
        self.time_axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_axis.is_empty()
    }

    /// Composed irradiance before quality control.
    pub fn compose(&self, parameters: &CloudParameters) -> ComposedIrradiance {
        IrradianceComposer::new(&self.geometry, &self.inputs).compose(parameters)
    }

    /// Cloud-sky and clear-sky irradiance on the input time axis.
    pub fn convert_radiation(&self, parameters: &CloudParameters) -> IrradianceResult {
        let composed = IrradianceComposer::new(&self.geometry, &self.inputs)
            .compose_checked(parameters);
        let ComposedIrradiance {
            clear_sky,
            cloud_sky,
        } = composed;

        let ts = |values| Timeseries::from_aligned(values, Arc::clone(&self.time_axis));
        let BroadbandIrradiance {
            ghi,
            ghi_tracker,
            dni,
            dhi,
            ..
        } = cloud_sky;

        IrradianceResult {
            ghi: ts(ghi),
            ghi_tracker: ts(ghi_tracker),
            dni: ts(dni),
            dhi: ts(dhi),
            ghi_cs: ts(clear_sky.ghi),
            ghi_tracker_cs: ts(clear_sky.ghi_tracker),
            dni_cs: ts(clear_sky.dni),
            dhi_cs: ts(clear_sky.dhi),
        }
    }
}

//! Aligned atmospheric inputs for a single location.

use crate::constants::{
    Bounds, ANGSTROM_EXPONENT_BOUNDS, COD_BOUNDS, NITROGEN_DIOXIDE_BOUNDS, OZONE_BOUNDS,
    SURFACE_ALBEDO_BOUNDS, SURFACE_PRESSURE_BOUNDS, WATER_VAPOUR_BOUNDS,
};
use crate::errors::{Rest2Error, Rest2Result};
use crate::timeseries::{FloatValue, Time, TimeAxis, Timeseries};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Atmospheric state at one location, every variable on the COD time axis.
///
/// Units follow the ingestion contract: pressure in hPa; water vapour, ozone and
/// NO2 in atm-cm; COD, albedo, Angstrom exponent and optical depth dimensionless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationAtmosphericState {
    /// Degrees north
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
    pub cod: Timeseries,
    pub surface_albedo: Timeseries,
    /// Required. Kept optional so that an absent forecast variable is reported
    /// as a contract violation instead of being defaulted.
    pub angstrom_exponent: Option<Timeseries>,
    pub pressure: Timeseries,
    pub water_vapour: Timeseries,
    pub ozone: Timeseries,
    pub nitrogen_dioxide: Timeseries,
    pub optical_depth_550nm: Timeseries,
}

impl LocationAtmosphericState {
    /// The reference axis that every other variable must share
    pub fn time_axis(&self) -> &Arc<TimeAxis> {
        self.cod.time_axis()
    }

    pub fn len(&self) -> usize {
        self.cod.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cod.is_empty()
    }

    /// The Angstrom exponent, or the missing-variable error.
    pub fn angstrom_exponent(&self) -> Rest2Result<&Timeseries> {
        self.angstrom_exponent
            .as_ref()
            .ok_or_else(|| Rest2Error::MissingVariable("angstrom_exponent".to_string()))
    }

    fn named_variables(&self) -> Rest2Result<[(&'static str, &Timeseries); 8]> {
        Ok([
            ("cod", &self.cod),
            ("surface_albedo", &self.surface_albedo),
            ("angstrom_exponent", self.angstrom_exponent()?),
            ("pressure", &self.pressure),
            ("water_vapour", &self.water_vapour),
            ("ozone", &self.ozone),
            ("nitrogen_dioxide", &self.nitrogen_dioxide),
            ("optical_depth_550nm", &self.optical_depth_550nm),
        ])
    }

    /// Check that the Angstrom exponent is present and every variable covers
    /// and shares the COD time axis.
    pub fn validate(&self) -> Rest2Result<()> {
        let reference = &self.cod;
        for (name, variable) in self.named_variables()? {
            if variable.len() != variable.time_axis().len() {
                return Err(Rest2Error::LengthMismatch {
                    name: name.to_string(),
                    expected: variable.time_axis().len(),
                    actual: variable.len(),
                });
            }
            if variable.len() != reference.len() {
                return Err(Rest2Error::LengthMismatch {
                    name: name.to_string(),
                    expected: reference.len(),
                    actual: variable.len(),
                });
            }
            if !variable.is_aligned_with(reference) {
                return Err(Rest2Error::MisalignedTimeAxis(name.to_string()));
            }
        }
        Ok(())
    }

    /// Restrict every variable to `start..=end`.
    ///
    /// The resulting variables share a single new axis.
    pub fn window(&self, start: Time, end: Time) -> Rest2Result<Self> {
        if start > end {
            return Err(Rest2Error::InvalidTimeWindow(format!("{start}/{end}")));
        }
        self.validate()?;

        let range = self.time_axis().window_range(start, end);
        let axis = Arc::new(self.time_axis().window(start, end));
        let slice = |ts: &Timeseries| ts.slice_onto(range.clone(), Arc::clone(&axis));

        Ok(Self {
            latitude: self.latitude,
            longitude: self.longitude,
            cod: slice(&self.cod),
            surface_albedo: slice(&self.surface_albedo),
            angstrom_exponent: self.angstrom_exponent.as_ref().map(slice),
            pressure: slice(&self.pressure),
            water_vapour: slice(&self.water_vapour),
            ozone: slice(&self.ozone),
            nitrogen_dioxide: slice(&self.nitrogen_dioxide),
            optical_depth_550nm: slice(&self.optical_depth_550nm),
        })
    }
}

/// Model-ready arrays derived from a validated [`LocationAtmosphericState`].
///
/// Every variable except the 550 nm optical depth is clipped to its physical
/// bounds and missing COD is treated as cloud-free.
#[derive(Debug, Clone)]
pub struct AtmosphericInputs {
    pub cod: Array1<FloatValue>,
    pub surface_albedo: Array1<FloatValue>,
    pub angstrom_exponent: Array1<FloatValue>,
    pub pressure: Array1<FloatValue>,
    pub water_vapour: Array1<FloatValue>,
    pub ozone: Array1<FloatValue>,
    pub nitrogen_dioxide: Array1<FloatValue>,
    pub optical_depth_550nm: Array1<FloatValue>,
}

fn clipped(ts: &Timeseries, bounds: Bounds) -> Array1<FloatValue> {
    ts.values().mapv(|v| bounds.clip(v))
}

impl AtmosphericInputs {
    pub fn prepare(state: &LocationAtmosphericState) -> Rest2Result<Self> {
        state.validate()?;

        let cod = clipped(&state.cod, COD_BOUNDS).mapv(|v| if v.is_nan() { 0.0 } else { v });

        Ok(Self {
            cod,
            surface_albedo: clipped(&state.surface_albedo, SURFACE_ALBEDO_BOUNDS),
            angstrom_exponent: clipped(state.angstrom_exponent()?, ANGSTROM_EXPONENT_BOUNDS),
            pressure: clipped(&state.pressure, SURFACE_PRESSURE_BOUNDS),
            water_vapour: clipped(&state.water_vapour, WATER_VAPOUR_BOUNDS),
            ozone: clipped(&state.ozone, OZONE_BOUNDS),
            nitrogen_dioxide: clipped(&state.nitrogen_dioxide, NITROGEN_DIOXIDE_BOUNDS),
            optical_depth_550nm: state.optical_depth_550nm.values().clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.cod.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cod.is_empty()
    }
}

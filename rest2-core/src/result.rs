//! Composed irradiance streams and their selection by radiation type.

use crate::errors::{Rest2Error, Rest2Result};
use crate::timeseries::Timeseries;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight irradiance streams of an [`IrradianceResult`].
///
/// The `*ClearSky` variants ignore the cloud correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RadiationType {
    #[default]
    Ghi,
    Dni,
    Dhi,
    GhiTracker,
    GhiClearSky,
    DniClearSky,
    DhiClearSky,
    GhiTrackerClearSky,
}

impl RadiationType {
    pub const ALL: [RadiationType; 8] = [
        RadiationType::Ghi,
        RadiationType::Dni,
        RadiationType::Dhi,
        RadiationType::GhiTracker,
        RadiationType::GhiClearSky,
        RadiationType::DniClearSky,
        RadiationType::DhiClearSky,
        RadiationType::GhiTrackerClearSky,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RadiationType::Ghi => "ghi",
            RadiationType::Dni => "dni",
            RadiationType::Dhi => "dhi",
            RadiationType::GhiTracker => "ghi_tracker",
            RadiationType::GhiClearSky => "ghi_cs",
            RadiationType::DniClearSky => "dni_cs",
            RadiationType::DhiClearSky => "dhi_cs",
            RadiationType::GhiTrackerClearSky => "ghi_tracker_cs",
        }
    }

    pub fn is_clear_sky(&self) -> bool {
        matches!(
            self,
            RadiationType::GhiClearSky
                | RadiationType::DniClearSky
                | RadiationType::DhiClearSky
                | RadiationType::GhiTrackerClearSky
        )
    }
}

impl fmt::Display for RadiationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RadiationType {
    type Err = Rest2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RadiationType::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| Rest2Error::UnknownRadiationType(s.to_string()))
    }
}

impl TryFrom<String> for RadiationType {
    type Error = Rest2Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RadiationType> for String {
    fn from(value: RadiationType) -> Self {
        value.key().to_string()
    }
}

/// Cloud-sky and clear-sky irradiance (W/m²) on the model's time axis.
///
/// Night timesteps hold 0 and negative values are replaced by NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrradianceResult {
    pub ghi: Timeseries,
    pub ghi_tracker: Timeseries,
    pub dni: Timeseries,
    pub dhi: Timeseries,
    pub ghi_cs: Timeseries,
    pub ghi_tracker_cs: Timeseries,
    pub dni_cs: Timeseries,
    pub dhi_cs: Timeseries,
}

impl IrradianceResult {
    pub fn get(&self, radiation_type: RadiationType) -> &Timeseries {
        match radiation_type {
            RadiationType::Ghi => &self.ghi,
            RadiationType::Dni => &self.dni,
            RadiationType::Dhi => &self.dhi,
            RadiationType::GhiTracker => &self.ghi_tracker,
            RadiationType::GhiClearSky => &self.ghi_cs,
            RadiationType::DniClearSky => &self.dni_cs,
            RadiationType::DhiClearSky => &self.dhi_cs,
            RadiationType::GhiTrackerClearSky => &self.ghi_tracker_cs,
        }
    }

    /// Select a stream by its string key, e.g. `"ghi_cs"`.
    pub fn get_by_key(&self, key: &str) -> Rest2Result<&Timeseries> {
        Ok(self.get(key.parse()?))
    }

    pub fn len(&self) -> usize {
        self.ghi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ghi.is_empty()
    }
}

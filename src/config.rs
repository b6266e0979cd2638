//! Run configuration loaded from TOML.
//!
//! ```toml
//! mode = "train"
//! plant_ids = ["UFV-001"]
//! target_radiation_type = "ghi"
//!
//! [time_windows]
//! training = "2024-01-01T00:00:00Z/2024-01-31T23:50:00Z"
//! validation = "2024-02-01T00:00:00Z/2024-02-14T23:50:00Z"
//!
//! [optimizer]
//! gradient_tolerance = 1e-6
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rest2_calibrate::BfgsOptions;
use rest2_core::solar::parse_timezone;
use rest2_core::{CloudParameters, RadiationType, Rest2Error, Time};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] Rest2Error),
}

/// What a run does for each plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Calibrate and evaluate
    Train,
    /// Apply previously fitted parameters
    Inference,
}

/// Inclusive period written `<start>/<end>`.
///
/// Each end is RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS`, read as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeWindow {
    pub start: Time,
    pub end: Time,
}

fn parse_time(value: &str) -> Option<Time> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").map(|t| t.and_utc()))
        .ok()
}

impl FromStr for TimeWindow {
    type Err = Rest2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Rest2Error::InvalidTimeWindow(s.to_string());
        let (start, end) = s.split_once('/').ok_or_else(invalid)?;
        let start = parse_time(start.trim()).ok_or_else(invalid)?;
        let end = parse_time(end.trim()).ok_or_else(invalid)?;
        if start > end {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = Rest2Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(value: TimeWindow) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindows {
    pub training: TimeWindow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference: Option<TimeWindow>,
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub mode: Mode,
    #[serde(default)]
    pub plant_ids: Vec<String>,
    #[serde(default)]
    pub target_radiation_type: RadiationType,
    /// IANA name of the zone whose clock drives the solar time
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub time_windows: TimeWindows,
    /// Starting point of the calibration
    #[serde(default)]
    pub calibration: CloudParameters,
    #[serde(default)]
    pub optimizer: BfgsOptions,
}

impl RunConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.parsed_timezone()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn parsed_timezone(&self) -> Result<Tz, Rest2Error> {
        parse_timezone(&self.timezone)
    }
}

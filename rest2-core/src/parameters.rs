//! The two free cloud parameters fitted per plant.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Cloud-transmittance parameters.
///
/// `mu0` shifts the effective path length of the direct beam through the cloud
/// and `g` is the asymmetry-type parameter of the diffuse term. Neither is
/// bounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudParameters {
    pub mu0: f64,
    pub g: f64,
}

impl Default for CloudParameters {
    /// Starting point of every calibration: `mu0 = 0`, `g = 0.85`.
    fn default() -> Self {
        Self { mu0: 0.0, g: 0.85 }
    }
}

impl CloudParameters {
    /// Parameter names in vector order
    pub const NAMES: [&'static str; 2] = ["mu0", "g"];

    pub fn new(mu0: f64, g: f64) -> Self {
        Self { mu0, g }
    }

    /// Read from an optimizer vector ordered as [`Self::NAMES`].
    ///
    /// Returns `None` unless exactly two values are given.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [mu0, g] => Some(Self::new(*mu0, *g)),
            _ => None,
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.mu0, self.g]
    }

    pub fn as_map(&self) -> IndexMap<String, f64> {
        Self::NAMES
            .iter()
            .map(|name| name.to_string())
            .zip(self.to_vec())
            .collect()
    }
}

//! Grey-body cloud transmittance shared by both bands.
//!
//! At zero optical depth the diffuse factor is `1 - 1 = 0`, so cloud-sky
//! diffuse irradiance vanishes while the clear-sky diffuse does not. The
//! formula is kept as is; callers comparing the two streams should expect
//! this step.

use crate::parameters::CloudParameters;
use crate::timeseries::FloatValue;
use ndarray::Array1;

/// Direct and diffuse cloud transmittance per timestep.
///
/// Neither factor is clipped; the diffuse one goes negative for some
/// parameter combinations.
#[derive(Debug, Clone)]
pub struct CloudTransmittance {
    pub direct: Array1<FloatValue>,
    pub diffuse: Array1<FloatValue>,
}

/// `exp(-cod / (0.5 + mu0))`
pub fn direct_transmittance(cod: f64, parameters: &CloudParameters) -> f64 {
    (-cod / (0.5 + parameters.mu0)).exp()
}

/// `1 / (1 + (1 - g) cod) - exp(-cod / (0.5 + mu0))`
pub fn diffuse_transmittance(cod: f64, parameters: &CloudParameters) -> f64 {
    1.0 / (1.0 + (1.0 - parameters.g) * cod) - direct_transmittance(cod, parameters)
}

impl CloudTransmittance {
    pub fn evaluate(cod: &Array1<FloatValue>, parameters: &CloudParameters) -> Self {
        Self {
            direct: cod.mapv(|c| direct_transmittance(c, parameters)),
            diffuse: cod.mapv(|c| diffuse_transmittance(c, parameters)),
        }
    }
}

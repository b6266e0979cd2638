//! Per-band transmittances of the two-band model.
//!
//! Band 1 covers 0.29-0.70 µm (UV and visible) and Band 2 covers 0.70-4.0 µm
//! (near infrared). Both follow the same structure: the band's direct beam is
//! attenuated by Rayleigh scattering, uniformly mixed gases, ozone, NO2, water
//! vapour and aerosols, while the diffuse terms use forward-scatter fractions,
//! an aerosol scattering correction and the sky albedo.
//!
//! The coefficients are the published REST2 fits (Gueymard, 2008) and are kept
//! as constant tables next to each band's implementation.

mod band1;
mod band2;

pub use band1::Band1;
pub use band2::Band2;

use crate::air_mass::AirMassSet;
use crate::numeric::magnitude_powf;
use crate::timeseries::FloatValue;
use ndarray::Array1;

/// Inputs shared by both bands.
#[derive(Debug, Clone, Copy)]
pub struct BandInputs<'a> {
    /// Zenith angle (radians)
    pub zenith_angle: &'a Array1<FloatValue>,
    pub air_masses: &'a AirMassSet,
    pub angstrom_exponent: &'a Array1<FloatValue>,
    /// atm-cm
    pub water_vapour: &'a Array1<FloatValue>,
    /// atm-cm
    pub ozone: &'a Array1<FloatValue>,
    /// atm-cm
    pub nitrogen_dioxide: &'a Array1<FloatValue>,
}

/// Transmittances and scattering terms of one spectral band.
///
/// `*_reference` fields are evaluated at the fixed air mass 1.66 used for the
/// diffuse path.
#[derive(Debug, Clone)]
pub struct BandTransmittance {
    pub rayleigh: Array1<FloatValue>,
    pub mixed_gas: Array1<FloatValue>,
    pub ozone: Array1<FloatValue>,
    pub nitrogen_dioxide: Array1<FloatValue>,
    pub nitrogen_dioxide_reference: Array1<FloatValue>,
    pub water_vapour: Array1<FloatValue>,
    pub water_vapour_reference: Array1<FloatValue>,
    pub aerosol: Array1<FloatValue>,
    pub aerosol_scattering: Array1<FloatValue>,
    /// Rayleigh forward-scatter fraction
    pub rayleigh_forward_scatter: Array1<FloatValue>,
    /// Aerosol forward-scatter factor
    pub aerosol_forward_scatter: Array1<FloatValue>,
    /// Aerosol scattering correction factor
    pub aerosol_scattering_correction: Array1<FloatValue>,
    pub sky_albedo: Array1<FloatValue>,
}

impl BandTransmittance {
    /// Product of every direct-beam transmittance.
    pub fn direct_beam_product(&self) -> Array1<FloatValue> {
        &self.rayleigh
            * &self.mixed_gas
            * &self.ozone
            * &self.nitrogen_dioxide
            * &self.water_vapour
            * &self.aerosol
    }
}

/// A spectral band of the two-band model.
pub trait SpectralBand {
    /// Short label used in logs
    const NAME: &'static str;
    /// Share of the extraterrestrial irradiance falling in this band
    const EXTRATERRESTRIAL_FRACTION: f64;
    /// Aerosol single-scattering albedo
    const SINGLE_SCATTERING_ALBEDO: f64;

    fn transmittance(&self, inputs: &BandInputs) -> BandTransmittance;
}

/// Cap a transmittance at 1. NaN is left untouched.
pub(crate) fn cap_at_unity(value: f64) -> f64 {
    if value > 1.0 {
        1.0
    } else {
        value
    }
}

/// Aerosol forward-scatter factor, identical in both bands.
pub fn aerosol_forward_scatter(zenith_angle: f64) -> f64 {
    1.0 - (-0.6931 - 1.8326 * zenith_angle.cos()).exp()
}

/// Band aerosol optical depth `|beta * lambda^-alpha|`.
///
/// `lambda` is the fitted effective wavelength, which can leave the positive
/// half-line for extreme turbidity; the power is taken on the complex branch.
pub fn aerosol_optical_depth(turbidity: f64, wavelength: f64, angstrom_exponent: f64) -> f64 {
    turbidity.abs() * magnitude_powf(wavelength, -angstrom_exponent)
}

/// `ln(1 + m_a * beta)`, the argument of the effective-wavelength fits.
pub(crate) fn turbidity_path(aerosol_air_mass: f64, turbidity: f64) -> f64 {
    (1.0 + aerosol_air_mass * turbidity).ln()
}

/// Aerosol and aerosol-scattering transmittances for a band optical depth.
pub(crate) fn aerosol_transmittances(
    aerosol_air_mass: &Array1<FloatValue>,
    optical_depth: &Array1<FloatValue>,
    single_scattering_albedo: f64,
) -> (Array1<FloatValue>, Array1<FloatValue>) {
    let extinction = aerosol_air_mass * optical_depth;
    let aerosol = extinction.mapv(|x| (-x).exp());
    let aerosol_scattering = extinction.mapv(|x| (-single_scattering_albedo * x).exp());
    (aerosol, aerosol_scattering)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use ndarray::array;

    pub struct Fixture {
        pub zenith_angle: Array1<f64>,
        pub air_masses: AirMassSet,
        pub angstrom_exponent: Array1<f64>,
        pub water_vapour: Array1<f64>,
        pub ozone: Array1<f64>,
        pub nitrogen_dioxide: Array1<f64>,
    }

    impl Fixture {
        /// Mid-range atmosphere at zenith angles of 0°, 30°, 60° and 80°.
        pub fn mid_range() -> Self {
            let zenith_angle = array![0.0_f64, 30.0, 60.0, 80.0].mapv(f64::to_radians);
            let n = zenith_angle.len();
            let angstrom_exponent = Array1::from_elem(n, 1.3);
            let air_masses = AirMassSet::evaluate(
                &zenith_angle,
                &angstrom_exponent,
                &Array1::from_elem(n, 1013.25),
                &Array1::from_elem(n, 0.2),
            );
            Self {
                zenith_angle,
                air_masses,
                angstrom_exponent,
                water_vapour: Array1::from_elem(n, 1.0),
                ozone: Array1::from_elem(n, 0.3),
                nitrogen_dioxide: Array1::from_elem(n, 0.001),
            }
        }

        pub fn inputs(&self) -> BandInputs<'_> {
            BandInputs {
                zenith_angle: &self.zenith_angle,
                air_masses: &self.air_masses,
                angstrom_exponent: &self.angstrom_exponent,
                water_vapour: &self.water_vapour,
                ozone: &self.ozone,
                nitrogen_dioxide: &self.nitrogen_dioxide,
            }
        }
    }

    pub fn assert_physical(t: &BandTransmittance) {
        for (name, values) in [
            ("rayleigh", &t.rayleigh),
            ("mixed_gas", &t.mixed_gas),
            ("ozone", &t.ozone),
            ("nitrogen_dioxide", &t.nitrogen_dioxide),
            ("water_vapour", &t.water_vapour),
            ("aerosol", &t.aerosol),
            ("aerosol_scattering", &t.aerosol_scattering),
        ] {
            for v in values.iter() {
                assert!(*v > 0.0 && *v <= 1.0, "{name} out of (0, 1]: {v}");
            }
        }
    }
}

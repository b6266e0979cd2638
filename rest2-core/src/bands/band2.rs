//! Band 2: 0.70-4.0 µm. No ozone or NO2 absorption.

use super::{
    aerosol_forward_scatter, aerosol_optical_depth, aerosol_transmittances, turbidity_path,
    BandInputs, BandTransmittance, SpectralBand,
};
use crate::constants::REFERENCE_AIR_MASS;
use crate::numeric::{magnitude_powf, Rational};
use ndarray::{Array1, Zip};

const RAYLEIGH: Rational<2, 3> = Rational::new([1.0, -0.010394], [1.0, 0.0, -0.00011042]);
const MIXED_GAS: Rational<3, 2> = Rational::new([1.0, 0.27284, -0.00063699], [1.0, 0.30306]);

// Water vapour, in the precipitable water column
const WATER_C1: Rational<4, 3> =
    Rational::new([0.0, 19.566, -1.6506, 1.0672], [1.0, 5.4248, 1.6005]);
const WATER_C2: Rational<4, 3> =
    Rational::new([0.0, 0.50158, -0.14732, 0.047584], [1.0, 1.1811, 1.0699]);
const WATER_C3: Rational<4, 3> =
    Rational::new([0.0, 21.286, -0.39232, 1.2692], [1.0, 4.8318, 1.412]);
const WATER_C4: Rational<4, 3> =
    Rational::new([0.0, 0.70992, -0.23155, 0.096514], [1.0, 0.44907, 0.75425]);

// Effective wavelength coefficients, in the Angstrom exponent
const WAVELENGTH_E0: Rational<3, 2> = Rational::new([1.183, -0.022989, 0.020829], [1.0, 0.11133]);
const WAVELENGTH_E1: Rational<3, 2> =
    Rational::new([-0.50003, -0.18329, 0.23835], [1.0, 1.6756]);
const WAVELENGTH_E2: Rational<3, 2> =
    Rational::new([-0.50001, 1.1414, 0.0083589], [1.0, 11.168]);
const WAVELENGTH_E3: Rational<3, 2> =
    Rational::new([-0.70003, -0.73587, 0.51509], [1.0, 4.7665]);

const RAYLEIGH_FORWARD_SCATTER: f64 = 0.5;

/// Near-infrared band.
#[derive(Debug, Clone, Copy, Default)]
pub struct Band2;

/// Water vapour transmittance for column `water` at air mass `m`.
pub fn water_vapour_transmittance(water: f64, m: f64) -> f64 {
    let c1 = WATER_C1.eval(water);
    let c2 = WATER_C2.eval(water);
    let c3 = WATER_C3.eval(water);
    let c4 = WATER_C4.eval(water);
    (1.0 + c1 * m + c2 * m.powi(2)) / (1.0 + c3 * m + c4 * m.powi(2))
}

/// Effective aerosol wavelength (µm).
pub fn effective_wavelength(angstrom_exponent: f64, aerosol_air_mass: f64, turbidity: f64) -> f64 {
    let ua = turbidity_path(aerosol_air_mass, turbidity);
    let e0 = WAVELENGTH_E0.eval(angstrom_exponent);
    let e1 = WAVELENGTH_E1.eval(angstrom_exponent);
    let e2 = WAVELENGTH_E2.eval(angstrom_exponent);
    let e3 = WAVELENGTH_E3.eval(angstrom_exponent);
    (e0 + e1 * ua + e2 * ua.powi(2)) / (1.0 + e3 * ua)
}

fn scattering_correction(aerosol_air_mass: f64, optical_depth: f64) -> f64 {
    let m = aerosol_air_mass;
    let m_15 = magnitude_powf(m, 1.5);
    let h0 = (3.4352 + 0.65267 * m + 0.00034328 * m.powi(2)) / (1.0 + 0.034388 * m_15);
    let h1 = (1.231 - 1.63853 * m + 0.20667 * m.powi(2)) / (1.0 + 0.1451 * m_15);
    let h2 = (0.8889 - 0.55063 * m + 0.50152 * m.powi(2)) / (1.0 + 0.14865 * m_15);
    (h0 + h1 * optical_depth) / (1.0 + h2 * optical_depth)
}

fn sky_albedo(angstrom_exponent: f64, turbidity: f64) -> f64 {
    let alpha = angstrom_exponent;
    let numerator = 0.010191
        + 0.00085547 * alpha
        + turbidity * (0.14618 + 0.062758 * alpha) / (1.0 - 0.19402 * alpha);
    let denominator = 1.0 + turbidity * (0.58101 + 0.17426 * alpha) / (1.0 - 0.17586 * alpha);
    numerator / denominator
}

impl SpectralBand for Band2 {
    const NAME: &'static str = "band2";
    const EXTRATERRESTRIAL_FRACTION: f64 = 0.51951;
    const SINGLE_SCATTERING_ALBEDO: f64 = 0.84;

    fn transmittance(&self, inputs: &BandInputs) -> BandTransmittance {
        let am = inputs.air_masses;
        let beta = &am.angstrom_turbidity;
        let alpha = inputs.angstrom_exponent;
        let n = inputs.zenith_angle.len();
        let ones = Array1::ones(n);

        let rayleigh = am.rayleigh_pressure_scaled.mapv(|m| RAYLEIGH.eval(m));
        let mixed_gas = am.rayleigh_pressure_scaled.mapv(|m| MIXED_GAS.eval(m));

        let water_vapour = Zip::from(inputs.water_vapour)
            .and(&am.water_vapour)
            .map_collect(|&w, &m| water_vapour_transmittance(w, m));
        let water_vapour_reference = inputs
            .water_vapour
            .mapv(|w| water_vapour_transmittance(w, REFERENCE_AIR_MASS));

        let optical_depth = Zip::from(alpha)
            .and(&am.aerosol)
            .and(beta)
            .map_collect(|&a, &m, &b| aerosol_optical_depth(b, effective_wavelength(a, m, b), a));
        let (aerosol, aerosol_scattering) =
            aerosol_transmittances(&am.aerosol, &optical_depth, Self::SINGLE_SCATTERING_ALBEDO);

        let aerosol_scattering_correction = Zip::from(&am.aerosol)
            .and(&optical_depth)
            .map_collect(|&m, &tau| scattering_correction(m, tau));

        BandTransmittance {
            rayleigh,
            mixed_gas,
            ozone: ones.clone(),
            nitrogen_dioxide: ones.clone(),
            nitrogen_dioxide_reference: ones,
            water_vapour,
            water_vapour_reference,
            aerosol,
            aerosol_scattering,
            rayleigh_forward_scatter: Array1::from_elem(n, RAYLEIGH_FORWARD_SCATTER),
            aerosol_forward_scatter: inputs.zenith_angle.mapv(aerosol_forward_scatter),
            aerosol_scattering_correction,
            sky_albedo: Zip::from(alpha)
                .and(beta)
                .map_collect(|&a, &b| sky_albedo(a, b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::test_support::{assert_physical, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn transmittances_are_physical() {
        let fixture = Fixture::mid_range();
        let t = Band2.transmittance(&fixture.inputs());
        assert_physical(&t);
    }

    #[test]
    fn ozone_and_nitrogen_dioxide_are_transparent() {
        let fixture = Fixture::mid_range();
        let t = Band2.transmittance(&fixture.inputs());

        for v in t
            .ozone
            .iter()
            .chain(t.nitrogen_dioxide.iter())
            .chain(t.nitrogen_dioxide_reference.iter())
        {
            assert_eq!(*v, 1.0);
        }
        for v in t.rayleigh_forward_scatter.iter() {
            assert_eq!(*v, 0.5);
        }
    }

    #[test]
    fn water_vapour_at_unit_column_and_air_mass() {
        // c1..c4 at w = 1
        let c1 = (19.566 - 1.6506 + 1.0672) / (1.0 + 5.4248 + 1.6005);
        let c2 = (0.50158 - 0.14732 + 0.047584) / (1.0 + 1.1811 + 1.0699);
        let c3 = (21.286 - 0.39232 + 1.2692) / (1.0 + 4.8318 + 1.412);
        let c4 = (0.70992 - 0.23155 + 0.096514) / (1.0 + 0.44907 + 0.75425);
        let expected = (1.0 + c1 + c2) / (1.0 + c3 + c4);

        assert_relative_eq!(water_vapour_transmittance(1.0, 1.0), expected, epsilon = 1e-12);
        assert!(expected < 1.0);
    }

    #[test]
    fn dry_atmosphere_has_no_water_absorption() {
        assert_relative_eq!(water_vapour_transmittance(0.0, 4.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn near_infrared_is_less_attenuated_by_rayleigh() {
        let fixture = Fixture::mid_range();
        let t1 = crate::bands::Band1.transmittance(&fixture.inputs());
        let t2 = Band2.transmittance(&fixture.inputs());
        for (r1, r2) in t1.rayleigh.iter().zip(t2.rayleigh.iter()) {
            assert!(r2 > r1);
        }
    }

    #[test]
    fn wavelength_uses_linear_denominator() {
        let (alpha, m, beta) = (1.3, 2.0, 0.1);
        let ua = (1.0_f64 + m * beta).ln();
        let e0 = WAVELENGTH_E0.eval(alpha);
        let e1 = WAVELENGTH_E1.eval(alpha);
        let e2 = WAVELENGTH_E2.eval(alpha);
        let e3 = WAVELENGTH_E3.eval(alpha);
        assert_relative_eq!(
            effective_wavelength(alpha, m, beta),
            (e0 + e1 * ua + e2 * ua * ua) / (1.0 + e3 * ua),
            epsilon = 1e-12
        );
    }
}

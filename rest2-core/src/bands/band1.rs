//! Band 1: 0.29-0.70 µm.

use super::{
    aerosol_forward_scatter, aerosol_optical_depth, aerosol_transmittances, cap_at_unity,
    turbidity_path, BandInputs, BandTransmittance, SpectralBand,
};
use crate::constants::REFERENCE_AIR_MASS;
use crate::numeric::{polynomial, Rational};
use ndarray::Zip;

// Rayleigh and uniformly mixed gases, in the pressure-corrected Rayleigh air mass
const RAYLEIGH: Rational<3, 3> = Rational::new([1.0, 1.8169, -0.033454], [1.0, 2.063, 0.31978]);
const MIXED_GAS: Rational<3, 3> =
    Rational::new([1.0, 0.95885, 0.012871], [1.0, 0.96321, 0.015455]);

// Ozone, in the ozone column
const OZONE_F1: Rational<3, 3> = Rational::new([0.0, 10.979, -8.5421], [1.0, 2.0115, 40.189]);
const OZONE_F2: Rational<3, 3> =
    Rational::new([0.0, -0.027589, -0.005138], [1.0, -2.4857, 13.942]);
const OZONE_F3: Rational<3, 3> = Rational::new([0.0, 10.995, -5.5001], [1.0, 1.6784, 42.406]);

// NO2, in the NO2 column
const NO2_G1: Rational<3, 3> = Rational::new([0.17499, 41.654, -2146.4], [1.0, 0.0, 22295.0]);
const NO2_G2: Rational<3, 3> = Rational::new([0.0, -1.2134, 59.324], [1.0, 0.0, 8847.8]);
const NO2_G3: Rational<3, 3> = Rational::new([0.17499, 61.658, 9196.4], [1.0, 0.0, 74109.0]);

// Water vapour, in the precipitable water column
const WATER_H1: Rational<3, 2> = Rational::new([0.0, 0.065445, 0.00029901], [1.0, 1.2728]);
const WATER_H2: Rational<3, 2> = Rational::new([0.0, 0.065687, 0.0013218], [1.0, 1.2008]);

// Effective wavelength coefficients, in the Angstrom exponent
const WAVELENGTH_D0: Rational<2, 1> = Rational::new([0.57664, -0.024743], [1.0]);
const WAVELENGTH_D1: Rational<3, 2> = Rational::new([0.093942, -0.2269, 0.12848], [1.0, 0.6418]);
const WAVELENGTH_D2: Rational<3, 2> =
    Rational::new([-0.093819, 0.36668, -0.12775], [1.0, -0.11651]);
const WAVELENGTH_D3: Rational<4, 3> = Rational::new(
    [0.0, 0.15232, -0.087214, 0.012664],
    [1.0, -0.90454, 0.26167],
);

// Rayleigh forward-scatter fraction (before halving), in the Rayleigh air mass
const FORWARD_SCATTER: [f64; 3] = [0.89013, -0.0049558, 0.000045721];

// Aerosol scattering correction, in the aerosol air mass
const CORRECTION_G0: Rational<3, 3> =
    Rational::new([3.715, 0.368, 0.036294], [1.0, 0.0, 0.0009391]);
const CORRECTION_G1: Rational<3, 3> =
    Rational::new([-0.164, -0.72567, 0.20701], [1.0, 0.0, 0.0019012]);
const CORRECTION_G2: Rational<3, 3> =
    Rational::new([-0.052288, 0.31902, 0.17871], [1.0, 0.0, 0.0069592]);

/// UV and visible band. Ozone and NO2 absorption are active.
#[derive(Debug, Clone, Copy, Default)]
pub struct Band1;

/// Ozone transmittance for column `ozone` and ozone air mass `m`.
pub fn ozone_transmittance(ozone: f64, m: f64) -> f64 {
    let f1 = OZONE_F1.eval(ozone);
    let f2 = OZONE_F2.eval(ozone);
    let f3 = OZONE_F3.eval(ozone);
    (1.0 + f1 * m + f2 * m.powi(2)) / (1.0 + f3 * m)
}

/// NO2 transmittance for column `no2` at air mass `m`, capped at 1.
pub fn nitrogen_dioxide_transmittance(no2: f64, m: f64) -> f64 {
    let g1 = NO2_G1.eval(no2);
    let g2 = NO2_G2.eval(no2);
    let g3 = NO2_G3.eval(no2);
    cap_at_unity((1.0 + g1 * m + g2 * m.powi(2)) / (1.0 + g3 * m))
}

/// Water vapour transmittance for column `water` at air mass `m`.
pub fn water_vapour_transmittance(water: f64, m: f64) -> f64 {
    let h1 = WATER_H1.eval(water);
    let h2 = WATER_H2.eval(water);
    (1.0 + h1 * m) / (1.0 + h2 * m)
}

/// Effective aerosol wavelength (µm).
pub fn effective_wavelength(angstrom_exponent: f64, aerosol_air_mass: f64, turbidity: f64) -> f64 {
    let ua = turbidity_path(aerosol_air_mass, turbidity);
    let d0 = WAVELENGTH_D0.eval(angstrom_exponent);
    let d1 = WAVELENGTH_D1.eval(angstrom_exponent);
    let d2 = WAVELENGTH_D2.eval(angstrom_exponent);
    let d3 = WAVELENGTH_D3.eval(angstrom_exponent);
    (d0 + d1 * ua + d2 * ua.powi(2)) / (1.0 + d3 * ua.powi(2))
}

fn scattering_correction(aerosol_air_mass: f64, optical_depth: f64) -> f64 {
    let g0 = CORRECTION_G0.eval(aerosol_air_mass);
    let g1 = CORRECTION_G1.eval(aerosol_air_mass);
    let g2 = CORRECTION_G2.eval(aerosol_air_mass);
    (g0 + g1 * optical_depth) / (1.0 + g2 * optical_depth)
}

fn sky_albedo(angstrom_exponent: f64, turbidity: f64) -> f64 {
    let alpha = angstrom_exponent;
    let numerator = 0.13363
        + 0.00077358 * alpha
        + turbidity * (0.37567 + 0.22946 * alpha) / (1.0 - 0.10832 * alpha);
    let denominator = 1.0 + turbidity * (0.84057 + 0.68683 * alpha) / (1.0 - 0.08158 * alpha);
    numerator / denominator
}

impl SpectralBand for Band1 {
    const NAME: &'static str = "band1";
    const EXTRATERRESTRIAL_FRACTION: f64 = 0.46512;
    const SINGLE_SCATTERING_ALBEDO: f64 = 0.92;

    fn transmittance(&self, inputs: &BandInputs) -> BandTransmittance {
        let am = inputs.air_masses;
        let beta = &am.angstrom_turbidity;
        let alpha = inputs.angstrom_exponent;

        let rayleigh = am.rayleigh_pressure_scaled.mapv(|m| RAYLEIGH.eval(m));
        let mixed_gas = am.rayleigh_pressure_scaled.mapv(|m| MIXED_GAS.eval(m));

        let ozone = Zip::from(inputs.ozone)
            .and(&am.ozone)
            .map_collect(|&u, &m| ozone_transmittance(u, m));

        // NO2 shares the water vapour air mass
        let nitrogen_dioxide = Zip::from(inputs.nitrogen_dioxide)
            .and(&am.water_vapour)
            .map_collect(|&u, &m| nitrogen_dioxide_transmittance(u, m));
        let nitrogen_dioxide_reference = inputs
            .nitrogen_dioxide
            .mapv(|u| nitrogen_dioxide_transmittance(u, REFERENCE_AIR_MASS));

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

        let rayleigh_forward_scatter = am
            .rayleigh
            .mapv(|m| 0.5 * polynomial(&FORWARD_SCATTER, m));
        let aerosol_forward_scatter = inputs.zenith_angle.mapv(aerosol_forward_scatter);

        let aerosol_scattering_correction = Zip::from(&am.aerosol)
            .and(&optical_depth)
            .map_collect(|&m, &tau| scattering_correction(m, tau));

        let sky_albedo = Zip::from(alpha)
            .and(beta)
            .map_collect(|&a, &b| sky_albedo(a, b));

        BandTransmittance {
            rayleigh,
            mixed_gas,
            ozone,
            nitrogen_dioxide,
            nitrogen_dioxide_reference,
            water_vapour,
            water_vapour_reference,
            aerosol,
            aerosol_scattering,
            rayleigh_forward_scatter,
            aerosol_forward_scatter,
            aerosol_scattering_correction,
            sky_albedo,
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
        let t = Band1.transmittance(&fixture.inputs());
        assert_physical(&t);
    }

    #[test]
    fn rayleigh_transmittance_at_unit_air_mass() {
        // (1 + 1.8169 - 0.033454) / (1 + 2.063 + 0.31978)
        assert_relative_eq!(RAYLEIGH.eval(1.0), 2.783446 / 3.38278, epsilon = 1e-12);
    }

    #[test]
    fn no_ozone_means_no_ozone_absorption() {
        assert_relative_eq!(ozone_transmittance(0.0, 3.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ozone_absorption_grows_with_column() {
        assert!(ozone_transmittance(0.4, 1.5) < ozone_transmittance(0.2, 1.5));
    }

    #[test]
    fn nitrogen_dioxide_is_capped_at_one() {
        // With no NO2 the uncapped ratio is (1 + 0.17499 m) / (1 + 0.17499 m) = 1.
        // A slightly negative column pushes the ratio above 1.
        let uncapped = {
            let u = -0.002;
            let m = 2.0;
            (1.0 + NO2_G1.eval(u) * m + NO2_G2.eval(u) * m * m) / (1.0 + NO2_G3.eval(u) * m)
        };
        assert!(uncapped > 1.0, "uncapped {uncapped}");
        assert_eq!(nitrogen_dioxide_transmittance(-0.002, 2.0), 1.0);
    }

    #[test]
    fn nitrogen_dioxide_reference_uses_fixed_air_mass() {
        let fixture = Fixture::mid_range();
        let t = Band1.transmittance(&fixture.inputs());

        let expected = nitrogen_dioxide_transmittance(0.001, 1.66);
        for v in t.nitrogen_dioxide_reference.iter() {
            assert_relative_eq!(*v, expected, epsilon = 1e-15);
        }
        for v in t.nitrogen_dioxide.iter() {
            assert!(*v <= 1.0);
        }
    }

    #[test]
    fn water_vapour_absorption_grows_with_air_mass() {
        assert!(water_vapour_transmittance(2.0, 3.0) < water_vapour_transmittance(2.0, 1.0));
        assert_relative_eq!(water_vapour_transmittance(0.0, 3.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rayleigh_forward_scatter_close_to_half() {
        let fixture = Fixture::mid_range();
        let t = Band1.transmittance(&fixture.inputs());
        for v in t.rayleigh_forward_scatter.iter() {
            assert!(*v > 0.4 && *v < 0.5, "{v}");
        }
    }

    #[test]
    fn clean_atmosphere_has_no_aerosol_extinction() {
        let mut fixture = Fixture::mid_range();
        fixture.air_masses.angstrom_turbidity.fill(0.0);

        let t = Band1.transmittance(&fixture.inputs());
        for v in t.aerosol.iter().chain(t.aerosol_scattering.iter()) {
            assert_relative_eq!(*v, 1.0, epsilon = 1e-15);
        }
    }
}

//! Relative optical air masses and Angstrom turbidity.
//!
//! Each species uses Gueymard's fit
//!
//! $$m = \left|\left(\cos z + a Z^b (c - Z)^{-d}\right)^{-1}\right|$$
//!
//! with `Z` the zenith angle in degrees. Near and below the horizon `c - Z`
//! turns negative, so the powers are taken on the complex principal branch.

use crate::constants::{ANGSTROM_TURBIDITY_BOUNDS, STANDARD_PRESSURE};
use crate::numeric::complex_powf;
use crate::timeseries::FloatValue;
use ndarray::{Array1, Zip};
use num::complex::Complex64;

/// Empirical constants `(a, b, c, d)` of one air-mass fit.
#[derive(Debug, Clone, Copy)]
pub struct AirMassCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

/// Aerosol extinction
pub const AEROSOL_AIR_MASS: AirMassCoefficients = AirMassCoefficients {
    a: 0.16851,
    b: 0.18198,
    c: 95.318,
    d: 1.9542,
};

/// Water vapour absorption (also used for NO2)
pub const WATER_VAPOUR_AIR_MASS: AirMassCoefficients = AirMassCoefficients {
    a: 0.10648,
    b: 0.11423,
    c: 93.781,
    d: 1.9203,
};

/// Ozone absorption
pub const OZONE_AIR_MASS: AirMassCoefficients = AirMassCoefficients {
    a: 1.0651,
    b: 0.6379,
    c: 101.8,
    d: 2.2694,
};

/// Rayleigh scattering and uniformly mixed gases
pub const RAYLEIGH_AIR_MASS: AirMassCoefficients = AirMassCoefficients {
    a: 0.48353,
    b: 0.095846,
    c: 96.741,
    d: 1.754,
};

impl AirMassCoefficients {
    /// Relative air mass at a zenith angle given in radians.
    pub fn air_mass(&self, zenith_angle: f64) -> f64 {
        let zenith_degrees = zenith_angle.to_degrees();
        let correction = complex_powf(zenith_degrees, self.b) * self.a
            / complex_powf(self.c - zenith_degrees, self.d);
        (Complex64::new(zenith_angle.cos(), 0.0) + correction)
            .inv()
            .norm()
    }

    fn evaluate(&self, zenith_angle: &Array1<FloatValue>) -> Array1<FloatValue> {
        zenith_angle.mapv(|z| self.air_mass(z))
    }
}

/// Angstrom turbidity coefficient clipped to [0, 1.1].
pub fn angstrom_turbidity(optical_depth_550nm: f64, angstrom_exponent: f64) -> f64 {
    let beta = optical_depth_550nm / 0.55_f64.powf(-angstrom_exponent);
    ANGSTROM_TURBIDITY_BOUNDS.clip(beta)
}

/// Per-timestep air masses and turbidity for one location.
#[derive(Debug, Clone)]
pub struct AirMassSet {
    pub aerosol: Array1<FloatValue>,
    pub water_vapour: Array1<FloatValue>,
    pub ozone: Array1<FloatValue>,
    pub rayleigh: Array1<FloatValue>,
    /// Rayleigh air mass scaled by `pressure / 1013.25`
    pub rayleigh_pressure_scaled: Array1<FloatValue>,
    /// Angstrom beta
    pub angstrom_turbidity: Array1<FloatValue>,
}

impl AirMassSet {
    pub fn evaluate(
        zenith_angle: &Array1<FloatValue>,
        angstrom_exponent: &Array1<FloatValue>,
        pressure: &Array1<FloatValue>,
        optical_depth_550nm: &Array1<FloatValue>,
    ) -> Self {
        let rayleigh = RAYLEIGH_AIR_MASS.evaluate(zenith_angle);
        let rayleigh_pressure_scaled = Zip::from(&rayleigh)
            .and(pressure)
            .map_collect(|&m, &p| (p / STANDARD_PRESSURE * m).abs());
        let angstrom_turbidity = Zip::from(optical_depth_550nm)
            .and(angstrom_exponent)
            .map_collect(|&tau, &alpha| angstrom_turbidity(tau, alpha));

        Self {
            aerosol: AEROSOL_AIR_MASS.evaluate(zenith_angle),
            water_vapour: WATER_VAPOUR_AIR_MASS.evaluate(zenith_angle),
            ozone: OZONE_AIR_MASS.evaluate(zenith_angle),
            rayleigh,
            rayleigh_pressure_scaled,
            angstrom_turbidity,
        }
    }
}

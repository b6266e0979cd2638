//! Fractional powers evaluated on the principal complex branch.
//!
//! Several empirical fits raise quantities that can become zero or negative
//! (e.g. `95.318 - Z` near the horizon, or a fitted wavelength exponent) to
//! non-integer powers. Evaluating them as complex numbers and taking the
//! magnitude always yields a real, finite value where a real power would give NaN.

use num::complex::Complex64;

/// Principal value of `base^exponent` for a real base.
pub fn complex_powf(base: f64, exponent: f64) -> Complex64 {
    Complex64::new(base, 0.0).powf(exponent)
}

/// `|base^exponent|` on the principal branch.
pub fn magnitude_powf(base: f64, exponent: f64) -> f64 {
    complex_powf(base, exponent).norm()
}

/// Evaluate `sum(coefficients[i] * x^i)`.
pub(crate) fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .enumerate()
        .map(|(power, c)| c * x.powi(power as i32))
        .sum()
}

/// Ratio of two polynomials in a single variable.
///
/// Coefficients are listed in ascending order of power.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rational<const N: usize, const M: usize> {
    pub numerator: [f64; N],
    pub denominator: [f64; M],
}

impl<const N: usize, const M: usize> Rational<N, M> {
    pub const fn new(numerator: [f64; N], denominator: [f64; M]) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn eval(&self, x: f64) -> f64 {
        polynomial(&self.numerator, x) / polynomial(&self.denominator, x)
    }
}

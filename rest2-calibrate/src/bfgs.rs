//! Unconstrained BFGS minimisation with finite-difference gradients.
//!
//! The objective is treated as a black box: gradients are forward differences
//! and each line search is a backtracking Armijo search that rejects
//! non-finite trial values. The inverse Hessian starts at the identity and is
//! updated only when the curvature condition `yᵀs > 0` holds.
//!
//! The minimiser never fails. It stops when the gradient is small, when no
//! further decrease can be found, or at the iteration cap, and always returns
//! the lowest point it evaluated along the accepted path.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Sufficient decrease constant of the Armijo condition
const ARMIJO: f64 = 1e-4;
/// Step shrink factor per backtrack
const BACKTRACK: f64 = 0.5;
const MAX_BACKTRACKS: usize = 60;
/// Iterations allowed per parameter when no explicit cap is set
const ITERATIONS_PER_PARAMETER: usize = 200;

/// Stopping settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfgsOptions {
    /// Defaults to 200 times the number of parameters
    pub max_iterations: Option<usize>,
    /// Converged once every gradient component is below this
    pub gradient_tolerance: f64,
    /// Relative forward-difference step
    pub finite_difference_step: f64,
}

impl Default for BfgsOptions {
    fn default() -> Self {
        Self {
            max_iterations: None,
            gradient_tolerance: 1e-5,
            finite_difference_step: f64::EPSILON.sqrt(),
        }
    }
}

impl BfgsOptions {
    pub fn iteration_limit(&self, parameter_count: usize) -> usize {
        self.max_iterations.unwrap_or(ITERATIONS_PER_PARAMETER * parameter_count)
    }
}

/// Why the minimiser stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    GradientTolerance,
    LineSearchFailed,
    /// Neither the point nor the objective moves any more
    Stalled,
    MaxIterations,
    NonFiniteGradient,
    NonFiniteStart,
}

#[derive(Debug, Clone)]
pub struct MinimizeReport {
    /// Best point found
    pub x: DVector<f64>,
    /// Objective at `x`
    pub value: f64,
    /// Infinity norm of the last gradient estimate
    pub gradient_norm: f64,
    pub iterations: usize,
    pub function_evaluations: usize,
    pub termination: Termination,
}

impl MinimizeReport {
    pub fn converged(&self) -> bool {
        self.termination == Termination::GradientTolerance
    }
}

/// Objective wrapper counting evaluations.
struct Counted<F> {
    f: F,
    evaluations: usize,
}

impl<F: FnMut(&DVector<f64>) -> f64> Counted<F> {
    fn eval(&mut self, x: &DVector<f64>) -> f64 {
        self.evaluations += 1;
        (self.f)(x)
    }

    /// Forward differences with step `h * max(1, |x_i|)`.
    fn gradient(&mut self, x: &DVector<f64>, fx: f64, h: f64) -> DVector<f64> {
        let mut gradient = DVector::zeros(x.len());
        let mut probe = x.clone();
        for i in 0..x.len() {
            let step = h * x[i].abs().max(1.0);
            probe[i] = x[i] + step;
            gradient[i] = (self.eval(&probe) - fx) / step;
            probe[i] = x[i];
        }
        gradient
    }

    /// Backtrack from `initial_step` until the Armijo condition holds.
    fn line_search(
        &mut self,
        x: &DVector<f64>,
        fx: f64,
        direction: &DVector<f64>,
        slope: f64,
        initial_step: f64,
    ) -> Option<(DVector<f64>, f64)> {
        let mut alpha = initial_step;
        for _ in 0..MAX_BACKTRACKS {
            let trial = x + direction * alpha;
            let value = self.eval(&trial);
            if value.is_finite() && value <= fx + ARMIJO * alpha * slope {
                return Some((trial, value));
            }
            alpha *= BACKTRACK;
        }
        None
    }
}

/// Minimise `f` starting from `x0`.
pub fn minimize<F>(f: F, x0: DVector<f64>, options: &BfgsOptions) -> MinimizeReport
where
    F: FnMut(&DVector<f64>) -> f64,
{
    let n = x0.len();
    let max_iterations = options.iteration_limit(n);
    let h = options.finite_difference_step;
    let identity = DMatrix::<f64>::identity(n, n);

    let mut objective = Counted { f, evaluations: 0 };
    let mut x = x0;
    let mut fx = objective.eval(&x);

    if !fx.is_finite() {
        return MinimizeReport {
            x,
            value: fx,
            gradient_norm: f64::NAN,
            iterations: 0,
            function_evaluations: objective.evaluations,
            termination: Termination::NonFiniteStart,
        };
    }

    let mut gradient = objective.gradient(&x, fx, h);
    let mut inverse_hessian = identity.clone();
    // A unit-norm first step, as the identity carries no scale information
    let mut fresh_hessian = true;
    let mut iterations = 0;

    let termination = loop {
        if gradient.iter().any(|g| !g.is_finite()) {
            break Termination::NonFiniteGradient;
        }
        if gradient.amax() < options.gradient_tolerance {
            break Termination::GradientTolerance;
        }
        if iterations >= max_iterations {
            break Termination::MaxIterations;
        }

        let mut direction = -(&inverse_hessian * &gradient);
        let mut slope = gradient.dot(&direction);
        if slope.is_nan() || slope >= 0.0 {
            inverse_hessian = identity.clone();
            fresh_hessian = true;
            direction = -gradient.clone();
            slope = -gradient.norm_squared();
        }

        let initial_step = if fresh_hessian {
            (1.0 / direction.norm()).min(1.0)
        } else {
            1.0
        };
        let Some((x_new, f_new)) = objective.line_search(&x, fx, &direction, slope, initial_step)
        else {
            break Termination::LineSearchFailed;
        };

        let s = &x_new - &x;
        let gradient_new = objective.gradient(&x_new, f_new, h);
        let y = &gradient_new - &gradient;
        let sy = y.dot(&s);
        if sy > 0.0 {
            let rho = 1.0 / sy;
            let left = &identity - (&s * y.transpose()) * rho;
            let right = &identity - (&y * s.transpose()) * rho;
            inverse_hessian = &left * &inverse_hessian * &right + (&s * s.transpose()) * rho;
            fresh_hessian = false;
        }

        let decrease = fx - f_new;
        x = x_new;
        fx = f_new;
        gradient = gradient_new;
        iterations += 1;

        if decrease <= f64::EPSILON * fx.abs().max(1.0)
            || s.amax() <= f64::EPSILON * (1.0 + x.amax())
        {
            break Termination::Stalled;
        }
    };

    MinimizeReport {
        gradient_norm: gradient.amax(),
        x,
        value: fx,
        iterations,
        function_evaluations: objective.evaluations,
        termination,
    }
}

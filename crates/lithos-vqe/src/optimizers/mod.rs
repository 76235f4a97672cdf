//! Classical optimizers for the variational loop.
//!
//! | Optimizer | Name | Gradient |
//! |-----------|------|----------|
//! | [`Slsqp`] | `slsqp` | forward differences |
//! | [`NelderMead`] | `nelder_mead` | none (simplex) |
//! | [`Spsa`] | `spsa` | simultaneous perturbation |
//!
//! Objectives are fallible: an error from the energy evaluation aborts the
//! optimisation and is returned unchanged.

mod nelder_mead;
mod slsqp;
mod spsa;

pub use nelder_mead::NelderMead;
pub use slsqp::Slsqp;
pub use spsa::Spsa;

use serde::Serialize;

use crate::error::{Result, VqeError};

/// A fallible scalar objective.
pub type Objective<'a> = dyn FnMut(&[f64]) -> Result<f64> + 'a;

/// Result of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    /// Optimal parameter values.
    pub x: Vec<f64>,
    /// Objective at `x`.
    pub fun: f64,
    /// Objective evaluations, gradient evaluations included.
    pub nfev: usize,
    /// Iterations.
    pub nit: usize,
    /// Whether a convergence criterion was met before `maxiter`.
    pub converged: bool,
    /// Best objective value after each iteration.
    pub history: Vec<f64>,
}

/// A minimiser over box-constrained parameters.
pub trait Optimizer: Send + Sync {
    /// Registered name.
    fn name(&self) -> &'static str;

    /// Minimise `objective` from `x0`. `bounds` is either empty
    /// (unconstrained) or one `(lower, upper)` pair per parameter.
    fn minimize(
        &self,
        objective: &mut Objective<'_>,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> Result<OptimizationResult>;
}

/// Look up an optimizer by name with its default settings, optionally
/// overriding the iteration limit. `seed` only affects stochastic methods.
pub fn optimizer_from_name(
    name: &str,
    maxiter: Option<usize>,
    seed: Option<u64>,
) -> Result<Box<dyn Optimizer>> {
    let normalized = name.to_ascii_lowercase().replace(['-', ' '], "_");
    let optimizer: Box<dyn Optimizer> = match normalized.as_str() {
        "slsqp" => {
            let mut o = Slsqp::default();
            if let Some(m) = maxiter {
                o.maxiter = m;
            }
            Box::new(o)
        }
        "nelder_mead" | "neldermead" => {
            let mut o = NelderMead::default();
            if let Some(m) = maxiter {
                o.maxiter = m;
            }
            Box::new(o)
        }
        "spsa" => {
            let mut o = Spsa::default();
            if let Some(m) = maxiter {
                o.maxiter = m;
            }
            o.seed = seed;
            Box::new(o)
        }
        _ => return Err(VqeError::UnknownOptimizer(name.to_string())),
    };
    Ok(optimizer)
}

/// Counts calls and rejects non-finite values.
pub(crate) struct Counted<'a, 'b> {
    objective: &'a mut Objective<'b>,
    nfev: usize,
}

impl<'a, 'b> Counted<'a, 'b> {
    pub(crate) fn new(objective: &'a mut Objective<'b>) -> Self {
        Self { objective, nfev: 0 }
    }

    pub(crate) fn call(&mut self, x: &[f64]) -> Result<f64> {
        self.nfev += 1;
        let value = (self.objective)(x)?;
        if !value.is_finite() {
            return Err(VqeError::NonFiniteObjective(self.nfev));
        }
        Ok(value)
    }

    pub(crate) fn nfev(&self) -> usize {
        self.nfev
    }
}

/// Check `bounds` against `n` parameters.
pub(crate) fn check_bounds(bounds: &[(f64, f64)], n: usize) -> Result<()> {
    if !bounds.is_empty() && bounds.len() != n {
        return Err(VqeError::InvalidOption(format!(
            "{} bounds given for {n} parameters",
            bounds.len()
        )));
    }
    if let Some((lo, hi)) = bounds.iter().find(|(lo, hi)| lo > hi) {
        return Err(VqeError::InvalidOption(format!("empty bound ({lo}, {hi})")));
    }
    Ok(())
}

/// Project `x` onto the box.
pub(crate) fn clip(x: &mut [f64], bounds: &[(f64, f64)]) {
    for (xi, &(lo, hi)) in x.iter_mut().zip(bounds) {
        *xi = xi.clamp(lo, hi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn quadratic(x: &[f64]) -> Result<f64> {
        Ok((x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2))
    }

    pub(crate) fn rosenbrock(x: &[f64]) -> Result<f64> {
        Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2))
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(optimizer_from_name("SLSQP", None, None).unwrap().name(), "slsqp");
        assert_eq!(
            optimizer_from_name("nelder-mead", Some(5), None).unwrap().name(),
            "nelder_mead"
        );
        assert!(matches!(
            optimizer_from_name("cobyla", None, None),
            Err(VqeError::UnknownOptimizer(_))
        ));
    }

    #[test]
    fn every_optimizer_solves_a_quadratic() {
        for name in ["slsqp", "nelder_mead"] {
            let optimizer = optimizer_from_name(name, Some(500), Some(11)).unwrap();
            let result = optimizer
                .minimize(&mut quadratic, &[0.0, 0.0], &[])
                .unwrap();
            assert!(result.fun < 1e-6, "{name}: {}", result.fun);
            assert!((result.x[0] - 1.0).abs() < 1e-2, "{name}");
            assert!((result.x[1] - 2.0).abs() < 1e-2, "{name}");
        }
    }

    #[test]
    fn objective_errors_propagate() {
        let optimizer = Slsqp::default();
        let mut failing = |_: &[f64]| -> Result<f64> { Err(VqeError::InvalidOption("boom".into())) };
        assert!(optimizer.minimize(&mut failing, &[0.0], &[]).is_err());

        let mut nan = |_: &[f64]| -> Result<f64> { Ok(f64::NAN) };
        assert!(matches!(
            NelderMead::default().minimize(&mut nan, &[0.0], &[]),
            Err(VqeError::NonFiniteObjective(1))
        ));
    }

    #[test]
    fn bounds_validation() {
        assert!(check_bounds(&[(0.0, 1.0)], 2).is_err());
        assert!(check_bounds(&[(1.0, 0.0)], 1).is_err());
        assert!(check_bounds(&[], 3).is_ok());
    }
}

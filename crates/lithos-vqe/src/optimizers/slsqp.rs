//! Sequential least-squares-style quadratic programming for box bounds.
//!
//! Each iteration solves the bounded quadratic model
//! `min gᵀd + ½ dᵀBd, lo ≤ x + d ≤ hi` with a primal active set, takes a
//! backtracking step along `d`, and refreshes `B` with a damped BFGS
//! update. Gradients are forward differences, so one iteration costs
//! `n + 1` or more objective calls.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::{Counted, Objective, OptimizationResult, Optimizer, check_bounds, clip};
use crate::error::Result;

/// Armijo sufficient-decrease constant.
const ARMIJO: f64 = 1e-4;
/// Step halvings before the line search gives up.
const MAX_BACKTRACKS: usize = 20;

/// SLSQP optimizer configuration.
#[derive(Debug, Clone)]
pub struct Slsqp {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Stop once an iteration improves the objective by less than this.
    pub ftol: f64,
    /// Finite-difference step.
    pub eps: f64,
}

impl Default for Slsqp {
    fn default() -> Self {
        Self {
            maxiter: 100,
            ftol: 1e-6,
            eps: 1.490_116_119_384_765_6e-8,
        }
    }
}

impl Slsqp {
    /// Create with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the objective tolerance.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    fn gradient(
        &self,
        objective: &mut Counted<'_, '_>,
        x: &[f64],
        fx: f64,
        bounds: &[(f64, f64)],
    ) -> Result<DVector<f64>> {
        let mut g = DVector::zeros(x.len());
        let mut probe = x.to_vec();
        for i in 0..x.len() {
            let upper = bounds.get(i).map_or(f64::INFINITY, |b| b.1);
            let h = if x[i] + self.eps > upper { -self.eps } else { self.eps };
            probe[i] = x[i] + h;
            g[i] = (objective.call(&probe)? - fx) / h;
            probe[i] = x[i];
        }
        Ok(g)
    }
}

/// Minimise `gᵀd + ½ dᵀBd` subject to `lower ≤ d ≤ upper`.
///
/// Variables are fixed at a bound when the unconstrained step crosses it
/// and released when their multiplier has the wrong sign.
fn bounded_qp_step(b: &DMatrix<f64>, g: &DVector<f64>, lower: &[f64], upper: &[f64]) -> DVector<f64> {
    let n = g.len();
    let mut fixed: Vec<Option<f64>> = (0..n)
        .map(|i| {
            if lower[i] >= 0.0 && g[i] > 0.0 {
                Some(lower[i])
            } else if upper[i] <= 0.0 && g[i] < 0.0 {
                Some(upper[i])
            } else {
                None
            }
        })
        .collect();

    let mut d = DVector::zeros(n);
    for _ in 0..=2 * n {
        let free: Vec<usize> = (0..n).filter(|&i| fixed[i].is_none()).collect();
        for (i, value) in fixed.iter().enumerate() {
            d[i] = value.unwrap_or(0.0);
        }
        if !free.is_empty() {
            let b_ff = DMatrix::from_fn(free.len(), free.len(), |r, c| b[(free[r], free[c])]);
            // d is zero on the free set, so B·d only carries the fixed part.
            let bd = b * &d;
            let rhs = DVector::from_fn(free.len(), |r, _| -(g[free[r]] + bd[free[r]]));
            let step = b_ff
                .clone()
                .cholesky()
                .map(|c| c.solve(&rhs))
                .or_else(|| b_ff.lu().solve(&rhs))
                .unwrap_or(rhs);
            for (r, &i) in free.iter().enumerate() {
                d[i] = step[r];
            }
        }

        let mut changed = false;
        for &i in &free {
            if d[i] < lower[i] {
                fixed[i] = Some(lower[i]);
                changed = true;
            } else if d[i] > upper[i] {
                fixed[i] = Some(upper[i]);
                changed = true;
            }
        }
        if changed {
            continue;
        }

        // Release the fixed variable whose multiplier points inward most.
        let model_gradient = g + b * &d;
        let release = (0..n)
            .filter_map(|i| {
                let v = fixed[i]?;
                let wrong_sign = if v == lower[i] {
                    -model_gradient[i]
                } else {
                    model_gradient[i]
                };
                (wrong_sign > 1e-12).then_some((i, wrong_sign))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));
        match release {
            Some((i, _)) => fixed[i] = None,
            None => break,
        }
    }
    d
}

/// Powell-damped BFGS update of `b` with step `s` and gradient change `y`.
fn damped_bfgs(b: &mut DMatrix<f64>, s: &DVector<f64>, y: &DVector<f64>) {
    let bs = &*b * s;
    let sbs = s.dot(&bs);
    if sbs <= f64::EPSILON {
        return;
    }
    let sy = s.dot(y);
    let theta = if sy >= 0.2 * sbs {
        1.0
    } else {
        0.8 * sbs / (sbs - sy)
    };
    let r = y * theta + &bs * (1.0 - theta);
    let sr = s.dot(&r);
    if sr <= f64::EPSILON {
        return;
    }
    *b += &r * r.transpose() / sr - &bs * bs.transpose() / sbs;
}

impl Optimizer for Slsqp {
    fn name(&self) -> &'static str {
        "slsqp"
    }

    fn minimize(
        &self,
        objective: &mut Objective<'_>,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> Result<OptimizationResult> {
        let n = x0.len();
        check_bounds(bounds, n)?;
        let (lo, hi): (Vec<f64>, Vec<f64>) = if bounds.is_empty() {
            (vec![f64::NEG_INFINITY; n], vec![f64::INFINITY; n])
        } else {
            bounds.iter().copied().unzip()
        };

        let mut objective = Counted::new(objective);
        let mut x = x0.to_vec();
        clip(&mut x, bounds);
        let mut f = objective.call(&x)?;
        let mut history = vec![f];
        if n == 0 {
            return Ok(OptimizationResult {
                x,
                fun: f,
                nfev: objective.nfev(),
                nit: 0,
                converged: true,
                history,
            });
        }

        let mut g = self.gradient(&mut objective, &x, f, bounds)?;
        let mut b = DMatrix::<f64>::identity(n, n);
        let mut converged = false;
        let mut nit = 0;

        while nit < self.maxiter {
            nit += 1;
            let lower: Vec<f64> = (0..n).map(|i| lo[i] - x[i]).collect();
            let upper: Vec<f64> = (0..n).map(|i| hi[i] - x[i]).collect();
            let mut d = bounded_qp_step(&b, &g, &lower, &upper);
            let mut slope = g.dot(&d);
            if slope >= 0.0 {
                // The model lost positive curvature; restart from steepest descent.
                b.fill_with_identity();
                d = bounded_qp_step(&b, &g, &lower, &upper);
                slope = g.dot(&d);
            }
            if d.norm() < f64::EPSILON || slope >= 0.0 {
                converged = true;
                break;
            }

            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let mut trial: Vec<f64> = x.iter().zip(d.iter()).map(|(xi, di)| xi + alpha * di).collect();
                clip(&mut trial, bounds);
                let f_trial = objective.call(&trial)?;
                if f_trial <= f + ARMIJO * alpha * slope {
                    accepted = Some((trial, f_trial));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((x_new, f_new)) = accepted else {
                debug!(nit, f, "line search failed to decrease the objective");
                converged = true;
                break;
            };

            let g_new = self.gradient(&mut objective, &x_new, f_new, bounds)?;
            let s = DVector::from_iterator(n, x_new.iter().zip(&x).map(|(a, b)| a - b));
            let y = &g_new - &g;
            damped_bfgs(&mut b, &s, &y);

            let improvement = f - f_new;
            x = x_new;
            f = f_new;
            g = g_new;
            history.push(f);
            debug!(nit, f, alpha, step = s.norm(), "SLSQP iteration");

            if improvement.abs() < self.ftol {
                converged = true;
                break;
            }
        }

        Ok(OptimizationResult {
            x,
            fun: f,
            nfev: objective.nfev(),
            nit,
            converged,
            history,
        })
    }
}

//! Nelder–Mead downhill simplex.
//!
//! Derivative-free, so it tolerates the noise of shot-sampled energies
//! better than finite-difference methods. Trial points are projected onto
//! the bounds.

use tracing::debug;

use super::{Counted, Objective, OptimizationResult, Optimizer, check_bounds, clip};
use crate::error::Result;

/// Nelder–Mead optimizer configuration.
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Simplex size tolerance on the parameters.
    pub xatol: f64,
    /// Spread tolerance on the objective values.
    pub fatol: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            maxiter: 1000,
            xatol: 1e-4,
            fatol: 1e-4,
        }
    }
}

impl NelderMead {
    /// Create with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set both tolerances.
    pub fn with_tolerances(mut self, xatol: f64, fatol: f64) -> Self {
        self.xatol = xatol;
        self.fatol = fatol;
        self
    }
}

/// `centroid + t · (point - centroid)`, projected.
fn along(centroid: &[f64], point: &[f64], t: f64, bounds: &[(f64, f64)]) -> Vec<f64> {
    let mut out: Vec<f64> = centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + t * (p - c))
        .collect();
    clip(&mut out, bounds);
    out
}

impl Optimizer for NelderMead {
    fn name(&self) -> &'static str {
        "nelder_mead"
    }

    fn minimize(
        &self,
        objective: &mut Objective<'_>,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> Result<OptimizationResult> {
        let n = x0.len();
        check_bounds(bounds, n)?;
        let mut objective = Counted::new(objective);

        let mut x = x0.to_vec();
        clip(&mut x, bounds);

        // Initial simplex: 5% steps, or a small absolute step at zero.
        let mut simplex: Vec<Vec<f64>> = vec![x.clone()];
        for i in 0..n {
            let mut point = x.clone();
            point[i] = if point[i] != 0.0 { 1.05 * point[i] } else { 0.00025 };
            clip(&mut point, bounds);
            if point[i] == x[i] {
                // Pinned at a bound: step inward instead.
                point[i] = x[i] - 0.00025;
                clip(&mut point, bounds);
            }
            simplex.push(point);
        }
        let mut values = Vec::with_capacity(n + 1);
        for point in &simplex {
            values.push(objective.call(point)?);
        }

        let mut history = Vec::new();
        let mut converged = false;
        let mut nit = 0;

        while nit < self.maxiter {
            // Sort simplex by function value.
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            values = order.iter().map(|&i| values[i]).collect();

            let x_spread = simplex[1..]
                .iter()
                .flat_map(|p| p.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
                .fold(0.0, f64::max);
            let f_spread = values[1..]
                .iter()
                .map(|v| (v - values[0]).abs())
                .fold(0.0, f64::max);
            if x_spread <= self.xatol && f_spread <= self.fatol {
                converged = true;
                break;
            }
            nit += 1;

            // Centroid of all points except the worst.
            let mut centroid = vec![0.0; n];
            for point in &simplex[..n] {
                for (c, p) in centroid.iter_mut().zip(point) {
                    *c += p / n as f64;
                }
            }

            let reflected = along(&centroid, &simplex[n], -1.0, bounds);
            let f_reflected = objective.call(&reflected)?;

            if f_reflected < values[0] {
                let expanded = along(&centroid, &simplex[n], -2.0, bounds);
                let f_expanded = objective.call(&expanded)?;
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
            } else if f_reflected < values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
            } else {
                // Outside contraction if the reflection beat the worst
                // point, inside contraction otherwise.
                let (t, reference) = if f_reflected < values[n] {
                    (-0.5, f_reflected)
                } else {
                    (0.5, values[n])
                };
                let contracted = along(&centroid, &simplex[n], t, bounds);
                let f_contracted = objective.call(&contracted)?;
                if f_contracted <= reference {
                    simplex[n] = contracted;
                    values[n] = f_contracted;
                } else {
                    // Shrink towards the best point.
                    let best = simplex[0].clone();
                    for i in 1..=n {
                        simplex[i] = along(&best, &simplex[i], 0.5, bounds);
                        values[i] = objective.call(&simplex[i])?;
                    }
                }
            }

            let best = values.iter().copied().fold(f64::INFINITY, f64::min);
            history.push(best);
            debug!(nit, best, "Nelder-Mead iteration");
        }

        let best = (0..=n)
            .min_by(|&a, &b| values[a].total_cmp(&values[b]))
            .unwrap_or(0);
        Ok(OptimizationResult {
            x: simplex.swap_remove(best),
            fun: values[best],
            nfev: objective.nfev(),
            nit,
            converged,
            history,
        })
    }
}

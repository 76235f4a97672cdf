//! Simultaneous perturbation stochastic approximation.
//!
//! Two objective calls per iteration estimate the full gradient along a
//! random ±1 direction, which suits shot-sampled objectives. The result is
//! the average of the last `last_avg` iterates, evaluated once more at the
//! end; the minimum over noisy samples would be biased low.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{Counted, Objective, OptimizationResult, Optimizer, check_bounds, clip};
use crate::error::Result;

/// SPSA optimizer configuration.
#[derive(Debug, Clone)]
pub struct Spsa {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Step-size numerator.
    pub a: f64,
    /// Perturbation size.
    pub c: f64,
    /// Step-size decay exponent.
    pub alpha: f64,
    /// Perturbation decay exponent.
    pub gamma: f64,
    /// Number of final iterates averaged into the result.
    pub last_avg: usize,
    /// RNG seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            maxiter: 100,
            a: 0.1,
            c: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            last_avg: 1,
            seed: None,
        }
    }
}

impl Spsa {
    /// Create with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Average the last `last_avg` iterates (at least one).
    pub fn with_last_avg(mut self, last_avg: usize) -> Self {
        self.last_avg = last_avg.max(1);
        self
    }

    /// Fix the perturbation sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Optimizer for Spsa {
    fn name(&self) -> &'static str {
        "spsa"
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
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut x = x0.to_vec();
        clip(&mut x, bounds);
        let window = self.last_avg.max(1);
        let mut recent: VecDeque<Vec<f64>> = VecDeque::with_capacity(window);
        let mut history = Vec::with_capacity(self.maxiter);

        for k in 0..self.maxiter {
            let a_k = self.a / ((k + 1) as f64).powf(self.alpha);
            let c_k = self.c / ((k + 1) as f64).powf(self.gamma);

            let delta: Vec<f64> = (0..n)
                .map(|_| if rng.gen_bool(0.5) { 1.0 } else { -1.0 })
                .collect();
            let x_plus: Vec<f64> = x.iter().zip(&delta).map(|(xi, di)| xi + c_k * di).collect();
            let x_minus: Vec<f64> = x.iter().zip(&delta).map(|(xi, di)| xi - c_k * di).collect();
            let f_plus = objective.call(&x_plus)?;
            let f_minus = objective.call(&x_minus)?;

            let scale = (f_plus - f_minus) / (2.0 * c_k);
            for (xi, di) in x.iter_mut().zip(&delta) {
                *xi -= a_k * scale / di;
            }
            clip(&mut x, bounds);

            if recent.len() == window {
                recent.pop_front();
            }
            recent.push_back(x.clone());

            let estimate = 0.5 * (f_plus + f_minus);
            history.push(estimate);
            debug!(iteration = k + 1, estimate, "SPSA iteration");
        }

        if !recent.is_empty() {
            let count = recent.len() as f64;
            x = (0..n)
                .map(|i| recent.iter().map(|xk| xk[i]).sum::<f64>() / count)
                .collect();
            clip(&mut x, bounds);
        }
        let fun = objective.call(&x)?;

        Ok(OptimizationResult {
            x,
            fun,
            nfev: objective.nfev(),
            nit: self.maxiter,
            converged: true,
            history,
        })
    }
}

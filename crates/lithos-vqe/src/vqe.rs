//! The variational quantum eigensolver loop.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, instrument};

use lithos_sim::{Backend, Hamiltonian};

use crate::ansatz::Ansatz;
use crate::error::{Result, VqeError};
use crate::optimizers::Optimizer;

/// Basis states reported in [`VqeResult::eigenstate`].
const EIGENSTATE_ENTRIES: usize = 8;

/// Per-evaluation hook: evaluation count, parameters, energy.
pub type Callback = Box<dyn FnMut(usize, &[f64], f64) + Send>;

/// One computational-basis state and its probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasisProbability {
    /// Qubit values, highest qubit first.
    pub bitstring: String,
    /// Measurement probability.
    pub probability: f64,
}

/// The `count` most likely basis states, most likely first; ties keep
/// index order.
pub fn dominant_states(probabilities: &[f64], num_qubits: usize, count: usize) -> Vec<BasisProbability> {
    let mut indexed: Vec<(usize, f64)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    indexed
        .into_iter()
        .take(count)
        .map(|(index, probability)| BasisProbability {
            bitstring: format!("{index:0num_qubits$b}"),
            probability,
        })
        .collect()
}

/// Outcome of [`Vqe::run`].
#[derive(Debug, Clone, Serialize)]
pub struct VqeResult {
    /// Minimum energy found.
    pub eigenvalue: f64,
    /// Parameters at the minimum.
    pub optimal_point: Vec<f64>,
    /// Energy evaluations, gradient probes included.
    pub optimizer_evals: usize,
    /// Optimizer iterations.
    pub optimizer_iterations: usize,
    /// Whether the optimizer met its convergence criterion.
    pub converged: bool,
    /// Auxiliary operator values at the optimum, in the given order.
    pub aux_values: Vec<f64>,
    /// Most likely basis states of the optimal state.
    pub eigenstate: Vec<BasisProbability>,
    /// Best energy after each optimizer iteration.
    pub energy_history: Vec<f64>,
    /// Optimizer that produced the result.
    pub optimizer: String,
    /// Backend used.
    pub backend: String,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Minimises `⟨ψ(θ)|H|ψ(θ)⟩` over the parameters of an ansatz.
pub struct Vqe {
    hamiltonian: Hamiltonian,
    ansatz: Box<dyn Ansatz>,
    optimizer: Box<dyn Optimizer>,
    initial_point: Option<Vec<f64>>,
    aux_operators: Vec<Hamiltonian>,
    callback: Option<Callback>,
}

impl Vqe {
    /// Create a solver.
    pub fn new(hamiltonian: Hamiltonian, ansatz: Box<dyn Ansatz>, optimizer: Box<dyn Optimizer>) -> Self {
        Self {
            hamiltonian,
            ansatz,
            optimizer,
            initial_point: None,
            aux_operators: vec![],
            callback: None,
        }
    }

    /// Start from `point` instead of the ansatz's preferred point.
    #[must_use]
    pub fn with_initial_point(mut self, point: Vec<f64>) -> Self {
        self.initial_point = Some(point);
        self
    }

    /// Operators to evaluate at the optimum.
    #[must_use]
    pub fn with_aux_operators(mut self, operators: Vec<Hamiltonian>) -> Self {
        self.aux_operators = operators;
        self
    }

    /// Called after every energy evaluation.
    #[must_use]
    pub fn with_callback(mut self, callback: impl FnMut(usize, &[f64], f64) + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// The ansatz.
    pub fn ansatz(&self) -> &dyn Ansatz {
        self.ansatz.as_ref()
    }

    /// The Hamiltonian being minimised.
    pub fn hamiltonian(&self) -> &Hamiltonian {
        &self.hamiltonian
    }

    /// Run the optimisation on `backend`.
    #[instrument(skip_all, fields(ansatz = self.ansatz.name(), optimizer = self.optimizer.name(), backend = backend.name()))]
    pub fn run(&mut self, backend: &dyn Backend) -> Result<VqeResult> {
        let start = Instant::now();
        if self.ansatz.num_qubits() != self.hamiltonian.num_qubits() {
            return Err(VqeError::WidthMismatch {
                ansatz: self.ansatz.num_qubits(),
                hamiltonian: self.hamiltonian.num_qubits(),
            });
        }
        let initial_point = match &self.initial_point {
            Some(point) => point.clone(),
            None => self.ansatz.preferred_initial_point(),
        };
        if initial_point.len() != self.ansatz.num_parameters() {
            return Err(VqeError::ParameterCount {
                expected: self.ansatz.num_parameters(),
                got: initial_point.len(),
            });
        }
        let bounds = self.ansatz.parameter_bounds();
        info!(
            num_qubits = self.hamiltonian.num_qubits(),
            terms = self.hamiltonian.n_terms(),
            parameters = initial_point.len(),
            "starting VQE"
        );

        let ansatz = self.ansatz.as_ref();
        let hamiltonian = &self.hamiltonian;
        let callback = &mut self.callback;
        let circuit = ansatz.circuit();
        let mut evals = 0usize;
        let mut objective = |params: &[f64]| -> Result<f64> {
            let bindings = ansatz.bind(params)?;
            let energy = backend.expectation(circuit, &bindings, hamiltonian)?;
            evals += 1;
            debug!(eval = evals, energy, "energy evaluation");
            if let Some(cb) = callback.as_mut() {
                cb(evals, params, energy);
            }
            Ok(energy)
        };
        let result = self.optimizer.minimize(&mut objective, &initial_point, &bounds)?;

        let bindings = self.ansatz.bind(&result.x)?;
        let aux_refs: Vec<&Hamiltonian> = self.aux_operators.iter().collect();
        let aux_values = if aux_refs.is_empty() {
            vec![]
        } else {
            backend.evaluate(circuit, &bindings, &aux_refs)?
        };
        let state = backend.statevector(circuit, &bindings)?;
        let eigenstate = dominant_states(&state.probabilities(), state.num_qubits(), EIGENSTATE_ENTRIES);

        let elapsed = start.elapsed();
        info!(
            eigenvalue = result.fun,
            evals = result.nfev,
            iterations = result.nit,
            converged = result.converged,
            elapsed_ms = elapsed.as_millis() as u64,
            "VQE finished"
        );
        Ok(VqeResult {
            eigenvalue: result.fun,
            optimal_point: result.x,
            optimizer_evals: result.nfev,
            optimizer_iterations: result.nit,
            converged: result.converged,
            aux_values,
            eigenstate,
            energy_history: result.history,
            optimizer: self.optimizer.name().to_string(),
            backend: backend.name().to_string(),
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_states_order() {
        let top = dominant_states(&[0.1, 0.6, 0.0, 0.3], 2, 2);
        assert_eq!(top[0].bitstring, "01");
        assert_eq!(top[1].bitstring, "11");
        assert_eq!(top.len(), 2);
    }
}

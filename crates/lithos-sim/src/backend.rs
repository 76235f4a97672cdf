//! Execution backends.
//!
//! A [`Backend`] evaluates expectation values of Hamiltonians on the state
//! prepared by a parameterized circuit:
//!
//! | Backend | Name | Estimator |
//! |---------|------|-----------|
//! | [`StatevectorSimulator`] | `statevector_simulator` | exact `⟨ψ|H|ψ⟩` |
//! | [`QasmSimulator`] | `qasm_simulator` | per-term shot sampling |
//!
//! Both simulate the circuit densely; the QASM simulator additionally draws
//! `shots` ±1 outcomes per Pauli term from the exact outcome distribution.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use lithos_ir::{Circuit, ParameterBindings};

use crate::error::{SimError, SimResult};
use crate::hamiltonian::Hamiltonian;
use crate::statevector::Statevector;

/// Name of the exact statevector backend.
pub const STATEVECTOR_SIMULATOR: &str = "statevector_simulator";
/// Name of the sampling backend.
pub const QASM_SIMULATOR: &str = "qasm_simulator";

/// Something that can estimate `⟨ψ(θ)|H|ψ(θ)⟩`.
pub trait Backend: Send + Sync {
    /// Registered name.
    fn name(&self) -> &str;

    /// Shot count, or `None` for exact backends.
    fn shots(&self) -> Option<usize> {
        None
    }

    /// Prepare the state once and evaluate every operator on it.
    fn evaluate(
        &self,
        circuit: &Circuit,
        bindings: &ParameterBindings,
        operators: &[&Hamiltonian],
    ) -> SimResult<Vec<f64>>;

    /// Single-operator convenience wrapper around [`Backend::evaluate`].
    fn expectation(
        &self,
        circuit: &Circuit,
        bindings: &ParameterBindings,
        operator: &Hamiltonian,
    ) -> SimResult<f64> {
        let values = self.evaluate(circuit, bindings, &[operator])?;
        Ok(values.first().copied().unwrap_or_default())
    }

    /// The noiseless final state (both simulators are dense).
    fn statevector(
        &self,
        circuit: &Circuit,
        bindings: &ParameterBindings,
    ) -> SimResult<Statevector> {
        Statevector::run(circuit, bindings)
    }
}

/// Exact expectation values from the final statevector.
#[derive(Debug, Clone, Default)]
pub struct StatevectorSimulator;

impl StatevectorSimulator {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }
}

impl Backend for StatevectorSimulator {
    fn name(&self) -> &str {
        STATEVECTOR_SIMULATOR
    }

    fn evaluate(
        &self,
        circuit: &Circuit,
        bindings: &ParameterBindings,
        operators: &[&Hamiltonian],
    ) -> SimResult<Vec<f64>> {
        let state = Statevector::run(circuit, bindings)?;
        operators
            .iter()
            .map(|op| state.expectation_hamiltonian(op))
            .collect()
    }
}

/// Shot-sampled expectation values.
///
/// Each non-identity term `c_k P_k` is estimated from `shots` Bernoulli draws
/// with `p(+1) = (1 + ⟨P_k⟩) / 2`; the identity term is added exactly.
#[derive(Debug)]
pub struct QasmSimulator {
    shots: usize,
    seed: Option<u64>,
    rng: Mutex<StdRng>,
}

impl QasmSimulator {
    /// Create a sampler with `shots` shots per term.
    pub fn new(shots: usize) -> SimResult<Self> {
        if shots == 0 {
            return Err(SimError::InvalidShots(shots));
        }
        Ok(Self {
            shots,
            seed: None,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Make sampling reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Seed, if one was set.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn sample(
        &self,
        state: &Statevector,
        operator: &Hamiltonian,
        rng: &mut StdRng,
    ) -> SimResult<f64> {
        let mut estimate = 0.0;
        for term in operator.terms() {
            if term.pauli.is_identity() {
                estimate += term.coeff;
                continue;
            }
            let exact = state.expectation(&term.pauli)?;
            let p_plus = ((1.0 + exact) / 2.0).clamp(0.0, 1.0);
            let plus = (0..self.shots).filter(|_| rng.gen_bool(p_plus)).count();
            let mean = (2.0 * plus as f64 - self.shots as f64) / self.shots as f64;
            trace!(term = %term.pauli, exact, mean, "sampled term");
            estimate += term.coeff * mean;
        }
        Ok(estimate)
    }
}

impl Backend for QasmSimulator {
    fn name(&self) -> &str {
        QASM_SIMULATOR
    }

    fn shots(&self) -> Option<usize> {
        Some(self.shots)
    }

    fn evaluate(
        &self,
        circuit: &Circuit,
        bindings: &ParameterBindings,
        operators: &[&Hamiltonian],
    ) -> SimResult<Vec<f64>> {
        let state = Statevector::run(circuit, bindings)?;
        // A poisoned lock only means another evaluation panicked mid-draw.
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        operators
            .iter()
            .map(|op| self.sample(&state, op, &mut rng))
            .collect()
    }
}

/// Look a backend up by its registered name.
pub fn backend_from_name(
    name: &str,
    shots: usize,
    seed: Option<u64>,
) -> SimResult<Box<dyn Backend>> {
    debug!(name, shots, ?seed, "creating backend");
    match name {
        STATEVECTOR_SIMULATOR => Ok(Box::new(StatevectorSimulator::new())),
        QASM_SIMULATOR => {
            let sim = QasmSimulator::new(shots)?;
            Ok(Box::new(match seed {
                Some(seed) => sim.with_seed(seed),
                None => sim,
            }))
        }
        other => Err(SimError::UnknownBackend(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::HamiltonianTerm;
    use approx::assert_abs_diff_eq;
    use lithos_ir::QubitId;

    fn plus_state() -> Circuit {
        let mut c = Circuit::new("plus", 1);
        c.h(QubitId(0)).unwrap();
        c
    }

    #[test]
    fn unknown_backend_name() {
        let err = backend_from_name("ibmq_foo", 1024, None).err().unwrap();
        assert!(matches!(err, SimError::UnknownBackend(_)));
    }

    #[test]
    fn zero_shots_rejected() {
        assert!(matches!(QasmSimulator::new(0), Err(SimError::InvalidShots(0))));
    }

    #[test]
    fn statevector_is_exact() {
        let h = Hamiltonian::from_terms(vec![
            HamiltonianTerm::identity(0.25),
            HamiltonianTerm::x(0, 2.0),
        ]);
        let b = backend_from_name(STATEVECTOR_SIMULATOR, 1, None).unwrap();
        let e = b.expectation(&plus_state(), &ParameterBindings::new(), &h).unwrap();
        assert_abs_diff_eq!(e, 2.25, epsilon = 1e-12);
        assert_eq!(b.shots(), None);
    }

    #[test]
    fn qasm_is_seeded_and_close() {
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]);
        let run = || {
            QasmSimulator::new(4000)
                .unwrap()
                .with_seed(11)
                .expectation(&plus_state(), &ParameterBindings::new(), &h)
                .unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a, b);
        assert!(a.abs() < 0.1);
    }

    #[test]
    fn qasm_deterministic_outcomes_are_exact() {
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::x(0, 1.0)]);
        let sim = QasmSimulator::new(100).unwrap().with_seed(3);
        let e = sim
            .expectation(&plus_state(), &ParameterBindings::new(), &h)
            .unwrap();
        assert_abs_diff_eq!(e, 1.0, epsilon = 1e-12);
    }
}

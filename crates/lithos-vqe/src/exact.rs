//! Exact ground state by dense diagonalisation.
//!
//! Real Hamiltonians (even number of Y factors per term) are diagonalised
//! directly. Otherwise `H = A + iB` is embedded as the real symmetric
//! matrix `[[A, -B], [B, A]]`, whose spectrum is that of `H` with every
//! eigenvalue doubled; an eigenvector `(u, w)` gives `ψ = u + iw`.

use nalgebra::DMatrix;
use num_complex::Complex64;
use serde::Serialize;
use tracing::info;

use lithos_sim::{Hamiltonian, Statevector};

use crate::error::{Result, VqeError};
use crate::vqe::{BasisProbability, dominant_states};

/// Widest operator accepted for dense diagonalisation.
pub const MAX_EXACT_QUBITS: u32 = 12;

/// Ground state of a qubit Hamiltonian.
#[derive(Debug, Clone, Serialize)]
pub struct ExactResult {
    /// Lowest eigenvalue.
    pub eigenvalue: f64,
    /// Auxiliary operator values in the ground state.
    pub aux_values: Vec<f64>,
    /// Most likely basis states of the ground state.
    pub eigenstate: Vec<BasisProbability>,
    /// Lowest eigenvalues, ascending.
    pub spectrum: Vec<f64>,
}

/// NumPy-style minimum eigensolver.
#[derive(Debug, Clone)]
pub struct ExactEigensolver {
    hamiltonian: Hamiltonian,
    aux_operators: Vec<Hamiltonian>,
    k: usize,
}

impl ExactEigensolver {
    /// Create a solver for `hamiltonian`.
    pub fn new(hamiltonian: Hamiltonian) -> Self {
        Self {
            hamiltonian,
            aux_operators: vec![],
            k: 1,
        }
    }

    /// Operators to evaluate in the ground state.
    #[must_use]
    pub fn with_aux_operators(mut self, operators: Vec<Hamiltonian>) -> Self {
        self.aux_operators = operators;
        self
    }

    /// Number of lowest eigenvalues to report.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k.max(1);
        self
    }

    /// Diagonalise.
    pub fn run(&self) -> Result<ExactResult> {
        let n = self.hamiltonian.num_qubits();
        if n > MAX_EXACT_QUBITS {
            return Err(VqeError::TooLargeForExact {
                num_qubits: n,
                max: MAX_EXACT_QUBITS,
            });
        }
        let dim = 1usize << n;
        let dense = self.hamiltonian.to_dense()?;
        let real = self.hamiltonian.is_real();

        let (spectrum, ground) = if real {
            let matrix = DMatrix::from_row_iterator(dim, dim, dense.iter().map(|z| z.re));
            let eigen = matrix.symmetric_eigen();
            let order = ascending(eigen.eigenvalues.as_slice());
            let spectrum: Vec<f64> = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
            let column = eigen.eigenvectors.column(order[0]);
            let ground: Vec<Complex64> = column.iter().map(|&v| Complex64::new(v, 0.0)).collect();
            (spectrum, ground)
        } else {
            let matrix = DMatrix::from_fn(2 * dim, 2 * dim, |r, c| {
                let z = dense[(r % dim) * dim + (c % dim)];
                match (r < dim, c < dim) {
                    (true, true) | (false, false) => z.re,
                    (true, false) => -z.im,
                    (false, true) => z.im,
                }
            });
            let eigen = matrix.symmetric_eigen();
            let order = ascending(eigen.eigenvalues.as_slice());
            let spectrum: Vec<f64> = order
                .iter()
                .step_by(2)
                .map(|&i| eigen.eigenvalues[i])
                .collect();
            let column = eigen.eigenvectors.column(order[0]);
            let ground: Vec<Complex64> = (0..dim)
                .map(|i| Complex64::new(column[i], column[i + dim]))
                .collect();
            (spectrum, ground)
        };

        let norm = ground.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        let state = Statevector::from_amplitudes(ground.into_iter().map(|a| a / norm).collect())?;
        let aux_values = self
            .aux_operators
            .iter()
            .map(|op| state.expectation_hamiltonian(op))
            .collect::<std::result::Result<Vec<f64>, _>>()?;
        let eigenvalue = spectrum[0];
        info!(eigenvalue, num_qubits = n, real, "exact diagonalisation done");

        Ok(ExactResult {
            eigenvalue,
            aux_values,
            eigenstate: dominant_states(&state.probabilities(), n as usize, 8),
            spectrum: spectrum.into_iter().take(self.k).collect(),
        })
    }
}

fn ascending(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lithos_sim::{HamiltonianTerm, PauliString};

    #[test]
    fn single_qubit_field() {
        // -Z + 0.5 X has eigenvalues ±sqrt(1.25).
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, -1.0), HamiltonianTerm::x(0, 0.5)]);
        let result = ExactEigensolver::new(h).with_k(2).run().unwrap();
        assert_abs_diff_eq!(result.eigenvalue, -(1.25f64).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(result.spectrum[1], (1.25f64).sqrt(), epsilon = 1e-12);
        assert_eq!(result.eigenstate[0].bitstring, "0");
    }

    #[test]
    fn complex_path_matches_spectrum() {
        // Y has eigenvalues ±1 with complex eigenvectors.
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::new(
            1.0,
            PauliString::from_label("Y").unwrap(),
        )]);
        assert!(!h.is_real());
        let aux = Hamiltonian::from_terms(vec![HamiltonianTerm::new(
            1.0,
            PauliString::from_label("Y").unwrap(),
        )]);
        let result = ExactEigensolver::new(h).with_aux_operators(vec![aux]).run().unwrap();
        assert_abs_diff_eq!(result.eigenvalue, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.aux_values[0], -1.0, epsilon = 1e-10);
    }

    #[test]
    fn refuses_wide_operators() {
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(20, 1.0)]);
        assert!(matches!(
            ExactEigensolver::new(h).run(),
            Err(VqeError::TooLargeForExact { num_qubits: 21, .. })
        ));
    }
}

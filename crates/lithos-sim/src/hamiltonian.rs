//! Hamiltonian data structures.
//!
//! A Hamiltonian is a sum of weighted Pauli strings:
//!
//!   H = Σ_k  c_k · P_k
//!
//! where each P_k is a tensor product of single-qubit Pauli operators
//! (I, X, Y, Z) and c_k ∈ ℝ.
//!
//! # Example
//!
//! ```rust
//! use lithos_sim::hamiltonian::{Hamiltonian, HamiltonianTerm};
//!
//! // H = -1.0·Z₀Z₁  +  0.5·X₀
//! let h = Hamiltonian::from_terms(vec![
//!     HamiltonianTerm::zz(0, 1, -1.0),
//!     HamiltonianTerm::x(0, 0.5),
//! ]);
//! assert_eq!(h.n_terms(), 2);
//! assert_eq!(h.num_qubits(), 2);
//! assert_eq!(h.to_string(), "Representation: paulis, qubits: 2, size: 2");
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SimError, SimResult};
use crate::pauli::{PauliOp, PauliString, PauliSum};

/// Imaginary parts below this are treated as round-off when converting a
/// [`PauliSum`] into a Hamiltonian.
pub const HERMITIAN_TOL: f64 = 1e-8;

/// A single weighted Pauli term: `coeff · pauli`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianTerm {
    /// Real coefficient.
    pub coeff: f64,
    /// The Pauli string.
    pub pauli: PauliString,
}

impl HamiltonianTerm {
    /// Create a new term.
    pub fn new(coeff: f64, pauli: PauliString) -> Self {
        Self { coeff, pauli }
    }

    /// Shorthand: constant term.
    pub fn identity(coeff: f64) -> Self {
        Self::new(coeff, PauliString::identity())
    }

    /// Shorthand: single-qubit Z term.
    pub fn z(qubit: u32, coeff: f64) -> Self {
        Self::new(coeff, PauliString::from_ops([(qubit, PauliOp::Z)]))
    }

    /// Shorthand: ZZ coupling term.
    pub fn zz(q0: u32, q1: u32, coeff: f64) -> Self {
        Self::new(
            coeff,
            PauliString::from_ops([(q0, PauliOp::Z), (q1, PauliOp::Z)]),
        )
    }

    /// Shorthand: single-qubit X term.
    pub fn x(qubit: u32, coeff: f64) -> Self {
        Self::new(coeff, PauliString::from_ops([(qubit, PauliOp::X)]))
    }
}

/// A sum-of-Pauli-strings Hamiltonian on a fixed number of qubits.
///
/// H = Σ_k  c_k · P_k
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hamiltonian {
    num_qubits: u32,
    terms: Vec<HamiltonianTerm>,
}

impl Hamiltonian {
    /// Create from a list of terms; the width is the smallest register that
    /// holds every term.
    pub fn from_terms(terms: Vec<HamiltonianTerm>) -> Self {
        let num_qubits = terms
            .iter()
            .filter_map(|t| t.pauli.max_qubit())
            .max()
            .map_or(0, |q| q + 1);
        Self { num_qubits, terms }
    }

    /// Widen (never narrow) the register.
    #[must_use]
    pub fn with_num_qubits(mut self, num_qubits: u32) -> Self {
        self.num_qubits = self.num_qubits.max(num_qubits);
        self
    }

    /// Convert a complex Pauli sum into a Hamiltonian on `num_qubits` qubits.
    ///
    /// Terms are sorted by Pauli string and terms with magnitude at or
    /// below `drop_tol` are dropped. Fails if any remaining coefficient
    /// has an imaginary part above [`HERMITIAN_TOL`].
    pub fn from_pauli_sum(sum: &PauliSum, num_qubits: u32, drop_tol: f64) -> SimResult<Self> {
        let mut terms = Vec::with_capacity(sum.len());
        for (pauli, coeff) in sum.sorted_terms() {
            if coeff.norm() <= drop_tol {
                continue;
            }
            if coeff.im.abs() > HERMITIAN_TOL {
                return Err(SimError::NonHermitian {
                    term: pauli.to_string(),
                    imag: coeff.im,
                });
            }
            if let Some(q) = pauli.max_qubit() {
                if q >= num_qubits {
                    return Err(SimError::QubitOutOfRange {
                        qubit: q,
                        n_qubits: num_qubits,
                    });
                }
            }
            terms.push(HamiltonianTerm::new(coeff.re, pauli));
        }
        Ok(Self { num_qubits, terms })
    }

    /// Back to the complex representation.
    pub fn to_pauli_sum(&self) -> PauliSum {
        self.terms
            .iter()
            .map(|t| (t.pauli.clone(), Complex64::new(t.coeff, 0.0)))
            .collect()
    }

    /// All terms.
    pub fn terms(&self) -> &[HamiltonianTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Spectral norm upper bound: Σ |c_k|.
    pub fn lambda(&self) -> f64 {
        self.terms.iter().map(|t| t.coeff.abs()).sum()
    }

    /// Coefficient of the identity string.
    pub fn identity_coefficient(&self) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.pauli.is_identity())
            .map(|t| t.coeff)
            .sum()
    }

    /// True if every term has an even number of Y factors, i.e. the matrix
    /// in the computational basis is real.
    pub fn is_real(&self) -> bool {
        self.terms.iter().all(|t| {
            t.pauli
                .ops()
                .iter()
                .filter(|(_, op)| *op == PauliOp::Y)
                .count()
                % 2
                == 0
        })
    }

    /// Dense row-major matrix, `2^n × 2^n`.
    pub fn to_dense(&self) -> SimResult<Vec<Complex64>> {
        if self.num_qubits as usize > crate::statevector::MAX_QUBITS {
            return Err(SimError::TooManyQubits {
                requested: self.num_qubits,
                max: crate::statevector::MAX_QUBITS as u32,
            });
        }
        let dim = 1usize << self.num_qubits;
        let mut matrix = vec![Complex64::new(0.0, 0.0); dim * dim];
        for term in &self.terms {
            let (x, z) = term.pauli.masks();
            let (x, z) = (x as usize, z as usize);
            for col in 0..dim {
                let row = col ^ x;
                let phase = crate::statevector::pauli_phase(col, x, z);
                matrix[row * dim + col] += phase * term.coeff;
            }
        }
        Ok(matrix)
    }
}

impl FromIterator<HamiltonianTerm> for Hamiltonian {
    fn from_iter<T: IntoIterator<Item = HamiltonianTerm>>(iter: T) -> Self {
        Self::from_terms(iter.into_iter().collect())
    }
}

impl fmt::Display for Hamiltonian {
    /// `{}` prints the summary line; `{:#}` adds one line per term.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Representation: paulis, qubits: {}, size: {}",
            self.num_qubits,
            self.terms.len()
        )?;
        if f.alternate() {
            for term in &self.terms {
                write!(
                    f,
                    "\n{}\t({:+.12})",
                    term.pauli.to_label(self.num_qubits),
                    term.coeff
                )?;
            }
        }
        Ok(())
    }
}

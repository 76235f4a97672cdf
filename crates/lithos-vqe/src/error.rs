//! Error types for the variational layer.

use thiserror::Error;

use lithos_chem::ChemError;
use lithos_ir::IrError;
use lithos_sim::SimError;

/// Errors produced while building ansätze and running eigensolvers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VqeError {
    /// Ansatz and Hamiltonian act on different registers.
    #[error("ansatz acts on {ansatz} qubits but the Hamiltonian on {hamiltonian}")]
    WidthMismatch {
        /// Ansatz width.
        ansatz: u32,
        /// Hamiltonian width.
        hamiltonian: u32,
    },

    /// A parameter vector has the wrong length.
    #[error("expected {expected} parameters, got {got}")]
    ParameterCount {
        /// Parameters of the ansatz.
        expected: usize,
        /// Parameters supplied.
        got: usize,
    },

    /// More electrons than orbitals of one spin.
    #[error("{particles} particles do not fit into {orbitals} spin orbitals of one spin")]
    TooManyParticles {
        /// Particles of that spin.
        particles: usize,
        /// Spatial orbitals available.
        orbitals: usize,
    },

    /// An active-space index does not name an occupied/unoccupied orbital.
    #[error("active {kind} orbital {index} out of range (have {available})")]
    ActiveSpace {
        /// "occupied" or "unoccupied".
        kind: &'static str,
        /// Requested index.
        index: usize,
        /// Orbitals of that kind.
        available: usize,
    },

    /// Exact diagonalisation refused because the register is too wide.
    #[error("exact diagonalisation supports at most {max} qubits, operator has {num_qubits}")]
    TooLargeForExact {
        /// Operator width.
        num_qubits: u32,
        /// Supported width.
        max: u32,
    },

    /// The objective returned a non-finite value.
    #[error("objective is not finite at evaluation {0}")]
    NonFiniteObjective(usize),

    /// No optimizer is registered under this name.
    #[error("unknown optimizer '{0}' (expected slsqp, nelder_mead or spsa)")]
    UnknownOptimizer(String),

    /// Invalid optimizer or ansatz option.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Circuit builder error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] IrError),

    /// Simulation error.
    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    /// Chemistry or mapping error.
    #[error("Chemistry error: {0}")]
    Chem(#[from] ChemError),
}

/// Result type for the variational layer.
pub type Result<T, E = VqeError> = std::result::Result<T, E>;

//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced by Pauli algebra, synthesis and simulation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// A Pauli string references a qubit index that is out of range.
    #[error("Pauli string references qubit {qubit} but the register only has {n_qubits} qubits")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Register width.
        n_qubits: u32,
    },

    /// A coefficient that must be real carries an imaginary part.
    #[error("operator is not Hermitian: term {term} has imaginary coefficient {imag:e}")]
    NonHermitian {
        /// The offending Pauli string.
        term: String,
        /// Its imaginary part.
        imag: f64,
    },

    /// Dense simulation requested on too wide a register.
    #[error("{requested} qubits requested, dense simulation supports at most {max}")]
    TooManyQubits {
        /// Requested width.
        requested: u32,
        /// Supported width.
        max: u32,
    },

    /// Operator and state widths disagree.
    #[error("operator acts on {operator} qubits but the state has {state}")]
    WidthMismatch {
        /// State width.
        state: u32,
        /// Operator width.
        operator: u32,
    },

    /// Malformed amplitude vector.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// No backend is registered under this name.
    #[error("unknown backend '{0}' (expected 'statevector_simulator' or 'qasm_simulator')")]
    UnknownBackend(String),

    /// Sampling backends need at least one shot.
    #[error("shots must be at least 1, got {0}")]
    InvalidShots(usize),

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] lithos_ir::IrError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

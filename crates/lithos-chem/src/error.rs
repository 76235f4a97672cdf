//! Error types for the chemistry crate.

use thiserror::Error;

/// Errors produced by the electronic-structure driver and the Hamiltonian
/// core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChemError {
    /// The atom specification could not be parsed.
    #[error("invalid atom specification '{input}': {reason}")]
    AtomParse {
        /// The offending fragment.
        input: String,
        /// What went wrong.
        reason: String,
    },

    /// Element symbol not present in the element table.
    #[error("unknown element symbol '{0}'")]
    UnknownElement(String),

    /// The basis set has no entry for this element.
    #[error("basis '{basis}' has no functions for element {element}")]
    UnsupportedElement {
        /// Basis name.
        basis: String,
        /// Element symbol.
        element: String,
    },

    /// Basis name not recognised.
    #[error("unknown basis set '{0}' (supported: sto3g)")]
    UnknownBasis(String),

    /// Unit name not recognised.
    #[error("unknown unit '{0}' (expected 'angstrom' or 'bohr')")]
    UnknownUnit(String),

    /// Charge and spin do not describe a valid electron configuration.
    #[error("{electrons} electrons cannot have spin 2S = {spin}")]
    InvalidSpin {
        /// Number of electrons.
        electrons: i64,
        /// Requested 2S.
        spin: i64,
    },

    /// More electrons of one spin than there are basis functions.
    #[error("{alpha} alpha / {beta} beta electrons do not fit in {orbitals} spatial orbitals")]
    TooManyElectrons {
        /// Alpha electrons.
        alpha: usize,
        /// Beta electrons.
        beta: usize,
        /// Number of basis functions.
        orbitals: usize,
    },

    /// RHF requested for an open-shell molecule.
    #[error("restricted Hartree-Fock requires a closed shell, got spin 2S = {0}")]
    OpenShellRhf(u32),

    /// The overlap matrix is (numerically) singular.
    #[error("basis is linearly dependent: smallest overlap eigenvalue {0:e}")]
    LinearDependence(f64),

    /// SCF ran out of cycles.
    #[error("SCF did not converge in {cycles} cycles (last energy {energy:.12} Ha, delta {delta:e})")]
    ScfNotConverged {
        /// Cycles performed.
        cycles: usize,
        /// Last electronic energy.
        energy: f64,
        /// Last energy change.
        delta: f64,
    },

    /// An orbital index in `orbital_reduction` is outside the MO range.
    #[error("orbital index {index} is out of range for {num_orbitals} molecular orbitals")]
    OrbitalOutOfRange {
        /// Requested index (possibly negative).
        index: i64,
        /// Number of spatial MOs.
        num_orbitals: usize,
    },

    /// Qubit mapping name not recognised.
    #[error("unknown qubit mapping '{0}' (expected jordan_wigner, parity or bravyi_kitaev)")]
    UnknownMapping(String),

    /// The operator does not commute with the parity symmetries used by the
    /// two-qubit reduction.
    #[error("two-qubit reduction failed: term {term} acts with X/Y on tapered qubit {qubit}")]
    NotTaperable {
        /// The offending Pauli string.
        term: String,
        /// Tapered qubit.
        qubit: u32,
    },

    /// Two-qubit reduction needs at least two qubits and an even register.
    #[error("two-qubit reduction needs an even register of at least 2 qubits, got {0}")]
    InvalidReductionWidth(u32),

    /// Error from the simulation layer.
    #[error("Simulation error: {0}")]
    Sim(#[from] lithos_sim::SimError),
}

/// Result type for chemistry operations.
pub type ChemResult<T> = Result<T, ChemError>;

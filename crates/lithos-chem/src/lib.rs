//! `lithos-chem`: electronic structure for small molecules and the
//! fermion-to-qubit layer on top of it.
//!
//! - [`molecule`] / [`basis`]: geometries and STO-3G contracted Gaussians.
//! - [`integrals`]: overlap, kinetic, nuclear, dipole and two-electron
//!   integrals (McMurchie–Davidson).
//! - [`scf`]: restricted and unrestricted Hartree–Fock with DIIS.
//! - [`driver`]: atom string in, [`QMolecule`] (MO-basis integrals) out.
//! - [`fermion`] / [`mapping`]: second-quantised operators and the
//!   Jordan–Wigner, parity and Bravyi–Kitaev encodings.
//! - [`hamiltonian`]: active-space reduction, qubit Hamiltonian and auxiliary
//!   observables; [`result`] assembles the final energies.
//!
//! # Quick start
//!
//! ```rust
//! use lithos_chem::{ChemDriver, CoreConfig, HamiltonianCore, Unit};
//!
//! let qmol = ChemDriver::new("H 0 0 0; H 0 0 0.735")
//!     .with_unit(Unit::Angstrom)
//!     .run()
//!     .unwrap();
//! assert_eq!(qmol.num_orbitals, 2);
//!
//! let mut core = HamiltonianCore::new(CoreConfig::default());
//! let (hamiltonian, aux) = core.run(&qmol).unwrap();
//! // Four spin orbitals, two tapered by the parity symmetries.
//! assert_eq!(hamiltonian.num_qubits(), 2);
//! assert_eq!(aux.len(), 6);
//! ```

pub mod basis;
pub mod driver;
pub mod error;
pub mod fermion;
pub mod hamiltonian;
pub mod integrals;
pub mod linalg;
pub mod mapping;
pub mod molecule;
pub mod result;
pub mod scf;

pub use basis::{BasisName, BasisSet};
pub use driver::{ChemDriver, QMolecule};
pub use error::{ChemError, ChemResult};
pub use fermion::FermionicOp;
pub use hamiltonian::{
    AuxOperator, AuxOperators, CoreConfig, HamiltonianCore, MoleculeInfo, Transformation,
};
pub use integrals::{AoIntegrals, Tensor4};
pub use mapping::{QubitMapping, map_fermionic, two_qubit_reduction};
pub use molecule::{Atom, Element, Molecule, Unit};
pub use result::{DipoleResult, GroundStateResult};
pub use scf::{HfMethod, ScfOptions, ScfResult, run_scf};

//! `lithos-vqe`: variational and exact ground-state solvers.
//!
//! - [`initial_state`]: the Hartree–Fock determinant on qubits.
//! - [`ansatz`] / [`uccsd`]: parameterized circuits, built once with
//!   symbolic angles.
//! - [`optimizers`]: SLSQP, Nelder–Mead and SPSA.
//! - [`vqe`]: the variational loop over any [`lithos_sim::Backend`].
//! - [`exact`]: dense diagonalisation for reference energies.
//!
//! # Example
//!
//! ```rust
//! use lithos_chem::{ChemDriver, CoreConfig, HamiltonianCore};
//! use lithos_sim::StatevectorSimulator;
//! use lithos_vqe::optimizers::Slsqp;
//! use lithos_vqe::{HartreeFock, Uccsd, UccsdOptions, Vqe};
//!
//! let qmol = ChemDriver::new("H 0 0 0; H 0 0 0.735").run().unwrap();
//! let mut core = HamiltonianCore::new(CoreConfig::default());
//! let (hamiltonian, _) = core.run(&qmol).unwrap();
//! let info = core.molecule_info().unwrap();
//!
//! let hf = HartreeFock::from_molecule_info(info).unwrap();
//! let ansatz = Uccsd::new(&hf, UccsdOptions::default()).unwrap();
//! let mut vqe = Vqe::new(hamiltonian, Box::new(ansatz), Box::new(Slsqp::default()));
//! let result = vqe.run(&StatevectorSimulator::new()).unwrap();
//!
//! let energy = core.process_algorithm_result(result.eigenvalue, &[]).energy();
//! assert!((energy - (-1.137)).abs() < 1e-3);
//! ```

pub mod ansatz;
pub mod error;
pub mod exact;
pub mod initial_state;
pub mod optimizers;
pub mod uccsd;
pub mod vqe;

pub use ansatz::{Ansatz, TwoLocal};
pub use error::{Result, VqeError};
pub use exact::{ExactEigensolver, ExactResult};
pub use initial_state::HartreeFock;
pub use optimizers::{NelderMead, OptimizationResult, Optimizer, Slsqp, Spsa, optimizer_from_name};
pub use uccsd::{Excitation, Uccsd, UccsdOptions};
pub use vqe::{BasisProbability, Vqe, VqeResult};

//! `lithos-sim`: Pauli operators, dense simulation and circuit synthesis.
//!
//! - [`pauli`]: Pauli strings and complex-weighted Pauli sums with exact
//!   phase tracking, the target algebra of every fermion-to-qubit mapping.
//! - [`hamiltonian`]: real-weighted qubit Hamiltonians.
//! - [`statevector`]: a dense statevector engine with gate kernels and
//!   Pauli expectation values.
//! - [`synthesis`]: `exp(-i θ/2 P)` as CX ladders and `Rz`.
//! - [`backend`]: exact and shot-sampling expectation backends.
//!
//! # Quick start
//!
//! ```rust
//! use lithos_ir::{Circuit, ParameterBindings, ParameterExpression};
//! use lithos_sim::{Backend, Hamiltonian, HamiltonianTerm, PauliString};
//! use lithos_sim::backend::StatevectorSimulator;
//! use lithos_sim::synthesis::append_pauli_rotation;
//!
//! // exp(-i θ/2 · X₀) on |0⟩ with θ = π gives |1⟩, so ⟨Z₀⟩ = -1.
//! let mut circuit = Circuit::new("rot", 1);
//! let x = PauliString::from_label("X").unwrap();
//! append_pauli_rotation(&mut circuit, &x, ParameterExpression::symbol("t")).unwrap();
//!
//! let mut bindings = ParameterBindings::new();
//! bindings.insert("t", std::f64::consts::PI);
//!
//! let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]);
//! let e = StatevectorSimulator::new()
//!     .expectation(&circuit, &bindings, &h)
//!     .unwrap();
//! assert!((e + 1.0).abs() < 1e-12);
//! ```

pub mod backend;
pub mod error;
pub mod hamiltonian;
pub mod pauli;
pub mod statevector;
pub mod synthesis;

pub use backend::{Backend, QasmSimulator, StatevectorSimulator, backend_from_name};
pub use error::{SimError, SimResult};
pub use hamiltonian::{Hamiltonian, HamiltonianTerm};
pub use pauli::{PauliOp, PauliString, PauliSum};
pub use statevector::Statevector;

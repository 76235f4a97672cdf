//! Lithos circuit intermediate representation
//!
//! The circuits built by the variational stack are flat gate lists over a
//! fixed qubit register. Rotation angles are [`ParameterExpression`]s so a
//! single ansatz circuit can be evaluated for many parameter vectors
//! without being rebuilt: the simulator resolves symbols against a
//! [`ParameterBindings`] table at execution time.
//!
//! # Example
//!
//! ```rust
//! use lithos_ir::{Circuit, ParameterBindings, ParameterExpression, QubitId};
//!
//! let mut circuit = Circuit::new("trial", 2);
//! circuit.x(QubitId(0)).unwrap();
//! circuit.ry(ParameterExpression::symbol("t0"), QubitId(1)).unwrap();
//! circuit.cx(QubitId(1), QubitId(0)).unwrap();
//!
//! assert_eq!(circuit.parameters(), vec!["t0".to_string()]);
//!
//! let bindings = ParameterBindings::from_values(&circuit.parameters(), &[0.25]).unwrap();
//! assert_eq!(bindings.get("t0"), Some(0.25));
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `Sdg` | 1 | S and S-dagger gates |
//! | `Rx`, `Ry`, `Rz` | 1 | Rotation gates |
//! | `CX`, `CZ` | 2 | Controlled-X and controlled-Z |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::Instruction;
pub use parameter::{ParameterBindings, ParameterExpression};
pub use qubit::QubitId;

//! Parameterized circuits for variational algorithms.
//!
//! An ansatz owns one symbolic [`Circuit`]; evaluating it at a parameter
//! vector only builds a [`ParameterBindings`] table, so the circuit is
//! never rebuilt inside the optimisation loop.

use std::f64::consts::PI;

use lithos_ir::{Circuit, ParameterBindings, ParameterExpression, QubitId};

use crate::error::{Result, VqeError};

/// `θ[k]`, the name of the k-th variational parameter.
pub fn parameter_name(k: usize) -> String {
    format!("θ[{k}]")
}

/// A variational form.
pub trait Ansatz: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &str;

    /// Register width.
    fn num_qubits(&self) -> u32;

    /// Parameter names in vector order.
    fn parameter_names(&self) -> &[String];

    /// The symbolic circuit.
    fn circuit(&self) -> &Circuit;

    /// Number of parameters.
    fn num_parameters(&self) -> usize {
        self.parameter_names().len()
    }

    /// Box constraints, `(-π, π)` per parameter by default.
    fn parameter_bounds(&self) -> Vec<(f64, f64)> {
        vec![(-PI, PI); self.num_parameters()]
    }

    /// Starting point when none is given.
    fn preferred_initial_point(&self) -> Vec<f64> {
        vec![0.0; self.num_parameters()]
    }

    /// Bind a parameter vector.
    fn bind(&self, values: &[f64]) -> Result<ParameterBindings> {
        if values.len() != self.num_parameters() {
            return Err(VqeError::ParameterCount {
                expected: self.num_parameters(),
                got: values.len(),
            });
        }
        Ok(ParameterBindings::from_values(self.parameter_names(), values)?)
    }
}

/// Layers of `Ry` rotations separated by a linear chain of CZ gates.
///
/// `num_qubits * (reps + 1)` parameters. An optional prefix circuit (an
/// initial state) is applied first.
#[derive(Debug, Clone)]
pub struct TwoLocal {
    num_qubits: u32,
    reps: usize,
    names: Vec<String>,
    circuit: Circuit,
}

impl TwoLocal {
    /// Build the ansatz on `num_qubits` qubits.
    pub fn new(num_qubits: u32, reps: usize, initial_state: Option<&Circuit>) -> Result<Self> {
        let mut circuit = Circuit::new("two_local", num_qubits);
        if let Some(prefix) = initial_state {
            circuit.compose(prefix)?;
        }

        let mut names = Vec::with_capacity(num_qubits as usize * (reps + 1));
        let rotation_layer = |circuit: &mut Circuit, names: &mut Vec<String>| -> Result<()> {
            for q in 0..num_qubits {
                let name = parameter_name(names.len());
                circuit.ry(ParameterExpression::symbol(name.as_str()), QubitId(q))?;
                names.push(name);
            }
            Ok(())
        };

        rotation_layer(&mut circuit, &mut names)?;
        for _ in 0..reps {
            for q in 1..num_qubits {
                circuit.cz(QubitId(q - 1), QubitId(q))?;
            }
            rotation_layer(&mut circuit, &mut names)?;
        }

        Ok(Self {
            num_qubits,
            reps,
            names,
            circuit,
        })
    }

    /// Entangling layers.
    pub fn reps(&self) -> usize {
        self.reps
    }
}

impl Ansatz for TwoLocal {
    fn name(&self) -> &str {
        "two_local"
    }

    fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    fn parameter_names(&self) -> &[String] {
        &self.names
    }

    fn circuit(&self) -> &Circuit {
        &self.circuit
    }
}

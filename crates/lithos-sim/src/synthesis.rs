//! Pauli-string rotation synthesis.
//!
//! Implements the standard gate decomposition of
//!
//!   exp(-i θ/2 · P)
//!
//! where P is a tensor product of Pauli operators, using the identity
//!
//!   exp(-i θ/2 · Z⊗Z⊗...⊗Z) = CNOT_ladder · Rz(θ) · CNOT_ladder†
//!
//! with basis rotations applied before and after for X and Y factors:
//!   X → H · Z · H
//!   Y → Sdg · H · Z · H · S
//!   Z → identity
//!
//! The angle is a [`ParameterExpression`], so ansatz circuits are built once
//! and re-bound for every optimizer step.
//!
//! Gate count per string: 2·(k-1) CX + up to 4·k basis gates + 1 Rz,
//! where k = number of non-identity qubits.

use lithos_ir::{Circuit, ParameterExpression, QubitId};

use crate::error::{SimError, SimResult};
use crate::pauli::{PauliOp, PauliString};

/// Append the circuit for `exp(-i · angle/2 · P)` to `circuit`.
///
/// The identity string is a global phase and appends nothing.
pub fn append_pauli_rotation(
    circuit: &mut Circuit,
    pauli: &PauliString,
    angle: impl Into<ParameterExpression>,
) -> SimResult<()> {
    let ops = pauli.ops();
    let Some(&(last, _)) = ops.last() else {
        return Ok(());
    };

    let n_qubits = circuit.num_qubits();
    if last >= n_qubits {
        return Err(SimError::QubitOutOfRange {
            qubit: last,
            n_qubits,
        });
    }

    basis_change(circuit, ops, false)?;

    let qubits: Vec<u32> = ops.iter().map(|(q, _)| *q).collect();
    cnot_ladder(circuit, &qubits)?;

    circuit.rz(angle, QubitId(last))?;

    cnot_ladder_reverse(circuit, &qubits)?;
    basis_change(circuit, ops, true)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Forward pass (`undo = false`): X → H, Y → Sdg · H.
/// Reverse pass (`undo = true`): X → H, Y → H · S.
fn basis_change(circuit: &mut Circuit, ops: &[(u32, PauliOp)], undo: bool) -> SimResult<()> {
    for &(q, op) in ops {
        let qid = QubitId(q);
        match (op, undo) {
            (PauliOp::X, _) => {
                circuit.h(qid)?;
            }
            (PauliOp::Y, false) => {
                circuit.sdg(qid)?;
                circuit.h(qid)?;
            }
            (PauliOp::Y, true) => {
                circuit.h(qid)?;
                circuit.s(qid)?;
            }
            (PauliOp::Z | PauliOp::I, _) => {}
        }
    }
    Ok(())
}

/// CX(q[0],q[1]), CX(q[1],q[2]), …: collects the parity on the last qubit.
fn cnot_ladder(circuit: &mut Circuit, qubits: &[u32]) -> SimResult<()> {
    for window in qubits.windows(2) {
        circuit.cx(QubitId(window[0]), QubitId(window[1]))?;
    }
    Ok(())
}

fn cnot_ladder_reverse(circuit: &mut Circuit, qubits: &[u32]) -> SimResult<()> {
    for window in qubits.windows(2).rev() {
        circuit.cx(QubitId(window[0]), QubitId(window[1]))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_appends_nothing() {
        let mut c = Circuit::new("id", 2);
        append_pauli_rotation(&mut c, &PauliString::identity(), 0.3).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn gate_count_for_xyz() {
        let mut c = Circuit::new("xyz", 3);
        let p = PauliString::from_label("ZYX").unwrap();
        append_pauli_rotation(&mut c, &p, ParameterExpression::symbol("t")).unwrap();
        let counts = c.gate_counts();
        assert_eq!(counts.get("cx"), Some(&4));
        assert_eq!(counts.get("rz"), Some(&1));
        assert_eq!(counts.get("h"), Some(&4));
        assert_eq!(counts.get("sdg"), Some(&1));
        assert_eq!(counts.get("s"), Some(&1));
        assert_eq!(c.parameters(), vec!["t".to_string()]);
    }

    #[test]
    fn out_of_range_string_is_rejected() {
        let mut c = Circuit::new("small", 2);
        let p = PauliString::from_label("ZII").unwrap();
        let err = append_pauli_rotation(&mut c, &p, 0.1).unwrap_err();
        assert!(matches!(err, SimError::QubitOutOfRange { qubit: 2, n_qubits: 2 }));
    }
}

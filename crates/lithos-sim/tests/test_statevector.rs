//! Property tests tying the Pauli algebra, the statevector engine and the
//! rotation synthesis together.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use lithos_ir::{Circuit, ParameterBindings, ParameterExpression, QubitId};
use lithos_sim::pauli::{PauliOp, PauliString, i_pow};
use lithos_sim::statevector::Statevector;
use lithos_sim::synthesis::append_pauli_rotation;

const N: u32 = 4;

fn pauli_strategy() -> impl Strategy<Value = PauliString> {
    prop::collection::vec(0u8..4, N as usize).prop_map(|ops| {
        PauliString::from_ops(ops.into_iter().enumerate().map(|(q, k)| {
            let op = match k {
                0 => PauliOp::I,
                1 => PauliOp::X,
                2 => PauliOp::Y,
                _ => PauliOp::Z,
            };
            (q as u32, op)
        }))
    })
}

/// A fixed entangled state with no special symmetry.
fn probe_state() -> Statevector {
    let mut c = Circuit::new("probe", N);
    for q in 0..N {
        c.ry(0.3 + 0.4 * f64::from(q), QubitId(q)).unwrap();
        c.rz(0.7 - 0.2 * f64::from(q), QubitId(q)).unwrap();
    }
    for q in 0..N - 1 {
        c.cx(QubitId(q), QubitId(q + 1)).unwrap();
    }
    c.rx(0.9, QubitId(0)).unwrap();
    Statevector::run(&c, &ParameterBindings::new()).unwrap()
}

proptest! {
    #[test]
    fn product_matches_sequential_application(a in pauli_strategy(), b in pauli_strategy()) {
        let psi = probe_state();
        let sequential = psi.apply_pauli(&b).unwrap();
        let sequential = sequential.apply_pauli(&a).unwrap();

        let (phase, ab) = a.mul(&b);
        let direct = psi.apply_pauli(&ab).unwrap();
        let factor = i_pow(phase);
        for (s, d) in sequential.amplitudes().iter().zip(direct.amplitudes()) {
            let d = factor * d;
            prop_assert!((s - d).norm() < 1e-12);
        }
    }

    #[test]
    fn commutation_matches_product_symmetry(a in pauli_strategy(), b in pauli_strategy()) {
        let (p_ab, s_ab) = a.mul(&b);
        let (p_ba, s_ba) = b.mul(&a);
        prop_assert_eq!(s_ab, s_ba);
        prop_assert_eq!(a.commutes_with(&b), p_ab == p_ba);
    }

    #[test]
    fn expectation_is_bounded(p in pauli_strategy()) {
        let e = probe_state().expectation(&p).unwrap();
        prop_assert!(e.abs() <= 1.0 + 1e-12);
    }

    #[test]
    fn synthesized_rotation_matches_direct(p in pauli_strategy(), theta in -3.0f64..3.0) {
        let mut prep = Circuit::new("probe", N);
        for q in 0..N {
            prep.ry(0.3 + 0.4 * f64::from(q), QubitId(q)).unwrap();
            prep.rz(0.7 - 0.2 * f64::from(q), QubitId(q)).unwrap();
        }
        for q in 0..N - 1 {
            prep.cx(QubitId(q), QubitId(q + 1)).unwrap();
        }
        prep.rx(0.9, QubitId(0)).unwrap();
        let mut circuit = prep.clone();
        append_pauli_rotation(&mut circuit, &p, ParameterExpression::symbol("t")).unwrap();

        let mut bindings = ParameterBindings::new();
        bindings.insert("t", theta);
        let by_circuit = Statevector::run(&circuit, &bindings).unwrap();

        let mut direct = Statevector::run(&prep, &ParameterBindings::new()).unwrap();
        direct.apply_pauli_rotation(&p, theta).unwrap();

        // Identical up to global phase (identity strings pick one up).
        let overlap = by_circuit.inner(&direct).unwrap();
        prop_assert!((overlap.norm() - 1.0).abs() < 1e-10);
        if !p.is_identity() {
            prop_assert!((overlap.re - 1.0).abs() < 1e-10);
        }
    }
}

#[test]
fn norm_is_preserved_by_rotations() {
    let mut psi = probe_state();
    let p = PauliString::from_label("XYZI").unwrap();
    psi.apply_pauli_rotation(&p, 1.234).unwrap();
    assert_abs_diff_eq!(psi.norm(), 1.0, epsilon = 1e-12);
}

#[test]
fn probe_state_is_normalized() {
    assert_abs_diff_eq!(probe_state().norm(), 1.0, epsilon = 1e-12);
}

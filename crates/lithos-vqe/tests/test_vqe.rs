//! End-to-end VQE tests against exact diagonalisation.

use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;

use lithos_chem::{ChemDriver, CoreConfig, HamiltonianCore, QubitMapping};
use lithos_sim::{Hamiltonian, HamiltonianTerm, QasmSimulator, StatevectorSimulator};
use lithos_vqe::{
    Ansatz, ExactEigensolver, HartreeFock, NelderMead, Slsqp, Spsa, TwoLocal, Uccsd, UccsdOptions,
    Vqe, VqeError,
};

const H2: &str = "H 0 0 0; H 0 0 0.735";
const LIH: &str = "H 0.0 0.0 0.0; Li 0.0 0.0 1.596";

fn build(atom: &str, mapping: QubitMapping, reduction: bool) -> (HamiltonianCore, Hamiltonian, Vec<Hamiltonian>) {
    let qmol = ChemDriver::new(atom).run().unwrap();
    let mut core = HamiltonianCore::new(CoreConfig {
        qubit_mapping: mapping,
        two_qubit_reduction: reduction,
        ..CoreConfig::default()
    });
    let (h, aux) = core.run(&qmol).unwrap();
    let aux: Vec<Hamiltonian> = aux.hamiltonians().into_iter().cloned().collect();
    (core, h, aux)
}

fn uccsd_for(core: &HamiltonianCore) -> Uccsd {
    let hf = HartreeFock::from_molecule_info(core.molecule_info().unwrap()).unwrap();
    Uccsd::new(&hf, UccsdOptions::default()).unwrap()
}

// ---------------------------------------------------------------------------
// H2
// ---------------------------------------------------------------------------

#[test]
fn h2_vqe_matches_exact_for_every_mapping() {
    for (mapping, reduction) in [
        (QubitMapping::Parity, true),
        (QubitMapping::Parity, false),
        (QubitMapping::JordanWigner, false),
        (QubitMapping::BravyiKitaev, false),
    ] {
        let (core, h, aux) = build(H2, mapping, reduction);
        let exact = ExactEigensolver::new(h.clone()).run().unwrap();
        let ansatz = uccsd_for(&core);
        let mut vqe = Vqe::new(h, Box::new(ansatz), Box::new(Slsqp::default())).with_aux_operators(aux);
        let result = vqe.run(&StatevectorSimulator::new()).unwrap();

        // UCCSD is exact for two electrons; the unreduced exact ground
        // state may sit in another particle sector, so compare energies
        // through the processed result.
        let processed = core.process_algorithm_result(result.eigenvalue, &result.aux_values);
        assert_abs_diff_eq!(processed.energy(), -1.137_28, epsilon = 1e-4);
        assert!(result.eigenvalue >= exact.eigenvalue - 1e-9, "{mapping}");
        assert_abs_diff_eq!(processed.num_particles.unwrap(), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(processed.s_squared.unwrap(), 0.0, epsilon = 1e-6);
        assert!(result.optimizer_evals > result.optimizer_iterations);
        assert_eq!(result.backend, "statevector_simulator");
    }
}

#[test]
fn h2_reduced_exact_reference() {
    let (core, h, aux) = build(H2, QubitMapping::Parity, true);
    let exact = ExactEigensolver::new(h).with_aux_operators(aux).run().unwrap();
    let processed = core.process_algorithm_result(exact.eigenvalue, &exact.aux_values);
    assert_abs_diff_eq!(processed.energy(), -1.137_28, epsilon = 1e-4);
    assert_abs_diff_eq!(processed.num_particles.unwrap(), 2.0, epsilon = 1e-8);
    let text = processed.to_string();
    assert!(text.contains("=== GROUND STATE ENERGY ==="));
    assert!(text.contains("=== DIPOLE MOMENT ==="));
}

#[test]
fn callback_sees_every_evaluation() {
    let (core, h, _) = build(H2, QubitMapping::Parity, true);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut vqe = Vqe::new(h, Box::new(uccsd_for(&core)), Box::new(Slsqp::default()))
        .with_callback(move |count, _, energy| sink.lock().unwrap().push((count, energy)));
    let result = vqe.run(&StatevectorSimulator::new()).unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), result.optimizer_evals);
    assert_eq!(seen.last().map(|s| s.0), Some(result.optimizer_evals));
}

#[test]
fn shot_sampling_backend_runs() {
    let (core, h, _) = build(H2, QubitMapping::Parity, true);
    let optimizer = Spsa::new().with_maxiter(20).with_seed(3);
    let backend = QasmSimulator::new(1024).unwrap().with_seed(5);
    let mut vqe = Vqe::new(h, Box::new(uccsd_for(&core)), Box::new(optimizer));
    let result = vqe.run(&backend).unwrap();
    assert_eq!(result.backend, "qasm_simulator");
    assert_eq!(result.optimizer_evals, 2 * 20 + 1);
    assert!(result.eigenvalue.is_finite());
}

// ---------------------------------------------------------------------------
// Generic ansätze and errors
// ---------------------------------------------------------------------------

#[test]
fn two_local_finds_field_ground_state() {
    // H = -Z0 - Z1 + 0.3 X0 has a real ground state near |00>.
    let h = Hamiltonian::from_terms(vec![
        HamiltonianTerm::z(0, -1.0),
        HamiltonianTerm::z(1, -1.0),
        HamiltonianTerm::x(0, 0.3),
    ]);
    let exact = ExactEigensolver::new(h.clone()).run().unwrap();
    let ansatz = TwoLocal::new(2, 1, None).unwrap();
    let start = vec![0.1; ansatz.num_parameters()];
    let mut vqe = Vqe::new(h, Box::new(ansatz), Box::new(NelderMead::new().with_tolerances(1e-8, 1e-10)))
        .with_initial_point(start);
    let result = vqe.run(&StatevectorSimulator::new()).unwrap();
    assert_abs_diff_eq!(result.eigenvalue, exact.eigenvalue, epsilon = 1e-4);
}

#[test]
fn width_and_parameter_errors() {
    let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(2, 1.0)]);
    let mut vqe = Vqe::new(h, Box::new(TwoLocal::new(2, 1, None).unwrap()), Box::new(Slsqp::default()));
    assert!(matches!(
        vqe.run(&StatevectorSimulator::new()),
        Err(VqeError::WidthMismatch { ansatz: 2, hamiltonian: 3 })
    ));

    let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(1, 1.0)]);
    let mut vqe = Vqe::new(h, Box::new(TwoLocal::new(2, 1, None).unwrap()), Box::new(Slsqp::default()))
        .with_initial_point(vec![0.0; 3]);
    assert!(matches!(
        vqe.run(&StatevectorSimulator::new()),
        Err(VqeError::ParameterCount { expected: 4, got: 3 })
    ));
}

// ---------------------------------------------------------------------------
// LiH (slow in debug builds)
// ---------------------------------------------------------------------------

#[test]
fn lih_exact_reference() {
    let (core, h, aux) = build(LIH, QubitMapping::Parity, true);
    assert_eq!(h.num_qubits(), 8);
    let exact = ExactEigensolver::new(h).with_aux_operators(aux).run().unwrap();
    let processed = core.process_algorithm_result(exact.eigenvalue, &exact.aux_values);
    assert_abs_diff_eq!(processed.energy(), -7.882, epsilon = 2e-3);
    assert_abs_diff_eq!(processed.num_particles.unwrap(), 4.0, epsilon = 1e-6);
}

#[test]
fn lih_uccsd_vqe() {
    let (core, h, aux) = build(LIH, QubitMapping::Parity, true);
    let exact = ExactEigensolver::new(h.clone()).run().unwrap();
    let ansatz = uccsd_for(&core);
    assert_eq!(ansatz.num_parameters(), 24);
    let optimizer = Slsqp::new().with_maxiter(2500);
    let mut vqe = Vqe::new(h, Box::new(ansatz), Box::new(optimizer)).with_aux_operators(aux);
    let result = vqe.run(&StatevectorSimulator::new()).unwrap();
    assert_abs_diff_eq!(result.eigenvalue, exact.eigenvalue, epsilon = 1e-4);

    let processed = core.process_algorithm_result(result.eigenvalue, &result.aux_values);
    assert_abs_diff_eq!(processed.energy(), -7.882, epsilon = 2e-3);
}

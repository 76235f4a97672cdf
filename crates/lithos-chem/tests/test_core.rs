//! Tests for the Hamiltonian core: mappings, active spaces and results.

use approx::assert_abs_diff_eq;
use nalgebra::DMatrix;

use lithos_chem::mapping::{hartree_fock_occupation, occupation_to_qubits, two_qubit_reduction_qubits};
use lithos_chem::{
    AuxOperators, ChemDriver, ChemError, CoreConfig, HamiltonianCore, QMolecule, QubitMapping, Unit,
};
use lithos_sim::{Hamiltonian, Statevector};

const LIH: &str = "H 0.0 0.0 0.0; Li 0.0 0.0 1.596";

fn h2() -> QMolecule {
    ChemDriver::new("H 0 0 0; H 0 0 1.4")
        .with_unit(Unit::Bohr)
        .run()
        .unwrap()
}

/// Sorted eigenvalues of a Hermitian operator via its real `2N × 2N`
/// embedding (every eigenvalue appears twice).
fn spectrum(h: &Hamiltonian) -> Vec<f64> {
    let dense = h.to_dense().unwrap();
    let dim = 1usize << h.num_qubits();
    let real = DMatrix::from_fn(2 * dim, 2 * dim, |r, c| {
        let z = dense[(r % dim) * dim + (c % dim)];
        match (r < dim, c < dim) {
            (true, true) | (false, false) => z.re,
            (true, false) => -z.im,
            (false, true) => z.im,
        }
    });
    let mut values: Vec<f64> = real.symmetric_eigen().eigenvalues.iter().copied().collect();
    values.sort_by(f64::total_cmp);
    values.into_iter().step_by(2).collect()
}

fn build_core(mapping: QubitMapping, reduction: bool, freeze_core: bool) -> HamiltonianCore {
    HamiltonianCore::new(CoreConfig {
        qubit_mapping: mapping,
        two_qubit_reduction: reduction,
        freeze_core,
        ..CoreConfig::default()
    })
}

/// Qubit basis index of the Hartree–Fock determinant of the active space.
fn hartree_fock_index(core: &HamiltonianCore) -> usize {
    let info = core.molecule_info().unwrap();
    let occupation = hartree_fock_occupation(info.num_orbitals / 2, info.num_particles);
    let mut bits = occupation_to_qubits(info.qubit_mapping, &occupation);
    if info.two_qubit_reduction {
        let (a, b) = two_qubit_reduction_qubits(info.num_orbitals as u32).unwrap();
        bits.remove(b as usize);
        bits.remove(a as usize);
    }
    bits.iter()
        .enumerate()
        .filter(|&(_, &b)| b)
        .map(|(q, _)| 1usize << q)
        .sum()
}

// ---------------------------------------------------------------------------
// Mappings
// ---------------------------------------------------------------------------

#[test]
fn mappings_share_a_spectrum() {
    let qmol = h2();
    let spectra: Vec<Vec<f64>> = [
        QubitMapping::JordanWigner,
        QubitMapping::Parity,
        QubitMapping::BravyiKitaev,
    ]
    .into_iter()
    .map(|m| {
        let (h, _) = build_core(m, false, false).run(&qmol).unwrap();
        assert_eq!(h.num_qubits(), 4);
        spectrum(&h)
    })
    .collect();
    for other in &spectra[1..] {
        for (a, b) in spectra[0].iter().zip(other) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }
}

#[test]
fn h2_reduced_ground_state_is_fci() {
    let qmol = h2();
    let mut core = build_core(QubitMapping::Parity, true, true);
    let (h, aux) = core.run(&qmol).unwrap();
    assert_eq!(h.num_qubits(), 2);
    assert_eq!(aux.len(), 6);
    assert!(h.is_real());

    let ground = spectrum(&h)[0];
    let result = core.process_algorithm_result(ground, &[]);
    assert_abs_diff_eq!(result.energy(), -1.13728, epsilon = 1e-4);
    assert!(result.energy() < qmol.hf_energy);
    assert_eq!(result.num_particles, None);
}

#[test]
fn reduction_is_disabled_for_jordan_wigner() {
    let core = build_core(QubitMapping::JordanWigner, true, true);
    assert!(!core.config().two_qubit_reduction);
}

#[test]
fn hartree_fock_determinant_reproduces_hf_energy() {
    let qmol = h2();
    for mapping in [
        QubitMapping::JordanWigner,
        QubitMapping::Parity,
        QubitMapping::BravyiKitaev,
    ] {
        let mut core = build_core(mapping, true, false);
        let (h, aux) = core.run(&qmol).unwrap();
        let state = Statevector::from_basis_state(h.num_qubits() as usize, hartree_fock_index(&core));
        let energy = state.expectation_hamiltonian(&h).unwrap();
        let values: Vec<f64> = aux
            .hamiltonians()
            .into_iter()
            .map(|op| state.expectation_hamiltonian(op).unwrap())
            .collect();
        let result = core.process_algorithm_result(energy, &values);
        assert_abs_diff_eq!(result.energy(), qmol.hf_energy, epsilon = 1e-8);
        assert_abs_diff_eq!(result.num_particles.unwrap(), 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(result.s_squared.unwrap(), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(result.magnetization.unwrap(), 0.0, epsilon = 1e-10);
    }
}

// ---------------------------------------------------------------------------
// LiH active space
// ---------------------------------------------------------------------------

#[test]
fn lih_frozen_core_parity_on_eight_qubits() {
    let qmol = ChemDriver::new(LIH).run().unwrap();
    let mut core = build_core(QubitMapping::Parity, true, true);
    let (h, aux) = core.run(&qmol).unwrap();

    let info = core.molecule_info().unwrap().clone();
    assert_eq!(info.num_orbitals, 10);
    assert_eq!(info.num_particles, (1, 1));
    assert_eq!(info.num_qubits, 8);
    assert_eq!(info.frozen, vec![0, 6]);
    assert!(info.removed.is_empty());
    assert!(info.energy_shift < -7.0);
    assert_eq!(h.num_qubits(), 8);
    assert!(h.to_string().starts_with("Representation: paulis, qubits: 8, size: "));

    // The HF determinant in the active space still gives the HF energy.
    let state = Statevector::from_basis_state(8, hartree_fock_index(&core));
    let values: Vec<f64> = aux
        .hamiltonians()
        .into_iter()
        .map(|op| state.expectation_hamiltonian(op).unwrap())
        .collect();
    let energy = state.expectation_hamiltonian(&h).unwrap();
    let result = core.process_algorithm_result(energy, &values);
    assert_abs_diff_eq!(result.energy(), qmol.hf_energy, epsilon = 1e-8);
    assert_abs_diff_eq!(result.num_particles.unwrap(), 4.0, epsilon = 1e-10);

    // A closed-shell determinant has <S^2> = 0 up to round-off; never negative.
    let mut noisy = values.clone();
    noisy[AuxOperators::S_SQUARED] = -1e-16;
    let clamped = core.process_algorithm_result(energy, &noisy);
    assert_eq!(clamped.s_squared, Some(0.0));
    assert_eq!(clamped.spin, Some(0.0));

    // LiH is polar along z only.
    let dipole = result.dipole.unwrap();
    assert_abs_diff_eq!(dipole.total[0], 0.0, epsilon = 1e-10);
    assert_abs_diff_eq!(dipole.total[1], 0.0, epsilon = 1e-10);
    assert!(dipole.total[2].abs() > 0.5);
    assert_eq!(values.len(), AuxOperators::DIPOLE_X + 3);
}

#[test]
fn lih_orbital_reduction() {
    let qmol = ChemDriver::new(LIH).run().unwrap();
    let mut core = HamiltonianCore::new(CoreConfig {
        orbital_reduction: vec![-3, -2],
        ..CoreConfig::default()
    });
    let (h, _) = core.run(&qmol).unwrap();
    let info = core.molecule_info().unwrap();
    assert_eq!(info.removed, vec![3, 4, 9, 10]);
    assert_eq!(info.num_orbitals, 6);
    assert_eq!(h.num_qubits(), 4);
}

#[test]
fn orbital_reduction_out_of_range() {
    let qmol = h2();
    let mut core = HamiltonianCore::new(CoreConfig {
        orbital_reduction: vec![5],
        ..CoreConfig::default()
    });
    let err = core.run(&qmol).unwrap_err();
    assert!(matches!(err, ChemError::OrbitalOutOfRange { index: 5, num_orbitals: 2 }));
}

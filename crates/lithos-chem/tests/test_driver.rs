//! End-to-end tests for the molecular driver.

use approx::assert_abs_diff_eq;

use lithos_chem::scf::ScfOptions;
use lithos_chem::{ChemDriver, ChemError, HfMethod, Unit};

const LIH: &str = "H 0.0 0.0 0.0; Li 0.0 0.0 1.596";

// ---------------------------------------------------------------------------
// H2
// ---------------------------------------------------------------------------

#[test]
fn h2_driver_energy_and_integrals() {
    let qmol = ChemDriver::new("H 0 0 0; H 0 0 1.4")
        .with_unit(Unit::Bohr)
        .run()
        .unwrap();
    assert_eq!(qmol.num_orbitals, 2);
    assert_eq!((qmol.num_alpha, qmol.num_beta), (1, 1));
    assert_eq!(qmol.hf_method, HfMethod::Rhf);
    assert_abs_diff_eq!(qmol.nuclear_repulsion_energy, 1.0 / 1.4, epsilon = 1e-12);
    assert_abs_diff_eq!(qmol.hf_energy, -1.1167, epsilon = 1e-4);

    // MO Fock diagonal: ε_p = h_pp + Σ_occ [2(pp|ii) - (pi|ip)].
    let h = &qmol.mo_onee_ints;
    let g = &qmol.mo_eri_ints;
    let eps0 = h[(0, 0)] + 2.0 * g.get(0, 0, 0, 0) - g.get(0, 0, 0, 0);
    assert_abs_diff_eq!(eps0, qmol.orbital_energies[0], epsilon = 1e-7);

    // Reference energy from MO integrals.
    let e_elec = 2.0 * h[(0, 0)] + g.get(0, 0, 0, 0);
    assert_abs_diff_eq!(
        e_elec + qmol.nuclear_repulsion_energy,
        qmol.hf_energy,
        epsilon = 1e-8
    );
}

#[test]
fn spin_orbital_integrals_have_block_structure() {
    let qmol = ChemDriver::new("H 0 0 0; H 0 0 0.735").run().unwrap();
    let n = qmol.num_orbitals;
    let h1 = qmol.one_body_integrals();
    let h2 = qmol.two_body_integrals();
    assert_eq!(h1.nrows(), 2 * n);
    assert_eq!(h1[(0, n)], 0.0);
    assert_abs_diff_eq!(h1[(n, n)], h1[(0, 0)], epsilon = 1e-14);
    // (αα|ββ) is the spatial integral, (αβ|..) vanishes.
    assert_abs_diff_eq!(h2.get(0, 0, n, n), qmol.mo_eri_ints.get(0, 0, 0, 0), epsilon = 1e-14);
    assert_eq!(h2.get(0, n, 0, n), 0.0);
}

// ---------------------------------------------------------------------------
// LiH
// ---------------------------------------------------------------------------

#[test]
fn lih_reference() {
    let qmol = ChemDriver::new(LIH).run().unwrap();
    assert_eq!(qmol.num_orbitals, 6);
    assert_eq!((qmol.num_alpha, qmol.num_beta), (2, 2));
    assert_eq!(qmol.core_orbitals, vec![0]);
    assert_abs_diff_eq!(qmol.nuclear_repulsion_energy, 0.994_694_005_5, epsilon = 1e-9);
    assert_abs_diff_eq!(qmol.hf_energy, -7.862, epsilon = 2e-3);

    let text = qmol.to_string();
    assert!(text.contains("Number of molecular orbitals: 6"));
    assert!(text.contains("Number of alpha electrons: 2"));
}

#[test]
fn lih_uhf_agrees_with_rhf() {
    let rhf = ChemDriver::new(LIH).run().unwrap();
    let uhf = ChemDriver::new(LIH)
        .with_scf(ScfOptions {
            method: Some(HfMethod::Uhf),
            ..ScfOptions::default()
        })
        .run()
        .unwrap();
    assert!(uhf.mo_eri_ints_ba.is_some());
    assert_abs_diff_eq!(rhf.hf_energy, uhf.hf_energy, epsilon = 1e-6);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn driver_rejects_bad_input() {
    let err = ChemDriver::new("Xx 0 0 0").run().unwrap_err();
    assert!(matches!(err, ChemError::UnknownElement(_)));

    let err = ChemDriver::new("H 0 0 0; H 0 0 0.7")
        .with_spin(1)
        .run()
        .unwrap_err();
    assert!(matches!(err, ChemError::InvalidSpin { .. }));

    // Three electrons on one H: two alpha in a single 1s function.
    let err = ChemDriver::new("H 0 0 0")
        .with_charge(-2)
        .with_spin(1)
        .run()
        .unwrap_err();
    assert!(matches!(
        err,
        ChemError::TooManyElectrons {
            alpha: 2,
            beta: 1,
            orbitals: 1
        }
    ));
}

//! The electronic-structure driver.
//!
//! [`ChemDriver::run`] builds the basis, evaluates integrals, runs
//! Hartree–Fock and transforms everything the Hamiltonian core needs into
//! the MO basis, returning a [`QMolecule`].

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument};

use crate::basis::{BasisName, BasisSet};
use crate::error::ChemResult;
use crate::integrals::{AoIntegrals, Tensor4};
use crate::linalg::transform;
use crate::molecule::{Molecule, Unit};
use crate::scf::{HfMethod, ScfOptions, run_scf};

/// Driver input: geometry, charge, spin, basis and SCF settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemDriver {
    /// Atom string, e.g. `"H 0.0 0.0 0.0; Li 0.0 0.0 1.596"`.
    pub atom: String,
    /// Unit of the coordinates.
    pub unit: Unit,
    /// Molecular charge.
    pub charge: i32,
    /// 2S.
    pub spin: u32,
    /// Basis set.
    pub basis: BasisName,
    /// SCF options.
    pub scf: ScfOptions,
}

impl Default for ChemDriver {
    fn default() -> Self {
        Self {
            atom: "H 0.0 0.0 0.0; Li 0.0 0.0 1.596".to_string(),
            unit: Unit::Angstrom,
            charge: 0,
            spin: 0,
            basis: BasisName::Sto3g,
            scf: ScfOptions::default(),
        }
    }
}

impl ChemDriver {
    /// Driver for `atom` with default unit, charge, spin and basis.
    pub fn new(atom: impl Into<String>) -> Self {
        Self {
            atom: atom.into(),
            ..Self::default()
        }
    }

    /// Set the coordinate unit.
    #[must_use]
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the molecular charge.
    #[must_use]
    pub fn with_charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }

    /// Set 2S.
    #[must_use]
    pub fn with_spin(mut self, spin: u32) -> Self {
        self.spin = spin;
        self
    }

    /// Set the basis set.
    #[must_use]
    pub fn with_basis(mut self, basis: BasisName) -> Self {
        self.basis = basis;
        self
    }

    /// Set SCF options.
    #[must_use]
    pub fn with_scf(mut self, scf: ScfOptions) -> Self {
        self.scf = scf;
        self
    }

    /// Parse the geometry.
    pub fn molecule(&self) -> ChemResult<Molecule> {
        Molecule::from_atom_string(&self.atom, self.unit, self.charge, self.spin)
    }

    /// Run Hartree–Fock and build the MO-basis data.
    #[instrument(skip(self), fields(atom = %self.atom, basis = %self.basis))]
    pub fn run(&self) -> ChemResult<QMolecule> {
        let molecule = self.molecule()?;
        let basis = BasisSet::build(self.basis, &molecule)?;
        let integrals = AoIntegrals::compute(&basis, &molecule);
        let scf = run_scf(
            &integrals,
            molecule.nuclear_repulsion_energy(),
            molecule.num_alpha(),
            molecule.num_beta(),
            &self.scf,
        )?;

        let h = integrals.core_hamiltonian();
        let ca = &scf.mo_coeff_alpha;
        let cb = &scf.mo_coeff_beta;
        let unrestricted = scf.method == HfMethod::Uhf;

        let mo_onee_ints = transform(&h, ca);
        let mo_eri_ints = integrals.eri.transform(ca, ca, ca, ca);
        let dipole_mo_ints = [0, 1, 2].map(|k| transform(&integrals.dipole[k], ca));

        let (mo_onee_ints_b, mo_eri_ints_bb, mo_eri_ints_ba, dipole_mo_ints_b) = if unrestricted {
            (
                Some(transform(&h, cb)),
                Some(integrals.eri.transform(cb, cb, cb, cb)),
                Some(integrals.eri.transform(cb, cb, ca, ca)),
                Some([0, 1, 2].map(|k| transform(&integrals.dipole[k], cb))),
            )
        } else {
            (None, None, None, None)
        };

        let qmol = QMolecule {
            atom_symbols: molecule.symbols().iter().map(|s| s.to_string()).collect(),
            atom_positions: molecule.atoms().iter().map(|a| a.position).collect(),
            molecular_charge: molecule.charge(),
            multiplicity: molecule.multiplicity(),
            basis: self.basis,
            hf_method: scf.method,
            hf_energy: scf.total_energy(),
            nuclear_repulsion_energy: scf.nuclear_repulsion,
            num_orbitals: basis.len(),
            num_alpha: scf.num_alpha,
            num_beta: scf.num_beta,
            scf_iterations: scf.iterations,
            orbital_energies: scf.mo_energy_alpha.clone(),
            orbital_energies_b: unrestricted.then(|| scf.mo_energy_beta.clone()),
            mo_coeff: ca.clone(),
            mo_coeff_b: unrestricted.then(|| cb.clone()),
            mo_onee_ints,
            mo_onee_ints_b,
            mo_eri_ints,
            mo_eri_ints_bb,
            mo_eri_ints_ba,
            dipole_mo_ints,
            dipole_mo_ints_b,
            nuclear_dipole_moment: molecule.nuclear_dipole_moment(),
            reverse_dipole_sign: false,
            core_orbitals: (0..molecule.num_core_orbitals()).collect(),
        };
        info!(
            hf_energy = qmol.hf_energy,
            num_orbitals = qmol.num_orbitals,
            "driver finished"
        );
        Ok(qmol)
    }
}

/// Molecular data in the MO basis, as consumed by the Hamiltonian core.
///
/// Spatial MO quantities are stored per spin; the `*_b` fields are `None`
/// for restricted references. Spin-orbital views put the alpha block
/// (modes `0..n`) before the beta block (modes `n..2n`).
#[derive(Debug, Clone)]
pub struct QMolecule {
    /// Element symbols.
    pub atom_symbols: Vec<String>,
    /// Positions in Bohr.
    pub atom_positions: Vec<[f64; 3]>,
    /// Molecular charge.
    pub molecular_charge: i32,
    /// 2S + 1.
    pub multiplicity: u32,
    /// Basis set.
    pub basis: BasisName,
    /// Reference method.
    pub hf_method: HfMethod,
    /// Total Hartree–Fock energy.
    pub hf_energy: f64,
    /// Nuclear repulsion energy.
    pub nuclear_repulsion_energy: f64,
    /// Number of spatial molecular orbitals.
    pub num_orbitals: usize,
    /// Number of alpha electrons.
    pub num_alpha: usize,
    /// Number of beta electrons.
    pub num_beta: usize,
    /// SCF cycles.
    pub scf_iterations: usize,
    /// Alpha orbital energies.
    pub orbital_energies: DVector<f64>,
    /// Beta orbital energies.
    pub orbital_energies_b: Option<DVector<f64>>,
    /// Alpha MO coefficients.
    pub mo_coeff: DMatrix<f64>,
    /// Beta MO coefficients.
    pub mo_coeff_b: Option<DMatrix<f64>>,
    /// Alpha one-electron integrals `h_pq`.
    pub mo_onee_ints: DMatrix<f64>,
    /// Beta one-electron integrals.
    pub mo_onee_ints_b: Option<DMatrix<f64>>,
    /// `(αα|αα)` two-electron integrals.
    pub mo_eri_ints: Tensor4,
    /// `(ββ|ββ)` two-electron integrals.
    pub mo_eri_ints_bb: Option<Tensor4>,
    /// `(ββ|αα)` two-electron integrals.
    pub mo_eri_ints_ba: Option<Tensor4>,
    /// Alpha dipole integrals `x, y, z`.
    pub dipole_mo_ints: [DMatrix<f64>; 3],
    /// Beta dipole integrals.
    pub dipole_mo_ints_b: Option<[DMatrix<f64>; 3]>,
    /// `Σ_A Z_A R_A`.
    pub nuclear_dipole_moment: [f64; 3],
    /// Flip the sign of the electronic dipole when combining with the
    /// nuclear part.
    pub reverse_dipole_sign: bool,
    /// Spatial core orbitals, lowest first.
    pub core_orbitals: Vec<usize>,
}

impl QMolecule {
    /// Number of spin orbitals `2n`.
    pub fn num_spin_orbitals(&self) -> usize {
        2 * self.num_orbitals
    }

    fn spin_block_matrix(alpha: &DMatrix<f64>, beta: Option<&DMatrix<f64>>) -> DMatrix<f64> {
        let n = alpha.nrows();
        let beta = beta.unwrap_or(alpha);
        let mut out = DMatrix::zeros(2 * n, 2 * n);
        out.view_mut((0, 0), (n, n)).copy_from(alpha);
        out.view_mut((n, n), (n, n)).copy_from(beta);
        out
    }

    /// Spin-orbital one-electron integrals.
    pub fn one_body_integrals(&self) -> DMatrix<f64> {
        Self::spin_block_matrix(&self.mo_onee_ints, self.mo_onee_ints_b.as_ref())
    }

    /// Spin-orbital two-electron integrals `(PQ|RS)` in chemists' notation;
    /// zero unless `P, Q` share a spin and `R, S` share a spin.
    pub fn two_body_integrals(&self) -> Tensor4 {
        let n = self.num_orbitals;
        let aa = &self.mo_eri_ints;
        let bb = self.mo_eri_ints_bb.as_ref().unwrap_or(aa);
        let ba = self.mo_eri_ints_ba.as_ref().unwrap_or(aa);
        let mut out = Tensor4::zeros(2 * n);
        for p in 0..n {
            for q in 0..n {
                for r in 0..n {
                    for s in 0..n {
                        out.set(p, q, r, s, aa.get(p, q, r, s));
                        out.set(p + n, q + n, r + n, s + n, bb.get(p, q, r, s));
                        out.set(p + n, q + n, r, s, ba.get(p, q, r, s));
                        out.set(r, s, p + n, q + n, ba.get(p, q, r, s));
                    }
                }
            }
        }
        out
    }

    /// Spin-orbital dipole integrals along `axis` (0 = x, 1 = y, 2 = z).
    pub fn dipole_integrals(&self, axis: usize) -> DMatrix<f64> {
        Self::spin_block_matrix(
            &self.dipole_mo_ints[axis],
            self.dipole_mo_ints_b.as_ref().map(|d| &d[axis]),
        )
    }
}

impl fmt::Display for QMolecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Molecule: charge {}, multiplicity {}", self.molecular_charge, self.multiplicity)?;
        for (symbol, pos) in self.atom_symbols.iter().zip(&self.atom_positions) {
            writeln!(f, "  {symbol:<2} {:>14.8} {:>14.8} {:>14.8}", pos[0], pos[1], pos[2])?;
        }
        writeln!(f, "Basis: {}, reference: {}", self.basis, self.hf_method)?;
        writeln!(f, "Hartree-Fock energy: {}", self.hf_energy)?;
        writeln!(f, "Nuclear repulsion energy: {}", self.nuclear_repulsion_energy)?;
        writeln!(f, "Number of molecular orbitals: {}", self.num_orbitals)?;
        writeln!(f, "Number of alpha electrons: {}", self.num_alpha)?;
        write!(f, "Number of beta electrons: {}", self.num_beta)
    }
}

//! Restricted and unrestricted Hartree–Fock.
//!
//! The SCF loop starts from the core-Hamiltonian guess, orthogonalises with
//! `S^{-1/2}` and accelerates convergence with Pulay DIIS on the commutator
//! error `FDS - SDF`.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{ChemError, ChemResult};
use crate::integrals::{AoIntegrals, Tensor4};
use crate::linalg::{eigh, inverse_sqrt};

/// Smallest overlap eigenvalue accepted before the basis counts as linearly
/// dependent.
const LINEAR_DEPENDENCE_TOL: f64 = 1e-10;

/// Hartree–Fock flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HfMethod {
    /// Restricted, closed shell.
    Rhf,
    /// Unrestricted, separate alpha and beta orbitals.
    Uhf,
}

impl FromStr for HfMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rhf" => Ok(HfMethod::Rhf),
            "uhf" => Ok(HfMethod::Uhf),
            other => Err(format!("unknown HF method '{other}' (expected rhf or uhf)")),
        }
    }
}

impl fmt::Display for HfMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HfMethod::Rhf => write!(f, "rhf"),
            HfMethod::Uhf => write!(f, "uhf"),
        }
    }
}

/// SCF settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScfOptions {
    /// Method; `None` picks RHF for closed shells and UHF otherwise.
    pub method: Option<HfMethod>,
    /// Maximum number of Fock builds.
    pub max_cycle: usize,
    /// Energy convergence threshold; the DIIS error threshold is its square
    /// root.
    pub conv_tol: f64,
    /// Number of stored DIIS vectors (0 disables DIIS).
    pub diis_space: usize,
}

impl Default for ScfOptions {
    fn default() -> Self {
        Self {
            method: None,
            max_cycle: 50,
            conv_tol: 1e-9,
            diis_space: 8,
        }
    }
}

/// A converged SCF solution.
#[derive(Debug, Clone, Serialize)]
pub struct ScfResult {
    /// Method that produced it.
    pub method: HfMethod,
    /// Electronic energy (no nuclear repulsion).
    pub electronic_energy: f64,
    /// Nuclear repulsion energy.
    pub nuclear_repulsion: f64,
    /// Fock builds performed.
    pub iterations: usize,
    /// Alpha orbital energies, ascending.
    #[serde(skip)]
    pub mo_energy_alpha: DVector<f64>,
    /// Beta orbital energies (equal to alpha for RHF).
    #[serde(skip)]
    pub mo_energy_beta: DVector<f64>,
    /// Alpha MO coefficients, one column per orbital.
    #[serde(skip)]
    pub mo_coeff_alpha: DMatrix<f64>,
    /// Beta MO coefficients (equal to alpha for RHF).
    #[serde(skip)]
    pub mo_coeff_beta: DMatrix<f64>,
    /// Number of alpha electrons.
    pub num_alpha: usize,
    /// Number of beta electrons.
    pub num_beta: usize,
}

impl ScfResult {
    /// Total Hartree–Fock energy.
    pub fn total_energy(&self) -> f64 {
        self.electronic_energy + self.nuclear_repulsion
    }
}

/// Coulomb matrix `J[D]_{μν} = Σ_{λσ} (μν|λσ) D_{λσ}`.
fn coulomb(eri: &Tensor4, d: &DMatrix<f64>) -> DMatrix<f64> {
    let n = d.nrows();
    DMatrix::from_fn(n, n, |p, q| {
        let mut acc = 0.0;
        for r in 0..n {
            for s in 0..n {
                acc += eri.get(p, q, r, s) * d[(r, s)];
            }
        }
        acc
    })
}

/// Exchange matrix `K[D]_{μν} = Σ_{λσ} (μλ|νσ) D_{λσ}`.
fn exchange(eri: &Tensor4, d: &DMatrix<f64>) -> DMatrix<f64> {
    let n = d.nrows();
    DMatrix::from_fn(n, n, |p, q| {
        let mut acc = 0.0;
        for r in 0..n {
            for s in 0..n {
                acc += eri.get(p, r, q, s) * d[(r, s)];
            }
        }
        acc
    })
}

/// `C_occ C_occᵀ` for the lowest `nocc` columns.
fn density(c: &DMatrix<f64>, nocc: usize) -> DMatrix<f64> {
    let occ = c.columns(0, nocc);
    occ * occ.transpose()
}

/// Pulay DIIS extrapolation over Fock matrices of one or two spins.
struct Diis {
    space: usize,
    focks: VecDeque<Vec<DMatrix<f64>>>,
    errors: VecDeque<DVector<f64>>,
}

impl Diis {
    fn new(space: usize) -> Self {
        Self {
            space,
            focks: VecDeque::with_capacity(space),
            errors: VecDeque::with_capacity(space),
        }
    }

    fn extrapolate(&mut self, focks: Vec<DMatrix<f64>>, error: DVector<f64>) -> Vec<DMatrix<f64>> {
        if self.space == 0 {
            return focks;
        }
        if self.focks.len() == self.space {
            self.focks.pop_front();
            self.errors.pop_front();
        }
        self.focks.push_back(focks);
        self.errors.push_back(error);

        let m = self.errors.len();
        let latest = || self.focks.back().cloned().unwrap_or_default();
        if m < 2 {
            return latest();
        }

        let mut b = DMatrix::zeros(m + 1, m + 1);
        for i in 0..m {
            for j in 0..=i {
                let v = self.errors[i].dot(&self.errors[j]);
                b[(i, j)] = v;
                b[(j, i)] = v;
            }
            b[(i, m)] = -1.0;
            b[(m, i)] = -1.0;
        }
        let mut rhs = DVector::zeros(m + 1);
        rhs[m] = -1.0;

        let Some(weights) = b.lu().solve(&rhs) else {
            debug!("DIIS system singular, using latest Fock matrix");
            return latest();
        };

        let mut out: Vec<DMatrix<f64>> = self.focks[0]
            .iter()
            .map(|f| DMatrix::zeros(f.nrows(), f.ncols()))
            .collect();
        for (k, focks) in self.focks.iter().enumerate() {
            for (acc, f) in out.iter_mut().zip(focks) {
                *acc += f * weights[k];
            }
        }
        out
    }
}

/// Run Hartree–Fock.
///
/// `num_alpha`/`num_beta` electrons occupy the lowest orbitals of each spin.
pub fn run_scf(
    integrals: &AoIntegrals,
    nuclear_repulsion: f64,
    num_alpha: usize,
    num_beta: usize,
    options: &ScfOptions,
) -> ChemResult<ScfResult> {
    let method = match options.method {
        Some(method) => method,
        None if num_alpha == num_beta => HfMethod::Rhf,
        None => HfMethod::Uhf,
    };
    if method == HfMethod::Rhf && num_alpha != num_beta {
        return Err(ChemError::OpenShellRhf(num_alpha.abs_diff(num_beta) as u32));
    }

    let s = &integrals.overlap;
    let orbitals = s.nrows();
    if num_alpha.max(num_beta) > orbitals {
        return Err(ChemError::TooManyElectrons {
            alpha: num_alpha,
            beta: num_beta,
            orbitals,
        });
    }
    let h = integrals.core_hamiltonian();
    let eri = &integrals.eri;

    let (x, min_eigenvalue) = inverse_sqrt(s);
    if min_eigenvalue < LINEAR_DEPENDENCE_TOL {
        return Err(ChemError::LinearDependence(min_eigenvalue));
    }

    let solve = |f: &DMatrix<f64>| {
        let f_ortho = x.transpose() * f * &x;
        let (energies, c_ortho) = eigh(&f_ortho);
        (energies, &x * c_ortho)
    };

    info!(%method, num_alpha, num_beta, n_ao = integrals.num_ao(), "starting SCF");

    // Core-Hamiltonian guess.
    let (_, c_guess) = solve(&h);
    let mut d_alpha = density(&c_guess, num_alpha);
    let mut d_beta = density(&c_guess, num_beta);

    let mut diis = Diis::new(options.diis_space);
    let mut energy_old = 0.0;
    let error_tol = options.conv_tol.sqrt();
    let mut last_delta = f64::INFINITY;

    for cycle in 1..=options.max_cycle {
        let j = coulomb(eri, &(&d_alpha + &d_beta));
        let f_alpha = &h + &j - exchange(eri, &d_alpha);
        let f_beta = match method {
            HfMethod::Rhf => f_alpha.clone(),
            HfMethod::Uhf => &h + &j - exchange(eri, &d_beta),
        };

        let energy = 0.5
            * ((&d_alpha + &d_beta).dot(&h) + d_alpha.dot(&f_alpha) + d_beta.dot(&f_beta));

        let err_alpha = &f_alpha * &d_alpha * s - s * &d_alpha * &f_alpha;
        let error = match method {
            HfMethod::Rhf => DVector::from_column_slice(err_alpha.as_slice()),
            HfMethod::Uhf => {
                let err_beta = &f_beta * &d_beta * s - s * &d_beta * &f_beta;
                DVector::from_iterator(
                    err_alpha.len() * 2,
                    err_alpha.iter().chain(err_beta.iter()).copied(),
                )
            }
        };
        let error_norm = error.norm();
        let delta = energy - energy_old;
        last_delta = delta;
        debug!(cycle, energy, delta, error_norm, "SCF iteration");

        if delta.abs() < options.conv_tol && error_norm < error_tol {
            let (e_alpha, c_alpha) = solve(&f_alpha);
            let (e_beta, c_beta) = match method {
                HfMethod::Rhf => (e_alpha.clone(), c_alpha.clone()),
                HfMethod::Uhf => solve(&f_beta),
            };
            info!(
                cycle,
                electronic_energy = energy,
                total_energy = energy + nuclear_repulsion,
                "SCF converged"
            );
            return Ok(ScfResult {
                method,
                electronic_energy: energy,
                nuclear_repulsion,
                iterations: cycle,
                mo_energy_alpha: e_alpha,
                mo_energy_beta: e_beta,
                mo_coeff_alpha: c_alpha,
                mo_coeff_beta: c_beta,
                num_alpha,
                num_beta,
            });
        }

        let focks = match method {
            HfMethod::Rhf => vec![f_alpha],
            HfMethod::Uhf => vec![f_alpha, f_beta],
        };
        let extrapolated = diis.extrapolate(focks, error);
        let (_, c_alpha) = solve(&extrapolated[0]);
        d_alpha = density(&c_alpha, num_alpha);
        d_beta = match extrapolated.get(1) {
            Some(f_beta) => density(&solve(f_beta).1, num_beta),
            None => density(&c_alpha, num_beta),
        };
        energy_old = energy;
    }

    warn!(
        max_cycle = options.max_cycle,
        energy = energy_old,
        "SCF did not converge"
    );
    Err(ChemError::ScfNotConverged {
        cycles: options.max_cycle,
        energy: energy_old,
        delta: last_delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{BasisName, BasisSet};
    use crate::molecule::{Molecule, Unit};
    use approx::assert_abs_diff_eq;

    fn h2_integrals() -> (AoIntegrals, f64) {
        let mol = Molecule::from_atom_string("H 0 0 0; H 0 0 1.4", Unit::Bohr, 0, 0).unwrap();
        let basis = BasisSet::build(BasisName::Sto3g, &mol).unwrap();
        (AoIntegrals::compute(&basis, &mol), mol.nuclear_repulsion_energy())
    }

    #[test]
    fn h2_rhf_energy() {
        let (ints, e_nuc) = h2_integrals();
        let result = run_scf(&ints, e_nuc, 1, 1, &ScfOptions::default()).unwrap();
        assert_eq!(result.method, HfMethod::Rhf);
        assert_abs_diff_eq!(result.total_energy(), -1.1167, epsilon = 1e-4);
        assert!(result.mo_energy_alpha[0] < result.mo_energy_alpha[1]);
    }

    #[test]
    fn uhf_matches_rhf_for_closed_shell() {
        let (ints, e_nuc) = h2_integrals();
        let rhf = run_scf(&ints, e_nuc, 1, 1, &ScfOptions::default()).unwrap();
        let options = ScfOptions {
            method: Some(HfMethod::Uhf),
            ..ScfOptions::default()
        };
        let uhf = run_scf(&ints, e_nuc, 1, 1, &options).unwrap();
        assert_abs_diff_eq!(rhf.total_energy(), uhf.total_energy(), epsilon = 1e-8);
    }

    #[test]
    fn orbitals_are_orthonormal_in_metric() {
        let (ints, e_nuc) = h2_integrals();
        let result = run_scf(&ints, e_nuc, 1, 1, &ScfOptions::default()).unwrap();
        let c = &result.mo_coeff_alpha;
        let metric = c.transpose() * &ints.overlap * c;
        let identity = DMatrix::<f64>::identity(2, 2);
        assert!((metric - identity).norm() < 1e-10);
    }

    #[test]
    fn open_shell_uses_uhf_by_default() {
        let (ints, e_nuc) = h2_integrals();
        // H2+ : one alpha electron.
        let result = run_scf(&ints, e_nuc, 1, 0, &ScfOptions::default()).unwrap();
        assert_eq!(result.method, HfMethod::Uhf);
        assert!(result.total_energy() < 0.0);
    }

    #[test]
    fn rhf_rejects_open_shell() {
        let (ints, e_nuc) = h2_integrals();
        let options = ScfOptions {
            method: Some(HfMethod::Rhf),
            ..ScfOptions::default()
        };
        let err = run_scf(&ints, e_nuc, 1, 0, &options).unwrap_err();
        assert!(matches!(err, ChemError::OpenShellRhf(1)));
    }

    #[test]
    fn reports_non_convergence() {
        let (ints, e_nuc) = h2_integrals();
        let options = ScfOptions {
            max_cycle: 1,
            ..ScfOptions::default()
        };
        let err = run_scf(&ints, e_nuc, 1, 1, &options).unwrap_err();
        assert!(matches!(err, ChemError::ScfNotConverged { cycles: 1, .. }));
    }

    #[test]
    fn method_parsing() {
        assert_eq!("UHF".parse::<HfMethod>().unwrap(), HfMethod::Uhf);
        assert!("rohf".parse::<HfMethod>().is_err());
    }
}

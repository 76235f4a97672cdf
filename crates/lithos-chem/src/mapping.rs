//! Fermion-to-qubit mappings.
//!
//! All three encodings are expressed through the same three index sets per
//! mode `j`: the update set `U(j)` (qubits whose value flips when mode `j`
//! changes occupation), the parity set `P(j)` (qubits whose product gives the
//! parity of modes `< j`), and the flip set `F(j)` (qubits that together with
//! qubit `j` give the occupation of mode `j`). With the remainder set
//! `R(j) = P(j) \ F(j)`:
//!
//!   a†_j = ½ X_U (X_j Z_P - i Y_j Z_R)
//!   a_j  = ½ X_U (X_j Z_P + i Y_j Z_R)
//!
//! | Mapping | U(j) | P(j) | F(j) |
//! |---------|------|------|------|
//! | Jordan–Wigner | ∅ | {0..j} | ∅ |
//! | Parity | {j+1..n} | {j-1} | {j-1} |
//! | Bravyi–Kitaev | Fenwick ancestors | Fenwick prefix | Fenwick children |

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use lithos_sim::{PauliOp, PauliString, PauliSum};

use crate::error::{ChemError, ChemResult};
use crate::fermion::FermionicOp;

/// Coefficients at or below this magnitude are dropped after mapping.
pub const MAPPING_TOL: f64 = 1e-12;

/// Fermion-to-qubit encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QubitMapping {
    /// Occupation-number encoding.
    JordanWigner,
    /// Prefix-parity encoding.
    #[default]
    Parity,
    /// Fenwick-tree Bravyi–Kitaev encoding.
    BravyiKitaev,
}

impl FromStr for QubitMapping {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "jordan_wigner" | "jw" => Ok(QubitMapping::JordanWigner),
            "parity" => Ok(QubitMapping::Parity),
            "bravyi_kitaev" | "bk" => Ok(QubitMapping::BravyiKitaev),
            _ => Err(ChemError::UnknownMapping(s.to_string())),
        }
    }
}

impl fmt::Display for QubitMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QubitMapping::JordanWigner => write!(f, "jordan_wigner"),
            QubitMapping::Parity => write!(f, "parity"),
            QubitMapping::BravyiKitaev => write!(f, "bravyi_kitaev"),
        }
    }
}

/// Index sets `(U, P, F)` of mode `j` in an `n`-mode register.
fn index_sets(mapping: QubitMapping, j: usize, n: usize) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
    match mapping {
        QubitMapping::JordanWigner => (vec![], (0..j).collect(), vec![]),
        QubitMapping::Parity => {
            let prev: Vec<usize> = j.checked_sub(1).into_iter().collect();
            ((j + 1..n).collect(), prev.clone(), prev)
        }
        QubitMapping::BravyiKitaev => {
            let mut update = Vec::new();
            let mut k = j | (j + 1);
            while k < n {
                update.push(k);
                k |= k + 1;
            }

            let mut parity = Vec::new();
            let mut k = j as isize - 1;
            while k >= 0 {
                parity.push(k as usize);
                k = (k & (k + 1)) - 1;
            }

            let mut flip = Vec::new();
            let floor = (j & (j + 1)) as isize;
            let mut k = j as isize - 1;
            while k >= floor {
                flip.push(k as usize);
                k = (k & (k + 1)) - 1;
            }

            (update, parity, flip)
        }
    }
}

/// Pauli representation of every creation and annihilation operator.
#[derive(Debug, Clone)]
pub struct LadderOperators {
    creation: Vec<PauliSum>,
    annihilation: Vec<PauliSum>,
}

impl LadderOperators {
    /// Build `a†_j` and `a_j` for `modes` modes.
    pub fn new(mapping: QubitMapping, modes: usize) -> Self {
        let mut creation = Vec::with_capacity(modes);
        let mut annihilation = Vec::with_capacity(modes);
        for j in 0..modes {
            let (update, parity, flip) = index_sets(mapping, j, modes);
            let remainder: Vec<usize> = parity.iter().copied().filter(|k| !flip.contains(k)).collect();

            let qubit = |k: usize| k as u32;
            let x_part = PauliString::from_ops(
                update
                    .iter()
                    .map(|&k| (qubit(k), PauliOp::X))
                    .chain(parity.iter().map(|&k| (qubit(k), PauliOp::Z)))
                    .chain([(qubit(j), PauliOp::X)]),
            );
            let y_part = PauliString::from_ops(
                update
                    .iter()
                    .map(|&k| (qubit(k), PauliOp::X))
                    .chain(remainder.iter().map(|&k| (qubit(k), PauliOp::Z)))
                    .chain([(qubit(j), PauliOp::Y)]),
            );

            let half = Complex64::new(0.5, 0.0);
            let half_i = Complex64::new(0.0, 0.5);
            creation.push(
                [(x_part.clone(), half), (y_part.clone(), -half_i)]
                    .into_iter()
                    .collect(),
            );
            annihilation.push([(x_part, half), (y_part, half_i)].into_iter().collect());
        }
        Self {
            creation,
            annihilation,
        }
    }

    /// Number of modes.
    pub fn modes(&self) -> usize {
        self.creation.len()
    }

    /// `a†_j`.
    pub fn creation(&self, j: usize) -> &PauliSum {
        &self.creation[j]
    }

    /// `a_j`.
    pub fn annihilation(&self, j: usize) -> &PauliSum {
        &self.annihilation[j]
    }

    /// Product of ladder operators, leftmost first; `(j, true)` is `a†_j`.
    pub fn product(&self, ops: &[(usize, bool)]) -> PauliSum {
        let mut acc = PauliSum::identity(Complex64::new(1.0, 0.0));
        for &(j, dagger) in ops {
            let factor = if dagger {
                self.creation(j)
            } else {
                self.annihilation(j)
            };
            acc = acc.mul(factor);
        }
        acc
    }
}

/// Map a fermionic operator to qubits.
pub fn map_fermionic(op: &FermionicOp, mapping: QubitMapping) -> PauliSum {
    let n = op.modes();
    let ladders = LadderOperators::new(mapping, n);

    // E_pq = a†_p a_q
    let excitations: Vec<Vec<PauliSum>> = (0..n)
        .map(|p| {
            (0..n)
                .map(|q| ladders.creation(p).mul(ladders.annihilation(q)))
                .collect()
        })
        .collect();

    let mut out = PauliSum::new();
    let h1 = op.h1();
    for p in 0..n {
        for q in 0..n {
            let c = h1[(p, q)];
            if c.abs() > MAPPING_TOL {
                let mut term = excitations[p][q].clone();
                term.scale(Complex64::new(c, 0.0));
                out.add(&term);
            }
        }
    }

    // ½ Σ h2[pqrs] a†_p a†_r a_s a_q = ½ Σ h2[pqrs] (E_pq E_rs - δ_qr E_ps)
    if let Some(h2) = op.h2() {
        for p in 0..n {
            for q in 0..n {
                let mut inner = PauliSum::new();
                for r in 0..n {
                    for s in 0..n {
                        let c = h2.get(p, q, r, s);
                        if c.abs() <= MAPPING_TOL {
                            continue;
                        }
                        let mut e_rs = excitations[r][s].clone();
                        e_rs.scale(Complex64::new(0.5 * c, 0.0));
                        inner.add(&e_rs);
                        if q == r {
                            let mut e_ps = excitations[p][s].clone();
                            e_ps.scale(Complex64::new(-0.5 * c, 0.0));
                            out.add(&e_ps);
                        }
                    }
                }
                if !inner.is_empty() {
                    out.add(&excitations[p][q].mul(&inner));
                }
            }
        }
    }

    out.simplify(MAPPING_TOL);
    debug!(modes = n, %mapping, terms = out.len(), "mapped fermionic operator");
    out
}

/// Qubits tapered off by the two-qubit reduction of an `n`-qubit parity
/// encoding: the alpha-parity qubit and the total-parity qubit.
pub fn two_qubit_reduction_qubits(num_qubits: u32) -> ChemResult<(u32, u32)> {
    if num_qubits < 2 || num_qubits % 2 != 0 {
        return Err(ChemError::InvalidReductionWidth(num_qubits));
    }
    Ok((num_qubits / 2 - 1, num_qubits - 1))
}

/// Taper the two parity qubits of a parity-mapped operator.
///
/// Z on qubit `n/2 - 1` is replaced by `(-1)^{n_alpha}` and Z on qubit
/// `n - 1` by `(-1)^{n_alpha + n_beta}`; the remaining qubits are
/// renumbered contiguously.
pub fn two_qubit_reduction(
    sum: &PauliSum,
    num_qubits: u32,
    num_particles: (usize, usize),
) -> ChemResult<PauliSum> {
    let (alpha_qubit, total_qubit) = two_qubit_reduction_qubits(num_qubits)?;
    let (num_alpha, num_beta) = num_particles;
    let alpha_sign = if num_alpha % 2 == 0 { 1.0 } else { -1.0 };
    let total_sign = if (num_alpha + num_beta) % 2 == 0 { 1.0 } else { -1.0 };

    let mut out = PauliSum::new();
    for (pauli, coeff) in sum.sorted_terms() {
        let mut sign = 1.0;
        for (qubit, value) in [(alpha_qubit, alpha_sign), (total_qubit, total_sign)] {
            match pauli.get(qubit) {
                PauliOp::I => {}
                PauliOp::Z => sign *= value,
                PauliOp::X | PauliOp::Y => {
                    if coeff.norm() > MAPPING_TOL {
                        return Err(ChemError::NotTaperable {
                            term: pauli.to_string(),
                            qubit,
                        });
                    }
                }
            }
        }
        let reduced = pauli.remap(|q| {
            if q == alpha_qubit || q == total_qubit {
                None
            } else if q > alpha_qubit {
                Some(q - 1)
            } else {
                Some(q)
            }
        });
        out.add_term(reduced, coeff * sign);
    }
    out.simplify(MAPPING_TOL);
    Ok(out)
}

/// Encode a Fock-space occupation (one flag per mode) as qubit values.
pub fn occupation_to_qubits(mapping: QubitMapping, occupations: &[bool]) -> Vec<bool> {
    match mapping {
        QubitMapping::JordanWigner => occupations.to_vec(),
        QubitMapping::Parity => occupations
            .iter()
            .scan(false, |parity, &occ| {
                *parity ^= occ;
                Some(*parity)
            })
            .collect(),
        QubitMapping::BravyiKitaev => (0..occupations.len())
            .map(|j| occupations[j & (j + 1)..=j].iter().filter(|&&o| o).count() % 2 == 1)
            .collect(),
    }
}

/// Hartree–Fock occupation over `2 * num_orbitals` modes (alpha block
/// first), with the lowest orbitals of each spin filled.
pub fn hartree_fock_occupation(num_orbitals: usize, num_particles: (usize, usize)) -> Vec<bool> {
    (0..2 * num_orbitals)
        .map(|m| {
            if m < num_orbitals {
                m < num_particles.0
            } else {
                m - num_orbitals < num_particles.1
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_names() {
        assert_eq!("parity".parse::<QubitMapping>().unwrap(), QubitMapping::Parity);
        assert_eq!("Jordan-Wigner".parse::<QubitMapping>().unwrap(), QubitMapping::JordanWigner);
        assert_eq!("bk".parse::<QubitMapping>().unwrap(), QubitMapping::BravyiKitaev);
        assert!("ternary".parse::<QubitMapping>().is_err());
    }

    #[test]
    fn bravyi_kitaev_sets_for_eight_modes() {
        let (u, p, f) = index_sets(QubitMapping::BravyiKitaev, 0, 8);
        assert_eq!((u, p, f), (vec![1, 3, 7], vec![], vec![]));
        let (u, p, f) = index_sets(QubitMapping::BravyiKitaev, 3, 8);
        assert_eq!((u, p, f), (vec![7], vec![2, 1], vec![2, 1]));
        let (u, p, f) = index_sets(QubitMapping::BravyiKitaev, 6, 8);
        assert_eq!((u, p, f), (vec![7], vec![5, 3], vec![]));
    }

    #[test]
    fn occupations_encode() {
        let occ = [true, false, true, true];
        assert_eq!(occupation_to_qubits(QubitMapping::JordanWigner, &occ), occ);
        assert_eq!(
            occupation_to_qubits(QubitMapping::Parity, &occ),
            [true, true, false, true]
        );
        // BK: b0 = n0, b1 = n0+n1, b2 = n2, b3 = n0+n1+n2+n3
        assert_eq!(
            occupation_to_qubits(QubitMapping::BravyiKitaev, &occ),
            [true, true, true, true]
        );
    }

    #[test]
    fn number_operator_is_diagonal() {
        for mapping in [
            QubitMapping::JordanWigner,
            QubitMapping::Parity,
            QubitMapping::BravyiKitaev,
        ] {
            let ladders = LadderOperators::new(mapping, 4);
            for j in 0..4 {
                let mut n_j = ladders.product(&[(j, true), (j, false)]);
                n_j.simplify(1e-12);
                assert!((n_j.coefficient(&PauliString::identity()).re - 0.5).abs() < 1e-12);
                assert!(n_j.iter().all(|(p, _)| p.is_diagonal()));
            }
        }
    }

    #[test]
    fn reduction_rejects_off_diagonal_on_tapered_qubit() {
        let sum = PauliSum::from_term(
            PauliString::from_label("XIII").unwrap(),
            Complex64::new(1.0, 0.0),
        );
        let err = two_qubit_reduction(&sum, 4, (1, 1)).unwrap_err();
        assert!(matches!(err, ChemError::NotTaperable { qubit: 3, .. }));
    }

    #[test]
    fn reduction_substitutes_signs() {
        // Z0 Z1 Z3 on 4 qubits, one alpha and one beta electron.
        let sum = PauliSum::from_term(
            PauliString::from_label("ZIZZ").unwrap(),
            Complex64::new(2.0, 0.0),
        );
        let reduced = two_qubit_reduction(&sum, 4, (1, 1)).unwrap();
        // Alpha parity is odd and total parity even, leaving -2 Z0.
        assert_eq!(reduced.len(), 1);
        let expected = PauliString::from_label("Z").unwrap();
        assert!((reduced.coefficient(&expected).re + 2.0).abs() < 1e-12);
    }
}

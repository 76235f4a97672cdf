//! Second-quantised operators over spin orbitals.
//!
//! A [`FermionicOp`] is stored as one- and two-body coefficient tensors:
//!
//!   O = Σ_pq h1[p,q] a†_p a_q + ½ Σ_pqrs h2[p,q,r,s] a†_p a†_r a_s a_q
//!
//! with `h2` in chemists' ordering and invariant under `(pq) ↔ (rs)`.
//! Modes `0..n` are alpha spin orbitals and `n..2n` beta spin orbitals,
//! where `n` is the number of spatial orbitals.

use nalgebra::DMatrix;

use crate::integrals::Tensor4;

/// A number-conserving fermionic operator with at most two-body terms.
#[derive(Debug, Clone, PartialEq)]
pub struct FermionicOp {
    h1: DMatrix<f64>,
    h2: Option<Tensor4>,
}

impl FermionicOp {
    /// One-body operator `Σ h1[p,q] a†_p a_q`.
    pub fn one_body(h1: DMatrix<f64>) -> Self {
        Self { h1, h2: None }
    }

    /// Electronic Hamiltonian from spin-orbital integrals.
    pub fn from_integrals(h1: DMatrix<f64>, h2: Tensor4) -> Self {
        debug_assert_eq!(h1.nrows(), h2.dim());
        Self { h1, h2: Some(h2) }
    }

    /// Number of modes (spin orbitals).
    pub fn modes(&self) -> usize {
        self.h1.nrows()
    }

    /// One-body coefficients.
    pub fn h1(&self) -> &DMatrix<f64> {
        &self.h1
    }

    /// Two-body coefficients, if any.
    pub fn h2(&self) -> Option<&Tensor4> {
        self.h2.as_ref()
    }

    /// Total particle number `Σ_p a†_p a_p`.
    pub fn number_op(modes: usize) -> Self {
        Self::one_body(DMatrix::identity(modes, modes))
    }

    /// `S_z = ½ Σ_i (n_iα - n_iβ)`.
    pub fn s_z_op(modes: usize) -> Self {
        Self::one_body(DMatrix::from_diagonal(&spin_signs(modes).map(|s| 0.5 * s)))
    }

    /// `S² = S₋S₊ + S_z + S_z²`.
    pub fn s_squared_op(modes: usize) -> Self {
        let n = modes / 2;
        let signs = spin_signs(modes);
        let mut h1 = DMatrix::zeros(modes, modes);
        let mut h2 = Tensor4::zeros(modes);

        // S₋S₊ = Σ_ij a†_iβ a_iα a†_jα a_jβ
        //      = Σ_i n_iβ - Σ_ij a†_iβ a†_jα a_iα a_jβ
        for i in 0..n {
            h1[(i + n, i + n)] += 1.0;
            for j in 0..n {
                h2.add(i + n, j + n, j, i, -1.0);
                h2.add(j, i, i + n, j + n, -1.0);
            }
        }

        // S_z + S_z², with n_p n_q = δ_pq n_p + a†_p a†_q a_q a_p.
        for p in 0..modes {
            h1[(p, p)] += 0.5 * signs[p] + 0.25;
            for q in 0..modes {
                h2.add(p, p, q, q, 0.5 * signs[p] * signs[q]);
            }
        }

        Self { h1, h2: Some(h2) }
    }

    /// Remove modes from the operator.
    ///
    /// `frozen` modes are taken as occupied: their contribution collapses
    /// into the returned constant and the one-body mean field they exert on
    /// the remaining modes. `removed` modes are taken as empty and simply
    /// dropped. Remaining modes keep their relative order.
    pub fn freeze_and_remove(&self, frozen: &[usize], removed: &[usize]) -> (FermionicOp, f64) {
        let modes = self.modes();
        let mut h1 = self.h1.clone();
        let mut shift = 0.0;

        for &i in frozen {
            shift += self.h1[(i, i)];
        }
        if let Some(h2) = &self.h2 {
            for &i in frozen {
                for &j in frozen {
                    shift += 0.5 * (h2.get(i, i, j, j) - h2.get(i, j, j, i));
                }
            }
            for p in 0..modes {
                for q in 0..modes {
                    for &i in frozen {
                        h1[(p, q)] += h2.get(p, q, i, i) - h2.get(p, i, i, q);
                    }
                }
            }
        }

        let keep: Vec<usize> = (0..modes)
            .filter(|m| !frozen.contains(m) && !removed.contains(m))
            .collect();
        let k = keep.len();
        let h1 = DMatrix::from_fn(k, k, |a, b| h1[(keep[a], keep[b])]);
        let h2 = self.h2.as_ref().map(|h2| {
            let mut out = Tensor4::zeros(k);
            for (a, &p) in keep.iter().enumerate() {
                for (b, &q) in keep.iter().enumerate() {
                    for (c, &r) in keep.iter().enumerate() {
                        for (d, &s) in keep.iter().enumerate() {
                            out.set(a, b, c, d, h2.get(p, q, r, s));
                        }
                    }
                }
            }
            out
        });

        (FermionicOp { h1, h2 }, shift)
    }

    /// `⟨Φ|O|Φ⟩` for the Slater determinant occupying `occupied` modes.
    pub fn determinant_expectation(&self, occupied: &[usize]) -> f64 {
        let (_, value) = self.freeze_and_remove(occupied, &[]);
        value
    }
}

/// `+1` for alpha modes, `-1` for beta modes.
fn spin_signs(modes: usize) -> nalgebra::DVector<f64> {
    let n = modes / 2;
    nalgebra::DVector::from_fn(modes, |p, _| if p < n { 1.0 } else { -1.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn number_op_counts_frozen_electrons() {
        let op = FermionicOp::number_op(6);
        let (reduced, shift) = op.freeze_and_remove(&[0, 3], &[2, 5]);
        assert_eq!(reduced.modes(), 2);
        assert_abs_diff_eq!(shift, 2.0);
        assert_eq!(reduced.h1(), &DMatrix::identity(2, 2));
    }

    #[test]
    fn spin_operators_on_determinants() {
        // Two spatial orbitals: modes 0,1 alpha; 2,3 beta.
        let s2 = FermionicOp::s_squared_op(4);
        let sz = FermionicOp::s_z_op(4);
        // Closed shell: S = 0.
        assert_abs_diff_eq!(s2.determinant_expectation(&[0, 2]), 0.0, epsilon = 1e-12);
        // High-spin triplet: S(S+1) = 2, M = 1.
        assert_abs_diff_eq!(s2.determinant_expectation(&[0, 1]), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sz.determinant_expectation(&[0, 1]), 1.0, epsilon = 1e-12);
        // Open-shell singlet determinant: ⟨S²⟩ = 1.
        assert_abs_diff_eq!(s2.determinant_expectation(&[0, 3]), 1.0, epsilon = 1e-12);
        // Doublet: 3/4.
        assert_abs_diff_eq!(s2.determinant_expectation(&[1]), 0.75, epsilon = 1e-12);
    }
}

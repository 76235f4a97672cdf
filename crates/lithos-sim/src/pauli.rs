//! Pauli operators and complex-weighted Pauli sums.
//!
//! Fermion-to-qubit mappings produce products of Pauli strings with
//! complex phases that only cancel to real coefficients once every term of
//! a Hermitian operator has been collected, so the algebra here works with
//! `Complex64` weights throughout. [`crate::Hamiltonian`] is the real,
//! ordered form handed to the simulator.

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PauliOp {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl PauliOp {
    /// Single-site product `self · rhs` as `(i^phase, op)`.
    ///
    /// `phase` is the power of `i`, in `0..4`.
    #[inline]
    pub fn mul(self, rhs: PauliOp) -> (u8, PauliOp) {
        use PauliOp::{I, X, Y, Z};
        match (self, rhs) {
            (I, p) | (p, I) => (0, p),
            (X, X) | (Y, Y) | (Z, Z) => (0, I),
            (X, Y) => (1, Z),
            (Y, X) => (3, Z),
            (Y, Z) => (1, X),
            (Z, Y) => (3, X),
            (Z, X) => (1, Y),
            (X, Z) => (3, Y),
        }
    }

    /// Label character.
    pub fn as_char(self) -> char {
        match self {
            PauliOp::I => 'I',
            PauliOp::X => 'X',
            PauliOp::Y => 'Y',
            PauliOp::Z => 'Z',
        }
    }
}

/// `i^k` for `k` in `0..4`.
#[inline]
pub fn i_pow(k: u8) -> Complex64 {
    match k % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

/// A tensor product of Pauli operators on named qubits.
///
/// Stored as a sorted `Vec<(qubit_index, PauliOp)>` with Identity terms
/// omitted.  Qubits not listed are implicitly I.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PauliString {
    /// Non-identity terms, sorted by qubit index ascending.
    ops: Vec<(u32, PauliOp)>,
}

impl PauliString {
    /// The identity string.
    pub fn identity() -> Self {
        Self { ops: vec![] }
    }

    /// Construct a PauliString from an iterator of (qubit, op) pairs.
    ///
    /// Identity operators are dropped; the remaining ops are sorted by qubit.
    /// Repeated qubits are multiplied together and the resulting phase is
    /// discarded, so callers that need the phase should use [`Self::mul`].
    pub fn from_ops(ops: impl IntoIterator<Item = (u32, PauliOp)>) -> Self {
        let mut v: Vec<(u32, PauliOp)> = ops
            .into_iter()
            .filter(|(_, op)| *op != PauliOp::I)
            .collect();
        v.sort_by_key(|(q, _)| *q);
        let mut merged: Vec<(u32, PauliOp)> = Vec::with_capacity(v.len());
        for (q, op) in v {
            match merged.last_mut() {
                Some((lq, lop)) if *lq == q => {
                    *lop = lop.mul(op).1;
                }
                _ => merged.push((q, op)),
            }
        }
        merged.retain(|(_, op)| *op != PauliOp::I);
        Self { ops: merged }
    }

    /// Parse a dense label such as `"IXZY"`; the rightmost character is qubit 0.
    pub fn from_label(label: &str) -> Option<Self> {
        let n = label.chars().count();
        let mut ops = Vec::with_capacity(n);
        for (pos, c) in label.chars().enumerate() {
            let q = u32::try_from(n - 1 - pos).ok()?;
            let op = match c {
                'I' => PauliOp::I,
                'X' => PauliOp::X,
                'Y' => PauliOp::Y,
                'Z' => PauliOp::Z,
                _ => return None,
            };
            ops.push((q, op));
        }
        Some(Self::from_ops(ops))
    }

    /// Construct a Z⊗Z⊗...⊗Z string spanning the given qubits.
    pub fn zz(qubits: impl IntoIterator<Item = u32>) -> Self {
        Self::from_ops(qubits.into_iter().map(|q| (q, PauliOp::Z)))
    }

    /// Return the non-identity (qubit, op) pairs, sorted by qubit index.
    pub fn ops(&self) -> &[(u32, PauliOp)] {
        &self.ops
    }

    /// The operator acting on `qubit`.
    pub fn get(&self, qubit: u32) -> PauliOp {
        self.ops
            .binary_search_by_key(&qubit, |(q, _)| *q)
            .map_or(PauliOp::I, |i| self.ops[i].1)
    }

    /// True if there are no non-identity operators (pure global phase).
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of non-identity factors.
    pub fn weight(&self) -> usize {
        self.ops.len()
    }

    /// The highest qubit index referenced, or `None` for an identity string.
    pub fn max_qubit(&self) -> Option<u32> {
        self.ops.last().map(|(q, _)| *q)
    }

    /// True if every factor is I or Z.
    pub fn is_diagonal(&self) -> bool {
        self.ops.iter().all(|(_, op)| *op == PauliOp::Z)
    }

    /// Product `self · rhs` as `(i^phase, string)`.
    pub fn mul(&self, rhs: &PauliString) -> (u8, PauliString) {
        let mut ops = Vec::with_capacity(self.ops.len() + rhs.ops.len());
        let mut phase = 0u8;
        let (mut i, mut j) = (0, 0);
        while i < self.ops.len() && j < rhs.ops.len() {
            let (qa, a) = self.ops[i];
            let (qb, b) = rhs.ops[j];
            if qa < qb {
                ops.push((qa, a));
                i += 1;
            } else if qb < qa {
                ops.push((qb, b));
                j += 1;
            } else {
                let (p, op) = a.mul(b);
                phase = (phase + p) % 4;
                if op != PauliOp::I {
                    ops.push((qa, op));
                }
                i += 1;
                j += 1;
            }
        }
        ops.extend_from_slice(&self.ops[i..]);
        ops.extend_from_slice(&rhs.ops[j..]);
        (phase, PauliString { ops })
    }

    /// True if the two strings commute.
    pub fn commutes_with(&self, other: &PauliString) -> bool {
        let mut anti = 0usize;
        let (mut i, mut j) = (0, 0);
        while i < self.ops.len() && j < other.ops.len() {
            let (qa, a) = self.ops[i];
            let (qb, b) = other.ops[j];
            if qa < qb {
                i += 1;
            } else if qb < qa {
                j += 1;
            } else {
                if a != b {
                    anti += 1;
                }
                i += 1;
                j += 1;
            }
        }
        anti % 2 == 0
    }

    /// Bit masks `(x, z)` with bit `q` set where the factor on qubit `q`
    /// has an X or Z component (Y sets both).
    ///
    /// Only meaningful for strings on fewer than 64 qubits.
    pub fn masks(&self) -> (u64, u64) {
        let mut x = 0u64;
        let mut z = 0u64;
        for &(q, op) in &self.ops {
            let bit = 1u64 << q;
            match op {
                PauliOp::X => x |= bit,
                PauliOp::Y => {
                    x |= bit;
                    z |= bit;
                }
                PauliOp::Z => z |= bit,
                PauliOp::I => {}
            }
        }
        (x, z)
    }

    /// Dense label over `num_qubits` qubits, qubit 0 rightmost.
    pub fn to_label(&self, num_qubits: u32) -> String {
        (0..num_qubits)
            .rev()
            .map(|q| self.get(q).as_char())
            .collect()
    }

    /// Relabel qubits through `f`; factors mapped to `None` are dropped.
    pub fn remap(&self, mut f: impl FnMut(u32) -> Option<u32>) -> PauliString {
        PauliString::from_ops(
            self.ops
                .iter()
                .filter_map(|&(q, op)| f(q).map(|nq| (nq, op))),
        )
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "I");
        }
        let parts: Vec<String> = self
            .ops
            .iter()
            .map(|(q, op)| format!("{}{q}", op.as_char()))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// A complex-weighted sum of Pauli strings.
#[derive(Debug, Clone, Default)]
pub struct PauliSum {
    terms: FxHashMap<PauliString, Complex64>,
}

impl PauliSum {
    /// The zero operator.
    pub fn new() -> Self {
        Self::default()
    }

    /// `coeff · I`.
    pub fn identity(coeff: Complex64) -> Self {
        Self::from_term(PauliString::identity(), coeff)
    }

    /// A single weighted string.
    pub fn from_term(pauli: PauliString, coeff: Complex64) -> Self {
        let mut sum = Self::new();
        sum.add_term(pauli, coeff);
        sum
    }

    /// Accumulate `coeff · pauli`.
    pub fn add_term(&mut self, pauli: PauliString, coeff: Complex64) {
        *self.terms.entry(pauli).or_insert(Complex64::new(0.0, 0.0)) += coeff;
    }

    /// Accumulate every term of `other`.
    pub fn add(&mut self, other: &PauliSum) {
        for (p, c) in &other.terms {
            self.add_term(p.clone(), *c);
        }
    }

    /// Multiply every coefficient by `factor`.
    pub fn scale(&mut self, factor: Complex64) {
        for c in self.terms.values_mut() {
            *c *= factor;
        }
    }

    /// Operator product `self · rhs`.
    pub fn mul(&self, rhs: &PauliSum) -> PauliSum {
        let mut out = PauliSum::new();
        for (pa, ca) in &self.terms {
            for (pb, cb) in &rhs.terms {
                let (phase, p) = pa.mul(pb);
                out.add_term(p, ca * cb * i_pow(phase));
            }
        }
        out
    }

    /// Hermitian adjoint (Pauli strings are Hermitian, so only the
    /// coefficients are conjugated).
    pub fn adjoint(&self) -> PauliSum {
        PauliSum {
            terms: self
                .terms
                .iter()
                .map(|(p, c)| (p.clone(), c.conj()))
                .collect(),
        }
    }

    /// Drop terms whose magnitude is at most `tol`.
    pub fn simplify(&mut self, tol: f64) {
        self.terms.retain(|_, c| c.norm() > tol);
    }

    /// Coefficient of `pauli` (zero if absent).
    pub fn coefficient(&self, pauli: &PauliString) -> Complex64 {
        self.terms
            .get(pauli)
            .copied()
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// Terms sorted by Pauli string, for deterministic iteration.
    pub fn sorted_terms(&self) -> Vec<(PauliString, Complex64)> {
        let mut v: Vec<_> = self.terms.iter().map(|(p, c)| (p.clone(), *c)).collect();
        v.sort_by(|a, b| a.0.cmp(&b.0));
        v
    }

    /// Unordered view of the terms.
    pub fn iter(&self) -> impl Iterator<Item = (&PauliString, &Complex64)> {
        self.terms.iter()
    }

    /// Number of stored terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if no terms are stored.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Smallest register that holds every term.
    pub fn min_qubits(&self) -> u32 {
        self.terms
            .keys()
            .filter_map(PauliString::max_qubit)
            .max()
            .map_or(0, |q| q + 1)
    }
}

impl FromIterator<(PauliString, Complex64)> for PauliSum {
    fn from_iter<T: IntoIterator<Item = (PauliString, Complex64)>>(iter: T) -> Self {
        let mut sum = PauliSum::new();
        for (p, c) in iter {
            sum.add_term(p, c);
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_site_products() {
        assert_eq!(PauliOp::X.mul(PauliOp::Y), (1, PauliOp::Z));
        assert_eq!(PauliOp::Y.mul(PauliOp::X), (3, PauliOp::Z));
        assert_eq!(PauliOp::Z.mul(PauliOp::Z), (0, PauliOp::I));
    }

    #[test]
    fn string_product_merges() {
        let a = PauliString::from_ops([(0, PauliOp::X), (2, PauliOp::Z)]);
        let b = PauliString::from_ops([(0, PauliOp::Y), (1, PauliOp::X)]);
        let (phase, p) = a.mul(&b);
        assert_eq!(phase, 1);
        assert_eq!(
            p.ops(),
            &[(0, PauliOp::Z), (1, PauliOp::X), (2, PauliOp::Z)]
        );
    }

    #[test]
    fn label_round_trip() {
        let p = PauliString::from_label("XIZY").unwrap();
        assert_eq!(p.get(0), PauliOp::Y);
        assert_eq!(p.get(1), PauliOp::Z);
        assert_eq!(p.get(3), PauliOp::X);
        assert_eq!(p.to_label(4), "XIZY");
        assert!(PauliString::from_label("XQ").is_none());
    }

    #[test]
    fn masks_mark_y_twice() {
        let p = PauliString::from_label("YXZ").unwrap();
        assert_eq!(p.masks(), (0b110, 0b101));
    }

    #[test]
    fn commutation() {
        let xx = PauliString::from_label("XX").unwrap();
        let zz = PauliString::from_label("ZZ").unwrap();
        let zi = PauliString::from_label("ZI").unwrap();
        assert!(xx.commutes_with(&zz));
        assert!(!xx.commutes_with(&zi));
    }

    #[test]
    fn sum_product_cancels_imaginary_parts() {
        // (X + iY)(X - iY) / 4 = (1 + Z) / 2
        let mut plus = PauliSum::from_term(
            PauliString::from_ops([(0, PauliOp::X)]),
            Complex64::new(0.5, 0.0),
        );
        plus.add_term(
            PauliString::from_ops([(0, PauliOp::Y)]),
            Complex64::new(0.0, 0.5),
        );
        let minus = plus.adjoint();
        let mut product = plus.mul(&minus);
        product.simplify(1e-12);
        assert_eq!(product.len(), 2);
        let id = product.coefficient(&PauliString::identity());
        let z = product.coefficient(&PauliString::from_ops([(0, PauliOp::Z)]));
        assert!((id - Complex64::new(0.5, 0.0)).norm() < 1e-12);
        assert!((z - Complex64::new(0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn remap_drops_and_relabels() {
        let p = PauliString::from_label("ZXZ").unwrap();
        let q = p.remap(|q| if q == 1 { None } else { Some(q / 2) });
        assert_eq!(q.ops(), &[(0, PauliOp::Z), (1, PauliOp::Z)]);
    }
}

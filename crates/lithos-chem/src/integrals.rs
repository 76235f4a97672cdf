//! One- and two-electron integrals over contracted Cartesian Gaussians.
//!
//! Everything is evaluated with the McMurchie–Davidson scheme: products of
//! Gaussians are expanded in Hermite Gaussians with coefficients
//! `E^{ij}_t`, and Coulomb-type integrals reduce to the auxiliary Hermite
//! integrals `R_{tuv}` built from the Boys function.
//!
//! Two-electron integrals are in chemists' notation,
//! `(pq|rs) = ∫∫ p(1) q(1) r₁₂⁻¹ r(2) s(2)`.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use crate::basis::{BasisFunction, BasisSet};
use crate::molecule::Molecule;

// =============================================================================
// Four-index tensor
// =============================================================================

/// Dense `n⁴` tensor indexed `[p, q, r, s]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor4 {
    dim: usize,
    data: Vec<f64>,
}

impl Tensor4 {
    /// All-zero tensor.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            data: vec![0.0; dim.pow(4)],
        }
    }

    /// Side length.
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    fn offset(&self, p: usize, q: usize, r: usize, s: usize) -> usize {
        ((p * self.dim + q) * self.dim + r) * self.dim + s
    }

    /// Element `[p, q, r, s]`.
    #[inline]
    pub fn get(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.data[self.offset(p, q, r, s)]
    }

    /// Overwrite element `[p, q, r, s]`.
    #[inline]
    pub fn set(&mut self, p: usize, q: usize, r: usize, s: usize, value: f64) {
        let k = self.offset(p, q, r, s);
        self.data[k] = value;
    }

    /// Accumulate into element `[p, q, r, s]`.
    #[inline]
    pub fn add(&mut self, p: usize, q: usize, r: usize, s: usize, value: f64) {
        let k = self.offset(p, q, r, s);
        self.data[k] += value;
    }

    /// Store a value in all eight positions related by the real-orbital
    /// permutational symmetry of `(pq|rs)`.
    pub fn set_symmetric(&mut self, p: usize, q: usize, r: usize, s: usize, value: f64) {
        for (a, b, c, d) in [
            (p, q, r, s),
            (q, p, r, s),
            (p, q, s, r),
            (q, p, s, r),
            (r, s, p, q),
            (s, r, p, q),
            (r, s, q, p),
            (s, r, q, p),
        ] {
            self.set(a, b, c, d, value);
        }
    }

    /// Transform all four indices: `Σ c1[a,p] c2[b,q] c3[c,r] c4[d,s] (ab|cd)`.
    ///
    /// Done as four quarter transformations, `O(n⁵)`.
    pub fn transform(
        &self,
        c1: &DMatrix<f64>,
        c2: &DMatrix<f64>,
        c3: &DMatrix<f64>,
        c4: &DMatrix<f64>,
    ) -> Tensor4 {
        let n = self.dim;
        let step = |input: &Tensor4, c: &DMatrix<f64>, axis: usize| -> Tensor4 {
            let mut out = Tensor4::zeros(n);
            for i in 0..n {
                for j in 0..n {
                    for k in 0..n {
                        for l in 0..n {
                            let mut acc = 0.0;
                            for m in 0..n {
                                let (idx, coeff) = match axis {
                                    0 => (input.get(m, j, k, l), c[(m, i)]),
                                    1 => (input.get(i, m, k, l), c[(m, j)]),
                                    2 => (input.get(i, j, m, l), c[(m, k)]),
                                    _ => (input.get(i, j, k, m), c[(m, l)]),
                                };
                                acc += coeff * idx;
                            }
                            out.set(i, j, k, l, acc);
                        }
                    }
                }
            }
            out
        };
        let t = step(self, c1, 0);
        let t = step(&t, c2, 1);
        let t = step(&t, c3, 2);
        step(&t, c4, 3)
    }
}

// =============================================================================
// Boys function
// =============================================================================

/// Switch-over point between the power series and the asymptotic form.
const BOYS_SERIES_LIMIT: f64 = 30.0;

/// `F_n(T) = ∫₀¹ t^{2n} exp(-T t²) dt`.
pub fn boys(n: u32, t: f64) -> f64 {
    let two_n_plus_one = f64::from(2 * n + 1);
    if t < 1e-15 {
        return 1.0 / two_n_plus_one;
    }
    if t <= BOYS_SERIES_LIMIT {
        // e^{-T} Σ_k (2T)^k / ((2n+1)(2n+3)…(2n+2k+1))
        let mut term = 1.0 / two_n_plus_one;
        let mut sum = term;
        let mut denom = two_n_plus_one;
        for _ in 0..1000 {
            denom += 2.0;
            term *= 2.0 * t / denom;
            sum += term;
            if term < sum * 1e-17 {
                break;
            }
        }
        return (-t).exp() * sum;
    }
    // F_0 = ½ √(π/T) erf(√T); erf(√T) is 1 to double precision past 30.
    let exp_t = (-t).exp();
    let mut f = 0.5 * (PI / t).sqrt();
    for k in 0..n {
        f = (f64::from(2 * k + 1) * f - exp_t) / (2.0 * t);
    }
    f
}

// =============================================================================
// Hermite expansion
// =============================================================================

/// Hermite expansion coefficient `E^{ij}_t` for the 1D Gaussian product
/// `x_A^i exp(-a x_A²) · x_B^j exp(-b x_B²)`, with `qx = A_x - B_x`.
pub fn hermite_coefficient(i: i32, j: i32, t: i32, qx: f64, a: f64, b: f64) -> f64 {
    if t < 0 || i < 0 || j < 0 || t > i + j {
        return 0.0;
    }
    let p = a + b;
    let q = a * b / p;
    if i == 0 && j == 0 {
        return (-q * qx * qx).exp();
    }
    if j == 0 {
        hermite_coefficient(i - 1, j, t - 1, qx, a, b) / (2.0 * p)
            - (q * qx / a) * hermite_coefficient(i - 1, j, t, qx, a, b)
            + f64::from(t + 1) * hermite_coefficient(i - 1, j, t + 1, qx, a, b)
    } else {
        hermite_coefficient(i, j - 1, t - 1, qx, a, b) / (2.0 * p)
            + (q * qx / b) * hermite_coefficient(i, j - 1, t, qx, a, b)
            + f64::from(t + 1) * hermite_coefficient(i, j - 1, t + 1, qx, a, b)
    }
}

/// Auxiliary Hermite Coulomb integral `R^n_{tuv}(p, P - C)`.
fn hermite_coulomb(t: i32, u: i32, v: i32, n: u32, p: f64, pc: [f64; 3]) -> f64 {
    if t < 0 || u < 0 || v < 0 {
        return 0.0;
    }
    if t == 0 && u == 0 && v == 0 {
        let r2 = pc[0] * pc[0] + pc[1] * pc[1] + pc[2] * pc[2];
        return (-2.0 * p).powi(n as i32) * boys(n, p * r2);
    }
    if t == 0 && u == 0 {
        f64::from(v - 1) * hermite_coulomb(t, u, v - 2, n + 1, p, pc)
            + pc[2] * hermite_coulomb(t, u, v - 1, n + 1, p, pc)
    } else if t == 0 {
        f64::from(u - 1) * hermite_coulomb(t, u - 2, v, n + 1, p, pc)
            + pc[1] * hermite_coulomb(t, u - 1, v, n + 1, p, pc)
    } else {
        f64::from(t - 1) * hermite_coulomb(t - 2, u, v, n + 1, p, pc)
            + pc[0] * hermite_coulomb(t - 1, u, v, n + 1, p, pc)
    }
}

fn powers_i32(powers: [u32; 3]) -> [i32; 3] {
    powers.map(|x| x as i32)
}

fn gaussian_product_center(a: f64, ra: [f64; 3], b: f64, rb: [f64; 3]) -> [f64; 3] {
    let p = a + b;
    [0, 1, 2].map(|k| (a * ra[k] + b * rb[k]) / p)
}

// =============================================================================
// Primitive integrals
// =============================================================================

/// Overlap of two primitive Cartesian Gaussians (unnormalised).
fn primitive_overlap(a: f64, la: [i32; 3], ra: [f64; 3], b: f64, lb: [i32; 3], rb: [f64; 3]) -> f64 {
    let p = a + b;
    let mut s = (PI / p).powf(1.5);
    for k in 0..3 {
        s *= hermite_coefficient(la[k], lb[k], 0, ra[k] - rb[k], a, b);
    }
    s
}

/// Kinetic-energy integral `⟨a|-½∇²|b⟩` of two primitives.
fn primitive_kinetic(a: f64, la: [i32; 3], ra: [f64; 3], b: f64, lb: [i32; 3], rb: [f64; 3]) -> f64 {
    let shifted = |k: usize, delta: i32| {
        let mut l = lb;
        l[k] += delta;
        primitive_overlap(a, la, ra, b, l, rb)
    };
    let total = lb[0] + lb[1] + lb[2];
    let term0 = b * f64::from(2 * total + 3) * primitive_overlap(a, la, ra, b, lb, rb);
    let term1 = -2.0 * b * b * (0..3).map(|k| shifted(k, 2)).sum::<f64>();
    let term2 = -0.5
        * (0..3)
            .map(|k| f64::from(lb[k] * (lb[k] - 1)) * shifted(k, -2))
            .sum::<f64>();
    term0 + term1 + term2
}

/// `⟨a| 1/|r - C| |b⟩` of two primitives.
fn primitive_nuclear(
    a: f64,
    la: [i32; 3],
    ra: [f64; 3],
    b: f64,
    lb: [i32; 3],
    rb: [f64; 3],
    c: [f64; 3],
) -> f64 {
    let p = a + b;
    let center = gaussian_product_center(a, ra, b, rb);
    let pc = [0, 1, 2].map(|k| center[k] - c[k]);
    let mut val = 0.0;
    for t in 0..=la[0] + lb[0] {
        let ex = hermite_coefficient(la[0], lb[0], t, ra[0] - rb[0], a, b);
        for u in 0..=la[1] + lb[1] {
            let ey = hermite_coefficient(la[1], lb[1], u, ra[1] - rb[1], a, b);
            for v in 0..=la[2] + lb[2] {
                let ez = hermite_coefficient(la[2], lb[2], v, ra[2] - rb[2], a, b);
                val += ex * ey * ez * hermite_coulomb(t, u, v, 0, p, pc);
            }
        }
    }
    2.0 * PI / p * val
}

/// Dipole integral `⟨a| r_axis |b⟩` about the origin.
fn primitive_dipole(
    a: f64,
    la: [i32; 3],
    ra: [f64; 3],
    b: f64,
    lb: [i32; 3],
    rb: [f64; 3],
    axis: usize,
) -> f64 {
    let p = a + b;
    let center = gaussian_product_center(a, ra, b, rb);
    let mut val = (PI / p).powf(1.5);
    for k in 0..3 {
        let qx = ra[k] - rb[k];
        if k == axis {
            val *= hermite_coefficient(la[k], lb[k], 1, qx, a, b)
                + center[k] * hermite_coefficient(la[k], lb[k], 0, qx, a, b);
        } else {
            val *= hermite_coefficient(la[k], lb[k], 0, qx, a, b);
        }
    }
    val
}

/// Hermite coefficients `E_t E_u E_v` of one Gaussian pair, flattened.
struct PairExpansion {
    exponent: f64,
    center: [f64; 3],
    max: [i32; 3],
    coefficients: Vec<f64>,
}

impl PairExpansion {
    fn new(a: f64, la: [i32; 3], ra: [f64; 3], b: f64, lb: [i32; 3], rb: [f64; 3]) -> Self {
        let max = [0, 1, 2].map(|k| la[k] + lb[k]);
        let mut coefficients = Vec::new();
        for t in 0..=max[0] {
            let ex = hermite_coefficient(la[0], lb[0], t, ra[0] - rb[0], a, b);
            for u in 0..=max[1] {
                let ey = hermite_coefficient(la[1], lb[1], u, ra[1] - rb[1], a, b);
                for v in 0..=max[2] {
                    let ez = hermite_coefficient(la[2], lb[2], v, ra[2] - rb[2], a, b);
                    coefficients.push(ex * ey * ez);
                }
            }
        }
        Self {
            exponent: a + b,
            center: gaussian_product_center(a, ra, b, rb),
            max,
            coefficients,
        }
    }

    fn iter(&self) -> impl Iterator<Item = ((i32, i32, i32), f64)> + '_ {
        let [mt, mu, mv] = self.max;
        (0..=mt)
            .flat_map(move |t| (0..=mu).flat_map(move |u| (0..=mv).map(move |v| (t, u, v))))
            .zip(self.coefficients.iter().copied())
    }
}

/// Electron-repulsion integral over four primitives given their pair
/// expansions.
fn primitive_eri(ab: &PairExpansion, cd: &PairExpansion) -> f64 {
    let p = ab.exponent;
    let q = cd.exponent;
    let alpha = p * q / (p + q);
    let pq = [0, 1, 2].map(|k| ab.center[k] - cd.center[k]);
    let mut val = 0.0;
    for ((t, u, v), e1) in ab.iter() {
        if e1 == 0.0 {
            continue;
        }
        for ((tau, nu, phi), e2) in cd.iter() {
            if e2 == 0.0 {
                continue;
            }
            let sign = if (tau + nu + phi) % 2 == 0 { 1.0 } else { -1.0 };
            val += e1 * sign * e2 * hermite_coulomb(t + tau, u + nu, v + phi, 0, alpha, pq);
        }
    }
    2.0 * PI.powf(2.5) / (p * q * (p + q).sqrt()) * val
}

// =============================================================================
// Contracted integrals
// =============================================================================

/// Overlap `⟨μ|ν⟩`.
pub fn overlap(mu: &BasisFunction, nu: &BasisFunction) -> f64 {
    let (la, lb) = (powers_i32(mu.powers), powers_i32(nu.powers));
    let mut s = 0.0;
    for (a, ca) in mu.primitives() {
        for (b, cb) in nu.primitives() {
            s += ca * cb * primitive_overlap(a, la, mu.center, b, lb, nu.center);
        }
    }
    s
}

/// Kinetic energy `⟨μ|-½∇²|ν⟩`.
pub fn kinetic(mu: &BasisFunction, nu: &BasisFunction) -> f64 {
    let (la, lb) = (powers_i32(mu.powers), powers_i32(nu.powers));
    let mut t = 0.0;
    for (a, ca) in mu.primitives() {
        for (b, cb) in nu.primitives() {
            t += ca * cb * primitive_kinetic(a, la, mu.center, b, lb, nu.center);
        }
    }
    t
}

/// Electron–nuclear attraction `⟨μ| -Σ_A Z_A/|r - R_A| |ν⟩`.
pub fn nuclear_attraction(mu: &BasisFunction, nu: &BasisFunction, molecule: &Molecule) -> f64 {
    let (la, lb) = (powers_i32(mu.powers), powers_i32(nu.powers));
    let mut v = 0.0;
    for atom in molecule.atoms() {
        let mut site = 0.0;
        for (a, ca) in mu.primitives() {
            for (b, cb) in nu.primitives() {
                site += ca * cb * primitive_nuclear(a, la, mu.center, b, lb, nu.center, atom.position);
            }
        }
        v -= atom.charge() * site;
    }
    v
}

/// Dipole integral `⟨μ| r_axis |ν⟩` about the origin.
pub fn dipole(mu: &BasisFunction, nu: &BasisFunction, axis: usize) -> f64 {
    let (la, lb) = (powers_i32(mu.powers), powers_i32(nu.powers));
    let mut d = 0.0;
    for (a, ca) in mu.primitives() {
        for (b, cb) in nu.primitives() {
            d += ca * cb * primitive_dipole(a, la, mu.center, b, lb, nu.center, axis);
        }
    }
    d
}

fn pair_expansions(mu: &BasisFunction, nu: &BasisFunction) -> Vec<(f64, PairExpansion)> {
    let (la, lb) = (powers_i32(mu.powers), powers_i32(nu.powers));
    let mut pairs = Vec::with_capacity(mu.exponents.len() * nu.exponents.len());
    for (a, ca) in mu.primitives() {
        for (b, cb) in nu.primitives() {
            pairs.push((ca * cb, PairExpansion::new(a, la, mu.center, b, lb, nu.center)));
        }
    }
    pairs
}

/// All AO integrals needed by Hartree–Fock and the Hamiltonian core.
#[derive(Debug, Clone)]
pub struct AoIntegrals {
    /// Overlap `S`.
    pub overlap: DMatrix<f64>,
    /// Kinetic energy `T`.
    pub kinetic: DMatrix<f64>,
    /// Nuclear attraction `V`.
    pub nuclear: DMatrix<f64>,
    /// Dipole integrals `x, y, z` about the origin.
    pub dipole: [DMatrix<f64>; 3],
    /// Electron repulsion `(μν|λσ)`.
    pub eri: Tensor4,
}

impl AoIntegrals {
    /// Evaluate every integral over `basis` for the nuclei of `molecule`.
    pub fn compute(basis: &BasisSet, molecule: &Molecule) -> Self {
        let functions = basis.functions();
        let n = functions.len();
        debug!(n_ao = n, "computing one-electron integrals");

        let one_body = |f: &dyn Fn(&BasisFunction, &BasisFunction) -> f64| {
            let mut m = DMatrix::zeros(n, n);
            for i in 0..n {
                for j in 0..=i {
                    let v = f(&functions[i], &functions[j]);
                    m[(i, j)] = v;
                    m[(j, i)] = v;
                }
            }
            m
        };
        let overlap = one_body(&overlap);
        let kinetic = one_body(&kinetic);
        let nuclear = one_body(&|a, b| nuclear_attraction(a, b, molecule));
        let dipole = [0, 1, 2].map(|axis| one_body(&|a, b| dipole(a, b, axis)));

        debug!(n_ao = n, "computing electron repulsion integrals");
        let pairs: Vec<Vec<Vec<(f64, PairExpansion)>>> = (0..n)
            .map(|i| (0..n).map(|j| pair_expansions(&functions[i], &functions[j])).collect())
            .collect();
        let mut eri = Tensor4::zeros(n);
        for i in 0..n {
            for j in 0..=i {
                let ij = i * (i + 1) / 2 + j;
                for k in 0..n {
                    for l in 0..=k {
                        let kl = k * (k + 1) / 2 + l;
                        if kl > ij {
                            continue;
                        }
                        let mut value = 0.0;
                        for (c1, e1) in &pairs[i][j] {
                            for (c2, e2) in &pairs[k][l] {
                                value += c1 * c2 * primitive_eri(e1, e2);
                            }
                        }
                        eri.set_symmetric(i, j, k, l, value);
                    }
                }
            }
        }

        Self {
            overlap,
            kinetic,
            nuclear,
            dipole,
            eri,
        }
    }

    /// Core Hamiltonian `H = T + V`.
    pub fn core_hamiltonian(&self) -> DMatrix<f64> {
        &self.kinetic + &self.nuclear
    }

    /// Number of atomic orbitals.
    pub fn num_ao(&self) -> usize {
        self.overlap.nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn boys_limits() {
        assert_relative_eq!(boys(0, 0.0), 1.0);
        assert_relative_eq!(boys(2, 0.0), 0.2);
        // F_0(T) = ½ √(π/T) erf(√T); erf(1) = 0.8427007929497149
        assert_relative_eq!(boys(0, 1.0), 0.5 * PI.sqrt() * 0.842_700_792_949_714_9, epsilon = 1e-14);
    }

    #[test]
    fn boys_is_continuous_at_switch() {
        for n in 0..6 {
            let below = boys(n, BOYS_SERIES_LIMIT);
            let above = boys(n, BOYS_SERIES_LIMIT + 1e-9);
            assert_relative_eq!(below, above, max_relative = 1e-9);
        }
    }

    #[test]
    fn boys_downward_recursion_identity() {
        // F_n(T) = (2T F_{n+1}(T) + e^{-T}) / (2n + 1)
        for &t in &[0.1, 2.5, 12.0, 45.0] {
            for n in 0..4 {
                let lhs = boys(n, t);
                let rhs = (2.0 * t * boys(n + 1, t) + (-t).exp()) / f64::from(2 * n + 1);
                assert_relative_eq!(lhs, rhs, max_relative = 1e-10);
            }
        }
    }

    #[test]
    fn hermite_base_case() {
        let (a, b, qx) = (0.8, 1.3, 0.4);
        let q = a * b / (a + b);
        assert_relative_eq!(hermite_coefficient(0, 0, 0, qx, a, b), (-q * qx * qx).exp());
        assert_eq!(hermite_coefficient(1, 0, 2, qx, a, b), 0.0);
        assert_eq!(hermite_coefficient(0, 0, -1, qx, a, b), 0.0);
    }

    #[test]
    fn tensor_symmetric_store() {
        let mut t = Tensor4::zeros(3);
        t.set_symmetric(2, 1, 0, 2, 0.7);
        assert_eq!(t.get(1, 2, 2, 0), 0.7);
        assert_eq!(t.get(0, 2, 1, 2), 0.7);
        assert_eq!(t.get(2, 0, 2, 1), 0.7);
        assert_eq!(t.get(1, 2, 0, 1), 0.0);
    }

    #[test]
    fn identity_transform_is_noop() {
        let mut t = Tensor4::zeros(2);
        t.set_symmetric(0, 1, 1, 1, 0.3);
        t.set_symmetric(0, 0, 0, 0, 0.9);
        let id = DMatrix::identity(2, 2);
        assert_eq!(t.transform(&id, &id, &id, &id), t);
    }
}

//! Contracted Cartesian Gaussian basis sets.
//!
//! Only STO-3G is built in. Each element contributes a 1s shell and, from
//! lithium on, a 2sp shell that shares exponents between the 2s and the
//! three 2p functions. Atomic orbitals are ordered by atom, then by shell,
//! with p functions as x, y, z.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{ChemError, ChemResult};
use crate::molecule::{Element, Molecule};

const STO3G_1S: [f64; 3] = [0.154_328_97, 0.535_328_14, 0.444_634_54];
const STO3G_2SP_S: [f64; 3] = [-0.099_967_23, 0.399_512_83, 0.700_115_47];
const STO3G_2SP_P: [f64; 3] = [0.155_916_27, 0.607_683_72, 0.391_957_39];

/// `(1s exponents, 2sp exponents)` per element.
fn sto3g_exponents(element: Element) -> ([f64; 3], Option<[f64; 3]>) {
    match element {
        Element::H => ([3.425_250_91, 0.623_913_73, 0.168_855_40], None),
        Element::He => ([6.362_421_39, 1.158_923_00, 0.313_649_79], None),
        Element::Li => (
            [16.119_575_0, 2.936_200_7, 0.794_650_5],
            Some([0.636_289_7, 0.147_860_1, 0.048_088_7]),
        ),
        Element::Be => (
            [30.167_871_0, 5.495_115_3, 1.487_192_7],
            Some([1.314_833_1, 0.305_538_9, 0.099_370_7]),
        ),
        Element::B => (
            [48.791_113_0, 8.887_362_2, 2.405_267_0],
            Some([2.236_956_1, 0.519_820_5, 0.169_061_8]),
        ),
        Element::C => (
            [71.616_837_0, 13.045_096_0, 3.530_512_2],
            Some([2.941_249_4, 0.683_483_1, 0.222_289_9]),
        ),
        Element::N => (
            [99.106_169_0, 18.052_312_0, 4.885_660_2],
            Some([3.780_455_9, 0.878_496_6, 0.285_714_4]),
        ),
        Element::O => (
            [130.709_320_0, 23.808_861_0, 6.443_608_3],
            Some([5.033_151_3, 1.169_596_1, 0.380_389_0]),
        ),
        Element::F => (
            [166.679_130_0, 30.360_812_0, 8.216_820_7],
            Some([6.464_803_2, 1.502_281_2, 0.488_588_5]),
        ),
        Element::Ne => (
            [207.015_610_0, 37.708_151_0, 10.205_297_0],
            Some([8.246_315_1, 1.916_266_2, 0.623_229_3]),
        ),
    }
}

/// Supported basis sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BasisName {
    /// Minimal Slater-type-orbital basis, three Gaussians per function.
    #[default]
    #[serde(rename = "sto3g", alias = "sto-3g")]
    Sto3g,
}

impl FromStr for BasisName {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sto3g" => Ok(BasisName::Sto3g),
            _ => Err(ChemError::UnknownBasis(s.to_string())),
        }
    }
}

impl fmt::Display for BasisName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisName::Sto3g => write!(f, "sto3g"),
        }
    }
}

/// `(2n - 1)!!` with `(-1)!! = 1`.
fn double_factorial_odd(n: u32) -> f64 {
    (1..=n).map(|k| f64::from(2 * k - 1)).product()
}

/// Normalisation of `x^l y^m z^n exp(-a r²)`.
pub fn primitive_norm(exponent: f64, powers: [u32; 3]) -> f64 {
    let [l, m, n] = powers;
    let total = l + m + n;
    (2.0 * exponent / PI).powf(0.75) * (4.0 * exponent).powf(f64::from(total) / 2.0)
        / (double_factorial_odd(l) * double_factorial_odd(m) * double_factorial_odd(n)).sqrt()
}

/// A normalised contracted Cartesian Gaussian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisFunction {
    /// Index of the owning atom.
    pub atom: usize,
    /// Centre in Bohr.
    pub center: [f64; 3],
    /// Cartesian powers `(l, m, n)`.
    pub powers: [u32; 3],
    /// Primitive exponents.
    pub exponents: Vec<f64>,
    /// Contraction coefficients with primitive and overall normalisation
    /// folded in.
    pub coefficients: Vec<f64>,
    /// Label such as `Li 2px`.
    pub label: String,
}

impl BasisFunction {
    /// Build a contracted function from coefficients that refer to
    /// normalised primitives, then renormalise the contraction.
    pub fn new(
        atom: usize,
        center: [f64; 3],
        powers: [u32; 3],
        exponents: &[f64],
        contraction: &[f64],
        label: String,
    ) -> Self {
        let mut coefficients: Vec<f64> = exponents
            .iter()
            .zip(contraction)
            .map(|(&a, &d)| d * primitive_norm(a, powers))
            .collect();

        // Self-overlap of the contraction on one centre.
        let [l, m, n] = powers;
        let total = l + m + n;
        let angular = double_factorial_odd(l) * double_factorial_odd(m) * double_factorial_odd(n);
        let mut norm = 0.0;
        for (a, ca) in exponents.iter().zip(&coefficients) {
            for (b, cb) in exponents.iter().zip(&coefficients) {
                let p = a + b;
                norm += ca * cb * angular / (2.0 * p).powi(total as i32) * (PI / p).powf(1.5);
            }
        }
        let scale = 1.0 / norm.sqrt();
        for c in &mut coefficients {
            *c *= scale;
        }

        Self {
            atom,
            center,
            powers,
            exponents: exponents.to_vec(),
            coefficients,
            label,
        }
    }

    /// `l + m + n`.
    pub fn angular_momentum(&self) -> u32 {
        self.powers.iter().sum()
    }

    /// Iterate `(exponent, coefficient)` pairs.
    pub fn primitives(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.exponents
            .iter()
            .copied()
            .zip(self.coefficients.iter().copied())
    }
}

/// All atomic orbitals of a molecule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasisSet {
    name: BasisName,
    functions: Vec<BasisFunction>,
}

impl BasisSet {
    /// Place the named basis on every atom.
    pub fn build(name: BasisName, molecule: &Molecule) -> ChemResult<Self> {
        let mut functions = Vec::new();
        for (index, atom) in molecule.atoms().iter().enumerate() {
            let symbol = atom.element.symbol();
            match name {
                BasisName::Sto3g => {
                    let (one_s, two_sp) = sto3g_exponents(atom.element);
                    functions.push(BasisFunction::new(
                        index,
                        atom.position,
                        [0, 0, 0],
                        &one_s,
                        &STO3G_1S,
                        format!("{symbol} 1s"),
                    ));
                    if let Some(two_sp) = two_sp {
                        functions.push(BasisFunction::new(
                            index,
                            atom.position,
                            [0, 0, 0],
                            &two_sp,
                            &STO3G_2SP_S,
                            format!("{symbol} 2s"),
                        ));
                        for (axis, powers) in [("x", [1, 0, 0]), ("y", [0, 1, 0]), ("z", [0, 0, 1])] {
                            functions.push(BasisFunction::new(
                                index,
                                atom.position,
                                powers,
                                &two_sp,
                                &STO3G_2SP_P,
                                format!("{symbol} 2p{axis}"),
                            ));
                        }
                    }
                }
            }
        }
        Ok(Self { name, functions })
    }

    /// Basis name.
    pub fn name(&self) -> BasisName {
        self.name
    }

    /// The atomic orbitals in order.
    pub fn functions(&self) -> &[BasisFunction] {
        &self.functions
    }

    /// Number of atomic orbitals.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True for an empty basis.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::Unit;

    #[test]
    fn basis_aliases() {
        assert_eq!("sto3g".parse::<BasisName>().unwrap(), BasisName::Sto3g);
        assert_eq!("STO-3G".parse::<BasisName>().unwrap(), BasisName::Sto3g);
        assert!(matches!("6-31g".parse::<BasisName>(), Err(ChemError::UnknownBasis(_))));
    }

    #[test]
    fn lih_has_six_functions_in_order() {
        let mol = Molecule::from_atom_string("H 0 0 0; Li 0 0 1.596", Unit::Angstrom, 0, 0).unwrap();
        let basis = BasisSet::build(BasisName::Sto3g, &mol).unwrap();
        let labels: Vec<&str> = basis.functions().iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, ["H 1s", "Li 1s", "Li 2s", "Li 2px", "Li 2py", "Li 2pz"]);
        assert_eq!(basis.functions()[5].powers, [0, 0, 1]);
        assert_eq!(basis.functions()[5].atom, 1);
    }

    #[test]
    fn double_factorials() {
        assert_eq!(double_factorial_odd(0), 1.0);
        assert_eq!(double_factorial_odd(1), 1.0);
        assert_eq!(double_factorial_odd(2), 3.0);
        assert_eq!(double_factorial_odd(3), 15.0);
    }
}

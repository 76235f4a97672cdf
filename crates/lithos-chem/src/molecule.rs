//! Molecular geometry, charge and spin.
//!
//! Geometries use the driver's atom-string format:
//!
//! ```text
//! H 0.0 0.0 0.0; Li 0.0 0.0 1.596
//! ```
//!
//! Atoms are separated by `;` or newlines; coordinates are in the declared
//! [`Unit`] and stored internally in Bohr.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChemError, ChemResult};

/// Ångström per Bohr (CODATA 2010, as used by the reference drivers).
pub const BOHR_IN_ANGSTROM: f64 = 0.529_177_210_92;

/// Length unit of an atom specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Ångström (the default).
    #[default]
    Angstrom,
    /// Atomic units.
    Bohr,
}

impl Unit {
    /// Multiplier taking a coordinate in this unit to Bohr.
    pub fn to_bohr(self) -> f64 {
        match self {
            Unit::Angstrom => 1.0 / BOHR_IN_ANGSTROM,
            Unit::Bohr => 1.0,
        }
    }
}

impl FromStr for Unit {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "angstrom" | "a" | "ang" => Ok(Unit::Angstrom),
            "bohr" | "au" | "b" => Ok(Unit::Bohr),
            _ => Err(ChemError::UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Angstrom => write!(f, "angstrom"),
            Unit::Bohr => write!(f, "bohr"),
        }
    }
}

/// Chemical elements supported by the built-in basis sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    H,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
}

impl Element {
    /// All supported elements in order of atomic number.
    pub const ALL: [Element; 10] = [
        Element::H,
        Element::He,
        Element::Li,
        Element::Be,
        Element::B,
        Element::C,
        Element::N,
        Element::O,
        Element::F,
        Element::Ne,
    ];

    /// Atomic number.
    pub fn atomic_number(self) -> u32 {
        self as u32 + 1
    }

    /// Element symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Element::H => "H",
            Element::He => "He",
            Element::Li => "Li",
            Element::Be => "Be",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Ne => "Ne",
        }
    }

    /// Number of spatial core orbitals frozen by `freeze_core`.
    pub fn core_orbitals(self) -> usize {
        match self {
            Element::H | Element::He => 0,
            _ => 1,
        }
    }

    /// Look up an element by (case-insensitive) symbol.
    pub fn from_symbol(symbol: &str) -> ChemResult<Self> {
        Element::ALL
            .into_iter()
            .find(|e| e.symbol().eq_ignore_ascii_case(symbol))
            .ok_or_else(|| ChemError::UnknownElement(symbol.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A nucleus at a position in Bohr.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// The element.
    pub element: Element,
    /// Cartesian position in Bohr.
    pub position: [f64; 3],
}

impl Atom {
    /// Nuclear charge.
    pub fn charge(&self) -> f64 {
        f64::from(self.element.atomic_number())
    }

    /// Distance to `other` in Bohr.
    pub fn distance(&self, other: &Atom) -> f64 {
        self.position
            .iter()
            .zip(&other.position)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// A molecule: nuclei plus total charge and spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    atoms: Vec<Atom>,
    charge: i32,
    /// 2S = n_alpha - n_beta.
    spin: u32,
}

impl Molecule {
    /// Build a molecule from atoms (positions in Bohr).
    pub fn new(atoms: Vec<Atom>, charge: i32, spin: u32) -> ChemResult<Self> {
        if atoms.is_empty() {
            return Err(ChemError::AtomParse {
                input: String::new(),
                reason: "no atoms given".into(),
            });
        }
        let molecule = Self {
            atoms,
            charge,
            spin,
        };
        let electrons = molecule.electron_count();
        let spin = i64::from(spin);
        if electrons < 0 || spin > electrons || (electrons - spin) % 2 != 0 {
            return Err(ChemError::InvalidSpin { electrons, spin });
        }
        Ok(molecule)
    }

    /// Parse an atom string such as `"H 0 0 0; Li 0 0 1.596"`.
    pub fn from_atom_string(atom: &str, unit: Unit, charge: i32, spin: u32) -> ChemResult<Self> {
        let scale = unit.to_bohr();
        let mut atoms = Vec::new();
        for entry in atom.split([';', '\n']).map(str::trim).filter(|s| !s.is_empty()) {
            let fields: Vec<&str> = entry
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .collect();
            if fields.len() != 4 {
                return Err(ChemError::AtomParse {
                    input: entry.to_string(),
                    reason: format!("expected 'Symbol x y z', found {} fields", fields.len()),
                });
            }
            let element = Element::from_symbol(fields[0])?;
            let mut position = [0.0; 3];
            for (slot, field) in position.iter_mut().zip(&fields[1..]) {
                let value: f64 = field.parse().map_err(|_| ChemError::AtomParse {
                    input: entry.to_string(),
                    reason: format!("'{field}' is not a number"),
                })?;
                *slot = value * scale;
            }
            atoms.push(Atom { element, position });
        }
        Self::new(atoms, charge, spin)
    }

    /// The nuclei.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Total molecular charge.
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// 2S.
    pub fn spin(&self) -> u32 {
        self.spin
    }

    /// Spin multiplicity 2S + 1.
    pub fn multiplicity(&self) -> u32 {
        self.spin + 1
    }

    fn electron_count(&self) -> i64 {
        let nuclear: i64 = self
            .atoms
            .iter()
            .map(|a| i64::from(a.element.atomic_number()))
            .sum();
        nuclear - i64::from(self.charge)
    }

    /// Number of electrons.
    pub fn num_electrons(&self) -> usize {
        usize::try_from(self.electron_count()).unwrap_or(0)
    }

    /// Number of alpha electrons.
    pub fn num_alpha(&self) -> usize {
        (self.num_electrons() + self.spin as usize) / 2
    }

    /// Number of beta electrons.
    pub fn num_beta(&self) -> usize {
        (self.num_electrons() - self.spin as usize) / 2
    }

    /// Spatial core orbitals (lowest MOs) frozen by `freeze_core`.
    pub fn num_core_orbitals(&self) -> usize {
        self.atoms.iter().map(|a| a.element.core_orbitals()).sum()
    }

    /// `Σ_{A<B} Z_A Z_B / R_AB` in Hartree.
    pub fn nuclear_repulsion_energy(&self) -> f64 {
        let mut energy = 0.0;
        for (i, a) in self.atoms.iter().enumerate() {
            for b in &self.atoms[i + 1..] {
                energy += a.charge() * b.charge() / a.distance(b);
            }
        }
        energy
    }

    /// `Σ_A Z_A R_A` in atomic units.
    pub fn nuclear_dipole_moment(&self) -> [f64; 3] {
        let mut dipole = [0.0; 3];
        for atom in &self.atoms {
            for (d, x) in dipole.iter_mut().zip(&atom.position) {
                *d += atom.charge() * x;
            }
        }
        dipole
    }

    /// Element symbols in input order.
    pub fn symbols(&self) -> Vec<&'static str> {
        self.atoms.iter().map(|a| a.element.symbol()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LIH: &str = "H 0.0 0.0 0.0; Li 0.0 0.0 1.596";

    #[test]
    fn parses_lih() {
        let mol = Molecule::from_atom_string(LIH, Unit::Angstrom, 0, 0).unwrap();
        assert_eq!(mol.symbols(), vec!["H", "Li"]);
        assert_eq!(mol.num_electrons(), 4);
        assert_eq!((mol.num_alpha(), mol.num_beta()), (2, 2));
        assert_eq!(mol.num_core_orbitals(), 1);
        assert_relative_eq!(mol.atoms()[1].position[2], 1.596 / BOHR_IN_ANGSTROM);
    }

    #[test]
    fn lih_nuclear_repulsion() {
        let mol = Molecule::from_atom_string(LIH, Unit::Angstrom, 0, 0).unwrap();
        assert_relative_eq!(mol.nuclear_repulsion_energy(), 0.994_694_005_5, epsilon = 1e-9);
    }

    #[test]
    fn newline_separated_and_bohr() {
        let mol = Molecule::from_atom_string("H 0 0 0\nH 0 0 1.4", Unit::Bohr, 0, 0).unwrap();
        assert_relative_eq!(mol.nuclear_repulsion_energy(), 1.0 / 1.4);
        assert_relative_eq!(mol.nuclear_dipole_moment()[2], 1.4);
    }

    #[test]
    fn rejects_bad_spin_parity() {
        let err = Molecule::from_atom_string(LIH, Unit::Angstrom, 0, 1).unwrap_err();
        assert!(matches!(err, ChemError::InvalidSpin { electrons: 4, spin: 1 }));
        let cation = Molecule::from_atom_string(LIH, Unit::Angstrom, 1, 1).unwrap();
        assert_eq!((cation.num_alpha(), cation.num_beta()), (2, 1));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Molecule::from_atom_string("Xx 0 0 0", Unit::Angstrom, 0, 0),
            Err(ChemError::UnknownElement(_))
        ));
        assert!(matches!(
            Molecule::from_atom_string("H 0 0", Unit::Angstrom, 0, 0),
            Err(ChemError::AtomParse { .. })
        ));
        assert!(matches!(
            Molecule::from_atom_string("H 0 0 zero", Unit::Angstrom, 0, 0),
            Err(ChemError::AtomParse { .. })
        ));
        assert!("parsec".parse::<Unit>().is_err());
    }
}

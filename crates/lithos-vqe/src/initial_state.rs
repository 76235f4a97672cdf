//! Hartree–Fock reference state.

use serde::Serialize;

use lithos_chem::mapping::{hartree_fock_occupation, occupation_to_qubits, two_qubit_reduction_qubits};
use lithos_chem::{MoleculeInfo, QubitMapping};
use lithos_ir::{Circuit, QubitId};

use crate::error::{Result, VqeError};

/// The Hartree–Fock determinant encoded on qubits.
///
/// Electrons fill the lowest spin orbitals of each spin block; the
/// occupation is encoded with the chosen mapping and, when two-qubit
/// reduction is on, the two tapered qubits are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HartreeFock {
    num_orbitals: usize,
    num_particles: (usize, usize),
    qubit_mapping: QubitMapping,
    two_qubit_reduction: bool,
    bitstring: Vec<bool>,
}

impl HartreeFock {
    /// `num_orbitals` counts spin orbitals (alpha block first).
    pub fn new(
        num_orbitals: usize,
        num_particles: (usize, usize),
        qubit_mapping: QubitMapping,
        two_qubit_reduction: bool,
    ) -> Result<Self> {
        let spatial = num_orbitals / 2;
        for particles in [num_particles.0, num_particles.1] {
            if particles > spatial {
                return Err(VqeError::TooManyParticles {
                    particles,
                    orbitals: spatial,
                });
            }
        }
        let two_qubit_reduction = two_qubit_reduction && qubit_mapping == QubitMapping::Parity;

        let occupation = hartree_fock_occupation(spatial, num_particles);
        let mut bitstring = occupation_to_qubits(qubit_mapping, &occupation);
        if two_qubit_reduction {
            let (alpha, total) = two_qubit_reduction_qubits(num_orbitals as u32)?;
            bitstring.remove(total as usize);
            bitstring.remove(alpha as usize);
        }

        Ok(Self {
            num_orbitals,
            num_particles,
            qubit_mapping,
            two_qubit_reduction,
            bitstring,
        })
    }

    /// Reference state for the active space described by `info`.
    pub fn from_molecule_info(info: &MoleculeInfo) -> Result<Self> {
        Self::new(
            info.num_orbitals,
            info.num_particles,
            info.qubit_mapping,
            info.two_qubit_reduction,
        )
    }

    /// Spin orbitals.
    pub fn num_orbitals(&self) -> usize {
        self.num_orbitals
    }

    /// `(alpha, beta)` electrons.
    pub fn num_particles(&self) -> (usize, usize) {
        self.num_particles
    }

    /// Encoding in use.
    pub fn qubit_mapping(&self) -> QubitMapping {
        self.qubit_mapping
    }

    /// Whether two qubits are tapered.
    pub fn two_qubit_reduction(&self) -> bool {
        self.two_qubit_reduction
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.bitstring.len() as u32
    }

    /// Qubit values, index 0 first.
    pub fn bitstring(&self) -> &[bool] {
        &self.bitstring
    }

    /// Computational-basis index of the state.
    pub fn basis_index(&self) -> usize {
        self.bitstring
            .iter()
            .enumerate()
            .filter(|&(_, &set)| set)
            .map(|(q, _)| 1usize << q)
            .sum()
    }

    /// X gates preparing the state from `|0…0⟩`.
    pub fn circuit(&self) -> Result<Circuit> {
        let mut circuit = Circuit::new("hartree_fock", self.num_qubits());
        for (q, &set) in self.bitstring.iter().enumerate() {
            if set {
                circuit.x(QubitId(q as u32))?;
            }
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lih_active_space_parity_reduced() {
        // 10 spin orbitals, one electron per spin.
        let hf = HartreeFock::new(10, (1, 1), QubitMapping::Parity, true).unwrap();
        assert_eq!(hf.num_qubits(), 8);
        // Parity occupations 1111100000 minus qubits 4 and 9.
        assert_eq!(
            hf.bitstring(),
            &[true, true, true, true, false, false, false, false]
        );
        assert_eq!(hf.basis_index(), 0b1111);
        assert_eq!(hf.circuit().unwrap().len(), 4);
    }

    #[test]
    fn jordan_wigner_is_occupation() {
        let hf = HartreeFock::new(4, (1, 1), QubitMapping::JordanWigner, true).unwrap();
        assert!(!hf.two_qubit_reduction());
        assert_eq!(hf.bitstring(), &[true, false, true, false]);
    }

    #[test]
    fn rejects_overfull_spin_block() {
        let err = HartreeFock::new(4, (3, 0), QubitMapping::Parity, false).unwrap_err();
        assert!(matches!(err, VqeError::TooManyParticles { particles: 3, orbitals: 2 }));
    }
}

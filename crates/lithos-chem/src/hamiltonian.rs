//! The Hamiltonian core: from a [`QMolecule`] to a qubit Hamiltonian.
//!
//! The core freezes and removes orbitals, maps the remaining fermionic
//! operator to qubits, optionally tapers two qubits, and builds auxiliary
//! observables (particle number, spin, dipole) on the same active space.
//! After an eigensolver has run, [`HamiltonianCore::process_algorithm_result`]
//! adds back the frozen-orbital and nuclear contributions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

use lithos_sim::{Hamiltonian, PauliSum};

use crate::driver::QMolecule;
use crate::error::{ChemError, ChemResult};
use crate::fermion::FermionicOp;
use crate::mapping::{MAPPING_TOL, QubitMapping, map_fermionic, two_qubit_reduction};
use crate::result::{DipoleResult, GroundStateResult};

/// Hamiltonian transformation. Only the full electronic Hamiltonian is
/// supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transformation {
    /// Full electronic Hamiltonian.
    #[default]
    Full,
}

/// Hamiltonian-core settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Transformation.
    pub transformation: Transformation,
    /// Fermion-to-qubit encoding.
    pub qubit_mapping: QubitMapping,
    /// Taper the two parity qubits (parity mapping only).
    pub two_qubit_reduction: bool,
    /// Freeze the chemical core orbitals.
    pub freeze_core: bool,
    /// Additional spatial orbitals to remove; negative indices count from
    /// the highest orbital.
    pub orbital_reduction: Vec<i64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            transformation: Transformation::Full,
            qubit_mapping: QubitMapping::Parity,
            two_qubit_reduction: true,
            freeze_core: true,
            orbital_reduction: vec![],
        }
    }
}

/// Active-space bookkeeping produced by [`HamiltonianCore::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoleculeInfo {
    /// Active spin orbitals.
    pub num_orbitals: usize,
    /// Active `(alpha, beta)` electrons.
    pub num_particles: (usize, usize),
    /// Qubits of the mapped operator.
    pub num_qubits: u32,
    /// Energy of the frozen orbitals.
    pub energy_shift: f64,
    /// Nuclear repulsion energy.
    pub nuclear_repulsion: f64,
    /// Hartree–Fock reference energy.
    pub hf_energy: f64,
    /// Encoding in use.
    pub qubit_mapping: QubitMapping,
    /// Whether two qubits were tapered.
    pub two_qubit_reduction: bool,
    /// Frozen spin orbitals (original numbering).
    pub frozen: Vec<usize>,
    /// Removed spin orbitals (original numbering).
    pub removed: Vec<usize>,
}

/// An auxiliary observable and the constant its frozen orbitals contribute.
#[derive(Debug, Clone)]
pub struct AuxOperator {
    /// Display name.
    pub name: &'static str,
    /// Active-space qubit operator.
    pub operator: Hamiltonian,
    /// Frozen-orbital contribution.
    pub shift: f64,
}

/// Auxiliary observables in a fixed order: particle number, S², S_z, then
/// the dipole components x, y, z.
#[derive(Debug, Clone)]
pub struct AuxOperators {
    operators: Vec<AuxOperator>,
}

impl AuxOperators {
    /// Index of the particle-number operator.
    pub const NUM_PARTICLES: usize = 0;
    /// Index of `S²`.
    pub const S_SQUARED: usize = 1;
    /// Index of `S_z`.
    pub const S_Z: usize = 2;
    /// Index of the first dipole component.
    pub const DIPOLE_X: usize = 3;

    /// All operators in order.
    pub fn operators(&self) -> &[AuxOperator] {
        &self.operators
    }

    /// Qubit operators in order, for handing to an eigensolver.
    pub fn hamiltonians(&self) -> Vec<&Hamiltonian> {
        self.operators.iter().map(|a| &a.operator).collect()
    }

    /// Number of operators.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// True if there are no operators.
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

/// Builds qubit Hamiltonians from molecular data.
#[derive(Debug, Clone)]
pub struct HamiltonianCore {
    config: CoreConfig,
    info: Option<MoleculeInfo>,
    dipole_shift: [f64; 3],
    nuclear_dipole: [f64; 3],
    reverse_dipole_sign: bool,
}

impl HamiltonianCore {
    /// Create a core. Two-qubit reduction is switched off (with a warning)
    /// for encodings other than parity.
    pub fn new(mut config: CoreConfig) -> Self {
        if config.two_qubit_reduction && config.qubit_mapping != QubitMapping::Parity {
            warn!(
                mapping = %config.qubit_mapping,
                "two-qubit reduction requires the parity mapping; disabling it"
            );
            config.two_qubit_reduction = false;
        }
        Self {
            config,
            info: None,
            dipole_shift: [0.0; 3],
            nuclear_dipole: [0.0; 3],
            reverse_dipole_sign: false,
        }
    }

    /// Effective configuration.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Active-space data of the last [`Self::run`].
    pub fn molecule_info(&self) -> Option<&MoleculeInfo> {
        self.info.as_ref()
    }

    /// Spatial orbitals named by `orbital_reduction`, normalised to
    /// `0..num_orbitals`.
    fn reduction_orbitals(&self, num_orbitals: usize) -> ChemResult<BTreeSet<usize>> {
        let n = num_orbitals as i64;
        self.config
            .orbital_reduction
            .iter()
            .map(|&index| {
                let resolved = if index < 0 { n + index } else { index };
                if (0..n).contains(&resolved) {
                    Ok(resolved as usize)
                } else {
                    Err(ChemError::OrbitalOutOfRange {
                        index,
                        num_orbitals,
                    })
                }
            })
            .collect()
    }

    fn to_qubits(&self, op: &FermionicOp, num_particles: (usize, usize)) -> ChemResult<Hamiltonian> {
        let mut sum: PauliSum = map_fermionic(op, self.config.qubit_mapping);
        let mut num_qubits = op.modes() as u32;
        if self.config.two_qubit_reduction {
            sum = two_qubit_reduction(&sum, num_qubits, num_particles)?;
            num_qubits -= 2;
        }
        Ok(Hamiltonian::from_pauli_sum(&sum, num_qubits, MAPPING_TOL)?)
    }

    /// Build the qubit Hamiltonian and the auxiliary operators.
    #[instrument(skip_all, fields(mapping = %self.config.qubit_mapping))]
    pub fn run(&mut self, qmolecule: &QMolecule) -> ChemResult<(Hamiltonian, AuxOperators)> {
        let n = qmolecule.num_orbitals;
        let (num_alpha, num_beta) = (qmolecule.num_alpha, qmolecule.num_beta);

        let mut orbitals = self.reduction_orbitals(n)?;
        if self.config.freeze_core {
            orbitals.extend(qmolecule.core_orbitals.iter().copied());
        }

        // Occupied orbitals are frozen, virtual ones removed, per spin.
        let mut frozen = Vec::new();
        let mut removed = Vec::new();
        for &orbital in &orbitals {
            if orbital < num_alpha {
                frozen.push(orbital);
            } else {
                removed.push(orbital);
            }
        }
        for &orbital in &orbitals {
            if orbital < num_beta {
                frozen.push(orbital + n);
            } else {
                removed.push(orbital + n);
            }
        }
        let frozen_alpha = orbitals.iter().filter(|&&o| o < num_alpha).count();
        let frozen_beta = orbitals.iter().filter(|&&o| o < num_beta).count();
        let num_particles = (num_alpha - frozen_alpha, num_beta - frozen_beta);

        let modes = qmolecule.num_spin_orbitals();
        let hamiltonian = FermionicOp::from_integrals(
            qmolecule.one_body_integrals(),
            qmolecule.two_body_integrals(),
        );
        let (hamiltonian, energy_shift) = hamiltonian.freeze_and_remove(&frozen, &removed);
        if !frozen.is_empty() {
            info!(energy_shift, "frozen orbital energy shift");
        }
        let qubit_op = self.to_qubits(&hamiltonian, num_particles)?;

        let mut operators = Vec::with_capacity(6);
        let named = [
            ("Number of particles", FermionicOp::number_op(modes)),
            ("S^2", FermionicOp::s_squared_op(modes)),
            ("Sz", FermionicOp::s_z_op(modes)),
        ];
        for (name, op) in named {
            let (op, shift) = op.freeze_and_remove(&frozen, &removed);
            operators.push(AuxOperator {
                name,
                operator: self.to_qubits(&op, num_particles)?,
                shift,
            });
        }
        for (axis, name) in ["Dipole x", "Dipole y", "Dipole z"].into_iter().enumerate() {
            let op = FermionicOp::one_body(qmolecule.dipole_integrals(axis));
            let (op, shift) = op.freeze_and_remove(&frozen, &removed);
            self.dipole_shift[axis] = shift;
            operators.push(AuxOperator {
                name,
                operator: self.to_qubits(&op, num_particles)?,
                shift,
            });
        }
        self.nuclear_dipole = qmolecule.nuclear_dipole_moment;
        self.reverse_dipole_sign = qmolecule.reverse_dipole_sign;

        let info = MoleculeInfo {
            num_orbitals: hamiltonian.modes(),
            num_particles,
            num_qubits: qubit_op.num_qubits(),
            energy_shift,
            nuclear_repulsion: qmolecule.nuclear_repulsion_energy,
            hf_energy: qmolecule.hf_energy,
            qubit_mapping: self.config.qubit_mapping,
            two_qubit_reduction: self.config.two_qubit_reduction,
            frozen,
            removed,
        };
        info!(
            num_qubits = info.num_qubits,
            terms = qubit_op.n_terms(),
            num_orbitals = info.num_orbitals,
            "qubit Hamiltonian built"
        );
        self.info = Some(info);
        Ok((qubit_op, AuxOperators { operators }))
    }

    /// Combine an eigenvalue of the active-space Hamiltonian and the
    /// matching aux-operator values into the full ground-state result.
    ///
    /// `aux_values` follows the [`AuxOperators`] order; missing entries
    /// leave the corresponding observables unset.
    pub fn process_algorithm_result(
        &self,
        eigenvalue: f64,
        aux_values: &[f64],
    ) -> GroundStateResult {
        let info = self.info.as_ref();
        let energy_shift = info.map_or(0.0, |i| i.energy_shift);
        let nuclear_repulsion = info.map_or(0.0, |i| i.nuclear_repulsion);
        let frozen_electrons = info.map_or(0, |i| i.frozen.len()) as f64;

        let num_particles = aux_values
            .get(AuxOperators::NUM_PARTICLES)
            .map(|v| v + frozen_electrons);
        // Round-off can leave <S^2> a hair below zero.
        let s_squared = aux_values
            .get(AuxOperators::S_SQUARED)
            .map(|s2| s2.max(0.0));
        let spin = s_squared.map(|s2| (-1.0 + (1.0 + 4.0 * s2).sqrt()) / 2.0);
        let magnetization = aux_values.get(AuxOperators::S_Z).copied();

        let dipole = match aux_values.get(AuxOperators::DIPOLE_X..AuxOperators::DIPOLE_X + 3) {
            Some(&[x, y, z]) => {
                let computed = [x, y, z];
                let sign = if self.reverse_dipole_sign { -1.0 } else { 1.0 };
                let electronic: [f64; 3] =
                    [0, 1, 2].map(|k| sign * (computed[k] + self.dipole_shift[k]));
                let total = [0, 1, 2].map(|k| self.nuclear_dipole[k] - electronic[k]);
                Some(DipoleResult {
                    computed,
                    frozen: self.dipole_shift,
                    particle_hole: [0.0; 3],
                    electronic,
                    nuclear: self.nuclear_dipole,
                    total,
                })
            }
            _ => None,
        };

        GroundStateResult {
            computed_energy: eigenvalue,
            frozen_energy: energy_shift,
            particle_hole_energy: 0.0,
            nuclear_repulsion,
            num_particles,
            spin,
            s_squared,
            magnetization,
            dipole,
        }
    }
}

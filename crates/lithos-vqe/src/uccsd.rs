//! Unitary coupled-cluster singles and doubles.
//!
//! The state is `exp(T(θ) − T(θ)†)|HF⟩`. Every excitation generator
//! `T_k − T_k†` is mapped to qubits with the same encoding (and tapering)
//! as the Hamiltonian; it becomes `i Σ r_j P_j` with mutually commuting
//! strings, so `exp(θ_k (T_k − T_k†))` is an exact product of Pauli
//! rotations. One pass over all excitations is one repetition; each
//! repetition has its own parameters.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lithos_chem::mapping::{LadderOperators, MAPPING_TOL, two_qubit_reduction};
use lithos_chem::QubitMapping;
use lithos_ir::{Circuit, ParameterExpression};
use lithos_sim::synthesis::append_pauli_rotation;
use lithos_sim::{PauliString, PauliSum};
use num_complex::Complex64;

use crate::ansatz::{Ansatz, parameter_name};
use crate::error::{Result, VqeError};
use crate::initial_state::HartreeFock;

/// UCCSD settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UccsdOptions {
    /// Trotter repetitions.
    pub reps: usize,
    /// Include alpha-alpha and beta-beta doubles.
    pub same_spin_doubles: bool,
    /// Occupied orbitals (per spin, counted from the lowest) allowed to
    /// excite; `None` means all.
    pub active_occupied: Option<Vec<usize>>,
    /// Unoccupied orbitals (per spin, counted from the lowest virtual)
    /// allowed as targets; `None` means all.
    pub active_unoccupied: Option<Vec<usize>>,
}

impl Default for UccsdOptions {
    fn default() -> Self {
        Self {
            reps: 1,
            same_spin_doubles: true,
            active_occupied: None,
            active_unoccupied: None,
        }
    }
}

/// A single or double excitation over spin orbitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Excitation {
    /// `a†_a a_i`.
    Single {
        /// Occupied spin orbital `i`.
        from: usize,
        /// Virtual spin orbital `a`.
        to: usize,
    },
    /// `a†_a a†_b a_j a_i`.
    Double {
        /// Occupied spin orbitals `(i, j)`.
        from: (usize, usize),
        /// Virtual spin orbitals `(a, b)`.
        to: (usize, usize),
    },
}

impl Excitation {
    /// Ladder-operator product of `T`, leftmost first.
    fn ladder_ops(self) -> Vec<(usize, bool)> {
        match self {
            Excitation::Single { from, to } => vec![(to, true), (from, false)],
            Excitation::Double {
                from: (i, j),
                to: (a, b),
            } => vec![(a, true), (b, true), (j, false), (i, false)],
        }
    }
}

fn select(all: &[usize], active: Option<&[usize]>, kind: &'static str) -> Result<Vec<usize>> {
    let Some(active) = active else {
        return Ok(all.to_vec());
    };
    active
        .iter()
        .map(|&index| {
            all.get(index).copied().ok_or(VqeError::ActiveSpace {
                kind,
                index,
                available: all.len(),
            })
        })
        .collect()
}

fn same_spin_doubles(occupied: &[usize], unoccupied: &[usize], out: &mut Vec<Excitation>) {
    for (k, &i) in occupied.iter().enumerate() {
        for &j in &occupied[k + 1..] {
            for (l, &a) in unoccupied.iter().enumerate() {
                for &b in &unoccupied[l + 1..] {
                    out.push(Excitation::Double {
                        from: (i, j),
                        to: (a, b),
                    });
                }
            }
        }
    }
}

/// Excitations in canonical order: singles alpha then beta, doubles
/// alpha-alpha, alpha-beta, beta-beta.
pub fn excitation_list(
    num_orbitals: usize,
    num_particles: (usize, usize),
    options: &UccsdOptions,
) -> Result<Vec<Excitation>> {
    let spatial = num_orbitals / 2;
    let (num_alpha, num_beta) = num_particles;
    let occupied_alpha: Vec<usize> = (0..num_alpha).collect();
    let unoccupied_alpha: Vec<usize> = (num_alpha..spatial).collect();
    let occupied_beta: Vec<usize> = (spatial..spatial + num_beta).collect();
    let unoccupied_beta: Vec<usize> = (spatial + num_beta..num_orbitals).collect();

    let active_occ = options.active_occupied.as_deref();
    let active_unocc = options.active_unoccupied.as_deref();
    let occ_a = select(&occupied_alpha, active_occ, "occupied")?;
    let unocc_a = select(&unoccupied_alpha, active_unocc, "unoccupied")?;
    let occ_b = select(&occupied_beta, active_occ, "occupied")?;
    let unocc_b = select(&unoccupied_beta, active_unocc, "unoccupied")?;

    let mut excitations = Vec::new();
    for (occupied, unoccupied) in [(&occ_a, &unocc_a), (&occ_b, &unocc_b)] {
        for &from in occupied.iter() {
            for &to in unoccupied.iter() {
                excitations.push(Excitation::Single { from, to });
            }
        }
    }
    if options.same_spin_doubles {
        same_spin_doubles(&occ_a, &unocc_a, &mut excitations);
    }
    for &i in &occ_a {
        for &a in &unocc_a {
            for &j in &occ_b {
                for &b in &unocc_b {
                    excitations.push(Excitation::Double {
                        from: (i, j),
                        to: (a, b),
                    });
                }
            }
        }
    }
    if options.same_spin_doubles {
        same_spin_doubles(&occ_b, &unocc_b, &mut excitations);
    }
    Ok(excitations)
}

/// The UCCSD ansatz on top of a Hartree–Fock reference.
#[derive(Debug, Clone)]
pub struct Uccsd {
    options: UccsdOptions,
    excitations: Vec<Excitation>,
    /// `(P_j, r_j)` with `T_k − T_k† = i Σ_j r_j P_j`.
    generators: Vec<Vec<(PauliString, f64)>>,
    names: Vec<String>,
    circuit: Circuit,
}

impl Uccsd {
    /// Build the ansatz for the active space of `initial_state`.
    pub fn new(initial_state: &HartreeFock, options: UccsdOptions) -> Result<Self> {
        if options.reps == 0 {
            return Err(VqeError::InvalidOption("UCCSD needs at least one repetition".into()));
        }
        let num_orbitals = initial_state.num_orbitals();
        let num_particles = initial_state.num_particles();
        let excitations = excitation_list(num_orbitals, num_particles, &options)?;
        let generators = excitation_generators(
            &excitations,
            num_orbitals,
            num_particles,
            initial_state.qubit_mapping(),
            initial_state.two_qubit_reduction(),
        )?;

        let mut circuit = initial_state.circuit()?;
        let mut names = Vec::with_capacity(excitations.len() * options.reps);
        for _ in 0..options.reps {
            for generator in &generators {
                let name = parameter_name(names.len());
                for (pauli, r) in generator {
                    let angle = ParameterExpression::scaled_symbol(-2.0 * r, name.as_str());
                    append_pauli_rotation(&mut circuit, pauli, angle)?;
                }
                names.push(name);
            }
        }

        info!(
            excitations = excitations.len(),
            parameters = names.len(),
            num_qubits = circuit.num_qubits(),
            gates = circuit.len(),
            "UCCSD ansatz built"
        );
        Ok(Self {
            options,
            excitations,
            generators,
            names,
            circuit,
        })
    }

    /// Settings.
    pub fn options(&self) -> &UccsdOptions {
        &self.options
    }

    /// Excitations, one parameter each per repetition.
    pub fn excitations(&self) -> &[Excitation] {
        &self.excitations
    }

    /// Pauli form of each generator.
    pub fn generators(&self) -> &[Vec<(PauliString, f64)>] {
        &self.generators
    }
}

impl Ansatz for Uccsd {
    fn name(&self) -> &str {
        "uccsd"
    }

    fn num_qubits(&self) -> u32 {
        self.circuit.num_qubits()
    }

    fn parameter_names(&self) -> &[String] {
        &self.names
    }

    fn circuit(&self) -> &Circuit {
        &self.circuit
    }
}

/// Map `T_k − T_k†` for every excitation; returns the real weights `r_j`
/// of `i Σ_j r_j P_j`.
fn excitation_generators(
    excitations: &[Excitation],
    num_orbitals: usize,
    num_particles: (usize, usize),
    mapping: QubitMapping,
    reduce: bool,
) -> Result<Vec<Vec<(PauliString, f64)>>> {
    let ladders = LadderOperators::new(mapping, num_orbitals);
    let minus_one = Complex64::new(-1.0, 0.0);
    excitations
        .iter()
        .map(|&excitation| {
            let t = ladders.product(&excitation.ladder_ops());
            let mut generator: PauliSum = t.adjoint();
            generator.scale(minus_one);
            generator.add(&t);
            generator.simplify(MAPPING_TOL);
            if reduce {
                generator = two_qubit_reduction(&generator, num_orbitals as u32, num_particles)?;
            }
            let terms: Vec<(PauliString, f64)> = generator
                .sorted_terms()
                .into_iter()
                .filter(|(pauli, c)| !pauli.is_identity() && c.im.abs() > MAPPING_TOL)
                .map(|(pauli, c)| (pauli, c.im))
                .collect();
            debug!(?excitation, terms = terms.len(), "excitation generator");
            Ok(terms)
        })
        .collect()
}

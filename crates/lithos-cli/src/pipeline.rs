//! The ground-state workflow, one stage per method.
//!
//! Commands call the stages they need: `scf` stops after the driver,
//! `hamiltonian` after the core, `run` goes all the way to the VQE.

use anyhow::{Context, Result};
use tracing::info;

use lithos_chem::{
    AuxOperators, ChemDriver, GroundStateResult, HamiltonianCore, MoleculeInfo, QMolecule,
};
use lithos_sim::{Backend, Hamiltonian, backend_from_name};
use lithos_vqe::{
    Ansatz, ExactEigensolver, ExactResult, HartreeFock, Optimizer, TwoLocal, Uccsd, Vqe,
    VqeResult, optimizer_from_name,
};

use crate::config::{AnsatzKind, LithosConfig};

/// Qubit operators for one molecule.
pub struct QubitProblem {
    /// Core that built the operators; post-processes eigenvalues.
    pub core: HamiltonianCore,
    /// Active-space qubit Hamiltonian.
    pub hamiltonian: Hamiltonian,
    /// Observables measured alongside the energy.
    pub aux_operators: AuxOperators,
}

impl QubitProblem {
    /// Active-space bookkeeping.
    pub fn info(&self) -> Result<&MoleculeInfo> {
        self.core
            .molecule_info()
            .context("Hamiltonian core has not been run")
    }

    fn aux_hamiltonians(&self) -> Vec<Hamiltonian> {
        self.aux_operators.hamiltonians().into_iter().cloned().collect()
    }
}

/// Outcome of a VQE run, raw and post-processed.
pub struct VqeOutcome {
    pub vqe: VqeResult,
    pub ground_state: GroundStateResult,
}

/// Outcome of exact diagonalisation, raw and post-processed.
pub struct ExactOutcome {
    pub exact: ExactResult,
    pub ground_state: GroundStateResult,
}

/// Builds every stage from a [`LithosConfig`].
pub struct Workflow {
    config: LithosConfig,
}

impl Workflow {
    pub fn new(config: LithosConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LithosConfig {
        &self.config
    }

    /// The electronic-structure driver.
    pub fn driver(&self) -> ChemDriver {
        let molecule = &self.config.molecule;
        ChemDriver::new(molecule.atom.as_str())
            .with_unit(molecule.unit)
            .with_charge(molecule.charge)
            .with_spin(molecule.spin)
            .with_basis(molecule.basis)
            .with_scf(self.config.scf.clone())
    }

    /// Run Hartree–Fock and transform the integrals.
    pub fn run_driver(&self) -> Result<QMolecule> {
        let qmolecule = self
            .driver()
            .run()
            .context("electronic-structure calculation failed")?;
        info!(
            hf_energy = qmolecule.hf_energy,
            orbitals = qmolecule.num_orbitals,
            "driver finished"
        );
        Ok(qmolecule)
    }

    /// Build the qubit Hamiltonian and aux operators.
    pub fn build_problem(&self, qmolecule: &QMolecule) -> Result<QubitProblem> {
        let mut core = HamiltonianCore::new(self.config.hamiltonian.clone());
        let (hamiltonian, aux_operators) = core
            .run(qmolecule)
            .context("building the qubit Hamiltonian failed")?;
        info!(
            qubits = hamiltonian.num_qubits(),
            terms = hamiltonian.n_terms(),
            "qubit Hamiltonian ready"
        );
        Ok(QubitProblem {
            core,
            hamiltonian,
            aux_operators,
        })
    }

    /// Hartree–Fock reference state on the problem's qubits.
    pub fn initial_state(&self, problem: &QubitProblem) -> Result<HartreeFock> {
        Ok(HartreeFock::from_molecule_info(problem.info()?)?)
    }

    /// The configured variational form, prefixed by the HF state.
    pub fn ansatz(&self, problem: &QubitProblem) -> Result<Box<dyn Ansatz>> {
        let hf = self.initial_state(problem)?;
        let ansatz: Box<dyn Ansatz> = match self.config.ansatz.kind {
            AnsatzKind::Uccsd => Box::new(Uccsd::new(&hf, self.config.ansatz.uccsd_options())?),
            AnsatzKind::TwoLocal => Box::new(TwoLocal::new(
                hf.num_qubits(),
                self.config.ansatz.reps,
                Some(&hf.circuit()?),
            )?),
        };
        Ok(ansatz)
    }

    pub fn optimizer(&self) -> Result<Box<dyn Optimizer>> {
        let optimizer = &self.config.optimizer;
        Ok(optimizer_from_name(
            &optimizer.name,
            optimizer.maxiter,
            self.config.backend.seed,
        )?)
    }

    pub fn backend(&self) -> Result<Box<dyn Backend>> {
        let backend = &self.config.backend;
        Ok(backend_from_name(&backend.name, backend.shots, backend.seed)?)
    }

    /// Run the VQE; `callback` sees every energy evaluation.
    pub fn run_vqe(
        &self,
        problem: &QubitProblem,
        callback: impl FnMut(usize, &[f64], f64) + Send + 'static,
    ) -> Result<VqeOutcome> {
        let ansatz = self.ansatz(problem)?;
        info!(
            ansatz = ansatz.name(),
            parameters = ansatz.num_parameters(),
            "starting VQE"
        );
        let backend = self.backend()?;
        let mut vqe = Vqe::new(problem.hamiltonian.clone(), ansatz, self.optimizer()?)
            .with_aux_operators(problem.aux_hamiltonians())
            .with_callback(callback);
        let result = vqe.run(backend.as_ref()).context("VQE failed")?;
        let ground_state = problem
            .core
            .process_algorithm_result(result.eigenvalue, &result.aux_values);
        Ok(VqeOutcome {
            vqe: result,
            ground_state,
        })
    }

    /// Diagonalise the qubit Hamiltonian exactly.
    pub fn run_exact(&self, problem: &QubitProblem) -> Result<ExactOutcome> {
        let exact = ExactEigensolver::new(problem.hamiltonian.clone())
            .with_aux_operators(problem.aux_hamiltonians())
            .run()
            .context("exact diagonalisation failed")?;
        let ground_state = problem
            .core
            .process_algorithm_result(exact.eigenvalue, &exact.aux_values);
        Ok(ExactOutcome {
            exact,
            ground_state,
        })
    }
}

//! Run configuration for the `lithos` binary.
//!
//! Settings are resolved in this order, later sources winning:
//! 1. Built-in defaults (the LiH / STO-3G / parity / UCCSD / SLSQP workflow)
//! 2. A YAML configuration file (`--config`)
//! 3. `LITHOS_*` environment variables
//! 4. Command-line flags
//!
//! Environment variables and flags both arrive through [`ConfigOverrides`]:
//! every flag is declared with a clap `env` fallback.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::debug;

use lithos_chem::{BasisName, CoreConfig, QubitMapping, ScfOptions, Unit};
use lithos_sim::backend::{QASM_SIMULATOR, STATEVECTOR_SIMULATOR};
use lithos_vqe::{UccsdOptions, optimizer_from_name};

/// LiH near its equilibrium bond length.
pub const DEFAULT_ATOM: &str = "H 0.0 0.0 0.0; Li 0.0 0.0 1.596";

/// Complete configuration of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LithosConfig {
    /// Molecular geometry and electronic state
    pub molecule: MoleculeConfig,
    /// Hartree–Fock settings
    pub scf: ScfOptions,
    /// Qubit Hamiltonian construction
    pub hamiltonian: CoreConfig,
    /// Trial wavefunction
    pub ansatz: AnsatzConfig,
    /// Classical optimizer
    pub optimizer: OptimizerConfig,
    /// Expectation-value backend
    pub backend: BackendConfig,
    /// Reporting
    pub output: OutputConfig,
}

/// Molecule section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoleculeConfig {
    /// `"Sym x y z; Sym x y z; ..."`
    pub atom: String,
    pub unit: Unit,
    pub charge: i32,
    /// `2S`, the number of unpaired electrons.
    pub spin: u32,
    pub basis: BasisName,
}

impl Default for MoleculeConfig {
    fn default() -> Self {
        Self {
            atom: DEFAULT_ATOM.to_string(),
            unit: Unit::Angstrom,
            charge: 0,
            spin: 0,
            basis: BasisName::Sto3g,
        }
    }
}

/// Which variational form to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnsatzKind {
    #[default]
    Uccsd,
    TwoLocal,
}

impl std::fmt::Display for AnsatzKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnsatzKind::Uccsd => write!(f, "uccsd"),
            AnsatzKind::TwoLocal => write!(f, "two_local"),
        }
    }
}

impl std::str::FromStr for AnsatzKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "uccsd" => Ok(AnsatzKind::Uccsd),
            "two_local" | "twolocal" | "ry" => Ok(AnsatzKind::TwoLocal),
            other => Err(ConfigError::Validation(format!(
                "unknown ansatz '{other}' (expected uccsd or two_local)"
            ))),
        }
    }
}

/// Ansatz section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnsatzConfig {
    pub kind: AnsatzKind,
    /// Repetitions of the excitation block or rotation layer.
    pub reps: usize,
    /// UCCSD only: include αα and ββ doubles.
    pub same_spin_doubles: bool,
    /// UCCSD only: occupied spatial orbitals allowed to excite.
    pub active_occupied: Option<Vec<usize>>,
    /// UCCSD only: virtual spatial orbitals allowed as targets.
    pub active_unoccupied: Option<Vec<usize>>,
}

impl Default for AnsatzConfig {
    fn default() -> Self {
        Self {
            kind: AnsatzKind::Uccsd,
            reps: 1,
            same_spin_doubles: true,
            active_occupied: None,
            active_unoccupied: None,
        }
    }
}

impl AnsatzConfig {
    /// UCCSD options derived from this section.
    pub fn uccsd_options(&self) -> UccsdOptions {
        UccsdOptions {
            reps: self.reps,
            same_spin_doubles: self.same_spin_doubles,
            active_occupied: self.active_occupied.clone(),
            active_unoccupied: self.active_unoccupied.clone(),
        }
    }
}

/// Optimizer section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// `slsqp`, `nelder_mead` or `spsa`.
    pub name: String,
    /// Iteration cap; `None` keeps the optimizer's own default.
    pub maxiter: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            name: "slsqp".to_string(),
            maxiter: Some(2500),
        }
    }
}

/// Backend section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// `statevector_simulator` or `qasm_simulator`.
    pub name: String,
    /// Shots per Pauli term (qasm only).
    pub shots: usize,
    /// Seed for shot sampling and SPSA perturbations.
    pub seed: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: STATEVECTOR_SIMULATOR.to_string(),
            shots: 1024,
            seed: None,
        }
    }
}

/// Output section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write a JSON report here.
    pub path: Option<PathBuf>,
    /// Also diagonalise the qubit Hamiltonian exactly.
    pub exact: bool,
}

impl LithosConfig {
    /// Load a YAML file; missing sections and fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let config: LithosConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Defaults, then the file named by `overrides.config`, then the
    /// overrides themselves. The result is validated.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match &overrides.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        overrides.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml_ng::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.molecule.atom.trim().is_empty() {
            return Err(ConfigError::Validation(
                "molecule.atom must not be empty".to_string(),
            ));
        }

        if self.scf.max_cycle == 0 {
            return Err(ConfigError::Validation(
                "scf.max_cycle must be greater than 0".to_string(),
            ));
        }

        if self.ansatz.reps == 0 {
            return Err(ConfigError::Validation(
                "ansatz.reps must be greater than 0".to_string(),
            ));
        }

        if self.optimizer.maxiter == Some(0) {
            return Err(ConfigError::Validation(
                "optimizer.maxiter must be greater than 0".to_string(),
            ));
        }
        optimizer_from_name(&self.optimizer.name, self.optimizer.maxiter, self.backend.seed)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        match self.backend.name.as_str() {
            STATEVECTOR_SIMULATOR => {}
            QASM_SIMULATOR => {
                if self.backend.shots == 0 {
                    return Err(ConfigError::Validation(
                        "backend.shots must be greater than 0 for the qasm simulator".to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::Validation(format!(
                    "unknown backend '{other}' (expected {STATEVECTOR_SIMULATOR} or {QASM_SIMULATOR})"
                )));
            }
        }

        Ok(())
    }
}

/// Flags (with `LITHOS_*` environment fallbacks) that override the
/// configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// YAML configuration file
    #[arg(short, long, env = "LITHOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Geometry, e.g. "H 0 0 0; H 0 0 0.735"
    #[arg(long, env = "LITHOS_ATOM")]
    pub atom: Option<String>,

    /// Length unit of the geometry (angstrom, bohr)
    #[arg(long, env = "LITHOS_UNIT")]
    pub unit: Option<String>,

    /// Total molecular charge
    #[arg(long, env = "LITHOS_CHARGE", allow_hyphen_values = true)]
    pub charge: Option<i32>,

    /// Number of unpaired electrons (2S)
    #[arg(long, env = "LITHOS_SPIN")]
    pub spin: Option<u32>,

    /// Basis set
    #[arg(long, env = "LITHOS_BASIS")]
    pub basis: Option<String>,

    /// Fermion-to-qubit mapping (parity, jordan_wigner, bravyi_kitaev)
    #[arg(long, env = "LITHOS_MAPPING")]
    pub mapping: Option<String>,

    /// Keep the two qubits the parity reduction would remove
    #[arg(long, env = "LITHOS_NO_TWO_QUBIT_REDUCTION")]
    pub no_two_qubit_reduction: bool,

    /// Keep core orbitals active
    #[arg(long, env = "LITHOS_NO_FREEZE_CORE")]
    pub no_freeze_core: bool,

    /// Orbitals to drop from the active space (negative counts from the top)
    #[arg(
        long,
        env = "LITHOS_ORBITAL_REDUCTION",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    pub orbital_reduction: Vec<i64>,

    /// Variational form (uccsd, two_local)
    #[arg(long, env = "LITHOS_ANSATZ")]
    pub ansatz: Option<String>,

    /// Ansatz repetitions
    #[arg(long, env = "LITHOS_REPS")]
    pub reps: Option<usize>,

    /// Optimizer (slsqp, nelder_mead, spsa)
    #[arg(long, env = "LITHOS_OPTIMIZER")]
    pub optimizer: Option<String>,

    /// Optimizer iteration cap
    #[arg(long, env = "LITHOS_MAXITER")]
    pub maxiter: Option<usize>,

    /// Backend (statevector_simulator, qasm_simulator)
    #[arg(long, env = "LITHOS_BACKEND")]
    pub backend: Option<String>,

    /// Shots per Pauli term on the qasm simulator
    #[arg(long, env = "LITHOS_SHOTS")]
    pub shots: Option<usize>,

    /// Seed for shot sampling and stochastic optimizers
    #[arg(long, env = "LITHOS_SEED")]
    pub seed: Option<u64>,

    /// Also compute the exact ground state of the qubit Hamiltonian
    #[arg(long, env = "LITHOS_EXACT")]
    pub exact: bool,

    /// Write a JSON report to this file
    #[arg(short, long, env = "LITHOS_OUTPUT")]
    pub output: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Write every set override into `config`.
    pub fn apply(&self, config: &mut LithosConfig) -> Result<(), ConfigError> {
        // Molecule
        if let Some(atom) = &self.atom {
            config.molecule.atom.clone_from(atom);
        }
        if let Some(unit) = &self.unit {
            config.molecule.unit = unit.parse().map_err(invalid)?;
        }
        if let Some(charge) = self.charge {
            config.molecule.charge = charge;
        }
        if let Some(spin) = self.spin {
            config.molecule.spin = spin;
        }
        if let Some(basis) = &self.basis {
            config.molecule.basis = basis.parse().map_err(invalid)?;
        }

        // Hamiltonian
        if let Some(mapping) = &self.mapping {
            config.hamiltonian.qubit_mapping = mapping.parse::<QubitMapping>().map_err(invalid)?;
        }
        if self.no_two_qubit_reduction {
            config.hamiltonian.two_qubit_reduction = false;
        }
        if self.no_freeze_core {
            config.hamiltonian.freeze_core = false;
        }
        if !self.orbital_reduction.is_empty() {
            config.hamiltonian.orbital_reduction.clone_from(&self.orbital_reduction);
        }

        // Ansatz and optimizer
        if let Some(ansatz) = &self.ansatz {
            config.ansatz.kind = ansatz.parse()?;
        }
        if let Some(reps) = self.reps {
            config.ansatz.reps = reps;
        }
        if let Some(optimizer) = &self.optimizer {
            config.optimizer.name.clone_from(optimizer);
        }
        if let Some(maxiter) = self.maxiter {
            config.optimizer.maxiter = Some(maxiter);
        }

        // Backend
        if let Some(backend) = &self.backend {
            config.backend.name.clone_from(backend);
        }
        if let Some(shots) = self.shots {
            config.backend.shots = shots;
        }
        if let Some(seed) = self.seed {
            config.backend.seed = Some(seed);
        }

        // Output
        if self.exact {
            config.output.exact = true;
        }
        if let Some(path) = &self.output {
            config.output.path = Some(path.clone());
        }

        Ok(())
    }
}

fn invalid(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Validation(e.to_string())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_the_lih_workflow() {
        let config = LithosConfig::default();
        assert_eq!(config.molecule.atom, DEFAULT_ATOM);
        assert_eq!(config.molecule.unit, Unit::Angstrom);
        assert_eq!(config.hamiltonian.qubit_mapping, QubitMapping::Parity);
        assert!(config.hamiltonian.two_qubit_reduction);
        assert!(config.hamiltonian.freeze_core);
        assert_eq!(config.ansatz.kind, AnsatzKind::Uccsd);
        assert_eq!(config.optimizer.name, "slsqp");
        assert_eq!(config.optimizer.maxiter, Some(2500));
        assert_eq!(config.backend.name, STATEVECTOR_SIMULATOR);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_maxiter() {
        let mut config = LithosConfig::default();
        config.optimizer.maxiter = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_optimizer() {
        let mut config = LithosConfig::default();
        config.optimizer.name = "cobyla".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_zero_shots_on_qasm() {
        let mut config = LithosConfig::default();
        config.backend.name = QASM_SIMULATOR.to_string();
        config.backend.shots = 0;
        assert!(config.validate().is_err());

        // Shots are irrelevant to the statevector backend.
        config.backend.name = STATEVECTOR_SIMULATOR.to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides {
            atom: Some("H 0 0 0; H 0 0 0.735".to_string()),
            mapping: Some("jordan_wigner".to_string()),
            no_freeze_core: true,
            optimizer: Some("spsa".to_string()),
            maxiter: Some(10),
            seed: Some(7),
            ..ConfigOverrides::default()
        };
        let config = LithosConfig::load(&overrides).unwrap();
        assert_eq!(config.molecule.atom, "H 0 0 0; H 0 0 0.735");
        assert_eq!(config.hamiltonian.qubit_mapping, QubitMapping::JordanWigner);
        assert!(!config.hamiltonian.freeze_core);
        assert_eq!(config.optimizer.name, "spsa");
        assert_eq!(config.optimizer.maxiter, Some(10));
        assert_eq!(config.backend.seed, Some(7));
    }

    #[test]
    fn test_bad_override_values() {
        let mut config = LithosConfig::default();
        let unit = ConfigOverrides {
            unit: Some("furlong".to_string()),
            ..ConfigOverrides::default()
        };
        assert!(unit.apply(&mut config).is_err());

        let ansatz = ConfigOverrides {
            ansatz: Some("hea".to_string()),
            ..ConfigOverrides::default()
        };
        assert!(ansatz.apply(&mut config).is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = LithosConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("qubit_mapping: parity"));
        let parsed: LithosConfig = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}

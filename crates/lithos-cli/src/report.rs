//! JSON run reports.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use lithos_chem::{GroundStateResult, HfMethod, QMolecule};
use lithos_vqe::VqeResult;

use crate::config::LithosConfig;

/// Driver summary, the numbers the workflow prints first.
#[derive(Debug, Clone, Serialize)]
pub struct MoleculeSummary {
    pub hf_method: HfMethod,
    pub hf_energy: f64,
    pub nuclear_repulsion_energy: f64,
    pub num_orbitals: usize,
    pub num_alpha: usize,
    pub num_beta: usize,
    pub scf_iterations: usize,
}

impl From<&QMolecule> for MoleculeSummary {
    fn from(q: &QMolecule) -> Self {
        Self {
            hf_method: q.hf_method,
            hf_energy: q.hf_energy,
            nuclear_repulsion_energy: q.nuclear_repulsion_energy,
            num_orbitals: q.num_orbitals,
            num_alpha: q.num_alpha,
            num_beta: q.num_beta,
            scf_iterations: q.scf_iterations,
        }
    }
}

/// Everything `lithos run --output` writes.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub config: &'a LithosConfig,
    pub molecule: MoleculeSummary,
    pub num_qubits: u32,
    pub num_terms: usize,
    /// Total ground-state energy (Hartree).
    pub energy: f64,
    pub ground_state: &'a GroundStateResult,
    pub vqe: &'a VqeResult,
    /// Total energy from exact diagonalisation, when requested.
    pub exact_energy: Option<f64>,
}

impl<'a> RunReport<'a> {
    /// Stamp a report with the current time.
    pub fn new(
        config: &'a LithosConfig,
        molecule: MoleculeSummary,
        (num_qubits, num_terms): (u32, usize),
        ground_state: &'a GroundStateResult,
        vqe: &'a VqeResult,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            config,
            molecule,
            num_qubits,
            num_terms,
            energy: ground_state.energy(),
            ground_state,
            vqe,
            exact_energy: None,
        }
    }

    #[must_use]
    pub fn with_exact_energy(mut self, energy: f64) -> Self {
        self.exact_energy = Some(energy);
        self
    }
}

/// Pretty-print `value` as JSON into `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

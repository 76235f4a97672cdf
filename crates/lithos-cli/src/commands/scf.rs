//! Scf command implementation.

use anyhow::Result;
use console::style;

use lithos_cli::ConfigOverrides;

use super::common::{load_workflow, stage};

/// Execute the scf command.
pub fn execute(overrides: &ConfigOverrides) -> Result<()> {
    let workflow = load_workflow(overrides)?;
    stage(&format!(
        "Hartree-Fock for {} ({})",
        style(&workflow.config().molecule.atom).green(),
        workflow.config().molecule.basis
    ));

    let qmolecule = workflow.run_driver()?;
    println!("{qmolecule}");
    println!("SCF iterations: {}", style(qmolecule.scf_iterations).yellow());
    println!("Orbital energies: {:.6}", qmolecule.orbital_energies.transpose());
    if let Some(beta) = &qmolecule.orbital_energies_b {
        println!("Beta orbital energies: {:.6}", beta.transpose());
    }
    Ok(())
}

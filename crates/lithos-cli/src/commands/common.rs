//! Shared helpers for CLI commands.

use anyhow::Result;
use console::style;

use lithos_chem::QMolecule;
use lithos_cli::{ConfigOverrides, LithosConfig, Workflow};

/// Resolve the configuration and wrap it in a workflow.
pub fn load_workflow(overrides: &ConfigOverrides) -> Result<Workflow> {
    let config = LithosConfig::load(overrides)?;
    Ok(Workflow::new(config))
}

/// Announce a stage on stdout.
pub fn stage(message: &str) {
    println!("{} {}", style("→").cyan().bold(), message);
}

/// The driver summary, one quantity per line.
pub fn print_molecule(qmolecule: &QMolecule) {
    println!("Hartree-Fock energy: {}", qmolecule.hf_energy);
    println!(
        "Nuclear repulsion energy: {}",
        qmolecule.nuclear_repulsion_energy
    );
    println!("Number of molecular orbitals: {}", qmolecule.num_orbitals);
    println!("Number of alpha electrons: {}", qmolecule.num_alpha);
    println!("Number of beta electrons: {}", qmolecule.num_beta);
}

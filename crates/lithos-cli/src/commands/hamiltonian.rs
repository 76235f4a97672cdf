//! Hamiltonian command implementation.

use anyhow::Result;
use console::style;

use lithos_cli::ConfigOverrides;

use super::common::{load_workflow, print_molecule, stage};

/// Execute the hamiltonian command.
pub fn execute(overrides: &ConfigOverrides, terms: bool) -> Result<()> {
    let workflow = load_workflow(overrides)?;
    let qmolecule = workflow.run_driver()?;
    print_molecule(&qmolecule);

    let problem = workflow.build_problem(&qmolecule)?;
    let info = problem.info()?;
    stage(&format!(
        "{} mapping, two-qubit reduction {}",
        style(info.qubit_mapping).yellow(),
        if info.two_qubit_reduction { "on" } else { "off" }
    ));
    println!("  Active spin orbitals: {}", info.num_orbitals);
    println!(
        "  Active particles: ({}, {})",
        info.num_particles.0, info.num_particles.1
    );
    println!("  Frozen orbitals: {:?}", info.frozen);
    if !info.removed.is_empty() {
        println!("  Removed orbitals: {:?}", info.removed);
    }
    println!("  Energy shift: {}", info.energy_shift);

    if terms {
        println!("{:#}", problem.hamiltonian);
    } else {
        println!("{}", problem.hamiltonian);
    }
    for aux in problem.aux_operators.operators() {
        println!("  aux {:<16} {}", aux.name, aux.operator);
    }
    Ok(())
}

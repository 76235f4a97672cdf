//! Exact command implementation.

use anyhow::Result;
use console::style;

use lithos_cli::ConfigOverrides;

use super::common::{load_workflow, print_molecule, stage};

/// Execute the exact command.
pub fn execute(overrides: &ConfigOverrides) -> Result<()> {
    let workflow = load_workflow(overrides)?;
    let qmolecule = workflow.run_driver()?;
    print_molecule(&qmolecule);

    let problem = workflow.build_problem(&qmolecule)?;
    println!("{}", problem.hamiltonian);
    stage("Exact diagonalisation");

    let outcome = workflow.run_exact(&problem)?;
    println!(
        "Ground state energy: {}",
        style(outcome.ground_state.energy()).green().bold()
    );
    println!("{}", outcome.ground_state);
    println!("Lowest eigenvalues: {:?}", outcome.exact.spectrum);
    for state in outcome.exact.eigenstate.iter().take(4) {
        println!(
            "  |{}⟩ {:>10.6}",
            style(&state.bitstring).cyan(),
            state.probability
        );
    }
    Ok(())
}

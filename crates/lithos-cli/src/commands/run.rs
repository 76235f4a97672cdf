//! Run command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use lithos_cli::{ConfigOverrides, MoleculeSummary, RunReport, write_json};

use super::common::{load_workflow, print_molecule, stage};

/// Execute the run command.
pub fn execute(overrides: &ConfigOverrides, quiet: bool) -> Result<()> {
    let workflow = load_workflow(overrides)?;
    let config = workflow.config();

    let qmolecule = workflow.run_driver()?;
    print_molecule(&qmolecule);

    let problem = workflow.build_problem(&qmolecule)?;
    println!("{}", problem.hamiltonian);

    stage(&format!(
        "VQE: {} ansatz, {} optimizer, {}",
        style(config.ansatz.kind).yellow(),
        style(&config.optimizer.name).yellow(),
        style(&config.backend.name).yellow()
    ));

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .context("invalid progress template")?,
    );
    spinner.set_message("Optimizing...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let progress = spinner.clone();
    let outcome = workflow.run_vqe(&problem, move |count, _, energy| {
        progress.set_message(format!("evaluation {count}: {energy:.10}"));
    });
    spinner.finish_and_clear();
    let outcome = outcome?;

    println!("Ground state energy: {}", outcome.ground_state.energy());
    println!("{}", outcome.ground_state);
    println!(
        "Actual VQE evaluations taken: {}",
        outcome.vqe.optimizer_evals
    );

    let exact = if config.output.exact {
        let exact = workflow.run_exact(&problem)?;
        let reference = exact.ground_state.energy();
        println!(
            "Exact ground state energy: {} (VQE error {:.3e})",
            style(reference).green(),
            outcome.ground_state.energy() - reference
        );
        Some(reference)
    } else {
        None
    };

    if let Some(path) = &config.output.path {
        let mut report = RunReport::new(
            config,
            MoleculeSummary::from(&qmolecule),
            (problem.hamiltonian.num_qubits(), problem.hamiltonian.n_terms()),
            &outcome.ground_state,
            &outcome.vqe,
        );
        if let Some(reference) = exact {
            report = report.with_exact_energy(reference);
        }
        write_json(path, &report)?;
        stage(&format!("Report written to {}", style(path.display()).green()));
    }

    Ok(())
}

//! Lithos command-line interface.
//!
//! With no subcommand, `lithos` runs the default workflow: LiH in STO-3G,
//! frozen core, parity mapping with two-qubit reduction, a UCCSD ansatz
//! and SLSQP on the statevector simulator.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use lithos_cli::ConfigOverrides;

mod commands;

use commands::{config, exact, hamiltonian, run, scf};

/// Lithos - molecular ground states with the variational quantum eigensolver
#[derive(Parser)]
#[command(name = "lithos")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv); RUST_LOG is used when absent
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Used when no subcommand is given
    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full workflow: SCF, qubit Hamiltonian, VQE
    Run {
        #[command(flatten)]
        overrides: ConfigOverrides,

        /// Hide the progress spinner
        #[arg(short, long)]
        quiet: bool,
    },

    /// Build and print the qubit Hamiltonian
    Hamiltonian {
        #[command(flatten)]
        overrides: ConfigOverrides,

        /// Print every Pauli term
        #[arg(long)]
        terms: bool,
    },

    /// Run the electronic-structure driver only
    Scf {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Diagonalise the qubit Hamiltonian exactly
    Exact {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Print the effective configuration as YAML
    Config {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Run {
        overrides: cli.overrides,
        quiet: false,
    });

    let result = match command {
        Commands::Run { overrides, quiet } => run::execute(&overrides, quiet),
        Commands::Hamiltonian { overrides, terms } => hamiltonian::execute(&overrides, terms),
        Commands::Scf { overrides } => scf::execute(&overrides),
        Commands::Exact { overrides } => exact::execute(&overrides),
        Commands::Config { overrides } => config::execute(&overrides),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

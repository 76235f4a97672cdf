//! CLI command implementations.

pub mod common;
pub mod config;
pub mod exact;
pub mod hamiltonian;
pub mod run;
pub mod scf;

//! Library half of the `lithos` binary: configuration, the staged
//! workflow and JSON reports. The binary in `main.rs` only parses flags
//! and prints.

pub mod config;
pub mod pipeline;
pub mod report;

pub use config::{ConfigError, ConfigOverrides, LithosConfig};
pub use pipeline::{QubitProblem, Workflow};
pub use report::{MoleculeSummary, RunReport, write_json};

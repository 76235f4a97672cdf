//! Config command implementation.

use anyhow::Result;

use lithos_cli::{ConfigOverrides, LithosConfig};

/// Execute the config command.
pub fn execute(overrides: &ConfigOverrides) -> Result<()> {
    let config = LithosConfig::load(overrides)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

//! CLI command implementations.

pub mod convert;
pub mod statements;

use miette::{IntoDiagnostic, Result};

use crate::config::Config;

/// Print the default configuration as TOML.
pub fn show_config() -> Result<()> {
    let text = Config::generate_default().into_diagnostic()?;
    print!("{text}");
    Ok(())
}

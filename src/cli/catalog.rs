//! Catalog command implementation.

use super::output::{JsonCatalog, format_catalog};
use super::{CliError, OutputFormat};
use lanewar::Catalog;
use std::path::Path;

/// Execute the catalog command.
///
/// # Errors
///
/// Returns an error if the stat files cannot be loaded.
pub(crate) fn execute(
    troops: Option<&Path>,
    towers: Option<&Path>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let catalog = Catalog::from_paths(troops, towers)?;
    match format {
        OutputFormat::Text => print!("{}", format_catalog(&catalog)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&JsonCatalog::from_catalog(&catalog))?
        ),
    }
    Ok(())
}

use colored::Colorize;

use certlist::core::errors::Result;

use crate::cli::{context, output};

/// Execute the `certlist filters` command.
pub fn execute() -> Result<()> {
    let manager = context::filter_manager()?;

    output::header(&format!(
        "Key filters ({}, compliance: {})",
        manager.len(),
        manager.compliance()
    ));
    for (row, filter) in manager.filters().iter().enumerate() {
        println!(
            "  {:>2}. {} {:<32} {:>10}  {}",
            row + 1,
            format!("{:<28}", filter.id()).cyan(),
            filter.name(),
            filter.specificity(),
            filter.match_contexts().to_string().dimmed()
        );
    }
    if let Some(path) = context::config_path() {
        output::success(&format!("Configuration: {}", path.display()));
    }
    Ok(())
}

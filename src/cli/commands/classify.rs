use std::path::PathBuf;

use colored::Colorize;

use certlist::adapters::keyring::json_keyring::JsonKeyring;
use certlist::core::errors::Result;
use certlist::core::models::match_context::MatchContexts;
use certlist::core::services::key_index;
use certlist::core::traits::key_source::KeySource;

use crate::cli::{context, output};

/// Execute the `certlist classify` command.
pub fn execute(keyring: &str, all: bool) -> Result<()> {
    let manager = context::filter_manager()?;
    let keys = key_index::prepare_batch(JsonKeyring::new(PathBuf::from(keyring)).list_keys()?);

    output::header("Classification");
    for key in &keys {
        let names: Vec<String> = if all {
            manager
                .filters_matching(key, MatchContexts::ANY)
                .iter()
                .map(|f| f.id().to_string())
                .collect()
        } else {
            manager
                .filter_matching(key, MatchContexts::ANY)
                .map(|f| vec![f.id().to_string()])
                .unwrap_or_default()
        };

        if names.is_empty() {
            println!("  {}  {}", key.fingerprint, "(unclassified)".dimmed());
        } else {
            println!("  {}  {}", key.fingerprint, names.join(", ").cyan());
        }
    }
    Ok(())
}

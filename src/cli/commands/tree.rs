use std::path::PathBuf;

use colored::Colorize;

use certlist::adapters::keyring::json_keyring::JsonKeyring;
use certlist::adapters::observers::tracing_observer::TracingObserver;
use certlist::core::errors::{CertListError, Result};
use certlist::core::services::hierarchical_key_list::{HierarchicalKeyListModel, Membership};
use certlist::core::services::key_list_filter::KeyListFilterProxy;
use certlist::core::traits::key_list_model::KeyListModel;
use certlist::core::traits::key_list_view::KeyListView;
use certlist::core::traits::key_source::KeySource;

use crate::cli::{context, output};

/// Execute the `certlist tree` command.
///
/// Builds the issuer hierarchy, optionally in several batches to mimic
/// a backend that delivers keys incrementally, then prints the visible
/// part of the tree.
pub fn execute(
    keyring: &str,
    batch_size: Option<usize>,
    filter_id: Option<&str>,
    search: Option<&str>,
) -> Result<()> {
    let manager = context::filter_manager()?;
    let filter = match filter_id {
        Some(id) => Some(
            manager
                .key_filter_by_id(id)
                .ok_or_else(|| CertListError::UnknownFilter { id: id.to_string() })?,
        ),
        None => None,
    };

    let keys = JsonKeyring::new(PathBuf::from(keyring)).list_keys()?;
    let total = keys.len();

    let mut model = HierarchicalKeyListModel::new();
    model.subscribe(Box::new(TracingObserver::new("tree")));
    let batch_size = batch_size.unwrap_or(total).max(1);
    for batch in keys.chunks(batch_size) {
        model.add_keys(batch.to_vec());
    }

    let proxy = KeyListFilterProxy::new(&model)
        .with_filter(filter)
        .with_query(search);

    output::header(&format!("Certificates ({})", model.len()));
    for (depth, key) in proxy.visible_tree() {
        let indent = "  ".repeat(depth + 1);
        let marker = match model.membership(key) {
            Membership::ChildOfUnknownParent(_) => " (issuer missing)".yellow().to_string(),
            _ => String::new(),
        };
        println!("{indent}{}{marker}", output::key_line(key, &manager));
    }

    let shown = proxy.visible_count();
    if shown < model.len() {
        println!("\n  {shown} of {} certificates shown", model.len());
    }
    if total > model.len() {
        output::warning(&format!(
            "{} duplicate or empty entries ignored",
            total - model.len()
        ));
    }
    Ok(())
}

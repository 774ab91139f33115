use std::path::PathBuf;

use certlist::adapters::keyring::json_keyring::JsonKeyring;
use certlist::adapters::observers::tracing_observer::TracingObserver;
use certlist::core::errors::Result;
use certlist::core::services::flat_key_list::FlatKeyListModel;
use certlist::core::traits::key_list_model::KeyListModel;
use certlist::core::traits::key_list_view::KeyListView;
use certlist::core::traits::key_source::KeySource;

use crate::cli::{context, output};

/// Execute the `certlist list` command.
pub fn execute(keyring: &str) -> Result<()> {
    let manager = context::filter_manager()?;
    let keys = JsonKeyring::new(PathBuf::from(keyring)).list_keys()?;

    let mut model = FlatKeyListModel::new();
    model.subscribe(Box::new(TracingObserver::new("list")));
    model.add_keys(keys);

    output::header(&format!("Certificates ({})", model.len()));
    for key in model.all_keys() {
        println!("  {}", output::key_line(key, &manager));
    }
    Ok(())
}

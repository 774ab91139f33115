use crate::core::models::fingerprint::Fingerprint;
use crate::core::models::key::Key;
use crate::core::models::model_change::{ModelChange, ModelIndex};
use crate::core::services::key_index::{self, Placement};
use crate::core::traits::key_list_model::KeyListModel;
use crate::core::traits::key_list_observer::{KeyListObserver, Observers};
use crate::core::traits::key_list_view::KeyListView;

/// Fingerprint-sorted, duplicate-free key storage without hierarchy.
#[derive(Debug, Default, Clone)]
pub struct FlatKeyList {
    keys: Vec<Key>,
}

impl KeyListView for FlatKeyList {
    fn row_count(&self, parent: Option<&Fingerprint>) -> usize {
        match parent {
            None => self.keys.len(),
            Some(_) => 0,
        }
    }

    fn key_at(&self, index: &ModelIndex) -> Option<&Key> {
        if !index.is_top_level() {
            return None;
        }
        self.keys.get(index.row)
    }

    fn index_of(&self, key: &Key) -> Option<ModelIndex> {
        if key.is_null() {
            return None;
        }
        key_index::find(&self.keys, &key.fingerprint)
            .ok()
            .map(ModelIndex::top_level)
    }

    fn parent_of(&self, _index: &ModelIndex) -> Option<ModelIndex> {
        None
    }

    fn all_keys(&self) -> &[Key] {
        &self.keys
    }
}

/// Key list presenting every key as a top-level row, ordered by
/// fingerprint.
///
/// Inserting shifts the rows after the insertion point; replacing an
/// existing fingerprint only reports `DataChanged` for its row.
#[derive(Default)]
pub struct FlatKeyListModel {
    state: FlatKeyList,
    observers: Observers,
}

impl FlatKeyListModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyListView for FlatKeyListModel {
    fn row_count(&self, parent: Option<&Fingerprint>) -> usize {
        self.state.row_count(parent)
    }

    fn key_at(&self, index: &ModelIndex) -> Option<&Key> {
        self.state.key_at(index)
    }

    fn index_of(&self, key: &Key) -> Option<ModelIndex> {
        self.state.index_of(key)
    }

    fn parent_of(&self, index: &ModelIndex) -> Option<ModelIndex> {
        self.state.parent_of(index)
    }

    fn all_keys(&self) -> &[Key] {
        self.state.all_keys()
    }
}

impl KeyListModel for FlatKeyListModel {
    fn subscribe(&mut self, observer: Box<dyn KeyListObserver>) {
        self.observers.push(observer);
    }

    fn add_prepared_keys(&mut self, batch: Vec<Key>) -> Vec<ModelIndex> {
        debug_assert!(key_index::is_sorted_unique(&batch));

        let fingerprints: Vec<Fingerprint> = batch.iter().map(|k| k.fingerprint.clone()).collect();

        for key in batch {
            match key_index::locate(&self.state.keys, &key.fingerprint) {
                Placement::Replaced(row) => {
                    self.state.keys[row] = key;
                    self.observers
                        .emit(ModelChange::DataChanged { parent: None, row }, &self.state);
                }
                Placement::Inserted(row) => {
                    self.observers
                        .emit(ModelChange::about_to_insert(None, row), &self.state);
                    self.state.keys.insert(row, key);
                    self.observers
                        .emit(ModelChange::inserted(None, row), &self.state);
                }
            }
        }

        debug_assert!(key_index::is_sorted_unique(&self.state.keys));
        fingerprints
            .iter()
            .filter_map(|fpr| key_index::find(&self.state.keys, fpr).ok())
            .map(ModelIndex::top_level)
            .collect()
    }

    fn remove_key(&mut self, key: &Key) {
        let Ok(row) = key_index::find(&self.state.keys, &key.fingerprint) else {
            return;
        };
        self.observers
            .emit(ModelChange::about_to_remove(None, row), &self.state);
        self.state.keys.remove(row);
        self.observers
            .emit(ModelChange::removed(None, row), &self.state);
    }

    fn clear(&mut self) {
        self.observers
            .emit(ModelChange::ModelAboutToBeReset, &self.state);
        self.state.keys.clear();
        self.observers.emit(ModelChange::ModelReset, &self.state);
    }
}

use crate::core::models::fingerprint::Fingerprint;
use crate::core::models::key::Key;
use crate::core::models::model_change::ModelIndex;
use crate::core::services::key_index;

/// Read-only access to a key list, as seen by views and observers.
pub trait KeyListView {
    /// Number of rows under `parent` (`None` for the top level).
    fn row_count(&self, parent: Option<&Fingerprint>) -> usize;

    /// Key listed at `index`, if the index is valid.
    fn key_at(&self, index: &ModelIndex) -> Option<&Key>;

    /// Where `key` is listed, if it is part of the list.
    fn index_of(&self, key: &Key) -> Option<ModelIndex>;

    /// Index of the row `index` is listed under, `None` for top-level rows.
    fn parent_of(&self, index: &ModelIndex) -> Option<ModelIndex>;

    /// Every key in the list, sorted by fingerprint.
    fn all_keys(&self) -> &[Key];

    fn len(&self) -> usize {
        self.all_keys().len()
    }

    fn is_empty(&self) -> bool {
        self.all_keys().is_empty()
    }

    fn has_children(&self, parent: Option<&Fingerprint>) -> bool {
        self.row_count(parent) > 0
    }

    /// Index of the `row`th row under `parent`, if it exists.
    fn index(&self, row: usize, parent: Option<&Fingerprint>) -> Option<ModelIndex> {
        (row < self.row_count(parent)).then(|| ModelIndex {
            parent: parent.cloned(),
            row,
        })
    }

    fn key_by_fingerprint(&self, fpr: &Fingerprint) -> Option<&Key> {
        key_index::get(self.all_keys(), fpr)
    }

    /// Keys at `indexes`, skipping invalid ones and collapsing repeats.
    fn keys(&self, indexes: &[ModelIndex]) -> Vec<Key> {
        let mut result: Vec<Key> = indexes
            .iter()
            .filter_map(|idx| self.key_at(idx).cloned())
            .collect();
        result.dedup_by(|a, b| a.fingerprint == b.fingerprint);
        result
    }

    fn indexes(&self, keys: &[Key]) -> Vec<ModelIndex> {
        keys.iter().filter_map(|k| self.index_of(k)).collect()
    }
}

use crate::core::models::key::Key;
use crate::core::models::model_change::ModelIndex;
use crate::core::services::key_index;
use crate::core::traits::key_list_observer::KeyListObserver;
use crate::core::traits::key_list_view::KeyListView;

/// A mutable key list that notifies observers about every change.
///
/// Implementors provide the `*_prepared` primitives; batch cleanup
/// (null keys, ordering, duplicates) is done once here.
pub trait KeyListModel: KeyListView {
    fn subscribe(&mut self, observer: Box<dyn KeyListObserver>);

    /// Merge `batch`, which must be sorted by fingerprint, duplicate free
    /// and contain no null keys.
    fn add_prepared_keys(&mut self, batch: Vec<Key>) -> Vec<ModelIndex>;

    /// Remove `key`. Absent keys are ignored.
    fn remove_key(&mut self, key: &Key);

    /// Drop every key, announcing a single reset.
    fn clear(&mut self);

    /// Merge an arbitrary batch and return where its keys ended up.
    ///
    /// Keys already present are updated in place. Within the batch the
    /// last occurrence of a fingerprint wins.
    fn add_keys(&mut self, keys: Vec<Key>) -> Vec<ModelIndex> {
        let batch = key_index::prepare_batch(keys);
        if batch.is_empty() {
            return Vec::new();
        }
        tracing::debug!(count = batch.len(), "adding keys");
        self.add_prepared_keys(batch)
    }

    fn add_key(&mut self, key: Key) -> Option<ModelIndex> {
        self.add_keys(vec![key]).into_iter().next()
    }

    /// Replace the whole content with `keys`.
    fn set_keys(&mut self, keys: Vec<Key>) {
        self.clear();
        self.add_keys(keys);
    }
}

use std::collections::{HashMap, HashSet};

use crate::core::models::fingerprint::Fingerprint;
use crate::core::models::model_change::{ModelChange, ModelIndex};
use crate::core::traits::key_list_observer::KeyListObserver;
use crate::core::traits::key_list_view::KeyListView;

/// Observer that re-validates the whole view at every boundary.
///
/// Checks that every row maps to a key and back, that the listed rows
/// are exactly the stored keys, that rows under one parent are
/// fingerprint-sorted, that parent links agree with the rows they are
/// listed under, and that insert/remove events change row counts by
/// exactly the announced amount.
///
/// # Panics
///
/// On the first inconsistency. Meant for tests and debugging sessions.
#[derive(Debug, Default)]
pub struct ConsistencyChecker {
    pending: HashMap<Option<Fingerprint>, usize>,
}

impl ConsistencyChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_tree(view: &dyn KeyListView) {
        let mut stack: Vec<Option<Fingerprint>> = vec![None];
        let mut seen: HashSet<Fingerprint> = HashSet::new();

        while let Some(parent) = stack.pop() {
            let parent_index = parent
                .as_ref()
                .and_then(|fpr| view.key_by_fingerprint(fpr))
                .and_then(|key| view.index_of(key));
            let rows = view.row_count(parent.as_ref());
            let mut previous: Option<Fingerprint> = None;

            for row in 0..rows {
                let index = ModelIndex {
                    parent: parent.clone(),
                    row,
                };
                let key = view
                    .key_at(&index)
                    .unwrap_or_else(|| panic!("no key at {index:?}"));
                assert!(
                    view.key_by_fingerprint(&key.fingerprint).is_some(),
                    "{} is listed but not stored",
                    key.fingerprint
                );
                assert_eq!(view.index_of(key).as_ref(), Some(&index), "index_of({key})");
                assert_eq!(view.parent_of(&index), parent_index, "parent_of({index:?})");
                if let Some(prev) = &previous {
                    assert!(*prev < key.fingerprint, "rows under {parent:?} are not sorted");
                }
                assert!(
                    seen.insert(key.fingerprint.clone()),
                    "{} is listed twice",
                    key.fingerprint
                );
                previous = Some(key.fingerprint.clone());
                stack.push(Some(key.fingerprint.clone()));
            }
        }
        assert_eq!(seen.len(), view.len(), "stored and listed keys differ");
    }
}

impl KeyListObserver for ConsistencyChecker {
    fn notify(&mut self, change: &ModelChange, view: &dyn KeyListView) {
        Self::check_tree(view);

        match change {
            ModelChange::RowsAboutToBeInserted { parent, .. }
            | ModelChange::RowsAboutToBeRemoved { parent, .. } => {
                self.pending
                    .insert(parent.clone(), view.row_count(parent.as_ref()));
            }
            ModelChange::RowsInserted {
                parent,
                first,
                last,
            } => {
                let before = self.pending.remove(parent).unwrap_or_else(|| {
                    panic!("RowsInserted under {parent:?} without announcement")
                });
                assert_eq!(view.row_count(parent.as_ref()), before + (last - first + 1));
            }
            ModelChange::RowsRemoved {
                parent,
                first,
                last,
            } => {
                let before = self.pending.remove(parent).unwrap_or_else(|| {
                    panic!("RowsRemoved under {parent:?} without announcement")
                });
                assert_eq!(view.row_count(parent.as_ref()) + (last - first + 1), before);
            }
            ModelChange::DataChanged { parent, row } => {
                assert!(
                    *row < view.row_count(parent.as_ref()),
                    "DataChanged for missing row {row} under {parent:?}"
                );
            }
            ModelChange::ModelReset => {
                self.pending.clear();
            }
            _ => {}
        }
    }
}

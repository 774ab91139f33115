use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::core::models::fingerprint::Fingerprint;
use crate::core::models::key::Key;
use crate::core::models::model_change::{ModelChange, ModelIndex};
use crate::core::services::key_index::{self, Placement};
use crate::core::traits::key_list_model::KeyListModel;
use crate::core::traits::key_list_observer::{KeyListObserver, Observers};
use crate::core::traits::key_list_view::KeyListView;

/// Where a key currently sits in the certification tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Unseen,
    TopLevel,
    /// Listed under its issuer.
    ChildOfKnownParent(Fingerprint),
    /// Issuer not seen yet: listed at the top level for now and parked
    /// in the orphan table until the issuer arrives.
    ChildOfUnknownParent(Fingerprint),
}

/// Where a key is about to be put.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    TopLevel,
    Under(Fingerprint),
    Orphan(Fingerprint),
}

impl Target {
    fn parent(&self) -> Option<&Fingerprint> {
        match self {
            Target::Under(issuer) => Some(issuer),
            Target::TopLevel | Target::Orphan(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arrival {
    Batch,
    /// Detached from the top level because its issuer just arrived.
    Moved,
}

/// State of the certification tree.
///
/// `parents` is the placement index: for every listed key, the issuer it
/// is listed under (`None` for the top level). Rows are looked up by
/// fingerprint through it, never through stored references.
///
/// `keys` holds exactly the listed keys. A row unlisted during promotion
/// takes the rows below it out of `keys` too, and `in_transit` names it
/// until it is listed again.
#[derive(Debug, Default, Clone)]
pub struct KeyHierarchy {
    keys: Vec<Key>,
    top_levels: Vec<Key>,
    by_existing_parent: BTreeMap<Fingerprint, Vec<Key>>,
    by_non_existing_parent: BTreeMap<Fingerprint, Vec<Key>>,
    parents: HashMap<Fingerprint, Option<Fingerprint>>,
    in_transit: BTreeSet<Fingerprint>,
}

impl KeyHierarchy {
    pub fn top_levels(&self) -> &[Key] {
        &self.top_levels
    }

    /// Keys listed directly under `issuer`.
    pub fn children_of(&self, issuer: &Fingerprint) -> &[Key] {
        self.by_existing_parent
            .get(issuer)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Keys waiting for `issuer`, which has not been seen yet.
    pub fn waiting_for(&self, issuer: &Fingerprint) -> &[Key] {
        self.by_non_existing_parent
            .get(issuer)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Issuers that some listed key is waiting for.
    pub fn orphan_issuers(&self) -> Vec<&Fingerprint> {
        self.by_non_existing_parent.keys().collect()
    }

    pub fn membership(&self, fpr: &Fingerprint) -> Membership {
        match self.parents.get(fpr) {
            None => Membership::Unseen,
            Some(Some(parent)) => Membership::ChildOfKnownParent(parent.clone()),
            Some(None) => {
                let waiting_issuer = key_index::get(&self.keys, fpr)
                    .and_then(Key::clean_chain_id)
                    .filter(|issuer| key_index::contains(self.waiting_for(issuer), fpr));
                match waiting_issuer {
                    Some(issuer) => Membership::ChildOfUnknownParent(issuer.clone()),
                    None => Membership::TopLevel,
                }
            }
        }
    }

    /// Verify the structural invariants, describing the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        if !key_index::is_sorted_unique(&self.keys) {
            return Err("flat index is not sorted and unique".into());
        }
        if !key_index::is_sorted_unique(&self.top_levels) {
            return Err("top level is not sorted and unique".into());
        }
        if let Some(fpr) = self.in_transit.first() {
            return Err(format!("{fpr} was unlisted and never listed again"));
        }
        if self.parents.len() != self.keys.len() {
            return Err(format!(
                "{} keys stored but {} placed",
                self.keys.len(),
                self.parents.len()
            ));
        }

        let mut listed = self.top_levels.len();
        for key in &self.top_levels {
            if self.parents.get(&key.fingerprint) != Some(&None) {
                return Err(format!("{} is top level but not placed there", key.fingerprint));
            }
        }
        for (parent, children) in &self.by_existing_parent {
            if children.is_empty() {
                return Err(format!("empty child bucket for {parent}"));
            }
            if !key_index::contains(&self.keys, parent) {
                return Err(format!("child bucket for absent parent {parent}"));
            }
            if !key_index::is_sorted_unique(children) {
                return Err(format!("children of {parent} are not sorted and unique"));
            }
            for child in children {
                if self.parents.get(&child.fingerprint) != Some(&Some(parent.clone())) {
                    return Err(format!("{} is listed under {parent} but placed elsewhere", child.fingerprint));
                }
            }
            listed += children.len();
        }
        if listed != self.keys.len() {
            return Err(format!("{} keys stored but {listed} listed", self.keys.len()));
        }

        for (issuer, waiting) in &self.by_non_existing_parent {
            if key_index::contains(&self.keys, issuer) {
                return Err(format!("orphans still waiting for present issuer {issuer}"));
            }
            for orphan in waiting {
                if self.parents.get(&orphan.fingerprint) != Some(&None) {
                    return Err(format!("orphan {} is not top level", orphan.fingerprint));
                }
            }
        }

        for fpr in self.parents.keys() {
            let mut cursor = self.parents.get(fpr).cloned().flatten();
            let mut steps = 0;
            while let Some(parent) = cursor {
                steps += 1;
                if steps > self.keys.len() {
                    return Err(format!("{fpr} is part of a cycle"));
                }
                cursor = self.parents.get(&parent).cloned().flatten();
            }
        }
        Ok(())
    }

    fn bucket(&self, parent: Option<&Fingerprint>) -> Option<&Vec<Key>> {
        match parent {
            None => Some(&self.top_levels),
            Some(fpr) => self.by_existing_parent.get(fpr),
        }
    }

    fn bucket_mut(&mut self, parent: Option<&Fingerprint>) -> &mut Vec<Key> {
        match parent {
            None => &mut self.top_levels,
            Some(fpr) => self.by_existing_parent.entry(fpr.clone()).or_default(),
        }
    }

    fn index_of_fingerprint(&self, fpr: &Fingerprint) -> Option<ModelIndex> {
        let parent = self.parents.get(fpr)?;
        let row = key_index::find(self.bucket(parent.as_ref())?, fpr).ok()?;
        Some(ModelIndex {
            parent: parent.clone(),
            row,
        })
    }

    fn is_placed(&self, fpr: &Fingerprint) -> bool {
        self.parents.contains_key(fpr)
    }

    /// Whether `fpr` is reachable from the top level right now.
    fn is_attached(&self, fpr: &Fingerprint) -> bool {
        let mut cursor = fpr.clone();
        for _ in 0..=self.parents.len() {
            match self.parents.get(&cursor) {
                None => return false,
                Some(None) => return true,
                Some(Some(parent)) => cursor = parent.clone(),
            }
        }
        false
    }

    /// Whether `node` is `root` or listed somewhere below it.
    fn is_within(&self, node: &Fingerprint, root: &Fingerprint) -> bool {
        let mut cursor = Some(node.clone());
        let mut steps = 0;
        while let Some(current) = cursor {
            if current == *root || steps > self.parents.len() {
                return true;
            }
            steps += 1;
            cursor = self.parents.get(&current).cloned().flatten();
        }
        false
    }

    fn target_for(&self, key: &Key) -> Target {
        let Some(issuer) = key.clean_chain_id() else {
            return Target::TopLevel;
        };
        if self.is_attached(issuer) && !self.is_within(issuer, &key.fingerprint) {
            Target::Under(issuer.clone())
        } else if self.is_placed(issuer) || self.in_transit.contains(issuer) {
            // Issuer is present but in transit or below this key: the
            // chain is cyclic, so cut it here.
            Target::TopLevel
        } else {
            Target::Orphan(issuer.clone())
        }
    }

    /// Keys listed below `fpr`, at any depth.
    fn subtree(&self, fpr: &Fingerprint) -> Vec<Key> {
        let mut result = Vec::new();
        let mut stack = vec![fpr.clone()];
        while let Some(parent) = stack.pop() {
            for child in self.children_of(&parent) {
                stack.push(child.fingerprint.clone());
                result.push(child.clone());
            }
        }
        result
    }

    /// Take the row at `index` out of its bucket and the placement index.
    fn detach(&mut self, index: &ModelIndex) -> Option<Key> {
        let bucket = match &index.parent {
            None => &mut self.top_levels,
            Some(parent) => self.by_existing_parent.get_mut(parent)?,
        };
        if index.row >= bucket.len() {
            return None;
        }
        let key = bucket.remove(index.row);
        if let Some(parent) = &index.parent {
            if self.by_existing_parent.get(parent).is_some_and(Vec::is_empty) {
                self.by_existing_parent.remove(parent);
            }
        }
        self.parents.remove(&key.fingerprint);
        Some(key)
    }

    fn forget_orphan(&mut self, issuer: &Fingerprint, fpr: &Fingerprint) {
        if let Some(waiting) = self.by_non_existing_parent.get_mut(issuer) {
            key_index::remove(waiting, fpr);
            if waiting.is_empty() {
                self.by_non_existing_parent.remove(issuer);
            }
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl KeyListView for KeyHierarchy {
    fn row_count(&self, parent: Option<&Fingerprint>) -> usize {
        self.bucket(parent).map_or(0, Vec::len)
    }

    fn key_at(&self, index: &ModelIndex) -> Option<&Key> {
        self.bucket(index.parent.as_ref())?.get(index.row)
    }

    fn index_of(&self, key: &Key) -> Option<ModelIndex> {
        if key.is_null() {
            return None;
        }
        self.index_of_fingerprint(&key.fingerprint)
    }

    fn parent_of(&self, index: &ModelIndex) -> Option<ModelIndex> {
        let key = self.key_at(index)?;
        let parent = self.parents.get(&key.fingerprint)?.as_ref()?;
        self.index_of_fingerprint(parent)
    }

    fn all_keys(&self) -> &[Key] {
        &self.keys
    }
}

/// Key list presenting certificates as a tree of issuer chains.
///
/// Keys whose issuer is present are listed under it. Keys whose issuer
/// has not arrived yet are listed at the top level and remembered, so
/// they can be moved under the issuer once it shows up. Arrival order
/// within and across batches does not affect the final tree.
#[derive(Default)]
pub struct HierarchicalKeyListModel {
    state: KeyHierarchy,
    observers: Observers,
}

impl HierarchicalKeyListModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hierarchy(&self) -> &KeyHierarchy {
        &self.state
    }

    pub fn membership(&self, key: &Key) -> Membership {
        self.state.membership(&key.fingerprint)
    }

    fn emit(&mut self, change: ModelChange) {
        self.observers.emit(change, &self.state);
    }

    /// Put `key` at `parent`, replacing a row with the same fingerprint.
    fn list_row(&mut self, parent: Option<Fingerprint>, key: Key) -> usize {
        let fpr = key.fingerprint.clone();
        let placement = self
            .state
            .bucket(parent.as_ref())
            .map_or(Placement::Inserted(0), |bucket| key_index::locate(bucket, &fpr));

        match placement {
            Placement::Replaced(row) => {
                self.state.bucket_mut(parent.as_ref())[row] = key.clone();
                key_index::upsert(&mut self.state.keys, key);
                self.state.parents.insert(fpr, parent.clone());
                self.emit(ModelChange::DataChanged { parent, row });
                row
            }
            Placement::Inserted(row) => {
                self.emit(ModelChange::about_to_insert(parent.clone(), row));
                let below = self.state.subtree(&fpr);
                self.state.bucket_mut(parent.as_ref()).insert(row, key.clone());
                key_index::upsert(&mut self.state.keys, key);
                for descendant in below {
                    key_index::upsert(&mut self.state.keys, descendant);
                }
                self.state.parents.insert(fpr, parent.clone());
                self.emit(ModelChange::inserted(parent, row));
                row
            }
        }
    }

    /// Unlist the row of `fpr`. Rows below it leave the flat index with
    /// it and stay in their buckets until it is listed again.
    fn unlist_row(&mut self, fpr: &Fingerprint) -> Option<Key> {
        let index = self.state.index_of_fingerprint(fpr)?;
        self.emit(ModelChange::about_to_remove(index.parent.clone(), index.row));
        let key = self.state.detach(&index);
        key_index::remove(&mut self.state.keys, fpr);
        for descendant in self.state.subtree(fpr) {
            key_index::remove(&mut self.state.keys, &descendant.fingerprint);
        }
        self.emit(ModelChange::removed(index.parent, index.row));
        key
    }

    /// Place one key; children it unlocks are queued behind it.
    fn place(
        &mut self,
        key: Key,
        arrival: Arrival,
        queue: &mut VecDeque<(Key, Arrival)>,
        changed_parents: &mut BTreeSet<Fingerprint>,
    ) {
        let fpr = key.fingerprint.clone();
        self.state.in_transit.remove(&fpr);

        // Keys parked at the top level waiting for this one move under it.
        if let Some(waiting) = self.state.by_non_existing_parent.remove(&fpr) {
            for orphan in waiting {
                let Some(index) = self.state.index_of_fingerprint(&orphan.fingerprint) else {
                    continue;
                };
                debug_assert!(index.is_top_level());
                self.emit(ModelChange::RowAboutToBeMoved {
                    parent: index.parent.clone(),
                    row: index.row,
                });
                if let Some(current) = self.unlist_row(&orphan.fingerprint) {
                    self.state.in_transit.insert(current.fingerprint.clone());
                    queue.push_back((current, Arrival::Moved));
                }
            }
        }

        let previous_issuer = key_index::get(&self.state.keys, &fpr)
            .and_then(Key::clean_chain_id)
            .cloned();
        let target = self.state.target_for(&key);

        if let Some(current) = self.state.parents.get(&fpr).cloned() {
            if current.as_ref() != target.parent() {
                self.unlist_row(&fpr);
            }
        }
        if let Some(old_issuer) = previous_issuer {
            if target != Target::Orphan(old_issuer.clone()) {
                self.state.forget_orphan(&old_issuer, &fpr);
            }
        }

        let parent = target.parent().cloned();
        if let Target::Orphan(issuer) = &target {
            let waiting = self
                .state
                .by_non_existing_parent
                .entry(issuer.clone())
                .or_default();
            key_index::upsert(waiting, key.clone());
        }
        let row = self.list_row(parent.clone(), key);

        if arrival == Arrival::Moved {
            self.emit(ModelChange::RowMoved {
                parent: parent.clone(),
                row,
            });
        }

        let mut cursor = parent;
        while let Some(ancestor) = cursor {
            if !changed_parents.insert(ancestor.clone()) {
                break;
            }
            cursor = self.state.parents.get(&ancestor).cloned().flatten();
        }
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.state.check_invariants(), Ok(()));
    }
}

impl KeyListView for HierarchicalKeyListModel {
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

impl KeyListModel for HierarchicalKeyListModel {
    fn subscribe(&mut self, observer: Box<dyn KeyListObserver>) {
        self.observers.push(observer);
    }

    fn add_prepared_keys(&mut self, batch: Vec<Key>) -> Vec<ModelIndex> {
        debug_assert!(key_index::is_sorted_unique(&batch));

        let fingerprints: Vec<Fingerprint> = batch.iter().map(|k| k.fingerprint.clone()).collect();
        let mut changed_parents = BTreeSet::new();
        let mut queue = VecDeque::new();

        for key in key_index::topological_sort(&batch) {
            queue.push_back((key, Arrival::Batch));
            while let Some((next, arrival)) = queue.pop_front() {
                self.place(next, arrival, &mut queue, &mut changed_parents);
            }
        }

        // Parents whose subtree grew, so derived row state can refresh.
        for parent in changed_parents {
            if let Some(index) = self.state.index_of_fingerprint(&parent) {
                self.emit(ModelChange::DataChanged {
                    parent: index.parent,
                    row: index.row,
                });
            }
        }

        self.debug_check();
        fingerprints
            .iter()
            .filter_map(|fpr| self.state.index_of_fingerprint(fpr))
            .collect()
    }

    fn remove_key(&mut self, key: &Key) {
        let fpr = &key.fingerprint;
        if !key_index::contains(&self.state.keys, fpr) {
            return;
        }

        if !self.state.children_of(fpr).is_empty() {
            // Issuer with subjects: rebuild from scratch without it.
            let remaining: Vec<Key> = self
                .state
                .keys
                .iter()
                .filter(|k| k.fingerprint != *fpr)
                .cloned()
                .collect();
            tracing::debug!(
                fingerprint = %fpr,
                remaining = remaining.len(),
                "rebuilding key hierarchy after issuer removal"
            );
            self.clear();
            self.add_keys(remaining);
            return;
        }

        let Some(index) = self.state.index_of_fingerprint(fpr) else {
            return;
        };
        self.emit(ModelChange::about_to_remove(index.parent.clone(), index.row));
        let removed = self.state.detach(&index);
        key_index::remove(&mut self.state.keys, fpr);
        if let Some(issuer) = removed.as_ref().and_then(Key::clean_chain_id) {
            self.state.forget_orphan(issuer, fpr);
        }
        self.emit(ModelChange::removed(index.parent, index.row));

        // Keys cut from a cycle at this issuer now wait for it.
        let cut: Vec<Key> = self
            .state
            .top_levels
            .iter()
            .filter(|k| k.clean_chain_id() == Some(fpr))
            .cloned()
            .collect();
        if !cut.is_empty() {
            self.state
                .by_non_existing_parent
                .insert(fpr.clone(), cut.clone());
            for key in &cut {
                if let Some(index) = self.state.index_of_fingerprint(&key.fingerprint) {
                    self.emit(ModelChange::DataChanged {
                        parent: index.parent,
                        row: index.row,
                    });
                }
            }
        }
        self.debug_check();
    }

    fn clear(&mut self) {
        self.emit(ModelChange::ModelAboutToBeReset);
        self.state.reset();
        self.emit(ModelChange::ModelReset);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::adapters::observers::change_recorder::ChangeRecorder;
    use crate::adapters::observers::consistency_checker::ConsistencyChecker;

    fn fpr(s: &str) -> Fingerprint {
        Fingerprint::from(s)
    }

    fn fprs(keys: &[Key]) -> Vec<&str> {
        keys.iter().map(|k| k.fingerprint.as_str()).collect()
    }

    fn checked_model() -> (HierarchicalKeyListModel, ChangeRecorder) {
        let mut model = HierarchicalKeyListModel::new();
        let recorder = ChangeRecorder::new();
        model.subscribe(Box::new(ConsistencyChecker::new()));
        model.subscribe(Box::new(recorder.clone()));
        (model, recorder)
    }

    /// Parent -> children relation of the listed tree, for comparisons.
    fn topology(model: &HierarchicalKeyListModel) -> Vec<(String, Vec<String>)> {
        let h = model.hierarchy();
        let mut result = vec![(
            "<top>".to_string(),
            h.top_levels().iter().map(|k| k.fingerprint.to_string()).collect(),
        )];
        for key in model.all_keys() {
            let children = h.children_of(&key.fingerprint);
            if !children.is_empty() {
                result.push((
                    key.fingerprint.to_string(),
                    children.iter().map(|k| k.fingerprint.to_string()).collect(),
                ));
            }
        }
        result
    }

    #[test]
    fn child_before_root_in_one_batch() {
        let (mut model, _) = checked_model();
        let a = Key::new("AAAA").root();
        let b = Key::new("BBBB").issued_by("AAAA");

        model.add_keys(vec![b, a]);

        let h = model.hierarchy();
        assert_eq!(fprs(h.top_levels()), vec!["AAAA"]);
        assert_eq!(fprs(h.children_of(&fpr("AAAA"))), vec!["BBBB"]);
        assert!(h.orphan_issuers().is_empty());
        assert_eq!(fprs(model.all_keys()), vec!["AAAA", "BBBB"]);
    }

    #[test]
    fn orphan_is_promoted_when_issuer_arrives_later() {
        let (mut model, _) = checked_model();
        let child = Key::new("CCCC").issued_by("FFFF");

        model.add_key(child.clone());

        assert_eq!(model.membership(&child), Membership::ChildOfUnknownParent(fpr("FFFF")));
        assert_eq!(fprs(model.hierarchy().top_levels()), vec!["CCCC"]);
        assert_eq!(fprs(model.hierarchy().waiting_for(&fpr("FFFF"))), vec!["CCCC"]);

        model.add_key(Key::new("FFFF").root());

        assert_eq!(model.membership(&child), Membership::ChildOfKnownParent(fpr("FFFF")));
        assert_eq!(fprs(model.hierarchy().top_levels()), vec!["FFFF"]);
        assert_eq!(fprs(model.hierarchy().children_of(&fpr("FFFF"))), vec!["CCCC"]);
        assert!(model.hierarchy().waiting_for(&fpr("FFFF")).is_empty());
        assert_eq!(
            model.index_of(&child),
            Some(ModelIndex::child(fpr("FFFF"), 0))
        );
    }

    #[test]
    fn promotion_carries_the_orphans_subtree() {
        let (mut model, _) = checked_model();
        model.add_keys(vec![
            Key::new("BBBB").issued_by("AAAA"),
            Key::new("CCCC").issued_by("BBBB"),
            Key::new("DDDD").issued_by("CCCC"),
        ]);
        assert_eq!(fprs(model.hierarchy().top_levels()), vec!["BBBB"]);

        model.add_key(Key::new("AAAA").root());

        let h = model.hierarchy();
        assert_eq!(fprs(h.top_levels()), vec!["AAAA"]);
        assert_eq!(fprs(h.children_of(&fpr("AAAA"))), vec!["BBBB"]);
        assert_eq!(fprs(h.children_of(&fpr("BBBB"))), vec!["CCCC"]);
        assert_eq!(fprs(h.children_of(&fpr("CCCC"))), vec!["DDDD"]);
        let d = model.index_of(&Key::new("DDDD")).unwrap();
        let c = model.parent_of(&d).unwrap();
        assert_eq!(model.key_at(&c).unwrap().fingerprint.as_str(), "CCCC");
    }

    #[test]
    fn promotion_emits_move_events() {
        let (mut model, recorder) = checked_model();
        model.add_key(Key::new("BBBB").issued_by("AAAA"));
        recorder.clear();

        model.add_key(Key::new("AAAA").root());

        let changes = recorder.changes();
        assert_eq!(
            changes[0],
            ModelChange::RowAboutToBeMoved { parent: None, row: 0 }
        );
        assert!(changes.contains(&ModelChange::RowMoved {
            parent: Some(fpr("AAAA")),
            row: 0
        }));
        assert_eq!(
            changes.last(),
            Some(&ModelChange::DataChanged { parent: None, row: 0 })
        );
    }

    #[test]
    fn reinsertion_updates_in_place() {
        let (mut model, recorder) = checked_model();
        model.add_keys(vec![Key::new("AAAA").root(), Key::new("BBBB").issued_by("AAAA")]);
        recorder.clear();

        model.add_key(Key::new("BBBB").issued_by("AAAA").with_secret());

        assert_eq!(model.len(), 2);
        assert!(model.key_by_fingerprint(&fpr("BBBB")).unwrap().has_secret);
        assert_eq!(
            recorder.count(|c| matches!(c, ModelChange::RowsInserted { .. })),
            0
        );
        assert!(recorder.changes().contains(&ModelChange::DataChanged {
            parent: Some(fpr("AAAA")),
            row: 0
        }));
    }

    #[test]
    fn duplicate_orphan_reinsertion_keeps_single_record() {
        let (mut model, _) = checked_model();
        model.add_key(Key::new("CCCC").issued_by("FFFF"));
        model.add_key(Key::new("cccc").issued_by("FFFF"));

        assert_eq!(model.len(), 1);
        assert_eq!(model.hierarchy().waiting_for(&fpr("FFFF")).len(), 1);
        assert_eq!(model.row_count(None), 1);
    }

    #[test]
    fn changed_issuer_relocates_existing_key() {
        let (mut model, _) = checked_model();
        model.add_keys(vec![
            Key::new("AAAA").root(),
            Key::new("BBBB").root(),
            Key::new("CCCC").issued_by("AAAA"),
        ]);

        model.add_key(Key::new("CCCC").issued_by("BBBB"));

        assert!(model.hierarchy().children_of(&fpr("AAAA")).is_empty());
        assert_eq!(fprs(model.hierarchy().children_of(&fpr("BBBB"))), vec!["CCCC"]);
    }

    #[test]
    fn remove_leaf_cleans_buckets() {
        let (mut model, _) = checked_model();
        model.add_keys(vec![
            Key::new("AAAA").root(),
            Key::new("BBBB").issued_by("AAAA"),
            Key::new("CCCC").issued_by("FFFF"),
        ]);

        model.remove_key(&Key::new("BBBB"));
        model.remove_key(&Key::new("CCCC"));

        let h = model.hierarchy();
        assert_eq!(fprs(model.all_keys()), vec!["AAAA"]);
        assert!(h.children_of(&fpr("AAAA")).is_empty());
        assert!(h.orphan_issuers().is_empty());
        assert_eq!(model.membership(&Key::new("BBBB")), Membership::Unseen);
    }

    #[test]
    fn remove_leaf_emits_against_its_parent() {
        let (mut model, recorder) = checked_model();
        model.add_keys(vec![Key::new("AAAA").root(), Key::new("BBBB").issued_by("AAAA")]);
        recorder.clear();

        model.remove_key(&Key::new("BBBB"));

        assert_eq!(
            recorder.changes(),
            vec![
                ModelChange::about_to_remove(Some(fpr("AAAA")), 0),
                ModelChange::removed(Some(fpr("AAAA")), 0),
            ]
        );
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let (mut model, recorder) = checked_model();
        model.add_key(Key::new("AAAA").root());
        recorder.clear();

        model.remove_key(&Key::new("ZZZZ"));

        assert_eq!(model.len(), 1);
        assert!(recorder.changes().is_empty());
    }

    #[test]
    fn removing_an_issuer_rebuilds_as_if_it_never_existed() {
        let keys = vec![
            Key::new("AAAA").root(),
            Key::new("BBBB").issued_by("AAAA"),
            Key::new("CCCC").issued_by("BBBB"),
            Key::new("DDDD").issued_by("BBBB"),
            Key::new("EEEE").issued_by("CCCC"),
            Key::new("FFFF").root(),
        ];
        let (mut model, recorder) = checked_model();
        model.add_keys(keys.clone());
        recorder.clear();

        model.remove_key(&Key::new("BBBB"));

        let (mut expected, _) = checked_model();
        expected.add_keys(keys.into_iter().filter(|k| k.fingerprint != fpr("BBBB")).collect());
        assert_eq!(topology(&model), topology(&expected));
        assert_eq!(
            model.membership(&Key::new("CCCC")),
            Membership::ChildOfUnknownParent(fpr("BBBB"))
        );
        assert_eq!(recorder.changes()[0], ModelChange::ModelAboutToBeReset);
    }

    #[test]
    fn issuer_removed_then_readded_restores_tree() {
        let (mut model, _) = checked_model();
        model.add_keys(vec![Key::new("AAAA").root(), Key::new("BBBB").issued_by("AAAA")]);

        model.remove_key(&Key::new("AAAA"));
        assert_eq!(fprs(model.hierarchy().top_levels()), vec!["BBBB"]);

        model.add_key(Key::new("AAAA").root());
        assert_eq!(fprs(model.hierarchy().children_of(&fpr("AAAA"))), vec!["BBBB"]);
    }

    #[test]
    fn cyclic_chain_in_one_batch_stays_visible() {
        let (mut model, _) = checked_model();

        model.add_keys(vec![
            Key::new("AAAA").issued_by("BBBB"),
            Key::new("BBBB").issued_by("AAAA"),
        ]);

        assert_eq!(model.len(), 2);
        assert_eq!(model.row_count(None), 1);
        assert!(model.hierarchy().orphan_issuers().is_empty());
    }

    #[test]
    fn cyclic_chain_across_batches_stays_visible() {
        let (mut model, _) = checked_model();
        model.add_key(Key::new("AAAA").issued_by("BBBB"));

        model.add_key(Key::new("BBBB").issued_by("AAAA"));

        assert_eq!(fprs(model.hierarchy().top_levels()), vec!["BBBB"]);
        assert_eq!(fprs(model.hierarchy().children_of(&fpr("BBBB"))), vec!["AAAA"]);
    }

    #[test]
    fn removing_cut_cycle_member_parks_its_subject() {
        let (mut model, recorder) = checked_model();
        model.add_key(Key::new("AAAA").issued_by("BBBB"));
        model.add_key(Key::new("BBBB").issued_by("AAAA"));
        recorder.clear();

        model.remove_key(&Key::new("AAAA"));

        let b = Key::new("BBBB");
        assert_eq!(model.membership(&b), Membership::ChildOfUnknownParent(fpr("AAAA")));
        assert_eq!(fprs(model.hierarchy().waiting_for(&fpr("AAAA"))), vec!["BBBB"]);
        assert_eq!(
            recorder.changes().last(),
            Some(&ModelChange::DataChanged { parent: None, row: 0 })
        );
        let (mut scratch, _) = checked_model();
        scratch.add_key(Key::new("BBBB").issued_by("AAAA"));
        assert_eq!(topology(&model), topology(&scratch));

        model.add_key(Key::new("AAAA").issued_by("BBBB"));

        assert_eq!(fprs(model.hierarchy().top_levels()), vec!["AAAA"]);
        assert_eq!(fprs(model.hierarchy().children_of(&fpr("AAAA"))), vec!["BBBB"]);
        assert!(model.hierarchy().orphan_issuers().is_empty());
    }

    /// Records, at every event, how many keys are stored and listed.
    struct CountingObserver(Rc<RefCell<Vec<(usize, usize)>>>);

    impl KeyListObserver for CountingObserver {
        fn notify(&mut self, _change: &ModelChange, view: &dyn KeyListView) {
            let mut listed = 0;
            let mut stack: Vec<Option<Fingerprint>> = vec![None];
            while let Some(parent) = stack.pop() {
                for row in 0..view.row_count(parent.as_ref()) {
                    let index = view.index(row, parent.as_ref()).unwrap();
                    stack.push(Some(view.key_at(&index).unwrap().fingerprint.clone()));
                    listed += 1;
                }
            }
            self.0.borrow_mut().push((view.len(), listed));
        }
    }

    #[test]
    fn promoted_subtree_is_never_stored_without_being_listed() {
        let (mut model, _) = checked_model();
        let counts = Rc::new(RefCell::new(Vec::new()));
        model.subscribe(Box::new(CountingObserver(Rc::clone(&counts))));
        model.add_keys(vec![
            Key::new("BBBB").issued_by("AAAA"),
            Key::new("CCCC").issued_by("BBBB"),
            Key::new("DDDD").issued_by("AAAA"),
        ]);
        counts.borrow_mut().clear();

        model.add_key(Key::new("AAAA").root());

        let counts = counts.borrow();
        assert!(!counts.is_empty());
        for (stored, listed) in counts.iter() {
            assert_eq!(stored, listed);
        }
        assert_eq!(counts.last(), Some(&(4, 4)));
    }

    #[test]
    fn cycle_closing_through_a_promoted_subtree_is_cut() {
        let (mut model, _) = checked_model();
        model.add_keys(vec![
            Key::new("BBBB").issued_by("AAAA"),
            Key::new("CCCC").issued_by("BBBB"),
        ]);

        model.add_key(Key::new("AAAA").issued_by("CCCC"));

        let h = model.hierarchy();
        assert_eq!(fprs(h.top_levels()), vec!["AAAA"]);
        assert_eq!(fprs(h.children_of(&fpr("AAAA"))), vec!["BBBB"]);
        assert_eq!(fprs(h.children_of(&fpr("BBBB"))), vec!["CCCC"]);
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn arrival_order_does_not_change_the_tree() {
        let keys = vec![
            Key::new("AAAA").root(),
            Key::new("BBBB").issued_by("AAAA"),
            Key::new("CCCC").issued_by("BBBB"),
            Key::new("DDDD").issued_by("AAAA"),
            Key::new("EEEE").issued_by("9999"),
        ];
        let (mut reference, _) = checked_model();
        reference.add_keys(keys.clone());

        let orders: [&[usize]; 4] = [&[4, 3, 2, 1, 0], &[2, 0, 4, 1, 3], &[1, 2], &[3, 2, 1, 0, 4]];
        for order in orders {
            let (mut model, _) = checked_model();
            for &i in order {
                model.add_key(keys[i].clone());
            }
            let rest: Vec<Key> = keys
                .iter()
                .enumerate()
                .filter(|(i, _)| !order.contains(i))
                .map(|(_, k)| k.clone())
                .collect();
            model.add_keys(rest);

            assert_eq!(topology(&model), topology(&reference), "order {order:?}");
            assert_eq!(model.hierarchy().check_invariants(), Ok(()));
        }
    }

    #[test]
    fn root_flag_overrides_chain_id() {
        let (mut model, _) = checked_model();
        model.add_keys(vec![
            Key::new("AAAA").root(),
            Key::new("BBBB").issued_by("AAAA").root(),
        ]);
        assert_eq!(model.row_count(None), 2);
    }

    #[test]
    fn clear_empties_every_structure() {
        let (mut model, _) = checked_model();
        model.add_keys(vec![
            Key::new("AAAA").root(),
            Key::new("BBBB").issued_by("AAAA"),
            Key::new("CCCC").issued_by("FFFF"),
        ]);

        model.clear();

        assert!(model.is_empty());
        assert_eq!(model.row_count(None), 0);
        assert!(model.hierarchy().orphan_issuers().is_empty());
        assert_eq!(model.hierarchy().check_invariants(), Ok(()));
    }

    #[test]
    fn invalid_indexes_return_none() {
        let (mut model, _) = checked_model();
        model.add_keys(vec![Key::new("AAAA").root(), Key::new("BBBB").issued_by("AAAA")]);

        assert!(model.key_at(&ModelIndex::child(fpr("AAAA"), 1)).is_none());
        assert!(model.key_at(&ModelIndex::child(fpr("ZZZZ"), 0)).is_none());
        assert!(model.parent_of(&ModelIndex::top_level(0)).is_none());
        assert_eq!(model.row_count(Some(&fpr("BBBB"))), 0);
        assert!(model.has_children(Some(&fpr("AAAA"))));
    }
}

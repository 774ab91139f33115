use std::collections::HashSet;
use std::sync::Arc;

use crate::core::models::fingerprint::Fingerprint;
use crate::core::models::key::Key;
use crate::core::models::match_context::MatchContexts;
use crate::core::models::model_change::ModelIndex;
use crate::core::traits::key_filter::KeyFilter;
use crate::core::traits::key_list_view::KeyListView;

/// Filtered projection of a key list.
///
/// A row stays visible when its own key is accepted or when any row
/// below it is, so matching keys keep their issuer chain on screen.
/// The projection is computed once; build a new one after the
/// underlying list changes.
pub struct KeyListFilterProxy<'a> {
    view: &'a dyn KeyListView,
    filter: Option<Arc<dyn KeyFilter>>,
    query: Option<String>,
    visible: HashSet<Fingerprint>,
}

impl<'a> KeyListFilterProxy<'a> {
    /// Everything in `view` is visible until a filter or query is set.
    pub fn new(view: &'a dyn KeyListView) -> Self {
        let mut proxy = Self {
            view,
            filter: None,
            query: None,
            visible: HashSet::new(),
        };
        proxy.invalidate();
        proxy
    }

    pub fn with_filter(mut self, filter: Option<Arc<dyn KeyFilter>>) -> Self {
        self.filter = filter;
        self.invalidate();
        self
    }

    /// Case-insensitive substring match on fingerprint and user IDs.
    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        self.invalidate();
        self
    }

    /// Whether `key` passes the filter and the query on its own.
    pub fn accepts(&self, key: &Key) -> bool {
        if let Some(filter) = &self.filter {
            if !filter.matches(key, MatchContexts::FILTERING) {
                return false;
            }
        }
        match &self.query {
            None => true,
            Some(query) => {
                key.fingerprint.as_str().to_lowercase().contains(query.as_str())
                    || key
                        .user_ids
                        .iter()
                        .any(|uid| uid.id.to_lowercase().contains(query.as_str()))
            }
        }
    }

    /// Visible rows directly under `parent`, in source order.
    pub fn visible_rows(&self, parent: Option<&Fingerprint>) -> Vec<ModelIndex> {
        (0..self.view.row_count(parent))
            .filter_map(|row| self.view.index(row, parent))
            .filter(|index| {
                self.view
                    .key_at(index)
                    .is_some_and(|key| self.visible.contains(&key.fingerprint))
            })
            .collect()
    }

    /// Visible keys in tree pre-order, each with its depth.
    pub fn visible_tree(&self) -> Vec<(usize, &'a Key)> {
        let view = self.view;
        let mut result = Vec::new();
        let mut stack: Vec<(usize, ModelIndex)> = self
            .visible_rows(None)
            .into_iter()
            .rev()
            .map(|index| (0, index))
            .collect();

        while let Some((depth, index)) = stack.pop() {
            let Some(key) = view.key_at(&index) else {
                continue;
            };
            result.push((depth, key));
            let children = self.visible_rows(Some(&key.fingerprint));
            stack.extend(children.into_iter().rev().map(|child| (depth + 1, child)));
        }
        result
    }

    /// Visible keys in tree pre-order.
    pub fn visible_keys(&self) -> Vec<&'a Key> {
        self.visible_tree().into_iter().map(|(_, key)| key).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    fn invalidate(&mut self) {
        let view = self.view;

        // Pre-order walk, then settle children before their parents.
        let mut order: Vec<&Key> = Vec::with_capacity(view.len());
        let mut stack: Vec<ModelIndex> = (0..view.row_count(None))
            .rev()
            .filter_map(|row| view.index(row, None))
            .collect();
        while let Some(index) = stack.pop() {
            let Some(key) = view.key_at(&index) else {
                continue;
            };
            order.push(key);
            let parent = Some(&key.fingerprint);
            stack.extend(
                (0..view.row_count(parent))
                    .rev()
                    .filter_map(|row| view.index(row, parent)),
            );
        }

        let mut visible = HashSet::new();
        for key in order.into_iter().rev() {
            let fpr = &key.fingerprint;
            let child_visible = (0..view.row_count(Some(fpr)))
                .filter_map(|row| view.index(row, Some(fpr)))
                .filter_map(|index| view.key_at(&index))
                .any(|child| visible.contains(&child.fingerprint));
            if child_visible || self.accepts(key) {
                visible.insert(fpr.clone());
            }
        }

        tracing::debug!(
            visible = visible.len(),
            total = view.len(),
            "key list filter applied"
        );
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::compliance::ComplianceMode;
    use crate::core::models::key::Validity;
    use crate::core::services::builtin_filters::{MY_CERTIFICATES, default_filters};
    use crate::core::services::flat_key_list::FlatKeyListModel;
    use crate::core::services::hierarchical_key_list::HierarchicalKeyListModel;
    use crate::core::traits::key_list_model::KeyListModel;

    fn fingerprints(keys: &[&Key]) -> Vec<String> {
        keys.iter().map(|k| k.fingerprint.to_string()).collect()
    }

    fn mine() -> Option<Arc<dyn KeyFilter>> {
        default_filters(&ComplianceMode::None)
            .into_iter()
            .find(|f| f.id() == MY_CERTIFICATES)
    }

    fn sample_tree() -> HierarchicalKeyListModel {
        let mut model = HierarchicalKeyListModel::new();
        model.add_keys(vec![
            Key::new("AA").root(),
            Key::new("BB").issued_by("AA"),
            Key::new("CC").issued_by("BB").with_secret(),
            Key::new("DD").issued_by("AA").with_user_id("Dora <dora@example.org>", Validity::Full),
            Key::new("EE").root(),
        ]);
        model
    }

    #[test]
    fn unfiltered_shows_everything_in_pre_order() {
        let model = sample_tree();
        let proxy = KeyListFilterProxy::new(&model);
        assert_eq!(
            fingerprints(&proxy.visible_keys()),
            ["AA", "BB", "CC", "DD", "EE"]
        );
    }

    #[test]
    fn matching_leaf_keeps_its_issuers_visible() {
        let model = sample_tree();
        let proxy = KeyListFilterProxy::new(&model).with_filter(mine());

        assert_eq!(fingerprints(&proxy.visible_keys()), ["AA", "BB", "CC"]);
        assert_eq!(proxy.visible_rows(None).len(), 1);
        assert_eq!(proxy.visible_count(), 3);
    }

    #[test]
    fn query_matches_user_ids_case_insensitively() {
        let model = sample_tree();
        let proxy = KeyListFilterProxy::new(&model).with_query(Some("DORA@"));

        assert_eq!(fingerprints(&proxy.visible_keys()), ["AA", "DD"]);
        let tree = proxy.visible_tree();
        assert_eq!(tree[1].0, 1);
    }

    #[test]
    fn filter_and_query_must_both_hold() {
        let model = sample_tree();
        let proxy = KeyListFilterProxy::new(&model)
            .with_filter(mine())
            .with_query(Some("dd"));
        assert!(proxy.visible_keys().is_empty());
    }

    #[test]
    fn works_on_flat_lists() {
        let mut model = FlatKeyListModel::new();
        model.add_keys(vec![Key::new("01"), Key::new("02").with_secret()]);
        let proxy = KeyListFilterProxy::new(&model).with_filter(mine());
        assert_eq!(fingerprints(&proxy.visible_keys()), ["02"]);
    }
}

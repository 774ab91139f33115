use std::sync::Arc;

use crate::config::filter_config::FilterGroup;
use crate::core::models::appearance::{Color, FontDescription};
use crate::core::models::compliance::ComplianceMode;
use crate::core::models::key::Key;
use crate::core::models::match_context::MatchContexts;
use crate::core::services::builtin_filters::{default_appearance_filters, default_filters};
use crate::core::traits::key_filter::KeyFilter;

/// Ordered collection of key filters.
///
/// Classification filters are kept sorted by descending specificity, so
/// the first match is the most specific one. Appearance-only filters are
/// kept apart and consulted first when styling a key.
#[derive(Debug, Clone)]
pub struct KeyFilterManager {
    compliance: ComplianceMode,
    filters: Vec<Arc<dyn KeyFilter>>,
    appearance_filters: Vec<Arc<dyn KeyFilter>>,
}

impl KeyFilterManager {
    /// Manager holding only the built-in filters for `compliance`.
    pub fn new(compliance: ComplianceMode) -> Self {
        let mut manager = Self {
            compliance,
            filters: Vec::new(),
            appearance_filters: Vec::new(),
        };
        manager.reload(&[]);
        manager
    }

    /// Rebuild from the built-ins plus the configured groups.
    ///
    /// Groups that cannot be built are skipped with a warning. Groups
    /// reusing an id are kept; lookups by id see the one ranked first.
    pub fn reload(&mut self, groups: &[FilterGroup]) {
        let mut filters = default_filters(&self.compliance);
        for group in groups {
            match group.build() {
                Ok(filter) => {
                    if filters.iter().any(|f| f.id() == filter.id) {
                        tracing::debug!(group = %group.name, id = %filter.id, "filter id reused");
                    }
                    filters.push(Arc::new(filter));
                }
                Err(reason) => {
                    tracing::warn!(group = %group.name, %reason, "skipping invalid filter group");
                }
            }
        }
        filters.sort_by(|a, b| b.specificity().cmp(&a.specificity()));

        self.filters = filters;
        self.appearance_filters = default_appearance_filters(&self.compliance);
        tracing::debug!(
            filters = self.filters.len(),
            appearance_filters = self.appearance_filters.len(),
            compliance = %self.compliance,
            "key filters reloaded"
        );
    }

    pub fn compliance(&self) -> &ComplianceMode {
        &self.compliance
    }

    /// Classification filters in priority order.
    pub fn filters(&self) -> &[Arc<dyn KeyFilter>] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Most specific filter matching `key` in `contexts`.
    pub fn filter_matching(&self, key: &Key, contexts: MatchContexts) -> Option<Arc<dyn KeyFilter>> {
        self.filters
            .iter()
            .find(|f| f.matches(key, contexts))
            .cloned()
    }

    /// Every filter matching `key` in `contexts`, most specific first.
    pub fn filters_matching(&self, key: &Key, contexts: MatchContexts) -> Vec<Arc<dyn KeyFilter>> {
        self.filters
            .iter()
            .filter(|f| f.matches(key, contexts))
            .cloned()
            .collect()
    }

    /// Highest-priority filter with `id`.
    pub fn key_filter_by_id(&self, id: &str) -> Option<Arc<dyn KeyFilter>> {
        self.filters.iter().find(|f| f.id() == id).cloned()
    }

    /// Row of the first filter `id` in `filters()`.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.filters.iter().position(|f| f.id() == id)
    }

    fn appearance_chain<'a>(&'a self, key: &'a Key) -> impl Iterator<Item = &'a Arc<dyn KeyFilter>> + 'a {
        self.appearance_filters
            .iter()
            .chain(self.filters.iter())
            .filter(move |f| f.matches(key, MatchContexts::APPEARANCE))
    }

    /// Font for `key`; decorations of every matching filter accumulate.
    pub fn font(&self, key: &Key) -> FontDescription {
        self.appearance_chain(key)
            .fold(FontDescription::default(), |font, f| font.resolve(&f.font_description()))
    }

    pub fn fg_color(&self, key: &Key) -> Option<Color> {
        self.appearance_chain(key).find_map(|f| f.fg_color())
    }

    pub fn bg_color(&self, key: &Key) -> Option<Color> {
        self.appearance_chain(key).find_map(|f| f.bg_color())
    }

    pub fn icon(&self, key: &Key) -> Option<String> {
        self.appearance_chain(key)
            .find_map(|f| f.icon().map(str::to_string))
    }
}

impl Default for KeyFilterManager {
    fn default() -> Self {
        Self::new(ComplianceMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::key::Validity;
    use crate::core::services::builtin_filters::{
        ALL_CERTIFICATES, FOREIGN_CERTIFICATES, MY_CERTIFICATES, NEGATIVE_BACKGROUND,
        NOT_VALIDATED_CERTIFICATES, POSITIVE_BACKGROUND, TRUSTED_CERTIFICATES,
    };

    fn group(name: &str, src: &str) -> FilterGroup {
        FilterGroup::new(name, toml::from_str(src).unwrap())
    }

    #[test]
    fn secret_key_is_mine() {
        let manager = KeyFilterManager::default();
        let key = Key::new("AAAA").with_secret();

        let filter = manager.filter_matching(&key, MatchContexts::ANY).unwrap();
        assert_eq!(filter.id(), MY_CERTIFICATES);
        assert!(manager.font(&key).bold);
    }

    #[test]
    fn filtering_context_skips_appearance_only() {
        let manager = KeyFilterManager::default();
        let key = Key::new("BBBB").with_user_id("b@example.org", Validity::Full);

        let ids: Vec<String> = manager
            .filters_matching(&key, MatchContexts::FILTERING)
            .iter()
            .map(|f| f.id().to_string())
            .collect();
        assert_eq!(ids.first().map(String::as_str), Some(FOREIGN_CERTIFICATES));
        assert!(ids.contains(&TRUSTED_CERTIFICATES.to_string()));
        assert!(!ids.contains(&NOT_VALIDATED_CERTIFICATES.to_string()));
        assert_eq!(ids.last().map(String::as_str), Some(ALL_CERTIFICATES));
    }

    #[test]
    fn configured_filter_outranks_by_specificity() {
        let mut manager = KeyFilterManager::default();
        manager.reload(&[group(
            "Key Filter #1",
            &format!("id = \"revoked\"\nspecificity = {}\nis-revoked = true\nforeground-color = \"#FF0000\"", u32::MAX),
        )]);

        let mut key = Key::new("CCCC").with_secret();
        key.revoked = true;

        // Equal specificity keeps built-ins first.
        assert_eq!(manager.position_of("revoked"), Some(1));
        assert_eq!(manager.filter_matching(&key, MatchContexts::ANY).unwrap().id(), MY_CERTIFICATES);
        assert_eq!(manager.fg_color(&key), Some(Color::rgb(0xFF, 0, 0)));
    }

    #[test]
    fn low_specificity_config_lands_last() {
        let mut manager = KeyFilterManager::default();
        manager.reload(&[group("Key Filter #1", "id = \"tail\"")]);
        assert_eq!(manager.position_of("tail"), Some(manager.len() - 1));
        assert!(manager.key_filter_by_id("tail").is_some());
    }

    #[test]
    fn invalid_groups_are_skipped() {
        let mut manager = KeyFilterManager::default();
        let before = manager.len();
        manager.reload(&[
            group("Key Filter #1", "name = \"no id\""),
            group("Key Filter #2", "id = \"ok\"\nvalidity = \"bogus\""),
        ]);
        assert_eq!(manager.len(), before);
    }

    #[test]
    fn duplicate_ids_are_kept_and_highest_priority_wins() {
        let mut manager = KeyFilterManager::default();
        let before = manager.len();
        manager.reload(&[group(
            "Key Filter #1",
            "id = \"my-certificates\"\nname = \"Shadow\"\nspecificity = 0",
        )]);

        assert_eq!(manager.len(), before + 1);
        let found = manager.key_filter_by_id("my-certificates").unwrap();
        assert_eq!(found.specificity(), u32::MAX);
        assert_eq!(manager.position_of("my-certificates"), Some(0));
        assert_eq!(
            manager
                .filters()
                .iter()
                .filter(|f| f.id() == "my-certificates")
                .count(),
            2
        );
    }

    #[test]
    fn reload_replaces_previous_configuration() {
        let mut manager = KeyFilterManager::default();
        manager.reload(&[group("Key Filter #1", "id = \"temp\"")]);
        manager.reload(&[]);
        assert!(manager.key_filter_by_id("temp").is_none());
    }

    #[test]
    fn de_vs_mode_colors_rows() {
        let manager = KeyFilterManager::new(ComplianceMode::DeVs);
        let good = Key::new("DDDD").with_user_id("d@example.org", Validity::Full);
        let bad = Key::new("EEEE").with_user_id("e@example.org", Validity::Marginal);

        assert_eq!(manager.bg_color(&good), Some(POSITIVE_BACKGROUND));
        assert_eq!(manager.bg_color(&bad), Some(NEGATIVE_BACKGROUND));
        assert_eq!(KeyFilterManager::default().bg_color(&good), None);
    }

    #[test]
    fn appearance_falls_back_to_defaults() {
        let manager = KeyFilterManager::default();
        let key = Key::new("FFFF");
        assert!(manager.font(&key).is_plain());
        assert_eq!(manager.icon(&key), None);
    }
}

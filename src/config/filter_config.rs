use serde::Deserialize;

use crate::core::models::appearance::Color;
use crate::core::models::default_key_filter::{DefaultKeyFilter, LevelCriterion, TriState};
use crate::core::models::match_context::MatchContexts;

/// One `[Key Filter #N]` table, kept raw until the manager builds it.
///
/// Groups are parsed individually so that one malformed group does not
/// take the rest of the configuration down with it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGroup {
    pub name: String,
    pub entries: toml::Table,
}

impl FilterGroup {
    pub fn new(name: impl Into<String>, entries: toml::Table) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Build a criteria filter from this group.
    ///
    /// Returns a human-readable reason when the group cannot be used.
    pub fn build(&self) -> std::result::Result<DefaultKeyFilter, String> {
        let entries: FilterEntries = toml::Value::Table(self.entries.clone())
            .try_into()
            .map_err(|e: toml::de::Error| e.message().to_string())?;

        let id = entries
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "missing 'id'".to_string())?;

        let mut filter = DefaultKeyFilter::new(&id, entries.name.as_deref().unwrap_or(&id));
        filter.icon = entries.icon;
        filter.specificity = entries.specificity.unwrap_or(0);
        if let Some(contexts) = entries.match_contexts {
            filter.match_contexts = contexts.parse()?;
        }

        filter.fg_color = entries.foreground_color;
        filter.bg_color = entries.background_color;
        filter.font.family = entries.font;
        filter.font.bold = entries.font_bold.unwrap_or(false);
        filter.font.italic = entries.font_italic.unwrap_or(false);
        filter.font.strikeout = entries.font_strikeout.unwrap_or(false);

        let tri = |value: Option<bool>| value.map(TriState::from).unwrap_or_default();
        filter.revoked = tri(entries.is_revoked);
        filter.expired = tri(entries.is_expired);
        filter.invalid = tri(entries.is_invalid);
        filter.disabled = tri(entries.is_disabled);
        filter.root = tri(entries.is_root_certificate);
        filter.can_encrypt = tri(entries.can_encrypt);
        filter.can_sign = tri(entries.can_sign);
        filter.can_certify = tri(entries.can_certify);
        filter.can_authenticate = tri(entries.can_authenticate);
        filter.qualified = tri(entries.is_qualified);
        filter.card_key = tri(entries.is_cardkey);
        filter.has_secret = tri(entries.has_secret_key);
        filter.is_openpgp = tri(entries.is_openpgp_key);
        filter.was_validated = tri(entries.was_validated);
        filter.is_de_vs = tri(entries.is_de_vs);

        filter.validity = entries
            .validity
            .as_deref()
            .map(str::parse::<LevelCriterion>)
            .transpose()?;
        filter.owner_trust = entries
            .ownertrust
            .as_deref()
            .map(str::parse::<LevelCriterion>)
            .transpose()?;

        Ok(filter)
    }
}

/// `match-contexts = "any"` or `match-contexts = ["filtering", "appearance"]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContextsEntry {
    One(String),
    Many(Vec<String>),
}

impl ContextsEntry {
    fn parse(&self) -> std::result::Result<MatchContexts, String> {
        match self {
            ContextsEntry::One(s) => s.parse(),
            ContextsEntry::Many(list) => list
                .iter()
                .try_fold(MatchContexts::NONE, |acc, s| {
                    s.parse::<MatchContexts>().map(|c| acc | c)
                }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FilterEntries {
    id: Option<String>,
    name: Option<String>,
    icon: Option<String>,
    specificity: Option<u32>,
    match_contexts: Option<ContextsEntry>,
    foreground_color: Option<Color>,
    background_color: Option<Color>,
    font: Option<String>,
    font_bold: Option<bool>,
    font_italic: Option<bool>,
    font_strikeout: Option<bool>,

    is_revoked: Option<bool>,
    is_expired: Option<bool>,
    is_invalid: Option<bool>,
    is_disabled: Option<bool>,
    is_root_certificate: Option<bool>,
    can_encrypt: Option<bool>,
    can_sign: Option<bool>,
    can_certify: Option<bool>,
    can_authenticate: Option<bool>,
    is_qualified: Option<bool>,
    is_cardkey: Option<bool>,
    has_secret_key: Option<bool>,
    is_openpgp_key: Option<bool>,
    was_validated: Option<bool>,
    is_de_vs: Option<bool>,

    validity: Option<String>,
    ownertrust: Option<String>,
}

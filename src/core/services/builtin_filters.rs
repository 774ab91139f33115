use std::sync::Arc;

use crate::core::models::appearance::{Color, FontDescription};
use crate::core::models::compliance::ComplianceMode;
use crate::core::models::default_key_filter::{DefaultKeyFilter, LevelCriterion, LevelOp, TriState};
use crate::core::models::key::{Key, Validity};
use crate::core::models::match_context::MatchContexts;
use crate::core::traits::key_filter::KeyFilter;

pub const MY_CERTIFICATES: &str = "my-certificates";
pub const FOREIGN_CERTIFICATES: &str = "foreign-certificates";
pub const TRUSTED_CERTIFICATES: &str = "trusted-certificates";
pub const FULL_CERTIFICATES: &str = "full-certificates";
pub const OTHER_CERTIFICATES: &str = "other-certificates";
pub const NOT_VALIDATED_CERTIFICATES: &str = "not-validated-certificates";
pub const VS_COMPLIANT_CERTIFICATES: &str = "vs-compliant-certificates";
pub const ALL_CERTIFICATES: &str = "all-certificates";
pub const DE_VS_VALID_APPEARANCE: &str = "de-vs-valid-appearance";
pub const DE_VS_NOT_VALID_APPEARANCE: &str = "de-vs-not-valid-appearance";

/// Background for keys usable in VS-NfD mode.
pub const POSITIVE_BACKGROUND: Color = Color::rgb(0xD5, 0xFA, 0xE2);
/// Background for keys not usable in VS-NfD mode.
pub const NEGATIVE_BACKGROUND: Color = Color::rgb(0xFA, 0xE9, 0xEB);

/// Filter whose match rule is a fixed function instead of criteria.
#[derive(Debug, Clone)]
pub struct PredicateKeyFilter {
    attrs: DefaultKeyFilter,
    predicate: fn(&Key) -> bool,
}

impl PredicateKeyFilter {
    pub fn new(attrs: DefaultKeyFilter, predicate: fn(&Key) -> bool) -> Self {
        Self { attrs, predicate }
    }
}

impl KeyFilter for PredicateKeyFilter {
    fn id(&self) -> &str {
        &self.attrs.id
    }

    fn name(&self) -> &str {
        &self.attrs.name
    }

    fn icon(&self) -> Option<&str> {
        self.attrs.icon.as_deref()
    }

    fn specificity(&self) -> u32 {
        self.attrs.specificity
    }

    fn match_contexts(&self) -> MatchContexts {
        self.attrs.match_contexts
    }

    fn font_description(&self) -> FontDescription {
        self.attrs.font.clone()
    }

    fn fg_color(&self) -> Option<Color> {
        self.attrs.fg_color
    }

    fn bg_color(&self) -> Option<Color> {
        self.attrs.bg_color
    }

    fn matches(&self, key: &Key, contexts: MatchContexts) -> bool {
        self.attrs.match_contexts.intersects(contexts) && (self.predicate)(key)
    }
}

fn base(id: &str, name: &str, rank: u32, contexts: MatchContexts) -> DefaultKeyFilter {
    let mut filter = DefaultKeyFilter::new(id, name);
    filter.specificity = u32::MAX - rank;
    filter.match_contexts = contexts;
    filter
}

/// Built-in classification filters, most specific first.
///
/// Built-ins sit at the very top of the specificity range so that
/// configured filters only outrank them by asking for it explicitly.
pub fn default_filters(compliance: &ComplianceMode) -> Vec<Arc<dyn KeyFilter>> {
    let mut mine = base(MY_CERTIFICATES, "My Certificates", 0, MatchContexts::ANY);
    mine.has_secret = TriState::Set;
    mine.font.bold = true;

    let mut foreign = base(FOREIGN_CERTIFICATES, "Foreign Certificates", 1, MatchContexts::ANY);
    foreign.has_secret = TriState::NotSet;

    let mut trusted = base(TRUSTED_CERTIFICATES, "Trusted Certificates", 2, MatchContexts::FILTERING);
    trusted.revoked = TriState::NotSet;
    trusted.validity = Some(LevelCriterion::new(LevelOp::IsAtLeast, Validity::Marginal));

    let mut full = base(FULL_CERTIFICATES, "Fully Trusted Certificates", 3, MatchContexts::FILTERING);
    full.revoked = TriState::NotSet;
    full.validity = Some(LevelCriterion::new(LevelOp::IsAtLeast, Validity::Full));

    let mut other = base(OTHER_CERTIFICATES, "Other Certificates", 4, MatchContexts::FILTERING);
    other.has_secret = TriState::NotSet;
    other.validity = Some(LevelCriterion::new(LevelOp::IsAtMost, Validity::Never));

    let not_validated = PredicateKeyFilter::new(
        base(NOT_VALIDATED_CERTIFICATES, "Not validated Certificates", 5, MatchContexts::FILTERING),
        |key| !key.uids_have_full_validity(),
    );

    let mut result: Vec<Arc<dyn KeyFilter>> = vec![
        Arc::new(mine),
        Arc::new(foreign),
        Arc::new(trusted),
        Arc::new(full),
        Arc::new(other),
        Arc::new(not_validated),
    ];

    if compliance.is_de_vs() {
        result.push(Arc::new(PredicateKeyFilter::new(
            base(VS_COMPLIANT_CERTIFICATES, "VS-NfD-compliant Certificates", 6, MatchContexts::FILTERING),
            Key::is_de_vs,
        )));
    }

    result.push(Arc::new(base(ALL_CERTIFICATES, "All Certificates", 7, MatchContexts::FILTERING)));
    result
}

/// Appearance-only filters, consulted before the classification ones.
pub fn default_appearance_filters(compliance: &ComplianceMode) -> Vec<Arc<dyn KeyFilter>> {
    if !compliance.is_de_vs() {
        return Vec::new();
    }

    let mut valid = base(DE_VS_VALID_APPEARANCE, "VS-NfD valid", 0, MatchContexts::APPEARANCE);
    valid.bg_color = Some(POSITIVE_BACKGROUND);
    let mut not_valid = base(DE_VS_NOT_VALID_APPEARANCE, "VS-NfD not valid", 1, MatchContexts::APPEARANCE);
    not_valid.bg_color = Some(NEGATIVE_BACKGROUND);

    vec![
        Arc::new(PredicateKeyFilter::new(valid, |key| {
            key.uids_have_full_validity() && key.is_de_vs()
        })),
        Arc::new(PredicateKeyFilter::new(not_valid, |key| {
            !key.uids_have_full_validity() || !key.is_de_vs()
        })),
    ]
}

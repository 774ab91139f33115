use crate::core::models::appearance::{Color, FontDescription};
use crate::core::models::key::Key;
use crate::core::models::match_context::MatchContexts;

/// A named classification rule over keys.
///
/// Filters are immutable once built. The manager orders them by
/// `specificity`, highest first, and asks `matches` with the context it
/// is answering for.
pub trait KeyFilter: Send + Sync + std::fmt::Debug {
    /// Stable identifier, e.g. `my-certificates`.
    fn id(&self) -> &str;

    /// Human readable name.
    fn name(&self) -> &str;

    fn icon(&self) -> Option<&str>;

    fn specificity(&self) -> u32;

    fn match_contexts(&self) -> MatchContexts;

    fn font_description(&self) -> FontDescription;

    fn fg_color(&self) -> Option<Color>;

    fn bg_color(&self) -> Option<Color>;

    /// True if `key` satisfies this filter when consulted for `contexts`.
    fn matches(&self, key: &Key, contexts: MatchContexts) -> bool;
}

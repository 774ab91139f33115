use crate::core::models::appearance::{Color, FontDescription};
use crate::core::models::key::{Key, Protocol, Validity};
use crate::core::models::match_context::MatchContexts;
use crate::core::traits::key_filter::KeyFilter;

/// Requirement on a boolean key property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriState {
    #[default]
    DoesNotMatter,
    Set,
    NotSet,
}

impl TriState {
    pub fn accepts(self, value: bool) -> bool {
        match self {
            TriState::DoesNotMatter => true,
            TriState::Set => value,
            TriState::NotSet => !value,
        }
    }
}

impl From<bool> for TriState {
    fn from(required: bool) -> Self {
        if required {
            TriState::Set
        } else {
            TriState::NotSet
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOp {
    Is,
    IsNot,
    IsAtLeast,
    IsAtMost,
}

/// Requirement on a validity-like level, e.g. `is-at-least:marginal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCriterion {
    pub op: LevelOp,
    pub level: Validity,
}

impl LevelCriterion {
    pub fn new(op: LevelOp, level: Validity) -> Self {
        Self { op, level }
    }

    pub fn accepts(&self, actual: Validity) -> bool {
        match self.op {
            LevelOp::Is => actual == self.level,
            LevelOp::IsNot => actual != self.level,
            LevelOp::IsAtLeast => actual >= self.level,
            LevelOp::IsAtMost => actual <= self.level,
        }
    }
}

impl std::str::FromStr for LevelCriterion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (op, level) = s
            .split_once(':')
            .ok_or_else(|| format!("'{s}' is not of the form <op>:<level>"))?;
        let op = match op.trim().to_ascii_lowercase().as_str() {
            "is" => LevelOp::Is,
            "is-not" => LevelOp::IsNot,
            "is-at-least" => LevelOp::IsAtLeast,
            "is-at-most" => LevelOp::IsAtMost,
            other => return Err(format!("unknown level operator '{other}'")),
        };
        Ok(Self::new(op, level.parse()?))
    }
}

/// Criteria-based filter: every criterion that is not `DoesNotMatter`
/// must hold for a key to match.
///
/// Both the built-in filters and the ones read from configuration are
/// instances of this type.
#[derive(Debug, Clone)]
pub struct DefaultKeyFilter {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub specificity: u32,
    pub match_contexts: MatchContexts,
    pub font: FontDescription,
    pub fg_color: Option<Color>,
    pub bg_color: Option<Color>,

    pub revoked: TriState,
    pub expired: TriState,
    pub invalid: TriState,
    pub disabled: TriState,
    pub root: TriState,
    pub can_encrypt: TriState,
    pub can_sign: TriState,
    pub can_certify: TriState,
    pub can_authenticate: TriState,
    pub qualified: TriState,
    pub card_key: TriState,
    pub has_secret: TriState,
    pub is_openpgp: TriState,
    pub was_validated: TriState,
    pub is_de_vs: TriState,

    pub validity: Option<LevelCriterion>,
    pub owner_trust: Option<LevelCriterion>,
}

impl Default for DefaultKeyFilter {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            icon: None,
            specificity: 0,
            match_contexts: MatchContexts::ANY,
            font: FontDescription::default(),
            fg_color: None,
            bg_color: None,
            revoked: TriState::default(),
            expired: TriState::default(),
            invalid: TriState::default(),
            disabled: TriState::default(),
            root: TriState::default(),
            can_encrypt: TriState::default(),
            can_sign: TriState::default(),
            can_certify: TriState::default(),
            can_authenticate: TriState::default(),
            qualified: TriState::default(),
            card_key: TriState::default(),
            has_secret: TriState::default(),
            is_openpgp: TriState::default(),
            was_validated: TriState::default(),
            is_de_vs: TriState::default(),
            validity: None,
            owner_trust: None,
        }
    }
}

impl DefaultKeyFilter {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Whether the key satisfies every criterion, ignoring contexts.
    pub fn criteria_hold(&self, key: &Key) -> bool {
        let flags = [
            (self.revoked, key.revoked),
            (self.expired, key.expired),
            (self.invalid, key.invalid),
            (self.disabled, key.disabled),
            (self.root, key.is_root),
            (self.can_encrypt, key.can_encrypt),
            (self.can_sign, key.can_sign),
            (self.can_certify, key.can_certify),
            (self.can_authenticate, key.can_authenticate),
            (self.qualified, key.is_qualified),
            (self.card_key, key.is_card_key),
            (self.has_secret, key.has_secret),
            (self.is_openpgp, key.protocol == Protocol::OpenPgp),
        ];
        if !flags.iter().all(|(state, value)| state.accepts(*value)) {
            return false;
        }

        // Computed lazily: these walk user IDs and subkeys.
        if self.was_validated != TriState::DoesNotMatter
            && !self.was_validated.accepts(key.was_validated())
        {
            return false;
        }
        if self.is_de_vs != TriState::DoesNotMatter && !self.is_de_vs.accepts(key.is_de_vs()) {
            return false;
        }

        if let Some(validity) = &self.validity {
            if !validity.accepts(key.validity()) {
                return false;
            }
        }
        if let Some(owner_trust) = &self.owner_trust {
            if !owner_trust.accepts(key.owner_trust) {
                return false;
            }
        }
        true
    }
}

impl KeyFilter for DefaultKeyFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    fn specificity(&self) -> u32 {
        self.specificity
    }

    fn match_contexts(&self) -> MatchContexts {
        self.match_contexts
    }

    fn font_description(&self) -> FontDescription {
        self.font.clone()
    }

    fn fg_color(&self) -> Option<Color> {
        self.fg_color
    }

    fn bg_color(&self) -> Option<Color> {
        self.bg_color
    }

    fn matches(&self, key: &Key, contexts: MatchContexts) -> bool {
        self.match_contexts.intersects(contexts) && self.criteria_hold(key)
    }
}

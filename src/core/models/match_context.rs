use std::ops::{BitAnd, BitOr};

/// Set of situations a filter applies to.
///
/// A filter used for narrowing down a key list is consulted with
/// `FILTERING`; one used for styling rows with `APPEARANCE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatchContexts(u8);

impl MatchContexts {
    pub const NONE: Self = Self(0);
    pub const APPEARANCE: Self = Self(0b01);
    pub const FILTERING: Self = Self(0b10);
    pub const ANY: Self = Self(0b11);

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for MatchContexts {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for MatchContexts {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl std::str::FromStr for MatchContexts {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "appearance" => Ok(Self::APPEARANCE),
            "filtering" => Ok(Self::FILTERING),
            "any" | "any-match-context" => Ok(Self::ANY),
            other => Err(format!("unknown match context '{other}'")),
        }
    }
}

impl std::fmt::Display for MatchContexts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::NONE => write!(f, "none"),
            Self::APPEARANCE => write!(f, "appearance"),
            Self::FILTERING => write!(f, "filtering"),
            _ => write!(f, "any"),
        }
    }
}

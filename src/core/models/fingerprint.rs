use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Primary fingerprint of a certificate.
///
/// The stored spelling is kept for display, but equality, hashing and
/// ordering ignore ASCII case: `"ab12"` and `"AB12"` are the same key.
/// An empty fingerprint marks a null key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(fpr: impl Into<String>) -> Self {
        Self(fpr.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Case-insensitive total order over fingerprint strings.
pub fn compare_fingerprints(lhs: &str, rhs: &str) -> Ordering {
    lhs.bytes()
        .map(|b| b.to_ascii_uppercase())
        .cmp(rhs.bytes().map(|b| b.to_ascii_uppercase()))
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Fingerprint {}

impl PartialOrd for Fingerprint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fingerprint {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_fingerprints(&self.0, &other.0)
    }
}

impl Hash for Fingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_uppercase());
        }
    }
}

impl From<&str> for Fingerprint {
    fn from(fpr: &str) -> Self {
        Self::new(fpr)
    }
}

impl From<String> for Fingerprint {
    fn from(fpr: String) -> Self {
        Self::new(fpr)
    }
}

impl From<Fingerprint> for String {
    fn from(fpr: Fingerprint) -> Self {
        fpr.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

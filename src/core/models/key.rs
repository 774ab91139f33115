use serde::{Deserialize, Serialize};

use crate::core::models::fingerprint::Fingerprint;

/// Validity (or owner-trust) level of a key or user ID.
///
/// Variants are declared in ascending order so the derived `Ord` can be
/// used for "at least" / "at most" comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    #[default]
    Unknown,
    Undefined,
    Never,
    Marginal,
    Full,
    Ultimate,
}

impl std::str::FromStr for Validity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "undefined" => Ok(Self::Undefined),
            "never" => Ok(Self::Never),
            "marginal" => Ok(Self::Marginal),
            "full" => Ok(Self::Full),
            "ultimate" => Ok(Self::Ultimate),
            other => Err(format!("unknown validity level '{other}'")),
        }
    }
}

/// Certificate flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    OpenPgp,
    /// X.509 / S/MIME.
    Cms,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserId {
    pub id: String,
    pub validity: Validity,
    pub revoked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subkey {
    pub revoked: bool,
    pub expired: bool,
    /// Subkey algorithms are approved for VS-NfD use.
    pub de_vs: bool,
}

/// A certificate as delivered by the key listing backend.
///
/// All flags arrive precomputed; nothing here parses or validates
/// certificate material. Two keys are equal when their fingerprints
/// are, regardless of every other field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Key {
    pub fingerprint: Fingerprint,
    /// Fingerprint of the issuing certificate, if known.
    pub chain_id: Option<Fingerprint>,
    pub is_root: bool,
    pub protocol: Protocol,
    pub has_secret: bool,
    pub revoked: bool,
    pub expired: bool,
    pub disabled: bool,
    pub invalid: bool,
    pub can_encrypt: bool,
    pub can_sign: bool,
    pub can_certify: bool,
    pub can_authenticate: bool,
    pub is_qualified: bool,
    pub is_card_key: bool,
    pub owner_trust: Validity,
    pub user_ids: Vec<UserId>,
    pub subkeys: Vec<Subkey>,
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    pub expires: Option<chrono::DateTime<chrono::Utc>>,
}

impl Key {
    pub fn new(fingerprint: impl Into<Fingerprint>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            ..Self::default()
        }
    }

    /// Mark this key as issued by `issuer`.
    pub fn issued_by(mut self, issuer: impl Into<Fingerprint>) -> Self {
        self.chain_id = Some(issuer.into());
        self.is_root = false;
        self
    }

    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    pub fn with_secret(mut self) -> Self {
        self.has_secret = true;
        self
    }

    pub fn with_user_id(mut self, id: &str, validity: Validity) -> Self {
        self.user_ids.push(UserId {
            id: id.to_string(),
            validity,
            revoked: false,
        });
        self
    }

    pub fn is_null(&self) -> bool {
        self.fingerprint.is_empty()
    }

    /// Issuer fingerprint used for tree placement.
    ///
    /// Roots have none even when the backend reports themselves as
    /// their own issuer.
    pub fn clean_chain_id(&self) -> Option<&Fingerprint> {
        if self.is_root {
            return None;
        }
        self.chain_id
            .as_ref()
            .filter(|issuer| !issuer.is_empty() && **issuer != self.fingerprint)
    }

    /// Validity of the primary user ID.
    pub fn validity(&self) -> Validity {
        self.user_ids
            .first()
            .map(|uid| uid.validity)
            .unwrap_or_default()
    }

    pub fn uids_have_full_validity(&self) -> bool {
        self.user_ids.iter().all(|uid| uid.validity >= Validity::Full)
    }

    /// Every subkey still in use carries the VS-NfD compliance flag.
    pub fn is_de_vs(&self) -> bool {
        self.subkeys
            .iter()
            .filter(|sub| !sub.expired && !sub.revoked)
            .all(|sub| sub.de_vs)
    }

    pub fn was_validated(&self) -> bool {
        self.owner_trust != Validity::Unknown
            || self
                .user_ids
                .iter()
                .any(|uid| uid.validity != Validity::Unknown)
    }

    pub fn primary_user_id(&self) -> Option<&str> {
        self.user_ids.first().map(|uid| uid.id.as_str())
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for Key {}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.primary_user_id() {
            Some(uid) => write!(f, "{} ({})", self.fingerprint, uid),
            None => write!(f, "{}", self.fingerprint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_fingerprint_only() {
        let a = Key::new("aaaa").with_secret();
        let b = Key::new("AAAA").root();
        assert_eq!(a, b);
    }

    #[test]
    fn clean_chain_id_ignores_roots_and_self_issued() {
        assert!(Key::new("AAAA").issued_by("BBBB").root().clean_chain_id().is_none());
        assert!(Key::new("AAAA").issued_by("aaaa").clean_chain_id().is_none());
        assert!(Key::new("AAAA").issued_by("").clean_chain_id().is_none());
        assert_eq!(
            Key::new("AAAA").issued_by("BBBB").clean_chain_id(),
            Some(&Fingerprint::from("BBBB"))
        );
    }

    #[test]
    fn full_validity_requires_every_user_id() {
        let key = Key::new("AAAA")
            .with_user_id("alice@example.org", Validity::Ultimate)
            .with_user_id("alice@work.example", Validity::Marginal);
        assert!(!key.uids_have_full_validity());
        assert_eq!(key.validity(), Validity::Ultimate);
    }

    #[test]
    fn de_vs_ignores_retired_subkeys() {
        let mut key = Key::new("AAAA");
        key.subkeys = vec![
            Subkey { revoked: false, expired: false, de_vs: true },
            Subkey { revoked: true, expired: false, de_vs: false },
            Subkey { revoked: false, expired: true, de_vs: false },
        ];
        assert!(key.is_de_vs());

        key.subkeys.push(Subkey::default());
        assert!(!key.is_de_vs());
    }

    #[test]
    fn deserialize_minimal_json() {
        let key: Key = serde_json::from_str(
            r#"{"fingerprint": "BBBB", "chain_id": "AAAA",
                "user_ids": [{"id": "bob@example.org", "validity": "full"}]}"#,
        )
        .unwrap();
        assert_eq!(key.fingerprint.as_str(), "BBBB");
        assert_eq!(key.clean_chain_id().map(|f| f.as_str()), Some("AAAA"));
        assert_eq!(key.validity(), Validity::Full);
        assert!(!key.has_secret);
    }

    #[test]
    fn validity_parses_case_insensitively() {
        assert_eq!("Marginal".parse::<Validity>(), Ok(Validity::Marginal));
        assert!("sometimes".parse::<Validity>().is_err());
    }
}

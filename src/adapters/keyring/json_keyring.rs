use std::path::{Path, PathBuf};

use crate::core::errors::{CertListError, Result};
use crate::core::models::key::Key;
use crate::core::traits::key_source::KeySource;

/// Keyring read from a JSON export: an array of key objects.
///
/// Only `fingerprint` is required; every other field defaults.
///
/// ```json
/// [
///   { "fingerprint": "A1B2...", "is_root": true },
///   { "fingerprint": "C3D4...", "chain_id": "A1B2...", "has_secret": true }
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct JsonKeyring {
    path: PathBuf,
}

impl JsonKeyring {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<Vec<Key>> {
        serde_json::from_str(content).map_err(|e| CertListError::KeyringParse {
            path: self.path.clone(),
            detail: e.to_string(),
        })
    }
}

impl KeySource for JsonKeyring {
    fn list_keys(&self) -> Result<Vec<Key>> {
        if !self.path.exists() {
            return Err(CertListError::FileNotFound {
                path: self.path.clone(),
            });
        }
        let content = std::fs::read_to_string(&self.path)?;
        let keys = self.parse(&content)?;
        tracing::debug!(path = %self.path.display(), keys = keys.len(), "keyring read");
        Ok(keys)
    }
}

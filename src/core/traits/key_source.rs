use crate::core::errors::Result;
use crate::core::models::key::Key;

/// Port for listing certificates from a keyring backend.
pub trait KeySource {
    /// Every certificate the backend knows, in backend order.
    fn list_keys(&self) -> Result<Vec<Key>>;
}

use std::path::PathBuf;

/// All domain errors for certlist.
///
/// Only the edges of the crate (keyring loading, configuration, the
/// CLI) can fail. Key list and filter operations are total: a missing
/// key is `None`, a duplicate insert is an update.
#[derive(Debug, thiserror::Error)]
pub enum CertListError {
    #[error(
        "File not found: {path}\n\n  \
         Check that the path is correct and the file exists."
    )]
    FileNotFound { path: PathBuf },

    #[error(
        "Could not read keyring {path}: {detail}\n\n  \
         Expected a JSON array of key objects, each with at least a \"fingerprint\".\n  \
         Example: [{{\"fingerprint\": \"AAAA\", \"is_root\": true}}]"
    )]
    KeyringParse { path: PathBuf, detail: String },

    #[error(
        "Invalid configuration: {detail}\n\n  \
         Filter groups live in tables named [\"Key Filter #N\"] and need an `id`.\n  \
         The compliance mode is set in [general] compliance = \"de-vs\"."
    )]
    InvalidConfig { detail: String },

    #[error(
        "Unknown key filter: {id}\n\n  \
         Run 'certlist filters' to list the available filter ids."
    )]
    UnknownFilter { id: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CertListError>;

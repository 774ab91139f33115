/// Compliance mode the key list is operated in.
///
/// Only `DeVs` (German VS-NfD) changes behaviour: it adds a filter for
/// compliant keys and colors rows by compliance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ComplianceMode {
    #[default]
    None,
    DeVs,
    /// A mode this build knows no rules for.
    Other(String),
}

impl ComplianceMode {
    pub fn is_de_vs(&self) -> bool {
        matches!(self, ComplianceMode::DeVs)
    }
}

impl std::str::FromStr for ComplianceMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "" | "gnupg" => ComplianceMode::None,
            "de-vs" => ComplianceMode::DeVs,
            other => ComplianceMode::Other(other.to_string()),
        })
    }
}

impl std::fmt::Display for ComplianceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceMode::None => write!(f, "gnupg"),
            ComplianceMode::DeVs => write!(f, "de-vs"),
            ComplianceMode::Other(name) => write!(f, "{name}"),
        }
    }
}

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::config::filter_config::FilterGroup;
use crate::core::errors::{CertListError, Result};
use crate::core::models::compliance::ComplianceMode;

/// Tables named like this are filter definitions.
static FILTER_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Key Filter #(\d+)$").expect("filter group pattern is valid")
});

/// Top-level certlist configuration read from `certlist.toml`.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub general: GeneralSection,
    /// Filter groups in ascending group number.
    pub filter_groups: Vec<FilterGroup>,
}

/// The `[general]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GeneralSection {
    /// Compliance mode, e.g. `"de-vs"`. Absent means none.
    pub compliance: Option<String>,
}

impl AppConfig {
    /// Load the configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CertListError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            CertListError::InvalidConfig { detail } => CertListError::InvalidConfig {
                detail: format!("{}: {detail}", path.display()),
            },
            other => other,
        })?;
        tracing::debug!(
            path = %path.display(),
            groups = config.filter_groups.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Load from an explicit path, or from the default location if it exists.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut table: toml::Table =
            toml::from_str(content).map_err(|e| CertListError::InvalidConfig {
                detail: format!("Failed to parse configuration: {e}"),
            })?;

        let general = match table.remove("general") {
            Some(value) => value
                .try_into()
                .map_err(|e: toml::de::Error| CertListError::InvalidConfig {
                    detail: format!("Invalid [general] section: {}", e.message()),
                })?,
            None => GeneralSection::default(),
        };

        let mut numbered: Vec<(u64, FilterGroup)> = Vec::new();
        for (name, value) in table {
            let Some(number) = FILTER_GROUP
                .captures(&name)
                .and_then(|caps| caps[1].parse::<u64>().ok())
            else {
                tracing::debug!(table = %name, "ignoring unknown configuration table");
                continue;
            };
            match value {
                toml::Value::Table(entries) => numbered.push((number, FilterGroup::new(name, entries))),
                _ => tracing::warn!(group = %name, "filter group is not a table, skipping"),
            }
        }
        numbered.sort_by_key(|(number, _)| *number);

        Ok(Self {
            general,
            filter_groups: numbered.into_iter().map(|(_, group)| group).collect(),
        })
    }

    /// `$XDG_CONFIG_HOME/certlist/certlist.toml` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("certlist").join("certlist.toml"))
    }

    pub fn compliance_mode(&self) -> ComplianceMode {
        self.general
            .compliance
            .as_deref()
            .and_then(|mode| mode.parse().ok())
            .unwrap_or_default()
    }
}

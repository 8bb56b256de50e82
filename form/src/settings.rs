//! Form display settings.
//!
//! Settings are read from a TOML file; every key is optional:
//!
//! ```toml
//! minimal_form = true
//! ontology_details = false
//! synonym_fields = ["hasSynonym", "hasExactSynonym"]
//! default_cut_depth = 2
//! disclosure_delay_ms = 500
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fields whose values are merged into an option's synonym string.
pub const DEFAULT_SYNONYM_FIELDS: &[&str] = &[
    "hasSynonym",
    "hasExactSynonym",
    "hasNarrowSynonym",
    "hasAlternativeTerm",
];

/// Hover delay before a collapsed optional field opens.
pub const DEFAULT_DISCLOSURE_DELAY_MS: u64 = 500;

/// Settings could not be loaded.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("cannot read settings {path:?}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid TOML for [`FormSettings`].
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Options that change how a form is compiled and behaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Collapse optional empty fields until hovered.
    pub minimal_form: bool,
    /// Show cardinality annotations and entity anchors in labels.
    pub ontology_details: bool,
    /// Entity keys merged into option synonym strings.
    pub synonym_fields: Vec<String>,
    /// Choice depth cutoff for categorical nodes without a `depth` feature.
    pub default_cut_depth: Option<usize>,
    /// Hover delay in milliseconds before a collapsed field opens.
    pub disclosure_delay_ms: u64,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            minimal_form: false,
            ontology_details: false,
            synonym_fields: DEFAULT_SYNONYM_FIELDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            default_cut_depth: None,
            disclosure_delay_ms: DEFAULT_DISCLOSURE_DELAY_MS,
        }
    }
}

impl FormSettings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] if the text is not valid settings TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be read, or
    /// [`SettingsError::Parse`] if it is not valid settings TOML.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?settings, "loaded form settings");
        Ok(settings)
    }

    /// The hover delay as a [`Duration`].
    #[must_use]
    pub fn disclosure_delay(&self) -> Duration {
        Duration::from_millis(self.disclosure_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = FormSettings::default();
        assert!(!settings.minimal_form);
        assert_eq!(settings.synonym_fields.len(), 4);
        assert_eq!(settings.disclosure_delay(), Duration::from_millis(500));
    }

    #[test]
    fn partial_toml_keeps_defaults() -> Result<(), SettingsError> {
        let settings = FormSettings::from_toml_str("minimal_form = true\ndefault_cut_depth = 2\n")?;
        assert!(settings.minimal_form);
        assert_eq!(settings.default_cut_depth, Some(2));
        assert_eq!(settings.disclosure_delay_ms, DEFAULT_DISCLOSURE_DELAY_MS);
        Ok(())
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(matches!(
            FormSettings::from_toml_str("minimal_form = \"yes\""),
            Err(SettingsError::Parse(_))
        ));
    }
}

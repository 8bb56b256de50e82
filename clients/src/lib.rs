//! Shared plumbing for the GEEM client binaries: argument groups for
//! selecting a document and form settings, and logging setup.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use geem_form::FormSettings;
use geem_spec::{DirectoryLoader, ResourceLoader, SpecificationDocument};
use tracing_subscriber::EnvFilter;

/// Where the specification document comes from.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Specification document (a bare tree or a resource record).
    #[arg(long, conflicts_with = "resource")]
    pub document: Option<PathBuf>,

    /// Directory of `<id>.json` resource records.
    #[arg(long, default_value = ".")]
    pub resources: PathBuf,

    /// Resource id to load from `--resources`.
    #[arg(long)]
    pub resource: Option<String>,
}

impl SourceArgs {
    /// Loads and annotates the selected document.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `--document` nor `--resource` is given, or
    /// the document cannot be read or parsed.
    pub fn load(&self) -> Result<SpecificationDocument> {
        match (&self.document, &self.resource) {
            (Some(path), _) => SpecificationDocument::from_path(path)
                .with_context(|| format!("Failed to load document: {}", path.display())),
            (None, Some(id)) => {
                let loader = DirectoryLoader::new(&self.resources);
                let resource = loader
                    .load(id)
                    .with_context(|| format!("Failed to load resource {id} from {}", self.resources.display()))?;
                tracing::info!(id = %resource.id, title = %resource.summary().title(), "loaded resource");
                resource
                    .document()
                    .with_context(|| format!("Resource {id} has no usable contents"))
            }
            (None, None) => bail!("either --document or --resource is required"),
        }
    }
}

/// Form settings: a TOML file plus command-line overrides.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Form settings file (TOML).
    #[arg(long, env = "GEEM_FORM_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Collapse optional fields until hovered.
    #[arg(long)]
    pub minimal_form: bool,

    /// Show cardinality labels and entity anchors.
    #[arg(long)]
    pub ontology_details: bool,
}

impl SettingsArgs {
    /// Resolves the effective settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed.
    pub fn load(&self) -> Result<FormSettings> {
        let mut settings = match &self.settings {
            Some(path) => FormSettings::load(path)
                .with_context(|| format!("Failed to load settings: {}", path.display()))?,
            None => FormSettings::default(),
        };
        settings.minimal_form |= self.minimal_form;
        settings.ontology_details |= self.ontology_details;
        Ok(settings)
    }
}

/// Logs authoring problems found under `focus` without failing.
pub fn report_problems(document: &SpecificationDocument, focus: &str) {
    let root = focus.split('/').find(|s| !s.is_empty()).unwrap_or_default();
    if let Some(entity) = document.root(root) {
        for problem in entity.validate() {
            tracing::warn!(focus, "{problem}");
        }
    }
}

/// Installs the `tracing` subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() -> Result<()> {
        let args = SettingsArgs {
            settings: None,
            minimal_form: true,
            ontology_details: false,
        };
        let settings = args.load()?;
        assert!(settings.minimal_form);
        assert!(!settings.ontology_details);
        Ok(())
    }

    #[test]
    fn source_requires_document_or_resource() {
        let args = SourceArgs {
            document: None,
            resources: PathBuf::from("."),
            resource: None,
        };
        assert!(args.load().is_err());
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let args = SourceArgs {
            document: None,
            resources: std::env::temp_dir(),
            resource: Some("../escape".to_string()),
        };
        assert!(args.load().is_err());
    }
}

//! Resource records and the collaborators that load and guard them.
//!
//! A resource is a named, versioned specification package. Storage and
//! authentication live outside this workspace; they are reached through the
//! [`ResourceLoader`] and [`OwnershipCheck`] traits. [`DirectoryLoader`] is a
//! file-backed loader used by the command-line clients and tests.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use walkdir::WalkDir;

use crate::document::SpecificationDocument;
use crate::error::SpecError;

/// Id of the template resource that seeds new packages.
pub const RESOURCE_TEMPLATE_ID: &str = "1";

/// A full resource record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Record id; numeric ids are kept as their decimal string.
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Package name.
    #[serde(default)]
    pub name: String,
    /// Package version, usually a date.
    #[serde(default)]
    pub version: String,
    /// Owner API URL, e.g. `http://host/api/users/7/?format=json`.
    #[serde(default)]
    pub owner: Option<String>,
    /// Whether the package is publicly listed.
    #[serde(default)]
    pub public: bool,
    /// Whether the package was derived from an ontology.
    #[serde(default)]
    pub ontology: bool,
    /// Curation status, e.g. `draft` or `published`.
    #[serde(default)]
    pub curation: String,
    /// The specification document.
    #[serde(default)]
    pub contents: Value,
}

impl Resource {
    /// Parses `contents` into a specification document.
    ///
    /// # Errors
    ///
    /// See [`SpecificationDocument::from_value`].
    pub fn document(&self) -> Result<SpecificationDocument, SpecError> {
        SpecificationDocument::from_value(self.contents.clone())
    }

    /// Numeric user id parsed out of the owner URL.
    #[must_use]
    pub fn owner_user_id(&self) -> Option<u64> {
        self.owner.as_deref().and_then(owner_user_id)
    }

    /// The listing entry for this record.
    #[must_use]
    pub fn summary(&self) -> ResourceSummary {
        ResourceSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            public: self.public,
            ontology: self.ontology,
            curation: self.curation.clone(),
        }
    }
}

/// A resource listing entry without contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    /// Record id.
    pub id: String,
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Whether the package is publicly listed.
    pub public: bool,
    /// Whether the package was derived from an ontology.
    pub ontology: bool,
    /// Curation status.
    pub curation: String,
}

impl ResourceSummary {
    /// Picker label, `name (version)`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} ({})", self.name, self.version)
    }
}

/// Listing filter for resource pickers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Keep only ontology-derived (or only hand-built) packages.
    pub ontology: Option<bool>,
    /// Keep only public (or only private) packages; the template is dropped.
    pub public: Option<bool>,
    /// Keep only drafts.
    pub draft_only: bool,
}

impl ResourceFilter {
    /// Returns true if `summary` passes the filter.
    #[must_use]
    pub fn accepts(&self, summary: &ResourceSummary) -> bool {
        if self.ontology.is_some_and(|o| o != summary.ontology) {
            return false;
        }
        if let Some(public) = self.public {
            if summary.public != public || summary.id == RESOURCE_TEMPLATE_ID {
                return false;
            }
        }
        !self.draft_only || summary.curation == "draft"
    }
}

/// Source of resource records.
pub trait ResourceLoader {
    /// Loads one resource by id.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::UnknownResource`] if there is no such record, or
    /// an I/O or JSON error if it cannot be read.
    fn load(&self, id: &str) -> Result<Resource, SpecError>;

    /// Lists every available resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be enumerated.
    fn list(&self) -> Result<Vec<ResourceSummary>, SpecError>;
}

/// Decides whether the current session may edit a resource.
pub trait OwnershipCheck {
    /// Returns true if the session may edit `resource`.
    fn may_edit(&self, resource: &Resource) -> bool;
}

/// Ownership by numeric session user id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOwner {
    /// Logged-in user, if any.
    pub user_id: Option<u64>,
}

impl OwnershipCheck for SessionOwner {
    fn may_edit(&self, resource: &Resource) -> bool {
        match (self.user_id, resource.owner_user_id()) {
            (Some(session), Some(owner)) => session == owner,
            _ => false,
        }
    }
}

/// Loads resources stored as `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    /// Creates a loader over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory being served.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(path: &Path) -> Result<Resource, SpecError> {
        let json = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl ResourceLoader for DirectoryLoader {
    fn load(&self, id: &str) -> Result<Resource, SpecError> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(SpecError::UnknownResource(id.to_string()));
        }
        let path = self.root.join(format!("{id}.json"));
        if !path.is_file() {
            return Err(SpecError::UnknownResource(id.to_string()));
        }
        Self::read(&path)
    }

    fn list(&self) -> Result<Vec<ResourceSummary>, SpecError> {
        let mut out = Vec::new();
        for entry in WalkDir::new(&self.root)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|x| x == "json"))
        {
            match Self::read(entry.path()) {
                Ok(resource) => out.push(resource.summary()),
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "skipping unreadable resource");
                }
            }
        }
        Ok(out)
    }
}

/// Parses the user id out of an owner URL containing `/api/users/<digits>`.
#[must_use]
pub fn owner_user_id(url: &str) -> Option<u64> {
    const MARKER: &str = "/api/users/";
    let start = url.find(MARKER)? + MARKER.len();
    let digits: String = url[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn id_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "resource id must be a string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(json: &str) -> Resource {
        serde_json::from_str(json).unwrap_or_default()
    }

    #[test]
    fn owner_id_from_api_url() {
        assert_eq!(
            owner_user_id("http://localhost:8000/api/users/42/?format=json"),
            Some(42)
        );
        assert_eq!(owner_user_id("http://localhost:8000/api/2"), None);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let r = resource(r#"{"id": 3, "name": "New Resource", "version": "2018-04-17"}"#);
        assert_eq!(r.id, "3");
        assert_eq!(r.summary().title(), "New Resource (2018-04-17)");
    }

    #[test]
    fn session_owner_matches_user() {
        let r = resource(r#"{"id": 5, "owner": "http://h/api/users/7/?format=json"}"#);
        assert!(SessionOwner { user_id: Some(7) }.may_edit(&r));
        assert!(!SessionOwner { user_id: Some(8) }.may_edit(&r));
        assert!(!SessionOwner { user_id: None }.may_edit(&r));
    }

    #[test]
    fn template_follows_owner_rule() {
        let unowned = resource(r#"{"id": 1, "owner": null}"#);
        assert!(!SessionOwner::default().may_edit(&unowned));
        assert!(!SessionOwner { user_id: Some(7) }.may_edit(&unowned));

        let owned = resource(r#"{"id": 1, "owner": "http://h/api/users/7/"}"#);
        assert!(SessionOwner { user_id: Some(7) }.may_edit(&owned));
    }

    #[test]
    fn filter_drops_template_from_public_listing() {
        let template = resource(r#"{"id": 1, "public": true}"#).summary();
        let other = resource(r#"{"id": 2, "public": true, "curation": "draft"}"#).summary();
        let filter = ResourceFilter {
            public: Some(true),
            draft_only: true,
            ..ResourceFilter::default()
        };
        assert!(!filter.accepts(&template));
        assert!(filter.accepts(&other));
    }

    #[test]
    fn directory_loader_round_trip() -> Result<(), SpecError> {
        let dir = std::env::temp_dir().join(format!("geem-spec-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).map_err(|source| SpecError::Io {
            path: dir.clone(),
            source,
        })?;
        let body = r#"{"id": 9, "name": "pkg", "version": "1",
            "contents": {"specifications": {"A": {"id": "A", "datatype": "model"}}}}"#;
        std::fs::write(dir.join("9.json"), body).map_err(|source| SpecError::Io {
            path: dir.clone(),
            source,
        })?;
        std::fs::write(dir.join("broken.json"), "{").map_err(|source| SpecError::Io {
            path: dir.clone(),
            source,
        })?;

        let loader = DirectoryLoader::new(&dir);
        let loaded = loader.load("9")?;
        assert_eq!(loaded.document()?.specifications.len(), 1);
        assert!(matches!(
            loader.load("missing"),
            Err(SpecError::UnknownResource(_))
        ));
        assert!(matches!(
            loader.load("../9"),
            Err(SpecError::UnknownResource(_))
        ));
        let listed = loader.list()?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "9");

        let _ = std::fs::remove_dir_all(&dir);
        Ok(())
    }
}

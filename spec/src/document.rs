//! Specification documents and entity focus.
//!
//! A document mirrors the `contents` of a GEEM resource: a `@context` prefix
//! map, the `specifications` keyed by root entity id, and free-form
//! `metadata`. A whole resource record (with `contents` at top level) is
//! accepted too.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SpecError;
use crate::model::{Entity, OrderedMap};

/// A loaded specification document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificationDocument {
    /// Prefix map from the JSON-LD `@context`.
    #[serde(rename = "@context", default)]
    pub context: BTreeMap<String, Value>,
    /// Specification roots keyed by entity id, in document order.
    #[serde(default)]
    pub specifications: OrderedMap<Entity>,
    /// Free-form package metadata.
    #[serde(default)]
    pub metadata: Value,
}

/// The entity a focus id resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Focus<'a> {
    /// No specification root has the requested id.
    Missing {
        /// The root id that was requested.
        id: String,
    },
    /// A root was found; `entity` is the deepest entity the path reached.
    Found {
        /// The focused entity.
        entity: &'a Entity,
        /// The first path segment that did not resolve, if any.
        unresolved: Option<String>,
    },
}

impl SpecificationDocument {
    /// Parses a document from JSON text and annotates every root.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::NotATree`] if the JSON is not an object,
    /// [`SpecError::MissingSpecifications`] if it has no `specifications`
    /// map, or [`SpecError::Json`] if an entity is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, SpecError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Builds a document from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`SpecificationDocument::from_json_str`].
    pub fn from_value(value: Value) -> Result<Self, SpecError> {
        let Value::Object(mut object) = value else {
            return Err(SpecError::NotATree);
        };
        if let Some(Value::Object(contents)) = object.remove("contents") {
            return Self::from_value(Value::Object(contents));
        }
        match object.get("specifications") {
            Some(Value::Object(_)) => {}
            _ => return Err(SpecError::MissingSpecifications),
        }
        let mut document: SpecificationDocument = serde_json::from_value(Value::Object(object))?;
        document.annotate();
        Ok(document)
    }

    /// Reads and parses a document file.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Io`] if the file cannot be read, otherwise see
    /// [`SpecificationDocument::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self, SpecError> {
        let json = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Sets depth and path on every specification root.
    pub fn annotate(&mut self) {
        for root in self.specifications.values_mut() {
            root.annotate();
        }
    }

    /// Looks up a specification root.
    #[must_use]
    pub fn root(&self, id: &str) -> Option<&Entity> {
        self.specifications.get(id)
    }

    /// Resolves a focus id of the form `root/child/grandchild`.
    ///
    /// Resolution stops at the first segment that is not a child of the
    /// entity reached so far; that segment is reported as unresolved.
    #[must_use]
    pub fn focus(&self, id: &str) -> Focus<'_> {
        let mut segments = id.split('/').filter(|s| !s.is_empty());
        let root_id = segments.next().unwrap_or_default();
        let Some(mut entity) = self.root(root_id) else {
            return Focus::Missing {
                id: root_id.to_string(),
            };
        };
        for segment in segments {
            match entity.child(segment) {
                Some(child) => entity = child,
                None => {
                    tracing::warn!(focus = id, segment, "focus path segment not found");
                    return Focus::Found {
                        entity,
                        unresolved: Some(segment.to_string()),
                    };
                }
            }
        }
        Focus::Found {
            entity,
            unresolved: None,
        }
    }
}

//! GEEM specification model.
//!
//! The `geem-spec` crate holds the ontology-derived specification trees that
//! the form compiler consumes: the [`Entity`] node shape, datatype tags and
//! their [`Kind`]s, whole [`SpecificationDocument`]s with focus paths, and
//! the resource interfaces used to load them.
//!
//! # Entry Point
//!
//! ```
//! let doc = geem_spec::SpecificationDocument::from_json_str(
//!     r#"{"specifications": {"A": {"id": "A", "datatype": "model"}}}"#,
//! )?;
//! assert!(doc.root("A").is_some());
//! # Ok::<(), geem_spec::SpecError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod datatype;
pub mod document;
pub mod error;
pub mod model;
pub mod resource;

pub use datatype::{Bound, DateTimeKind, Kind, NumberKind, TextKind};
pub use document::{Focus, SpecificationDocument};
pub use error::SpecError;
pub use model::{Entity, Feature, OrderedMap, NO_LABEL};
pub use resource::{
    DirectoryLoader, OwnershipCheck, Resource, ResourceFilter, ResourceLoader, ResourceSummary,
    SessionOwner,
};

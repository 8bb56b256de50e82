//! GEEM form compiler.
//!
//! Compiles an ontology-derived specification tree (see `geem-spec`) into a
//! [`RenderTree`] of widget descriptors, and drives the tree afterwards:
//! repeated instances through [`RepeatController`], hover disclosure of
//! optional fields through [`DisclosureController`], and submission
//! extraction through [`extract()`].
//!
//! # Entry Point
//!
//! ```
//! use geem_form::{FormSession, FormSettings};
//! use geem_spec::SpecificationDocument;
//!
//! let doc = SpecificationDocument::from_json_str(r#"{"specifications": {
//!     "S": {"id": "S", "datatype": "model", "uiLabel": "Sample", "components": {
//!         "D": {"id": "D", "datatype": "xmls:date", "uiLabel": "Date"}}}}}"#)?;
//! let mut session = FormSession::new(&doc, FormSettings::default());
//! let tree = session.select("S");
//! assert_eq!(tree.fragments().len(), 1);
//! # Ok::<(), geem_spec::SpecError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod cardinality;
pub mod choices;
pub mod compiler;
pub mod context;
pub mod controllers;
pub mod disjunction;
pub mod extract;
pub mod render;
pub mod session;
pub mod settings;
pub mod template;
pub mod units;

pub use cardinality::Cardinality;
pub use choices::{ChoiceFlattener, ChoiceOption, Flattened};
pub use compiler::FieldCompiler;
pub use context::RenderContext;
pub use controllers::disclosure::DisclosureController;
pub use controllers::repeat::{RepeatController, RepeatState};
pub use controllers::ControlError;
pub use disjunction::DisjunctionCompiler;
pub use extract::extract;
pub use render::{Fragment, Instance, Label, RenderState, RenderTree, Tab, Widget};
pub use session::{compile_focus, FormSession};
pub use settings::{FormSettings, SettingsError};
pub use template::fill_template;
pub use units::{UnitOption, UnitSelector};

//! Event-driven mutators of a compiled render tree.

pub mod disclosure;
pub mod repeat;

use thiserror::Error;

/// A controller event referred to something that is not in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// No form has been rendered yet.
    #[error("no form is rendered")]
    NoForm,
    /// No fragment has this presentation id.
    #[error("unknown fragment: {0}")]
    UnknownFragment(String),
    /// The fragment has no add/remove control.
    #[error("fragment {0} is not repeatable")]
    NotRepeatable(String),
    /// The wrapper has no removable instance with this id.
    #[error("fragment {wrapper} has no removable instance {instance}")]
    UnknownInstance {
        /// Wrapper presentation id.
        wrapper: String,
        /// Requested instance id.
        instance: String,
    },
    /// The fragment's entity path no longer resolves in the document.
    #[error("entity path {0} not found in the specification")]
    UnknownEntity(String),
}

//! Adding and removing repeated instances of array-like fields.

use geem_spec::{Entity, SpecificationDocument};
use serde::Serialize;

use super::ControlError;
use crate::compiler::{record_header, FieldCompiler};
use crate::render::{RenderTree, Widget};

/// Instance count and add-control state of one repeatable wrapper.
///
/// `count` includes the initially rendered instance, which cannot be
/// removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatState {
    /// Rendered instances.
    pub count: u32,
    /// Declared lower bound.
    pub min: Option<u32>,
    /// Declared upper bound; absent means unbounded.
    pub max: Option<u32>,
    /// Whether the add control is enabled.
    pub add_enabled: bool,
}

impl RepeatState {
    /// State of a freshly rendered wrapper holding one instance.
    #[must_use]
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self {
            count: 1,
            min,
            max,
            add_enabled: max.map_or(true, |max| max > 1),
        }
    }

    /// Records one more instance. Returns false, changing nothing, when
    /// adding is disabled.
    pub fn add(&mut self) -> bool {
        if !self.add_enabled {
            return false;
        }
        self.count = self.count.saturating_add(1);
        if self.max == Some(self.count) {
            self.add_enabled = false;
        }
        true
    }

    /// Records the removal of one added instance. Returns false when only
    /// the initial instance is left.
    pub fn remove(&mut self) -> bool {
        if self.count <= 1 {
            return false;
        }
        self.count -= 1;
        if self.max.map_or(true, |max| self.count <= max) {
            self.add_enabled = true;
        }
        true
    }
}

/// Applies add/remove events to a render tree.
#[derive(Debug, Clone, Copy)]
pub struct RepeatController<'a> {
    document: &'a SpecificationDocument,
    compiler: FieldCompiler<'a>,
}

impl<'a> RepeatController<'a> {
    /// Creates a controller resolving template entities in `document`.
    #[must_use]
    pub fn new(document: &'a SpecificationDocument, compiler: FieldCompiler<'a>) -> Self {
        Self { document, compiler }
    }

    /// Appends one instance to the wrapper `wrapper_id` and returns its id.
    ///
    /// Returns `Ok(None)` when the add control is disabled or the field is
    /// categorical.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::UnknownFragment`] if there is no such
    /// fragment, [`ControlError::NotRepeatable`] if it has no add control, or
    /// [`ControlError::UnknownEntity`] if its entity is no longer in the
    /// document.
    pub fn add(&self, tree: &mut RenderTree, wrapper_id: &str) -> Result<Option<String>, ControlError> {
        let wrapper = tree
            .find(wrapper_id)
            .ok_or_else(|| ControlError::UnknownFragment(wrapper_id.to_string()))?;
        if matches!(wrapper.widget, Widget::Select { .. }) {
            return Ok(None);
        }
        let state = wrapper
            .repeat
            .ok_or_else(|| ControlError::NotRepeatable(wrapper_id.to_string()))?;
        if !state.add_enabled {
            tracing::debug!(wrapper = wrapper_id, count = state.count, "add disabled");
            return Ok(None);
        }
        let entity = self.resolve(&wrapper.entity_path)?;

        let instance = self
            .compiler
            .compile_record(&mut tree.context, entity, state.count + 1, true);
        let instance_id = instance.id.clone();
        let wrapper = tree
            .find_mut(wrapper_id)
            .ok_or_else(|| ControlError::UnknownFragment(wrapper_id.to_string()))?;
        if let Some(repeat) = wrapper.repeat.as_mut() {
            repeat.add();
        }
        wrapper.instances.push(instance);
        tracing::debug!(wrapper = wrapper_id, instance = %instance_id, "added instance");
        Ok(Some(instance_id))
    }

    /// Removes instance `instance_id` from the wrapper `wrapper_id` and
    /// renumbers the remaining record headers.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::UnknownFragment`] or
    /// [`ControlError::NotRepeatable`] as for [`RepeatController::add`], and
    /// [`ControlError::UnknownInstance`] if the wrapper has no removable
    /// instance with that id.
    pub fn remove(&self, tree: &mut RenderTree, wrapper_id: &str, instance_id: &str) -> Result<(), ControlError> {
        let wrapper = tree
            .find_mut(wrapper_id)
            .ok_or_else(|| ControlError::UnknownFragment(wrapper_id.to_string()))?;
        let Some(repeat) = wrapper.repeat.as_mut() else {
            return Err(ControlError::NotRepeatable(wrapper_id.to_string()));
        };
        let position = wrapper
            .instances
            .iter()
            .position(|i| i.id == instance_id && i.removable)
            .ok_or_else(|| ControlError::UnknownInstance {
                wrapper: wrapper_id.to_string(),
                instance: instance_id.to_string(),
            })?;
        wrapper.instances.remove(position);
        repeat.remove();
        for (n, instance) in (2..).zip(wrapper.instances.iter_mut()) {
            instance.header = record_header(n);
        }
        tracing::debug!(wrapper = wrapper_id, instance = instance_id, "removed instance");
        Ok(())
    }

    fn resolve(&self, path: &[String]) -> Result<&'a Entity, ControlError> {
        let unknown = || ControlError::UnknownEntity(path.join("/"));
        let (root, rest) = path.split_first().ok_or_else(unknown)?;
        self.document
            .root(root)
            .and_then(|r| r.descendant(rest))
            .ok_or_else(unknown)
    }
}

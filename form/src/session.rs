//! A form bound to one specification document.
//!
//! Selecting an entity replaces the render tree wholesale and bumps the
//! render generation, so pending hover opens from the old tree never fire.

use std::time::Instant;

use geem_spec::{Focus, SpecificationDocument};
use serde_json::Value;

use crate::compiler::FieldCompiler;
use crate::context::RenderContext;
use crate::controllers::disclosure::DisclosureController;
use crate::controllers::repeat::RepeatController;
use crate::controllers::ControlError;
use crate::extract::extract;
use crate::render::{RenderState, RenderTree};
use crate::settings::FormSettings;

/// Compiles the entity at `focus` into a fresh render tree.
///
/// A focus whose root is missing, or that yields no fields, produces
/// [`RenderState::NoFieldSpecification`]. A focus path with an unknown
/// segment renders the deepest entity reached, preceded by a diagnostic.
#[must_use]
pub fn compile_focus(
    document: &SpecificationDocument,
    focus: &str,
    settings: &FormSettings,
    generation: u64,
) -> RenderTree {
    let mut context = RenderContext::new();
    let compiler = FieldCompiler::new(settings);
    let fragments = match document.focus(focus) {
        Focus::Missing { id } => {
            tracing::warn!(focus = %id, "no specification root with this id");
            Vec::new()
        }
        Focus::Found { entity, unresolved } => {
            let mut fragments = Vec::new();
            if let Some(segment) = unresolved {
                fragments.push(compiler.diagnostic(
                    &mut context,
                    entity,
                    format!("path segment {segment} not found under {}", entity.id),
                ));
            }
            fragments.extend(compiler.compile(&mut context, entity));
            fragments
        }
    };
    tracing::debug!(focus, generation, fragments = fragments.len(), "render pass complete");

    RenderTree {
        focus: focus.to_string(),
        generation,
        state: if fragments.is_empty() {
            RenderState::NoFieldSpecification
        } else {
            RenderState::Fields(fragments)
        },
        context,
    }
}

/// The interactive state of one form.
#[derive(Debug)]
pub struct FormSession<'a> {
    document: &'a SpecificationDocument,
    settings: FormSettings,
    generation: u64,
    tree: Option<RenderTree>,
    disclosure: DisclosureController,
}

impl<'a> FormSession<'a> {
    /// Creates a session with nothing rendered yet.
    #[must_use]
    pub fn new(document: &'a SpecificationDocument, settings: FormSettings) -> Self {
        let disclosure = DisclosureController::new(settings.disclosure_delay());
        Self {
            document,
            settings,
            generation: 0,
            tree: None,
            disclosure,
        }
    }

    /// The settings in effect.
    #[must_use]
    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// The current render tree, if an entity has been selected.
    #[must_use]
    pub fn tree(&self) -> Option<&RenderTree> {
        self.tree.as_ref()
    }

    /// Tears down the current tree and renders `focus`.
    pub fn select(&mut self, focus: &str) -> &RenderTree {
        self.tree = None;
        self.generation += 1;
        self.disclosure.reset(self.generation);
        let tree = compile_focus(self.document, focus, &self.settings, self.generation);
        self.tree.insert(tree)
    }

    /// Sets an input's value. Returns false if `id` is not an input.
    pub fn set_value(&mut self, id: &str, value: Value) -> bool {
        self.tree.as_mut().is_some_and(|t| t.set_value(id, value))
    }

    /// Shows tab `tab_id`. Returns false if there is no such tab.
    pub fn activate_tab(&mut self, tab_id: &str) -> bool {
        self.tree.as_mut().is_some_and(|t| t.activate_tab(tab_id))
    }

    /// Adds an instance to a repeatable field.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NoForm`] before the first selection, otherwise
    /// see [`RepeatController::add`].
    pub fn add_instance(&mut self, wrapper_id: &str) -> Result<Option<String>, ControlError> {
        let controller = RepeatController::new(self.document, FieldCompiler::new(&self.settings));
        let tree = self.tree.as_mut().ok_or(ControlError::NoForm)?;
        controller.add(tree, wrapper_id)
    }

    /// Removes an added instance from a repeatable field.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NoForm`] before the first selection, otherwise
    /// see [`RepeatController::remove`].
    pub fn remove_instance(&mut self, wrapper_id: &str, instance_id: &str) -> Result<(), ControlError> {
        let controller = RepeatController::new(self.document, FieldCompiler::new(&self.settings));
        let tree = self.tree.as_mut().ok_or(ControlError::NoForm)?;
        controller.remove(tree, wrapper_id, instance_id)
    }

    /// Pointer entered a field; see [`DisclosureController::pointer_enter`].
    pub fn pointer_enter(&mut self, id: &str, now: Instant) -> bool {
        match &self.tree {
            Some(tree) if self.settings.minimal_form => self.disclosure.pointer_enter(tree, id, now),
            _ => false,
        }
    }

    /// Pointer left a field; see [`DisclosureController::pointer_leave`].
    pub fn pointer_leave(&mut self, id: &str) {
        if let Some(tree) = self.tree.as_mut() {
            self.disclosure.pointer_leave(tree, id);
        }
    }

    /// Fires due hover opens; see [`DisclosureController::advance`].
    pub fn advance(&mut self, now: Instant) -> Vec<String> {
        match self.tree.as_mut() {
            Some(tree) => self.disclosure.advance(tree, now),
            None => Vec::new(),
        }
    }

    /// Number of scheduled hover opens.
    #[must_use]
    pub fn pending_opens(&self) -> usize {
        self.disclosure.pending()
    }

    /// Extracts the current submission; `Value::Null` before the first
    /// selection.
    #[must_use]
    pub fn submission(&self) -> Value {
        self.tree.as_ref().map_or(Value::Null, extract)
    }
}

//! The render tree: compiled widget descriptors for one form.
//!
//! A tree is produced by one render pass and replaced wholesale when another
//! entity is selected. The controllers mutate it in place; every mutation
//! goes through a presentation id.

use geem_spec::Bound;
use serde::Serialize;
use serde_json::Value;

use crate::cardinality::Cardinality;
use crate::choices::ChoiceOption;
use crate::context::RenderContext;
use crate::controllers::repeat::RepeatState;
use crate::units::UnitSelector;

/// Message shown when the focused entity yields no fields.
pub const NO_FIELD_SPECIFICATION: &str = "This item has no field specification.";

/// Message shown for entities without a datatype.
pub const NEEDS_VALUE_SPECIFICATION: &str =
    "This specification component needs a \"value specification\" so that it can be rendered.";

/// A compiled form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    /// Focus id the tree was compiled for.
    pub focus: String,
    /// Render generation; bumped on every entity selection.
    pub generation: u64,
    /// Whether there is anything to show.
    pub state: RenderState,
    /// Id counter, continued by controllers that compile more instances.
    #[serde(skip)]
    pub context: RenderContext,
}

/// Top-level outcome of a render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "fragments", rename_all = "camelCase")]
pub enum RenderState {
    /// The focus did not resolve, or produced no fields.
    NoFieldSpecification,
    /// Compiled fields in document order.
    Fields(Vec<Fragment>),
}

/// Field label and its tooltips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Label {
    /// Display text.
    pub text: String,
    /// Definition tooltip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Help tooltip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Render the label as a link to the entity's own anchor.
    pub anchor: bool,
    /// Cardinality annotation, shown in ontology-details mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<String>,
}

/// One rendered instance of a specification entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Presentation id, unique within the render pass.
    pub id: String,
    /// Ontology id of the source entity.
    pub entity_id: String,
    /// Ancestor ids followed by the entity's own id.
    pub entity_path: Vec<String>,
    /// Dotted path used for submission extraction.
    pub field_path: String,
    /// Nesting level of the source entity.
    pub depth: usize,
    /// Label; absent for repeated instances and disjunction tab sets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    /// Cardinality classification.
    pub cardinality: Cardinality,
    /// Whether the fragment is wrapped in a field container.
    pub wrapped: bool,
    /// The input area starts hidden and opens on hover.
    pub collapsible: bool,
    /// The input area is currently hidden.
    pub collapsed: bool,
    /// Current value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Repeat state of an array-like wrapper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatState>,
    /// Instances added after the first, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<Instance>,
    /// The widget.
    pub widget: Widget,
}

/// An extra instance of a repeated field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    /// Presentation id of the instance block.
    pub id: String,
    /// Header text, `Record n`.
    pub header: String,
    /// Whether the instance has a remove control.
    pub removable: bool,
    /// The instance's fields, compiled without label or wrapper.
    pub fragments: Vec<Fragment>,
}

/// One branch of a disjunction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Panel presentation id, `panel_...`.
    pub id: String,
    /// Ontology id of the branch.
    pub entity_id: String,
    /// Tab title.
    pub label: Label,
    /// Whether this branch is the visible one.
    pub active: bool,
    /// The branch's compiled fields.
    pub fragments: Vec<Fragment>,
}

/// Widget-specific attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "camelCase")]
pub enum Widget {
    /// Stand-in for an entity that cannot be rendered yet.
    Placeholder {
        /// Explanation shown in the field.
        message: String,
    },
    /// A data-authoring problem shown in place of the field.
    Diagnostic {
        /// Problem description.
        message: String,
    },
    /// A labelled container of component fields.
    Group {
        /// Component fields.
        children: Vec<Fragment>,
    },
    /// Mutually exclusive branches.
    Tabs {
        /// Branches in document order.
        tabs: Vec<Tab>,
    },
    /// Free text input.
    #[serde(rename_all = "camelCase")]
    Text {
        /// Minimum length.
        #[serde(skip_serializing_if = "Option::is_none")]
        min_length: Option<u64>,
        /// Maximum length.
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<u64>,
        /// Anchored regular expression or preset validator name.
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        /// Display width for short inputs.
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
        /// Placeholder text.
        placeholder: String,
        /// Unit control.
        #[serde(skip_serializing_if = "UnitSelector::is_none")]
        units: UnitSelector,
    },
    /// Numeric input.
    Number {
        /// Numeric family: `integer`, `decimal`, `float` or `double`.
        family: String,
        /// Effective inclusive lower bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<Bound>,
        /// Effective inclusive upper bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<Bound>,
        /// Step granularity.
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<String>,
        /// Anchored regular expression or preset validator name.
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        /// Placeholder text.
        placeholder: String,
        /// Unit control.
        #[serde(skip_serializing_if = "UnitSelector::is_none")]
        units: UnitSelector,
    },
    /// Date, time or duration input.
    DateTime {
        /// Picker format, e.g. `yyyy-mm-dd`.
        format: String,
        /// Placeholder text.
        placeholder: String,
        /// Unit control.
        #[serde(skip_serializing_if = "UnitSelector::is_none")]
        units: UnitSelector,
    },
    /// Two-state toggle.
    Boolean {
        /// Initial state.
        checked: bool,
    },
    /// Pick-list.
    #[serde(rename_all = "camelCase")]
    Select {
        /// Options in display order.
        options: Vec<ChoiceOption>,
        /// Several options may be selected.
        multiple: bool,
        /// A leading empty option allows no selection.
        allow_empty: bool,
        /// A single selection may be cleared.
        allow_deselect: bool,
        /// Offer the ontology lookup affordance.
        lookup: bool,
        /// Selection limit for multi-selects.
        #[serde(skip_serializing_if = "Option::is_none")]
        max_selections: Option<u32>,
    },
}

impl Widget {
    /// Returns true for widgets that hold a user-entered value.
    #[must_use]
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Widget::Text { .. }
                | Widget::Number { .. }
                | Widget::DateTime { .. }
                | Widget::Boolean { .. }
                | Widget::Select { .. }
        )
    }
}

impl Fragment {
    /// Returns true if the fragment's own value is non-empty.
    #[must_use]
    pub fn has_content(&self) -> bool {
        match &self.value {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    /// Child fragments: group children, every tab panel, then instances.
    pub fn children(&self) -> impl Iterator<Item = &Fragment> + '_ {
        let nested: Box<dyn Iterator<Item = &Fragment> + '_> = match &self.widget {
            Widget::Group { children } => Box::new(children.iter()),
            Widget::Tabs { tabs } => Box::new(tabs.iter().flat_map(|t| t.fragments.iter())),
            _ => Box::new(std::iter::empty()),
        };
        nested.chain(self.instances.iter().flat_map(|i| i.fragments.iter()))
    }

    fn find(&self, id: &str) -> Option<&Fragment> {
        if self.id == id {
            return Some(self);
        }
        self.children().find_map(|child| child.find(id))
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Fragment> {
        if self.id == id {
            return Some(self);
        }
        let Fragment {
            widget, instances, ..
        } = self;
        let nested: Vec<&mut Fragment> = match widget {
            Widget::Group { children } => children.iter_mut().collect(),
            Widget::Tabs { tabs } => tabs.iter_mut().flat_map(|t| t.fragments.iter_mut()).collect(),
            _ => Vec::new(),
        };
        nested
            .into_iter()
            .chain(instances.iter_mut().flat_map(|i| i.fragments.iter_mut()))
            .find_map(|child| child.find_mut(id))
    }

    fn activate_tab(&mut self, tab_id: &str) -> bool {
        if let Widget::Tabs { tabs } = &mut self.widget {
            if tabs.iter().any(|t| t.id == tab_id) {
                for tab in tabs.iter_mut() {
                    tab.active = tab.id == tab_id;
                }
                return true;
            }
        }
        match &mut self.widget {
            Widget::Group { children } => {
                if children.iter_mut().any(|c| c.activate_tab(tab_id)) {
                    return true;
                }
            }
            Widget::Tabs { tabs } => {
                if tabs
                    .iter_mut()
                    .flat_map(|t| t.fragments.iter_mut())
                    .any(|c| c.activate_tab(tab_id))
                {
                    return true;
                }
            }
            _ => {}
        }
        self.instances
            .iter_mut()
            .flat_map(|i| i.fragments.iter_mut())
            .any(|c| c.activate_tab(tab_id))
    }
}

impl RenderTree {
    /// Top-level fragments; empty when there is no field specification.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        match &self.state {
            RenderState::Fields(fragments) => fragments,
            RenderState::NoFieldSpecification => &[],
        }
    }

    fn fragments_mut(&mut self) -> &mut [Fragment] {
        match &mut self.state {
            RenderState::Fields(fragments) => fragments,
            RenderState::NoFieldSpecification => &mut [],
        }
    }

    /// Finds a fragment anywhere in the tree by presentation id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Fragment> {
        self.fragments().iter().find_map(|f| f.find(id))
    }

    /// Mutable variant of [`RenderTree::find`].
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Fragment> {
        self.fragments_mut().iter_mut().find_map(|f| f.find_mut(id))
    }

    /// Sets the value of an input fragment. Returns false if `id` is not an
    /// input in this tree.
    pub fn set_value(&mut self, id: &str, value: Value) -> bool {
        match self.find_mut(id) {
            Some(fragment) if fragment.widget.is_input() => {
                fragment.value = Some(value);
                true
            }
            _ => false,
        }
    }

    /// Makes `tab_id` the visible branch of its disjunction. Returns false
    /// if no tab has that id.
    pub fn activate_tab(&mut self, tab_id: &str) -> bool {
        self.fragments_mut()
            .iter_mut()
            .any(|f| f.activate_tab(tab_id))
    }

    /// Finds the repeat instance `instance_id` inside the fragment `wrapper_id`.
    #[must_use]
    pub fn instance(&self, wrapper_id: &str, instance_id: &str) -> Option<&Instance> {
        self.find(wrapper_id)?
            .instances
            .iter()
            .find(|i| i.id == instance_id)
    }
}

//! Specification-to-form compiler.
//!
//! [`FieldCompiler::compile`] dispatches on an entity's [`Kind`] and returns
//! the fragments for it. Every kind, including unknown datatype tags,
//! produces output; authoring problems become diagnostic fragments so that
//! sibling fields still render.

use geem_spec::{Bound, DateTimeKind, Entity, Feature, Kind, NumberKind, NO_LABEL};
use serde_json::{Number, Value};

use crate::cardinality::Cardinality;
use crate::choices::{cut_depth_for, ChoiceFlattener};
use crate::context::RenderContext;
use crate::controllers::repeat::RepeatState;
use crate::disjunction::DisjunctionCompiler;
use crate::render::{Fragment, Instance, Label, Widget, NEEDS_VALUE_SPECIFICATION};
use crate::settings::FormSettings;
use crate::units::UnitSelector;

/// Validator names understood by the presentation layer; patterns with these
/// names are passed through instead of being anchored.
pub const PRESET_PATTERNS: &[&str] = &[
    "alpha",
    "alpha_numeric",
    "title",
    "integer",
    "number",
    "decimal",
    "float",
    "email",
    "url",
    "domain",
    "datetime",
    "date",
    "time",
    "dateISO",
    "month_day_year",
];

/// Step used for non-integer inputs without a `minValue`.
const DEFAULT_STEP: &str = "0.0001";

/// Text inputs shorter than this get an explicit display size.
const SHORT_TEXT: u64 = 40;

/// Compiles entities into render fragments.
#[derive(Debug, Clone, Copy)]
pub struct FieldCompiler<'s> {
    settings: &'s FormSettings,
}

impl<'s> FieldCompiler<'s> {
    /// Creates a compiler using `settings`.
    #[must_use]
    pub fn new(settings: &'s FormSettings) -> Self {
        Self { settings }
    }

    /// The settings in effect.
    #[must_use]
    pub fn settings(&self) -> &'s FormSettings {
        self.settings
    }

    /// Compiles `entity` with its label and field wrapper.
    pub fn compile(&self, ctx: &mut RenderContext, entity: &Entity) -> Vec<Fragment> {
        self.compile_node(ctx, entity, false)
    }

    /// Compiles `entity` without label or wrapper, as the body of a
    /// repeated instance.
    pub fn compile_input_group(&self, ctx: &mut RenderContext, entity: &Entity) -> Vec<Fragment> {
        self.compile_node(ctx, entity, true)
    }

    /// Compiles one extra instance of `entity`, headed `Record {number}`.
    pub fn compile_record(
        &self,
        ctx: &mut RenderContext,
        entity: &Entity,
        number: u32,
        removable: bool,
    ) -> Instance {
        let id = ctx.next_id(&format!("{}_record", entity.id));
        Instance {
            id,
            header: record_header(number),
            removable,
            fragments: self.compile_input_group(ctx, entity),
        }
    }

    fn compile_node(&self, ctx: &mut RenderContext, entity: &Entity, input_group: bool) -> Vec<Fragment> {
        if entity.bounds_inverted() {
            tracing::warn!(
                entity = %entity.id,
                min = ?entity.min_cardinality,
                max = ?entity.max_cardinality,
                "minCardinality exceeds maxCardinality"
            );
        }
        tracing::debug!(entity = %entity.id, datatype = ?entity.datatype, input_group, "compiling");

        match entity.kind() {
            Kind::Disjunction => vec![DisjunctionCompiler::new(*self).compile(ctx, entity)],
            Kind::Grouping => self.compile_grouping(ctx, entity, input_group),
            Kind::Unspecified => vec![self.fragment(ctx, entity, input_group, |_| Widget::Placeholder {
                message: NEEDS_VALUE_SPECIFICATION.to_string(),
            })],
            Kind::Unrecognized(tag) => {
                tracing::warn!(entity = %entity.id, %tag, "unrecognized datatype");
                vec![self.diagnostic(ctx, entity, format!("UNRECOGNIZED: {} [{tag}]", entity.id))]
            }
            Kind::Text(_) => vec![self.fragment(ctx, entity, input_group, |id| Widget::Text {
                min_length: entity.min_length,
                max_length: entity.max_length,
                pattern: entity.pattern.as_deref().map(pattern_attr),
                size: entity.max_length.filter(|n| *n < SHORT_TEXT).map(|n| n + 2),
                placeholder: placeholder(entity),
                units: UnitSelector::build(entity, id),
            })],
            Kind::Number(kind) => vec![self.fragment(ctx, entity, input_group, |id| {
                number_widget(entity, kind, id)
            })],
            Kind::DateTime(kind) => vec![self.fragment(ctx, entity, input_group, |id| Widget::DateTime {
                format: date_format(entity, kind),
                placeholder: placeholder(entity),
                units: UnitSelector::build(entity, id),
            })],
            Kind::Boolean => vec![self.fragment(ctx, entity, input_group, |_| Widget::Boolean {
                checked: matches!(entity.value, Some(Value::Bool(true))),
            })],
            Kind::Categorical => vec![self.fragment(ctx, entity, input_group, |_| self.select_widget(entity))],
        }
    }

    fn compile_grouping(&self, ctx: &mut RenderContext, entity: &Entity, input_group: bool) -> Vec<Fragment> {
        let children: Vec<Fragment> = entity
            .components
            .values()
            .flat_map(|child| self.compile(ctx, child))
            .collect();
        if children.is_empty() || input_group || entity.display_label() == Some(NO_LABEL) {
            return children;
        }
        vec![self.fragment(ctx, entity, false, |_| Widget::Group { children })]
    }

    fn select_widget(&self, entity: &Entity) -> Widget {
        let cut_depth = cut_depth_for(entity, self.settings.default_cut_depth);
        let options = ChoiceFlattener::new(&self.settings.synonym_fields)
            .flatten(entity, 0, cut_depth)
            .into_options();
        let multiple = entity.max_cardinality != Some(1)
            || entity.min_cardinality.is_some_and(|min| min > 1);
        Widget::Select {
            options,
            multiple,
            allow_empty: !multiple,
            allow_deselect: entity.min_cardinality.map_or(true, |min| min == 0),
            lookup: entity.feature("lookup").is_some(),
            max_selections: if multiple { entity.max_cardinality } else { None },
        }
    }

    /// Builds a fragment for `entity`; `widget` receives the new presentation id.
    pub(crate) fn fragment(
        &self,
        ctx: &mut RenderContext,
        entity: &Entity,
        input_group: bool,
        widget: impl FnOnce(&str) -> Widget,
    ) -> Fragment {
        let id = ctx.next_id(&entity.id);
        let widget = widget(&id);
        let categorical = matches!(widget, Widget::Select { .. });
        let cardinality = Cardinality::from_bounds(
            entity.min_cardinality,
            entity.max_cardinality,
            categorical,
        );
        let wrapped = !input_group;
        let repeat = (wrapped && cardinality.repeatable)
            .then(|| RepeatState::new(entity.min_cardinality, entity.max_cardinality));
        let label = wrapped.then(|| self.label(entity, &cardinality));
        let collapsible = self.settings.minimal_form
            && wrapped
            && cardinality.optional()
            && !ctx.in_tab()
            && widget.is_input();

        let mut fragment = Fragment {
            id,
            entity_id: entity.id.clone(),
            entity_path: entity.entity_path(),
            field_path: entity.field_path(),
            depth: entity.depth,
            label,
            cardinality,
            wrapped,
            collapsible,
            collapsed: false,
            value: entity.value.clone(),
            repeat,
            instances: Vec::new(),
            widget,
        };
        fragment.collapsed = collapsible && !fragment.has_content();

        // only inputs and groups compile to a finite record body
        let fillable = !categorical
            && (fragment.widget.is_input() || matches!(fragment.widget, Widget::Group { .. }));
        if let (true, true, Some(slots)) = (wrapped, fillable, fragment.cardinality.fixed_slots()) {
            for number in 2..=slots {
                let instance = self.compile_record(ctx, entity, number, false);
                fragment.instances.push(instance);
            }
        }
        fragment
    }

    /// A diagnostic fragment standing in for `entity`.
    pub(crate) fn diagnostic(&self, ctx: &mut RenderContext, entity: &Entity, message: String) -> Fragment {
        self.fragment(ctx, entity, false, |_| Widget::Diagnostic { message })
    }

    /// The label for `entity`; `cardinality` is shown in ontology-details mode.
    pub(crate) fn label(&self, entity: &Entity, cardinality: &Cardinality) -> Label {
        let details = self.settings.ontology_details;
        Label {
            text: entity.display_label().unwrap_or_default().to_string(),
            definition: entity.display_definition().map(|d| d.replace('"', "''")),
            help: entity.help.clone(),
            anchor: details && entity.depth > 0,
            cardinality: if details { cardinality.label.clone() } else { None },
        }
    }
}

/// `Record n` header of a repeated instance.
#[must_use]
pub fn record_header(number: u32) -> String {
    format!("Record {number}")
}

/// Anchors a pattern unless it names a preset validator.
#[must_use]
pub fn pattern_attr(pattern: &str) -> String {
    if PRESET_PATTERNS.contains(&pattern) {
        pattern.to_string()
    } else {
        format!("^{pattern}$")
    }
}

/// Datatype local name, e.g. `date` for `xmls:date`.
fn placeholder(entity: &Entity) -> String {
    let tag = entity.datatype.as_deref().unwrap_or_default();
    tag.split_once(':').map_or(tag, |(_, local)| local).to_string()
}

fn date_format(entity: &Entity, kind: DateTimeKind) -> String {
    entity
        .feature("format")
        .and_then(Feature::as_str)
        .unwrap_or(kind.default_format())
        .to_string()
}

fn number_widget(entity: &Entity, kind: NumberKind, id: &str) -> Widget {
    let (default_min, default_max) = kind.default_bounds();
    let node_min = entity.min_value.as_ref().and_then(Bound::from_number);
    let node_max = entity.max_value.as_ref().and_then(Bound::from_number);
    let min = narrow(default_min, node_min, |node, default| node > default);
    let max = narrow(default_max, node_max, |node, default| node < default);
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            tracing::warn!(entity = %entity.id, %lo, %hi, "numeric bounds are empty");
        }
    }

    let step = if kind.is_integer() {
        Some("1".to_string())
    } else {
        match &entity.min_value {
            Some(value) => fraction_step(value),
            None => Some(DEFAULT_STEP.to_string()),
        }
    };

    let family = kind.family().to_string();
    Widget::Number {
        pattern: Some(entity.pattern.as_deref().map_or_else(|| family.clone(), pattern_attr)),
        placeholder: family.clone(),
        family,
        min,
        max,
        step,
        units: UnitSelector::build(entity, id),
    }
}

/// Intersects a subtype bound with a node bound: the node bound only wins
/// when `tighter(node, default)` holds.
fn narrow(
    default: Option<Bound>,
    node: Option<Bound>,
    tighter: impl Fn(Bound, Bound) -> bool,
) -> Option<Bound> {
    match (default, node) {
        (Some(d), Some(n)) => Some(if tighter(n, d) { n } else { d }),
        (d, n) => n.or(d),
    }
}

/// `10^-k` where `k` is the number of fraction digits of `value`; `None`
/// when `value` is integral.
fn fraction_step(value: &Number) -> Option<String> {
    if value.is_i64() || value.is_u64() {
        return None;
    }
    let text = format!("{}", value.as_f64()?);
    let digits = text
        .split_once('.')
        .map_or(0, |(_, frac)| frac.trim_end_matches('0').len());
    match digits {
        0 => None,
        n => Some(format!("0.{}1", "0".repeat(n - 1))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(json: &str) -> Entity {
        let mut entity: Entity = serde_json::from_str(json).unwrap_or_default();
        entity.annotate();
        entity
    }

    fn compile_with(settings: &FormSettings, json: &str) -> Vec<Fragment> {
        FieldCompiler::new(settings).compile(&mut RenderContext::new(), &entity(json))
    }

    fn compile(json: &str) -> Vec<Fragment> {
        compile_with(&FormSettings::default(), json)
    }

    fn widget(json: &str) -> Widget {
        compile(json)
            .into_iter()
            .next()
            .map(|f| f.widget)
            .unwrap_or(Widget::Placeholder {
                message: String::new(),
            })
    }

    #[test]
    fn unspecified_gets_placeholder() {
        let w = widget(r#"{"id": "x"}"#);
        assert_eq!(
            w,
            Widget::Placeholder {
                message: NEEDS_VALUE_SPECIFICATION.to_string()
            }
        );
    }

    #[test]
    fn unrecognized_names_id_and_tag() {
        let w = widget(r#"{"id": "x", "datatype": "xmls:gYear"}"#);
        assert_eq!(
            w,
            Widget::Diagnostic {
                message: "UNRECOGNIZED: x [xmls:gYear]".to_string()
            }
        );
    }

    #[test]
    fn text_constraints() {
        let w = widget(
            r#"{"id": "x", "datatype": "xmls:string", "maxLength": 10, "pattern": "[A-Z]+"}"#,
        );
        let Widget::Text {
            size,
            pattern,
            placeholder,
            ..
        } = w
        else {
            unreachable!("string compiles to text");
        };
        assert_eq!(size, Some(12));
        assert_eq!(pattern.as_deref(), Some("^[A-Z]+$"));
        assert_eq!(placeholder, "string");
    }

    #[test]
    fn preset_pattern_not_anchored() {
        assert_eq!(pattern_attr("email"), "email");
        assert_eq!(pattern_attr("a+"), "^a+$");
    }

    #[test]
    fn node_bounds_narrow_but_never_widen() {
        let w = widget(
            r#"{"id": "x", "datatype": "xmls:unsignedByte", "minValue": -5, "maxValue": 100}"#,
        );
        let Widget::Number { min, max, step, .. } = w else {
            unreachable!("unsignedByte compiles to number");
        };
        assert_eq!(min, Some(Bound::Int(0)));
        assert_eq!(max, Some(Bound::Int(100)));
        assert_eq!(step.as_deref(), Some("1"));
    }

    #[test]
    fn decimal_step_from_min_value() {
        let step = |json: &str| match widget(json) {
            Widget::Number { step, .. } => step,
            _ => Some("not a number".to_string()),
        };
        assert_eq!(
            step(r#"{"id": "x", "datatype": "xmls:decimal", "minValue": 0.25}"#).as_deref(),
            Some("0.01")
        );
        assert_eq!(
            step(r#"{"id": "x", "datatype": "xmls:decimal", "minValue": 3}"#),
            None
        );
        assert_eq!(
            step(r#"{"id": "x", "datatype": "xmls:double"}"#).as_deref(),
            Some(DEFAULT_STEP)
        );
    }

    #[test]
    fn date_format_table_and_override() {
        let format = |json: &str| match widget(json) {
            Widget::DateTime { format, .. } => format,
            _ => String::from("not a date"),
        };
        assert_eq!(format(r#"{"id": "x", "datatype": "xmls:date"}"#), "yyyy-mm-dd");
        assert_eq!(format(r#"{"id": "x", "datatype": "xmls:duration"}"#), "");
        assert_eq!(
            format(r#"{"id": "x", "datatype": "xmls:date", "features": {"format": {"value": "mm/dd/yyyy"}}}"#),
            "mm/dd/yyyy"
        );
    }

    #[test]
    fn boolean_unchecked_by_default() {
        assert_eq!(
            widget(r#"{"id": "x", "datatype": "xmls:boolean"}"#),
            Widget::Boolean { checked: false }
        );
        assert_eq!(
            widget(r#"{"id": "x", "datatype": "xmls:boolean", "value": true}"#),
            Widget::Boolean { checked: true }
        );
    }

    #[test]
    fn categorical_multiplicity() {
        let select = |json: &str| match widget(json) {
            Widget::Select {
                multiple,
                allow_empty,
                allow_deselect,
                ..
            } => (multiple, allow_empty, allow_deselect),
            _ => (false, false, false),
        };
        assert_eq!(
            select(r#"{"id": "x", "datatype": "xmls:anyURI", "maxCardinality": 1}"#),
            (false, true, true)
        );
        assert_eq!(
            select(r#"{"id": "x", "datatype": "xmls:anyURI", "minCardinality": 1, "maxCardinality": 1}"#),
            (false, true, false)
        );
        assert_eq!(
            select(r#"{"id": "x", "datatype": "xmls:anyURI"}"#),
            (true, false, true)
        );
    }

    #[test]
    fn grouping_wraps_only_with_real_label() {
        let json = r#"{"id": "g", "datatype": "model", "uiLabel": "Group",
            "components": {"a": {"id": "a", "datatype": "xmls:string"},
                           "b": {"id": "b", "datatype": "xmls:boolean"}}}"#;
        let fragments = compile(json);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].children().count(), 2);

        let unlabelled = json.replace("Group", NO_LABEL);
        assert_eq!(compile(&unlabelled).len(), 2);

        let empty = r#"{"id": "g", "datatype": "model", "uiLabel": "Group"}"#;
        assert!(compile(empty).is_empty());
    }

    #[test]
    fn field_paths_follow_ancestors() {
        let fragments = compile(
            r#"{"id": "a", "datatype": "model", "uiLabel": "[no label]", "components": {
                "b": {"id": "b", "datatype": "xmls:string"},
                "c": {"id": "c", "datatype": "xmls:string", "name": "metadata.date"}}}"#,
        );
        let paths: Vec<&str> = fragments.iter().map(|f| f.field_path.as_str()).collect();
        assert_eq!(paths, ["a.b", "metadata.date"]);
    }

    #[test]
    fn fixed_slots_prefill_instances() {
        let fragments = compile(
            r#"{"id": "x", "datatype": "xmls:string", "minCardinality": 3, "maxCardinality": 3}"#,
        );
        let headers: Vec<&str> = fragments[0]
            .instances
            .iter()
            .map(|i| i.header.as_str())
            .collect();
        assert_eq!(headers, ["Record 2", "Record 3"]);
        assert!(fragments[0].repeat.is_none());
        assert!(fragments[0].instances.iter().all(|i| !i.removable));
    }

    #[test]
    fn fixed_slots_skip_diagnostics_and_tab_sets() {
        let unrecognized = compile(
            r#"{"id": "x", "datatype": "xmls:gYear", "minCardinality": 2, "maxCardinality": 2}"#,
        );
        assert!(matches!(unrecognized[0].widget, Widget::Diagnostic { .. }));
        assert!(unrecognized[0].instances.is_empty());

        let tabs = compile(
            r#"{"id": "d", "datatype": "disjunction", "minCardinality": 2, "maxCardinality": 2,
                "components": {"y": {"id": "y", "datatype": "xmls:string", "uiLabel": "Y"}}}"#,
        );
        assert!(matches!(tabs[0].widget, Widget::Tabs { .. }));
        assert!(tabs[0].instances.is_empty());

        let empty = compile(
            r#"{"id": "d", "datatype": "disjunction", "minCardinality": 5, "maxCardinality": 5}"#,
        );
        assert!(matches!(empty[0].widget, Widget::Diagnostic { .. }));
    }

    #[test]
    fn fixed_slot_groups_repeat_their_children() {
        let fragments = compile(
            r#"{"id": "g", "datatype": "model", "uiLabel": "G", "minCardinality": 2, "maxCardinality": 2,
                "components": {"a": {"id": "a", "datatype": "xmls:string", "uiLabel": "A"}}}"#,
        );
        assert_eq!(fragments[0].instances.len(), 1);
        assert_eq!(fragments[0].instances[0].fragments.len(), 1);
    }

    #[test]
    fn minimal_form_collapses_empty_optional_fields() {
        let settings = FormSettings {
            minimal_form: true,
            ..FormSettings::default()
        };
        let empty = compile_with(
            &settings,
            r#"{"id": "x", "datatype": "xmls:string", "maxCardinality": 1}"#,
        );
        assert!(empty[0].collapsible && empty[0].collapsed);
        let filled = compile_with(
            &settings,
            r#"{"id": "x", "datatype": "xmls:string", "maxCardinality": 1, "value": "v"}"#,
        );
        assert!(filled[0].collapsible && !filled[0].collapsed);
        let required = compile_with(
            &settings,
            r#"{"id": "x", "datatype": "xmls:string", "minCardinality": 1}"#,
        );
        assert!(!required[0].collapsible);
    }

    #[test]
    fn ontology_details_label() {
        let settings = FormSettings {
            ontology_details: true,
            ..FormSettings::default()
        };
        let fragments = compile_with(
            &settings,
            r#"{"id": "g", "datatype": "model", "uiLabel": "G", "components": {
                "a": {"id": "a", "datatype": "xmls:string", "uiLabel": "A", "maxCardinality": 1}}}"#,
        );
        let child = fragments[0].children().next().and_then(|c| c.label.clone());
        assert_eq!(child.as_ref().map(|l| l.anchor), Some(true));
        assert_eq!(
            child.and_then(|l| l.cardinality).as_deref(),
            Some("optional")
        );
        assert_eq!(fragments[0].label.as_ref().map(|l| l.anchor), Some(false));
    }
}

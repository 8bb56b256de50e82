//! Markup for compiled fragments.
//!
//! Class names follow the form script's conventions: field wrappers carry
//! `field-wrapper` plus `required` or `optional`, repeat blocks use
//! `inputBlock` and `inputBlockSeparator`, and disjunctions render as a
//! `tabs` list with matching `tabs-panel` blocks.

use std::fmt::Write as _;

use geem_form::{ChoiceOption, Fragment, Instance, Label, RenderState, RenderTree, Tab, UnitSelector, Widget};
use serde_json::Value;

use crate::renderer::{attr, escape_html, opt_attr};

/// Label of the button that shows the extracted submission.
pub const SUBMIT_BUTTON_LABEL: &str = "View Form Submission";

/// Presentation id of the submission button.
pub const SUBMIT_BUTTON_ID: &str = "buttonFormSubmit";

/// Renders the form body for `tree`.
///
/// A tree without fields renders the no-field-specification notice instead
/// of a form.
pub fn render_form(tree: &RenderTree) -> String {
    let fragments = match &tree.state {
        RenderState::NoFieldSpecification => {
            return format!(
                "<p class=\"small\"><i>{}</i></p>\n",
                escape_html(geem_form::render::NO_FIELD_SPECIFICATION)
            );
        }
        RenderState::Fields(fragments) => fragments,
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<form id=\"mainForm\"{}{}>",
        attr("data-focus", &tree.focus),
        attr("data-generation", &tree.generation.to_string())
    );
    for fragment in fragments {
        render_fragment(&mut out, fragment);
    }
    let _ = writeln!(
        out,
        "<input id=\"{SUBMIT_BUTTON_ID}\" class=\"button float-center\" type=\"button\" value=\"{SUBMIT_BUTTON_LABEL}\">"
    );
    out.push_str("</form>\n");
    out
}

fn render_fragment(out: &mut String, fragment: &Fragment) {
    if !fragment.wrapped {
        render_body(out, fragment);
        return;
    }

    let _ = write!(
        out,
        "<div class=\"{}\"{}{}{}",
        wrapper_classes(fragment),
        attr("id", &fragment.id),
        attr("data-ontology-id", &fragment.entity_id),
        attr("data-field-path", &fragment.field_path),
    );
    if fragment.cardinality.array_like {
        out.push_str(" data-array=\"true\"");
    }
    out.push_str(">\n");

    if let Some(repeat) = &fragment.repeat {
        let disabled = if repeat.add_enabled { "" } else { " disabled" };
        let _ = writeln!(out, "<button class=\"addInputElement\" type=\"button\"{disabled}>add record</button>");
    }
    if let Some(label) = &fragment.label {
        render_label(out, label, fragment);
    }
    render_body(out, fragment);
    for instance in &fragment.instances {
        render_instance(out, instance);
    }
    out.push_str("</div>\n");
}

fn wrapper_classes(fragment: &Fragment) -> String {
    let mut classes = match &fragment.widget {
        Widget::Group { .. } => format!("field-wrapper model children depth{}", fragment.depth),
        Widget::Tabs { .. } => "field-wrapper input-tabs".to_string(),
        _ => "field-wrapper field".to_string(),
    };
    if fragment.cardinality.required {
        classes.push_str(" required");
    } else if fragment.cardinality.optional() {
        classes.push_str(" optional");
    }
    if fragment.collapsible && !fragment.collapsed {
        classes.push_str(" open");
    }
    if fragment.collapsed {
        classes.push_str(" collapsed");
    }
    classes
}

fn render_label(out: &mut String, label: &Label, fragment: &Fragment) {
    if let Some(cardinality) = &label.cardinality {
        let _ = writeln!(out, "<span class=\"info label float-right\">{}</span>", escape_html(cardinality));
    }
    let text = if label.anchor {
        format!(
            "<a href=\"#{}\"><i class=\"fi-magnifying-glass\"></i> {}</a>",
            escape_html(&fragment.entity_id),
            escape_html(&label.text)
        )
    } else {
        escape_html(&label.text)
    };
    let text = match &label.definition {
        Some(definition) => format!(
            "<span data-tooltip class=\"has-tip top left\"{}>{text}</span>",
            attr("title", definition)
        ),
        None => text,
    };
    let _ = write!(out, "<label{}>{text}</label>", attr("for", &fragment.id));
    if let Some(help) = &label.help {
        let _ = write!(
            out,
            "<span data-tooltip class=\"has-tip float-right\"{}> <i class=\"fi-info blue\"></i></span>",
            attr("title", help)
        );
    }
    out.push('\n');
}

fn render_instance(out: &mut String, instance: &Instance) {
    out.push_str("<div class=\"inputBlockSeparator\">");
    if instance.removable {
        let _ = write!(
            out,
            "<i class=\"removeInputElement fi-x-circle\"{}></i>",
            attr("data-instance", &instance.id)
        );
    }
    let _ = writeln!(out, "<label>{}</label></div>", escape_html(&instance.header));
    let _ = writeln!(out, "<div class=\"inputBlock\"{}>", attr("id", &instance.id));
    for fragment in &instance.fragments {
        render_fragment(out, fragment);
    }
    out.push_str("</div>\n");
}

fn render_body(out: &mut String, fragment: &Fragment) {
    let id = &fragment.id;
    let value = fragment.value.as_ref().map(value_text);
    match &fragment.widget {
        Widget::Placeholder { message } => {
            let _ = writeln!(out, "<span class=\"small\"><i>{}</i></span>", escape_html(message));
        }
        Widget::Diagnostic { message } => {
            let _ = writeln!(out, "<div class=\"callout alert small\">{}</div>", escape_html(message));
        }
        Widget::Group { children } => {
            out.push_str("<div class=\"inputBlock\">\n");
            for child in children {
                render_fragment(out, child);
            }
            out.push_str("</div>\n");
        }
        Widget::Tabs { tabs } => render_tabs(out, id, tabs),
        Widget::Text {
            min_length,
            max_length,
            pattern,
            size,
            placeholder,
            units,
        } => {
            let _ = writeln!(
                out,
                "<div class=\"input-group\"><input class=\"input-group-field\" type=\"text\"{}{}{}{}{}{}{}{}>{}</div>",
                attr("id", id),
                attr("name", &fragment.field_path),
                attr("placeholder", placeholder),
                opt_attr("minlength", *min_length),
                opt_attr("maxlength", *max_length),
                opt_attr("pattern", pattern.as_deref()),
                opt_attr("size", *size),
                opt_attr("value", value.as_deref()),
                render_units(units),
            );
        }
        Widget::Number {
            family,
            min,
            max,
            step,
            pattern,
            placeholder,
            units,
        } => {
            let _ = writeln!(
                out,
                "<div class=\"input-group\"><input class=\"input-group-field\" type=\"number\"{}{}{}{}{}{}{}{}{}>{}</div>",
                attr("id", id),
                attr("name", &fragment.field_path),
                attr("data-number-type", family),
                attr("placeholder", placeholder),
                opt_attr("min", min.as_ref()),
                opt_attr("max", max.as_ref()),
                opt_attr("step", step.as_deref()),
                opt_attr("pattern", pattern.as_deref()),
                opt_attr("value", value.as_deref()),
                render_units(units),
            );
        }
        Widget::DateTime {
            format,
            placeholder,
            units,
        } => {
            let _ = writeln!(
                out,
                "<div class=\"input-group date\"><div class=\"input-group-label prefix\"><i class=\"fi fi-calendar\"></i></div>\
                 <input class=\"input-group-field prefix\" type=\"text\"{}{}{}{}{}>{}</div>",
                attr("id", id),
                attr("name", &fragment.field_path),
                attr("data-date-format", format),
                attr("placeholder", placeholder),
                opt_attr("value", value.as_deref()),
                render_units(units),
            );
        }
        Widget::Boolean { checked } => {
            let on = *checked || matches!(fragment.value, Some(Value::Bool(true)));
            let _ = writeln!(
                out,
                "<div class=\"switch small\"><input class=\"switch-input\" type=\"checkbox\"{}{}{}>\
                 <label class=\"switch-paddle\"{}></label></div>",
                attr("id", id),
                attr("name", &fragment.field_path),
                if on { " checked" } else { "" },
                attr("for", id),
            );
        }
        Widget::Select {
            options,
            multiple,
            allow_empty,
            allow_deselect,
            lookup,
            max_selections,
        } => {
            let _ = write!(
                out,
                "<div class=\"input-group\"><select class=\"input-group-field regular\"{}{}{}{}{}>\n",
                attr("id", id),
                attr("name", &fragment.field_path),
                if *multiple { " multiple" } else { "" },
                if *allow_deselect { " data-allow-deselect=\"true\"" } else { "" },
                opt_attr("data-max-selections", *max_selections),
            );
            if *allow_empty {
                out.push_str("<option value=\"\"></option>\n");
            }
            for option in options {
                render_option(out, option, fragment.value.as_ref());
            }
            out.push_str("</select>");
            if *lookup {
                let _ = write!(
                    out,
                    "<a class=\"input-group-label\"{}>lookup choices</a>",
                    attr("data-lookup", &fragment.entity_id)
                );
            }
            out.push_str("</div>\n");
        }
    }
}

fn render_tabs(out: &mut String, id: &str, tabs: &[Tab]) {
    let _ = writeln!(out, "<ul class=\"tabs\" data-tabs{}>", attr("id", id));
    for tab in tabs {
        let active = if tab.active { " is-active" } else { "" };
        let _ = writeln!(
            out,
            "<li class=\"tabs-title{active}\"><a{}{}>{}</a></li>",
            attr("href", &format!("#{}", tab.id)),
            if tab.active { " aria-selected=\"true\"" } else { "" },
            escape_html(&tab.label.text)
        );
    }
    out.push_str("</ul>\n");
    let _ = writeln!(out, "<div class=\"input-group tabs-content\"{}>", attr("data-tabs-content", id));
    for tab in tabs {
        let active = if tab.active { " is-active" } else { "" };
        let _ = writeln!(out, "<div class=\"tabs-panel{active}\"{}>", attr("id", &tab.id));
        for fragment in &tab.fragments {
            render_fragment(out, fragment);
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

fn render_option(out: &mut String, option: &ChoiceOption, value: Option<&Value>) {
    let selected = match value {
        Some(Value::String(s)) => *s == option.id,
        Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(option.id.as_str())),
        _ => false,
    };
    let _ = writeln!(
        out,
        "<option{}{}{}{}>{}{}</option>",
        attr("value", &option.id),
        attr("class", &format!("depth{}", option.depth)),
        opt_attr("data-synonyms", option.synonyms.as_deref()),
        if selected { " selected" } else { "" },
        option.indent,
        escape_html(&option.label),
    );
}

fn render_units(units: &UnitSelector) -> String {
    match units {
        UnitSelector::None => String::new(),
        UnitSelector::Static { label, .. } => {
            format!("<span class=\"input-group-label small\">{}</span>", escape_html(label))
        }
        UnitSelector::Choice { id, options } => {
            let mut html = format!(
                "<div class=\"input-group-button\"><select class=\"units\"{}>",
                attr("id", id)
            );
            for option in options {
                let _ = write!(html, "<option{}>{}</option>", attr("value", &option.id), escape_html(&option.label));
            }
            html.push_str("</select></div>");
            html
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

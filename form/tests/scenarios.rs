//! End-to-end form scenarios: compile, interact, extract.

use geem_form::{
    compile_focus, extract, ControlError, FormSession, FormSettings, Fragment, RenderState,
    RenderTree, Widget,
};
use geem_spec::SpecificationDocument;
use serde_json::{json, Value};

fn document(json: &str) -> SpecificationDocument {
    SpecificationDocument::from_json_str(json).unwrap_or_default()
}

fn find_entity<'t>(fragments: impl IntoIterator<Item = &'t Fragment>, entity: &str) -> Option<&'t Fragment> {
    fragments.into_iter().find_map(|f| {
        if f.entity_id == entity {
            Some(f)
        } else {
            find_entity(f.children(), entity)
        }
    })
}

fn by_entity<'t>(tree: &'t RenderTree, entity: &str) -> &'t Fragment {
    match find_entity(tree.fragments(), entity) {
        Some(fragment) => fragment,
        None => unreachable!("{entity} is rendered"),
    }
}

const SAMPLE: &str = r#"{"specifications": {"S": {
    "id": "S", "datatype": "model", "uiLabel": "Sample", "components": {
        "one": {"id": "one", "datatype": "xmls:string", "uiLabel": "One",
                "minCardinality": 1, "maxCardinality": 1},
        "any": {"id": "any", "datatype": "xmls:string", "uiLabel": "Any",
                "minCardinality": 0},
        "some": {"id": "some", "datatype": "xmls:decimal", "uiLabel": "Some",
                 "minCardinality": 2, "maxCardinality": 5}}}}}"#;

#[test]
fn exactly_one_is_required_and_single() {
    let doc = document(SAMPLE);
    let tree = compile_focus(&doc, "S", &FormSettings::default(), 1);
    let one = by_entity(&tree, "one");
    assert!(one.cardinality.required);
    assert!(!one.cardinality.array_like);
    assert!(one.repeat.is_none());
    assert!(one.instances.is_empty());
}

#[test]
fn zero_or_more_is_optional_and_repeatable() {
    let doc = document(SAMPLE);
    let tree = compile_focus(&doc, "S", &FormSettings::default(), 1);
    let any = by_entity(&tree, "any");
    assert!(!any.cardinality.required);
    assert_eq!(any.cardinality.label.as_deref(), Some("optional"));
    assert!(any.repeat.is_some_and(|r| r.add_enabled));
}

#[test]
fn add_until_max_then_disabled() {
    let doc = document(SAMPLE);
    let mut session = FormSession::new(&doc, FormSettings::default());
    let wrapper = by_entity(session.select("S"), "some").id.clone();

    let mut added = Vec::new();
    for _ in 0..4 {
        match session.add_instance(&wrapper) {
            Ok(Some(id)) => added.push(id),
            other => unreachable!("add failed: {other:?}"),
        }
    }
    assert_eq!(session.add_instance(&wrapper), Ok(None));

    let tree = session.tree().map(|t| by_entity(t, "some"));
    let headers: Vec<&str> = tree
        .map(|f| f.instances.iter().map(|i| i.header.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(headers, ["Record 2", "Record 3", "Record 4", "Record 5"]);
    assert!(tree.and_then(|f| f.repeat).is_some_and(|r| r.count == 5 && !r.add_enabled));

    // every added instance gets fresh ids
    let mut unique = added.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), added.len());
}

#[test]
fn remove_renumbers_and_reenables() {
    let doc = document(SAMPLE);
    let mut session = FormSession::new(&doc, FormSettings::default());
    let wrapper = by_entity(session.select("S"), "some").id.clone();
    let mut added = Vec::new();
    for _ in 0..4 {
        if let Ok(Some(id)) = session.add_instance(&wrapper) {
            added.push(id);
        }
    }
    assert_eq!(added.len(), 4);

    assert_eq!(session.remove_instance(&wrapper, &added[1]), Ok(()));
    let some = session.tree().map(|t| by_entity(t, "some"));
    let headers: Vec<&str> = some
        .map(|f| f.instances.iter().map(|i| i.header.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(headers, ["Record 2", "Record 3", "Record 4"]);
    assert!(some.and_then(|f| f.repeat).is_some_and(|r| r.count == 4 && r.add_enabled));

    assert_eq!(
        session.remove_instance(&wrapper, &added[1]),
        Err(ControlError::UnknownInstance {
            wrapper: wrapper.clone(),
            instance: added[1].clone(),
        })
    );
}

#[test]
fn controls_need_a_selection() {
    let doc = document(SAMPLE);
    let mut session = FormSession::new(&doc, FormSettings::default());
    assert_eq!(session.add_instance("x"), Err(ControlError::NoForm));
    assert_eq!(session.submission(), Value::Null);
}

#[test]
fn unknown_focus_has_no_field_specification() {
    let doc = document(SAMPLE);
    let mut session = FormSession::new(&doc, FormSettings::default());
    let tree = session.select("nope");
    assert_eq!(tree.state, RenderState::NoFieldSpecification);
    assert!(tree.fragments().is_empty());
}

#[test]
fn reselecting_bumps_generation() {
    let doc = document(SAMPLE);
    let mut session = FormSession::new(&doc, FormSettings::default());
    let first = session.select("S").generation;
    let second = session.select("S").generation;
    assert!(second > first);
}

#[test]
fn nested_path_round_trips() {
    let doc = document(
        r#"{"specifications": {"a": {"id": "a", "datatype": "model", "uiLabel": "A",
            "components": {"b": {"id": "b", "datatype": "model", "uiLabel": "B",
                "components": {"c": {"id": "c", "datatype": "xmls:string", "uiLabel": "C"}}}}}}}"#,
    );
    let mut session = FormSession::new(&doc, FormSettings::default());
    let c = by_entity(session.select("a"), "c").id.clone();
    assert!(session.set_value(&c, json!("v")));
    assert_eq!(session.submission(), json!({"a": {"b": {"c": "v"}}}));
}

#[test]
fn repeated_values_extract_as_lists() {
    let doc = document(SAMPLE);
    let mut session = FormSession::new(&doc, FormSettings::default());
    let wrapper = by_entity(session.select("S"), "some").id.clone();
    let added = session.add_instance(&wrapper).ok().flatten().unwrap_or_default();
    let second = session
        .tree()
        .and_then(|t| t.instance(&wrapper, &added))
        .and_then(|i| i.fragments.first())
        .map(|f| f.id.clone())
        .unwrap_or_default();

    session.set_value(&wrapper, json!(1.5));
    session.set_value(&second, json!(2.5));
    let submission = session.submission();
    assert_eq!(submission.pointer("/S/some"), Some(&json!([1.5, 2.5])));
    assert_eq!(submission.pointer("/S/one"), Some(&Value::Null));
}

const TAXONOMY: &str = r#"{"specifications": {"T": {
    "id": "T", "datatype": "xmls:anyURI", "uiLabel": "Taxon", "maxCardinality": 1,
    "choices": {
        "a": {"id": "a", "datatype": "xmls:anyURI", "uiLabel": "Animal", "choices": {
            "a1": {"id": "a1", "datatype": "xmls:anyURI", "uiLabel": "Bird", "choices": {
                "a11": {"id": "a11", "datatype": "xmls:anyURI", "uiLabel": "Owl"}}},
            "a2": {"id": "a2", "datatype": "xmls:anyURI", "uiLabel": "Fish"}}},
        "p": {"id": "p", "datatype": "xmls:anyURI", "uiLabel": "Plant"}}}}}"#;

#[test]
fn taxonomy_cut_at_one_level() {
    let doc = document(TAXONOMY);
    let settings = FormSettings {
        default_cut_depth: Some(1),
        ..FormSettings::default()
    };
    let tree = compile_focus(&doc, "T", &settings, 1);
    let Widget::Select {
        options, multiple, ..
    } = &by_entity(&tree, "T").widget
    else {
        unreachable!("T is categorical");
    };
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, ["Animal (2)", "Plant"]);
    assert!(!multiple);
}

#[test]
fn taxonomy_without_cut_lists_every_level() {
    let doc = document(TAXONOMY);
    let tree = compile_focus(&doc, "T", &FormSettings::default(), 1);
    let Widget::Select { options, .. } = &by_entity(&tree, "T").widget else {
        unreachable!("T is categorical");
    };
    let ids: Vec<(&str, usize)> = options.iter().map(|o| (o.id.as_str(), o.depth)).collect();
    assert_eq!(ids, [("a", 0), ("a1", 1), ("a11", 2), ("a2", 1), ("p", 0)]);
}

const BRANCHES: &str = r#"{"specifications": {"D": {
    "id": "D", "datatype": "disjunction", "uiLabel": "Either", "components": {
        "X": {"id": "X", "datatype": "model", "uiLabel": "X", "components": {
            "shared": {"id": "shared", "datatype": "xmls:string", "uiLabel": "Shared"}}},
        "Y": {"id": "Y", "datatype": "model", "uiLabel": "Y", "components": {
            "shared": {"id": "shared", "datatype": "xmls:string", "uiLabel": "Shared"}}},
        "Z": {"id": "Z", "datatype": "model", "uiLabel": "Z", "components": {
            "shared": {"id": "shared", "datatype": "xmls:string", "uiLabel": "Shared"}}}}}}}"#;

#[test]
fn disjunction_branches_get_distinct_ids() {
    let doc = document(BRANCHES);
    let tree = compile_focus(&doc, "D", &FormSettings::default(), 1);
    let Widget::Tabs { tabs } = &by_entity(&tree, "D").widget else {
        unreachable!("D is a disjunction");
    };
    assert_eq!(tabs.len(), 3);

    let mut panels: Vec<&str> = tabs.iter().map(|t| t.id.as_str()).collect();
    assert!(panels.iter().all(|id| id.starts_with("panel_")));
    panels.sort_unstable();
    panels.dedup();
    assert_eq!(panels.len(), 3);

    let mut inputs: Vec<String> = tabs
        .iter()
        .filter_map(|t| find_entity(&t.fragments, "shared"))
        .map(|f| f.id.clone())
        .collect();
    inputs.sort();
    inputs.dedup();
    assert_eq!(inputs.len(), 3);
}

#[test]
fn switching_tabs_keeps_one_active() {
    let doc = document(BRANCHES);
    let mut session = FormSession::new(&doc, FormSettings::default());
    let last = match &by_entity(session.select("D"), "D").widget {
        Widget::Tabs { tabs } => tabs.last().map(|t| t.id.clone()).unwrap_or_default(),
        _ => unreachable!("D is a disjunction"),
    };
    assert!(session.activate_tab(&last));
    let active: Vec<bool> = match session.tree().map(|t| &by_entity(t, "D").widget) {
        Some(Widget::Tabs { tabs }) => tabs.iter().map(|t| t.active).collect(),
        _ => Vec::new(),
    };
    assert_eq!(active, [false, false, true]);
}

#[test]
fn inactive_branches_are_still_submitted() {
    let doc = document(BRANCHES);
    let tree = compile_focus(&doc, "D", &FormSettings::default(), 1);
    let submission = extract(&tree);
    for branch in ["X", "Y", "Z"] {
        assert_eq!(
            submission.pointer(&format!("/D/{branch}/shared")),
            Some(&Value::Null)
        );
    }
}

#[test]
fn multi_select_values_are_not_nested() {
    let doc = document(
        r#"{"specifications": {"S": {"id": "S", "datatype": "model", "uiLabel": "Sample",
            "components": {"c": {"id": "c", "datatype": "xmls:anyURI", "uiLabel": "Colour",
                "minCardinality": 1, "choices": {
                    "a": {"id": "a", "datatype": "xmls:anyURI", "uiLabel": "A"},
                    "b": {"id": "b", "datatype": "xmls:anyURI", "uiLabel": "B"}}}}}}}"#,
    );
    let mut session = FormSession::new(&doc, FormSettings::default());
    let select = by_entity(session.select("S"), "c").id.clone();
    assert!(session.set_value(&select, json!(["a", "b"])));
    assert_eq!(session.submission(), json!({"S": {"c": ["a", "b"]}}));
}

/// Every datatype family, an unknown tag, and both disjunction shapes.
const KINDS: &[&str] = &[
    r#""datatype": "xmls:string""#,
    r#""datatype": "xmls:decimal""#,
    r#""datatype": "xmls:dateTime""#,
    r#""datatype": "xmls:boolean""#,
    r#""datatype": "xmls:anyURI", "choices": {"o": {"id": "o", "datatype": "xmls:anyURI", "uiLabel": "O"}}"#,
    r#""datatype": "model", "uiLabel": "M", "components": {"m": {"id": "m", "datatype": "xmls:string"}}"#,
    r#""datatype": "disjunction", "components": {"p": {"id": "p", "datatype": "xmls:string"}, "q": {"id": "q", "datatype": "xmls:integer"}}"#,
    r#""datatype": "disjunction""#,
    r#""datatype": "xmls:gYear""#,
    r#""uiLabel": "No datatype""#,
];

#[test]
fn every_kind_compiles_under_every_bound() {
    let bound = |key: &str, value: Option<u32>| {
        value.map_or_else(String::new, |v| format!(r#", "{key}": {v}"#))
    };
    for kind in KINDS {
        for min in [None, Some(0), Some(1), Some(2), Some(5)] {
            for max in [None, Some(1), Some(2), Some(5)] {
                let json = format!(
                    r#"{{"specifications": {{"K": {{"id": "K", {kind}{}{}}}}}}}"#,
                    bound("minCardinality", min),
                    bound("maxCardinality", max),
                );
                let doc = document(&json);
                assert!(doc.root("K").is_some(), "fixture parses: {json}");
                let tree = compile_focus(&doc, "K", &FormSettings::default(), 1);
                let Some(fragment) = tree.fragments().iter().find(|f| f.entity_id == "K") else {
                    unreachable!("no fragment for {json}");
                };
                let plain_input =
                    fragment.widget.is_input() && !matches!(fragment.widget, Widget::Select { .. });
                if let (true, Some(slots)) = (plain_input, fragment.cardinality.fixed_slots()) {
                    assert_eq!(fragment.instances.len() + 1, slots as usize, "{json}");
                }
            }
        }
    }
}

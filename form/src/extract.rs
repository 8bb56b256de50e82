//! Submission extraction: render tree to nested JSON.

use serde_json::map::Entry;
use serde_json::{Map, Value};

use crate::render::{Fragment, RenderTree, Widget};
use crate::template::unmatched_reference;

/// Collects the values of every input fragment into nested JSON keyed by
/// the fragments' dotted field paths.
///
/// Inputs of array-like fields, and inputs inside them, contribute to
/// lists in instance order. Selects are the exception: their value is
/// stored as set. Inactive tab panels are included. A path that
/// collides with an existing value of the other shape, or that has an empty
/// segment, is stored under its full dotted key as an unmatched-reference
/// marker.
#[must_use]
pub fn extract(tree: &RenderTree) -> Value {
    let mut root = Map::new();
    for fragment in tree.fragments() {
        collect(fragment, false, &mut root);
    }
    Value::Object(root)
}

fn collect(fragment: &Fragment, in_array: bool, root: &mut Map<String, Value>) {
    // a select already holds its own multiplicity
    let own = fragment.cardinality.array_like && !matches!(fragment.widget, Widget::Select { .. });
    let array = in_array || own;
    if fragment.widget.is_input() {
        let value = fragment.value.clone().unwrap_or(Value::Null);
        insert(root, &fragment.field_path, value, array);
    }
    for child in fragment.children() {
        collect(child, array, root);
    }
}

/// Inserts `value` at `path`, marking the path unmatched on a collision.
///
/// The marker goes under the full dotted key unless that key is taken.
pub(crate) fn insert(root: &mut Map<String, Value>, path: &str, value: Value, array: bool) {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) || !place(root, &segments, value, array) {
        tracing::warn!(path, "field path does not fit the submission");
        // a marker never replaces data already stored under the same key
        root.entry(path.to_string())
            .or_insert_with(|| Value::String(unmatched_reference(path)));
    }
}

fn place(map: &mut Map<String, Value>, segments: &[&str], value: Value, array: bool) -> bool {
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };
    let mut focus = map;
    for key in parents {
        let entry = focus
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(next) => focus = next,
            _ => return false,
        }
    }
    match focus.entry((*last).to_string()) {
        Entry::Vacant(slot) => {
            slot.insert(if array { Value::Array(vec![value]) } else { value });
        }
        Entry::Occupied(mut slot) => match (slot.get_mut(), array) {
            (Value::Array(items), true) => items.push(value),
            (Value::Object(_), _) | (_, true) => return false,
            (existing, false) => *existing = value,
        },
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_paths() {
        let mut root = Map::new();
        insert(&mut root, "metadata.date", json!("2018-05-28"), false);
        insert(&mut root, "metadata.version", json!(2), false);
        insert(&mut root, "name", json!("pkg"), false);
        assert_eq!(
            Value::Object(root),
            json!({"metadata": {"date": "2018-05-28", "version": 2}, "name": "pkg"})
        );
    }

    #[test]
    fn array_paths_accumulate() {
        let mut root = Map::new();
        insert(&mut root, "a.b", json!(1), true);
        insert(&mut root, "a.b", json!(2), true);
        assert_eq!(Value::Object(root), json!({"a": {"b": [1, 2]}}));
    }

    #[test]
    fn collisions_are_marked() {
        let mut root = Map::new();
        insert(&mut root, "a", json!("scalar"), false);
        insert(&mut root, "a.b", json!(1), false);
        insert(&mut root, "x..y", json!(1), false);
        assert_eq!(root.get("a"), Some(&json!("scalar")));
        assert_eq!(
            root.get("a.b"),
            Some(&json!("unmatched reference: @a.b"))
        );
        assert_eq!(
            root.get("x..y"),
            Some(&json!("unmatched reference: @x..y"))
        );
    }

    #[test]
    fn scalar_over_object_is_a_collision() {
        let mut root = Map::new();
        insert(&mut root, "a.b", json!(1), false);
        insert(&mut root, "a", json!(2), false);
        assert_eq!(root.get("a"), Some(&json!({"b": 1})));
    }
}

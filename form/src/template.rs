//! `@field.path` substitution in static markup.

use serde_json::Value;

/// Marker left in place of a reference that does not resolve.
#[must_use]
pub fn unmatched_reference(path: &str) -> String {
    format!("unmatched reference: @{path}")
}

/// Replaces every `@a.b.c` token that is directly followed by `"` or `<`
/// with the value at that dotted path in `data`.
///
/// Tokens that do not resolve become [`unmatched_reference`] markers; the
/// terminator is kept either way.
#[must_use]
pub fn fill_template(markup: &str, data: &Value) -> String {
    let mut result = String::with_capacity(markup.len());
    let mut remaining = markup;

    while let Some(start) = remaining.find('@') {
        result.push_str(&remaining[..start]);
        let after = &remaining[start + 1..];
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(after.len());
        let path = &after[..len];
        let terminator = after[len..].chars().next();

        match terminator {
            Some(t @ ('"' | '<')) if !path.is_empty() => {
                match lookup(data, path) {
                    Some(value) => result.push_str(&render_value(value)),
                    None => result.push_str(&unmatched_reference(path)),
                }
                result.push(t);
                remaining = &after[len + 1..];
            }
            _ => {
                result.push('@');
                remaining = after;
            }
        }
    }

    result.push_str(remaining);
    result
}

/// Follows a dotted path through objects (by key) and arrays (by index).
#[must_use]
pub fn lookup<'v>(data: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(data, |focus, key| match focus {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Flattening of nested choice taxonomies into select options.

use geem_spec::{Entity, Kind};
use serde::Serialize;

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    /// Ontology id, submitted as the option value.
    pub id: String,
    /// Display label, with a ` (n)` suffix when its children are hidden.
    pub label: String,
    /// Nesting level below the categorical field.
    pub depth: usize,
    /// Leading spaces, one per level.
    pub indent: String,
    /// Lower-cased, comma-joined synonyms for type-ahead search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<String>,
    /// Number of direct children hidden by the depth cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_count: Option<usize>,
    /// Authoring problem with this option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Result of flattening one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flattened {
    /// Options at and below this level, in document order.
    Options(Vec<ChoiceOption>),
    /// The cutoff was reached; the node has this many direct choices.
    Hidden(usize),
}

impl Flattened {
    /// The options, or nothing when the level was hidden.
    #[must_use]
    pub fn into_options(self) -> Vec<ChoiceOption> {
        match self {
            Flattened::Options(options) => options,
            Flattened::Hidden(_) => Vec::new(),
        }
    }
}

/// Walks `choices` maps depth first.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceFlattener<'a> {
    synonym_fields: &'a [String],
}

impl<'a> ChoiceFlattener<'a> {
    /// Creates a flattener that indexes the given synonym fields.
    #[must_use]
    pub fn new(synonym_fields: &'a [String]) -> Self {
        Self { synonym_fields }
    }

    /// Flattens `node`'s choices starting at `depth`.
    ///
    /// With `cut_depth` set, levels at that depth are not enumerated; the
    /// parent option one level up gets the hidden count in its label instead.
    /// A leaf at the cutoff has nothing hidden and keeps its plain label.
    #[must_use]
    pub fn flatten(&self, node: &Entity, depth: usize, cut_depth: Option<usize>) -> Flattened {
        if node.choices.is_empty() {
            return Flattened::Options(Vec::new());
        }
        if cut_depth == Some(depth) {
            return Flattened::Hidden(node.choices.len());
        }

        let mut out = Vec::new();
        for (key, option) in node.choices.iter() {
            let mut label = match option.display_label() {
                Some(label) => label.to_string(),
                None => {
                    tracing::warn!(option = key, parent = %node.id, "picklist item has no label");
                    String::new()
                }
            };

            let (children, hidden_count) = match self.flatten(option, depth + 1, cut_depth) {
                Flattened::Hidden(n) => {
                    label.push_str(&format!(" ({n})"));
                    (Vec::new(), Some(n))
                }
                Flattened::Options(children) => (children, None),
            };

            let diagnostic = match option.kind() {
                Kind::Categorical => None,
                other => {
                    let tag = option.datatype.as_deref().unwrap_or("none");
                    tracing::warn!(option = key, parent = %node.id, ?other, "choice is not a categorical option");
                    Some(format!("option {key} has datatype {tag}, not a categorical option"))
                }
            };

            let synonyms = option.synonyms(self.synonym_fields);
            out.push(ChoiceOption {
                id: option.id.clone(),
                label,
                depth,
                indent: " ".repeat(depth),
                synonyms: (!synonyms.is_empty()).then(|| synonyms.join(",").to_lowercase()),
                hidden_count,
                diagnostic,
            });
            out.extend(children);
        }
        Flattened::Options(out)
    }
}

/// Cut depth for a categorical node: its `depth` feature, else `default`.
#[must_use]
pub fn cut_depth_for(node: &Entity, default: Option<usize>) -> Option<usize> {
    node.feature("depth")
        .and_then(geem_spec::Feature::as_usize)
        .or(default)
}

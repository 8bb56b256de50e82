//! Core specification model types.
//!
//! An [`Entity`] is one node of an ontology-derived specification tree. Trees
//! are deserialized from JSON as produced by the GEEM resource resolver and
//! are read-only once [`Entity::annotate`] has filled in depth and path.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::datatype::Kind;

/// Label used by synthetic roots that must not be wrapped in a container.
pub const NO_LABEL: &str = "[no label]";

/// Definitions longer than this are clipped at the next sentence end.
const DEFINITION_CLIP: usize = 140;

/// A user-interface feature attached to an entity, e.g. `preferred_unit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature value; some features (`lookup`) are flags and carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Feature {
    /// Creates a feature carrying `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    /// Returns the value if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }

    /// Returns the value as a count, accepting numbers and numeric strings.
    #[must_use]
    pub fn as_usize(&self) -> Option<usize> {
        match self.value.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// A string-keyed map that keeps document insertion order.
///
/// Component and choice order in a specification is meaningful, so these
/// maps are never sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> OrderedMap<T> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Inserts an entry. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates values mutably in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    /// Iterates values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for OrderedMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<T: Serialize> Serialize for OrderedMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<T> {
    type Value = OrderedMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of entity ids to entities")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// A node of the specification tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Ontology id, e.g. `GENEPIO:0001234`.
    #[serde(default)]
    pub id: String,
    /// Declared datatype tag; see [`Kind::from_tag`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    /// Label chosen for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_label: Option<String>,
    /// Raw ontology label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Definition chosen for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_definition: Option<String>,
    /// Raw ontology definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Help text shown next to the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// User-interface features keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, Feature>,
    /// Child fields of grouping and disjunction nodes.
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub components: OrderedMap<Entity>,
    /// Options of categorical nodes, recursively nested.
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub choices: OrderedMap<Entity>,
    /// Compatible units of quantity nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<Entity>,
    /// Inclusive lower numeric bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Number>,
    /// Inclusive upper numeric bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Number>,
    /// Minimum text length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum text length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Validation regular expression or preset validator name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum number of occurrences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cardinality: Option<u32>,
    /// Maximum number of occurrences; absent means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cardinality: Option<u32>,
    /// Explicit dotted data field name, overriding the path-derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Initial value of the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Nesting level; the specification root is 0.
    #[serde(skip)]
    pub depth: usize,
    /// Ids of all ancestors, root first.
    #[serde(skip)]
    pub path: Vec<String>,
    /// Remaining keys, kept verbatim (synonym fields and the like).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Entity {
    /// Creates an entity with only an id and a datatype tag.
    pub fn new(id: impl Into<String>, datatype: Option<&str>) -> Self {
        Self {
            id: id.into(),
            datatype: datatype.map(str::to_string),
            ..Self::default()
        }
    }

    /// The entity's kind, derived from its datatype tag.
    #[must_use]
    pub fn kind(&self) -> Kind {
        Kind::from_tag(self.datatype.as_deref())
    }

    /// Looks up a feature by name.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.get(name)
    }

    /// Display label: the `label` feature, then `uiLabel`, then `label`.
    #[must_use]
    pub fn display_label(&self) -> Option<&str> {
        self.feature("label")
            .and_then(Feature::as_str)
            .or(self.ui_label.as_deref())
            .or(self.label.as_deref())
    }

    /// Returns true if the entity has a label other than [`NO_LABEL`].
    #[must_use]
    pub fn has_real_label(&self) -> bool {
        self.display_label()
            .is_some_and(|l| !l.is_empty() && l != NO_LABEL)
    }

    /// Label used for unit options: `uiLabel`, then `label`.
    #[must_use]
    pub fn unit_label(&self) -> &str {
        self.ui_label
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or(&self.id)
    }

    /// Display definition: the `definition` feature, then `uiDefinition`,
    /// then `definition`, clipped after the first sentence ending past 140
    /// characters.
    #[must_use]
    pub fn display_definition(&self) -> Option<String> {
        let text = self
            .feature("definition")
            .and_then(Feature::as_str)
            .or(self.ui_definition.as_deref())
            .or(self.definition.as_deref())?;
        if text.is_empty() {
            return None;
        }
        Some(clip_definition(text))
    }

    /// Returns true if both cardinality bounds are present and min > max.
    #[must_use]
    pub fn bounds_inverted(&self) -> bool {
        matches!(
            (self.min_cardinality, self.max_cardinality),
            (Some(min), Some(max)) if min > max
        )
    }

    /// Collects data-authoring problems in this entity and its descendants.
    ///
    /// Problems never stop compilation; they are reported so authors can
    /// fix the specification.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        self.validate_into(&mut problems);
        problems
    }

    fn validate_into(&self, problems: &mut Vec<String>) {
        if self.bounds_inverted() {
            problems.push(format!(
                "{}: minCardinality {} exceeds maxCardinality {}",
                self.id,
                self.min_cardinality.unwrap_or_default(),
                self.max_cardinality.unwrap_or_default()
            ));
        }
        match self.kind() {
            Kind::Disjunction if self.components.is_empty() => {
                problems.push(format!("{}: disjunction has no branches", self.id));
            }
            Kind::Unrecognized(tag) => {
                problems.push(format!("{}: unrecognized datatype {tag}", self.id));
            }
            _ => {}
        }
        for option in self.choices.values() {
            if option.kind() != Kind::Categorical {
                problems.push(format!(
                    "{}: option {} is not categorical",
                    self.id, option.id
                ));
            }
        }
        for child in self.components.values().chain(self.choices.values()) {
            child.validate_into(problems);
        }
    }

    /// The dotted field path under which this field's value is submitted.
    ///
    /// An explicit `name` wins; otherwise the ancestor ids and the entity's
    /// own id are joined with `.`.
    #[must_use]
    pub fn field_path(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let mut segments: Vec<&str> = self.path.iter().map(String::as_str).collect();
        segments.push(&self.id);
        segments.join(".")
    }

    /// Ancestor ids followed by the entity's own id.
    #[must_use]
    pub fn entity_path(&self) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(self.id.clone());
        path
    }

    /// Collects the string values of the given synonym-bearing fields.
    ///
    /// Each field may hold a string or a list of strings.
    #[must_use]
    pub fn synonyms(&self, fields: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        for field in fields {
            match self.extra.get(field) {
                Some(Value::String(s)) => out.push(s.clone()),
                Some(Value::Array(items)) => {
                    out.extend(items.iter().filter_map(Value::as_str).map(str::to_string));
                }
                _ => {}
            }
        }
        out
    }

    /// Sets `depth` and `path` on this entity (as a root) and all descendants.
    pub fn annotate(&mut self) {
        self.annotate_at(0, Vec::new());
    }

    fn annotate_at(&mut self, depth: usize, path: Vec<String>) {
        let mut child_path = path.clone();
        child_path.push(self.id.clone());
        self.depth = depth;
        self.path = path;
        for child in self.components.values_mut() {
            child.annotate_at(depth + 1, child_path.clone());
        }
        for child in self.choices.values_mut() {
            child.annotate_at(depth + 1, child_path.clone());
        }
        for unit in &mut self.units {
            unit.annotate_at(depth + 1, child_path.clone());
        }
    }

    /// Finds a direct child by id, searching components before choices.
    #[must_use]
    pub fn child(&self, id: &str) -> Option<&Entity> {
        self.components.get(id).or_else(|| self.choices.get(id))
    }

    /// Walks down through children along `ids`.
    #[must_use]
    pub fn descendant<S: AsRef<str>>(&self, ids: &[S]) -> Option<&Entity> {
        ids.iter()
            .try_fold(self, |node, id| node.child(id.as_ref()))
    }
}

fn clip_definition(text: &str) -> String {
    let Some((start, _)) = text.char_indices().nth(DEFINITION_CLIP) else {
        return text.to_string();
    };
    match text[start..].find(". ") {
        Some(offset) if offset >= 1 => format!("{}.", &text[..start + offset]),
        _ => text.to_string(),
    }
}

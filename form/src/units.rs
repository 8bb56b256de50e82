//! Unit selectors for quantity fields.

use geem_spec::{Entity, Feature};
use serde::Serialize;

/// Suffix appended to a field's presentation id to name its unit control.
pub const UNIT_ID_SUFFIX: &str = "-IAO:0000039";

/// One unit choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOption {
    /// Unit ontology id.
    pub id: String,
    /// Unit label.
    pub label: String,
}

/// How a field's units are presented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UnitSelector {
    /// The field has no units.
    #[default]
    None,
    /// A single unit, shown as a fixed label.
    Static {
        /// Unit ontology id.
        id: String,
        /// Unit label.
        label: String,
    },
    /// Several units; the first option is the default.
    Choice {
        /// Presentation id of the unit control.
        id: String,
        /// Units, preferred unit first.
        options: Vec<UnitOption>,
    },
}

impl UnitSelector {
    /// Builds the selector for `entity`, whose field has presentation id `field_id`.
    #[must_use]
    pub fn build(entity: &Entity, field_id: &str) -> Self {
        match entity.units.as_slice() {
            [] => UnitSelector::None,
            [unit] => UnitSelector::Static {
                id: unit.id.clone(),
                label: unit.unit_label().to_string(),
            },
            units => {
                let preferred = entity.feature("preferred_unit").and_then(Feature::as_str);
                let mut options: Vec<UnitOption> = units
                    .iter()
                    .map(|u| UnitOption {
                        id: u.id.clone(),
                        label: u.unit_label().to_string(),
                    })
                    .collect();
                if let Some(pos) = preferred.and_then(|p| options.iter().position(|o| o.id == p)) {
                    let unit = options.remove(pos);
                    options.insert(0, unit);
                }
                UnitSelector::Choice {
                    id: format!("{field_id}{UNIT_ID_SUFFIX}"),
                    options,
                }
            }
        }
    }

    /// Returns true when there is nothing to show.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, UnitSelector::None)
    }
}

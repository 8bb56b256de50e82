//! Required/optional classification and repeat limits.

use serde::Serialize;

/// What a node's cardinality bounds mean for its rendered field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cardinality {
    /// Lower bound, if declared.
    pub min: Option<u32>,
    /// Upper bound, if declared; absent means unbounded.
    pub max: Option<u32>,
    /// The field must be filled in.
    pub required: bool,
    /// Human-readable annotation, e.g. `from 2 to 5 required`.
    pub label: Option<String>,
    /// Submitted values form a list.
    pub array_like: bool,
    /// At least one bound is declared.
    pub constrained: bool,
    /// An add-instance control is offered.
    pub repeatable: bool,
}

impl Cardinality {
    /// Classifies a pair of bounds. `categorical` fields never get an add
    /// control since their select widget handles multiplicity itself.
    #[must_use]
    pub fn from_bounds(min: Option<u32>, max: Option<u32>, categorical: bool) -> Self {
        let (required, label) = match (min, max) {
            (Some(min), Some(max)) if min == max => match min {
                0 => (false, None),
                1 => (true, Some("required".to_string())),
                n => (true, Some(format!("{n} required"))),
            },
            (Some(min), Some(max)) => (true, Some(format!("from {min} to {max} required"))),
            (Some(0), None) => (false, Some("optional".to_string())),
            (Some(min), None) => (true, Some(format!("{min}+ required"))),
            (None, Some(1)) => (false, Some("optional".to_string())),
            (None, Some(max)) => (false, Some(format!("< {} items", u64::from(max) + 1))),
            (None, None) => (false, None),
        };

        let constrained = min.is_some() || max.is_some();
        // min = 0 with no max stays a single slot
        let array_like = (matches!(min, Some(m) if m > 0) && max.is_none())
            || matches!(max, Some(m) if m > 1);
        let repeatable = constrained
            && !categorical
            && match max {
                None => true,
                Some(max) => max > 1 && min.map_or(true, |min| min < max),
            };

        Self {
            min,
            max,
            required,
            label,
            array_like,
            constrained,
            repeatable,
        }
    }

    /// Optional in the display sense: bounded but not required.
    #[must_use]
    pub fn optional(&self) -> bool {
        self.constrained && !self.required
    }

    /// Number of slots to show up front when `min == max > 1`.
    #[must_use]
    pub fn fixed_slots(&self) -> Option<u32> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max && min > 1 => Some(min),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one() {
        let c = Cardinality::from_bounds(Some(1), Some(1), false);
        assert!(c.required);
        assert_eq!(c.label.as_deref(), Some("required"));
        assert!(!c.array_like);
        assert!(!c.repeatable);
    }

    #[test]
    fn open_optional_is_not_array_like() {
        let c = Cardinality::from_bounds(Some(0), None, false);
        assert!(!c.required);
        assert_eq!(c.label.as_deref(), Some("optional"));
        assert!(!c.array_like);
        assert!(c.repeatable);
    }

    #[test]
    fn range() {
        let c = Cardinality::from_bounds(Some(2), Some(5), false);
        assert!(c.required);
        assert_eq!(c.label.as_deref(), Some("from 2 to 5 required"));
        assert!(c.array_like);
        assert!(c.repeatable);
    }

    #[test]
    fn fixed_count() {
        let c = Cardinality::from_bounds(Some(3), Some(3), false);
        assert_eq!(c.label.as_deref(), Some("3 required"));
        assert!(!c.repeatable);
        assert_eq!(c.fixed_slots(), Some(3));
    }

    #[test]
    fn categorical_never_repeats() {
        let c = Cardinality::from_bounds(None, None, true);
        assert!(!c.repeatable);
        let c = Cardinality::from_bounds(Some(1), None, true);
        assert!(c.array_like);
        assert!(!c.repeatable);
    }

    #[test]
    fn degenerate_zero() {
        let c = Cardinality::from_bounds(Some(0), Some(0), false);
        assert!(!c.required);
        assert_eq!(c.label, None);
        assert!(!c.repeatable);
    }
}

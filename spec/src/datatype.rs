//! Datatype tags and the closed set of entity kinds they map to.
//!
//! Specification entities declare their datatype as a prefixed tag such as
//! `xmls:string` or `xmls:anyURI`, or as one of the structural tags `model`
//! and `disjunction`. [`Kind::from_tag`] turns that tag into a [`Kind`]; a tag
//! that is not recognized becomes [`Kind::Unrecognized`] rather than an error,
//! so that the compiler can render a diagnostic in place of the field.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// Prefixes accepted in front of XML Schema datatype names.
const XSD_PREFIXES: &[&str] = &["xmls:", "xsd:"];

/// Structural tag for grouping nodes.
pub const TAG_MODEL: &str = "model";

/// Structural tag for disjunction nodes.
pub const TAG_DISJUNCTION: &str = "disjunction";

/// The kind of a specification entity, derived from its datatype tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "subtype", rename_all = "camelCase")]
pub enum Kind {
    /// No datatype declared: the node still needs a value specification.
    Unspecified,
    /// Free text.
    Text(TextKind),
    /// Numeric input of the given XML Schema subtype.
    Number(NumberKind),
    /// Yes/no toggle.
    Boolean,
    /// Date, time or duration input.
    DateTime(DateTimeKind),
    /// Pick-list backed by a (possibly nested) choice taxonomy.
    Categorical,
    /// Mutually exclusive alternatives, rendered as tabs.
    Disjunction,
    /// A grouping of component fields (`model`).
    Grouping,
    /// A datatype tag this compiler does not know.
    Unrecognized(String),
}

impl Kind {
    /// Maps a datatype tag to its kind.
    ///
    /// A missing tag yields [`Kind::Unspecified`].
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return Kind::Unspecified;
        };
        match tag {
            TAG_MODEL => return Kind::Grouping,
            TAG_DISJUNCTION => return Kind::Disjunction,
            _ => {}
        }
        let Some(local) = XSD_PREFIXES.iter().find_map(|p| tag.strip_prefix(p)) else {
            return Kind::Unrecognized(tag.to_string());
        };
        match local {
            "string" => Kind::Text(TextKind::String),
            "normalizedString" => Kind::Text(TextKind::NormalizedString),
            "token" => Kind::Text(TextKind::Token),

            "integer" => Kind::Number(NumberKind::Integer),
            "positiveInteger" => Kind::Number(NumberKind::PositiveInteger),
            "nonNegativeInteger" => Kind::Number(NumberKind::NonNegativeInteger),
            "negativeInteger" => Kind::Number(NumberKind::NegativeInteger),
            "nonPositiveInteger" => Kind::Number(NumberKind::NonPositiveInteger),
            "unsignedByte" => Kind::Number(NumberKind::UnsignedByte),
            "unsignedShort" => Kind::Number(NumberKind::UnsignedShort),
            "unsignedInt" => Kind::Number(NumberKind::UnsignedInt),
            "unsignedLong" => Kind::Number(NumberKind::UnsignedLong),
            "byte" => Kind::Number(NumberKind::Byte),
            "short" => Kind::Number(NumberKind::Short),
            "int" => Kind::Number(NumberKind::Int),
            "long" => Kind::Number(NumberKind::Long),
            "decimal" => Kind::Number(NumberKind::Decimal),
            "float" => Kind::Number(NumberKind::Float),
            "double" => Kind::Number(NumberKind::Double),

            "boolean" => Kind::Boolean,

            "date" => Kind::DateTime(DateTimeKind::Date),
            "time" => Kind::DateTime(DateTimeKind::Time),
            "dateTime" => Kind::DateTime(DateTimeKind::DateTime),
            "dateTimeStamp" => Kind::DateTime(DateTimeKind::DateTimeStamp),
            "duration" => Kind::DateTime(DateTimeKind::Duration),

            "anyURI" | "QName" => Kind::Categorical,

            _ => Kind::Unrecognized(tag.to_string()),
        }
    }

    /// Returns true if fragments of this kind hold a user-entered value.
    #[must_use]
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Kind::Text(_) | Kind::Number(_) | Kind::Boolean | Kind::DateTime(_) | Kind::Categorical
        )
    }
}

/// Text datatypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextKind {
    /// `xmls:string`
    String,
    /// `xmls:normalizedString`
    NormalizedString,
    /// `xmls:token`
    Token,
}

/// Date and time datatypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DateTimeKind {
    /// `YYYY-MM-DD`
    Date,
    /// `HH:MM:SS`
    Time,
    /// `YYYY-MM-DDTHH:MM:SS`
    DateTime,
    /// `YYYY-MM-DDTHH:MM:SS` with a required time zone.
    DateTimeStamp,
    /// `[-]PnYnMnDTnHnMnS`
    Duration,
}

impl DateTimeKind {
    /// ISO 8601 picker format used when the node has no `format` feature.
    ///
    /// Durations have no picker format.
    #[must_use]
    pub fn default_format(self) -> &'static str {
        match self {
            DateTimeKind::Date => "yyyy-mm-dd",
            DateTimeKind::Time => "hh:ii:ss",
            DateTimeKind::DateTime | DateTimeKind::DateTimeStamp => "yyyy-mm-ddThh:ii:ss",
            DateTimeKind::Duration => "",
        }
    }
}

/// Numeric datatypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberKind {
    /// Unbounded integer.
    Integer,
    /// Integer >= 1.
    PositiveInteger,
    /// Integer >= 0.
    NonNegativeInteger,
    /// Integer <= -1.
    NegativeInteger,
    /// Integer <= 0.
    NonPositiveInteger,
    /// Unsigned 8-bit.
    UnsignedByte,
    /// Unsigned 16-bit.
    UnsignedShort,
    /// Unsigned 32-bit.
    UnsignedInt,
    /// Unsigned 64-bit.
    UnsignedLong,
    /// Signed 8-bit.
    Byte,
    /// Signed 16-bit.
    Short,
    /// Signed 32-bit.
    Int,
    /// Signed 64-bit.
    Long,
    /// Arbitrary precision decimal.
    Decimal,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
}

impl NumberKind {
    /// Returns true for the integer subtypes.
    #[must_use]
    pub fn is_integer(self) -> bool {
        !matches!(self, NumberKind::Decimal | NumberKind::Float | NumberKind::Double)
    }

    /// The numeric family name, used as placeholder and validator pattern.
    #[must_use]
    pub fn family(self) -> &'static str {
        match self {
            NumberKind::Decimal => "decimal",
            NumberKind::Float => "float",
            NumberKind::Double => "double",
            _ => "integer",
        }
    }

    /// Inclusive `(min, max)` bounds implied by the subtype alone.
    ///
    /// `None` means unbounded on that side.
    #[must_use]
    pub fn default_bounds(self) -> (Option<Bound>, Option<Bound>) {
        use Bound::Int;
        match self {
            NumberKind::Integer | NumberKind::Decimal => (None, None),
            NumberKind::PositiveInteger => (Some(Int(1)), None),
            NumberKind::NonNegativeInteger => (Some(Int(0)), None),
            NumberKind::NegativeInteger => (None, Some(Int(-1))),
            NumberKind::NonPositiveInteger => (None, Some(Int(0))),
            NumberKind::UnsignedByte => (Some(Int(0)), Some(Int(u8::MAX.into()))),
            NumberKind::UnsignedShort => (Some(Int(0)), Some(Int(u16::MAX.into()))),
            NumberKind::UnsignedInt => (Some(Int(0)), Some(Int(u32::MAX.into()))),
            NumberKind::UnsignedLong => (Some(Int(0)), Some(Int(u64::MAX.into()))),
            NumberKind::Byte => (Some(Int(i8::MIN.into())), Some(Int(i8::MAX.into()))),
            NumberKind::Short => (Some(Int(i16::MIN.into())), Some(Int(i16::MAX.into()))),
            NumberKind::Int => (Some(Int(i32::MIN.into())), Some(Int(i32::MAX.into()))),
            NumberKind::Long => (Some(Int(i64::MIN.into())), Some(Int(i64::MAX.into()))),
            // 24-bit significand
            NumberKind::Float => (Some(Int(-(1 << 23))), Some(Int((1 << 23) - 1))),
            // largest exactly representable integers
            NumberKind::Double => (Some(Int(-((1 << 53) - 1))), Some(Int((1 << 53) - 1))),
        }
    }
}

/// A numeric bound: exact for integers, floating point otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Bound {
    /// Exact integer bound; wide enough for the full `unsignedLong` range.
    Int(i128),
    /// Non-integral bound.
    Real(f64),
}

impl Bound {
    /// Converts a JSON number into a bound, keeping integers exact.
    #[must_use]
    pub fn from_number(number: &serde_json::Number) -> Option<Bound> {
        if let Some(i) = number.as_i64() {
            return Some(Bound::Int(i.into()));
        }
        if let Some(u) = number.as_u64() {
            return Some(Bound::Int(u.into()));
        }
        number.as_f64().map(Bound::Real)
    }

    /// Lossy conversion for comparisons across representations.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            // precision loss past 2^53 only affects mixed comparisons
            Bound::Int(i) => i as f64,
            Bound::Real(r) => r,
        }
    }
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Bound::Int(a), Bound::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Int(i) => write!(f, "{i}"),
            Bound::Real(r) => write!(f, "{r}"),
        }
    }
}

//! Property values held in business object slots.

use crate::types::PropType;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Value stored in a property slot.
///
/// `Null` is the default for every slot without a declared default value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// No value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// 16-bit signed integer
    Short(i16),

    /// 32-bit signed integer
    Int(i32),

    /// 64-bit signed integer
    Long(i64),

    /// 64-bit floating point
    Double(f64),

    /// Exact decimal
    Decimal(Decimal),

    /// Date/time in UTC
    DateTime(DateTime<Utc>),

    /// Globally unique identifier
    Guid(Uuid),

    /// String value (also used for enumeration members)
    Text(String),
}

impl PropValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64, widening smaller integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Short(i) => Some(*i as i64),
            Self::Int(i) => Some(*i as i64),
            Self::Long(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a decimal.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get this value as a date/time.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Try to get this value as a UUID.
    pub fn as_guid(&self) -> Option<&Uuid> {
        match self {
            Self::Guid(u) => Some(u),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values of the same family.
    ///
    /// Integers compare across widths. Returns `None` for nulls, mixed
    /// families and NaN doubles.
    pub fn compare(&self, other: &PropValue) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Guid(a), Self::Guid(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => None,
            },
        }
    }

    /// Whether this value can be stored in a slot of the given type.
    pub fn fits(&self, prop_type: &PropType) -> bool {
        match (self, prop_type) {
            (Self::Null, _) => true,
            (Self::Bool(_), PropType::Bool) => true,
            (Self::Short(_), PropType::Short) => true,
            (Self::Int(_), PropType::Int) => true,
            (Self::Long(_), PropType::Long) => true,
            (Self::Double(_), PropType::Double) => true,
            (Self::Decimal(_), PropType::Decimal) => true,
            (Self::DateTime(_), PropType::DateTime) => true,
            (Self::Guid(_), PropType::Guid) => true,
            (Self::Text(_), PropType::String) => true,
            (Self::Text(s), PropType::Enum { values }) => values.iter().any(|v| v == s),
            _ => false,
        }
    }

    /// Parse a textual value (default values, lookup list values) into the
    /// given property type.
    ///
    /// Returns `None` when the text does not parse as that type.
    pub fn parse_as(text: &str, prop_type: &PropType) -> Option<PropValue> {
        let text = text.trim();
        match prop_type {
            PropType::Bool => match text.to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(Self::Bool(true)),
                "false" | "0" | "no" => Some(Self::Bool(false)),
                _ => None,
            },
            PropType::Short => text.parse().ok().map(Self::Short),
            PropType::Int => text.parse().ok().map(Self::Int),
            PropType::Long => text.parse().ok().map(Self::Long),
            PropType::Double => text.parse().ok().map(Self::Double),
            PropType::Decimal => Decimal::from_str(text).ok().map(Self::Decimal),
            PropType::DateTime => parse_datetime(text).map(Self::DateTime),
            PropType::Guid => Uuid::parse_str(text).ok().map(Self::Guid),
            PropType::String => Some(Self::Text(text.to_string())),
            PropType::Enum { values } => values
                .iter()
                .find(|v| v.as_str() == text)
                .map(|v| Self::Text(v.clone())),
        }
    }
}

/// Parse a date/time in RFC 3339 or `YYYY-MM-DD` form.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Short(i) => write!(f, "{i}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(i) => write!(f, "{i}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Guid(u) => write!(f, "{u}"),
            Self::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i16> for PropValue {
    fn from(value: i16) -> Self {
        Self::Short(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<Decimal> for PropValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<DateTime<Utc>> for PropValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Uuid> for PropValue {
    fn from(value: Uuid) -> Self {
        Self::Guid(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

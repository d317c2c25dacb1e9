//! Property types for business object class definitions.
//!
//! This module defines `PropType`, the set of value types a mapped property
//! can declare, and `PropTypeKind`, its payload-free discriminant used as a
//! registry key by the value generators.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Declared type of a mapped property.
///
/// # YAML Format
///
/// Simple types are written as strings:
/// ```yaml
/// type: guid
/// type: int
/// type: string
/// ```
///
/// Enumerations use the object format:
/// ```yaml
/// type:
///   type: enum
///   values: [Active, Suspended, Closed]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PropType {
    /// Boolean value
    Bool,

    /// 16-bit signed integer
    Short,

    /// 32-bit signed integer
    Int,

    /// 64-bit signed integer
    Long,

    /// 64-bit IEEE 754 floating point
    Double,

    /// Exact decimal
    Decimal,

    /// UTC date and time
    DateTime,

    /// Globally unique identifier
    Guid,

    /// Unicode string
    String,

    /// Enumeration restricted to a set of named values
    Enum {
        /// Allowed values, in declaration order
        values: Vec<String>,
    },
}

/// Discriminant of a [`PropType`] without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropTypeKind {
    Bool,
    Short,
    Int,
    Long,
    Double,
    Decimal,
    DateTime,
    Guid,
    String,
    Enum,
}

impl PropType {
    /// Get the payload-free kind of this type.
    pub fn kind(&self) -> PropTypeKind {
        match self {
            Self::Bool => PropTypeKind::Bool,
            Self::Short => PropTypeKind::Short,
            Self::Int => PropTypeKind::Int,
            Self::Long => PropTypeKind::Long,
            Self::Double => PropTypeKind::Double,
            Self::Decimal => PropTypeKind::Decimal,
            Self::DateTime => PropTypeKind::DateTime,
            Self::Guid => PropTypeKind::Guid,
            Self::String => PropTypeKind::String,
            Self::Enum { .. } => PropTypeKind::Enum,
        }
    }

    /// Whether values of this type are integers of any width.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Short | Self::Int | Self::Long)
    }
}

impl PropTypeKind {
    /// All kinds, in declaration order.
    pub const ALL: [PropTypeKind; 10] = [
        PropTypeKind::Bool,
        PropTypeKind::Short,
        PropTypeKind::Int,
        PropTypeKind::Long,
        PropTypeKind::Double,
        PropTypeKind::Decimal,
        PropTypeKind::DateTime,
        PropTypeKind::Guid,
        PropTypeKind::String,
        PropTypeKind::Enum,
    ];

    /// The name used for this kind in YAML and TOML files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::DateTime => "date_time",
            Self::Guid => "guid",
            Self::String => "string",
            Self::Enum => "enum",
        }
    }

    /// Parse a kind from its file name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" | "boolean" => Some(Self::Bool),
            "short" | "small_int" => Some(Self::Short),
            "int" | "integer" => Some(Self::Int),
            "long" | "big_int" => Some(Self::Long),
            "double" => Some(Self::Double),
            "decimal" => Some(Self::Decimal),
            "date_time" | "datetime" | "date" => Some(Self::DateTime),
            "guid" | "uuid" => Some(Self::Guid),
            "string" | "text" => Some(Self::String),
            "enum" => Some(Self::Enum),
            _ => None,
        }
    }
}

impl fmt::Display for PropTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum { values } => write!(f, "enum({})", values.join("|")),
            other => f.write_str(other.kind().name()),
        }
    }
}

// Simple types serialize as strings, enumerations as maps.

impl Serialize for PropType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Self::Enum { values } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "enum")?;
                map.serialize_entry("values", values)?;
                map.end()
            }
            simple => serializer.serialize_str(simple.kind().name()),
        }
    }
}

impl<'de> Deserialize<'de> for PropType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, MapAccess, Visitor};

        struct PropTypeVisitor;

        fn simple<E: Error>(name: &str) -> Result<PropType, E> {
            match PropTypeKind::from_name(name) {
                Some(PropTypeKind::Bool) => Ok(PropType::Bool),
                Some(PropTypeKind::Short) => Ok(PropType::Short),
                Some(PropTypeKind::Int) => Ok(PropType::Int),
                Some(PropTypeKind::Long) => Ok(PropType::Long),
                Some(PropTypeKind::Double) => Ok(PropType::Double),
                Some(PropTypeKind::Decimal) => Ok(PropType::Decimal),
                Some(PropTypeKind::DateTime) => Ok(PropType::DateTime),
                Some(PropTypeKind::Guid) => Ok(PropType::Guid),
                Some(PropTypeKind::String) => Ok(PropType::String),
                Some(PropTypeKind::Enum) => Err(E::custom("enum type requires a list of values")),
                None => Err(E::custom(format!("unknown property type: {name}"))),
            }
        }

        impl<'de> Visitor<'de> for PropTypeVisitor {
            type Value = PropType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or map representing a PropType")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                simple(value)
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut type_name: Option<String> = None;
                let mut values: Option<Vec<String>> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "type" => type_name = Some(map.next_value()?),
                        "values" => values = Some(map.next_value()?),
                        other => {
                            return Err(M::Error::unknown_field(other, &["type", "values"]));
                        }
                    }
                }

                let type_name = type_name.ok_or_else(|| M::Error::missing_field("type"))?;
                if type_name == "enum" {
                    let values = values.ok_or_else(|| M::Error::missing_field("values"))?;
                    Ok(PropType::Enum { values })
                } else {
                    simple(&type_name)
                }
            }
        }

        deserializer.deserialize_any(PropTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_type_serde() {
        let parsed: PropType = serde_yaml::from_str("date_time").unwrap();
        assert_eq!(parsed, PropType::DateTime);

        let parsed: PropType = serde_yaml::from_str("uuid").unwrap();
        assert_eq!(parsed, PropType::Guid);

        let yaml = serde_yaml::to_string(&PropType::Decimal).unwrap();
        assert_eq!(yaml.trim(), "decimal");
    }

    #[test]
    fn test_enum_type_serde() {
        let parsed: PropType = serde_yaml::from_str("{ type: enum, values: [A, B] }").unwrap();
        assert_eq!(
            parsed,
            PropType::Enum {
                values: vec!["A".to_string(), "B".to_string()]
            }
        );
        assert_eq!(parsed.kind(), PropTypeKind::Enum);
    }

    #[test]
    fn test_enum_without_values_is_rejected() {
        assert!(serde_yaml::from_str::<PropType>("enum").is_err());
        assert!(serde_yaml::from_str::<PropType>("{ type: enum }").is_err());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = serde_yaml::from_str::<PropType>("money").unwrap_err();
        assert!(err.to_string().contains("unknown property type"));
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in PropTypeKind::ALL {
            assert_eq!(PropTypeKind::from_name(kind.name()), Some(kind));
        }
    }
}

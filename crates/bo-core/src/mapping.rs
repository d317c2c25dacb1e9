//! Accessor capability table.
//!
//! Typed business object wrappers expose their mapped properties through
//! getter and setter functions. An [`ObjectAccessors`] table lists those
//! functions per property and relationship so mapping testers can check
//! that every mapped slot is reachable and that values round-trip through
//! the accessors unchanged.

use crate::object::{BusinessObject, BusinessObjectError};
use crate::values::PropValue;
use std::collections::BTreeMap;

/// Reads a property through its typed accessor.
pub type Getter = fn(&BusinessObject) -> PropValue;

/// Writes a property through its typed accessor.
pub type Setter = fn(&mut BusinessObject, PropValue) -> Result<(), BusinessObjectError>;

/// Reads a single relationship through its typed accessor.
pub type RelationshipGetter = fn(&BusinessObject) -> Option<&BusinessObject>;

/// Writes a single relationship through its typed accessor.
pub type RelationshipSetter =
    fn(&mut BusinessObject, Option<BusinessObject>) -> Result<(), BusinessObjectError>;

/// Accessors exposed for one property.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyAccessor {
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
}

/// Accessors exposed for one single relationship.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipAccessor {
    pub getter: Option<RelationshipGetter>,
    pub setter: Option<RelationshipSetter>,
}

/// Capability table of a typed business object class.
#[derive(Debug, Clone)]
pub struct ObjectAccessors {
    class_name: String,
    properties: BTreeMap<String, PropertyAccessor>,
    relationships: BTreeMap<String, RelationshipAccessor>,
}

impl ObjectAccessors {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Register a read/write property.
    pub fn property(mut self, name: impl Into<String>, getter: Getter, setter: Setter) -> Self {
        self.properties.insert(
            name.into(),
            PropertyAccessor {
                getter: Some(getter),
                setter: Some(setter),
            },
        );
        self
    }

    /// Register a property with a getter only.
    pub fn read_only_property(mut self, name: impl Into<String>, getter: Getter) -> Self {
        self.properties.insert(
            name.into(),
            PropertyAccessor {
                getter: Some(getter),
                setter: None,
            },
        );
        self
    }

    /// Register a single relationship.
    pub fn relationship(
        mut self,
        name: impl Into<String>,
        getter: RelationshipGetter,
        setter: RelationshipSetter,
    ) -> Self {
        self.relationships.insert(
            name.into(),
            RelationshipAccessor {
                getter: Some(getter),
                setter: Some(setter),
            },
        );
        self
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyAccessor> {
        self.properties.get(name)
    }

    pub fn get_relationship(&self, name: &str) -> Option<&RelationshipAccessor> {
        self.relationships.get(name)
    }

    /// Names of every property with at least one accessor.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ClassDef, PropDef};
    use crate::types::PropType;
    use std::sync::Arc;

    #[test]
    fn test_accessors_reach_slots() {
        let class_def = Arc::new(
            ClassDef::new("Contact")
                .with_prop(PropDef::new("Surname", PropType::String))
                .with_prop(PropDef::new("Age", PropType::Int)),
        );
        let accessors = ObjectAccessors::new("Contact")
            .property(
                "Surname",
                |bo| bo.get_value("Surname"),
                |bo, v| bo.set_value("Surname", v),
            )
            .read_only_property("Age", |bo| bo.get_value("Age"));

        let mut bo = BusinessObject::new(class_def);
        let surname = accessors.get_property("Surname").unwrap();
        (surname.setter.unwrap())(&mut bo, PropValue::from("Smith")).unwrap();
        assert_eq!((surname.getter.unwrap())(&bo), PropValue::from("Smith"));

        let age = accessors.get_property("Age").unwrap();
        assert!(age.setter.is_none());
        assert_eq!(
            accessors.property_names().collect::<Vec<_>>(),
            vec!["Age", "Surname"]
        );
        assert!(accessors.get_property("Missing").is_none());
    }
}

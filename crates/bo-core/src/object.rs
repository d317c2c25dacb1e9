//! In-memory business object runtime.
//!
//! A [`BusinessObject`] holds one value slot per mapped property, the
//! objects of its single relationships and the children of its multiple
//! relationships. Single relationships are linked by key: setting the
//! related object copies the related key values into the owner's key
//! properties, and a relationship whose owner key properties all hold values
//! counts as set even when the related object itself is not loaded.

use crate::schema::{ClassDef, RelationshipDef};
use crate::values::PropValue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Error type for business object operations.
#[derive(Debug, thiserror::Error)]
pub enum BusinessObjectError {
    /// Property not mapped on the object's class
    #[error("Property '{prop}' is not defined on class '{class}'")]
    PropNotFound { class: String, prop: String },

    /// Relationship not mapped on the object's class
    #[error("Relationship '{relationship}' is not defined on class '{class}'")]
    RelationshipNotFound { class: String, relationship: String },

    /// Value of the wrong type for the property
    #[error("Property '{prop}' on class '{class}' expects a {expected} value, got {value}")]
    TypeMismatch {
        class: String,
        prop: String,
        expected: String,
        value: String,
    },

    /// Single-object operation on a multiple relationship
    #[error("Relationship '{relationship}' on class '{class}' is not a single relationship")]
    NotSingle { class: String, relationship: String },

    /// Collection operation on a single relationship
    #[error("Relationship '{relationship}' on class '{class}' is not a multiple relationship")]
    NotMultiple { class: String, relationship: String },

    /// Related object of the wrong class
    #[error("Relationship '{relationship}' on class '{class}' expects a '{expected}', got a '{actual}'")]
    WrongRelatedClass {
        class: String,
        relationship: String,
        expected: String,
        actual: String,
    },

    /// Object failed validation on save
    #[error("'{class}' is not valid: {}", broken_rules.join("; "))]
    Invalid {
        class: String,
        broken_rules: Vec<String>,
    },
}

/// Persistence status of a business object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectStatus {
    /// Never saved
    pub is_new: bool,
    /// Changed since the last save
    pub is_dirty: bool,
}

impl Default for ObjectStatus {
    fn default() -> Self {
        Self {
            is_new: true,
            is_dirty: false,
        }
    }
}

/// A mapped object with one value slot per property.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessObject {
    #[serde(skip)]
    class_def: Arc<ClassDef>,

    #[serde(rename = "class")]
    class_name: String,

    id: Uuid,

    props: BTreeMap<String, PropValue>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    related: BTreeMap<String, Box<BusinessObject>>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, Vec<BusinessObject>>,

    #[serde(skip)]
    status: ObjectStatus,
}

impl BusinessObject {
    /// Create a new object with every property at its declared default.
    pub fn new(class_def: Arc<ClassDef>) -> Self {
        Self::with_id(class_def, Uuid::new_v4())
    }

    /// Create a new object with a given identity.
    pub fn with_id(class_def: Arc<ClassDef>, id: Uuid) -> Self {
        let props = class_def
            .props
            .iter()
            .map(|p| (p.name.clone(), p.default_value()))
            .collect();
        Self {
            class_name: class_def.name.clone(),
            class_def,
            id,
            props,
            related: BTreeMap::new(),
            children: BTreeMap::new(),
            status: ObjectStatus::default(),
        }
    }

    pub fn class_def(&self) -> &Arc<ClassDef> {
        &self.class_def
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Object identity, stable across saves.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> ObjectStatus {
        self.status
    }

    /// Get the value slot of a property.
    pub fn value(&self, prop: &str) -> Option<&PropValue> {
        self.props.get(prop)
    }

    /// Get a copy of a property value, null when the property is not mapped.
    pub fn get_value(&self, prop: &str) -> PropValue {
        self.props.get(prop).cloned().unwrap_or_default()
    }

    /// Write a property value slot.
    pub fn set_value(
        &mut self,
        prop: &str,
        value: impl Into<PropValue>,
    ) -> Result<(), BusinessObjectError> {
        let value = value.into();
        let prop_def =
            self.class_def
                .get_prop(prop)
                .ok_or_else(|| BusinessObjectError::PropNotFound {
                    class: self.class_name.clone(),
                    prop: prop.to_string(),
                })?;
        if !value.fits(&prop_def.prop_type) {
            return Err(BusinessObjectError::TypeMismatch {
                class: self.class_name.clone(),
                prop: prop.to_string(),
                expected: prop_def.prop_type.to_string(),
                value: value.to_string(),
            });
        }
        let slot = self.props.entry(prop.to_string()).or_default();
        if *slot != value {
            *slot = value;
            self.status.is_dirty = true;
        }
        Ok(())
    }

    fn single_def(&self, relationship: &str) -> Result<RelationshipDef, BusinessObjectError> {
        let rel = self.relationship_def(relationship)?;
        if !rel.is_single() {
            return Err(BusinessObjectError::NotSingle {
                class: self.class_name.clone(),
                relationship: relationship.to_string(),
            });
        }
        Ok(rel)
    }

    fn multiple_def(&self, relationship: &str) -> Result<RelationshipDef, BusinessObjectError> {
        let rel = self.relationship_def(relationship)?;
        if !rel.is_multiple() {
            return Err(BusinessObjectError::NotMultiple {
                class: self.class_name.clone(),
                relationship: relationship.to_string(),
            });
        }
        Ok(rel)
    }

    fn relationship_def(&self, relationship: &str) -> Result<RelationshipDef, BusinessObjectError> {
        self.class_def
            .get_relationship(relationship)
            .cloned()
            .ok_or_else(|| BusinessObjectError::RelationshipNotFound {
                class: self.class_name.clone(),
                relationship: relationship.to_string(),
            })
    }

    /// Get the loaded object of a single relationship.
    pub fn related(&self, relationship: &str) -> Option<&BusinessObject> {
        self.related.get(relationship).map(|b| b.as_ref())
    }

    /// Set or clear the object of a single relationship.
    ///
    /// The owner's key properties take the related object's key values, or
    /// null when the relationship is cleared.
    pub fn set_related(
        &mut self,
        relationship: &str,
        related: Option<BusinessObject>,
    ) -> Result<(), BusinessObjectError> {
        let rel = self.single_def(relationship)?;
        match related {
            Some(related) => {
                if related.class_name != rel.related_class {
                    return Err(BusinessObjectError::WrongRelatedClass {
                        class: self.class_name.clone(),
                        relationship: relationship.to_string(),
                        expected: rel.related_class.clone(),
                        actual: related.class_name.clone(),
                    });
                }
                for rel_prop in &rel.rel_props {
                    self.set_value(&rel_prop.owner, related.get_value(&rel_prop.related))?;
                }
                self.related.insert(relationship.to_string(), Box::new(related));
            }
            None => {
                for rel_prop in &rel.rel_props {
                    self.set_value(&rel_prop.owner, PropValue::Null)?;
                }
                self.related.remove(relationship);
            }
        }
        self.status.is_dirty = true;
        Ok(())
    }

    /// Whether a single relationship is set, either by a loaded object or by
    /// non-null owner key properties.
    pub fn is_relationship_set(&self, relationship: &str) -> bool {
        if self.related.contains_key(relationship) {
            return true;
        }
        match self.class_def.get_relationship(relationship) {
            Some(rel) if !rel.rel_props.is_empty() => rel
                .rel_props
                .iter()
                .all(|rp| !self.get_value(&rp.owner).is_null()),
            _ => false,
        }
    }

    /// Children of a multiple relationship.
    pub fn children(&self, relationship: &str) -> &[BusinessObject] {
        self.children
            .get(relationship)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Add a child to a multiple relationship.
    ///
    /// The child's key properties take the owner's key values.
    pub fn add_child(
        &mut self,
        relationship: &str,
        mut child: BusinessObject,
    ) -> Result<(), BusinessObjectError> {
        let rel = self.multiple_def(relationship)?;
        if child.class_name != rel.related_class {
            return Err(BusinessObjectError::WrongRelatedClass {
                class: self.class_name.clone(),
                relationship: relationship.to_string(),
                expected: rel.related_class.clone(),
                actual: child.class_name.clone(),
            });
        }
        link_child(self, &rel, &mut child)?;
        self.children
            .entry(relationship.to_string())
            .or_default()
            .push(child);
        self.status.is_dirty = true;
        Ok(())
    }

    /// Mutable access to every loaded single-relationship object.
    pub fn related_objects_mut(&mut self) -> impl Iterator<Item = &mut BusinessObject> {
        self.related.values_mut().map(|b| b.as_mut())
    }

    /// Re-copy owner key values into every child and hand out mutable access.
    ///
    /// Used when saving: the owner's keys may have changed after the
    /// children were added.
    pub fn relinked_children_mut(
        &mut self,
    ) -> Result<Vec<&mut BusinessObject>, BusinessObjectError> {
        let owner_values: BTreeMap<String, Vec<(String, PropValue)>> = self
            .class_def
            .multiple_relationships()
            .map(|rel| {
                let values = rel
                    .rel_props
                    .iter()
                    .map(|rp| (rp.related.clone(), self.get_value(&rp.owner)))
                    .collect();
                (rel.name.clone(), values)
            })
            .collect();

        let mut out = Vec::new();
        for (name, children) in self.children.iter_mut() {
            let values = owner_values.get(name).cloned().unwrap_or_default();
            for child in children.iter_mut() {
                for (related_prop, value) in &values {
                    child.set_value(related_prop, value.clone())?;
                }
                out.push(child);
            }
        }
        Ok(out)
    }

    /// Messages for every rule the object currently breaks.
    pub fn broken_rules(&self) -> Vec<String> {
        let mut broken = Vec::new();
        for prop in &self.class_def.props {
            broken.extend(prop.broken_rules(&self.get_value(&prop.name)));
        }
        for rel in self.class_def.single_relationships() {
            if rel.compulsory && !self.is_relationship_set(&rel.name) {
                broken.push(format!(
                    "relationship '{}' on '{}' is compulsory and is not set",
                    rel.name, self.class_name
                ));
            }
        }
        for rule in &self.class_def.inter_prop_rules {
            let left = self.get_value(&rule.left);
            let right = self.get_value(&rule.right);
            if !rule.is_satisfied_by(&left, &right) {
                broken.push(format!(
                    "'{}' on '{}' requires {} {} {} but {left} {} {right} does not hold",
                    rule.name.as_deref().unwrap_or("inter-property rule"),
                    self.class_name,
                    rule.left,
                    rule.operator.symbol(),
                    rule.right,
                    rule.operator.symbol(),
                ));
            }
        }
        broken
    }

    pub fn is_valid(&self) -> bool {
        self.broken_rules().is_empty()
    }

    /// Mark the object as persisted: not new and not dirty.
    pub fn mark_persisted(&mut self) {
        self.status = ObjectStatus {
            is_new: false,
            is_dirty: false,
        };
    }
}

fn link_child(
    owner: &BusinessObject,
    rel: &RelationshipDef,
    child: &mut BusinessObject,
) -> Result<(), BusinessObjectError> {
    for rel_prop in &rel.rel_props {
        child.set_value(&rel_prop.related, owner.get_value(&rel_prop.owner))?;
    }
    Ok(())
}

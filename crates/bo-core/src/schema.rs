//! Class definitions for mapped business objects.
//!
//! ## Type Hierarchy
//!
//! - `PropDef` - one mapped property with its type, rules and lookup list
//! - `RelationshipDef` - a single or multiple relationship to another class
//! - `KeyDef` - a unique constraint over one or more properties
//! - `ClassDef` - one mapped class
//! - `ClassDefCol` - every class definition loaded for a test run
//!
//! Definitions are loaded from YAML or assembled in code with the builder
//! methods on each type.

use crate::rules::{InterPropRule, PropRule, RuleBounds};
use crate::types::PropType;
use crate::values::PropValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for class definition operations.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// Error reading a class definition file
    #[error("Failed to read class definition file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Class not found in the loaded definitions
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// Property not found in a class definition
    #[error("Property '{prop}' not found in class '{class}'")]
    PropNotFound { class: String, prop: String },

    /// Relationship not found in a class definition
    #[error("Relationship '{relationship}' not found in class '{class}'")]
    RelationshipNotFound { class: String, relationship: String },
}

// ============================================================================
// Enumerations
// ============================================================================

/// When a property may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadWriteRule {
    #[default]
    ReadWrite,
    ReadOnly,
    WriteOnly,
    WriteOnce,
    WriteNew,
    WriteNotNew,
}

/// Number of objects on the far side of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Single,
    Multiple,
}

/// Ownership semantics of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    #[default]
    Association,
    Aggregation,
    Composition,
}

/// What happens to related objects when the owner is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteParentAction {
    DeleteRelated,
    DereferenceRelated,
    Prevent,
    #[default]
    DoNothing,
}

// ============================================================================
// Lookup Lists
// ============================================================================

/// One entry of a simple lookup list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupItem {
    /// Text shown to users
    pub display: String,
    /// Stored value, parsed into the property type
    pub value: String,
}

impl LookupItem {
    pub fn new(display: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            value: value.into(),
        }
    }
}

/// Source of the legal values of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupList {
    /// Fixed list of display/value pairs
    Simple {
        #[serde(default)]
        items: Vec<LookupItem>,
    },

    /// Every persisted object of another class; the stored value is its id
    BusinessObject { class_name: String },
}

// ============================================================================
// Property Definitions
// ============================================================================

/// Mapped property definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropDef {
    /// Property name
    pub name: String,

    /// Owning class name (filled in when the class definition is assembled)
    #[serde(skip)]
    pub class_name: String,

    /// Declared value type
    #[serde(rename = "type")]
    pub prop_type: PropType,

    /// Whether the owning object is invalid while this property is null
    #[serde(default)]
    pub compulsory: bool,

    /// When the property may be written
    #[serde(default)]
    pub read_write: ReadWriteRule,

    /// Default value as text, parsed into `prop_type`
    #[serde(default)]
    pub default: Option<String>,

    /// Validation rules
    #[serde(default)]
    pub rules: Vec<PropRule>,

    /// Lookup list restricting the legal values
    #[serde(default)]
    pub lookup_list: Option<LookupList>,
}

impl PropDef {
    /// Create a new non-compulsory property definition.
    pub fn new(name: impl Into<String>, prop_type: PropType) -> Self {
        Self {
            name: name.into(),
            class_name: String::new(),
            prop_type,
            compulsory: false,
            read_write: ReadWriteRule::default(),
            default: None,
            rules: Vec::new(),
            lookup_list: None,
        }
    }

    /// Mark the property compulsory.
    pub fn compulsory(mut self) -> Self {
        self.compulsory = true;
        self
    }

    /// Attach a validation rule.
    pub fn with_rule(mut self, rule: PropRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the default value text.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the read/write rule.
    pub fn with_read_write_rule(mut self, rule: ReadWriteRule) -> Self {
        self.read_write = rule;
        self
    }

    /// Attach a lookup list.
    pub fn with_lookup_list(mut self, lookup_list: LookupList) -> Self {
        self.lookup_list = Some(lookup_list);
        self
    }

    /// The default value parsed into the property type, or null.
    pub fn default_value(&self) -> PropValue {
        self.default
            .as_deref()
            .and_then(|text| PropValue::parse_as(text, &self.prop_type))
            .unwrap_or(PropValue::Null)
    }

    /// Intersection of all attached rules.
    pub fn rule_bounds(&self) -> RuleBounds {
        RuleBounds::from_rules(&self.rules)
    }

    /// Messages for every rule the given value breaks.
    pub fn broken_rules(&self, value: &PropValue) -> Vec<String> {
        let mut broken = Vec::new();
        if self.compulsory && value.is_null() {
            broken.push(format!(
                "'{}' on '{}' is compulsory and has no value",
                self.name, self.class_name
            ));
            return broken;
        }
        if !value.fits(&self.prop_type) {
            broken.push(format!(
                "'{}' on '{}' expects a {} value but holds {value}",
                self.name, self.class_name, self.prop_type
            ));
            return broken;
        }
        for rule in &self.rules {
            if !rule.is_satisfied_by(value) {
                broken.push(format!(
                    "'{}' on '{}' must be a {} but is {value}",
                    self.name,
                    self.class_name,
                    rule.describe()
                ));
            }
        }
        if let (Some(LookupList::Simple { items }), false) = (&self.lookup_list, value.is_null()) {
            let listed = items
                .iter()
                .filter_map(|item| PropValue::parse_as(&item.value, &self.prop_type))
                .any(|listed| &listed == value);
            if !items.is_empty() && !listed {
                broken.push(format!(
                    "'{}' on '{}' holds {value} which is not in its lookup list",
                    self.name, self.class_name
                ));
            }
        }
        broken
    }
}

// ============================================================================
// Relationship Definitions
// ============================================================================

/// Pair of properties linking an owner to its related object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelPropDef {
    /// Property on the owning class
    pub owner: String,
    /// Property on the related class
    pub related: String,
}

/// Relationship between two mapped classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDef {
    /// Relationship name
    pub name: String,

    /// Owning class name (filled in when the class definition is assembled)
    #[serde(skip)]
    pub owner_class: String,

    /// Class on the far side
    pub related_class: String,

    /// Single or multiple
    pub cardinality: Cardinality,

    /// Whether the owner is invalid while a single relationship is unset
    #[serde(default)]
    pub compulsory: bool,

    /// Association, aggregation or composition
    #[serde(default)]
    pub relationship_type: RelationshipType,

    /// Action on related objects when the owner is deleted
    #[serde(default)]
    pub delete_parent_action: DeleteParentAction,

    /// Key properties linking owner and related object
    #[serde(default)]
    pub rel_props: Vec<RelPropDef>,

    /// Name of the relationship pointing back from the related class
    #[serde(default)]
    pub reverse: Option<String>,

    /// When the relationship may be written
    #[serde(default)]
    pub read_write: ReadWriteRule,
}

impl RelationshipDef {
    /// Create a single relationship.
    pub fn single(name: impl Into<String>, related_class: impl Into<String>) -> Self {
        Self::new(name, related_class, Cardinality::Single)
    }

    /// Create a multiple relationship.
    pub fn multiple(name: impl Into<String>, related_class: impl Into<String>) -> Self {
        Self::new(name, related_class, Cardinality::Multiple)
    }

    fn new(
        name: impl Into<String>,
        related_class: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            owner_class: String::new(),
            related_class: related_class.into(),
            cardinality,
            compulsory: false,
            relationship_type: RelationshipType::default(),
            delete_parent_action: DeleteParentAction::default(),
            rel_props: Vec::new(),
            reverse: None,
            read_write: ReadWriteRule::default(),
        }
    }

    /// Mark the relationship compulsory.
    pub fn compulsory(mut self) -> Self {
        self.compulsory = true;
        self
    }

    /// Add an owner/related key property pair.
    pub fn with_rel_prop(mut self, owner: impl Into<String>, related: impl Into<String>) -> Self {
        self.rel_props.push(RelPropDef {
            owner: owner.into(),
            related: related.into(),
        });
        self
    }

    pub fn with_relationship_type(mut self, relationship_type: RelationshipType) -> Self {
        self.relationship_type = relationship_type;
        self
    }

    pub fn with_delete_parent_action(mut self, action: DeleteParentAction) -> Self {
        self.delete_parent_action = action;
        self
    }

    pub fn with_reverse(mut self, reverse: impl Into<String>) -> Self {
        self.reverse = Some(reverse.into());
        self
    }

    pub fn is_single(&self) -> bool {
        self.cardinality == Cardinality::Single
    }

    pub fn is_multiple(&self) -> bool {
        self.cardinality == Cardinality::Multiple
    }
}

/// Unique constraint over a set of properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDef {
    pub name: String,
    pub props: Vec<String>,
}

// ============================================================================
// SingleValueDef
// ============================================================================

/// Anything that holds one value on an object: a property or a single
/// relationship.
pub trait SingleValueDef {
    fn property_name(&self) -> &str;
    fn class_name(&self) -> &str;
    fn compulsory(&self) -> bool;
    fn read_write_rule(&self) -> ReadWriteRule;

    /// Whether the value is a related object rather than a property value.
    fn is_relationship(&self) -> bool {
        false
    }
}

impl SingleValueDef for PropDef {
    fn property_name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn compulsory(&self) -> bool {
        self.compulsory
    }

    fn read_write_rule(&self) -> ReadWriteRule {
        self.read_write
    }
}

impl SingleValueDef for RelationshipDef {
    fn property_name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &str {
        &self.owner_class
    }

    fn compulsory(&self) -> bool {
        self.compulsory
    }

    fn read_write_rule(&self) -> ReadWriteRule {
        self.read_write
    }

    fn is_relationship(&self) -> bool {
        true
    }
}

// ============================================================================
// Class Definitions
// ============================================================================

/// Mapped class definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Class name
    pub name: String,

    /// Property definitions
    #[serde(default)]
    pub props: Vec<PropDef>,

    /// Unique constraints
    #[serde(default)]
    pub keys: Vec<KeyDef>,

    /// Relationships to other classes
    #[serde(default)]
    pub relationships: Vec<RelationshipDef>,

    /// Comparisons between properties of the same object
    #[serde(default)]
    pub inter_prop_rules: Vec<InterPropRule>,
}

impl ClassDef {
    /// Create an empty class definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
            keys: Vec::new(),
            relationships: Vec::new(),
            inter_prop_rules: Vec::new(),
        }
    }

    /// Add a property definition.
    pub fn with_prop(mut self, mut prop: PropDef) -> Self {
        prop.class_name = self.name.clone();
        self.props.push(prop);
        self
    }

    /// Add a relationship definition.
    pub fn with_relationship(mut self, mut relationship: RelationshipDef) -> Self {
        relationship.owner_class = self.name.clone();
        self.relationships.push(relationship);
        self
    }

    /// Add a unique constraint.
    pub fn with_key(mut self, name: impl Into<String>, props: &[&str]) -> Self {
        self.keys.push(KeyDef {
            name: name.into(),
            props: props.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    /// Add an inter-property rule.
    pub fn with_inter_prop_rule(mut self, rule: InterPropRule) -> Self {
        self.inter_prop_rules.push(rule);
        self
    }

    /// Stamp the owning class name onto every property and relationship.
    fn stamp_owner(&mut self) {
        for prop in &mut self.props {
            prop.class_name = self.name.clone();
        }
        for relationship in &mut self.relationships {
            relationship.owner_class = self.name.clone();
        }
    }

    /// Get a property definition by name.
    pub fn get_prop(&self, name: &str) -> Option<&PropDef> {
        self.props.iter().find(|p| p.name == name)
    }

    /// Get a relationship definition by name.
    pub fn get_relationship(&self, name: &str) -> Option<&RelationshipDef> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Get a property definition, failing with a descriptive error.
    pub fn prop(&self, name: &str) -> Result<&PropDef, DefinitionError> {
        self.get_prop(name)
            .ok_or_else(|| DefinitionError::PropNotFound {
                class: self.name.clone(),
                prop: name.to_string(),
            })
    }

    /// Get a relationship definition, failing with a descriptive error.
    pub fn relationship(&self, name: &str) -> Result<&RelationshipDef, DefinitionError> {
        self.get_relationship(name)
            .ok_or_else(|| DefinitionError::RelationshipNotFound {
                class: self.name.clone(),
                relationship: name.to_string(),
            })
    }

    /// Single relationships, in declaration order.
    pub fn single_relationships(&self) -> impl Iterator<Item = &RelationshipDef> {
        self.relationships.iter().filter(|r| r.is_single())
    }

    /// Multiple relationships, in declaration order.
    pub fn multiple_relationships(&self) -> impl Iterator<Item = &RelationshipDef> {
        self.relationships.iter().filter(|r| r.is_multiple())
    }

    /// Whether the given property names form one of the declared unique constraints.
    pub fn has_unique_constraint(&self, props: &[&str]) -> bool {
        self.keys.iter().any(|key| {
            key.props.len() == props.len() && props.iter().all(|p| key.props.iter().any(|k| k == p))
        })
    }

    /// Whether the property is an owner-side key of a compulsory single relationship.
    pub fn is_compulsory_relationship_key(&self, prop: &str) -> bool {
        self.single_relationships()
            .filter(|r| r.compulsory)
            .any(|r| r.rel_props.iter().any(|rp| rp.owner == prop))
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct ClassDefFile {
    #[serde(default = "default_version")]
    #[allow(dead_code)]
    version: u32,

    #[serde(default)]
    classes: Vec<ClassDef>,
}

/// Every class definition loaded for a test run.
#[derive(Debug, Clone, Default)]
pub struct ClassDefCol {
    classes: Vec<Arc<ClassDef>>,
    class_map: HashMap<String, usize>,
}

impl ClassDefCol {
    /// Create a collection from class definitions.
    pub fn new(classes: Vec<ClassDef>) -> Self {
        let mut col = Self::default();
        for class in classes {
            col.add(class);
        }
        col
    }

    /// Load class definitions from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DefinitionError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse class definitions from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DefinitionError> {
        let file: ClassDefFile = serde_yaml::from_str(yaml)?;
        Ok(Self::new(file.classes))
    }

    /// Add or replace a class definition.
    pub fn add(&mut self, mut class: ClassDef) {
        class.stamp_owner();
        let class = Arc::new(class);
        match self.class_map.get(&class.name) {
            Some(&idx) => self.classes[idx] = class,
            None => {
                self.class_map.insert(class.name.clone(), self.classes.len());
                self.classes.push(class);
            }
        }
    }

    /// Get a class definition by name.
    pub fn get(&self, name: &str) -> Option<Arc<ClassDef>> {
        self.class_map
            .get(name)
            .and_then(|&idx| self.classes.get(idx))
            .cloned()
    }

    /// Get a class definition, failing with a descriptive error.
    pub fn class(&self, name: &str) -> Result<Arc<ClassDef>, DefinitionError> {
        self.get(name)
            .ok_or_else(|| DefinitionError::ClassNotFound(name.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// All class names, in load order.
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassDef>> {
        self.classes.iter()
    }

    /// Report definition problems that would break generation or testing.
    pub fn check(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for class in &self.classes {
            for prop in &class.props {
                for rule in &prop.rules {
                    if !rule.applies_to(&prop.prop_type) {
                        problems.push(format!(
                            "{}.{}: {} rule does not apply to a {} property",
                            class.name,
                            prop.name,
                            rule.kind_name(),
                            prop.prop_type
                        ));
                    }
                    if let PropRule::String {
                        pattern: Some(pattern),
                        ..
                    } = rule
                    {
                        if pattern.is_empty() {
                            problems.push(format!("{}.{}: empty pattern", class.name, prop.name));
                        } else if let Err(e) = regex::Regex::new(pattern) {
                            problems.push(format!(
                                "{}.{}: invalid pattern /{pattern}/: {e}",
                                class.name, prop.name
                            ));
                        }
                    }
                }
                if let Some(default) = &prop.default {
                    if PropValue::parse_as(default, &prop.prop_type).is_none() {
                        problems.push(format!(
                            "{}.{}: default '{default}' is not a valid {}",
                            class.name, prop.name, prop.prop_type
                        ));
                    }
                }
                if let Some(LookupList::BusinessObject { class_name }) = &prop.lookup_list {
                    if self.get(class_name).is_none() {
                        problems.push(format!(
                            "{}.{}: lookup list class '{class_name}' is not defined",
                            class.name, prop.name
                        ));
                    }
                }
            }

            for key in &class.keys {
                for prop in &key.props {
                    if class.get_prop(prop).is_none() {
                        problems.push(format!(
                            "{}: key '{}' names undefined property '{prop}'",
                            class.name, key.name
                        ));
                    }
                }
            }

            for relationship in &class.relationships {
                let related = self.get(&relationship.related_class);
                if related.is_none() {
                    problems.push(format!(
                        "{}.{}: related class '{}' is not defined",
                        class.name, relationship.name, relationship.related_class
                    ));
                }
                for rel_prop in &relationship.rel_props {
                    if class.get_prop(&rel_prop.owner).is_none() {
                        problems.push(format!(
                            "{}.{}: owner property '{}' is not defined",
                            class.name, relationship.name, rel_prop.owner
                        ));
                    }
                    if let Some(related) = &related {
                        if related.get_prop(&rel_prop.related).is_none() {
                            problems.push(format!(
                                "{}.{}: related property '{}.{}' is not defined",
                                class.name, relationship.name, related.name, rel_prop.related
                            ));
                        }
                    }
                }
            }

            for rule in &class.inter_prop_rules {
                for side in [&rule.left, &rule.right] {
                    if class.get_prop(side).is_none() {
                        problems.push(format!(
                            "{}: inter-property rule '{rule}' names undefined property '{side}'",
                            class.name
                        ));
                    }
                }
            }
        }
        problems
    }
}

// ============================================================================
// Tests
// ============================================================================

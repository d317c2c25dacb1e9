//! Core types for the bo-testability toolkit.
//!
//! This crate provides the business object model that the value generators,
//! test factories and testers work against:
//!
//! - [`PropType`] / [`PropValue`] - declared property types and slot values
//! - [`PropRule`] / [`InterPropRule`] - property and inter-property rules
//! - [`ClassDef`] / [`ClassDefCol`] - class definitions loaded from YAML
//! - [`BusinessObject`] - the in-memory object runtime
//! - [`DataAccessor`] - the persistence seam, with an in-memory implementation
//! - [`ObjectAccessors`] - getter/setter capability tables for typed wrappers
//!
//! # Architecture
//!
//! ```text
//! bo-core (this crate)
//!    │
//!    ├─── bo-generator  (valid value generators per property type)
//!    │       │
//!    │       └─── bo-factory  (test factories, default value registry)
//!    │
//!    └─── bo-tester     (definition and mapping assertions)
//! ```
//!
//! # Example
//!
//! ```rust
//! use bo_core::{BusinessObject, ClassDef, PropDef, PropType, PropValue};
//! use std::sync::Arc;
//!
//! let class_def = Arc::new(
//!     ClassDef::new("Contact").with_prop(PropDef::new("Surname", PropType::String).compulsory()),
//! );
//! let mut contact = BusinessObject::new(class_def);
//! assert!(!contact.is_valid());
//!
//! contact.set_value("Surname", "Smith").unwrap();
//! assert!(contact.is_valid());
//! assert_eq!(contact.get_value("Surname"), PropValue::from("Smith"));
//! ```

pub mod accessor;
pub mod mapping;
pub mod object;
pub mod rules;
pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use accessor::{DataAccessor, InMemoryDataAccessor};
pub use mapping::{
    Getter, ObjectAccessors, PropertyAccessor, RelationshipAccessor, RelationshipGetter,
    RelationshipSetter, Setter,
};
pub use object::{BusinessObject, BusinessObjectError, ObjectStatus};
pub use rules::{pattern_matches, ComparisonOperator, InterPropRule, PropRule, RuleBounds};
pub use schema::{
    Cardinality, ClassDef, ClassDefCol, DefinitionError, DeleteParentAction, KeyDef, LookupItem,
    LookupList, PropDef, ReadWriteRule, RelPropDef, RelationshipDef, RelationshipType,
    SingleValueDef,
};
pub use types::{PropType, PropTypeKind};
pub use values::{parse_datetime, PropValue};

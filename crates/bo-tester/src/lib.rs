//! Assertions over business object class definitions and accessor mappings.
//!
//! Each tester wraps one artifact and returns `Result<(), AssertionFailure>`
//! from every check, so tests can `?` through a batch of assertions or
//! `unwrap()` them one by one. Failures name the property or relationship,
//! the owning class and what was expected against what was found.
//!
//! # Example
//!
//! ```rust
//! use bo_core::{ClassDef, ClassDefCol, ObjectAccessors, PropDef, PropType};
//! use bo_factory::TestContext;
//! use bo_tester::BOTester;
//!
//! let class_defs = ClassDefCol::new(vec![ClassDef::new("Contact")
//!     .with_prop(PropDef::new("Surname", PropType::String).compulsory())]);
//! let accessors = ObjectAccessors::new("Contact").property(
//!     "Surname",
//!     |bo| bo.get_value("Surname"),
//!     |bo, v| bo.set_value("Surname", v),
//! );
//!
//! let tester = BOTester::for_class(&class_defs, "Contact")
//!     .unwrap()
//!     .with_accessors(accessors);
//! tester.should_be_compulsory("Surname").unwrap();
//!
//! let mut ctx = TestContext::new(class_defs);
//! tester.should_have_all_props_mapped(&mut ctx).unwrap();
//! ```

pub mod bo_prop;
pub mod bo_tester;
pub mod error;
pub mod prop_def;
pub mod relationship;
pub mod single_value;

pub use bo_prop::BOPropTester;
pub use bo_tester::BOTester;
pub use error::AssertionFailure;
pub use prop_def::PropDefTester;
pub use relationship::{MultipleRelDefTester, SingleRelDefTester};
pub use single_value::SingleValueTester;

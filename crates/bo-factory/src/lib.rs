//! Test factories for business objects.
//!
//! A [`TestContext`] owns everything a test needs: the class definitions, the
//! generator, default-value and factory registries, a data accessor and a
//! seeded random source. [`BOTestFactory`] uses it to build objects in one
//! of three states:
//!
//! - default: every property at its declared default
//! - valid: compulsory properties and relationships filled, every rule holding
//! - saved: valid, then persisted with everything it references
//!
//! # Example
//!
//! ```rust
//! use bo_core::{ClassDef, ClassDefCol, PropDef, PropType};
//! use bo_factory::TestContext;
//!
//! let class_defs = ClassDefCol::new(vec![ClassDef::new("Foo")
//!     .with_prop(PropDef::new("Name", PropType::String).compulsory())
//!     .with_prop(PropDef::new("Nickname", PropType::String))]);
//! let mut ctx = TestContext::new(class_defs);
//!
//! let foo = ctx.create_saved("Foo").unwrap();
//! assert!(!foo.get_value("Name").is_null());
//! assert!(foo.get_value("Nickname").is_null());
//! assert!(!foo.status().is_new);
//! ```

pub mod config;
pub mod context;
pub mod defaults;
pub mod error;
pub mod factory;
pub mod registry;

pub use config::FactoryConfig;
pub use context::TestContext;
pub use defaults::{BODefaultValueRegistry, PinnedValue};
pub use error::FactoryError;
pub use factory::BOTestFactory;
pub use registry::{BOTestFactoryRegistry, FactoryConstructor, TestFactoryType};

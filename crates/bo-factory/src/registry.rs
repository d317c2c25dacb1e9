//! Per-class resolution of specialised test factories.
//!
//! A class may have a registered factory instance or a registered
//! constructor; the last registration wins whichever form it takes. Classes
//! with neither get the generic [`BOTestFactory`].

use crate::context::lookup_class;
use crate::error::FactoryError;
use crate::factory::BOTestFactory;
use bo_core::{ClassDef, ClassDefCol};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds a specialised factory from the class definition.
pub type FactoryConstructor = fn(Arc<ClassDef>) -> Result<BOTestFactory, FactoryError>;

/// A specialised factory for one class.
///
/// ```rust
/// use bo_factory::{BOTestFactory, FactoryError, TestFactoryType};
/// use bo_core::ClassDef;
/// use std::sync::Arc;
///
/// struct ActiveCustomerFactory;
///
/// impl TestFactoryType for ActiveCustomerFactory {
///     const CLASS_NAME: &'static str = "Customer";
///
///     fn build(class_def: Arc<ClassDef>) -> Result<BOTestFactory, FactoryError> {
///         BOTestFactory::new(class_def).set_value_for("Active", true)
///     }
/// }
/// ```
pub trait TestFactoryType {
    const CLASS_NAME: &'static str;

    fn build(class_def: Arc<ClassDef>) -> Result<BOTestFactory, FactoryError>;
}

#[derive(Clone)]
enum Registration {
    Constructor(FactoryConstructor),
    Instance(Box<BOTestFactory>),
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor(_) => f.write_str("Constructor"),
            Self::Instance(factory) => write!(f, "Instance({})", factory.class_name()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BOTestFactoryRegistry {
    entries: HashMap<String, Registration>,
}

impl BOTestFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a specialised factory type.
    pub fn register<F: TestFactoryType>(&mut self) {
        debug!("Registering test factory for '{}'", F::CLASS_NAME);
        self.entries.insert(
            F::CLASS_NAME.to_string(),
            Registration::Constructor(F::build),
        );
    }

    /// Register a constructor function for a class.
    pub fn register_with(
        &mut self,
        class_name: &str,
        constructor: FactoryConstructor,
    ) -> Result<(), FactoryError> {
        let class_name = checked_class_name(class_name)?;
        debug!("Registering test factory constructor for '{}'", class_name);
        self.entries
            .insert(class_name.to_string(), Registration::Constructor(constructor));
        Ok(())
    }

    /// Register a configured factory; resolving its class returns a copy.
    pub fn register_instance(&mut self, factory: BOTestFactory) {
        debug!("Registering test factory instance for '{}'", factory.class_name());
        self.entries.insert(
            factory.class_name().to_string(),
            Registration::Instance(Box::new(factory)),
        );
    }

    pub fn is_registered(&self, class_name: &str) -> bool {
        self.entries.contains_key(class_name)
    }

    /// The factory for a class: a copy of a registered instance, else one
    /// built by a registered constructor, else the generic factory.
    pub fn resolve(
        &self,
        class_name: &str,
        class_defs: &ClassDefCol,
    ) -> Result<BOTestFactory, FactoryError> {
        let class_name = checked_class_name(class_name)?;
        let class_def = lookup_class(class_defs, class_name)?;
        match self.entries.get(class_name) {
            Some(Registration::Instance(factory)) => Ok(factory.as_ref().clone()),
            Some(Registration::Constructor(constructor)) => constructor(class_def),
            None => Ok(BOTestFactory::new(class_def)),
        }
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

fn checked_class_name(class_name: &str) -> Result<&str, FactoryError> {
    let class_name = class_name.trim();
    if class_name.is_empty() {
        return Err(FactoryError::Config(
            "no class name given for the test factory".to_string(),
        ));
    }
    Ok(class_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_core::{PropDef, PropType, PropValue};

    fn defs() -> ClassDefCol {
        ClassDefCol::new(vec![ClassDef::new("Customer")
            .with_prop(PropDef::new("Name", PropType::String).compulsory())
            .with_prop(PropDef::new("Tier", PropType::String))])
    }

    struct GoldCustomerFactory;

    impl TestFactoryType for GoldCustomerFactory {
        const CLASS_NAME: &'static str = "Customer";

        fn build(class_def: Arc<ClassDef>) -> Result<BOTestFactory, FactoryError> {
            BOTestFactory::new(class_def).set_value_for("Tier", "gold")
        }
    }

    fn silver(class_def: Arc<ClassDef>) -> Result<BOTestFactory, FactoryError> {
        BOTestFactory::new(class_def).set_value_for("Tier", "silver")
    }

    fn tier(factory: &BOTestFactory) -> PropValue {
        factory.defaults().resolve_value("Tier")
    }

    #[test]
    fn test_generic_fallback() {
        let registry = BOTestFactoryRegistry::new();
        let factory = registry.resolve("Customer", &defs()).unwrap();
        assert_eq!(factory.class_name(), "Customer");
        assert!(factory.defaults().is_empty());
    }

    #[test]
    fn test_registered_type() {
        let mut registry = BOTestFactoryRegistry::new();
        registry.register::<GoldCustomerFactory>();
        let factory = registry.resolve("Customer", &defs()).unwrap();
        assert_eq!(tier(&factory), PropValue::from("gold"));
    }

    #[test]
    fn test_last_registration_wins_across_forms() {
        let defs = defs();
        let mut registry = BOTestFactoryRegistry::new();
        registry.register::<GoldCustomerFactory>();
        registry.register_with("Customer", silver).unwrap();
        assert_eq!(
            tier(&registry.resolve("Customer", &defs).unwrap()),
            PropValue::from("silver")
        );

        let bronze = BOTestFactory::for_class(&defs, "Customer")
            .unwrap()
            .set_value_for("Tier", "bronze")
            .unwrap();
        registry.register_instance(bronze);
        assert_eq!(
            tier(&registry.resolve("Customer", &defs).unwrap()),
            PropValue::from("bronze")
        );

        registry.register::<GoldCustomerFactory>();
        assert_eq!(
            tier(&registry.resolve("Customer", &defs).unwrap()),
            PropValue::from("gold")
        );
    }

    #[test]
    fn test_errors() {
        let mut registry = BOTestFactoryRegistry::new();
        assert!(matches!(
            registry.register_with("  ", silver),
            Err(FactoryError::Config(_))
        ));
        assert!(matches!(
            registry.resolve("", &defs()),
            Err(FactoryError::Config(_))
        ));
        assert!(matches!(
            registry.resolve("Supplier", &defs()),
            Err(FactoryError::ClassNotDefined { .. })
        ));
        assert!(matches!(
            registry.resolve("Customer", &ClassDefCol::default()),
            Err(FactoryError::NoClassDefsLoaded { .. })
        ));
    }

    #[test]
    fn test_reset() {
        let mut registry = BOTestFactoryRegistry::new();
        registry.register::<GoldCustomerFactory>();
        assert!(registry.is_registered("Customer"));
        registry.reset();
        assert!(!registry.is_registered("Customer"));
    }
}

//! Test-scoped state shared by every factory.
//!
//! A [`TestContext`] owns the loaded class definitions, the three registries,
//! the data accessor and the random source. Creating a fresh context (or
//! calling [`TestContext::reset`]) between tests drops every registration.

use crate::config::FactoryConfig;
use crate::defaults::BODefaultValueRegistry;
use crate::error::FactoryError;
use crate::factory::BOTestFactory;
use crate::registry::BOTestFactoryRegistry;
use bo_core::{BusinessObject, ClassDef, ClassDefCol, DataAccessor, InMemoryDataAccessor};
use bo_generator::ValidValueGeneratorRegistry;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::Arc;

pub struct TestContext {
    class_defs: ClassDefCol,
    /// Generators resolved for each property type.
    pub generators: ValidValueGeneratorRegistry,
    /// Values pinned for every factory in this context.
    pub defaults: BODefaultValueRegistry,
    /// Specialised factories per class.
    pub factories: BOTestFactoryRegistry,
    accessor: Box<dyn DataAccessor>,
    rng: StdRng,
    config: FactoryConfig,
    depth: usize,
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("classes", &self.class_defs.class_names())
            .field("generators", &self.generators)
            .field("defaults", &self.defaults)
            .field("factories", &self.factories)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TestContext {
    /// Create a context over the given class definitions, saving to an
    /// in-memory data accessor.
    pub fn new(class_defs: ClassDefCol) -> Self {
        Self::with_config(class_defs, FactoryConfig::default())
    }

    pub fn with_config(class_defs: ClassDefCol, config: FactoryConfig) -> Self {
        Self {
            class_defs,
            generators: ValidValueGeneratorRegistry::new(),
            defaults: BODefaultValueRegistry::new(),
            factories: BOTestFactoryRegistry::new(),
            accessor: Box::new(InMemoryDataAccessor::new()),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            depth: 0,
        }
    }

    /// Replace the data accessor.
    pub fn with_data_accessor(mut self, accessor: Box<dyn DataAccessor>) -> Self {
        self.accessor = accessor;
        self
    }

    pub fn class_defs(&self) -> &ClassDefCol {
        &self.class_defs
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn accessor(&self) -> &dyn DataAccessor {
        self.accessor.as_ref()
    }

    pub fn accessor_mut(&mut self) -> &mut dyn DataAccessor {
        self.accessor.as_mut()
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Look up a class definition, telling "nothing loaded" apart from
    /// "not among the loaded classes".
    pub fn class_def(&self, class_name: &str) -> Result<Arc<ClassDef>, FactoryError> {
        lookup_class(&self.class_defs, class_name)
    }

    /// The factory for a class: a registered one if any, else the generic one.
    pub fn factory(&self, class_name: &str) -> Result<BOTestFactory, FactoryError> {
        self.factories.resolve(class_name, &self.class_defs)
    }

    /// Create a valid object of a class with its resolved factory.
    pub fn create_valid(&mut self, class_name: &str) -> Result<BusinessObject, FactoryError> {
        self.factory(class_name)?.create_valid_business_object(self)
    }

    /// Create and save a valid object of a class with its resolved factory.
    pub fn create_saved(&mut self, class_name: &str) -> Result<BusinessObject, FactoryError> {
        self.factory(class_name)?.create_saved_business_object(self)
    }

    /// Drop every registration and restart the random sequence.
    pub fn reset(&mut self) {
        self.generators.reset();
        self.defaults.clear();
        self.factories.reset();
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.depth = 0;
    }

    /// Enter one level of related-object creation.
    pub(crate) fn descend(&mut self, class_name: &str) -> Result<(), FactoryError> {
        if self.depth >= self.config.max_relationship_depth {
            return Err(FactoryError::RelationshipDepthExceeded {
                class: class_name.to_string(),
                max_depth: self.config.max_relationship_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

pub(crate) fn lookup_class(
    class_defs: &ClassDefCol,
    class_name: &str,
) -> Result<Arc<ClassDef>, FactoryError> {
    if class_defs.is_empty() {
        return Err(FactoryError::NoClassDefsLoaded {
            class: class_name.to_string(),
        });
    }
    class_defs
        .get(class_name)
        .ok_or_else(|| FactoryError::ClassNotDefined {
            class: class_name.to_string(),
        })
}

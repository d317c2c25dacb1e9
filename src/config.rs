//! TOML configuration for the command-line tool.
//!
//! ```toml
//! seed = 7
//! many_count = 2
//! max_rule_fixup_passes = 10
//! max_relationship_depth = 8
//!
//! [generators]
//! string = "name_list"
//! ```
//!
//! Every key is optional. `[generators]` maps a property type name to the
//! name of the generator that should handle it.

use anyhow::Context;
use bo_core::{ClassDefCol, PropTypeKind};
use bo_factory::{FactoryConfig, TestContext};
use bo_generator::ValidValueGeneratorRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestabilityConfig {
    #[serde(flatten)]
    pub factory: FactoryConfig,

    /// Generator overrides: property type name to generator name.
    #[serde(default)]
    pub generators: BTreeMap<String, String>,
}

impl TestabilityConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.factory.seed = seed;
        self
    }

    /// Register every `[generators]` override.
    pub fn apply_generators(&self, registry: &mut ValidValueGeneratorRegistry) -> anyhow::Result<()> {
        for (type_name, generator) in &self.generators {
            let kind = PropTypeKind::from_name(type_name)
                .with_context(|| format!("Unknown property type '{type_name}' in [generators]"))?;
            registry
                .register_named(kind, generator)
                .with_context(|| format!("Invalid generator for '{type_name}'"))?;
            debug!("Using generator '{}' for {}", generator, kind);
        }
        Ok(())
    }

    /// A test context over the given definitions with this configuration applied.
    pub fn build_context(&self, class_defs: ClassDefCol) -> anyhow::Result<TestContext> {
        let mut ctx = TestContext::with_config(class_defs, self.factory.clone());
        self.apply_generators(&mut ctx.generators)?;
        Ok(ctx)
    }
}

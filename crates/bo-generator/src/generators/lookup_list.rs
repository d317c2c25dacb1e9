//! Generator cycling through a simple lookup list.

use super::{next_listed, Cycle, ValidValueGenerator, ValidValueGeneratorType, ValueBound};
use crate::error::GeneratorError;
use crate::registry::builtin_generator;
use bo_core::{LookupList, PropDef, PropValue};
use rand::rngs::StdRng;
use tracing::warn;

/// Cycles through the values of a property's lookup list in order.
///
/// An empty list falls back to the built-in generator for the property type.
#[derive(Debug)]
pub struct LookupListGenerator {
    prop_def: PropDef,
    values: Vec<PropValue>,
    cycle: Cycle,
    fallback: Option<Box<dyn ValidValueGenerator>>,
}

impl LookupListGenerator {
    /// Build a generator over explicit values.
    pub fn with_values(prop_def: &PropDef, values: Vec<PropValue>) -> Result<Self, GeneratorError> {
        let fallback = if values.is_empty() {
            warn!(
                "Lookup list for '{}.{}' is empty; generating random {} values",
                prop_def.class_name, prop_def.name, prop_def.prop_type
            );
            Some(builtin_generator(prop_def)?)
        } else {
            None
        };
        Ok(Self {
            prop_def: prop_def.clone(),
            values,
            cycle: Cycle::default(),
            fallback,
        })
    }

    /// Values cycled through, in order.
    pub fn values(&self) -> &[PropValue] {
        &self.values
    }
}

impl ValidValueGeneratorType for LookupListGenerator {
    const NAME: &'static str = "lookup_list";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        let items = match &prop_def.lookup_list {
            Some(LookupList::Simple { items }) => items,
            _ => {
                return Err(GeneratorError::Config(format!(
                    "'{}' has no simple lookup list",
                    prop_def.name
                )))
            }
        };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match PropValue::parse_as(&item.value, &prop_def.prop_type) {
                Some(value) => values.push(value),
                None => warn!(
                    "Skipping lookup item '{}' for '{}': not a valid {}",
                    item.value, prop_def.name, prop_def.prop_type
                ),
            }
        }
        Self::with_values(prop_def, values)
    }
}

impl ValidValueGenerator for LookupListGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        match self.fallback.as_mut() {
            Some(fallback) => fallback.generate(bound, rng),
            None => next_listed(&self.prop_def, &self.values, &mut self.cycle, bound),
        }
    }
}

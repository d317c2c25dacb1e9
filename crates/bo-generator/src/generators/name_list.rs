//! Generator cycling through person names.

use super::{
    expect_type, next_listed, Cycle, ValidValueGenerator, ValidValueGeneratorType, ValueBound,
};
use crate::error::GeneratorError;
use bo_core::{PropDef, PropType, PropValue};
use rand::rngs::StdRng;

/// Names cycled through when no list is supplied.
pub const DEFAULT_NAMES: &[&str] = &[
    "Aaliyah", "Benjamin", "Chloe", "Daniel", "Elena", "Farid", "Grace", "Hiroshi", "Ingrid",
    "Jamal", "Keira", "Liam", "Maya", "Nikolai", "Olivia", "Pedro", "Quinn", "Rosa", "Samuel",
    "Thandiwe", "Umar", "Valentina", "William", "Ximena", "Yusuf", "Zoe",
];

/// Cycles through a list of names, skipping names that break the
/// property's string rules.
#[derive(Debug, Clone)]
pub struct NameListGenerator {
    prop_def: PropDef,
    names: Vec<PropValue>,
    cycle: Cycle,
}

impl NameListGenerator {
    /// Build a generator over explicit names.
    pub fn with_names<I, S>(prop_def: &PropDef, names: I) -> Result<Self, GeneratorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        expect_type(Self::NAME, prop_def, prop_def.prop_type == PropType::String)?;
        let names: Vec<PropValue> = names
            .into_iter()
            .map(|n| PropValue::Text(n.into()))
            .collect();
        if names.is_empty() {
            return Err(GeneratorError::Config(format!(
                "name list for '{}' is empty",
                prop_def.name
            )));
        }
        Ok(Self {
            prop_def: prop_def.clone(),
            names,
            cycle: Cycle::default(),
        })
    }
}

impl ValidValueGeneratorType for NameListGenerator {
    const NAME: &'static str = "name_list";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        Self::with_names(prop_def, DEFAULT_NAMES.iter().copied())
    }
}

impl ValidValueGenerator for NameListGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        _rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        next_listed(&self.prop_def, &self.names, &mut self.cycle, bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_core::PropRule;
    use rand::SeedableRng;

    #[test]
    fn test_cycles_through_names() {
        let mut rng = StdRng::seed_from_u64(42);
        let prop = PropDef::new("FirstName", PropType::String);
        let mut gen = NameListGenerator::with_names(&prop, ["Ann", "Bob"]).unwrap();
        let names: Vec<_> = (0..3)
            .map(|_| gen.generate_valid_value(&mut rng).unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                PropValue::from("Ann"),
                PropValue::from("Bob"),
                PropValue::from("Ann")
            ]
        );
    }

    #[test]
    fn test_full_cycle_returns_first_name() {
        let mut rng = StdRng::seed_from_u64(42);
        let prop = PropDef::new("FirstName", PropType::String);
        let mut gen = NameListGenerator::for_prop(&prop).unwrap();
        let first = gen.generate_valid_value(&mut rng).unwrap();
        for _ in 1..DEFAULT_NAMES.len() {
            gen.generate_valid_value(&mut rng).unwrap();
        }
        assert_eq!(gen.generate_valid_value(&mut rng).unwrap(), first);
    }

    #[test]
    fn test_skips_names_breaking_rules() {
        let mut rng = StdRng::seed_from_u64(42);
        let prop = PropDef::new("FirstName", PropType::String).with_rule(PropRule::String {
            min_length: None,
            max_length: Some(4),
            pattern: None,
        });
        let mut gen = NameListGenerator::for_prop(&prop).unwrap();
        for _ in 0..10 {
            let name = gen.generate_valid_value(&mut rng).unwrap();
            assert!(name.as_str().unwrap().len() <= 4);
        }
    }
}

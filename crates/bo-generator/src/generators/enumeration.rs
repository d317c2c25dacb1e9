//! Enumeration value generator.
//!
//! Members are stored as text, so bounds compare them the same way
//! inter-property rules do: lexicographically. Members that break a rule
//! attached to the property are never drawn.

use super::{expect_type, ValidValueGenerator, ValidValueGeneratorType, ValueBound};
use crate::error::GeneratorError;
use bo_core::{PropDef, PropRule, PropType, PropValue};
use rand::rngs::StdRng;
use rand::Rng;

/// Generates enumeration members.
#[derive(Debug, Clone)]
pub struct EnumGenerator {
    prop_name: String,
    values: Vec<String>,
    rules: Vec<PropRule>,
}

impl ValidValueGeneratorType for EnumGenerator {
    const NAME: &'static str = "enum";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        let values = match &prop_def.prop_type {
            PropType::Enum { values } => values.clone(),
            _ => {
                expect_type(Self::NAME, prop_def, false)?;
                Vec::new()
            }
        };
        if values.is_empty() {
            return Err(GeneratorError::Config(format!(
                "enumeration '{}' declares no values",
                prop_def.name
            )));
        }
        Ok(Self {
            prop_name: prop_def.name.clone(),
            values,
            rules: prop_def.rules.clone(),
        })
    }
}

impl ValidValueGenerator for EnumGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        if let Some(b) = bound.value() {
            if b.as_str().is_none() {
                return Err(GeneratorError::incompatible_bound(&self.prop_name, b));
            }
        }
        let mut candidates: Vec<PropValue> = self
            .values
            .iter()
            .map(|v| PropValue::Text(v.clone()))
            .filter(|v| self.rules.iter().all(|r| r.is_satisfied_by(v)))
            .filter(|v| bound.admits(v))
            .collect();
        if candidates.is_empty() {
            return Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                format!("no member satisfies the rules and is {}", bound.describe()),
            ));
        }
        let index = rng.random_range(0..candidates.len());
        Ok(candidates.swap_remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn status() -> PropDef {
        PropDef::new(
            "Status",
            PropType::Enum {
                values: vec!["Draft".into(), "Open".into(), "Closed".into()],
            },
        )
    }

    #[test]
    fn test_generates_members() {
        let mut rng = StdRng::seed_from_u64(42);
        let prop = status();
        let mut gen = EnumGenerator::for_prop(&prop).unwrap();
        for _ in 0..20 {
            let v = gen.generate_valid_value(&mut rng).unwrap();
            assert!(v.fits(&prop.prop_type));
        }
    }

    #[test]
    fn test_bounds_compare_members_as_text() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = EnumGenerator::for_prop(&status()).unwrap();
        assert_eq!(
            gen.generate_valid_value_greater_than(Some(&PropValue::from("Draft")), &mut rng)
                .unwrap(),
            PropValue::from("Open")
        );
        assert_eq!(
            gen.generate_valid_value_less_than(Some(&PropValue::from("Draft")), &mut rng)
                .unwrap(),
            PropValue::from("Closed")
        );
        assert!(gen
            .generate_valid_value_greater_than(Some(&PropValue::from("Open")), &mut rng)
            .is_err());
        assert!(matches!(
            gen.generate_valid_value_greater_than(Some(&PropValue::Int(1)), &mut rng),
            Err(GeneratorError::IncompatibleBound { .. })
        ));
    }

    #[test]
    fn test_members_breaking_a_length_rule_are_skipped() {
        let mut rng = StdRng::seed_from_u64(42);
        let prop = status().with_rule(PropRule::String {
            min_length: None,
            max_length: Some(4),
            pattern: None,
        });
        let mut gen = EnumGenerator::for_prop(&prop).unwrap();
        for _ in 0..50 {
            let v = gen.generate_valid_value(&mut rng).unwrap();
            assert!(prop.broken_rules(&v).is_empty(), "{v}");
            assert_eq!(v, PropValue::from("Open"));
        }
        assert!(matches!(
            gen.generate_valid_value_greater_than(Some(&PropValue::from("Open")), &mut rng),
            Err(GeneratorError::Unsatisfiable { .. })
        ));
    }

    #[test]
    fn test_empty_enumeration_is_config_error() {
        let prop = PropDef::new("Status", PropType::Enum { values: vec![] });
        assert!(matches!(
            EnumGenerator::for_prop(&prop),
            Err(GeneratorError::Config(_))
        ));
    }
}

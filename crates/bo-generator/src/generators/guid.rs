//! GUID value generator.

use super::{expect_type, ValidValueGenerator, ValidValueGeneratorType, ValueBound};
use crate::error::GeneratorError;
use crate::random;
use bo_core::{PropDef, PropType, PropValue};
use rand::rngs::StdRng;

/// Generates UUIDs.
///
/// Unbounded values are random version 4 UUIDs. Bounded values are ordered
/// by their 128-bit value and carry no version bits.
#[derive(Debug, Clone)]
pub struct GuidGenerator {
    prop_name: String,
}

impl ValidValueGeneratorType for GuidGenerator {
    const NAME: &'static str = "guid";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        expect_type(Self::NAME, prop_def, prop_def.prop_type == PropType::Guid)?;
        Ok(Self {
            prop_name: prop_def.name.clone(),
        })
    }
}

impl ValidValueGenerator for GuidGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        let (min, max) = match bound {
            ValueBound::Unbounded => return Ok(PropValue::Guid(random::random_guid(rng))),
            ValueBound::Above(b) => {
                let b = b
                    .as_guid()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                (b.as_u128().checked_add(1), Some(u128::MAX))
            }
            ValueBound::Below(b) => {
                let b = b
                    .as_guid()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                (Some(0), b.as_u128().checked_sub(1))
            }
        };
        match (min, max) {
            (Some(min), Some(max)) => Ok(PropValue::Guid(random::random_guid_between(
                rng, min, max,
            ))),
            _ => Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                format!("no UUID is {}", bound.describe()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::cmp::Ordering;
    use uuid::Uuid;

    #[test]
    fn test_unbounded_guids_differ() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = GuidGenerator::for_prop(&PropDef::new("ID", PropType::Guid)).unwrap();
        let a = gen.generate_valid_value(&mut rng).unwrap();
        let b = gen.generate_valid_value(&mut rng).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_bounded_guids() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = GuidGenerator::for_prop(&PropDef::new("ID", PropType::Guid)).unwrap();
        let pivot = PropValue::Guid(Uuid::from_u128(u128::MAX / 2));
        for _ in 0..20 {
            let v = gen
                .generate_valid_value_greater_than(Some(&pivot), &mut rng)
                .unwrap();
            assert_eq!(v.compare(&pivot), Some(Ordering::Greater));
            let v = gen.generate_valid_value_less_than(Some(&pivot), &mut rng).unwrap();
            assert_eq!(v.compare(&pivot), Some(Ordering::Less));
        }

        let max = PropValue::Guid(Uuid::max());
        assert!(gen
            .generate_valid_value_greater_than(Some(&max), &mut rng)
            .is_err());
        assert!(gen
            .generate_valid_value_less_than(Some(&PropValue::Guid(Uuid::nil())), &mut rng)
            .is_err());
    }
}

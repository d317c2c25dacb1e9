//! Boolean value generator.

use super::{expect_type, ValidValueGenerator, ValidValueGeneratorType, ValueBound};
use crate::error::GeneratorError;
use bo_core::{PropDef, PropType, PropValue};
use rand::rngs::StdRng;
use rand::Rng;

/// Generates booleans; `false < true`.
#[derive(Debug, Clone)]
pub struct BoolGenerator {
    prop_name: String,
}

impl ValidValueGeneratorType for BoolGenerator {
    const NAME: &'static str = "bool";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        expect_type(Self::NAME, prop_def, prop_def.prop_type == PropType::Bool)?;
        Ok(Self {
            prop_name: prop_def.name.clone(),
        })
    }
}

impl ValidValueGenerator for BoolGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        let value = match bound {
            ValueBound::Unbounded => rng.random_bool(0.5),
            ValueBound::Above(b) => match b.as_bool() {
                Some(false) => true,
                Some(true) => {
                    return Err(GeneratorError::unsatisfiable(
                        &self.prop_name,
                        "nothing is greater than true",
                    ))
                }
                None => return Err(GeneratorError::incompatible_bound(&self.prop_name, b)),
            },
            ValueBound::Below(b) => match b.as_bool() {
                Some(true) => false,
                Some(false) => {
                    return Err(GeneratorError::unsatisfiable(
                        &self.prop_name,
                        "nothing is less than false",
                    ))
                }
                None => return Err(GeneratorError::incompatible_bound(&self.prop_name, b)),
            },
        };
        Ok(PropValue::Bool(value))
    }
}

//! Numeric value generators.
//!
//! Integers cover the full domain of their width. Doubles and decimals are
//! drawn from the absolute domain in [`crate::random`]. Rule bounds are
//! inclusive; requested bounds are exclusive.

use super::{expect_type, ValidValueGenerator, ValidValueGeneratorType, ValueBound};
use crate::error::GeneratorError;
use crate::random;
use bo_core::{PropDef, PropType, PropValue};
use rand::rngs::StdRng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

/// Maximum draws when an exclusive double bound rejects a sample.
const DOUBLE_ATTEMPTS: usize = 16;

// ============================================================================
// Integers
// ============================================================================

/// Generates short, int and long values.
#[derive(Debug, Clone)]
pub struct IntegerGenerator {
    prop_name: String,
    prop_type: PropType,
    min: i64,
    max: i64,
}

impl ValidValueGeneratorType for IntegerGenerator {
    const NAME: &'static str = "integer";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        expect_type(Self::NAME, prop_def, prop_def.prop_type.is_integer())?;
        let (type_min, type_max) = random::integer_domain(&prop_def.prop_type);
        let bounds = prop_def.rule_bounds();
        Ok(Self {
            prop_name: prop_def.name.clone(),
            prop_type: prop_def.prop_type.clone(),
            min: bounds.int_min.map_or(type_min, |m| m.max(type_min)),
            max: bounds.int_max.map_or(type_max, |m| m.min(type_max)),
        })
    }
}

impl IntegerGenerator {
    fn wrap(&self, value: i64) -> PropValue {
        // The range is clamped to the type's domain, so narrowing cannot fail.
        match self.prop_type {
            PropType::Short => PropValue::Short(value as i16),
            PropType::Int => PropValue::Int(value as i32),
            _ => PropValue::Long(value),
        }
    }
}

impl ValidValueGenerator for IntegerGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        let (mut min, mut max) = (self.min, self.max);
        match bound {
            ValueBound::Unbounded => {}
            ValueBound::Above(b) => {
                let b = b
                    .as_i64()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                min = match b.checked_add(1) {
                    Some(next) => min.max(next),
                    None => {
                        return Err(GeneratorError::unsatisfiable(
                            &self.prop_name,
                            "nothing is greater than the largest integer",
                        ))
                    }
                };
            }
            ValueBound::Below(b) => {
                let b = b
                    .as_i64()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                max = match b.checked_sub(1) {
                    Some(prev) => max.min(prev),
                    None => {
                        return Err(GeneratorError::unsatisfiable(
                            &self.prop_name,
                            "nothing is less than the smallest integer",
                        ))
                    }
                };
            }
        }
        if min > max {
            return Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                format!("range [{min}, {max}] is empty"),
            ));
        }
        let value = random::random_integer(rng, min, max);
        debug!("Generated {value} for '{}' in [{min}, {max}]", self.prop_name);
        Ok(self.wrap(value))
    }
}

// ============================================================================
// Doubles
// ============================================================================

/// Generates double values.
#[derive(Debug, Clone)]
pub struct DoubleGenerator {
    prop_name: String,
    min: f64,
    max: f64,
}

impl ValidValueGeneratorType for DoubleGenerator {
    const NAME: &'static str = "double";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        expect_type(Self::NAME, prop_def, prop_def.prop_type == PropType::Double)?;
        let bounds = prop_def.rule_bounds();
        Ok(Self {
            prop_name: prop_def.name.clone(),
            min: bounds
                .double_min
                .map_or(random::ABSOLUTE_MIN_DOUBLE, |m| m.max(random::ABSOLUTE_MIN_DOUBLE)),
            max: bounds
                .double_max
                .map_or(random::ABSOLUTE_MAX_DOUBLE, |m| m.min(random::ABSOLUTE_MAX_DOUBLE)),
        })
    }
}

impl ValidValueGenerator for DoubleGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        let (mut min, mut max) = (self.min, self.max);
        let (mut open_min, mut open_max) = (false, false);
        match bound {
            ValueBound::Unbounded => {}
            ValueBound::Above(b) => {
                let b = b
                    .as_f64()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                if b >= min {
                    min = b;
                    open_min = true;
                }
            }
            ValueBound::Below(b) => {
                let b = b
                    .as_f64()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                if b <= max {
                    max = b;
                    open_max = true;
                }
            }
        }
        if min > max || (min == max && (open_min || open_max)) {
            return Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                format!(
                    "range {}{min}, {max}{} is empty",
                    if open_min { "(" } else { "[" },
                    if open_max { ")" } else { "]" }
                ),
            ));
        }

        let admits = |v: f64| (!open_min || v > min) && (!open_max || v < max);
        for _ in 0..DOUBLE_ATTEMPTS {
            let value = random::random_double(rng, min, max);
            if admits(value) {
                return Ok(PropValue::Double(value));
            }
        }
        let midpoint = min + (max - min) / 2.0;
        if admits(midpoint) {
            Ok(PropValue::Double(midpoint))
        } else {
            Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                format!("no double strictly between {min} and {max}"),
            ))
        }
    }
}

// ============================================================================
// Decimals
// ============================================================================

/// Generates decimal values with two decimal places.
#[derive(Debug, Clone)]
pub struct DecimalGenerator {
    prop_name: String,
    min_cents: i64,
    max_cents: i64,
}

/// Convert to hundredths, saturating outside the `i64` range.
fn to_cents(value: Decimal, round_up: bool) -> i64 {
    let saturated = if value.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };
    match value.checked_mul(Decimal::ONE_HUNDRED) {
        Some(scaled) => {
            let rounded = if round_up { scaled.ceil() } else { scaled.floor() };
            rounded.to_i64().unwrap_or(saturated)
        }
        None => saturated,
    }
}

impl ValidValueGeneratorType for DecimalGenerator {
    const NAME: &'static str = "decimal";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        expect_type(Self::NAME, prop_def, prop_def.prop_type == PropType::Decimal)?;
        let bounds = prop_def.rule_bounds();
        Ok(Self {
            prop_name: prop_def.name.clone(),
            min_cents: bounds
                .decimal_min
                .map_or(random::ABSOLUTE_MIN_DECIMAL_CENTS, |m| {
                    to_cents(m, true).max(random::ABSOLUTE_MIN_DECIMAL_CENTS)
                }),
            max_cents: bounds
                .decimal_max
                .map_or(random::ABSOLUTE_MAX_DECIMAL_CENTS, |m| {
                    to_cents(m, false).min(random::ABSOLUTE_MAX_DECIMAL_CENTS)
                }),
        })
    }
}

impl ValidValueGenerator for DecimalGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        let (mut min, mut max) = (self.min_cents, self.max_cents);
        match bound {
            ValueBound::Unbounded => {}
            ValueBound::Above(b) => {
                let b = b
                    .as_decimal()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                // Smallest two-place value strictly above the bound.
                min = min.max(to_cents(b, false).saturating_add(1));
            }
            ValueBound::Below(b) => {
                let b = b
                    .as_decimal()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                max = max.min(to_cents(b, true).saturating_sub(1));
            }
        }
        if min > max {
            return Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                format!(
                    "range [{}, {}] is empty",
                    Decimal::new(min, random::DECIMAL_SCALE),
                    Decimal::new(max, random::DECIMAL_SCALE)
                ),
            ));
        }
        Ok(PropValue::Decimal(random::random_decimal(rng, min, max)))
    }
}

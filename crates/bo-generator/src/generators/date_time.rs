//! Date/time value generator.
//!
//! Values have second precision and fall between 1900-01-01 and
//! 2100-12-31 unless a rule narrows the range further.

use super::{expect_type, ValidValueGenerator, ValidValueGeneratorType, ValueBound};
use crate::error::GeneratorError;
use crate::random;
use bo_core::{PropDef, PropType, PropValue};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;

/// Generates UTC date/time values.
#[derive(Debug, Clone)]
pub struct DateTimeGenerator {
    prop_name: String,
    min: i64,
    max: i64,
}

/// Smallest whole second not before `dt`.
fn ceil_seconds(dt: &DateTime<Utc>) -> i64 {
    if dt.timestamp_subsec_nanos() > 0 {
        dt.timestamp() + 1
    } else {
        dt.timestamp()
    }
}

impl ValidValueGeneratorType for DateTimeGenerator {
    const NAME: &'static str = "date_time";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        expect_type(Self::NAME, prop_def, prop_def.prop_type == PropType::DateTime)?;
        let bounds = prop_def.rule_bounds();
        let (abs_min, abs_max) = (random::absolute_min_date(), random::absolute_max_date());
        Ok(Self {
            prop_name: prop_def.name.clone(),
            min: bounds
                .date_min
                .map_or(abs_min, |d| ceil_seconds(&d).max(abs_min)),
            max: bounds.date_max.map_or(abs_max, |d| d.timestamp().min(abs_max)),
        })
    }
}

impl ValidValueGenerator for DateTimeGenerator {
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
                    .as_datetime()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                min = min.max(b.timestamp() + 1);
            }
            ValueBound::Below(b) => {
                let b = b
                    .as_datetime()
                    .ok_or_else(|| GeneratorError::incompatible_bound(&self.prop_name, b))?;
                max = max.min(ceil_seconds(b) - 1);
            }
        }
        if min > max {
            return Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                format!("no whole second between {min} and {max}"),
            ));
        }
        random::random_date(rng, min, max)
            .map(PropValue::DateTime)
            .ok_or_else(|| {
                GeneratorError::unsatisfiable(&self.prop_name, "timestamp out of range")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_core::{parse_datetime, PropRule};
    use chrono::Datelike;
    use rand::SeedableRng;

    fn ranged() -> DateTimeGenerator {
        let prop = PropDef::new("OrderDate", PropType::DateTime).with_rule(PropRule::Date {
            min: parse_datetime("2020-01-01"),
            max: parse_datetime("2020-12-31"),
        });
        DateTimeGenerator::for_prop(&prop).unwrap()
    }

    #[test]
    fn test_date_rule_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = ranged();
        for _ in 0..100 {
            let v = gen.generate_valid_value(&mut rng).unwrap();
            let dt = v.as_datetime().unwrap();
            assert_eq!(dt.year(), 2020);
            assert_eq!(dt.timestamp_subsec_nanos(), 0);
        }
    }

    #[test]
    fn test_date_exclusive_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = ranged();
        let mid = PropValue::DateTime(parse_datetime("2020-06-15T12:00:00.5Z").unwrap());
        for _ in 0..100 {
            let after = gen
                .generate_valid_value_greater_than(Some(&mid), &mut rng)
                .unwrap();
            assert_eq!(after.compare(&mid), Some(std::cmp::Ordering::Greater));
            let before = gen.generate_valid_value_less_than(Some(&mid), &mut rng).unwrap();
            assert_eq!(before.compare(&mid), Some(std::cmp::Ordering::Less));
        }
    }

    #[test]
    fn test_date_unsatisfiable() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = ranged();
        let late = PropValue::DateTime(parse_datetime("2021-01-01").unwrap());
        assert!(matches!(
            gen.generate_valid_value_greater_than(Some(&late), &mut rng),
            Err(GeneratorError::Unsatisfiable { .. })
        ));
    }

    #[test]
    fn test_unrestricted_dates_span_absolute_domain() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen =
            DateTimeGenerator::for_prop(&PropDef::new("Created", PropType::DateTime)).unwrap();
        for _ in 0..100 {
            let year = gen
                .generate_valid_value(&mut rng)
                .unwrap()
                .as_datetime()
                .unwrap()
                .year();
            assert!((1900..=2100).contains(&year));
        }
    }
}

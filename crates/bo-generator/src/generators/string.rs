//! Random string generator honouring length rules.
//!
//! An integer bound restricts the length; a text bound restricts the value
//! lexicographically.

use super::{expect_type, ValidValueGenerator, ValidValueGeneratorType, ValueBound};
use crate::error::GeneratorError;
use crate::random;
use bo_core::{PropDef, PropType, PropValue};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

/// Generates alphanumeric strings.
#[derive(Debug, Clone)]
pub struct StringGenerator {
    prop_name: String,
    /// Rule minimum length
    min_len: usize,
    /// Shortest length drawn when nothing forces shorter strings
    preferred_min_len: usize,
    /// Rule maximum length, or a default cap
    max_len: usize,
    /// Whether `max_len` comes from a rule
    capped: bool,
}

impl ValidValueGeneratorType for StringGenerator {
    const NAME: &'static str = "string";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        expect_type(Self::NAME, prop_def, prop_def.prop_type == PropType::String)?;
        let bounds = prop_def.rule_bounds();
        let min_len = bounds.min_length.unwrap_or(0);
        let (preferred_min_len, max_len) = match bounds.max_length {
            Some(max) => (min_len.max(1).min(max), max),
            None => {
                let preferred = min_len.max(random::DEFAULT_STRING_LENGTH);
                (preferred, preferred + random::DEFAULT_STRING_SPREAD)
            }
        };
        Ok(Self {
            prop_name: prop_def.name.clone(),
            min_len,
            preferred_min_len,
            max_len,
            capped: bounds.max_length.is_some(),
        })
    }
}

impl StringGenerator {
    fn empty_range(&self, lo: usize, hi: usize) -> GeneratorError {
        GeneratorError::unsatisfiable(&self.prop_name, format!("no length in [{lo}, {hi}]"))
    }

    /// Longest length allowed for strings at least `lo` long.
    fn longest_from(&self, lo: usize) -> usize {
        if self.capped {
            self.max_len
        } else {
            self.max_len.max(lo + random::DEFAULT_STRING_SPREAD)
        }
    }

    fn with_length_between(
        &self,
        lo: usize,
        hi: usize,
        rng: &mut StdRng,
    ) -> Result<String, GeneratorError> {
        if lo > hi {
            return Err(self.empty_range(lo, hi));
        }
        let len = rng.random_range(lo..=hi);
        Ok(random::random_string(rng, len))
    }

    fn greater_than_text(&self, bound: &str, rng: &mut StdRng) -> Result<String, GeneratorError> {
        let lo = self.preferred_min_len.max(1);
        if lo <= self.max_len {
            if let Some(first) = random::random_char_between(rng, bound.chars().next(), None) {
                let len = rng.random_range(lo..=self.max_len);
                let mut value = first.to_string();
                value.push_str(&random::random_string(rng, len - 1));
                return Ok(value);
            }
        }

        // Nothing sorts after the leading character; extend the bound instead.
        let bound_len = bound.chars().count();
        let lo = self.min_len.saturating_sub(bound_len).max(1);
        let hi = self.longest_from(bound_len + 1).saturating_sub(bound_len);
        if lo > hi {
            return Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                format!(
                    "no string of length at most {} sorts after '{bound}'",
                    self.max_len
                ),
            ));
        }
        let suffix_len = rng.random_range(lo..=hi);
        Ok(format!("{bound}{}", random::random_string(rng, suffix_len)))
    }

    fn less_than_text(&self, bound: &str, rng: &mut StdRng) -> Result<String, GeneratorError> {
        if bound.is_empty() {
            return Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                "no string sorts before ''",
            ));
        }
        let lo = self.preferred_min_len.max(1);
        if lo <= self.max_len {
            if let Some(first) = random::random_char_between(rng, None, bound.chars().next()) {
                let len = rng.random_range(lo..=self.max_len);
                let mut value = first.to_string();
                value.push_str(&random::random_string(rng, len - 1));
                return Ok(value);
            }
        }

        // Any proper prefix sorts first.
        let bound_len = bound.chars().count();
        let hi = self.max_len.min(bound_len.saturating_sub(1));
        if bound_len == 0 || self.min_len > hi {
            return Err(GeneratorError::unsatisfiable(
                &self.prop_name,
                format!(
                    "no string of length at least {} sorts before '{bound}'",
                    self.min_len
                ),
            ));
        }
        let len = rng.random_range(self.min_len..=hi);
        Ok(bound.chars().take(len).collect())
    }
}

impl ValidValueGenerator for StringGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        let value = match bound {
            ValueBound::Unbounded => {
                self.with_length_between(self.preferred_min_len, self.max_len, rng)?
            }
            ValueBound::Above(b) => match (b.as_str(), b.as_i64()) {
                (Some(text), _) => self.greater_than_text(text, rng)?,
                (None, Some(len)) => {
                    let shortest = usize::try_from(len.saturating_add(1)).unwrap_or(0);
                    let lo = shortest.max(self.min_len).max(self.preferred_min_len);
                    self.with_length_between(lo, self.longest_from(lo), rng)?
                }
                (None, None) => {
                    return Err(GeneratorError::incompatible_bound(&self.prop_name, b))
                }
            },
            ValueBound::Below(b) => match (b.as_str(), b.as_i64()) {
                (Some(text), _) => self.less_than_text(text, rng)?,
                (None, Some(len)) => {
                    if len <= 0 {
                        return Err(self.empty_range(self.min_len, 0));
                    }
                    let longest = usize::try_from(len - 1).unwrap_or(usize::MAX);
                    let hi = self.max_len.min(longest);
                    let lo = self.preferred_min_len.min(hi).max(self.min_len);
                    self.with_length_between(lo, hi, rng)?
                }
                (None, None) => {
                    return Err(GeneratorError::incompatible_bound(&self.prop_name, b))
                }
            },
        };
        debug!("Generated '{value}' for '{}'", self.prop_name);
        Ok(PropValue::Text(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_core::PropRule;
    use rand::SeedableRng;

    fn ranged(min: usize, max: usize) -> StringGenerator {
        let prop = PropDef::new("Name", PropType::String).with_rule(PropRule::String {
            min_length: Some(min),
            max_length: Some(max),
            pattern: None,
        });
        StringGenerator::for_prop(&prop).unwrap()
    }

    fn text(v: PropValue) -> String {
        v.as_str().unwrap().to_string()
    }

    #[test]
    fn test_length_rule_three_to_seven() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = ranged(3, 7);
        for _ in 0..200 {
            let len = text(gen.generate_valid_value(&mut rng).unwrap()).chars().count();
            assert!((3..=7).contains(&len), "length {len}");
        }
    }

    #[test]
    fn test_unrestricted_strings_differ() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = StringGenerator::for_prop(&PropDef::new("Name", PropType::String)).unwrap();
        let a = text(gen.generate_valid_value(&mut rng).unwrap());
        let b = text(gen.generate_valid_value(&mut rng).unwrap());
        assert_ne!(a, b);
        assert!(a.len() >= random::DEFAULT_STRING_LENGTH);
    }

    #[test]
    fn test_integer_bound_is_length() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = ranged(3, 7);
        for _ in 0..100 {
            let s = text(
                gen.generate_valid_value_greater_than(Some(&PropValue::Int(5)), &mut rng)
                    .unwrap(),
            );
            assert!((6..=7).contains(&s.len()));
            let s = text(
                gen.generate_valid_value_less_than(Some(&PropValue::Int(5)), &mut rng)
                    .unwrap(),
            );
            assert!((3..=4).contains(&s.len()));
        }
        assert!(gen
            .generate_valid_value_greater_than(Some(&PropValue::Int(7)), &mut rng)
            .is_err());
        assert!(gen
            .generate_valid_value_less_than(Some(&PropValue::Int(3)), &mut rng)
            .is_err());
    }

    #[test]
    fn test_text_bound_is_lexicographic() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = ranged(3, 7);
        for bound in ["M", "abc", "zzz", "0ab"] {
            let b = PropValue::from(bound);
            let above = gen.generate_valid_value_greater_than(Some(&b), &mut rng);
            if let Ok(v) = above {
                let s = text(v);
                assert!(s.as_str() > bound, "{s} > {bound}");
                assert!((3..=7).contains(&s.len()));
            }
            let below = gen.generate_valid_value_less_than(Some(&b), &mut rng);
            if let Ok(v) = below {
                let s = text(v);
                assert!(s.as_str() < bound, "{s} < {bound}");
                assert!((3..=7).contains(&s.len()));
            }
        }
    }

    #[test]
    fn test_text_bound_falls_back_to_extension_and_prefix() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = ranged(3, 7);
        let s = text(
            gen.generate_valid_value_greater_than(Some(&PropValue::from("zzz")), &mut rng)
                .unwrap(),
        );
        assert!(s.starts_with("zzz") && s.len() > 3);

        let s = text(
            gen.generate_valid_value_less_than(Some(&PropValue::from("00000")), &mut rng)
                .unwrap(),
        );
        assert!(s == "000" || s == "0000", "{s}");

        assert!(gen
            .generate_valid_value_greater_than(Some(&PropValue::from("zzzzzzz")), &mut rng)
            .is_err());
    }

    #[test]
    fn test_nothing_sorts_before_empty_text() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen =
            StringGenerator::for_prop(&PropDef::new("Name", PropType::String)).unwrap();
        for _ in 0..20 {
            assert!(matches!(
                gen.generate_valid_value_less_than(Some(&PropValue::from("")), &mut rng),
                Err(GeneratorError::Unsatisfiable { .. })
            ));
        }
        let s = text(
            gen.generate_valid_value_greater_than(Some(&PropValue::from("")), &mut rng)
                .unwrap(),
        );
        assert!(!s.is_empty());
    }
}

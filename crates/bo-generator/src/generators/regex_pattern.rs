//! Pattern-driven string generator.
//!
//! Strings are drawn from the pattern with proptest's regex strategy, seeded
//! from the caller's RNG so runs stay reproducible, then filtered against
//! the length rules and the requested bound.

use super::{expect_type, ValidValueGenerator, ValidValueGeneratorType, ValueBound};
use crate::error::GeneratorError;
use bo_core::{PropDef, PropType, PropValue};
use proptest::strategy::{Strategy, ValueTree};
use proptest::string::RegexGeneratorStrategy;
use proptest::test_runner::{Config, RngAlgorithm, TestRng, TestRunner};
use rand::rngs::StdRng;
use rand::Rng;
use regex::Regex;
use std::fmt;

/// Draws before giving up on finding a string within the rules and bound.
const MAX_ATTEMPTS: usize = 200;

/// Generates strings matching a regular expression.
pub struct RegexPatternGenerator {
    prop_name: String,
    pattern: String,
    min_len: Option<usize>,
    max_len: Option<usize>,
    matcher: Regex,
    strategy: RegexGeneratorStrategy<String>,
}

impl fmt::Debug for RegexPatternGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexPatternGenerator")
            .field("prop_name", &self.prop_name)
            .field("pattern", &self.pattern)
            .field("min_len", &self.min_len)
            .field("max_len", &self.max_len)
            .finish()
    }
}

impl RegexPatternGenerator {
    /// Build a generator for an explicit pattern.
    pub fn with_pattern(prop_def: &PropDef, pattern: &str) -> Result<Self, GeneratorError> {
        expect_type(Self::NAME, prop_def, prop_def.prop_type == PropType::String)?;
        if pattern.is_empty() {
            return Err(GeneratorError::Config(format!(
                "empty regex pattern for '{}'",
                prop_def.name
            )));
        }
        let strategy = proptest::string::string_regex(pattern).map_err(|e| {
            GeneratorError::Config(format!(
                "pattern /{pattern}/ for '{}' cannot be generated: {e}",
                prop_def.name
            ))
        })?;
        let matcher = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            GeneratorError::Config(format!(
                "invalid pattern /{pattern}/ for '{}': {e}",
                prop_def.name
            ))
        })?;
        let bounds = prop_def.rule_bounds();
        Ok(Self {
            prop_name: prop_def.name.clone(),
            pattern: pattern.to_string(),
            min_len: bounds.min_length,
            max_len: bounds.max_length,
            matcher,
            strategy,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn within_rules(&self, value: &str) -> bool {
        let len = value.chars().count();
        self.min_len.map_or(true, |min| len >= min)
            && self.max_len.map_or(true, |max| len <= max)
            && self.matcher.is_match(value)
    }
}

impl ValidValueGeneratorType for RegexPatternGenerator {
    const NAME: &'static str = "regex_pattern";

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError> {
        let pattern = prop_def.rule_bounds().pattern.ok_or_else(|| {
            GeneratorError::Config(format!(
                "'{}' has no pattern rule to generate from",
                prop_def.name
            ))
        })?;
        Self::with_pattern(prop_def, &pattern)
    }
}

impl ValidValueGenerator for RegexPatternGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        if let Some(b) = bound.value() {
            if b.as_str().is_none() && b.as_i64().is_none() {
                return Err(GeneratorError::incompatible_bound(&self.prop_name, b));
            }
        }

        let mut seed = [0u8; 32];
        rng.fill(&mut seed);
        let mut runner = TestRunner::new_with_rng(
            Config::default(),
            TestRng::from_seed(RngAlgorithm::ChaCha, &seed),
        );

        for _ in 0..MAX_ATTEMPTS {
            let tree = self.strategy.new_tree(&mut runner).map_err(|e| {
                GeneratorError::Config(format!("pattern /{}/: {e}", self.pattern))
            })?;
            let value = tree.current();
            if !self.within_rules(&value) {
                continue;
            }
            let candidate = PropValue::Text(value);
            if bound.admits(&candidate) {
                return Ok(candidate);
            }
        }
        Err(GeneratorError::unsatisfiable(
            &self.prop_name,
            format!(
                "no string matching /{}/ within the length rules found {}",
                self.pattern,
                bound.describe()
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_core::{pattern_matches, PropRule};
    use rand::SeedableRng;

    fn coded(pattern: &str) -> PropDef {
        PropDef::new("Code", PropType::String).with_rule(PropRule::String {
            min_length: None,
            max_length: None,
            pattern: Some(pattern.to_string()),
        })
    }

    #[test]
    fn test_values_match_pattern() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = RegexPatternGenerator::for_prop(&coded("[A-Z]{3}-[0-9]{4}")).unwrap();
        for _ in 0..50 {
            let v = gen.generate_valid_value(&mut rng).unwrap();
            assert!(pattern_matches("[A-Z]{3}-[0-9]{4}", v.as_str().unwrap()), "{v}");
        }
    }

    #[test]
    fn test_same_seed_same_values() {
        let prop = coded("[a-z]{5,10}");
        let mut a = RegexPatternGenerator::for_prop(&prop).unwrap();
        let mut b = RegexPatternGenerator::for_prop(&prop).unwrap();
        let mut rng_a = StdRng::seed_from_u64(9);
        let mut rng_b = StdRng::seed_from_u64(9);
        for _ in 0..5 {
            assert_eq!(
                a.generate_valid_value(&mut rng_a).unwrap(),
                b.generate_valid_value(&mut rng_b).unwrap()
            );
        }
    }

    #[test]
    fn test_length_bound_with_pattern() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = RegexPatternGenerator::for_prop(&coded("[a-z]{2,8}")).unwrap();
        for _ in 0..20 {
            let v = gen
                .generate_valid_value_greater_than(Some(&PropValue::Int(5)), &mut rng)
                .unwrap();
            assert!(v.as_str().unwrap().len() > 5);
        }
        assert!(matches!(
            gen.generate_valid_value_greater_than(Some(&PropValue::Int(8)), &mut rng),
            Err(GeneratorError::Unsatisfiable { .. })
        ));
    }

    #[test]
    fn test_empty_or_missing_pattern_is_config_error() {
        let prop = PropDef::new("Code", PropType::String);
        assert!(matches!(
            RegexPatternGenerator::for_prop(&prop),
            Err(GeneratorError::Config(_))
        ));
        assert!(matches!(
            RegexPatternGenerator::with_pattern(&prop, ""),
            Err(GeneratorError::Config(_))
        ));
    }
}

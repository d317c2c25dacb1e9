//! Factory configuration.

use serde::{Deserialize, Serialize};

/// Settings shared by every factory in a [`TestContext`](crate::TestContext).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Random seed for deterministic value generation.
    pub seed: u64,
    /// Children created by `with_many`.
    pub many_count: usize,
    /// Passes over the inter-property rules before giving up.
    pub max_rule_fixup_passes: usize,
    /// How deep compulsory relationships may nest.
    pub max_relationship_depth: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            many_count: 3,
            max_rule_fixup_passes: 10,
            max_relationship_depth: 8,
        }
    }
}

impl FactoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of children `with_many` creates.
    pub fn with_many_count(mut self, count: usize) -> Self {
        self.many_count = count;
        self
    }

    /// Set the inter-property rule pass cap.
    pub fn with_max_rule_fixup_passes(mut self, passes: usize) -> Self {
        self.max_rule_fixup_passes = passes;
        self
    }

    /// Set the relationship nesting cap.
    pub fn with_max_relationship_depth(mut self, depth: usize) -> Self {
        self.max_relationship_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FactoryConfig::default();
        assert_eq!(config.many_count, 3);
        assert_eq!(config.max_rule_fixup_passes, 10);
        assert_eq!(config.max_relationship_depth, 8);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: FactoryConfig = serde_yaml::from_str("seed: 7\nmany_count: 5\n").unwrap();
        assert_eq!(config, FactoryConfig::new().with_seed(7).with_many_count(5));
    }
}

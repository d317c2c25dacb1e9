//! Property rules and inter-property rules.
//!
//! A [`PropRule`] restricts the legal values of one property. Several rules
//! may be attached to the same property; [`RuleBounds`] is their
//! intersection, which is what value generators work against.
//!
//! An [`InterPropRule`] compares two properties of the same object.

use crate::types::PropType;
use crate::values::PropValue;
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A declared constraint on a single property's values.
///
/// Every bound is optional and inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropRule {
    /// Range rule for short, int and long properties
    Integer {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },

    /// Range rule for decimal properties
    Decimal {
        #[serde(default)]
        min: Option<Decimal>,
        #[serde(default)]
        max: Option<Decimal>,
    },

    /// Range rule for double properties
    Double {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },

    /// Range rule for date/time properties
    Date {
        #[serde(default)]
        min: Option<DateTime<Utc>>,
        #[serde(default)]
        max: Option<DateTime<Utc>>,
    },

    /// Length and pattern rule for string properties
    String {
        #[serde(default)]
        min_length: Option<usize>,
        #[serde(default)]
        max_length: Option<usize>,
        #[serde(default)]
        pattern: Option<String>,
    },
}

impl PropRule {
    /// Short name of the rule kind, as written in YAML.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer { .. } => "integer",
            Self::Decimal { .. } => "decimal",
            Self::Double { .. } => "double",
            Self::Date { .. } => "date",
            Self::String { .. } => "string",
        }
    }

    /// Whether this rule can apply to a property of the given type.
    pub fn applies_to(&self, prop_type: &PropType) -> bool {
        match self {
            Self::Integer { .. } => prop_type.is_integer(),
            Self::Decimal { .. } => matches!(prop_type, PropType::Decimal),
            Self::Double { .. } => matches!(prop_type, PropType::Double),
            Self::Date { .. } => matches!(prop_type, PropType::DateTime),
            Self::String { .. } => {
                matches!(prop_type, PropType::String | PropType::Enum { .. })
            }
        }
    }

    /// Check a value against this rule.
    ///
    /// Null values satisfy every rule (compulsory checks are separate) and
    /// values of another family are ignored.
    pub fn is_satisfied_by(&self, value: &PropValue) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            Self::Integer { min, max } => match value.as_i64() {
                Some(v) => in_range(&v, min.as_ref(), max.as_ref()),
                None => true,
            },
            Self::Decimal { min, max } => match value.as_decimal() {
                Some(v) => in_range(&v, min.as_ref(), max.as_ref()),
                None => true,
            },
            Self::Double { min, max } => match value.as_f64() {
                Some(v) => {
                    min.map_or(true, |min| v >= min) && max.map_or(true, |max| v <= max)
                }
                None => true,
            },
            Self::Date { min, max } => match value.as_datetime() {
                Some(v) => in_range(v, min.as_ref(), max.as_ref()),
                None => true,
            },
            Self::String {
                min_length,
                max_length,
                pattern,
            } => match value.as_str() {
                Some(s) => {
                    let len = s.chars().count();
                    in_range(&len, min_length.as_ref(), max_length.as_ref())
                        && pattern.as_deref().map_or(true, |p| pattern_matches(p, s))
                }
                None => true,
            },
        }
    }

    /// Describe why a value breaks this rule.
    pub fn describe(&self) -> String {
        fn bound<T: fmt::Display>(b: &Option<T>) -> String {
            b.as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        }
        match self {
            Self::Integer { min, max } => format!("integer in [{}, {}]", bound(min), bound(max)),
            Self::Decimal { min, max } => format!("decimal in [{}, {}]", bound(min), bound(max)),
            Self::Double { min, max } => format!("double in [{}, {}]", bound(min), bound(max)),
            Self::Date { min, max } => format!(
                "date in [{}, {}]",
                bound(&min.map(|d| d.to_rfc3339())),
                bound(&max.map(|d| d.to_rfc3339()))
            ),
            Self::String {
                min_length,
                max_length,
                pattern,
            } => {
                let mut text = format!(
                    "string of length [{}, {}]",
                    bound(min_length),
                    bound(max_length)
                );
                if let Some(p) = pattern {
                    text.push_str(&format!(" matching /{p}/"));
                }
                text
            }
        }
    }
}

fn in_range<T: PartialOrd>(v: &T, min: Option<&T>, max: Option<&T>) -> bool {
    min.map_or(true, |min| v >= min) && max.map_or(true, |max| v <= max)
}

/// Match a whole string against a pattern.
///
/// Patterns are anchored at both ends. An invalid pattern matches nothing.
pub fn pattern_matches(pattern: &str, value: &str) -> bool {
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => re.is_match(value),
        Err(_) => false,
    }
}

/// Intersection of all rules attached to one property.
///
/// Each field holds the most restrictive bound of its kind; a `None` field
/// means no rule restricts it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleBounds {
    pub int_min: Option<i64>,
    pub int_max: Option<i64>,
    pub decimal_min: Option<Decimal>,
    pub decimal_max: Option<Decimal>,
    pub double_min: Option<f64>,
    pub double_max: Option<f64>,
    pub date_min: Option<DateTime<Utc>>,
    pub date_max: Option<DateTime<Utc>>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
}

impl RuleBounds {
    /// Intersect a set of rules.
    pub fn from_rules(rules: &[PropRule]) -> Self {
        let mut bounds = Self::default();
        for rule in rules {
            match rule {
                PropRule::Integer { min, max } => {
                    bounds.int_min = tighter(bounds.int_min, *min, Ordering::Greater);
                    bounds.int_max = tighter(bounds.int_max, *max, Ordering::Less);
                }
                PropRule::Decimal { min, max } => {
                    bounds.decimal_min = tighter(bounds.decimal_min, *min, Ordering::Greater);
                    bounds.decimal_max = tighter(bounds.decimal_max, *max, Ordering::Less);
                }
                PropRule::Double { min, max } => {
                    bounds.double_min = match (bounds.double_min, *min) {
                        (Some(a), Some(b)) => Some(a.max(b)),
                        (a, b) => a.or(b),
                    };
                    bounds.double_max = match (bounds.double_max, *max) {
                        (Some(a), Some(b)) => Some(a.min(b)),
                        (a, b) => a.or(b),
                    };
                }
                PropRule::Date { min, max } => {
                    bounds.date_min = tighter(bounds.date_min, *min, Ordering::Greater);
                    bounds.date_max = tighter(bounds.date_max, *max, Ordering::Less);
                }
                PropRule::String {
                    min_length,
                    max_length,
                    pattern,
                } => {
                    bounds.min_length = tighter(bounds.min_length, *min_length, Ordering::Greater);
                    bounds.max_length = tighter(bounds.max_length, *max_length, Ordering::Less);
                    // Only one pattern can be honoured by generation; the last one declared wins.
                    if pattern.is_some() {
                        bounds.pattern = pattern.clone();
                    }
                }
            }
        }
        bounds
    }
}

/// Keep whichever bound is more restrictive in the `prefer` direction.
fn tighter<T: Ord>(current: Option<T>, candidate: Option<T>, prefer: Ordering) -> Option<T> {
    match (current, candidate) {
        (Some(a), Some(b)) => {
            if b.cmp(&a) == prefer {
                Some(b)
            } else {
                Some(a)
            }
        }
        (a, b) => a.or(b),
    }
}

/// Comparison operator of an inter-property rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    LessThan,
    LessOrEqual,
    Equal,
    GreaterThan,
    GreaterOrEqual,
}

impl ComparisonOperator {
    /// Whether `left <op> right` holds for an ordering of left relative to right.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Self::LessThan => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
            Self::Equal => ordering == Ordering::Equal,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::GreaterOrEqual => ordering != Ordering::Less,
        }
    }

    /// The operator with its operands swapped: `a < b` is `b > a`.
    pub fn reversed(&self) -> Self {
        match self {
            Self::LessThan => Self::GreaterThan,
            Self::LessOrEqual => Self::GreaterOrEqual,
            Self::Equal => Self::Equal,
            Self::GreaterThan => Self::LessThan,
            Self::GreaterOrEqual => Self::LessOrEqual,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

/// A declared comparison between two properties of the same object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterPropRule {
    /// Rule name, used in broken-rule messages
    #[serde(default)]
    pub name: Option<String>,

    /// Left-hand property name
    pub left: String,

    /// Comparison operator
    pub operator: ComparisonOperator,

    /// Right-hand property name
    pub right: String,
}

impl InterPropRule {
    pub fn new(
        left: impl Into<String>,
        operator: ComparisonOperator,
        right: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            left: left.into(),
            operator,
            right: right.into(),
        }
    }

    /// Check the rule against the two current values.
    ///
    /// A null side satisfies the rule; so do values that cannot be compared.
    pub fn is_satisfied_by(&self, left: &PropValue, right: &PropValue) -> bool {
        if left.is_null() || right.is_null() {
            return true;
        }
        match left.compare(right) {
            Some(ordering) => self.operator.holds(ordering),
            None => true,
        }
    }
}

impl fmt::Display for InterPropRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        write!(f, "{} {} {}", self.left, self.operator.symbol(), self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_bounds_intersect() {
        let rules = vec![
            PropRule::Integer {
                min: Some(1),
                max: Some(100),
            },
            PropRule::Integer {
                min: Some(10),
                max: None,
            },
            PropRule::Integer {
                min: None,
                max: Some(50),
            },
        ];
        let bounds = RuleBounds::from_rules(&rules);
        assert_eq!(bounds.int_min, Some(10));
        assert_eq!(bounds.int_max, Some(50));
    }

    #[test]
    fn test_string_rule_length_and_pattern() {
        let rule = PropRule::String {
            min_length: Some(3),
            max_length: Some(7),
            pattern: Some("[a-z]+".to_string()),
        };
        assert!(rule.is_satisfied_by(&PropValue::from("abcd")));
        assert!(!rule.is_satisfied_by(&PropValue::from("ab")));
        assert!(!rule.is_satisfied_by(&PropValue::from("abcdefgh")));
        assert!(!rule.is_satisfied_by(&PropValue::from("ABCD")));
        assert!(rule.is_satisfied_by(&PropValue::Null));
    }

    #[test]
    fn test_pattern_is_anchored() {
        assert!(pattern_matches("[0-9]{3}", "123"));
        assert!(!pattern_matches("[0-9]{3}", "x123y"));
    }

    #[test]
    fn test_rule_yaml() {
        let rule: PropRule = serde_yaml::from_str("{ type: decimal, min: 1.5, max: \"10.25\" }").unwrap();
        assert_eq!(
            rule,
            PropRule::Decimal {
                min: Some(Decimal::new(15, 1)),
                max: Some(Decimal::new(1025, 2)),
            }
        );
    }

    #[test]
    fn test_inter_prop_rule() {
        let rule = InterPropRule::new("Start", ComparisonOperator::LessThan, "End");
        assert!(rule.is_satisfied_by(&PropValue::Int(1), &PropValue::Int(2)));
        assert!(!rule.is_satisfied_by(&PropValue::Int(2), &PropValue::Int(2)));
        assert!(rule.is_satisfied_by(&PropValue::Null, &PropValue::Int(2)));
        assert_eq!(rule.to_string(), "Start < End");
    }

    #[test]
    fn test_operator_holds() {
        use ComparisonOperator::*;
        assert!(LessOrEqual.holds(Ordering::Equal));
        assert!(!GreaterThan.holds(Ordering::Equal));
        assert!(GreaterOrEqual.holds(Ordering::Greater));
        assert!(Equal.holds(Ordering::Equal));
        assert_eq!(LessThan.reversed(), GreaterThan);
        assert_eq!(GreaterOrEqual.reversed(), LessOrEqual);
        assert_eq!(Equal.reversed(), Equal);
    }
}

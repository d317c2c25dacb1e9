//! Valid value generators, one family per property type.
//!
//! Every generator honours the rules attached to its property and can be
//! asked for a value strictly greater or strictly less than a bound. The
//! effective range is always the intersection of the rules and the bound;
//! when that intersection is empty the generator fails with
//! [`GeneratorError::Unsatisfiable`] rather than widening it.

pub mod bo_list;
pub mod boolean;
pub mod date_time;
pub mod enumeration;
pub mod guid;
pub mod lookup_list;
pub mod name_list;
pub mod numeric;
pub mod regex_pattern;
pub mod string;
pub mod text_file;

use crate::error::GeneratorError;
use bo_core::{PropDef, PropValue};
use rand::rngs::StdRng;
use std::cmp::Ordering;
use std::fmt;

/// Directional constraint on a generated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueBound<'a> {
    /// Rules only
    Unbounded,
    /// Strictly greater than the value
    Above(&'a PropValue),
    /// Strictly less than the value
    Below(&'a PropValue),
}

impl<'a> ValueBound<'a> {
    /// Lower bound; a missing or null value means rules only.
    pub fn above(bound: Option<&'a PropValue>) -> Self {
        match bound {
            Some(v) if !v.is_null() => Self::Above(v),
            _ => Self::Unbounded,
        }
    }

    /// Upper bound; a missing or null value means rules only.
    pub fn below(bound: Option<&'a PropValue>) -> Self {
        match bound {
            Some(v) if !v.is_null() => Self::Below(v),
            _ => Self::Unbounded,
        }
    }

    /// The bound value, if any.
    pub fn value(&self) -> Option<&'a PropValue> {
        match self {
            Self::Unbounded => None,
            Self::Above(v) | Self::Below(v) => Some(v),
        }
    }

    /// Whether a candidate lies on the right side of the bound.
    ///
    /// Candidates that cannot be compared with the bound never pass.
    pub fn admits(&self, candidate: &PropValue) -> bool {
        let (bound, wanted) = match self {
            Self::Unbounded => return true,
            Self::Above(b) => (*b, Ordering::Greater),
            Self::Below(b) => (*b, Ordering::Less),
        };
        compare_to_bound(candidate, bound) == Some(wanted)
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Unbounded => "no bound".to_string(),
            Self::Above(v) => format!("greater than {v}"),
            Self::Below(v) => format!("less than {v}"),
        }
    }
}

/// Order a candidate relative to a bound value.
///
/// Text candidates compared with an integer bound are ordered by length.
pub fn compare_to_bound(candidate: &PropValue, bound: &PropValue) -> Option<Ordering> {
    match (candidate, bound.as_i64()) {
        (PropValue::Text(s), Some(len)) => Some((s.chars().count() as i64).cmp(&len)),
        _ => candidate.compare(bound),
    }
}

/// Produces values that satisfy a property's rules.
pub trait ValidValueGenerator: fmt::Debug + Send {
    /// Generate one value within the rules and the given bound.
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError>;

    /// Generate a value satisfying every rule on the property.
    fn generate_valid_value(&mut self, rng: &mut StdRng) -> Result<PropValue, GeneratorError> {
        self.generate(ValueBound::Unbounded, rng)
    }

    /// Generate a value strictly greater than `bound` and within the rules.
    fn generate_valid_value_greater_than(
        &mut self,
        bound: Option<&PropValue>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        self.generate(ValueBound::above(bound), rng)
    }

    /// Generate a value strictly less than `bound` and within the rules.
    fn generate_valid_value_less_than(
        &mut self,
        bound: Option<&PropValue>,
        rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        self.generate(ValueBound::below(bound), rng)
    }
}

/// A generator that can be built from a property definition alone, and so
/// can be registered by type or by name.
pub trait ValidValueGeneratorType: ValidValueGenerator + Sized + 'static {
    /// Name used in configuration files.
    const NAME: &'static str;

    fn for_prop(prop_def: &PropDef) -> Result<Self, GeneratorError>;
}

/// Deterministic position in a list, private to one generator instance.
#[derive(Debug, Clone, Default)]
pub struct Cycle {
    next: usize,
}

impl Cycle {
    /// Index of the next item in cycle order that passes `accept`, advancing
    /// past it. Wraps at the end of the list.
    pub fn next_index<T>(&mut self, items: &[T], accept: impl Fn(&T) -> bool) -> Option<usize> {
        let len = items.len();
        for offset in 0..len {
            let idx = (self.next + offset) % len;
            if accept(&items[idx]) {
                self.next = (idx + 1) % len;
                return Some(idx);
            }
        }
        None
    }

    /// Restart from the first item.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Fail unless the generator supports the property's type.
pub(crate) fn expect_type(
    generator: &'static str,
    prop_def: &PropDef,
    supported: bool,
) -> Result<(), GeneratorError> {
    if supported {
        Ok(())
    } else {
        Err(GeneratorError::UnsupportedType {
            generator,
            prop: prop_def.name.clone(),
            prop_type: prop_def.prop_type.to_string(),
        })
    }
}

/// Pick the next list value in cycle order that lies within the bound and
/// the rules.
pub(crate) fn next_listed(
    prop_def: &PropDef,
    values: &[PropValue],
    cycle: &mut Cycle,
    bound: ValueBound<'_>,
) -> Result<PropValue, GeneratorError> {
    if let Some(b) = bound.value() {
        if !values.iter().any(|v| compare_to_bound(v, b).is_some()) {
            return Err(GeneratorError::incompatible_bound(&prop_def.name, b));
        }
    }
    let idx = cycle
        .next_index(values, |v| {
            bound.admits(v) && prop_def.rules.iter().all(|r| r.is_satisfied_by(v))
        })
        .ok_or_else(|| {
            GeneratorError::unsatisfiable(
                &prop_def.name,
                format!("no listed value is {}", bound.describe()),
            )
        })?;
    Ok(values[idx].clone())
}

//! Assertions over one property slot of a live business object.

use crate::error::{ensure, AssertionFailure};
use bo_core::{BusinessObject, PropDef, PropValue};

#[derive(Debug)]
pub struct BOPropTester<'a> {
    business_object: &'a BusinessObject,
    prop_def: &'a PropDef,
}

impl<'a> BOPropTester<'a> {
    /// Fails when the object's class does not define `prop`.
    pub fn new(business_object: &'a BusinessObject, prop: &str) -> Result<Self, AssertionFailure> {
        let prop_def = business_object.class_def().get_prop(prop).ok_or_else(|| {
            AssertionFailure::property(
                business_object.class_name(),
                prop,
                "be defined",
                "it is not defined",
            )
        })?;
        Ok(Self {
            business_object,
            prop_def,
        })
    }

    fn value(&self) -> PropValue {
        self.business_object.get_value(&self.prop_def.name)
    }

    fn failure(&self, expected: impl Into<String>, actual: impl Into<String>) -> AssertionFailure {
        AssertionFailure::property(
            self.business_object.class_name(),
            &self.prop_def.name,
            expected,
            actual,
        )
    }

    pub fn should_have_value(&self, expected: impl Into<PropValue>) -> Result<(), AssertionFailure> {
        let (expected, actual) = (expected.into(), self.value());
        ensure(actual == expected, || {
            self.failure(
                format!("have value '{expected}'"),
                format!("its value is '{actual}'"),
            )
        })
    }

    pub fn should_be_null(&self) -> Result<(), AssertionFailure> {
        let actual = self.value();
        ensure(actual.is_null(), || {
            self.failure("be null", format!("its value is '{actual}'"))
        })
    }

    pub fn should_not_be_null(&self) -> Result<(), AssertionFailure> {
        ensure(!self.value().is_null(), || {
            self.failure("not be null", "it is null")
        })
    }

    pub fn should_be_valid(&self) -> Result<(), AssertionFailure> {
        let broken = self.prop_def.broken_rules(&self.value());
        ensure(broken.is_empty(), || {
            self.failure("be valid", format!("it breaks {}", broken.join("; ")))
        })
    }

    pub fn should_not_be_valid(&self) -> Result<(), AssertionFailure> {
        let actual = self.value();
        ensure(!self.prop_def.broken_rules(&actual).is_empty(), || {
            self.failure("not be valid", format!("'{actual}' breaks no rules"))
        })
    }
}

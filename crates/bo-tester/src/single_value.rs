//! Checks shared by properties and single relationships.

use crate::error::{ensure, AssertionFailure};
use bo_core::{ReadWriteRule, SingleValueDef};

/// Compulsory and read/write checks over any [`SingleValueDef`].
#[derive(Debug)]
pub struct SingleValueTester<'a, D: SingleValueDef + ?Sized> {
    def: &'a D,
}

impl<'a, D: SingleValueDef + ?Sized> SingleValueTester<'a, D> {
    pub fn new(def: &'a D) -> Self {
        Self { def }
    }

    pub fn should_be_compulsory(&self) -> Result<(), AssertionFailure> {
        ensure(self.def.compulsory(), || {
            self.failure("be compulsory", "it is not compulsory")
        })
    }

    pub fn should_not_be_compulsory(&self) -> Result<(), AssertionFailure> {
        ensure(!self.def.compulsory(), || {
            self.failure("not be compulsory", "it is compulsory")
        })
    }

    pub fn should_have_read_write_rule(&self, expected: ReadWriteRule) -> Result<(), AssertionFailure> {
        let actual = self.def.read_write_rule();
        ensure(actual == expected, || {
            self.failure(
                format!("have read/write rule {expected:?}"),
                format!("it has {actual:?}"),
            )
        })
    }

    /// A failure naming this property or relationship.
    pub(crate) fn failure(
        &self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> AssertionFailure {
        let (class, name) = (self.def.class_name(), self.def.property_name());
        if self.def.is_relationship() {
            AssertionFailure::relationship(class, name, expected, actual)
        } else {
            AssertionFailure::property(class, name, expected, actual)
        }
    }
}

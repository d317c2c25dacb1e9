//! Assertions over one property definition.

use crate::error::{ensure, AssertionFailure};
use crate::single_value::SingleValueTester;
use bo_core::{LookupList, PropDef, PropRule, PropType, PropValue, ReadWriteRule};

#[derive(Debug)]
pub struct PropDefTester<'a> {
    prop_def: &'a PropDef,
}

impl<'a> PropDefTester<'a> {
    pub fn new(prop_def: &'a PropDef) -> Self {
        Self { prop_def }
    }

    fn single_value(&self) -> SingleValueTester<'a, PropDef> {
        SingleValueTester::new(self.prop_def)
    }

    fn failure(&self, expected: impl Into<String>, actual: impl Into<String>) -> AssertionFailure {
        AssertionFailure::property(
            &self.prop_def.class_name,
            &self.prop_def.name,
            expected,
            actual,
        )
    }

    pub fn should_be_compulsory(&self) -> Result<(), AssertionFailure> {
        self.single_value().should_be_compulsory()
    }

    pub fn should_not_be_compulsory(&self) -> Result<(), AssertionFailure> {
        self.single_value().should_not_be_compulsory()
    }

    pub fn should_have_read_write_rule(&self, expected: ReadWriteRule) -> Result<(), AssertionFailure> {
        self.single_value().should_have_read_write_rule(expected)
    }

    /// The declared default, compared as a typed value when it parses.
    pub fn should_have_default(&self, expected: &str) -> Result<(), AssertionFailure> {
        let actual = self.prop_def.default.as_deref();
        let matches = actual == Some(expected)
            || PropValue::parse_as(expected, &self.prop_def.prop_type)
                .is_some_and(|v| !v.is_null() && v == self.prop_def.default_value());
        ensure(matches, || {
            self.failure(
                format!("have default '{expected}'"),
                match actual {
                    Some(actual) => format!("its default is '{actual}'"),
                    None => "it has no default".to_string(),
                },
            )
        })
    }

    pub fn should_have_type(&self, expected: &PropType) -> Result<(), AssertionFailure> {
        let actual = &self.prop_def.prop_type;
        ensure(actual == expected, || {
            self.failure(format!("be of type {expected}"), format!("it is {actual}"))
        })
    }

    pub fn should_have_rule(&self, expected: &PropRule) -> Result<(), AssertionFailure> {
        ensure(self.prop_def.rules.contains(expected), || {
            let actual: Vec<String> = self.prop_def.rules.iter().map(PropRule::describe).collect();
            self.failure(
                format!("have rule {}", expected.describe()),
                if actual.is_empty() {
                    "it has no rules".to_string()
                } else {
                    format!("its rules are {}", actual.join(", "))
                },
            )
        })
    }

    pub fn should_have_lookup_list(&self) -> Result<(), AssertionFailure> {
        ensure(self.prop_def.lookup_list.is_some(), || {
            self.failure("have a lookup list", "it has none")
        })
    }

    /// A business-object lookup list over the given class.
    pub fn should_have_business_object_lookup_list(
        &self,
        class_name: &str,
    ) -> Result<(), AssertionFailure> {
        let actual = match &self.prop_def.lookup_list {
            Some(LookupList::BusinessObject { class_name }) => Some(class_name.as_str()),
            _ => None,
        };
        ensure(actual == Some(class_name), || {
            self.failure(
                format!("look up '{class_name}' objects"),
                match actual {
                    Some(other) => format!("it looks up '{other}' objects"),
                    None => "it has no business object lookup list".to_string(),
                },
            )
        })
    }
}

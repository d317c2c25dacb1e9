//! Assertions over relationship definitions.

use crate::error::{ensure, AssertionFailure};
use crate::single_value::SingleValueTester;
use bo_core::{DeleteParentAction, RelationshipDef, RelationshipType};

fn failure(
    def: &RelationshipDef,
    expected: impl Into<String>,
    actual: impl Into<String>,
) -> AssertionFailure {
    AssertionFailure::relationship(&def.owner_class, &def.name, expected, actual)
}

fn check_relationship_type(
    def: &RelationshipDef,
    expected: RelationshipType,
) -> Result<(), AssertionFailure> {
    ensure(def.relationship_type == expected, || {
        failure(
            def,
            format!("be of type {expected:?}"),
            format!("it is {:?}", def.relationship_type),
        )
    })
}

fn check_delete_parent_action(
    def: &RelationshipDef,
    expected: DeleteParentAction,
) -> Result<(), AssertionFailure> {
    ensure(def.delete_parent_action == expected, || {
        failure(
            def,
            format!("have delete action {expected:?}"),
            format!("it has {:?}", def.delete_parent_action),
        )
    })
}

fn check_rel_prop(def: &RelationshipDef, owner: &str, related: &str) -> Result<(), AssertionFailure> {
    let found = def
        .rel_props
        .iter()
        .any(|p| p.owner == owner && p.related == related);
    ensure(found, || {
        let actual: Vec<String> = def
            .rel_props
            .iter()
            .map(|p| format!("{} -> {}", p.owner, p.related))
            .collect();
        failure(
            def,
            format!("link {owner} -> {related}"),
            if actual.is_empty() {
                "it has no relationship properties".to_string()
            } else {
                format!("it links {}", actual.join(", "))
            },
        )
    })
}

fn check_cardinality(def: &RelationshipDef, single: bool) -> Result<(), AssertionFailure> {
    let (expected, actual) = if single {
        ("be a single relationship", "it is a multiple relationship")
    } else {
        ("be a multiple relationship", "it is a single relationship")
    };
    ensure(def.is_single() == single, || failure(def, expected, actual))
}

/// Assertions over a single relationship.
#[derive(Debug)]
pub struct SingleRelDefTester<'a> {
    def: &'a RelationshipDef,
}

impl<'a> SingleRelDefTester<'a> {
    /// Fails unless `def` is a single relationship.
    pub fn new(def: &'a RelationshipDef) -> Result<Self, AssertionFailure> {
        check_cardinality(def, true)?;
        Ok(Self { def })
    }

    pub fn should_be_compulsory(&self) -> Result<(), AssertionFailure> {
        SingleValueTester::new(self.def).should_be_compulsory()
    }

    pub fn should_not_be_compulsory(&self) -> Result<(), AssertionFailure> {
        SingleValueTester::new(self.def).should_not_be_compulsory()
    }

    pub fn should_have_relationship_type(
        &self,
        expected: RelationshipType,
    ) -> Result<(), AssertionFailure> {
        check_relationship_type(self.def, expected)
    }

    pub fn should_have_delete_parent_action(
        &self,
        expected: DeleteParentAction,
    ) -> Result<(), AssertionFailure> {
        check_delete_parent_action(self.def, expected)
    }

    pub fn should_have_reverse_relationship(&self, expected: &str) -> Result<(), AssertionFailure> {
        let actual = self.def.reverse.as_deref();
        ensure(actual == Some(expected), || {
            failure(
                self.def,
                format!("have reverse relationship '{expected}'"),
                match actual {
                    Some(actual) => format!("its reverse is '{actual}'"),
                    None => "it has no reverse relationship".to_string(),
                },
            )
        })
    }

    pub fn should_have_rel_prop(&self, owner: &str, related: &str) -> Result<(), AssertionFailure> {
        check_rel_prop(self.def, owner, related)
    }
}

/// Assertions over a multiple relationship.
#[derive(Debug)]
pub struct MultipleRelDefTester<'a> {
    def: &'a RelationshipDef,
}

impl<'a> MultipleRelDefTester<'a> {
    /// Fails unless `def` is a multiple relationship.
    pub fn new(def: &'a RelationshipDef) -> Result<Self, AssertionFailure> {
        check_cardinality(def, false)?;
        Ok(Self { def })
    }

    pub fn should_have_relationship_type(
        &self,
        expected: RelationshipType,
    ) -> Result<(), AssertionFailure> {
        check_relationship_type(self.def, expected)
    }

    pub fn should_have_delete_parent_action(
        &self,
        expected: DeleteParentAction,
    ) -> Result<(), AssertionFailure> {
        check_delete_parent_action(self.def, expected)
    }

    pub fn should_have_rel_prop(&self, owner: &str, related: &str) -> Result<(), AssertionFailure> {
        check_rel_prop(self.def, owner, related)
    }
}

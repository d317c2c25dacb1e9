//! Assertions over a whole business object class.
//!
//! Definition checks only read the [`ClassDef`]. Mapping checks also need the
//! class's [`ObjectAccessors`] table: they push generated values through the
//! typed setters and read them back through the getters, comparing against the
//! property slot the class definition names. A setter or getter wired to the
//! wrong slot shows up as a failure naming the property.

use crate::error::{ensure, AssertionFailure};
use crate::prop_def::PropDefTester;
use crate::relationship::{MultipleRelDefTester, SingleRelDefTester};
use bo_core::{
    BusinessObject, ClassDef, ClassDefCol, ObjectAccessors, PropValue, ReadWriteRule,
    RelationshipDef,
};
use bo_factory::{BOTestFactory, FactoryError, TestContext};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Attempts at generating a value that differs from the slot's current one.
const DISTINCT_VALUE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct BOTester {
    class_def: Arc<ClassDef>,
    accessors: Option<ObjectAccessors>,
}

impl BOTester {
    pub fn new(class_def: Arc<ClassDef>) -> Self {
        Self {
            class_def,
            accessors: None,
        }
    }

    pub fn for_class(class_defs: &ClassDefCol, class_name: &str) -> Result<Self, AssertionFailure> {
        class_defs.get(class_name).map(Self::new).ok_or_else(|| {
            AssertionFailure::class(class_name, "be defined", "it is not in the class definitions")
        })
    }

    /// Attach the accessor table used by the mapping checks.
    pub fn with_accessors(mut self, accessors: ObjectAccessors) -> Self {
        self.accessors = Some(accessors);
        self
    }

    pub fn class_def(&self) -> &Arc<ClassDef> {
        &self.class_def
    }

    fn class_name(&self) -> &str {
        &self.class_def.name
    }

    // ------------------------------------------------------------------
    // Definition checks
    // ------------------------------------------------------------------

    pub fn prop_tester(&self, prop: &str) -> Result<PropDefTester<'_>, AssertionFailure> {
        self.class_def
            .get_prop(prop)
            .map(PropDefTester::new)
            .ok_or_else(|| {
                AssertionFailure::property(self.class_name(), prop, "be defined", "it is not defined")
            })
    }

    pub fn single_relationship_tester(
        &self,
        relationship: &str,
    ) -> Result<SingleRelDefTester<'_>, AssertionFailure> {
        SingleRelDefTester::new(self.relationship_def(relationship)?)
    }

    pub fn multiple_relationship_tester(
        &self,
        relationship: &str,
    ) -> Result<MultipleRelDefTester<'_>, AssertionFailure> {
        MultipleRelDefTester::new(self.relationship_def(relationship)?)
    }

    fn relationship_def(&self, relationship: &str) -> Result<&RelationshipDef, AssertionFailure> {
        self.class_def.get_relationship(relationship).ok_or_else(|| {
            AssertionFailure::relationship(
                self.class_name(),
                relationship,
                "be defined",
                "it is not defined",
            )
        })
    }

    pub fn should_have_property(&self, prop: &str) -> Result<(), AssertionFailure> {
        self.prop_tester(prop).map(|_| ())
    }

    pub fn should_have_single_relationship(&self, relationship: &str) -> Result<(), AssertionFailure> {
        self.single_relationship_tester(relationship).map(|_| ())
    }

    pub fn should_have_multiple_relationship(
        &self,
        relationship: &str,
    ) -> Result<(), AssertionFailure> {
        self.multiple_relationship_tester(relationship).map(|_| ())
    }

    pub fn should_be_compulsory(&self, prop: &str) -> Result<(), AssertionFailure> {
        self.prop_tester(prop)?.should_be_compulsory()
    }

    pub fn should_have_default(&self, prop: &str, expected: &str) -> Result<(), AssertionFailure> {
        self.prop_tester(prop)?.should_have_default(expected)
    }

    pub fn should_have_read_write_rule(
        &self,
        prop: &str,
        expected: ReadWriteRule,
    ) -> Result<(), AssertionFailure> {
        self.prop_tester(prop)?.should_have_read_write_rule(expected)
    }

    /// The given properties, in any order, form one declared unique key.
    pub fn should_be_unique_constraint(&self, props: &[&str]) -> Result<(), AssertionFailure> {
        for prop in props {
            self.should_have_property(prop)?;
        }
        ensure(self.class_def.has_unique_constraint(props), || {
            let keys: Vec<String> = self
                .class_def
                .keys
                .iter()
                .map(|k| format!("[{}]", k.props.join(", ")))
                .collect();
            AssertionFailure::class(
                self.class_name(),
                format!("have a unique constraint on [{}]", props.join(", ")),
                if keys.is_empty() {
                    "it has no unique constraints".to_string()
                } else {
                    format!("its unique constraints are {}", keys.join(", "))
                },
            )
        })
    }

    // ------------------------------------------------------------------
    // Mapping checks
    // ------------------------------------------------------------------

    fn accessors(&self) -> Result<&ObjectAccessors, AssertionFailure> {
        self.accessors.as_ref().ok_or_else(|| {
            AssertionFailure::class(
                self.class_name(),
                "have an accessor table for mapping checks",
                "none was attached",
            )
        })
    }

    fn factory(&self, ctx: &TestContext) -> Result<BOTestFactory, AssertionFailure> {
        ctx.factory(self.class_name())
            .map_err(|e| self.setup_failure("have a test factory", e))
    }

    fn setup_failure(&self, expected: &str, error: FactoryError) -> AssertionFailure {
        AssertionFailure::class(self.class_name(), expected, error.to_string())
    }

    /// Setting a generated value through the setter changes exactly the
    /// property's own slot, and the getter reads it back.
    pub fn should_have_property_mapped(
        &self,
        prop: &str,
        ctx: &mut TestContext,
    ) -> Result<(), AssertionFailure> {
        self.should_have_property(prop)?;
        let failure = |expected: &str, actual: String| {
            AssertionFailure::property(self.class_name(), prop, expected, actual)
        };
        let accessor = self.accessors()?.get_property(prop).copied().unwrap_or_default();
        let (Some(getter), Some(setter)) = (accessor.getter, accessor.setter) else {
            return Err(failure(
                "have a getter and a setter",
                format!(
                    "getter is {} and setter is {}",
                    presence(accessor.getter.is_some()),
                    presence(accessor.setter.is_some())
                ),
            ));
        };

        let mut factory = self.factory(ctx)?;
        let mut bo = factory.create_default_business_object();
        let before = slots(&bo);
        let current = bo.get_value(prop);

        let mut value = PropValue::Null;
        for _ in 0..DISTINCT_VALUE_ATTEMPTS {
            value = factory
                .get_valid_prop_value(prop, ctx)
                .map_err(|e| failure("have a valid value generated", e.to_string()))?;
            if value != current {
                break;
            }
        }
        debug!("Checking mapping of '{}.{}' with {}", self.class_name(), prop, value);

        setter(&mut bo, value.clone())
            .map_err(|e| failure("accept a valid value through its setter", e.to_string()))?;

        let stored = bo.get_value(prop);
        ensure(stored == value, || {
            failure(
                "store the set value in its own slot",
                format!("'{value}' was set but the slot holds '{stored}'"),
            )
        })?;

        let after = slots(&bo);
        if let Some(other) = before
            .keys()
            .filter(|name| name.as_str() != prop)
            .find(|name| before.get(*name) != after.get(*name))
        {
            return Err(failure(
                "leave every other slot unchanged",
                format!("setting it changed '{other}'"),
            ));
        }

        let read = getter(&bo);
        ensure(read == value, || {
            failure(
                "return the set value from its getter",
                format!("'{value}' was set but the getter returned '{read}'"),
            )
        })
    }

    /// Every property with both accessors is mapped, and no accessor names a
    /// property the class does not define.
    pub fn should_have_all_props_mapped(&self, ctx: &mut TestContext) -> Result<(), AssertionFailure> {
        let accessors = self.accessors()?;
        if let Some(unknown) = accessors
            .property_names()
            .find(|name| self.class_def.get_prop(name).is_none())
        {
            return Err(AssertionFailure::class(
                self.class_name(),
                "expose accessors only for defined properties",
                format!("'{unknown}' has accessors without a definition"),
            ));
        }
        let mapped: Vec<String> = self
            .class_def
            .props
            .iter()
            .filter(|p| {
                accessors
                    .get_property(&p.name)
                    .is_some_and(|a| a.getter.is_some() && a.setter.is_some())
            })
            .map(|p| p.name.clone())
            .collect();
        for prop in &mapped {
            self.should_have_property_mapped(prop, ctx)?;
        }
        Ok(())
    }

    /// Setting a saved related object through the setter links it, and the
    /// getter returns the same object.
    pub fn should_have_single_relationship_mapped(
        &self,
        relationship: &str,
        ctx: &mut TestContext,
    ) -> Result<(), AssertionFailure> {
        self.single_relationship_tester(relationship)?;
        let related_class = self.relationship_def(relationship)?.related_class.clone();
        let failure = |expected: &str, actual: String| {
            AssertionFailure::relationship(self.class_name(), relationship, expected, actual)
        };
        let accessor = self
            .accessors()?
            .get_relationship(relationship)
            .copied()
            .unwrap_or_default();
        let (Some(getter), Some(setter)) = (accessor.getter, accessor.setter) else {
            return Err(failure(
                "have a getter and a setter",
                format!(
                    "getter is {} and setter is {}",
                    presence(accessor.getter.is_some()),
                    presence(accessor.setter.is_some())
                ),
            ));
        };

        let related = ctx
            .create_saved(&related_class)
            .map_err(|e| failure("have a saved related object created", e.to_string()))?;
        let related_id = related.id();
        let mut bo = self.factory(ctx)?.create_default_business_object();
        debug!(
            "Checking mapping of '{}.{}' with '{}' {}",
            self.class_name(),
            relationship,
            related_class,
            related_id
        );

        setter(&mut bo, Some(related))
            .map_err(|e| failure("accept a related object through its setter", e.to_string()))?;

        let stored = bo.related(relationship).map(BusinessObject::id);
        ensure(stored == Some(related_id), || {
            failure(
                "link the set object in its own slot",
                match stored {
                    Some(other) => format!("{related_id} was set but {other} is linked"),
                    None => format!("{related_id} was set but nothing is linked"),
                },
            )
        })?;

        let read = getter(&bo).map(BusinessObject::id);
        ensure(read == Some(related_id), || {
            failure(
                "return the set object from its getter",
                match read {
                    Some(other) => format!("{related_id} was set but the getter returned {other}"),
                    None => format!("{related_id} was set but the getter returned nothing"),
                },
            )
        })
    }
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "missing"
    }
}

fn slots(bo: &BusinessObject) -> BTreeMap<String, PropValue> {
    bo.class_def()
        .props
        .iter()
        .map(|p| (p.name.clone(), bo.get_value(&p.name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_core::{PropDef, PropType};

    fn class_defs() -> ClassDefCol {
        ClassDefCol::new(vec![
            ClassDef::new("Contact")
                .with_prop(PropDef::new("Surname", PropType::String).compulsory())
                .with_prop(PropDef::new("FirstName", PropType::String))
                .with_prop(PropDef::new("Age", PropType::Int).with_default("30"))
                .with_key("NameKey", &["Surname", "FirstName"])
                .with_relationship(RelationshipDef::single("Company", "Company"))
                .with_relationship(RelationshipDef::multiple("Addresses", "Address")),
            ClassDef::new("Company").with_prop(PropDef::new("Name", PropType::String).compulsory()),
            ClassDef::new("Address").with_prop(PropDef::new("Street", PropType::String)),
        ])
    }

    fn accessors() -> ObjectAccessors {
        ObjectAccessors::new("Contact")
            .property(
                "Surname",
                |bo| bo.get_value("Surname"),
                |bo, v| bo.set_value("Surname", v),
            )
            .property(
                "FirstName",
                |bo| bo.get_value("FirstName"),
                |bo, v| bo.set_value("FirstName", v),
            )
            .read_only_property("Age", |bo| bo.get_value("Age"))
            .relationship(
                "Company",
                |bo| bo.related("Company"),
                |bo, related| bo.set_related("Company", related),
            )
    }

    fn tester(class_defs: &ClassDefCol) -> BOTester {
        BOTester::for_class(class_defs, "Contact")
            .unwrap()
            .with_accessors(accessors())
    }

    #[test]
    fn test_definition_checks() {
        let class_defs = class_defs();
        let tester = tester(&class_defs);
        assert!(tester.should_have_property("Surname").is_ok());
        assert!(tester.should_have_property("Email").is_err());
        assert!(tester.should_have_single_relationship("Company").is_ok());
        assert!(tester.should_have_single_relationship("Addresses").is_err());
        assert!(tester.should_have_multiple_relationship("Addresses").is_ok());
        assert!(tester.should_be_compulsory("Surname").is_ok());
        assert!(tester.should_be_compulsory("FirstName").is_err());
        assert!(tester.should_have_default("Age", "30").is_ok());
        assert!(tester
            .should_have_read_write_rule("Age", ReadWriteRule::ReadWrite)
            .is_ok());
        assert!(tester.should_be_unique_constraint(&["FirstName", "Surname"]).is_ok());

        let err = tester.should_be_unique_constraint(&["Surname"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Class 'Contact' should have a unique constraint on [Surname], \
             but its unique constraints are [Surname, FirstName]"
        );
        assert!(BOTester::for_class(&class_defs, "Supplier").is_err());
    }

    #[test]
    fn test_property_mapped() {
        let class_defs = class_defs();
        let tester = tester(&class_defs);
        let mut ctx = TestContext::new(class_defs);
        assert!(tester.should_have_property_mapped("Surname", &mut ctx).is_ok());
        assert!(tester.should_have_all_props_mapped(&mut ctx).is_ok());

        let err = tester.should_have_property_mapped("Age", &mut ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Property 'Age' on 'Contact' should have a getter and a setter, \
             but getter is present and setter is missing"
        );
    }

    #[test]
    fn test_setter_wired_to_the_wrong_slot() {
        let class_defs = class_defs();
        let accessors = accessors().property(
            "FirstName",
            |bo| bo.get_value("FirstName"),
            |bo, v| bo.set_value("Surname", v),
        );
        let tester = BOTester::for_class(&class_defs, "Contact")
            .unwrap()
            .with_accessors(accessors);
        let mut ctx = TestContext::new(class_defs);

        let err = tester
            .should_have_property_mapped("FirstName", &mut ctx)
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Property 'FirstName' on 'Contact' should store the set value in its own slot"));
        assert!(tester.should_have_all_props_mapped(&mut ctx).is_err());
    }

    #[test]
    fn test_getter_wired_to_the_wrong_slot() {
        let class_defs = class_defs();
        let accessors = accessors().property(
            "FirstName",
            |bo| bo.get_value("Surname"),
            |bo, v| bo.set_value("FirstName", v),
        );
        let tester = BOTester::new(class_defs.get("Contact").unwrap()).with_accessors(accessors);
        let mut ctx = TestContext::new(class_defs);

        let err = tester
            .should_have_property_mapped("FirstName", &mut ctx)
            .unwrap_err();
        assert!(err.to_string().contains("return the set value from its getter"));
    }

    #[test]
    fn test_accessor_for_undefined_property() {
        let class_defs = class_defs();
        let accessors = accessors().property(
            "Email",
            |bo| bo.get_value("Email"),
            |bo, v| bo.set_value("Email", v),
        );
        let tester = BOTester::new(class_defs.get("Contact").unwrap()).with_accessors(accessors);
        let mut ctx = TestContext::new(class_defs);

        let err = tester.should_have_all_props_mapped(&mut ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Class 'Contact' should expose accessors only for defined properties, \
             but 'Email' has accessors without a definition"
        );
    }

    #[test]
    fn test_single_relationship_mapped() {
        let class_defs = class_defs();
        let tester = tester(&class_defs);
        let mut ctx = TestContext::new(class_defs);
        assert!(tester
            .should_have_single_relationship_mapped("Company", &mut ctx)
            .is_ok());
        assert!(tester
            .should_have_single_relationship_mapped("Addresses", &mut ctx)
            .is_err());
    }

    #[test]
    fn test_mapping_checks_need_accessors() {
        let class_defs = class_defs();
        let tester = BOTester::for_class(&class_defs, "Contact").unwrap();
        let mut ctx = TestContext::new(class_defs);
        let err = tester
            .should_have_property_mapped("Surname", &mut ctx)
            .unwrap_err();
        assert!(matches!(err, AssertionFailure::Class { .. }));
    }
}

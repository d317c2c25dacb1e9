//! Test factory building default, valid and saved business objects.
//!
//! Making an object valid runs four steps in order:
//!
//! 1. every compulsory property holding null gets its pinned value, else a
//!    generated one; key properties of compulsory single relationships are
//!    left to step 2;
//! 2. every compulsory single relationship that is not set gets its pinned
//!    related object, else the next object of a configured list, else a
//!    fresh saved object from the related class's factory;
//! 3. broken inter-property rules are repaired by regenerating one side,
//!    repeating until every rule holds or the pass cap is reached;
//! 4. non-compulsory properties and relationships are filled only when
//!    pinned or requested.
//!
//! A factory caches one generator per property, so list-backed values keep
//! cycling across the objects one factory builds.

use crate::context::{lookup_class, TestContext};
use crate::defaults::{BODefaultValueRegistry, PinnedValue};
use crate::error::FactoryError;
use bo_core::{
    BusinessObject, ClassDef, ClassDefCol, ComparisonOperator, InterPropRule, LookupList, PropDef,
    PropValue, RelationshipDef,
};
use bo_generator::{
    BusinessObjectListGenerator, GeneratorError, ValidValueGenerator, ValueBound,
};
use bo_generator::random::random_guid;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of children requested for a multiple relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildCount {
    Exactly(usize),
    /// `FactoryConfig::many_count`
    Many,
}

/// Builds business objects of one class for tests.
#[derive(Debug)]
pub struct BOTestFactory {
    class_def: Arc<ClassDef>,
    business_object: Option<BusinessObject>,
    defaults: BODefaultValueRegistry,
    requested_props: BTreeSet<String>,
    requested_related: BTreeSet<String>,
    requested_children: BTreeMap<String, ChildCount>,
    /// Lists to pick related objects from; `None` loads from the data accessor
    related_lists: HashMap<String, Option<BusinessObjectListGenerator>>,
    generators: HashMap<String, Box<dyn ValidValueGenerator>>,
    lookup_objects: HashMap<String, BusinessObjectListGenerator>,
    related_factories: HashMap<String, BOTestFactory>,
}

// A copy keeps the configuration but starts generator cycles afresh.
impl Clone for BOTestFactory {
    fn clone(&self) -> Self {
        Self {
            class_def: Arc::clone(&self.class_def),
            business_object: self.business_object.clone(),
            defaults: self.defaults.clone(),
            requested_props: self.requested_props.clone(),
            requested_related: self.requested_related.clone(),
            requested_children: self.requested_children.clone(),
            related_lists: self.related_lists.clone(),
            generators: HashMap::new(),
            lookup_objects: HashMap::new(),
            related_factories: HashMap::new(),
        }
    }
}

impl BOTestFactory {
    /// Create a factory with no target business object.
    pub fn new(class_def: Arc<ClassDef>) -> Self {
        Self {
            class_def,
            business_object: None,
            defaults: BODefaultValueRegistry::new(),
            requested_props: BTreeSet::new(),
            requested_related: BTreeSet::new(),
            requested_children: BTreeMap::new(),
            related_lists: HashMap::new(),
            generators: HashMap::new(),
            lookup_objects: HashMap::new(),
            related_factories: HashMap::new(),
        }
    }

    /// Create a factory for a class in the loaded definitions.
    pub fn for_class(class_defs: &ClassDefCol, class_name: &str) -> Result<Self, FactoryError> {
        Ok(Self::new(lookup_class(class_defs, class_name)?))
    }

    /// Set the object the next `create_valid_business_object` call fills in.
    pub fn with_business_object(mut self, bo: BusinessObject) -> Result<Self, FactoryError> {
        self.check_class(&bo)?;
        self.business_object = Some(bo);
        Ok(self)
    }

    pub fn class_def(&self) -> &Arc<ClassDef> {
        &self.class_def
    }

    pub fn class_name(&self) -> &str {
        &self.class_def.name
    }

    /// The target business object, if one is set.
    pub fn business_object(&self) -> Option<&BusinessObject> {
        self.business_object.as_ref()
    }

    /// Values pinned on this factory.
    pub fn defaults(&self) -> &BODefaultValueRegistry {
        &self.defaults
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Pin a property value for every object this factory builds.
    pub fn set_value_for(
        mut self,
        prop: &str,
        value: impl Into<PropValue>,
    ) -> Result<Self, FactoryError> {
        self.prop_def(prop)?;
        self.defaults.register_value(prop, value);
        Ok(self)
    }

    /// Pin the related object (or explicitly none) of a single relationship.
    pub fn set_related_for(
        mut self,
        relationship: &str,
        related: Option<BusinessObject>,
    ) -> Result<Self, FactoryError> {
        self.single_def(relationship)?;
        self.defaults.register(relationship, related);
        Ok(self)
    }

    /// Pick related objects of a single relationship from a list, cycling in
    /// order. `None` uses every persisted object of the related class.
    pub fn select_related_from(
        mut self,
        relationship: &str,
        objects: Option<Vec<BusinessObject>>,
    ) -> Result<Self, FactoryError> {
        let related_class = self.single_def(relationship)?.related_class.clone();
        let list = objects.map(|objects| BusinessObjectListGenerator::new(related_class, objects));
        self.related_lists.insert(relationship.to_string(), list);
        Ok(self)
    }

    /// Generate a value for a non-compulsory property as well.
    pub fn with_valid_value_for(mut self, prop: &str) -> Result<Self, FactoryError> {
        self.prop_def(prop)?;
        self.requested_props.insert(prop.to_string());
        Ok(self)
    }

    /// Populate a non-compulsory single relationship, or create one child
    /// for a multiple relationship.
    pub fn with_one(mut self, relationship: &str) -> Result<Self, FactoryError> {
        if self.relationship_def(relationship)?.is_single() {
            self.requested_related.insert(relationship.to_string());
            Ok(self)
        } else {
            self.with_children(relationship, 1)
        }
    }

    /// Create two children for a multiple relationship.
    pub fn with_two(self, relationship: &str) -> Result<Self, FactoryError> {
        self.with_children(relationship, 2)
    }

    /// Create `FactoryConfig::many_count` children for a multiple relationship.
    pub fn with_many(mut self, relationship: &str) -> Result<Self, FactoryError> {
        self.multiple_def(relationship)?;
        self.requested_children
            .insert(relationship.to_string(), ChildCount::Many);
        Ok(self)
    }

    /// Create exactly `count` children for a multiple relationship.
    pub fn with_children(mut self, relationship: &str, count: usize) -> Result<Self, FactoryError> {
        self.multiple_def(relationship)?;
        self.requested_children
            .insert(relationship.to_string(), ChildCount::Exactly(count));
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// A new object with every property at its declared default.
    pub fn create_default_business_object(&self) -> BusinessObject {
        BusinessObject::new(Arc::clone(&self.class_def))
    }

    /// Like [`create_default_business_object`](Self::create_default_business_object),
    /// but the id is drawn from the context rng so a fixed seed reproduces it.
    pub fn create_seeded_business_object(&self, ctx: &mut TestContext) -> BusinessObject {
        BusinessObject::with_id(Arc::clone(&self.class_def), random_guid(ctx.rng()))
    }

    /// A valid object. Uses up the target business object if one is set.
    pub fn create_valid_business_object(
        &mut self,
        ctx: &mut TestContext,
    ) -> Result<BusinessObject, FactoryError> {
        let mut bo = match self.business_object.take() {
            Some(bo) => bo,
            None => self.create_seeded_business_object(ctx),
        };
        self.make_valid(&mut bo, ctx)?;
        info!("Created valid '{}' {}", bo.class_name(), bo.id());
        Ok(bo)
    }

    /// A valid object saved through the context's data accessor.
    pub fn create_saved_business_object(
        &mut self,
        ctx: &mut TestContext,
    ) -> Result<BusinessObject, FactoryError> {
        let mut bo = self.create_valid_business_object(ctx)?;
        ctx.accessor_mut().save_graph(&mut bo)?;
        info!("Saved '{}' {}", bo.class_name(), bo.id());
        Ok(bo)
    }

    /// Make an existing object valid.
    pub fn make_valid(
        &mut self,
        bo: &mut BusinessObject,
        ctx: &mut TestContext,
    ) -> Result<(), FactoryError> {
        self.check_class(bo)?;
        self.populate_props(bo, ctx)?;
        self.populate_relationships(bo, ctx)?;
        self.fix_inter_prop_rules(bo, ctx)?;
        self.populate_children(bo, ctx)?;
        Ok(())
    }

    /// Make an existing object valid and save it with everything it references.
    pub fn make_saved(
        &mut self,
        bo: &mut BusinessObject,
        ctx: &mut TestContext,
    ) -> Result<(), FactoryError> {
        self.make_valid(bo, ctx)?;
        ctx.accessor_mut().save_graph(bo)?;
        Ok(())
    }

    /// One valid value for a property, honouring pins.
    pub fn get_valid_prop_value(
        &mut self,
        prop: &str,
        ctx: &mut TestContext,
    ) -> Result<PropValue, FactoryError> {
        let class_def = Arc::clone(&self.class_def);
        let prop_def = class_def.prop(prop).map_err(FactoryError::from_definition)?;
        if let Some(value) = self.pinned(prop, ctx).as_ref().and_then(PinnedValue::as_value) {
            return Ok(value.clone());
        }
        self.generate_value(prop_def, ValueBound::Unbounded, ctx)
    }

    // ------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------

    fn populate_props(
        &mut self,
        bo: &mut BusinessObject,
        ctx: &mut TestContext,
    ) -> Result<(), FactoryError> {
        let class_def = Arc::clone(&self.class_def);
        for prop in &class_def.props {
            let current = bo.get_value(&prop.name);
            if let Some(pinned) = self.pinned(&prop.name, ctx) {
                if current.is_null() || current == prop.default_value() {
                    let value = pinned.as_value().cloned().ok_or_else(|| {
                        FactoryError::Config(format!(
                            "a related object is pinned for property '{}' on '{}'",
                            prop.name, class_def.name
                        ))
                    })?;
                    bo.set_value(&prop.name, value)?;
                }
                continue;
            }
            let wanted = prop.compulsory || self.requested_props.contains(&prop.name);
            if !wanted
                || !current.is_null()
                || class_def.is_compulsory_relationship_key(&prop.name)
            {
                continue;
            }
            let value = self.generate_value(prop, ValueBound::Unbounded, ctx)?;
            bo.set_value(&prop.name, value)?;
        }
        Ok(())
    }

    fn populate_relationships(
        &mut self,
        bo: &mut BusinessObject,
        ctx: &mut TestContext,
    ) -> Result<(), FactoryError> {
        let class_def = Arc::clone(&self.class_def);
        for rel in class_def.single_relationships() {
            if let Some(pinned) = self.pinned(&rel.name, ctx) {
                if !bo.is_relationship_set(&rel.name) {
                    let related = match pinned {
                        PinnedValue::Related(related) => related,
                        PinnedValue::Value(_) => {
                            return Err(FactoryError::Config(format!(
                                "a property value is pinned for relationship '{}' on '{}'",
                                rel.name, class_def.name
                            )))
                        }
                    };
                    bo.set_related(&rel.name, related)?;
                }
                continue;
            }
            let wanted = rel.compulsory || self.requested_related.contains(&rel.name);
            if !wanted || bo.is_relationship_set(&rel.name) {
                continue;
            }
            let related = self.choose_related(rel, ctx)?;
            debug!(
                "Linked '{}.{}' to '{}' {}",
                class_def.name,
                rel.name,
                related.class_name(),
                related.id()
            );
            bo.set_related(&rel.name, Some(related))?;
        }
        Ok(())
    }

    fn fix_inter_prop_rules(
        &mut self,
        bo: &mut BusinessObject,
        ctx: &mut TestContext,
    ) -> Result<(), FactoryError> {
        let class_def = Arc::clone(&self.class_def);
        for rule in &class_def.inter_prop_rules {
            if self.is_pinned(&rule.left, ctx) && self.is_pinned(&rule.right, ctx) {
                warn!(
                    "Both sides of '{}' on '{}' are pinned; leaving the rule alone",
                    rule, class_def.name
                );
            }
        }

        let max_passes = ctx.config().max_rule_fixup_passes;
        let mut passes = 0;
        loop {
            let broken = self.broken_inter_prop_rules(&class_def, bo, ctx);
            if broken.is_empty() {
                return Ok(());
            }
            if passes == max_passes {
                return Err(FactoryError::InterPropRulesUnresolved {
                    class: class_def.name.clone(),
                    passes,
                    rules: broken.iter().map(|r| r.to_string()).collect(),
                });
            }
            passes += 1;
            for rule in broken {
                if rule.is_satisfied_by(&bo.get_value(&rule.left), &bo.get_value(&rule.right)) {
                    continue;
                }
                self.fix_rule(&class_def, rule, bo, ctx)?;
            }
        }
    }

    fn populate_children(
        &mut self,
        bo: &mut BusinessObject,
        ctx: &mut TestContext,
    ) -> Result<(), FactoryError> {
        let class_def = Arc::clone(&self.class_def);
        let requested: Vec<(String, ChildCount)> = self
            .requested_children
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        for (name, count) in requested {
            let rel = class_def
                .relationship(&name)
                .map_err(FactoryError::from_definition)?;
            let wanted = match count {
                ChildCount::Exactly(n) => n,
                ChildCount::Many => ctx.config().many_count,
            };
            let missing = wanted.saturating_sub(bo.children(&name).len());
            for _ in 0..missing {
                let child = self.create_child(bo, rel, ctx)?;
                bo.add_child(&name, child)?;
            }
            debug!("Added {} '{}' children to '{}'", missing, name, class_def.name);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inter-property rules
    // ------------------------------------------------------------------

    /// Rules currently broken, leaving out rules with both sides pinned.
    fn broken_inter_prop_rules<'a>(
        &self,
        class_def: &'a ClassDef,
        bo: &BusinessObject,
        ctx: &TestContext,
    ) -> Vec<&'a InterPropRule> {
        class_def
            .inter_prop_rules
            .iter()
            .filter(|rule| {
                !rule.is_satisfied_by(&bo.get_value(&rule.left), &bo.get_value(&rule.right))
            })
            .filter(|rule| !(self.is_pinned(&rule.left, ctx) && self.is_pinned(&rule.right, ctx)))
            .collect()
    }

    /// Regenerate the right side of a broken rule, or the left side when the
    /// right side is pinned or cannot move.
    fn fix_rule(
        &mut self,
        class_def: &ClassDef,
        rule: &InterPropRule,
        bo: &mut BusinessObject,
        ctx: &mut TestContext,
    ) -> Result<(), FactoryError> {
        let right_pinned = self.is_pinned(&rule.right, ctx);
        let left_pinned = self.is_pinned(&rule.left, ctx);
        match self.move_side(class_def, rule, !right_pinned, bo, ctx) {
            Err(FactoryError::Generator(GeneratorError::Unsatisfiable { prop, reason }))
                if !left_pinned && !right_pinned =>
            {
                debug!(
                    "'{}' cannot move ({}); moving '{}' instead",
                    prop, reason, rule.left
                );
                self.move_side(class_def, rule, false, bo, ctx)
            }
            other => other,
        }
    }

    fn move_side(
        &mut self,
        class_def: &ClassDef,
        rule: &InterPropRule,
        move_right: bool,
        bo: &mut BusinessObject,
        ctx: &mut TestContext,
    ) -> Result<(), FactoryError> {
        // The moved side must satisfy `anchor <op> target`.
        let (target, anchor, op) = if move_right {
            (&rule.right, &rule.left, rule.operator)
        } else {
            (&rule.left, &rule.right, rule.operator.reversed())
        };
        let prop_def = class_def
            .prop(target)
            .map_err(FactoryError::from_definition)?;
        let anchor_value = bo.get_value(anchor);

        let value = match op {
            ComparisonOperator::Equal => coerce(&anchor_value, prop_def),
            ComparisonOperator::LessThan => {
                self.generate_value(prop_def, ValueBound::Above(&anchor_value), ctx)?
            }
            ComparisonOperator::GreaterThan => {
                self.generate_value(prop_def, ValueBound::Below(&anchor_value), ctx)?
            }
            ComparisonOperator::LessOrEqual | ComparisonOperator::GreaterOrEqual => {
                let bound = if op == ComparisonOperator::LessOrEqual {
                    ValueBound::Above(&anchor_value)
                } else {
                    ValueBound::Below(&anchor_value)
                };
                match self.generate_value(prop_def, bound, ctx) {
                    Err(FactoryError::Generator(GeneratorError::Unsatisfiable { .. }))
                        if prop_def.broken_rules(&anchor_value).is_empty() =>
                    {
                        coerce(&anchor_value, prop_def)
                    }
                    other => other?,
                }
            }
        };
        debug!(
            "Set '{}.{}' to {} for '{}'",
            class_def.name, target, value, rule
        );
        bo.set_value(target, value)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Values and related objects
    // ------------------------------------------------------------------

    fn generate_value(
        &mut self,
        prop_def: &PropDef,
        bound: ValueBound<'_>,
        ctx: &mut TestContext,
    ) -> Result<PropValue, FactoryError> {
        if let Some(LookupList::BusinessObject { class_name }) = &prop_def.lookup_list {
            return self.next_lookup_object(class_name, bound, ctx);
        }
        let generator = match self.generators.entry(prop_def.name.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(ctx.generators.resolve(prop_def)?),
        };
        let value = generator.generate(bound, ctx.rng())?;
        debug!(
            "Generated {} for '{}.{}'",
            value, prop_def.class_name, prop_def.name
        );
        Ok(value)
    }

    /// Id of the next object of a business-object lookup list, creating and
    /// saving one when none exist.
    fn next_lookup_object(
        &mut self,
        class_name: &str,
        bound: ValueBound<'_>,
        ctx: &mut TestContext,
    ) -> Result<PropValue, FactoryError> {
        if !self.lookup_objects.contains_key(class_name) {
            let list = BusinessObjectListGenerator::from_accessor(class_name, ctx.accessor());
            self.lookup_objects.insert(class_name.to_string(), list);
        }
        if self
            .lookup_objects
            .get(class_name)
            .is_some_and(BusinessObjectListGenerator::is_empty)
        {
            let fresh = self.create_related(class_name, ctx)?;
            if let Some(list) = self.lookup_objects.get_mut(class_name) {
                list.push(fresh);
            }
        }
        let list = self
            .lookup_objects
            .get_mut(class_name)
            .ok_or_else(|| GeneratorError::EmptyBusinessObjectList(class_name.to_string()))?;
        Ok(list.generate(bound, ctx.rng())?)
    }

    fn choose_related(
        &mut self,
        rel: &RelationshipDef,
        ctx: &mut TestContext,
    ) -> Result<BusinessObject, FactoryError> {
        let listed = match self.related_lists.get_mut(&rel.name) {
            Some(slot) => slot
                .get_or_insert_with(|| {
                    BusinessObjectListGenerator::from_accessor(&rel.related_class, ctx.accessor())
                })
                .next_object()
                .ok(),
            None => None,
        };
        if let Some(related) = listed {
            return Ok(related);
        }

        let fresh = self.create_related(&rel.related_class, ctx)?;
        if let Some(Some(list)) = self.related_lists.get_mut(&rel.name) {
            warn!(
                "No '{}' objects to select for '{}.{}'; created a new one",
                rel.related_class, rel.owner_class, rel.name
            );
            list.push(fresh.clone());
        }
        Ok(fresh)
    }

    /// A saved object from the related class's factory.
    fn create_related(
        &mut self,
        class_name: &str,
        ctx: &mut TestContext,
    ) -> Result<BusinessObject, FactoryError> {
        ctx.descend(&self.class_def.name)?;
        let result = match self.related_factory(class_name, ctx) {
            Ok(factory) => factory.create_saved_business_object(ctx),
            Err(e) => Err(e),
        };
        ctx.ascend();
        result
    }

    /// A valid child linked to its owner by the relationship keys.
    fn create_child(
        &mut self,
        owner: &BusinessObject,
        rel: &RelationshipDef,
        ctx: &mut TestContext,
    ) -> Result<BusinessObject, FactoryError> {
        ctx.descend(&self.class_def.name)?;
        let result = self.build_child(owner, rel, ctx);
        ctx.ascend();
        result
    }

    fn build_child(
        &mut self,
        owner: &BusinessObject,
        rel: &RelationshipDef,
        ctx: &mut TestContext,
    ) -> Result<BusinessObject, FactoryError> {
        let factory = self.related_factory(&rel.related_class, ctx)?;
        let mut child = factory.create_seeded_business_object(ctx);
        for rel_prop in &rel.rel_props {
            child.set_value(&rel_prop.related, owner.get_value(&rel_prop.owner))?;
        }
        factory.make_valid(&mut child, ctx)?;
        Ok(child)
    }

    fn related_factory(
        &mut self,
        class_name: &str,
        ctx: &TestContext,
    ) -> Result<&mut BOTestFactory, FactoryError> {
        match self.related_factories.entry(class_name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(ctx.factory(class_name)?)),
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// The factory's own pin first, then the context's.
    fn pinned(&self, name: &str, ctx: &TestContext) -> Option<PinnedValue> {
        self.defaults
            .resolve(name)
            .or_else(|| ctx.defaults.resolve(name))
            .cloned()
    }

    fn is_pinned(&self, name: &str, ctx: &TestContext) -> bool {
        self.defaults.is_registered(name) || ctx.defaults.is_registered(name)
    }

    fn check_class(&self, bo: &BusinessObject) -> Result<(), FactoryError> {
        if bo.class_name() == self.class_def.name {
            Ok(())
        } else {
            Err(FactoryError::Config(format!(
                "a factory for '{}' cannot build a '{}'",
                self.class_def.name,
                bo.class_name()
            )))
        }
    }

    fn prop_def(&self, prop: &str) -> Result<&PropDef, FactoryError> {
        self.class_def
            .prop(prop)
            .map_err(FactoryError::from_definition)
    }

    fn relationship_def(&self, relationship: &str) -> Result<&RelationshipDef, FactoryError> {
        self.class_def
            .relationship(relationship)
            .map_err(FactoryError::from_definition)
    }

    fn single_def(&self, relationship: &str) -> Result<&RelationshipDef, FactoryError> {
        let rel = self.relationship_def(relationship)?;
        if rel.is_single() {
            Ok(rel)
        } else {
            Err(FactoryError::NotASingleRelationship {
                class: self.class_def.name.clone(),
                relationship: relationship.to_string(),
            })
        }
    }

    fn multiple_def(&self, relationship: &str) -> Result<&RelationshipDef, FactoryError> {
        let rel = self.relationship_def(relationship)?;
        if rel.is_multiple() {
            Ok(rel)
        } else {
            Err(FactoryError::NotAMultipleRelationship {
                class: self.class_def.name.clone(),
                relationship: relationship.to_string(),
            })
        }
    }
}

/// Convert a value copied from another property to this property's type.
fn coerce(value: &PropValue, prop_def: &PropDef) -> PropValue {
    if value.fits(&prop_def.prop_type) {
        return value.clone();
    }
    PropValue::parse_as(&value.to_string(), &prop_def.prop_type).unwrap_or_else(|| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactoryConfig;
    use bo_core::{InMemoryDataAccessor, LookupItem, PropRule, PropType, PropTypeKind};

    fn foo_defs() -> ClassDefCol {
        ClassDefCol::new(vec![ClassDef::new("Foo")
            .with_prop(PropDef::new("Name", PropType::String).compulsory())
            .with_prop(PropDef::new("Nickname", PropType::String))])
    }

    fn order_defs() -> ClassDefCol {
        ClassDefCol::new(vec![
            ClassDef::new("Customer")
                .with_prop(PropDef::new("CustomerID", PropType::Guid).compulsory())
                .with_prop(PropDef::new("Name", PropType::String).compulsory())
                .with_relationship(
                    RelationshipDef::multiple("Orders", "Order")
                        .with_rel_prop("CustomerID", "CustomerID")
                        .with_reverse("Customer"),
                ),
            ClassDef::new("Order")
                .with_prop(PropDef::new("OrderID", PropType::Guid).compulsory())
                .with_prop(PropDef::new("CustomerID", PropType::Guid).compulsory())
                .with_prop(PropDef::new("Quantity", PropType::Int).compulsory().with_rule(
                    PropRule::Integer {
                        min: Some(1),
                        max: Some(100),
                    },
                ))
                .with_relationship(
                    RelationshipDef::single("Customer", "Customer")
                        .compulsory()
                        .with_rel_prop("CustomerID", "CustomerID"),
                ),
        ])
    }

    fn ranged_defs(operator: ComparisonOperator) -> ClassDefCol {
        let int_rule = PropRule::Integer {
            min: Some(0),
            max: Some(100),
        };
        ClassDefCol::new(vec![ClassDef::new("Range")
            .with_prop(
                PropDef::new("Low", PropType::Int)
                    .compulsory()
                    .with_rule(int_rule.clone()),
            )
            .with_prop(
                PropDef::new("High", PropType::Int)
                    .compulsory()
                    .with_rule(int_rule),
            )
            .with_inter_prop_rule(InterPropRule::new("Low", operator, "High"))])
    }

    #[test]
    fn test_valid_object_fills_only_compulsory_props() {
        let mut ctx = TestContext::new(foo_defs());
        let mut factory = ctx.factory("Foo").unwrap();
        let foo = factory.create_valid_business_object(&mut ctx).unwrap();
        assert!(!foo.get_value("Name").is_null());
        assert!(foo.get_value("Nickname").is_null());
        assert!(foo.is_valid());
        assert!(foo.status().is_new);
    }

    #[test]
    fn test_default_object_is_not_generated() {
        let ctx = TestContext::new(foo_defs());
        let factory = ctx.factory("Foo").unwrap();
        let foo = factory.create_default_business_object();
        assert!(foo.get_value("Name").is_null());
        assert!(!foo.is_valid());
    }

    #[test]
    fn test_same_seed_gives_same_ids() {
        let config = FactoryConfig::new().with_seed(3);
        let ids: Vec<Vec<_>> = (0..2)
            .map(|_| {
                let mut ctx = TestContext::with_config(foo_defs(), config.clone());
                let mut factory = ctx.factory("Foo").unwrap();
                (0..3)
                    .map(|_| factory.create_valid_business_object(&mut ctx).unwrap().id())
                    .collect()
            })
            .collect();
        assert_eq!(ids[0], ids[1]);
        assert_ne!(ids[0][0], ids[0][1]);
    }

    #[test]
    fn test_pinned_values() {
        let mut ctx = TestContext::new(foo_defs());
        let mut factory = ctx
            .factory("Foo")
            .unwrap()
            .set_value_for("Nickname", "Bo")
            .unwrap();
        ctx.defaults.register_value("Name", "Context");
        let foo = factory.create_valid_business_object(&mut ctx).unwrap();
        assert_eq!(foo.get_value("Name"), PropValue::from("Context"));
        assert_eq!(foo.get_value("Nickname"), PropValue::from("Bo"));

        // The factory's own pin wins over the context's.
        let mut factory = factory.set_value_for("Name", "Factory").unwrap();
        let foo = factory.create_valid_business_object(&mut ctx).unwrap();
        assert_eq!(foo.get_value("Name"), PropValue::from("Factory"));
    }

    #[test]
    fn test_requested_non_compulsory_value() {
        let mut ctx = TestContext::new(foo_defs());
        let mut factory = ctx
            .factory("Foo")
            .unwrap()
            .with_valid_value_for("Nickname")
            .unwrap();
        let foo = factory.create_valid_business_object(&mut ctx).unwrap();
        assert!(!foo.get_value("Nickname").is_null());
    }

    #[test]
    fn test_unknown_names_are_setup_errors() {
        let ctx = TestContext::new(foo_defs());
        let err = ctx
            .factory("Foo")
            .unwrap()
            .set_value_for("Surname", "x")
            .unwrap_err();
        assert!(matches!(err, FactoryError::PropertyNotDefined { .. }));
        assert!(err.hint().is_some());

        let err = ctx.factory("Foo").unwrap().with_many("Bars").unwrap_err();
        assert!(matches!(err, FactoryError::RelationshipNotDefined { .. }));

        let err = TestContext::new(ClassDefCol::default())
            .factory("Foo")
            .unwrap_err();
        assert!(matches!(err, FactoryError::NoClassDefsLoaded { .. }));
    }

    #[test]
    fn test_saved_object_status() {
        let mut ctx = TestContext::new(foo_defs());
        let foo = ctx.create_saved("Foo").unwrap();
        let status = foo.status();
        assert!(!status.is_new);
        assert!(!status.is_dirty);
        assert!(foo.is_valid());
        assert!(ctx.accessor().load("Foo", &foo.id()).is_some());
    }

    #[test]
    fn test_target_business_object_is_filled_in() {
        let mut ctx = TestContext::new(foo_defs());
        let factory = ctx.factory("Foo").unwrap();
        let mut target = factory.create_default_business_object();
        target.set_value("Nickname", "Kept").unwrap();
        let id = target.id();

        let mut factory = factory.with_business_object(target).unwrap();
        assert!(factory.business_object().is_some());
        let foo = factory.create_valid_business_object(&mut ctx).unwrap();
        assert_eq!(foo.id(), id);
        assert_eq!(foo.get_value("Nickname"), PropValue::from("Kept"));
        assert!(factory.business_object().is_none());
    }

    #[test]
    fn test_compulsory_relationship_creates_saved_related() {
        let mut ctx = TestContext::new(order_defs());
        let order = ctx.create_valid("Order").unwrap();
        let customer = order.related("Customer").unwrap();
        assert!(!customer.status().is_new);
        assert_eq!(
            order.get_value("CustomerID"),
            customer.get_value("CustomerID")
        );
        assert!(order.is_valid());
    }

    #[test]
    fn test_pinned_related_object() {
        let mut ctx = TestContext::new(order_defs());
        let customer = ctx.create_saved("Customer").unwrap();
        let mut factory = ctx
            .factory("Order")
            .unwrap()
            .set_related_for("Customer", Some(customer.clone()))
            .unwrap();
        let order = factory.create_valid_business_object(&mut ctx).unwrap();
        assert_eq!(order.related("Customer").unwrap().id(), customer.id());
        assert_eq!(ctx.accessor().load_all("Customer").len(), 1);
    }

    #[test]
    fn test_select_related_from_cycles() {
        let mut ctx = TestContext::new(order_defs());
        let first = ctx.create_saved("Customer").unwrap();
        let second = ctx.create_saved("Customer").unwrap();
        let mut factory = ctx
            .factory("Order")
            .unwrap()
            .select_related_from("Customer", None)
            .unwrap();
        let picked: Vec<_> = (0..3)
            .map(|_| {
                factory
                    .create_valid_business_object(&mut ctx)
                    .unwrap()
                    .related("Customer")
                    .unwrap()
                    .id()
            })
            .collect();
        assert_eq!(picked, vec![first.id(), second.id(), first.id()]);
    }

    #[test]
    fn test_select_related_from_empty_list_creates_one() {
        let mut ctx = TestContext::new(order_defs());
        let mut factory = ctx
            .factory("Order")
            .unwrap()
            .select_related_from("Customer", Some(Vec::new()))
            .unwrap();
        let order = factory.create_valid_business_object(&mut ctx).unwrap();
        assert!(order.is_valid());
        assert_eq!(ctx.accessor().load_all("Customer").len(), 1);
    }

    #[test]
    fn test_with_many_children() {
        let mut ctx = TestContext::with_config(
            order_defs(),
            FactoryConfig::new().with_many_count(4),
        );
        let mut factory = ctx.factory("Customer").unwrap().with_many("Orders").unwrap();
        let customer = factory.create_saved_business_object(&mut ctx).unwrap();
        let orders = customer.children("Orders");
        assert_eq!(orders.len(), 4);
        for order in orders {
            assert_eq!(
                order.get_value("CustomerID"),
                customer.get_value("CustomerID")
            );
            assert!(!order.status().is_new);
        }
        // No extra customers were created for the children.
        assert_eq!(ctx.accessor().load_all("Customer").len(), 1);
        assert_eq!(ctx.accessor().load_all("Order").len(), 4);
    }

    #[test]
    fn test_with_one_and_two() {
        let mut ctx = TestContext::new(order_defs());
        let mut factory = ctx.factory("Customer").unwrap().with_two("Orders").unwrap();
        let customer = factory.create_valid_business_object(&mut ctx).unwrap();
        assert_eq!(customer.children("Orders").len(), 2);

        let mut factory = ctx.factory("Customer").unwrap().with_one("Orders").unwrap();
        let customer = factory.create_valid_business_object(&mut ctx).unwrap();
        assert_eq!(customer.children("Orders").len(), 1);

        let err = ctx.factory("Order").unwrap().with_two("Customer").unwrap_err();
        assert!(matches!(err, FactoryError::NotAMultipleRelationship { .. }));
    }

    #[test]
    fn test_inter_prop_rule_is_fixed() {
        let mut ctx = TestContext::new(ranged_defs(ComparisonOperator::LessThan));
        let mut factory = ctx.factory("Range").unwrap();
        for _ in 0..20 {
            let range = factory.create_valid_business_object(&mut ctx).unwrap();
            let low = range.get_value("Low").as_i64().unwrap();
            let high = range.get_value("High").as_i64().unwrap();
            assert!(low < high, "{low} < {high}");
            assert!((0..=100).contains(&high));
        }
    }

    #[test]
    fn test_inter_prop_rule_violated_start_is_fixed() {
        let mut ctx = TestContext::new(ranged_defs(ComparisonOperator::LessThan));
        let factory = ctx.factory("Range").unwrap();
        let mut range = factory.create_default_business_object();
        range.set_value("Low", 90).unwrap();
        range.set_value("High", 10).unwrap();
        let mut factory = factory.with_business_object(range).unwrap();
        let range = factory.create_valid_business_object(&mut ctx).unwrap();
        assert_eq!(range.get_value("Low"), PropValue::Int(90));
        assert!(range.get_value("High").as_i64().unwrap() > 90);
    }

    #[test]
    fn test_pinned_right_side_moves_left() {
        let mut ctx = TestContext::new(ranged_defs(ComparisonOperator::GreaterOrEqual));
        let mut factory = ctx
            .factory("Range")
            .unwrap()
            .set_value_for("High", 60)
            .unwrap();
        for _ in 0..10 {
            let range = factory.create_valid_business_object(&mut ctx).unwrap();
            assert_eq!(range.get_value("High"), PropValue::Int(60));
            assert!(range.get_value("Low").as_i64().unwrap() >= 60);
        }
    }

    #[test]
    fn test_right_side_at_limit_moves_left() {
        let mut ctx = TestContext::new(ranged_defs(ComparisonOperator::LessThan));
        let factory = ctx.factory("Range").unwrap();
        let mut range = factory.create_default_business_object();
        range.set_value("Low", 100).unwrap();
        range.set_value("High", 5).unwrap();
        let mut factory = factory.with_business_object(range).unwrap();
        let range = factory.create_valid_business_object(&mut ctx).unwrap();
        assert!(range.is_valid());
    }

    #[test]
    fn test_both_sides_pinned_is_left_alone() {
        let mut ctx = TestContext::new(ranged_defs(ComparisonOperator::LessThan));
        let mut factory = ctx
            .factory("Range")
            .unwrap()
            .set_value_for("Low", 50)
            .unwrap()
            .set_value_for("High", 10)
            .unwrap();
        let range = factory.create_valid_business_object(&mut ctx).unwrap();
        assert_eq!(range.get_value("Low"), PropValue::Int(50));
        assert_eq!(range.get_value("High"), PropValue::Int(10));
    }

    #[test]
    fn test_contradictory_rules_hit_pass_cap() {
        let defs = ClassDefCol::new(vec![ClassDef::new("Loop")
            .with_prop(PropDef::new("A", PropType::Int).compulsory())
            .with_prop(PropDef::new("B", PropType::Int).compulsory())
            .with_inter_prop_rule(InterPropRule::new("A", ComparisonOperator::LessThan, "B"))
            .with_inter_prop_rule(InterPropRule::new("B", ComparisonOperator::LessThan, "A"))]);
        let mut ctx = TestContext::with_config(
            defs,
            FactoryConfig::new().with_max_rule_fixup_passes(3),
        );
        let err = ctx.create_valid("Loop").unwrap_err();
        assert!(matches!(
            err,
            FactoryError::InterPropRulesUnresolved { passes: 3, .. }
        ));
    }

    #[test]
    fn test_self_referencing_compulsory_relationship_is_capped() {
        let defs = ClassDefCol::new(vec![ClassDef::new("Employee")
            .with_prop(PropDef::new("EmployeeID", PropType::Guid).compulsory())
            .with_prop(PropDef::new("ManagerID", PropType::Guid).compulsory())
            .with_relationship(
                RelationshipDef::single("Manager", "Employee")
                    .compulsory()
                    .with_rel_prop("ManagerID", "EmployeeID"),
            )]);
        let mut ctx = TestContext::with_config(
            defs,
            FactoryConfig::new().with_max_relationship_depth(3),
        );
        let err = ctx.create_valid("Employee").unwrap_err();
        assert!(matches!(
            err,
            FactoryError::RelationshipDepthExceeded { max_depth: 3, .. }
        ));
    }

    #[test]
    fn test_lookup_list_cycle_continues_across_objects() {
        let defs = ClassDefCol::new(vec![ClassDef::new("Shirt").with_prop(
            PropDef::new("Size", PropType::String)
                .compulsory()
                .with_lookup_list(LookupList::Simple {
                    items: ["S", "M", "L"]
                        .iter()
                        .map(|s| LookupItem::new(*s, *s))
                        .collect(),
                }),
        )]);
        let mut ctx = TestContext::new(defs);
        let mut factory = ctx.factory("Shirt").unwrap();
        let sizes: Vec<_> = (0..4)
            .map(|_| {
                factory
                    .create_valid_business_object(&mut ctx)
                    .unwrap()
                    .get_value("Size")
            })
            .collect();
        assert_eq!(
            sizes,
            ["S", "M", "L", "S"].map(PropValue::from).to_vec()
        );
    }

    #[test]
    fn test_business_object_lookup_creates_related() {
        let defs = ClassDefCol::new(vec![
            ClassDef::new("Country")
                .with_prop(PropDef::new("Name", PropType::String).compulsory()),
            ClassDef::new("City").with_prop(
                PropDef::new("CountryID", PropType::Guid)
                    .compulsory()
                    .with_lookup_list(LookupList::BusinessObject {
                        class_name: "Country".into(),
                    }),
            ),
        ]);
        let mut ctx = TestContext::new(defs);
        let city = ctx.create_valid("City").unwrap();
        let countries = ctx.accessor().load_all("Country");
        assert_eq!(countries.len(), 1);
        assert_eq!(city.get_value("CountryID"), PropValue::Guid(countries[0].id()));
    }

    #[test]
    fn test_get_valid_prop_value() {
        let mut ctx = TestContext::new(ranged_defs(ComparisonOperator::LessThan));
        let mut factory = ctx.factory("Range").unwrap();
        let low = factory.get_valid_prop_value("Low", &mut ctx).unwrap();
        assert!((0..=100).contains(&low.as_i64().unwrap()));

        let mut factory = factory.set_value_for("Low", 7).unwrap();
        assert_eq!(
            factory.get_valid_prop_value("Low", &mut ctx).unwrap(),
            PropValue::Int(7)
        );
        assert!(matches!(
            factory.get_valid_prop_value("Mid", &mut ctx),
            Err(FactoryError::PropertyNotDefined { .. })
        ));
    }

    #[test]
    fn test_registered_generator_is_used() {
        let mut ctx = TestContext::new(foo_defs());
        ctx.generators
            .register_named(PropTypeKind::String, "name_list")
            .unwrap();
        let foo = ctx.create_valid("Foo").unwrap();
        assert_eq!(foo.get_value("Name"), PropValue::from("Aaliyah"));
    }

    #[test]
    fn test_custom_data_accessor() {
        let mut ctx =
            TestContext::new(foo_defs()).with_data_accessor(Box::new(InMemoryDataAccessor::new()));
        ctx.create_saved("Foo").unwrap();
        assert_eq!(ctx.accessor().load_all("Foo").len(), 1);
    }
}

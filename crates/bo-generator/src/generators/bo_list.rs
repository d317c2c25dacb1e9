//! Generator cycling through existing business objects.
//!
//! Used for business-object lookup lists (the generated value is the
//! object's id) and for picking related objects of compulsory
//! relationships. An empty list is reported as
//! [`GeneratorError::EmptyBusinessObjectList`] so the caller can create and
//! persist a fresh object instead.

use super::{Cycle, ValidValueGenerator, ValueBound};
use crate::error::GeneratorError;
use bo_core::{BusinessObject, DataAccessor, PropValue};
use rand::rngs::StdRng;

/// Cycles through a list of business objects of one class.
#[derive(Debug, Clone)]
pub struct BusinessObjectListGenerator {
    class_name: String,
    objects: Vec<BusinessObject>,
    cycle: Cycle,
}

impl BusinessObjectListGenerator {
    pub fn new(class_name: impl Into<String>, objects: Vec<BusinessObject>) -> Self {
        Self {
            class_name: class_name.into(),
            objects,
            cycle: Cycle::default(),
        }
    }

    /// Build a generator over every persisted object of a class.
    pub fn from_accessor(class_name: &str, accessor: &dyn DataAccessor) -> Self {
        Self::new(class_name, accessor.load_all(class_name))
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Append an object to the end of the cycle.
    pub fn push(&mut self, object: BusinessObject) {
        self.objects.push(object);
    }

    /// The next object in cycle order.
    pub fn next_object(&mut self) -> Result<BusinessObject, GeneratorError> {
        let idx = self
            .cycle
            .next_index(&self.objects, |_| true)
            .ok_or_else(|| GeneratorError::EmptyBusinessObjectList(self.class_name.clone()))?;
        Ok(self.objects[idx].clone())
    }
}

impl ValidValueGenerator for BusinessObjectListGenerator {
    fn generate(
        &mut self,
        bound: ValueBound<'_>,
        _rng: &mut StdRng,
    ) -> Result<PropValue, GeneratorError> {
        if self.objects.is_empty() {
            return Err(GeneratorError::EmptyBusinessObjectList(
                self.class_name.clone(),
            ));
        }
        let idx = self
            .cycle
            .next_index(&self.objects, |o| bound.admits(&PropValue::Guid(o.id())))
            .ok_or_else(|| GeneratorError::Unsatisfiable {
                prop: self.class_name.clone(),
                reason: format!("no object id is {}", bound.describe()),
            })?;
        Ok(PropValue::Guid(self.objects[idx].id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_core::{ClassDef, InMemoryDataAccessor, PropDef, PropType};
    use rand::SeedableRng;
    use std::sync::Arc;

    fn customers(n: usize) -> Vec<BusinessObject> {
        let def = Arc::new(
            ClassDef::new("Customer").with_prop(PropDef::new("Name", PropType::String)),
        );
        (0..n)
            .map(|i| {
                let mut bo = BusinessObject::new(def.clone());
                bo.set_value("Name", format!("Customer {i}")).unwrap();
                bo
            })
            .collect()
    }

    #[test]
    fn test_cycles_objects_in_order() {
        let objects = customers(3);
        let ids: Vec<_> = objects.iter().map(|o| o.id()).collect();
        let mut gen = BusinessObjectListGenerator::new("Customer", objects);
        let picked: Vec<_> = (0..4).map(|_| gen.next_object().unwrap().id()).collect();
        assert_eq!(picked, vec![ids[0], ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_generates_ids() {
        let mut rng = StdRng::seed_from_u64(42);
        let objects = customers(2);
        let first = objects[0].id();
        let mut gen = BusinessObjectListGenerator::new("Customer", objects);
        assert_eq!(
            gen.generate_valid_value(&mut rng).unwrap(),
            PropValue::Guid(first)
        );
    }

    #[test]
    fn test_empty_list_is_reported() {
        let mut rng = StdRng::seed_from_u64(42);
        let accessor = InMemoryDataAccessor::new();
        let mut gen = BusinessObjectListGenerator::from_accessor("Customer", &accessor);
        assert!(gen.is_empty());
        assert!(matches!(
            gen.next_object(),
            Err(GeneratorError::EmptyBusinessObjectList(_))
        ));
        assert!(matches!(
            gen.generate_valid_value(&mut rng),
            Err(GeneratorError::EmptyBusinessObjectList(_))
        ));

        gen.push(customers(1).remove(0));
        assert_eq!(gen.len(), 1);
        assert!(gen.next_object().is_ok());
    }
}

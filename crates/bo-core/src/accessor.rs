//! Persistence seam for business objects.
//!
//! [`DataAccessor`] is the single trait the test factories save through.
//! [`InMemoryDataAccessor`] keeps saved objects in per-class lists so tests
//! never need a database.

use crate::object::{BusinessObject, BusinessObjectError};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Saves and loads business objects.
pub trait DataAccessor: Send {
    /// Persist one object.
    ///
    /// Implementations must reject objects with broken rules and mark saved
    /// objects as persisted.
    fn save(&mut self, bo: &mut BusinessObject) -> Result<(), BusinessObjectError>;

    /// Load one persisted object by class and id.
    fn load(&self, class_name: &str, id: &Uuid) -> Option<BusinessObject>;

    /// All persisted objects of a class, in save order.
    fn load_all(&self, class_name: &str) -> Vec<BusinessObject>;

    /// Persist an object together with everything it references.
    ///
    /// Single related objects that are new or dirty are saved first, then the
    /// object itself, then its children with their keys re-linked to the
    /// owner.
    fn save_graph(&mut self, bo: &mut BusinessObject) -> Result<(), BusinessObjectError> {
        for related in bo.related_objects_mut() {
            let status = related.status();
            if status.is_new || status.is_dirty {
                self.save_graph(related)?;
            }
        }
        self.save(bo)?;
        for child in bo.relinked_children_mut()? {
            self.save_graph(child)?;
        }
        Ok(())
    }
}

/// Data accessor backed by in-process collections.
#[derive(Debug, Default)]
pub struct InMemoryDataAccessor {
    objects: HashMap<String, Vec<BusinessObject>>,
}

impl InMemoryDataAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted objects of a class.
    pub fn count(&self, class_name: &str) -> usize {
        self.objects.get(class_name).map_or(0, |v| v.len())
    }

    /// Forget every persisted object.
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl DataAccessor for InMemoryDataAccessor {
    fn save(&mut self, bo: &mut BusinessObject) -> Result<(), BusinessObjectError> {
        let broken_rules = bo.broken_rules();
        if !broken_rules.is_empty() {
            return Err(BusinessObjectError::Invalid {
                class: bo.class_name().to_string(),
                broken_rules,
            });
        }

        bo.mark_persisted();
        let stored = self.objects.entry(bo.class_name().to_string()).or_default();
        match stored.iter_mut().find(|o| o.id() == bo.id()) {
            Some(existing) => *existing = bo.clone(),
            None => stored.push(bo.clone()),
        }
        debug!("Saved {} {}", bo.class_name(), bo.id());
        Ok(())
    }

    fn load(&self, class_name: &str, id: &Uuid) -> Option<BusinessObject> {
        self.objects
            .get(class_name)?
            .iter()
            .find(|o| &o.id() == id)
            .cloned()
    }

    fn load_all(&self, class_name: &str) -> Vec<BusinessObject> {
        self.objects.get(class_name).cloned().unwrap_or_default()
    }
}

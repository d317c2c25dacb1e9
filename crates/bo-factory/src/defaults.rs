//! Pinned values consulted before generation.
//!
//! A name that is registered, even as null, is never generated. Looking up
//! a name returns the same null for "registered as null" and "not
//! registered"; use [`BODefaultValueRegistry::is_registered`] to tell the
//! two apart.

use bo_core::{BusinessObject, PropValue};
use std::collections::HashMap;

/// A value pinned for a property or a related object pinned for a single
/// relationship.
#[derive(Debug, Clone)]
pub enum PinnedValue {
    Value(PropValue),
    Related(Option<BusinessObject>),
}

impl PinnedValue {
    pub fn as_value(&self) -> Option<&PropValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Related(_) => None,
        }
    }

    pub fn as_related(&self) -> Option<&BusinessObject> {
        match self {
            Self::Related(r) => r.as_ref(),
            Self::Value(_) => None,
        }
    }
}

impl From<PropValue> for PinnedValue {
    fn from(value: PropValue) -> Self {
        Self::Value(value)
    }
}

impl From<BusinessObject> for PinnedValue {
    fn from(related: BusinessObject) -> Self {
        Self::Related(Some(related))
    }
}

impl From<Option<BusinessObject>> for PinnedValue {
    fn from(related: Option<BusinessObject>) -> Self {
        Self::Related(related)
    }
}

/// Pinned values keyed by property or relationship name. Last write wins.
#[derive(Debug, Clone, Default)]
pub struct BODefaultValueRegistry {
    entries: HashMap<String, PinnedValue>,
}

impl BODefaultValueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, value: impl Into<PinnedValue>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Pin a property value.
    pub fn register_value(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.register(name, PinnedValue::Value(value.into()));
    }

    pub fn resolve(&self, name: &str) -> Option<&PinnedValue> {
        self.entries.get(name)
    }

    /// The pinned property value, or null when nothing is pinned.
    pub fn resolve_value(&self, name: &str) -> PropValue {
        self.entries
            .get(name)
            .and_then(PinnedValue::as_value)
            .cloned()
            .unwrap_or(PropValue::Null)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

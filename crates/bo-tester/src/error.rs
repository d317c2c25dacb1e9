//! Assertion failures reported by the testers.

/// A failed assertion, naming what was checked and what was found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssertionFailure {
    #[error("Property '{name}' on '{class}' should {expected}, but {actual}")]
    Property {
        class: String,
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Relationship '{name}' on '{class}' should {expected}, but {actual}")]
    Relationship {
        class: String,
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Class '{class}' should {expected}, but {actual}")]
    Class {
        class: String,
        expected: String,
        actual: String,
    },
}

impl AssertionFailure {
    pub fn property(
        class: &str,
        name: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Property {
            class: class.to_string(),
            name: name.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn relationship(
        class: &str,
        name: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Relationship {
            class: class.to_string(),
            name: name.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn class(class: &str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Class {
            class: class.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Owning class of the checked item.
    pub fn class_name(&self) -> &str {
        match self {
            Self::Property { class, .. }
            | Self::Relationship { class, .. }
            | Self::Class { class, .. } => class,
        }
    }

    /// Name of the checked property or relationship.
    pub fn item_name(&self) -> Option<&str> {
        match self {
            Self::Property { name, .. } | Self::Relationship { name, .. } => Some(name),
            Self::Class { .. } => None,
        }
    }
}

/// Pass when `condition` holds, else fail with `failure()`.
pub(crate) fn ensure(
    condition: bool,
    failure: impl FnOnce() -> AssertionFailure,
) -> Result<(), AssertionFailure> {
    if condition {
        Ok(())
    } else {
        Err(failure())
    }
}

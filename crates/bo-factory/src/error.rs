//! Error types for the test factories.

use bo_core::{BusinessObjectError, DefinitionError};
use bo_generator::GeneratorError;

/// Errors raised while building test business objects.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// The class definition collection is empty
    #[error("No class definitions are loaded, so no '{class}' can be created")]
    NoClassDefsLoaded { class: String },

    /// Class definitions are loaded but the class is not among them
    #[error("Class '{class}' is not defined in the loaded class definitions")]
    ClassNotDefined { class: String },

    #[error("Property '{prop}' is not defined on class '{class}'")]
    PropertyNotDefined { class: String, prop: String },

    #[error("Relationship '{relationship}' is not defined on class '{class}'")]
    RelationshipNotDefined { class: String, relationship: String },

    #[error("Relationship '{relationship}' on class '{class}' is not a single relationship")]
    NotASingleRelationship { class: String, relationship: String },

    #[error("Relationship '{relationship}' on class '{class}' is not a multiple relationship")]
    NotAMultipleRelationship { class: String, relationship: String },

    /// Inter-property rules still broken after the configured number of passes
    #[error(
        "Inter-property rules on '{class}' still broken after {passes} passes: {}",
        rules.join("; ")
    )]
    InterPropRulesUnresolved {
        class: String,
        passes: usize,
        rules: Vec<String>,
    },

    /// Compulsory relationships nested deeper than allowed
    #[error("Creating related objects for '{class}' exceeded the maximum depth of {max_depth}")]
    RelationshipDepthExceeded { class: String, max_depth: usize },

    /// Misconfigured factory or registry
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    BusinessObject(#[from] BusinessObjectError),
}

impl FactoryError {
    /// A likely cause for test-setup errors.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoClassDefsLoaded { .. } => Some(
                "Load the class definitions (ClassDefCol::from_file or from_yaml) into the \
                 TestContext before creating test objects",
            ),
            Self::ClassNotDefined { .. } => Some(
                "Check that the class definitions loaded for this test include the class and \
                 that its name is spelled the same way",
            ),
            Self::PropertyNotDefined { .. } | Self::RelationshipNotDefined { .. } => Some(
                "The class definition loaded for this test does not map the requested name; \
                 check the class definition file used by the test fixture",
            ),
            Self::NotASingleRelationship { .. } | Self::NotAMultipleRelationship { .. } => Some(
                "Check the cardinality declared for the relationship in the class definitions",
            ),
            Self::RelationshipDepthExceeded { .. } => Some(
                "Compulsory relationships form a cycle; pin one side with set_related_for or \
                 select_related_from",
            ),
            Self::InterPropRulesUnresolved { .. } => Some(
                "The inter-property rules contradict each other or the property rules",
            ),
            _ => None,
        }
    }

    /// Map a definition lookup failure to the matching setup error.
    pub(crate) fn from_definition(err: DefinitionError) -> Self {
        match err {
            DefinitionError::PropNotFound { class, prop } => {
                Self::PropertyNotDefined { class, prop }
            }
            DefinitionError::RelationshipNotFound {
                class,
                relationship,
            } => Self::RelationshipNotDefined {
                class,
                relationship,
            },
            DefinitionError::ClassNotFound(class) => Self::ClassNotDefined { class },
            other => Self::Config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_errors_carry_hints() {
        let err = FactoryError::NoClassDefsLoaded {
            class: "Foo".into(),
        };
        assert!(err.to_string().contains("Foo"));
        assert!(err.hint().unwrap().contains("Load the class definitions"));

        let err = FactoryError::PropertyNotDefined {
            class: "Foo".into(),
            prop: "Bar".into(),
        };
        assert_eq!(err.to_string(), "Property 'Bar' is not defined on class 'Foo'");
        assert!(err.hint().is_some());

        assert!(FactoryError::Config("x".into()).hint().is_none());
    }
}

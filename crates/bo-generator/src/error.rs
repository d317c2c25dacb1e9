//! Error types for value generation.

use std::path::PathBuf;

/// Error type for value generation.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// No value satisfies the rules together with the requested bound
    #[error("No valid value for '{prop}': {reason}")]
    Unsatisfiable { prop: String, reason: String },

    /// Bound of a type the generator cannot compare against
    #[error("Bound {bound} cannot be compared with values of '{prop}'")]
    IncompatibleBound { prop: String, bound: String },

    /// Generator used for a property of the wrong type
    #[error("Generator '{generator}' cannot produce {prop_type} values for '{prop}'")]
    UnsupportedType {
        generator: &'static str,
        prop: String,
        prop_type: String,
    },

    /// Misconfigured generator or registry
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sample file does not exist
    #[error("Sample file not found: {}", .0.display())]
    SampleFileNotFound(PathBuf),

    /// Sample file holds no values
    #[error("Sample file {} contains no values", .0.display())]
    EmptySampleFile(PathBuf),

    /// Error reading a sample file
    #[error("Failed to read sample file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No persisted objects to pick a related object from
    #[error("No '{0}' objects available to choose from")]
    EmptyBusinessObjectList(String),
}

impl GeneratorError {
    pub(crate) fn unsatisfiable(prop: &str, reason: impl Into<String>) -> Self {
        Self::Unsatisfiable {
            prop: prop.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn incompatible_bound(prop: &str, bound: &bo_core::PropValue) -> Self {
        Self::IncompatibleBound {
            prop: prop.to_string(),
            bound: bound.to_string(),
        }
    }
}

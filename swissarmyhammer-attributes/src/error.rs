//! Error types for attribute declaration and instance construction

use thiserror::Error;

/// Result type for attribute operations
pub type Result<T> = std::result::Result<T, AttributeError>;

/// Errors raised while defining entity kinds or constructing instances.
///
/// Every variant is fatal to the single operation in progress. Definition
/// errors (`Configuration`) surface from `EntityKindBuilder::build`, before
/// any instance of the kind can exist.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// An attribute or kind declaration could not be interpreted
    #[error("invalid definition for kind '{kind}': {message}")]
    Configuration {
        /// Kind being defined
        kind: String,
        /// What was wrong with the declaration
        message: String,
    },

    /// A required attribute was neither supplied nor defaulted
    #[error("{kind}: missing required attribute '{attribute}'")]
    MissingAttribute { kind: String, attribute: String },

    /// A supplied key is not declared on the kind
    #[error("{kind}: unknown attribute '{attribute}'")]
    UnknownAttribute { kind: String, attribute: String },

    /// The resolved value is nil but the attribute disallows nil
    #[error("{kind}: attribute '{attribute}' does not allow nil")]
    DisallowedValue { kind: String, attribute: String },

    /// A non-nil value failed the attribute's type constraint
    #[error("{kind}: attribute '{attribute}' expects {expected}, got {actual}")]
    TypeMismatch {
        kind: String,
        attribute: String,
        expected: String,
        actual: String,
    },

    /// IO error while reading a definition document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error while parsing a definition document
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl AttributeError {
    /// Build a `Configuration` error for `kind`.
    pub fn configuration(kind: impl Into<String>, message: impl Into<String>) -> Self {
        AttributeError::Configuration {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// The attribute this error names, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            AttributeError::MissingAttribute { attribute, .. }
            | AttributeError::UnknownAttribute { attribute, .. }
            | AttributeError::DisallowedValue { attribute, .. }
            | AttributeError::TypeMismatch { attribute, .. } => Some(attribute),
            _ => None,
        }
    }
}

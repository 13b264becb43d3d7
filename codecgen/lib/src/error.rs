//! Error types for the codec generator.

use thiserror::Error;

use crate::type_name::TypeNameError;

/// Errors that stop a generation run.
///
/// A type with no mapping in a target language is not among these. It is
/// reported through
/// [`RenderOutcome::UnsupportedType`](crate::template::RenderOutcome) and only
/// skips the artifact being rendered.
#[derive(Debug, Error)]
pub enum CodecGenError {
    /// Failed to read, list or write a path
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A service document or config file is not valid YAML
    #[error("Failed to parse YAML in '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A validated document does not match the service model
    #[error("Service document '{path}' does not match the service model: {message}")]
    Document { path: String, message: String },

    /// The schema file is not valid JSON
    #[error("Failed to parse schema '{path}': {source}")]
    SchemaParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The schema could not be compiled into a validator
    #[error("Invalid schema: {0}")]
    SchemaCompile(String),

    /// One or more service documents failed schema validation
    #[error("{failures} service document(s) failed schema validation")]
    ValidationFailed { failures: usize },

    /// A field declares a malformed type name
    #[error("Malformed type in {context}: {source}")]
    TypeName {
        context: String,
        #[source]
        source: TypeNameError,
    },

    /// Two services share the same id
    #[error("Duplicate service id {id}: '{first}' and '{second}'")]
    DuplicateServiceId { id: u8, first: String, second: String },

    /// Two methods of one service share the same id
    #[error("Duplicate method id {id} in service '{service}': '{first}' and '{second}'")]
    DuplicateMethodId {
        service: String,
        id: u8,
        first: String,
        second: String,
    },

    /// A method declares more events than the role byte can address
    #[error("Method '{method}' declares {count} events; at most 254 fit in the role byte")]
    TooManyEvents { method: String, count: usize },

    /// No mapping set is registered for a language
    #[error("Unknown target language: {0}")]
    UnknownLanguage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A template failed for a reason other than a missing type mapping
    #[error("Failed to render '{artifact}': {message}")]
    Render { artifact: String, message: String },
}

impl CodecGenError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CodecGenError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

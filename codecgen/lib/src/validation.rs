//! Structural validation of service documents.
//!
//! Validation is the one fatal gate of a run. Every document is checked and
//! every failure is logged before the overall verdict is returned, so a
//! single run reports all broken documents at once.

use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::{Draft, Validator};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::CodecGenError;
use crate::loader::ServiceDocument;

const SERVICE_SCHEMA: &str = include_str!("../schema/service.schema.json");

/// One schema failure in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub source: PathBuf,
    pub message: String,
    /// JSON pointer into the schema.
    pub schema_path: String,
    /// JSON pointer into the document.
    pub instance_path: String,
}

/// The bundled schema for service documents.
///
/// ## Errors
///
/// Returns [`CodecGenError::SchemaParse`] if the bundled file is not JSON.
pub fn builtin_service_schema() -> Result<Value, CodecGenError> {
    serde_json::from_str(SERVICE_SCHEMA).map_err(|source| CodecGenError::SchemaParse {
        path: "service.schema.json".to_string(),
        source,
    })
}

/// Reads a JSON schema from disk.
///
/// ## Errors
///
/// Returns [`CodecGenError::Io`] or [`CodecGenError::SchemaParse`].
pub fn load_schema(path: &Path) -> Result<Value, CodecGenError> {
    let text = fs::read_to_string(path).map_err(|e| CodecGenError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| CodecGenError::SchemaParse {
        path: path.display().to_string(),
        source,
    })
}

fn compile(schema: &Value) -> Result<Validator, CodecGenError> {
    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(schema)
        .map_err(|e| CodecGenError::SchemaCompile(e.to_string()))
}

/// Collects every schema failure across all documents.
///
/// ## Errors
///
/// Returns [`CodecGenError::SchemaCompile`] if the schema is not a valid
/// schema. Failing documents are not errors.
pub fn collect_violations(
    documents: &[ServiceDocument],
    schema: &Value,
) -> Result<Vec<SchemaViolation>, CodecGenError> {
    let validator = compile(schema)?;
    let mut violations = Vec::new();

    for document in documents {
        for err in validator.iter_errors(&document.value) {
            violations.push(SchemaViolation {
                source: document.path.clone(),
                message: err.to_string(),
                schema_path: err.schema_path().to_string(),
                instance_path: err.instance_path().to_string(),
            });
        }
    }

    Ok(violations)
}

/// Validates every document, logging each failure.
///
/// Returns `Ok(true)` only if every document validated.
///
/// ## Errors
///
/// Returns [`CodecGenError::SchemaCompile`] if the schema itself is invalid.
pub fn validate_services(
    documents: &[ServiceDocument],
    schema: &Value,
) -> Result<bool, CodecGenError> {
    let violations = collect_violations(documents, schema)?;

    for violation in &violations {
        error!(
            source = %violation.source.display(),
            schema_path = %violation.schema_path,
            instance_path = %violation.instance_path,
            "schema validation failed: {}",
            violation.message
        );
    }

    debug!(
        documents = documents.len(),
        violations = violations.len(),
        "validated service documents"
    );
    Ok(violations.is_empty())
}

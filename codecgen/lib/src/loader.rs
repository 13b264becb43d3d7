//! Service document loading.
//!
//! Every regular file directly inside the protocol directory is one YAML
//! service document. Documents are kept untyped until they pass schema
//! validation; [`parse_services`] turns validated documents into
//! [`ServiceDef`] records.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::CodecGenError;
use crate::model::ServiceDef;

/// One untyped service document and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDocument {
    pub path: PathBuf,
    pub value: Value,
}

/// Reads every file in `dir`, without descending into subdirectories.
///
/// Documents come back in directory listing order.
///
/// ## Errors
///
/// Returns [`CodecGenError::Io`] if the directory cannot be listed or a file
/// cannot be read, and [`CodecGenError::Yaml`] if a file is not YAML.
pub fn load_services(dir: &Path) -> Result<Vec<ServiceDocument>, CodecGenError> {
    if !dir.is_dir() {
        return Err(CodecGenError::io(
            dir,
            io::Error::new(io::ErrorKind::NotFound, "protocol directory does not exist"),
        ));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| CodecGenError::io(dir, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let text = fs::read_to_string(path).map_err(|e| CodecGenError::io(path, e))?;
        let value: Value = serde_yaml::from_str(&text).map_err(|source| CodecGenError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "loaded service document");

        documents.push(ServiceDocument {
            path: path.to_path_buf(),
            value,
        });
    }

    Ok(documents)
}

/// Deserializes validated documents into raw service records.
///
/// ## Errors
///
/// Returns [`CodecGenError::Document`] when a document does not fit the
/// service model, which only happens if the schema is looser than the model.
pub fn parse_services(documents: &[ServiceDocument]) -> Result<Vec<ServiceDef>, CodecGenError> {
    documents
        .iter()
        .map(|doc| {
            ServiceDef::deserialize(&doc.value).map_err(|e| CodecGenError::Document {
                path: doc.path.display().to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

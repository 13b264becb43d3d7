//! Generator configuration.
//!
//! A YAML file overrides the built-in defaults. Every key is optional:
//!
//! ```yaml
//! types:
//!   fixed_maps: [Map_Int32_Int64]
//! languages:
//!   java:
//!     namespace: com.acme.protocol.codec
//!     ignore_services: [3, 7]
//!   cpp:
//!     output_dir: cpp/generated
//!     boilerplate_dir: templates/cpp
//! ```
//!
//! A `types` key replaces only the registry sets it names. A language entry
//! replaces only the fields it names; the rest keep that language's
//! defaults.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::TypeRegistry;
use crate::error::CodecGenError;
use crate::lang::Language;

/// Resolved per-language settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageConfig {
    /// Method codec directory, relative to the output root.
    pub output_dir: PathBuf,
    /// Custom-type codec directory, relative to the output root.
    pub custom_output_dir: PathBuf,
    /// Java package or C++ namespace of the generated code.
    pub namespace: String,
    /// Service ids left out of method codec generation.
    pub ignore_services: BTreeSet<u8>,
    /// Directory with boilerplate override files.
    pub boilerplate_dir: Option<PathBuf>,
}

impl LanguageConfig {
    /// Built-in settings for a language.
    pub fn defaults(language: Language) -> Self {
        match language {
            Language::Java => Self {
                output_dir: PathBuf::from("java/codec"),
                custom_output_dir: PathBuf::from("java/codec/custom"),
                namespace: "com.example.protocol.codec".to_string(),
                ignore_services: BTreeSet::new(),
                boilerplate_dir: None,
            },
            Language::Cpp => Self {
                output_dir: PathBuf::from("cpp/codec"),
                custom_output_dir: PathBuf::from("cpp/codec"),
                namespace: "protocol::codec".to_string(),
                ignore_services: BTreeSet::new(),
                boilerplate_dir: None,
            },
        }
    }
}

/// A language entry as written; unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguageOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_services: Option<BTreeSet<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boilerplate_dir: Option<PathBuf>,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub types: TypeRegistry,
    pub languages: BTreeMap<Language, LanguageOverrides>,
}

impl GeneratorConfig {
    /// Parses a configuration document.
    ///
    /// ## Errors
    ///
    /// Returns [`CodecGenError::Config`] if the YAML is malformed or names an
    /// unknown key or language.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CodecGenError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| CodecGenError::Config(e.to_string()))
    }

    /// Reads and parses a configuration file.
    ///
    /// ## Errors
    ///
    /// Returns [`CodecGenError::Io`] if the file cannot be read and
    /// [`CodecGenError::Yaml`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, CodecGenError> {
        let text = fs::read_to_string(path).map_err(|e| CodecGenError::io(path, e))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|source| CodecGenError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }

    /// The effective settings for a language.
    pub fn language(&self, language: Language) -> LanguageConfig {
        let mut config = LanguageConfig::defaults(language);
        let Some(overrides) = self.languages.get(&language) else {
            return config;
        };
        if let Some(dir) = &overrides.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dir) = &overrides.custom_output_dir {
            config.custom_output_dir = dir.clone();
        }
        if let Some(namespace) = &overrides.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(ids) = &overrides.ignore_services {
            config.ignore_services = ids.clone();
        }
        if let Some(dir) = &overrides.boilerplate_dir {
            config.boilerplate_dir = Some(dir.clone());
        }
        config
    }
}

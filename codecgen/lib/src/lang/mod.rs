//! Per-language mapping sets.
//!
//! Each target language implements [`LanguageSupport`] exactly once. The
//! emitter and templates only ever talk to the trait, so adding a language
//! means adding one implementation and registering it in
//! [`LanguageRegistry::builtin`].
//!
//! ## Roles
//!
//! | Role | Method |
//! |------|--------|
//! | Name transliteration | [`LanguageSupport::transliterate`] |
//! | Encode hook lookup | [`LanguageSupport::encode_hook`] |
//! | Decode hook lookup | [`LanguageSupport::decode_hook`] |
//! | Parameter naming | [`LanguageSupport::param_name`] |
//! | Keyword escaping | [`LanguageSupport::escape_keyword`] |
//!
//! A hook lookup for a type the language cannot map returns
//! [`UnsupportedType`]. That value only ever skips the artifact being
//! rendered.

pub mod cpp;
pub mod java;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::classify::TypeRegistry;
use crate::naming;
use crate::type_name::TypeName;

pub use cpp::CppSupport;
pub use java::JavaSupport;

/// Supported target languages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Cpp,
}

/// A type with no mapping in the target language.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no mapping for type '{0}'")]
pub struct UnsupportedType(pub String);

impl UnsupportedType {
    pub fn of(ty: &TypeName) -> Self {
        UnsupportedType(ty.canonical())
    }
}

/// Where an operation writes or reads its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// At a byte offset inside the fixed-size initial frame.
    Fixed { size: usize },
    /// As one or more frames appended to the message.
    Frames,
}

/// A callable encode or decode operation in the target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOp {
    pub kind: OpKind,
    /// Fully qualified function, e.g. `StringCodec.encode`.
    pub call: String,
    /// Trailing arguments, usually element codecs for containers.
    pub extra_args: Vec<String>,
}

impl CodecOp {
    pub fn fixed(call: impl Into<String>, size: usize) -> Self {
        Self {
            kind: OpKind::Fixed { size },
            call: call.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn frames(call: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Frames,
            call: call.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.kind, OpKind::Fixed { .. })
    }

    /// Renders a call with `leading` arguments before the extra arguments.
    pub fn invoke(&self, leading: &[&str]) -> String {
        let args: Vec<&str> = leading
            .iter()
            .copied()
            .chain(self.extra_args.iter().map(String::as_str))
            .collect();
        format!("{}({})", self.call, args.join(", "))
    }
}

/// The result of a hook lookup: how the type is spelled and how it is coded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub lang_type: String,
    pub op: CodecOp,
}

/// What a hook lookup may consult besides the type itself.
#[derive(Debug, Clone, Copy)]
pub struct TypeEnv<'a> {
    pub registry: &'a TypeRegistry,
    /// Custom type names declared anywhere in the run.
    pub custom_types: &'a BTreeSet<String>,
}

impl<'a> TypeEnv<'a> {
    pub fn new(registry: &'a TypeRegistry, custom_types: &'a BTreeSet<String>) -> Self {
        Self {
            registry,
            custom_types,
        }
    }
}

/// How standard codecs land on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// Every artifact is appended to one header/source pair.
    Consolidated {
        header: &'static str,
        source: &'static str,
    },
    /// One file per method, named from the capitalised service and method.
    PerArtifact { extension: &'static str },
}

/// How custom-type codecs land on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomLayout {
    /// `{lowercase name}{suffix}.{header_ext}` plus the matching source.
    Pair {
        suffix: &'static str,
        header_ext: &'static str,
        source_ext: &'static str,
    },
    /// `{Capitalised name}Codec.{extension}`.
    Single { extension: &'static str },
}

/// One complete mapping set for a target language.
pub trait LanguageSupport: Send + Sync {
    fn language(&self) -> Language;

    /// Converts a canonical name to the language's type casing.
    fn transliterate(&self, name: &str) -> String {
        naming::pascal_case(name)
    }

    fn encode_hook(&self, ty: &TypeName, env: &TypeEnv<'_>) -> Result<Hook, UnsupportedType>;

    fn decode_hook(&self, ty: &TypeName, env: &TypeEnv<'_>) -> Result<Hook, UnsupportedType>;

    /// Parameter casing: first letter lower-cased, keywords escaped.
    fn param_name(&self, name: &str) -> String {
        self.escape_keyword(&naming::uncapital(name))
    }

    fn escape_keyword(&self, name: &str) -> String;

    fn output_layout(&self) -> OutputLayout;

    fn custom_layout(&self) -> CustomLayout;
}

/// The mapping sets available to a run, keyed by language.
pub struct LanguageRegistry {
    sets: BTreeMap<Language, Box<dyn LanguageSupport>>,
}

impl LanguageRegistry {
    pub fn empty() -> Self {
        Self {
            sets: BTreeMap::new(),
        }
    }

    /// Every language this crate ships a mapping set for.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(JavaSupport));
        registry.register(Box::new(CppSupport));
        registry
    }

    /// Adds a set, replacing any earlier set for the same language.
    pub fn register(&mut self, support: Box<dyn LanguageSupport>) {
        self.sets.insert(support.language(), support);
    }

    pub fn get(&self, language: Language) -> Option<&dyn LanguageSupport> {
        self.sets.get(&language).map(|support| support.as_ref())
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.sets.keys().copied()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

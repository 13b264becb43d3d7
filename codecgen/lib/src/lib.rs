//! Codecgen - schema-driven generator for wire protocol codecs
//!
//! Service documents describe a binary RPC protocol: services, their
//! methods, the request/response/event messages of each method and the
//! custom composite types those messages carry. This library turns a
//! directory of such documents into codec source files for each target
//! language.
//!
//! ## Stages
//!
//! 1. [`loader`] reads every YAML document in the protocol directory
//! 2. [`validation`] checks all of them against a JSON schema; any failure
//!    aborts the run before anything is written
//! 3. [`enrich`] parses type names and derives 24-bit message ids
//! 4. [`emitter`] renders each artifact through a [`template::TemplateEngine`]
//!    and writes it with a content fingerprint
//!
//! [`pipeline::Pipeline`] wires the stages together.
//!
//! ## Missing mappings
//!
//! A type without a mapping in the target language never fails a run. The
//! artifact that needs it is skipped with a warning and every other artifact
//! is still written.

pub mod boilerplate;
pub mod classify;
pub mod code_writer;
pub mod config;
pub mod emitter;
pub mod enrich;
pub mod error;
pub mod lang;
pub mod loader;
pub mod message_id;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod template;
pub mod type_name;
pub mod validation;
pub mod writer;

pub use classify::{TypeRegistry, WireLayout};
pub use config::{GeneratorConfig, LanguageConfig};
pub use emitter::{GenerationReport, SkippedArtifact};
pub use error::CodecGenError;
pub use lang::{Language, LanguageRegistry, LanguageSupport};
pub use message_id::{MessageId, Role};
pub use pipeline::{LanguageSummary, Pipeline, RunOptions, RunSummary, SchemaSource, Stage};
pub use type_name::TypeName;

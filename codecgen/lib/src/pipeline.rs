//! The generation run.
//!
//! A run moves through a fixed sequence of stages:
//!
//! ```text
//! Load -> Validate -> GenerateStandardCodecs -> GenerateCustomCodecs -> Done
//!            |
//!            +-> ValidationFailed (run aborts, nothing is written)
//! ```
//!
//! Each transition is logged at `info` with a `stage` field.

use std::collections::BTreeSet;
use std::path::PathBuf;

use strum::Display;
use tracing::info;

use crate::boilerplate::Boilerplate;
use crate::config::{GeneratorConfig, LanguageConfig};
use crate::emitter::{CodecEmitter, GenerationReport};
use crate::enrich::enrich;
use crate::error::CodecGenError;
use crate::lang::{Language, LanguageRegistry, LanguageSupport};
use crate::loader::{load_services, parse_services};
use crate::template::BuiltinTemplates;
use crate::validation::{builtin_service_schema, collect_violations, load_schema, validate_services};

/// A stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Load,
    Validate,
    GenerateStandardCodecs,
    GenerateCustomCodecs,
    Done,
}

/// Where the document schema comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchemaSource {
    /// The schema bundled with this crate.
    #[default]
    Builtin,
    Path(PathBuf),
}

/// Inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub protocol_dir: PathBuf,
    pub schema: SchemaSource,
    pub output_root: PathBuf,
    /// Target languages. Empty means every registered language.
    pub languages: Vec<Language>,
}

/// What a run produced for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSummary {
    pub language: Language,
    pub standard: GenerationReport,
    pub custom: GenerationReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub services: usize,
    pub languages: Vec<LanguageSummary>,
}

impl RunSummary {
    pub fn files_written(&self) -> usize {
        self.languages
            .iter()
            .map(|l| l.standard.written.len() + l.custom.written.len())
            .sum()
    }

    pub fn artifacts_skipped(&self) -> usize {
        self.languages
            .iter()
            .map(|l| l.standard.skipped.len() + l.custom.skipped.len())
            .sum()
    }
}

/// Everything prepared for one target language.
struct Target<'a> {
    support: &'a dyn LanguageSupport,
    config: LanguageConfig,
    templates: BuiltinTemplates<'a>,
    boilerplate: Boilerplate,
}

impl Target<'_> {
    fn emitter(&self) -> CodecEmitter<'_> {
        CodecEmitter::new(
            self.support,
            &self.templates,
            self.config.ignore_services.clone(),
            self.boilerplate.clone(),
        )
    }
}

/// Wires loading, validation, enrichment and emission together.
pub struct Pipeline {
    config: GeneratorConfig,
    registry: LanguageRegistry,
}

fn enter(stage: Stage) {
    info!(%stage, "entering stage");
}

impl Pipeline {
    pub fn new(config: GeneratorConfig, registry: LanguageRegistry) -> Self {
        Self { config, registry }
    }

    /// Runs every stage.
    ///
    /// ## Errors
    ///
    /// - [`CodecGenError::ValidationFailed`] when any document fails the
    ///   schema; nothing is written in that case
    /// - [`CodecGenError::UnknownLanguage`] when a target has no mapping set
    /// - any load, enrichment or write error
    #[tracing::instrument(
        name = "codecgen_run",
        skip_all,
        fields(protocol_dir = %options.protocol_dir.display(), languages = options.languages.len())
    )]
    pub fn run(&self, options: &RunOptions) -> Result<RunSummary, CodecGenError> {
        enter(Stage::Load);
        let documents = load_services(&options.protocol_dir)?;
        info!(documents = documents.len(), "loaded service documents");

        enter(Stage::Validate);
        let schema = match &options.schema {
            SchemaSource::Builtin => builtin_service_schema()?,
            SchemaSource::Path(path) => load_schema(path)?,
        };
        if !validate_services(&documents, &schema)? {
            let failures = collect_violations(&documents, &schema)?
                .into_iter()
                .map(|violation| violation.source)
                .collect::<BTreeSet<_>>()
                .len();
            return Err(CodecGenError::ValidationFailed { failures });
        }

        let defs = parse_services(&documents)?;
        let services = enrich(&defs, &self.config.types)?;
        let custom_types: BTreeSet<String> = services
            .iter()
            .flat_map(|service| service.custom_types.iter().map(|custom| custom.name.clone()))
            .collect();

        let targets = self.targets(&options.languages, &custom_types)?;
        let mut summaries: Vec<LanguageSummary> = targets
            .iter()
            .map(|target| LanguageSummary {
                language: target.support.language(),
                standard: GenerationReport::default(),
                custom: GenerationReport::default(),
            })
            .collect();

        enter(Stage::GenerateStandardCodecs);
        for (target, summary) in targets.iter().zip(&mut summaries) {
            let dir = options.output_root.join(&target.config.output_dir);
            summary.standard = target.emitter().generate_codecs(&services, &dir)?;
        }

        enter(Stage::GenerateCustomCodecs);
        for (target, summary) in targets.iter().zip(&mut summaries) {
            let dir = options.output_root.join(&target.config.custom_output_dir);
            summary.custom = target.emitter().generate_custom_codecs(&services, &dir)?;
        }

        let summary = RunSummary {
            services: services.len(),
            languages: summaries,
        };
        enter(Stage::Done);
        info!(
            files = summary.files_written(),
            skipped = summary.artifacts_skipped(),
            "generation finished"
        );
        Ok(summary)
    }

    fn targets<'a>(
        &'a self,
        languages: &[Language],
        custom_types: &'a BTreeSet<String>,
    ) -> Result<Vec<Target<'a>>, CodecGenError> {
        let languages: Vec<Language> = if languages.is_empty() {
            self.registry.languages().collect()
        } else {
            languages.to_vec()
        };

        languages
            .into_iter()
            .map(|language| -> Result<Target<'a>, CodecGenError> {
                let support = self
                    .registry
                    .get(language)
                    .ok_or_else(|| CodecGenError::UnknownLanguage(language.to_string()))?;
                let config = self.config.language(language);
                let boilerplate = Boilerplate::load(
                    support.output_layout(),
                    &config.namespace,
                    config.boilerplate_dir.as_deref(),
                )?;
                let templates = BuiltinTemplates::new(
                    support,
                    &self.config.types,
                    custom_types,
                    config.namespace.clone(),
                );
                Ok(Target {
                    support,
                    config,
                    templates,
                    boilerplate,
                })
            })
            .collect()
    }
}

//! Codec emission.
//!
//! The emitter walks the enriched services, asks the template engine for
//! each artifact and writes whatever rendered. A missing type mapping skips
//! that one artifact with a warning; only I/O and template failures stop a
//! batch.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::boilerplate::Boilerplate;
use crate::error::CodecGenError;
use crate::lang::{CustomLayout, LanguageSupport, OutputLayout};
use crate::model::{CustomType, Service};
use crate::naming::capital;
use crate::template::{RenderContext, RenderOutcome, TemplateEngine, TemplateId};
use crate::writer::{WriteMode, write_codec_file};

/// An artifact left out because one of its types has no mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArtifact {
    /// `service.method` for method codecs, the type name for custom codecs.
    pub artifact: String,
    pub type_name: String,
}

/// What one emitter call produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Files created, in creation order.
    pub written: Vec<PathBuf>,
    /// Artifacts rendered and written.
    pub rendered: Vec<String>,
    pub skipped: Vec<SkippedArtifact>,
}

impl GenerationReport {
    pub fn merge(&mut self, other: GenerationReport) {
        self.written.extend(other.written);
        self.rendered.extend(other.rendered);
        self.skipped.extend(other.skipped);
    }

    fn skip(&mut self, artifact: String, type_name: String) {
        warn!("[{artifact}] contains missing type mapping '{type_name}'. Skipping codec generation.");
        self.skipped.push(SkippedArtifact {
            artifact,
            type_name,
        });
    }
}

/// Renders and writes codecs for one language.
pub struct CodecEmitter<'a> {
    support: &'a dyn LanguageSupport,
    engine: &'a dyn TemplateEngine,
    ignored_services: BTreeSet<u8>,
    boilerplate: Boilerplate,
}

impl<'a> CodecEmitter<'a> {
    pub fn new(
        support: &'a dyn LanguageSupport,
        engine: &'a dyn TemplateEngine,
        ignored_services: BTreeSet<u8>,
        boilerplate: Boilerplate,
    ) -> Self {
        Self {
            support,
            engine,
            ignored_services,
            boilerplate,
        }
    }

    /// Emits one codec per method of every service not on the ignore list.
    ///
    /// ## Errors
    ///
    /// Returns an error if a file cannot be written or the engine fails for
    /// a reason other than a missing type mapping.
    pub fn generate_codecs(
        &self,
        services: &[Service],
        output_dir: &Path,
    ) -> Result<GenerationReport, CodecGenError> {
        match self.support.output_layout() {
            OutputLayout::Consolidated { header, source } => {
                self.generate_consolidated(services, &output_dir.join(header), &output_dir.join(source))
            }
            OutputLayout::PerArtifact { extension } => {
                self.generate_per_artifact(services, output_dir, extension)
            }
        }
    }

    fn included<'s>(&self, services: &'s [Service]) -> impl Iterator<Item = &'s Service> {
        services.iter().filter(|service| {
            let ignored = self.ignored_services.contains(&service.id);
            if ignored {
                info!(
                    language = %self.support.language(),
                    service = %service.name,
                    id = service.id,
                    "service is on the ignore list; skipping its codecs"
                );
            }
            !ignored
        })
    }

    fn generate_consolidated(
        &self,
        services: &[Service],
        header_path: &Path,
        source_path: &Path,
    ) -> Result<GenerationReport, CodecGenError> {
        let mut report = GenerationReport::default();
        write_codec_file(header_path, &self.boilerplate.header_includes, WriteMode::Create)?;
        write_codec_file(source_path, &self.boilerplate.source_header, WriteMode::Create)?;
        report.written.push(header_path.to_path_buf());
        report.written.push(source_path.to_path_buf());

        for service in self.included(services) {
            for method in &service.methods {
                let artifact = format!("{}.{}", service.name, method.name);
                let context = RenderContext::Method {
                    service_name: &service.name,
                    method,
                };
                let header = self.engine.render(TemplateId::MethodCodecHeader, &context)?;
                let source = self.engine.render(TemplateId::MethodCodecSource, &context)?;

                match (header, source) {
                    (RenderOutcome::Rendered(header), RenderOutcome::Rendered(source)) => {
                        write_codec_file(header_path, &header, WriteMode::Append)?;
                        write_codec_file(source_path, &source, WriteMode::Append)?;
                        report.rendered.push(artifact);
                    }
                    (RenderOutcome::UnsupportedType(type_name), _)
                    | (_, RenderOutcome::UnsupportedType(type_name)) => {
                        report.skip(artifact, type_name);
                    }
                }
            }
        }

        write_codec_file(header_path, &self.boilerplate.footer, WriteMode::Append)?;
        write_codec_file(source_path, &self.boilerplate.footer, WriteMode::Append)?;
        Ok(report)
    }

    fn generate_per_artifact(
        &self,
        services: &[Service],
        output_dir: &Path,
        extension: &str,
    ) -> Result<GenerationReport, CodecGenError> {
        let mut report = GenerationReport::default();

        for service in self.included(services) {
            for method in &service.methods {
                let artifact = format!("{}.{}", service.name, method.name);
                let context = RenderContext::Method {
                    service_name: &service.name,
                    method,
                };
                match self.engine.render(TemplateId::MethodCodec, &context)? {
                    RenderOutcome::Rendered(text) => {
                        let file = format!(
                            "{}{}Codec.{extension}",
                            capital(&service.name),
                            capital(&method.name)
                        );
                        let path = output_dir.join(file);
                        write_codec_file(&path, &text, WriteMode::Create)?;
                        report.written.push(path);
                        report.rendered.push(artifact);
                    }
                    RenderOutcome::UnsupportedType(type_name) => report.skip(artifact, type_name),
                }
            }
        }

        Ok(report)
    }

    /// Emits one codec per custom type of every service.
    ///
    /// The ignore list does not apply to custom types.
    ///
    /// ## Errors
    ///
    /// Same as [`CodecEmitter::generate_codecs`].
    pub fn generate_custom_codecs(
        &self,
        services: &[Service],
        output_dir: &Path,
    ) -> Result<GenerationReport, CodecGenError> {
        let mut report = GenerationReport::default();

        for codec in services.iter().flat_map(|service| &service.custom_types) {
            let context = RenderContext::Custom { codec };
            match self.support.custom_layout() {
                CustomLayout::Pair {
                    suffix,
                    header_ext,
                    source_ext,
                } => {
                    let header = self.engine.render(TemplateId::CustomCodecHeader, &context)?;
                    let source = self.engine.render(TemplateId::CustomCodecSource, &context)?;
                    match (header, source) {
                        (RenderOutcome::Rendered(header), RenderOutcome::Rendered(source)) => {
                            let stem = format!("{}{suffix}", codec.name.to_lowercase());
                            let header_path = output_dir.join(format!("{stem}.{header_ext}"));
                            let source_path = output_dir.join(format!("{stem}.{source_ext}"));
                            write_codec_file(&header_path, &header, WriteMode::Create)?;
                            write_codec_file(&source_path, &source, WriteMode::Create)?;
                            report.written.extend([header_path, source_path]);
                            report.rendered.push(codec.name.clone());
                        }
                        (RenderOutcome::UnsupportedType(type_name), _)
                        | (_, RenderOutcome::UnsupportedType(type_name)) => {
                            report.skip(codec.name.clone(), type_name);
                        }
                    }
                }
                CustomLayout::Single { extension } => {
                    match self.engine.render(TemplateId::CustomCodec, &context)? {
                        RenderOutcome::Rendered(text) => {
                            let path = output_dir.join(custom_file_name(codec, extension));
                            write_codec_file(&path, &text, WriteMode::Create)?;
                            report.written.push(path);
                            report.rendered.push(codec.name.clone());
                        }
                        RenderOutcome::UnsupportedType(type_name) => {
                            report.skip(codec.name.clone(), type_name);
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}

fn custom_file_name(codec: &CustomType, extension: &str) -> String {
    format!("{}Codec.{extension}", capital(&codec.name))
}

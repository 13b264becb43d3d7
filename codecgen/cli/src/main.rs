//! Codecgen CLI - generate protocol codecs from service documents

use std::path::PathBuf;

use clap::Parser;
use codecgen::{
    GeneratorConfig, Language, LanguageRegistry, Pipeline, RunOptions, RunSummary, SchemaSource,
};
use colored::Colorize;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "codecgen")]
#[command(about = "Generate wire protocol codecs from service documents", long_about = None)]
struct Cli {
    /// Directory holding one YAML document per service
    #[arg(short, long, value_name = "DIR")]
    protocol_dir: PathBuf,

    /// JSON schema for service documents (defaults to the bundled schema)
    #[arg(short, long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Root directory for generated code
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Target language; repeat for several (defaults to all)
    #[arg(short, long = "lang", value_name = "LANG")]
    languages: Vec<Language>,

    /// Generator configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long)]
    json: bool,
}

/// Initialize tracing subscriber with appropriate filters.
///
/// `RUST_LOG` wins over the `-v` flags. Logs always go to stderr so the
/// summary on stdout stays clean.
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            // Skipped artifacts are warnings, so they show by default.
            0 => "warn".to_string(),
            1 => "warn,codecgen=info".to_string(),
            2 => "info,codecgen=debug".to_string(),
            _ => "debug,codecgen=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(verbose >= 2)
                    .with_level(true)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn print_summary(summary: &RunSummary, output: &std::path::Path) {
    for language in &summary.languages {
        println!(
            "{} {:<5} {} codecs, {} custom codecs",
            "✓".green(),
            language.language.to_string(),
            language.standard.rendered.len(),
            language.custom.rendered.len()
        );
        for skipped in language.standard.skipped.iter().chain(&language.custom.skipped) {
            println!(
                "  {} {} (no mapping for '{}')",
                "skipped".yellow(),
                skipped.artifact,
                skipped.type_name
            );
        }
    }
    println!(
        "{} files from {} services written under {}",
        summary.files_written().to_string().bold(),
        summary.services,
        output.display()
    );
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    tracing::debug!(protocol_dir = %cli.protocol_dir.display(), "codecgen starting");

    let config = match &cli.config {
        Some(path) => match GeneratorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                std::process::exit(1);
            }
        },
        None => GeneratorConfig::default(),
    };

    let options = RunOptions {
        protocol_dir: cli.protocol_dir,
        schema: cli.schema.map_or(SchemaSource::Builtin, SchemaSource::Path),
        output_root: cli.output,
        languages: cli.languages,
    };

    match Pipeline::new(config, LanguageRegistry::builtin()).run(&options) {
        Ok(summary) => print_summary(&summary, &options.output_root),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

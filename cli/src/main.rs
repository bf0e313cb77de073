use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Deserialize;
use table_prefix::{
    DefaultQuoteStrategy, IdentifierPrefixer, PlatformContext, PlatformKind, PrefixOutcome,
    PrefixSettings,
};
use table_prefix_core::{ClassMetadata, MappingDocument, validate_metadata};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// CLI-specific platform enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliPlatform {
    Generic,
    Postgresql,
    Mysql,
}

impl From<CliPlatform> for PlatformKind {
    fn from(platform: CliPlatform) -> Self {
        match platform {
            CliPlatform::Generic => Self::Generic,
            CliPlatform::Postgresql => Self::PostgreSql,
            CliPlatform::Mysql => Self::MySql,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "table-prefix")]
#[command(about = "Prefix table, index, join table and sequence names in ORM class metadata")]
struct Cli {
    /// Log every skipped class and applied rename to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prefix the identifiers of every class in a metadata document.
    Apply(ApplyArgs),
    /// Report structural problems in metadata documents.
    Check(CheckArgs),
    /// Write a settings file with default values.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct ApplyArgs {
    /// Metadata document (JSON, or YAML with a .yml/.yaml extension).
    input: PathBuf,
    /// Settings file; command-line options override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Prefix to prepend.
    #[arg(long)]
    prefix: Option<String>,
    /// Namespace filter (repeatable). Replaces the configured filters.
    #[arg(long = "bundle")]
    bundles: Vec<String>,
    /// Encoding label the prefix is converted to.
    #[arg(long)]
    encoding: Option<String>,
    /// Database platform used to quote sequence names.
    #[arg(long, default_value = "generic")]
    platform: CliPlatform,
    /// Skip single-table-inheritance classes that are not the hierarchy root.
    #[arg(long, overrides_with = "no_skip_inheritance_children")]
    skip_inheritance_children: bool,
    /// Prefix single-table-inheritance children even if the settings skip them.
    #[arg(long)]
    no_skip_inheritance_children: bool,
    /// Rebuild PostgreSQL identity generators from the prefixed table name.
    #[arg(long, overrides_with = "no_legacy_identity_sequences")]
    legacy_identity_sequences: bool,
    /// Leave identity generators alone even if the settings enable rebuilding.
    #[arg(long)]
    no_legacy_identity_sequences: bool,
    /// Number of parallel workers (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
    /// Output path (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format (default: taken from the output extension, else json).
    #[arg(long)]
    format: Option<CliOutputFormat>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Metadata documents to check.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Where to write the settings file.
    #[arg(long)]
    output: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

/// Metadata documents are either a `{ classes: [...] }` object or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentInput {
    Classes(Vec<ClassMetadata>),
    Document(MappingDocument),
}

impl From<DocumentInput> for MappingDocument {
    fn from(input: DocumentInput) -> Self {
        match input {
            DocumentInput::Classes(classes) => MappingDocument { classes },
            DocumentInput::Document(document) => document,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Apply(args) => run_apply(args),
        Command::Check(args) => run_check(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_apply(args: ApplyArgs) -> Result<(), String> {
    let settings = resolve_settings(&args)?;
    let prefixer = IdentifierPrefixer::from_settings(&settings)
        .map_err(|err| format!("Invalid prefix configuration: {err}"))?;
    let mut document = read_document(&args.input)?;

    let platform = PlatformKind::from(args.platform).platform();
    let quote_strategy = DefaultQuoteStrategy;
    let ctx = PlatformContext::new(platform.as_ref(), &quote_strategy);
    info!(
        prefix = %prefixer.prefix(),
        platform = platform.name(),
        classes = document.class_count(),
        "Prefixing metadata document"
    );

    let pool = build_pool(args.jobs)?;
    let outcomes = pool.install(|| {
        document
            .classes
            .par_iter_mut()
            .map(|metadata| prefixer.apply(metadata, &ctx).map_err(|err| err.to_string()))
            .collect::<Result<Vec<PrefixOutcome>, String>>()
    })?;

    let format = args
        .format
        .or_else(|| args.output.as_deref().and_then(format_from_extension))
        .unwrap_or(CliOutputFormat::Json);
    let raw = serialize_document(&document, format)?;
    match &args.output {
        Some(path) => {
            ensure_parent_dir(path)?;
            fs::write(path, raw)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
        }
        None => print!("{raw}"),
    }

    let applied: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            PrefixOutcome::Applied(summary) => Some(summary),
            PrefixOutcome::Skipped(_) => None,
        })
        .collect();
    let renamed: usize = applied.iter().map(|summary| summary.renamed_count()).sum();
    eprintln!(
        "Prefixed {} of {} class(es), {} identifier(s) renamed.",
        applied.len(),
        outcomes.len(),
        renamed
    );
    Ok(())
}

fn resolve_settings(args: &ApplyArgs) -> Result<PrefixSettings, String> {
    let mut settings = match &args.config {
        Some(path) => PrefixSettings::load(path)
            .map_err(|err| format!("Failed to load settings '{}': {err}", path.display()))?,
        None => PrefixSettings::default(),
    };

    if let Some(prefix) = &args.prefix {
        settings.prefix = prefix.clone();
    }
    if !args.bundles.is_empty() {
        settings.bundles = args.bundles.clone();
    }
    if let Some(encoding) = &args.encoding {
        settings.encoding = encoding.clone();
    }
    if let Some(skip) =
        flag_override(args.skip_inheritance_children, args.no_skip_inheritance_children)
    {
        settings.skip_inheritance_children = skip;
    }
    if let Some(enabled) =
        flag_override(args.legacy_identity_sequences, args.no_legacy_identity_sequences)
    {
        settings.legacy_identity_sequences = enabled;
    }

    debug!(?settings, "Resolved prefix settings");
    Ok(settings)
}

/// Resolves a `--flag` / `--no-flag` pair; `None` keeps the configured value.
fn flag_override(enable: bool, disable: bool) -> Option<bool> {
    match (enable, disable) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

fn build_pool(jobs: Option<usize>) -> Result<rayon::ThreadPool, String> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = jobs {
        if jobs == 0 {
            return Err("--jobs must be at least 1".to_string());
        }
        builder = builder.num_threads(jobs);
    }
    builder
        .build()
        .map_err(|err| format!("Failed to start worker pool: {err}"))
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let mut findings = 0usize;
    let mut classes = 0usize;

    for path in &args.inputs {
        let document = read_document(path)?;
        classes += document.class_count();
        for metadata in &document.classes {
            for error in validate_metadata(metadata) {
                println!("{}: {}: {error}", path.display(), metadata.name);
                findings += 1;
            }
        }
    }

    if findings > 0 {
        return Err(format!(
            "{findings} problem(s) found in {classes} class(es)"
        ));
    }
    println!(
        "Checked {classes} class(es) in {} file(s), no problems found.",
        args.inputs.len()
    );
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "'{}' already exists; pass --force to overwrite",
            args.output.display()
        ));
    }
    ensure_parent_dir(&args.output)?;
    PrefixSettings::default()
        .save(&args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;
    println!("Wrote default settings to '{}'.", args.output.display());
    Ok(())
}

fn read_document(path: &Path) -> Result<MappingDocument, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let input: DocumentInput = match format_from_extension(path) {
        Some(CliOutputFormat::Yaml) => serde_yaml::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?,
        _ => serde_json::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?,
    };
    Ok(input.into())
}

fn serialize_document(
    document: &MappingDocument,
    format: CliOutputFormat,
) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(document)
            .map(|mut raw| {
                raw.push('\n');
                raw
            })
            .map_err(|err| format!("Failed to serialize metadata: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(document)
            .map_err(|err| format!("Failed to serialize metadata: {err}")),
    }
}

fn format_from_extension(path: &Path) -> Option<CliOutputFormat> {
    match path.extension()?.to_str()? {
        "yml" | "yaml" => Some(CliOutputFormat::Yaml),
        "json" => Some(CliOutputFormat::Json),
        _ => None,
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    Ok(())
}

use crate::binding::{print_issues, resolve, Resolution, SchemeRegistry};
use crate::codegen::{generate, GeneratedFile};
use crate::config::load_for_model;
use crate::model::{load_model, ServiceModel};
use crate::openapi::{generate_documents, render_document, v2, v3, DocumentFormat, DocumentVersion};
use crate::router::MountTable;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Command-line interface for httpbind
///
/// Resolves the HTTP bindings of a service model and generates the transport
/// layer and API documents from them.
#[derive(Parser)]
#[command(name = "httpbind-gen")]
#[command(about = "HTTP binding resolver and transport generator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate transport modules and API documents from a model
    Generate {
        /// Path to the service model (YAML or JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Output directory (default: `output_dir` from httpbind.toml, else `gen`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to httpbind.toml
        /// If not provided, will auto-detect alongside the model
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show what would be written without touching the filesystem
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Exit successfully even when some methods failed to resolve
        #[arg(long, default_value_t = false)]
        allow_failures: bool,
    },
    /// Resolve bindings and report failures without generating anything
    Check {
        #[arg(short, long)]
        model: PathBuf,
    },
    /// Print the mount table
    Routes {
        #[arg(short, long)]
        model: PathBuf,
    },
    /// Print one API document to stdout
    Openapi {
        #[arg(short, long)]
        model: PathBuf,

        #[arg(long, value_enum, default_value_t = VersionArg::V3)]
        version: VersionArg,

        #[arg(long, value_enum, default_value_t = FormatArg::Yaml)]
        format: FormatArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VersionArg {
    /// Swagger 2.0
    V2,
    /// OpenAPI 3.0.3
    V3,
}

impl From<VersionArg> for DocumentVersion {
    fn from(v: VersionArg) -> Self {
        match v {
            VersionArg::V2 => DocumentVersion::V2,
            VersionArg::V3 => DocumentVersion::V3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for DocumentFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Json => DocumentFormat::Json,
            FormatArg::Yaml => DocumentFormat::Yaml,
        }
    }
}

/// Parse the process arguments and run. Exits with status 1 when the command
/// reports failures.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    if !execute(&cli.command, &mut stdout)? {
        std::process::exit(1);
    }
    Ok(())
}

/// Run a command, writing its report to `out`.
///
/// Returns `Ok(false)` when the command completed but the model has
/// resolution failures that were not allowed.
pub fn execute(command: &Commands, out: &mut dyn Write) -> anyhow::Result<bool> {
    match command {
        Commands::Generate {
            model,
            output,
            config,
            dry_run,
            allow_failures,
        } => {
            let (service_model, resolution) = load_and_resolve(model)?;
            let config = load_for_model(config.as_deref(), model)?;
            let output_dir = output.clone().unwrap_or_else(|| config.output_dir.clone());

            let mut files = generate(&service_model, &resolution, &config.codegen_options())
                .context("Failed to render generated sources")?;
            if config.openapi.enabled {
                files.extend(
                    generate_documents(
                        &service_model,
                        &resolution,
                        &config.openapi.versions,
                        &config.openapi.formats,
                    )
                    .context("Failed to render API documents")?,
                );
            }

            if *dry_run {
                for file in &files {
                    writeln!(out, "would write {}", output_dir.join(&file.path).display())?;
                }
            } else {
                let written = write_files(&output_dir, &files)?;
                info!(
                    output = %output_dir.display(),
                    files = files.len(),
                    written,
                    "generation complete"
                );
                writeln!(
                    out,
                    "wrote {written} of {} file(s) to {}",
                    files.len(),
                    output_dir.display()
                )?;
            }
            Ok(report_failures(&resolution, *allow_failures))
        }
        Commands::Check { model } => {
            let (_, resolution) = load_and_resolve(model)?;
            writeln!(
                out,
                "{} endpoint(s), {} static mount(s), {} failure(s)",
                resolution.endpoints.len(),
                resolution.mounts.len(),
                resolution.failures.len()
            )?;
            Ok(report_failures(&resolution, false))
        }
        Commands::Routes { model } => {
            let (service_model, resolution) = load_and_resolve(model)?;
            let table = MountTable::from_resolution(&service_model, &resolution);
            write!(out, "{}", table.render())?;
            Ok(true)
        }
        Commands::Openapi { model, version, format } => {
            let (service_model, resolution) = load_and_resolve(model)?;
            let format = DocumentFormat::from(*format);
            let rendered = match DocumentVersion::from(*version) {
                DocumentVersion::V2 => {
                    render_document(&v2::synthesize(&service_model, &resolution), format)
                }
                DocumentVersion::V3 => {
                    render_document(&v3::synthesize(&service_model, &resolution), format)
                }
            }
            .context("Failed to render API document")?;
            out.write_all(rendered.as_bytes())?;
            Ok(true)
        }
    }
}

fn load_and_resolve(path: &Path) -> anyhow::Result<(ServiceModel, Resolution)> {
    let model = load_model(path)?;
    let resolution = resolve(&model, &SchemeRegistry::from_model(&model));
    Ok((model, resolution))
}

fn report_failures(resolution: &Resolution, allow_failures: bool) -> bool {
    if resolution.is_clean() {
        return true;
    }
    print_issues(&resolution.failures);
    if allow_failures {
        warn!(failures = resolution.failures.len(), "continuing despite resolution failures");
        return true;
    }
    false
}

/// Write files under `root`, leaving files whose contents are unchanged
/// untouched. Returns how many were written.
fn write_files(root: &Path, files: &[GeneratedFile]) -> anyhow::Result<usize> {
    let mut written = 0;
    for file in files {
        let target = root.join(&file.path);
        if std::fs::read_to_string(&target).is_ok_and(|existing| existing == file.contents) {
            debug!(path = %target.display(), "unchanged");
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&target, &file.contents)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        written += 1;
    }
    Ok(written)
}

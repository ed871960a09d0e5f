//! Form Schema CLI
//!
//! Validates, diffs and formats form schema files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use form_schema::config::OutputFormat;
use form_schema::{
    detect, detect_layout_changes, parse, serialize, Checksum, DiffType, FormSchemaConfig,
    Schema, Severity, ValidationResult,
};
use serde::Serialize;
use similar::TextDiff;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "form-schema")]
#[command(about = "Validate, diff and format form schema files")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate schema files
    Validate {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Compare a local schema against a previously fetched remote one
    Diff {
        /// Local schema file
        local: PathBuf,
        /// Remote schema file
        remote: PathBuf,
        /// Exit with status 1 when the schemas differ
        #[arg(long)]
        exit_code: bool,
    },

    /// Rewrite a schema file in canonical form
    Fmt {
        /// Schema file
        file: PathBuf,
        /// Report differences instead of rewriting
        #[arg(long)]
        check: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the command found a blocking problem
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = FormSchemaConfig::load_from(cli.config.as_deref())
        .context("loading configuration")?;
    let format = if cli.json {
        OutputFormat::Json
    } else {
        config.output.format
    };

    match cli.command {
        Commands::Validate { paths } => validate_files(&config, format, &paths),
        Commands::Diff {
            local,
            remote,
            exit_code,
        } => diff_files(format, &local, &remote, exit_code),
        Commands::Fmt { file, check } => format_file(&file, check),
    }
}

fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing {}", path.display()))
}

fn collect_files(config: &FormSchemaConfig, paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path) {
                let entry = entry.with_context(|| format!("walking {}", path.display()))?;
                if entry.file_type().is_file() && config.matches_extension(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            debug!(dir = %path.display(), count = found.len(), "collected schema files");
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            bail!("{} does not exist", path.display());
        }
    }
    Ok(files)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ParseFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ValidationResult>,
}

#[derive(Serialize)]
struct ParseFailure {
    code: &'static str,
    message: String,
}

fn validate_files(
    config: &FormSchemaConfig,
    format: OutputFormat,
    paths: &[PathBuf],
) -> anyhow::Result<bool> {
    let files = collect_files(config, paths)?;
    let validator = config.validator();
    let strict = config.validation.warnings_as_errors;

    let mut reports = Vec::with_capacity(files.len());
    let mut passed = true;

    for file in &files {
        let text =
            fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let path = file.display().to_string();

        match parse(&text) {
            Ok(schema) => {
                let result = validator.validate(&schema);
                if !result.is_valid || (strict && result.has_warnings()) {
                    passed = false;
                }
                reports.push(FileReport {
                    path,
                    error: None,
                    result: Some(result),
                });
            }
            Err(e) => {
                passed = false;
                reports.push(FileReport {
                    path,
                    error: Some(ParseFailure {
                        code: e.code(),
                        message: e.to_string(),
                    }),
                    result: None,
                });
            }
        }
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            println!("🔍 Validating {} schema file(s)...\n", files.len());
            for report in &reports {
                print_report(report, strict);
            }
            println!();
            if passed {
                println!("✅ All schemas valid");
            } else {
                println!("❌ Validation failed");
            }
        }
    }

    info!(files = files.len(), passed, "validation finished");
    Ok(passed)
}

fn print_report(report: &FileReport, strict: bool) {
    if let Some(error) = &report.error {
        println!("  ❌ {} [{}] {}", report.path, error.code, error.message);
        return;
    }
    let Some(result) = &report.result else {
        return;
    };

    if result.issues.is_empty() {
        println!("  ✅ {}", report.path);
        return;
    }

    let blocking = !result.is_valid || (strict && result.has_warnings());
    println!("  {} {}", if blocking { "❌" } else { "⚠️" }, report.path);
    for issue in &result.issues {
        let level = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!(
            "      {} {} [{}]: {}",
            level, issue.field_code, issue.rule, issue.message
        );
    }
}

fn diff_files(
    format: OutputFormat,
    local_path: &Path,
    remote_path: &Path,
    exit_code: bool,
) -> anyhow::Result<bool> {
    let local = load_schema(local_path)?;
    let remote = load_schema(remote_path)?;

    let identical = Checksum::of_schema(&local)? == Checksum::of_schema(&remote)?;
    let layout_changed = !identical && detect_layout_changes(&local.layout, &remote.layout);
    let diff = detect(&local, &remote.fields);

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "identical": identical,
                "layoutChanged": layout_changed,
                "diff": diff,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "🔍 Comparing {} -> {}\n",
                remote_path.display(),
                local_path.display()
            );
            if identical {
                println!("✅ Schemas are identical");
            } else {
                if layout_changed {
                    println!("📐 Layout changed");
                }
                for entry in &diff.entries {
                    let marker = match entry.diff_type {
                        DiffType::Added => "+",
                        DiffType::Modified => "~",
                        DiffType::Deleted => "-",
                    };
                    println!(
                        "  {} {} ({}): {}",
                        marker, entry.field_code, entry.field_label, entry.details
                    );
                }
                println!(
                    "\n📊 {} added, {} modified, {} deleted",
                    diff.summary.added, diff.summary.modified, diff.summary.deleted
                );
            }
        }
    }

    Ok(!(exit_code && !identical))
}

fn format_file(path: &Path, check: bool) -> anyhow::Result<bool> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let schema = parse(&text).with_context(|| format!("parsing {}", path.display()))?;
    let canonical = serialize(&schema.layout, Some(&schema.fields))?;

    if text == canonical {
        println!("✅ {} is already formatted", path.display());
        return Ok(true);
    }

    if check {
        let name = path.display().to_string();
        let diff = TextDiff::from_lines(&text, &canonical);
        print!(
            "{}",
            diff.unified_diff()
                .context_radius(3)
                .header(&name, &format!("{} (formatted)", name))
        );
        return Ok(false);
    }

    fs::write(path, &canonical).with_context(|| format!("writing {}", path.display()))?;
    println!("✏️  Formatted {}", path.display());
    Ok(true)
}

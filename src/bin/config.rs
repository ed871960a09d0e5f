//! Form Schema Config CLI
//!
//! View and manage form-schema tool configuration.

use anyhow::Context;
use clap::{Parser, Subcommand};
use form_schema::FormSchemaConfig;

#[derive(Parser)]
#[command(name = "form-schema-config")]
#[command(about = "View and manage form-schema configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "form-schema.toml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = FormSchemaConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Form Schema Configuration\n");
                println!("Validation:");
                println!("  Warnings as errors: {}", cfg.validation.warnings_as_errors);
                if cfg.validation.ignore_rules.is_empty() {
                    println!("  Ignored rules: none");
                } else {
                    println!("  Ignored rules:");
                    for rule in &cfg.validation.ignore_rules {
                        println!("    - {}", rule);
                    }
                }

                println!("\nOutput:");
                println!("  Format: {:?}", cfg.output.format);

                println!("\nFiles:");
                println!("  Extensions: {}", cfg.files.extensions.join(", "));
            }
        }

        Commands::Init { output, force } => {
            if !force && std::path::Path::new(&output).exists() {
                anyhow::bail!("{} already exists (use --force to overwrite)", output);
            }
            FormSchemaConfig::default()
                .save(&output)
                .with_context(|| format!("writing {}", output))?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate { config } => match FormSchemaConfig::load_from(config.as_deref()) {
            Ok(cfg) => {
                println!("✅ Configuration is valid");
                println!("   Warnings as errors: {}", cfg.validation.warnings_as_errors);
                println!("   Ignored rules: {}", cfg.validation.ignore_rules.len());
                println!("   Extensions: {}", cfg.files.extensions.join(", "));
            }
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

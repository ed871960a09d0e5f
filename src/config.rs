//! Configuration for the form-schema tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (form-schema.toml)
//! - Environment variables (FORM_SCHEMA__*)
//!
//! ## Example config file (form-schema.toml):
//! ```toml
//! [validation]
//! warnings_as_errors = false
//! ignore_rules = ["MISSING_LINK_PROTOCOL"]
//!
//! [output]
//! format = "json"
//!
//! [files]
//! extensions = ["yaml", "yml"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validator::SchemaValidator;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchemaConfig {
    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub files: FilesConfig,
}

/// Validation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Treat warnings as blocking
    #[serde(default)]
    pub warnings_as_errors: bool,

    /// Rule codes never reported
    #[serde(default)]
    pub ignore_rules: Vec<String>,
}

/// Report settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// How the CLI prints reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Which files a directory scan picks up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["yaml".to_string(), "yml".to_string()]
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

impl FormSchemaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "form-schema.toml",
            ".form-schema.toml",
            "config/form-schema.toml",
        ];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "form-schema", "form-schema") {
            let xdg_config = dirs.config_dir().join("form-schema.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // FORM_SCHEMA__VALIDATION__WARNINGS_AS_ERRORS=true
        builder = builder.add_source(
            Environment::with_prefix("FORM_SCHEMA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("validation.ignore_rules")
                .with_list_parse_key("files.extensions"),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Validator honouring `ignore_rules`
    pub fn validator(&self) -> SchemaValidator {
        self.validation
            .ignore_rules
            .iter()
            .fold(SchemaValidator::new(), |validator, rule| {
                validator.ignore_rule(rule.as_str())
            })
    }

    /// True when `path` has one of the configured extensions
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                self.files
                    .extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }
}

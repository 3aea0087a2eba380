//! Configuration settings for querygen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use crate::error::{QueryGenError, Result};

/// Main configuration struct for query generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Path to the SQL migration file
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Output directory for generated SQL files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Only generate queries for this table (`schema.table` or bare `table`)
    #[serde(default)]
    pub table: Option<String>,

    /// Directory containing the query templates
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Use the templates compiled into querygen instead of `templates_dir`
    #[serde(default = "default_builtin_templates")]
    pub builtin_templates: bool,

    /// Write all tables into one `queries.sql` (ignored when `table` is set)
    #[serde(default = "default_single_file")]
    pub single_file: bool,

    /// Dry run mode - render everything but write nothing
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}
fn default_templates_dir() -> PathBuf {
    PathBuf::from(defaults::TEMPLATES_DIR)
}
fn default_builtin_templates() -> bool {
    defaults::BUILTIN_TEMPLATES
}
fn default_single_file() -> bool {
    defaults::SINGLE_FILE
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            output_dir: default_output_dir(),
            table: None,
            templates_dir: default_templates_dir(),
            builtin_templates: default_builtin_templates(),
            single_file: default_single_file(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GeneratorConfig = toml::from_str(&content).map_err(|e| {
            QueryGenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => File::from(path),
            None => File::with_name(defaults::CONFIG_FILE_NAME).required(false),
        };

        // QUERYGEN_OUTPUT_DIR, QUERYGEN_SINGLE_FILE, ...
        let env = Environment::with_prefix(defaults::ENV_PREFIX).try_parsing(true);

        let config: GeneratorConfig = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Whether a schema file has been configured at all
    pub fn has_schema(&self) -> bool {
        !self.schema_file.as_os_str().is_empty()
    }

    /// The table filter, with an empty string treated as "no filter"
    pub fn table_filter(&self) -> Option<&str> {
        self.table.as_deref().filter(|t| !t.is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.has_schema() {
            return Err(QueryGenError::ValidationError(
                "schema_file is required".into(),
            ));
        }

        if !self.schema_file.exists() {
            return Err(QueryGenError::ValidationError(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(QueryGenError::ValidationError(
                "output_dir must not be empty".into(),
            ));
        }

        Ok(())
    }
}

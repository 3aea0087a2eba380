//! querygen: Generate parameterized sqlc CRUD queries from PostgreSQL migration DDL
//!
//! This crate provides both a CLI tool and a library. It reads the DDL emitted
//! by the project's migration generator (`CREATE TABLE "schema"."table" (...)`
//! blocks plus `CREATE UNIQUE INDEX` lines) and renders five queries per table
//! (`get`, `list`, `create`, `update`, `delete`) from `{kind}.sql.tmpl`
//! templates. The output is meant to be fed to sqlc.
//!
//! # Usage in build.rs
//!
//! Configure in your `Cargo.toml`:
//!
//! ```toml
//! [package.metadata.querygen]
//! schema_file = "migrations/0_init/migration.sql"
//! output_dir = "db/queries"
//! ```
//!
//! Then use a minimal `build.rs`:
//!
//! ```rust,ignore
//! fn main() {
//!     querygen::generate_from_cargo_metadata()
//!         .expect("Failed to generate queries");
//! }
//! ```
//!
//! # Alternative: Programmatic Configuration
//!
//! ```rust,ignore
//! querygen::QueryGenBuilder::new("migration.sql")
//!     .output_dir("queries")
//!     .builtin_templates()
//!     .generate()
//!     .expect("Failed to generate queries");
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! querygen -schema prisma/migrations/0_init/migration.sql -table account.account
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod parser;

use std::path::{Path, PathBuf};

use tracing::info;

pub use codegen::{GeneratedFile, QueryGenerator, QueryKind, TemplateManager};
pub use config::GeneratorConfig;
pub use error::{QueryGenError, Result};

/// Build the generator described by `config`
pub fn query_generator(config: &GeneratorConfig) -> QueryGenerator {
    if config.builtin_templates {
        QueryGenerator::with_templates(TemplateManager::builtin())
    } else {
        QueryGenerator::new(&config.templates_dir)
    }
}

/// Main entry point for query generation. Returns the files written, or in
/// dry-run mode the files that would have been written.
pub fn generate(config: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    config.validate()?;

    let mut generator = query_generator(config);

    let written = if config.dry_run {
        generator
            .plan_from_schema(
                &config.schema_file,
                &config.output_dir,
                config.table_filter(),
                config.single_file,
            )?
            .into_iter()
            .map(|f| f.path)
            .collect()
    } else {
        generator.generate_from_schema(
            &config.schema_file,
            &config.output_dir,
            config.table_filter(),
            config.single_file,
        )?
    };

    info!("Query generation complete ({} files)", written.len());
    Ok(written)
}

/// Builder pattern for easy configuration in build.rs
pub struct QueryGenBuilder {
    config: GeneratorConfig,
}

impl QueryGenBuilder {
    /// Create a new builder with the given schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: GeneratorConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the template directory
    pub fn templates_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.templates_dir = dir.as_ref().to_path_buf();
        self.config.builtin_templates = false;
        self
    }

    /// Use the templates compiled into querygen
    pub fn builtin_templates(mut self) -> Self {
        self.config.builtin_templates = true;
        self
    }

    /// Only generate queries for one table (`schema.table` or `table`)
    pub fn table(mut self, table: &str) -> Self {
        self.config.table = Some(table.to_string());
        self
    }

    /// Write every table into a single `queries.sql`
    pub fn single_file(mut self) -> Self {
        self.config.single_file = true;
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the queries
    pub fn generate(self) -> Result<Vec<PathBuf>> {
        generate(&self.config)
    }
}

/// Configuration for `[package.metadata.querygen]` in Cargo.toml
#[derive(Debug, Clone, Default, serde::Deserialize)]
struct CargoMetadataConfig {
    /// Path to the migration file (required)
    schema_file: Option<String>,

    /// Output directory, relative to the manifest (default: `$OUT_DIR/queries`)
    output_dir: Option<String>,

    /// Template directory, relative to the manifest (default: built-in templates)
    templates_dir: Option<String>,

    /// Single table to generate (optional)
    table: Option<String>,

    /// Write a single `queries.sql` (default: false)
    #[serde(default)]
    single_file: bool,
}

#[derive(Debug, serde::Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackage {
    metadata: Option<CargoPackageMetadata>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackageMetadata {
    querygen: Option<CargoMetadataConfig>,
}

/// Generate queries from `[package.metadata.querygen]` in Cargo.toml
///
/// ```rust,ignore
/// // build.rs
/// fn main() {
///     querygen::generate_from_cargo_metadata()
///         .expect("Failed to generate queries");
/// }
/// ```
pub fn generate_from_cargo_metadata() -> Result<Vec<PathBuf>> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(|_| {
        QueryGenError::ConfigError(
            "CARGO_MANIFEST_DIR not set - are you running from build.rs?".into(),
        )
    })?;
    let manifest_dir = PathBuf::from(manifest_dir);

    let cargo_toml_path = manifest_dir.join("Cargo.toml");
    let cargo_toml_content = std::fs::read_to_string(&cargo_toml_path)?;

    let cargo_toml: CargoToml = toml::from_str(&cargo_toml_content).map_err(|e| {
        QueryGenError::ConfigError(format!(
            "Failed to parse {}: {}",
            cargo_toml_path.display(),
            e
        ))
    })?;

    let metadata_config = cargo_toml
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.querygen)
        .ok_or_else(|| {
            QueryGenError::ConfigError(
                "Missing [package.metadata.querygen] section in Cargo.toml".into(),
            )
        })?;

    let schema_file = metadata_config.schema_file.ok_or_else(|| {
        QueryGenError::ConfigError("schema_file is required in [package.metadata.querygen]".into())
    })?;
    let schema_path = manifest_dir.join(&schema_file);

    let mut builder = QueryGenBuilder::new(&schema_path);

    builder = match metadata_config.output_dir {
        Some(dir) => builder.output_dir(manifest_dir.join(dir)),
        None => {
            let out_dir = std::env::var("OUT_DIR").map_err(|_| {
                QueryGenError::ConfigError(
                    "OUT_DIR not set - are you running from build.rs?".into(),
                )
            })?;
            builder.output_dir(PathBuf::from(out_dir).join("queries"))
        }
    };

    builder = match &metadata_config.templates_dir {
        Some(dir) => {
            let dir = manifest_dir.join(dir);
            println!("cargo:rerun-if-changed={}", dir.display());
            builder.templates_dir(dir)
        }
        None => builder.builtin_templates(),
    };

    if let Some(table) = &metadata_config.table {
        builder = builder.table(table);
    }
    if metadata_config.single_file {
        builder = builder.single_file();
    }

    // Emit rerun-if-changed
    println!("cargo:rerun-if-changed={}", schema_path.display());
    println!("cargo:rerun-if-changed={}", cargo_toml_path.display());

    builder.generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_settings() {
        let builder = QueryGenBuilder::new("migration.sql")
            .output_dir("out")
            .table("account.account")
            .single_file()
            .builtin_templates();
        let config = builder.config();
        assert_eq!(config.schema_file, PathBuf::from("migration.sql"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.table_filter(), Some("account.account"));
        assert!(config.single_file);
        assert!(config.builtin_templates);

        let builder = QueryGenBuilder::new("migration.sql")
            .builtin_templates()
            .templates_dir("tpl");
        assert!(!builder.config().builtin_templates);
    }

    #[test]
    fn test_generate_rejects_missing_schema() {
        let err = QueryGenBuilder::new("does/not/exist.sql")
            .generate()
            .unwrap_err();
        assert!(matches!(err, QueryGenError::ValidationError(_)));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("migration.sql");
        std::fs::write(
            &schema,
            "CREATE TABLE \"shop\".\"item\" (\n    \"id\" BIGSERIAL PRIMARY KEY\n);\n",
        )
        .unwrap();
        let out = dir.path().join("queries");

        let planned = QueryGenBuilder::new(&schema)
            .output_dir(&out)
            .builtin_templates()
            .dry_run()
            .generate()
            .unwrap();

        assert_eq!(planned, vec![out.join("shop_item.sql")]);
        assert!(!out.exists());
    }

    #[test]
    fn test_cargo_metadata_section() {
        let toml_content = r#"
            [package]
            name = "shop-db"

            [package.metadata.querygen]
            schema_file = "migrations/0_init/migration.sql"
            table = "item"
        "#;
        let cargo: CargoToml = toml::from_str(toml_content).unwrap();
        let config = cargo.package.unwrap().metadata.unwrap().querygen.unwrap();
        assert_eq!(
            config.schema_file.as_deref(),
            Some("migrations/0_init/migration.sql")
        );
        assert_eq!(config.table.as_deref(), Some("item"));
        assert!(config.output_dir.is_none());
        assert!(!config.single_file);
    }
}

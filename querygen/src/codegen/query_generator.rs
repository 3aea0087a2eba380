//! Query generation orchestrator
//!
//! Parses the schema, renders every query kind for every selected table and
//! writes the results. All output of a run is rendered in memory before the
//! first file is written, so a template or helper failure leaves the output
//! directory untouched. A write failure part way through can still leave
//! some files of the run on disk.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::query_kind::QueryKind;
use super::template_manager::TemplateManager;
use crate::error::Result;
use crate::parser::{self, Table};

/// File name used in single-file mode
pub const SINGLE_FILE_NAME: &str = "queries.sql";

/// Disclaimer opening a single-file output
pub const SINGLE_FILE_HEADER: &str = "-- Code generated by querygen. DO NOT EDIT.\n\
-- This file contains all queries for the database schema.";

const BANNER_RULE: &str = "-- ========================================";

/// A rendered output file that has not been written yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Renders queries for parsed tables through a [`TemplateManager`]
pub struct QueryGenerator {
    templates: TemplateManager,
}

impl QueryGenerator {
    /// Create a generator reading templates from `template_dir`
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self::with_templates(TemplateManager::new(template_dir))
    }

    pub fn with_templates(templates: TemplateManager) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &TemplateManager {
        &self.templates
    }

    /// Parse `schema_file`, render queries and write them under `output_dir`.
    ///
    /// With a `table_filter` only the table whose bare or `schema.table` name
    /// equals it is generated. `single_file` writes everything into
    /// `queries.sql` and is ignored when a filter is given. Existing files are
    /// overwritten. Returns the paths written.
    pub fn generate_from_schema(
        &mut self,
        schema_file: &Path,
        output_dir: &Path,
        table_filter: Option<&str>,
        single_file: bool,
    ) -> Result<Vec<PathBuf>> {
        let files = self.plan_from_schema(schema_file, output_dir, table_filter, single_file)?;

        fs::create_dir_all(output_dir)?;
        write_files(&files)?;

        Ok(files.into_iter().map(|f| f.path).collect())
    }

    /// Everything [`generate_from_schema`](Self::generate_from_schema) does
    /// except touching `output_dir`
    pub fn plan_from_schema(
        &mut self,
        schema_file: &Path,
        output_dir: &Path,
        table_filter: Option<&str>,
        single_file: bool,
    ) -> Result<Vec<GeneratedFile>> {
        let table_filter = table_filter.filter(|t| !t.is_empty());

        info!("Parsing schema: {}", schema_file.display());
        let tables = parser::parse_schema_file(schema_file)?;
        info!("Found {} tables", tables.len());

        self.templates.load_templates()?;

        let tables = filter_tables(tables, table_filter);
        debug!(
            "After filtering: {} tables (filter={:?})",
            tables.len(),
            table_filter
        );

        if single_file && table_filter.is_none() {
            Ok(vec![self.render_single_file(&tables, output_dir)?])
        } else {
            self.render_per_table(&tables, output_dir)
        }
    }

    /// Render every kind for `table`, in [`QueryKind::ALL`] order, skipping
    /// kinds that render to nothing
    pub fn render_table(&self, table: &Table) -> Result<Vec<String>> {
        let mut queries = Vec::new();

        for kind in QueryKind::ALL {
            let query = self.templates.generate_query(kind, table)?;
            let query = query.trim_end();
            if query.trim().is_empty() {
                debug!("No {} query for {}", kind, table.qualified_name());
                continue;
            }
            queries.push(query.to_string());
        }

        Ok(queries)
    }

    /// One `<schema>_<table>.sql` per table
    pub fn render_per_table(
        &self,
        tables: &[Table],
        output_dir: &Path,
    ) -> Result<Vec<GeneratedFile>> {
        tables
            .iter()
            .map(|table| -> Result<GeneratedFile> {
                let queries = self.render_table(table)?;
                info!("Generated queries for table: {}", table.qualified_name());
                Ok(GeneratedFile {
                    path: output_dir.join(format!("{}.sql", table.safe_file_name())),
                    contents: finish(queries),
                })
            })
            .collect()
    }

    /// All tables in one `queries.sql`, each behind a banner naming the table
    pub fn render_single_file(
        &self,
        tables: &[Table],
        output_dir: &Path,
    ) -> Result<GeneratedFile> {
        let mut sections = vec![SINGLE_FILE_HEADER.to_string()];

        for table in tables {
            let mut section = vec![format!(
                "{rule}\n-- Queries for table: {name}\n{rule}",
                rule = BANNER_RULE,
                name = table.qualified_name()
            )];
            section.extend(self.render_table(table)?);
            sections.push(section.join("\n\n"));
            info!("Generated queries for table: {}", table.qualified_name());
        }

        Ok(GeneratedFile {
            path: output_dir.join(SINGLE_FILE_NAME),
            contents: finish(sections),
        })
    }
}

/// Keep only the table matching `filter`, if one is given
pub fn filter_tables(tables: Vec<Table>, filter: Option<&str>) -> Vec<Table> {
    match filter {
        Some(filter) if !filter.is_empty() => tables
            .into_iter()
            .filter(|t| t.matches_filter(filter))
            .collect(),
        _ => tables,
    }
}

/// Write rendered files, overwriting whatever is there
pub fn write_files(files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        debug!("Writing {}", file.path.display());
        fs::write(&file.path, &file.contents)?;
    }
    Ok(())
}

/// Join blocks with a blank line; non-empty files end with a newline
fn finish(blocks: Vec<String>) -> String {
    if blocks.is_empty() {
        return String::new();
    }
    let mut contents = blocks.join("\n\n");
    contents.push('\n');
    contents
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
CREATE TABLE "shop"."item" (
    "id" BIGSERIAL PRIMARY KEY,
    "name" TEXT NOT NULL,
    "price" BIGINT NOT NULL DEFAULT 0
);

CREATE TABLE "catalog"."product_spu" (
    "id" BIGSERIAL PRIMARY KEY,
    "code" TEXT NOT NULL
);
"#;

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("migration.sql");
        fs::write(&schema, SCHEMA).unwrap();
        (dir, schema)
    }

    fn builtin_generator() -> QueryGenerator {
        QueryGenerator::with_templates(TemplateManager::builtin())
    }

    #[test]
    fn test_per_table_output() {
        let (dir, schema) = setup();
        let out = dir.path().join("queries");

        let written = builtin_generator()
            .generate_from_schema(&schema, &out, None, false)
            .unwrap();

        assert_eq!(
            written,
            vec![
                out.join("shop_item.sql"),
                out.join("catalog_product_spu.sql"),
            ]
        );
        let item = fs::read_to_string(out.join("shop_item.sql")).unwrap();
        let get = item.find("-- name: GetItem").unwrap();
        let list = item.find("-- name: ListItems").unwrap();
        let create = item.find("-- name: CreateItem").unwrap();
        let update = item.find("-- name: UpdateItem").unwrap();
        let delete = item.find("-- name: DeleteItem").unwrap();
        assert!(get < list && list < create && create < update && delete > update);
        assert!(item.contains("LIMIT 1;\n\n-- name: ListItems"));
        assert!(item.ends_with(";\n"));
    }

    #[test]
    fn test_single_file_output() {
        let (dir, schema) = setup();
        let out = dir.path().join("queries");

        let written = builtin_generator()
            .generate_from_schema(&schema, &out, None, true)
            .unwrap();

        assert_eq!(written, vec![out.join(SINGLE_FILE_NAME)]);
        let contents = fs::read_to_string(&written[0]).unwrap();
        assert!(contents.starts_with(SINGLE_FILE_HEADER));
        assert!(contents.contains("-- Queries for table: shop.item\n"));
        assert!(contents.contains("-- Queries for table: catalog.product_spu\n"));
        let item = contents.find("shop.item").unwrap();
        let spu = contents.find("catalog.product_spu").unwrap();
        assert!(item < spu);
        assert!(!out.join("shop_item.sql").exists());
    }

    #[test]
    fn test_single_file_ignored_with_table_filter() {
        let (dir, schema) = setup();
        let out = dir.path().join("queries");

        let written = builtin_generator()
            .generate_from_schema(&schema, &out, Some("catalog.product_spu"), true)
            .unwrap();

        assert_eq!(written, vec![out.join("catalog_product_spu.sql")]);
        assert!(!out.join(SINGLE_FILE_NAME).exists());
    }

    #[test]
    fn test_filter_by_bare_and_qualified_name() {
        let tables = parser::parse_schema(SCHEMA).unwrap();
        let bare = filter_tables(tables.clone(), Some("product_spu"));
        let qualified = filter_tables(tables.clone(), Some("catalog.product_spu"));
        assert_eq!(bare, qualified);
        assert_eq!(bare.len(), 1);
        assert!(filter_tables(tables.clone(), Some("nope")).is_empty());
        assert_eq!(filter_tables(tables, None).len(), 2);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let (dir, schema) = setup();
        let out = dir.path().join("queries");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("shop_item.sql"), "stale").unwrap();

        builtin_generator()
            .generate_from_schema(&schema, &out, Some("item"), false)
            .unwrap();

        let contents = fs::read_to_string(out.join("shop_item.sql")).unwrap();
        assert!(contents.starts_with("-- name: GetItem"));
    }

    #[test]
    fn test_render_failure_writes_nothing() {
        let (dir, schema) = setup();
        let out = dir.path().join("queries");
        let templates_dir = dir.path().join("templates");
        fs::create_dir_all(&templates_dir).unwrap();
        fs::write(templates_dir.join("get.sql.tmpl"), "{{ table.missing }}").unwrap();

        let err = QueryGenerator::new(&templates_dir)
            .generate_from_schema(&schema, &out, None, false)
            .unwrap_err();
        assert!(err.to_string().contains("get"));
        assert!(!out.exists());
    }

    #[test]
    fn test_plan_does_not_touch_output_dir() {
        let (dir, schema) = setup();
        let out = dir.path().join("queries");

        let files = builtin_generator()
            .plan_from_schema(&schema, &out, None, false)
            .unwrap();
        assert_eq!(files.len(), 2);
        assert!(!out.exists());
    }

    #[test]
    fn test_table_without_templates_writes_empty_file() {
        let (dir, schema) = setup();
        let out = dir.path().join("queries");

        QueryGenerator::new(dir.path().join("empty-templates"))
            .generate_from_schema(&schema, &out, Some("item"), false)
            .unwrap();
        assert_eq!(fs::read_to_string(out.join("shop_item.sql")).unwrap(), "");
    }

    #[test]
    fn test_missing_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("queries");
        let result = builtin_generator().generate_from_schema(
            &dir.path().join("missing.sql"),
            &out,
            None,
            false,
        );
        assert!(result.is_err());
        assert!(!out.exists());
    }
}

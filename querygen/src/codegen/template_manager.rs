//! Loading and rendering of the per-kind query templates

use minijinja::value::ValueKind;
use minijinja::{context, escape_formatter, AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::helpers;
use super::query_kind::QueryKind;
use crate::error::{QueryGenError, Result};
use crate::parser::{Column, Table};

/// Default template shipped with the crate for `kind`
fn builtin_template(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::Get => include_str!("../../templates/get.sql.tmpl"),
        QueryKind::List => include_str!("../../templates/list.sql.tmpl"),
        QueryKind::Create => include_str!("../../templates/create.sql.tmpl"),
        QueryKind::Update => include_str!("../../templates/update.sql.tmpl"),
        QueryKind::Delete => include_str!("../../templates/delete.sql.tmpl"),
    }
}

/// Where templates come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// `{kind}.sql.tmpl` files in a directory
    Directory(PathBuf),
    /// The templates compiled into this crate
    Builtin,
}

/// What a template sees as `table`: the table itself plus its derived views
#[derive(Debug, Serialize)]
struct TableContext<'a> {
    #[serde(flatten)]
    table: &'a Table,
    full_name: String,
    qualified_name: String,
    safe_file_name: String,
    primary_key_columns: Vec<&'a Column>,
    non_serial_columns: Vec<&'a Column>,
    insertable_columns: Vec<&'a Column>,
    updatable_columns: Vec<&'a Column>,
    filterable_columns: Vec<&'a Column>,
    identifier_constraints: Vec<Vec<&'a Column>>,
}

impl<'a> TableContext<'a> {
    fn new(table: &'a Table) -> Self {
        Self {
            table,
            full_name: table.full_name(),
            qualified_name: table.qualified_name(),
            safe_file_name: table.safe_file_name(),
            primary_key_columns: table.primary_key_columns(),
            non_serial_columns: table.non_serial_columns(),
            insertable_columns: table.insertable_columns(),
            updatable_columns: table.updatable_columns(),
            filterable_columns: table.filterable_columns(),
            identifier_constraints: table.identifier_constraints(),
        }
    }
}

/// Holds the loaded templates and renders one query per (kind, table)
pub struct TemplateManager {
    source: TemplateSource,
    env: Environment<'static>,
    loaded: BTreeSet<QueryKind>,
}

impl TemplateManager {
    /// Create a manager reading templates from `template_dir`
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self::with_source(TemplateSource::Directory(template_dir.into()))
    }

    /// Create a manager using the built-in templates
    pub fn builtin() -> Self {
        Self::with_source(TemplateSource::Builtin)
    }

    pub fn with_source(source: TemplateSource) -> Self {
        Self {
            source,
            env: build_environment(),
            loaded: BTreeSet::new(),
        }
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// (Re)load all templates from the configured source.
    ///
    /// For a directory source the directory is created if missing. A kind
    /// without a template file is not an error: it is left out of the loaded
    /// set and renders as an empty string. Template syntax errors fail here.
    pub fn load_templates(&mut self) -> Result<()> {
        self.env = build_environment();
        self.loaded.clear();

        match self.source.clone() {
            TemplateSource::Builtin => {
                for kind in QueryKind::ALL {
                    self.add_template(kind, builtin_template(kind))?;
                }
            }
            TemplateSource::Directory(dir) => self.load_directory(&dir)?,
        }

        debug!("Loaded templates: {:?}", self.loaded);
        Ok(())
    }

    fn load_directory(&mut self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        for kind in QueryKind::ALL {
            let path = dir.join(kind.template_name());
            if !path.is_file() {
                warn!(
                    "No template for {} queries at {}; skipping",
                    kind,
                    path.display()
                );
                continue;
            }

            let source = fs::read_to_string(&path)?;
            self.add_template(kind, source)?;
        }

        Ok(())
    }

    /// Register `source` as the template for `kind`, replacing any previous one
    pub fn add_template(&mut self, kind: QueryKind, source: impl Into<String>) -> Result<()> {
        self.env
            .add_template_owned(kind.template_name(), source.into())
            .map_err(QueryGenError::TemplateError)?;
        self.loaded.insert(kind);
        Ok(())
    }

    pub fn has_template(&self, kind: QueryKind) -> bool {
        self.loaded.contains(&kind)
    }

    /// Kinds with a loaded template, in output order
    pub fn loaded_kinds(&self) -> Vec<QueryKind> {
        self.loaded.iter().copied().collect()
    }

    /// Render the `kind` query for `table`. Returns an empty string when no
    /// template is loaded for `kind`.
    pub fn generate_query(&self, kind: QueryKind, table: &Table) -> Result<String> {
        if !self.has_template(kind) {
            return Ok(String::new());
        }

        let render_error = |source| QueryGenError::RenderError {
            kind,
            table: table.qualified_name(),
            source,
        };

        let template = self
            .env
            .get_template(&kind.template_name())
            .map_err(render_error)?;
        let rendered = template
            .render(context! { table => TableContext::new(table) })
            .map_err(render_error)?;

        Ok(rendered)
    }
}

fn build_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    // Booleans print as `true` / `false` rather than `True` / `False`
    env.set_formatter(|out, state, value| {
        if value.kind() == ValueKind::Bool {
            let text = if value.is_true() { "true" } else { "false" };
            out.write_str(text)?;
            Ok(())
        } else {
            escape_formatter(out, state, value)
        }
    });
    helpers::register(&mut env);
    env
}

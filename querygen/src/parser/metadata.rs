//! Metadata structures for parsed migration DDL

use serde::{Deserialize, Serialize};

use super::element_type::ElementType;

/// Placeholder stored in [`Column::default_value`] when a `DEFAULT` keyword was
/// present but no literal could be isolated after it.
pub const DEFAULT_PLACEHOLDER: &str = "DEFAULT";

/// Metadata for a database table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Schema name (`"schema"` in `"schema"."table"`)
    pub schema: String,

    /// Table name
    pub name: String,

    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<Column>,

    /// Primary key column names, in key order
    #[serde(default)]
    pub primary_key: Vec<String>,

    /// Raw `CONSTRAINT` lines from the table body
    #[serde(default)]
    pub constraints: Vec<String>,

    /// Unique indexes whose columns all exist on this table
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraint>,
}

/// Metadata for a column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Data type as written (e.g., "BIGINT", "TIMESTAMP(3)")
    pub data_type: String,

    /// Canonical element type derived from `data_type`
    #[serde(default)]
    pub element_type: ElementType,

    /// Whether the column is nullable
    pub is_nullable: bool,

    /// Whether this column is part of the primary key
    pub is_primary_key: bool,

    /// Whether the type is one of the SERIAL family
    pub is_serial: bool,

    /// Default value expression; empty when the column has no default
    #[serde(default)]
    pub default_value: String,
}

/// A `CREATE UNIQUE INDEX` matched to its table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Index name
    pub name: String,

    /// Columns in the index (in order)
    pub columns: Vec<String>,
}

impl Table {
    /// Create an empty table
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if a column is part of the primary key
    pub fn is_primary_key_column(&self, column_name: &str) -> bool {
        self.primary_key.iter().any(|c| c == column_name)
    }

    /// `"schema"."table"`, ready to paste into SQL
    pub fn full_name(&self) -> String {
        format!("\"{}\".\"{}\"", self.schema, self.name)
    }

    /// `schema.table`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// `schema_table`, used as the per-table output file stem
    pub fn safe_file_name(&self) -> String {
        format!("{}_{}", self.schema, self.name)
    }

    /// Whether `filter` names this table, either bare or schema-qualified
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.name == filter || self.qualified_name() == filter
    }

    /// Primary key columns, in key order
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.resolve_columns(&self.primary_key).unwrap_or_default()
    }

    /// Columns not generated by a sequence
    pub fn non_serial_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| !c.is_serial).collect()
    }

    /// Columns that must be supplied on insert: not serial and without a default
    pub fn insertable_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| !c.is_serial && !c.has_default())
            .collect()
    }

    /// Columns an update may change: not serial and not part of the primary key
    pub fn updatable_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| !c.is_serial && !c.is_primary_key)
            .collect()
    }

    /// Columns usable in list filters. Free-text columns are left out, except
    /// for a column literally named `code`.
    pub fn filterable_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| !c.is_free_text() || c.name == "code")
            .collect()
    }

    /// Every column set that identifies a single row: the primary key first
    /// (if any), then each unique constraint in declaration order.
    pub fn identifier_constraints(&self) -> Vec<Vec<&Column>> {
        let mut constraints = Vec::new();

        if !self.primary_key.is_empty() {
            if let Some(cols) = self.resolve_columns(&self.primary_key) {
                constraints.push(cols);
            }
        }

        for unique in &self.unique_constraints {
            if let Some(cols) = self.resolve_columns(&unique.columns) {
                constraints.push(cols);
            }
        }

        constraints
    }

    /// Look up every name; `None` if any of them is not a column of this table
    pub fn resolve_columns(&self, names: &[String]) -> Option<Vec<&Column>> {
        names.iter().map(|n| self.get_column(n)).collect()
    }
}

impl Column {
    /// Column name wrapped in double quotes
    pub fn quoted_name(&self) -> String {
        format!("\"{}\"", self.name)
    }

    /// Whether a `DEFAULT` clause was present
    pub fn has_default(&self) -> bool {
        !self.default_value.is_empty()
    }

    /// TEXT-typed columns hold free-form text and are not filtered on
    pub fn is_free_text(&self) -> bool {
        self.data_type.to_ascii_lowercase().contains("text")
    }

    /// Numeric and temporal columns get `_from` / `_to` range filters
    pub fn is_range_filterable(&self) -> bool {
        self.element_type.is_range_filterable()
    }
}

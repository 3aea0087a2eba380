//! PostgreSQL column type classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical element type of a column, used to type array-valued filter
/// parameters and to decide which columns get range filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ElementType {
    Integer,
    Bigint,
    Smallint,
    #[default]
    Text,
    Uuid,
    Boolean,
    Numeric,
    Timestamp,
    Date,
}

impl ElementType {
    /// Classify a raw SQL type as written in the DDL (e.g. `BIGSERIAL`, `DECIMAL(65,30)`,
    /// `TIMESTAMP(3)`). Anything unrecognized is treated as text.
    pub fn from_sql_type(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        let base = upper.split(['(', '[']).next().unwrap_or_default().trim();

        match base {
            "BIGINT" | "INT8" | "BIGSERIAL" | "SERIAL8" => ElementType::Bigint,
            "SMALLINT" | "INT2" | "SMALLSERIAL" | "SERIAL2" => ElementType::Smallint,
            "INTEGER" | "INT" | "INT4" | "SERIAL" | "SERIAL4" => ElementType::Integer,
            "NUMERIC" | "DECIMAL" | "MONEY" => ElementType::Numeric,
            "REAL" | "DOUBLE" | "FLOAT" | "FLOAT4" | "FLOAT8" => ElementType::Numeric,
            "TIMESTAMP" | "TIMESTAMPTZ" => ElementType::Timestamp,
            "DATE" => ElementType::Date,
            "UUID" => ElementType::Uuid,
            "BOOLEAN" | "BOOL" => ElementType::Boolean,
            _ => ElementType::Text,
        }
    }

    /// The lowercase PostgreSQL name used in casts (`::bigint[]`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Integer => "integer",
            ElementType::Bigint => "bigint",
            ElementType::Smallint => "smallint",
            ElementType::Text => "text",
            ElementType::Uuid => "uuid",
            ElementType::Boolean => "boolean",
            ElementType::Numeric => "numeric",
            ElementType::Timestamp => "timestamp",
            ElementType::Date => "date",
        }
    }

    /// Numeric and temporal types support `_from` / `_to` range filters
    pub fn is_range_filterable(&self) -> bool {
        matches!(
            self,
            ElementType::Integer
                | ElementType::Bigint
                | ElementType::Smallint
                | ElementType::Numeric
                | ElementType::Timestamp
                | ElementType::Date
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integer" => Ok(ElementType::Integer),
            "bigint" => Ok(ElementType::Bigint),
            "smallint" => Ok(ElementType::Smallint),
            "text" => Ok(ElementType::Text),
            "uuid" => Ok(ElementType::Uuid),
            "boolean" => Ok(ElementType::Boolean),
            "numeric" => Ok(ElementType::Numeric),
            "timestamp" => Ok(ElementType::Timestamp),
            "date" => Ok(ElementType::Date),
            other => Err(format!("unknown element type: {}", other)),
        }
    }
}

impl TryFrom<String> for ElementType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_types(cases: &[(&str, ElementType)]) {
        for (sql_type, expected) in cases {
            assert_eq!(ElementType::from_sql_type(sql_type), *expected, "{}", sql_type);
        }
    }

    #[test]
    fn test_integer_family() {
        assert_types(&[
            ("BIGINT", ElementType::Bigint),
            ("BIGSERIAL", ElementType::Bigint),
            ("SERIAL", ElementType::Integer),
            ("INTEGER", ElementType::Integer),
            ("smallint", ElementType::Smallint),
        ]);
    }

    #[test]
    fn test_parameterized_types() {
        assert_types(&[
            ("DECIMAL(65,30)", ElementType::Numeric),
            ("TIMESTAMP(3)", ElementType::Timestamp),
            ("VARCHAR(255)", ElementType::Text),
            ("INTEGER[]", ElementType::Integer),
        ]);
    }

    #[test]
    fn test_unknown_defaults_to_text() {
        assert_types(&[
            ("\"OrderStatus\"", ElementType::Text),
            ("JSONB", ElementType::Text),
            ("", ElementType::Text),
        ]);
    }

    #[test]
    fn test_range_filterable() {
        assert!(ElementType::Bigint.is_range_filterable());
        assert!(ElementType::Date.is_range_filterable());
        assert!(ElementType::Timestamp.is_range_filterable());
        assert!(!ElementType::Text.is_range_filterable());
        assert!(!ElementType::Uuid.is_range_filterable());
        assert!(!ElementType::Boolean.is_range_filterable());
    }

    #[test]
    fn test_name_parses_back() {
        for ty in [ElementType::Uuid, ElementType::Numeric, ElementType::Date] {
            assert_eq!(ty.as_str().parse::<ElementType>().unwrap(), ty);
        }
        assert!("varchar".parse::<ElementType>().is_err());
    }
}

//! Line-oriented parser for the migration DDL dialect
//!
//! Only the shape emitted by the project's migration generator is understood:
//! `CREATE TABLE "schema"."table" ( ... );` blocks with one column or
//! `CONSTRAINT` per line, and single-line `CREATE UNIQUE INDEX` statements.
//! Parsing runs in two passes over the same text. The first builds tables,
//! columns and primary keys; the second attaches unique indexes to the tables
//! found by the first.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use super::element_type::ElementType;
use super::metadata::*;
use crate::error::{QueryGenError, Result};

/// Parse a migration file into table metadata
pub fn parse_schema_file(path: &Path) -> Result<Vec<Table>> {
    let sql = std::fs::read_to_string(path)?;
    parse_schema(&sql)
}

/// Parse migration DDL text into table metadata
pub fn parse_schema(sql: &str) -> Result<Vec<Table>> {
    SchemaParser::new()?.parse(sql)
}

/// Compiled line patterns for the two parsing passes
pub struct SchemaParser {
    create_table: Regex,
    primary_key: Regex,
    unique_index: Regex,
}

impl SchemaParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            create_table: compile(r#"CREATE TABLE "([^"]+)"\.?"([^"]+)" \("#)?,
            primary_key: compile(r#"(?i)PRIMARY KEY \(([^)]+)\)"#)?,
            unique_index: compile(
                r#"CREATE UNIQUE INDEX "([^"]+)" ON "([^"]+)"\.?"([^"]+)"\(([^)]+)\);?"#,
            )?,
        })
    }

    /// Run both passes over `sql`
    pub fn parse(&self, sql: &str) -> Result<Vec<Table>> {
        let mut tables = self.parse_tables(sql)?;
        self.attach_unique_indexes(sql, &mut tables);
        Ok(tables)
    }

    /// Pass 1: tables, columns and primary keys
    fn parse_tables(&self, sql: &str) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        let mut lines = sql.lines().enumerate();

        while let Some((idx, raw)) = lines.next() {
            let line = raw.trim();
            if line.starts_with("CREATE TABLE") {
                let table = self.parse_table(line, idx + 1, &mut lines)?;
                debug!(
                    "Parsed table {} ({} columns, primary key {:?})",
                    table.qualified_name(),
                    table.columns.len(),
                    table.primary_key
                );
                tables.push(table);
            }
        }

        Ok(tables)
    }

    /// Consume one table body, up to and including its `);` line
    fn parse_table<'a, I>(&self, header: &str, line_no: usize, lines: &mut I) -> Result<Table>
    where
        I: Iterator<Item = (usize, &'a str)>,
    {
        let caps = self.create_table.captures(header).ok_or_else(|| {
            QueryGenError::ParseError(format!(
                "line {}: invalid CREATE TABLE syntax: {}",
                line_no, header
            ))
        })?;
        let mut table = Table::new(&caps[1], &caps[2]);

        for (idx, raw) in lines.by_ref() {
            let line = raw.trim();

            if line.starts_with(");") {
                return Ok(table);
            }

            if line.starts_with("CONSTRAINT") {
                table.constraints.push(line.to_string());
                self.apply_constraint(line, &mut table);
                continue;
            }

            if let Some(column) = parse_column(line) {
                if column.is_primary_key && !table.is_primary_key_column(&column.name) {
                    table.primary_key.push(column.name.clone());
                }
                table.columns.push(column);
                continue;
            }

            if !line.is_empty() {
                warn!(
                    "line {}: skipping unrecognized line in table {}: {}",
                    idx + 1,
                    table.qualified_name(),
                    line
                );
            }
        }

        warn!(
            "table {} is not terminated by `);` before end of file",
            table.qualified_name()
        );
        Ok(table)
    }

    /// Apply a `CONSTRAINT` line; only `PRIMARY KEY (...)` has an effect
    fn apply_constraint(&self, line: &str, table: &mut Table) {
        let Some(caps) = self.primary_key.captures(line) else {
            return;
        };

        for name in split_column_list(&caps[1]) {
            match table.columns.iter_mut().find(|c| c.name == name) {
                Some(col) => {
                    col.is_primary_key = true;
                    if !table.primary_key.contains(&name) {
                        table.primary_key.push(name);
                    }
                }
                None => warn!(
                    "primary key of {} names unknown column {:?}",
                    table.qualified_name(),
                    name
                ),
            }
        }
    }

    /// Pass 2: attach `CREATE UNIQUE INDEX` statements to their tables
    fn attach_unique_indexes(&self, sql: &str, tables: &mut [Table]) {
        // A repeated table header resolves to the last table with that identity
        let lookup: HashMap<(String, String), usize> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| ((t.schema.clone(), t.name.clone()), i))
            .collect();

        for (idx, raw) in sql.lines().enumerate() {
            let line = raw.trim();
            if !line.starts_with("CREATE UNIQUE INDEX") {
                continue;
            }

            let Some(caps) = self.unique_index.captures(line) else {
                warn!("line {}: unrecognized unique index: {}", idx + 1, line);
                continue;
            };

            let key = (caps[2].to_string(), caps[3].to_string());
            let Some(&pos) = lookup.get(&key) else {
                warn!(
                    "line {}: unique index {:?} targets unknown table {}.{}",
                    idx + 1,
                    &caps[1],
                    key.0,
                    key.1
                );
                continue;
            };

            let table = &mut tables[pos];
            let columns = split_column_list(&caps[4]);
            if let Some(missing) = columns.iter().find(|c| table.get_column(c).is_none()) {
                warn!(
                    "line {}: dropping unique index {:?} on {}: unknown column {:?}",
                    idx + 1,
                    &caps[1],
                    table.qualified_name(),
                    missing
                );
                continue;
            }

            table.unique_constraints.push(UniqueConstraint {
                name: caps[1].to_string(),
                columns,
            });
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| QueryGenError::ParseError(format!("Invalid regex {}: {}", pattern, e)))
}

/// Split `"a", "b"` into `["a", "b"]`
fn split_column_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|c| c.trim().trim_matches('"').to_string())
        .collect()
}

/// Parse a single column declaration line, e.g. `"price" BIGINT NOT NULL DEFAULT 0,`
fn parse_column(line: &str) -> Option<Column> {
    let line = line.strip_suffix(',').unwrap_or(line);
    if !line.starts_with('"') {
        return None;
    }

    let mut parts = line.split_whitespace();
    let name = parts.next()?.trim_matches('"').to_string();
    let data_type = parts.next()?.to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    let upper = rest.to_ascii_uppercase();

    Some(Column {
        element_type: ElementType::from_sql_type(&data_type),
        is_nullable: !upper.contains("NOT NULL"),
        is_primary_key: upper.contains("PRIMARY KEY"),
        is_serial: data_type.to_ascii_uppercase().contains("SERIAL"),
        default_value: parse_default(&rest, &upper),
        name,
        data_type,
    })
}

/// The token after `DEFAULT`, the placeholder if nothing follows it, or empty
/// when there is no `DEFAULT` at all
fn parse_default(rest: &str, upper: &str) -> String {
    let Some(start) = upper.find("DEFAULT") else {
        return String::new();
    };

    // `upper` is an ASCII case mapping of `rest`, so offsets line up
    let after = rest[start + "DEFAULT".len()..].trim();
    let end = after
        .find([',', ' ', '\t', '\n'])
        .unwrap_or(after.len());
    let value = after[..end].trim();

    if value.is_empty() {
        DEFAULT_PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

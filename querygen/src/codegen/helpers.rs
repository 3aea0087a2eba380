//! Helper functions available inside query templates
//!
//! Parameter markers follow sqlc's syntax and are emitted verbatim:
//! `sqlc.arg('x')` for required named parameters, `sqlc.narg('x')` for
//! nullable ones and `$1` for the positional fallback.

use minijinja::value::ViaDeserialize;
use minijinja::Environment;

use super::naming::{pluralize, to_camel_case, to_pascal_case};
use crate::parser::{Column, Table};

/// Lookup clause used when a table has neither a primary key nor a unique index
pub const FALLBACK_WHERE: &str = r#"WHERE "id" = $1"#;

/// `sqlc.arg('name')`
pub fn sqlc_arg(name: &str) -> String {
    format!("sqlc.arg('{}')", name)
}

/// `sqlc.narg('name')`
pub fn sqlc_narg(name: &str) -> String {
    format!("sqlc.narg('{}')", name)
}

/// Nullable array parameter typed by the column's element type,
/// e.g. `sqlc.narg('price')::bigint[]`
pub fn array_param(col: &Column) -> String {
    format!("{}::{}[]", sqlc_narg(&col.name), get_type(col))
}

/// Column name wrapped in double quotes
pub fn quoted_name(col: &Column) -> String {
    col.quoted_name()
}

/// Double-quoted column names joined with `separator`
pub fn join_quoted_columns(columns: &[Column], separator: &str) -> String {
    columns
        .iter()
        .map(Column::quoted_name)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Canonical element type name used to cast array parameters
pub fn get_type(col: &Column) -> &'static str {
    col.element_type.as_str()
}

/// Whether the column gets `_from` / `_to` range filters
pub fn is_range_filterable(col: &Column) -> bool {
    col.is_range_filterable()
}

/// Build the multi-key lookup clause for get/update/delete queries.
///
/// Each identifier constraint (primary key first, then unique indexes) becomes
/// an AND group and the groups are OR-ed, so one query finds a row by any of
/// its keys:
///
/// ```text
/// WHERE ("id" = sqlc.arg('id')) OR ("code" = sqlc.arg('code'))
/// ```
pub fn generate_where_conditions(table: &Table) -> String {
    let constraints = table.identifier_constraints();
    if constraints.is_empty() {
        return FALLBACK_WHERE.to_string();
    }

    let groups: Vec<String> = constraints
        .iter()
        .map(|cols| {
            let parts: Vec<String> = cols
                .iter()
                .map(|c| format!("{} = {}", c.quoted_name(), sqlc_arg(&c.name)))
                .collect();
            format!("({})", parts.join(" AND "))
        })
        .collect();

    format!("WHERE {}", groups.join(" OR "))
}

/// Build the optional-filter clause for list queries.
///
/// Every filterable column gets a `= ANY(array)` match that is skipped when
/// the array is NULL; range-filterable columns also get `_from` / `_to`
/// bounds. Returns an empty string when nothing is filterable.
pub fn generate_filter_conditions(table: &Table) -> String {
    let mut clauses = Vec::new();

    for col in table.filterable_columns() {
        let name = col.quoted_name();
        let values = array_param(col);
        clauses.push(format!(
            "({} = ANY({}) OR {} IS NULL)",
            name, values, values
        ));

        if col.is_range_filterable() {
            let from = sqlc_narg(&format!("{}_from", col.name));
            let to = sqlc_narg(&format!("{}_to", col.name));
            clauses.push(format!("({} >= {} OR {} IS NULL)", name, from, from));
            clauses.push(format!("({} <= {} OR {} IS NULL)", name, to, to));
        }
    }

    if clauses.is_empty() {
        return String::new();
    }

    format!("WHERE (\n    {}\n)", clauses.join("\n    AND "))
}

/// Register every helper under the name templates call it by
pub fn register(env: &mut Environment<'static>) {
    env.add_filter("camelCase", |s: String| to_camel_case(&s));
    env.add_filter("pascalCase", |s: String| to_pascal_case(&s));
    env.add_filter("pluralize", |s: String| pluralize(&s));
    env.add_function("camelCase", |s: String| to_camel_case(&s));
    env.add_function("pascalCase", |s: String| to_pascal_case(&s));
    env.add_function("sqlcArg", |name: String| sqlc_arg(&name));
    env.add_function("sqlcNarg", |name: String| sqlc_narg(&name));
    env.add_function("quotedName", |col: ViaDeserialize<Column>| {
        quoted_name(&col)
    });
    env.add_function("joinQuotedColumns", |cols: ViaDeserialize<Vec<Column>>, sep: String| {
        join_quoted_columns(&cols, &sep)
    });
    env.add_function("getType", |col: ViaDeserialize<Column>| {
        get_type(&col).to_string()
    });
    env.add_function("isRangeFilterable", |col: ViaDeserialize<Column>| {
        is_range_filterable(&col)
    });
    env.add_function("generateWhereConditions", |table: ViaDeserialize<Table>| {
        generate_where_conditions(&table)
    });
    env.add_function("generateFilterConditions", |table: ViaDeserialize<Table>| {
        generate_filter_conditions(&table)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_schema, UniqueConstraint};

    fn item_table() -> Table {
        let sql = r#"
CREATE TABLE "shop"."item" (
    "id" BIGSERIAL PRIMARY KEY,
    "name" TEXT NOT NULL,
    "price" BIGINT NOT NULL DEFAULT 0
);
"#;
        parse_schema(sql).unwrap().remove(0)
    }

    #[test]
    fn test_where_conditions_primary_key_only() {
        let table = item_table();
        assert_eq!(
            generate_where_conditions(&table),
            r#"WHERE ("id" = sqlc.arg('id'))"#
        );
    }

    #[test]
    fn test_where_conditions_with_unique_constraint() {
        let mut table = item_table();
        table.columns.push(Column {
            name: "code".into(),
            data_type: "TEXT".into(),
            ..Default::default()
        });
        table.unique_constraints.push(UniqueConstraint {
            name: "item_code_key".into(),
            columns: vec!["code".into()],
        });
        assert_eq!(
            generate_where_conditions(&table),
            r#"WHERE ("id" = sqlc.arg('id')) OR ("code" = sqlc.arg('code'))"#
        );
    }

    #[test]
    fn test_where_conditions_composite_key() {
        let sql = r#"
CREATE TABLE "promo"."coupon_usage" (
    "coupon_id" BIGINT NOT NULL,
    "account_id" BIGINT NOT NULL,
    CONSTRAINT "coupon_usage_pkey" PRIMARY KEY ("coupon_id", "account_id")
);
"#;
        let table = parse_schema(sql).unwrap().remove(0);
        assert_eq!(
            generate_where_conditions(&table),
            r#"WHERE ("coupon_id" = sqlc.arg('coupon_id') AND "account_id" = sqlc.arg('account_id'))"#
        );
    }

    #[test]
    fn test_where_conditions_fallback() {
        let mut table = item_table();
        table.primary_key.clear();
        assert_eq!(generate_where_conditions(&table), FALLBACK_WHERE);
    }

    #[test]
    fn test_filter_conditions() {
        let table = item_table();
        let clause = generate_filter_conditions(&table);

        assert!(clause.starts_with("WHERE (\n"));
        assert!(clause.ends_with("\n)"));
        assert!(clause.contains(
            r#"("price" = ANY(sqlc.narg('price')::bigint[]) OR sqlc.narg('price')::bigint[] IS NULL)"#
        ));
        assert!(clause.contains(
            r#"("price" >= sqlc.narg('price_from') OR sqlc.narg('price_from') IS NULL)"#
        ));
        assert!(clause.contains(
            r#"("price" <= sqlc.narg('price_to') OR sqlc.narg('price_to') IS NULL)"#
        ));
        assert!(!clause.contains("\"name\""));
        assert!(!clause.contains("name_from"));
        assert_eq!(clause.matches("\n    AND ").count(), 5);
    }

    #[test]
    fn test_filter_conditions_code_column_is_not_ranged() {
        let mut table = item_table();
        table.columns.push(Column {
            name: "code".into(),
            data_type: "TEXT".into(),
            ..Default::default()
        });
        let clause = generate_filter_conditions(&table);
        assert!(clause.contains(r#"("code" = ANY(sqlc.narg('code')::text[])"#));
        assert!(!clause.contains("code_from"));
    }

    #[test]
    fn test_filter_conditions_empty() {
        let mut table = Table::new("cms", "page");
        table.columns.push(Column {
            name: "body".into(),
            data_type: "TEXT".into(),
            ..Default::default()
        });
        assert_eq!(generate_filter_conditions(&table), "");
    }

    #[test]
    fn test_column_helpers() {
        let table = item_table();
        assert_eq!(quoted_name(&table.columns[1]), "\"name\"");
        assert_eq!(
            join_quoted_columns(&table.columns, ", "),
            r#""id", "name", "price""#
        );
        assert_eq!(get_type(&table.columns[0]), "bigint");
        assert_eq!(get_type(&table.columns[1]), "text");
        assert!(is_range_filterable(&table.columns[2]));
        assert!(!is_range_filterable(&table.columns[1]));
    }
}

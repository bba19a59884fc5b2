//! Statement building for the three query modes: table query, literal SQL
//! and routine call.
//!
//! Identifiers from command parameters only reach SQL text after they have
//! been matched against the table's live column list, and they are always
//! quoted by the client.

use crate::coerce::bind_parameters;
use crate::error::CommandError;
use crate::query::TableQuery;
use crate::signature::RoutineSignature;
use crate::sql_text::{returns_rows, starts_with_select, strip_block_comments};

use datastore::sea_query::{Alias, Asterisk, Order, Query};
use datastore::{DatabaseClient, RoutineKind, Statement, StatementKind};
use std::collections::BTreeMap;

pub fn build_table_query(
    client: &dyn DatabaseClient,
    query: &TableQuery,
) -> Result<Statement, CommandError> {
    let live = client.list_columns(&query.table).map_err(|e| {
        CommandError::lookup(
            format!("could not read columns of table \"{}\"", query.table),
            Some(e),
        )
    })?;
    if live.is_empty() {
        return Err(CommandError::lookup(
            format!("table \"{}\" was not found", query.table),
            None,
        ));
    }

    let mut select = Query::select();
    let mut rejected: Vec<String> = Vec::new();

    if query.columns.is_empty() {
        _ = select.column(Asterisk);
    } else {
        for column in &query.columns {
            // Exact match only.
            if live.iter().any(|c| c.name == *column) {
                _ = select.column(Alias::new(column.as_str()));
            } else {
                rejected.push(format!("column \"{column}\""));
            }
        }
    }

    let TableQuery { table, .. } = query;
    _ = match (&table.catalog, &table.schema) {
        (Some(catalog), Some(schema)) => select.from((
            Alias::new(catalog.as_str()),
            Alias::new(schema.as_str()),
            Alias::new(table.name.as_str()),
        )),
        (Some(qualifier), None) | (None, Some(qualifier)) => select.from((
            Alias::new(qualifier.as_str()),
            Alias::new(table.name.as_str()),
        )),
        (None, None) => select.from(Alias::new(table.name.as_str())),
    };

    for entry in &query.order_by {
        let (name, order) = parse_order_by(entry);
        // Order-by names match the live columns ignoring case.
        match live.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
            Some(column) => _ = select.order_by(Alias::new(column.name.as_str()), order),
            None => rejected.push(format!("order-by column \"{name}\"")),
        }
    }

    if !rejected.is_empty() {
        return Err(CommandError::validation(format!(
            "{} not found in table \"{}\"",
            rejected.join(", "),
            query.table
        )));
    }

    if let Some(top) = query.top {
        _ = select.limit(top);
    }

    Ok(Statement::query(client.render_select(&select)))
}

fn parse_order_by(entry: &str) -> (&str, Order) {
    let entry = entry.trim();
    if let Some((name, direction)) = entry.rsplit_once(char::is_whitespace) {
        if direction.eq_ignore_ascii_case("DESC") {
            return (name.trim(), Order::Desc);
        }
        if direction.eq_ignore_ascii_case("ASC") {
            return (name.trim(), Order::Asc);
        }
    }
    (entry, Order::Asc)
}

/// Literal SQL for a table read: must be a SELECT once comments are ignored.
pub fn build_select_sql(text: &str, strip_comments: bool) -> Result<Statement, CommandError> {
    if !starts_with_select(text) {
        return Err(CommandError::validation(
            "SQL must start with SELECT (comments and whitespace are ignored)",
        ));
    }
    Ok(Statement::query(sql_to_send(text, strip_comments)))
}

/// Literal SQL of any kind; statements that do not return rows run as a batch.
pub fn build_sql(text: &str, strip_comments: bool) -> Result<Statement, CommandError> {
    let stripped = strip_block_comments(text);
    if stripped.trim().is_empty() {
        return Err(CommandError::validation("SQL is empty"));
    }
    let sql = sql_to_send(text, strip_comments);
    Ok(if returns_rows(text) {
        Statement::query(sql)
    } else {
        Statement::batch(sql)
    })
}

fn sql_to_send(text: &str, strip_comments: bool) -> String {
    if strip_comments {
        strip_block_comments(text).trim().to_string()
    } else {
        text.to_string()
    }
}

/// Checks that every supplied argument names a parameter of `signature`.
pub fn check_routine_arguments(
    signature: &RoutineSignature,
    values: &BTreeMap<String, String>,
) -> Result<(), CommandError> {
    let declared = signature.parameter_names();
    let unknown: Vec<&str> = values
        .keys()
        .map(String::as_str)
        .filter(|k| !declared.contains(k))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(CommandError::validation(format!(
            "{} {} not a parameter of {}",
            unknown.join(", "),
            if unknown.len() == 1 { "is" } else { "are" },
            signature
        )))
    }
}

/// Binds `values` to `signature` and wraps the call. No statement is
/// produced if any argument fails coercion.
pub fn build_routine_call(
    client: &dyn DatabaseClient,
    kind: RoutineKind,
    signature: &RoutineSignature,
    values: &BTreeMap<String, String>,
) -> Result<Statement, CommandError> {
    let bound =
        bind_parameters(signature, values).map_err(|errors| CommandError::Coercion { errors })?;
    let sql = client.routine_call_sql(kind, signature.name(), bound.len());
    let statement_kind = match kind {
        RoutineKind::Function => StatementKind::Function,
        RoutineKind::Procedure => StatementKind::Procedure,
    };
    Ok(Statement::call(statement_kind, sql, bound))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_by() {
        assert!(matches!(parse_order_by("a"), ("a", Order::Asc)));
        assert!(matches!(parse_order_by("flow desc"), ("flow", Order::Desc)));
        assert!(matches!(parse_order_by(" flow  ASC "), ("flow", Order::Asc)));
        assert!(matches!(parse_order_by("odd name"), ("odd name", Order::Asc)));
    }

    #[test]
    fn test_build_select_sql() {
        let stmt = build_select_sql("/* c */ SELECT 1", true).expect("select");
        assert_eq!(stmt.sql(), "SELECT 1");
        let stmt = build_select_sql("/* c */ SELECT 1", false).expect("select");
        assert_eq!(stmt.sql(), "/* c */ SELECT 1");

        let err = build_select_sql("DELETE FROM obs", false).expect_err("not a select");
        assert!(matches!(err, CommandError::ParameterValidation { .. }));
    }

    #[test]
    fn test_build_sql() {
        let stmt = build_sql("CREATE TABLE t (a INT)", false).expect("valid");
        assert_eq!(stmt.kind(), StatementKind::Batch);
        let stmt = build_sql("select 1", false).expect("valid");
        assert_eq!(stmt.kind(), StatementKind::Query);
        assert!(build_sql(" /* nothing */ ", false).is_err());
    }

    #[test]
    fn test_check_routine_arguments() {
        let sig = RoutineSignature::parse("f(a INT, b TEXT)").expect("valid");
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), "1".to_string());
        assert!(check_routine_arguments(&sig, &values).is_ok());
        values.insert("zz".to_string(), "1".to_string());
        let err = check_routine_arguments(&sig, &values).expect_err("unknown argument");
        assert!(err.to_string().contains("zz is not a parameter of f(a INT, b TEXT)"));
    }
}

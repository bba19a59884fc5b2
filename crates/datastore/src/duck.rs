// DuckDB implementation of DatabaseClient.

use crate::client::DatabaseClient;
use crate::config::DatastoreConfig;
use crate::error::DatastoreError;
use crate::metadata::{ColumnInfo, RoutineInfo, RoutineKind, TableName};
use crate::result_set::ResultSet;
use crate::statement::{Execution, Statement, StatementKind};
use crate::value::BindValue;

use diagnostics::*;
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::types::Value as DuckValue;
use duckdb::{AccessMode, Config, Connection, params_from_iter};
use sea_query::{SelectStatement, SqliteQueryBuilder};

pub struct DuckDbClient {
    conn: Connection,
}

impl std::fmt::Debug for DuckDbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbClient").finish_non_exhaustive()
    }
}

impl DuckDbClient {
    pub fn open_in_memory() -> Result<Self, DatastoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Opens the database described by `config` and runs its `initSql`.
    pub fn open(config: &DatastoreConfig) -> Result<Self, DatastoreError> {
        let conn = match &config.path {
            None => Connection::open_in_memory()?,
            Some(path) if config.read_only => Connection::open_with_flags(
                path,
                Config::default().access_mode(AccessMode::ReadOnly)?,
            )?,
            Some(path) => Connection::open(path)?,
        };

        if let Some(init_sql) = &config.init_sql {
            debug!("Running init SQL for datastore {name}", name: config.name.as_str());
            conn.execute_batch(init_sql)?;
        }

        Ok(Self { conn })
    }

    /// Runs `sql` and drains the whole result. The prepared statement is
    /// dropped when this returns, whatever the outcome.
    fn query(&self, sql: &str, params: &[BindValue]) -> Result<ResultSet, DatastoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let values: Vec<DuckValue> = params.iter().map(BindValue::to_duckdb).collect();
        let arrow = stmt.query_arrow(params_from_iter(values))?;
        let schema = arrow.get_schema();
        let batches: Vec<RecordBatch> = arrow.collect();
        Ok(ResultSet::new(schema, batches))
    }

    fn strings(&self, sql: &str, params: Vec<String>) -> Result<Vec<String>, DatastoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Appends `AND col = ?` for every filter that is set.
fn filters(conditions: &[(&str, Option<&str>)]) -> (String, Vec<String>) {
    let mut sql = String::new();
    let mut params = Vec::new();
    for (column, value) in conditions {
        if let Some(value) = value {
            sql.push_str(&format!(" AND {column} = ?"));
            params.push(value.to_string());
        }
    }
    (sql, params)
}

/// `AND col = ?` when `value` is set, otherwise `AND col = <fallback>`.
fn scoped(column: &str, value: Option<&str>, fallback: &str, params: &mut Vec<String>) -> String {
    match value {
        Some(value) => {
            params.push(value.to_string());
            format!(" AND {column} = ?")
        }
        None => format!(" AND {column} = {fallback}"),
    }
}

fn text_list(value: DuckValue) -> Vec<Option<String>> {
    match value {
        DuckValue::List(items) => items
            .into_iter()
            .map(|item| match item {
                DuckValue::Text(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn routine_kind(function_type: &str) -> Option<RoutineKind> {
    match function_type {
        "scalar" | "macro" => Some(RoutineKind::Function),
        "table" | "table_macro" => Some(RoutineKind::Procedure),
        _ => None,
    }
}

impl DatabaseClient for DuckDbClient {
    fn execute(&self, statement: &Statement) -> Result<Execution, DatastoreError> {
        match statement.kind() {
            StatementKind::Batch => {
                self.conn.execute_batch(statement.sql())?;
                Ok(Execution::default())
            }
            StatementKind::Query | StatementKind::Procedure => {
                let result_set = self.query(statement.sql(), statement.params())?;
                Ok(Execution {
                    result_set: Some(result_set),
                    return_value: None,
                })
            }
            StatementKind::Function => {
                let result_set = self.query(statement.sql(), statement.params())?;
                // Only read once the result set has been drained.
                let return_value = result_set.first_value()?;
                Ok(Execution {
                    result_set: Some(result_set),
                    return_value,
                })
            }
        }
    }

    fn render_select(&self, select: &SelectStatement) -> String {
        select.to_string(SqliteQueryBuilder)
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn routine_call_sql(&self, kind: RoutineKind, name: &str, arity: usize) -> String {
        let parts: Vec<&str> = name.split('.').map(str::trim).collect();
        let qualified = parts
            .iter()
            .map(|p| self.quote_identifier(p))
            .collect::<Vec<_>>()
            .join(".");
        let slots = vec!["?"; arity].join(", ");
        match kind {
            RoutineKind::Function => {
                let alias = self.quote_identifier(parts.last().copied().unwrap_or(name));
                format!("SELECT {qualified}({slots}) AS {alias}")
            }
            RoutineKind::Procedure => format!("SELECT * FROM {qualified}({slots})"),
        }
    }

    fn list_catalogs(&self) -> Result<Vec<String>, DatastoreError> {
        self.strings(
            "SELECT DISTINCT catalog_name FROM information_schema.schemata ORDER BY 1",
            Vec::new(),
        )
    }

    fn list_schemas(&self, catalog: Option<&str>) -> Result<Vec<String>, DatastoreError> {
        let (cond, params) = filters(&[("catalog_name", catalog)]);
        self.strings(
            &format!(
                "SELECT DISTINCT schema_name FROM information_schema.schemata WHERE 1 = 1{cond} ORDER BY 1"
            ),
            params,
        )
    }

    fn list_tables(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> Result<Vec<TableName>, DatastoreError> {
        let (cond, params) = filters(&[("table_catalog", catalog), ("table_schema", schema)]);
        let sql = format!(
            "SELECT table_catalog, table_schema, table_name FROM information_schema.tables \
             WHERE 1 = 1{cond} ORDER BY 1, 2, 3"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok(TableName {
                catalog: Some(row.get(0)?),
                schema: Some(row.get(1)?),
                name: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn list_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>, DatastoreError> {
        // Unqualified parts resolve the way the generated FROM clause does.
        let mut params = vec![table.name.clone()];
        let catalog = scoped(
            "table_catalog",
            table.catalog.as_deref(),
            "current_database()",
            &mut params,
        );
        let schema = scoped(
            "table_schema",
            table.schema.as_deref(),
            "current_schema()",
            &mut params,
        );
        let sql = format!(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_name = ?{catalog}{schema} ORDER BY ordinal_position"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                data_type: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn list_routines(&self, kind: Option<RoutineKind>) -> Result<Vec<RoutineInfo>, DatastoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT database_name, schema_name, function_name, function_type, \
             parameters, parameter_types, return_type \
             FROM duckdb_functions() \
             WHERE NOT internal AND function_type IN ('scalar', 'macro', 'table', 'table_macro') \
             ORDER BY function_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, DuckValue>(4)?,
                row.get::<_, DuckValue>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?;

        let mut routines = Vec::new();
        for row in rows {
            let (catalog, schema, name, function_type, names, types, return_type) = row?;
            let Some(routine_kind) = routine_kind(&function_type) else {
                continue;
            };
            if kind.is_some_and(|k| k != routine_kind) {
                continue;
            }
            let types = text_list(types);
            let parameters = text_list(names)
                .into_iter()
                .enumerate()
                .map(|(i, name)| {
                    let ty = types.get(i).cloned().flatten();
                    (
                        name.unwrap_or_else(|| format!("arg{}", i + 1)),
                        ty.unwrap_or_else(|| "ANY".to_string()),
                    )
                })
                .collect();
            routines.push(RoutineInfo {
                kind: routine_kind,
                catalog,
                schema,
                name,
                parameters,
                return_type,
            });
        }
        Ok(routines)
    }
}

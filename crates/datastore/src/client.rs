use crate::error::DatastoreError;
use crate::metadata::{ColumnInfo, RoutineInfo, RoutineKind, TableName};
use crate::statement::{Execution, Statement};

use sea_query::SelectStatement;

/// The database client behind a datastore.
///
/// Implementations own the connection; callers borrow the client for one
/// statement at a time and never close it.
pub trait DatabaseClient {
    /// Runs one statement. Any result set is fully drained before the
    /// return value is read, and statement resources are released before
    /// this returns, on success and on error.
    fn execute(&self, statement: &Statement) -> Result<Execution, DatastoreError>;

    /// Renders a SELECT built with sea-query using this driver's quoting.
    fn render_select(&self, select: &SelectStatement) -> String;

    /// Quotes one identifier for literal inclusion in SQL text.
    fn quote_identifier(&self, ident: &str) -> String;

    /// SQL text calling `name` with `arity` positional placeholders.
    fn routine_call_sql(&self, kind: RoutineKind, name: &str, arity: usize) -> String;

    fn list_catalogs(&self) -> Result<Vec<String>, DatastoreError>;

    fn list_schemas(&self, catalog: Option<&str>) -> Result<Vec<String>, DatastoreError>;

    fn list_tables(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> Result<Vec<TableName>, DatastoreError>;

    /// Columns of `table` in ordinal order; empty when the table does not exist.
    fn list_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>, DatastoreError>;

    fn list_routines(&self, kind: Option<RoutineKind>) -> Result<Vec<RoutineInfo>, DatastoreError>;
}

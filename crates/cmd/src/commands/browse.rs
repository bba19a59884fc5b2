// Metadata browsing: tables, columns and routines of one datastore.

use std::io::Write;

use anyhow::Result;
use datastore::{DatastoreRegistry, RoutineKind, TableName};

pub fn tables_command<W: Write>(
    out: &mut W,
    datastores: &DatastoreRegistry,
    datastore: &str,
    catalog: Option<&str>,
    schema: Option<&str>,
) -> Result<()> {
    let store = datastores.lookup(datastore)?;
    for table in store.client().list_tables(catalog, schema)? {
        writeln!(out, "{table}")?;
    }
    Ok(())
}

pub fn columns_command<W: Write>(
    out: &mut W,
    datastores: &DatastoreRegistry,
    datastore: &str,
    table: TableName,
) -> Result<()> {
    let store = datastores.lookup(datastore)?;
    let columns = store.client().list_columns(&table)?;
    if columns.is_empty() {
        anyhow::bail!("table \"{table}\" was not found in datastore \"{datastore}\"");
    }
    let width = columns.iter().map(|c| c.name.chars().count()).max().unwrap_or(0);
    for column in columns {
        writeln!(out, "{:<width$}  {}", column.name, column.data_type)?;
    }
    Ok(())
}

/// Lists routines as signatures that can be pasted into a `function` or
/// `procedure` parameter.
pub fn routines_command<W: Write>(
    out: &mut W,
    datastores: &DatastoreRegistry,
    datastore: &str,
    kind: Option<RoutineKind>,
) -> Result<()> {
    let store = datastores.lookup(datastore)?;
    for routine in store.client().list_routines(kind)? {
        let label = match routine.kind {
            RoutineKind::Function => "function",
            RoutineKind::Procedure => "procedure",
        };
        writeln!(out, "{label:<9}  {}", routine.signature())?;
    }
    Ok(())
}

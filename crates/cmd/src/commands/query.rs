use std::io::Write;

use anyhow::{Result, anyhow};
use datastore::DatastoreRegistry;
use diagnostics::*;
use sqlcmd::{build_select_sql, map_result_set};

use crate::common::OutputFormat;
use crate::output::write_table;

/// Run an ad hoc SELECT against one datastore and print the result.
pub fn query_command<W: Write>(
    out: &mut W,
    datastores: &DatastoreRegistry,
    datastore: &str,
    sql: &str,
    format: OutputFormat,
) -> Result<()> {
    debug!("query_command called with sql: {sql}", sql: sql);

    let store = datastores.lookup(datastore)?;
    let statement = build_select_sql(sql, store.strips_block_comments())?;
    let execution = store
        .client()
        .execute(&statement)
        .map_err(|e| anyhow!("Failed to execute query: {e}"))?;
    let result_set = execution
        .result_set
        .ok_or_else(|| anyhow!("query returned no result set"))?;

    let (table, warnings) = map_result_set(result_set, "query")?;
    for warning in warnings {
        let message = warning.to_string();
        warn!("{message}", message: message.as_str());
    }
    write_table(out, &table, format)
}

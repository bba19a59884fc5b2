use super::{
    ParamText, build_statement, execute, expand_field, expand_optional, lookup_datastore,
    map_execution, validate_source,
};
use crate::context::ProcessorContext;
use crate::error::{CommandError, MappingWarning};
use crate::invocation::{CommandLog, CommandReport, Phase};
use crate::mapper::{OutputTargets, extract_outputs};
use crate::query::QueryParameters;

use datastore::{ResultTable, Value};
use diagnostics::*;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Runs any SQL statement, SQL file, function or procedure. Unlike
/// [`super::ReadTableSpec`] the SQL need not be a SELECT, and a result
/// table is kept only when `tableId` is given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RunSqlSpec {
    pub datastore: String,
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub sql_file: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub procedure: Option<String>,
    #[serde(default)]
    pub function_parameters: BTreeMap<String, ParamText>,
    #[serde(default)]
    pub procedure_parameters: BTreeMap<String, ParamText>,
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub row_count_property: Option<String>,
    #[serde(default)]
    pub return_property: Option<String>,
}

struct RunResult {
    table: Option<ResultTable>,
    table_id: Option<String>,
    return_value: Option<Value>,
    return_property: Option<String>,
    row_count_property: Option<String>,
}

impl RunSqlSpec {
    pub fn run(&self, name: &str, ctx: &mut ProcessorContext) -> CommandReport {
        let mut log = CommandLog::new(name);

        match self.run_statement(name, ctx, &mut log) {
            Ok(result) => {
                let targets = OutputTargets {
                    row_count_property: result.row_count_property,
                    column_properties: Vec::new(),
                };
                _ = extract_outputs(result.table.as_ref(), &targets, &mut ctx.properties);

                if let Some(property) = result.return_property {
                    match result.return_value {
                        Some(value) => ctx.properties.set(property, value),
                        None => log.warnings([MappingWarning::NoReturnValue { property }]),
                    }
                }
                match (result.table_id, result.table) {
                    (Some(_), Some(table)) => {
                        info!("Stored table {table}", table: table.id());
                        ctx.tables.insert(table);
                    }
                    (Some(table), None) => log.warnings([MappingWarning::NoResultSet { table }]),
                    (None, _) => {}
                }
            }
            Err(err) => {
                log.fail(&err);
                let targets = OutputTargets {
                    row_count_property: self
                        .row_count_property
                        .as_deref()
                        .map(|p| ctx.expand(p).0)
                        .filter(|p| !p.trim().is_empty()),
                    column_properties: Vec::new(),
                };
                _ = extract_outputs(None, &targets, &mut ctx.properties);
            }
        }
        log.finish()
    }

    fn run_statement(
        &self,
        name: &str,
        ctx: &ProcessorContext,
        log: &mut CommandLog,
    ) -> Result<RunResult, CommandError> {
        log.advance(Phase::ValidateParams);

        let datastore = expand_field(ctx, log, "datastore", &self.datastore);
        if datastore.trim().is_empty() {
            return Err(CommandError::validation("datastore must be specified"));
        }
        let params = QueryParameters {
            sql: self.sql.clone(),
            sql_file: self.sql_file.clone(),
            function: self.function.clone(),
            procedure: self.procedure.clone(),
            ..Default::default()
        };
        let source = validate_source(
            ctx,
            log,
            &params,
            &self.function_parameters,
            &self.procedure_parameters,
            false,
        )?;

        let table_id = expand_optional(ctx, log, "tableId", self.table_id.as_deref());
        let row_count_property =
            expand_optional(ctx, log, "rowCountProperty", self.row_count_property.as_deref());
        let return_property =
            expand_optional(ctx, log, "returnProperty", self.return_property.as_deref());
        if return_property.is_some() && !source.is_function() {
            return Err(CommandError::validation(
                "returnProperty can only be used with function",
            ));
        }

        let store = lookup_datastore(ctx, datastore.trim())?;

        log.advance(Phase::BuildStatement);
        let statement = build_statement(store, &source, false)?;

        log.advance(Phase::Execute);
        let execution = execute(store, &statement)?;

        log.advance(Phase::MapResults);
        let id = table_id.as_deref().unwrap_or(name);
        let (table, return_value) = map_execution(execution, id, log)?;

        Ok(RunResult {
            table,
            table_id,
            return_value,
            return_property,
            row_count_property,
        })
    }
}

use super::{
    ParamText, build_statement, execute, expand_field, expand_optional, lookup_datastore,
    map_execution, validate_source,
};
use crate::context::ProcessorContext;
use crate::error::{CommandError, MappingWarning};
use crate::invocation::{CommandLog, CommandReport, Phase};
use crate::mapper::{ColumnProperty, OutputTargets, extract_outputs};
use crate::query::QueryParameters;

use datastore::{ResultTable, Value};
use diagnostics::*;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Reads a table from a datastore by table query, SQL, SQL file, function
/// or procedure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReadTableSpec {
    pub datastore: String,

    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub columns: Option<String>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub top: Option<u64>,
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

    /// Id of the output table; defaults to the command name.
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub row_count_property: Option<String>,
    /// `Column:Property` pairs read from a single-row result.
    #[serde(default)]
    pub output_properties: Option<String>,
    /// Property for a function's return value.
    #[serde(default)]
    pub return_property: Option<String>,
}

struct ReadResult {
    table: Option<ResultTable>,
    table_id: String,
    return_value: Option<Value>,
    return_property: Option<String>,
    targets: OutputTargets,
}

impl ReadTableSpec {
    pub fn from_query(datastore: impl Into<String>, query: QueryParameters) -> Self {
        let QueryParameters {
            catalog,
            schema,
            table,
            columns,
            order_by,
            top,
            sql,
            sql_file,
            function,
            procedure,
        } = query;
        Self {
            datastore: datastore.into(),
            catalog,
            schema,
            table,
            columns,
            order_by,
            top,
            sql,
            sql_file,
            function,
            procedure,
            ..Default::default()
        }
    }

    pub fn query_parameters(&self) -> QueryParameters {
        QueryParameters {
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            table: self.table.clone(),
            columns: self.columns.clone(),
            order_by: self.order_by.clone(),
            top: self.top,
            sql: self.sql.clone(),
            sql_file: self.sql_file.clone(),
            function: self.function.clone(),
            procedure: self.procedure.clone(),
        }
    }

    pub fn run(&self, name: &str, ctx: &mut ProcessorContext) -> CommandReport {
        let mut log = CommandLog::new(name);

        match self.read(name, ctx, &mut log) {
            Ok(result) => {
                if result.table.is_none() {
                    log.warnings([MappingWarning::NoResultSet {
                        table: result.table_id.clone(),
                    }]);
                }
                let warnings =
                    extract_outputs(result.table.as_ref(), &result.targets, &mut ctx.properties);
                log.warnings(warnings);

                if let Some(property) = result.return_property {
                    match result.return_value {
                        Some(value) => ctx.properties.set(property, value),
                        None => log.warnings([MappingWarning::NoReturnValue { property }]),
                    }
                }
                if let Some(table) = result.table {
                    info!(
                        "Stored table {table} with {rows} rows",
                        table: table.id(),
                        rows: table.row_count()
                    );
                    ctx.tables.insert(table);
                }
            }
            Err(err) => {
                log.fail(&err);
                // The row count is still reported, as zero.
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

    fn read(
        &self,
        name: &str,
        ctx: &ProcessorContext,
        log: &mut CommandLog,
    ) -> Result<ReadResult, CommandError> {
        log.advance(Phase::ValidateParams);

        let datastore = expand_field(ctx, log, "datastore", &self.datastore);
        if datastore.trim().is_empty() {
            return Err(CommandError::validation("datastore must be specified"));
        }
        let source = validate_source(
            ctx,
            log,
            &self.query_parameters(),
            &self.function_parameters,
            &self.procedure_parameters,
            true,
        )?;

        let table_id = expand_optional(ctx, log, "tableId", self.table_id.as_deref())
            .unwrap_or_else(|| name.to_string());
        let targets = OutputTargets {
            row_count_property: expand_optional(
                ctx,
                log,
                "rowCountProperty",
                self.row_count_property.as_deref(),
            ),
            column_properties: match expand_optional(
                ctx,
                log,
                "outputProperties",
                self.output_properties.as_deref(),
            ) {
                Some(text) => ColumnProperty::parse_list(&text)?,
                None => Vec::new(),
            },
        };
        let return_property =
            expand_optional(ctx, log, "returnProperty", self.return_property.as_deref());
        if return_property.is_some() && !source.is_function() {
            return Err(CommandError::validation(
                "returnProperty can only be used with function",
            ));
        }

        let store = lookup_datastore(ctx, datastore.trim())?;

        log.advance(Phase::BuildStatement);
        let statement = build_statement(store, &source, true)?;

        log.advance(Phase::Execute);
        let execution = execute(store, &statement)?;

        log.advance(Phase::MapResults);
        let (table, return_value) = map_execution(execution, &table_id, log)?;

        Ok(ReadResult {
            table,
            table_id,
            return_value,
            return_property,
            targets,
        })
    }
}
